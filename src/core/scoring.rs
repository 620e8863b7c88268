use chrono::{DateTime, Utc};

use crate::core::budget::{budget_factor, parse_budget_range};
use crate::models::{Gig, MatchResult, ScoringWeights, UserProfile};

/// Calculate a match score (0-100) for a gig against a user profile
///
/// Scoring formula:
/// ```text
/// score = (
///     skill_factor * 0.6 +        # share of required skills the user has
///     budget_factor * 0.2 +       # gig budget range vs user bounds
///     location_factor * 0.1 +     # remote gig + user wants remote
///     recency_factor * 0.1        # newer postings score higher
/// ) / sum(weights applied)
/// ```
///
/// A factor whose inputs are missing (no skills listed, unparseable
/// budget text, no location preference, no posted date) is skipped and
/// its weight excluded from the normalization, so absent data never
/// drags the average toward zero. Deterministic for a fixed `now`,
/// never panics.
pub fn score_gig(
    gig: &Gig,
    profile: &UserProfile,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> u8 {
    let mut weighted = 0.0;
    let mut applied = 0.0;

    // Skill overlap
    if !gig.skills_required.is_empty() && !profile.skills.is_empty() {
        let matching = gig
            .skills_required
            .iter()
            .filter(|skill| skill_matches(skill, &profile.skills))
            .count();
        let factor = 100.0 * matching as f64 / gig.skills_required.len() as f64;
        weighted += factor * weights.skills;
        applied += weights.skills;
    }

    // Budget fit
    if let (Some(budget), Some(min), Some(max)) = (
        gig.budget.as_deref(),
        profile.preferences.min_budget,
        profile.preferences.max_budget,
    ) {
        if let Some(range) = parse_budget_range(budget) {
            weighted += budget_factor(&range, min, max) * weights.budget;
            applied += weights.budget;
        }
    }

    // Location preference
    if let (Some(location), Some(remote_ok)) =
        (gig.location.as_deref(), profile.preferences.remote_ok)
    {
        let factor = if location.to_lowercase().contains("remote") && remote_ok {
            100.0
        } else {
            50.0
        };
        weighted += factor * weights.location;
        applied += weights.location;
    }

    // Recency
    if let Some(posted) = gig.posted_date {
        let days = (now.date_naive() - posted).num_days().max(0);
        let factor = (100.0 - days as f64 * 10.0).max(0.0);
        weighted += factor * weights.recency;
        applied += weights.recency;
    }

    if applied <= 0.0 {
        return 0;
    }

    (weighted / applied).round().clamp(0.0, 100.0) as u8
}

/// Case-insensitive bidirectional substring match between a required
/// skill and any of the user's skills ("TypeScript" matches "typescript"
/// and "React" matches "React Native")
fn skill_matches(required: &str, user_skills: &[String]) -> bool {
    let required = required.to_lowercase();
    user_skills.iter().any(|skill| {
        let skill = skill.to_lowercase();
        skill.contains(&required) || required.contains(&skill)
    })
}

/// Score a batch of gigs and rank them best-first.
///
/// The sort is stable: gigs with equal scores keep their original
/// relative order.
pub fn score_and_rank(
    gigs: Vec<Gig>,
    profile: &UserProfile,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = gigs
        .into_iter()
        .map(|gig| {
            let match_score = score_gig(&gig, profile, weights, now);
            MatchResult { gig, match_score }
        })
        .collect();

    results.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    results
}
