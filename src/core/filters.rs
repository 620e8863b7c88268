use crate::core::budget::parse_budget_range;
use crate::models::{Gig, GigFilters, MatchResult, SortBy};

/// Check if a gig passes the filter set (platform, skills, location).
///
/// `min_match` is not evaluated here; it only applies to scored results.
#[inline]
pub fn gig_passes(gig: &Gig, filters: &GigFilters) -> bool {
    if let Some(platform) = filters.platform {
        if gig.platform != platform {
            return false;
        }
    }

    // Any-overlap: at least one required skill matches one filter skill
    if !filters.skills.is_empty() {
        let any_overlap = gig.skills_required.iter().any(|skill| {
            let skill = skill.to_lowercase();
            filters
                .skills
                .iter()
                .any(|wanted| skill.contains(&wanted.to_lowercase()))
        });
        if !any_overlap {
            return false;
        }
    }

    if let Some(location) = &filters.location {
        let gig_location = gig.location.as_deref().unwrap_or("").to_lowercase();
        if !gig_location.contains(&location.to_lowercase()) {
            return false;
        }
    }

    true
}

/// Apply the filter set to a plain gig list, including the requested sort
pub fn apply_filters(mut gigs: Vec<Gig>, filters: &GigFilters) -> Vec<Gig> {
    gigs.retain(|gig| gig_passes(gig, filters));
    if let Some(sort_by) = filters.sort_by {
        sort_gigs(&mut gigs, sort_by);
    }
    gigs
}

/// Apply the filter set to scored results, including the minimum-score cut
pub fn apply_match_filters(mut results: Vec<MatchResult>, filters: &GigFilters) -> Vec<MatchResult> {
    let min_match = filters.min_match.unwrap_or(0);
    results.retain(|result| result.match_score >= min_match && gig_passes(&result.gig, filters));
    if let Some(sort_by) = filters.sort_by {
        sort_matches(&mut results, sort_by);
    }
    results
}

/// Sort plain gigs. `SortBy::Match` is a no-op here since unscored gigs
/// have no match field to compare.
pub fn sort_gigs(gigs: &mut [Gig], sort_by: SortBy) {
    match sort_by {
        SortBy::Match => {}
        SortBy::Date => gigs.sort_by(|a, b| b.posted_date.cmp(&a.posted_date)),
        SortBy::Budget => gigs.sort_by(|a, b| budget_max(b).cmp(&budget_max(a))),
    }
}

/// Sort scored results
pub fn sort_matches(results: &mut [MatchResult], sort_by: SortBy) {
    match sort_by {
        SortBy::Match => results.sort_by(|a, b| b.match_score.cmp(&a.match_score)),
        SortBy::Date => results.sort_by(|a, b| b.gig.posted_date.cmp(&a.gig.posted_date)),
        SortBy::Budget => results.sort_by(|a, b| budget_max(&b.gig).cmp(&budget_max(&a.gig))),
    }
}

/// Upper budget bound for sorting; gigs without a parseable budget
/// compare equal among themselves and sort last
fn budget_max(gig: &Gig) -> Option<u32> {
    gig.budget
        .as_deref()
        .and_then(parse_budget_range)
        .map(|range| range.max)
}
