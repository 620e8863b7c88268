use chrono::NaiveDate;

use crate::models::{Gig, Platform};

/// Static offline dataset served when the remote catalog is unreachable.
///
/// Gig discovery is best-effort: a degraded, known-stale listing beats an
/// error screen. Posted dates are fixed so the recency factor treats
/// these as old postings rather than fresh arrivals.
pub fn fallback_gigs() -> Vec<Gig> {
    vec![
        gig(
            "gig-1",
            "up-001",
            "React Dashboard Development",
            "Looking for an experienced React developer to build a modern analytics dashboard with real-time data visualization.",
            Platform::Upwork,
            &["React", "TypeScript", "Chart.js"],
            "https://upwork.com/jobs/react-dashboard",
            NaiveDate::from_ymd_opt(2024, 1, 15),
            "Remote",
            "$2,000 - $4,000",
            "2-3 weeks",
        ),
        gig(
            "gig-2",
            "fv-002",
            "Node.js API Integration",
            "Need a backend developer to integrate multiple third-party APIs into our existing Node.js application.",
            Platform::Fiverr,
            &["Node.js", "Express", "API Integration"],
            "https://fiverr.com/jobs/nodejs-api",
            NaiveDate::from_ymd_opt(2024, 1, 14),
            "Remote",
            "$800 - $1,500",
            "1-2 weeks",
        ),
        gig(
            "gig-3",
            "tp-003",
            "UI/UX Design for Mobile App",
            "Seeking a talented UI/UX designer to create intuitive and beautiful designs for our mobile application.",
            Platform::Toptal,
            &["UI/UX Design", "Figma", "Mobile Design"],
            "https://toptal.com/jobs/mobile-ui-design",
            NaiveDate::from_ymd_opt(2024, 1, 13),
            "Remote",
            "$3,000 - $5,000",
            "3-4 weeks",
        ),
        gig(
            "gig-4",
            "fr-004",
            "Python Data Analysis Script",
            "Looking for a Python developer to create data analysis scripts for processing large datasets.",
            Platform::Freelancer,
            &["Python", "Pandas", "Data Analysis"],
            "https://freelancer.com/jobs/python-data",
            NaiveDate::from_ymd_opt(2024, 1, 12),
            "Remote",
            "$500 - $1,000",
            "1 week",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn gig(
    id: &str,
    external_id: &str,
    title: &str,
    description: &str,
    platform: Platform,
    skills: &[&str],
    url: &str,
    posted_date: Option<NaiveDate>,
    location: &str,
    budget: &str,
    duration: &str,
) -> Gig {
    Gig {
        id: id.to_string(),
        external_id: Some(external_id.to_string()),
        title: title.to_string(),
        description: description.to_string(),
        platform,
        skills_required: skills.iter().map(|s| s.to_string()).collect(),
        url: Some(url.to_string()),
        posted_date,
        location: Some(location.to_string()),
        budget: Some(budget.to_string()),
        duration: Some(duration.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_dataset_is_well_formed() {
        let gigs = fallback_gigs();
        assert_eq!(gigs.len(), 4);

        for gig in &gigs {
            assert!(!gig.id.is_empty());
            assert!(!gig.skills_required.is_empty());
            assert!(gig.posted_date.is_some());
            // Every fallback budget must parse so the budget factor applies
            assert!(crate::core::parse_budget_range(gig.budget.as_deref().unwrap()).is_some());
        }
    }

    #[test]
    fn test_fallback_ids_are_unique() {
        let gigs = fallback_gigs();
        let mut ids: Vec<&str> = gigs.iter().map(|g| g.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), gigs.len());
    }
}
