use regex::Regex;
use std::sync::OnceLock;

/// Dollar range parsed out of a gig's budget text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
}

fn budget_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(\d+(?:,\d+)?)\s*-\s*\$(\d+(?:,\d+)?)").expect("budget pattern is valid")
    })
}

/// Extract a `$A - $B` range from free-form budget text.
///
/// Returns None when the text carries no such pattern (hourly rates,
/// "negotiable", empty strings); the budget factor is then skipped.
pub fn parse_budget_range(text: &str) -> Option<BudgetRange> {
    let caps = budget_pattern().captures(text)?;
    let min = caps[1].replace(',', "").parse().ok()?;
    let max = caps[2].replace(',', "").parse().ok()?;
    Some(BudgetRange { min, max })
}

/// Score (0-100) how well a gig's budget range fits the user's bounds.
///
/// Overlapping ranges are a full match. Disjoint ranges earn partial
/// credit that decays with the gap between the nearest edges, normalized
/// by the nearer profile bound. The two disjoint cases are exhaustive,
/// so there is no separate fallback arm.
#[inline]
pub fn budget_factor(range: &BudgetRange, min_budget: u32, max_budget: u32) -> f64 {
    if range.max >= min_budget && range.min <= max_budget {
        return 100.0;
    }

    if range.max < min_budget {
        let gap = (min_budget - range.max) as f64;
        return (100.0 - gap / min_budget as f64 * 100.0).max(0.0);
    }

    // range.min > max_budget
    let gap = (range.min - max_budget) as f64;
    (100.0 - gap / max_budget as f64 * 100.0).max(0.0)
}
