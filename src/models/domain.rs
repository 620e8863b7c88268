use serde::{Deserialize, Serialize};

/// Source job board a gig was ingested from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Upwork,
    Fiverr,
    Freelancer,
    Toptal,
    Guru,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Upwork => "upwork",
            Platform::Fiverr => "fiverr",
            Platform::Freelancer => "freelancer",
            Platform::Toptal => "toptal",
            Platform::Guru => "guru",
        }
    }
}

/// A job posting ingested from an external job board.
/// Never mutated after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gig {
    pub id: String,
    #[serde(rename = "externalId", default)]
    pub external_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub platform: Platform,
    #[serde(rename = "skillsRequired", default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "postedDate", default)]
    pub posted_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Budget and location preferences a user matches gigs against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(rename = "minBudget", default)]
    pub min_budget: Option<u32>,
    #[serde(rename = "maxBudget", default)]
    pub max_budget: Option<u32>,
    #[serde(rename = "remoteOk", default)]
    pub remote_ok: Option<bool>,
    #[serde(rename = "partTimeOk", default)]
    pub part_time_ok: Option<bool>,
    #[serde(rename = "preferredPlatforms", default)]
    pub preferred_platforms: Vec<Platform>,
}

/// Per-channel notification opt-ins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(rename = "gigAlerts", default)]
    pub gig_alerts: bool,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub push: bool,
}

/// Snapshot of a user's profile as read from the profile layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(rename = "notificationSettings", default)]
    pub notification_settings: NotificationSettings,
}

/// A gig together with its computed match score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub gig: Gig,
    #[serde(rename = "match")]
    pub match_score: u8,
}

/// Status of a submitted gig application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Interviewing,
    Rejected,
    Hired,
    Saved,
}

/// Sort order for catalog query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Match,
    Date,
    Budget,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Match => "match",
            SortBy::Date => "date",
            SortBy::Budget => "budget",
        }
    }
}

/// Filter set for catalog queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GigFilters {
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "minMatch", default)]
    pub min_match: Option<u8>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "sortBy", default)]
    pub sort_by: Option<SortBy>,
}

/// Server-side alert filter state. The transport carries this opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPreferences {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "minBudget", default)]
    pub min_budget: Option<u32>,
    #[serde(rename = "maxBudget", default)]
    pub max_budget: Option<u32>,
    #[serde(default)]
    pub remote: Option<bool>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl SubscriptionPreferences {
    /// Derive the alert filter state from a profile snapshot
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            skills: profile.skills.clone(),
            min_budget: profile.preferences.min_budget,
            max_budget: profile.preferences.max_budget,
            remote: profile.preferences.remote_ok,
            platforms: profile.preferences.preferred_platforms.clone(),
        }
    }
}

/// Weights for the gig scoring factors
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub skills: f64,
    pub budget: f64,
    pub location: f64,
    pub recency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.6,
            budget: 0.2,
            location: 0.1,
            recency: 0.1,
        }
    }
}
