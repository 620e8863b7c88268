// Model exports
pub mod domain;
pub mod events;

pub use domain::{
    ApplicationStatus, Gig, GigFilters, MatchResult, NotificationSettings, Platform, SortBy,
    SubscriptionPreferences, ScoringWeights, UserPreferences, UserProfile,
};
pub use events::{
    AlertEvent, ApplicationUpdate, InboundFrame, NotificationLevel, OutboundFrame,
    SubscriptionRequest, SystemNotification, UnsubscribeRequest,
};
