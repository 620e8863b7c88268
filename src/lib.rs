//! GigFlow Match - real-time gig matching and alert pipeline
//!
//! This library provides the matching core used by the GigFlow gig
//! discovery app: a weighted gig scorer, a TTL result cache, a catalog
//! gateway with offline fallback, and a persistent alert transport with
//! backoff reconnection and subscription sync.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{score_and_rank, score_gig};
pub use models::{
    AlertEvent, Gig, GigFilters, MatchResult, ScoringWeights, SubscriptionPreferences, UserProfile,
};
pub use services::{
    AlertTransport, CacheKey, ConnectionState, EventBus, EventKind, GigCatalogGateway, ResultCache,
    SubscriptionSync, TransportEvent,
};
