// Service exports
pub mod bus;
pub mod cache;
pub mod catalog;
pub mod fallback;
pub mod subscription;
pub mod transport;

pub use bus::{EventBus, EventKind, HandlerId, TransportEvent};
pub use cache::{CacheKey, ResultCache, DEFAULT_CACHE_TTL};
pub use catalog::{CatalogError, GigCatalogGateway, DEFAULT_REQUEST_TIMEOUT};
pub use fallback::fallback_gigs;
pub use subscription::SubscriptionSync;
pub use transport::{
    reconnect_delay, AlertTransport, ConnectionState, ConnectionStatus, BASE_RECONNECT_DELAY,
    MAX_RECONNECT_ATTEMPTS,
};
