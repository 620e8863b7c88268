use serde::{Deserialize, Serialize};

use crate::models::domain::{ApplicationStatus, Gig, SubscriptionPreferences};

/// Severity attached to a system notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Status change for a previously submitted application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    #[serde(rename = "applicationId")]
    pub application_id: String,
    pub status: ApplicationStatus,
    #[serde(rename = "gigTitle")]
    pub gig_title: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Broadcast message from the alert server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemNotification {
    pub message: String,
    #[serde(default)]
    pub level: NotificationLevel,
}

/// An asynchronous event received over the alert connection.
/// Exists only as an argument passed to subscribers.
#[derive(Debug, Clone)]
pub enum AlertEvent {
    GigAlert(Gig),
    ApplicationUpdate(ApplicationUpdate),
    SystemNotification(SystemNotification),
}

/// Server-to-client wire frame.
///
/// Frames are JSON text of the shape `{"type": ..., "payload": ...}`.
/// A frame whose payload does not match its declared type fails to
/// deserialize and is dropped at the decode boundary, same as an
/// unknown type.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum InboundFrame {
    GigAlert(Gig),
    ApplicationUpdate(ApplicationUpdate),
    SystemNotification(SystemNotification),
    Ping,
}

/// Client-to-server control frame
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OutboundFrame {
    SubscribeGigAlerts(SubscriptionRequest),
    UnsubscribeGigAlerts(UnsubscribeRequest),
    UpdateGigPreferences(SubscriptionRequest),
    Pong,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub preferences: SubscriptionPreferences,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnsubscribeRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}
