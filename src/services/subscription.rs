use std::sync::{Arc, Mutex};

use crate::models::{
    OutboundFrame, SubscriptionPreferences, SubscriptionRequest, UnsubscribeRequest, UserProfile,
};
use crate::services::transport::{AlertTransport, ConnectionState};

/// Keeps the server-side alert subscription in sync with the user's
/// current preferences.
///
/// Updates are pushed only while the transport is connected; an update
/// that arrives during a disconnection is dropped, not queued. Callers
/// that want the subscription restored after a reconnect re-invoke
/// [`SubscriptionSync::handle_connected`] from their `connected`
/// handler.
pub struct SubscriptionSync {
    transport: Arc<AlertTransport>,
    last_sent: Mutex<Option<SubscriptionPreferences>>,
}

impl SubscriptionSync {
    pub fn new(transport: Arc<AlertTransport>) -> Self {
        Self {
            transport,
            last_sent: Mutex::new(None),
        }
    }

    /// Establish the subscription on a fresh connection, if the user
    /// has gig alerts enabled.
    pub fn handle_connected(&self, profile: &UserProfile) {
        if !profile.notification_settings.gig_alerts {
            tracing::debug!("gig alerts disabled for {}, not subscribing", profile.user_id);
            return;
        }

        if self.transport.state() != ConnectionState::Connected {
            tracing::debug!("transport not connected, deferring subscription for {}", profile.user_id);
            return;
        }

        let preferences = SubscriptionPreferences::from_profile(profile);
        self.transport
            .send(OutboundFrame::SubscribeGigAlerts(SubscriptionRequest {
                user_id: profile.user_id.clone(),
                preferences: preferences.clone(),
            }));

        *self.last_sent.lock().expect("subscription lock poisoned") = Some(preferences);
    }

    /// Push a preference update if anything changed since the last
    /// frame sent. Dropped while the transport is not connected.
    pub fn sync(&self, profile: &UserProfile) {
        if !profile.notification_settings.gig_alerts {
            return;
        }

        let preferences = SubscriptionPreferences::from_profile(profile);
        let mut last_sent = self.last_sent.lock().expect("subscription lock poisoned");

        if last_sent.as_ref() == Some(&preferences) {
            return;
        }

        if self.transport.state() != ConnectionState::Connected {
            tracing::debug!(
                "transport not connected, dropping preference update for {}",
                profile.user_id
            );
            return;
        }

        self.transport
            .send(OutboundFrame::UpdateGigPreferences(SubscriptionRequest {
                user_id: profile.user_id.clone(),
                preferences: preferences.clone(),
            }));

        *last_sent = Some(preferences);
    }

    /// Explicit opt-out: tell the server to stop alerting this user.
    pub fn opt_out(&self, user_id: &str) {
        self.transport
            .send(OutboundFrame::UnsubscribeGigAlerts(UnsubscribeRequest {
                user_id: user_id.to_string(),
            }));

        *self.last_sent.lock().expect("subscription lock poisoned") = None;
    }

    /// Preferences as last pushed to the server, if any
    pub fn last_sent(&self) -> Option<SubscriptionPreferences> {
        self.last_sent
            .lock()
            .expect("subscription lock poisoned")
            .clone()
    }
}
