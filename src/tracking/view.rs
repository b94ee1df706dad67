use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use super::backoff::ReconnectPolicy;
use super::client::LiveTrackingClient;
use super::transport::Transport;
use super::types::TrackingUpdate;

const DEFAULT_STALE_AFTER: Duration = Duration::seconds(30);

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TrackingStatus {
    pub booking_id: Option<String>,
    pub connected: bool,
    pub last_update: Option<TrackingUpdate>,
    pub stale: bool,
}

#[derive(Debug, Default)]
struct Shared {
    connected: bool,
    last_update: Option<TrackingUpdate>,
}

/// Display state of a single tracking session: the last known position and
/// whether the live channel is up.
pub struct TrackingView<T: Transport> {
    client: LiveTrackingClient<T>,
    shared: Arc<StdMutex<Shared>>,
    stale_after: Duration,
}

impl<T: Transport> TrackingView<T> {
    pub fn new(transport: Arc<T>, policy: ReconnectPolicy) -> Self {
        Self {
            client: LiveTrackingClient::new(transport, policy),
            shared: Arc::new(StdMutex::new(Shared::default())),
            stale_after: DEFAULT_STALE_AFTER,
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn watch(&mut self, booking_id: impl Into<String>) {
        self.client.disconnect();
        *self.lock() = Shared::default();

        let on_update = {
            let shared = self.shared.clone();
            move |update: TrackingUpdate| {
                let mut locked = shared.lock().unwrap_or_else(PoisonError::into_inner);
                locked.last_update = Some(update);
                locked.connected = true;
            }
        };
        let on_disconnect = {
            let shared = self.shared.clone();
            move || {
                // the last position stays on screen until a new one arrives
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .connected = false;
            }
        };

        self.client.connect(booking_id, on_update, on_disconnect);
    }

    pub fn unwatch(&mut self) {
        self.client.disconnect();
        *self.lock() = Shared::default();
    }

    pub fn status(&self) -> TrackingStatus {
        let locked = self.lock();
        let stale = locked
            .last_update
            .as_ref()
            .map(|u| u.is_stale(Utc::now(), self.stale_after))
            .unwrap_or(false);

        TrackingStatus {
            booking_id: self.client.booking_id().map(String::from),
            connected: locked.connected,
            last_update: locked.last_update.clone(),
            stale,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
