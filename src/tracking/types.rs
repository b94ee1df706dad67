use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One position sample for a delivery in progress.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TrackingUpdate {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
    pub speed_kmh: f64,
    pub timestamp: DateTime<Utc>,
}

impl TrackingUpdate {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) > max_age
    }
}
