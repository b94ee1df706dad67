use super::error::TrackingError;
use super::types::TrackingUpdate;

pub fn parse_update(frame: &str) -> Result<TrackingUpdate, TrackingError> {
    Ok(serde_json::from_str(frame.trim())?)
}
