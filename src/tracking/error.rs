use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("channel closed by server")]
    Closed,
    #[error("malformed update: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid stream url: {0}")]
    InvalidUrl(String),
    #[error("invalid booking id: {0:?}")]
    InvalidBookingId(String),
}

impl TrackingError {
    /// Errors that no amount of retrying will fix.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            TrackingError::InvalidUrl(_) | TrackingError::InvalidBookingId(_)
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TrackingError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TrackingError::Transport(err.to_string())
    }
}
