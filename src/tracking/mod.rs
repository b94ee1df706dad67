mod backoff;
mod client;
mod error;
mod parsing;
mod transport;
mod types;
mod view;

pub use backoff::ReconnectPolicy;
pub use client::LiveTrackingClient;
pub use error::TrackingError;
pub use transport::{validate_booking_id, FrameStream, Transport, WebSocketTransport};
pub use types::TrackingUpdate;
pub use view::{TrackingStatus, TrackingView};
