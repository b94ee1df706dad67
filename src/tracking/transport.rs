use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use super::error::TrackingError;

/// Text frames pushed by the server, ending on close or error.
pub type FrameStream = BoxStream<'static, Result<String, TrackingError>>;

/// Opens the position feed of a single booking.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn open(&self, booking_id: &str) -> Result<FrameStream, TrackingError>;
}

pub struct WebSocketTransport {
    base_url: String,
    token: Option<String>,
}

impl WebSocketTransport {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
        }
    }

    pub fn channel_url(&self, booking_id: &str) -> Result<String, TrackingError> {
        let base = self.base_url.trim_end_matches('/');
        if !(base.starts_with("ws://") || base.starts_with("wss://")) {
            return Err(TrackingError::InvalidUrl(self.base_url.clone()));
        }
        validate_booking_id(booking_id)?;

        let mut url = Url::parse(&format!("{}/ws/tracking/{}", base, booking_id))
            .map_err(|_| TrackingError::InvalidUrl(self.base_url.clone()))?;
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url.into())
    }
}

/// Booking ids end up in the channel path, so only plain id characters pass.
pub fn validate_booking_id(booking_id: &str) -> Result<(), TrackingError> {
    let valid = !booking_id.is_empty()
        && booking_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TrackingError::InvalidBookingId(booking_id.to_string()))
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, booking_id: &str) -> Result<FrameStream, TrackingError> {
        let url = self.channel_url(booking_id)?;
        let (ws, _) = connect_async(url.as_str()).await?;

        log::debug!("websocket open for booking {}", booking_id);

        let (_sink, source) = ws.split();
        let frames = source
            .filter_map(|msg| async move {
                match msg {
                    Ok(Message::Text(text)) => Some(Ok(text.as_str().to_string())),
                    Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => Some(Ok(text)),
                        Err(e) => {
                            log::warn!("dropping binary frame that is not UTF-8: {}", e);
                            None
                        }
                    },
                    Ok(Message::Close(_)) => Some(Err(TrackingError::Closed)),
                    Ok(_) => None,
                    Err(e) => Some(Err(e.into())),
                }
            })
            // stop after the first terminal item so a closed socket is not polled again
            .scan(false, |done, item| {
                if *done {
                    return futures::future::ready(None);
                }
                *done = item.is_err();
                futures::future::ready(Some(item))
            });

        Ok(frames.boxed())
    }
}


/// Websocket server on loopback that accepts a single client.
#[cfg(test)]
pub mod loopback {
    use futures::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message;

    /// Messages pushed here are sent to the connected client in order.
    pub type Script = mpsc::UnboundedSender<Message>;

    /// Returns the `ws://` base url to connect to and the script feeding it.
    pub async fn serve() -> (String, Script) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            while let Some(message) = rx.recv().await {
                if ws.send(message).await.is_err() {
                    return;
                }
            }
            while let Some(Ok(_)) = ws.next().await {}
        });

        (format!("ws://{}", addr), tx)
    }
}
