use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::backoff::ReconnectPolicy;
use super::error::TrackingError;
use super::parsing::parse_update;
use super::transport::{FrameStream, Transport};
use super::types::TrackingUpdate;

type OnUpdate = Box<dyn FnMut(TrackingUpdate) + Send>;
type OnDisconnect = Box<dyn FnMut() + Send>;

struct Callbacks {
    on_update: OnUpdate,
    on_disconnect: OnDisconnect,
}

/// Callback slot shared between the client and its worker.
///
/// Callbacks only run while the slot lock is held and `close` empties the slot
/// under the same lock, so once `close` returns nothing is running and nothing
/// will run.
struct Listener {
    slot: StdMutex<Option<Callbacks>>,
}

impl Listener {
    fn new(callbacks: Callbacks) -> Self {
        Self {
            slot: StdMutex::new(Some(callbacks)),
        }
    }

    fn deliver(&self, update: TrackingUpdate) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(callbacks) => {
                (callbacks.on_update)(update);
                true
            }
            None => false,
        }
    }

    fn disconnected(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(callbacks) => {
                (callbacks.on_disconnect)();
                true
            }
            None => false,
        }
    }

    fn close(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

struct WorkerHandle {
    booking_id: String,
    listener: Arc<Listener>,
    connected: Arc<AtomicBool>,
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Single live position subscription for one booking.
///
/// Connection problems never reach the caller as errors: they show up as a
/// call to `on_disconnect` when an open channel is lost, followed by silent
/// reconnection according to the [`ReconnectPolicy`]. Must be used from within
/// a tokio runtime.
pub struct LiveTrackingClient<T: Transport> {
    transport: Arc<T>,
    policy: ReconnectPolicy,
    worker: Option<WorkerHandle>,
}

impl<T: Transport> LiveTrackingClient<T> {
    pub fn new(transport: Arc<T>, policy: ReconnectPolicy) -> Self {
        Self {
            transport,
            policy,
            worker: None,
        }
    }

    /// Subscribe to `booking_id`, replacing any existing subscription.
    pub fn connect<U, D>(&mut self, booking_id: impl Into<String>, on_update: U, on_disconnect: D)
    where
        U: FnMut(TrackingUpdate) + Send + 'static,
        D: FnMut() + Send + 'static,
    {
        self.disconnect();

        let booking_id = booking_id.into();
        let listener = Arc::new(Listener::new(Callbacks {
            on_update: Box::new(on_update),
            on_disconnect: Box::new(on_disconnect),
        }));
        let connected = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = oneshot::channel();

        let join = tokio::spawn(run_channel(
            self.transport.clone(),
            self.policy.clone(),
            booking_id.clone(),
            listener.clone(),
            connected.clone(),
            stop_rx,
        ));

        log::debug!("tracking channel requested for booking {}", booking_id);

        self.worker = Some(WorkerHandle {
            booking_id,
            listener,
            connected,
            stop_tx,
            join,
        });
    }

    /// Tear the subscription down. No callback runs after this returns.
    pub fn disconnect(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.listener.close();
            worker.connected.store(false, Ordering::SeqCst);
            let _ = worker.stop_tx.send(());
            worker.join.abort();
            log::debug!("tracking channel released for booking {}", worker.booking_id);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| w.connected.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.worker.as_ref().map(|w| w.booking_id.as_str())
    }
}

impl<T: Transport> Drop for LiveTrackingClient<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

enum ChannelEnd {
    Dropped(TrackingError),
    Released,
}

async fn run_channel<T: Transport>(
    transport: Arc<T>,
    policy: ReconnectPolicy,
    booking_id: String,
    listener: Arc<Listener>,
    connected: Arc<AtomicBool>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut attempt = 0u32;

    loop {
        let opened = tokio::select! {
            result = open_channel(transport.as_ref(), &booking_id, policy.connect_timeout) => result,
            _ = &mut stop_rx => return,
        };

        match opened {
            Ok(mut frames) => {
                attempt = 0;
                connected.store(true, Ordering::SeqCst);
                log::info!("tracking channel open for booking {}", booking_id);

                let end = tokio::select! {
                    end = pump(&mut frames, &listener, &booking_id, policy.idle_timeout) => end,
                    _ = &mut stop_rx => return,
                };

                connected.store(false, Ordering::SeqCst);
                match end {
                    ChannelEnd::Released => return,
                    ChannelEnd::Dropped(err) => {
                        log::warn!("tracking channel for booking {} lost: {}", booking_id, err);
                    }
                }

                if !listener.disconnected() {
                    return;
                }
            }
            Err(err) if err.is_permanent() => {
                log::error!("cannot track booking {}: {}", booking_id, err);
                return;
            }
            Err(err) => {
                log::warn!(
                    "failed to open tracking channel for booking {}: {}",
                    booking_id,
                    err
                );
            }
        }

        let Some(delay) = policy.delay_for(attempt) else {
            log::error!(
                "giving up on tracking channel for booking {} after {} retries",
                booking_id,
                attempt
            );
            return;
        };
        attempt += 1;
        log::info!(
            "reconnecting tracking channel for booking {} in {:?} (attempt {})",
            booking_id,
            delay,
            attempt
        );

        tokio::select! {
            _ = sleep(delay) => {}
            _ = &mut stop_rx => return,
        }
    }
}

async fn open_channel<T: Transport>(
    transport: &T,
    booking_id: &str,
    timeout: Duration,
) -> Result<FrameStream, TrackingError> {
    tokio::time::timeout(timeout, transport.open(booking_id))
        .await
        .map_err(|_| TrackingError::Timeout(timeout))?
}

async fn pump(
    frames: &mut FrameStream,
    listener: &Listener,
    booking_id: &str,
    idle_timeout: Option<Duration>,
) -> ChannelEnd {
    loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, frames.next()).await {
                Ok(next) => next,
                Err(_) => return ChannelEnd::Dropped(TrackingError::Timeout(limit)),
            },
            None => frames.next().await,
        };

        match next {
            Some(Ok(frame)) => match parse_update(&frame) {
                Ok(update) => {
                    if !listener.deliver(update) {
                        return ChannelEnd::Released;
                    }
                }
                Err(err) => {
                    log::warn!("dropping update for booking {}: {}", booking_id, err);
                }
            },
            Some(Err(err)) => return ChannelEnd::Dropped(err),
            None => return ChannelEnd::Dropped(TrackingError::Closed),
        }
    }
}
