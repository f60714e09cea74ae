//! Telemetry fan-out to WebSocket clients
//!
//! One ticker task publishes a frame per interval into a broadcast channel;
//! every connected client holds a receiver. No control loop feeds real
//! measurements yet, so frames are [`Telemetry::idle`].

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use wseries_core::api::Telemetry;

/// Frames buffered per client before it starts lagging.
const CHANNEL_CAPACITY: usize = 16;

/// Broadcast hub for serialized telemetry frames.
#[derive(Clone)]
pub(crate) struct TelemetryHub {
    tx: broadcast::Sender<String>,
}

impl TelemetryHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Register a client.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Current frame, serialized.
    pub fn current_frame(&self) -> Option<String> {
        encode(&Telemetry::idle())
    }

    /// Send `frame` to every connected client.
    ///
    /// Returns the number of clients reached.
    pub fn publish(&self, frame: &Telemetry) -> usize {
        let Some(text) = encode(frame) else {
            return 0;
        };
        // Err only means nobody is listening
        self.tx.send(text).unwrap_or(0)
    }

    /// Publish the current frame every `period` until the runtime stops.
    pub fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let hub = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if hub.tx.receiver_count() == 0 {
                    continue;
                }
                let reached = hub.publish(&Telemetry::idle());
                debug!("Telemetry pushed to {} client(s)", reached);
            }
        })
    }
}

fn encode(frame: &Telemetry) -> Option<String> {
    match serde_json::to_string(frame) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Failed to serialize telemetry frame: {}", e);
            None
        }
    }
}
