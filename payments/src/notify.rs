//! Payment notifications for the presentation layer.

use qd_types::WalletAddress;
use serde::Serialize;
use std::sync::Arc;

use crate::gateway::{GatewayError, TransferReceipt};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PaymentEvent {
    /// The gateway completed a transfer.
    Sent {
        wallet: WalletAddress,
        amount: f64,
        receipt: TransferReceipt,
    },
    /// The gateway reported a failure; the recipient can be retried.
    Failed {
        wallet: WalletAddress,
        amount: f64,
        error: GatewayError,
    },
}

/// Receives payment events. Called inline and never awaited, so
/// implementations must return quickly.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &PaymentEvent);
}

/// Fans every event out to a fixed list of sinks, in subscription order.
#[derive(Default)]
pub struct EventBus {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EventBus::subscribe`].
    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.subscribe(sink);
        self
    }

    pub fn subscribe(&mut self, sink: Arc<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for EventBus {
    fn notify(&self, event: &PaymentEvent) {
        for sink in &self.sinks {
            sink.notify(event);
        }
    }
}
