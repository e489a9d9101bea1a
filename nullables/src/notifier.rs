//! Nullable notification sink — record events instead of displaying them.

use qd_payments::{NotificationSink, PaymentEvent};
use std::sync::Mutex;

pub struct NullNotifier {
    events: Mutex<Vec<PaymentEvent>>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// All received events (for assertions).
    pub fn events(&self) -> Vec<PaymentEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, PaymentEvent::Sent { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, PaymentEvent::Failed { .. }))
            .count()
    }

    pub fn reset(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Default for NullNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for NullNotifier {
    fn notify(&self, event: &PaymentEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
