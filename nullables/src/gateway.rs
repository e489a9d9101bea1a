//! Nullable payment gateway — record transfers without moving funds.

use async_trait::async_trait;
use qd_payments::{GatewayError, PaymentGateway, TransferReceipt};
use qd_types::WalletAddress;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A test gateway that succeeds unless told otherwise.
///
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullGateway {
    /// Every `transfer` call, successful or not.
    calls: Mutex<Vec<(WalletAddress, f64)>>,
    /// Transfers that "moved funds".
    transfers: Mutex<Vec<(WalletAddress, f64)>>,
    /// Failures to return, per wallet, before succeeding again.
    scripted: Mutex<HashMap<WalletAddress, VecDeque<GatewayError>>>,
    delay: Option<Duration>,
    next_reference: AtomicU64,
}

impl NullGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
            scripted: Mutex::new(HashMap::new()),
            delay: None,
            next_reference: AtomicU64::new(1),
        }
    }

    /// Make every transfer take `delay` before resolving.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    /// Fail the next transfer to `wallet` with `error`. Calls queue up.
    pub fn fail_next(&self, wallet: &WalletAddress, error: GatewayError) {
        self.scripted
            .lock()
            .unwrap()
            .entry(wallet.clone())
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<(WalletAddress, f64)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn transfers(&self) -> Vec<(WalletAddress, f64)> {
        self.transfers.lock().unwrap().clone()
    }

    /// Successful transfers to one wallet.
    pub fn transfers_to(&self, wallet: &WalletAddress) -> Vec<f64> {
        self.transfers
            .lock()
            .unwrap()
            .iter()
            .filter(|(w, _)| w == wallet)
            .map(|(_, amount)| *amount)
            .collect()
    }
}

impl Default for NullGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for NullGateway {
    async fn transfer(
        &self,
        to: &WalletAddress,
        amount: f64,
    ) -> Result<TransferReceipt, GatewayError> {
        self.calls.lock().unwrap().push((to.clone(), amount));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(to)
            .and_then(|queue| queue.pop_front());
        if let Some(error) = scripted {
            return Err(error);
        }

        self.transfers.lock().unwrap().push((to.clone(), amount));
        let n = self.next_reference.fetch_add(1, Ordering::SeqCst);
        Ok(TransferReceipt {
            reference: format!("0x{n:064x}"),
        })
    }
}
