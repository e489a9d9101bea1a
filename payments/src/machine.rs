//! The payment state machine.
//!
//! Statuses live in one map behind an async mutex. Starting a payment is a
//! single check-and-set under that lock (`Pending | Failed → InFlight`), and
//! the lock is released before the gateway is awaited, so transfers to
//! different wallets proceed concurrently while a second request for a wallet
//! already in flight is turned away as [`SkipReason::InFlight`].
//!
//! Dropping an `initiate_payment` future after the gateway has been called
//! leaves the wallet `InFlight`. Funds may have moved, so the wallet stays
//! blocked rather than becoming payable again.

use qd_types::WalletAddress;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn, Instrument};

use crate::access::{AccessGate, AccessProvider};
use crate::error::PaymentError;
use crate::gateway::PaymentGateway;
use crate::metrics::PaymentMetrics;
use crate::notify::{NotificationSink, PaymentEvent};
use crate::spans::{disbursement_span, payment_span};
use crate::status::{PaymentOutcome, PaymentStatus, SkipReason};

pub struct PaymentStateMachine {
    gateway: Arc<dyn PaymentGateway>,
    gate: AccessGate,
    notifier: Arc<dyn NotificationSink>,
    statuses: Mutex<HashMap<WalletAddress, PaymentStatus>>,
    metrics: PaymentMetrics,
}

impl PaymentStateMachine {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        access: Arc<dyn AccessProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            gateway,
            gate: AccessGate::new(access),
            notifier,
            statuses: Mutex::new(HashMap::new()),
            metrics: PaymentMetrics::new(),
        }
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn metrics(&self) -> &PaymentMetrics {
        &self.metrics
    }

    /// Pay one recipient.
    ///
    /// Returns `Ok(Skipped)` when the recipient is already paid, already in
    /// flight, or owed nothing. Gateway failures are `Ok(Failed)`: the status
    /// is recorded and the recipient may be retried. The only error is
    /// [`PaymentError::Unauthorized`], raised before any state changes.
    pub async fn initiate_payment(
        &self,
        caller: &WalletAddress,
        wallet: &WalletAddress,
        amount: f64,
    ) -> Result<PaymentOutcome, PaymentError> {
        self.gate.authorize(caller, "initiate_payment")?;
        Ok(self.pay(wallet, amount).await)
    }

    /// Pay every listed recipient, one after another.
    ///
    /// Each transfer is independent: a failure is recorded for that recipient
    /// and the loop moves on; completed transfers are never rolled back.
    pub async fn disburse_all(
        &self,
        caller: &WalletAddress,
        recipients: &[(WalletAddress, f64)],
    ) -> Result<Vec<PaymentOutcome>, PaymentError> {
        self.gate.authorize(caller, "disburse_all")?;

        let outcomes = async {
            let mut outcomes = Vec::with_capacity(recipients.len());
            for (wallet, amount) in recipients {
                outcomes.push(self.pay(wallet, *amount).await);
            }
            let completed = outcomes.iter().filter(|o| o.is_completed()).count();
            info!(completed, total = outcomes.len(), "disbursement finished");
            outcomes
        }
        .instrument(disbursement_span(caller, recipients.len()))
        .await;
        Ok(outcomes)
    }

    /// Current status; wallets never seen are `Pending`.
    pub async fn status(&self, wallet: &WalletAddress) -> PaymentStatus {
        self.statuses
            .lock()
            .await
            .get(wallet)
            .copied()
            .unwrap_or_default()
    }

    pub async fn statuses(&self) -> HashMap<WalletAddress, PaymentStatus> {
        self.statuses.lock().await.clone()
    }

    /// Pay without consulting the gate; callers must have authorized already.
    pub(crate) async fn pay(&self, wallet: &WalletAddress, amount: f64) -> PaymentOutcome {
        if let Some(reason) = self.begin(wallet, amount).await {
            self.metrics.payments_skipped.inc();
            debug!(wallet = %wallet, amount, %reason, "payment skipped");
            return PaymentOutcome::Skipped {
                wallet: wallet.clone(),
                reason,
            };
        }

        self.transfer(wallet, amount)
            .instrument(payment_span(wallet, amount))
            .await
    }

    /// Check-and-set to `InFlight`, or the reason the request is a no-op.
    async fn begin(&self, wallet: &WalletAddress, amount: f64) -> Option<SkipReason> {
        let mut statuses = self.statuses.lock().await;
        let status = statuses.get(wallet).copied().unwrap_or_default();
        if status.is_terminal() {
            return Some(SkipReason::AlreadyCompleted);
        }
        if !status.can_initiate() {
            return Some(SkipReason::InFlight);
        }
        if !(amount.is_finite() && amount > 0.0) {
            return Some(SkipReason::InvalidAmount);
        }
        statuses.insert(wallet.clone(), PaymentStatus::InFlight);
        None
    }

    async fn transfer(&self, wallet: &WalletAddress, amount: f64) -> PaymentOutcome {
        self.metrics.transfers_attempted.inc();
        let timer = self.metrics.gateway_latency_seconds.start_timer();
        let result = self.gateway.transfer(wallet, amount).await;
        timer.observe_duration();

        match result {
            Ok(receipt) => {
                self.settle(wallet, PaymentStatus::Completed).await;
                self.metrics.transfers_completed.inc();
                info!(reference = %receipt.reference, "payment sent");
                self.notifier.notify(&PaymentEvent::Sent {
                    wallet: wallet.clone(),
                    amount,
                    receipt: receipt.clone(),
                });
                PaymentOutcome::Completed {
                    wallet: wallet.clone(),
                    amount,
                    receipt,
                }
            }
            Err(error) => {
                self.settle(wallet, PaymentStatus::Failed).await;
                self.metrics.transfers_failed.inc();
                warn!(%error, "payment failed");
                self.notifier.notify(&PaymentEvent::Failed {
                    wallet: wallet.clone(),
                    amount,
                    error: error.clone(),
                });
                PaymentOutcome::Failed {
                    wallet: wallet.clone(),
                    amount,
                    error,
                }
            }
        }
    }

    async fn settle(&self, wallet: &WalletAddress, status: PaymentStatus) {
        self.statuses.lock().await.insert(wallet.clone(), status);
    }
}
