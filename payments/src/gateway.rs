//! The external payment gateway seam.

use async_trait::async_trait;
use qd_types::WalletAddress;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proof that the gateway accepted a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Gateway-defined reference, typically a transaction hash.
    pub reference: String,
}

/// A transfer the gateway could not complete. No funds moved.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("{0}")]
    Other(String),
}

/// Moves `amount` ether to a wallet.
///
/// May be slow; the state machine awaits the outcome without a timeout, so
/// any deadline is the gateway's own concern.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn transfer(
        &self,
        to: &WalletAddress,
        amount: f64,
    ) -> Result<TransferReceipt, GatewayError>;
}
