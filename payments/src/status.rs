//! Per-recipient payment status and the result of a payment attempt.

use qd_types::WalletAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gateway::{GatewayError, TransferReceipt};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    InFlight,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Whether a new attempt may start from this status.
    pub fn can_initiate(self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Failed)
    }

    pub fn is_terminal(self) -> bool {
        self == PaymentStatus::Completed
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::InFlight => "in-flight",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Why a payment request was a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The recipient was already paid.
    AlreadyCompleted,
    /// Another attempt for the recipient has not resolved yet.
    InFlight,
    /// Zero, negative or non-finite amount.
    InvalidAmount,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::AlreadyCompleted => "already paid",
            SkipReason::InFlight => "payment already in flight",
            SkipReason::InvalidAmount => "nothing to pay",
        };
        f.write_str(s)
    }
}

/// Result of one payment request.
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentOutcome {
    Completed {
        wallet: WalletAddress,
        amount: f64,
        receipt: TransferReceipt,
    },
    Failed {
        wallet: WalletAddress,
        amount: f64,
        error: GatewayError,
    },
    Skipped {
        wallet: WalletAddress,
        reason: SkipReason,
    },
}

impl PaymentOutcome {
    pub fn wallet(&self) -> &WalletAddress {
        match self {
            PaymentOutcome::Completed { wallet, .. }
            | PaymentOutcome::Failed { wallet, .. }
            | PaymentOutcome::Skipped { wallet, .. } => wallet,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PaymentOutcome::Completed { .. })
    }
}
