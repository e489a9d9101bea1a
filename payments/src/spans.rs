//! Pre-built [`tracing::Span`] constructors for payment operations.

use qd_types::WalletAddress;
use tracing::{info_span, Span};

/// Span covering one recipient's transfer, from check-in to terminal status.
pub fn payment_span(wallet: &WalletAddress, amount: f64) -> Span {
    info_span!("payment", wallet = %wallet, amount = %amount)
}

/// Span covering an aggregate disbursement over many recipients.
pub fn disbursement_span(caller: &WalletAddress, recipients: usize) -> Span {
    info_span!("disbursement", caller = %caller, recipients = %recipients)
}
