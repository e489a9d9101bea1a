//! Authorization at the boundary of state-mutating payment operations.

use qd_types::WalletAddress;
use std::sync::Arc;
use tracing::warn;

use crate::error::PaymentError;

/// Role lookup, owned by a collaborator.
pub trait AccessProvider: Send + Sync {
    fn is_authorized(&self, caller: &WalletAddress) -> bool;
}

/// Enforces [`AccessProvider`] decisions as [`PaymentError::Unauthorized`].
#[derive(Clone)]
pub struct AccessGate {
    provider: Arc<dyn AccessProvider>,
}

impl AccessGate {
    pub fn new(provider: Arc<dyn AccessProvider>) -> Self {
        Self { provider }
    }

    pub fn is_authorized(&self, caller: &WalletAddress) -> bool {
        self.provider.is_authorized(caller)
    }

    /// Fail unless `caller` may perform `action`.
    pub fn authorize(&self, caller: &WalletAddress, action: &str) -> Result<(), PaymentError> {
        if self.provider.is_authorized(caller) {
            Ok(())
        } else {
            warn!(caller = %caller, action, "unauthorized payment operation rejected");
            Err(PaymentError::Unauthorized {
                caller: caller.clone(),
            })
        }
    }
}
