//! Nullable access provider — a fixed allow-list.

use qd_payments::AccessProvider;
use qd_types::WalletAddress;
use std::collections::HashSet;

pub struct NullAccess {
    allowed: HashSet<WalletAddress>,
    allow_everyone: bool,
}

impl NullAccess {
    /// Authorize exactly the given wallets.
    pub fn allow<'a>(wallets: impl IntoIterator<Item = &'a WalletAddress>) -> Self {
        Self {
            allowed: wallets.into_iter().cloned().collect(),
            allow_everyone: false,
        }
    }

    pub fn allow_all() -> Self {
        Self {
            allowed: HashSet::new(),
            allow_everyone: true,
        }
    }

    pub fn deny_all() -> Self {
        Self {
            allowed: HashSet::new(),
            allow_everyone: false,
        }
    }
}

impl AccessProvider for NullAccess {
    fn is_authorized(&self, caller: &WalletAddress) -> bool {
        self.allow_everyone || self.allowed.contains(caller)
    }
}
