//! Access provider backed by the configured operator list.

use qd_payments::AccessProvider;
use qd_types::WalletAddress;
use std::collections::HashSet;

pub struct OperatorList {
    operators: HashSet<WalletAddress>,
}

impl OperatorList {
    pub fn new(operators: impl IntoIterator<Item = WalletAddress>) -> Self {
        Self {
            operators: operators.into_iter().collect(),
        }
    }
}

impl AccessProvider for OperatorList {
    fn is_authorized(&self, caller: &WalletAddress) -> bool {
        self.operators.contains(caller)
    }
}
