use qd_rewards::RewardError;
use qd_types::WalletAddress;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error("caller {caller} is not authorized to disburse rewards")]
    Unauthorized { caller: WalletAddress },

    #[error("{0} has no allocation in this session")]
    UnknownRecipient(WalletAddress),

    #[error("reward computation failed: {0}")]
    Rewards(#[from] RewardError),
}
