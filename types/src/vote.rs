//! Vote records and contributor entries supplied by the vote source.

use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;

/// One cast vote.
///
/// `amount` accepts a number or a numeric string and is kept as a raw `f64`.
/// Negative and non-finite weights deserialise fine; the aggregator rejects
/// them with the record's position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    /// Wallet that submitted the vote transaction.
    pub voter_wallet: WalletAddress,
    /// Address the vote was cast from.
    pub voting_address: WalletAddress,
    /// Contributor receiving the vote.
    pub contributor_wallet: WalletAddress,
    /// Display name of the contributor.
    pub contributor_name: String,
    /// Raw vote weight.
    #[serde(with = "crate::amount::vote_weight")]
    pub amount: f64,
}

impl VoteRecord {
    /// Whether the contributor cast this vote themselves.
    pub fn is_self_attested(&self) -> bool {
        self.voting_address == self.contributor_wallet
    }
}

/// A known eligible contributor for a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorEntry {
    pub wallet: WalletAddress,
    pub name: String,
}
