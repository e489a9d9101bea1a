//! The vote-source seam and a JSON-file implementation.

use qd_types::{parse_vote_weight, ContributorEntry, VoteRecord, WalletAddress};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::path::Path;

use crate::error::RewardError;

/// Supplies one governance round's votes and its eligible contributors.
pub trait VoteSource: Send + Sync {
    fn votes(&self) -> Result<Vec<VoteRecord>, RewardError>;

    fn contributors(&self) -> Result<Vec<ContributorEntry>, RewardError>;
}

/// A governance round exported to JSON:
///
/// ```json
/// { "votes": [ { "voterWallet": "0x…", "votingAddress": "0x…",
///                "contributorWallet": "0x…", "contributorName": "alice",
///                "amount": 9 } ],
///   "contributors": [ { "wallet": "0x…", "name": "alice" } ] }
/// ```
///
/// `amount` may be a number or a numeric string. Its text is read without
/// going through the JSON parser's float conversion, so a weight outside
/// `f64` range becomes infinity and is rejected by the aggregator with the
/// record's index rather than failing the whole file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RoundJson")]
pub struct RoundFile {
    #[serde(default)]
    pub votes: Vec<VoteRecord>,
    #[serde(default)]
    pub contributors: Vec<ContributorEntry>,
}

#[derive(Deserialize)]
struct RoundJson {
    #[serde(default)]
    votes: Vec<VoteJson>,
    #[serde(default)]
    contributors: Vec<ContributorEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteJson {
    voter_wallet: WalletAddress,
    voting_address: WalletAddress,
    contributor_wallet: WalletAddress,
    contributor_name: String,
    amount: Box<RawValue>,
}

impl TryFrom<RoundJson> for RoundFile {
    type Error = String;

    fn try_from(json: RoundJson) -> Result<Self, Self::Error> {
        let votes = json
            .votes
            .into_iter()
            .enumerate()
            .map(|(index, vote)| {
                let amount = vote_weight(vote.amount.get())
                    .ok_or_else(|| format!("vote {index}: amount {} is not a number", vote.amount))?;
                Ok(VoteRecord {
                    voter_wallet: vote.voter_wallet,
                    voting_address: vote.voting_address,
                    contributor_wallet: vote.contributor_wallet,
                    contributor_name: vote.contributor_name,
                    amount,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Self {
            votes,
            contributors: json.contributors,
        })
    }
}

fn vote_weight(raw: &str) -> Option<f64> {
    if raw.starts_with('"') {
        let text: String = serde_json::from_str(raw).ok()?;
        parse_vote_weight(&text)
    } else {
        parse_vote_weight(raw)
    }
}

impl RoundFile {
    pub fn from_json_str(s: &str) -> Result<Self, RewardError> {
        serde_json::from_str(s).map_err(|e| RewardError::Source(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RewardError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RewardError::Source(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }
}

impl VoteSource for RoundFile {
    fn votes(&self) -> Result<Vec<VoteRecord>, RewardError> {
        Ok(self.votes.clone())
    }

    fn contributors(&self) -> Result<Vec<ContributorEntry>, RewardError> {
        Ok(self.contributors.clone())
    }
}
