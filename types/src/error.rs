//! Errors raised while constructing shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),
}
