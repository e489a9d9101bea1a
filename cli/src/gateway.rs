//! HTTP adapter for an external signer service.
//!
//! The service owns keys, gas and confirmation; this adapter only forwards
//! `{ "to": "0x…", "value_wei": "…" }` and maps the reply:
//! `{ "tx_hash": "0x…" }` on success, `{ "error": "…" }` otherwise.

use async_trait::async_trait;
use qd_payments::{GatewayError, PaymentGateway, TransferReceipt};
use qd_types::{ether_to_wei, WalletAddress};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    to: &'a str,
    /// Decimal string: wei values overflow JSON numbers.
    value_wei: String,
}

#[derive(Debug, Deserialize)]
struct TransferReply {
    tx_hash: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    url: String,
}

impl HttpGateway {
    /// Create a gateway targeting `url` (e.g. `http://127.0.0.1:8550/transfer`).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn transfer(
        &self,
        to: &WalletAddress,
        amount: f64,
    ) -> Result<TransferReceipt, GatewayError> {
        let value_wei = ether_to_wei(amount)
            .ok_or_else(|| GatewayError::Rejected(format!("{amount} ETH is not a valid value")))?;
        let request = TransferRequest {
            to: to.as_str(),
            value_wei: value_wei.to_string(),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("request failed: {e}")))?;

        let status = response.status();
        let reply: TransferReply = response
            .json()
            .await
            .map_err(|e| GatewayError::Network(format!("invalid JSON response ({status}): {e}")))?;

        match (reply.tx_hash, reply.error) {
            (_, Some(error)) => Err(classify(error)),
            (Some(reference), None) if status.is_success() => Ok(TransferReceipt { reference }),
            _ => Err(GatewayError::Rejected(format!("signer returned HTTP {status}"))),
        }
    }
}

fn classify(error: String) -> GatewayError {
    if error.to_ascii_lowercase().contains("insufficient funds") {
        GatewayError::InsufficientFunds(error)
    } else {
        GatewayError::Rejected(error)
    }
}
