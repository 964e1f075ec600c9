// Etherscan-family block explorer client (BscScan by default).

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::models::RawTransfer;
use crate::source::{Closest, TransferSource};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ACTION_BLOCK_BY_TIME: &str = "getblocknobytime";
const ACTION_TOKEN_TX: &str = "tokentx";
const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";

/// `{status, message, result}` wrapper every explorer response uses.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

#[derive(Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    config: ExplorerConfig,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig) -> Result<Self, ExplorerError> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    async fn get(&self, action: &'static str, params: &[(&str, String)]) -> Result<Envelope, ExplorerError> {
        let resp = self
            .client
            .get(&self.config.base_url)
            .query(params)
            .query(&[("apikey", self.config.api_key.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ExplorerError::Status { status, body });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ExplorerError::Decode {
            action,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl TransferSource for ExplorerClient {
    async fn resolve_block_at_time(&self, timestamp: i64, closest: Closest) -> Result<u64, ExplorerError> {
        let params = [
            ("module", "block".to_string()),
            ("action", ACTION_BLOCK_BY_TIME.to_string()),
            ("timestamp", timestamp.to_string()),
            ("closest", closest.as_str().to_string()),
        ];

        let envelope = self.get(ACTION_BLOCK_BY_TIME, &params).await?;
        let block = parse_block_envelope(envelope).map_err(|e| {
            error!("block lookup at {timestamp} ({}) failed: {e}", closest.as_str());
            e
        })?;

        debug!("timestamp {} resolved to block {}", timestamp, block);
        Ok(block)
    }

    async fn list_token_transfers(
        &self,
        address: &str,
        start_block: u64,
        end_block: u64,
    ) -> Result<Vec<RawTransfer>, ExplorerError> {
        let params = [
            ("module", "account".to_string()),
            ("action", ACTION_TOKEN_TX.to_string()),
            ("contractaddress", self.config.contract_address.clone()),
            ("address", address.to_string()),
            ("startblock", start_block.to_string()),
            ("endblock", end_block.to_string()),
            ("sort", "asc".to_string()),
        ];

        let envelope = self.get(ACTION_TOKEN_TX, &params).await?;
        parse_transfers_envelope(envelope).map_err(|e| {
            error!("transfer listing for {address} in blocks {start_block}..={end_block} failed: {e}");
            e
        })
    }
}

fn api_error(action: &'static str, envelope: &Envelope) -> ExplorerError {
    // On failure the explorer usually puts the detail in `result` as a string.
    let message = match envelope.result.as_str() {
        Some(detail) if !detail.is_empty() => format!("{}: {}", envelope.message, detail),
        _ => envelope.message.clone(),
    };
    ExplorerError::Api { action, message }
}

fn parse_block_envelope(envelope: Envelope) -> Result<u64, ExplorerError> {
    if envelope.status != "1" {
        return Err(api_error(ACTION_BLOCK_BY_TIME, &envelope));
    }

    let block = match &envelope.result {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };

    block.ok_or_else(|| ExplorerError::Decode {
        action: ACTION_BLOCK_BY_TIME,
        reason: format!("block number expected, got {}", envelope.result),
    })
}

fn parse_transfers_envelope(envelope: Envelope) -> Result<Vec<RawTransfer>, ExplorerError> {
    if envelope.status != "1" {
        // An empty range is reported as status "0" rather than an empty success.
        let empty = envelope.result.as_array().is_some_and(|a| a.is_empty());
        if empty && envelope.message.starts_with(NO_TRANSACTIONS_MESSAGE) {
            return Ok(Vec::new());
        }
        return Err(api_error(ACTION_TOKEN_TX, &envelope));
    }

    serde_json::from_value(envelope.result).map_err(|e| ExplorerError::Decode {
        action: ACTION_TOKEN_TX,
        reason: e.to_string(),
    })
}
