//! Admin RPC client used to close ledgers on a standalone node.
//!
//! Only one request is ever issued: `ledger_accept`. Transport failures, HTTP
//! errors and error results from the node are all reported as [`Error::Rpc`]
//! with a message; callers never branch on the kind of failure.

use std::time::Duration;

use async_trait::async_trait;
use br_types::LedgerIndex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{Error, Result};

pub const LEDGER_ACCEPT_METHOD: &str = "ledger_accept";

/// Per-request timeout of the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a successful `ledger_accept` call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerAccept {
    pub ledger_current_index: LedgerIndex,
    pub status: String,
}

/// Administrative requests against a node.
#[async_trait]
pub trait AdminRpc: Send + Sync {
    /// Asks the node to close the currently open ledger.
    async fn ledger_accept(&self) -> Result<LedgerAccept>;
}

/// JSON-RPC over HTTP, as exposed by the node's admin port.
#[derive(Debug, Clone)]
pub struct HttpAdminRpc {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAdminRpc {
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        reqwest::Url::parse(endpoint)
            .map_err(|e| Error::Rpc(format!("invalid RPC URL {endpoint:?}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Rpc(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AdminRpc for HttpAdminRpc {
    async fn ledger_accept(&self) -> Result<LedgerAccept> {
        let body = json!({
            "method": LEDGER_ACCEPT_METHOD,
            "params": [{}],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rpc(format!("HTTP status {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Rpc(format!("invalid response body: {e}")))?;

        parse_ledger_accept(payload)
    }
}

/// Extracts the `result` object of a `ledger_accept` response.
pub fn parse_ledger_accept(payload: Value) -> Result<LedgerAccept> {
    let result = payload
        .get("result")
        .ok_or_else(|| Error::Rpc("response has no result".to_string()))?;

    if result.get("status").and_then(Value::as_str) == Some("error") {
        let message = result
            .get("error_message")
            .or_else(|| result.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(Error::Rpc(message.to_string()));
    }

    serde_json::from_value(result.clone())
        .map_err(|e| Error::Rpc(format!("malformed ledger_accept result: {e}")))
}
