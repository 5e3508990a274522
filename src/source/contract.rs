//! Contract view calls over JSON-RPC
//!
//! The feedback contract exposes paged, read-only view methods. A view call is
//! a JSON-RPC `query` with `request_type: call_function`; the arguments travel
//! base64-encoded and the return value comes back as a byte array of JSON.

use super::family::RecordFamily;
use super::types::PageSource;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::page_index_for;
use crate::types::RecordSet;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Block finality the view is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finality {
    /// Latest finalized block
    #[default]
    Final,
    /// Latest block, may still be reorganized
    Optimistic,
}

impl Finality {
    fn as_str(self) -> &'static str {
        match self {
            Self::Final => "final",
            Self::Optimistic => "optimistic",
        }
    }
}

/// Reads pages of feedback from a contract's view methods
#[derive(Debug)]
pub struct ContractViewSource {
    client: HttpClient,
    rpc_url: String,
    contract: String,
    family: RecordFamily,
    finality: Finality,
}

impl ContractViewSource {
    /// Create a source reading `family` from `contract` through `rpc_url`
    pub fn new(
        client: HttpClient,
        rpc_url: impl Into<String>,
        contract: impl Into<String>,
        family: RecordFamily,
    ) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            contract: contract.into(),
            family,
            finality: Finality::default(),
        }
    }

    /// Evaluate views at a different finality
    #[must_use]
    pub fn with_finality(mut self, finality: Finality) -> Self {
        self.finality = finality;
        self
    }

    /// The family this source reads
    pub fn family(&self) -> RecordFamily {
        self.family
    }

    /// JSON-RPC request body for a page
    ///
    /// The view methods skip `page * size` records, so the offset is turned
    /// into a page index first.
    pub fn request_body(&self, offset: u64, limit: u32) -> Value {
        let args = self.family.args(page_index_for(offset, limit), limit);
        json!({
            "jsonrpc": "2.0",
            "id": "feedpoll",
            "method": "query",
            "params": {
                "request_type": "call_function",
                "finality": self.finality.as_str(),
                "account_id": self.contract,
                "method_name": self.family.method_name(),
                "args_base64": STANDARD.encode(args.to_string()),
            }
        })
    }
}

#[async_trait]
impl PageSource for ContractViewSource {
    async fn fetch_page(&self, offset: u64, limit: u32) -> Result<RecordSet> {
        let body = self.request_body(offset, limit);
        let response: RpcResponse = self.client.post_json(&self.rpc_url, body).await?;
        let records = decode_view_result(response)?;
        debug!(
            "{} returned {} records at offset {}",
            self.family.method_name(),
            records.len(),
            offset
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("{}::{} ({})", self.contract, self.family.method_name(), self.family)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<CallResult>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CallResult {
    #[serde(default)]
    result: Option<Vec<u8>>,
    /// Older nodes report contract panics here instead of in `error`
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    cause: Option<RpcErrorCause>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorCause {
    name: String,
    #[serde(default)]
    info: Option<Value>,
}

impl RpcErrorBody {
    fn describe(&self) -> String {
        if let Some(cause) = &self.cause {
            return match &cause.info {
                Some(info) if !info.is_null() => format!("{}: {}", cause.name, info),
                _ => cause.name.clone(),
            };
        }
        match (&self.message, &self.data) {
            (Some(message), Some(Value::String(data))) => format!("{message}: {data}"),
            (Some(message), _) => message.clone(),
            (None, Some(data)) => data.to_string(),
            (None, None) => "unknown RPC error".to_string(),
        }
    }
}

fn decode_view_result(response: RpcResponse) -> Result<RecordSet> {
    if let Some(error) = response.error {
        return Err(Error::rpc(error.describe()));
    }
    let call = response
        .result
        .ok_or_else(|| Error::decode("RPC response has neither result nor error"))?;
    if let Some(error) = call.error {
        return Err(Error::rpc(error));
    }
    let bytes = call
        .result
        .ok_or_else(|| Error::decode("view call returned no result bytes"))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::decode(format!("view result is not a record list: {e}")))
}
