//! Soroban RPC client — polls `getEvents` and decodes bridge events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! ## Formats
//!
//! Requests ask for `xdrFormat: json`, so topics and values normally arrive
//! as decoded JSON. Nodes that ignore the flag send base64 XDR instead; the
//! leading topic symbol is still recovered from it so the event kind is
//! never lost, and the undecoded value is kept verbatim under `"xdr"`.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{BridgeEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// `ScValType::Symbol` discriminant in XDR.
const SCV_SYMBOL: u32 = 15;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Topic list, JSON-encoded ScVals or base64 XDR
    pub topic: Vec<String>,
    /// Event value / data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate-limited by RPC (will retry in {backoff}s)");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let body: RpcResponse = resp.json().await?;

                if let Some(err) = body.error {
                    // Code -32600 / -32601 are hard failures; everything else we retry
                    if err.code == -32600 || err.code == -32601 {
                        return Err(IndexerError::EventParse(format!(
                            "RPC hard error {}: {}",
                            err.code, err.message
                        )));
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let result = body.result.ok_or_else(|| {
                    IndexerError::EventParse("Empty result from getEvents".to_string())
                })?;

                debug!(
                    "Fetched {} events (latest_ledger={:?})",
                    result.events.len(),
                    result.latest_ledger
                );

                return Ok((result.events, result.cursor, result.latest_ledger));
            }
        }
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`BridgeEvent`] structs.
///
/// Events from failed contract calls are dropped: the host rolled their
/// effects back.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<BridgeEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<BridgeEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let payload = decode_payload(&raw.value, &kind);
    let actor = actor_of(&kind, &payload);
    let tx_hash = raw.tx_hash.as_deref().map(normalize_tx_hash);
    let event_id = event_id_of(raw, ledger, tx_hash.as_deref(), &kind, &payload);

    Some(BridgeEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        actor,
        payload,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash,
    })
}

/// The RPC's own event id, else its paging token. Nodes that send neither
/// get a key derived from the event's content, stable across re-polls.
fn event_id_of(
    raw: &RawEvent,
    ledger: i64,
    tx_hash: Option<&str>,
    kind: &EventKind,
    payload: &Value,
) -> String {
    raw.id
        .clone()
        .or_else(|| raw.paging_token.clone())
        .unwrap_or_else(|| {
            format!(
                "{ledger}:{}:{}:{payload}",
                tx_hash.unwrap_or("-"),
                kind.as_str()
            )
        })
}

/// Flatten the event value into `{field: "string"}` for the fields `kind`
/// is known to carry.
fn decode_payload(value: &Value, kind: &EventKind) -> Value {
    if let Value::String(xdr) = value {
        return json!({ "xdr": xdr });
    }

    let fields = unwrap_map(value);
    let mut out = Map::new();
    for name in kind.payload_fields() {
        if let Some(v) = fields.get(*name).and_then(scalar_to_string) {
            out.insert((*name).to_string(), Value::String(v));
        }
    }
    if out.is_empty() && *kind == EventKind::Unknown {
        return value.clone();
    }
    Value::Object(out)
}

/// The address responsible for an event, where the payload names one.
fn actor_of(kind: &EventKind, payload: &Value) -> Option<String> {
    let key = match kind {
        EventKind::Initialized => "creator",
        EventKind::ManagerTransferred => "manager",
        EventKind::RewardsWithdrawn => "beneficiary",
        EventKind::TokenChanged => "token",
        _ => return None,
    };
    payload.get(key).and_then(|v| v.as_str()).map(String::from)
}

/// Soroban JSON renders a struct either as a plain object or as a `map`
/// ScVal: `{"map": [{"key": {"symbol": "x"}, "val": {...}}, ...]}`.
fn unwrap_map(value: &Value) -> Map<String, Value> {
    if let Some(entries) = value.get("map").and_then(|m| m.as_array()) {
        let mut out = Map::new();
        for entry in entries {
            let key = entry.get("key").and_then(scalar_to_string);
            if let (Some(key), Some(val)) = (key, entry.get("val")) {
                out.insert(key, val.clone());
            }
        }
        return out;
    }
    value.as_object().cloned().unwrap_or_default()
}

/// Render a JSON scalar, or a single-key ScVal wrapper such as
/// `{"i128": "100"}` / `{"type": "u64", "value": "5"}`, as a string.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => {
            if let Some(inner) = map.get("value") {
                return scalar_to_string(inner);
            }
            if map.len() == 1 {
                return map.values().next().and_then(scalar_to_string);
            }
            None
        }
        _ => None,
    }
}

/// Extract a Soroban Symbol from a topic string.
///
/// Accepts `{"type":"symbol","value":"goal_set"}`, `{"symbol":"goal_set"}`,
/// base64 XDR of an `ScVal::Symbol`, or the raw symbol itself.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v
            .get("value")
            .or_else(|| v.get("symbol"))
            .and_then(|x| x.as_str())
        {
            return s.to_string();
        }
    }
    if let Some(symbol) = symbol_from_xdr(raw) {
        return symbol;
    }
    // Fallback: treat the raw string as the symbol
    raw.to_string()
}

/// Decode base64 XDR of `ScVal::Symbol`: a big-endian `u32` discriminant,
/// a `u32` length, then the bytes padded to a multiple of four.
fn symbol_from_xdr(raw: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(raw).ok()?;
    let word = |at: usize| -> Option<u32> {
        let chunk: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
        Some(u32::from_be_bytes(chunk))
    };
    if word(0)? != SCV_SYMBOL {
        return None;
    }
    let len = word(4)? as usize;
    let name = bytes.get(8..8 + len)?;
    String::from_utf8(name.to_vec()).ok()
}

/// Lower-case hex transaction hashes so the same transaction always dedupes.
fn normalize_tx_hash(raw: &str) -> String {
    match hex::decode(raw) {
        Ok(bytes) => hex::encode(bytes),
        Err(_) => raw.to_string(),
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
