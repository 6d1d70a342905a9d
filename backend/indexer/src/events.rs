//! Canonical event types emitted by the crowdsale bridge contract.
//!
//! These mirror the topics and payloads defined in
//! `contracts/crowdsale_bridge/src/events.rs`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All recognised event kinds from the bridge contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Bridge deployed (`init` topic).
    Initialized,
    /// Custody retargeted to a new token (`token_chg` topic).
    TokenChanged,
    /// Goal bounds recorded (`goal_set` topic).
    GoalSet,
    /// Sale window recorded (`period` topic).
    PeriodSet,
    /// Manager role handed over (`mgr_xfer` topic).
    ManagerTransferred,
    /// Sale started (`started` topic).
    SaleStarted,
    /// Sale totals reported (`notified` topic).
    SaleNotified,
    /// Bridge finalized (`finished` topic).
    BridgeFinished,
    /// Custody released to the creator (`withdrawn` topic).
    RewardsWithdrawn,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        Self::Initialized,
        Self::TokenChanged,
        Self::GoalSet,
        Self::PeriodSet,
        Self::ManagerTransferred,
        Self::SaleStarted,
        Self::SaleNotified,
        Self::BridgeFinished,
        Self::RewardsWithdrawn,
        Self::Unknown,
    ];

    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::Initialized,
            "token_chg" => Self::TokenChanged,
            "goal_set" => Self::GoalSet,
            "period" => Self::PeriodSet,
            "mgr_xfer" => Self::ManagerTransferred,
            "started" => Self::SaleStarted,
            "notified" => Self::SaleNotified,
            "finished" => Self::BridgeFinished,
            "withdrawn" => Self::RewardsWithdrawn,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "bridge_initialized",
            Self::TokenChanged => "token_changed",
            Self::GoalSet => "goal_set",
            Self::PeriodSet => "period_set",
            Self::ManagerTransferred => "manager_transferred",
            Self::SaleStarted => "sale_started",
            Self::SaleNotified => "sale_notified",
            Self::BridgeFinished => "bridge_finished",
            Self::RewardsWithdrawn => "rewards_withdrawn",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`], used for API filters.
    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Payload fields carried by this kind, in the contract's field names.
    pub fn payload_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Initialized => &["creator", "native_asset", "token", "decimals"],
            Self::TokenChanged => &["token", "decimals"],
            Self::GoalSet => &["minimal_goal", "hard_cap"],
            Self::PeriodSet | Self::SaleStarted => &["start_timestamp", "end_timestamp"],
            Self::ManagerTransferred => &["previous", "manager"],
            Self::SaleNotified => &["total_collected", "total_collected_eth", "total_sold"],
            Self::BridgeFinished => &["successful"],
            Self::RewardsWithdrawn => &["beneficiary", "native_amount", "token_amount"],
            Self::Unknown => &[],
        }
    }
}

/// A fully decoded bridge event, ready to be stored in the database.
///
/// `payload` maps each field name to its value rendered as a string. Amounts
/// are `i128` on-chain and are never routed through a float, so what
/// observers read back is bit-exact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// RPC event id; the deduplication key.
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub payload: Value,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    /// JSON object text; see [`BridgeEvent::payload`].
    pub payload: String,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

impl EventRecord {
    /// Read one payload field back as a string.
    pub fn field(&self, name: &str) -> Option<String> {
        let payload: Value = serde_json::from_str(&self.payload).ok()?;
        payload.get(name)?.as_str().map(String::from)
    }
}
