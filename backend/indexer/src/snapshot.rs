//! Current bridge state, folded from the indexed event history.
//!
//! Every mutating bridge call publishes the exact values it stored, so
//! replaying the events in ledger order reconstructs what the contract holds
//! without querying it.

use serde::Serialize;

use crate::events::{EventKind, EventRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BridgeSnapshot {
    pub creator: Option<String>,
    pub native_asset: Option<String>,
    pub token: Option<String>,
    pub token_decimals: Option<String>,
    pub manager: Option<String>,
    pub minimal_goal: Option<String>,
    pub hard_cap: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub started: bool,
    pub notified: bool,
    pub total_collected: Option<String>,
    pub total_collected_eth: Option<String>,
    pub total_sold: Option<String>,
    pub finished: bool,
    pub successful: Option<bool>,
    /// Sum over all withdrawals, kept as a decimal string.
    pub withdrawn_native: Option<String>,
    pub withdrawn_token: Option<String>,
    pub last_ledger: i64,
    pub event_count: usize,
}

impl BridgeSnapshot {
    /// Fold `events` (ledger order) into a snapshot.
    pub fn from_events(events: &[EventRecord]) -> Self {
        events.iter().fold(Self::default(), |mut snap, ev| {
            snap.apply(ev);
            snap
        })
    }

    fn apply(&mut self, ev: &EventRecord) {
        self.event_count += 1;
        self.last_ledger = self.last_ledger.max(ev.ledger);

        let Some(kind) = EventKind::from_db_str(&ev.event_type) else {
            return;
        };
        match kind {
            EventKind::Initialized => {
                self.creator = ev.field("creator");
                self.native_asset = ev.field("native_asset");
                self.token = ev.field("token");
                self.token_decimals = ev.field("decimals");
                // The creator holds the manager role until it is transferred.
                self.manager = self.creator.clone();
            }
            EventKind::TokenChanged => {
                self.token = ev.field("token");
                self.token_decimals = ev.field("decimals");
            }
            EventKind::GoalSet => {
                self.minimal_goal = ev.field("minimal_goal");
                self.hard_cap = ev.field("hard_cap");
            }
            EventKind::PeriodSet => {
                self.period_start = ev.field("start_timestamp");
                self.period_end = ev.field("end_timestamp");
            }
            EventKind::ManagerTransferred => {
                self.manager = ev.field("manager");
            }
            EventKind::SaleStarted => self.started = true,
            EventKind::SaleNotified => {
                self.notified = true;
                self.total_collected = ev.field("total_collected");
                self.total_collected_eth = ev.field("total_collected_eth");
                self.total_sold = ev.field("total_sold");
            }
            EventKind::BridgeFinished => {
                self.finished = true;
                self.successful = ev.field("successful").map(|s| s == "true");
            }
            EventKind::RewardsWithdrawn => {
                self.withdrawn_native =
                    add_decimal(self.withdrawn_native.as_deref(), ev.field("native_amount"));
                self.withdrawn_token =
                    add_decimal(self.withdrawn_token.as_deref(), ev.field("token_amount"));
            }
            EventKind::Unknown => {}
        }
    }
}

/// Add two `i128` decimal strings. Unparseable input leaves the running
/// total untouched.
fn add_decimal(total: Option<&str>, amount: Option<String>) -> Option<String> {
    let current = total.and_then(|t| t.parse::<i128>().ok()).unwrap_or(0);
    match amount.and_then(|a| a.parse::<i128>().ok()) {
        Some(a) => current.checked_add(a).map(|sum| sum.to_string()),
        None => total.map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(kind: EventKind, ledger: i64, payload: serde_json::Value) -> EventRecord {
        EventRecord {
            id: ledger,
            event_id: format!("{ledger}-1"),
            event_type: kind.as_str().to_string(),
            actor: None,
            payload: payload.to_string(),
            ledger,
            timestamp: 0,
            contract_id: "CBRIDGE".to_string(),
            tx_hash: None,
            created_at: 0,
        }
    }

    #[test]
    fn empty_history_is_default() {
        assert_eq!(BridgeSnapshot::from_events(&[]), BridgeSnapshot::default());
    }

    #[test]
    fn init_seeds_roles_and_assets() {
        let events = vec![
            record(
                EventKind::Initialized,
                1,
                json!({ "creator": "GCREATOR", "native_asset": "CNATIVE", "token": "CTOKEN", "decimals": "7" }),
            ),
            record(EventKind::GoalSet, 2, json!({ "minimal_goal": "1", "hard_cap": "2" })),
            record(EventKind::SaleNotified, 3, json!({ "total_collected": "1", "total_collected_eth": "1", "total_sold": "1" })),
            record(EventKind::BridgeFinished, 4, json!({ "successful": "true" })),
        ];

        let snap = BridgeSnapshot::from_events(&events);
        assert_eq!(snap.creator.as_deref(), Some("GCREATOR"));
        assert_eq!(snap.manager.as_deref(), Some("GCREATOR"));
        assert_eq!(snap.native_asset.as_deref(), Some("CNATIVE"));
        assert_eq!(snap.token.as_deref(), Some("CTOKEN"));
        assert_eq!(snap.token_decimals.as_deref(), Some("7"));
        assert!(snap.finished);
    }

    #[test]
    fn full_lifecycle_folds_into_final_state() {
        let events = vec![
            record(
                EventKind::Initialized,
                0,
                json!({ "creator": "GCREATOR", "native_asset": "CNATIVE", "token": "COLDTOKEN", "decimals": "18" }),
            ),
            record(EventKind::SaleStarted, 1, json!({ "start_timestamp": "0", "end_timestamp": "0" })),
            record(EventKind::TokenChanged, 2, json!({ "token": "CTOKEN", "decimals": "18" })),
            record(
                EventKind::GoalSet,
                3,
                json!({ "minimal_goal": "10000000000000000000", "hard_cap": "1000000000000000000000" }),
            ),
            record(EventKind::PeriodSet, 4, json!({ "start_timestamp": "1700000000000", "end_timestamp": "1700000432000" })),
            record(
                EventKind::SaleNotified,
                5,
                json!({
                    "total_collected": "600000000000000000000000",
                    "total_collected_eth": "100000000000000000000",
                    "total_sold": "1500000000000000000000"
                }),
            ),
            record(EventKind::ManagerTransferred, 6, json!({ "previous": "GCREATOR", "manager": "CCONTROLLER" })),
            record(EventKind::BridgeFinished, 7, json!({ "successful": "true" })),
            record(
                EventKind::RewardsWithdrawn,
                8,
                json!({ "beneficiary": "GCREATOR", "native_amount": "1000000000000000000", "token_amount": "15000000000000000000" }),
            ),
            record(
                EventKind::RewardsWithdrawn,
                9,
                json!({ "beneficiary": "GCREATOR", "native_amount": "0", "token_amount": "0" }),
            ),
        ];

        let snap = BridgeSnapshot::from_events(&events);
        assert!(snap.started && snap.notified && snap.finished);
        assert_eq!(snap.successful, Some(true));
        assert_eq!(snap.token.as_deref(), Some("CTOKEN"));
        assert_eq!(snap.minimal_goal.as_deref(), Some("10000000000000000000"));
        assert_eq!(snap.hard_cap.as_deref(), Some("1000000000000000000000"));
        assert_eq!(snap.period_end.as_deref(), Some("1700000432000"));
        assert_eq!(snap.manager.as_deref(), Some("CCONTROLLER"));
        assert_eq!(snap.total_sold.as_deref(), Some("1500000000000000000000"));
        assert_eq!(snap.withdrawn_native.as_deref(), Some("1000000000000000000"));
        assert_eq!(snap.withdrawn_token.as_deref(), Some("15000000000000000000"));
        assert_eq!(snap.last_ledger, 9);
        assert_eq!(snap.event_count, 10);
        assert_eq!(snap.creator.as_deref(), Some("GCREATOR"));
    }

    #[test]
    fn later_configuration_overrides_earlier() {
        let events = vec![
            record(EventKind::GoalSet, 1, json!({ "minimal_goal": "1", "hard_cap": "2" })),
            record(EventKind::GoalSet, 2, json!({ "minimal_goal": "3", "hard_cap": "4" })),
        ];
        let snap = BridgeSnapshot::from_events(&events);
        assert_eq!(snap.minimal_goal.as_deref(), Some("3"));
        assert_eq!(snap.hard_cap.as_deref(), Some("4"));
    }

    #[test]
    fn failed_finish_is_reported() {
        let events = vec![record(EventKind::BridgeFinished, 1, json!({ "successful": "false" }))];
        let snap = BridgeSnapshot::from_events(&events);
        assert!(snap.finished);
        assert_eq!(snap.successful, Some(false));
    }

    #[test]
    fn unknown_events_are_counted_only() {
        let events = vec![record(EventKind::Unknown, 5, json!({ "anything": 1 }))];
        let snap = BridgeSnapshot::from_events(&events);
        assert_eq!(snap.event_count, 1);
        assert_eq!(snap.last_ledger, 5);
        assert!(!snap.notified);
    }
}
