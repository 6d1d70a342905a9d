//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{EventKind, EventRecord};
use crate::snapshot::BridgeSnapshot;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub contract_id: String,
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Restrict to one event kind, e.g. `sale_notified`.
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub kind: Option<EventKind>,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct BridgeResponse {
    pub contract_id: String,
    #[serde(flatten)]
    pub snapshot: BridgeSnapshot,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for IndexerError {
    fn into_response(self) -> Response {
        let status = match self {
            IndexerError::UnknownKind(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events[?kind=<kind>]`
///
/// Returns indexed events in ledger order, optionally filtered by kind.
pub async fn get_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, IndexerError> {
    let kind = query.kind.as_deref().map(parse_kind).transpose()?;
    let events = match kind {
        Some(kind) => db::get_events_by_kind(&state.pool, kind).await?,
        None => db::get_all_events(&state.pool).await?,
    };
    Ok(Json(EventsResponse {
        kind,
        count: events.len(),
        events,
    }))
}

/// `GET /bridge`
///
/// Returns the bridge state reconstructed from every indexed event.
pub async fn get_bridge(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BridgeResponse>, IndexerError> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(BridgeResponse {
        contract_id: state.contract_id.clone(),
        snapshot: BridgeSnapshot::from_events(&events),
    }))
}

fn parse_kind(raw: &str) -> Result<EventKind, IndexerError> {
    EventKind::from_db_str(raw).ok_or_else(|| IndexerError::UnknownKind(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::events::BridgeEvent;

    async fn state_with(events: &[BridgeEvent]) -> Arc<ApiState> {
        let pool = db::init_pool("sqlite::memory:").await.unwrap();
        db::insert_events(&pool, events).await.unwrap();
        Arc::new(ApiState {
            pool,
            contract_id: "CBRIDGE".to_string(),
        })
    }

    fn event(kind: EventKind, ledger: i64, payload: serde_json::Value) -> BridgeEvent {
        BridgeEvent {
            event_id: format!("{ledger}-1"),
            event_type: kind.as_str().to_string(),
            actor: None,
            payload,
            ledger,
            timestamp: 0,
            contract_id: "CBRIDGE".to_string(),
            tx_hash: None,
        }
    }

    #[test]
    fn unknown_kind_maps_to_bad_request() {
        let err = parse_kind("sale_cancelled").unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_kind("goal_set").unwrap(), EventKind::GoalSet);
    }

    #[tokio::test]
    async fn events_filter_by_kind() {
        let state = state_with(&[
            event(EventKind::SaleStarted, 1, json!({ "start_timestamp": "0", "end_timestamp": "0" })),
            event(EventKind::BridgeFinished, 2, json!({ "successful": "true" })),
        ])
        .await;

        let Json(all) = get_events(State(state.clone()), Query(EventsQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.count, 2);
        assert_eq!(all.kind, None);

        let Json(finished) = get_events(
            State(state),
            Query(EventsQuery {
                kind: Some("bridge_finished".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(finished.count, 1);
        assert_eq!(finished.events[0].field("successful").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn bridge_reports_folded_snapshot() {
        let state = state_with(&[
            event(
                EventKind::Initialized,
                1,
                json!({ "creator": "GCREATOR", "native_asset": "CNATIVE", "token": "CTOKEN", "decimals": "7" }),
            ),
            event(EventKind::GoalSet, 3, json!({ "minimal_goal": "10", "hard_cap": "20" })),
            event(EventKind::BridgeFinished, 4, json!({ "successful": "false" })),
        ])
        .await;

        let Json(bridge) = get_bridge(State(state)).await.unwrap();
        assert_eq!(bridge.contract_id, "CBRIDGE");
        assert_eq!(bridge.snapshot.manager.as_deref(), Some("GCREATOR"));
        assert_eq!(bridge.snapshot.token.as_deref(), Some("CTOKEN"));
        assert_eq!(bridge.snapshot.hard_cap.as_deref(), Some("20"));
        assert_eq!(bridge.snapshot.successful, Some(false));
        assert_eq!(bridge.snapshot.last_ledger, 4);
    }
}
