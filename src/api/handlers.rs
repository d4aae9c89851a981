use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::search::{self, SearchError, SearchRequest};
use crate::storage::MessageIndex;

/// Shared state for search routes
#[derive(Clone)]
pub struct SearchState {
    pub index: Arc<dyn MessageIndex>,
    pub timeout: Option<Duration>,
}

/// Query-string form of a search request.
///
/// Everything arrives as text; pagination values that are not numbers are
/// treated as absent rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryParams {
    pub owner_id: Option<String>,
    pub query: Option<String>,
    pub mailbox_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchQueryParams {
    fn into_request(self) -> Result<SearchRequest, (StatusCode, String)> {
        let owner_id = self
            .owner_id
            .ok_or_else(|| (StatusCode::BAD_REQUEST, "ownerId is required".to_string()))?;
        let query = self
            .query
            .ok_or_else(|| (StatusCode::BAD_REQUEST, "query is required".to_string()))?;

        Ok(SearchRequest {
            owner_id,
            query,
            mailbox_id: self.mailbox_id,
            limit: parse_number(self.limit),
            offset: parse_number(self.offset),
        })
    }
}

fn parse_number(value: Option<String>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

/// Search messages via query string
pub async fn search_messages(
    Query(params): Query<SearchQueryParams>,
    State(state): State<SearchState>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let request = params.into_request()?;
    run_search(&state, request).await
}

/// Search messages via JSON body
pub async fn search_messages_json(
    State(state): State<SearchState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    run_search(&state, request).await
}

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn run_search(
    state: &SearchState,
    request: SearchRequest,
) -> Result<Json<Value>, (StatusCode, String)> {
    let owner_id = request.owner_id.clone();
    let search = search::search(state.index.as_ref(), request);

    let outcome = match state.timeout {
        Some(deadline) => match tokio::time::timeout(deadline, search).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Search for owner {} exceeded {:?}", owner_id, deadline);
                return Err((
                    StatusCode::GATEWAY_TIMEOUT,
                    "Search timed out".to_string(),
                ));
            }
        },
        None => search.await,
    };

    match outcome {
        Ok(results) => Ok(Json(json!({ "results": results }))),
        Err(e) => Err(error_response(&owner_id, e)),
    }
}

fn error_response(owner_id: &str, err: SearchError) -> (StatusCode, String) {
    if err.is_transient() {
        warn!("Search for owner {} failed: {}", owner_id, err);
        (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
    } else {
        (StatusCode::BAD_REQUEST, err.to_string())
    }
}
