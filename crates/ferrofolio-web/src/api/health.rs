use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub source: String,
    pub holdings: usize,
    pub cache_ttl_secs: u64,
    /// Age of the cached snapshot; absent until the first fetch.
    pub snapshot_age_secs: Option<u64>,
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let cache = state.market.cache();
    let snapshot_age_secs = cache
        .last_fetched_at()
        .await
        .map(|fetched| fetched.elapsed().as_secs());

    Json(HealthStatus {
        status: String::from("ok"),
        source: state.market.source_name().to_owned(),
        holdings: state.portfolio.holdings.len(),
        cache_ttl_secs: cache.ttl().await.as_secs(),
        snapshot_age_secs,
    })
}
