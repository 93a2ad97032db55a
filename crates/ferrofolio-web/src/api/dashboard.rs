use std::{sync::Arc, time::Instant};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Html,
    Json,
};
use ferrofolio_core::{CacheMode, Envelope};
use serde::Deserialize;

use crate::{
    dashboard::{build_dashboard, Dashboard},
    error::{ApiError, ApiResult},
    render, AppState,
};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    contribution: Option<f64>,
    #[serde(default)]
    refresh: bool,
}

impl DashboardQuery {
    fn cache_mode(&self) -> CacheMode {
        if self.refresh {
            CacheMode::Refresh
        } else {
            CacheMode::Use
        }
    }
}

fn parse_query(query: Result<Query<DashboardQuery>, QueryRejection>) -> ApiResult<DashboardQuery> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Rendered dashboard; the contribution form submits back here.
pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> ApiResult<Html<String>> {
    let query = parse_query(query)?;
    let dashboard = build_dashboard(&state, query.contribution, query.cache_mode()).await?;
    Ok(Html(render::dashboard_page(&dashboard)))
}

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Dashboard>>> {
    let query = parse_query(query)?;
    respond(&state, query.contribution, query.cache_mode()).await
}

/// Refetch every quote, ignoring whatever the cache holds.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Dashboard>>> {
    let query = parse_query(query)?;
    tracing::info!("market data refresh requested");
    respond(&state, query.contribution, CacheMode::Refresh).await
}

async fn respond(
    state: &AppState,
    contribution: Option<f64>,
    mode: CacheMode,
) -> ApiResult<Json<Envelope<Dashboard>>> {
    let started = Instant::now();
    let dashboard = build_dashboard(state, contribution, mode).await?;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let envelope = dashboard.into_envelope(latency_ms, state.market.source_name())?;
    Ok(Json(envelope))
}
