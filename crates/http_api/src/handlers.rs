use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};
use ledger_app::services::DEFAULT_CLEAR_BATCH_SIZE;
use ledger_app::{StatsParams, StatsQuery};
use serde::Deserialize;

use crate::{errors::HttpError, state::HttpState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearParams {
    pub batch_size: Option<usize>,
}

async fn blocking<T, F>(work: F) -> Result<T, HttpError>
where
    F: FnOnce() -> ledger_app::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

pub async fn stats(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(params): Query<StatsParams>,
) -> Result<impl IntoResponse, HttpError> {
    let query = StatsQuery::from_slug(&slug, &params)?;
    let bust = params.bust;
    let service = state.app_state.services.stats.clone();
    let response = blocking(move || service.fetch(&query, bust)).await?;
    Ok(Json(response))
}

pub async fn ingest(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    let service = state.app_state.services.ingest.clone();
    let response = blocking(move || service.run()).await?;
    Ok(Json(response))
}

pub async fn ingest_state(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    let service = state.app_state.services.ingest.clone();
    let response = blocking(move || service.state()).await?;
    Ok(Json(response))
}

pub async fn admin_clear(
    State(state): State<HttpState>,
    Query(params): Query<ClearParams>,
) -> Result<impl IntoResponse, HttpError> {
    let batch_size = params.batch_size.unwrap_or(DEFAULT_CLEAR_BATCH_SIZE);
    let service = state.app_state.services.admin.clone();
    let summary = blocking(move || service.clear_all(batch_size)).await?;
    Ok(Json(summary.to_json()))
}

pub async fn not_found() -> HttpError {
    HttpError::not_found()
}
