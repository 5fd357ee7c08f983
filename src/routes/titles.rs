use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{AggregationRequest, Item, MediaKind, ResultSet, SearchScope, TitleDetails},
    routes::AppState,
    services::{title_details, title_search},
};

const NO_RESULTS_MESSAGE: &str = "No recommendations found";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default)]
    scope: SearchScope,
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct RelatedTitlesResponse {
    pub seed_id: u64,
    pub kind: MediaKind,
    pub results: Vec<Item>,
    /// Genre discovery contributed; results are ordered by rating
    pub backfilled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn validate_id(id: u64) -> AppResult<()> {
    if id == 0 {
        return Err(AppError::InvalidInput(
            "Title id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<ResultSet>> {
    let results =
        title_search::search_titles(state.provider.as_ref(), params.scope, &params.q, params.page)
            .await?;
    Ok(Json(results))
}

/// Handler for a title's detail page
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((kind, id)): Path<(MediaKind, u64)>,
) -> AppResult<Json<TitleDetails>> {
    validate_id(id)?;

    let details = title_details::fetch_title_details(state.provider.as_ref(), kind, id).await?;

    tracing::info!(
        request_id = %request_id,
        title_id = id,
        kind = %kind,
        certification = %details.certification,
        has_trailer = details.trailer_url.is_some(),
        "Title details assembled"
    );

    Ok(Json(details))
}

/// Handler for related titles of a seed
pub async fn related(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((kind, id)): Path<(MediaKind, u64)>,
) -> AppResult<Json<RelatedTitlesResponse>> {
    validate_id(id)?;

    tracing::info!(
        request_id = %request_id,
        seed_id = id,
        kind = %kind,
        "Processing related titles request"
    );

    let result = state
        .aggregator
        .aggregate(&AggregationRequest::new(id, kind))
        .await?;

    tracing::info!(
        request_id = %request_id,
        results = result.len(),
        backfilled = result.backfilled,
        "Related titles aggregated"
    );

    let message = result.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());

    Ok(Json(RelatedTitlesResponse {
        seed_id: id,
        kind,
        results: result.items,
        backfilled: result.backfilled,
        message,
    }))
}
