use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CatalogueCategory, CatalogueFilter, Genre, Item, MediaKind, SortOrder},
    routes::AppState,
    services::catalogue,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pages: Option<u32>,
    genre: Option<u32>,
    min_rating: Option<f64>,
    year: Option<i32>,
    sort: Option<SortOrder>,
}

impl ListingQuery {
    fn filter(&self) -> CatalogueFilter {
        CatalogueFilter {
            genre: self.genre,
            min_rating: self.min_rating,
            year: self.year,
            sort: self.sort,
        }
    }
}

/// Handler for catalogue listings
pub async fn listing(
    State(state): State<Arc<AppState>>,
    Path(category): Path<CatalogueCategory>,
    Query(params): Query<ListingQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = catalogue::fetch_listing(
        state.provider.as_ref(),
        category,
        params.pages.unwrap_or(1),
        &params.filter(),
    )
    .await?;
    Ok(Json(items))
}

/// Handler for the genre list of a media kind
pub async fn genres(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<MediaKind>,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = catalogue::list_genres(state.provider.as_ref(), kind).await?;
    Ok(Json(genres))
}
