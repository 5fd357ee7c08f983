/// The Movie Database (TMDB) provider
///
/// Implements every metadata query against the TMDB v3 REST API.
///
/// Endpoints used:
/// - `/{kind}/{id}/recommendations` and `/{kind}/{id}/similar` for related titles
/// - `/discover/{kind}?with_genres=` for genre backfill
/// - `/{kind}/{id}` for seed details
/// - `/{kind}/{id}/{credits|videos|images}`, `/movie/{id}/release_dates` and
///   `/tv/{id}/content_ratings` for the detail page
/// - `/search/{multi|movie|tv}`, listing endpoints and `/genre/{kind}/list`
use crate::{
    error::{AppError, AppResult},
    models::{
        details::{
            TmdbContentRatings, TmdbCredits, TmdbImages, TmdbReleaseDates, TmdbTitleRecord,
            TmdbVideoList,
        },
        CatalogueCategory, Credits, Genre, Images, Item, MediaKind, RegionRelease, ResultSet,
        SearchScope, TitleRecord, TmdbGenreList, TmdbItem, TmdbPage, Video,
    },
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Every request, including direct lookups outside the aggregator, is bounded by `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "TMDB API key cannot be empty".to_string(),
            ));
        }

        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// GETs `path` with the API key plus `params` and deserializes the body
    ///
    /// Transport errors have their URL stripped; it carries the API key.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.url(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(AppError::NotFound(format!("TMDB resource {}", path)));
            }
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    async fn get_page(
        &self,
        path: &str,
        default_kind: MediaKind,
        params: &[(&str, String)],
    ) -> AppResult<ResultSet> {
        let page: TmdbPage = self.get_json(path, params).await?;
        let result_set = page.into_result_set(default_kind);

        tracing::debug!(
            path = %path,
            page = result_set.page,
            results = result_set.items.len(),
            provider = "tmdb",
            "Page fetched"
        );

        Ok(result_set)
    }
}

fn page_param(page: u32) -> (&'static str, String) {
    ("page", page.to_string())
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn get_recommendations(
        &self,
        kind: MediaKind,
        id: u64,
        page: u32,
    ) -> AppResult<ResultSet> {
        let path = format!("/{}/{}/recommendations", kind.as_path(), id);
        self.get_page(&path, kind, &[page_param(page)]).await
    }

    async fn get_similar(&self, kind: MediaKind, id: u64, page: u32) -> AppResult<ResultSet> {
        let path = format!("/{}/{}/similar", kind.as_path(), id);
        self.get_page(&path, kind, &[page_param(page)]).await
    }

    async fn discover_by_genre(
        &self,
        kind: MediaKind,
        genre_id: u32,
        page: u32,
    ) -> AppResult<ResultSet> {
        let path = format!("/discover/{}", kind.as_path());
        self.get_page(
            &path,
            kind,
            &[("with_genres", genre_id.to_string()), page_param(page)],
        )
        .await
    }

    async fn get_details(&self, kind: MediaKind, id: u64) -> AppResult<Item> {
        let path = format!("/{}/{}", kind.as_path(), id);
        let raw: TmdbItem = self.get_json(&path, &[]).await?;

        let item = raw.into_item(kind).ok_or_else(|| {
            AppError::ExternalApi(format!("TMDB record {} is not a film or series", id))
        })?;

        tracing::info!(
            title_id = id,
            kind = %kind,
            genres = item.genre_ids.len(),
            provider = "tmdb",
            "Details fetched"
        );

        Ok(item)
    }

    async fn get_record(&self, kind: MediaKind, id: u64) -> AppResult<TitleRecord> {
        let path = format!("/{}/{}", kind.as_path(), id);
        let raw: TmdbTitleRecord = self.get_json(&path, &[]).await?;

        raw.into_record(kind).ok_or_else(|| {
            AppError::ExternalApi(format!("TMDB record {} is not a film or series", id))
        })
    }

    async fn get_credits(&self, kind: MediaKind, id: u64) -> AppResult<Credits> {
        let path = format!("/{}/{}/credits", kind.as_path(), id);
        let raw: TmdbCredits = self.get_json(&path, &[]).await?;
        Ok(raw.into())
    }

    async fn get_videos(&self, kind: MediaKind, id: u64) -> AppResult<Vec<Video>> {
        let path = format!("/{}/{}/videos", kind.as_path(), id);
        let raw: TmdbVideoList = self.get_json(&path, &[]).await?;
        Ok(raw.into())
    }

    async fn get_release_dates(&self, kind: MediaKind, id: u64) -> AppResult<Vec<RegionRelease>> {
        match kind {
            MediaKind::Film => {
                let path = format!("/movie/{}/release_dates", id);
                let raw: TmdbReleaseDates = self.get_json(&path, &[]).await?;
                Ok(raw.into())
            }
            MediaKind::Series => {
                let path = format!("/tv/{}/content_ratings", id);
                let raw: TmdbContentRatings = self.get_json(&path, &[]).await?;
                Ok(raw.into())
            }
        }
    }

    async fn get_images(&self, kind: MediaKind, id: u64) -> AppResult<Images> {
        let path = format!("/{}/{}/images", kind.as_path(), id);
        let raw: TmdbImages = self.get_json(&path, &[]).await?;
        Ok(raw.into())
    }

    async fn search(&self, scope: SearchScope, query: &str, page: u32) -> AppResult<ResultSet> {
        let result_set = self
            .get_page(
                scope.endpoint(),
                scope.default_kind(),
                &[
                    ("query", query.to_string()),
                    ("include_adult", "false".to_string()),
                    page_param(page),
                ],
            )
            .await?;

        tracing::info!(
            query = %query,
            results = result_set.items.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(result_set)
    }

    async fn get_category(&self, category: CatalogueCategory, page: u32) -> AppResult<ResultSet> {
        self.get_page(
            category.endpoint(),
            category.default_kind(),
            &[page_param(page)],
        )
        .await
    }

    async fn get_genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>> {
        let path = format!("/genre/{}/list", kind.as_path());
        let list: TmdbGenreList = self.get_json(&path, &[]).await?;
        Ok(list.genres)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
