/// Media metadata provider abstraction
///
/// The aggregator, catalogue and search services only talk to upstream metadata
/// through this trait, so the TMDB client can be swapped for a mock in tests.
use crate::{
    error::AppResult,
    models::{
        CatalogueCategory, Credits, Genre, Images, Item, MediaKind, RegionRelease, ResultSet,
        SearchScope, TitleRecord, Video,
    },
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for media metadata providers
///
/// Every query returns one page in upstream order. Failures are returned as-is;
/// callers decide whether a failure is fatal or recoverable.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Titles the provider recommends for the given seed
    async fn get_recommendations(&self, kind: MediaKind, id: u64, page: u32)
        -> AppResult<ResultSet>;

    /// Titles the provider considers similar to the given seed
    async fn get_similar(&self, kind: MediaKind, id: u64, page: u32) -> AppResult<ResultSet>;

    /// Titles of the given kind tagged with a genre
    async fn discover_by_genre(
        &self,
        kind: MediaKind,
        genre_id: u32,
        page: u32,
    ) -> AppResult<ResultSet>;

    /// Full record for a single title, including its genres
    async fn get_details(&self, kind: MediaKind, id: u64) -> AppResult<Item>;

    /// Details-page fields beyond [`Item`]: overview, runtime and series creators
    async fn get_record(&self, kind: MediaKind, id: u64) -> AppResult<TitleRecord>;

    /// Cast in billing order and the full crew
    async fn get_credits(&self, kind: MediaKind, id: u64) -> AppResult<Credits>;

    async fn get_videos(&self, kind: MediaKind, id: u64) -> AppResult<Vec<Video>>;

    /// Certifications per country (film release dates or series content ratings)
    async fn get_release_dates(&self, kind: MediaKind, id: u64) -> AppResult<Vec<RegionRelease>>;

    async fn get_images(&self, kind: MediaKind, id: u64) -> AppResult<Images>;

    async fn search(&self, scope: SearchScope, query: &str, page: u32) -> AppResult<ResultSet>;

    async fn get_category(&self, category: CatalogueCategory, page: u32) -> AppResult<ResultSet>;

    async fn get_genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
