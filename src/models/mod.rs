use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod catalogue;
pub mod details;

pub use catalogue::{CatalogueCategory, CatalogueFilter, SortOrder};
pub use details::{
    CastMember, Credits, CrewMember, Gallery, Images, RegionRelease, TitleDetails, TitleRecord,
    Video,
};

/// Kind of media in TMDB's namespace. Serialized as TMDB's path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "movie")]
    Film,
    #[serde(rename = "tv")]
    Series,
}

impl MediaKind {
    /// Path segment used by TMDB endpoints (`/movie/...`, `/tv/...`)
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Film => "movie",
            MediaKind::Series => "tv",
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "movie" => Some(MediaKind::Film),
            "tv" => Some(MediaKind::Series),
            _ => None,
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// A single film or series as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: u64,
    pub title: String,
    pub kind: MediaKind,
    pub release_year: Option<i32>,
    pub genre_ids: Vec<u32>,
    /// Average vote in [0, 10]; absent when TMDB has no score
    pub rating: Option<f64>,
    pub popularity: f64,
    pub poster_ref: Option<String>,
}

impl Item {
    /// Rating used for admission thresholds and ordering. Missing scores count as zero.
    pub fn effective_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn shares_genre_with(&self, genre_ids: &[u32]) -> bool {
        self.genre_ids.iter().any(|g| genre_ids.contains(g))
    }
}

/// One page of items from a single upstream query, in upstream order
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ResultSet {
    pub page: u32,
    pub total_pages: u32,
    pub items: Vec<Item>,
}

/// Seed for a related-titles aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    pub id: u64,
    pub kind: MediaKind,
    /// Seed genres, when already known. `None` triggers a details lookup.
    pub genre_ids: Option<Vec<u32>>,
}

impl AggregationRequest {
    pub fn new(id: u64, kind: MediaKind) -> Self {
        Self {
            id,
            kind,
            genre_ids: None,
        }
    }

    pub fn with_genres(mut self, genre_ids: Vec<u32>) -> Self {
        self.genre_ids = Some(genre_ids);
        self
    }
}

/// Bounded, deduplicated list of titles related to a seed
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AggregationResult {
    pub items: Vec<Item>,
    /// True when genre discovery contributed at least one item (list is then rating-ordered)
    pub backfilled: bool,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Which TMDB search endpoint to hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// `/search/multi`, restricted to films and series
    #[default]
    All,
    Movies,
    Series,
}

impl SearchScope {
    pub fn endpoint(&self) -> &'static str {
        match self {
            SearchScope::All => "/search/multi",
            SearchScope::Movies => "/search/movie",
            SearchScope::Series => "/search/tv",
        }
    }

    pub fn default_kind(&self) -> MediaKind {
        match self {
            SearchScope::Series => MediaKind::Series,
            _ => MediaKind::Film,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged envelope used by list, discover and search endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<TmdbItem>,
}

/// Raw movie/tv record. Movies carry `title`/`release_date`, series carry
/// `name`/`first_air_date`; details responses carry `genres` instead of `genre_ids`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    pub genres: Vec<Genre>,
}

impl TmdbItem {
    /// Converts into an [`Item`], using `media_type` when present and
    /// `default_kind` otherwise. People (multi search) yield `None`.
    pub fn into_item(self, default_kind: MediaKind) -> Option<Item> {
        let kind = match self.media_type.as_deref() {
            Some(media_type) => MediaKind::from_media_type(media_type)?,
            None => default_kind,
        };

        let genre_ids = if self.genre_ids.is_empty() {
            self.genres.iter().map(|g| g.id).collect()
        } else {
            self.genre_ids
        };

        let release_year = self
            .release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .and_then(parse_release_year);

        Some(Item {
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            kind,
            release_year,
            genre_ids,
            rating: self.vote_average,
            popularity: self.popularity,
            poster_ref: self.poster_path,
        })
    }
}

impl TmdbPage {
    pub fn into_result_set(self, default_kind: MediaKind) -> ResultSet {
        ResultSet {
            page: self.page,
            total_pages: self.total_pages,
            items: self
                .results
                .into_iter()
                .filter_map(|item| item.into_item(default_kind))
                .collect(),
        }
    }
}

fn parse_release_year(date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}
