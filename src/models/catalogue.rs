use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{Item, MediaKind};

/// Fixed TMDB listings backing the home page rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogueCategory {
    NowPlaying,
    Popular,
    Trending,
    TopRated,
    Upcoming,
    TrendingSeries,
    AiringToday,
    PopularSeries,
    TopRatedSeries,
    TrendingAll,
}

impl CatalogueCategory {
    pub fn endpoint(&self) -> &'static str {
        match self {
            CatalogueCategory::NowPlaying => "/movie/now_playing",
            CatalogueCategory::Popular => "/movie/popular",
            CatalogueCategory::Trending => "/trending/movie/week",
            CatalogueCategory::TopRated => "/movie/top_rated",
            CatalogueCategory::Upcoming => "/movie/upcoming",
            CatalogueCategory::TrendingSeries => "/trending/tv/week",
            CatalogueCategory::AiringToday => "/tv/airing_today",
            CatalogueCategory::PopularSeries => "/tv/popular",
            CatalogueCategory::TopRatedSeries => "/tv/top_rated",
            CatalogueCategory::TrendingAll => "/trending/all/week",
        }
    }

    /// Kind assumed for records without a `media_type` field
    pub fn default_kind(&self) -> MediaKind {
        match self {
            CatalogueCategory::TrendingSeries
            | CatalogueCategory::AiringToday
            | CatalogueCategory::PopularSeries
            | CatalogueCategory::TopRatedSeries => MediaKind::Series,
            _ => MediaKind::Film,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Popularity,
    Rating,
    TitleAsc,
    TitleDesc,
    Newest,
    Oldest,
}

/// Client-side narrowing applied to a fetched listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogueFilter {
    pub genre: Option<u32>,
    pub min_rating: Option<f64>,
    pub year: Option<i32>,
    pub sort: Option<SortOrder>,
}

impl CatalogueFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(genre) = self.genre {
            if !item.genre_ids.contains(&genre) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if item.effective_rating() < min_rating {
                return false;
            }
        }
        if let Some(year) = self.year {
            if item.release_year != Some(year) {
                return false;
            }
        }
        true
    }

    /// Filters then sorts. Without a sort order, upstream order is kept.
    pub fn apply(&self, items: Vec<Item>) -> Vec<Item> {
        let mut items: Vec<Item> = items.into_iter().filter(|i| self.matches(i)).collect();

        if let Some(order) = self.sort {
            items.sort_by(|a, b| compare(order, a, b));
        }

        items
    }
}

fn compare(order: SortOrder, a: &Item, b: &Item) -> Ordering {
    match order {
        SortOrder::Popularity => b.popularity.total_cmp(&a.popularity),
        SortOrder::Rating => b.effective_rating().total_cmp(&a.effective_rating()),
        SortOrder::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortOrder::TitleDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        // unknown years sort last either way
        SortOrder::Newest => match (a.release_year, b.release_year) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortOrder::Oldest => match (a.release_year, b.release_year) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}
