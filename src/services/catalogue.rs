use crate::{
    error::AppResult,
    models::{CatalogueCategory, CatalogueFilter, Genre, Item, MediaKind},
    services::providers::MetadataProvider,
};
use futures::future::try_join_all;
use std::collections::HashSet;

/// Upper bound on pages fetched for one listing
pub const MAX_LISTING_PAGES: u32 = 50;

/// Genre TMDB lists for films that the home page never offers as a filter
const HIDDEN_GENRE: &str = "TV Movie";

/// Fetches pages `1..=pages` of a category concurrently and applies `filter`
///
/// Pages are flattened in page order and deduplicated by id (first wins).
/// Any failing page fails the whole listing.
pub async fn fetch_listing(
    provider: &dyn MetadataProvider,
    category: CatalogueCategory,
    pages: u32,
    filter: &CatalogueFilter,
) -> AppResult<Vec<Item>> {
    let pages = pages.clamp(1, MAX_LISTING_PAGES);

    let page_sets = try_join_all((1..=pages).map(|page| provider.get_category(category, page)))
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                category = ?category,
                provider = provider.name(),
                "Catalogue listing fetch failed"
            );
            e
        })?;

    let mut seen = HashSet::new();
    let items: Vec<Item> = page_sets
        .into_iter()
        .flat_map(|set| set.items)
        .filter(|item| seen.insert(item.id))
        .collect();
    let fetched = items.len();

    let items = filter.apply(items);

    tracing::info!(
        category = ?category,
        pages = pages,
        fetched = fetched,
        returned = items.len(),
        "Catalogue listing built"
    );

    Ok(items)
}

/// Genres offered for filtering a listing of `kind`
pub async fn list_genres(provider: &dyn MetadataProvider, kind: MediaKind) -> AppResult<Vec<Genre>> {
    let genres = provider.get_genres(kind).await?;
    Ok(genres
        .into_iter()
        .filter(|g| g.name != HIDDEN_GENRE)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ResultSet, SortOrder};
    use crate::services::providers::MockMetadataProvider;

    fn item(id: u64, rating: f64) -> Item {
        Item {
            id,
            title: format!("Title {}", id),
            kind: MediaKind::Film,
            release_year: Some(2020),
            genre_ids: vec![28],
            rating: Some(rating),
            popularity: 1.0,
            poster_ref: None,
        }
    }

    fn page_of(page: u32, items: Vec<Item>) -> ResultSet {
        ResultSet {
            page,
            total_pages: 500,
            items,
        }
    }

    #[tokio::test]
    async fn test_pages_flattened_in_order_and_deduplicated() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_category()
            .withf(|category, _| *category == CatalogueCategory::Popular)
            .times(3)
            .returning(|_, page| match page {
                1 => Ok(page_of(1, vec![item(1, 7.0), item(2, 6.0)])),
                2 => Ok(page_of(2, vec![item(2, 6.0), item(3, 8.0)])),
                _ => Ok(page_of(page, vec![item(4, 4.0)])),
            });

        let items = fetch_listing(
            &mock,
            CatalogueCategory::Popular,
            3,
            &CatalogueFilter::default(),
        )
        .await
        .unwrap();

        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_filter_and_sort_applied_after_fetch() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_category()
            .times(1)
            .returning(|_, page| Ok(page_of(page, vec![item(1, 6.0), item(2, 4.0), item(3, 9.0)])));

        let filter = CatalogueFilter {
            min_rating: Some(5.0),
            sort: Some(SortOrder::Rating),
            ..Default::default()
        };
        let items = fetch_listing(&mock, CatalogueCategory::TopRated, 1, &filter)
            .await
            .unwrap();

        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_page_count_clamped() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_category()
            .times(MAX_LISTING_PAGES as usize)
            .returning(|_, page| Ok(page_of(page, vec![])));

        fetch_listing(
            &mock,
            CatalogueCategory::Trending,
            500,
            &CatalogueFilter::default(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_zero_pages_fetches_first_page() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_category()
            .withf(|_, page| *page == 1)
            .times(1)
            .returning(|_, page| Ok(page_of(page, vec![item(1, 7.0)])));

        let items = fetch_listing(
            &mock,
            CatalogueCategory::Upcoming,
            0,
            &CatalogueFilter::default(),
        )
        .await
        .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_any_failing_page_fails_listing() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_category().returning(|_, page| {
            if page == 2 {
                Err(AppError::ExternalApi("rate limited".to_string()))
            } else {
                Ok(page_of(page, vec![item(page as u64, 7.0)]))
            }
        });

        let result = fetch_listing(
            &mock,
            CatalogueCategory::NowPlaying,
            3,
            &CatalogueFilter::default(),
        )
        .await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_list_genres_hides_tv_movie() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_get_genres()
            .withf(|kind| *kind == MediaKind::Film)
            .returning(|_| {
                Ok(vec![
                    Genre {
                        id: 28,
                        name: "Action".to_string(),
                    },
                    Genre {
                        id: 10770,
                        name: "TV Movie".to_string(),
                    },
                ])
            });

        let genres = list_genres(&mock, MediaKind::Film).await.unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].name, "Action");
    }
}
