use crate::{
    error::{AppError, AppResult},
    models::{ResultSet, SearchScope},
    services::providers::MetadataProvider,
};

/// Search results are never paged past this point
pub const MAX_SEARCH_PAGES: u32 = 20;

/// Service function for title search
///
/// Delegates to the configured provider and caps the reported page count so
/// clients never page into the long tail.
pub async fn search_titles(
    provider: &dyn MetadataProvider,
    scope: SearchScope,
    query: &str,
    page: u32,
) -> AppResult<ResultSet> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    if page == 0 || page > MAX_SEARCH_PAGES {
        return Err(AppError::InvalidInput(format!(
            "Page must be between 1 and {}",
            MAX_SEARCH_PAGES
        )));
    }

    let mut results = provider.search(scope, query, page).await?;
    results.total_pages = results.total_pages.min(MAX_SEARCH_PAGES);

    Ok(results)
}
