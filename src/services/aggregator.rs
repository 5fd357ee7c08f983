use crate::{
    error::{AppError, AppResult},
    models::{AggregationRequest, AggregationResult, Item, ResultSet},
    services::providers::MetadataProvider,
};
use futures::future::join_all;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::{
    collections::HashSet,
    fmt::Display,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::instrument;

/// Maximum number of related titles returned for a seed
pub const TARGET_COUNT: usize = 10;
/// Minimum rating for any admitted title
pub const MIN_RATING: f64 = 5.0;
/// Genre discovery picks a random page in `1..=MAX_DISCOVER_PAGE`
pub const MAX_DISCOVER_PAGE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Recommendations,
    Similar,
    GenreDiscovery,
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Recommendations => "recommendations",
            Tier::Similar => "similar",
            Tier::GenreDiscovery => "genre_discovery",
        };
        write!(f, "{}", name)
    }
}

/// Counts upstream queries so the all-sources-failed case can be detected
#[derive(Debug, Default)]
struct QueryLedger {
    attempted: usize,
    succeeded: usize,
}

impl QueryLedger {
    fn record<T>(&mut self, result: &AppResult<T>) {
        self.attempted += 1;
        if result.is_ok() {
            self.succeeded += 1;
        }
    }
}

/// Builds related-title lists for a seed from up to three escalating sources
///
/// 1. Provider recommendations (rating >= 5)
/// 2. Provider "similar" titles (rating >= 5), only if still short
/// 3. Genre discovery backfill, only if still short: one random page per seed
///    genre, above-average popularity preferred, must share a seed genre, shuffled
///
/// Earlier tiers are never evicted by later ones. Once the backfill contributes,
/// the merged list is ordered by descending rating.
pub struct Aggregator {
    provider: Arc<dyn MetadataProvider>,
    rng: Mutex<StdRng>,
    query_timeout: Duration,
}

impl Aggregator {
    /// Creates an aggregator with an OS-seeded random source
    pub fn new(provider: Arc<dyn MetadataProvider>, query_timeout: Duration) -> Self {
        Self::with_rng(provider, query_timeout, StdRng::from_os_rng())
    }

    /// Creates an aggregator whose page picks and shuffles are reproducible
    pub fn with_seed(provider: Arc<dyn MetadataProvider>, query_timeout: Duration, seed: u64) -> Self {
        Self::with_rng(provider, query_timeout, StdRng::seed_from_u64(seed))
    }

    fn with_rng(provider: Arc<dyn MetadataProvider>, query_timeout: Duration, rng: StdRng) -> Self {
        Self {
            provider,
            rng: Mutex::new(rng),
            query_timeout,
        }
    }

    /// Aggregates related titles for `request`
    ///
    /// Individual source failures are logged and treated as empty results.
    /// Returns [`AppError::Aggregation`] only when every upstream query failed.
    /// An empty result means the sources answered but nothing qualified.
    #[instrument(skip_all, fields(seed_id = request.id, kind = %request.kind))]
    pub async fn aggregate(&self, request: &AggregationRequest) -> AppResult<AggregationResult> {
        let kind = request.kind;
        let mut ledger = QueryLedger::default();
        let mut seen: HashSet<u64> = HashSet::from([request.id]);
        let mut retained: Vec<Item> = Vec::new();

        // Tier 1
        let recommendations = self
            .query(
                Tier::Recommendations,
                self.provider.get_recommendations(kind, request.id, 1),
            )
            .await;
        ledger.record(&recommendations);
        if let Ok(set) = recommendations {
            let admitted = admit_rated(&mut retained, &mut seen, set.items);
            tracing::info!(tier = %Tier::Recommendations, retained = admitted, "Tier completed");
        }

        if retained.len() >= TARGET_COUNT {
            retained.truncate(TARGET_COUNT);
            return Ok(AggregationResult {
                items: retained,
                backfilled: false,
            });
        }

        // Tier 2
        let similar = self
            .query(Tier::Similar, self.provider.get_similar(kind, request.id, 1))
            .await;
        ledger.record(&similar);
        if let Ok(set) = similar {
            let admitted = admit_rated(&mut retained, &mut seen, set.items);
            tracing::info!(tier = %Tier::Similar, retained = admitted, "Tier completed");
        }

        if retained.len() >= TARGET_COUNT {
            retained.truncate(TARGET_COUNT);
            return Ok(AggregationResult {
                items: retained,
                backfilled: false,
            });
        }

        // Tier 3
        let needed = TARGET_COUNT - retained.len();
        let seed_genres = distinct_genres(match &request.genre_ids {
            Some(genre_ids) => genre_ids.clone(),
            None => self.seed_genres(request).await,
        });

        let pool = self
            .discovery_pool(request, &seed_genres, &seen, &mut ledger)
            .await;
        let mut backfill = filter_backfill(pool, &seed_genres, needed);
        self.shuffle(&mut backfill);
        backfill.truncate(needed);

        tracing::info!(
            tier = %Tier::GenreDiscovery,
            needed = needed,
            retained = backfill.len(),
            "Tier completed"
        );

        if ledger.succeeded == 0 {
            tracing::error!(
                attempted = ledger.attempted,
                "Every source failed while aggregating related titles"
            );
            return Err(AppError::Aggregation(format!(
                "all {} upstream queries failed for {} {}",
                ledger.attempted, kind, request.id
            )));
        }

        let backfilled = !backfill.is_empty();
        retained.extend(backfill);
        if backfilled {
            retained.sort_by(|a, b| b.effective_rating().total_cmp(&a.effective_rating()));
        }
        retained.truncate(TARGET_COUNT);

        if retained.is_empty() {
            tracing::info!("No qualifying related titles");
        }

        Ok(AggregationResult {
            items: retained,
            backfilled,
        })
    }

    /// Runs one upstream query under the per-query timeout, logging failures
    async fn query<F>(&self, tier: Tier, fut: F) -> AppResult<ResultSet>
    where
        F: Future<Output = AppResult<ResultSet>>,
    {
        let result = match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(Ok(set)) => Ok(set),
            Ok(Err(e)) => Err(AppError::source_failed(tier.to_string(), e)),
            Err(_) => Err(AppError::source_failed(
                tier.to_string(),
                format!("timed out after {}ms", self.query_timeout.as_millis()),
            )),
        };

        if let Err(e) = &result {
            tracing::warn!(
                tier = %tier,
                provider = self.provider.name(),
                error = %e,
                "Source query failed, treating as empty"
            );
        }

        result
    }

    /// Looks up the seed's genres. A failed lookup yields no genres.
    async fn seed_genres(&self, request: &AggregationRequest) -> Vec<u32> {
        let lookup = tokio::time::timeout(
            self.query_timeout,
            self.provider.get_details(request.kind, request.id),
        )
        .await;

        match lookup {
            Ok(Ok(details)) => details.genre_ids,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Seed details lookup failed, no genre backfill");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Seed details lookup timed out, no genre backfill");
                Vec::new()
            }
        }
    }

    /// Fans out one discover query per seed genre and unions the pages
    ///
    /// The pool excludes ids already in `seen` and is deduplicated, keeping
    /// the first occurrence in genre order.
    async fn discovery_pool(
        &self,
        request: &AggregationRequest,
        seed_genres: &[u32],
        seen: &HashSet<u64>,
        ledger: &mut QueryLedger,
    ) -> Vec<Item> {
        let pages = self.draw_pages(seed_genres.len());

        let queries = seed_genres.iter().zip(pages).map(|(&genre_id, page)| {
            self.query(
                Tier::GenreDiscovery,
                self.provider.discover_by_genre(request.kind, genre_id, page),
            )
        });
        let responses = join_all(queries).await;

        let mut pool_ids = HashSet::new();
        let mut pool = Vec::new();
        for response in responses {
            ledger.record(&response);
            if let Ok(set) = response {
                for item in set.items {
                    if !seen.contains(&item.id) && pool_ids.insert(item.id) {
                        pool.push(item);
                    }
                }
            }
        }

        pool
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn draw_pages(&self, count: usize) -> Vec<u32> {
        let mut rng = self.lock_rng();
        (0..count)
            .map(|_| rng.random_range(1..=MAX_DISCOVER_PAGE))
            .collect()
    }

    fn shuffle(&self, items: &mut [Item]) {
        items.shuffle(&mut *self.lock_rng());
    }
}

/// Drops repeated genre ids, keeping first occurrences in order
fn distinct_genres(genre_ids: Vec<u32>) -> Vec<u32> {
    let mut seen = HashSet::new();
    genre_ids.into_iter().filter(|g| seen.insert(*g)).collect()
}

fn meets_rating(item: &Item) -> bool {
    item.effective_rating() >= MIN_RATING
}

/// Appends rated, unseen items in upstream order. Returns how many were admitted.
fn admit_rated(retained: &mut Vec<Item>, seen: &mut HashSet<u64>, items: Vec<Item>) -> usize {
    let before = retained.len();
    for item in items {
        if meets_rating(&item) && seen.insert(item.id) {
            retained.push(item);
        }
    }
    retained.len() - before
}

/// Narrows the discovery pool to backfill candidates
///
/// Prefers rated titles with at least the pool's mean popularity; if that leaves
/// fewer than `needed`, drops the popularity condition but keeps the rating one.
/// Survivors must share a genre with the seed, so an empty seed genre set
/// admits nothing.
fn filter_backfill(pool: Vec<Item>, seed_genres: &[u32], needed: usize) -> Vec<Item> {
    if pool.is_empty() {
        return pool;
    }

    let mean_popularity = pool.iter().map(|i| i.popularity).sum::<f64>() / pool.len() as f64;

    let popular: Vec<Item> = pool
        .iter()
        .filter(|i| meets_rating(i) && i.popularity >= mean_popularity)
        .cloned()
        .collect();

    let candidates = if popular.len() < needed {
        tracing::debug!(
            popular = popular.len(),
            needed = needed,
            "Relaxing popularity filter for backfill"
        );
        pool.into_iter().filter(meets_rating).collect()
    } else {
        popular
    };

    candidates
        .into_iter()
        .filter(|i| i.shares_genre_with(seed_genres))
        .collect()
}
