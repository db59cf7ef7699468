//! Reconciliation of fetch outcomes against the fallback store.
//!
//! Per collection, independently:
//! - fetch succeeded: the fresh snapshot wins and is written through;
//! - fetch failed: the cached snapshot is adopted if one exists, otherwise
//!   the collection is empty and `Unavailable`.
//!
//! The cache is never read when the fetch succeeded.

use serde::{de::DeserializeOwned, Serialize};

use crate::fallback::{read_snapshot, write_snapshot, FallbackStore};
use crate::fetcher::{FetchError, FetchOutcome};
use crate::types::{Collection, CollectionKind, Dataset};

pub fn reconcile(outcome: FetchOutcome, store: &dyn FallbackStore) -> Dataset {
    reconcile_at(outcome, store, chrono::Utc::now().timestamp_millis())
}

/// Same as [`reconcile`] with an explicit write timestamp.
pub fn reconcile_at(outcome: FetchOutcome, store: &dyn FallbackStore, now_ms: i64) -> Dataset {
    Dataset {
        players: settle(CollectionKind::Leaderboard, outcome.leaderboard, store, now_ms),
        market: settle(CollectionKind::Market, outcome.market, store, now_ms),
    }
}

fn settle<T: Serialize + DeserializeOwned>(
    kind: CollectionKind,
    fetched: Result<Vec<T>, FetchError>,
    store: &dyn FallbackStore,
    now_ms: i64,
) -> Collection<T> {
    match fetched {
        Ok(items) => {
            if let Err(e) = write_snapshot(store, kind, &items, now_ms) {
                log::warn!("[reconcile] could not cache {kind}: {e:#}");
            }
            Collection::fresh(items)
        }
        Err(fetch_err) => match read_snapshot::<T>(store, kind) {
            Ok(Some(cached)) => {
                log::info!(
                    "[reconcile] {kind} fetch failed ({fetch_err}); using {} cached entries",
                    cached.items.len()
                );
                Collection::from_fallback(cached.items, cached.saved_at_ms)
            }
            Ok(None) => {
                log::warn!("[reconcile] {kind} fetch failed ({fetch_err}) and nothing is cached");
                Collection::unavailable()
            }
            Err(e) => {
                log::warn!("[reconcile] {kind} fetch failed ({fetch_err}); cache unreadable: {e:#}");
                Collection::unavailable()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::MemoryStore;
    use crate::types::{LoadStatus, MarketItem, Player, SnapshotOrigin};

    fn player(rank: u32, name: &str) -> Player {
        Player {
            rank,
            username: name.to_string(),
            level: rank,
            xp: 10 * rank as u64,
            gold: 5,
        }
    }

    fn items(n: usize) -> Vec<MarketItem> {
        (0..n)
            .map(|i| MarketItem {
                id: format!("it-{i}"),
                name: format!("Lure {i}"),
                kind: "lure".to_string(),
                description: "attracts fish".to_string(),
                cost: 100 + i as u64,
            })
            .collect()
    }

    fn down() -> FetchError {
        FetchError::Transport("connection refused".to_string())
    }

    #[test]
    fn test_fresh_data_written_through() {
        let store = MemoryStore::new();
        let outcome = FetchOutcome {
            leaderboard: Ok(vec![player(1, "ana")]),
            market: Ok(items(2)),
        };
        let data = reconcile_at(outcome, &store, 42);

        assert_eq!(data.players.status, LoadStatus::Ready);
        assert_eq!(data.players.origin, SnapshotOrigin::Fresh);
        assert_eq!(data.market.items.len(), 2);
        assert!(store.get("leaderboard").unwrap().is_some());
        assert!(store.get("market").unwrap().is_some());
    }

    #[test]
    fn test_failure_after_success_replays_cache_verbatim() {
        let store = MemoryStore::new();
        let players = vec![player(1, "ana"), player(2, "bo"), player(3, "cy")];
        reconcile_at(
            FetchOutcome {
                leaderboard: Ok(players.clone()),
                market: Ok(items(3)),
            },
            &store,
            1_000,
        );

        let data = reconcile_at(
            FetchOutcome {
                leaderboard: Err(down()),
                market: Err(FetchError::Status(503)),
            },
            &store,
            2_000,
        );

        assert_eq!(data.players.items, players);
        assert_eq!(data.players.status, LoadStatus::Ready);
        assert_eq!(data.players.origin, SnapshotOrigin::Fallback { saved_at_ms: 1_000 });
        assert_eq!(data.market.items, items(3));
        assert!(data.market.is_stale());
    }

    #[test]
    fn test_failure_without_cache_is_unavailable() {
        let store = MemoryStore::new();
        let data = reconcile_at(
            FetchOutcome {
                leaderboard: Err(down()),
                market: Ok(items(3)),
            },
            &store,
            5,
        );

        assert!(data.players.items.is_empty());
        assert_eq!(data.players.status, LoadStatus::Unavailable);
        assert_eq!(data.players.origin, SnapshotOrigin::Missing);
        assert_eq!(data.market.items.len(), 3);
        assert_eq!(data.market.status, LoadStatus::Ready);
        // the failed collection must not leave a cache entry behind
        assert!(store.get("leaderboard").unwrap().is_none());
    }

    #[test]
    fn test_success_ignores_existing_cache() {
        let store = MemoryStore::new();
        reconcile_at(
            FetchOutcome {
                leaderboard: Ok(vec![player(1, "old")]),
                market: Ok(items(1)),
            },
            &store,
            1,
        );
        let data = reconcile_at(
            FetchOutcome {
                leaderboard: Ok(vec![]),
                market: Ok(items(1)),
            },
            &store,
            2,
        );

        // zero fresh players stays zero; the cache is not consulted
        assert!(data.players.items.is_empty());
        assert_eq!(data.players.status, LoadStatus::Ready);
        assert_eq!(data.players.origin, SnapshotOrigin::Fresh);
    }

    #[test]
    fn test_corrupt_cache_counts_as_missing() {
        let store = MemoryStore::new();
        store.set("market", "garbage").unwrap();
        let data = reconcile_at(
            FetchOutcome {
                leaderboard: Ok(vec![]),
                market: Err(down()),
            },
            &store,
            1,
        );
        assert_eq!(data.market.status, LoadStatus::Unavailable);
    }
}
