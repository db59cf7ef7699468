//! Dashboard controller: one serializable view-state record plus the pure
//! transitions that move it forward.
//!
//! Everything with side effects (fetching, cache I/O, connectivity) happens
//! outside and arrives here as a [`DashEvent`].

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::fallback::FallbackStore;
use crate::fetcher::DataSource;
use crate::reconcile::reconcile;
use crate::types::{Collection, Dataset, LoadStatus, MarketItem, NetworkStatus, Player};
use crate::window::{NavIntent, WindowInfo, WindowPolicy};

#[derive(Debug, Clone)]
pub enum DashEvent {
    Reconciled(Dataset),
    Network(NetworkStatus),
    Navigate(NavIntent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub load: LoadStatus,
    pub players: Collection<Player>,
    pub market: Collection<MarketItem>,
    pub network: NetworkStatus,
    pub window: WindowPolicy,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(WindowPolicy::default(), NetworkStatus::Online)
    }
}

/// What a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel<'a> {
    pub load_status: LoadStatus,
    pub network_status: NetworkStatus,
    pub players: &'a [Player],
    pub players_status: LoadStatus,
    pub players_stale: bool,
    pub players_saved_at_ms: Option<i64>,
    pub total_players: usize,
    pub market_items: &'a [MarketItem],
    pub market_status: LoadStatus,
    pub market_stale: bool,
    pub market_saved_at_ms: Option<i64>,
    pub window: WindowInfo,
}

impl ViewState {
    pub fn new(window: WindowPolicy, network: NetworkStatus) -> Self {
        Self {
            load: LoadStatus::Pending,
            players: Collection::pending(),
            market: Collection::pending(),
            network,
            window,
        }
    }

    pub fn apply(self, event: DashEvent) -> Self {
        match event {
            DashEvent::Reconciled(data) => {
                // One reconciliation per session; a late duplicate is dropped.
                if self.load != LoadStatus::Pending {
                    log::debug!("[dash] dataset already applied, ignoring");
                    return self;
                }
                Self {
                    load: LoadStatus::Ready,
                    players: data.players,
                    market: data.market,
                    ..self
                }
            }
            DashEvent::Network(network) => Self { network, ..self },
            DashEvent::Navigate(intent) => {
                let window = self.window.apply(intent, self.players.items.len());
                Self { window, ..self }
            }
        }
    }

    pub fn view(&self) -> ViewModel<'_> {
        let len = self.players.items.len();
        ViewModel {
            load_status: self.load,
            network_status: self.network,
            players: self.window.visible(&self.players.items),
            players_status: self.players.status,
            players_stale: self.players.is_stale(),
            players_saved_at_ms: self.players.saved_at_ms(),
            total_players: len,
            market_items: &self.market.items,
            market_status: self.market.status,
            market_stale: self.market.is_stale(),
            market_saved_at_ms: self.market.saved_at_ms(),
            window: self.window.info(len),
        }
    }
}

/// Apply `event` to a shared state in place. A poisoned lock still holds a
/// whole `ViewState` (transitions are pure), so it is recovered.
pub fn apply_shared(state: &Mutex<ViewState>, event: DashEvent) {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    let current = std::mem::take(&mut *guard);
    *guard = current.apply(event);
}

/// One fetch-and-reconcile per session. Front ends take the guard before
/// starting a load; every later attempt gets `false` and must do nothing.
#[derive(Debug, Default)]
pub struct LoadGuard(AtomicBool);

impl LoadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn started(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fetch both collections, wait for both to settle, then reconcile.
pub async fn load_dataset<S: DataSource + ?Sized>(source: &S, store: &dyn FallbackStore) -> Dataset {
    let outcome = source.fetch_all().await;
    reconcile(outcome, store)
}
