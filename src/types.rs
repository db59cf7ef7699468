use serde::{Deserialize, Serialize};

/// One leaderboard row, in the order the backend ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub rank: u32,
    pub username: String,
    pub level: u32,
    pub xp: u64,
    pub gold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub cost: u64,
}

/// The two remote collections. Doubles as the fallback cache key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Leaderboard,
    Market,
}

impl CollectionKind {
    /// Key under which the last good snapshot is cached.
    pub fn cache_key(self) -> &'static str {
        match self {
            CollectionKind::Leaderboard => "leaderboard",
            CollectionKind::Market => "market",
        }
    }

    /// Field of the response body that carries the collection.
    pub fn body_field(self) -> &'static str {
        match self {
            CollectionKind::Leaderboard => "players",
            CollectionKind::Market => "items",
        }
    }

    pub fn endpoint_path(self) -> &'static str {
        match self {
            CollectionKind::Leaderboard => "leaderboard",
            CollectionKind::Market => "market",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cache_key())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    #[default]
    Pending,
    Ready,
    Unavailable,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkStatus {
    #[default]
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn from_online(online: bool) -> Self {
        if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == NetworkStatus::Online
    }
}

/// Where the authoritative copy of a collection came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SnapshotOrigin {
    Fresh,
    Fallback { saved_at_ms: i64 },
    Missing,
}

/// Authoritative copy of one collection after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub status: LoadStatus,
    pub origin: SnapshotOrigin,
}

impl<T> Collection<T> {
    pub fn pending() -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::Pending,
            origin: SnapshotOrigin::Missing,
        }
    }

    pub fn fresh(items: Vec<T>) -> Self {
        Self {
            items,
            status: LoadStatus::Ready,
            origin: SnapshotOrigin::Fresh,
        }
    }

    pub fn from_fallback(items: Vec<T>, saved_at_ms: i64) -> Self {
        Self {
            items,
            status: LoadStatus::Ready,
            origin: SnapshotOrigin::Fallback { saved_at_ms },
        }
    }

    pub fn unavailable() -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::Unavailable,
            origin: SnapshotOrigin::Missing,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self.origin, SnapshotOrigin::Fallback { .. })
    }

    /// When the replayed snapshot was written, if this came from the cache.
    pub fn saved_at_ms(&self) -> Option<i64> {
        match self.origin {
            SnapshotOrigin::Fallback { saved_at_ms } => Some(saved_at_ms),
            _ => None,
        }
    }
}

/// Both collections, each settled (fresh, fallback or unavailable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub players: Collection<Player>,
    pub market: Collection<MarketItem>,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Loaded(Dataset),
    Network(NetworkStatus),
}
