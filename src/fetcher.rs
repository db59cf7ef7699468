//! Remote data fetcher for the leaderboard and market collections.
//!
//! Both GETs are issued together and joined with an all-settled barrier:
//! each collection gets its own `Result`, and a failure on one never
//! cancels or delays the other. Nothing here retries.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

use crate::types::{CollectionKind, MarketItem, Player};

/// Why one collection could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    Transport(String),
    /// Server answered with a non-success status.
    Status(u16),
    /// Body was not JSON, or the collection field had the wrong shape.
    Malformed(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "transport error: {e}"),
            FetchError::Status(code) => write!(f, "server returned HTTP {code}"),
            FetchError::Malformed(e) => write!(f, "malformed payload: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Settled results of one fetch round.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub leaderboard: Result<Vec<Player>, FetchError>,
    pub market: Result<Vec<MarketItem>, FetchError>,
}

/// Something that can produce both collections. The HTTP implementation is
/// [`HttpSource`]; tests plug in canned outcomes.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait DataSource {
    async fn fetch_all(&self) -> FetchOutcome;
}

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            reqwest::Client::builder()
                .pool_max_idle_per_host(4)
                .tcp_nodelay(true)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new())
        }

        #[cfg(target_arch = "wasm32")]
        {
            reqwest::Client::new()
        }
    })
}

/// Pull the collection out of a response body.
///
/// A missing (or `null`) field is a soft shape failure and yields an empty
/// sequence. A field that is present but does not decode is an error.
pub fn normalize_collection<T: DeserializeOwned>(
    mut body: Value,
    field: &str,
) -> Result<Vec<T>, FetchError> {
    match body.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => {
            log::warn!("[fetch] response has no '{field}' field, using empty list");
            Ok(Vec::new())
        }
        Some(v) => serde_json::from_value(v)
            .map_err(|e| FetchError::Malformed(format!("'{field}': {e}"))),
    }
}

pub struct HttpSource {
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpSource {
    /// `base_url` is the API root, e.g. `https://api-game.bloque.app/game`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Transport-level timeout. Unset by default, so a hung endpoint keeps
    /// the dashboard pending.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self, kind: CollectionKind) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            kind.endpoint_path()
        )
    }

    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        kind: CollectionKind,
    ) -> Result<Vec<T>, FetchError> {
        let url = self.endpoint(kind);
        log::info!("[fetch] GET {url}");

        #[allow(unused_mut)]
        let mut request = http_client().get(&url);
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let body: Value =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))?;

        normalize_collection(body, kind.body_field())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl DataSource for HttpSource {
    async fn fetch_all(&self) -> FetchOutcome {
        let (leaderboard, market) = futures::join!(
            self.fetch_collection::<Player>(CollectionKind::Leaderboard),
            self.fetch_collection::<MarketItem>(CollectionKind::Market),
        );

        match &leaderboard {
            Ok(players) => log::info!("[fetch] leaderboard: {} players", players.len()),
            Err(e) => log::warn!("[fetch] leaderboard failed: {e}"),
        }
        match &market {
            Ok(items) => log::info!("[fetch] market: {} items", items.len()),
            Err(e) => log::warn!("[fetch] market failed: {e}"),
        }

        FetchOutcome {
            leaderboard,
            market,
        }
    }
}
