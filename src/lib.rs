//! Bloque Dashboard - Galactic-Fishing leaderboard & market viewer
//!
//! This library is the data layer behind a read-only dashboard: it fetches
//! the leaderboard and market collections from the game API, reconciles them
//! with a persistent fallback cache, tracks network availability and
//! projects the visible leaderboard window.
//!
//! ## Architecture
//!
//! - **Native**: terminal UI using crossterm and ratatui, SQLite fallback cache
//! - **Web**: `wasm_api` façade for a DOM front end, localStorage fallback cache
//!
//! ## Usage
//!
//! For native builds:
//! ```bash
//! cargo build --features native
//! ```
//!
//! For web builds:
//! ```bash
//! cargo build --target wasm32-unknown-unknown --no-default-features --features dom-web
//! ```

// Core modules (available on all platforms)
pub mod config;
pub mod types;
pub mod window;

// Data acquisition and reconciliation
pub mod connectivity;
pub mod fallback;
pub mod fetcher;
pub mod reconcile;

// View state owned by one controller
pub mod dashboard;

// Platform abstraction layer (logging setup)
pub mod platform;

// Terminal renderer (native-only)
#[cfg(feature = "native")]
pub mod ui;

// WASM-facing exports (JS -> Rust) are only built on wasm32.
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub mod wasm_api;

// Re-export commonly used types
pub use config::{Config, WindowMode};
pub use dashboard::{DashEvent, ViewModel, ViewState};
pub use types::{AppEvent, Dataset, LoadStatus, MarketItem, NetworkStatus, Player};
pub use window::{NavIntent, WindowPolicy};
