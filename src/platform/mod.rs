//! Platform glue (logging setup per target).

#[cfg(feature = "native")]
mod native;
#[cfg(feature = "native")]
pub use native::init_logging;

#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
mod wasm;
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub use wasm::{init_logging, install_panic_hook};
