//! JS-facing façade for a DOM front end (wasm32 + dom-web).
//!
//! The page calls `load()` once, registers `onUpdate`, and re-renders from
//! `snapshotJson()` whenever it fires.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use wasm_bindgen::prelude::*;

use crate::connectivity::{NavigatorSource, NetworkMonitor};
use crate::dashboard::{apply_shared, load_dataset, DashEvent, LoadGuard, ViewState};
use crate::fallback::LocalStorageStore;
use crate::fetcher::HttpSource;
use crate::platform;
use crate::window::{NavIntent, WindowPolicy};

thread_local! {
    static ON_UPDATE: RefCell<Option<js_sys::Function>> = RefCell::new(None);
}

fn notify() {
    ON_UPDATE.with(|cb| {
        if let Some(f) = cb.borrow().as_ref() {
            let _ = f.call0(&JsValue::NULL);
        }
    });
}

#[wasm_bindgen]
pub struct Dashboard {
    state: Arc<Mutex<ViewState>>,
    api_base_url: String,
    load_guard: LoadGuard,
    _monitor: NetworkMonitor,
}

#[wasm_bindgen]
impl Dashboard {
    /// `window` is "paged" or "incremental"; `size` is page size or load step.
    #[wasm_bindgen(constructor)]
    pub fn new(api_base_url: String, window: &str, size: usize) -> Result<Dashboard, JsValue> {
        platform::install_panic_hook();
        platform::init_logging(log::Level::Info);

        let policy = match window {
            "paged" => WindowPolicy::paged(size),
            "incremental" => WindowPolicy::incremental(size),
            other => return Err(JsValue::from_str(&format!("unknown window policy '{other}'"))),
        };

        let monitor = NetworkMonitor::start(&NavigatorSource);
        let state = Arc::new(Mutex::new(ViewState::new(policy, monitor.current_status())));

        let net_state = Arc::clone(&state);
        monitor.on_change(move |status| {
            apply_shared(&net_state, DashEvent::Network(status));
            notify();
        });

        Ok(Dashboard {
            state,
            api_base_url,
            load_guard: LoadGuard::new(),
            _monitor: monitor,
        })
    }

    #[wasm_bindgen(js_name = onUpdate)]
    pub fn on_update(&self, callback: js_sys::Function) {
        ON_UPDATE.with(|cb| *cb.borrow_mut() = Some(callback));
    }

    /// Fetch and reconcile once. Later calls do nothing and return false.
    pub fn load(&self) -> bool {
        if !self.load_guard.try_begin() {
            log::debug!("[dash] load already started, ignoring");
            return false;
        }
        let state = Arc::clone(&self.state);
        let source = HttpSource::new(self.api_base_url.clone());
        wasm_bindgen_futures::spawn_local(async move {
            let store = LocalStorageStore::new("bloquedash");
            let data = load_dataset(&source, &store).await;
            apply_shared(&state, DashEvent::Reconciled(data));
            notify();
        });
        true
    }

    /// Returns false for an unknown intent.
    pub fn navigate(&self, intent: &str) -> bool {
        let Ok(intent) = intent.parse::<NavIntent>() else {
            return false;
        };
        apply_shared(&self.state, DashEvent::Navigate(intent));
        notify();
        true
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> String {
        self.state
            .lock()
            .ok()
            .and_then(|s| serde_json::to_string(&s.view()).ok())
            .unwrap_or_else(|| "null".to_string())
    }
}
