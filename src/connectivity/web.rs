//! Browser connectivity: `navigator.onLine` plus window `online`/`offline` events.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use super::{attach_all, ConnectivitySource, StatusCallback, Subscription};
use crate::types::NetworkStatus;

type Listener = Closure<dyn FnMut(web_sys::Event)>;

thread_local! {
    // JS closures are !Send; keep them here and let the Subscription hold only the id.
    static LISTENERS: RefCell<HashMap<u64, (Listener, Listener)>> = RefCell::new(HashMap::new());
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Default, Clone, Copy)]
pub struct NavigatorSource;

impl ConnectivitySource for NavigatorSource {
    fn current(&self) -> Option<NetworkStatus> {
        let window = web_sys::window()?;
        Some(NetworkStatus::from_online(window.navigator().on_line()))
    }

    fn subscribe(&self, callback: StatusCallback) -> Subscription {
        let Some(window) = web_sys::window() else {
            return Subscription::noop();
        };
        let callback = Rc::new(callback);

        let cb_online = Rc::clone(&callback);
        let on_online: Listener = Closure::wrap(Box::new(move |_e: web_sys::Event| {
            (cb_online.as_ref())(NetworkStatus::Online);
        }) as Box<dyn FnMut(web_sys::Event)>);
        let cb_offline = Rc::clone(&callback);
        let on_offline: Listener = Closure::wrap(Box::new(move |_e: web_sys::Event| {
            (cb_offline.as_ref())(NetworkStatus::Offline);
        }) as Box<dyn FnMut(web_sys::Event)>);

        let online_fn: &js_sys::Function = on_online.as_ref().unchecked_ref();
        let offline_fn: &js_sys::Function = on_offline.as_ref().unchecked_ref();
        let listener_for = |event: &str| if event == "online" { online_fn } else { offline_fn };
        let added = attach_all(
            &["online", "offline"],
            |event| window.add_event_listener_with_callback(event, listener_for(event)),
            |event| {
                let _ = window.remove_event_listener_with_callback(event, listener_for(event));
            },
        );
        if let Err(e) = added {
            log::warn!("[net] could not attach online/offline listeners: {e:?}");
            return Subscription::noop();
        }

        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        LISTENERS.with(|l| l.borrow_mut().insert(id, (on_online, on_offline)));

        Subscription::new(move || {
            let Some((on_online, on_offline)) = LISTENERS.with(|l| l.borrow_mut().remove(&id))
            else {
                return;
            };
            if let Some(window) = web_sys::window() {
                let _ = window.remove_event_listener_with_callback(
                    "online",
                    on_online.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "offline",
                    on_offline.as_ref().unchecked_ref(),
                );
            }
        })
    }
}
