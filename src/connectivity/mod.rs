//! Network availability tracking.
//!
//! A [`ConnectivitySource`] wraps whatever online/offline signal the platform
//! offers. [`NetworkMonitor`] samples it once on start, then follows its
//! notifications for as long as the monitor is alive. Nothing here polls and
//! nothing here touches fetched data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::types::NetworkStatus;

#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
mod web;
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub use web::NavigatorSource;

pub type StatusCallback = Box<dyn Fn(NetworkStatus) + Send + Sync>;

/// Handle returned by [`ConnectivitySource::subscribe`]. Unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

/// Platform connectivity signal.
pub trait ConnectivitySource: Send + Sync {
    /// Current reading, or `None` when the platform has no such signal.
    fn current(&self) -> Option<NetworkStatus>;

    fn subscribe(&self, callback: StatusCallback) -> Subscription;
}

/// Source for platforms without a connectivity signal (terminals, servers).
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSource;

impl ConnectivitySource for StaticSource {
    fn current(&self) -> Option<NetworkStatus> {
        None
    }

    fn subscribe(&self, _callback: StatusCallback) -> Subscription {
        Subscription::noop()
    }
}

/// Attach one listener per event, in order. On the first failure the ones
/// already attached are detached again, newest first.
#[cfg_attr(not(all(target_arch = "wasm32", feature = "dom-web")), allow(dead_code))]
pub(crate) fn attach_all<E>(
    events: &[&'static str],
    mut attach: impl FnMut(&'static str) -> Result<(), E>,
    mut detach: impl FnMut(&'static str),
) -> Result<(), E> {
    for (i, event) in events.iter().enumerate() {
        if let Err(e) = attach(*event) {
            for done in events[..i].iter().rev() {
                detach(*done);
            }
            return Err(e);
        }
    }
    Ok(())
}

type CallbackList = Arc<Mutex<Vec<(u64, Arc<StatusCallback>)>>>;

fn fan_out(list: &CallbackList, status: NetworkStatus) {
    // Snapshot first so callbacks may (un)subscribe without deadlocking.
    let callbacks: Vec<Arc<StatusCallback>> = list
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|(_, cb)| Arc::clone(cb))
        .collect();
    for cb in callbacks {
        (cb.as_ref())(status);
    }
}

/// Manually driven source. Each `set` notifies every subscriber.
#[derive(Clone, Default)]
pub struct ManualSource {
    status: Arc<Mutex<Option<NetworkStatus>>>,
    subscribers: CallbackList,
    next_id: Arc<AtomicU64>,
}

impl ManualSource {
    pub fn new(initial: NetworkStatus) -> Self {
        Self {
            status: Arc::new(Mutex::new(Some(initial))),
            ..Self::default()
        }
    }

    pub fn set(&self, status: NetworkStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = Some(status);
        }
        fan_out(&self.subscribers, status);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl ConnectivitySource for ManualSource {
    fn current(&self) -> Option<NetworkStatus> {
        self.status.lock().ok().and_then(|s| *s)
    }

    fn subscribe(&self, callback: StatusCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push((id, Arc::new(callback)));
        }
        let subscribers = Arc::clone(&self.subscribers);
        Subscription::new(move || {
            if let Ok(mut subs) = subscribers.lock() {
                subs.retain(|(sid, _)| *sid != id);
            }
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Tracks online/offline for one dashboard session.
pub struct NetworkMonitor {
    // None until the first sample or notification lands.
    status: Arc<Mutex<Option<NetworkStatus>>>,
    listeners: CallbackList,
    next_id: AtomicU64,
    _subscription: Subscription,
}

impl NetworkMonitor {
    /// Follow `source` and sample it once. The subscription is taken before
    /// the sample, so a transition in between is not lost. A source without
    /// a signal leaves the monitor Online for good.
    pub fn start(source: &dyn ConnectivitySource) -> Self {
        let status: Arc<Mutex<Option<NetworkStatus>>> = Arc::new(Mutex::new(None));
        let listeners: CallbackList = Arc::new(Mutex::new(Vec::new()));

        let subscription = {
            let status = Arc::clone(&status);
            let listeners = Arc::clone(&listeners);
            source.subscribe(Box::new(move |next| {
                let changed = {
                    let mut cur = status.lock().unwrap_or_else(PoisonError::into_inner);
                    let changed = *cur != Some(next);
                    *cur = Some(next);
                    changed
                };
                if changed {
                    log::info!("[net] status -> {next:?}");
                    fan_out(&listeners, next);
                }
            }))
        };

        let (initial, subscription) = match source.current() {
            Some(sampled) => {
                // A notification that raced the sample is newer; keep it.
                let mut cur = status.lock().unwrap_or_else(PoisonError::into_inner);
                let initial = *cur.get_or_insert(sampled);
                (initial, subscription)
            }
            None => {
                log::debug!("[net] no connectivity signal; assuming online");
                drop(subscription);
                let mut cur = status.lock().unwrap_or_else(PoisonError::into_inner);
                *cur = Some(NetworkStatus::Online);
                (NetworkStatus::Online, Subscription::noop())
            }
        };

        log::info!("[net] monitor started ({initial:?})");
        Self {
            status,
            listeners,
            next_id: AtomicU64::new(0),
            _subscription: subscription,
        }
    }

    pub fn current_status(&self) -> NetworkStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or_default()
    }

    /// Register a listener for transitions. Repeated reports of the same
    /// status are not forwarded.
    pub fn on_change(&self, listener: impl Fn(NetworkStatus) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cb: StatusCallback = Box::new(listener);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(cb)));
        ListenerId(id)
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(lid, _)| *lid != id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[test]
    fn test_static_source_is_always_online() {
        let monitor = NetworkMonitor::start(&StaticSource);
        assert_eq!(monitor.current_status(), NetworkStatus::Online);
    }

    #[test]
    fn test_initial_sample_is_used() {
        let source = ManualSource::new(NetworkStatus::Offline);
        let monitor = NetworkMonitor::start(&source);
        assert_eq!(monitor.current_status(), NetworkStatus::Offline);
    }

    #[test]
    fn test_transitions_reach_listeners_once() {
        let source = ManualSource::new(NetworkStatus::Online);
        let monitor = NetworkMonitor::start(&source);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        monitor.on_change(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        source.set(NetworkStatus::Online); // no transition
        source.set(NetworkStatus::Offline);
        source.set(NetworkStatus::Offline); // duplicate
        source.set(NetworkStatus::Online);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(monitor.current_status(), NetworkStatus::Online);
    }

    #[test]
    fn test_removed_listener_is_silent() {
        let source = ManualSource::new(NetworkStatus::Online);
        let monitor = NetworkMonitor::start(&source);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let id = monitor.on_change(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        monitor.remove_listener(id);

        source.set(NetworkStatus::Offline);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(monitor.current_status(), NetworkStatus::Offline);
    }

    /// Flips the platform to Offline right after the first sample is taken.
    struct FlipsAfterSample {
        inner: ManualSource,
        sampled: AtomicBool,
    }

    impl ConnectivitySource for FlipsAfterSample {
        fn current(&self) -> Option<NetworkStatus> {
            let reading = self.inner.current();
            if !self.sampled.swap(true, Ordering::SeqCst) {
                self.inner.set(NetworkStatus::Offline);
            }
            reading
        }

        fn subscribe(&self, callback: StatusCallback) -> Subscription {
            self.inner.subscribe(callback)
        }
    }

    #[test]
    fn test_transition_during_start_is_kept() {
        let source = FlipsAfterSample {
            inner: ManualSource::new(NetworkStatus::Online),
            sampled: AtomicBool::new(false),
        };
        let monitor = NetworkMonitor::start(&source);
        assert_eq!(source.inner.current(), Some(NetworkStatus::Offline));
        assert_eq!(monitor.current_status(), NetworkStatus::Offline);
    }

    #[test]
    fn test_no_signal_holds_no_subscription() {
        let source = ManualSource::default();
        let monitor = NetworkMonitor::start(&source);
        assert_eq!(monitor.current_status(), NetworkStatus::Online);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_listener_runs_after_poisoned_list() {
        let source = ManualSource::new(NetworkStatus::Online);
        let monitor = NetworkMonitor::start(&source);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        monitor.on_change(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let listeners = Arc::clone(&monitor.listeners);
        let _ = std::thread::spawn(move || {
            let _guard = listeners.lock().unwrap();
            panic!("poison");
        })
        .join();

        source.set(NetworkStatus::Offline);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_attach_detaches_earlier_listeners() {
        let attached = std::cell::RefCell::new(Vec::new());
        let result = attach_all(
            &["online", "offline"],
            |event| {
                if event == "offline" {
                    return Err("refused");
                }
                attached.borrow_mut().push(event);
                Ok(())
            },
            |event| attached.borrow_mut().retain(|e| *e != event),
        );
        assert_eq!(result, Err("refused"));
        assert!(attached.borrow().is_empty());
    }

    #[test]
    fn test_attach_all_keeps_listeners_on_success() {
        let mut attached = Vec::new();
        let result: Result<(), ()> = attach_all(
            &["online", "offline"],
            |event| {
                attached.push(event);
                Ok(())
            },
            |_| {},
        );
        assert!(result.is_ok());
        assert_eq!(attached, vec!["online", "offline"]);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let source = ManualSource::new(NetworkStatus::Online);
        let monitor = NetworkMonitor::start(&source);
        assert_eq!(source.subscriber_count(), 1);
        drop(monitor);
        assert_eq!(source.subscriber_count(), 0);
    }
}
