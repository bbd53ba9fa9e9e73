//! Notification bus with scoped subscriptions.
//!
//! The host application announces lifecycle events (document loaded, dialog
//! shown, dialog closed) as named notifications on a shared bus. This module
//! models that bus as an explicit publish-subscribe registry: the host's
//! delivery callback calls [`EventBus::publish`] (from whatever thread the
//! host uses), and the engine opens an [`EventScope`] for the duration of
//! each wait.
//!
//! A scope records a single fact: whether any of its subscribed names has
//! fired. The flag is an [`AtomicBool`] written by the publishing side and
//! read by the polling side; it transitions only false→true and is never
//! reset, so a plain atomic load is all the synchronization the reader
//! needs. Each wait opens a fresh scope.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use uisync_core::bus::EventBus;
//!
//! let bus = Arc::new(EventBus::new());
//! let scope = bus.subscribe(["OnLoad", "OnNew"], false);
//! assert!(!scope.fired());
//!
//! bus.publish("OnNew");
//! assert!(scope.fired());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, trace};

/// Registry entry for one live subscription.
///
/// Holds only a weak reference to the scope's flag: the scope owns the
/// subscription, the bus merely delivers into it while it exists.
struct Subscriber {
    id: u64,
    names: Vec<String>,
    fired: Weak<AtomicBool>,
    log_all: bool,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Subscriber>,
}

/// Shared notification bus.
///
/// Created once per test context and passed by reference everywhere; there
/// is deliberately no global instance. `publish` is safe to call from any
/// thread.
#[derive(Default)]
pub struct EventBus {
    registry: Mutex<Registry>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in one or more event names for the lifetime of
    /// the returned scope.
    ///
    /// With `log_all` set, every event observed on the bus while the scope
    /// is attached is logged, whether or not it matches a subscribed name.
    pub fn subscribe<I, S>(self: &Arc<Self>, names: I, log_all: bool) -> EventScope
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let fired = Arc::new(AtomicBool::new(false));

        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push(Subscriber {
            id,
            names: names.clone(),
            fired: Arc::downgrade(&fired),
            log_all,
        });
        drop(registry);

        trace!(subscription = id, ?names, "subscribed");
        EventScope {
            bus: Arc::downgrade(self),
            id,
            names,
            fired,
        }
    }

    /// Delivers a named event to every live subscription.
    ///
    /// Matching subscriptions have their `fired` flag set; the flag is
    /// write-once per scope. Entries whose scope is already gone are pruned.
    pub fn publish(&self, name: &str) {
        let mut registry = self.lock();
        registry.entries.retain(|entry| {
            let Some(fired) = entry.fired.upgrade() else {
                return false;
            };
            if entry.log_all {
                debug!(subscription = entry.id, event = name, "event received");
            }
            if entry.names.iter().any(|n| n == name) {
                fired.store(true, Ordering::SeqCst);
            }
            true
        });
    }

    /// Number of currently attached subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut registry = self.lock();
        registry.entries.retain(|entry| entry.fired.strong_count() > 0);
        registry.entries.len()
    }

    fn unsubscribe(&self, id: u64) {
        let mut registry = self.lock();
        registry.entries.retain(|entry| entry.id != id);
        trace!(subscription = id, "unsubscribed");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A scoped subscription to one or more named events.
///
/// The scope exclusively owns the subscription; dropping it detaches from
/// the bus on every exit path, normal or failed.
pub struct EventScope {
    bus: Weak<EventBus>,
    id: u64,
    names: Vec<String>,
    fired: Arc<AtomicBool>,
}

impl EventScope {
    /// Whether any subscribed event has fired since the scope was opened.
    ///
    /// Once true, stays true for the life of the scope.
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// The event names this scope is subscribed to.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Drop for EventScope {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}
