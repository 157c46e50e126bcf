//! Observer registry with per-callback failure isolation.
//!
//! Both the connection manager and the status poller fan events out to
//! caller-supplied handlers. This module owns the bookkeeping:
//!
//! - [`Registry`] maps an event key to an ordered list of handlers
//! - [`Subscription`] removes exactly one handler when unsubscribed
//! - [`isolate`] runs a single handler so that a panic is logged and
//!   contained instead of unwinding through the dispatcher
//!
//! Dispatch always works on a snapshot taken from [`Registry::handlers`],
//! so the registry lock is never held while user code runs and handlers
//! may freely subscribe or unsubscribe from inside a callback.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::error;

use crate::identifiers::SubscriptionId;

// ============================================================================
// Types
// ============================================================================

/// Handler lists keyed by event.
type Slots<K, H> = FxHashMap<K, Vec<(SubscriptionId, Arc<H>)>>;

// ============================================================================
// Subscription
// ============================================================================

/// Handle for one registered handler.
///
/// Call [`Subscription::unsubscribe`] to remove the handler. Dropping the
/// handle leaves the handler registered for the lifetime of its owner.
#[must_use = "dropping a Subscription keeps the handler registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(id: SubscriptionId, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the handler from its registry.
    ///
    /// Harmless if the owning component has already been dropped.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Mapping from event key to an ordered set of handlers.
///
/// Use `()` as the key for un-keyed subscriber sets.
pub struct Registry<K, H: ?Sized> {
    slots: Arc<Mutex<Slots<K, H>>>,
}

impl<K, H: ?Sized> Default for Registry<K, H> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }
}

impl<K, H> Registry<K, H>
where
    K: Eq + Hash + Clone + Send + 'static,
    H: ?Sized + Send + Sync + 'static,
{
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `key`.
    ///
    /// Handlers run in registration order.
    pub fn subscribe(&self, key: K, handler: Arc<H>) -> Subscription {
        let id = SubscriptionId::next();
        self.slots
            .lock()
            .entry(key.clone())
            .or_default()
            .push((id, handler));

        let slots = Arc::downgrade(&self.slots);
        Subscription::new(id, move || {
            let Some(slots) = slots.upgrade() else {
                return;
            };
            let mut slots = slots.lock();
            if let Some(list) = slots.get_mut(&key) {
                list.retain(|(existing, _)| *existing != id);
                if list.is_empty() {
                    slots.remove(&key);
                }
            }
        })
    }

    /// Returns a snapshot of the handlers registered under `key`.
    #[must_use]
    pub fn handlers(&self, key: &K) -> Vec<Arc<H>> {
        self.slots
            .lock()
            .get(key)
            .map(|list| list.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default()
    }

    /// Returns the number of handlers registered under `key`.
    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        self.slots.lock().get(key).map_or(0, Vec::len)
    }
}

// ============================================================================
// Failure Isolation
// ============================================================================

/// Runs one subscriber callback, containing any panic.
///
/// Returns `false` if the callback panicked. The panic is logged with
/// `context` so the failing subscriber set can be identified.
pub(crate) fn isolate(context: &str, callback: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(()) => true,
        Err(payload) => {
            error!(
                context,
                panic = panic_message(payload.as_ref()),
                "Subscriber callback panicked"
            );
            false
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

// ============================================================================
// Tests
// ============================================================================
