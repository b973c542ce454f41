//! Observable value container.
//!
//! A [`Store`] holds one value and a list of observers. Every mutation goes
//! through [`Store::update`] (or [`Store::set`]), and every observer is called
//! with the new value after each mutation.
//!
//! Each mutation bumps a version. An observer is only called with a version
//! newer than the last one it saw, so concurrent updates never reach it out
//! of order and its first call is always the value current at subscription
//! or later.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

struct Slot<T> {
    value: T,
    version: u64,
}

struct Entry<T> {
    id: u64,
    observer: Box<dyn Fn(&T) + Send + Sync>,
    seen: AtomicU64,
}

impl<T> Entry<T> {
    /// Call the observer unless it already saw `version` or a newer one.
    fn deliver(&self, version: u64, value: &T) -> bool {
        if self.seen.fetch_max(version, Ordering::SeqCst) >= version {
            return false;
        }
        (self.observer)(value);
        true
    }
}

struct Inner<T> {
    slot: Mutex<Slot<T>>,
    observers: Mutex<Vec<Arc<Entry<T>>>>,
    next_id: AtomicU64,
}

/// Shared, observable value. Clones refer to the same value.
pub struct Store<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Locks ignore poisoning: a panicking observer must not wedge the store.
fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl<T: Clone + Send + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot { value, version: 1 }),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        lock(&self.inner.slot).value.clone()
    }

    /// Replace the value and notify observers.
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Mutate the value in place, then notify observers.
    ///
    /// The closure's return value is passed through, so callers can decide
    /// follow-up work from the state they saw. Observers run after the lock
    /// is released and may call back into the store.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let (result, version, snapshot) = {
            let mut slot = lock(&self.inner.slot);
            let result = f(&mut slot.value);
            slot.version += 1;
            (result, slot.version, slot.value.clone())
        };
        self.notify(version, &snapshot);
        result
    }

    /// Register an observer.
    ///
    /// The observer is called immediately with the current value and then
    /// after every update, until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(Entry {
            id,
            observer: Box::new(observer),
            seen: AtomicU64::new(0),
        });

        // Snapshot and registration happen under the value lock, so no
        // update can fall between them.
        let (version, snapshot) = {
            let slot = lock(&self.inner.slot);
            lock(&self.inner.observers).push(entry.clone());
            (slot.version, slot.value.clone())
        };
        entry.deliver(version, &snapshot);

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner.observers).retain(|other| other.id != id);
                }
            })),
        }
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }

    fn notify(&self, version: u64, value: &T) {
        let observers: Vec<Arc<Entry<T>>> = lock(&self.inner.observers).clone();
        for entry in observers {
            entry.deliver(version, value);
        }
    }
}

/// Handle returned by [`Store::subscribe`]; unsubscribes when dropped.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn cancel(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}
