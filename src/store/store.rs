use crate::runtime::{NodeId, Runtime};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

struct StoreInner<T> {
    id: NodeId,
    state: RwLock<Arc<T>>,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber<T>)>>,
    next_subscription: AtomicUsize,
    runtime: Runtime,
}

impl<T> Drop for StoreInner<T> {
    fn drop(&mut self) {
        self.runtime.remove(self.id);
    }
}

/// A thread-safe store for managing a view's state record.
///
/// Stores provide a higher-level abstraction over signals for managing
/// a whole record at once. Clones share the same state.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(runtime: &Runtime, initial: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                id: runtime.next_id(),
                state: RwLock::new(Arc::new(initial)),
                subscribers: RwLock::new(Vec::new()),
                next_subscription: AtomicUsize::new(0),
                runtime: runtime.clone(),
            }),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        self.inner.runtime.track_read(self.inner.id);
        (**self.inner.state.read()).clone()
    }

    /// Read part of the state without cloning the whole record.
    ///
    /// No lock is held while `f` runs, so `f` may update the store.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.runtime.track_read(self.inner.id);
        let state = Arc::clone(&self.inner.state.read());
        f(&*state)
    }

    /// Read state without registering a dependency.
    pub fn peek<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = Arc::clone(&self.inner.state.read());
        f(&*state)
    }

    /// Update the state using a function.
    ///
    /// `f` runs under the write lock and must not read the store.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        {
            let mut state = self.inner.state.write();
            f(Arc::make_mut(&mut state));
        }
        self.notify();
    }

    /// Update the state through a fallible function.
    ///
    /// `f` works on a copy of the state; the copy is committed and
    /// subscribers notified only if `f` returns `Ok`.
    pub fn try_update<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let mut draft = (**self.inner.state.read()).clone();
        let out = f(&mut draft)?;
        *self.inner.state.write() = Arc::new(draft);
        self.notify();
        Ok(out)
    }

    /// Set a new state value.
    pub fn set(&self, new_state: T) {
        *self.inner.state.write() = Arc::new(new_state);
        self.notify();
    }

    /// Subscribe to state changes.
    ///
    /// The callback will be called with the new state after every
    /// committed change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.inner
            .subscribers
            .write()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Notify subscribers and dependents of a state change.
    fn notify(&self) {
        let snapshot = Arc::clone(&self.inner.state.read());
        let subscribers: Vec<Subscriber<T>> = self
            .inner
            .subscribers
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for subscriber in subscribers {
            subscriber(&*snapshot);
        }
        self.inner.runtime.notify(self.inner.id);
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("state", &**self.inner.state.read())
            .field("subscribers", &self.inner.subscribers.read().len())
            .finish()
    }
}
