use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use crate::signal::{Effect, Memo, Signal};
use crate::store::Store;

/// Identifier of a node (signal, memo, effect or store) in a runtime's graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type EffectFn = Arc<dyn Fn() + Send + Sync>;

/// Dependency bookkeeping for one runtime.
#[derive(Default)]
struct Graph {
    // observer running on each thread; reads from other threads are not its
    current_observer: HashMap<ThreadId, NodeId>,
    // source -> observers that read it during their last run
    subscribers: HashMap<NodeId, HashSet<NodeId>>,
    // observer -> sources it read during its last run
    sources: HashMap<NodeId, HashSet<NodeId>>,
    effects: HashMap<NodeId, EffectFn>,
    memo_dirty: HashMap<NodeId, bool>,
    running: HashSet<NodeId>,
}

impl Graph {
    fn observer(&self) -> Option<NodeId> {
        self.current_observer.get(&thread::current().id()).copied()
    }

    fn set_observer(&mut self, observer: Option<NodeId>) -> Option<NodeId> {
        let thread = thread::current().id();
        match observer {
            Some(id) => self.current_observer.insert(thread, id),
            None => self.current_observer.remove(&thread),
        }
    }

    /// Mark every memo downstream of `source` dirty and return the effects
    /// that must re-run, each once, in creation order.
    fn invalidate(&mut self, source: NodeId) -> Vec<NodeId> {
        let mut pending: Vec<NodeId> = self
            .subscribers
            .get(&source)
            .map(|obs| obs.iter().copied().collect())
            .unwrap_or_default();
        let mut effects = Vec::new();

        while let Some(observer) = pending.pop() {
            if let Some(dirty) = self.memo_dirty.get_mut(&observer) {
                if *dirty {
                    continue;
                }
                *dirty = true;
                if let Some(dependents) = self.subscribers.get(&observer) {
                    pending.extend(dependents.iter().copied());
                }
            } else if self.effects.contains_key(&observer) {
                effects.push(observer);
            }
        }

        effects.sort_unstable();
        effects.dedup();
        effects
    }

    fn unlink_sources(&mut self, observer: NodeId) {
        if let Some(old) = self.sources.remove(&observer) {
            for source in old {
                if let Some(subs) = self.subscribers.get_mut(&source) {
                    subs.remove(&observer);
                    if subs.is_empty() {
                        self.subscribers.remove(&source);
                    }
                }
            }
        }
    }

    /// Returns the node's effect closure so the caller can drop it after
    /// releasing the lock; the closure may own primitives of this runtime.
    fn remove_node(&mut self, id: NodeId) -> Option<EffectFn> {
        self.unlink_sources(id);
        if let Some(observers) = self.subscribers.remove(&id) {
            for observer in observers {
                if let Some(sources) = self.sources.get_mut(&observer) {
                    sources.remove(&id);
                }
            }
        }
        self.memo_dirty.remove(&id);
        self.effects.remove(&id)
    }
}

pub(crate) struct RuntimeInner {
    next_id: AtomicUsize,
    graph: Mutex<Graph>,
}

/// Handle to a reactive dependency graph.
///
/// Cloning a `Runtime` yields another handle to the same graph. Primitives
/// created from a runtime register themselves in its graph and unregister
/// when dropped.
///
/// # Examples
///
/// ```
/// use stateview::Runtime;
///
/// let rt = Runtime::new();
/// let count = rt.signal(2);
/// let doubled = rt.memo({
///     let count = count.clone();
///     move || count.get() * 2
/// });
///
/// assert_eq!(doubled.get(), 4);
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

/// Non-owning runtime handle held by primitives that must not keep the
/// graph alive (effects).
#[derive(Clone)]
pub(crate) struct WeakRuntime(Weak<RuntimeInner>);

impl WeakRuntime {
    pub(crate) fn upgrade(&self) -> Option<Runtime> {
        self.0.upgrade().map(|inner| Runtime { inner })
    }
}

/// Restores the previous observer when a tracked run ends, even on panic.
struct ObserverGuard<'a> {
    runtime: &'a Runtime,
    prev: Option<NodeId>,
}

impl Drop for ObserverGuard<'_> {
    fn drop(&mut self) {
        self.runtime.inner.graph.lock().set_observer(self.prev);
    }
}

impl Runtime {
    /// Create a new, empty runtime.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RuntimeInner {
                next_id: AtomicUsize::new(0),
                graph: Mutex::new(Graph::default()),
            }),
        }
    }

    /// Create a signal in this runtime.
    pub fn signal<T>(&self, initial: T) -> Signal<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        Signal::new(self, initial)
    }

    /// Create a memo in this runtime.
    pub fn memo<T, F>(&self, compute: F) -> Memo<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Memo::new(self, compute)
    }

    /// Create an effect in this runtime. It runs once immediately.
    pub fn effect<F>(&self, effect: F) -> Effect
    where
        F: Fn() + Send + Sync + 'static,
    {
        Effect::new(self, effect)
    }

    /// Create a store in this runtime.
    pub fn store<T>(&self, initial: T) -> Store<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        Store::new(self, initial)
    }

    /// Run `f` without recording any reads against the current observer.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        let prev = self.inner.graph.lock().set_observer(None);
        let _guard = ObserverGuard {
            runtime: self,
            prev,
        };
        f()
    }

    /// Number of live memos and effects registered in this runtime.
    pub fn observer_count(&self) -> usize {
        let graph = self.inner.graph.lock();
        graph.effects.len() + graph.memo_dirty.len()
    }

    /// Whether two handles refer to the same graph.
    pub fn same_as(&self, other: &Runtime) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakRuntime {
        WeakRuntime(Arc::downgrade(&self.inner))
    }

    pub(crate) fn next_id(&self) -> NodeId {
        NodeId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Record that the current observer (if any) read `source`.
    pub(crate) fn track_read(&self, source: NodeId) {
        let mut graph = self.inner.graph.lock();
        let Some(observer) = graph.observer() else {
            return;
        };
        if observer == source {
            return;
        }
        graph.subscribers.entry(source).or_default().insert(observer);
        graph.sources.entry(observer).or_default().insert(source);
    }

    /// Invalidate everything that read `source`, then run each affected
    /// effect once.
    pub(crate) fn notify(&self, source: NodeId) {
        let effects = self.inner.graph.lock().invalidate(source);
        log::trace!("{} changed, {} effect(s) to run", source, effects.len());

        for id in effects {
            if let Some(effect) = self.effect_fn(id) {
                self.run_effect(id, &effect);
            }
        }
    }

    pub(crate) fn register_memo(&self, id: NodeId) {
        self.inner.graph.lock().memo_dirty.insert(id, true);
    }

    pub(crate) fn is_memo_dirty(&self, id: NodeId) -> bool {
        self.inner
            .graph
            .lock()
            .memo_dirty
            .get(&id)
            .copied()
            .unwrap_or(true)
    }

    pub(crate) fn mark_memo_clean(&self, id: NodeId) {
        if let Some(dirty) = self.inner.graph.lock().memo_dirty.get_mut(&id) {
            *dirty = false;
        }
    }

    pub(crate) fn register_effect(&self, id: NodeId, effect: EffectFn) {
        self.inner.graph.lock().effects.insert(id, effect);
    }

    pub(crate) fn effect_fn(&self, id: NodeId) -> Option<EffectFn> {
        self.inner.graph.lock().effects.get(&id).cloned()
    }

    /// Run an effect, re-tracking its dependencies.
    ///
    /// An effect that is already on the stack is not re-entered, so an
    /// effect writing to a signal it reads settles after one run.
    pub(crate) fn run_effect(&self, id: NodeId, effect: &EffectFn) {
        if !self.inner.graph.lock().running.insert(id) {
            log::trace!("effect {} already running, skipped", id);
            return;
        }
        log::trace!("running effect {}", id);

        struct Running<'a>(&'a Runtime, NodeId);
        impl Drop for Running<'_> {
            fn drop(&mut self) {
                self.0.inner.graph.lock().running.remove(&self.1);
            }
        }
        let _running = Running(self, id);

        self.run_tracked(id, || effect());
    }

    /// Run `f` with `observer` as the current observer, replacing whatever
    /// it depended on before with the reads made during this run.
    pub(crate) fn run_tracked<R>(&self, observer: NodeId, f: impl FnOnce() -> R) -> R {
        let prev = {
            let mut graph = self.inner.graph.lock();
            graph.unlink_sources(observer);
            graph.set_observer(Some(observer))
        };
        let _guard = ObserverGuard {
            runtime: self,
            prev,
        };
        f()
    }

    /// Drop a node and every edge touching it.
    pub(crate) fn remove(&self, id: NodeId) {
        let effect = self.inner.graph.lock().remove_node(id);
        drop(effect);
    }

    #[cfg(test)]
    fn dependency_count(&self, observer: NodeId) -> usize {
        self.inner
            .graph
            .lock()
            .sources
            .get(&observer)
            .map_or(0, HashSet::len)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.inner.graph.lock();
        f.debug_struct("Runtime")
            .field("nodes", &self.inner.next_id.load(Ordering::Relaxed))
            .field("effects", &graph.effects.len())
            .field("memos", &graph.memo_dirty.len())
            .finish()
    }
}
