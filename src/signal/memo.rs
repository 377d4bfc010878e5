use crate::runtime::{NodeId, Runtime};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

struct MemoInner<T> {
    id: NodeId,
    compute: Box<dyn Fn() -> T + Send + Sync>,
    cached: RwLock<Option<Arc<T>>>,
    runtime: Runtime,
}

impl<T> Drop for MemoInner<T> {
    fn drop(&mut self) {
        self.runtime.remove(self.id);
    }
}

/// A memoized computed value that automatically tracks dependencies.
///
/// The computation runs lazily on the first read and again only after one
/// of the values it read has changed. Dependencies are re-tracked on each
/// recomputation, so a memo that branches on its inputs follows whichever
/// branch it last took.
pub struct Memo<T> {
    inner: Arc<MemoInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Memo<T> {
    /// Create a new memo with the given computation function.
    pub fn new<F>(runtime: &Runtime, compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let id = runtime.next_id();
        runtime.register_memo(id);

        Self {
            inner: Arc::new(MemoInner {
                id,
                compute: Box::new(compute),
                cached: RwLock::new(None),
                runtime: runtime.clone(),
            }),
        }
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T {
        (*self.current()).clone()
    }

    /// Read the memoized value with a function without cloning.
    ///
    /// No lock is held while `f` runs, so `f` may write to the memo's inputs.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.current())
    }

    /// Whether the next read will run the computation.
    pub fn is_stale(&self) -> bool {
        self.inner.runtime.is_memo_dirty(self.inner.id)
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    fn current(&self) -> Arc<T> {
        let inner = &self.inner;
        inner.runtime.track_read(inner.id);

        if !inner.runtime.is_memo_dirty(inner.id) {
            if let Some(value) = inner.cached.read().as_ref() {
                return Arc::clone(value);
            }
        }
        self.recompute()
    }

    fn recompute(&self) -> Arc<T> {
        let inner = &self.inner;
        let value = Arc::new(inner.runtime.run_tracked(inner.id, || (inner.compute)()));
        *inner.cached.write() = Some(Arc::clone(&value));
        inner.runtime.mark_memo_clean(inner.id);
        value
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.id)
            .field("cached", &*self.inner.cached.read())
            .finish()
    }
}
