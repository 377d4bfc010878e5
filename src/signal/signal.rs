use crate::runtime::{NodeId, Runtime};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

struct SignalInner<T> {
    id: NodeId,
    value: RwLock<Arc<T>>,
    runtime: Runtime,
}

impl<T> Drop for SignalInner<T> {
    fn drop(&mut self) {
        self.runtime.remove(self.id);
    }
}

/// A reactive signal that holds a value and notifies dependents when changed.
///
/// Clones share the same value.
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(runtime: &Runtime, initial: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: runtime.next_id(),
                value: RwLock::new(Arc::new(initial)),
                runtime: runtime.clone(),
            }),
        }
    }

    /// Get the current value, registering a dependency for the running
    /// memo or effect.
    pub fn get(&self) -> T {
        self.inner.runtime.track_read(self.inner.id);
        (**self.inner.value.read()).clone()
    }

    /// Get the current value without registering a dependency.
    pub fn get_untracked(&self) -> T {
        (**self.inner.value.read()).clone()
    }

    /// Read the value with a function without cloning.
    ///
    /// No lock is held while `f` runs, so `f` may write to this signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.runtime.track_read(self.inner.id);
        let value = Arc::clone(&self.inner.value.read());
        f(&*value)
    }

    /// Set a new value for the signal.
    pub fn set(&self, new_value: T) {
        *self.inner.value.write() = Arc::new(new_value);
        self.inner.runtime.notify(self.inner.id);
    }

    /// Update the value in place.
    ///
    /// `f` runs under the write lock and must not read this signal.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = self.inner.value.write();
            f(Arc::make_mut(&mut value));
        }
        self.inner.runtime.notify(self.inner.id);
    }

    /// Update the value through a fallible function.
    ///
    /// `f` works on a copy of the value. The copy replaces the value, and
    /// dependents are notified, only if `f` returns `Ok`.
    pub fn try_update<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut draft = (**self.inner.value.read()).clone();
        let out = f(&mut draft)?;
        *self.inner.value.write() = Arc::new(draft);
        self.inner.runtime.notify(self.inner.id);
        Ok(out)
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> NodeId {
        self.inner.id
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &**self.inner.value.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_get_set_update() {
        let rt = Runtime::new();
        let count = Signal::new(&rt, 0);
        assert_eq!(count.get(), 0);

        count.set(42);
        assert_eq!(count.get(), 42);

        count.update(|n| *n += 10);
        assert_eq!(count.get(), 52);
        assert_eq!(count.with(|n| n * 2), 104);
    }

    #[test]
    fn clones_share_the_value() {
        let rt = Runtime::new();
        let a = Signal::new(&rt, String::from("x"));
        let b = a.clone();
        b.set("y".to_string());
        assert_eq!(a.get_untracked(), "y");
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn with_may_write_back() {
        let rt = Runtime::new();
        let count = rt.signal(1);
        let doubled = rt.memo({
            let count = count.clone();
            move || count.get() * 2
        });
        let _effect = rt.effect({
            let count = count.clone();
            move || {
                let _ = count.get();
            }
        });

        count.with(|n| count.set(n + 1));
        assert_eq!(count.get(), 2);
        assert_eq!(doubled.get(), 4);
    }

    #[test]
    fn rejected_update_keeps_old_value() {
        let rt = Runtime::new();
        let value = Signal::new(&rt, 7u8);

        let result: Result<(), &str> = value.try_update(|v| {
            *v = 0;
            Err("nope")
        });
        assert_eq!(result, Err("nope"));
        assert_eq!(value.get(), 7);

        let result: Result<u8, &str> = value.try_update(|v| {
            *v += 1;
            Ok(*v)
        });
        assert_eq!(result, Ok(8));
        assert_eq!(value.get(), 8);
    }
}
