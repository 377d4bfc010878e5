use crate::runtime::{EffectFn, NodeId, Runtime, WeakRuntime};
use std::fmt;
use std::sync::Arc;

/// A side effect that runs when its dependencies change.
///
/// Effects track every signal, memo and store read during a run and re-run
/// when any of them changes. The effect runs immediately on creation to
/// establish its initial dependencies, and is unregistered when dropped.
///
/// # Examples
///
/// ```
/// use stateview::Runtime;
/// use std::sync::{Arc, atomic::{AtomicI32, Ordering}};
///
/// let rt = Runtime::new();
/// let signal = rt.signal(5);
/// let last_value = Arc::new(AtomicI32::new(0));
///
/// let effect = rt.effect({
///     let signal = signal.clone();
///     let last_value = last_value.clone();
///     move || last_value.store(signal.get(), Ordering::SeqCst)
/// });
/// assert_eq!(last_value.load(Ordering::SeqCst), 5);
///
/// signal.set(10);
/// assert_eq!(last_value.load(Ordering::SeqCst), 10);
///
/// drop(effect);
/// signal.set(20);
/// assert_eq!(last_value.load(Ordering::SeqCst), 10);
/// ```
pub struct Effect {
    id: NodeId,
    runtime: WeakRuntime,
}

impl Effect {
    /// Create a new effect that runs when dependencies change.
    pub fn new<F>(runtime: &Runtime, effect: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = runtime.next_id();
        let effect: EffectFn = Arc::new(effect);

        runtime.register_effect(id, Arc::clone(&effect));
        runtime.run_effect(id, &effect);

        Self {
            id,
            runtime: runtime.downgrade(),
        }
    }

    /// Manually trigger the effect.
    pub fn run(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            if let Some(effect) = runtime.effect_fn(self.id) {
                runtime.run_effect(self.id, &effect);
            }
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.remove(self.id);
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn effect_runs_immediately() {
        let rt = Runtime::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let _effect = Effect::new(&rt, move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn effect_reruns_on_memo_change() {
        let rt = Runtime::new();
        let input = rt.signal(2);
        let doubled = rt.memo({
            let input = input.clone();
            move || input.get() * 2
        });
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let _effect = rt.effect({
            let doubled = doubled.clone();
            let seen = Arc::clone(&seen);
            move || seen.lock().push(doubled.get())
        });

        input.set(3);
        input.set(4);
        assert_eq!(*seen.lock(), vec![4, 6, 8]);
    }

    #[test]
    fn diamond_runs_effect_once_per_write() {
        let rt = Runtime::new();
        let s = rt.signal(1);
        let a = rt.memo({
            let s = s.clone();
            move || s.get() * 2
        });
        let b = rt.memo({
            let (s, a) = (s.clone(), a.clone());
            move || s.get() + a.get()
        });
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let _effect = rt.effect({
            let b = b.clone();
            let seen = Arc::clone(&seen);
            move || seen.lock().push(b.get())
        });

        s.set(2);
        assert_eq!(*seen.lock(), vec![3, 6]);
        s.set(3);
        assert_eq!(*seen.lock(), vec![3, 6, 9]);
    }

    #[test]
    fn reads_on_other_threads_do_not_join_a_running_effect() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Barrier;
        use std::thread;

        let rt = Runtime::new();
        let unrelated = rt.signal(0);
        let runs = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Barrier::new(2));
        let proceed = Arc::new(Barrier::new(2));

        let handle = thread::spawn({
            let rt = rt.clone();
            let runs = Arc::clone(&runs);
            let (started, proceed) = (Arc::clone(&started), Arc::clone(&proceed));
            let first = AtomicBool::new(true);
            move || {
                rt.effect(move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    if first.swap(false, Ordering::SeqCst) {
                        started.wait();
                        proceed.wait();
                    }
                })
            }
        });

        started.wait();
        let _ = unrelated.get();
        proceed.wait();
        let effect = handle.join().unwrap();

        unrelated.set(1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        drop(effect);
    }

    #[test]
    fn self_writing_effect_settles() {
        let rt = Runtime::new();
        let value = rt.signal(0);
        let runs = Arc::new(AtomicUsize::new(0));

        let _effect = rt.effect({
            let value = value.clone();
            let runs = Arc::clone(&runs);
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                let current = value.get();
                if current < 3 {
                    value.set(current + 1);
                }
            }
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(value.get_untracked(), 1);
    }

    #[test]
    fn manual_run_and_drop() {
        let rt = Runtime::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let effect = rt.effect({
            let runs = Arc::clone(&runs);
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
            }
        });

        effect.run();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(rt.observer_count(), 1);

        drop(effect);
        assert_eq!(rt.observer_count(), 0);
    }
}
