use serde::{Deserialize, Serialize};

use super::{Component, Node};
use crate::error::StateError;
use crate::runtime::Runtime;
use crate::store::{Store, SubscriptionId};

/// Action dispatched by the counter's button.
pub const INCREMENT: &str = "increment";

/// Also the `[counter]` table of a seed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterState {
    pub count: i64,
}

/// A view holding a single count and an increment control.
///
/// ```
/// use stateview::CounterView;
///
/// let counter = CounterView::new();
/// for _ in 0..5 {
///     counter.increment()?;
/// }
/// assert_eq!(counter.get_count(), 5);
/// # Ok::<(), stateview::StateError>(())
/// ```
pub struct CounterView {
    runtime: Runtime,
    store: Store<CounterState>,
}

impl CounterView {
    /// A counter starting at zero.
    pub fn new() -> Self {
        Self::with_state(CounterState::default())
    }

    pub fn with_state(state: CounterState) -> Self {
        let runtime = Runtime::new();
        let store = runtime.store(state);
        Self { runtime, store }
    }

    pub fn get_count(&self) -> i64 {
        self.store.read(|state| state.count)
    }

    /// Add one to the count and return the new value.
    ///
    /// Fails with [`StateError::Overflow`] at `i64::MAX`, leaving the count
    /// unchanged.
    pub fn increment(&self) -> Result<i64, StateError> {
        let count = self
            .store
            .try_update(|state| {
                let next = state
                    .count
                    .checked_add(1)
                    .ok_or(StateError::Overflow {
                        current: state.count,
                    })?;
                state.count = next;
                Ok(next)
            })
            .inspect_err(|err| log::warn!("rejected counter update: {err}"))?;
        log::debug!("counter -> {count}");
        Ok(count)
    }

    /// Call `callback` with the new state after every committed change.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CounterState) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn remove_listener(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }
}

impl Default for CounterView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CounterView {
    type State = CounterState;

    fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn state(&self) -> CounterState {
        self.store.peek(|state| *state)
    }

    fn render(&self) -> Node {
        Node::element(
            "div",
            [
                Node::element("p", [Node::text(format!("Count: {}", self.get_count()))]),
                Node::button("Increment", INCREMENT),
            ],
        )
    }

    fn handle(&self, action: &str) -> Result<(), StateError> {
        match action {
            INCREMENT => self.increment().map(drop),
            other => Err(StateError::UnknownAction(other.to_string())),
        }
    }
}
