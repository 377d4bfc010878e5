//! Views: components that own one state record and render it.
//!
//! Every view implements [`Component`]. [`mount`] attaches a view to a
//! presentation sink and keeps the sink up to date as the view's state
//! changes.

mod counter;
mod node;
mod profile;

pub use counter::{CounterState, CounterView, INCREMENT};
pub use node::Node;
pub use profile::{DerivedProfile, ProfileState, ProfileView, DOG_YEARS_PER_YEAR};
pub(crate) use profile::validate_age;

use std::sync::Arc;

use crate::error::StateError;
use crate::runtime::Runtime;
use crate::signal::Effect;

/// A view with private state and a render method.
pub trait Component {
    /// Snapshot of the view's primary state.
    type State;

    /// The runtime every reactive value of this view lives in.
    fn runtime(&self) -> &Runtime;

    fn state(&self) -> Self::State;

    /// Produce the view's output from its current state.
    ///
    /// Reads made here are tracked, so a mounted view re-renders when any
    /// of them changes.
    fn render(&self) -> Node;

    /// Handle an action dispatched by one of the view's controls.
    fn handle(&self, action: &str) -> Result<(), StateError> {
        Err(StateError::UnknownAction(action.to_string()))
    }
}

/// A component attached to a render sink.
///
/// Dropping it tears the view down: the sink is no longer called.
pub struct Mounted<C> {
    component: Arc<C>,
    render: Effect,
}

/// Render `component` into `sink` now and after every change to the state
/// it reads while rendering.
pub fn mount<C, F>(component: C, sink: F) -> Mounted<C>
where
    C: Component + Send + Sync + 'static,
    F: Fn(Node) + Send + Sync + 'static,
{
    let component = Arc::new(component);
    let render = component.runtime().effect({
        let component = Arc::clone(&component);
        move || sink(component.render())
    });
    log::debug!("mounted view with render effect {}", render.id());

    Mounted { component, render }
}

impl<C: Component> Mounted<C> {
    pub fn component(&self) -> &C {
        &self.component
    }

    /// Forward a control activation to the component.
    pub fn dispatch(&self, action: &str) -> Result<(), StateError> {
        self.component.handle(action)
    }

    /// Render again without waiting for a state change.
    pub fn refresh(&self) {
        self.render.run();
    }
}
