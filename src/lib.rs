//! # Stateview
//!
//! Reactive view state for small presentation components.
//!
//! Stateview provides two levels of abstraction:
//!
//! ## Reactive primitives
//!
//! Created from an explicit [`Runtime`] that owns the dependency graph:
//! - `Signal<T>` - Reactive values that notify dependents when changed
//! - `Memo<T>` - Computed values that automatically track dependencies
//! - `Effect` - Side effects that run when dependencies change
//! - `Store<T>` - A whole state record with change subscribers
//!
//! ## Views
//!
//! Components that own one state record and render it:
//! - [`ProfileView`] - names and age, with a derived full name and age in
//!   dog years
//! - [`CounterView`] - a count and an increment control
//!
//! Both implement [`Component`]; [`mount`] keeps a render sink in sync with
//! a view's state. Initial state can be read from TOML with [`Seed`].

pub mod config;
pub mod error;
pub mod runtime;
pub mod signal;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use config::{ConfigError, Seed};
pub use error::StateError;
pub use runtime::Runtime;
pub use signal::{Effect, Memo, Signal};
pub use store::{Store, SubscriptionId};
pub use view::{
    mount, Component, CounterState, CounterView, DerivedProfile, Mounted, Node, ProfileState,
    ProfileView,
};
