//! Runtime support for reactive primitives.
//!
//! A [`Runtime`] owns the dependency graph shared by the signals, memos,
//! effects and stores created from it. Each view owns its own runtime, so
//! nothing is tracked through implicit global state.

mod context;

pub use context::{NodeId, Runtime};
pub(crate) use context::{EffectFn, WeakRuntime};
