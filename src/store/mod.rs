//! High-level state management with stores.
//!
//! A store holds one whole state record. Reads are tracked by the runtime
//! like signal reads, and every committed change is pushed to subscribers.

mod store;

pub use store::{Store, SubscriptionId};
