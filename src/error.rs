use thiserror::Error;

/// Errors raised by view state operations.
///
/// Every operation that returns one of these leaves the state it was
/// asked to change exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A setter or seed value was rejected.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// The counter is already at the largest representable value.
    #[error("counter overflow: {current} cannot be incremented")]
    Overflow { current: i64 },

    /// A control dispatched an action the component does not handle.
    #[error("unknown action `{0}`")]
    UnknownAction(String),
}

impl StateError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        StateError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
