//! Contract-violation errors.
//!
//! Only programming-time mistakes in content or host wiring surface here.
//! Game-legal outcomes (a miss, a false condition, nothing eligible) are
//! ordinary control flow and cancellation is a flag on the context, so
//! neither ever becomes a `PipelineError`.

use crate::context::{OwnerKind, OwnerKinds};

/// Errors raised while loading data or resolving an action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A node was wired under an owner kind it does not accept.
    #[error("{node} accepts owners {expected:?} but was wired under a {found}")]
    OwnerMismatch {
        node: &'static str,
        expected: OwnerKinds,
        found: OwnerKind,
    },

    /// A state the node relies on is absent from the context.
    #[error("context state {0} is required but absent")]
    MissingState(&'static str),

    /// No data entry with this id is registered.
    #[error("no {kind} registered with id {id}")]
    UnknownData { kind: OwnerKind, id: u32 },

    /// A data entry with this id is already registered.
    #[error("{kind} id {id} is already registered")]
    DuplicateData { kind: OwnerKind, id: u32 },

    /// A nested sub-action would exceed the configured frame depth.
    #[error("sub-action nesting exceeded the configured depth of {0}")]
    NestingTooDeep(usize),

    /// An action declared more strikes than the configured limit.
    #[error("action declared {declared} strikes, above the limit of {limit}")]
    TooManyStrikes { declared: u32, limit: u32 },

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `resume` was called after the resolution completed.
    #[error("resolution already complete")]
    AlreadyComplete,
}

impl PipelineError {
    /// Returns true if this error reflects broken content or wiring rather
    /// than misuse of the driver API.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::AlreadyComplete)
    }
}

/// Result alias used throughout the crate.
pub type PipelineResult<T> = Result<T, PipelineError>;
