//! # dungeon-effects
//!
//! The effect pipeline of a dungeon crawler: the engine every combat rule
//! plugs into.
//!
//! ## Design Principles
//!
//! 1. **Rules are data**: a status, skill, item, intrinsic or map status
//!    declares small [`EffectNode`]s per trigger phase. The engine knows no
//!    individual rule.
//!
//! 2. **Deterministic**: nodes run in ascending priority with stable ties,
//!    and draw from one seeded RNG stream in call order, so a resolution
//!    can be replayed bit for bit.
//!
//! 3. **Cooperative**: nodes are resumable routines. Presentation waits and
//!    nested actions are steps driven by a heap trampoline, not recursion.
//!
//! 4. **Permissive cancellation**: cancelling stops what has not run yet
//!    and undoes nothing.
//!
//! ## Modules
//!
//! - `core`: Entity ids, deterministic RNG, configuration, errors
//! - `state`: Typed context state and accumulators
//! - `context`: Action context, effect owners, cancellation
//! - `effects`: Node contract, routines, composites, predicates, primitives
//! - `pipeline`: Phases, priority lists, executor, trampoline, strike judge
//! - `data`: Static definitions and the data repository
//! - `world`: Services nodes consume (RNG, repository, stats)

pub mod context;
pub mod core;
pub mod data;
pub mod effects;
pub mod pipeline;
pub mod state;
pub mod world;

// Re-export commonly used types
pub use crate::core::{
    EntityId, GameRng, GameRngState, PipelineConfig, PipelineError, PipelineResult, RandomSource,
};

pub use crate::state::{
    Additive, ContextState, Multiplier, Snapshot, StateCollection, StateKey, OVERRIDE_SENTINEL,
};

pub use crate::context::{
    ActionContext, ActionType, EffectSource, GameEventOwner, OwnerKind, OwnerKinds, StateScope,
    UsageSlot,
};

pub use crate::effects::{
    AffectScope, EffectCx, EffectNode, Invocation, NodeRef, Predicate, Routine, Step,
    SuspensionRequest,
};

pub use crate::pipeline::{
    EffectTable, Phase, Pipeline, PriorityList, Progress, Resolution, StrikeJudge, StrikeOutcome,
    TraceRecord,
};

pub use crate::data::{ActionData, DataRepository};

pub use crate::world::{Sandbox, Stat, World};
