//! Effect nodes.
//!
//! An [`EffectNode`] is one game rule. Data declares nodes under an owner
//! (a status, skill, item, intrinsic or map status); the pipeline applies
//! them phase by phase. Applying a node yields a [`Routine`] that the
//! trampoline resumes until it is done, surfacing [`SuspensionRequest`]s
//! to the host along the way.
//!
//! ## Example
//!
//! ```
//! use dungeon_effects::effects::{Conditional, Group, ModifyMultiplier, Predicate, AddStat};
//! use dungeon_effects::state::{AccuracyBoost, AttackHit, HitRate};
//!
//! // "If the action already landed a strike, later strikes are easier."
//! let follow_up = Conditional::new(Predicate::has_global::<AttackHit>())
//!     .then(ModifyMultiplier::<HitRate>::local(3, 2))
//!     .then(AddStat::<AccuracyBoost>::local(1));
//!
//! let node = Group::new().with(follow_up);
//! assert_eq!(node.len(), 1);
//! ```

mod composite;
mod condition;
mod node;
mod primitives;
mod routine;

pub use composite::{Conditional, CountSource, Group, RandomChoice, Repeat, Scoped};
pub use condition::Predicate;
pub use node::{deep_clone, AffectScope, EffectNode, Invocation, NodeRef};
pub use primitives::{
    AddStat, CancelAction, Mark, ModifyMultiplier, Present, Rule, RunSubAction, SubstituteAction,
};
pub use routine::{done, from_fn, once, EffectCx, Routine, Step, SuspensionRequest};
