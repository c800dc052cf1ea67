//! Context state store and accumulators.
//!
//! Every action carries two [`StateCollection`]s: a *local* one cleared at
//! the start of each strike and a *global* one that lives for the whole
//! action. Content communicates through the typed states stored there.

mod accumulators;
mod store;

pub use accumulators::{
    AccuracyBoost, Additive, AttackHit, CriticalHit, Damage, EvasionBoost, HitRate, Knockouts,
    Multiplier, Snapshot, StrikeDamage, TargetEvasion, UserAccuracy, OVERRIDE_SENTINEL,
};
pub use store::{ContextState, StateCollection, StateKey};
