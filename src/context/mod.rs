//! Action context, ownership and cancellation.

mod action;
mod cancel;
mod owner;

pub use action::{
    ActionContext, ActionType, EffectSource, Explosion, Hitbox, HitboxShape, StateScope, UsageSlot,
};
pub use cancel::Cancellation;
pub use owner::{
    GameEventOwner, IntrinsicId, ItemId, MapStatusId, OwnerKind, OwnerKinds, SkillId, StatusId,
};
