//! Predicates for conditional gates.
//!
//! A [`Predicate`] is plain data evaluated against the invocation and the
//! live context. Combinators short-circuit left to right, so a `Chance`
//! behind a false `All` never draws from the RNG and replays stay aligned.

use crate::context::{ActionType, OwnerKinds, UsageSlot};
use crate::state::StateKey;
use crate::world::Stat;

use super::node::{AffectScope, Invocation};
use super::routine::EffectCx;

/// A condition over the owner, the acting entity and the context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    // === Action identity ===

    /// The action has a target.
    HasTarget,

    /// The action is of the given type.
    ActionTypeIs(ActionType),

    /// The action was forced on the user (menu-less slot).
    SlotIsForced,

    /// The node's owner is one of the given kinds.
    OwnerIs(OwnerKinds),

    // === Context state ===

    /// A state of the keyed type is present in local scope.
    HasLocal(StateKey),

    /// A state of the keyed type is present in global scope.
    HasGlobal(StateKey),

    /// At least this many strikes have been judged.
    StrikesMadeAtLeast(u32),

    // === World ===

    /// The scoped entity's HP is below `percent` of its max HP.
    HpBelowPercent { scope: AffectScope, percent: u8 },

    /// Succeeds with the given percent chance. Draws once from the RNG.
    Chance(u8),

    // === Combinators ===

    /// All conditions must be true.
    All(Vec<Predicate>),

    /// At least one condition must be true.
    Any(Vec<Predicate>),

    /// Condition must be false.
    Not(Box<Predicate>),

    // === Special ===

    Always,

    Never,
}

impl Predicate {
    /// Presence of a local marker of type `T`.
    #[must_use]
    pub fn has_local<T: crate::state::ContextState>() -> Self {
        Self::HasLocal(StateKey::of::<T>())
    }

    /// Presence of a global marker of type `T`.
    #[must_use]
    pub fn has_global<T: crate::state::ContextState>() -> Self {
        Self::HasGlobal(StateKey::of::<T>())
    }

    pub fn all(conditions: impl IntoIterator<Item = Predicate>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    pub fn any(conditions: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against the live context.
    pub fn evaluate(&self, inv: &Invocation, cx: &mut EffectCx<'_>) -> bool {
        match self {
            Self::HasTarget => cx.ctx.target.is_some(),

            Self::ActionTypeIs(expected) => cx.ctx.action_type == *expected,

            Self::SlotIsForced => cx.ctx.usage_slot == UsageSlot::Forced,

            Self::OwnerIs(kinds) => kinds.contains(inv.owner.kind().flag()),

            Self::HasLocal(key) => cx.ctx.local.contains_key(*key),

            Self::HasGlobal(key) => cx.ctx.global.contains_key(*key),

            Self::StrikesMadeAtLeast(n) => cx.ctx.strikes_made >= *n,

            Self::HpBelowPercent { scope, percent } => {
                let Some(entity) = inv.with_scope(*scope).affected(&*cx.ctx) else {
                    return false;
                };
                let hp = i64::from(cx.world.stat(entity, Stat::Hp));
                let max_hp = i64::from(cx.world.stat(entity, Stat::MaxHp));
                max_hp > 0 && hp * 100 < max_hp * i64::from(*percent)
            }

            Self::Chance(percent) => cx.world.rng().next_int(100) < i32::from(*percent),

            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(inv, cx)),

            Self::Any(conditions) => conditions.iter().any(|c| c.evaluate(inv, cx)),

            Self::Not(inner) => !inner.evaluate(inv, cx),

            Self::Always => true,

            Self::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ActionContext, GameEventOwner, SkillId, StatusId};
    use crate::core::EntityId;
    use crate::data::ActionData;
    use crate::state::AttackHit;
    use crate::world::Sandbox;

    fn setup() -> (ActionContext, Sandbox) {
        let ctx = ActionContext::new(EntityId(1), GameEventOwner::Skill(SkillId(1)), ActionData::new("Test"))
            .with_target(EntityId(2));
        let mut world = Sandbox::new(42);
        world.set_stat(EntityId(2), Stat::Hp, 20);
        world.set_stat(EntityId(2), Stat::MaxHp, 100);
        (ctx, world)
    }

    fn inv() -> Invocation {
        Invocation::new(GameEventOwner::Status(StatusId(3)), EntityId(1))
    }

    #[test]
    fn test_identity_predicates() {
        let (mut ctx, mut world) = setup();
        let mut cx = EffectCx::new(&mut ctx, &mut world);

        assert!(Predicate::HasTarget.evaluate(&inv(), &mut cx));
        assert!(Predicate::ActionTypeIs(ActionType::Skill).evaluate(&inv(), &mut cx));
        assert!(!Predicate::SlotIsForced.evaluate(&inv(), &mut cx));
        assert!(Predicate::OwnerIs(OwnerKinds::PASSIVE).evaluate(&inv(), &mut cx));
        assert!(!Predicate::OwnerIs(OwnerKinds::ACTION).evaluate(&inv(), &mut cx));
    }

    #[test]
    fn test_marker_presence() {
        let (mut ctx, mut world) = setup();
        ctx.global.set(AttackHit);
        let mut cx = EffectCx::new(&mut ctx, &mut world);

        assert!(Predicate::has_global::<AttackHit>().evaluate(&inv(), &mut cx));
        assert!(!Predicate::has_local::<AttackHit>().evaluate(&inv(), &mut cx));
    }

    #[test]
    fn test_hp_below_percent() {
        let (mut ctx, mut world) = setup();
        let mut cx = EffectCx::new(&mut ctx, &mut world);

        let low = Predicate::HpBelowPercent { scope: AffectScope::Target, percent: 25 };
        let very_low = Predicate::HpBelowPercent { scope: AffectScope::Target, percent: 20 };
        let user = Predicate::HpBelowPercent { scope: AffectScope::User, percent: 50 };

        assert!(low.evaluate(&inv(), &mut cx));
        assert!(!very_low.evaluate(&inv(), &mut cx));
        // No max HP recorded for the user.
        assert!(!user.evaluate(&inv(), &mut cx));
    }

    #[test]
    fn test_combinators_short_circuit_rng() {
        let (mut ctx, mut world) = setup();
        let before = world.random().state();
        let mut cx = EffectCx::new(&mut ctx, &mut world);

        let gated = Predicate::all([Predicate::Never, Predicate::Chance(50)]);
        assert!(!gated.evaluate(&inv(), &mut cx));
        let either = Predicate::any([Predicate::Always, Predicate::Chance(50)]);
        assert!(either.evaluate(&inv(), &mut cx));

        assert_eq!(world.random().state(), before);
    }

    #[test]
    fn test_chance_bounds() {
        let (mut ctx, mut world) = setup();
        let mut cx = EffectCx::new(&mut ctx, &mut world);

        for _ in 0..20 {
            assert!(Predicate::Chance(100).evaluate(&inv(), &mut cx));
            assert!(!Predicate::Chance(0).evaluate(&inv(), &mut cx));
        }
    }

    #[test]
    fn test_negate() {
        let (mut ctx, mut world) = setup();
        let mut cx = EffectCx::new(&mut ctx, &mut world);
        assert!(Predicate::SlotIsForced.negate().evaluate(&inv(), &mut cx));
    }
}
