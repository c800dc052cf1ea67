//! Generic leaf nodes.
//!
//! Concrete game rules are data built from these plus [`Rule`] closures.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::context::{
    ActionContext, ActionType, GameEventOwner, OwnerKinds, SkillId, StateScope, UsageSlot,
};
use crate::core::PipelineResult;
use crate::state::{Additive, ContextState, Multiplier};

use super::node::{EffectNode, Invocation};
use super::routine::{done, from_fn, once, EffectCx, Emit, Routine, Step, SuspensionRequest};

// ============================================================================
// Accumulator writers
// ============================================================================

/// Registers a modifier into `Multiplier<K>`.
pub struct ModifyMultiplier<K> {
    numerator: i64,
    denominator: i64,
    scope: StateScope,
    _kind: PhantomData<fn() -> K>,
}

impl<K: 'static> ModifyMultiplier<K> {
    /// # Panics
    ///
    /// Panics if `denominator` is not positive.
    #[must_use]
    pub fn new(numerator: i64, denominator: i64, scope: StateScope) -> Self {
        assert!(denominator > 0, "multiplier denominator must be positive");
        Self {
            numerator,
            denominator,
            scope,
            _kind: PhantomData,
        }
    }

    #[must_use]
    pub fn local(numerator: i64, denominator: i64) -> Self {
        Self::new(numerator, denominator, StateScope::Local)
    }

    #[must_use]
    pub fn global(numerator: i64, denominator: i64) -> Self {
        Self::new(numerator, denominator, StateScope::Global)
    }

    /// The sticky override (e.g. a sure-hit rule).
    #[must_use]
    pub fn absolute(scope: StateScope) -> Self {
        Self::new(-1, 1, scope)
    }
}

impl<K> Clone for ModifyMultiplier<K> {
    fn clone(&self) -> Self {
        Self {
            numerator: self.numerator,
            denominator: self.denominator,
            scope: self.scope,
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for ModifyMultiplier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifyMultiplier")
            .field("kind", &std::any::type_name::<K>())
            .field("numerator", &self.numerator)
            .field("denominator", &self.denominator)
            .field("scope", &self.scope)
            .finish()
    }
}

impl<K: 'static> EffectNode for ModifyMultiplier<K> {
    fn apply(&self, _inv: Invocation) -> Box<dyn Routine> {
        let (numerator, denominator, scope) = (self.numerator, self.denominator, self.scope);
        once(move |cx| {
            cx.ctx
                .store_mut(scope)
                .get_or_default::<Multiplier<K>>()
                .register(numerator, denominator);
            Ok(())
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "ModifyMultiplier"
    }
}

/// Adds a contribution to `Additive<K>`.
pub struct AddStat<K> {
    delta: i32,
    scope: StateScope,
    _kind: PhantomData<fn() -> K>,
}

impl<K: 'static> AddStat<K> {
    #[must_use]
    pub const fn new(delta: i32, scope: StateScope) -> Self {
        Self {
            delta,
            scope,
            _kind: PhantomData,
        }
    }

    #[must_use]
    pub const fn local(delta: i32) -> Self {
        Self::new(delta, StateScope::Local)
    }

    #[must_use]
    pub const fn global(delta: i32) -> Self {
        Self::new(delta, StateScope::Global)
    }
}

impl<K> Clone for AddStat<K> {
    fn clone(&self) -> Self {
        Self {
            delta: self.delta,
            scope: self.scope,
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for AddStat<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddStat")
            .field("kind", &std::any::type_name::<K>())
            .field("delta", &self.delta)
            .field("scope", &self.scope)
            .finish()
    }
}

impl<K: 'static> EffectNode for AddStat<K> {
    fn apply(&self, _inv: Invocation) -> Box<dyn Routine> {
        let (delta, scope) = (self.delta, self.scope);
        once(move |cx| {
            cx.ctx.store_mut(scope).get_or_default::<Additive<K>>().add(delta);
            Ok(())
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "AddStat"
    }
}

/// Records a presence marker.
pub struct Mark<M> {
    scope: StateScope,
    _marker: PhantomData<fn() -> M>,
}

impl<M: ContextState + Default> Mark<M> {
    #[must_use]
    pub const fn new(scope: StateScope) -> Self {
        Self {
            scope,
            _marker: PhantomData,
        }
    }
}

impl<M> Clone for Mark<M> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope,
            _marker: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Mark<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mark")
            .field("marker", &std::any::type_name::<M>())
            .field("scope", &self.scope)
            .finish()
    }
}

impl<M: ContextState + Default> EffectNode for Mark<M> {
    fn apply(&self, _inv: Invocation) -> Box<dyn Routine> {
        let scope = self.scope;
        once(move |cx| {
            cx.ctx.store_mut(scope).set(M::default());
            Ok(())
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "Mark"
    }
}

// ============================================================================
// Control
// ============================================================================

/// Cancels the action.
#[derive(Clone, Copy, Debug, Default)]
pub struct CancelAction;

impl EffectNode for CancelAction {
    fn apply(&self, _inv: Invocation) -> Box<dyn Routine> {
        once(|cx| {
            cx.ctx.cancel();
            Ok(())
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(*self)
    }

    fn name(&self) -> &'static str {
        "CancelAction"
    }
}

/// Yields presentation requests to the host, in order.
#[derive(Clone, Debug, Default)]
pub struct Present {
    requests: Vec<SuspensionRequest>,
}

impl Present {
    #[must_use]
    pub fn new(requests: impl IntoIterator<Item = SuspensionRequest>) -> Self {
        Self {
            requests: requests.into_iter().collect(),
        }
    }
}

impl EffectNode for Present {
    fn apply(&self, _inv: Invocation) -> Box<dyn Routine> {
        if self.requests.is_empty() {
            return done();
        }
        Box::new(Emit::new(self.requests.clone()))
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "Present"
    }
}

/// Uses a skill as a nested action, to completion, before continuing.
///
/// The nested action runs with a fresh context: same user and target, the
/// parent's passive sources, none of the parent's state.
#[derive(Clone, Copy, Debug)]
pub struct RunSubAction {
    skill: SkillId,
    slot: UsageSlot,
}

impl RunSubAction {
    #[must_use]
    pub const fn new(skill: SkillId) -> Self {
        Self {
            skill,
            slot: UsageSlot::Forced,
        }
    }

    #[must_use]
    pub const fn with_slot(mut self, slot: UsageSlot) -> Self {
        self.slot = slot;
        self
    }
}

impl EffectNode for RunSubAction {
    fn apply(&self, _inv: Invocation) -> Box<dyn Routine> {
        let Self { skill, slot } = *self;
        let mut requested = false;
        from_fn(move |cx| {
            if requested {
                return Ok(Step::Done);
            }
            requested = true;

            let data = cx.world.repository().skill(skill)?.action.clone();
            let mut child = ActionContext::new(cx.ctx.user, GameEventOwner::Skill(skill), data)
                .with_slot(slot)
                .with_action_type(ActionType::Forced)
                .with_sources(cx.ctx.passives.iter().cloned());
            child.target = cx.ctx.target;
            Ok(Step::SubAction(Box::new(child)))
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(*self)
    }

    fn name(&self) -> &'static str {
        "RunSubAction"
    }
}

/// Replaces the action with another skill (a forced move).
///
/// Only statuses and intrinsics may force a move. The replacement data is
/// deep-cloned, so later edits to the working copy never reach the
/// repository's template.
#[derive(Clone, Copy, Debug)]
pub struct SubstituteAction {
    skill: SkillId,
}

impl SubstituteAction {
    #[must_use]
    pub const fn new(skill: SkillId) -> Self {
        Self { skill }
    }
}

impl EffectNode for SubstituteAction {
    fn apply(&self, inv: Invocation) -> Box<dyn Routine> {
        let skill = self.skill;
        once(move |cx| {
            inv.owner.require(Self::KINDS, "SubstituteAction")?;
            let data = cx.world.repository().skill(skill)?.action.deep_clone();
            tracing::debug!(
                user = %cx.ctx.user,
                from = %cx.ctx.owner,
                to = %skill,
                "substituting action"
            );
            cx.ctx.replace_data(GameEventOwner::Skill(skill), data);
            cx.ctx.usage_slot = UsageSlot::Forced;
            cx.ctx.action_type = ActionType::Forced;
            Ok(())
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(*self)
    }

    fn owner_kinds(&self) -> OwnerKinds {
        Self::KINDS
    }

    fn name(&self) -> &'static str {
        "SubstituteAction"
    }
}

impl SubstituteAction {
    const KINDS: OwnerKinds = OwnerKinds::STATUS.union(OwnerKinds::INTRINSIC);
}

// ============================================================================
// Rule
// ============================================================================

type RuleFn = dyn Fn(&Invocation, &mut EffectCx<'_>) -> PipelineResult<()>;

/// A named game rule written as a closure.
///
/// Shared selection logic (find an eligible item, pick a tile) is written
/// as ordinary functions and called from the closure.
#[derive(Clone)]
pub struct Rule {
    name: &'static str,
    kinds: OwnerKinds,
    f: Rc<RuleFn>,
}

impl Rule {
    pub fn new<F>(name: &'static str, kinds: OwnerKinds, f: F) -> Self
    where
        F: Fn(&Invocation, &mut EffectCx<'_>) -> PipelineResult<()> + 'static,
    {
        Self {
            name,
            kinds,
            f: Rc::new(f),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

impl EffectNode for Rule {
    fn apply(&self, inv: Invocation) -> Box<dyn Routine> {
        let f = Rc::clone(&self.f);
        once(move |cx| f(&inv, cx))
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn owner_kinds(&self) -> OwnerKinds {
        self.kinds
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{OwnerKind, StatusId};
    use crate::core::{EntityId, PipelineError};
    use crate::data::{ActionData, SkillData};
    use crate::state::{AttackHit, HitRate, AccuracyBoost};
    use crate::world::Sandbox;

    fn context() -> ActionContext {
        ActionContext::new(EntityId(1), GameEventOwner::Skill(SkillId(1)), ActionData::new("Test"))
    }

    fn run(node: &dyn EffectNode, inv: Invocation, ctx: &mut ActionContext, world: &mut Sandbox) -> PipelineResult<Step> {
        let mut cx = EffectCx::new(ctx, world);
        node.apply(inv).resume(&mut cx)
    }

    fn status_inv() -> Invocation {
        Invocation::new(GameEventOwner::Status(StatusId(2)), EntityId(1))
    }

    #[test]
    fn test_modify_multiplier_scopes() {
        let mut ctx = context();
        let mut world = Sandbox::new(1);
        run(&ModifyMultiplier::<HitRate>::local(1, 2), status_inv(), &mut ctx, &mut world).unwrap();
        run(&ModifyMultiplier::<HitRate>::global(3, 2), status_inv(), &mut ctx, &mut world).unwrap();

        assert_eq!(ctx.local.get::<Multiplier<HitRate>>().unwrap().ratio(), (1, 2));
        assert_eq!(ctx.global.get::<Multiplier<HitRate>>().unwrap().ratio(), (3, 2));
    }

    #[test]
    fn test_absolute_sets_override() {
        let mut ctx = context();
        let mut world = Sandbox::new(1);
        run(&ModifyMultiplier::<HitRate>::absolute(StateScope::Global), status_inv(), &mut ctx, &mut world)
            .unwrap();
        assert!(ctx.global.get::<Multiplier<HitRate>>().unwrap().is_overridden());
    }

    #[test]
    fn test_add_stat_and_mark() {
        let mut ctx = context();
        let mut world = Sandbox::new(1);
        run(&AddStat::<AccuracyBoost>::local(2), status_inv(), &mut ctx, &mut world).unwrap();
        run(&AddStat::<AccuracyBoost>::local(-1), status_inv(), &mut ctx, &mut world).unwrap();
        run(&Mark::<AttackHit>::new(StateScope::Global), status_inv(), &mut ctx, &mut world).unwrap();

        assert_eq!(ctx.local.get::<Additive<AccuracyBoost>>().map(Additive::value), Some(1));
        assert!(ctx.global.contains::<AttackHit>());
    }

    #[test]
    fn test_cancel_action() {
        let mut ctx = context();
        let mut world = Sandbox::new(1);
        run(&CancelAction, status_inv(), &mut ctx, &mut world).unwrap();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_present_yields_then_finishes() {
        let mut ctx = context();
        let mut world = Sandbox::new(1);
        let node = Present::new([SuspensionRequest::visual("sparkle", EntityId(1))]);
        let mut routine = node.apply(status_inv());
        let mut cx = EffectCx::new(&mut ctx, &mut world);

        assert!(matches!(routine.resume(&mut cx), Ok(Step::Yield(SuspensionRequest::Visual { .. }))));
        assert!(matches!(routine.resume(&mut cx), Ok(Step::Done)));
    }

    #[test]
    fn test_run_sub_action_builds_fresh_context() {
        let mut world = Sandbox::new(1);
        world
            .repository_mut()
            .register_skill(SkillData::new(SkillId(9), ActionData::new("Echo")))
            .unwrap();

        let mut ctx = context().with_target(EntityId(5));
        ctx.local.set(AttackHit);

        match run(&RunSubAction::new(SkillId(9)), status_inv(), &mut ctx, &mut world) {
            Ok(Step::SubAction(child)) => {
                assert_eq!(child.data.name, "Echo");
                assert_eq!(child.user, EntityId(1));
                assert_eq!(child.target, Some(EntityId(5)));
                assert_eq!(child.usage_slot, UsageSlot::Forced);
                assert!(child.local.is_empty());
                assert!(child.global.is_empty());
            }
            other => panic!("expected a sub-action, got {other:?}"),
        }
    }

    #[test]
    fn test_run_sub_action_unknown_skill() {
        let mut ctx = context();
        let mut world = Sandbox::new(1);
        let err = run(&RunSubAction::new(SkillId(404)), status_inv(), &mut ctx, &mut world).unwrap_err();
        assert_eq!(err, PipelineError::UnknownData { kind: OwnerKind::Skill, id: 404 });
    }

    #[test]
    fn test_substitute_action_replaces_working_data() {
        let mut world = Sandbox::new(1);
        world
            .repository_mut()
            .register_skill(SkillData::new(SkillId(3), ActionData::new("Struggle").with_strikes(1)))
            .unwrap();
        let mut ctx = context();

        run(&SubstituteAction::new(SkillId(3)), status_inv(), &mut ctx, &mut world).unwrap();

        assert_eq!(ctx.data.name, "Struggle");
        assert_eq!(ctx.owner, GameEventOwner::Skill(SkillId(3)));
        assert_eq!(ctx.usage_slot, UsageSlot::Forced);
        assert_eq!(ctx.action_type, ActionType::Forced);
    }

    #[test]
    fn test_substitute_action_rejects_skill_owner() {
        let mut world = Sandbox::new(1);
        world
            .repository_mut()
            .register_skill(SkillData::new(SkillId(3), ActionData::new("Struggle")))
            .unwrap();
        let mut ctx = context();
        let inv = Invocation::new(GameEventOwner::Skill(SkillId(1)), EntityId(1));

        let err = run(&SubstituteAction::new(SkillId(3)), inv, &mut ctx, &mut world).unwrap_err();
        assert!(matches!(err, PipelineError::OwnerMismatch { node: "SubstituteAction", .. }));
        assert_eq!(ctx.data.name, "Test");
    }

    #[test]
    fn test_rule_sees_invocation() {
        let rule = Rule::new("recoil", OwnerKinds::ACTION, |inv, cx| {
            cx.ctx.local.set(inv.acting);
            Ok(())
        });
        assert_eq!(rule.owner_kinds(), OwnerKinds::ACTION);
        assert_eq!(rule.name(), "recoil");

        let mut ctx = context();
        let mut world = Sandbox::new(1);
        let inv = Invocation::new(GameEventOwner::Skill(SkillId(1)), EntityId(8));
        run(&rule, inv, &mut ctx, &mut world).unwrap();
        assert_eq!(ctx.local.get::<EntityId>(), Some(&EntityId(8)));
    }
}
