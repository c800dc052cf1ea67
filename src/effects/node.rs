//! The effect node contract.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::context::{ActionContext, GameEventOwner, OwnerKind, OwnerKinds};
use crate::core::{EntityId, PipelineError, PipelineResult};

use super::routine::Routine;

/// Shared handle to an immutable node template.
pub type NodeRef = Rc<dyn EffectNode>;

/// Which entity a node affects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffectScope {
    /// The entity the node runs for: the holder of a passive, or the user
    /// for the action's own effects.
    Acting,
    /// The user of the action.
    User,
    /// The action's current target.
    #[default]
    Target,
}

/// Arguments of one node application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Whose data the node was declared under.
    pub owner: GameEventOwner,
    /// The entity the node runs for.
    pub acting: EntityId,
    pub scope: AffectScope,
}

impl Invocation {
    #[must_use]
    pub fn new(owner: GameEventOwner, acting: EntityId) -> Self {
        Self {
            owner,
            acting,
            scope: AffectScope::default(),
        }
    }

    #[must_use]
    pub const fn with_scope(mut self, scope: AffectScope) -> Self {
        self.scope = scope;
        self
    }

    /// Resolve the scope against a context.
    #[must_use]
    pub fn affected(&self, ctx: &ActionContext) -> Option<EntityId> {
        match self.scope {
            AffectScope::Acting => Some(self.acting),
            AffectScope::User => Some(ctx.user),
            AffectScope::Target => ctx.target,
        }
    }
}

/// The polymorphic unit of combat behavior.
///
/// Nodes stored in data are templates shared by every action that uses
/// them, so `apply` takes `&self`: all per-application state lives in the
/// returned routine.
pub trait EffectNode: fmt::Debug {
    /// Start one application of this node.
    fn apply(&self, inv: Invocation) -> Box<dyn Routine>;

    /// Deep copy. The result shares no node with `self`.
    fn clone_node(&self) -> Box<dyn EffectNode>;

    /// Owner kinds this node may be declared under.
    fn owner_kinds(&self) -> OwnerKinds {
        OwnerKinds::all()
    }

    /// Name used in traces and errors.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Check this node (and any children) can run under `kind`.
    fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        check_owner(self.owner_kinds(), kind, self.name())
    }
}

pub(crate) fn check_owner(
    accepted: OwnerKinds,
    kind: OwnerKind,
    node: &'static str,
) -> PipelineResult<()> {
    if accepted.contains(kind.flag()) {
        Ok(())
    } else {
        Err(PipelineError::OwnerMismatch {
            node,
            expected: accepted,
            found: kind,
        })
    }
}

/// Deep-copy a shared node into a fresh, uniquely owned one.
#[must_use]
pub fn deep_clone(node: &NodeRef) -> NodeRef {
    Rc::from(node.clone_node())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{SkillId, StatusId};
    use crate::data::ActionData;
    use crate::effects::routine::done;

    #[derive(Clone, Debug)]
    struct StatusOnly;

    impl EffectNode for StatusOnly {
        fn apply(&self, _inv: Invocation) -> Box<dyn Routine> {
            done()
        }

        fn clone_node(&self) -> Box<dyn EffectNode> {
            Box::new(self.clone())
        }

        fn owner_kinds(&self) -> OwnerKinds {
            OwnerKinds::STATUS
        }

        fn name(&self) -> &'static str {
            "StatusOnly"
        }
    }

    #[test]
    fn test_validate_owner_kind() {
        let node = StatusOnly;
        assert!(node.validate(OwnerKind::Status).is_ok());
        assert_eq!(
            node.validate(OwnerKind::Skill),
            Err(PipelineError::OwnerMismatch {
                node: "StatusOnly",
                expected: OwnerKinds::STATUS,
                found: OwnerKind::Skill,
            })
        );
    }

    #[test]
    fn test_deep_clone_is_a_new_allocation() {
        let node: NodeRef = Rc::new(StatusOnly);
        let copy = deep_clone(&node);
        assert!(!Rc::ptr_eq(&node, &copy));
        assert_eq!(Rc::strong_count(&node), 1);
    }

    #[test]
    fn test_affected_scope() {
        let ctx = ActionContext::new(EntityId(1), GameEventOwner::Skill(SkillId(1)), ActionData::new("Test"))
            .with_target(EntityId(2));
        let inv = Invocation::new(GameEventOwner::Status(StatusId(5)), EntityId(7));

        assert_eq!(inv.affected(&ctx), Some(EntityId(2)));
        assert_eq!(inv.with_scope(AffectScope::Acting).affected(&ctx), Some(EntityId(7)));
        assert_eq!(inv.with_scope(AffectScope::User).affected(&ctx), Some(EntityId(1)));
    }
}
