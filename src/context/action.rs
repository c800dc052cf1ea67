//! The per-action context.
//!
//! One [`ActionContext`] is created for each action attempt and threaded by
//! `&mut` through every phase and strike of that action. Nested sub-actions
//! get their own context; nothing here is ever shared between two actions.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::data::ActionData;
use crate::pipeline::{EffectTable, TraceRecord};
use crate::state::StateCollection;

use super::cancel::Cancellation;
use super::owner::GameEventOwner;

/// How the action came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Skill,
    Item,
    Throw,
    Trap,
    /// Forced by another effect (substitution, confusion, a nested use).
    Forced,
}

/// Where the action was picked from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageSlot {
    /// Skill slot on the user.
    Skill(u8),
    /// Inventory index.
    Inventory(u16),
    /// The user's held item.
    Held,
    /// An item lying on the floor.
    Ground,
    /// Menu-less: the action was forced on the user.
    Forced,
    /// Not picked from anywhere (traps, scripted actions).
    Unassigned,
}

impl UsageSlot {
    /// True for the sentinel slots that do not name a real menu entry.
    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        matches!(self, Self::Forced | Self::Unassigned)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitboxShape {
    /// The tile in front.
    #[default]
    Single,
    /// A straight line up to the range.
    Line,
    /// Every tile within the range.
    Area,
    /// The whole room.
    Room,
}

/// Which tiles an action reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hitbox {
    pub shape: HitboxShape,
    pub range: u8,
}

impl Hitbox {
    #[must_use]
    pub const fn new(shape: HitboxShape, range: u8) -> Self {
        Self { shape, range }
    }
}

impl Default for Hitbox {
    fn default() -> Self {
        Self::new(HitboxShape::Single, 1)
    }
}

/// A blast triggered where the action lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Explosion {
    pub radius: u8,
    pub hits_user: bool,
}

/// Which of the two state scopes to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateScope {
    /// Cleared at the start of every strike.
    #[default]
    Local,
    /// Lives for the whole action.
    Global,
}

/// A passive effect table bound to the entity that carries it: a status on
/// a participant, an intrinsic ability, a held item or a map status.
#[derive(Clone, Debug)]
pub struct EffectSource {
    pub owner: GameEventOwner,
    pub holder: EntityId,
    pub table: EffectTable,
}

impl EffectSource {
    #[must_use]
    pub fn new(owner: GameEventOwner, holder: EntityId, table: EffectTable) -> Self {
        Self {
            owner,
            holder,
            table,
        }
    }
}

/// Mutable state of one action attempt.
///
/// Working fields are public: content reads and rewrites them freely. The
/// cancellation flag is only reachable through [`cancel`](Self::cancel) so
/// it can never be cleared.
#[derive(Clone, Debug)]
pub struct ActionContext {
    /// The entity performing the action.
    pub user: EntityId,
    pub target: Option<EntityId>,
    pub action_type: ActionType,
    pub usage_slot: UsageSlot,
    /// Data entry the action's own effect lists belong to.
    pub owner: GameEventOwner,
    /// Working copy of the action data. Replaceable mid-pipeline.
    pub data: ActionData,
    pub hitbox: Hitbox,
    pub explosion: Option<Explosion>,
    /// Declared number of strikes.
    pub strikes: u32,
    /// Strikes judged so far. Doubles as the 0-based index of the current strike.
    pub strikes_made: u32,
    pub range_mod: i32,
    /// Per-strike state.
    pub local: StateCollection,
    /// Per-action state.
    pub global: StateCollection,
    /// Passive tables consulted alongside `data.effects`, in attach order.
    pub passives: Vec<EffectSource>,
    cancellation: Cancellation,
    pub(crate) depth: usize,
    pub(crate) trace: Vector<TraceRecord>,
}

impl ActionContext {
    /// Context for `user` performing the action described by `data`.
    #[must_use]
    pub fn new(user: EntityId, owner: GameEventOwner, data: ActionData) -> Self {
        let action_type = match owner {
            GameEventOwner::Item(_) => ActionType::Item,
            _ => ActionType::Skill,
        };
        Self {
            user,
            target: None,
            action_type,
            usage_slot: UsageSlot::Unassigned,
            owner,
            hitbox: data.hitbox,
            explosion: data.explosion,
            strikes: data.strikes,
            data,
            strikes_made: 0,
            range_mod: 0,
            local: StateCollection::new(),
            global: StateCollection::new(),
            passives: Vec::new(),
            cancellation: Cancellation::new(),
            depth: 0,
            trace: Vector::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_slot(mut self, slot: UsageSlot) -> Self {
        self.usage_slot = slot;
        self
    }

    #[must_use]
    pub fn with_action_type(mut self, action_type: ActionType) -> Self {
        self.action_type = action_type;
        self
    }

    /// Attach a passive source. Sources tie-break in attach order.
    #[must_use]
    pub fn with_source(mut self, source: EffectSource) -> Self {
        self.passives.push(source);
        self
    }

    #[must_use]
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = EffectSource>) -> Self {
        self.passives.extend(sources);
        self
    }

    /// Switch to `Cancelled`. There is no way back within this action.
    pub fn cancel(&mut self) {
        if !self.cancellation.is_cancelled() {
            tracing::debug!(user = %self.user, owner = %self.owner, "action cancelled");
        }
        self.cancellation.cancel();
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Replace the working action data, e.g. with a forced move.
    ///
    /// Hitbox, explosion and declared strikes follow the new data. Phases
    /// that already ran are not replayed.
    pub fn replace_data(&mut self, owner: GameEventOwner, data: ActionData) {
        self.owner = owner;
        self.hitbox = data.hitbox;
        self.explosion = data.explosion;
        self.strikes = data.strikes;
        self.data = data;
    }

    #[must_use]
    pub fn store(&self, scope: StateScope) -> &StateCollection {
        match scope {
            StateScope::Local => &self.local,
            StateScope::Global => &self.global,
        }
    }

    pub fn store_mut(&mut self, scope: StateScope) -> &mut StateCollection {
        match scope {
            StateScope::Local => &mut self.local,
            StateScope::Global => &mut self.global,
        }
    }

    /// Hitbox range after modifiers, never negative.
    #[must_use]
    pub fn effective_range(&self) -> u32 {
        (i32::from(self.hitbox.range) + self.range_mod).max(0).unsigned_abs()
    }

    /// Nesting depth: 0 for a root action.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Nodes executed so far, including nested sub-actions.
    #[must_use]
    pub fn trace(&self) -> &Vector<TraceRecord> {
        &self.trace
    }

    pub(crate) fn begin_strike(&mut self) {
        self.local.clear();
    }
}
