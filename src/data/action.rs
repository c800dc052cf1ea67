//! Static data definitions.

use serde::{Deserialize, Serialize};

use crate::context::{
    Explosion, Hitbox, IntrinsicId, ItemId, MapStatusId, SkillId, StatusId,
};
use crate::effects::EffectNode;
use crate::pipeline::{EffectTable, Phase};

/// Damage category of an action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Physical,
    Magical,
    /// No direct damage.
    Status,
}

/// Everything the pipeline needs to know about one usable action.
///
/// ## Example
///
/// ```
/// use dungeon_effects::data::{ActionData, Category};
/// use dungeon_effects::effects::ModifyMultiplier;
/// use dungeon_effects::pipeline::Phase;
/// use dungeon_effects::state::Damage;
///
/// let double_kick = ActionData::new("Double Kick")
///     .with_category(Category::Physical)
///     .with_power(30)
///     .with_hit_rate(90)
///     .with_strikes(2)
///     .with_effect(Phase::BeforeHit, 0, ModifyMultiplier::<Damage>::local(3, 2));
///
/// assert_eq!(double_kick.strikes, 2);
/// assert_eq!(double_kick.effects.get(Phase::BeforeHit).len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ActionData {
    pub name: String,
    pub category: Category,
    pub power: i32,
    /// Base hit rate in percent. Negative means the action never misses.
    pub hit_rate: i32,
    /// Declared strikes.
    pub strikes: u32,
    pub hitbox: Hitbox,
    pub explosion: Option<Explosion>,
    pub effects: EffectTable,
}

impl ActionData {
    /// A one-strike physical action with 100% hit rate and no effects.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: Category::default(),
            power: 0,
            hit_rate: 100,
            strikes: 1,
            hitbox: Hitbox::default(),
            explosion: None,
            effects: EffectTable::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }

    #[must_use]
    pub fn with_hit_rate(mut self, hit_rate: i32) -> Self {
        self.hit_rate = hit_rate;
        self
    }

    /// Mark as never missing.
    #[must_use]
    pub fn sure_hit(self) -> Self {
        self.with_hit_rate(-1)
    }

    #[must_use]
    pub fn with_strikes(mut self, strikes: u32) -> Self {
        self.strikes = strikes;
        self
    }

    #[must_use]
    pub fn with_hitbox(mut self, hitbox: Hitbox) -> Self {
        self.hitbox = hitbox;
        self
    }

    #[must_use]
    pub fn with_explosion(mut self, explosion: Explosion) -> Self {
        self.explosion = Some(explosion);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, phase: Phase, priority: i32, node: impl EffectNode + 'static) -> Self {
        self.effects.add(phase, priority, node);
        self
    }

    /// Copy whose effect nodes share nothing with `self`.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            effects: self.effects.deep_clone(),
            ..self.clone()
        }
    }
}

/// A skill: an action used from a skill slot.
#[derive(Clone, Debug)]
pub struct SkillData {
    pub id: SkillId,
    pub action: ActionData,
}

impl SkillData {
    #[must_use]
    pub fn new(id: SkillId, action: ActionData) -> Self {
        Self { id, action }
    }
}

/// An item: an action when used or thrown, plus passive effects while held.
#[derive(Clone, Debug)]
pub struct ItemData {
    pub id: ItemId,
    pub action: ActionData,
    pub held: EffectTable,
}

impl ItemData {
    #[must_use]
    pub fn new(id: ItemId, action: ActionData) -> Self {
        Self {
            id,
            action,
            held: EffectTable::new(),
        }
    }

    #[must_use]
    pub fn with_held_effect(mut self, phase: Phase, priority: i32, node: impl EffectNode + 'static) -> Self {
        self.held.add(phase, priority, node);
        self
    }
}

macro_rules! passive_data {
    ($(#[$meta:meta])* $name:ident, $id:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            pub id: $id,
            pub name: String,
            pub effects: EffectTable,
        }

        impl $name {
            #[must_use]
            pub fn new(id: $id, name: impl Into<String>) -> Self {
                Self {
                    id,
                    name: name.into(),
                    effects: EffectTable::new(),
                }
            }

            #[must_use]
            pub fn with_effect(
                mut self,
                phase: Phase,
                priority: i32,
                node: impl EffectNode + 'static,
            ) -> Self {
                self.effects.add(phase, priority, node);
                self
            }
        }
    };
}

passive_data!(
    /// A status condition carried by an entity.
    StatusData,
    StatusId
);
passive_data!(
    /// An intrinsic ability of an entity.
    IntrinsicData,
    IntrinsicId
);
passive_data!(
    /// A condition on the whole floor.
    MapStatusData,
    MapStatusId
);
