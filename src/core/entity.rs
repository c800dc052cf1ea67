//! Entity identification.
//!
//! Every combatant the pipeline can refer to (the acting entity, the target,
//! the holder of a status) is addressed by an `EntityId`. The engine never
//! looks inside an entity; it only hands ids to the [`World`](crate::world::World)
//! when it needs a stat.
//!
//! ```
//! use dungeon_effects::core::EntityId;
//!
//! let hero = EntityId::new(1);
//! assert_eq!(hero.raw(), 1);
//! assert_eq!(format!("{}", hero), "Entity(1)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
