//! Effect ownership.
//!
//! Every effect node is declared under some piece of data: a status, a
//! skill, an item, an intrinsic ability or a map status. [`GameEventOwner`]
//! is that closed union. Nodes written for one kind declare it through
//! [`OwnerKinds`], and both data loading and the typed accessors below
//! check the declaration instead of assuming it.

use serde::{Deserialize, Serialize};

use crate::core::{PipelineError, PipelineResult};

macro_rules! data_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

data_id!(
    /// Identifier of a status effect definition.
    StatusId,
    "Status"
);
data_id!(
    /// Identifier of a skill (move) definition.
    SkillId,
    "Skill"
);
data_id!(
    /// Identifier of an item definition.
    ItemId,
    "Item"
);
data_id!(
    /// Identifier of an intrinsic ability definition.
    IntrinsicId,
    "Intrinsic"
);
data_id!(
    /// Identifier of a map status definition.
    MapStatusId,
    "MapStatus"
);

/// Which piece of data an effect node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventOwner {
    Status(StatusId),
    Skill(SkillId),
    Item(ItemId),
    Intrinsic(IntrinsicId),
    MapStatus(MapStatusId),
}

/// Discriminant of [`GameEventOwner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    Status,
    Skill,
    Item,
    Intrinsic,
    MapStatus,
}

bitflags::bitflags! {
    /// A set of owner kinds a node may be wired under.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OwnerKinds: u8 {
        const STATUS     = 1 << 0;
        const SKILL      = 1 << 1;
        const ITEM       = 1 << 2;
        const INTRINSIC  = 1 << 3;
        const MAP_STATUS = 1 << 4;

        /// Data that can be used as an action.
        const ACTION = Self::SKILL.bits() | Self::ITEM.bits();
        /// Data that is carried passively by an entity or the map.
        const PASSIVE = Self::STATUS.bits() | Self::INTRINSIC.bits() | Self::MAP_STATUS.bits();
    }
}

impl OwnerKind {
    /// The singleton set containing this kind.
    #[must_use]
    pub const fn flag(self) -> OwnerKinds {
        match self {
            Self::Status => OwnerKinds::STATUS,
            Self::Skill => OwnerKinds::SKILL,
            Self::Item => OwnerKinds::ITEM,
            Self::Intrinsic => OwnerKinds::INTRINSIC,
            Self::MapStatus => OwnerKinds::MAP_STATUS,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Skill => "skill",
            Self::Item => "item",
            Self::Intrinsic => "intrinsic",
            Self::MapStatus => "map status",
        }
    }
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GameEventOwner {
    #[must_use]
    pub const fn kind(&self) -> OwnerKind {
        match self {
            Self::Status(_) => OwnerKind::Status,
            Self::Skill(_) => OwnerKind::Skill,
            Self::Item(_) => OwnerKind::Item,
            Self::Intrinsic(_) => OwnerKind::Intrinsic,
            Self::MapStatus(_) => OwnerKind::MapStatus,
        }
    }

    /// Raw id of the owning data entry.
    #[must_use]
    pub const fn raw_id(&self) -> u32 {
        match self {
            Self::Status(id) => id.0,
            Self::Skill(id) => id.0,
            Self::Item(id) => id.0,
            Self::Intrinsic(id) => id.0,
            Self::MapStatus(id) => id.0,
        }
    }

    /// Fail unless this owner's kind is in `accepted`.
    pub fn require(&self, accepted: OwnerKinds, node: &'static str) -> PipelineResult<()> {
        if accepted.contains(self.kind().flag()) {
            Ok(())
        } else {
            Err(PipelineError::OwnerMismatch {
                node,
                expected: accepted,
                found: self.kind(),
            })
        }
    }

    /// The status id, or an owner mismatch naming `node`.
    pub fn expect_status(&self, node: &'static str) -> PipelineResult<StatusId> {
        match *self {
            Self::Status(id) => Ok(id),
            _ => Err(self.mismatch(OwnerKinds::STATUS, node)),
        }
    }

    /// The skill id, or an owner mismatch naming `node`.
    pub fn expect_skill(&self, node: &'static str) -> PipelineResult<SkillId> {
        match *self {
            Self::Skill(id) => Ok(id),
            _ => Err(self.mismatch(OwnerKinds::SKILL, node)),
        }
    }

    /// The item id, or an owner mismatch naming `node`.
    pub fn expect_item(&self, node: &'static str) -> PipelineResult<ItemId> {
        match *self {
            Self::Item(id) => Ok(id),
            _ => Err(self.mismatch(OwnerKinds::ITEM, node)),
        }
    }

    fn mismatch(&self, expected: OwnerKinds, node: &'static str) -> PipelineError {
        PipelineError::OwnerMismatch {
            node,
            expected,
            found: self.kind(),
        }
    }
}

impl std::fmt::Display for GameEventOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(id) => write!(f, "{id}"),
            Self::Skill(id) => write!(f, "{id}"),
            Self::Item(id) => write!(f, "{id}"),
            Self::Intrinsic(id) => write!(f, "{id}"),
            Self::MapStatus(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_flag() {
        let owner = GameEventOwner::Status(StatusId::new(3));
        assert_eq!(owner.kind(), OwnerKind::Status);
        assert_eq!(owner.raw_id(), 3);
        assert!(OwnerKinds::PASSIVE.contains(owner.kind().flag()));
        assert!(!OwnerKinds::ACTION.contains(owner.kind().flag()));
    }

    #[test]
    fn test_require() {
        let owner = GameEventOwner::Item(ItemId::new(1));
        assert!(owner.require(OwnerKinds::ACTION, "UseItem").is_ok());

        let err = owner.require(OwnerKinds::STATUS, "Countdown").unwrap_err();
        assert_eq!(
            err,
            PipelineError::OwnerMismatch {
                node: "Countdown",
                expected: OwnerKinds::STATUS,
                found: OwnerKind::Item,
            }
        );
    }

    #[test]
    fn test_checked_accessors() {
        let owner = GameEventOwner::Skill(SkillId::new(12));
        assert_eq!(owner.expect_skill("Recoil"), Ok(SkillId::new(12)));
        assert!(owner.expect_status("Recoil").is_err());
        assert!(owner.expect_item("Recoil").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(GameEventOwner::MapStatus(MapStatusId(2)).to_string(), "MapStatus(2)");
        assert_eq!(OwnerKind::MapStatus.to_string(), "map status");
    }
}
