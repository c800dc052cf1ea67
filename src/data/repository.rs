//! Data repository for definition lookup.
//!
//! The `DataRepository` stores every skill, item, status, intrinsic and map
//! status definition. Registration is where wiring is checked: each node
//! in each table must accept the kind of the entry it is declared under,
//! so a misplaced node fails at load time instead of mid-action.

use rustc_hash::FxHashMap;

use crate::context::{
    EffectSource, GameEventOwner, IntrinsicId, ItemId, MapStatusId, OwnerKind, OwnerKinds,
    SkillId, StatusId,
};
use crate::core::{EntityId, PipelineError, PipelineResult};

use super::action::{IntrinsicData, ItemData, MapStatusData, SkillData, StatusData};

/// Registry of all static data.
///
/// ## Example
///
/// ```
/// use dungeon_effects::context::{SkillId, StatusId, GameEventOwner};
/// use dungeon_effects::core::EntityId;
/// use dungeon_effects::data::{ActionData, DataRepository, SkillData, StatusData};
/// use dungeon_effects::effects::CancelAction;
/// use dungeon_effects::pipeline::Phase;
///
/// let mut repo = DataRepository::new();
/// repo.register_skill(SkillData::new(SkillId(1), ActionData::new("Tackle"))).unwrap();
/// repo.register_status(
///     StatusData::new(StatusId(1), "Sleep").with_effect(Phase::PreAction, 0, CancelAction),
/// )
/// .unwrap();
///
/// assert_eq!(repo.skill(SkillId(1)).unwrap().action.name, "Tackle");
///
/// let sleep = repo.source(GameEventOwner::Status(StatusId(1)), EntityId(3)).unwrap();
/// assert_eq!(sleep.holder, EntityId(3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DataRepository {
    skills: FxHashMap<SkillId, SkillData>,
    items: FxHashMap<ItemId, ItemData>,
    statuses: FxHashMap<StatusId, StatusData>,
    intrinsics: FxHashMap<IntrinsicId, IntrinsicData>,
    map_statuses: FxHashMap<MapStatusId, MapStatusData>,
}

fn duplicate(kind: OwnerKind, id: u32) -> PipelineError {
    PipelineError::DuplicateData { kind, id }
}

fn unknown(kind: OwnerKind, id: u32) -> PipelineError {
    PipelineError::UnknownData { kind, id }
}

impl DataRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Registration ===

    /// Register a skill.
    ///
    /// # Errors
    ///
    /// `DuplicateData` if the id is taken, `OwnerMismatch` if a node in its
    /// table does not accept skill owners.
    pub fn register_skill(&mut self, skill: SkillData) -> PipelineResult<()> {
        let id = skill.id;
        if self.skills.contains_key(&id) {
            return Err(duplicate(OwnerKind::Skill, id.raw()));
        }
        skill.action.effects.validate(OwnerKind::Skill)?;
        tracing::debug!(%id, name = %skill.action.name, nodes = skill.action.effects.len(), "registered skill");
        self.skills.insert(id, skill);
        Ok(())
    }

    /// Register an item. Both the use table and the held table are checked
    /// against item owners.
    pub fn register_item(&mut self, item: ItemData) -> PipelineResult<()> {
        let id = item.id;
        if self.items.contains_key(&id) {
            return Err(duplicate(OwnerKind::Item, id.raw()));
        }
        item.action.effects.validate(OwnerKind::Item)?;
        item.held.validate(OwnerKind::Item)?;
        tracing::debug!(%id, name = %item.action.name, "registered item");
        self.items.insert(id, item);
        Ok(())
    }

    pub fn register_status(&mut self, status: StatusData) -> PipelineResult<()> {
        let id = status.id;
        if self.statuses.contains_key(&id) {
            return Err(duplicate(OwnerKind::Status, id.raw()));
        }
        status.effects.validate(OwnerKind::Status)?;
        tracing::debug!(%id, name = %status.name, "registered status");
        self.statuses.insert(id, status);
        Ok(())
    }

    pub fn register_intrinsic(&mut self, intrinsic: IntrinsicData) -> PipelineResult<()> {
        let id = intrinsic.id;
        if self.intrinsics.contains_key(&id) {
            return Err(duplicate(OwnerKind::Intrinsic, id.raw()));
        }
        intrinsic.effects.validate(OwnerKind::Intrinsic)?;
        tracing::debug!(%id, name = %intrinsic.name, "registered intrinsic");
        self.intrinsics.insert(id, intrinsic);
        Ok(())
    }

    pub fn register_map_status(&mut self, map_status: MapStatusData) -> PipelineResult<()> {
        let id = map_status.id;
        if self.map_statuses.contains_key(&id) {
            return Err(duplicate(OwnerKind::MapStatus, id.raw()));
        }
        map_status.effects.validate(OwnerKind::MapStatus)?;
        tracing::debug!(%id, name = %map_status.name, "registered map status");
        self.map_statuses.insert(id, map_status);
        Ok(())
    }

    // === Lookup ===

    pub fn skill(&self, id: SkillId) -> PipelineResult<&SkillData> {
        self.skills.get(&id).ok_or_else(|| unknown(OwnerKind::Skill, id.raw()))
    }

    pub fn item(&self, id: ItemId) -> PipelineResult<&ItemData> {
        self.items.get(&id).ok_or_else(|| unknown(OwnerKind::Item, id.raw()))
    }

    pub fn status(&self, id: StatusId) -> PipelineResult<&StatusData> {
        self.statuses.get(&id).ok_or_else(|| unknown(OwnerKind::Status, id.raw()))
    }

    pub fn intrinsic(&self, id: IntrinsicId) -> PipelineResult<&IntrinsicData> {
        self.intrinsics.get(&id).ok_or_else(|| unknown(OwnerKind::Intrinsic, id.raw()))
    }

    pub fn map_status(&self, id: MapStatusId) -> PipelineResult<&MapStatusData> {
        self.map_statuses.get(&id).ok_or_else(|| unknown(OwnerKind::MapStatus, id.raw()))
    }

    /// Bind the passive table of `owner` to the entity carrying it.
    ///
    /// Items contribute their held table. Skills have no passive table.
    pub fn source(&self, owner: GameEventOwner, holder: EntityId) -> PipelineResult<EffectSource> {
        let table = match owner {
            GameEventOwner::Status(id) => self.status(id)?.effects.clone(),
            GameEventOwner::Intrinsic(id) => self.intrinsic(id)?.effects.clone(),
            GameEventOwner::MapStatus(id) => self.map_status(id)?.effects.clone(),
            GameEventOwner::Item(id) => self.item(id)?.held.clone(),
            GameEventOwner::Skill(_) => {
                return Err(PipelineError::OwnerMismatch {
                    node: "EffectSource",
                    expected: OwnerKinds::PASSIVE | OwnerKinds::ITEM,
                    found: OwnerKind::Skill,
                });
            }
        };
        Ok(EffectSource::new(owner, holder, table))
    }

    /// Total number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
            + self.items.len()
            + self.statuses.len()
            + self.intrinsics.len()
            + self.map_statuses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
