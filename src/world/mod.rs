//! World services.
//!
//! Nodes never reach for globals. Everything outside the action context
//! (the RNG stream, the data repository, entity stats) comes through the
//! [`World`] handed to every resume.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameRng, RandomSource};
use crate::data::DataRepository;

/// Entity stats the engine reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    MaxHp,
    Attack,
    Defense,
    /// Accuracy boost stage.
    Accuracy,
    /// Evasion boost stage.
    Evasion,
}

/// Services the surrounding game provides to effect nodes.
pub trait World {
    /// The shared deterministic RNG stream.
    fn rng(&mut self) -> &mut dyn RandomSource;

    fn repository(&self) -> &DataRepository;

    /// Current value of a stat. Unknown entities read as 0.
    fn stat(&self, entity: EntityId, stat: Stat) -> i32;
}

/// In-memory world: a stat table, a repository and an RNG.
///
/// ```
/// use dungeon_effects::core::EntityId;
/// use dungeon_effects::world::{Sandbox, Stat, World};
///
/// let mut world = Sandbox::new(42);
/// world.set_stat(EntityId(1), Stat::Hp, 30);
///
/// assert_eq!(world.stat(EntityId(1), Stat::Hp), 30);
/// assert_eq!(world.stat(EntityId(1), Stat::Defense), 0);
/// ```
#[derive(Clone, Debug)]
pub struct Sandbox<R = GameRng> {
    rng: R,
    repository: DataRepository,
    stats: FxHashMap<(EntityId, Stat), i32>,
}

impl Sandbox<GameRng> {
    /// Sandbox with a [`GameRng`] seeded from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_rng(GameRng::new(seed))
    }
}

impl<R: RandomSource> Sandbox<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            repository: DataRepository::new(),
            stats: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_repository(mut self, repository: DataRepository) -> Self {
        self.repository = repository;
        self
    }

    pub fn set_stat(&mut self, entity: EntityId, stat: Stat, value: i32) {
        self.stats.insert((entity, stat), value);
    }

    pub fn repository_mut(&mut self) -> &mut DataRepository {
        &mut self.repository
    }

    /// The concrete RNG, e.g. to checkpoint a [`GameRng`].
    #[must_use]
    pub fn random(&self) -> &R {
        &self.rng
    }

    pub fn random_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

impl<R: RandomSource> World for Sandbox<R> {
    fn rng(&mut self) -> &mut dyn RandomSource {
        &mut self.rng
    }

    fn repository(&self) -> &DataRepository {
        &self.repository
    }

    fn stat(&self, entity: EntityId, stat: Stat) -> i32 {
        self.stats.get(&(entity, stat)).copied().unwrap_or(0)
    }
}
