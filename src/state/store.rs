//! Typed, heterogeneous context state.
//!
//! A [`StateCollection`] holds at most one value per Rust type. Nodes look
//! state up by type (`get::<Multiplier<HitRate>>()`), so two content rules
//! that agree on a type share an accumulator without agreeing on a string
//! key.
//!
//! ```
//! use dungeon_effects::state::{Additive, AccuracyBoost, StateCollection};
//!
//! let mut store = StateCollection::new();
//! store.get_or_default::<Additive<AccuracyBoost>>().add(2);
//! store.get_or_default::<Additive<AccuracyBoost>>().add(1);
//!
//! assert_eq!(store.get::<Additive<AccuracyBoost>>().unwrap().value(), 3);
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;

use crate::core::{PipelineError, PipelineResult};

/// A value that can live in a [`StateCollection`].
///
/// Implemented for every `'static` type that is `Clone + Debug`.
pub trait ContextState: Any + fmt::Debug {
    /// Deep-copy this state into a new box.
    fn clone_state(&self) -> Box<dyn ContextState>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Type name for diagnostics.
    fn state_name(&self) -> &'static str;
}

impl<T: Any + Clone + fmt::Debug> ContextState for T {
    fn clone_state(&self) -> Box<dyn ContextState> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn state_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Type-level key for a state, usable as plain data (e.g. inside a
/// [`Predicate`](crate::effects::Predicate)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    id: TypeId,
    name: &'static str,
}

impl StateKey {
    /// Key for the state type `T`.
    #[must_use]
    pub fn of<T: ContextState>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Type name of the keyed state.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// A map from state type to state value.
#[derive(Default)]
pub struct StateCollection {
    states: FxHashMap<TypeId, Box<dyn ContextState>>,
}

impl StateCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a state by type.
    #[must_use]
    pub fn get<T: ContextState>(&self) -> Option<&T> {
        let state: &dyn ContextState = &**self.states.get(&TypeId::of::<T>())?;
        state.as_any().downcast_ref::<T>()
    }

    /// Get a mutable state by type.
    pub fn get_mut<T: ContextState>(&mut self) -> Option<&mut T> {
        let state: &mut dyn ContextState = &mut **self.states.get_mut(&TypeId::of::<T>())?;
        state.as_any_mut().downcast_mut::<T>()
    }

    /// Get a state that content relies on, failing loudly if absent.
    pub fn require<T: ContextState>(&self) -> PipelineResult<&T> {
        self.get::<T>()
            .ok_or(PipelineError::MissingState(std::any::type_name::<T>()))
    }

    /// Get a state, inserting its default first if absent.
    pub fn get_or_default<T: ContextState + Default>(&mut self) -> &mut T {
        let slot = self
            .states
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()));
        let state: &mut dyn ContextState = &mut **slot;
        state
            .as_any_mut()
            .downcast_mut::<T>()
            .expect("state slot is keyed by its own TypeId")
    }

    /// Store a state, replacing any previous value of the same type.
    pub fn set<T: ContextState>(&mut self, value: T) {
        self.states.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Remove a state and return it.
    pub fn remove<T: ContextState>(&mut self) -> Option<T> {
        let state = self.states.remove(&TypeId::of::<T>())?;
        state.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Check whether a state of type `T` is present.
    #[must_use]
    pub fn contains<T: ContextState>(&self) -> bool {
        self.states.contains_key(&TypeId::of::<T>())
    }

    /// Check presence by key.
    #[must_use]
    pub fn contains_key(&self, key: StateKey) -> bool {
        self.states.contains_key(&key.id)
    }

    /// Drop every state.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Number of stored states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Clone for StateCollection {
    fn clone(&self) -> Self {
        let states = self
            .states
            .iter()
            .map(|(id, state)| {
                let state: &dyn ContextState = &**state;
                (*id, state.clone_state())
            })
            .collect();
        Self { states }
    }
}

impl fmt::Debug for StateCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .states
            .values()
            .map(|state| {
                let state: &dyn ContextState = &**state;
                state.state_name()
            })
            .collect();
        names.sort_unstable();
        f.debug_struct("StateCollection")
            .field("states", &names)
            .finish()
    }
}
