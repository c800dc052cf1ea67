//! Priority lists and per-phase effect tables.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::context::OwnerKind;
use crate::core::PipelineResult;
use crate::effects::{deep_clone, EffectNode, NodeRef};

use super::phase::Phase;

/// One node with its priority.
#[derive(Clone)]
pub struct PriorityEntry {
    pub priority: i32,
    pub node: NodeRef,
}

impl fmt::Debug for PriorityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node.name(), self.priority)
    }
}

/// Nodes ordered by ascending priority.
///
/// Entries with equal priority keep their insertion order, so
/// `[5 -> x, 1 -> y, 5 -> z]` runs as `y, x, z`.
///
/// ```
/// use dungeon_effects::effects::CancelAction;
/// use dungeon_effects::pipeline::PriorityList;
///
/// let list = PriorityList::new()
///     .with(5, CancelAction)
///     .with(1, CancelAction)
///     .with(5, CancelAction);
///
/// let order: Vec<i32> = list.iter().map(|e| e.priority).collect();
/// assert_eq!(order, vec![1, 5, 5]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PriorityList {
    entries: SmallVec<[PriorityEntry; 4]>,
}

impl PriorityList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert after every entry whose priority is `<= priority`.
    pub fn add_ref(&mut self, priority: i32, node: NodeRef) {
        let at = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(at, PriorityEntry { priority, node });
    }

    pub fn add(&mut self, priority: i32, node: impl EffectNode + 'static) {
        self.add_ref(priority, Rc::new(node));
    }

    #[must_use]
    pub fn with(mut self, priority: i32, node: impl EffectNode + 'static) -> Self {
        self.add(priority, node);
        self
    }

    /// Entries in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &PriorityEntry> {
        self.entries.iter()
    }

    /// Mutable access to a node that no one else holds.
    ///
    /// Returns `None` for shared template nodes; deep-clone the list first.
    pub fn node_mut(&mut self, index: usize) -> Option<&mut (dyn EffectNode + 'static)> {
        let entry = self.entries.get_mut(index)?;
        Rc::get_mut(&mut entry.node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy with every node deep-cloned.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| PriorityEntry {
                    priority: e.priority,
                    node: deep_clone(&e.node),
                })
                .collect(),
        }
    }

    pub fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        self.entries.iter().try_for_each(|e| e.node.validate(kind))
    }
}

/// One [`PriorityList`] per [`Phase`].
#[derive(Clone, Debug, Default)]
pub struct EffectTable {
    lists: [PriorityList; Phase::COUNT],
}

impl EffectTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, phase: Phase) -> &PriorityList {
        &self.lists[phase.index()]
    }

    pub fn get_mut(&mut self, phase: Phase) -> &mut PriorityList {
        &mut self.lists[phase.index()]
    }

    pub fn add(&mut self, phase: Phase, priority: i32, node: impl EffectNode + 'static) {
        self.get_mut(phase).add(priority, node);
    }

    #[must_use]
    pub fn with(mut self, phase: Phase, priority: i32, node: impl EffectNode + 'static) -> Self {
        self.add(phase, priority, node);
        self
    }

    /// Total nodes across all phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.iter().map(PriorityList::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(PriorityList::is_empty)
    }

    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            lists: std::array::from_fn(|i| self.lists[i].deep_clone()),
        }
    }

    /// Check every node against the owner kind the table is declared under.
    pub fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        self.lists.iter().try_for_each(|list| list.validate(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OwnerKinds;
    use crate::effects::{CancelAction, Group, Rule};

    fn named(name: &'static str) -> Rule {
        Rule::new(name, OwnerKinds::all(), |_, _| Ok(()))
    }

    #[test]
    fn test_stable_ascending_order() {
        let list = PriorityList::new()
            .with(5, named("x"))
            .with(1, named("y"))
            .with(5, named("z"));

        let names: Vec<_> = list.iter().map(|e| e.node.name()).collect();
        assert_eq!(names, vec!["y", "x", "z"]);
    }

    #[test]
    fn test_negative_priorities_first() {
        let list = PriorityList::new()
            .with(0, named("a"))
            .with(-3, named("b"))
            .with(10, named("c"))
            .with(0, named("d"));

        let names: Vec<_> = list.iter().map(|e| e.node.name()).collect();
        assert_eq!(names, vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn test_deep_clone_unshares_nodes() {
        let list = PriorityList::new().with(0, Group::new().with(CancelAction));
        let mut copy = list.deep_clone();

        assert!(!Rc::ptr_eq(&list.iter().next().unwrap().node, &copy.iter().next().unwrap().node));
        assert!(copy.node_mut(0).is_some());
    }

    #[test]
    fn test_shared_node_is_not_mutable() {
        let list = PriorityList::new().with(0, CancelAction);
        let mut shared = list.clone();
        assert!(shared.node_mut(0).is_none());
    }

    #[test]
    fn test_table_per_phase() {
        let table = EffectTable::new()
            .with(Phase::OnHit, 0, named("a"))
            .with(Phase::OnHit, -1, named("b"))
            .with(Phase::AfterAction, 0, named("c"));

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(Phase::OnHit).len(), 2);
        assert!(table.get(Phase::PreAction).is_empty());
        assert!(!table.is_empty());
    }

    #[test]
    fn test_table_validate() {
        let table = EffectTable::new().with(Phase::PreAction, 0, Rule::new("x", OwnerKinds::ITEM, |_, _| Ok(())));
        assert!(table.validate(OwnerKind::Item).is_ok());
        assert!(table.validate(OwnerKind::Status).is_err());
    }
}
