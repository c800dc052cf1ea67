//! Composite nodes.
//!
//! Every combinator here is an ordinary [`EffectNode`]: it only uses
//! `apply`, `clone_node` and `validate` of its children.

use std::fmt;
use std::rc::Rc;

use crate::context::{ActionContext, OwnerKind};
use crate::core::PipelineResult;
use crate::state::{Additive, Knockouts};

use super::condition::Predicate;
use super::node::{deep_clone, AffectScope, EffectNode, Invocation, NodeRef};
use super::routine::{from_fn, EffectCx, Routine, Sequence, Step};

fn validate_all(children: &[NodeRef], kind: OwnerKind) -> PipelineResult<()> {
    children.iter().try_for_each(|child| child.validate(kind))
}

fn deep_clone_all(children: &[NodeRef]) -> Vec<NodeRef> {
    children.iter().map(deep_clone).collect()
}

// ============================================================================
// Group
// ============================================================================

/// Runs its children in order, unconditionally.
///
/// A group never checks the cancellation flag between children. A child
/// that cares can check it itself.
#[derive(Debug, Default)]
pub struct Group {
    children: Vec<NodeRef>,
}

impl Group {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, node: impl EffectNode + 'static) -> Self {
        self.children.push(Rc::new(node));
        self
    }

    pub fn push(&mut self, node: NodeRef) {
        self.children.push(node);
    }

    #[must_use]
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Clone for Group {
    /// Deep: the copy's children are fresh nodes.
    fn clone(&self) -> Self {
        Self {
            children: deep_clone_all(&self.children),
        }
    }
}

impl FromIterator<NodeRef> for Group {
    fn from_iter<I: IntoIterator<Item = NodeRef>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl EffectNode for Group {
    fn apply(&self, inv: Invocation) -> Box<dyn Routine> {
        Box::new(Sequence::new(self.children.clone(), inv))
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "Group"
    }

    fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        validate_all(&self.children, kind)
    }
}

// ============================================================================
// Conditional
// ============================================================================

/// Runs its children only when the predicate holds at application time.
#[derive(Debug)]
pub struct Conditional {
    predicate: Predicate,
    children: Vec<NodeRef>,
}

impl Conditional {
    #[must_use]
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, node: impl EffectNode + 'static) -> Self {
        self.children.push(Rc::new(node));
        self
    }

    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Clone for Conditional {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            children: deep_clone_all(&self.children),
        }
    }
}

impl EffectNode for Conditional {
    fn apply(&self, inv: Invocation) -> Box<dyn Routine> {
        let predicate = self.predicate.clone();
        let mut children = Some(self.children.clone());
        from_fn(move |cx| {
            // Evaluated once; the second resume is the return from the body.
            let Some(children) = children.take() else {
                return Ok(Step::Done);
            };
            if predicate.evaluate(&inv, cx) {
                Ok(Step::Call(Box::new(Sequence::new(children, inv))))
            } else {
                Ok(Step::Done)
            }
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "Conditional"
    }

    fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        validate_all(&self.children, kind)
    }
}

// ============================================================================
// RandomChoice
// ============================================================================

/// Runs exactly one child, picked with one RNG draw.
///
/// Children added with [`or`](Self::or) have weight 1, so a plain choice is
/// uniform. An empty choice does nothing and draws nothing.
#[derive(Debug, Default)]
pub struct RandomChoice {
    options: Vec<(u32, NodeRef)>,
    total: u32,
}

impl RandomChoice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn or(self, node: impl EffectNode + 'static) -> Self {
        self.weighted(1, node)
    }

    /// Largest total weight a single draw can cover.
    pub const MAX_TOTAL_WEIGHT: u32 = i32::MAX.unsigned_abs();

    /// # Panics
    ///
    /// Panics if the total weight would exceed
    /// [`MAX_TOTAL_WEIGHT`](Self::MAX_TOTAL_WEIGHT): that is malformed content.
    #[must_use]
    pub fn weighted(mut self, weight: u32, node: impl EffectNode + 'static) -> Self {
        let total = self
            .total
            .checked_add(weight)
            .filter(|total| *total <= Self::MAX_TOTAL_WEIGHT);
        let Some(total) = total else {
            panic!(
                "random choice weight {weight} pushes the total past {} (currently {})",
                Self::MAX_TOTAL_WEIGHT,
                self.total
            );
        };
        self.options.push((weight, Rc::new(node)));
        self.total = total;
        self
    }
}

impl Clone for RandomChoice {
    fn clone(&self) -> Self {
        Self {
            options: self
                .options
                .iter()
                .map(|(w, node)| (*w, deep_clone(node)))
                .collect(),
            total: self.total,
        }
    }
}

impl EffectNode for RandomChoice {
    fn apply(&self, inv: Invocation) -> Box<dyn Routine> {
        let total = self.total;
        let mut options = Some(self.options.clone());
        from_fn(move |cx| {
            let Some(options) = options.take() else {
                return Ok(Step::Done);
            };
            if total == 0 {
                return Ok(Step::Done);
            }
            let bound = i32::try_from(total).unwrap_or(i32::MAX);
            let mut roll = u32::try_from(cx.world.rng().next_int(bound)).unwrap_or(0);
            for (weight, node) in &options {
                if roll < *weight {
                    return Ok(Step::Call(node.apply(inv)));
                }
                roll -= weight;
            }
            Ok(Step::Done)
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "RandomChoice"
    }

    fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        self.options.iter().try_for_each(|(_, node)| node.validate(kind))
    }
}

// ============================================================================
// Repeat
// ============================================================================

/// Where a [`Repeat`] takes its count from.
#[derive(Clone, Copy)]
pub enum CountSource {
    Fixed(u32),
    /// Strikes judged so far in this action.
    StrikesMade,
    /// Knockouts recorded in the global `Additive<Knockouts>`.
    Knockouts,
    Derived(fn(&ActionContext) -> u32),
}

impl CountSource {
    #[must_use]
    pub fn evaluate(&self, ctx: &ActionContext) -> u32 {
        match *self {
            Self::Fixed(n) => n,
            Self::StrikesMade => ctx.strikes_made,
            Self::Knockouts => ctx
                .global
                .get::<Additive<Knockouts>>()
                .map_or(0, |k| u32::try_from(k.value()).unwrap_or(0)),
            Self::Derived(f) => f(ctx),
        }
    }
}

impl fmt::Debug for CountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => f.debug_tuple("Fixed").field(n).finish(),
            Self::StrikesMade => f.write_str("StrikesMade"),
            Self::Knockouts => f.write_str("Knockouts"),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Runs its children once per unit of a count read from the context.
///
/// The count is read once, when the node starts.
#[derive(Debug)]
pub struct Repeat {
    count: CountSource,
    children: Vec<NodeRef>,
}

impl Repeat {
    #[must_use]
    pub fn new(count: CountSource) -> Self {
        Self {
            count,
            children: Vec::new(),
        }
    }

    /// Once per knockout caused so far this action.
    #[must_use]
    pub fn per_knockout() -> Self {
        Self::new(CountSource::Knockouts)
    }

    #[must_use]
    pub fn times(n: u32) -> Self {
        Self::new(CountSource::Fixed(n))
    }

    #[must_use]
    pub fn then(mut self, node: impl EffectNode + 'static) -> Self {
        self.children.push(Rc::new(node));
        self
    }
}

impl Clone for Repeat {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            children: deep_clone_all(&self.children),
        }
    }
}

impl EffectNode for Repeat {
    fn apply(&self, inv: Invocation) -> Box<dyn Routine> {
        let count = self.count;
        let children = self.children.clone();
        let mut remaining: Option<u32> = None;
        from_fn(move |cx: &mut EffectCx<'_>| {
            let left = remaining.get_or_insert_with(|| count.evaluate(&*cx.ctx));
            if *left == 0 || children.is_empty() {
                return Ok(Step::Done);
            }
            *left -= 1;
            Ok(Step::Call(Box::new(Sequence::new(children.clone(), inv))))
        })
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "Repeat"
    }

    fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        validate_all(&self.children, kind)
    }
}

// ============================================================================
// Scoped
// ============================================================================

/// Runs a child with a different notion of the affected entity.
#[derive(Debug)]
pub struct Scoped {
    scope: AffectScope,
    child: NodeRef,
}

impl Scoped {
    #[must_use]
    pub fn new(scope: AffectScope, child: impl EffectNode + 'static) -> Self {
        Self {
            scope,
            child: Rc::new(child),
        }
    }

    #[must_use]
    pub fn on_user(child: impl EffectNode + 'static) -> Self {
        Self::new(AffectScope::User, child)
    }

    #[must_use]
    pub fn on_acting(child: impl EffectNode + 'static) -> Self {
        Self::new(AffectScope::Acting, child)
    }
}

impl Clone for Scoped {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope,
            child: deep_clone(&self.child),
        }
    }
}

impl EffectNode for Scoped {
    fn apply(&self, inv: Invocation) -> Box<dyn Routine> {
        self.child.apply(inv.with_scope(self.scope))
    }

    fn clone_node(&self) -> Box<dyn EffectNode> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "Scoped"
    }

    fn validate(&self, kind: OwnerKind) -> PipelineResult<()> {
        self.child.validate(kind)
    }
}
