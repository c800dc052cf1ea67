//! Resumable routines.
//!
//! An effect node does not run directly: [`EffectNode::apply`] returns a
//! [`Routine`], and the trampoline in [`crate::pipeline`] resumes it until
//! it reports [`Step::Done`]. Each resume hands back exactly one step, so a
//! routine can pause for the host, call a child routine, or ask for a whole
//! nested action without the Rust call stack growing.
//!
//! [`EffectNode::apply`]: super::EffectNode::apply

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::context::ActionContext;
use crate::core::{EntityId, PipelineResult};
use crate::world::World;

use super::node::{Invocation, NodeRef};

/// A host-side operation the pipeline must wait on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuspensionRequest {
    /// Let `ticks` frames pass.
    Wait { ticks: u32 },
    /// Play a visual cue anchored on an entity.
    Visual { cue: String, at: EntityId },
    /// Play a sound.
    Audio { cue: String },
}

impl SuspensionRequest {
    #[must_use]
    pub const fn wait(ticks: u32) -> Self {
        Self::Wait { ticks }
    }

    #[must_use]
    pub fn visual(cue: impl Into<String>, at: EntityId) -> Self {
        Self::Visual {
            cue: cue.into(),
            at,
        }
    }

    #[must_use]
    pub fn audio(cue: impl Into<String>) -> Self {
        Self::Audio { cue: cue.into() }
    }
}

/// What a routine wants next.
pub enum Step {
    /// Surface a request to the host; resume after it is satisfied.
    Yield(SuspensionRequest),
    /// Run a child routine to completion, then resume this one.
    Call(Box<dyn Routine>),
    /// Run a nested action to completion with its own context, then resume.
    SubAction(Box<ActionContext>),
    /// Finished.
    Done,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yield(request) => f.debug_tuple("Yield").field(request).finish(),
            Self::Call(_) => f.write_str("Call(..)"),
            Self::SubAction(ctx) => f.debug_tuple("SubAction").field(&ctx.data.name).finish(),
            Self::Done => f.write_str("Done"),
        }
    }
}

/// Services handed to a routine on every resume.
pub struct EffectCx<'a> {
    pub ctx: &'a mut ActionContext,
    pub world: &'a mut dyn World,
}

impl<'a> EffectCx<'a> {
    pub fn new(ctx: &'a mut ActionContext, world: &'a mut dyn World) -> Self {
        Self { ctx, world }
    }

    /// The entity `inv` currently affects, if any.
    #[must_use]
    pub fn affected(&self, inv: &Invocation) -> Option<EntityId> {
        inv.affected(&*self.ctx)
    }
}

/// A resumable unit of work.
pub trait Routine {
    fn resume(&mut self, cx: &mut EffectCx<'_>) -> PipelineResult<Step>;
}

// ============================================================================
// Building blocks
// ============================================================================

/// Runs a closure once, then finishes.
struct Once<F> {
    f: Option<F>,
}

impl<F> Routine for Once<F>
where
    F: FnOnce(&mut EffectCx<'_>) -> PipelineResult<()>,
{
    fn resume(&mut self, cx: &mut EffectCx<'_>) -> PipelineResult<Step> {
        if let Some(f) = self.f.take() {
            f(cx)?;
        }
        Ok(Step::Done)
    }
}

/// A routine that mutates the context once and finishes without suspending.
pub fn once<F>(f: F) -> Box<dyn Routine>
where
    F: FnOnce(&mut EffectCx<'_>) -> PipelineResult<()> + 'static,
{
    Box::new(Once { f: Some(f) })
}

struct FromFn<F>(F);

impl<F> Routine for FromFn<F>
where
    F: FnMut(&mut EffectCx<'_>) -> PipelineResult<Step>,
{
    fn resume(&mut self, cx: &mut EffectCx<'_>) -> PipelineResult<Step> {
        (self.0)(cx)
    }
}

/// A routine driven by a closure that is called on every resume.
pub fn from_fn<F>(f: F) -> Box<dyn Routine>
where
    F: FnMut(&mut EffectCx<'_>) -> PipelineResult<Step> + 'static,
{
    Box::new(FromFn(f))
}

struct Finished;

impl Routine for Finished {
    fn resume(&mut self, _cx: &mut EffectCx<'_>) -> PipelineResult<Step> {
        Ok(Step::Done)
    }
}

/// A routine that does nothing.
#[must_use]
pub fn done() -> Box<dyn Routine> {
    Box::new(Finished)
}

/// Yields each queued request in order.
pub(crate) struct Emit {
    queue: VecDeque<SuspensionRequest>,
}

impl Emit {
    pub(crate) fn new(requests: impl IntoIterator<Item = SuspensionRequest>) -> Self {
        Self {
            queue: requests.into_iter().collect(),
        }
    }
}

impl Routine for Emit {
    fn resume(&mut self, _cx: &mut EffectCx<'_>) -> PipelineResult<Step> {
        Ok(self.queue.pop_front().map_or(Step::Done, Step::Yield))
    }
}

/// Applies each node in order, one child routine at a time.
///
/// Does not look at the cancellation flag: that is the executor's job.
pub(crate) struct Sequence {
    nodes: Vec<NodeRef>,
    inv: Invocation,
    next: usize,
}

impl Sequence {
    pub(crate) fn new(nodes: Vec<NodeRef>, inv: Invocation) -> Self {
        Self { nodes, inv, next: 0 }
    }
}

impl Routine for Sequence {
    fn resume(&mut self, _cx: &mut EffectCx<'_>) -> PipelineResult<Step> {
        let Some(node) = self.nodes.get(self.next) else {
            return Ok(Step::Done);
        };
        self.next += 1;
        Ok(Step::Call(node.apply(self.inv)))
    }
}
