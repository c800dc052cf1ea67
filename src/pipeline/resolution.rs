//! The trampoline.
//!
//! A [`Resolution`] owns a heap stack of frames. Each frame is one live
//! action: its context plus the stack of routines currently running in
//! it. Calls, nested actions and returns only push and pop those stacks,
//! so arbitrarily deep nesting never deepens the Rust call stack.

use std::rc::Rc;

use crate::context::ActionContext;
use crate::core::{PipelineConfig, PipelineError, PipelineResult};
use crate::effects::{EffectCx, Routine, Step, SuspensionRequest};
use crate::world::World;

use super::executor::ActionRoutine;
use super::judge::StrikeJudge;

/// Something that satisfies suspension requests (plays the animation,
/// waits the ticks) before the pipeline resumes.
pub trait Host {
    fn satisfy(&mut self, request: &SuspensionRequest);
}

impl<F: FnMut(&SuspensionRequest)> Host for F {
    fn satisfy(&mut self, request: &SuspensionRequest) {
        self(request);
    }
}

/// What a call to [`Resolution::resume`] stopped on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The host must satisfy this request, then resume.
    Suspended(SuspensionRequest),
    /// The root action finished.
    Complete,
}

struct Frame {
    ctx: ActionContext,
    stack: Vec<Box<dyn Routine>>,
}

/// An action being resolved.
///
/// A contract violation abandons the whole resolution: every live frame is
/// dropped and each later call reports the same error.
pub struct Resolution {
    frames: Vec<Frame>,
    finished: Option<ActionContext>,
    failed: Option<PipelineError>,
    config: PipelineConfig,
    judge: Rc<dyn StrikeJudge>,
}

impl Resolution {
    pub(crate) fn new(ctx: ActionContext, config: PipelineConfig, judge: Rc<dyn StrikeJudge>) -> Self {
        let root: Box<dyn Routine> = Box::new(ActionRoutine::new(&config, Rc::clone(&judge)));
        Self {
            frames: vec![Frame {
                ctx,
                stack: vec![root],
            }],
            finished: None,
            failed: None,
            config,
            judge,
        }
    }

    /// Run until the host is needed or the root action finishes.
    ///
    /// # Errors
    ///
    /// Contract violations raised by nodes, [`PipelineError::NestingTooDeep`]
    /// when a nested action would exceed the configured depth, and
    /// [`PipelineError::AlreadyComplete`] when called after completion.
    /// Once a contract violation is returned, every later call returns it
    /// again.
    pub fn resume(&mut self, world: &mut dyn World) -> PipelineResult<Progress> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        let progress = self.advance(world);
        if let Err(err) = &progress {
            if err.is_contract_violation() {
                self.abandon(err.clone());
            }
        }
        progress
    }

    fn advance(&mut self, world: &mut dyn World) -> PipelineResult<Progress> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Err(PipelineError::AlreadyComplete);
            };

            let Some(routine) = frame.stack.last_mut() else {
                self.pop_frame();
                if self.frames.is_empty() {
                    return Ok(Progress::Complete);
                }
                continue;
            };

            let mut cx = EffectCx::new(&mut frame.ctx, &mut *world);
            let step = routine.resume(&mut cx)?;
            match step {
                Step::Yield(request) => return Ok(Progress::Suspended(request)),
                Step::Call(child) => frame.stack.push(child),
                Step::Done => {
                    frame.stack.pop();
                }
                Step::SubAction(child) => {
                    let depth = frame.ctx.depth() + 1;
                    self.push_frame(*child, depth)?;
                }
            }
        }
    }

    fn push_frame(&mut self, mut ctx: ActionContext, depth: usize) -> PipelineResult<()> {
        if self.frames.len() >= self.config.max_nesting_depth {
            tracing::warn!(
                depth,
                limit = self.config.max_nesting_depth,
                action = %ctx.data.name,
                "refusing nested action"
            );
            return Err(PipelineError::NestingTooDeep(self.config.max_nesting_depth));
        }
        tracing::debug!(depth, action = %ctx.data.name, "entering nested action");
        ctx.depth = depth;
        let root: Box<dyn Routine> = Box::new(ActionRoutine::new(&self.config, Rc::clone(&self.judge)));
        self.frames.push(Frame {
            ctx,
            stack: vec![root],
        });
        Ok(())
    }

    fn abandon(&mut self, err: PipelineError) {
        tracing::warn!(
            error = %err,
            live_frames = self.frames.len(),
            "abandoning resolution"
        );
        self.frames.clear();
        self.failed = Some(err);
    }

    /// Pop a finished frame, folding its trace into the parent.
    fn pop_frame(&mut self) {
        let Some(done) = self.frames.pop() else {
            return;
        };
        match self.frames.last_mut() {
            Some(parent) => {
                tracing::debug!(depth = done.ctx.depth(), "nested action finished");
                parent.ctx.trace.append(done.ctx.trace);
            }
            None => self.finished = Some(done.ctx),
        }
    }

    /// Drive to completion, handing every suspension to `host`.
    pub fn run(mut self, world: &mut dyn World, mut host: impl Host) -> PipelineResult<ActionContext> {
        loop {
            match self.resume(world)? {
                Progress::Suspended(request) => host.satisfy(&request),
                Progress::Complete => return self.into_context(),
            }
        }
    }

    /// True once the root action finished normally.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.finished.is_some()
    }

    /// The error that abandoned this resolution, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&PipelineError> {
        self.failed.as_ref()
    }

    /// Live frames, root included. 0 once complete.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Context of the innermost live action.
    #[must_use]
    pub fn current(&self) -> Option<&ActionContext> {
        self.frames.last().map(|frame| &frame.ctx)
    }

    /// The root context once the resolution is complete.
    ///
    /// # Errors
    ///
    /// The error that abandoned the resolution, or
    /// [`PipelineError::AlreadyComplete`] if it has not finished.
    pub fn into_context(self) -> PipelineResult<ActionContext> {
        match self.failed {
            Some(err) => Err(err),
            None => self.finished.ok_or(PipelineError::AlreadyComplete),
        }
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("depth", &self.frames.len())
            .field("complete", &self.is_complete())
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}
