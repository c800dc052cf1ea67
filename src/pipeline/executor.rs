//! The phase executor.
//!
//! [`ActionRoutine`] is the root routine of every action frame. It walks
//! the phases in order, builds each phase's schedule from the action's own
//! effect table plus every attached passive source, and hands the nodes to
//! the trampoline one at a time.
//!
//! Cancellation is polled before every node (a set flag abandons the rest
//! of the phase) and between phases (a set flag skips every later phase).
//! Nothing already run is undone.

use std::rc::Rc;

use crate::context::{ActionContext, GameEventOwner};
use crate::core::{EntityId, PipelineConfig, PipelineError, PipelineResult};
use crate::effects::{EffectCx, Invocation, NodeRef, Routine, Step};
use crate::state::{AttackHit, Snapshot, TargetEvasion, UserAccuracy};
use crate::world::{Stat, World};

use super::judge::{StrikeJudge, StrikeOutcome};
use super::phase::Phase;
use super::resolution::{Host, Resolution};
use super::trace::TraceRecord;

/// One node of a phase schedule.
#[derive(Clone, Debug)]
struct Scheduled {
    priority: i32,
    node: NodeRef,
    owner: GameEventOwner,
    acting: EntityId,
}

/// A phase being run.
struct PhaseRun {
    phase: Phase,
    schedule: Vec<Scheduled>,
    next: usize,
}

/// Where the action is between phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    /// Next opening phase to run.
    Opening(usize),
    /// Start the next strike, or close if none are left.
    StrikeStart,
    /// Before-hit has run; judge the strike.
    Judge,
    /// On-hit has run; run after-hit.
    AfterHit,
    /// Count the strike and loop.
    StrikeEnd,
    Closing,
    Finished,
}

/// Root routine of one action frame.
pub(crate) struct ActionRoutine {
    judge: Rc<dyn StrikeJudge>,
    max_strikes: u32,
    record_trace: bool,
    cursor: Cursor,
    running: Option<PhaseRun>,
}

impl ActionRoutine {
    pub(crate) fn new(config: &PipelineConfig, judge: Rc<dyn StrikeJudge>) -> Self {
        Self {
            judge,
            max_strikes: config.max_strikes,
            record_trace: config.record_trace,
            cursor: Cursor::Opening(0),
            running: None,
        }
    }

    /// Snapshot the schedule for `phase`.
    ///
    /// The action's own list comes first, then each passive source in attach
    /// order; a stable sort by priority keeps that order among ties.
    fn schedule(cx: &EffectCx<'_>, phase: Phase) -> Vec<Scheduled> {
        let ctx = &*cx.ctx;
        let own = ctx.data.effects.get(phase).iter().map(|e| Scheduled {
            priority: e.priority,
            node: Rc::clone(&e.node),
            owner: ctx.owner,
            acting: ctx.user,
        });
        let passive = ctx.passives.iter().flat_map(|source| {
            source.table.get(phase).iter().map(move |e| Scheduled {
                priority: e.priority,
                node: Rc::clone(&e.node),
                owner: source.owner,
                acting: source.holder,
            })
        });

        let mut schedule: Vec<_> = own.chain(passive).collect();
        schedule.sort_by_key(|s| s.priority);
        schedule
    }

    fn start_phase(&mut self, cx: &EffectCx<'_>, phase: Phase) {
        let schedule = Self::schedule(cx, phase);
        tracing::debug!(
            ?phase,
            depth = cx.ctx.depth(),
            strike = cx.ctx.strikes_made,
            nodes = schedule.len(),
            "entering phase"
        );
        self.running = Some(PhaseRun {
            phase,
            schedule,
            next: 0,
        });
    }

    /// Next node call of the running phase, or `None` once it is over.
    fn next_call(&mut self, cx: &mut EffectCx<'_>) -> Option<Step> {
        let run = self.running.as_mut()?;
        let Some(entry) = run.schedule.get(run.next) else {
            self.running = None;
            return None;
        };
        if cx.ctx.is_cancelled() {
            tracing::debug!(
                phase = ?run.phase,
                skipped = run.schedule.len() - run.next,
                "phase aborted by cancellation"
            );
            self.running = None;
            return None;
        }
        run.next += 1;

        let strike = run.phase.is_per_strike().then_some(cx.ctx.strikes_made);
        tracing::trace!(
            phase = ?run.phase,
            priority = entry.priority,
            node = entry.node.name(),
            owner = %entry.owner,
            "applying node"
        );
        if self.record_trace {
            let depth = cx.ctx.depth();
            cx.ctx.trace.push_back(TraceRecord {
                depth,
                phase: run.phase,
                strike,
                priority: entry.priority,
                owner: entry.owner,
                node: entry.node.name(),
            });
        }
        let inv = Invocation::new(entry.owner, entry.acting);
        Some(Step::Call(entry.node.apply(inv)))
    }

    /// Every node the action will schedule must accept the owner kind it
    /// runs under, however the context was assembled.
    fn check_wiring(ctx: &ActionContext) -> PipelineResult<()> {
        ctx.data.effects.validate(ctx.owner.kind())?;
        ctx.passives
            .iter()
            .try_for_each(|source| source.table.validate(source.owner.kind()))
    }

    fn check_strikes(&self, ctx: &ActionContext) -> PipelineResult<()> {
        if ctx.strikes > self.max_strikes {
            return Err(PipelineError::TooManyStrikes {
                declared: ctx.strikes,
                limit: self.max_strikes,
            });
        }
        Ok(())
    }

    /// Clear local state and freeze this strike's accuracy and evasion.
    fn begin_strike(cx: &mut EffectCx<'_>) {
        cx.ctx.begin_strike();
        let accuracy = cx.world.stat(cx.ctx.user, Stat::Accuracy);
        let evasion = cx
            .ctx
            .target
            .map_or(0, |target| cx.world.stat(target, Stat::Evasion));
        cx.ctx.local.set(Snapshot::<UserAccuracy>::new(accuracy));
        cx.ctx.local.set(Snapshot::<TargetEvasion>::new(evasion));
    }
}

impl Routine for ActionRoutine {
    fn resume(&mut self, cx: &mut EffectCx<'_>) -> PipelineResult<Step> {
        loop {
            if self.running.is_some() {
                if let Some(step) = self.next_call(cx) {
                    return Ok(step);
                }
                continue;
            }

            if self.cursor != Cursor::Finished && cx.ctx.is_cancelled() {
                tracing::debug!(depth = cx.ctx.depth(), "skipping remaining phases");
                self.cursor = Cursor::Finished;
            }

            match self.cursor {
                Cursor::Opening(i) => {
                    if i == 0 {
                        Self::check_wiring(&*cx.ctx)?;
                        self.check_strikes(&*cx.ctx)?;
                    }
                    match Phase::OPENING.get(i) {
                        Some(&phase) => {
                            self.cursor = Cursor::Opening(i + 1);
                            self.start_phase(cx, phase);
                        }
                        None => self.cursor = Cursor::StrikeStart,
                    }
                }
                Cursor::StrikeStart => {
                    if cx.ctx.strikes_made >= cx.ctx.strikes {
                        self.cursor = Cursor::Closing;
                    } else {
                        // Opening phases may have substituted the action.
                        self.check_strikes(&*cx.ctx)?;
                        if cx.ctx.strikes_made == 0 {
                            Self::check_wiring(&*cx.ctx)?;
                        }
                        Self::begin_strike(cx);
                        self.cursor = Cursor::Judge;
                        self.start_phase(cx, Phase::BeforeHit);
                    }
                }
                Cursor::Judge => {
                    let outcome = self.judge.judge(cx)?;
                    tracing::debug!(
                        strike = cx.ctx.strikes_made,
                        ?outcome,
                        "strike judged"
                    );
                    match outcome {
                        StrikeOutcome::Hit => {
                            cx.ctx.global.set(AttackHit);
                            self.cursor = Cursor::AfterHit;
                            self.start_phase(cx, Phase::OnHit);
                        }
                        StrikeOutcome::Miss => self.cursor = Cursor::StrikeEnd,
                    }
                }
                Cursor::AfterHit => {
                    self.cursor = Cursor::StrikeEnd;
                    self.start_phase(cx, Phase::AfterHit);
                }
                Cursor::StrikeEnd => {
                    cx.ctx.strikes_made += 1;
                    self.cursor = Cursor::StrikeStart;
                }
                Cursor::Closing => {
                    self.cursor = Cursor::Finished;
                    self.start_phase(cx, Phase::AfterAction);
                }
                Cursor::Finished => return Ok(Step::Done),
            }
        }
    }
}

/// Entry point: runs actions through the phase pipeline.
///
/// ```
/// use dungeon_effects::context::{ActionContext, GameEventOwner, SkillId};
/// use dungeon_effects::core::{EntityId, PipelineConfig};
/// use dungeon_effects::data::ActionData;
/// use dungeon_effects::effects::SuspensionRequest;
/// use dungeon_effects::pipeline::Pipeline;
/// use dungeon_effects::world::Sandbox;
///
/// let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
/// let mut world = Sandbox::new(7);
///
/// let ctx = ActionContext::new(EntityId(1), GameEventOwner::Skill(SkillId(1)), ActionData::new("Wait"));
/// let done = pipeline.execute(ctx, &mut world, |_: &SuspensionRequest| {}).unwrap();
/// assert_eq!(done.strikes_made, 1);
/// ```
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    judge: Rc<dyn StrikeJudge>,
}

impl Pipeline {
    /// Pipeline with the default [`AccuracyJudge`](super::AccuracyJudge).
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let judge = Rc::new(super::judge::AccuracyJudge::new(config.accuracy_stage_cap));
        Ok(Self { config, judge })
    }

    #[must_use]
    pub fn with_judge(mut self, judge: impl StrikeJudge + 'static) -> Self {
        self.judge = Rc::new(judge);
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Start resolving an action. Nothing runs until the first resume.
    #[must_use]
    pub fn begin(&self, ctx: ActionContext) -> Resolution {
        tracing::debug!(
            user = %ctx.user,
            owner = %ctx.owner,
            action = %ctx.data.name,
            "beginning action"
        );
        Resolution::new(ctx, self.config.clone(), Rc::clone(&self.judge))
    }

    /// Resolve an action to completion, passing every suspension to `host`.
    pub fn execute(
        &self,
        ctx: ActionContext,
        world: &mut dyn World,
        host: impl Host,
    ) -> PipelineResult<ActionContext> {
        self.begin(ctx).run(world, host)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
