//! Scenario tests: accuracy judgement against scripted draws, and replay
//! of whole actions from an RNG checkpoint.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use dungeon_effects::context::{ActionContext, GameEventOwner, OwnerKinds, SkillId, StateScope};
use dungeon_effects::core::{EntityId, GameRng, PipelineConfig, RandomSource};
use dungeon_effects::data::ActionData;
use dungeon_effects::effects::{
    AddStat, Conditional, ModifyMultiplier, Predicate, RandomChoice, Rule, SuspensionRequest,
};
use dungeon_effects::pipeline::{Phase, Pipeline};
use dungeon_effects::state::{AccuracyBoost, AttackHit, HitRate, StrikeDamage};
use dungeon_effects::world::{Sandbox, Stat};

const HERO: EntityId = EntityId(1);
const SLIME: EntityId = EntityId(2);

/// Plays back fixed draws and counts how many were taken.
#[derive(Debug)]
struct Scripted {
    draws: VecDeque<i32>,
    taken: Rc<Cell<usize>>,
}

impl Scripted {
    fn new(draws: impl IntoIterator<Item = i32>) -> (Self, Rc<Cell<usize>>) {
        let taken = Rc::new(Cell::new(0));
        let rng = Self {
            draws: draws.into_iter().collect(),
            taken: Rc::clone(&taken),
        };
        (rng, taken)
    }
}

impl RandomSource for Scripted {
    fn next_int(&mut self, bound: i32) -> i32 {
        self.taken.set(self.taken.get() + 1);
        let value = self.draws.pop_front().unwrap_or(0);
        assert!(value < bound, "scripted draw {value} out of range for bound {bound}");
        value
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).unwrap()
}

fn ignore(_: &SuspensionRequest) {}

// =============================================================================
// Accuracy
// =============================================================================

/// Base 80, halved, then +2 accuracy stages: threshold 66.
fn focused_swing() -> ActionContext {
    let data = ActionData::new("Focused Swing")
        .with_hit_rate(80)
        .with_effect(Phase::BeforeHit, 0, ModifyMultiplier::<HitRate>::local(1, 2))
        .with_effect(Phase::BeforeHit, 0, AddStat::<AccuracyBoost>::local(2));
    ActionContext::new(HERO, GameEventOwner::Skill(SkillId(1)), data).with_target(SLIME)
}

/// A draw just under the threshold hits.
#[test]
fn test_draw_below_threshold_hits() {
    let (rng, taken) = Scripted::new([65]);
    let mut world = Sandbox::with_rng(rng);

    let done = pipeline().execute(focused_swing(), &mut world, ignore).unwrap();
    assert!(done.global.contains::<AttackHit>());
    assert_eq!(taken.get(), 1);
}

/// A draw at the threshold misses.
#[test]
fn test_draw_at_threshold_misses() {
    let (rng, taken) = Scripted::new([66]);
    let mut world = Sandbox::with_rng(rng);

    let done = pipeline().execute(focused_swing(), &mut world, ignore).unwrap();
    assert!(!done.global.contains::<AttackHit>());
    assert_eq!(taken.get(), 1);
}

/// The target's evasion stage is read at strike start and counts against
/// the user.
#[test]
fn test_target_evasion_lowers_threshold() {
    // Stage +2 - 3 = -1: 40 * 3 / 4 = 30.
    let (rng, _) = Scripted::new([30]);
    let mut world = Sandbox::with_rng(rng);
    world.set_stat(SLIME, Stat::Evasion, 3);

    let done = pipeline().execute(focused_swing(), &mut world, ignore).unwrap();
    assert!(!done.global.contains::<AttackHit>());
}

/// Sure hits never touch the RNG.
#[test]
fn test_sure_hit_does_not_draw() {
    let (rng, taken) = Scripted::new(std::iter::empty());
    let mut world = Sandbox::with_rng(rng);

    let sure = ActionData::new("Swift").sure_hit().with_strikes(3);
    let ctx = ActionContext::new(HERO, GameEventOwner::Skill(SkillId(2)), sure).with_target(SLIME);

    let done = pipeline().execute(ctx, &mut world, ignore).unwrap();
    assert!(done.global.contains::<AttackHit>());
    assert_eq!(done.strikes_made, 3);
    assert_eq!(taken.get(), 0);
}

/// A sure-hit override from a passive rule skips the draw too.
#[test]
fn test_override_makes_sure_hit() {
    let (rng, taken) = Scripted::new(std::iter::empty());
    let mut world = Sandbox::with_rng(rng);

    let data = ActionData::new("Lock-On Strike")
        .with_hit_rate(10)
        .with_effect(Phase::BeforeHit, 0, ModifyMultiplier::<HitRate>::absolute(StateScope::Local));
    let ctx = ActionContext::new(HERO, GameEventOwner::Skill(SkillId(3)), data).with_target(SLIME);

    let done = pipeline().execute(ctx, &mut world, ignore).unwrap();
    assert!(done.global.contains::<AttackHit>());
    assert_eq!(taken.get(), 0);
}

// =============================================================================
// Replay
// =============================================================================

/// Damage rolled per strike, in order.
#[derive(Clone, Debug, Default, PartialEq)]
struct Rolls(Vec<i32>);

fn roll_damage() -> Rule {
    Rule::new("roll damage", OwnerKinds::all(), |_, cx| {
        let roll = cx.world.rng().next_int(20);
        cx.ctx.global.get_or_default::<Rolls>().0.push(roll);
        Ok(())
    })
}

fn wild_flurry() -> ActionContext {
    let data = ActionData::new("Wild Flurry")
        .with_hit_rate(70)
        .with_strikes(4)
        .with_effect(
            Phase::BeforeHit,
            0,
            Conditional::new(Predicate::Chance(50)).then(AddStat::<AccuracyBoost>::local(1)),
        )
        .with_effect(Phase::OnHit, 0, roll_damage())
        .with_effect(
            Phase::OnHit,
            1,
            RandomChoice::new()
                .or(AddStat::<StrikeDamage>::global(1))
                .weighted(3, AddStat::<StrikeDamage>::global(10)),
        );
    ActionContext::new(HERO, GameEventOwner::Skill(SkillId(4)), data).with_target(SLIME)
}

/// Restoring an RNG checkpoint replays the same action bit for bit.
#[test]
fn test_checkpoint_replays_action() {
    let mut world = Sandbox::new(2024);
    // Burn a few draws so the checkpoint is mid-stream.
    for _ in 0..7 {
        world.random_mut().next_int(1000);
    }
    let checkpoint = world.random().state();

    let first = pipeline().execute(wild_flurry(), &mut world, ignore).unwrap();
    let after_first = world.random().state();

    let mut replay = Sandbox::with_rng(GameRng::from_state(&checkpoint));
    let second = pipeline().execute(wild_flurry(), &mut replay, ignore).unwrap();

    assert_eq!(first.trace(), second.trace());
    assert_eq!(first.global.get::<Rolls>(), second.global.get::<Rolls>());
    assert_eq!(
        first.global.contains::<AttackHit>(),
        second.global.contains::<AttackHit>()
    );
    assert_eq!(replay.random().state(), after_first);
}

/// Different seeds are free to diverge, but each is self-consistent.
#[test]
fn test_same_seed_same_outcome() {
    let outcome = |seed| {
        let mut world = Sandbox::new(seed);
        let done = pipeline().execute(wild_flurry(), &mut world, ignore).unwrap();
        (done.global.get::<Rolls>().cloned(), done.trace().len())
    };

    for seed in [1, 2, 3] {
        assert_eq!(outcome(seed), outcome(seed));
    }
}
