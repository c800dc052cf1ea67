//! Strike judgement.

use crate::core::PipelineResult;
use crate::effects::EffectCx;
use crate::state::{
    AccuracyBoost, Additive, EvasionBoost, HitRate, Multiplier, Snapshot, TargetEvasion,
    UserAccuracy,
};

/// Result of judging one strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrikeOutcome {
    Hit,
    Miss,
}

/// Decides whether a strike lands, after its before-hit phase ran.
pub trait StrikeJudge {
    fn judge(&self, cx: &mut EffectCx<'_>) -> PipelineResult<StrikeOutcome>;
}

/// Default judge: hit rate times accumulated multipliers, scaled by the
/// accuracy/evasion stage, against one `next_int(100)` draw.
///
/// Sure hits (negative base rate, or an overridden hit-rate multiplier)
/// and strikes without a target do not draw.
#[derive(Clone, Copy, Debug)]
pub struct AccuracyJudge {
    stage_cap: i32,
}

impl AccuracyJudge {
    #[must_use]
    pub const fn new(stage_cap: i32) -> Self {
        Self { stage_cap }
    }

    /// Hit threshold in percent, or `None` for a sure hit.
    #[must_use]
    pub fn threshold(&self, cx: &EffectCx<'_>) -> Option<i64> {
        let ctx = &*cx.ctx;
        let base = i64::from(ctx.data.hit_rate);
        if base < 0 {
            return None;
        }

        let global = ctx.global.get::<Multiplier<HitRate>>();
        let local = ctx.local.get::<Multiplier<HitRate>>();
        if global.is_some_and(Multiplier::is_overridden) || local.is_some_and(Multiplier::is_overridden) {
            return None;
        }
        let rate = apply(local, apply(global, base));

        let boosts = additive::<AccuracyBoost>(ctx) - additive::<EvasionBoost>(ctx);
        let accuracy = ctx.local.get::<Snapshot<UserAccuracy>>().map_or(0, Snapshot::value);
        let evasion = ctx.local.get::<Snapshot<TargetEvasion>>().map_or(0, Snapshot::value);
        let stage = (accuracy - evasion + boosts).clamp(-self.stage_cap, self.stage_cap);

        let stage = i64::from(stage);
        Some(if stage >= 0 {
            rate * (3 + stage) / 3
        } else {
            rate * 3 / (3 - stage)
        })
    }
}

impl Default for AccuracyJudge {
    fn default() -> Self {
        Self::new(6)
    }
}

fn apply(multiplier: Option<&Multiplier<HitRate>>, value: i64) -> i64 {
    multiplier.map_or(value, |m| m.multiply(value))
}

/// Sum of both scopes.
fn additive<K: 'static>(ctx: &crate::context::ActionContext) -> i32 {
    let local = ctx.local.get::<Additive<K>>().map_or(0, Additive::value);
    let global = ctx.global.get::<Additive<K>>().map_or(0, Additive::value);
    local.saturating_add(global)
}

impl StrikeJudge for AccuracyJudge {
    fn judge(&self, cx: &mut EffectCx<'_>) -> PipelineResult<StrikeOutcome> {
        if cx.ctx.target.is_none() {
            return Ok(StrikeOutcome::Miss);
        }
        let Some(threshold) = self.threshold(cx) else {
            return Ok(StrikeOutcome::Hit);
        };
        let roll = cx.world.rng().next_int(100);
        tracing::trace!(roll, threshold, "accuracy roll");
        Ok(if i64::from(roll) < threshold {
            StrikeOutcome::Hit
        } else {
            StrikeOutcome::Miss
        })
    }
}

/// Judge that lands every targeted strike without drawing.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysHit;

impl StrikeJudge for AlwaysHit {
    fn judge(&self, cx: &mut EffectCx<'_>) -> PipelineResult<StrikeOutcome> {
        Ok(if cx.ctx.target.is_some() {
            StrikeOutcome::Hit
        } else {
            StrikeOutcome::Miss
        })
    }
}
