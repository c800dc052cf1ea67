//! Phase pipeline.
//!
//! ## Design
//!
//! - [`PriorityList`] / [`EffectTable`]: static, per-phase node lists.
//! - [`Pipeline`]: runs one action through the phases.
//! - [`Resolution`]: the trampoline that drives routines and nested
//!   actions, surfacing suspension requests to the host.
//! - [`StrikeJudge`]: decides hit or miss per strike.
//!
//! ## Example
//!
//! ```
//! use dungeon_effects::context::{ActionContext, GameEventOwner, SkillId};
//! use dungeon_effects::core::{EntityId, PipelineConfig};
//! use dungeon_effects::data::ActionData;
//! use dungeon_effects::effects::{Present, SuspensionRequest};
//! use dungeon_effects::pipeline::{Phase, Pipeline, Progress};
//! use dungeon_effects::world::Sandbox;
//!
//! let data = ActionData::new("Growl")
//!     .with_effect(Phase::PreAction, 0, Present::new([SuspensionRequest::audio("growl")]));
//! let ctx = ActionContext::new(EntityId(1), GameEventOwner::Skill(SkillId(45)), data);
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let mut world = Sandbox::new(3);
//! let mut resolution = pipeline.begin(ctx);
//!
//! assert_eq!(
//!     resolution.resume(&mut world).unwrap(),
//!     Progress::Suspended(SuspensionRequest::audio("growl"))
//! );
//! assert_eq!(resolution.resume(&mut world).unwrap(), Progress::Complete);
//! ```

mod executor;
mod judge;
mod phase;
mod priority;
mod resolution;
mod trace;

pub use executor::Pipeline;
pub use judge::{AccuracyJudge, AlwaysHit, StrikeJudge, StrikeOutcome};
pub use phase::Phase;
pub use priority::{EffectTable, PriorityEntry, PriorityList};
pub use resolution::{Host, Progress, Resolution};
pub use trace::TraceRecord;
