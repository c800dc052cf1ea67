//! Pipeline configuration.
//!
//! Hosts configure the engine once at startup. The phase layout itself is
//! fixed (see [`Phase`](crate::pipeline::Phase)); the configuration only
//! bounds how far an action may grow and what the default judge clamps.
//!
//! ```
//! use dungeon_effects::core::PipelineConfig;
//!
//! let config = PipelineConfig::default()
//!     .with_max_nesting_depth(4)
//!     .with_max_strikes(5);
//!
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of live action frames, the root action included.
    pub max_nesting_depth: usize,

    /// Maximum strikes a single action may declare.
    pub max_strikes: u32,

    /// Record every scheduled node invocation into the context trace.
    pub record_trace: bool,

    /// Clamp for the combined accuracy/evasion stage in the default judge.
    pub accuracy_stage_cap: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 8,
            max_strikes: 16,
            record_trace: true,
            accuracy_stage_cap: 6,
        }
    }
}

impl PipelineConfig {
    /// Set the nesting depth limit (builder pattern).
    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the strike limit (builder pattern).
    #[must_use]
    pub fn with_max_strikes(mut self, strikes: u32) -> Self {
        self.max_strikes = strikes;
        self
    }

    /// Enable or disable trace recording (builder pattern).
    #[must_use]
    pub fn with_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }

    /// Set the accuracy stage clamp (builder pattern).
    #[must_use]
    pub fn with_accuracy_stage_cap(mut self, cap: i32) -> Self {
        self.accuracy_stage_cap = cap;
        self
    }

    /// Check that every bound is usable.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.max_nesting_depth == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        if self.max_strikes == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_strikes must be at least 1".to_string(),
            ));
        }
        if self.accuracy_stage_cap < 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "accuracy_stage_cap must not be negative (got {})",
                self.accuracy_stage_cap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = PipelineConfig::default().with_max_nesting_depth(0);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_strikes_rejected() {
        let config = PipelineConfig::default().with_max_strikes(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "max_strikes": 3, "record_trace": false }"#).unwrap();

        assert_eq!(config.max_strikes, 3);
        assert!(!config.record_trace);
        assert_eq!(config.max_nesting_depth, 8);
        assert_eq!(config.accuracy_stage_cap, 6);
    }
}
