//! Trigger phases.

use serde::{Deserialize, Serialize};

/// A named stage of action resolution with its own effect list.
///
/// Order of a full action:
///
/// ```text
/// PreAction -> BeforeTryAction -> BeforeHits
///     -> (per strike: BeforeHit -> [judge] -> OnHit -> AfterHit)
///     -> AfterAction
/// ```
///
/// `OnHit` and `AfterHit` only run for strikes that land.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    PreAction,
    BeforeTryAction,
    BeforeHits,
    BeforeHit,
    OnHit,
    AfterHit,
    AfterAction,
}

impl Phase {
    pub const COUNT: usize = 7;

    /// Every phase, in pipeline order.
    pub const ALL: [Phase; Self::COUNT] = [
        Self::PreAction,
        Self::BeforeTryAction,
        Self::BeforeHits,
        Self::BeforeHit,
        Self::OnHit,
        Self::AfterHit,
        Self::AfterAction,
    ];

    /// Phases run once before the first strike.
    pub const OPENING: [Phase; 3] = [Self::PreAction, Self::BeforeTryAction, Self::BeforeHits];

    /// Index into per-phase tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for the phases repeated once per strike.
    #[must_use]
    pub const fn is_per_strike(self) -> bool {
        matches!(self, Self::BeforeHit | Self::OnHit | Self::AfterHit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_index_order() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn test_per_strike_phases() {
        let per_strike: Vec<_> = Phase::ALL.into_iter().filter(|p| p.is_per_strike()).collect();
        assert_eq!(per_strike, vec![Phase::BeforeHit, Phase::OnHit, Phase::AfterHit]);
        assert!(Phase::OPENING.iter().all(|p| !p.is_per_strike()));
    }
}
