//! Accumulator and holder states.
//!
//! Four families live in a [`StateCollection`](super::StateCollection):
//!
//! - [`Multiplier<K>`]: a running rational product with a sticky override.
//! - [`Additive<K>`]: an integer sum, zero by default.
//! - Presence markers ([`AttackHit`], [`CriticalHit`]): existence is the signal.
//! - [`Snapshot<K>`]: a last-write-wins captured scalar.
//!
//! `K` is an uninhabited tag type naming what is being accumulated, so
//! `Multiplier<HitRate>` and `Multiplier<Damage>` are distinct states.

use std::fmt;
use std::marker::PhantomData;

/// Value `Multiplier::multiply` returns once an override is registered.
pub const OVERRIDE_SENTINEL: i64 = -1;

// ============================================================================
// Tags
// ============================================================================

/// Hit-rate modifiers.
#[derive(Clone, Copy, Debug)]
pub enum HitRate {}

/// Damage modifiers.
#[derive(Clone, Copy, Debug)]
pub enum Damage {}

/// Accuracy boost stages.
#[derive(Clone, Copy, Debug)]
pub enum AccuracyBoost {}

/// Evasion boost stages.
#[derive(Clone, Copy, Debug)]
pub enum EvasionBoost {}

/// Damage dealt during the current strike.
#[derive(Clone, Copy, Debug)]
pub enum StrikeDamage {}

/// Knockouts caused during the action.
#[derive(Clone, Copy, Debug)]
pub enum Knockouts {}

/// The user's accuracy stage, captured at strike start.
#[derive(Clone, Copy, Debug)]
pub enum UserAccuracy {}

/// The target's evasion stage, captured at strike start.
#[derive(Clone, Copy, Debug)]
pub enum TargetEvasion {}

// ============================================================================
// Markers
// ============================================================================

/// The action has landed at least one strike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackHit;

/// A critical strike occurred.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CriticalHit;

// ============================================================================
// Multiplier
// ============================================================================

/// Rational product of registered modifiers.
///
/// Ordinary modifiers `(n, d)` multiply into the running product, which is
/// kept in lowest terms with 128-bit parts, so the result does not depend
/// on registration order. A modifier with a negative numerator is an
/// *override*: it sets a sticky flag that no later registration can clear,
/// and from then on [`multiply`](Self::multiply) returns
/// [`OVERRIDE_SENTINEL`]. Ordinary modifiers registered after the override
/// are not folded into [`ratio`](Self::ratio).
///
/// ```
/// use dungeon_effects::state::{Multiplier, HitRate, OVERRIDE_SENTINEL};
///
/// let mut acc = Multiplier::<HitRate>::new();
/// assert_eq!(acc.multiply(80), 80);
///
/// acc.register(1, 2);
/// assert_eq!(acc.multiply(80), 40);
///
/// acc.register(-1, 1);
/// acc.register(3, 1);
/// assert_eq!(acc.multiply(80), OVERRIDE_SENTINEL);
/// ```
pub struct Multiplier<K> {
    numerator: i128,
    denominator: i128,
    overridden: bool,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Multiplier<K> {
    /// Identity multiplier (1/1, no override).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            numerator: 1,
            denominator: 1,
            overridden: false,
            _kind: PhantomData,
        }
    }

    /// Register a modifier.
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is not positive, or if the reduced product
    /// no longer fits: both are malformed content.
    pub fn register(&mut self, numerator: i64, denominator: i64) {
        assert!(
            denominator > 0,
            "multiplier denominator must be positive (got {numerator}/{denominator})"
        );

        if numerator < 0 {
            self.overridden = true;
            return;
        }
        if self.overridden {
            return;
        }

        // Cross-cancel first: only the reduced product must fit.
        let (numerator, denominator) = (i128::from(numerator), i128::from(denominator));
        let across = gcd(numerator, self.denominator).max(1);
        let back = gcd(self.numerator, denominator).max(1);
        let num = (self.numerator / back).checked_mul(numerator / across);
        let den = (self.denominator / across).checked_mul(denominator / back);
        let (Some(num), Some(den)) = (num, den) else {
            panic!(
                "multiplier product overflowed ({}/{} times {numerator}/{denominator})",
                self.numerator, self.denominator
            );
        };

        let divisor = gcd(num, den).max(1);
        self.numerator = num / divisor;
        self.denominator = den / divisor;
    }

    /// Apply the accumulated product to `base`, truncating toward zero.
    ///
    /// Returns [`OVERRIDE_SENTINEL`] once an override is registered.
    #[must_use]
    pub fn multiply(&self, base: i64) -> i64 {
        if self.overridden {
            return OVERRIDE_SENTINEL;
        }
        let scaled = match i128::from(base).checked_mul(self.numerator) {
            Some(product) => product / self.denominator,
            None if base < 0 => i128::MIN,
            None => i128::MAX,
        };
        scaled.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// The accumulated product as `(numerator, denominator)` in lowest terms.
    #[must_use]
    pub const fn ratio(&self) -> (i128, i128) {
        (self.numerator, self.denominator)
    }

    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// True when nothing has changed the product and no override is set.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        !self.overridden && self.numerator == self.denominator
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

impl<K> Default for Multiplier<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for Multiplier<K> {
    fn clone(&self) -> Self {
        Self {
            numerator: self.numerator,
            denominator: self.denominator,
            overridden: self.overridden,
            _kind: PhantomData,
        }
    }
}

impl<K> PartialEq for Multiplier<K> {
    fn eq(&self, other: &Self) -> bool {
        self.numerator == other.numerator
            && self.denominator == other.denominator
            && self.overridden == other.overridden
    }
}

impl<K> fmt::Debug for Multiplier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multiplier")
            .field("kind", &std::any::type_name::<K>())
            .field("numerator", &self.numerator)
            .field("denominator", &self.denominator)
            .field("overridden", &self.overridden)
            .finish()
    }
}

// ============================================================================
// Additive
// ============================================================================

/// Integer sum of registered contributions.
pub struct Additive<K> {
    value: i32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Additive<K> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0,
            _kind: PhantomData,
        }
    }

    /// Add a contribution (saturating).
    pub fn add(&mut self, delta: i32) {
        self.value = self.value.saturating_add(delta);
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.value
    }
}

impl<K> Default for Additive<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for Additive<K> {
    fn clone(&self) -> Self {
        Self {
            value: self.value,
            _kind: PhantomData,
        }
    }
}

impl<K> PartialEq for Additive<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> fmt::Debug for Additive<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Additive")
            .field("kind", &std::any::type_name::<K>())
            .field("value", &self.value)
            .finish()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// A scalar captured once and then read, so later modifiers on the source
/// cannot feed back into the same resolution.
pub struct Snapshot<K> {
    value: i32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Snapshot<K> {
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self {
            value,
            _kind: PhantomData,
        }
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.value
    }
}

impl<K> Clone for Snapshot<K> {
    fn clone(&self) -> Self {
        Self::new(self.value)
    }
}

impl<K> PartialEq for Snapshot<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> fmt::Debug for Snapshot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("kind", &std::any::type_name::<K>())
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateCollection;

    #[test]
    fn test_multiplier_identity() {
        let acc = Multiplier::<Damage>::new();
        assert!(acc.is_identity());
        assert_eq!(acc.multiply(0), 0);
        assert_eq!(acc.multiply(123), 123);
        assert_eq!(acc.ratio(), (1, 1));
    }

    #[test]
    fn test_multiplier_reduces_to_lowest_terms() {
        let mut acc = Multiplier::<Damage>::new();
        acc.register(3, 2);
        acc.register(2, 3);
        assert_eq!(acc.ratio(), (1, 1));
        assert!(acc.is_identity());
        assert_eq!(acc.multiply(50), 50);
    }

    #[test]
    fn test_multiplier_truncates() {
        let mut acc = Multiplier::<Damage>::new();
        acc.register(2, 3);
        assert_eq!(acc.multiply(10), 6);
    }

    #[test]
    fn test_zero_modifier() {
        let mut acc = Multiplier::<Damage>::new();
        acc.register(0, 1);
        acc.register(5, 2);
        assert_eq!(acc.multiply(100), 0);
        assert!(!acc.is_identity());
    }

    #[test]
    fn test_override_is_sticky() {
        let mut acc = Multiplier::<HitRate>::new();
        acc.register(-1, 1);
        acc.register(4, 1);
        acc.register(1, 4);
        assert!(acc.is_overridden());
        assert_eq!(acc.multiply(80), OVERRIDE_SENTINEL);
    }

    /// The result is order-independent, but the observable product is not:
    /// ordinary modifiers stop folding in once the override is set.
    #[test]
    fn test_override_registration_order_is_observable() {
        let mut before = Multiplier::<HitRate>::new();
        before.register(1, 2);
        before.register(-1, 1);

        let mut after = Multiplier::<HitRate>::new();
        after.register(-1, 1);
        after.register(1, 2);

        assert_eq!(before.multiply(80), after.multiply(80));
        assert_eq!(before.ratio(), (1, 2));
        assert_eq!(after.ratio(), (1, 1));
        assert_ne!(before, after);
    }

    #[test]
    #[should_panic(expected = "denominator must be positive")]
    fn test_zero_denominator_panics() {
        let mut acc = Multiplier::<Damage>::new();
        acc.register(1, 0);
    }

    #[test]
    fn test_large_factors_commute() {
        let big = 1_i64 << 40;
        let tiny = 1_i64 << 60;

        let mut forward = Multiplier::<Damage>::new();
        forward.register(big, 1);
        forward.register(big, 1);
        forward.register(1, tiny);

        let mut reordered = Multiplier::<Damage>::new();
        reordered.register(big, 1);
        reordered.register(1, tiny);
        reordered.register(big, 1);

        assert_eq!(forward.ratio(), (1 << 20, 1));
        assert_eq!(forward, reordered);
        assert_eq!(forward.multiply(1), 1 << 20);
    }

    #[test]
    fn test_saturates_on_apply() {
        let mut acc = Multiplier::<Damage>::new();
        acc.register(i64::MAX, 1);
        acc.register(i64::MAX, 1);
        assert_eq!(acc.multiply(3), i64::MAX);
        assert_eq!(acc.multiply(-3), i64::MIN);
    }

    #[test]
    #[should_panic(expected = "multiplier product overflowed")]
    fn test_unrepresentable_product_panics() {
        let mut acc = Multiplier::<Damage>::new();
        for _ in 0..3 {
            acc.register(i64::MAX, 1);
        }
    }

    #[test]
    fn test_additive_sums() {
        let mut acc = Additive::<AccuracyBoost>::new();
        assert_eq!(acc.value(), 0);
        acc.add(2);
        acc.add(-3);
        acc.add(4);
        assert_eq!(acc.value(), 3);
    }

    #[test]
    fn test_tags_are_distinct_states() {
        let mut store = StateCollection::new();
        store.get_or_default::<Additive<AccuracyBoost>>().add(1);
        store.get_or_default::<Additive<EvasionBoost>>().add(5);

        assert_eq!(store.get::<Additive<AccuracyBoost>>().unwrap().value(), 1);
        assert_eq!(store.get::<Additive<EvasionBoost>>().unwrap().value(), 5);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_snapshot_last_write_wins() {
        let mut store = StateCollection::new();
        store.set(Snapshot::<TargetEvasion>::new(1));
        store.set(Snapshot::<TargetEvasion>::new(-2));
        assert_eq!(store.get::<Snapshot<TargetEvasion>>().unwrap().value(), -2);
    }

    #[test]
    fn test_debug_names_kind() {
        let acc = Additive::<Knockouts>::new();
        let text = format!("{acc:?}");
        assert!(text.contains("Knockouts"));
    }
}
