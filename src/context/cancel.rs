//! One-way cancellation.

/// Cancellation state of an action: `Active` until something cancels it,
/// then `Cancelled` for the rest of the action.
///
/// There is no way back. Effects committed before the cancel stay
/// committed; the flag only stops what has not run yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cancellation {
    cancelled: bool,
}

impl Cancellation {
    #[must_use]
    pub const fn new() -> Self {
        Self { cancelled: false }
    }

    /// Transition to `Cancelled`. Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let mut flag = Cancellation::new();
        assert!(!flag.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
    }
}
