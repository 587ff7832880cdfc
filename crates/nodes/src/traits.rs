//! The `OutcomeProvider` trait — where every simulated operation gets its
//! success or failure from.

use rand::Rng;

/// Result of one simulated attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Decides whether a simulated operation (connection test, import, stage
/// run) succeeds.
///
/// Production code plugs in [`RandomOutcome`]; tests plug in
/// [`crate::mock::ScriptedOutcome`] to force either branch.
pub trait OutcomeProvider: Send + Sync {
    fn next_outcome(&self) -> Outcome;
}

/// Every attempt succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSucceed;

impl OutcomeProvider for AlwaysSucceed {
    fn next_outcome(&self) -> Outcome {
        Outcome::Success
    }
}

/// Succeeds with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomOutcome {
    success_rate: f64,
}

impl RandomOutcome {
    /// `success_rate` is clamped into `[0, 1]`.
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

impl OutcomeProvider for RandomOutcome {
    fn next_outcome(&self) -> Outcome {
        if rand::rng().random_bool(self.success_rate) {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certain_rates_are_deterministic() {
        let always = RandomOutcome::new(1.0);
        let never = RandomOutcome::new(0.0);
        for _ in 0..32 {
            assert_eq!(always.next_outcome(), Outcome::Success);
            assert_eq!(never.next_outcome(), Outcome::Failure);
        }
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(RandomOutcome::new(7.5).success_rate(), 1.0);
        assert_eq!(RandomOutcome::new(-1.0).success_rate(), 0.0);
    }
}
