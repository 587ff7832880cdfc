//! `ScriptedOutcome` — a test double for `OutcomeProvider`.
//!
//! Replays a fixed script of outcomes, then falls back to a default, and
//! counts how often it was consulted.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{Outcome, OutcomeProvider};

pub struct ScriptedOutcome {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    calls: Mutex<usize>,
}

impl ScriptedOutcome {
    /// Always return `outcome`.
    pub fn always(outcome: Outcome) -> Self {
        Self::sequence(Vec::new(), outcome)
    }

    /// Return `script` in order, then `fallback` forever.
    pub fn sequence(script: Vec<Outcome>, fallback: Outcome) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(0),
        }
    }

    /// Number of times an outcome has been drawn.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl OutcomeProvider for ScriptedOutcome {
    fn next_outcome(&self) -> Outcome {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_script_then_falls_back() {
        let provider = ScriptedOutcome::sequence(
            vec![Outcome::Failure, Outcome::Success],
            Outcome::Failure,
        );

        assert_eq!(provider.next_outcome(), Outcome::Failure);
        assert_eq!(provider.next_outcome(), Outcome::Success);
        assert_eq!(provider.next_outcome(), Outcome::Failure);
        assert_eq!(provider.call_count(), 3);
    }
}
