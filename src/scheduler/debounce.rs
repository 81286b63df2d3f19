use std::time::Duration;

use crate::config::SchedulerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// Input became empty: clear presentation state, schedule nothing.
    ClearImmediately,
    /// Large deletion detected.
    Fast(Duration),
    Normal(Duration),
}

impl DebounceDecision {
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Self::ClearImmediately => None,
            Self::Fast(d) | Self::Normal(d) => Some(*d),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DebouncePolicy {
    config: SchedulerConfig,
}

impl DebouncePolicy {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Lengths are in characters.
    pub fn decide(&self, previous_len: usize, new_len: usize) -> DebounceDecision {
        if new_len == 0 {
            return DebounceDecision::ClearImmediately;
        }
        if previous_len > self.config.large_input_threshold
            && new_len < self.config.small_input_threshold
        {
            return DebounceDecision::Fast(self.config.fast_debounce());
        }
        DebounceDecision::Normal(self.config.debounce())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DebouncePolicy {
        DebouncePolicy::new(SchedulerConfig::default())
    }

    #[test]
    fn test_typing_uses_normal_debounce() {
        assert_eq!(
            policy().decide(10, 11),
            DebounceDecision::Normal(Duration::from_millis(800))
        );
    }

    #[test]
    fn test_large_deletion_uses_fast_debounce() {
        assert_eq!(
            policy().decide(5000, 20),
            DebounceDecision::Fast(Duration::from_millis(100))
        );
    }

    #[test]
    fn test_partial_deletion_is_normal() {
        // Still above the small threshold.
        assert!(matches!(
            policy().decide(5000, 500),
            DebounceDecision::Normal(_)
        ));
        // Previous input was never large.
        assert!(matches!(policy().decide(900, 20), DebounceDecision::Normal(_)));
    }

    #[test]
    fn test_empty_input_clears() {
        assert_eq!(policy().decide(5000, 0), DebounceDecision::ClearImmediately);
        assert_eq!(policy().decide(3, 0), DebounceDecision::ClearImmediately);
        assert_eq!(DebounceDecision::ClearImmediately.delay(), None);
    }
}
