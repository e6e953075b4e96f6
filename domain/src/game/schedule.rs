//! Turn selection policies
//!
//! Interactive play picks a speaker uniformly at random on every turn (the
//! same backend may speak twice in a row). Batch play consumes a fixed,
//! pre-shuffled schedule in which every backend appears the same number of
//! times.

use crate::core::backend::BackendId;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// A fixed order of speakers, consumed front to back
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnSchedule {
    queue: VecDeque<BackendId>,
}

impl TurnSchedule {
    /// Build a schedule containing each backend `repeat` times, shuffled
    pub fn shuffled<R: Rng + ?Sized>(backends: &[BackendId], repeat: usize, rng: &mut R) -> Self {
        let mut turns: Vec<BackendId> = Vec::with_capacity(backends.len() * repeat);
        for _ in 0..repeat {
            turns.extend_from_slice(backends);
        }
        turns.shuffle(rng);
        Self {
            queue: turns.into(),
        }
    }

    /// Build a schedule in exactly the given order
    pub fn from_order(order: impl IntoIterator<Item = BackendId>) -> Self {
        Self {
            queue: order.into_iter().collect(),
        }
    }

    pub fn next_turn(&mut self) -> Option<BackendId> {
        self.queue.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every remaining turn
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendId> {
        self.queue.iter()
    }
}

/// How the orchestrator chooses who answers next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Uniform random pick from the enabled set on every turn
    Random,
    /// Consume a pre-built schedule
    Scheduled(TurnSchedule),
}

impl SelectionPolicy {
    /// Pick the next speaker, or `None` when nothing is left to pick
    pub fn next_backend<R: Rng + ?Sized>(
        &mut self,
        enabled: &[BackendId],
        rng: &mut R,
    ) -> Option<BackendId> {
        match self {
            SelectionPolicy::Random => enabled.choose(rng).copied(),
            SelectionPolicy::Scheduled(schedule) => schedule.next_turn(),
        }
    }

    /// Turns left, if the policy is bounded
    pub fn remaining(&self) -> Option<usize> {
        match self {
            SelectionPolicy::Random => None,
            SelectionPolicy::Scheduled(schedule) => Some(schedule.remaining()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn three() -> Vec<BackendId> {
        vec![BackendId::Gemini, BackendId::Claude, BackendId::ChatGpt]
    }

    #[test]
    fn test_shuffled_contains_each_backend_repeat_times() {
        let mut rng = StdRng::seed_from_u64(7);
        let schedule = TurnSchedule::shuffled(&three(), 3, &mut rng);
        assert_eq!(schedule.remaining(), 9);
        for backend in three() {
            assert_eq!(schedule.iter().filter(|b| **b == backend).count(), 3);
        }
    }

    #[test]
    fn test_shuffled_is_deterministic_for_seed() {
        let a = TurnSchedule::shuffled(&three(), 3, &mut StdRng::seed_from_u64(42));
        let b = TurnSchedule::shuffled(&three(), 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_order_consumed_in_order() {
        let mut schedule = TurnSchedule::from_order([BackendId::Claude, BackendId::Gemini]);
        assert_eq!(schedule.next_turn(), Some(BackendId::Claude));
        assert_eq!(schedule.next_turn(), Some(BackendId::Gemini));
        assert_eq!(schedule.next_turn(), None);
        assert!(schedule.is_exhausted());
    }

    #[test]
    fn test_random_policy_picks_enabled_backend() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut policy = SelectionPolicy::Random;
        let enabled = vec![BackendId::Claude, BackendId::DeepSeek];
        for _ in 0..20 {
            let picked = policy.next_backend(&enabled, &mut rng).unwrap();
            assert!(enabled.contains(&picked));
        }
        assert_eq!(policy.remaining(), None);
    }

    #[test]
    fn test_random_policy_empty_set() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(SelectionPolicy::Random.next_backend(&[], &mut rng), None);
    }

    #[test]
    fn test_scheduled_policy_ignores_enabled_set() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut policy =
            SelectionPolicy::Scheduled(TurnSchedule::from_order([BackendId::Gemini]));
        assert_eq!(policy.remaining(), Some(1));
        assert_eq!(
            policy.next_backend(&[BackendId::Claude], &mut rng),
            Some(BackendId::Gemini)
        );
        assert_eq!(policy.next_backend(&[BackendId::Claude], &mut rng), None);
    }
}
