// src/env/replay.rs
//
// Prioritized experience replay buffer.
//
// Retention and sampling are deliberately decoupled:
// - retention is strict FIFO at a fixed capacity, irrespective of priority;
// - sampling is with replacement, weighted by priority^alpha over the
//   current contents (alpha = 0 degenerates to uniform).
//
// `update_priorities` rewrites only the trailing priority field; the
// (state, action, reward, next_state, done) payload is immutable once added.

use std::collections::VecDeque;

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ReplayConfig;
use crate::error::{CoreError, CoreResult};
use crate::types::Transition;

/// Priority a fresh transition enters the buffer with.
pub const INITIAL_PRIORITY: f64 = 1.0;

/// One sampled entry: the position it was drawn from plus a copy of the
/// transition. The position feeds `update_priorities`, and is only valid
/// until the next eviction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampled {
    pub index: usize,
    pub transition: Transition,
}

/// Bounded, priority-weighted memory of past transitions.
pub struct ExperienceReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    alpha: f64,
    beta: f64,
    rng: ChaCha8Rng,
}

impl ExperienceReplayBuffer {
    pub fn new(cfg: &ReplayConfig) -> Self {
        Self::with_seed(cfg, 0)
    }

    /// Construct with an explicit sampling seed for reproducible draws.
    pub fn with_seed(cfg: &ReplayConfig, seed: u64) -> Self {
        Self {
            buffer: VecDeque::with_capacity(cfg.capacity.min(4096)),
            capacity: cfg.capacity.max(1),
            alpha: cfg.alpha,
            beta: cfg.beta,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a transition, evicting the oldest entry once full.
    ///
    /// Eviction is strict FIFO: a high-priority transition at the front is
    /// evicted exactly like any other. Positions of surviving entries shift
    /// down by one, which is why sampled indices do not survive evictions.
    pub fn add(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` transitions with replacement, weighted by
    /// priority^alpha over the current contents.
    ///
    /// Fails with `EmptyBuffer` on an empty buffer and `InvalidArgument` on a
    /// zero batch size. `batch_size` may exceed the buffer length.
    pub fn sample(&mut self, batch_size: usize) -> CoreResult<Vec<Sampled>> {
        if batch_size == 0 {
            return Err(CoreError::invalid_argument(
                "batch_size",
                "must be positive",
            ));
        }
        if self.buffer.is_empty() {
            return Err(CoreError::EmptyBuffer);
        }

        let weights: Vec<f64> = self
            .buffer
            .iter()
            .map(|t| t.priority.max(0.0).powf(self.alpha))
            .collect();
        let total: f64 = weights.iter().sum();

        let mut out = Vec::with_capacity(batch_size);
        if total > 0.0 && total.is_finite() {
            // WeightedIndex cannot fail here: weights are non-negative,
            // finite, and sum to a positive total.
            let dist = WeightedIndex::new(&weights).map_err(|e| {
                CoreError::invalid_argument("priorities", &e.to_string())
            })?;
            for _ in 0..batch_size {
                let index = dist.sample(&mut self.rng);
                out.push(Sampled {
                    index,
                    transition: self.buffer[index].clone(),
                });
            }
        } else {
            // All priorities zero: degenerate but non-empty. Fall back to
            // uniform rather than failing the draw.
            for _ in 0..batch_size {
                let index = self.rng.gen_range(0..self.buffer.len());
                out.push(Sampled {
                    index,
                    transition: self.buffer[index].clone(),
                });
            }
        }
        Ok(out)
    }

    /// Rewrite the priority of each addressed transition to `priority^beta`.
    ///
    /// Indices address positions in the *current* buffer; an out-of-range
    /// index fails with `InvalidArgument`. Indices obtained before an
    /// intervening eviction may silently address the wrong transition —
    /// the buffer provides no stable identity across evictions, and keeping
    /// sampled indices fresh is the caller's responsibility.
    pub fn update_priorities(&mut self, updates: &[(usize, f64)]) -> CoreResult<()> {
        for &(index, _) in updates {
            if index >= self.buffer.len() {
                return Err(CoreError::invalid_argument(
                    "index",
                    &format!("{} out of range (len {})", index, self.buffer.len()),
                ));
            }
        }
        for &(index, priority) in updates {
            self.buffer[index].priority = priority.max(0.0).powf(self.beta);
        }
        Ok(())
    }

    /// Current contents in insertion order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MotionState;

    fn transition(action: usize, priority: f64) -> Transition {
        Transition {
            state: MotionState::Still,
            action,
            reward: 1.0,
            next_state: MotionState::Walking,
            done: false,
            priority,
        }
    }

    fn buffer(capacity: usize, alpha: f64, beta: f64) -> ExperienceReplayBuffer {
        ExperienceReplayBuffer::with_seed(
            &ReplayConfig {
                capacity,
                alpha,
                beta,
            },
            7,
        )
    }

    #[test]
    fn fifo_eviction_keeps_last_c() {
        let mut buf = buffer(3, 0.6, 0.4);
        for i in 0..10 {
            buf.add(transition(i, 1.0));
        }
        assert_eq!(buf.len(), 3);
        let actions: Vec<usize> = buf.iter().map(|t| t.action).collect();
        assert_eq!(actions, vec![7, 8, 9]);
    }

    #[test]
    fn eviction_ignores_priority() {
        let mut buf = buffer(2, 0.6, 0.4);
        buf.add(transition(0, 1_000.0));
        buf.add(transition(1, 0.001));
        buf.add(transition(2, 0.001));
        let actions: Vec<usize> = buf.iter().map(|t| t.action).collect();
        assert_eq!(actions, vec![1, 2]);
    }

    #[test]
    fn sample_empty_buffer_fails() {
        let mut buf = buffer(4, 0.6, 0.4);
        assert_eq!(buf.sample(1), Err(CoreError::EmptyBuffer));
    }

    #[test]
    fn sample_zero_batch_fails() {
        let mut buf = buffer(4, 0.6, 0.4);
        buf.add(transition(0, 1.0));
        assert!(matches!(
            buf.sample(0),
            Err(CoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn sample_returns_exactly_k_with_replacement() {
        let mut buf = buffer(4, 0.6, 0.4);
        buf.add(transition(0, 1.0));
        buf.add(transition(1, 1.0));
        // k greater than len is fine: sampling is with replacement.
        let batch = buf.sample(16).unwrap();
        assert_eq!(batch.len(), 16);
        for s in &batch {
            assert!(s.index < 2);
        }
    }

    #[test]
    fn alpha_zero_is_empirically_uniform() {
        let mut buf = buffer(4, 0.0, 1.0);
        buf.add(transition(0, 100.0));
        buf.add(transition(1, 0.5));
        let batch = buf.sample(4000).unwrap();
        let zeros = batch.iter().filter(|s| s.index == 0).count();
        let frac = zeros as f64 / 4000.0;
        assert!(
            (frac - 0.5).abs() < 0.05,
            "expected ~uniform, got {} for index 0",
            frac
        );
    }

    #[test]
    fn high_alpha_skews_toward_high_priority() {
        let mut buf = buffer(4, 1.0, 1.0);
        buf.add(transition(0, 9.0));
        buf.add(transition(1, 1.0));
        let batch = buf.sample(2000).unwrap();
        let zeros = batch.iter().filter(|s| s.index == 0).count();
        let frac = zeros as f64 / 2000.0;
        assert!(frac > 0.8, "expected heavy skew, got {}", frac);
    }

    #[test]
    fn zero_total_priority_falls_back_to_uniform() {
        let mut buf = buffer(4, 1.0, 1.0);
        buf.add(transition(0, 0.0));
        buf.add(transition(1, 0.0));
        let batch = buf.sample(10).unwrap();
        assert_eq!(batch.len(), 10);
    }

    #[test]
    fn update_priorities_touches_only_priority() {
        let mut buf = buffer(4, 0.6, 2.0);
        buf.add(transition(0, 1.0));
        buf.add(transition(1, 1.0));
        let before: Vec<Transition> = buf.iter().cloned().collect();

        buf.update_priorities(&[(1, 3.0)]).unwrap();

        let after: Vec<Transition> = buf.iter().cloned().collect();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1].state, before[1].state);
        assert_eq!(after[1].action, before[1].action);
        assert_eq!(after[1].reward, before[1].reward);
        assert_eq!(after[1].next_state, before[1].next_state);
        assert_eq!(after[1].done, before[1].done);
        assert!((after[1].priority - 9.0).abs() < 1e-9); // 3.0^beta, beta = 2
    }

    #[test]
    fn update_out_of_range_index_fails_without_partial_write() {
        let mut buf = buffer(4, 0.6, 1.0);
        buf.add(transition(0, 1.0));
        let err = buf.update_priorities(&[(0, 5.0), (3, 5.0)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
        // The valid pair must not have been applied.
        assert!((buf.iter().next().unwrap().priority - 1.0).abs() < 1e-12);
    }
}
