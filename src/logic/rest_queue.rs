//! Resting queue with fairness-weighted draws.

use crate::models::ParticipantId;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Participants not on a court, in arrival order, plus how many games each has sat out.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RestQueue {
    queue: Vec<ParticipantId>,
    rest_counts: HashMap<ParticipantId, u32>,
}

impl RestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue in the given order with every rest count at zero.
    pub fn from_ids(ids: Vec<ParticipantId>) -> Self {
        Self {
            queue: ids,
            rest_counts: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ParticipantId> + ExactSizeIterator {
        self.queue.iter()
    }

    pub fn as_slice(&self) -> &[ParticipantId] {
        &self.queue
    }

    pub fn contains(&self, id: &str) -> bool {
        self.queue.iter().any(|p| p == id)
    }

    /// Completed games this participant has sat out this session.
    pub fn rest_count(&self, id: &str) -> u32 {
        self.rest_counts.get(id).copied().unwrap_or(0)
    }

    pub fn set_rest_count(&mut self, id: &str, count: u32) {
        self.rest_counts.insert(id.to_string(), count);
    }

    pub fn push_back(&mut self, id: ParticipantId) {
        self.queue.push(id);
    }

    pub fn extend(&mut self, ids: impl IntoIterator<Item = ParticipantId>) {
        self.queue.extend(ids);
    }

    /// Remove by id; returns false if not resting.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.queue.iter().position(|p| p == id) {
            Some(idx) => {
                self.queue.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Replace the participant at `idx` and return the one that was there.
    pub(crate) fn replace_at(&mut self, idx: usize, id: ParticipantId) -> ParticipantId {
        std::mem::replace(&mut self.queue[idx], id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.queue.iter().position(|p| p == id)
    }

    /// A game finished: everyone resting sat it out.
    pub fn credit_rest(&mut self) {
        for id in &self.queue {
            *self.rest_counts.entry(id.clone()).or_insert(0) += 1;
        }
    }

    /// Copy of the queue, longest-rested first; ties keep queue order.
    pub fn sorted_by_rest(&self) -> Vec<ParticipantId> {
        let mut sorted = self.queue.clone();
        sorted.sort_by_key(|id| Reverse(self.rest_count(id)));
        sorted
    }

    /// Draw up to `n` participants, each picked uniformly from the first `window`
    /// of the longest-rested-first view. Drawn participants leave the queue.
    pub fn draw<R: Rng + ?Sized>(&mut self, n: usize, window: usize, rng: &mut R) -> Vec<ParticipantId> {
        let mut sorted = self.sorted_by_rest();
        let times = n.min(sorted.len());
        let mut picked = Vec::with_capacity(times);
        for _ in 0..times {
            let w = window.max(1).min(sorted.len());
            let idx = rng.gen_range(0..w);
            let id = sorted.remove(idx);
            self.remove(&id);
            picked.push(id);
        }
        log::debug!("drew {:?} from resting queue", picked);
        picked
    }
}

/// Remove `count` items chosen uniformly at random (without replacement) from `pool`.
pub fn pop_random<T, R: Rng + ?Sized>(pool: &mut Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    let c = count.min(pool.len());
    let mut picked = Vec::with_capacity(c);
    for _ in 0..c {
        let idx = rng.gen_range(0..pool.len());
        picked.push(pool.remove(idx));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pop_random_takes_without_replacement() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool: Vec<u32> = (0..10).collect();
        let picked = pop_random(&mut pool, 4, &mut rng);
        assert_eq!(picked.len(), 4);
        assert_eq!(pool.len(), 6);
        for p in &picked {
            assert!(!pool.contains(p));
        }
        let rest = pop_random(&mut pool, 10, &mut rng);
        assert_eq!(rest.len(), 6);
        assert!(pool.is_empty());
    }
}
