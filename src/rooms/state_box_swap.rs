//! Per-portal state change when a box is pushed into a room.

use std::fmt;

use rustc_hash::FxHashMap;

/// Maps the state of a room before a box enters through a portal to the
/// state afterwards. A missing entry means the box cannot enter in that state.
pub trait StateBoxSwap: fmt::Debug {
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add(&mut self, old_state: u64, new_state: u64);

    fn get(&self, state: u64) -> Option<u64>;

    /// All `(old, new)` pairs sorted by old state.
    fn pairs(&self) -> Vec<(u64, u64)>;
}

#[derive(Debug, Default, Clone)]
pub struct StateBoxSwapNormal {
    data: FxHashMap<u64, u64>,
}

impl StateBoxSwapNormal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBoxSwap for StateBoxSwapNormal {
    #[inline(always)]
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn add(&mut self, old_state: u64, new_state: u64) {
        debug_assert_ne!(old_state, new_state);
        let prev = self.data.insert(old_state, new_state);
        debug_assert!(prev.is_none(), "duplicate swap for state {}", old_state);
    }

    #[inline(always)]
    fn get(&self, state: u64) -> Option<u64> {
        self.data.get(&state).copied()
    }

    fn pairs(&self) -> Vec<(u64, u64)> {
        let mut pairs: Vec<(u64, u64)> = self.data.iter().map(|(&k, &v)| (k, v)).collect();
        pairs.sort_unstable();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_lookup() {
        let mut swap = StateBoxSwapNormal::new();
        assert!(swap.is_empty());
        swap.add(4, 1);
        swap.add(0, 3);
        assert_eq!(swap.get(0), Some(3));
        assert_eq!(swap.get(4), Some(1));
        assert_eq!(swap.get(2), None);
        assert_eq!(swap.pairs(), vec![(0, 3), (4, 1)]);
    }
}
