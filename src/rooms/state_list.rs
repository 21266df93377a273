//! Box configurations a room can be in, addressed by dense state IDs.

use std::fmt;

/// List of all box configurations of one room.
///
/// State `0` always means "solved" for the room: no boxes on a floor room, or
/// every goal covered. Lists are append-only; merging builds a fresh list.
pub trait StateList: fmt::Debug {
    /// Number of stored states.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a configuration (sorted box cells) and returns its ID.
    /// Callers must not add the same configuration twice.
    fn add(&mut self, box_posis: &[usize]) -> u64;

    /// Box cells of a state.
    fn get(&self, state: u64) -> &[usize];

    /// First state with exactly `box_count` boxes.
    fn find_by_box_count(&self, box_count: usize) -> Option<u64> {
        (0..self.len()).find(|&s| self.get(s).len() == box_count)
    }
}

/// Flat in-memory state list.
#[derive(Debug, Default, Clone)]
pub struct StateListNormal {
    boxes: Vec<usize>,
    offsets: Vec<usize>,
}

impl StateListNormal {
    pub fn new() -> Self {
        StateListNormal { boxes: Vec::new(), offsets: vec![0] }
    }
}

impl StateList for StateListNormal {
    #[inline(always)]
    fn len(&self) -> u64 {
        (self.offsets.len().max(1) - 1) as u64
    }

    fn add(&mut self, box_posis: &[usize]) -> u64 {
        debug_assert!(box_posis.windows(2).all(|w| w[0] < w[1]), "unsorted box cells");
        if self.offsets.is_empty() {
            self.offsets.push(0);
        }
        let id = self.len();
        self.boxes.extend_from_slice(box_posis);
        self.offsets.push(self.boxes.len());
        id
    }

    #[inline(always)]
    fn get(&self, state: u64) -> &[usize] {
        debug_assert!(state < self.len());
        let s = state as usize;
        &self.boxes[self.offsets[s]..self.offsets[s + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut list = StateListNormal::new();
        assert!(list.is_empty());
        assert_eq!(list.add(&[]), 0);
        assert_eq!(list.add(&[7, 9]), 1);
        assert_eq!(list.add(&[8]), 2);
        assert_eq!(list.len(), 3);
        assert!(list.get(0).is_empty());
        assert_eq!(list.get(1), &[7, 9]);
        assert_eq!(list.find_by_box_count(1), Some(2));
        assert_eq!(list.find_by_box_count(3), None);
    }

    #[test]
    fn test_default_is_usable() {
        let mut list = StateListNormal::default();
        assert_eq!(list.len(), 0);
        assert_eq!(list.add(&[3]), 0);
        assert_eq!(list.get(0), &[3]);
    }
}
