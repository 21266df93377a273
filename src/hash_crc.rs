//! CRC-keyed visited table of the search.

/// Map from a 64-bit CRC to a move count.
pub trait HashCrc {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a new key. The key must not be present yet.
    fn add(&mut self, crc: u64, value: u64);

    /// Overwrites the value of an existing key.
    fn update(&mut self, crc: u64, value: u64);

    fn get(&self, crc: u64) -> Option<u64>;

    fn contains_key(&self, crc: u64) -> bool {
        self.get(crc).is_some()
    }
}

const EMPTY: u64 = 0;

/// Open-addressing table with linear probing over flat `(crc, value)` entries.
/// Key 0 marks a free slot, so a real 0 key lives in `zero_value`.
#[derive(Debug, Clone)]
pub struct HashCrcNormal {
    entries: Vec<(u64, u64)>,
    size: usize,
    count: usize,
    zero_value: Option<u64>,
}

impl Default for HashCrcNormal {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl HashCrcNormal {
    pub fn new(capacity: usize) -> Self {
        let size = capacity.next_power_of_two().max(16);
        HashCrcNormal { entries: vec![(EMPTY, 0); size], size, count: 0, zero_value: None }
    }

    #[inline(always)]
    fn slot(&self, crc: u64) -> usize {
        let mut idx = (crc as usize) % self.size;
        loop {
            let key = self.entries[idx].0;
            if key == crc || key == EMPTY {
                return idx;
            }
            idx += 1;
            if idx == self.size {
                idx = 0;
            }
        }
    }

    fn grow(&mut self) {
        let old = std::mem::replace(&mut self.entries, vec![(EMPTY, 0); self.size * 2]);
        self.size *= 2;
        for (crc, value) in old {
            if crc != EMPTY {
                let idx = self.slot(crc);
                self.entries[idx] = (crc, value);
            }
        }
    }
}

impl HashCrc for HashCrcNormal {
    #[inline(always)]
    fn len(&self) -> usize {
        self.count + self.zero_value.is_some() as usize
    }

    fn add(&mut self, crc: u64, value: u64) {
        if crc == EMPTY {
            debug_assert!(self.zero_value.is_none());
            self.zero_value = Some(value);
            return;
        }
        if (self.count + 1) * 2 > self.size {
            self.grow();
        }
        let idx = self.slot(crc);
        debug_assert_ne!(self.entries[idx].0, crc, "key already present");
        self.entries[idx] = (crc, value);
        self.count += 1;
    }

    fn update(&mut self, crc: u64, value: u64) {
        if crc == EMPTY {
            self.zero_value = Some(value);
            return;
        }
        let idx = self.slot(crc);
        if self.entries[idx].0 == crc {
            self.entries[idx].1 = value;
        } else {
            self.add(crc, value);
        }
    }

    #[inline(always)]
    fn get(&self, crc: u64) -> Option<u64> {
        if crc == EMPTY {
            return self.zero_value;
        }
        let entry = self.entries[self.slot(crc)];
        (entry.0 == crc).then_some(entry.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc64::{Crc64Update, CRC64_START};

    #[test]
    fn test_keeps_keys_across_growth() {
        let mut hash = HashCrcNormal::new(4);
        let keys: Vec<u64> = (0..1000u64).map(|i| CRC64_START.crc64_update(i)).collect();
        for (i, &k) in keys.iter().enumerate() {
            hash.add(k, i as u64);
        }
        hash.add(0, 77);
        assert_eq!(hash.len(), 1001);
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(hash.get(k), Some(i as u64));
        }
        assert_eq!(hash.get(0), Some(77));
        assert!(!hash.contains_key(12345));
    }

    #[test]
    fn test_update() {
        let mut hash = HashCrcNormal::default();
        hash.update(42, 9);
        assert_eq!(hash.get(42), Some(9));
        hash.update(42, 5);
        assert_eq!(hash.get(42), Some(5));
        assert_eq!(hash.len(), 1);
        hash.update(0, 3);
        assert_eq!(hash.get(0), Some(3));
    }
}
