//! Storage for all variants of a room.

use std::fmt;

use super::variant_data::{BoxPortals, VariantData, PLAYER_STAYS};

/// Append-only list of variants. Variant IDs are dense; IDs below the room's
/// start-variant count belong to the "player starts here" transitions.
pub trait VariantList: fmt::Debug {
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of terminal variants (player stays in the room).
    fn end_count(&self) -> u64;

    #[allow(clippy::too_many_arguments)]
    fn add(
        &mut self,
        old_state: u64,
        moves: u64,
        pushes: u64,
        box_portals: &[u32],
        player_portal: u32,
        new_state: u64,
        path: &str,
    ) -> u64;

    fn get_data(&self, variant: u64) -> &VariantData;
}

#[derive(Debug, Clone)]
pub struct VariantListNormal {
    portal_count: u32,
    data: Vec<VariantData>,
    end_count: u64,
}

impl VariantListNormal {
    pub fn new(portal_count: u32) -> Self {
        VariantListNormal { portal_count, data: Vec::new(), end_count: 0 }
    }
}

impl VariantList for VariantListNormal {
    #[inline(always)]
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn end_count(&self) -> u64 {
        self.end_count
    }

    fn add(
        &mut self,
        old_state: u64,
        moves: u64,
        pushes: u64,
        box_portals: &[u32],
        player_portal: u32,
        new_state: u64,
        path: &str,
    ) -> u64 {
        debug_assert!(moves >= pushes || player_portal == PLAYER_STAYS);
        debug_assert!(box_portals.iter().all(|&p| p < self.portal_count));
        debug_assert!(player_portal < self.portal_count || (player_portal == PLAYER_STAYS && new_state == 0));
        debug_assert_eq!(VariantData::path_len(path), moves);

        if player_portal == PLAYER_STAYS {
            self.end_count += 1;
        }
        self.data.push(VariantData {
            old_state,
            moves,
            pushes,
            box_portals: BoxPortals::from_slice(box_portals),
            player_portal,
            new_state,
            path: path.to_string(),
        });
        self.data.len() as u64 - 1
    }

    #[inline(always)]
    fn get_data(&self, variant: u64) -> &VariantData {
        &self.data[variant as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_returns_dense_ids() {
        let mut list = VariantListNormal::new(3);
        assert_eq!(list.add(0, 1, 0, &[], 2, 0, "l"), 0);
        assert_eq!(list.add(1, 1, 1, &[1], 0, 0, "r"), 1);
        assert_eq!(list.add(1, 0, 1, &[1], PLAYER_STAYS, 0, ""), 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list.end_count(), 1);

        let v = list.get_data(1);
        assert_eq!(v.box_portals.as_slice(), &[1]);
        assert!(!v.is_terminal());
        assert!(list.get_data(2).is_terminal());
    }
}
