//! Backward view of a room: inverse box swaps and variants grouped by exit.

use crate::error::{Result, SolverError};

use super::room::Room;
use super::state_box_swap::{StateBoxSwap, StateBoxSwapNormal};

/// A variant as seen from its end: which portal the player left through
/// and which state the room was left in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReverseVariant {
    pub player_portal: u32,
    pub new_state: u64,
    pub only_moves: bool,
    pub variant: u64,
}

pub struct RoomReverse<'a> {
    room: &'a Room,
    /// Per incoming portal: state after a box entered -> state before.
    pub portal_state_swaps: Vec<StateBoxSwapNormal>,
    /// All variants sorted by `(player_portal, new_state, only_moves, variant)`.
    pub variants: Vec<ReverseVariant>,
}

impl<'a> RoomReverse<'a> {
    pub fn new(room: &'a Room) -> Self {
        RoomReverse { room, portal_state_swaps: Vec::new(), variants: Vec::new() }
    }

    pub fn step1_fill_portal_state_swaps(&mut self) {
        self.portal_state_swaps = self
            .room
            .incoming
            .iter()
            .map(|portal| {
                let mut swap = StateBoxSwapNormal::new();
                for (old, new) in portal.state_box_swap.pairs() {
                    swap.add(new, old);
                }
                swap
            })
            .collect();
    }

    pub fn step2_collect_variants_per_state(&mut self) -> Result<()> {
        let room = self.room;
        let list = &room.variant_list;
        let entry = |variant: u64| {
            let data = list.get_data(variant);
            ReverseVariant {
                player_portal: data.player_portal,
                new_state: data.new_state,
                only_moves: data.pushes == 0,
                variant,
            }
        };

        let mut variants: Vec<ReverseVariant> = (0..room.start_variant_count).map(entry).collect();
        for portal in &room.incoming {
            let dict = &portal.variant_state_dict;
            for state in dict.all_states() {
                variants.extend(dict.get_variant_span(state).range().map(entry));
            }
        }

        if variants.len() as u64 != list.len() {
            return Err(SolverError::Validate {
                room: room.incoming.first().map_or(0, |p| p.to_room),
                reason: format!("reverse map holds {} of {} variants", variants.len(), list.len()),
            });
        }
        variants.sort_unstable();
        self.variants = variants;
        Ok(())
    }

    /// Variants that end by leaving through `player_portal` in `new_state`.
    pub fn variants_to(&self, player_portal: u32, new_state: u64) -> &[ReverseVariant] {
        let lo = self.variants.partition_point(|v| (v.player_portal, v.new_state) < (player_portal, new_state));
        let hi = self.variants.partition_point(|v| (v.player_portal, v.new_state) <= (player_portal, new_state));
        &self.variants[lo..hi]
    }
}
