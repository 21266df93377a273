//! Directed links between neighbouring rooms.

use std::fmt;

use crate::field::Direction;

use super::state_box_swap::{StateBoxSwap, StateBoxSwapNormal};
use super::variant_state_dict::{VariantStateDict, VariantStateDictNormal};

/// Handle of an incoming portal: `rooms[room].incoming[portal]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortalRef {
    pub room: usize,
    pub portal: u32,
}

impl PortalRef {
    #[inline(always)]
    pub const fn new(room: usize, portal: u32) -> Self {
        PortalRef { room, portal }
    }
}

/// Edge `from_room@from_pos -> to_room@to_pos`, owned by `to_room` as one of
/// its incoming portals.
pub struct RoomPortal {
    pub from_room: usize,
    pub from_pos: usize,
    pub to_room: usize,
    pub to_pos: usize,
    pub dir: Direction,
    /// Own position in `to_room`'s incoming array.
    pub iportal_index: u32,
    /// Incoming portal of `from_room` that leads back through the same cells.
    pub opposite: PortalRef,
    pub state_box_swap: Box<dyn StateBoxSwap>,
    pub variant_state_dict: Box<dyn VariantStateDict>,
}

impl RoomPortal {
    pub fn new(
        from_room: usize,
        from_pos: usize,
        to_room: usize,
        to_pos: usize,
        dir: Direction,
        iportal_index: u32,
        opposite: PortalRef,
    ) -> Self {
        RoomPortal {
            from_room,
            from_pos,
            to_room,
            to_pos,
            dir,
            iportal_index,
            opposite,
            state_box_swap: Box::new(StateBoxSwapNormal::new()),
            variant_state_dict: Box::new(VariantStateDictNormal::new()),
        }
    }

    /// Cell the player stands on when pushing a box through this portal.
    #[inline(always)]
    pub fn pusher_pos(&self) -> usize {
        (self.from_pos * 2).wrapping_sub(self.to_pos)
    }
}

impl fmt::Debug for RoomPortal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}@{} -{}-> {}@{}",
            self.iportal_index,
            self.from_room,
            self.from_pos,
            self.dir.to_char(),
            self.to_room,
            self.to_pos
        )
    }
}

/// Exit of a room: the neighbour's incoming portal plus a copy of its geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutgoingPortal {
    pub from_pos: usize,
    pub to_pos: usize,
    pub dir: Direction,
    pub target: PortalRef,
}

impl OutgoingPortal {
    /// Cell a box pushed through this exit would be pushed on to next.
    #[inline(always)]
    pub fn beyond_pos(&self) -> usize {
        (self.to_pos * 2).wrapping_sub(self.from_pos)
    }
}
