//! The set of all rooms of a board and the operations over the whole graph.

use arrayvec::ArrayVec;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::error::{Result, SolverError};
use crate::field::{Direction, SokoBoard, SokoField, DIRECTIONS};

use super::merger::RoomMerger;
use super::portal::{OutgoingPortal, PortalRef, RoomPortal};
use super::reverse::RoomReverse;
use super::room::Room;
use super::variant_data::PLAYER_STAYS;

/// Room graph over a board. Rooms live in an arena; portals refer to each
/// other through [`PortalRef`] indices.
pub struct RoomNetwork<F: SokoBoard = SokoField> {
    pub field: F,
    pub rooms: Vec<Room>,
}

impl<F: SokoBoard> RoomNetwork<F> {
    /// One room per walkable cell (ascending), portals in left, right, up, down order.
    pub fn new(field: F) -> Self {
        let walk = field.walk_posis();
        let room_of: FxHashMap<usize, usize> = walk.iter().enumerate().map(|(r, &p)| (p, r)).collect();
        let (width, height) = (field.width(), field.height());

        let neighbours: Vec<ArrayVec<(Direction, usize), 4>> = walk
            .iter()
            .map(|&pos| {
                DIRECTIONS
                    .into_iter()
                    .filter_map(|d| d.step(pos, width, height).map(|n| (d, n)))
                    .filter(|&(_, n)| room_of.contains_key(&n))
                    .collect()
            })
            .collect();
        let portal_index = |room: usize, pos: usize| -> u32 {
            neighbours[room].iter().position(|&(_, n)| n == pos).unwrap_or(usize::MAX) as u32
        };

        let mut rooms = Vec::with_capacity(walk.len());
        for (r, &pos) in walk.iter().enumerate() {
            let mut incoming = Vec::with_capacity(neighbours[r].len());
            let mut outgoing = Vec::with_capacity(neighbours[r].len());
            for (i, &(dir, npos)) in neighbours[r].iter().enumerate() {
                let n = room_of[&npos];
                let back = PortalRef::new(n, portal_index(n, pos));
                incoming.push(RoomPortal::new(n, npos, r, pos, opposite_dir(dir), i as u32, back));
                outgoing.push(OutgoingPortal { from_pos: pos, to_pos: npos, dir, target: back });
            }
            rooms.push(Room::new(&field, vec![pos], incoming, outgoing));
        }

        info!(rooms = rooms.len(), "room network created");
        RoomNetwork { field, rooms }
    }

    /// Computes states and variants of every (single-cell) room.
    pub fn init_rooms(&mut self) -> Result<()> {
        for room in self.rooms.iter_mut() {
            room.init_states(&self.field)?;
            room.init_variants(&self.field)?;
        }
        debug!(states = self.total_states(), variants = self.total_variants(), "rooms initialised");
        Ok(())
    }

    #[inline(always)]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_states(&self) -> u64 {
        self.rooms.iter().map(|r| r.state_list.len()).sum()
    }

    pub fn total_variants(&self) -> u64 {
        self.rooms.iter().map(|r| r.variant_list.len()).sum()
    }

    /// Checks every structural invariant of the network.
    pub fn validate(&self) -> Result<()> {
        let fail = |room: usize, reason: String| Err(SolverError::Validate { room, reason });
        let mut start_rooms = 0;

        for (r, room) in self.rooms.iter().enumerate() {
            if room.incoming.len() != room.outgoing.len() {
                return Err(SolverError::PortalMismatch {
                    room: r,
                    incoming: room.incoming.len(),
                    outgoing: room.outgoing.len(),
                });
            }
            if room.state_list.is_empty() || !room.state_list.get(0).iter().all(|p| room.goal_posis.contains(p)) {
                return fail(r, "state 0 is not the solved state".into());
            }
            if room.start_state >= room.state_list.len() {
                return fail(r, format!("start state {} out of range", room.start_state));
            }
            if room.is_start_room() {
                start_rooms += 1;
            }

            for (i, portal) in room.incoming.iter().enumerate() {
                let out = &room.outgoing[i];
                if portal.to_room != r || portal.iportal_index as usize != i {
                    return fail(r, format!("portal {} has wrong owner or index", i));
                }
                if out.target != portal.opposite || out.from_pos != portal.to_pos || out.to_pos != portal.from_pos {
                    return fail(r, format!("portal {} does not match its outgoing portal", i));
                }
                let Some(back) = self.rooms.get(portal.opposite.room).and_then(|o| o.incoming.get(portal.opposite.portal as usize))
                else {
                    return fail(r, format!("portal {} has a dangling opposite", i));
                };
                if back.from_pos != portal.to_pos
                    || back.to_pos != portal.from_pos
                    || back.opposite != PortalRef::new(r, i as u32)
                    || back.to_room != portal.from_room
                {
                    return fail(r, format!("portal {} is not symmetric", i));
                }
                for (old, new) in portal.state_box_swap.pairs() {
                    if old >= room.state_list.len() || new >= room.state_list.len() {
                        return fail(r, format!("portal {} swaps unknown state {} -> {}", i, old, new));
                    }
                }
            }

            let variants = &room.variant_list;
            let state_count = room.state_list.len();
            for v in 0..variants.len() {
                let data = variants.get_data(v);
                if data.old_state >= state_count || data.new_state >= state_count {
                    return fail(r, format!("variant {} uses an unknown state", v));
                }
                if data.is_terminal() {
                    if data.new_state != 0 {
                        return fail(r, format!("terminal variant {} does not end in state 0", v));
                    }
                } else {
                    if data.player_portal >= room.portal_count() {
                        return fail(r, format!("variant {} leaves through unknown portal", v));
                    }
                    if data.moves < data.pushes {
                        return fail(r, format!("variant {} has fewer moves than pushes", v));
                    }
                }
                if data.box_portals.iter().any(|&p| p >= room.portal_count()) {
                    return fail(r, format!("variant {} pushes through unknown portal", v));
                }
            }

            // every variant must be reachable from a start or an entry
            let mut reverse = RoomReverse::new(room);
            reverse.step1_fill_portal_state_swaps();
            reverse.step2_collect_variants_per_state()?;
        }

        if start_rooms != 1 {
            return Err(SolverError::Validate { room: 0, reason: format!("{} start rooms", start_rooms) });
        }
        Ok(())
    }

    /// Merges two adjacent rooms into one and returns the index of the new room.
    pub fn merge_rooms(&mut self, a: usize, b: usize) -> Result<usize> {
        if a == b || a >= self.rooms.len() || b >= self.rooms.len() {
            return Err(SolverError::InvalidMerge(format!("rooms {} and {}", a, b)));
        }
        if !self.rooms[a].incoming.iter().any(|p| p.from_room == b) {
            return Err(SolverError::InvalidMerge(format!("rooms {} and {} are not connected", a, b)));
        }

        let merger = RoomMerger::new(&self.rooms[a], a, &self.rooms[b], b);
        let (index1, index2) = merger.indices();
        let merged = merger.merge()?;
        debug!(
            room1 = index1,
            room2 = index2,
            states = merged.state_list.len(),
            variants = merged.variant_list.len(),
            portals = merged.portal_count(),
            "rooms merged"
        );

        // step 4: neighbours point at the new portals
        for (k, portal) in merged.incoming.iter().enumerate() {
            let new_ref = PortalRef::new(index1, k as u32);
            let opp = portal.opposite;
            let neighbour = &mut self.rooms[opp.room];
            neighbour.incoming[opp.portal as usize].opposite = new_ref;
            neighbour.incoming[opp.portal as usize].from_room = index1;
            neighbour.outgoing[opp.portal as usize].target = new_ref;
        }

        // step 5: new room takes the first slot, the second one is removed
        self.rooms[index1] = merged;
        self.rooms.remove(index2);
        let shift = |idx: usize| if idx > index2 { idx - 1 } else { idx };
        for room in self.rooms.iter_mut() {
            for portal in room.incoming.iter_mut() {
                portal.from_room = shift(portal.from_room);
                portal.to_room = shift(portal.to_room);
                portal.opposite.room = shift(portal.opposite.room);
            }
            for out in room.outgoing.iter_mut() {
                out.target.room = shift(out.target.room);
            }
        }
        Ok(shift(index1))
    }

    /// Greedily merges the connected pair with the smallest state product
    /// until no pair stays within `limit` states. Returns the number of merges.
    pub fn merge_all(&mut self, limit: u64) -> Result<usize> {
        let mut merges = 0;
        loop {
            let mut best: Option<(u64, usize, usize)> = None;
            for (r, room) in self.rooms.iter().enumerate() {
                for portal in &room.incoming {
                    let n = portal.from_room;
                    if n <= r {
                        continue;
                    }
                    let product = room.state_list.len().saturating_mul(self.rooms[n].state_list.len());
                    if product <= limit && best.map_or(true, |(p, _, _)| product < p) {
                        best = Some((product, r, n));
                    }
                }
            }
            let Some((_, a, b)) = best else { break };
            self.merge_rooms(a, b)?;
            merges += 1;
        }
        info!(
            merges,
            rooms = self.rooms.len(),
            states = self.total_states(),
            variants = self.total_variants(),
            "merging finished"
        );
        Ok(merges)
    }

    /// Room that owns the cell, if it is walkable.
    pub fn room_of_pos(&self, pos: usize) -> Option<usize> {
        self.rooms.iter().position(|r| r.field_posis.binary_search(&pos).is_ok())
    }

    /// Exit the player takes after `variant` of `room`, `None` for terminal variants.
    #[inline(always)]
    pub fn variant_exit(&self, room: usize, variant: u64) -> Option<PortalRef> {
        let r = &self.rooms[room];
        let data = r.variant_list.get_data(variant);
        (data.player_portal != PLAYER_STAYS).then(|| r.outgoing[data.player_portal as usize].target)
    }
}

#[inline(always)]
fn opposite_dir(dir: Direction) -> Direction {
    match dir {
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
    }
}
