//! Combines two adjacent rooms into one.
//!
//! States of the new room are the Cartesian product of both rooms' states
//! (`new = state1 * |states2| + state2`). Variants of the new room are found by
//! walking through the variants of both rooms: whenever the player or a box
//! crosses a portal between the two rooms the walk continues on the other
//! side, and as soon as the player leaves the pair (or stays after the final
//! push) a combined variant is recorded. Only the cheapest walk per
//! `(exit, new state, pushed boxes)` is kept.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::Range;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Result, SolverError};

use super::portal::RoomPortal;
use super::room::Room;
use super::state_list::{StateList, StateListNormal};
use super::variant_data::{BoxPortals, VariantData, PLAYER_STAYS};
use super::variant_list::VariantListNormal;

/// Portal index marker for portals between the two merged rooms.
const INNER: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Side {
    First,
    Second,
}

impl Side {
    #[inline(always)]
    fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// Position of a walk through the merged pair.
struct WalkNode {
    moves: u64,
    pushes: u64,
    side: Side,
    /// Incoming portal of `side` the player just came through.
    entry: u32,
    state1: u64,
    state2: u64,
    boxes: BoxPortals,
    path: String,
}

type WalkKey = (Side, u32, u64, u64, BoxPortals);

impl WalkNode {
    fn key(&self) -> WalkKey {
        (self.side, self.entry, self.state1, self.state2, self.boxes.clone())
    }
}

impl Eq for WalkNode {}
impl PartialEq for WalkNode {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.moves == other.moves
    }
}

impl Ord for WalkNode {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        other.moves.cmp(&self.moves).then_with(|| other.pushes.cmp(&self.pushes))
    }
}

impl PartialOrd for WalkNode {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `(player exit, new state, boxes pushed out)` of a combined variant.
type VariantKey = (u32, u64, BoxPortals);

#[derive(Debug, Clone)]
struct WalkResult {
    moves: u64,
    pushes: u64,
    path: String,
}

pub struct RoomMerger<'a> {
    room1: &'a Room,
    index1: usize,
    room2: &'a Room,
    index2: usize,
    /// New incoming index per old incoming portal, [`INNER`] for dissolved ones.
    map1: Vec<u32>,
    map2: Vec<u32>,
    /// Origin of each portal of the new room.
    sources: Vec<(Side, u32)>,
    state2_count: u64,
}

impl<'a> RoomMerger<'a> {
    /// Room order is canonicalised: the room with the lower first cell
    /// becomes `room1`, whichever order the rooms are passed in.
    pub fn new(a: &'a Room, index_a: usize, b: &'a Room, index_b: usize) -> Self {
        let ((room1, index1), (room2, index2)) = if a.field_posis[0] <= b.field_posis[0] {
            ((a, index_a), (b, index_b))
        } else {
            ((b, index_b), (a, index_a))
        };

        let mut sources = Vec::new();
        let mut partition = |room: &Room, side: Side, other: usize| -> Vec<u32> {
            room.incoming
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    if p.from_room == other {
                        INNER
                    } else {
                        sources.push((side, i as u32));
                        sources.len() as u32 - 1
                    }
                })
                .collect()
        };
        let map1 = partition(room1, Side::First, index2);
        let map2 = partition(room2, Side::Second, index1);

        RoomMerger { room1, index1, room2, index2, map1, map2, sources, state2_count: room2.state_list.len() }
    }

    /// `(room1, room2)` arena indices after canonicalisation.
    pub fn indices(&self) -> (usize, usize) {
        (self.index1, self.index2)
    }

    #[inline(always)]
    fn room(&self, side: Side) -> &'a Room {
        match side {
            Side::First => self.room1,
            Side::Second => self.room2,
        }
    }

    #[inline(always)]
    fn map(&self, side: Side) -> &[u32] {
        match side {
            Side::First => &self.map1,
            Side::Second => &self.map2,
        }
    }

    #[inline(always)]
    fn combine(&self, state1: u64, state2: u64) -> u64 {
        state1 * self.state2_count + state2
    }

    #[inline(always)]
    fn split(&self, state: u64) -> (u64, u64) {
        (state / self.state2_count, state % self.state2_count)
    }

    /// Builds the replacement room. Portals keep their neighbours; the caller
    /// retargets the neighbours and compacts the arena.
    pub fn merge(self) -> Result<Room> {
        if self.room1.is_start && self.room2.is_start {
            return Err(SolverError::InvalidMerge(format!(
                "rooms {} and {} both contain the start",
                self.index1, self.index2
            )));
        }
        let state_count = self.room1.state_list.len().checked_mul(self.state2_count).ok_or_else(|| {
            SolverError::InvalidMerge(format!("state overflow merging {} and {}", self.index1, self.index2))
        })?;

        let union = |a: &[usize], b: &[usize]| {
            let mut v: Vec<usize> = a.iter().chain(b).copied().collect();
            v.sort_unstable();
            v
        };

        let incoming = self
            .sources
            .iter()
            .enumerate()
            .map(|(k, &(side, i))| {
                let old = &self.room(side).incoming[i as usize];
                RoomPortal::new(old.from_room, old.from_pos, self.index1, old.to_pos, old.dir, k as u32, old.opposite)
            })
            .collect();
        let outgoing = self.sources.iter().map(|&(side, i)| self.room(side).outgoing[i as usize]).collect();

        let mut room = Room {
            field_posis: union(&self.room1.field_posis, &self.room2.field_posis),
            goal_posis: union(&self.room1.goal_posis, &self.room2.goal_posis),
            start_box_posis: union(&self.room1.start_box_posis, &self.room2.start_box_posis),
            incoming,
            outgoing,
            state_list: Box::new(self.step1_states()),
            start_state: self.combine(self.room1.start_state, self.room2.start_state),
            variant_list: Box::new(VariantListNormal::new(self.sources.len() as u32)),
            is_start: self.room1.is_start || self.room2.is_start,
            start_variant_count: 0,
        };
        debug_assert_eq!(room.state_list.len(), state_count);

        self.step2_start_variants(&mut room);
        self.step3_portal_variants(&mut room);
        Ok(room)
    }

    /// Cartesian product of both state lists in row-major order.
    pub fn step1_states(&self) -> StateListNormal {
        let mut list = StateListNormal::new();
        let mut boxes = Vec::new();
        for s1 in 0..self.room1.state_list.len() {
            for s2 in 0..self.state2_count {
                boxes.clear();
                boxes.extend_from_slice(self.room1.state_list.get(s1));
                boxes.extend_from_slice(self.room2.state_list.get(s2));
                boxes.sort_unstable();
                let id = list.add(&boxes);
                debug_assert_eq!(id, self.combine(s1, s2));
            }
        }
        list
    }

    fn step2_start_variants(&self, room: &mut Room) {
        let side = match (self.room1.is_start, self.room2.is_start) {
            (true, _) => Side::First,
            (_, true) => Side::Second,
            _ => return,
        };
        let count = self.room(side).start_variant_count;
        let start_state = room.start_state;
        let (s1, s2) = self.split(start_state);

        for (key, result) in self.walk(side, 0..count, s1, s2) {
            room.variant_list.add(
                start_state,
                result.moves,
                result.pushes,
                &key.2,
                key.0,
                key.1,
                &VariantData::compress_path(&result.path),
            );
            room.start_variant_count += 1;
        }
        trace!(count = room.start_variant_count, "start variants merged");
    }

    fn step3_portal_variants(&self, room: &mut Room) {
        let state_count = room.state_list.len();
        for (k, &(side, i)) in self.sources.iter().enumerate() {
            let old = &self.room(side).incoming[i as usize];

            // --- box swaps ---
            let swap = &mut room.incoming[k].state_box_swap;
            for (old_state, new_state) in old.state_box_swap.pairs() {
                match side {
                    Side::First => {
                        for s2 in 0..self.state2_count {
                            swap.add(self.combine(old_state, s2), self.combine(new_state, s2));
                        }
                    }
                    Side::Second => {
                        for s1 in 0..self.room1.state_list.len() {
                            swap.add(self.combine(s1, old_state), self.combine(s1, new_state));
                        }
                    }
                }
            }

            // --- variants ---
            for state in 0..state_count {
                let (s1, s2) = self.split(state);
                let own = if side == Side::First { s1 } else { s2 };
                let span = old.variant_state_dict.get_variant_span(own);
                if span.is_empty() {
                    continue;
                }
                for (key, result) in self.walk(side, span.range(), s1, s2) {
                    let v = room.variant_list.add(
                        state,
                        result.moves,
                        result.pushes,
                        &key.2,
                        key.0,
                        key.1,
                        &VariantData::compress_path(&result.path),
                    );
                    room.incoming[k].variant_state_dict.add(state, v);
                }
            }
        }
    }

    /// All combined variants reachable by first taking one of `first` on
    /// `side`. Sorted: pure moves, then pushes, then terminal variants.
    fn walk(&self, side: Side, first: Range<u64>, state1: u64, state2: u64) -> Vec<(VariantKey, WalkResult)> {
        let mut heap = BinaryHeap::new();
        let mut best: FxHashMap<WalkKey, u64> = FxHashMap::default();
        let mut results: FxHashMap<VariantKey, WalkResult> = FxHashMap::default();

        let root = WalkNode { moves: 0, pushes: 0, side, entry: INNER, state1, state2, boxes: BoxPortals::new(), path: String::new() };
        self.expand(&root, first, &mut heap, &mut best, &mut results);

        while let Some(node) = heap.pop() {
            if best.get(&node.key()).is_some_and(|&m| m < node.moves) {
                continue;
            }
            let own = if node.side == Side::First { node.state1 } else { node.state2 };
            let span = self.room(node.side).incoming[node.entry as usize].variant_state_dict.get_variant_span(own);
            self.expand(&node, span.range(), &mut heap, &mut best, &mut results);
        }

        let mut sorted: Vec<(VariantKey, WalkResult)> = results.into_iter().collect();
        sorted.sort_unstable_by(|(a, ra), (b, rb)| {
            let class = |k: &VariantKey, r: &WalkResult| match (k.0 == PLAYER_STAYS, r.pushes) {
                (true, _) => 2,
                (false, 0) => 0,
                (false, _) => 1,
            };
            class(a, ra).cmp(&class(b, rb)).then_with(|| a.cmp(b))
        });
        sorted
    }

    fn expand(
        &self,
        node: &WalkNode,
        variants: Range<u64>,
        heap: &mut BinaryHeap<WalkNode>,
        best: &mut FxHashMap<WalkKey, u64>,
        results: &mut FxHashMap<VariantKey, WalkResult>,
    ) {
        let room = self.room(node.side);
        let other_room = self.room(node.side.other());
        let map = self.map(node.side);

        'variants: for v in variants {
            let data = room.variant_list.get_data(v);
            let (own_before, mut other) = match node.side {
                Side::First => (node.state1, node.state2),
                Side::Second => (node.state2, node.state1),
            };
            debug_assert_eq!(data.old_state, own_before);

            let mut boxes = node.boxes.clone();
            for &bp in &data.box_portals {
                match map[bp as usize] {
                    INNER => {
                        let target = room.outgoing[bp as usize].target;
                        match other_room.incoming[target.portal as usize].state_box_swap.get(other) {
                            Some(next) => other = next,
                            None => continue 'variants,
                        }
                    }
                    new_portal => match boxes.binary_search(&new_portal) {
                        // a second box can not enter the same neighbour cell
                        Ok(_) => continue 'variants,
                        Err(at) => boxes.insert(at, new_portal),
                    },
                }
            }

            let own = data.new_state;
            let (state1, state2) = match node.side {
                Side::First => (own, other),
                Side::Second => (other, own),
            };
            let moves = node.moves + data.moves;
            let pushes = node.pushes + data.pushes;
            let mut path = node.path.clone();
            path.push_str(&VariantData::uncompress_path(&data.path));

            if data.is_terminal() {
                if other == 0 {
                    record(results, (PLAYER_STAYS, 0, boxes), WalkResult { moves, pushes, path });
                }
                continue;
            }

            let exit = data.player_portal as usize;
            match map[exit] {
                INNER => {
                    let target = room.outgoing[exit].target;
                    let next = WalkNode {
                        moves,
                        pushes,
                        side: node.side.other(),
                        entry: target.portal,
                        state1,
                        state2,
                        boxes,
                        path,
                    };
                    let key = next.key();
                    if best.get(&key).map_or(true, |&m| moves < m) {
                        best.insert(key, moves);
                        heap.push(next);
                    }
                }
                new_portal => {
                    let state = self.combine(state1, state2);
                    record(results, (new_portal, state, boxes), WalkResult { moves, pushes, path });
                }
            }
        }
    }
}

fn record(results: &mut FxHashMap<VariantKey, WalkResult>, key: VariantKey, result: WalkResult) {
    match results.get(&key) {
        Some(old) if old.moves <= result.moves => {}
        _ => {
            results.insert(key, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SokoField;
    use crate::rooms::network::RoomNetwork;

    const FIELD_TEST1: &str = "######\n#    #\n# $@.#\n######";

    fn network() -> RoomNetwork {
        let mut network = RoomNetwork::new(SokoField::parse(FIELD_TEST1).unwrap());
        network.init_rooms().unwrap();
        network
    }

    fn states(list: &dyn StateList) -> Vec<Vec<usize>> {
        (0..list.len()).map(|s| list.get(s).to_vec()).collect()
    }

    #[test]
    fn test_merge_is_order_independent() {
        let network = network();
        let a = network.room_of_pos(14).unwrap();
        let b = network.room_of_pos(15).unwrap();
        let ab = RoomMerger::new(&network.rooms[a], a, &network.rooms[b], b);
        let ba = RoomMerger::new(&network.rooms[b], b, &network.rooms[a], a);
        assert_eq!(ab.indices(), ba.indices());
        assert_eq!(states(&ab.step1_states()), states(&ba.step1_states()));
    }

    #[test]
    fn test_states_are_row_major() {
        let network = network();
        let a = network.room_of_pos(15).unwrap();
        let b = network.room_of_pos(16).unwrap();
        let (room1, room2) = (&network.rooms[a], &network.rooms[b]);
        let list = RoomMerger::new(room1, a, room2, b).step1_states();

        let n2 = room2.state_list.len();
        assert_eq!(list.len(), room1.state_list.len() * n2);
        for s in 0..list.len() {
            let (s1, s2) = (s / n2, s % n2);
            let mut expected = room1.state_list.get(s1).to_vec();
            expected.extend_from_slice(room2.state_list.get(s2));
            expected.sort_unstable();
            assert_eq!(list.get(s), expected.as_slice());
        }
        // both solved states combine to the solved state
        assert_eq!(list.get(0), &[16]);
    }

    #[test]
    fn test_merged_room_pushes_box_through() {
        let network = network();
        let a = network.room_of_pos(14).unwrap();
        let b = network.room_of_pos(15).unwrap();
        let room = RoomMerger::new(&network.rooms[a], a, &network.rooms[b], b).merge().unwrap();

        // outer exits of 14 first (left, up), then those of 15 (right, up)
        let exits: Vec<usize> = room.outgoing.iter().map(|o| o.to_pos).collect();
        assert_eq!(exits, vec![13, 8, 16, 9]);
        // box on 14, 15 empty
        assert_eq!(room.start_state, 2);

        // entering from 13: push the box over 15 onto the goal at 16
        let span = room.incoming[0].variant_state_dict.get_variant_span(room.start_state);
        let variants: Vec<&VariantData> = span.range().map(|v| room.variant_list.get_data(v)).collect();

        let end = variants.iter().find(|d| d.is_terminal()).expect("terminal variant");
        assert_eq!(end.box_portals.as_slice(), &[2]);
        assert_eq!((end.moves, end.pushes), (1, 2));
        assert_eq!(end.path, "r");

        let up = variants
            .iter()
            .find(|d| d.player_portal == 3 && d.box_portals.as_slice() == [2])
            .expect("push and leave upwards");
        assert_eq!(up.new_state, 0);
        assert_eq!((up.moves, up.pushes), (2, 2));
        assert_eq!(up.path, "ru");

        // the terminal variant is listed last
        assert!(variants.last().is_some_and(|d| d.is_terminal()));
    }

    #[test]
    fn test_start_variants_move_first() {
        let network = network();
        let a = network.room_of_pos(9).unwrap();
        let b = network.room_of_pos(15).unwrap();
        let room = RoomMerger::new(&network.rooms[a], a, &network.rooms[b], b).merge().unwrap();
        assert!(room.start_variant_count > 0);
        for v in 0..room.start_variant_count {
            let data = room.variant_list.get_data(v);
            assert_eq!(data.old_state, room.start_state);
            assert_eq!(data.pushes, 0);
        }
        // "ul" leaves the pair on the left of 9 in two moves
        let left_of_9 = room.outgoing.iter().position(|o| o.to_pos == 8).unwrap() as u32;
        assert!((0..room.start_variant_count)
            .map(|v| room.variant_list.get_data(v))
            .any(|d| d.player_portal == left_of_9 && d.path == "ul"));
    }
}
