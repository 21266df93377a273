//! Forward search over the room network.
//!
//! A task is one `u64` per room holding its state, plus a trailing word
//! `(room << 48) | variant` naming the variant that produced the task. The
//! search is a bucket queue indexed by move count, driven in bounded steps by
//! [`RoomSolver::search_cycle`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::ops::Range;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::crc64::crc64_of_tasks;
use crate::error::{Result, SolverError};
use crate::field::{Direction, SokoBoard, SokoField};
use crate::hash_crc::{HashCrc, HashCrcNormal};
use crate::task_list::{TaskList, TaskListNormal};

use super::network::RoomNetwork;
use super::variant_data::VariantData;

pub const VARIANT_BITS: u32 = 48;
pub const VARIANT_MASK: u64 = (1 << VARIANT_BITS) - 1;
pub const MAX_ROOMS: usize = 65535;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Init,
    AddStarts,
    ScanForward,
    Solved,
    Exhausted,
}

/// Search budget and room merging settings.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Ticks per [`RoomSolver::search_cycle`] call.
    pub ticks_per_cycle: u64,
    /// Give up after this many cycles.
    pub max_cycles: Option<u64>,
    /// Largest state count a merged room may reach.
    pub merge_limit: u64,
    pub merge: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { ticks_per_cycle: 10_000, max_cycles: None, merge_limit: 4096, merge: true }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    pub moves: u64,
    pub pushes: u64,
    pub path: String,
}

#[inline(always)]
fn staged_state(staged: &[(usize, u64)], task: &[u64], room: usize) -> u64 {
    staged.iter().rev().find(|s| s.0 == room).map_or(task[room], |s| s.1)
}

/// Applies one variant of `room` to `task` and returns its moves.
///
/// `None` rejects the variant in this context: a pushed box has no swap in
/// its destination room, a terminal variant leaves unsolved rooms behind, or
/// the player would enter a room without any variant to continue with. A
/// rejected variant leaves `task` untouched.
pub fn resolve_variant<F: SokoBoard>(network: &RoomNetwork<F>, task: &mut [u64], room: usize, variant: u64) -> Option<u64> {
    let rooms = &network.rooms;
    let room_count = rooms.len();
    let r = &rooms[room];
    let data = r.variant_list.get_data(variant);
    debug_assert_eq!(task[room], data.old_state);

    let mut staged: SmallVec<[(usize, u64); 4]> = SmallVec::new();
    for &bp in &data.box_portals {
        let target = r.outgoing[bp as usize].target;
        let current = staged_state(&staged, task, target.room);
        let next = rooms[target.room].incoming[target.portal as usize].state_box_swap.get(current)?;
        staged.push((target.room, next));
    }

    if data.is_terminal() {
        if (0..room_count).any(|i| i != room && staged_state(&staged, task, i) != 0) {
            return None;
        }
    } else {
        let exit = r.outgoing[data.player_portal as usize].target;
        let dest_state = staged_state(&staged, task, exit.room);
        let dict = &rooms[exit.room].incoming[exit.portal as usize].variant_state_dict;
        if dict.get_variant_span(dest_state).is_empty() {
            return None;
        }
    }

    for &(idx, state) in &staged {
        task[idx] = state;
    }
    task[room] = data.new_state;
    task[room_count] = ((room as u64) << VARIANT_BITS) | variant;
    Some(data.moves)
}

/// Successor of a task found by [`VariantMoves`].
#[derive(Clone, Debug)]
pub struct Candidate {
    pub task: Vec<u64>,
    /// Moves from the expanded task to this one.
    pub moves: u64,
    pub pushes: u64,
    pub path: String,
}

struct LocalTask {
    moves: u64,
    task: Vec<u64>,
    path: String,
}

impl Eq for LocalTask {}
impl PartialEq for LocalTask {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.moves == other.moves
    }
}

impl Ord for LocalTask {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        other.moves.cmp(&self.moves)
    }
}

impl PartialOrd for LocalTask {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lazily lists the push (and terminal) successors of a task.
///
/// Pure-move variants are chased locally, cheapest first, with a private CRC
/// table so every player position is expanded once; the first push reached
/// along a chain ends that chain and is yielded.
pub struct VariantMoves<'a, F: SokoBoard> {
    network: &'a RoomNetwork<F>,
    queue: BinaryHeap<LocalTask>,
    seen: FxHashMap<u64, u64>,
    current: Option<(LocalTask, usize, Range<u64>)>,
}

impl<'a, F: SokoBoard> VariantMoves<'a, F> {
    pub fn new(network: &'a RoomNetwork<F>, task: &[u64]) -> Self {
        let mut seen = FxHashMap::default();
        seen.insert(crc64_of_tasks(task), 0);
        let mut queue = BinaryHeap::new();
        queue.push(LocalTask { moves: 0, task: task.to_vec(), path: String::new() });
        VariantMoves { network, queue, seen, current: None }
    }
}

impl<F: SokoBoard> Iterator for VariantMoves<'_, F> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let network = self.network;
        loop {
            if let Some((base, room, range)) = self.current.as_mut() {
                for v in range.by_ref() {
                    let mut task = base.task.clone();
                    let Some(moves) = resolve_variant(network, &mut task, *room, v) else {
                        continue;
                    };
                    let data = network.rooms[*room].variant_list.get_data(v);
                    let moves = base.moves + moves;
                    let mut path = base.path.clone();
                    path.push_str(&VariantData::uncompress_path(&data.path));

                    if data.pushes == 0 && !data.is_terminal() {
                        let crc = crc64_of_tasks(&task);
                        if self.seen.get(&crc).is_some_and(|&m| m <= moves) {
                            continue;
                        }
                        self.seen.insert(crc, moves);
                        self.queue.push(LocalTask { moves, task, path });
                        continue;
                    }
                    return Some(Candidate { task, moves, pushes: data.pushes, path });
                }
                self.current = None;
            }

            let next = self.queue.pop()?;
            if self.seen.get(&crc64_of_tasks(&next.task)).is_some_and(|&m| m < next.moves) {
                continue;
            }
            let trailing = next.task[network.rooms.len()];
            let (room, variant) = ((trailing >> VARIANT_BITS) as usize, trailing & VARIANT_MASK);
            let Some(exit) = network.variant_exit(room, variant) else {
                continue;
            };
            let dict = &network.rooms[exit.room].incoming[exit.portal as usize].variant_state_dict;
            let span = dict.get_variant_span(next.task[exit.room]);
            self.current = Some((next, exit.room, span.range()));
        }
    }
}

/// How a task was reached: the task it was expanded from and the moves since.
#[derive(Debug, Clone)]
struct Trace {
    parent: Option<u64>,
    pushes: u64,
    path: String,
}

pub struct RoomSolver<'a, F: SokoBoard = SokoField> {
    network: &'a RoomNetwork<F>,
    room_count: usize,
    search_state: SearchState,
    start_room: usize,
    start_task: Vec<u64>,
    next_start_variant: u64,
    current: Vec<u64>,
    hash_table: HashCrcNormal,
    traces: FxHashMap<u64, Trace>,
    forward_tasks: Vec<TaskListNormal>,
    forward_index: usize,
    solution: Option<Solution>,
}

impl<'a, F: SokoBoard> RoomSolver<'a, F> {
    pub fn new(network: &'a RoomNetwork<F>) -> Self {
        let room_count = network.rooms.len();
        RoomSolver {
            network,
            room_count,
            search_state: SearchState::Init,
            start_room: 0,
            start_task: Vec::new(),
            next_start_variant: 0,
            current: vec![0; room_count + 1],
            hash_table: HashCrcNormal::default(),
            traces: FxHashMap::default(),
            forward_tasks: Vec::new(),
            forward_index: 0,
            solution: None,
        }
    }

    #[inline(always)]
    pub fn state(&self) -> SearchState {
        self.search_state
    }

    pub fn start_room(&self) -> Option<usize> {
        (self.search_state != SearchState::Init).then_some(self.start_room)
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Number of known tasks in the visited table.
    pub fn hash_len(&self) -> usize {
        self.hash_table.len()
    }

    /// Queued tasks with exactly `moves` moves.
    pub fn pending_at(&self, moves: u64) -> usize {
        self.forward_tasks.get(moves as usize).map_or(0, |l| l.len())
    }

    /// Runs at most `max_ticks` steps. Returns `true` once a solution is found.
    pub fn search_cycle(&mut self, max_ticks: u64) -> Result<bool> {
        for _ in 0..max_ticks {
            match self.search_state {
                SearchState::Init => self.init()?,
                SearchState::AddStarts => self.add_start(),
                SearchState::ScanForward => self.scan_forward(),
                SearchState::Solved | SearchState::Exhausted => break,
            }
        }
        Ok(self.search_state == SearchState::Solved)
    }

    /// Repeats search cycles until the search ends or the cycle limit is hit.
    pub fn solve(&mut self, config: &SolverConfig) -> Result<Option<Solution>> {
        let mut cycles = 0u64;
        loop {
            if self.search_cycle(config.ticks_per_cycle)? {
                return Ok(self.solution.clone());
            }
            if self.search_state == SearchState::Exhausted {
                return Ok(None);
            }
            cycles += 1;
            if config.max_cycles.is_some_and(|max| cycles >= max) {
                info!(cycles, hash = self.hash_table.len(), "cycle limit reached");
                return Ok(None);
            }
            trace!(cycles, forward = self.forward_index, hash = self.hash_table.len(), "search cycle");
        }
    }

    fn init(&mut self) -> Result<()> {
        let rooms = &self.network.rooms;
        if rooms.len() > MAX_ROOMS {
            return Err(SolverError::TooManyRooms(rooms.len()));
        }

        let mut start_room = None;
        for (i, room) in rooms.iter().enumerate() {
            self.current[i] = room.start_state;
            if room.variant_list.len() > VARIANT_MASK {
                return Err(SolverError::VariantOverflow { room: i, count: room.variant_list.len() });
            }
            if room.is_start_room() {
                if let Some(first) = start_room {
                    return Err(SolverError::DuplicateStartRoom { first, second: i });
                }
                start_room = Some(i);
            }
        }
        self.start_room = start_room.ok_or(SolverError::NoStartRoom)?;
        self.current[self.room_count] = (self.start_room as u64) << VARIANT_BITS;
        self.start_task = self.current.clone();
        debug!(rooms = self.room_count, start_room = self.start_room, "search initialised");

        if self.current[..self.room_count].iter().all(|&s| s == 0) {
            self.solution = Some(Solution::default());
            self.search_state = SearchState::Solved;
        } else {
            self.search_state = SearchState::AddStarts;
        }
        Ok(())
    }

    fn add_start(&mut self) {
        let network = self.network;
        let room = &network.rooms[self.start_room];
        let variant = self.next_start_variant;

        if variant < room.start_variant_count {
            self.next_start_variant += 1;
            let mut task = self.start_task.clone();
            if let Some(moves) = resolve_variant(network, &mut task, self.start_room, variant) {
                if moves > 0 {
                    let data = room.variant_list.get_data(variant);
                    self.offer(&task, moves, None, data.pushes, VariantData::uncompress_path(&data.path));
                }
                self.current = task;
            }
        }

        if self.next_start_variant >= room.start_variant_count {
            debug!(hash = self.hash_table.len(), "start variants added");
            self.search_state = SearchState::ScanForward;
            self.forward_index = 0;
        }
    }

    /// Records a task reached with `moves` moves unless it is already known
    /// with at most that many.
    fn offer(&mut self, task: &[u64], moves: u64, parent: Option<u64>, pushes: u64, path: String) -> bool {
        let crc = crc64_of_tasks(task);
        match self.hash_table.get(crc) {
            Some(known) if known <= moves => return false,
            Some(_) => self.hash_table.update(crc, moves),
            None => self.hash_table.add(crc, moves),
        }
        self.traces.insert(crc, Trace { parent, pushes, path });

        let bucket = moves as usize;
        if self.forward_tasks.len() <= bucket {
            let task_size = self.room_count + 1;
            self.forward_tasks.resize_with(bucket + 1, || TaskListNormal::new(task_size));
        }
        self.forward_tasks[bucket].add(task);
        true
    }

    fn scan_forward(&mut self) {
        while self.forward_index < self.forward_tasks.len() && self.forward_tasks[self.forward_index].is_empty() {
            self.forward_index += 1;
        }
        if self.forward_index >= self.forward_tasks.len() {
            info!(hash = self.hash_table.len(), "search exhausted");
            self.search_state = SearchState::Exhausted;
            return;
        }

        let moves = self.forward_index as u64;
        let mut task = vec![0; self.room_count + 1];
        self.forward_tasks[self.forward_index].fetch_first(&mut task);
        let crc = crc64_of_tasks(&task);
        if self.hash_table.get(crc) != Some(moves) {
            // improved after being queued
            return;
        }
        self.current.copy_from_slice(&task);

        if task[..self.room_count].iter().all(|&s| s == 0) {
            let (pushes, path) = self.path_to(crc);
            debug_assert_eq!(path.len() as u64, moves);
            info!(moves, pushes, hash = self.hash_table.len(), "solution found");
            self.solution = Some(Solution { moves, pushes, path });
            self.search_state = SearchState::Solved;
            return;
        }

        let network = self.network;
        for candidate in VariantMoves::new(network, &task) {
            self.offer(&candidate.task, moves + candidate.moves, Some(crc), candidate.pushes, candidate.path);
        }
    }

    /// Pushes and uncompressed path from the start up to a recorded task.
    fn path_to(&self, crc: u64) -> (u64, String) {
        let mut segments = Vec::new();
        let mut pushes = 0;
        let mut next = Some(crc);
        while let Some(trace) = next.and_then(|c| self.traces.get(&c)) {
            segments.push(trace.path.as_str());
            pushes += trace.pushes;
            next = trace.parent;
        }
        segments.reverse();
        (pushes, segments.concat())
    }

    /// Player cell of the task currently looked at.
    pub fn current_player_pos(&self) -> usize {
        let field = &self.network.field;
        if self.search_state == SearchState::Init {
            return field.player_pos();
        }
        let trailing = self.current[self.room_count];
        let (room, variant) = ((trailing >> VARIANT_BITS) as usize, trailing & VARIANT_MASK);
        let r = &self.network.rooms[room];
        if variant < r.variant_list.len() {
            let data = r.variant_list.get_data(variant);
            if !data.is_terminal() {
                return r.outgoing[data.player_portal as usize].to_pos;
            }
        }

        // terminal variants keep the player inside: replay the path
        let (_, path) = self.path_to(crc64_of_tasks(&self.current));
        path.chars().filter_map(Direction::from_char).fold(field.player_pos(), |pos, d| {
            (pos as isize + d.offset(field.width())) as usize
        })
    }

    /// Box cells of the task currently looked at.
    pub fn current_boxes(&self) -> Vec<usize> {
        let field = &self.network.field;
        if self.search_state == SearchState::Init {
            return (0..field.width() * field.height()).filter(|&p| field.is_box(p)).collect();
        }
        let mut boxes: Vec<usize> = (0..self.room_count)
            .flat_map(|r| self.network.rooms[r].state_list.get(self.current[r]).iter().copied())
            .collect();
        boxes.sort_unstable();
        boxes
    }
}

impl<F: SokoBoard> fmt::Display for RoomSolver<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Hash: {}", self.hash_table.len())?;
        writeln!(f, " State: {:?}", self.search_state)?;
        match self.search_state {
            SearchState::AddStarts => writeln!(
                f,
                " Add-Starts: {} / {}",
                self.next_start_variant,
                self.network.rooms[self.start_room].start_variant_count
            )?,
            SearchState::ScanForward => {
                let pending: usize = self.forward_tasks.iter().map(|l| l.len()).sum();
                writeln!(f, " Forward: {} ({} pending)", self.forward_index, pending)?
            }
            SearchState::Solved => {
                if let Some(solution) = &self.solution {
                    writeln!(f, " Solution: {} moves, {} pushes", solution.moves, solution.pushes)?
                }
            }
            SearchState::Init | SearchState::Exhausted => {}
        }

        if self.search_state != SearchState::Init {
            let trailing = self.current[self.room_count];
            let (room, variant) = ((trailing >> VARIANT_BITS) as usize, trailing & VARIANT_MASK);
            writeln!(f, "  Room: {}", room)?;
            writeln!(f, "  V-ID: {}", variant)?;
            if let Some(r) = self.network.rooms.get(room) {
                if variant < r.variant_list.len() {
                    writeln!(f, "  Path: {}", r.variant_list.get_data(variant).path)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::variant_list::{VariantList, VariantListNormal};

    const FIELD_TEST1: &str = "######\n#    #\n# $@.#\n######";

    /// Claims more variants than a task word can address.
    #[derive(Debug)]
    struct OversizedVariants(VariantListNormal);

    impl VariantList for OversizedVariants {
        fn len(&self) -> u64 {
            VARIANT_MASK + 1
        }

        fn end_count(&self) -> u64 {
            self.0.end_count()
        }

        #[allow(clippy::too_many_arguments)]
        fn add(&mut self, old: u64, moves: u64, pushes: u64, boxes: &[u32], portal: u32, new: u64, path: &str) -> u64 {
            self.0.add(old, moves, pushes, boxes, portal, new, path)
        }

        fn get_data(&self, variant: u64) -> &VariantData {
            self.0.get_data(variant)
        }
    }

    fn network() -> RoomNetwork {
        let mut network = RoomNetwork::new(SokoField::parse(FIELD_TEST1).unwrap());
        network.init_rooms().unwrap();
        network
    }

    fn start_task(network: &RoomNetwork) -> Vec<u64> {
        let mut task: Vec<u64> = network.rooms.iter().map(|r| r.start_state).collect();
        task.push(0);
        task
    }

    #[test]
    fn test_init_selects_player_room() {
        let network = network();
        let mut solver = RoomSolver::new(&network);
        assert_eq!(solver.start_room(), None);
        assert!(!solver.search_cycle(1).unwrap());
        assert_eq!(solver.state(), SearchState::AddStarts);
        assert_eq!(solver.start_room(), network.room_of_pos(15));
        assert_eq!(solver.current_boxes(), vec![14]);
    }

    #[test]
    fn test_init_errors() {
        let mut network = network();
        let start = network.room_of_pos(15).unwrap();
        network.rooms[0].is_start = true;
        let err = RoomSolver::new(&network).search_cycle(1).unwrap_err();
        assert_eq!(err, SolverError::DuplicateStartRoom { first: 0, second: start });

        network.rooms[0].is_start = false;
        network.rooms[start].is_start = false;
        let err = RoomSolver::new(&network).search_cycle(1).unwrap_err();
        assert_eq!(err, SolverError::NoStartRoom);
    }

    #[test]
    fn test_init_rejects_variant_overflow() {
        let mut network = network();
        let room = network.room_of_pos(8).unwrap();
        network.rooms[room].variant_list = Box::new(OversizedVariants(VariantListNormal::new(2)));
        let err = RoomSolver::new(&network).search_cycle(1).unwrap_err();
        assert_eq!(err, SolverError::VariantOverflow { room, count: VARIANT_MASK + 1 });
    }

    #[test]
    fn test_init_rejects_too_many_rooms() {
        // 258 x 258 open floor inside the border
        let size = 260;
        let mut rows = vec!["#".repeat(size)];
        for y in 1..size - 1 {
            let mut row = vec![b' '; size];
            row[0] = b'#';
            row[size - 1] = b'#';
            match y {
                1 => row[1] = b'@',
                2 => row[2] = b'$',
                3 => row[3] = b'.',
                _ => {}
            }
            rows.push(String::from_utf8(row).unwrap());
        }
        rows.push("#".repeat(size));

        let network = RoomNetwork::new(SokoField::parse(&rows.join("\n")).unwrap());
        assert_eq!(network.room_count(), 258 * 258);
        let err = RoomSolver::new(&network).search_cycle(1).unwrap_err();
        assert_eq!(err, SolverError::TooManyRooms(258 * 258));
        assert_eq!(RoomSolver::new(&network).state(), SearchState::Init);
    }

    #[test]
    fn test_resolve_rejects_blocked_push_untouched() {
        let network = network();
        let room = network.room_of_pos(14).unwrap();
        let right = network.room_of_pos(15).unwrap();
        let span = network.rooms[room].incoming[0].variant_state_dict.get_variant_span(1);
        let push = span.start;
        assert_eq!(network.rooms[room].variant_list.get_data(push).pushes, 1);

        let mut task = start_task(&network);
        task[right] = 1; // a box already waits on 15
        let before = task.clone();
        assert_eq!(resolve_variant(&network, &mut task, room, push), None);
        assert_eq!(task, before);

        task[right] = 0;
        assert_eq!(resolve_variant(&network, &mut task, room, push), Some(1));
        assert_eq!(task[room], 0);
        assert_eq!(task[right], 1);
        assert_eq!(task[network.room_count()], ((room as u64) << VARIANT_BITS) | push);
    }

    #[test]
    fn test_resolve_terminal_needs_solved_rooms() {
        let network = network();
        let room = network.room_of_pos(15).unwrap();
        let goal = network.room_of_pos(16).unwrap();
        let r = &network.rooms[room];
        let span = r.incoming[0].variant_state_dict.get_variant_span(1);
        let end = span.range().find(|&v| r.variant_list.get_data(v).is_terminal()).unwrap();

        // box on 15, goal 16 empty, nothing else left
        let mut task = vec![0; network.room_count() + 1];
        task[room] = 1;
        task[goal] = 1;
        assert_eq!(resolve_variant(&network, &mut task.clone(), room, end), Some(0));

        // another box still on 14
        task[network.room_of_pos(14).unwrap()] = 1;
        let before = task.clone();
        assert_eq!(resolve_variant(&network, &mut task, room, end), None);
        assert_eq!(task, before);
    }

    #[test]
    fn test_variant_moves_chains_to_push() {
        let network = network();
        let start = network.room_of_pos(15).unwrap();
        let mut task = start_task(&network);
        // start variant "u": leave the start cell upwards
        let up = (0..network.rooms[start].start_variant_count)
            .find(|&v| network.rooms[start].variant_list.get_data(v).path == "u")
            .unwrap();
        assert_eq!(resolve_variant(&network, &mut task, start, up), Some(1));

        let candidates: Vec<Candidate> = VariantMoves::new(&network, &task).collect();
        assert!(candidates.iter().all(|c| c.pushes > 0));
        // walk round to 13, then push the box right and step l, r or u
        let best = candidates.iter().map(|c| c.moves).min().unwrap();
        assert_eq!(best, 5);
        let pushes: Vec<&str> = candidates.iter().filter(|c| c.moves == 5).map(|c| c.path.as_str()).collect();
        assert!(pushes.contains(&"lldrr"));
        assert!(pushes.iter().all(|p| p.starts_with("lldr")));
    }

    #[test]
    fn test_solve_unmerged() {
        let network = network();
        let mut solver = RoomSolver::new(&network);
        let solution = solver.solve(&SolverConfig::default()).unwrap().unwrap();
        assert_eq!(solution, Solution { moves: 6, pushes: 2, path: "ulldrr".into() });
        assert_eq!(solver.state(), SearchState::Solved);
        assert_eq!(solver.current_boxes(), vec![16]);
        assert_eq!(solver.current_player_pos(), 15);
        assert!(solver.to_string().contains("Solution: 6 moves, 2 pushes"));
    }

    #[test]
    fn test_add_starts_on_merged_room_queues_optimum() {
        let mut network = network();
        network.merge_all(4096).unwrap();
        let mut solver = RoomSolver::new(&network);
        while solver.state() != SearchState::ScanForward {
            solver.search_cycle(1).unwrap();
        }
        assert!(solver.pending_at(6) >= 1);
        assert_eq!((0..6).map(|m| solver.pending_at(m)).sum::<usize>(), 0);
    }
}
