use sokowahn::field::Direction;
use sokowahn::{FieldError, RoomNetwork, RoomSolver, SearchState, SokoBoard, SokoField, Solution, SolverConfig, SolverError};

const FIELD_TEST1: &str = "
    ######
    #    #
    # $@.#
    ######
";

const FIELD_TEST2: &str = "
    ########
    #      #
    # $ $+.#
    ########
";

// the box can only slide along the bottom wall, the goal is up left
const FIELD_STUCK: &str = "
    ######
    #.   #
    # ## #
    # $@ #
    ######
";

fn network(text: &str, merge_limit: Option<u64>) -> RoomNetwork {
    let mut network = RoomNetwork::new(SokoField::parse(text).unwrap());
    network.init_rooms().unwrap();
    network.validate().unwrap();
    if let Some(limit) = merge_limit {
        network.merge_all(limit).unwrap();
        network.validate().unwrap();
    }
    network
}

fn solve(network: &RoomNetwork) -> Solution {
    let mut solver = RoomSolver::new(network);
    solver.solve(&SolverConfig::default()).unwrap().expect("level should be solvable")
}

/// Plays `path` on the board and returns the box cells plus the push count.
fn replay(field: &SokoField, path: &str) -> (Vec<usize>, u64) {
    let (width, height) = (field.width(), field.height());
    let mut player = field.player_pos();
    let mut boxes = field.box_posis().to_vec();
    let mut pushes = 0;
    for c in path.chars() {
        let dir = Direction::from_char(c).unwrap();
        let next = dir.step(player, width, height).unwrap();
        assert!(!field.is_wall(next), "walked into a wall at {}", next);
        if let Some(b) = boxes.iter().position(|&b| b == next) {
            let beyond = dir.step(next, width, height).unwrap();
            assert!(!field.is_wall(beyond) && !boxes.contains(&beyond), "blocked push at {}", next);
            boxes[b] = beyond;
            pushes += 1;
        }
        player = next;
    }
    boxes.sort_unstable();
    (boxes, pushes)
}

fn assert_solves(network: &RoomNetwork, solution: &Solution) {
    assert_eq!(solution.path.len() as u64, solution.moves);
    let (boxes, pushes) = replay(&network.field, &solution.path);
    assert_eq!(boxes, network.field.goal_posis());
    assert_eq!(pushes, solution.pushes);
}

#[test]
fn test_field1_single_cell_rooms() {
    let network = network(FIELD_TEST1, None);
    assert_eq!(network.room_count(), 8);
    let solution = solve(&network);
    assert_eq!(solution, Solution { moves: 6, pushes: 2, path: "ulldrr".into() });
    assert_solves(&network, &solution);
}

#[test]
fn test_field1_merged() {
    let network = network(FIELD_TEST1, Some(4096));
    assert_eq!(network.room_count(), 1);
    let solution = solve(&network);
    assert_eq!(solution.moves, 6);
    assert_eq!(solution.pushes, 2);
    assert_solves(&network, &solution);
}

#[test]
fn test_field1_partly_merged() {
    // only small merges, several rooms remain
    let network = network(FIELD_TEST1, Some(4));
    assert!(network.room_count() < 8);
    let solution = solve(&network);
    assert_eq!(solution.moves, 6);
    assert_solves(&network, &solution);
}

#[test]
fn test_field2_single_cell_rooms() {
    let network = network(FIELD_TEST2, None);
    let solution = solve(&network);
    assert_eq!(solution.moves, 15);
    assert_eq!(solution.pushes, 5);
    assert_solves(&network, &solution);
}

#[test]
fn test_field2_merged() {
    let network = network(FIELD_TEST2, Some(4096));
    let solution = solve(&network);
    assert_eq!(solution.moves, 15);
    assert_solves(&network, &solution);
}

#[test]
fn test_cycle_limit_gives_up() {
    let network = network(FIELD_TEST2, None);
    let mut solver = RoomSolver::new(&network);
    let config = SolverConfig { ticks_per_cycle: 1, max_cycles: Some(3), ..SolverConfig::default() };
    assert_eq!(solver.solve(&config).unwrap(), None);
    assert!(solver.solution().is_none());
}

#[test]
fn test_unsolvable_single_cell_rooms() {
    let network = network(FIELD_STUCK, None);
    let mut solver = RoomSolver::new(&network);
    assert_eq!(solver.solve(&SolverConfig::default()).unwrap(), None);
    assert_eq!(solver.state(), SearchState::Exhausted);
}

#[test]
fn test_unsolvable_merged() {
    let network = network(FIELD_STUCK, Some(4096));
    let start = network.room_of_pos(network.field.player_pos()).unwrap();
    assert!(network.rooms[start].is_start_room());

    let mut solver = RoomSolver::new(&network);
    assert_eq!(solver.solve(&SolverConfig::default()).unwrap(), None);
    assert_eq!(solver.state(), SearchState::Exhausted);
    assert_eq!(solver.start_room(), Some(start));
}

#[test]
fn test_invalid_levels() {
    assert!(SokoField::parse("####\n#@ #\n####").is_err());
    assert!(SokoField::parse("#####\n#@$.#\n#@  #\n#####").is_err());
    assert!(SokoField::parse("######\n#@$$.#\n######").is_err());
    assert!(SokoField::parse("#####\n#@$. \n#####").is_err());
    assert_eq!(
        SokoField::parse("#######\n#@ $.##\n#######\n#$ . #\n#######").unwrap_err(),
        FieldError::Unreachable { x: 1, y: 3 }
    );

    // box stuck in a dead corner
    let field = SokoField::parse("#####\n#$ @#\n#  .#\n#####").unwrap();
    let mut network = RoomNetwork::new(field);
    assert!(matches!(network.init_rooms(), Err(SolverError::Field(_))));
}
