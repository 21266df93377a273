//! Sokoban solver built on a network of rooms.
//!
//! The board is split into rooms that each know their own box configurations
//! and the walks the player can take through them. Neighbouring rooms can be
//! merged into bigger rooms before a move-optimal forward search runs over
//! the combined room states.

pub mod crc64;
pub mod error;
pub mod field;
pub mod hash_crc;
pub mod rooms;
pub mod task_list;

pub use error::{FieldError, SolverError};
pub use field::{Direction, SokoBoard, SokoField};
pub use rooms::{RoomNetwork, RoomSolver, SearchState, Solution, SolverConfig};
