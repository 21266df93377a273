//! Room decomposition of a board.
//!
//! A [`RoomNetwork`] starts with one [`Room`] per walkable cell. Rooms can be
//! merged pairwise into larger automata, and [`RoomSolver`] searches over the
//! product of room states.

pub mod merger;
pub mod network;
pub mod portal;
pub mod reverse;
pub mod room;
pub mod solver;
pub mod state_box_swap;
pub mod state_list;
pub mod variant_data;
pub mod variant_list;
pub mod variant_state_dict;

pub use network::RoomNetwork;
pub use portal::{OutgoingPortal, PortalRef, RoomPortal};
pub use room::Room;
pub use solver::{RoomSolver, SearchState, Solution, SolverConfig};
pub use variant_data::{VariantData, PLAYER_STAYS};
