//! Error types for board parsing and room-network configuration.
//!
//! Only structural problems end up here. A variant that cannot be applied
//! in the current search context is not an error; the solver just skips it.

/// Problems found while reading or validating a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("empty field")]
    Empty,
    #[error("invalid field-size ({width} x {height})")]
    InvalidSize { width: usize, height: usize },
    #[error("no player found")]
    NoPlayer,
    #[error("duplicate player found at {x}, {y}")]
    DuplicatePlayer { x: usize, y: usize },
    #[error("no boxes found")]
    NoBoxes,
    #[error("no goals found")]
    NoGoals,
    #[error("less boxes than goals ({boxes} < {goals})")]
    LessBoxes { boxes: usize, goals: usize },
    #[error("more boxes than goals ({boxes} > {goals})")]
    MoreBoxes { boxes: usize, goals: usize },
    #[error("incomplete border - walkable area reaches the edge at {x}, {y}")]
    IncompleteBorder { x: usize, y: usize },
    #[error("box or goal out of the player's reach on {x}, {y}")]
    Unreachable { x: usize, y: usize },
    #[error("found invalid box on {x}, {y}")]
    InvalidBox { x: usize, y: usize },
    #[error("unsupported field char {0:?}")]
    UnsupportedChar(char),
}

/// Fatal configuration errors of a room network or a solve attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("too many rooms ({0} > 65535)")]
    TooManyRooms(usize),
    #[error("overflow variant.Count in room {room} ({count})")]
    VariantOverflow { room: usize, count: u64 },
    #[error("duplicate start-room ({first} and {second})")]
    DuplicateStartRoom { first: usize, second: usize },
    #[error("no start-room")]
    NoStartRoom,
    #[error("room {room}: incoming portals ({incoming}) != outgoing portals ({outgoing})")]
    PortalMismatch { room: usize, incoming: usize, outgoing: usize },
    #[error("invalid merge: {0}")]
    InvalidMerge(String),
    #[error("validate room {room}: {reason}")]
    Validate { room: usize, reason: String },
}

pub type Result<T, E = SolverError> = std::result::Result<T, E>;
