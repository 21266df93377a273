//! A single local transition of a room.

use std::fmt;

use smallvec::SmallVec;

/// Player portal value of a terminal variant: the player stays in the room.
pub const PLAYER_STAYS: u32 = u32::MAX;

/// Outgoing portal indices a variant pushed boxes through.
pub type BoxPortals = SmallVec<[u32; 4]>;

/// Complete record of one variant.
#[derive(Clone, PartialEq, Eq)]
pub struct VariantData {
    /// Room state before the variant.
    pub old_state: u64,
    /// Steps made inside the room, including the step that leaves it.
    pub moves: u64,
    /// Box pushes made inside the room, including the entering push.
    pub pushes: u64,
    /// Outgoing portals a box was pushed through.
    pub box_portals: BoxPortals,
    /// Outgoing portal the player leaves through, or [`PLAYER_STAYS`].
    pub player_portal: u32,
    /// Room state after the variant.
    pub new_state: u64,
    /// Move string in XSB notation, optionally run-length compressed.
    pub path: String,
}

impl VariantData {
    #[inline(always)]
    pub fn is_terminal(&self) -> bool {
        self.player_portal == PLAYER_STAYS
    }

    /// Run-length compresses a path: runs of three or more become `<count><char>`.
    /// Already compressed paths are returned unchanged.
    pub fn compress_path(path: &str) -> String {
        if path.is_empty() || path.bytes().any(|c| c.is_ascii_digit()) {
            return path.to_string();
        }

        let bytes = path.as_bytes();
        let mut output = String::with_capacity(path.len());
        let mut pos = 0;
        while pos < bytes.len() {
            let mut len = 1;
            while pos + len < bytes.len() && bytes[pos + len] == bytes[pos] {
                len += 1;
            }
            if len < 3 {
                output.push(bytes[pos] as char);
                pos += 1;
            } else {
                output.push_str(&len.to_string());
                output.push(bytes[pos] as char);
                pos += len;
            }
        }
        output
    }

    /// Expands a run-length compressed path.
    pub fn uncompress_path(path: &str) -> String {
        let mut output = String::with_capacity(path.len());
        let mut count = 0usize;
        for c in path.chars() {
            if let Some(d) = c.to_digit(10) {
                count = count * 10 + d as usize;
                continue;
            }
            for _ in 0..count.max(1) {
                output.push(c);
            }
            count = 0;
        }
        output
    }

    /// Path length after expanding run-length counts.
    pub fn path_len(path: &str) -> u64 {
        let mut total = 0u64;
        let mut count = 0u64;
        for c in path.chars() {
            if let Some(d) = c.to_digit(10) {
                count = count * 10 + d as u64;
            } else {
                total += count.max(1);
                count = 0;
            }
        }
        total
    }
}

impl fmt::Debug for VariantData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ old_state = {}, moves = {}, pushes = {}, new_state = {}, box_portals = {:?}, player_portal = {}, path = {} }}",
            self.old_state,
            self.moves,
            self.pushes,
            self.new_state,
            self.box_portals.as_slice(),
            if self.is_terminal() { "-".to_string() } else { self.player_portal.to_string() },
            self.path
        )
    }
}
