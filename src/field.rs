//! Board representation consumed by the room network.
//!
//! Cells are addressed by a flat index `pos = x + y * width`. The
//! [`SokoBoard`] trait is the narrow interface the rooms rely on; [`SokoField`]
//! is the in-memory implementation read from an XSB grid.

use std::collections::VecDeque;
use std::fmt;

use memchr::memchr_iter;

use crate::error::FieldError;

/// Direction of a single player step.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Neighbour order used everywhere portals are enumerated.
pub const DIRECTIONS: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

impl Direction {
    /// XSB move character (lowercase, no push marker).
    #[inline(always)]
    pub fn to_char(self) -> char {
        match self {
            Direction::Left => 'l',
            Direction::Right => 'r',
            Direction::Up => 'u',
            Direction::Down => 'd',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'l' => Some(Direction::Left),
            'r' => Some(Direction::Right),
            'u' => Some(Direction::Up),
            'd' => Some(Direction::Down),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn offset(self, width: usize) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Up => -(width as isize),
            Direction::Down => width as isize,
        }
    }

    /// Derives the direction of a step from `from` to `to`.
    pub fn from_step(from: usize, to: usize, width: usize) -> Option<Self> {
        let delta = to as isize - from as isize;
        DIRECTIONS.into_iter().find(|d| d.offset(width) == delta)
    }

    /// Cell reached by one step, `None` when leaving the grid.
    #[inline(always)]
    pub fn step(self, pos: usize, width: usize, height: usize) -> Option<usize> {
        let (x, y) = (pos % width, pos / width);
        match self {
            Direction::Left if x > 0 => Some(pos - 1),
            Direction::Right if x + 1 < width => Some(pos + 1),
            Direction::Up if y > 0 => Some(pos - width),
            Direction::Down if y + 1 < height => Some(pos + width),
            _ => None,
        }
    }
}

/// Read access to a Sokoban board.
pub trait SokoBoard {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn player_pos(&self) -> usize;
    /// XSB byte at `pos`; positions outside the grid read as wall.
    fn get_field(&self, pos: usize) -> u8;

    #[inline(always)]
    fn is_wall(&self, pos: usize) -> bool {
        self.get_field(pos) == b'#'
    }

    #[inline(always)]
    fn is_goal(&self, pos: usize) -> bool {
        matches!(self.get_field(pos), b'.' | b'+' | b'*')
    }

    #[inline(always)]
    fn is_box(&self, pos: usize) -> bool {
        matches!(self.get_field(pos), b'$' | b'*')
    }

    #[inline(always)]
    fn is_player(&self, pos: usize) -> bool {
        matches!(self.get_field(pos), b'@' | b'+')
    }

    /// All cells reachable by the player ignoring boxes, sorted ascending.
    fn walk_posis(&self) -> Vec<usize> {
        let (width, height) = (self.width(), self.height());
        let mut seen = vec![false; width * height];
        let mut queue = VecDeque::with_capacity(64);
        let mut result = Vec::new();
        seen[self.player_pos()] = true;
        queue.push_back(self.player_pos());
        while let Some(pos) = queue.pop_front() {
            result.push(pos);
            for dir in DIRECTIONS {
                if let Some(next) = dir.step(pos, width, height) {
                    if !seen[next] && !self.is_wall(next) {
                        seen[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        result.sort_unstable();
        result
    }

    fn valid_pos(&self, pos: usize) -> bool {
        self.walk_posis().binary_search(&pos).is_ok()
    }

    /// A cell is a dead corner if a wall is above or below it and another
    /// wall is left or right of it.
    fn check_corner(&self, pos: usize) -> bool {
        let w = self.width();
        let left = pos == 0 || self.is_wall(pos - 1);
        let right = self.is_wall(pos + 1);
        let top = pos < w || self.is_wall(pos - w);
        let bottom = self.is_wall(pos + w);
        (top || bottom) && (left || right)
    }
}

/// Board parsed from XSB text.
#[derive(Clone, Debug)]
pub struct SokoField {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    player_pos: usize,
    goal_posis: Vec<usize>,
    box_posis: Vec<usize>,
    walk_posis: Vec<usize>,
    walkable: Vec<bool>,
}

#[inline(always)]
fn filter_char(c: char) -> u8 {
    match c {
        '#' | '.' | '@' | '+' | '$' | '*' => c as u8,
        _ => b' ',
    }
}

impl SokoField {
    /// Reads an XSB grid. Surrounding blank rows and columns are trimmed,
    /// so indented multi-line literals work as input.
    pub fn parse(text: &str) -> Result<Self, FieldError> {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if text.trim().is_empty() {
            return Err(FieldError::Empty);
        }

        let mut lines: Vec<Vec<u8>> = Vec::new();
        let mut start = 0;
        for end in memchr_iter(b'\n', text.as_bytes()).chain(std::iter::once(text.len())) {
            lines.push(text[start..end].chars().map(filter_char).collect());
            start = end + 1;
        }

        // trim blank rows
        while lines.last().is_some_and(|l| l.iter().all(|&c| c == b' ')) {
            lines.pop();
        }
        let first_row = lines.iter().position(|l| l.iter().any(|&c| c != b' ')).unwrap_or(lines.len());
        lines.drain(..first_row);

        // trim blank columns
        let cut_left = lines
            .iter()
            .filter_map(|l| l.iter().position(|&c| c != b' '))
            .min()
            .unwrap_or(0);
        let right_end = lines
            .iter()
            .filter_map(|l| l.iter().rposition(|&c| c != b' ').map(|p| p + 1))
            .max()
            .unwrap_or(0);

        let height = lines.len();
        let width = right_end.saturating_sub(cut_left);
        if width * height < 3 {
            return Err(FieldError::InvalidSize { width, height });
        }

        let mut cells = vec![b' '; width * height];
        for (row, line) in lines.iter().enumerate() {
            for col in 0..width {
                if let Some(&c) = line.get(cut_left + col) {
                    cells[row * width + col] = c;
                }
            }
        }

        let mut player_pos = None;
        for (i, &c) in cells.iter().enumerate() {
            if c == b'@' || c == b'+' {
                if player_pos.is_some() {
                    return Err(FieldError::DuplicatePlayer { x: i % width, y: i / width });
                }
                player_pos = Some(i);
            }
        }
        let player_pos = player_pos.ok_or(FieldError::NoPlayer)?;

        let goal_posis: Vec<usize> = (0..cells.len()).filter(|&i| matches!(cells[i], b'.' | b'+' | b'*')).collect();
        let box_posis: Vec<usize> = (0..cells.len()).filter(|&i| matches!(cells[i], b'$' | b'*')).collect();
        if box_posis.is_empty() {
            return Err(FieldError::NoBoxes);
        }
        if goal_posis.is_empty() {
            return Err(FieldError::NoGoals);
        }
        if box_posis.len() < goal_posis.len() {
            return Err(FieldError::LessBoxes { boxes: box_posis.len(), goals: goal_posis.len() });
        }
        if box_posis.len() > goal_posis.len() {
            return Err(FieldError::MoreBoxes { boxes: box_posis.len(), goals: goal_posis.len() });
        }

        let mut field = SokoField {
            width,
            height,
            cells,
            player_pos,
            goal_posis,
            box_posis,
            walk_posis: Vec::new(),
            walkable: Vec::new(),
        };
        field.precompute_walk()?;
        Ok(field)
    }

    fn precompute_walk(&mut self) -> Result<(), FieldError> {
        let (width, height) = (self.width, self.height);
        let posis = Uncached(self).walk_posis();
        for pos in posis {
            let (x, y) = (pos % width, pos / width);
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                return Err(FieldError::IncompleteBorder { x, y });
            }
            self.walk_posis.push(pos);
        }
        self.walkable = vec![false; width * height];
        for &pos in &self.walk_posis {
            self.walkable[pos] = true;
        }
        // boxes already on goals may sit anywhere
        let walkable = &self.walkable;
        if let Some(pos) = (0..self.cells.len()).find(|&p| matches!(self.cells[p], b'$' | b'.') && !walkable[p]) {
            return Err(FieldError::Unreachable { x: pos % width, y: pos / width });
        }
        Ok(())
    }

    pub fn goal_posis(&self) -> &[usize] {
        &self.goal_posis
    }

    pub fn box_posis(&self) -> &[usize] {
        &self.box_posis
    }

    #[inline(always)]
    pub fn to_idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

impl SokoBoard for SokoField {
    #[inline(always)]
    fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn player_pos(&self) -> usize {
        self.player_pos
    }

    #[inline(always)]
    fn get_field(&self, pos: usize) -> u8 {
        self.cells.get(pos).copied().unwrap_or(b'#')
    }

    fn walk_posis(&self) -> Vec<usize> {
        self.walk_posis.clone()
    }

    #[inline(always)]
    fn valid_pos(&self, pos: usize) -> bool {
        self.walkable.get(pos).copied().unwrap_or(false)
    }
}

/// Plain view of a field, used to run the provided flood fill before the
/// walkable cache exists.
struct Uncached<'a>(&'a SokoField);

impl SokoBoard for Uncached<'_> {
    fn width(&self) -> usize {
        self.0.width
    }
    fn height(&self) -> usize {
        self.0.height
    }
    fn player_pos(&self) -> usize {
        self.0.player_pos
    }
    fn get_field(&self, pos: usize) -> u8 {
        self.0.get_field(pos)
    }
}

impl fmt::Display for SokoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            writeln!(f, "{}", String::from_utf8_lossy(row).trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD_TEST1: &str = "
        ######
        #    #
        # $@.#
        ######
    ";

    #[test]
    fn test_parse_trims_indent() {
        let field = SokoField::parse(FIELD_TEST1).unwrap();
        assert_eq!(field.width(), 6);
        assert_eq!(field.height(), 4);
        assert_eq!(field.player_pos(), field.to_idx(3, 2));
        assert!(field.is_box(field.to_idx(2, 2)));
        assert!(field.is_goal(field.to_idx(4, 2)));
        assert_eq!(field.to_string(), "######\n#    #\n# $@.#\n######\n");
    }

    #[test]
    fn test_walk_posis() {
        let field = SokoField::parse(FIELD_TEST1).unwrap();
        assert_eq!(field.walk_posis(), vec![7, 8, 9, 10, 13, 14, 15, 16]);
        assert!(field.valid_pos(14));
        assert!(!field.valid_pos(0));
    }

    #[test]
    fn test_check_corner() {
        let field = SokoField::parse(FIELD_TEST1).unwrap();
        assert!(field.check_corner(7));
        assert!(field.check_corner(13));
        assert!(field.check_corner(16));
        assert!(!field.check_corner(14));
        assert!(!field.check_corner(8));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SokoField::parse("   \n  ").unwrap_err(), FieldError::Empty);
        assert_eq!(SokoField::parse("#####\n#$ .#\n#####").unwrap_err(), FieldError::NoPlayer);
        assert!(matches!(
            SokoField::parse("######\n#@$@.#\n######").unwrap_err(),
            FieldError::DuplicatePlayer { .. }
        ));
        assert!(matches!(
            SokoField::parse("######\n#@$$.#\n######").unwrap_err(),
            FieldError::MoreBoxes { boxes: 2, goals: 1 }
        ));
        assert!(matches!(
            SokoField::parse("#####\n#@$ .\n#####").unwrap_err(),
            FieldError::IncompleteBorder { .. }
        ));
    }

    #[test]
    fn test_parse_rejects_unreachable_box() {
        // second box and goal are walled off from the player
        let err = SokoField::parse("#######\n#@ $.##\n#######\n#$ . #\n#######").unwrap_err();
        assert_eq!(err, FieldError::Unreachable { x: 1, y: 3 });

        // a box already on its goal is fine out of reach
        let field = SokoField::parse("#######\n#@ $.##\n#######\n#  * #\n#######").unwrap();
        assert_eq!(field.box_posis().len(), 2);
        assert!(!field.valid_pos(field.to_idx(3, 3)));
    }

    #[test]
    fn test_direction_from_step() {
        assert_eq!(Direction::from_step(14, 13, 6), Some(Direction::Left));
        assert_eq!(Direction::from_step(14, 8, 6), Some(Direction::Up));
        assert_eq!(Direction::from_step(14, 20, 6), Some(Direction::Down));
        assert_eq!(Direction::from_step(14, 16, 6), None);
    }
}
