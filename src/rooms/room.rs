//! One node of the room network.

use std::fmt;

use tracing::trace;

use crate::error::FieldError;
use crate::field::SokoBoard;

use super::portal::{OutgoingPortal, RoomPortal};
use super::state_list::{StateList, StateListNormal};
use super::variant_data::PLAYER_STAYS;
use super::variant_list::{VariantList, VariantListNormal};

/// A set of cells treated as one automaton: the box configurations it can be
/// in (states) and the local transitions between them (variants).
///
/// `incoming[i]` and `outgoing[i]` always describe the same pair of cells in
/// opposite directions.
pub struct Room {
    pub field_posis: Vec<usize>,
    pub goal_posis: Vec<usize>,
    pub start_box_posis: Vec<usize>,
    pub incoming: Vec<RoomPortal>,
    pub outgoing: Vec<OutgoingPortal>,
    pub state_list: Box<dyn StateList>,
    pub start_state: u64,
    pub variant_list: Box<dyn VariantList>,
    /// The player starts in this room, even if no start variant survived.
    pub is_start: bool,
    /// Variants `0..start_variant_count` start the whole puzzle in this room.
    pub start_variant_count: u64,
}

impl Room {
    pub fn new<F: SokoBoard>(
        field: &F,
        field_posis: Vec<usize>,
        incoming: Vec<RoomPortal>,
        outgoing: Vec<OutgoingPortal>,
    ) -> Self {
        debug_assert!(field_posis.windows(2).all(|w| w[0] < w[1]));
        debug_assert_eq!(incoming.len(), outgoing.len());

        let goal_posis = field_posis.iter().copied().filter(|&p| field.is_goal(p)).collect();
        let start_box_posis = field_posis.iter().copied().filter(|&p| field.is_box(p)).collect();
        let portal_count = incoming.len() as u32;
        let is_start = field_posis.iter().any(|&p| field.is_player(p));
        Room {
            field_posis,
            goal_posis,
            start_box_posis,
            incoming,
            outgoing,
            state_list: Box::new(StateListNormal::new()),
            start_state: 0,
            variant_list: Box::new(VariantListNormal::new(portal_count)),
            is_start,
            start_variant_count: 0,
        }
    }

    #[inline(always)]
    pub fn portal_count(&self) -> u32 {
        self.incoming.len() as u32
    }

    #[inline(always)]
    pub fn is_start_room(&self) -> bool {
        self.is_start
    }

    /// Seeds the states of a single-cell room from the board symbol.
    pub fn init_states<F: SokoBoard>(&mut self, field: &F) -> Result<(), FieldError> {
        debug_assert_eq!(self.field_posis.len(), 1);
        debug_assert!(self.state_list.is_empty());
        debug_assert!(self.variant_list.is_empty());

        let pos = self.field_posis[0];
        let corner = field.check_corner(pos);
        let list = &mut self.state_list;

        match field.get_field(pos) {
            b'@' | b' ' => {
                list.add(&[]);
                self.start_state = 0;
                if !corner {
                    list.add(&[pos]);
                }
            }
            b'+' | b'.' => {
                list.add(&[pos]);
                list.add(&[]);
                self.start_state = 1;
            }
            b'$' => {
                if corner {
                    return Err(FieldError::InvalidBox { x: pos % field.width(), y: pos / field.width() });
                }
                list.add(&[]);
                list.add(&[pos]);
                self.start_state = 1;
            }
            b'*' => {
                list.add(&[pos]);
                self.start_state = 0;
                // empty state only if the box can ever leave the corner
                if !corner {
                    list.add(&[]);
                }
            }
            c => return Err(FieldError::UnsupportedChar(c as char)),
        }
        Ok(())
    }

    /// Builds start variants, box swaps and per-portal variants of a
    /// single-cell room. Requires [`Room::init_states`] first.
    pub fn init_variants<F: SokoBoard>(&mut self, field: &F) -> Result<(), FieldError> {
        debug_assert_eq!(self.field_posis.len(), 1);
        debug_assert!(!self.state_list.is_empty());
        debug_assert!(self.variant_list.is_empty());

        let pos = self.field_posis[0];
        debug_assert!(field.valid_pos(pos));
        let corner = field.check_corner(pos);

        // --- start variants ---
        if self.is_start {
            let state = if field.is_goal(pos) { 1 } else { 0 };
            for (p, out) in self.outgoing.iter().enumerate() {
                self.variant_list.add(state, 1, 0, &[], p as u32, state, &out.dir.to_char().to_string());
                self.start_variant_count += 1;
            }
        }
        debug_assert_eq!(self.variant_list.len(), self.start_variant_count);

        // --- box swaps ---
        let empty = self.state_list.find_by_box_count(0);
        let boxed = self.state_list.find_by_box_count(1);
        for portal in self.incoming.iter_mut() {
            if let (Some(empty), Some(boxed)) = (empty, boxed) {
                if !field.check_corner(portal.from_pos) && !field.is_wall(portal.pusher_pos()) {
                    portal.state_box_swap.add(empty, boxed);
                }
            }
        }

        // --- portal variants ---
        let has_second_state = self.state_list.len() > 1;
        for i in 0..self.incoming.len() {
            let push_dir = self.incoming[i].dir;
            let box_portal = self
                .outgoing
                .iter()
                .position(|o| o.dir == push_dir && !(field.check_corner(o.to_pos) && !field.is_goal(o.to_pos)))
                .map(|o| o as u32);

            // exits a box can be pushed through without the player following it into a dead corner
            let push_exits: Vec<u32> = match box_portal {
                Some(bp) if !corner => (0..self.outgoing.len() as u32)
                    .filter(|&o| {
                        let beyond = self.outgoing[o as usize].beyond_pos();
                        !(o == bp && field.check_corner(beyond) && !field.is_goal(beyond))
                    })
                    .collect(),
                _ => Vec::new(),
            };

            let variants = &mut self.variant_list;
            let dict = &mut self.incoming[i].variant_state_dict;
            let outgoing = &self.outgoing;
            let dir_str = |o: u32| outgoing[o as usize].dir.to_char().to_string();

            match field.get_field(pos) {
                b'@' | b' ' | b'$' => {
                    // walk through
                    for o in (0..outgoing.len() as u32).filter(|&o| o as usize != i) {
                        dict.add(0, variants.add(0, 1, 0, &[], o, 0, &dir_str(o)));
                    }
                    if let Some(bp) = box_portal.filter(|_| !corner) {
                        // push the box out
                        for &o in &push_exits {
                            dict.add(1, variants.add(1, 1, 1, &[bp], o, 0, &dir_str(o)));
                        }
                        // push the last box on a goal and stay
                        if field.is_goal(outgoing[bp as usize].to_pos) {
                            dict.add(1, variants.add(1, 0, 1, &[bp], PLAYER_STAYS, 0, ""));
                        }
                    }
                }
                b'+' | b'.' | b'*' => {
                    if let Some(bp) = box_portal {
                        for &o in &push_exits {
                            dict.add(0, variants.add(0, 1, 1, &[bp], o, 1, &dir_str(o)));
                        }
                    }
                    if has_second_state {
                        for o in (0..outgoing.len() as u32).filter(|&o| o as usize != i) {
                            dict.add(1, variants.add(1, 1, 0, &[], o, 1, &dir_str(o)));
                        }
                    }
                }
                c => return Err(FieldError::UnsupportedChar(c as char)),
            }
        }

        trace!(
            pos,
            states = self.state_list.len(),
            variants = self.variant_list.len(),
            "room initialised"
        );
        Ok(())
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Posis: ")?;
        for (i, pos) in self.field_posis.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pos)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("field_posis", &self.field_posis)
            .field("incoming", &self.incoming)
            .field("states", &self.state_list.len())
            .field("variants", &self.variant_list.len())
            .field("start_state", &self.start_state)
            .field("is_start", &self.is_start)
            .field("start_variant_count", &self.start_variant_count)
            .finish()
    }
}
