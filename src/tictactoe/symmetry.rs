//! D4 symmetry reduction for board canonicalization
//!
//! A board has eight symmetry variants (four rotations, each optionally
//! mirrored). The canonical form is the variant whose numeric image is
//! lexicographically maximal; collapsing states onto it shrinks the MDP
//! state space by nearly a factor of eight.

use serde::{Deserialize, Serialize};

use super::board::Board;

/// Whether the mirror step is applied before or after the rotations when
/// translating a cell index between coordinate frames.
///
/// Mirror and rotation do not commute, so the order must match the order
/// used when canonicalizing the board itself: mapping an observed move
/// into canonical space rotates first ([`MirrorOrder::AfterRotation`]),
/// while mapping a canonical action back onto a live board mirrors first
/// ([`MirrorOrder::BeforeRotation`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOrder {
    BeforeRotation,
    AfterRotation,
}

/// The transform relating a board to its canonical form: the canonical
/// form equals `mirror^mirrored(rotate^rotations(board))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct D4Steps {
    /// Number of clockwise quarter-turns (0-3)
    pub rotations: u8,
    /// Whether a vertical-axis mirror follows the rotations
    pub mirrored: bool,
}

impl D4Steps {
    pub fn identity() -> Self {
        D4Steps {
            rotations: 0,
            mirrored: false,
        }
    }

    /// Quarter-turns undoing this transform's rotations
    pub fn inverse_rotations(&self) -> u8 {
        (4 - self.rotations % 4) % 4
    }
}

/// Rotate the board 90 degrees clockwise.
///
/// The cell at row r, column c moves to row c, column 2-r; on indices:
/// 0->2, 1->5, 2->8, 3->1, 4->4, 5->7, 6->0, 7->3, 8->6.
pub fn rotate_cw(board: &Board) -> Board {
    let mut cells = board.cells;
    for (i, &cell) in board.cells.iter().enumerate() {
        cells[rotate_position(i)] = cell;
    }
    Board { cells }
}

/// Mirror the board about the vertical axis (reverse each row).
pub fn mirror_vertical(board: &Board) -> Board {
    let mut cells = board.cells;
    for (i, &cell) in board.cells.iter().enumerate() {
        cells[mirror_position(i)] = cell;
    }
    Board { cells }
}

/// Index image of a single clockwise quarter-turn
pub fn rotate_position(pos: usize) -> usize {
    let (row, col) = (pos / 3, pos % 3);
    col * 3 + (2 - row)
}

/// Index image of a vertical-axis mirror
pub fn mirror_position(pos: usize) -> usize {
    (2 - pos % 3) + (pos / 3) * 3
}

/// Translate a cell index through `rotations` clockwise quarter-turns and
/// an optional mirror, applied in the given order.
pub fn translate_position(pos: usize, rotations: u8, mirrored: bool, order: MirrorOrder) -> usize {
    debug_assert!(pos < 9, "cell index out of range");
    let mut pos = pos;
    if mirrored && order == MirrorOrder::BeforeRotation {
        pos = mirror_position(pos);
    }
    for _ in 0..rotations % 4 {
        pos = rotate_position(pos);
    }
    if mirrored && order == MirrorOrder::AfterRotation {
        pos = mirror_position(pos);
    }
    pos
}

/// Result of canonicalizing a board: the canonical form together with the
/// steps that reach it, cached so that move translation in either
/// direction does not repeat the eight-variant search.
#[derive(Debug, Clone, Copy)]
pub struct Canonicalization {
    /// The canonical board
    pub board: Board,
    /// The transform mapping the original board onto `board`
    pub steps: D4Steps,
}

impl Canonicalization {
    /// Map a move on the original board into canonical coordinates
    pub fn to_canonical(&self, pos: usize) -> usize {
        translate_position(
            pos,
            self.steps.rotations,
            self.steps.mirrored,
            MirrorOrder::AfterRotation,
        )
    }

    /// Map a canonical-space move back onto the original board
    pub fn from_canonical(&self, pos: usize) -> usize {
        translate_position(
            pos,
            self.steps.inverse_rotations(),
            self.steps.mirrored,
            MirrorOrder::BeforeRotation,
        )
    }
}

impl Board {
    /// Find the canonical form and the steps reaching it.
    ///
    /// The eight variants are visited in a fixed order (per quarter-turn:
    /// unmirrored, then mirrored), and only a strictly greater numeric
    /// image replaces the incumbent, so ties keep the earliest variant.
    pub fn canonicalize(&self) -> Canonicalization {
        let mut working = *self;
        let mut best = *self;
        let mut best_array = self.to_array();
        let mut best_steps = D4Steps::identity();

        for rotations in 0..4u8 {
            if rotations > 0 {
                working = rotate_cw(&working);
            }
            for mirrored in [false, true] {
                let candidate = if mirrored {
                    mirror_vertical(&working)
                } else {
                    working
                };
                let array = candidate.to_array();
                if array > best_array {
                    best_array = array;
                    best = candidate;
                    best_steps = D4Steps { rotations, mirrored };
                }
            }
        }

        Canonicalization {
            board: best,
            steps: best_steps,
        }
    }

    /// Get the canonical form under D4 symmetry.
    ///
    /// Recomputes the search on every call; use [`Board::canonicalize`]
    /// when the steps are also needed.
    pub fn canonical(&self) -> Board {
        self.canonicalize().board
    }
}
