//! Noughts-and-crosses domain types: boards, symmetry, games

pub mod board;
pub mod game;
pub mod lines;
pub mod symmetry;

pub use board::{Board, BoardArray, Cell, Player};
pub use game::{Episode, Game, Outcome, Ply};
pub use lines::{LineAnalyzer, WINNING_LINES};
pub use symmetry::{
    mirror_position, mirror_vertical, rotate_cw, rotate_position, translate_position,
    Canonicalization, D4Steps, MirrorOrder,
};
