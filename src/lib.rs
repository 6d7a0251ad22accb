//! Noughts-and-crosses agents that learn to play by solving a Markov
//! decision process over symmetry-reduced board states.
//!
//! This crate provides:
//! - A complete board model with D4 symmetry canonicalization
//! - Canonical state-space enumeration per acting player
//! - Empirical, Laplace-smoothed transition and reward statistics
//! - A value-iteration policy solver and the agent built on it
//! - Self-play training, interactive play, and snapshot persistence

pub mod error;
pub mod export;
pub mod mdp;
pub mod selfplay;
pub mod tictactoe;

pub use error::{Error, Result};
pub use mdp::{AgentConfig, AgentSnapshot, MdpAgent};
pub use tictactoe::{Board, Cell, Episode, Game, Outcome, Player};
