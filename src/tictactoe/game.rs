//! Game recording: live play and completed episodes

use serde::{Deserialize, Serialize};

use super::board::{Board, Player};

/// Outcome of a completed game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win(Player),
    Draw,
}

/// One ply of a game: the board before the move and the position played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ply {
    pub board: Board,
    pub position: usize,
}

/// A completed game: every ply in order, the final board, and the outcome.
///
/// Episodes always start from the empty board with X to move, so the
/// player of ply `i` is X for even `i` and O for odd `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub plies: Vec<Ply>,
    pub terminal: Board,
    pub outcome: Outcome,
}

impl Episode {
    /// Iterate over the plies played by `player`
    pub fn plies_for(&self, player: Player) -> impl Iterator<Item = &Ply> {
        let offset = match player {
            Player::X => 0,
            Player::O => 1,
        };
        self.plies.iter().skip(offset).step_by(2)
    }

    /// The terminal reward of this episode from `player`'s perspective
    pub fn reward_for(&self, player: Player, win_reward: f64, loss_reward: f64) -> f64 {
        match self.outcome {
            Outcome::Win(winner) if winner == player => win_reward,
            Outcome::Win(_) => loss_reward,
            Outcome::Draw => 0.0,
        }
    }
}

/// Incremental recorder for a game in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    current: Board,
    to_move: Player,
    plies: Vec<Ply>,
    outcome: Option<Outcome>,
}

impl Game {
    /// Start a new game on the empty board with X to move
    pub fn new() -> Self {
        Game {
            current: Board::empty(),
            to_move: Player::X,
            plies: Vec::new(),
            outcome: None,
        }
    }

    /// The current board
    pub fn board(&self) -> Board {
        self.current
    }

    /// The player to move next
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// The outcome, once the game is over
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The plies recorded so far
    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    /// Play a move for the player whose turn it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is over or the move is illegal.
    pub fn play(&mut self, position: usize) -> Result<(), crate::Error> {
        if self.outcome.is_some() {
            return Err(crate::Error::GameOver);
        }

        let next = self.current.with_move(position, self.to_move)?;
        self.plies.push(Ply {
            board: self.current,
            position,
        });

        if next.has_won(self.to_move) {
            self.outcome = Some(Outcome::Win(self.to_move));
        } else if next.is_full() {
            self.outcome = Some(Outcome::Draw);
        }

        self.current = next;
        self.to_move = self.to_move.opponent();
        Ok(())
    }

    /// Finish the recording and produce the episode.
    ///
    /// # Errors
    ///
    /// Returns an error if the game has not reached a terminal position.
    pub fn into_episode(self) -> Result<Episode, crate::Error> {
        let outcome = self.outcome.ok_or(crate::Error::GameInProgress)?;
        Ok(Episode {
            plies: self.plies,
            terminal: self.current,
            outcome,
        })
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
