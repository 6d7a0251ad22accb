//! Per-state reward statistics accumulated from played episodes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tictactoe::{Board, Episode, Player};

/// Visit count and reward sum for one canonical state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardStat {
    pub visits: u32,
    pub total: f64,
}

impl RewardStat {
    /// Average observed reward, 0 when the state was never visited
    pub fn average(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total / self.visits as f64
        }
    }
}

/// Average-reward table over the canonical state universe.
///
/// Every state the acting player passes through in an episode receives
/// that episode's full terminal reward; temporal credit assignment is
/// left to the discounted value iteration.
#[derive(Debug, Clone, Default)]
pub struct RewardTable {
    entries: HashMap<Board, RewardStat>,
}

impl RewardTable {
    /// Zeroed statistics for every state in the universe
    pub fn init(states: &[Board]) -> Self {
        RewardTable {
            entries: states
                .iter()
                .map(|&state| (state, RewardStat::default()))
                .collect(),
        }
    }

    /// Overwrite the statistics for a state (snapshot restore)
    pub fn restore(&mut self, state: Board, stat: RewardStat) {
        self.entries.insert(state, stat);
    }

    /// Add one reward observation for a canonical state
    pub fn record(&mut self, state: Board, reward: f64) {
        let stat = self.entries.entry(state).or_default();
        stat.visits += 1;
        stat.total += reward;
    }

    /// Record the outcome of each episode against every canonical state
    /// `player` visited in it, including the terminal board.
    pub fn record_games(
        &mut self,
        player: Player,
        episodes: &[Episode],
        win_reward: f64,
        loss_reward: f64,
    ) {
        for episode in episodes {
            let reward = episode.reward_for(player, win_reward, loss_reward);

            let visited = episode
                .plies_for(player)
                .map(|ply| ply.board)
                .chain(std::iter::once(episode.terminal));

            for board in visited {
                self.record(board.canonical(), reward);
            }
        }
    }

    /// Statistics for a state, if any were recorded
    pub fn get(&self, state: &Board) -> Option<&RewardStat> {
        self.entries.get(state)
    }

    /// Average reward for a state, 0 for unknown or unvisited states
    pub fn average(&self, state: &Board) -> f64 {
        self.entries
            .get(state)
            .map(RewardStat::average)
            .unwrap_or(0.0)
    }

    /// Iterate over all (state, stat) entries
    pub fn iter(&self) -> impl Iterator<Item = (&Board, &RewardStat)> {
        self.entries.iter()
    }
}
