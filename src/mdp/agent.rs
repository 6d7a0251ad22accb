//! The learning agent: state universe, statistics, policy, and values

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::tictactoe::{Board, Episode, Player};

use super::{
    rewards::{RewardStat, RewardTable},
    solver::{self, Policy, ValueTable},
    state_space::generate_states,
    transitions::TransitionTable,
};

/// Reward and discount configuration, fixed after construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub win_reward: f64,
    pub loss_reward: f64,
    pub discount_factor: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            win_reward: 3.0,
            loss_reward: -1.0,
            discount_factor: 0.3,
        }
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// An agent that learns a playing policy for one side of the game.
///
/// The canonical state universe is generated once at construction and
/// never changes; only the statistics gathered from played episodes and
/// the policy/value function derived from them mutate, through
/// [`MdpAgent::learn_from_games`].
#[derive(Debug)]
pub struct MdpAgent {
    player: Player,
    config: AgentConfig,
    states: Vec<Board>,
    transitions: TransitionTable,
    rewards: RewardTable,
    policy: Policy,
    values: ValueTable,
    rng_seed: Option<u64>,
}

impl MdpAgent {
    /// Create an agent with the default configuration.
    ///
    /// Pass a seed for reproducible initial policies; `None` draws from
    /// the process RNG.
    pub fn new(player: Player, seed: Option<u64>) -> Self {
        Self::with_config(player, AgentConfig::default(), seed)
    }

    /// Create an agent with an explicit configuration.
    ///
    /// Generates the state universe, seeds the transition prior, zeroes
    /// the reward and value tables, and draws a uniformly random initial
    /// policy over each non-terminal state's empty cells.
    pub fn with_config(player: Player, config: AgentConfig, seed: Option<u64>) -> Self {
        let states = generate_states(player);
        let transitions = TransitionTable::init(player);
        let rewards = RewardTable::init(&states);
        let values: ValueTable = states.iter().map(|&state| (state, 0.0)).collect();
        let mut rng = build_rng(seed);
        let policy = random_policy(&states, &mut rng);

        MdpAgent {
            player,
            config,
            states,
            transitions,
            rewards,
            policy,
            values,
            rng_seed: seed,
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The canonical state universe, sorted
    pub fn states(&self) -> &[Board] {
        &self.states
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// Pick the policy move for a live board.
    ///
    /// The board is canonicalized, the canonical action looked up, and
    /// the action mapped back into the live board's coordinate frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoPolicyEntry`] when the canonical form
    /// has no action, which means the caller asked for a move on a
    /// terminal board or a state outside this player's universe.
    pub fn next_move(&self, board: &Board) -> Result<usize, crate::Error> {
        let ctx = board.canonicalize();
        match self.policy.get(&ctx.board) {
            Some(&Some(action)) => Ok(ctx.from_canonical(action)),
            _ => Err(crate::Error::NoPolicyEntry {
                state: ctx.board.encode(),
            }),
        }
    }

    /// Absorb a batch of completed episodes: update transition counts,
    /// update reward statistics, then re-solve the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if value iteration fails to converge.
    pub fn learn_from_games(&mut self, episodes: &[Episode]) -> Result<(), crate::Error> {
        self.transitions.record_games(self.player, episodes);
        self.rewards.record_games(
            self.player,
            episodes,
            self.config.win_reward,
            self.config.loss_reward,
        );
        solver::solve(
            &self.states,
            &mut self.values,
            &mut self.policy,
            &self.transitions,
            &self.rewards,
            self.config.discount_factor,
        )?;
        Ok(())
    }

    /// Capture the complete mutable state of the agent.
    ///
    /// The state universe is a pure function of the player and is not
    /// captured; [`MdpAgent::from_snapshot`] regenerates it.
    pub fn snapshot(&self) -> AgentSnapshot {
        let mut transitions = Vec::new();
        for state in &self.states {
            if let Some(actions) = self.transitions.actions(state) {
                for (&action, successors) in actions {
                    transitions.push(TransitionRecord {
                        state: state.encode(),
                        action,
                        successors: successors
                            .iter()
                            .map(|(next, &weight)| (next.encode(), weight))
                            .collect(),
                    });
                }
            }
        }

        let mut rewards: Vec<RewardRecord> = self
            .rewards
            .iter()
            .map(|(state, stat)| RewardRecord {
                state: state.encode(),
                visits: stat.visits,
                total: stat.total,
            })
            .collect();
        rewards.sort_by(|a, b| a.state.cmp(&b.state));

        let mut policy: Vec<PolicyRecord> = self
            .policy
            .iter()
            .map(|(state, &action)| PolicyRecord {
                state: state.encode(),
                action,
            })
            .collect();
        policy.sort_by(|a, b| a.state.cmp(&b.state));

        let mut values: Vec<ValueRecord> = self
            .values
            .iter()
            .map(|(state, &value)| ValueRecord {
                state: state.encode(),
                value,
            })
            .collect();
        values.sort_by(|a, b| a.state.cmp(&b.state));

        AgentSnapshot {
            version: AgentSnapshot::VERSION,
            player: self.player,
            config: self.config,
            rng_seed: self.rng_seed,
            transitions,
            rewards,
            policy,
            values,
        }
    }

    /// Rebuild an agent from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if any state label in the snapshot fails to
    /// parse as a board.
    pub fn from_snapshot(snapshot: &AgentSnapshot) -> Result<Self, crate::Error> {
        let states = generate_states(snapshot.player);

        let mut transitions = TransitionTable::default();
        for record in &snapshot.transitions {
            let state = Board::from_string(&record.state)?;
            for (next, weight) in &record.successors {
                let next = Board::from_string(next)?;
                transitions.restore(state, record.action, next, *weight);
            }
        }

        let mut rewards = RewardTable::default();
        for record in &snapshot.rewards {
            let state = Board::from_string(&record.state)?;
            rewards.restore(state, RewardStat {
                visits: record.visits,
                total: record.total,
            });
        }

        let mut policy = Policy::new();
        for record in &snapshot.policy {
            policy.insert(Board::from_string(&record.state)?, record.action);
        }

        let mut values = ValueTable::new();
        for record in &snapshot.values {
            values.insert(Board::from_string(&record.state)?, record.value);
        }

        Ok(MdpAgent {
            player: snapshot.player,
            config: snapshot.config,
            states,
            transitions,
            rewards,
            policy,
            values,
            rng_seed: snapshot.rng_seed,
        })
    }
}

/// A uniformly random action over each non-terminal state's empty cells
fn random_policy(states: &[Board], rng: &mut StdRng) -> Policy {
    states
        .iter()
        .filter(|state| !state.is_terminal())
        .map(|&state| {
            let action = state.empty_positions().choose(rng).copied();
            (state, action)
        })
        .collect()
}

/// One (state, action) row of the transition table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub state: String,
    pub action: usize,
    pub successors: Vec<(String, u32)>,
}

/// Reward statistics for one state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRecord {
    pub state: String,
    pub visits: u32,
    pub total: f64,
}

/// The chosen action for one state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub state: String,
    pub action: Option<usize>,
}

/// The value of one state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRecord {
    pub state: String,
    pub value: f64,
}

/// The complete serializable state of an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub version: u32,
    pub player: Player,
    pub config: AgentConfig,
    pub rng_seed: Option<u64>,
    pub transitions: Vec<TransitionRecord>,
    pub rewards: Vec<RewardRecord>,
    pub policy: Vec<PolicyRecord>,
    pub values: Vec<ValueRecord>,
}

impl AgentSnapshot {
    pub const VERSION: u32 = 1;

    /// Write the snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save_json(&self, path: &Path) -> Result<(), crate::Error> {
        let file = File::create(path).map_err(|source| crate::Error::Io {
            operation: format!("create snapshot file {}", path.display()),
            source,
        })?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Read a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn load_json(path: &Path) -> Result<Self, crate::Error> {
        let file = File::open(path).map_err(|source| crate::Error::Io {
            operation: format!("open snapshot file {}", path.display()),
            source,
        })?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Game;

    #[test]
    fn test_fresh_agent_has_full_tables() {
        let agent = MdpAgent::new(Player::X, Some(11));
        assert_eq!(agent.values().len(), agent.states().len());
        for state in agent.states() {
            assert_eq!(agent.values()[state], 0.0);
            if state.is_terminal() {
                assert!(!agent.policy().contains_key(state));
            } else {
                assert!(agent.policy()[state].is_some());
            }
        }
    }

    #[test]
    fn test_fresh_agent_plays_legal_move() {
        let agent = MdpAgent::new(Player::X, Some(42));
        let board = Board::empty();
        let action = agent.next_move(&board).unwrap();
        assert!(action < 9);
        assert!(board.is_empty(action));
    }

    #[test]
    fn test_same_seed_same_initial_policy() {
        let a = MdpAgent::new(Player::X, Some(7));
        let b = MdpAgent::new(Player::X, Some(7));
        assert_eq!(a.policy(), b.policy());
        assert_eq!(
            a.next_move(&Board::empty()).unwrap(),
            b.next_move(&Board::empty()).unwrap()
        );
    }

    #[test]
    fn test_next_move_on_terminal_board_fails() {
        let agent = MdpAgent::new(Player::X, Some(1));
        let board = Board::from_string("XXXOO....").unwrap();
        assert!(matches!(
            agent.next_move(&board),
            Err(crate::Error::NoPolicyEntry { .. })
        ));
    }

    #[test]
    fn test_learn_from_games_updates_policy() {
        let mut agent = MdpAgent::new(Player::X, Some(3));
        let mut game = Game::new();
        for pos in [0, 3, 1, 4, 2] {
            game.play(pos).unwrap();
        }
        let episode = game.into_episode().unwrap();
        agent.learn_from_games(&[episode]).unwrap();

        // The rewarded win pulls the decisive state's policy to the
        // winning completion of the top row
        let decisive = Board::from_string("XX.OO....").unwrap();
        assert_eq!(agent.next_move(&decisive).unwrap(), 2);
    }
}
