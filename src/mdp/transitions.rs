//! Empirical transition statistics over the canonical state graph

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::tictactoe::{Board, Episode, Player};

use super::state_space::initial_states;

/// Weighted successor states for one (state, action) pair
pub type SuccessorWeights = BTreeMap<Board, u32>;

/// Unnormalized transition distribution: per canonical state and
/// canonical action, a weight for every observed successor state.
///
/// Weights start at 1 for every successor reachable in principle
/// (a Laplace prior) and only ever grow as episodes are recorded.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: HashMap<Board, BTreeMap<usize, SuccessorWeights>>,
}

impl TransitionTable {
    /// Seed the table for every non-terminal state `player` can reach.
    ///
    /// For each state and each legal action, every canonical board the
    /// opponent can answer with (or the immediate terminal result) is
    /// entered with weight 1.
    pub fn init(player: Player) -> Self {
        let opponent = player.opponent();
        let mut entries: HashMap<Board, BTreeMap<usize, SuccessorWeights>> = HashMap::new();
        let mut queue: VecDeque<Board> = initial_states(player).into_iter().collect();
        let mut seen: HashSet<Board> = queue.iter().copied().collect();

        while let Some(state) = queue.pop_front() {
            let mut actions = BTreeMap::new();

            for pos in state.empty_positions() {
                let inter = state.place(pos, player).canonical();

                let successors: SuccessorWeights = if inter.has_won(player) || inter.is_full() {
                    [(inter, 1)].into_iter().collect()
                } else {
                    inter
                        .empty_positions()
                        .into_iter()
                        .map(|reply| (inter.place(reply, opponent).canonical(), 1))
                        .collect()
                };

                for next in successors.keys() {
                    if !next.is_terminal() && seen.insert(*next) {
                        queue.push_back(*next);
                    }
                }

                actions.insert(pos, successors);
            }

            entries.insert(state, actions);
        }

        TransitionTable { entries }
    }

    /// The recorded actions (and their successor weights) for a state
    pub fn actions(&self, state: &Board) -> Option<&BTreeMap<usize, SuccessorWeights>> {
        self.entries.get(state)
    }

    /// Overwrite the weight of one triple (snapshot restore)
    pub fn restore(&mut self, state: Board, action: usize, next: Board, weight: u32) {
        self.entries
            .entry(state)
            .or_default()
            .entry(action)
            .or_default()
            .insert(next, weight);
    }

    /// Add one observation of `state` --`action`--> `next`
    pub fn record(&mut self, state: Board, action: usize, next: Board) {
        *self
            .entries
            .entry(state)
            .or_default()
            .entry(action)
            .or_default()
            .entry(next)
            .or_insert(0) += 1;
    }

    /// Record every transition `player` experienced in the given episodes.
    ///
    /// For each consecutive pair of the player's decision states (and the
    /// terminal board after the last one), the observed move is mapped
    /// into the canonical frame of its source state and the triple's
    /// weight is incremented.
    pub fn record_games(&mut self, player: Player, episodes: &[Episode]) {
        for episode in episodes {
            let plies: Vec<_> = episode.plies_for(player).collect();
            for (i, ply) in plies.iter().enumerate() {
                let next_board = match plies.get(i + 1) {
                    Some(next_ply) => next_ply.board,
                    None => episode.terminal,
                };

                let ctx = ply.board.canonicalize();
                let action = ctx.to_canonical(ply.position);
                self.record(ctx.board, action, next_board.canonical());
            }
        }
    }

    /// Number of states with recorded actions
    pub fn state_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of (state, action) pairs
    pub fn action_count(&self) -> usize {
        self.entries.values().map(|actions| actions.len()).sum()
    }

    /// Number of (state, action, successor) triples
    pub fn successor_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|actions| actions.values())
            .map(|successors| successors.len())
            .sum()
    }

    /// Weight of one (state, action, successor) triple, 0 if absent
    pub fn weight(&self, state: &Board, action: usize, next: &Board) -> u32 {
        self.entries
            .get(state)
            .and_then(|actions| actions.get(&action))
            .and_then(|successors| successors.get(next))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Game;

    fn x_win_episode() -> Episode {
        let mut game = Game::new();
        for pos in [0, 3, 1, 4, 2] {
            game.play(pos).unwrap();
        }
        game.into_episode().unwrap()
    }

    #[test]
    fn test_init_seeds_weight_one() {
        let table = TransitionTable::init(Player::X);
        let empty = Board::empty();
        let actions = table.actions(&empty).expect("empty board must be seeded");
        assert_eq!(actions.len(), 9);

        // Every seeded successor of every opening starts at weight 1
        for successors in actions.values() {
            assert!(successors.values().all(|&w| w == 1));
            assert!(!successors.is_empty());
        }
    }

    #[test]
    fn test_init_terminal_states_have_no_actions() {
        let table = TransitionTable::init(Player::X);
        let win = Board::from_string("XXXOO....").unwrap().canonical();
        assert!(table.actions(&win).is_none());
    }

    #[test]
    fn test_record_games_increments_weights() {
        let mut table = TransitionTable::init(Player::X);
        let episode = x_win_episode();

        // X's first move 0 from the empty board, answered by O at 3:
        // the successor is the canonical form of "X..O....."
        let state = Board::empty();
        let next = Board::from_string("X..O.....").unwrap().canonical();
        let before = table.weight(&state, 0, &next);
        assert_eq!(before, 1);

        table.record_games(Player::X, std::slice::from_ref(&episode));
        assert_eq!(table.weight(&state, 0, &next), 2);

        // Weights never decrease; a second pass adds another observation
        table.record_games(Player::X, std::slice::from_ref(&episode));
        assert_eq!(table.weight(&state, 0, &next), 3);
    }

    #[test]
    fn test_record_games_translates_into_canonical_frame() {
        let mut table = TransitionTable::init(Player::X);
        // X opens at 2 and O answers at 5; the resulting decision state
        // "..X..O..." canonicalizes to "X..O....." by a mirror.
        let mut game = Game::new();
        for pos in [2, 5, 1, 4, 0] {
            game.play(pos).unwrap();
        }
        let episode = game.into_episode().unwrap();
        table.record_games(Player::X, &[episode]);

        let empty = Board::empty();
        let next = Board::from_string("X..O.....").unwrap();
        assert_eq!(next.canonical(), next);
        assert_eq!(table.weight(&empty, 2, &next), 2);

        // X's second decision state "..X..O..." was recorded against its
        // canonical form, with the move at 1 mirrored accordingly
        let decision = Board::from_string("..X..O...").unwrap();
        let ctx = decision.canonicalize();
        assert_eq!(ctx.board, next);
        let canonical_action = ctx.to_canonical(1);
        let followup = Board::from_string(".XX.OO...").unwrap().canonical();
        assert_eq!(table.weight(&next, canonical_action, &followup), 2);
    }

    #[test]
    fn test_record_games_for_second_player() {
        let mut table = TransitionTable::init(Player::O);
        let episode = x_win_episode();
        let before = table.successor_count();
        table.record_games(Player::O, &[episode]);
        // O made two moves; both land on existing seeded triples
        assert_eq!(table.successor_count(), before);
    }
}
