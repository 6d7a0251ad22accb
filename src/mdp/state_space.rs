//! Canonical state-space enumeration for a fixed acting player

use std::collections::BTreeSet;

use crate::tictactoe::{Board, Player};

/// Enumerate every canonical state reachable by `player`.
///
/// Breadth-first expansion from the canonical empty board (for X) or the
/// canonical first-move replies (for O, who acts second). Each round plays
/// one move for the acting player; a win or full board is kept as a
/// terminal state and not expanded, anything else is answered by every
/// opponent reply, and the non-terminal replies seed the next round.
///
/// The result is sorted and holds the acting player's decision states
/// plus every terminal state either side can force.
pub fn generate_states(player: Player) -> Vec<Board> {
    let opponent = player.opponent();
    let mut frontier = initial_states(player);
    let mut states: BTreeSet<Board> = frontier.iter().copied().collect();

    while !frontier.is_empty() {
        let mut next_frontier = BTreeSet::new();

        for state in &frontier {
            for pos in state.empty_positions() {
                let inter = state.place(pos, player).canonical();

                if inter.has_won(player) || inter.is_full() {
                    states.insert(inter);
                    continue;
                }

                for reply in inter.empty_positions() {
                    let next = inter.place(reply, opponent).canonical();
                    states.insert(next);
                    if !next.is_terminal() {
                        next_frontier.insert(next);
                    }
                }
            }
        }

        frontier = next_frontier;
    }

    states.into_iter().collect()
}

/// The canonical states in which `player` makes their first move
pub(crate) fn initial_states(player: Player) -> BTreeSet<Board> {
    let empty = Board::empty();
    match player {
        Player::X => [empty.canonical()].into_iter().collect(),
        Player::O => empty
            .empty_positions()
            .into_iter()
            .map(|pos| empty.place(pos, Player::X).canonical())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_states() {
        let x_roots = initial_states(Player::X);
        assert_eq!(x_roots.len(), 1);
        assert!(x_roots.contains(&Board::empty()));

        // X's nine openings collapse to corner, edge, and center
        let o_roots = initial_states(Player::O);
        assert_eq!(o_roots.len(), 3);
        assert!(o_roots.contains(&Board::from_string("X........").unwrap()));
        assert!(o_roots.contains(&Board::from_string(".X.......").unwrap()));
        assert!(o_roots.contains(&Board::from_string("....X....").unwrap()));
    }

    #[test]
    fn test_states_are_canonical_and_sorted() {
        let states = generate_states(Player::X);
        for window in states.windows(2) {
            assert!(window[0] < window[1], "states must be sorted and unique");
        }
        for state in &states {
            assert_eq!(state.canonical(), *state, "states must be canonical");
        }
    }

    #[test]
    fn test_x_universe_contains_known_states() {
        let states = generate_states(Player::X);
        assert!(states.contains(&Board::empty()));
        // After X center, O corner: X to move again
        let mid_game = Board::from_string("O...X....").unwrap().canonical();
        assert!(states.contains(&mid_game));
        // A full-board draw is terminal but retained
        let draw = Board::from_string("XOXXOOOXX").unwrap().canonical();
        assert!(states.contains(&draw));
    }

    #[test]
    fn test_o_universe_excludes_empty_board() {
        let states = generate_states(Player::O);
        assert!(!states.contains(&Board::empty()));
        assert!(states.contains(&Board::from_string("X........").unwrap()));
    }
}
