//! Winning line analysis

use super::{Cell, Player};

/// Winning line indices on the 3x3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Utility for analyzing winning lines
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if a player has three in a row
    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        let target = player.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// Find all positions that would immediately win for the player
    pub fn winning_moves(cells: &[Cell; 9], player: Player) -> Vec<usize> {
        let target = player.to_cell();
        let mut moves = Vec::new();
        for &line in &WINNING_LINES {
            let mut count = 0;
            let mut empty_pos = None;
            for &idx in &line {
                match cells[idx] {
                    Cell::Empty => empty_pos = Some(idx),
                    c if c == target => count += 1,
                    _ => {}
                }
            }
            if count == 2 {
                if let Some(pos) = empty_pos {
                    if !moves.contains(&pos) {
                        moves.push(pos);
                    }
                }
            }
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells_of(s: &str) -> [Cell; 9] {
        crate::tictactoe::Board::from_string(s).unwrap().cells
    }

    #[test]
    fn test_has_won_horizontal() {
        let cells = cells_of("XXX......");
        assert!(LineAnalyzer::has_won(&cells, Player::X));
        assert!(!LineAnalyzer::has_won(&cells, Player::O));
    }

    #[test]
    fn test_has_won_vertical() {
        let cells = cells_of("O..O..O..");
        assert!(LineAnalyzer::has_won(&cells, Player::O));
        assert!(!LineAnalyzer::has_won(&cells, Player::X));
    }

    #[test]
    fn test_has_won_diagonal() {
        let cells = cells_of("X...X...X");
        assert!(LineAnalyzer::has_won(&cells, Player::X));
    }

    #[test]
    fn test_winning_moves() {
        // X can complete the top row at 1
        let cells = cells_of("X.X......");
        assert_eq!(LineAnalyzer::winning_moves(&cells, Player::X), vec![1]);
    }

    #[test]
    fn test_winning_moves_multiple() {
        // X threatens both the top row (2) and the left column (6)
        let cells = cells_of("XX.X.....");
        let moves = LineAnalyzer::winning_moves(&cells, Player::X);
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&2));
        assert!(moves.contains(&6));
    }

    #[test]
    fn test_blocked_line_is_not_winning() {
        let cells = cells_of("XXO......");
        assert!(LineAnalyzer::winning_moves(&cells, Player::X).is_empty());
    }
}
