//! Exhaustive properties of the D4 canonicalization

use noughts::tictactoe::{mirror_vertical, rotate_cw, Board};

/// Every 9-cell configuration over {., X, O}, whether or not it is
/// reachable in play. Canonicalization must behave on all of them.
fn enumerate_all_boards() -> Vec<Board> {
    let mut boards = Vec::with_capacity(3usize.pow(9));
    for index in 0..3usize.pow(9) {
        let mut n = index;
        let mut chars = ['.'; 9];
        for slot in (0..9).rev() {
            chars[slot] = match n % 3 {
                0 => '.',
                1 => 'X',
                _ => 'O',
            };
            n /= 3;
        }
        let s: String = chars.iter().collect();
        boards.push(Board::from_string(&s).unwrap());
    }
    boards
}

fn variants(board: &Board) -> Vec<Board> {
    let mut variants = Vec::with_capacity(8);
    let mut working = *board;
    for _ in 0..4 {
        variants.push(working);
        variants.push(mirror_vertical(&working));
        working = rotate_cw(&working);
    }
    variants
}

#[test]
fn canonicalization_is_idempotent() {
    for board in enumerate_all_boards() {
        let canonical = board.canonical();
        assert_eq!(
            canonical.canonical(),
            canonical,
            "canonical form of {} must be a fixed point",
            board.encode()
        );
    }
}

#[test]
fn all_symmetry_variants_share_one_canonical_form() {
    for board in enumerate_all_boards() {
        let canonical = board.canonical();
        for variant in variants(&board) {
            assert_eq!(
                variant.canonical(),
                canonical,
                "variant {} of {} disagrees on the canonical form",
                variant.encode(),
                board.encode()
            );
        }
    }
}

#[test]
fn canonical_form_is_maximal_variant() {
    for board in enumerate_all_boards().into_iter().step_by(7) {
        let canonical = board.canonical();
        let max_array = variants(&board)
            .iter()
            .map(|v| v.to_array())
            .max()
            .unwrap();
        assert_eq!(canonical.to_array(), max_array);
    }
}

#[test]
fn move_translation_roundtrips_for_every_board() {
    for board in enumerate_all_boards() {
        let ctx = board.canonicalize();
        for pos in board.empty_positions() {
            let canonical_pos = ctx.to_canonical(pos);
            assert!(
                ctx.board.is_empty(canonical_pos),
                "move {} on {} must map to an empty canonical cell",
                pos,
                board.encode()
            );
            assert_eq!(
                ctx.from_canonical(canonical_pos),
                pos,
                "move {} on {} must roundtrip through canonical space",
                pos,
                board.encode()
            );
        }
    }
}

#[test]
fn canonical_steps_transport_the_board() {
    for board in enumerate_all_boards().into_iter().step_by(11) {
        let ctx = board.canonicalize();
        let mut image = board;
        for _ in 0..ctx.steps.rotations {
            image = rotate_cw(&image);
        }
        if ctx.steps.mirrored {
            image = mirror_vertical(&image);
        }
        assert_eq!(image, ctx.board);
    }
}
