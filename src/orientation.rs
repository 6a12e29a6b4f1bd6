//! Transposing boards before a solve.
//!
//! Some boards solve faster turned on their side. The caller transposes both the start and
//! its goal, solves, then maps the moves back with [`MoveSeq::transposed`].

use crate::board::Arrangement;
use crate::moves::MoveSeq;

/// Swaps rows and columns: cell `(x, y)` moves to `(y, x)` on an `height` x `width` board.
pub fn transpose(arrangement: &Arrangement) -> Arrangement {
    let (w, h) = (arrangement.width(), arrangement.height());
    let cells = (0..w * h)
        .map(|index| {
            let (x, y) = (index % h, index / h);
            arrangement.cell(x * w + y)
        })
        .collect();
    // Same multiset of cells, so the invariants checked on parse still hold.
    match Arrangement::from_cells(h, w, cells) {
        Ok(transposed) => transposed,
        Err(err) => unreachable!("transposing a valid arrangement failed: {err}"),
    }
}

/// Maps moves found on a transposed board back onto the original orientation.
pub fn restore_moves(moves: &MoveSeq) -> MoveSeq {
    moves.transposed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::apply_moves;

    #[test]
    fn transpose_swaps_axes() {
        let board = Arrangement::parse(3, 2, "120453").unwrap();
        let turned = transpose(&board);
        assert_eq!((turned.width(), turned.height()), (2, 3));
        assert_eq!(turned.to_pattern(), "142503");
        assert_eq!(transpose(&turned), board);
    }

    #[test]
    fn moves_on_transposed_board_replay_on_original() {
        let board = Arrangement::parse(3, 2, "120453").unwrap();
        let moves: MoveSeq = "DL".parse().unwrap();
        let on_turned = apply_moves(&transpose(&board), &moves.transposed()).unwrap();
        assert_eq!(transpose(&on_turned), apply_moves(&board, &moves).unwrap());
        assert_eq!(restore_moves(&moves.transposed()), moves);
    }
}
