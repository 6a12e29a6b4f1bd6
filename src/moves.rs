//! Blank moves and the algebra over move strings.
//!
//! A move names the direction the *blank* travels: `L` swaps the blank with its left
//! neighbour, `U` with the cell above, and so on. Move strings are plain `[Move]` slices;
//! [`MoveSeq`] adds the `LRUD` text form on top.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::board::Arrangement;
use crate::error::MoveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

impl Move {
    /// Expansion order used by the search.
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
            Move::Up => (0, -1),
            Move::Down => (0, 1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    /// The same move on a transposed board (L<->U, R<->D).
    pub fn transposed(&self) -> Self {
        match self {
            Move::Left => Move::Up,
            Move::Up => Move::Left,
            Move::Right => Move::Down,
            Move::Down => Move::Right,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Move::Left => 'L',
            Move::Right => 'R',
            Move::Up => 'U',
            Move::Down => 'D',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'L' => Some(Move::Left),
            'R' => Some(Move::Right),
            'U' => Some(Move::Up),
            'D' => Some(Move::Down),
            _ => None,
        }
    }

    /// Cell the blank lands on when making this move from `index`, or `None` if that
    /// would step off a `width` x `height` board. Walls are not considered here.
    pub fn target(&self, index: usize, width: usize, height: usize) -> Option<usize> {
        let (dx, dy) = self.as_offset();
        let x = (index % width) as isize + dx;
        let y = (index / width) as isize + dy;
        if x >= 0 && x < width as isize && y >= 0 && y < height as isize {
            Some(y as usize * width + x as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An owned move string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MoveSeq(Vec<Move>);

impl MoveSeq {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn into_vec(self) -> Vec<Move> {
        self.0
    }

    pub fn counts(&self) -> MoveCounts {
        MoveCounts::of(&self.0)
    }

    /// Sequence with every move transposed, undoing a transposed solve.
    pub fn transposed(&self) -> Self {
        Self(self.0.iter().map(Move::transposed).collect())
    }
}

impl Deref for MoveSeq {
    type Target = [Move];

    fn deref(&self) -> &[Move] {
        &self.0
    }
}

impl From<Vec<Move>> for MoveSeq {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

impl FromStr for MoveSeq {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(index, symbol)| {
                Move::from_symbol(symbol).ok_or(MoveError::UnknownSymbol { symbol, index })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for MoveSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mv in &self.0 {
            write!(f, "{}", mv)?;
        }
        Ok(())
    }
}

/// Per-direction tallies of a move string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveCounts {
    pub left: usize,
    pub right: usize,
    pub up: usize,
    pub down: usize,
}

impl MoveCounts {
    pub fn of(moves: &[Move]) -> Self {
        let mut counts = Self::default();
        for mv in moves {
            match mv {
                Move::Left => counts.left += 1,
                Move::Right => counts.right += 1,
                Move::Up => counts.up += 1,
                Move::Down => counts.down += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.left + self.right + self.up + self.down
    }

    pub fn add(&mut self, other: MoveCounts) {
        self.left += other.left;
        self.right += other.right;
        self.up += other.up;
        self.down += other.down;
    }
}

impl fmt::Display for MoveCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(L, R, U, D) = ({}, {}, {}, {}) = {}",
            self.left,
            self.right,
            self.up,
            self.down,
            self.total()
        )
    }
}

/// Replays `moves` from `arrangement`, failing on the first move that leaves the board or
/// steps onto a wall.
pub fn apply_moves(arrangement: &Arrangement, moves: &[Move]) -> Result<Arrangement, MoveError> {
    let mut current = arrangement.clone();
    for (step, &mv) in moves.iter().enumerate() {
        let from = current.blank();
        if !current.slide(mv) {
            return Err(MoveError::InvalidMove { step, mv, from });
        }
    }
    Ok(current)
}

/// Reverses a path and flips each move, turning a goal-outward path into the path that
/// walks back from its endpoint to the goal.
pub fn mirror_moves(moves: &[Move]) -> Vec<Move> {
    moves.iter().rev().map(Move::opposite).collect()
}

/// Removes adjacent opposite pairs (`LR`, `RL`, `UD`, `DU`) until none remain.
pub fn cancel_opposites(moves: &[Move]) -> Vec<Move> {
    let mut out: Vec<Move> = Vec::with_capacity(moves.len());
    for &mv in moves {
        if out.last() == Some(&mv.opposite()) {
            out.pop();
        } else {
            out.push(mv);
        }
    }
    out
}

/// Joins a start-side path and a goal-side path that end on the same arrangement.
///
/// A shared final move means both paths passed through the same arrangement one step
/// earlier, so trailing pairs are dropped before the goal-side path is mirrored on.
pub fn stitch_meeting(forward: &[Move], backward: &[Move]) -> Vec<Move> {
    let mut ahead = forward.len();
    let mut back = backward.len();
    while ahead > 0 && back > 0 && forward[ahead - 1] == backward[back - 1] {
        ahead -= 1;
        back -= 1;
    }
    let mut path = forward[..ahead].to_vec();
    path.extend(mirror_moves(&backward[..back]));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Vec<Move> {
        s.parse::<MoveSeq>().unwrap().into_vec()
    }

    #[test]
    fn parses_and_prints_move_strings() {
        let moves: MoveSeq = "LRUDDL".parse().unwrap();
        assert_eq!(moves.len(), 6);
        assert_eq!(moves.to_string(), "LRUDDL");
        assert_eq!(
            "LX".parse::<MoveSeq>(),
            Err(MoveError::UnknownSymbol {
                symbol: 'X',
                index: 1
            })
        );
    }

    #[test]
    fn mirror_reverses_and_flips() {
        assert_eq!(mirror_moves(&seq("LLUR")), seq("LDRR"));
        assert!(mirror_moves(&[]).is_empty());
    }

    #[test]
    fn cancel_removes_nested_pairs() {
        assert_eq!(cancel_opposites(&seq("LURDLR")), seq("LURD"));
        assert_eq!(cancel_opposites(&seq("LUDR")), Vec::<Move>::new());
        assert!(cancel_opposites(&seq("RRLUUDDL")).is_empty());
    }

    #[test]
    fn stitch_handles_empty_sides() {
        assert_eq!(stitch_meeting(&seq("LU"), &[]), seq("LU"));
        assert_eq!(stitch_meeting(&[], &seq("LU")), seq("DR"));
    }

    #[test]
    fn stitch_drops_shared_tail() {
        // Both halves end with U: the meeting could have happened a step earlier.
        assert_eq!(stitch_meeting(&seq("RRU"), &seq("LU")), seq("RRR"));
    }

    #[test]
    fn target_respects_edges() {
        assert_eq!(Move::Left.target(0, 3, 2), None);
        assert_eq!(Move::Right.target(0, 3, 2), Some(1));
        assert_eq!(Move::Down.target(1, 3, 2), Some(4));
        assert_eq!(Move::Down.target(4, 3, 2), None);
        assert_eq!(Move::Right.target(2, 3, 2), None);
    }

    #[test]
    fn counts_tally_each_direction() {
        let counts = MoveCounts::of(&seq("LLRUDDD"));
        assert_eq!(
            counts,
            MoveCounts {
                left: 2,
                right: 1,
                up: 1,
                down: 3
            }
        );
        assert_eq!(counts.to_string(), "(L, R, U, D) = (2, 1, 1, 3) = 7");
    }

    #[test]
    fn transposed_swaps_axes() {
        let moves: MoveSeq = "LRUD".parse().unwrap();
        assert_eq!(moves.transposed().to_string(), "UDLR");
    }
}
