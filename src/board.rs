use rand::{seq::SliceRandom, Rng};
use std::fmt;

use crate::error::ParseError;
use crate::moves::Move;

/// Largest board the label space supports (tiles are numbered `1..=MAX_CELLS`).
pub const MAX_CELLS: usize = 253;

const TEXT_LABELS: &[u8] = b"123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Content of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(u8);

impl Cell {
    pub const BLANK: Cell = Cell(0);
    pub const WALL: Cell = Cell(255);
    /// A tile whose identity is ignored for the current stage.
    pub const WILDCARD: Cell = Cell(254);

    /// Tile with label `n` (`1..=MAX_CELLS`).
    pub fn tile(n: usize) -> Self {
        debug_assert!((1..=MAX_CELLS).contains(&n), "tile label {n} out of range");
        Cell(n as u8)
    }

    pub fn is_blank(self) -> bool {
        self == Cell::BLANK
    }

    pub fn is_wall(self) -> bool {
        self == Cell::WALL
    }

    pub fn is_wildcard(self) -> bool {
        self == Cell::WILDCARD
    }

    /// A labeled tile: neither blank, wall nor wildcard.
    pub fn is_tile(self) -> bool {
        !self.is_blank() && !self.is_wall() && !self.is_wildcard()
    }

    pub fn label(self) -> usize {
        self.0 as usize
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '0' => Some(Cell::BLANK),
            '=' => Some(Cell::WALL),
            '*' => Some(Cell::WILDCARD),
            _ => TEXT_LABELS
                .iter()
                .position(|&b| b as char == symbol)
                .map(|i| Cell::tile(i + 1)),
        }
    }

    /// Single-character form, or `None` for labels past the text alphabet.
    pub fn symbol(self) -> Option<char> {
        match self {
            Cell::BLANK => Some('0'),
            Cell::WALL => Some('='),
            Cell::WILDCARD => Some('*'),
            Cell(n) => TEXT_LABELS.get(n as usize - 1).map(|&b| b as char),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Cell count of a `width` x `height` board, if it is non-empty and fits the label space.
pub fn board_area(width: usize, height: usize) -> Result<usize, ParseError> {
    if width == 0 || height == 0 {
        return Err(ParseError::EmptyBoard { width, height });
    }
    width
        .checked_mul(height)
        .filter(|&area| area <= MAX_CELLS)
        .ok_or(ParseError::TooManyCells { width, height })
}

/// A full labeling of a `width` x `height` board, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arrangement {
    width: usize,
    height: usize,
    cells: Box<[Cell]>,
    blank: usize,
}

impl Arrangement {
    /// Reads a row-major pattern such as `"120453"`.
    pub fn parse(width: usize, height: usize, pattern: &str) -> Result<Self, ParseError> {
        let cells = pattern
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                Cell::from_symbol(symbol).ok_or(ParseError::UnknownSymbol { symbol, index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_cells(width, height, cells)
    }

    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, ParseError> {
        let area = board_area(width, height)?;
        if cells.len() != area {
            return Err(ParseError::WrongLength {
                expected: area,
                found: cells.len(),
            });
        }

        let mut blank = None;
        let mut seen = [false; 256];
        for (index, &cell) in cells.iter().enumerate() {
            if cell.is_blank() {
                if blank.is_some() {
                    return Err(ParseError::ExtraBlank { index });
                }
                blank = Some(index);
            } else if cell.is_tile() {
                if seen[cell.label()] {
                    return Err(ParseError::DuplicateLabel {
                        symbol: cell.symbol().unwrap_or('?'),
                        index,
                    });
                }
                seen[cell.label()] = true;
            }
        }
        let blank = blank.ok_or(ParseError::MissingBlank)?;

        Ok(Self {
            width,
            height,
            cells: cells.into_boxed_slice(),
            blank,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub fn blank(&self) -> usize {
        self.blank
    }

    /// Same dimensions and blank, different labeling. Used for masked stage boards.
    pub(crate) fn relabel(&self, mut f: impl FnMut(Cell) -> Cell) -> Self {
        let cells: Box<[Cell]> = self.cells.iter().map(|&c| f(c)).collect();
        debug_assert!(cells[self.blank].is_blank());
        Self {
            width: self.width,
            height: self.height,
            cells,
            blank: self.blank,
        }
    }

    /// The solved arrangement for this wall layout: the cell at index `i` holds label
    /// `i + 1` and the last open cell holds the blank.
    pub fn goal(&self) -> Arrangement {
        let mut cells: Vec<Cell> = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, c)| if c.is_wall() { Cell::WALL } else { Cell::tile(i + 1) })
            .collect();
        let blank = cells
            .iter()
            .rposition(|c| !c.is_wall())
            .unwrap_or(self.blank);
        cells[blank] = Cell::BLANK;
        Self {
            width: self.width,
            height: self.height,
            cells: cells.into_boxed_slice(),
            blank,
        }
    }

    /// Cell the blank would move onto, if the move stays on the board and off walls.
    pub fn neighbor(&self, mv: Move) -> Option<usize> {
        mv.target(self.blank, self.width, self.height)
            .filter(|&next| !self.cells[next].is_wall())
    }

    /// Moves the blank in place. Returns `false` and leaves the board untouched when the
    /// move is illegal.
    pub fn slide(&mut self, mv: Move) -> bool {
        match self.neighbor(mv) {
            Some(next) => {
                self.cells.swap(self.blank, next);
                self.blank = next;
                true
            }
            None => false,
        }
    }

    /// Random blank walk of `steps` moves that never immediately undoes itself (unless
    /// boxed in). Always produces an arrangement reachable from the original.
    pub fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R, steps: usize) -> Vec<Move> {
        let mut taken: Vec<Move> = Vec::with_capacity(steps);
        for _ in 0..steps {
            let last = taken.last().copied();
            let mut legal: Vec<Move> = Move::ALL
                .into_iter()
                .filter(|&mv| self.neighbor(mv).is_some())
                .collect();
            if legal.len() > 1 {
                legal.retain(|&mv| Some(mv.opposite()) != last);
            }
            let Some(&mv) = legal.choose(rng) else {
                break;
            };
            self.slide(mv);
            taken.push(mv);
        }
        taken
    }

    /// Single-line text form, e.g. `"120453"`.
    pub fn to_pattern(&self) -> String {
        self.cells.iter().map(|c| c.to_string()).collect()
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for cell in row {
                write!(f, "{:>2} ", cell.to_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Where every tile sits in a reference arrangement, for Manhattan scoring.
#[derive(Debug, Clone)]
pub struct TargetIndex {
    width: usize,
    positions: Vec<Option<usize>>,
}

impl TargetIndex {
    pub fn new(target: &Arrangement) -> Self {
        let mut positions = vec![None; 256];
        for (i, cell) in target.cells().iter().enumerate() {
            if cell.is_tile() {
                positions[cell.label()] = Some(i);
            }
        }
        Self {
            width: target.width(),
            positions,
        }
    }

    /// Sum of Manhattan distances from each tile to its position in the target. Blanks,
    /// walls, wildcards and tiles absent from the target contribute nothing.
    pub fn distance(&self, arrangement: &Arrangement) -> usize {
        let w = self.width;
        arrangement
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_tile())
            .filter_map(|(i, c)| self.positions[c.label()].map(|j| (i, j)))
            .map(|(i, j)| (i % w).abs_diff(j % w) + (i / w).abs_diff(j / w))
            .sum()
    }
}

/// A search node: an arrangement plus the moves that reached it from the search origin.
#[derive(Debug, Clone)]
pub struct BoardNode {
    pub arrangement: Arrangement,
    pub path: Vec<Move>,
}

impl BoardNode {
    pub fn root(arrangement: Arrangement) -> Self {
        Self {
            arrangement,
            path: Vec::new(),
        }
    }

    pub fn last_move(&self) -> Option<Move> {
        self.path.last().copied()
    }

    /// Children in `L, R, U, D` order, skipping edges, walls and the move that would undo
    /// the last one.
    pub fn children(&self) -> impl Iterator<Item = BoardNode> + '_ {
        let last = self.last_move();
        Move::ALL
            .into_iter()
            .filter(move |&mv| Some(mv.opposite()) != last)
            .filter_map(move |mv| {
                let mut arrangement = self.arrangement.clone();
                if !arrangement.slide(mv) {
                    return None;
                }
                let mut path = Vec::with_capacity(self.path.len() + 1);
                path.extend_from_slice(&self.path);
                path.push(mv);
                Some(BoardNode { arrangement, path })
            })
    }
}
