use std::fmt;
use std::str::FromStr;

use crate::errors::InvalidState;

/// Largest supported board side; labels must fit in a `u8`.
pub const MAX_SIZE: usize = 15;

/// A cell of the grid, addressed by row then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn distance(&self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The direction a tile slides when it moves into the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Displacement of the blank, as (row, column), when a tile slides this way.
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Direction::Up => (1, 0),
            Direction::Down => (-1, 0),
            Direction::Left => (0, 1),
            Direction::Right => (0, -1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// Swap of the blank with one of its orthogonal neighbours.
///
/// Actions are only produced by [`Puzzle::available_actions`], so an action
/// is always legal for the state it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    blank: Position,
    target: Position,
}

impl Action {
    /// Where the blank sits before the move.
    pub fn blank(&self) -> Position {
        self.blank
    }

    /// The tile which slides into the blank.
    pub fn target(&self) -> Position {
        self.target
    }

    pub fn direction(&self) -> Direction {
        if self.target.row > self.blank.row {
            Direction::Up
        } else if self.target.row < self.blank.row {
            Direction::Down
        } else if self.target.col > self.blank.col {
            Direction::Left
        } else {
            Direction::Right
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.direction(), self.target, self.blank)
    }
}

/// An N×N sliding-tile configuration.
///
/// Tiles are stored row-major; `0` is the blank. The grid is always a
/// permutation of `0..N*N`, which every constructor checks. Values are
/// immutable: [`Puzzle::apply`] returns a fresh state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Puzzle {
    size: usize,
    tiles: Vec<u8>,
    blank: usize,
}

impl Puzzle {
    /// The solved board: labels ascending in row-major order, blank last.
    pub fn goal(size: usize) -> Result<Self, InvalidState> {
        check_size(size)?;
        let cells = size * size;
        let mut tiles: Vec<u8> = (1..cells).map(|v| v as u8).collect();
        tiles.push(0); // The empty space is represented by 0

        Ok(Self {
            size,
            tiles,
            blank: cells - 1,
        })
    }

    /// Build a board from a flat row-major list of labels.
    pub fn from_tiles(tiles: &[u32]) -> Result<Self, InvalidState> {
        let size = (0..=tiles.len())
            .take_while(|n| n * n <= tiles.len())
            .last()
            .filter(|n| n * n == tiles.len())
            .ok_or(InvalidState::NotSquare(tiles.len()))?;
        Self::with_size(size, tiles)
    }

    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, InvalidState> {
        let size = rows.len();
        check_size(size)?;

        let flattened: Vec<u32> = rows
            .iter()
            .flat_map(|row| row.as_ref().iter())
            .cloned()
            .collect();

        if rows.iter().any(|row| row.as_ref().len() != size) {
            return Err(InvalidState::WrongLength {
                expected: size * size,
                found: flattened.len(),
            });
        }

        Self::with_size(size, &flattened)
    }

    fn with_size(size: usize, tiles: &[u32]) -> Result<Self, InvalidState> {
        check_size(size)?;
        let cells = size * size;
        if tiles.len() != cells {
            return Err(InvalidState::WrongLength {
                expected: cells,
                found: tiles.len(),
            });
        }

        let max = (cells - 1) as u32;
        let mut seen = vec![false; cells];
        let mut blank = 0;
        for (i, &tile) in tiles.iter().enumerate() {
            if tile > max {
                return Err(InvalidState::TileOutOfRange { tile, max });
            }
            if seen[tile as usize] {
                return Err(InvalidState::DuplicateTile(tile as u8));
            }
            seen[tile as usize] = true;
            if tile == 0 {
                blank = i;
            }
        }

        Ok(Self {
            size,
            tiles: tiles.iter().map(|&t| t as u8).collect(),
            blank,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Canonical key: the flattened labels. Equal boards give equal keys.
    pub fn key(&self) -> &[u8] {
        &self.tiles
    }

    pub fn blank(&self) -> Position {
        self.position(self.blank)
    }

    pub fn get(&self, position: Position) -> u8 {
        self.tiles[self.index(position)]
    }

    /// Iterate over `(position, label)` for every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, u8)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &tile)| (self.position(i), tile))
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.tiles[row * self.size..(row + 1) * self.size]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = u8> + '_ {
        self.tiles.iter().skip(col).step_by(self.size).cloned()
    }

    fn position(&self, index: usize) -> Position {
        Position::new(index / self.size, index % self.size)
    }

    fn index(&self, position: Position) -> usize {
        position.row * self.size + position.col
    }

    /// Every legal move from this state, always in the order Up, Down, Left, Right.
    pub fn available_actions(&self) -> Vec<Action> {
        let blank = self.blank();
        let size = self.size as isize;

        Direction::ALL
            .iter()
            .filter_map(|dir| {
                let (dr, dc) = dir.as_offset();
                let row = blank.row as isize + dr;
                let col = blank.col as isize + dc;
                if row >= 0 && row < size && col >= 0 && col < size {
                    Some(Action {
                        blank,
                        target: Position::new(row as usize, col as usize),
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Swap the two cells named by `action`, leaving `self` untouched.
    ///
    /// Applying the same action twice returns the original state.
    pub fn apply(&self, action: Action) -> Self {
        let a = self.index(action.blank);
        let b = self.index(action.target);
        debug_assert!(
            self.tiles[a] == 0 || self.tiles[b] == 0,
            "{} does not touch the blank",
            action
        );

        let mut tiles = self.tiles.clone();
        tiles.swap(a, b);
        let blank = if tiles[a] == 0 { a } else { b };

        Self {
            size: self.size,
            tiles,
            blank,
        }
    }

    /// Whether `goal` can be reached from this state by legal moves.
    ///
    /// Two boards of the same size are connected exactly when they share
    /// the same permutation parity invariant.
    pub fn is_solvable_towards(&self, goal: &Puzzle) -> bool {
        self.size == goal.size && self.parity() == goal.parity()
    }

    fn parity(&self) -> usize {
        let inversions = count_inversions(&self.tiles);

        if self.size % 2 == 1 {
            // Odd-sized puzzle: vertical moves shift an even number of tiles
            inversions % 2
        } else {
            // Even-sized puzzle: the blank's row flips parity with every vertical move
            (inversions + self.blank / self.size) % 2
        }
    }
}

fn check_size(size: usize) -> Result<(), InvalidState> {
    if (2..=MAX_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(InvalidState::UnsupportedSize(size))
    }
}

fn count_inversions(flattened: &[u8]) -> usize {
    flattened
        .iter()
        .enumerate()
        .filter(|&(_, &val)| val != 0)
        .map(|(i, &val)| {
            flattened[i + 1..]
                .iter()
                .filter(|&&next| next != 0 && next < val)
                .count()
        })
        .sum()
}

impl FromStr for Puzzle {
    type Err = InvalidState;

    /// Parse a flat list of labels separated by whitespace and/or commas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tiles = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|_| InvalidState::Parse(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tiles(&tiles)
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.tiles.len() - 1).to_string().len();
        for row in self.tiles.chunks(self.size) {
            for &val in row {
                write!(f, "{:>width$} ", val, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
