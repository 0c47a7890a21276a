//! Admissible estimates of the number of moves left to reach the goal.
//!
//! Both estimators are also consistent: a single move changes the estimate
//! by at most one, which lets the search close a state the first time it is
//! expanded.

use crate::puzzle::{Position, Puzzle};

/// The target configuration of a solve, with a lookup from tile label to
/// the cell it belongs in. Built once per solve.
#[derive(Debug, Clone)]
pub struct Goal {
    puzzle: Puzzle,
    positions: Vec<Position>,
}

impl Goal {
    pub fn new(puzzle: Puzzle) -> Self {
        let mut positions = vec![Position::new(0, 0); puzzle.key().len()];
        for (position, tile) in puzzle.cells() {
            positions[tile as usize] = position;
        }
        Self { puzzle, positions }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Where `tile` sits in the goal configuration.
    pub fn position_of(&self, tile: u8) -> Position {
        self.positions[tile as usize]
    }
}

/// Estimates the remaining cost from a state to the goal.
///
/// Implementations used with [`crate::solve`] must never overestimate,
/// and should be consistent, or the returned path may not be optimal.
pub trait Heuristic {
    fn estimate(&self, state: &Puzzle, goal: &Goal) -> u32;

    /// Short label used in log output.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Heuristic for F
where
    F: Fn(&Puzzle, &Goal) -> u32,
{
    fn estimate(&self, state: &Puzzle, goal: &Goal) -> u32 {
        self(state, goal)
    }
}

/// Sum of Manhattan distances of every tile from its goal cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn estimate(&self, state: &Puzzle, goal: &Goal) -> u32 {
        manhattan_distance(state, goal)
    }

    fn name(&self) -> &str {
        "manhattan"
    }
}

/// Manhattan distance plus the linear-conflict penalty ("enhanced Manhattan").
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearConflict;

impl Heuristic for LinearConflict {
    fn estimate(&self, state: &Puzzle, goal: &Goal) -> u32 {
        manhattan_distance(state, goal) + 2 * linear_conflicts(state, goal)
    }

    fn name(&self) -> &str {
        "enhanced-manhattan"
    }
}

pub fn manhattan_distance(state: &Puzzle, goal: &Goal) -> u32 {
    state
        .cells()
        .filter(|&(_, tile)| tile != 0)
        .map(|(position, tile)| position.distance(goal.position_of(tile)) as u32)
        .sum()
}

/// Number of tiles which must leave their row or column, and come back,
/// because they are in their goal line but in the wrong order.
///
/// Each such tile costs at least two moves beyond its Manhattan distance.
pub fn linear_conflicts(state: &Puzzle, goal: &Goal) -> u32 {
    let size = state.size();
    let mut conflicts = 0;

    // Row conflicts
    for row in 0..size {
        let order = state.row(row).iter().filter_map(|&tile| {
            let target = goal.position_of(tile);
            (tile != 0 && target.row == row).then(|| target.col)
        });
        conflicts += line_conflicts(order);
    }

    // Column conflicts
    for col in 0..size {
        let order = state.column(col).filter_map(|tile| {
            let target = goal.position_of(tile);
            (tile != 0 && target.col == col).then(|| target.row)
        });
        conflicts += line_conflicts(order);
    }

    conflicts
}

/// Given the goal offsets of the tiles sharing a line, in their current
/// order, count the fewest tiles to pull out so the rest are in goal order.
fn line_conflicts(order: impl Iterator<Item = usize>) -> u32 {
    let mut count = 0;
    // tails[k]: smallest last offset of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    for offset in order {
        count += 1;
        let at = tails.partition_point(|&t| t < offset);
        if at == tails.len() {
            tails.push(offset);
        } else {
            tails[at] = offset;
        }
    }
    (count - tails.len()) as u32
}
