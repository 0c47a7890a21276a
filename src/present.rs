//! Terminal output for solutions.

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::puzzle::{Position, Puzzle};
use crate::search::Solution;

/// Print `puzzle` as a grid, leaving the blank empty.
///
/// With `styled` set, the tile at `moved` is highlighted.
pub fn render_board<W: Write>(
    out: &mut W,
    puzzle: &Puzzle,
    moved: Option<Position>,
    styled: bool,
) -> io::Result<()> {
    let width = (puzzle.key().len() - 1).to_string().len();

    for row in 0..puzzle.size() {
        for col in 0..puzzle.size() {
            let position = Position::new(row, col);
            let tile = puzzle.get(position);
            let cell = if tile == 0 {
                " ".repeat(width)
            } else {
                format!("{:>width$}", tile, width = width)
            };

            if styled && moved == Some(position) {
                write!(out, "{} ", cell.bold().reverse())?;
            } else {
                write!(out, "{} ", cell)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print every state along the solution with the move that produced it.
pub fn render_solution<W: Write>(out: &mut W, solution: &Solution, styled: bool) -> io::Result<()> {
    let path = match &solution.path {
        Some(path) => path,
        None => {
            writeln!(
                out,
                "No solution found after evaluating {} states",
                solution.evaluated
            )?;
            return Ok(());
        }
    };

    for (i, step) in path.iter().enumerate() {
        match step.action {
            Some(action) => {
                let tile = step.state.get(action.blank());
                let heading = format!("Move {}: {} {}", i, tile, action.direction());
                if styled {
                    writeln!(out, "{}", heading.bold())?;
                } else {
                    writeln!(out, "{}", heading)?;
                }
            }
            None => writeln!(out, "Start")?,
        }
        render_board(out, &step.state, step.action.map(|a| a.blank()), styled)?;
        writeln!(out)?;
    }

    writeln!(
        out,
        "Solved in {} moves, {} states evaluated",
        solution.moves, solution.evaluated
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::heuristic::LinearConflict;
    use crate::search::solve;

    #[test_log::test]
    fn board_leaves_blank_empty() {
        let goal = Puzzle::goal(2).unwrap();
        let mut out = Vec::new();
        render_board(&mut out, &goal, None, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 2 \n3   \n");
    }

    #[test_log::test]
    fn solution_lists_each_move() {
        let goal = Puzzle::goal(2).unwrap();
        let start = goal.apply(goal.available_actions()[0]);
        let solution = solve(&start, &goal, &LinearConflict).unwrap();

        let mut out = Vec::new();
        render_solution(&mut out, &solution, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Start\n1   \n3 2 \n"));
        assert!(text.contains("Move 1: 2 Up\n1 2 \n3   \n"));
        assert!(text.ends_with("Solved in 1 moves, 2 states evaluated\n"));
    }

    #[test_log::test]
    fn unsolved_reports_evaluated() {
        let solution = Solution {
            path: None,
            moves: 0,
            evaluated: 12,
        };
        let mut out = Vec::new();
        render_solution(&mut out, &solution, true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No solution found after evaluating 12 states\n"
        );
    }
}
