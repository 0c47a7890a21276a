//! Solvable instances by random walk from the goal.

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

use crate::errors::InvalidState;
use crate::puzzle::Puzzle;

/// Start from the solved `size`×`size` board and make `steps` random legal
/// moves. The result is always in the goal's component, so it is solvable
/// in at most `steps` moves.
pub fn random_walk<R: Rng + ?Sized>(
    size: usize,
    steps: usize,
    rng: &mut R,
) -> Result<Puzzle, InvalidState> {
    let mut puzzle = Puzzle::goal(size)?;

    for _ in 0..steps {
        let actions = puzzle.available_actions();
        if let Some(&action) = actions.choose(rng) {
            puzzle = puzzle.apply(action);
        }
    }

    Ok(puzzle)
}

/// [`random_walk`] using the thread-local generator.
pub fn scramble(size: usize, steps: usize) -> Result<Puzzle, InvalidState> {
    let mut rng = thread_rng();
    random_walk(size, steps, &mut rng)
}
