//! Brute-force ground truth for tests.

use std::collections::{HashMap, VecDeque};

use crate::puzzle::Puzzle;

/// Breadth-first distances from `origin` to every reachable state,
/// optionally stopping at `max_depth` moves.
///
/// Moves are reversible, so these are also the distances *to* `origin`.
pub(crate) fn distances_from(origin: &Puzzle, max_depth: Option<u32>) -> HashMap<Puzzle, u32> {
    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    distances.insert(origin.clone(), 0);
    queue.push_back((origin.clone(), 0));

    while let Some((state, depth)) = queue.pop_front() {
        if max_depth.map_or(false, |max| depth >= max) {
            continue;
        }
        for action in state.available_actions() {
            let next = state.apply(action);
            if !distances.contains_key(&next) {
                distances.insert(next.clone(), depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
    }

    distances
}
