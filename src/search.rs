//! A* search over puzzle states.
//!
//! Nodes are kept in an arena owned by a [`SearchContext`] and refer to
//! their parent by index, so the search tree needs no shared ownership.
//! The frontier is a binary heap with lazy deletion: a state may be queued
//! several times, and entries for already-closed states are dropped when
//! they are popped.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, info, trace};

use crate::errors::{InvalidState, Result, SolveError};
use crate::heuristic::{Goal, Heuristic};
use crate::puzzle::{Action, Puzzle};

/// Index of a node in the search arena.
pub type NodeId = usize;

/// One vertex of the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    state: Puzzle,
    parent: Option<NodeId>,
    action: Option<Action>,
    g: u32,
    h: u32,
}

impl SearchNode {
    pub fn state(&self) -> &Puzzle {
        &self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The move which produced this node from its parent.
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Moves taken from the start.
    pub fn g(&self) -> u32 {
        self.g
    }

    /// Estimated moves remaining.
    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn f(&self) -> u32 {
        self.g + self.h
    }
}

/// Frontier entry, ordered so the max-heap pops the lowest `f` first.
///
/// Ties on `f` go to the deeper node, then to the node created first.
#[derive(Debug, PartialEq, Eq)]
struct Frontier {
    f: u32,
    g: u32,
    node: NodeId,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A state along a solution, with the move that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: Puzzle,
    pub action: Option<Action>,
}

/// Outcome of a completed search.
///
/// `path` is `None` when every reachable state was expanded without
/// meeting the goal; `evaluated` is reported either way.
#[derive(Debug, Clone)]
pub struct Solution {
    pub path: Option<Vec<Step>>,
    pub moves: usize,
    pub evaluated: usize,
}

impl Solution {
    pub fn is_solved(&self) -> bool {
        self.path.is_some()
    }

    /// The moves of the solution, in order.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.path
            .iter()
            .flat_map(|path| path.iter())
            .filter_map(|step| step.action)
    }
}

/// Tuning knobs for a search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Give up after expanding this many states.
    pub limit: Option<usize>,

    /// Log progress every this many expansions.
    pub verbose: Option<usize>,
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_verbose(mut self, every: usize) -> Self {
        self.verbose = Some(every);
        self
    }
}

/// What a single call to [`SearchContext::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A state was expanded and its neighbours queued.
    Expanded(NodeId),
    /// A stale frontier entry for a closed state was discarded.
    Discarded,
    /// The goal was popped.
    Found(NodeId),
    /// The frontier is empty.
    Exhausted,
}

/// Everything one solve owns: the node arena, the frontier, the best known
/// cost per state, the closed set and the expansion counter.
pub struct SearchContext<'h, H>
where
    H: Heuristic + ?Sized,
{
    goal: Goal,
    heuristic: &'h H,
    options: SearchOptions,
    nodes: Vec<SearchNode>,
    frontier: BinaryHeap<Frontier>,
    visited: HashMap<Box<[u8]>, u32>,
    closed: HashSet<Box<[u8]>>,
    evaluated: usize,
}

impl<'h, H> SearchContext<'h, H>
where
    H: Heuristic + ?Sized,
{
    /// Seed a search from `initial` towards `goal`.
    pub fn new(
        initial: Puzzle,
        goal: Puzzle,
        heuristic: &'h H,
        options: SearchOptions,
    ) -> Result<Self> {
        if initial.size() != goal.size() {
            return Err(InvalidState::SizeMismatch {
                start: initial.size(),
                goal: goal.size(),
            }
            .into());
        }

        let goal = Goal::new(goal);
        let h = heuristic.estimate(&initial, &goal);

        let mut visited = HashMap::new();
        visited.insert(Box::from(initial.key()), 0);

        let mut context = Self {
            goal,
            heuristic,
            options,
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            visited,
            closed: HashSet::new(),
            evaluated: 0,
        };
        context.push(SearchNode {
            state: initial,
            parent: None,
            action: None,
            g: 0,
            h,
        });
        Ok(context)
    }

    /// Number of states expanded so far, including the goal once found.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Number of states fully expanded and closed.
    pub fn closed(&self) -> usize {
        self.closed.len()
    }

    /// Entries in the frontier, stale ones included.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    fn push(&mut self, node: SearchNode) {
        let id = self.nodes.len();
        self.frontier.push(Frontier {
            f: node.f(),
            g: node.g,
            node: id,
        });
        self.nodes.push(node);
    }

    /// Pop one frontier entry and act on it.
    pub fn step(&mut self) -> Result<Progress> {
        let current = match self.frontier.pop() {
            Some(entry) => entry.node,
            None => return Ok(Progress::Exhausted),
        };

        let key = self.nodes[current].state.key();
        if self.closed.contains(key) {
            trace!("Discarding stale entry for node {}", current);
            return Ok(Progress::Discarded);
        }

        if let Some(limit) = self.options.limit {
            if self.evaluated >= limit {
                return Err(SolveError::StepLimitExhausted(self.evaluated));
            }
        }
        self.evaluated += 1;

        if let Some(every) = self.options.verbose {
            if every > 0 && self.evaluated % every == 0 {
                let node = &self.nodes[current];
                debug!(
                    "E{} F{} C{} g={} h={}",
                    self.evaluated,
                    self.frontier.len(),
                    self.closed.len(),
                    node.g,
                    node.h
                );
            }
        }

        if self.nodes[current].state == *self.goal.puzzle() {
            return Ok(Progress::Found(current));
        }

        self.closed.insert(Box::from(key));
        self.expand(current);
        Ok(Progress::Expanded(current))
    }

    fn expand(&mut self, current: NodeId) {
        let g = self.nodes[current].g + 1;

        for action in self.nodes[current].state.available_actions() {
            let next = self.nodes[current].state.apply(action);
            if self.closed.contains(next.key()) {
                continue;
            }

            let best = self.visited.get(next.key()).copied().unwrap_or(u32::MAX);
            if g >= best {
                continue;
            }
            self.visited.insert(Box::from(next.key()), g);

            let h = self.heuristic.estimate(&next, &self.goal);
            self.push(SearchNode {
                state: next,
                parent: Some(current),
                action: Some(action),
                g,
                h,
            });
        }
    }

    /// Run the search to completion.
    pub fn run(mut self) -> Result<Solution> {
        info!(
            "Searching {0}x{0} board with {1} heuristic (initial estimate {2})",
            self.goal.puzzle().size(),
            self.heuristic.name(),
            self.nodes[0].h
        );

        loop {
            match self.step()? {
                Progress::Expanded(_) | Progress::Discarded => {}
                Progress::Found(id) => {
                    let path = reconstruct_path(&self.nodes, id);
                    let moves = path.len() - 1;
                    info!(
                        "Found {} move solution after evaluating {} states",
                        moves, self.evaluated
                    );
                    return Ok(Solution {
                        path: Some(path),
                        moves,
                        evaluated: self.evaluated,
                    });
                }
                Progress::Exhausted => {
                    info!("No solution after evaluating {} states", self.evaluated);
                    return Ok(Solution {
                        path: None,
                        moves: 0,
                        evaluated: self.evaluated,
                    });
                }
            }
        }
    }
}

/// Follow parent links from `end` back to the root and return the states
/// in the order they were reached. The first step has no action.
pub fn reconstruct_path(nodes: &[SearchNode], end: NodeId) -> Vec<Step> {
    let mut path = Vec::new();
    let mut current = Some(end);
    while let Some(id) = current {
        let node = &nodes[id];
        path.push(Step {
            state: node.state.clone(),
            action: node.action,
        });
        current = node.parent;
    }
    path.reverse();
    path
}

/// Find a shortest sequence of moves from `initial` to `goal`.
///
/// The result is optimal whenever `heuristic` is admissible and consistent.
pub fn solve<H>(initial: &Puzzle, goal: &Puzzle, heuristic: &H) -> Result<Solution>
where
    H: Heuristic + ?Sized,
{
    solve_with_options(initial, goal, heuristic, SearchOptions::default())
}

pub fn solve_with_options<H>(
    initial: &Puzzle,
    goal: &Puzzle,
    heuristic: &H,
    options: SearchOptions,
) -> Result<Solution>
where
    H: Heuristic + ?Sized,
{
    SearchContext::new(initial.clone(), goal.clone(), heuristic, options)?.run()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::heuristic::{LinearConflict, Manhattan};
    use crate::test_support::distances_from;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn goal3() -> Puzzle {
        Puzzle::goal(3).unwrap()
    }

    fn scenario() -> Puzzle {
        Puzzle::from_rows(&[[3, 7, 4], [5, 0, 6], [8, 2, 1]]).unwrap()
    }

    fn assert_path_is_connected(start: &Puzzle, goal: &Puzzle, solution: &Solution) {
        let path = solution.path.as_ref().unwrap();
        assert_eq!(path.len(), solution.moves + 1);
        assert_eq!(&path[0].state, start);
        assert_eq!(path[0].action, None);
        assert_eq!(&path[path.len() - 1].state, goal);
        for pair in path.windows(2) {
            let action = pair[1].action.unwrap();
            assert!(pair[0].state.available_actions().contains(&action));
            assert_eq!(pair[0].state.apply(action), pair[1].state);
        }
    }

    #[test_log::test]
    fn frontier_prefers_low_f_then_deep_then_old() {
        let mut heap = BinaryHeap::new();
        heap.push(Frontier { f: 5, g: 1, node: 0 });
        heap.push(Frontier { f: 4, g: 1, node: 1 });
        heap.push(Frontier { f: 4, g: 3, node: 2 });
        heap.push(Frontier { f: 4, g: 3, node: 3 });

        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![2, 3, 1, 0]);
    }

    #[test_log::test]
    fn goal_to_goal_is_zero_moves() {
        let goal = goal3();
        let solution = solve(&goal, &goal, &Manhattan).unwrap();
        assert_eq!(solution.moves, 0);
        assert_eq!(solution.evaluated, 1);
        assert_eq!(
            solution.path,
            Some(vec![Step {
                state: goal.clone(),
                action: None
            }])
        );
    }

    #[test_log::test]
    fn scenario_takes_24_moves_with_either_heuristic() {
        let goal = goal3();
        let start = scenario();

        let manhattan = solve(&start, &goal, &Manhattan).unwrap();
        let enhanced = solve(&start, &goal, &LinearConflict).unwrap();

        assert_eq!(manhattan.moves, 24);
        assert_eq!(enhanced.moves, 24);
        assert_path_is_connected(&start, &goal, &manhattan);
        assert_path_is_connected(&start, &goal, &enhanced);
        assert!(enhanced.evaluated < manhattan.evaluated);
    }

    #[test_log::test]
    fn search_is_deterministic() {
        let goal = goal3();
        let first = solve(&scenario(), &goal, &LinearConflict).unwrap();
        let second = solve(&scenario(), &goal, &LinearConflict).unwrap();
        assert_eq!(first.path, second.path);
        assert_eq!(first.evaluated, second.evaluated);
    }

    #[test_log::test]
    fn matches_breadth_first_distances() {
        let goal = goal3();
        let distances = distances_from(&goal, Some(16));
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..12 {
            // A walk of 16 moves never ends further than 16 moves away.
            let start = crate::generator::random_walk(3, 16, &mut rng).unwrap();
            let expected = distances[&start];
            for solution in [
                solve(&start, &goal, &Manhattan).unwrap(),
                solve(&start, &goal, &LinearConflict).unwrap(),
            ] {
                assert_eq!(solution.moves as u32, expected);
                assert_path_is_connected(&start, &goal, &solution);
            }
        }
    }

    #[test_log::test]
    fn custom_heuristic_is_used() {
        let goal = goal3();
        let start = goal.apply(goal.available_actions()[0]);
        let zero = |_: &Puzzle, _: &Goal| 0u32;

        let solution = solve(&start, &goal, &zero).unwrap();
        assert_eq!(solution.moves, 1);
        assert_eq!(solution.actions().count(), 1);
    }

    #[test_log::test]
    fn unreachable_goal_exhausts_the_component() {
        let goal = Puzzle::goal(2).unwrap();
        let start = Puzzle::from_rows(&[[2, 1], [3, 0]]).unwrap();

        let solution = solve(&start, &goal, &Manhattan).unwrap();
        assert!(!solution.is_solved());
        assert_eq!(solution.moves, 0);
        // A 2x2 board has two components of 12 states each.
        assert_eq!(solution.evaluated, 12);
    }

    #[test_log::test]
    fn size_mismatch_is_rejected() {
        let result = solve(&goal3(), &Puzzle::goal(4).unwrap(), &Manhattan);
        assert!(matches!(
            result,
            Err(SolveError::Invalid(InvalidState::SizeMismatch {
                start: 3,
                goal: 4
            }))
        ));
    }

    #[test_log::test]
    fn step_limit_stops_the_search() {
        let options = SearchOptions::default().with_limit(10).with_verbose(5);
        let result = solve_with_options(&scenario(), &goal3(), &Manhattan, options);
        assert!(matches!(result, Err(SolveError::StepLimitExhausted(10))));
    }

    #[test_log::test]
    fn evaluated_count_tracks_closed_states() {
        let goal = goal3();
        let mut context =
            SearchContext::new(scenario(), goal, &LinearConflict, SearchOptions::default())
                .unwrap();

        let mut last = 0;
        loop {
            let progress = context.step().unwrap();
            assert!(context.evaluated() >= last);
            last = context.evaluated();
            match progress {
                Progress::Found(id) => {
                    assert_eq!(context.node(id).g(), 24);
                    assert_eq!(context.evaluated(), context.closed() + 1);
                    break;
                }
                Progress::Exhausted => panic!("scenario is solvable"),
                _ => assert_eq!(context.evaluated(), context.closed()),
            }
        }
    }

    #[test_log::test]
    fn reconstructs_in_chronological_order() {
        let goal = goal3();
        let first = goal.available_actions()[0];
        let middle = goal.apply(first);
        let second = middle.available_actions()[2];
        let last = middle.apply(second);

        let nodes = vec![
            SearchNode {
                state: goal.clone(),
                parent: None,
                action: None,
                g: 0,
                h: 0,
            },
            SearchNode {
                state: middle.clone(),
                parent: Some(0),
                action: Some(first),
                g: 1,
                h: 0,
            },
            SearchNode {
                state: last.clone(),
                parent: Some(1),
                action: Some(second),
                g: 2,
                h: 0,
            },
        ];

        let path = reconstruct_path(&nodes, 2);
        assert_eq!(path.len(), 3);
        assert_eq!(path[0].state, goal);
        assert_eq!(path[0].action, None);
        assert_eq!(path[1].action, Some(first));
        assert_eq!(path[2].state, last);
        assert_eq!(path[2].action, Some(second));
    }
}
