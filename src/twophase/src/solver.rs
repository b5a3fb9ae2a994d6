use crate::{
    canonical_fsm::{CanonicalFSM, CanonicalFSMState},
    config::SolverConfig,
    cube::{CubeState, InvariantViolation},
    facelet::FaceletError,
    moves::{Move, MoveParseError, format_moves, simplify},
    pruning::{Phase1Coord, Phase2Coord, TableError, Tables},
    singmaster::SingmasterError,
    symmetry::{Orientation, distinct_views},
    working,
};
use crossbeam::channel;
use log::{debug, trace};
use std::{
    sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use thiserror::Error;

/// How many nodes a search visits between budget checks.
const CHECK_INTERVAL: u64 = 1 << 12;

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("Illegal cube: {0}")]
    IllegalInput(#[from] InvariantViolation),
    #[error(transparent)]
    Facelets(#[from] FaceletError),
    #[error(transparent)]
    Singmaster(#[from] SingmasterError),
    #[error(transparent)]
    Moves(#[from] MoveParseError),
    #[error("No phase 1 solution within {max_depth} moves")]
    Phase1Exhausted { max_depth: u8 },
    #[error("No phase 2 solution within {max_depth} moves")]
    Phase2Exhausted { max_depth: u8 },
    #[error("Search budget ran out after {elapsed:?} and {nodes} nodes")]
    Timeout { elapsed: Duration, nodes: u64 },
    #[error("Internal handoff check failed: {reason}")]
    HandoffInvariant { reason: &'static str },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("A search thread panicked")]
    SearchPanicked,
}

/// The outcome of one search node, or of a callback reporting a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchResult {
    Continue,
    Found,
    Stopped,
}

/// The time and node budget of a single solve, shared by every search
/// thread working on it.
pub(crate) struct Budget {
    start: Instant,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    nodes: AtomicU64,
    stopped: AtomicBool,
}

impl Budget {
    pub(crate) fn new(config: &SolverConfig) -> Self {
        let start = Instant::now();
        Self {
            start,
            deadline: config.timeout().and_then(|t| start.checked_add(t)),
            node_limit: config.node_limit,
            nodes: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    /// Record visited nodes and report whether the budget is spent.
    fn charge(&self, nodes: u64) -> bool {
        let total = self.nodes.fetch_add(nodes, Ordering::Relaxed) + nodes;
        if self.node_limit.is_some_and(|limit| total > limit)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.stopped.store(true, Ordering::Relaxed);
        }
        self.is_stopped()
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn timeout(&self) -> SolveError {
        SolveError::Timeout {
            elapsed: self.elapsed(),
            nodes: self.nodes(),
        }
    }
}

/// Per-thread search state.
struct Worker<'a> {
    path: Vec<Move>,
    unflushed_nodes: u64,
    root_index: usize,
    /// The lowest root move index known to lead to a solution, when phase 1
    /// is split across threads.
    best_root: Option<&'a AtomicUsize>,
}

impl<'a> Worker<'a> {
    fn new(best_root: Option<&'a AtomicUsize>) -> Self {
        Self {
            path: vec![],
            unflushed_nodes: 0,
            root_index: 0,
            best_root,
        }
    }

    /// Count a node, checking the budget every `CHECK_INTERVAL` nodes.
    #[inline]
    fn visit(&mut self, budget: &Budget) -> bool {
        self.unflushed_nodes += 1;
        if self.unflushed_nodes < CHECK_INTERVAL {
            return false;
        }
        self.flush(budget)
    }

    fn flush(&mut self, budget: &Budget) -> bool {
        let stopped = budget.charge(self.unflushed_nodes);
        self.unflushed_nodes = 0;
        stopped
            || self
                .best_root
                .is_some_and(|best| self.root_index > best.load(Ordering::Relaxed))
    }
}

/// The raw result of a two-phase search, before it is verified and
/// reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchOutput {
    pub(crate) moves: Vec<Move>,
    pub(crate) phase1_len: usize,
}

/// The input cube as one [`Orientation`] sees it.
struct View {
    orientation: Orientation,
    state: CubeState,
    coord: Phase1Coord,
    bound: u8,
}

impl View {
    /// Carry a solution of this view over to the input cube. The phase 1
    /// length is unchanged, although an inverted view puts those moves last.
    fn map_back(&self, output: &SearchOutput) -> SearchOutput {
        SearchOutput {
            moves: self.orientation.map_back(&output.moves),
            phase1_len: output.phase1_len,
        }
    }
}

pub(crate) struct TwoPhaseSolver<'a> {
    tables: &'a Tables,
    canonical_fsm: &'a CanonicalFSM,
    config: &'a SolverConfig,
    budget: &'a Budget,
}

impl<'a> TwoPhaseSolver<'a> {
    pub(crate) fn new(
        tables: &'a Tables,
        canonical_fsm: &'a CanonicalFSM,
        config: &'a SolverConfig,
        budget: &'a Budget,
    ) -> Self {
        Self {
            tables,
            canonical_fsm,
            config,
            budget,
        }
    }

    /// Depth-first search for phase 1 sequences of exactly `permitted_cost`
    /// more moves that end in `G1`, calling `on_solution` with each one.
    ///
    /// A sequence whose last move is itself a `G1` move is never reported,
    /// because the sequence without that move already reached `G1`.
    ///
    /// `G1` is only tested once the full depth is used up, not at every node
    /// on the way. Iterative deepening starts at the lowest bound, so a
    /// shorter path into `G1` is always found at an earlier depth and the
    /// first result is the same as testing every node.
    fn phase1_search<F: FnMut(&[Move]) -> SearchResult>(
        &self,
        worker: &mut Worker,
        coord: Phase1Coord,
        fsm_state: CanonicalFSMState,
        permitted_cost: u8,
        on_solution: &mut F,
    ) -> SearchResult {
        if worker.visit(self.budget) {
            return SearchResult::Stopped;
        }

        // The goal test comes before pruning
        if permitted_cost == 0 {
            if coord.is_goal() && worker.path.last().is_none_or(|m| !m.preserves_g1()) {
                return on_solution(&worker.path);
            }
            return SearchResult::Continue;
        }
        if self.tables.phase1.bound(coord) > permitted_cost {
            return SearchResult::Continue;
        }

        for (move_index, &move_) in Move::ALL.iter().enumerate() {
            // The canonical FSM rejects a second turn of the same face, and
            // orders turns of opposite faces
            let Some(next_fsm_state) = self.canonical_fsm.next_state(fsm_state, move_.face())
            else {
                continue;
            };
            worker.path.push(move_);
            let result = self.phase1_search(
                worker,
                self.tables.phase1.apply(coord, move_index),
                next_fsm_state,
                permitted_cost - 1,
                on_solution,
            );
            worker.path.pop();
            if result != SearchResult::Continue {
                return result;
            }
        }
        SearchResult::Continue
    }

    /// Depth-first search for a `G1` move sequence of at most
    /// `permitted_cost` moves solving the cube. On success the sequence is
    /// left in `worker.path`.
    fn phase2_search(
        &self,
        worker: &mut Worker,
        coord: Phase2Coord,
        fsm_state: CanonicalFSMState,
        permitted_cost: u8,
    ) -> SearchResult {
        if worker.visit(self.budget) {
            return SearchResult::Stopped;
        }
        if coord.is_goal() {
            return SearchResult::Found;
        }
        if self.tables.phase2.bound(coord) > permitted_cost {
            return SearchResult::Continue;
        }

        for (move_index, &move_) in Move::PHASE2.iter().enumerate() {
            let Some(next_fsm_state) = self.canonical_fsm.next_state(fsm_state, move_.face())
            else {
                continue;
            };
            worker.path.push(move_);
            let result = self.phase2_search(
                worker,
                self.tables.phase2.apply(coord, move_index),
                next_fsm_state,
                permitted_cost - 1,
            );
            if result != SearchResult::Continue {
                return result;
            }
            worker.path.pop();
        }
        SearchResult::Continue
    }

    /// Iterative deepening for phase 2 from a state in `G1`, up to
    /// `max_depth` moves.
    fn phase2(&self, state: &CubeState, max_depth: u8) -> Result<Option<Vec<Move>>, SolveError> {
        let coord = Phase2Coord::of(state);
        let mut worker = Worker::new(None);
        let mut result = SearchResult::Continue;
        for depth in self.tables.phase2.bound(coord)..=max_depth {
            trace!(working!("Phase 2: searching depth {}..."), depth);
            worker.path.clear();
            result = self.phase2_search(&mut worker, coord, CanonicalFSMState::default(), depth);
            if result != SearchResult::Continue {
                break;
            }
        }
        let stopped = worker.flush(self.budget);
        match result {
            SearchResult::Found => Ok(Some(worker.path)),
            SearchResult::Stopped => Err(self.budget.timeout()),
            SearchResult::Continue if stopped => Err(self.budget.timeout()),
            SearchResult::Continue => Ok(None),
        }
    }

    /// The first phase 1 sequence of exactly `depth` moves, in move order.
    /// With more than one thread the first moves are shared out, and the
    /// solution under the lowest first move wins, so the answer does not
    /// depend on the thread count.
    fn phase1_at_depth(
        &self,
        coord: Phase1Coord,
        depth: u8,
    ) -> Result<Option<Vec<Move>>, SolveError> {
        let threads = self.config.threads.max(1);
        if depth == 0 || threads == 1 {
            let mut worker = Worker::new(None);
            let mut solution = None;
            let result = self.phase1_search(
                &mut worker,
                coord,
                CanonicalFSMState::default(),
                depth,
                &mut |path| {
                    solution = Some(path.to_vec());
                    SearchResult::Found
                },
            );
            let stopped = worker.flush(self.budget);
            if solution.is_none() && (result == SearchResult::Stopped || stopped) {
                return Err(self.budget.timeout());
            }
            return Ok(solution);
        }

        let next_root = AtomicUsize::new(0);
        let best_root = AtomicUsize::new(usize::MAX);
        let (tx, rx) = channel::unbounded();
        let next_coords = Move::ALL.map(|m| self.tables.phase1.apply(coord, m.index()));

        let scope_result = crossbeam::thread::scope(|s| {
            for _ in 0..threads {
                let tx = tx.clone();
                let next_root = &next_root;
                let best_root = &best_root;
                let next_coords = &next_coords;
                s.spawn(move |_| {
                    let mut worker = Worker::new(Some(best_root));
                    loop {
                        let root_index = next_root.fetch_add(1, Ordering::Relaxed);
                        if root_index >= Move::ALL.len()
                            || root_index > best_root.load(Ordering::Relaxed)
                            || self.budget.is_stopped()
                        {
                            break;
                        }
                        let root_move = Move::ALL[root_index];
                        let Some(fsm_state) = self
                            .canonical_fsm
                            .next_state(CanonicalFSMState::default(), root_move.face())
                        else {
                            continue;
                        };
                        worker.root_index = root_index;
                        worker.path = vec![root_move];
                        self.phase1_search(
                            &mut worker,
                            next_coords[root_index],
                            fsm_state,
                            depth - 1,
                            &mut |path| {
                                best_root.fetch_min(root_index, Ordering::Relaxed);
                                // The receiver outlives every sender
                                let _ = tx.send((root_index, path.to_vec()));
                                SearchResult::Found
                            },
                        );
                    }
                    worker.flush(self.budget);
                });
            }
        });
        drop(tx);
        if scope_result.is_err() {
            return Err(SolveError::SearchPanicked);
        }

        let solution = rx
            .into_iter()
            .min_by_key(|(root_index, _)| *root_index)
            .map(|(_, path)| path);
        if solution.is_none() && self.budget.is_stopped() {
            return Err(self.budget.timeout());
        }
        Ok(solution)
    }

    /// Check the state phase 1 handed over before phase 2 starts on it.
    fn check_handoff(state: &CubeState) -> Result<(), SolveError> {
        if !state.is_in_g1() {
            return Err(SolveError::HandoffInvariant {
                reason: "phase 1 ended outside G1",
            });
        }
        if state.corner_parity() != state.edge_parity() {
            return Err(SolveError::HandoffInvariant {
                reason: "corner and edge parities differ after phase 1",
            });
        }
        Ok(())
    }

    /// The views of `state` that the configured axes ask for, with their
    /// phase 1 starting points.
    fn views(&self, state: &CubeState) -> Vec<View> {
        distinct_views(state, self.config.axes)
            .into_iter()
            .map(|(orientation, state)| {
                let coord = Phase1Coord::of(&state);
                View {
                    orientation,
                    state,
                    coord,
                    bound: self.tables.phase1.bound(coord),
                }
            })
            .collect()
    }

    /// The shortest phase 1 sequence of any view, followed by the shortest
    /// phase 2 sequence from where it leaves that view. At equal depth the
    /// view searched first wins.
    fn solve_first(&self, state: &CubeState) -> Result<SearchOutput, SolveError> {
        let views = self.views(state);
        let max_phase1_depth = self.config.max_phase1_depth;
        let min_bound = views.iter().map(|view| view.bound).min().unwrap_or(0);
        let mut phase1 = None;
        'depths: for depth in min_bound..=max_phase1_depth {
            debug!(working!("Phase 1: searching depth {}..."), depth);
            let depth_start = Instant::now();
            for view in views.iter().filter(|view| view.bound <= depth) {
                trace!(working!("Phase 1: searching {:?}"), view.orientation);
                if let Some(moves) = self.phase1_at_depth(view.coord, depth)? {
                    phase1 = Some((view, moves));
                    break 'depths;
                }
            }
            debug!(
                working!("Traversed {} nodes in {:.3}s"),
                self.budget.nodes(),
                depth_start.elapsed().as_secs_f64()
            );
        }
        let (view, phase1) = phase1.ok_or(SolveError::Phase1Exhausted {
            max_depth: max_phase1_depth,
        })?;
        debug!(
            "Phase 1 solution for {:?}: {}",
            view.orientation,
            format_moves(&phase1)
        );

        let handoff = view.state.apply_moves(&phase1);
        Self::check_handoff(&handoff)?;
        let max_phase2_depth = self.config.max_phase2_depth;
        let phase2 = self
            .phase2(&handoff, max_phase2_depth)?
            .ok_or(SolveError::Phase2Exhausted {
                max_depth: max_phase2_depth,
            })?;
        debug!("Phase 2 solution: {}", format_moves(&phase2));

        Ok(view.map_back(&join_phases(&phase1, &phase2)))
    }

    /// Keep enumerating phase 1 sequences of every view, shortest first, and
    /// look for a phase 2 sequence that beats the best total so far. Stops at
    /// a total of at most `target`, after `phase2_attempt_limit` phase 2
    /// searches once any solution is known, or when the budget runs out. A
    /// budget that runs out after a solution is known returns that solution.
    fn solve_target(&self, state: &CubeState, target: usize) -> Result<SearchOutput, SolveError> {
        let views = self.views(state);
        let max_phase1_depth = self.config.max_phase1_depth;
        let max_phase2_depth = self.config.max_phase2_depth;
        let min_bound = views.iter().map(|view| view.bound).min().unwrap_or(0);
        let mut best: Option<SearchOutput> = None;
        let mut attempts = 0;
        let mut handoff_error = None;
        let mut stopped = false;

        'depths: for depth in min_bound..=max_phase1_depth {
            if best
                .as_ref()
                .is_some_and(|best| best.moves.len() <= usize::from(depth))
            {
                break;
            }
            debug!(working!("Phase 1: enumerating depth {}..."), depth);
            for view in views.iter().filter(|view| view.bound <= depth) {
                let mut worker = Worker::new(None);
                let result = self.phase1_search(
                    &mut worker,
                    view.coord,
                    CanonicalFSMState::default(),
                    depth,
                    &mut |phase1| {
                        let handoff = view.state.apply_moves(phase1);
                        if let Err(e) = Self::check_handoff(&handoff) {
                            handoff_error = Some(e);
                            return SearchResult::Stopped;
                        }
                        // Only a strictly shorter total is interesting
                        let limit = match &best {
                            Some(best) => {
                                let Some(limit) = best.moves.len().checked_sub(phase1.len() + 1)
                                else {
                                    return SearchResult::Continue;
                                };
                                limit.min(usize::from(max_phase2_depth))
                            }
                            None => usize::from(max_phase2_depth),
                        };
                        let phase2 = match self.phase2(&handoff, limit as u8) {
                            Ok(phase2) => phase2,
                            Err(_) => return SearchResult::Stopped,
                        };
                        if let Some(phase2) = phase2 {
                            let output = view.map_back(&join_phases(phase1, &phase2));
                            debug!(
                                "Found {} move solution from {:?}: {}",
                                output.moves.len(),
                                view.orientation,
                                format_moves(&output.moves)
                            );
                            best = Some(output);
                        }
                        if best.as_ref().is_some_and(|best| best.moves.len() <= target) {
                            return SearchResult::Found;
                        }
                        if best.is_some() {
                            attempts += 1;
                            if attempts >= self.config.phase2_attempt_limit {
                                return SearchResult::Found;
                            }
                        }
                        SearchResult::Continue
                    },
                );
                if worker.flush(self.budget) || result == SearchResult::Stopped {
                    stopped = true;
                }
                if result != SearchResult::Continue || stopped {
                    break 'depths;
                }
            }
        }

        if let Some(e) = handoff_error {
            return Err(e);
        }
        match best {
            Some(best) => Ok(best),
            None if stopped => Err(self.budget.timeout()),
            None => Err(SolveError::Phase1Exhausted {
                max_depth: max_phase1_depth,
            }),
        }
    }

    /// Solve `state`, which must already be a legal cube.
    pub(crate) fn solve(&self, state: &CubeState) -> Result<SearchOutput, SolveError> {
        let output = match self.config.target_length {
            Some(target) => self.solve_target(state, target)?,
            None => self.solve_first(state)?,
        };
        if !state.apply_moves(&output.moves).is_solved() {
            return Err(SolveError::HandoffInvariant {
                reason: "the combined sequence does not solve the cube",
            });
        }
        Ok(output)
    }
}

/// Concatenate the phases, merging turns of the same face where they meet.
fn join_phases(phase1: &[Move], phase2: &[Move]) -> SearchOutput {
    let mut moves = phase1.to_vec();
    moves.extend_from_slice(phase2);
    SearchOutput {
        moves: simplify(&moves),
        phase1_len: phase1.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::parse_moves;
    use std::sync::LazyLock;

    static TABLES: LazyLock<Tables> = LazyLock::new(|| Tables::generate().unwrap());
    static CANONICAL_FSM: LazyLock<CanonicalFSM> = LazyLock::new(CanonicalFSM::new);
    static AS_GIVEN: LazyLock<SolverConfig> = LazyLock::new(|| SolverConfig {
        axes: 1,
        ..SolverConfig::default()
    });

    fn solve_with(config: &SolverConfig, state: &CubeState) -> Result<SearchOutput, SolveError> {
        let budget = Budget::new(config);
        TwoPhaseSolver::new(&TABLES, &CANONICAL_FSM, config, &budget).solve(state)
    }

    fn scrambled(moves: &str) -> CubeState {
        CubeState::SOLVED.apply_moves(&parse_moves(moves).unwrap())
    }

    #[test_log::test]
    fn test_solved_needs_no_moves() {
        let output = solve_with(&SolverConfig::default(), &CubeState::SOLVED).unwrap();
        assert!(output.moves.is_empty());
        assert_eq!(output.phase1_len, 0);
    }

    #[test_log::test]
    fn test_single_move() {
        let output = solve_with(&SolverConfig::default(), &scrambled("R")).unwrap();
        assert_eq!(format_moves(&output.moves), "R'");

        // Already in G1, so phase 1 is empty
        let output = solve_with(&SolverConfig::default(), &scrambled("U2")).unwrap();
        assert_eq!(format_moves(&output.moves), "U2");
        assert_eq!(output.phase1_len, 0);
    }

    #[test_log::test]
    fn test_phase1_is_locally_optimal() {
        let state = scrambled("R U F");
        let output = solve_with(&AS_GIVEN, &state).unwrap();
        let coord = Phase1Coord::of(&state);
        assert!(usize::from(TABLES.phase1.bound(coord)) <= output.phase1_len);
        assert!(output.phase1_len <= 3);
        assert!(state.apply_moves(&output.moves).is_solved());
    }

    #[test_log::test]
    fn test_threads_do_not_change_the_answer() {
        let state = scrambled("L2 F U2 D' R L2 B L' U' D' F' R2 F' D2 F' B' U2 L2 F B2 D2");
        let single = solve_with(&SolverConfig::default(), &state).unwrap();
        let config = SolverConfig {
            threads: 4,
            ..SolverConfig::default()
        };
        for _ in 0..3 {
            assert_eq!(solve_with(&config, &state).unwrap(), single);
        }
    }

    #[test_log::test]
    fn test_phase1_ceiling() {
        let config = SolverConfig {
            max_phase1_depth: 0,
            ..AS_GIVEN.clone()
        };
        assert!(matches!(
            solve_with(&config, &scrambled("R")),
            Err(SolveError::Phase1Exhausted { max_depth: 0 })
        ));
        // A G1 cube needs no phase 1 at all
        assert!(solve_with(&config, &scrambled("U R2")).is_ok());

        // Rotated onto the FB axis, R is a G1 move
        let config = SolverConfig {
            max_phase1_depth: 0,
            ..SolverConfig::default()
        };
        let output = solve_with(&config, &scrambled("R")).unwrap();
        assert_eq!(format_moves(&output.moves), "R'");
        assert_eq!(output.phase1_len, 0);
    }

    #[test_log::test]
    fn test_every_view_solves_the_input() {
        let state = scrambled("L2 F U2 D' R L2 B L' U' D' F' R2 F' D2 F' B' U2 L2 F B2 D2");
        for orientation in Orientation::ALL {
            let config = SolverConfig {
                axes: orientation.mask(),
                ..SolverConfig::default()
            };
            let output = solve_with(&config, &state).unwrap();
            assert!(
                state.apply_moves(&output.moves).is_solved(),
                "{orientation:?} gave {}",
                format_moves(&output.moves)
            );
            let target = SolverConfig {
                target_length: Some(output.moves.len()),
                ..config
            };
            let refined = solve_with(&target, &state).unwrap();
            assert!(refined.moves.len() <= output.moves.len());
        }
    }

    #[test_log::test]
    fn test_more_views_never_lengthen_phase1() {
        let state = scrambled("R U2 F' L D B2 R' U F2 D' L2 B U' R2 F D2 L' B' U2 R");
        let as_given = solve_with(&AS_GIVEN, &state).unwrap();
        let all = solve_with(&SolverConfig::default(), &state).unwrap();
        assert!(all.phase1_len <= as_given.phase1_len);
        assert!(state.apply_moves(&all.moves).is_solved());
    }

    #[test_log::test]
    fn test_phase2_ceiling() {
        let config = SolverConfig {
            max_phase2_depth: 1,
            ..SolverConfig::default()
        };
        assert!(matches!(
            solve_with(&config, &scrambled("U R2 D' F2 L2 U2 B2")),
            Err(SolveError::Phase2Exhausted { max_depth: 1 })
        ));
    }

    #[test_log::test]
    fn test_node_limit_is_a_timeout() {
        let config = SolverConfig {
            node_limit: Some(10),
            ..SolverConfig::default()
        };
        let state = scrambled("R U2 F' L D B2 R' U F2 D' L2 B U' R2 F D2 L' B' U2 R");
        assert!(matches!(
            solve_with(&config, &state),
            Err(SolveError::Timeout { .. })
        ));
    }

    #[test_log::test]
    fn test_target_length_improves_the_first_solution() {
        let state = scrambled("R U2 F' L D B2 R' U F2 D' L2 B U' R2 F D2 L' B' U2 R");
        let first = solve_with(&SolverConfig::default(), &state).unwrap();
        let config = SolverConfig {
            target_length: Some(first.moves.len().saturating_sub(2)),
            phase2_attempt_limit: 200,
            ..SolverConfig::default()
        };
        let refined = solve_with(&config, &state).unwrap();
        assert!(refined.moves.len() <= first.moves.len());
        assert!(state.apply_moves(&refined.moves).is_solved());
    }

    #[test]
    fn test_handoff_check() {
        assert!(TwoPhaseSolver::check_handoff(&scrambled("U R2 D'")).is_ok());
        assert!(matches!(
            TwoPhaseSolver::check_handoff(&scrambled("R")),
            Err(SolveError::HandoffInvariant {
                reason: "phase 1 ended outside G1"
            })
        ));

        // Still in G1, but only two edges swapped
        let mut state = CubeState::SOLVED;
        state.edge_positions.swap(0, 1);
        assert!(state.is_in_g1());
        assert!(matches!(
            TwoPhaseSolver::check_handoff(&state),
            Err(SolveError::HandoffInvariant {
                reason: "corner and edge parities differ after phase 1"
            })
        ));
    }

    #[test_log::test]
    fn test_join_merges_the_seam() {
        let output = join_phases(
            &parse_moves("F R").unwrap(),
            &parse_moves("R2 U").unwrap(),
        );
        assert_eq!(format_moves(&output.moves), "F R' U");
        assert_eq!(output.phase1_len, 2);
    }
}
