use crate::{
    cache,
    canonical_fsm::CanonicalFSM,
    config::SolverConfig,
    cube::CubeState,
    facelet,
    moves::{Move, format_moves, parse_moves},
    pruning::{TableError, Tables},
    singmaster,
    solver::{Budget, SolveError, TwoPhaseSolver},
    success,
};
use log::info;
use std::{fmt, time::Duration};

/// A verified solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub moves: Vec<Move>,
    /// How many moves phase 1 contributed, before the phases were joined.
    /// When the inverse cube was searched these moves come last.
    pub phase1_len: usize,
    pub nodes: u64,
    pub elapsed: Duration,
}

impl Solution {
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.moves.is_empty() {
            write!(f, "(0)")
        } else {
            write!(f, "{} ({})", format_moves(&self.moves), self.moves.len())
        }
    }
}

/// Owns the pruning tables and everything else the search reads. Building it
/// is the expensive part; afterwards it is only ever read, so one engine can
/// serve many threads.
#[derive(Debug)]
pub struct SolverEngine {
    tables: Tables,
    canonical_fsm: CanonicalFSM,
    config: SolverConfig,
}

impl SolverEngine {
    /// Load the tables from the configured cache, or generate them.
    ///
    /// # Errors
    ///
    /// Fails if the tables cannot be generated consistently.
    pub fn new(config: SolverConfig) -> Result<Self, TableError> {
        let tables = cache::load_or_generate(&config.table_cache)?;
        Ok(Self::with_tables(config, tables))
    }

    #[must_use]
    pub fn with_tables(config: SolverConfig, tables: Tables) -> Self {
        Self {
            tables,
            canonical_fsm: CanonicalFSM::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[must_use]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Solve with the engine's own configuration.
    ///
    /// # Errors
    ///
    /// See [`SolveError`].
    pub fn solve(&self, state: &CubeState) -> Result<Solution, SolveError> {
        self.solve_with(state, &self.config)
    }

    /// Solve with a different configuration. The table cache setting of
    /// `config` is ignored.
    ///
    /// # Errors
    ///
    /// Rejects an illegal `state` before searching, and otherwise fails if
    /// the search exhausts its depth ceilings or its budget.
    pub fn solve_with(
        &self,
        state: &CubeState,
        config: &SolverConfig,
    ) -> Result<Solution, SolveError> {
        state.verify()?;
        let budget = Budget::new(config);
        let output =
            TwoPhaseSolver::new(&self.tables, &self.canonical_fsm, config, &budget).solve(state)?;
        let solution = Solution {
            moves: output.moves,
            phase1_len: output.phase1_len,
            nodes: budget.nodes(),
            elapsed: budget.elapsed(),
        };
        info!(
            success!("Found {} move solution in {:.3}s after {} nodes"),
            solution.len(),
            solution.elapsed.as_secs_f64(),
            solution.nodes
        );
        Ok(solution)
    }

    /// Solve a facelet string written with the face letters `URFDLB`.
    ///
    /// # Errors
    ///
    /// See [`facelet::decode`] and [`SolverEngine::solve`].
    pub fn solve_facelets(&self, facelets: &str) -> Result<Solution, SolveError> {
        self.solve(&facelet::decode(facelets)?)
    }

    /// Solve a facelet string written with arbitrary colour symbols.
    ///
    /// # Errors
    ///
    /// See [`facelet::decode_colors`] and [`SolverEngine::solve`].
    pub fn solve_colors(&self, facelets: &str) -> Result<Solution, SolveError> {
        self.solve(&facelet::decode_colors(facelets)?)
    }

    /// Solve a cube in Singmaster cubie notation.
    ///
    /// # Errors
    ///
    /// See [`singmaster::parse_singmaster`] and [`SolverEngine::solve`].
    pub fn solve_singmaster(&self, cubies: &str) -> Result<Solution, SolveError> {
        self.solve(&singmaster::parse_singmaster(cubies)?)
    }

    /// Replay `moves` on `start` and solve the result. The solution undoes
    /// both `start` and the replayed moves.
    ///
    /// # Errors
    ///
    /// See [`SolverEngine::solve`].
    pub fn solve_after(&self, start: &CubeState, moves: &[Move]) -> Result<Solution, SolveError> {
        self.solve(&start.apply_moves(moves))
    }

    /// [`SolverEngine::solve_after`] with the moves written out, e.g.
    /// `"R U' F2"`.
    ///
    /// # Errors
    ///
    /// See [`parse_moves`] and [`SolverEngine::solve`].
    pub fn solve_after_notation(
        &self,
        start: &CubeState,
        moves: &str,
    ) -> Result<Solution, SolveError> {
        self.solve_after(start, &parse_moves(moves)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableCacheMode;

    #[test]
    fn test_display() {
        let solution = Solution {
            moves: parse_moves("R U' F2").unwrap(),
            phase1_len: 2,
            nodes: 10,
            elapsed: Duration::ZERO,
        };
        assert_eq!(solution.to_string(), "R U' F2 (3)");
        let empty = Solution {
            moves: vec![],
            ..solution
        };
        assert_eq!(empty.to_string(), "(0)");
    }

    #[test_log::test]
    fn test_rejects_illegal_state_before_searching() {
        let engine = SolverEngine::new(SolverConfig {
            table_cache: TableCacheMode::Disabled,
            ..SolverConfig::default()
        })
        .unwrap();
        let mut state = CubeState::SOLVED;
        state.corner_orientations[0] = 1;
        assert!(matches!(
            engine.solve(&state),
            Err(SolveError::IllegalInput(_))
        ));
        let solution = engine
            .solve_after(&CubeState::SOLVED, &parse_moves("F").unwrap())
            .unwrap();
        assert_eq!(solution.moves, parse_moves("F'").unwrap());

        let solution = engine
            .solve_after_notation(&CubeState::SOLVED, "R U R' U'")
            .unwrap();
        assert!(
            CubeState::SOLVED
                .apply_moves(&parse_moves("R U R' U'").unwrap())
                .apply_moves(&solution.moves)
                .is_solved()
        );
        assert!(matches!(
            engine.solve_after_notation(&CubeState::SOLVED, "R Q"),
            Err(SolveError::Moves(_))
        ));
    }
}
