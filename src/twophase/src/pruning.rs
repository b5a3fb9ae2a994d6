//! Coordinate move tables and the pruning tables built on top of them.
//!
//! A [`MoveTable`] maps `(coordinate, move)` to the coordinate after the
//! move. A [`PruningTable`] stores, for every pair of values of two
//! coordinates, the exact number of moves needed to bring both to zero. The
//! search bound of a phase is the maximum over its pruning tables, which is
//! still a lower bound on the true distance.

use crate::{
    coord::{Coordinate, CornerPerm, Flip, SliceSortedPerm, Twist, UdEdgePerm, UdSlice},
    cube::CubeState,
    moves::Move,
    start, success, working,
};
use log::{debug, info};
use std::{collections::VecDeque, io, time::Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("The {table} table reached {reached} of {expected} entries")]
    Inconsistent {
        table: &'static str,
        reached: usize,
        expected: usize,
    },
    #[error("Table cache I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Table cache is unusable: {0}")]
    BadCache(String),
    #[error("A table generation thread panicked")]
    GenerationPanicked,
}

const UNVISITED: u8 = u8::MAX;

#[derive(Debug)]
pub struct MoveTable {
    num_moves: usize,
    table: Vec<u16>,
}

impl MoveTable {
    /// Tabulate how each move acts on the coordinate `C`. The table is filled
    /// by exploring cube states outward from the solved cube; the first state
    /// found with a given coordinate value stands in for all of them.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::Inconsistent`] if the exploration does not
    /// reach every coordinate value.
    pub fn generate<C: Coordinate>(moves: &[Move]) -> Result<Self, TableError> {
        let num_moves = moves.len();
        let mut table = vec![0; C::COUNT * num_moves];
        let mut seen = vec![false; C::COUNT];
        let mut queue = VecDeque::from([CubeState::SOLVED]);
        seen[usize::from(C::of(&CubeState::SOLVED))] = true;
        let mut reached = 1;

        while let Some(state) = queue.pop_front() {
            let coord = usize::from(C::of(&state));
            for (move_index, &move_) in moves.iter().enumerate() {
                let next_state = state.apply(move_);
                let next_coord = C::of(&next_state);
                table[coord * num_moves + move_index] = next_coord;
                if !seen[usize::from(next_coord)] {
                    seen[usize::from(next_coord)] = true;
                    reached += 1;
                    queue.push_back(next_state);
                }
            }
        }

        if reached != C::COUNT {
            return Err(TableError::Inconsistent {
                table: C::NAME,
                reached,
                expected: C::COUNT,
            });
        }
        Ok(Self { num_moves, table })
    }

    #[must_use]
    #[inline]
    pub fn apply(&self, coord: u16, move_index: usize) -> u16 {
        self.table[usize::from(coord) * self.num_moves + move_index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len() / self.num_moves
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug)]
pub struct PruningTable {
    name: &'static str,
    second_count: usize,
    table: Vec<u8>,
}

impl PruningTable {
    /// Breadth-first search over the product of two coordinates, stepping
    /// from distance `d` to distance `d + 1` with the inverse of every move.
    /// Each entry is written exactly once, the first time it is reached.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::Inconsistent`] unless every entry is reached.
    pub fn generate(
        name: &'static str,
        first: &MoveTable,
        second: &MoveTable,
        moves: &[Move],
    ) -> Result<Self, TableError> {
        let second_count = second.len();
        let size = first.len() * second_count;
        let inverse_indices = moves
            .iter()
            .map(|m| {
                moves
                    .iter()
                    .position(|other| *other == m.inverse())
                    .ok_or(TableError::Inconsistent {
                        table: name,
                        reached: 0,
                        expected: size,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut table = vec![UNVISITED; size];
        table[0] = 0;
        let mut frontier = vec![0_u32];
        let mut reached = 1;
        let mut depth = 0;

        while !frontier.is_empty() {
            let mut next_frontier = vec![];
            for &index in &frontier {
                let index = index as usize;
                let a = (index / second_count) as u16;
                let b = (index % second_count) as u16;
                for &inverse in &inverse_indices {
                    let next = usize::from(first.apply(a, inverse)) * second_count
                        + usize::from(second.apply(b, inverse));
                    if table[next] == UNVISITED {
                        table[next] = depth + 1;
                        next_frontier.push(next as u32);
                    }
                }
            }
            reached += next_frontier.len();
            depth += 1;
            debug!(
                working!("{}: {} entries at depth {}, {} of {} total"),
                name,
                next_frontier.len(),
                depth,
                reached,
                size
            );
            frontier = next_frontier;
        }

        if reached != size {
            return Err(TableError::Inconsistent {
                table: name,
                reached,
                expected: size,
            });
        }
        Ok(Self {
            name,
            second_count,
            table,
        })
    }

    /// Wrap previously generated data, checking that it has the right size
    /// and no unvisited entries.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::BadCache`] when the data cannot be this table.
    pub fn from_data(
        name: &'static str,
        first: &MoveTable,
        second: &MoveTable,
        table: Vec<u8>,
    ) -> Result<Self, TableError> {
        let second_count = second.len();
        if table.len() != first.len() * second_count {
            return Err(TableError::BadCache(format!(
                "{name} table has {} entries, expected {}",
                table.len(),
                first.len() * second_count
            )));
        }
        if table.first() != Some(&0) || table.contains(&UNVISITED) {
            return Err(TableError::BadCache(format!(
                "{name} table has unvisited entries"
            )));
        }
        Ok(Self {
            name,
            second_count,
            table,
        })
    }

    #[must_use]
    #[inline]
    pub fn get(&self, a: u16, b: u16) -> u8 {
        self.table[usize::from(a) * self.second_count + usize::from(b)]
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.table
    }

    /// The largest distance in the table.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.table.iter().copied().max().unwrap_or(0)
    }
}

/// The phase 1 coordinates of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase1Coord {
    pub twist: u16,
    pub flip: u16,
    pub slice: u16,
}

impl Phase1Coord {
    #[must_use]
    pub fn of(state: &CubeState) -> Self {
        Self {
            twist: Twist::of(state),
            flip: Flip::of(state),
            slice: UdSlice::of(state),
        }
    }

    /// Whether the state is in `G1`.
    #[must_use]
    pub fn is_goal(self) -> bool {
        self.twist == 0 && self.flip == 0 && self.slice == 0
    }
}

/// The phase 2 coordinates of a state in `G1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase2Coord {
    pub corners: u16,
    pub ud_edges: u16,
    pub slice_edges: u16,
}

impl Phase2Coord {
    #[must_use]
    pub fn of(state: &CubeState) -> Self {
        Self {
            corners: CornerPerm::of(state),
            ud_edges: UdEdgePerm::of(state),
            slice_edges: SliceSortedPerm::of(state),
        }
    }

    /// Whether the state is solved.
    #[must_use]
    pub fn is_goal(self) -> bool {
        self.corners == 0 && self.ud_edges == 0 && self.slice_edges == 0
    }
}

/// Tables for reaching `G1` with all 18 moves, indexed by [`Move::index`].
#[derive(Debug)]
pub struct Phase1Tables {
    twist: MoveTable,
    flip: MoveTable,
    slice: MoveTable,
    twist_slice: PruningTable,
    flip_slice: PruningTable,
}

impl Phase1Tables {
    fn move_tables() -> Result<(MoveTable, MoveTable, MoveTable), TableError> {
        Ok((
            MoveTable::generate::<Twist>(&Move::ALL)?,
            MoveTable::generate::<Flip>(&Move::ALL)?,
            MoveTable::generate::<UdSlice>(&Move::ALL)?,
        ))
    }

    /// # Errors
    ///
    /// Fails if any table does not cover its whole coordinate space.
    pub fn generate() -> Result<Self, TableError> {
        info!(start!("Generating phase 1 tables"));
        let start = Instant::now();
        let (twist, flip, slice) = Self::move_tables()?;
        let twist_slice = PruningTable::generate("twist x slice", &twist, &slice, &Move::ALL)?;
        let flip_slice = PruningTable::generate("flip x slice", &flip, &slice, &Move::ALL)?;
        info!(
            success!("Phase 1 tables generated in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        Ok(Self {
            twist,
            flip,
            slice,
            twist_slice,
            flip_slice,
        })
    }

    /// Rebuild the move tables and adopt cached pruning data.
    ///
    /// # Errors
    ///
    /// Fails if the move tables are inconsistent or the data does not fit.
    pub fn from_pruning_data(
        twist_slice: Vec<u8>,
        flip_slice: Vec<u8>,
    ) -> Result<Self, TableError> {
        let (twist, flip, slice) = Self::move_tables()?;
        let twist_slice = PruningTable::from_data("twist x slice", &twist, &slice, twist_slice)?;
        let flip_slice = PruningTable::from_data("flip x slice", &flip, &slice, flip_slice)?;
        Ok(Self {
            twist,
            flip,
            slice,
            twist_slice,
            flip_slice,
        })
    }

    #[must_use]
    #[inline]
    pub fn apply(&self, coord: Phase1Coord, move_index: usize) -> Phase1Coord {
        Phase1Coord {
            twist: self.twist.apply(coord.twist, move_index),
            flip: self.flip.apply(coord.flip, move_index),
            slice: self.slice.apply(coord.slice, move_index),
        }
    }

    /// A lower bound on the number of moves to reach `G1`.
    #[must_use]
    #[inline]
    pub fn bound(&self, coord: Phase1Coord) -> u8 {
        self.twist_slice
            .get(coord.twist, coord.slice)
            .max(self.flip_slice.get(coord.flip, coord.slice))
    }

    #[must_use]
    pub fn pruning_tables(&self) -> [&PruningTable; 2] {
        [&self.twist_slice, &self.flip_slice]
    }
}

/// Tables for solving a `G1` state with the ten moves of [`Move::PHASE2`],
/// indexed by position in that array.
#[derive(Debug)]
pub struct Phase2Tables {
    corners: MoveTable,
    ud_edges: MoveTable,
    slice_edges: MoveTable,
    corner_slice: PruningTable,
    edge_slice: PruningTable,
}

impl Phase2Tables {
    fn move_tables() -> Result<(MoveTable, MoveTable, MoveTable), TableError> {
        Ok((
            MoveTable::generate::<CornerPerm>(&Move::PHASE2)?,
            MoveTable::generate::<UdEdgePerm>(&Move::PHASE2)?,
            MoveTable::generate::<SliceSortedPerm>(&Move::PHASE2)?,
        ))
    }

    /// # Errors
    ///
    /// Fails if any table does not cover its whole coordinate space.
    pub fn generate() -> Result<Self, TableError> {
        info!(start!("Generating phase 2 tables"));
        let start = Instant::now();
        let (corners, ud_edges, slice_edges) = Self::move_tables()?;
        let corner_slice = PruningTable::generate(
            "corners x slice edges",
            &corners,
            &slice_edges,
            &Move::PHASE2,
        )?;
        let edge_slice = PruningTable::generate(
            "UD edges x slice edges",
            &ud_edges,
            &slice_edges,
            &Move::PHASE2,
        )?;
        info!(
            success!("Phase 2 tables generated in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        Ok(Self {
            corners,
            ud_edges,
            slice_edges,
            corner_slice,
            edge_slice,
        })
    }

    /// Rebuild the move tables and adopt cached pruning data.
    ///
    /// # Errors
    ///
    /// Fails if the move tables are inconsistent or the data does not fit.
    pub fn from_pruning_data(
        corner_slice: Vec<u8>,
        edge_slice: Vec<u8>,
    ) -> Result<Self, TableError> {
        let (corners, ud_edges, slice_edges) = Self::move_tables()?;
        let corner_slice = PruningTable::from_data(
            "corners x slice edges",
            &corners,
            &slice_edges,
            corner_slice,
        )?;
        let edge_slice =
            PruningTable::from_data("UD edges x slice edges", &ud_edges, &slice_edges, edge_slice)?;
        Ok(Self {
            corners,
            ud_edges,
            slice_edges,
            corner_slice,
            edge_slice,
        })
    }

    #[must_use]
    #[inline]
    pub fn apply(&self, coord: Phase2Coord, move_index: usize) -> Phase2Coord {
        Phase2Coord {
            corners: self.corners.apply(coord.corners, move_index),
            ud_edges: self.ud_edges.apply(coord.ud_edges, move_index),
            slice_edges: self.slice_edges.apply(coord.slice_edges, move_index),
        }
    }

    /// A lower bound on the number of `G1` moves to solve the cube.
    #[must_use]
    #[inline]
    pub fn bound(&self, coord: Phase2Coord) -> u8 {
        self.corner_slice
            .get(coord.corners, coord.slice_edges)
            .max(self.edge_slice.get(coord.ud_edges, coord.slice_edges))
    }

    #[must_use]
    pub fn pruning_tables(&self) -> [&PruningTable; 2] {
        [&self.corner_slice, &self.edge_slice]
    }
}

/// Everything the search reads.
#[derive(Debug)]
pub struct Tables {
    pub phase1: Phase1Tables,
    pub phase2: Phase2Tables,
}

impl Tables {
    /// Generate both phases' tables, one thread per phase.
    ///
    /// # Errors
    ///
    /// Fails if any table is inconsistent.
    pub fn generate() -> Result<Self, TableError> {
        let (phase1, phase2) = crossbeam::thread::scope(|s| {
            let phase1 = s.spawn(|_| Phase1Tables::generate());
            let phase2 = s.spawn(|_| Phase2Tables::generate());
            (phase1.join(), phase2.join())
        })
        .map_err(|_| TableError::GenerationPanicked)?;
        Ok(Self {
            phase1: phase1.map_err(|_| TableError::GenerationPanicked)??,
            phase2: phase2.map_err(|_| TableError::GenerationPanicked)??,
        })
    }

    /// The four pruning tables in a fixed order, for persisting.
    #[must_use]
    pub fn pruning_tables(&self) -> [&PruningTable; 4] {
        let [a, b] = self.phase1.pruning_tables();
        let [c, d] = self.phase2.pruning_tables();
        [a, b, c, d]
    }

    /// # Errors
    ///
    /// Fails if the data does not fit the tables.
    pub fn from_pruning_data(data: [Vec<u8>; 4]) -> Result<Self, TableError> {
        let [twist_slice, flip_slice, corner_slice, edge_slice] = data;
        Ok(Self {
            phase1: Phase1Tables::from_pruning_data(twist_slice, flip_slice)?,
            phase2: Phase2Tables::from_pruning_data(corner_slice, edge_slice)?,
        })
    }
}
