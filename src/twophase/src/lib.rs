//! A two-phase Rubik's cube solver.
//!
//! A [`CubeState`] is reduced to the subgroup `G1 = <U, D, R2, L2, F2, B2>`
//! by an IDA* search guided by orientation pruning tables, and then solved
//! inside `G1` by a second IDA* search guided by permutation pruning tables.
//! Everything the search needs lives in a [`SolverEngine`], built once and
//! shared read-only afterwards.

pub mod batch;
pub mod cache;
pub(crate) mod canonical_fsm;
pub mod config;
pub mod coord;
pub mod cube;
pub mod engine;
pub mod facelet;
pub mod moves;
pub mod pruning;
pub mod scramble;
pub mod singmaster;
pub mod solver;
pub mod symmetry;

pub use config::SolverConfig;
pub use cube::{CubeState, InvariantViolation};
pub use engine::{Solution, SolverEngine};
pub use facelet::FaceletError;
pub use moves::{Face, Move};
pub use solver::SolveError;

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// A precomputed factorial table for 0! to 12!, where index[i] is i!. Twelve
/// edges is the largest orbit we rank.
const FACT_UNTIL_12: [u32; 13] = {
    let mut arr = [0; 13];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u32;
        i += 1;
    }
    arr
};

/// Pascal's triangle up to row 12, where index[n][k] is n choose k.
const BINOMIAL_UNTIL_12: [[u32; 13]; 13] = {
    let mut arr = [[0; 13]; 13];
    let mut n = 0;
    while n < arr.len() {
        arr[n][0] = 1;
        let mut k = 1;
        while k <= n {
            arr[n][k] = arr[n - 1][k - 1] + arr[n - 1][k];
            k += 1;
        }
        n += 1;
    }
    arr
};
