//! The cubie-level model of the cube: which piece sits in which slot, and how
//! it is twisted or flipped there.
//!
//! Corner slots are numbered `URF UFL ULB UBR DFR DLF DBL DRB` and edge slots
//! `UR UF UL UB DR DF DL DB FR FL BL BR`. Every array is "replaced by" form:
//! `corner_positions[i]` is the corner piece currently occupying slot `i`.

use crate::moves::{Face, Move};
use thiserror::Error;

pub const NUM_CORNERS: usize = 8;
pub const NUM_EDGES: usize = 12;

/// Edge pieces `FR FL BL BR` belong in the middle (E) slice.
pub const FIRST_SLICE_EDGE: u8 = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Corners are not a permutation of 0..8")]
    CornerPermutation,
    #[error("Edges are not a permutation of 0..12")]
    EdgePermutation,
    #[error("Orientation value out of range")]
    OrientationRange,
    #[error("Corner twists sum to {0} (mod 3), expected 0")]
    TwistSum(u8),
    #[error("Edge flips sum to {0} (mod 2), expected 0")]
    FlipSum(u8),
    #[error("Corner permutation parity differs from edge permutation parity")]
    ParityMismatch,
    #[error("Centre of face {face} is not where it belongs")]
    MisplacedCentre { face: Face },
    #[error("Corner slot {slot} holds an unrecognisable piece")]
    UnrecognisedCorner { slot: usize },
    #[error("Edge slot {slot} holds an unrecognisable piece")]
    UnrecognisedEdge { slot: usize },
}

/// A cube configuration. It is `Copy`, so search branches simply take a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeState {
    pub(crate) corner_positions: [u8; NUM_CORNERS],
    pub(crate) corner_orientations: [u8; NUM_CORNERS],
    pub(crate) edge_positions: [u8; NUM_EDGES],
    pub(crate) edge_orientations: [u8; NUM_EDGES],
}

const fn identity<const N: usize>() -> [u8; N] {
    let mut arr = [0; N];
    let mut i = 0;
    while i < N {
        arr[i] = i as u8;
        i += 1;
    }
    arr
}

/// The clockwise quarter turn of each face, indexed by `Face::index`.
const QUARTER_TURNS: [CubeState; 6] = [
    // U
    CubeState {
        corner_positions: [3, 0, 1, 2, 4, 5, 6, 7],
        corner_orientations: [0; 8],
        edge_positions: [3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11],
        edge_orientations: [0; 12],
    },
    // R
    CubeState {
        corner_positions: [4, 1, 2, 0, 7, 5, 6, 3],
        corner_orientations: [2, 0, 0, 1, 1, 0, 0, 2],
        edge_positions: [8, 1, 2, 3, 11, 5, 6, 7, 4, 9, 10, 0],
        edge_orientations: [0; 12],
    },
    // F
    CubeState {
        corner_positions: [1, 5, 2, 3, 0, 4, 6, 7],
        corner_orientations: [1, 2, 0, 0, 2, 1, 0, 0],
        edge_positions: [0, 9, 2, 3, 4, 8, 6, 7, 1, 5, 10, 11],
        edge_orientations: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    },
    // D
    CubeState {
        corner_positions: [0, 1, 2, 3, 5, 6, 7, 4],
        corner_orientations: [0; 8],
        edge_positions: [0, 1, 2, 3, 5, 6, 7, 4, 8, 9, 10, 11],
        edge_orientations: [0; 12],
    },
    // L
    CubeState {
        corner_positions: [0, 2, 6, 3, 4, 1, 5, 7],
        corner_orientations: [0, 1, 2, 0, 0, 2, 1, 0],
        edge_positions: [0, 1, 10, 3, 4, 5, 9, 7, 8, 2, 6, 11],
        edge_orientations: [0; 12],
    },
    // B
    CubeState {
        corner_positions: [0, 1, 3, 7, 4, 5, 2, 6],
        corner_orientations: [0, 0, 1, 2, 0, 0, 2, 1],
        edge_positions: [0, 1, 2, 11, 4, 5, 6, 10, 8, 9, 3, 7],
        edge_orientations: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    },
];

/// Number of inversions of a permutation, mod 2.
fn permutation_parity(perm: &[u8]) -> u8 {
    let mut parity = 0;
    for i in 0..perm.len() {
        for j in (i + 1)..perm.len() {
            if perm[i] > perm[j] {
                parity ^= 1;
            }
        }
    }
    parity
}

fn is_permutation(perm: &[u8]) -> bool {
    let mut seen = 0_u32;
    for &piece in perm {
        if usize::from(piece) >= perm.len() || seen & (1 << piece) != 0 {
            return false;
        }
        seen |= 1 << piece;
    }
    true
}

impl Default for CubeState {
    fn default() -> Self {
        Self::SOLVED
    }
}

impl CubeState {
    pub const SOLVED: Self = CubeState {
        corner_positions: identity(),
        corner_orientations: [0; NUM_CORNERS],
        edge_positions: identity(),
        edge_orientations: [0; NUM_EDGES],
    };

    /// Build a state from raw arrays, rejecting anything that is not a
    /// reachable cube.
    ///
    /// # Errors
    ///
    /// Returns the first cube-group invariant the arrays violate.
    pub fn from_parts(
        corner_positions: [u8; NUM_CORNERS],
        corner_orientations: [u8; NUM_CORNERS],
        edge_positions: [u8; NUM_EDGES],
        edge_orientations: [u8; NUM_EDGES],
    ) -> Result<Self, InvariantViolation> {
        let state = CubeState {
            corner_positions,
            corner_orientations,
            edge_positions,
            edge_orientations,
        };
        state.verify()?;
        Ok(state)
    }

    #[must_use]
    pub fn corner_positions(&self) -> &[u8; NUM_CORNERS] {
        &self.corner_positions
    }

    #[must_use]
    pub fn corner_orientations(&self) -> &[u8; NUM_CORNERS] {
        &self.corner_orientations
    }

    #[must_use]
    pub fn edge_positions(&self) -> &[u8; NUM_EDGES] {
        &self.edge_positions
    }

    #[must_use]
    pub fn edge_orientations(&self) -> &[u8; NUM_EDGES] {
        &self.edge_orientations
    }

    /// Check every cube-group invariant: both position arrays are
    /// permutations, orientations are in range, twists sum to 0 mod 3, flips
    /// sum to 0 mod 2, and corner and edge permutation parities agree.
    ///
    /// # Errors
    ///
    /// Returns the first invariant that does not hold.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        if !is_permutation(&self.corner_positions) {
            return Err(InvariantViolation::CornerPermutation);
        }
        if !is_permutation(&self.edge_positions) {
            return Err(InvariantViolation::EdgePermutation);
        }
        if self.corner_orientations.iter().any(|&o| o > 2)
            || self.edge_orientations.iter().any(|&o| o > 1)
        {
            return Err(InvariantViolation::OrientationRange);
        }
        let twist = self.corner_orientations.iter().sum::<u8>() % 3;
        if twist != 0 {
            return Err(InvariantViolation::TwistSum(twist));
        }
        let flip = self.edge_orientations.iter().sum::<u8>() % 2;
        if flip != 0 {
            return Err(InvariantViolation::FlipSum(flip));
        }
        if self.corner_parity() != self.edge_parity() {
            return Err(InvariantViolation::ParityMismatch);
        }
        Ok(())
    }

    #[must_use]
    pub fn corner_parity(&self) -> u8 {
        permutation_parity(&self.corner_positions)
    }

    #[must_use]
    pub fn edge_parity(&self) -> u8 {
        permutation_parity(&self.edge_positions)
    }

    /// The state reached by performing `other` after `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        let mut result = CubeState::SOLVED;
        for i in 0..NUM_CORNERS {
            let from = usize::from(other.corner_positions[i]);
            result.corner_positions[i] = self.corner_positions[from];
            result.corner_orientations[i] =
                (self.corner_orientations[from] + other.corner_orientations[i]) % 3;
        }
        for i in 0..NUM_EDGES {
            let from = usize::from(other.edge_positions[i]);
            result.edge_positions[i] = self.edge_positions[from];
            result.edge_orientations[i] =
                (self.edge_orientations[from] + other.edge_orientations[i]) % 2;
        }
        result
    }

    /// The state that undoes `self` when composed after it.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut result = CubeState::SOLVED;
        for i in 0..NUM_CORNERS {
            let piece = usize::from(self.corner_positions[i]);
            result.corner_positions[piece] = i as u8;
            result.corner_orientations[piece] = (3 - self.corner_orientations[i]) % 3;
        }
        for i in 0..NUM_EDGES {
            let piece = usize::from(self.edge_positions[i]);
            result.edge_positions[piece] = i as u8;
            result.edge_orientations[piece] = self.edge_orientations[i];
        }
        result
    }

    /// Apply one face turn. Half turns and inverse turns are repeated
    /// clockwise quarter turns.
    #[must_use]
    pub fn apply(&self, move_: Move) -> Self {
        let quarter = &QUARTER_TURNS[move_.face().index()];
        let mut result = *self;
        for _ in 0..move_.turns() {
            result = result.compose(quarter);
        }
        result
    }

    #[must_use]
    pub fn apply_moves(&self, moves: &[Move]) -> Self {
        moves.iter().fold(*self, |state, &m| state.apply(m))
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    /// Membership in `G1 = <U, D, R2, L2, F2, B2>`: nothing twisted, nothing
    /// flipped, and the four slice edges inside the slice.
    #[must_use]
    pub fn is_in_g1(&self) -> bool {
        self.corner_orientations.iter().all(|&o| o == 0)
            && self.edge_orientations.iter().all(|&o| o == 0)
            && self.edge_positions[usize::from(FIRST_SLICE_EDGE)..]
                .iter()
                .all(|&e| e >= FIRST_SLICE_EDGE)
    }
}
