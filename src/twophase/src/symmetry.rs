//! Whole-cube symmetries used to search one cube from six directions.
//!
//! Phase 1 aims for `G1`, which singles out the UD axis. Rotating the cube
//! about the URF-DBL diagonal makes the search aim for the RL or FB axis
//! instead, and solving the inverse cube gives three more starting points.
//! Each [`Orientation`] views the input one of these ways and maps a solution
//! of the view back onto the input.

use crate::{
    cube::CubeState,
    moves::{Face, Move, invert},
};

/// A 120° rotation about the URF-DBL corner diagonal, taking U to R, R to F
/// and F to U.
const URF3: CubeState = CubeState {
    corner_positions: [0, 4, 5, 1, 3, 7, 6, 2],
    corner_orientations: [1, 2, 1, 2, 2, 1, 2, 1],
    edge_positions: [1, 8, 5, 9, 3, 11, 7, 10, 0, 4, 6, 2],
    edge_orientations: [1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 1],
};

const URF3_INV: CubeState = CubeState {
    corner_positions: [0, 3, 7, 4, 1, 2, 6, 5],
    corner_orientations: [2, 1, 2, 1, 1, 2, 1, 2],
    edge_positions: [8, 0, 11, 4, 9, 2, 10, 6, 1, 3, 7, 5],
    edge_orientations: [1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
};

/// A quarter turn of the whole cube about the UD axis.
const U4: CubeState = CubeState {
    corner_positions: [3, 0, 1, 2, 7, 4, 5, 6],
    corner_orientations: [0; 8],
    edge_positions: [3, 0, 1, 2, 7, 4, 5, 6, 11, 8, 9, 10],
    edge_orientations: [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
};

/// A half turn of the whole cube about the FB axis.
const F2: CubeState = CubeState {
    corner_positions: [5, 4, 7, 6, 1, 0, 3, 2],
    corner_orientations: [0; 8],
    edge_positions: [6, 5, 4, 7, 2, 1, 0, 3, 9, 8, 11, 10],
    edge_orientations: [0; 12],
};

/// Where each face of a view lands on the input, indexed by rotation and
/// then by `Face::index`.
const FACE_MAP: [[Face; 6]; 3] = {
    use Face::{B, D, F, L, R, U};
    [
        [U, R, F, D, L, B],
        [F, U, R, B, D, L],
        [R, F, U, L, B, D],
    ]
};

/// One of the six ways to hand a cube to the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    /// How many times the cube is rotated about the URF-DBL diagonal.
    pub rotation: u8,
    /// Whether the inverse cube is searched.
    pub inverted: bool,
}

impl Orientation {
    /// In search order. The position of each entry is its bit in
    /// `SolverConfig::axes`.
    pub const ALL: [Self; 6] = [
        Self::new(0, false),
        Self::new(1, false),
        Self::new(2, false),
        Self::new(0, true),
        Self::new(1, true),
        Self::new(2, true),
    ];

    const fn new(rotation: u8, inverted: bool) -> Self {
        Self { rotation, inverted }
    }

    /// The bit of this orientation in an axes mask.
    #[must_use]
    pub const fn mask(self) -> u8 {
        let offset = if self.inverted { 3 } else { 0 };
        1 << (offset + self.rotation)
    }

    /// The cube as this orientation searches it.
    #[must_use]
    pub fn view(self, state: &CubeState) -> CubeState {
        let rotated = match self.rotation {
            0 => *state,
            1 => URF3_INV.compose(state).compose(&URF3),
            _ => URF3.compose(state).compose(&URF3_INV),
        };
        if self.inverted {
            rotated.inverse()
        } else {
            rotated
        }
    }

    /// Turn a solution of [`Orientation::view`] into a solution of the cube
    /// it was taken from.
    #[must_use]
    pub fn map_back(self, moves: &[Move]) -> Vec<Move> {
        let faces = &FACE_MAP[usize::from(self.rotation)];
        let mapped = moves
            .iter()
            .map(|m| Move::new(faces[m.face().index()], m.turns()))
            .collect::<Vec<_>>();
        if self.inverted { invert(&mapped) } else { mapped }
    }
}

/// The orientations in `axes` whose views are not the same phase 1 problem
/// as an earlier one.
///
/// Rotating about the UD axis or flipping it over leaves `G1` where it was,
/// so two views related that way have solutions of the same lengths and
/// only the first is kept. An empty mask searches the cube as given.
#[must_use]
pub fn distinct_views(state: &CubeState, axes: u8) -> Vec<(Orientation, CubeState)> {
    let mut views: Vec<(Orientation, CubeState)> = vec![];
    for orientation in Orientation::ALL {
        if axes & orientation.mask() == 0 {
            continue;
        }
        let view = orientation.view(state);
        if views
            .iter()
            .all(|(_, seen)| !same_up_to_ud_symmetry(seen, &view))
        {
            views.push((orientation, view));
        }
    }
    if views.is_empty() {
        views.push((Orientation::ALL[0], *state));
    }
    views
}

/// Whether `b` is `a` conjugated by one of the eight whole-cube rotations
/// that keep the UD axis in place.
fn same_up_to_ud_symmetry(a: &CubeState, b: &CubeState) -> bool {
    let mut symmetry = CubeState::SOLVED;
    for _ in 0..4 {
        let flipped = symmetry.compose(&F2);
        for s in [symmetry, flipped] {
            if s.inverse().compose(b).compose(&s) == *a {
                return true;
            }
        }
        symmetry = symmetry.compose(&U4);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{format_moves, parse_moves};

    fn scrambled(moves: &str) -> CubeState {
        CubeState::SOLVED.apply_moves(&parse_moves(moves).unwrap())
    }

    #[test]
    fn test_diagonal_rotation_has_order_three() {
        assert_eq!(URF3.compose(&URF3_INV), CubeState::SOLVED);
        assert_eq!(URF3.compose(&URF3).compose(&URF3), CubeState::SOLVED);
        assert_eq!(U4.compose(&U4).compose(&U4).compose(&U4), CubeState::SOLVED);
        assert_eq!(F2.compose(&F2), CubeState::SOLVED);
    }

    #[test]
    fn test_face_map_matches_conjugation() {
        for move_ in Move::ALL {
            let turn = CubeState::SOLVED.apply(move_);
            for rotation in 1..3 {
                let orientation = Orientation::new(rotation, false);
                let mapped = orientation.map_back(&[move_]);
                let conjugated = if rotation == 1 {
                    URF3.compose(&turn).compose(&URF3_INV)
                } else {
                    URF3_INV.compose(&turn).compose(&URF3)
                };
                assert_eq!(
                    CubeState::SOLVED.apply_moves(&mapped),
                    conjugated,
                    "{move_} under rotation {rotation}"
                );
            }
        }
    }

    #[test]
    fn test_views_are_legal() {
        let state = scrambled("R U2 F' L D B2 R' U F2 D' L2 B U' R2 F D2 L' B' U2 R");
        for orientation in Orientation::ALL {
            assert_eq!(orientation.view(&state).verify(), Ok(()));
        }
    }

    #[test]
    fn test_solution_of_view_solves_input() {
        let scramble = parse_moves("F2 L' D B U R2 F' D2").unwrap();
        let state = CubeState::SOLVED.apply_moves(&scramble);
        for orientation in Orientation::ALL {
            // The scramble as the rotated cube sees it
            let rotation = Orientation::new(orientation.rotation, false);
            let seen = scramble
                .iter()
                .map(|&s| {
                    Move::ALL
                        .into_iter()
                        .find(|&m| rotation.map_back(&[m]) == [s])
                        .unwrap()
                })
                .collect::<Vec<_>>();
            let view_solution = if orientation.inverted {
                seen
            } else {
                invert(&seen)
            };
            let view = orientation.view(&state);
            assert!(view.apply_moves(&view_solution).is_solved());

            let solution = orientation.map_back(&view_solution);
            assert!(
                state.apply_moves(&solution).is_solved(),
                "{orientation:?} mapped back to {}",
                format_moves(&solution)
            );
        }
    }

    #[test]
    fn test_ud_symmetric_views_are_skipped() {
        // Conjugating by a UD-axis rotation is the same phase 1 problem
        let state = scrambled("R F");
        let turned = U4.inverse().compose(&state).compose(&U4);
        assert!(same_up_to_ud_symmetry(&state, &turned));
        assert!(!same_up_to_ud_symmetry(&state, &scrambled("R F'")));

        // The solved cube looks the same from every direction
        assert_eq!(distinct_views(&CubeState::SOLVED, 0b11_1111).len(), 1);
        assert_eq!(
            distinct_views(&scrambled("R U2 F' L D B2 R' U F2 D' L2 B"), 0b11_1111).len(),
            6
        );
        let only_inverse = distinct_views(&scrambled("R U"), Orientation::ALL[3].mask());
        assert_eq!(only_inverse.len(), 1);
        assert!(only_inverse[0].0.inverted);
        let fallback = distinct_views(&scrambled("R U"), 0);
        assert_eq!(fallback[0].0, Orientation::ALL[0]);
    }
}
