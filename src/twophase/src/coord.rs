//! Lossy integer projections of a [`CubeState`].
//!
//! A coordinate only ever goes one way, from state to integer. Every
//! coordinate is zero on the solved cube.

use crate::{
    BINOMIAL_UNTIL_12, FACT_UNTIL_12,
    cube::{CubeState, FIRST_SLICE_EDGE, NUM_CORNERS, NUM_EDGES},
};

/// A projection of a cube state onto `0..Self::COUNT`.
pub trait Coordinate {
    const NAME: &'static str;
    const COUNT: usize;

    fn of(state: &CubeState) -> u16;
}

/// Twist of the first seven corners in base 3. The eighth is implied.
pub struct Twist;

/// Flip of the first eleven edges in base 2. The twelfth is implied.
pub struct Flip;

/// Which four of the twelve edge slots hold the `FR FL BL BR` slice edges,
/// ignoring their order.
pub struct UdSlice;

/// Rank of the corner permutation.
pub struct CornerPerm;

/// Rank of the permutation of the eight `U` and `D` layer edges. Only
/// meaningful inside `G1`.
pub struct UdEdgePerm;

/// Rank of the permutation of the four slice edges among the slice slots.
/// Only meaningful inside `G1`.
pub struct SliceSortedPerm;

/// Lehmer rank of a permutation of `0..perm.len()`, or of any sequence of
/// distinct values, relative to their sorted order.
fn permutation_rank(perm: &[u8]) -> u16 {
    let piece_count = perm.len();
    let mut rank = 0;
    for i in 0..piece_count {
        let mut smaller_after = 0;
        for j in (i + 1)..piece_count {
            if perm[j] < perm[i] {
                smaller_after += 1;
            }
        }
        rank += smaller_after * FACT_UNTIL_12[piece_count - i - 1];
    }
    rank as u16
}

impl Coordinate for Twist {
    const NAME: &'static str = "corner orientation";
    const COUNT: usize = 2187;

    fn of(state: &CubeState) -> u16 {
        state.corner_orientations[..NUM_CORNERS - 1]
            .iter()
            .fold(0, |acc, &o| acc * 3 + u16::from(o))
    }
}

impl Coordinate for Flip {
    const NAME: &'static str = "edge orientation";
    const COUNT: usize = 2048;

    fn of(state: &CubeState) -> u16 {
        state.edge_orientations[..NUM_EDGES - 1]
            .iter()
            .fold(0, |acc, &o| acc * 2 + u16::from(o))
    }
}

impl Coordinate for UdSlice {
    const NAME: &'static str = "UD slice";
    const COUNT: usize = 495;

    fn of(state: &CubeState) -> u16 {
        let mut rank = 0;
        let mut seen = 0;
        for slot in (0..NUM_EDGES).rev() {
            if state.edge_positions[slot] >= FIRST_SLICE_EDGE {
                rank += BINOMIAL_UNTIL_12[NUM_EDGES - 1 - slot][seen + 1];
                seen += 1;
            }
        }
        rank as u16
    }
}

impl Coordinate for CornerPerm {
    const NAME: &'static str = "corner permutation";
    const COUNT: usize = 40320;

    fn of(state: &CubeState) -> u16 {
        permutation_rank(&state.corner_positions)
    }
}

impl Coordinate for UdEdgePerm {
    const NAME: &'static str = "UD edge permutation";
    const COUNT: usize = 40320;

    fn of(state: &CubeState) -> u16 {
        permutation_rank(&state.edge_positions[..usize::from(FIRST_SLICE_EDGE)])
    }
}

impl Coordinate for SliceSortedPerm {
    const NAME: &'static str = "slice edge permutation";
    const COUNT: usize = 24;

    fn of(state: &CubeState) -> u16 {
        permutation_rank(&state.edge_positions[usize::from(FIRST_SLICE_EDGE)..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{Move, parse_moves};
    use proptest::prelude::*;

    fn moves_strategy() -> impl Strategy<Value = Vec<Move>> {
        prop::collection::vec((0..18_usize).prop_map(|i| Move::ALL[i]), 0..60)
    }

    fn all_zero(state: &CubeState) -> bool {
        Twist::of(state) == 0
            && Flip::of(state) == 0
            && UdSlice::of(state) == 0
            && CornerPerm::of(state) == 0
            && UdEdgePerm::of(state) == 0
            && SliceSortedPerm::of(state) == 0
    }

    #[test]
    fn test_solved_is_zero() {
        assert!(all_zero(&CubeState::SOLVED));
    }

    #[test]
    fn test_permutation_rank_extremes() {
        assert_eq!(permutation_rank(&[0, 1, 2, 3]), 0);
        assert_eq!(permutation_rank(&[3, 2, 1, 0]), 23);
        assert_eq!(permutation_rank(&[7, 6, 5, 4, 3, 2, 1, 0]), 40319);
        // Ranking is relative, so the slice edges 8..12 rank like 0..4
        assert_eq!(permutation_rank(&[11, 10, 9, 8]), 23);
    }

    #[test]
    fn test_slice_coordinate() {
        // U moves no slice edge
        let state = CubeState::SOLVED.apply_moves(&parse_moves("U D'").unwrap());
        assert_eq!(UdSlice::of(&state), 0);
        // R brings FR and BR into the U and D layers
        let state = CubeState::SOLVED.apply_moves(&parse_moves("R").unwrap());
        assert_ne!(UdSlice::of(&state), 0);
        // The slice edges sitting in the first four slots is the last rank
        let mut state = CubeState::SOLVED;
        state.edge_positions = [8, 9, 10, 11, 4, 5, 6, 7, 0, 1, 2, 3];
        assert_eq!(usize::from(UdSlice::of(&state)), UdSlice::COUNT - 1);
    }

    proptest! {
        #[test]
        fn coordinates_stay_in_range(moves in moves_strategy()) {
            let state = CubeState::SOLVED.apply_moves(&moves);
            prop_assert!(usize::from(Twist::of(&state)) < Twist::COUNT);
            prop_assert!(usize::from(Flip::of(&state)) < Flip::COUNT);
            prop_assert!(usize::from(UdSlice::of(&state)) < UdSlice::COUNT);
            prop_assert!(usize::from(CornerPerm::of(&state)) < CornerPerm::COUNT);
            prop_assert_eq!(
                Twist::of(&state) == 0 && Flip::of(&state) == 0 && UdSlice::of(&state) == 0,
                state.is_in_g1()
            );
        }

        #[test]
        fn g1_coordinates_identify_the_solved_cube(
            moves in prop::collection::vec(0..10_usize, 0..40)
        ) {
            let state = moves
                .into_iter()
                .fold(CubeState::SOLVED, |s, i| s.apply(Move::PHASE2[i]));
            prop_assert!(usize::from(UdEdgePerm::of(&state)) < UdEdgePerm::COUNT);
            prop_assert!(usize::from(SliceSortedPerm::of(&state)) < SliceSortedPerm::COUNT);
            prop_assert_eq!(all_zero(&state), state.is_solved());
        }
    }
}
