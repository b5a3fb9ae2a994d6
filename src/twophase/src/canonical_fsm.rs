//! A finite state machine over faces that only admits canonical move
//! sequences: never the same face twice in a row, and turns of commuting faces
//! only in increasing face order. Derived from Lucas Garron's canonical FSM in
//! twsearch.

use crate::{
    cube::CubeState,
    moves::{Face, Move},
};
use std::collections::HashMap;

const NUM_FACES: usize = Face::ALL.len();

// Bit N is set for `Face::ALL[N]`.
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
struct FaceMask(u8);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanonicalFSMState(usize);

const ILLEGAL: CanonicalFSMState = CanonicalFSMState(usize::MAX);

#[derive(Debug)]
pub struct CanonicalFSM {
    next_state_lookup: Vec<[CanonicalFSMState; NUM_FACES]>,
}

fn faces_commute(a: Face, b: Face) -> bool {
    let a = Move::new(a, 1);
    let b = Move::new(b, 1);
    CubeState::SOLVED.apply(a).apply(b) == CubeState::SOLVED.apply(b).apply(a)
}

impl Default for CanonicalFSM {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalFSM {
    #[must_use]
    pub fn new() -> Self {
        let mut commutes = [FaceMask((1 << NUM_FACES) - 1); NUM_FACES];
        for (i, &face_1) in Face::ALL.iter().enumerate() {
            for (j, &face_2) in Face::ALL.iter().enumerate() {
                if !faces_commute(face_1, face_2) {
                    commutes[i].0 &= !(1 << j);
                    commutes[j].0 &= !(1 << i);
                }
            }
        }

        let mut next_state_lookup = vec![];
        let mut mask_to_state = HashMap::new();
        mask_to_state.insert(FaceMask(0), CanonicalFSMState(0));
        // Indexed by state ordinal: the faces turned so far that no later
        // non-commuting turn has cancelled out
        let mut state_to_mask = vec![FaceMask(0)];

        let mut queue_index = 0;
        while queue_index < state_to_mask.len() {
            let mut next_state = [ILLEGAL; NUM_FACES];
            let dequeued_mask = state_to_mask[queue_index];
            queue_index += 1;

            for face_index in 0..NUM_FACES {
                // A greater face that commutes with this one has already been
                // turned, or this very face has
                if (dequeued_mask.0 & commutes[face_index].0) >> (face_index + 1) != 0
                    || (dequeued_mask.0 >> face_index) & 1 != 0
                {
                    continue;
                }

                let next_mask =
                    FaceMask((dequeued_mask.0 & commutes[face_index].0) | (1 << face_index));
                next_state[face_index] = *mask_to_state.entry(next_mask).or_insert_with(|| {
                    state_to_mask.push(next_mask);
                    CanonicalFSMState(state_to_mask.len() - 1)
                });
            }
            next_state_lookup.push(next_state);
        }

        Self { next_state_lookup }
    }

    /// The state after turning `face`, or `None` if that turn would make the
    /// sequence non-canonical.
    #[must_use]
    pub fn next_state(
        &self,
        current_fsm_state: CanonicalFSMState,
        face: Face,
    ) -> Option<CanonicalFSMState> {
        match self.next_state_lookup[current_fsm_state.0][face.index()] {
            ILLEGAL => None,
            state => Some(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::parse_moves;

    fn walk(canonical_fsm: &CanonicalFSM, moves: &str) -> Option<CanonicalFSMState> {
        parse_moves(moves)
            .unwrap()
            .iter()
            .try_fold(CanonicalFSMState::default(), |state, m| {
                canonical_fsm.next_state(state, m.face())
            })
    }

    #[test]
    fn test_canonical_fsm_initially_all_legal() {
        let canonical_fsm = CanonicalFSM::new();
        for face in Face::ALL {
            assert!(
                canonical_fsm
                    .next_state(CanonicalFSMState::default(), face)
                    .is_some()
            );
        }
    }

    #[test]
    fn test_canonical_fsm_prevents_self() {
        let canonical_fsm = CanonicalFSM::new();
        for face in Face::ALL {
            let after = canonical_fsm
                .next_state(CanonicalFSMState::default(), face)
                .unwrap();
            assert!(canonical_fsm.next_state(after, face).is_none());
        }
    }

    #[test]
    fn test_canonical_fsm_orders_opposite_faces() {
        let canonical_fsm = CanonicalFSM::new();
        for face_1 in Face::ALL {
            for face_2 in Face::ALL {
                if face_1 == face_2 {
                    continue;
                }
                let allows_2_after_1 = canonical_fsm
                    .next_state(
                        canonical_fsm
                            .next_state(CanonicalFSMState::default(), face_1)
                            .unwrap(),
                        face_2,
                    )
                    .is_some();
                if face_2 == face_1.opposite() {
                    // We expect a total ordering of commutative faces
                    assert_eq!(allows_2_after_1, face_1 < face_2);
                } else {
                    assert!(allows_2_after_1);
                }
            }
        }
    }

    #[test]
    fn test_walk() {
        let canonical_fsm = CanonicalFSM::new();
        assert!(walk(&canonical_fsm, "U D R L F B").is_some());
        assert!(walk(&canonical_fsm, "D U").is_none());
        assert!(walk(&canonical_fsm, "U D U").is_none());
        assert!(walk(&canonical_fsm, "R R2").is_none());
        assert!(walk(&canonical_fsm, "U R U").is_some());
    }
}
