use crate::{cube::CubeState, moves::Move};

/// A random move sequence in which no move turns the same face as the move
/// before it.
#[must_use]
pub fn random_scramble(len: usize, rng: &mut fastrand::Rng) -> Vec<Move> {
    let mut scramble: Vec<Move> = Vec::with_capacity(len);
    while scramble.len() < len {
        let move_ = Move::ALL[rng.usize(..Move::ALL.len())];
        if scramble.last().is_some_and(|prev| prev.face() == move_.face()) {
            continue;
        }
        scramble.push(move_);
    }
    scramble
}

/// The state `random_scramble` leaves the solved cube in.
#[must_use]
pub fn random_state(len: usize, rng: &mut fastrand::Rng) -> CubeState {
    CubeState::SOLVED.apply_moves(&random_scramble(len, rng))
}
