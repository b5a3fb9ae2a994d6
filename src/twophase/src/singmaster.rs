//! Singmaster cubie notation: twenty tokens, one per slot in the order
//! `UF UR UB UL DF DR DB DL FR FL BR BL UFR URB UBL ULF DRF DFL DLB DBR`, each
//! naming the colour showing on each of the slot's faces in the slot's own
//! face order. The solved cube is written exactly as that slot list.

use crate::{
    cube::CubeState,
    facelet::{
        CORNER_COLORS, CORNER_FACELETS, EDGE_COLORS, EDGE_FACELETS, FaceletError, from_faces,
        to_faces,
    },
    moves::Face,
};
use itertools::Itertools;
use std::sync::LazyLock;
use thiserror::Error;

pub const SLOTS: [&str; 20] = [
    "UF", "UR", "UB", "UL", "DF", "DR", "DB", "DL", "FR", "FL", "BR", "BL", "UFR", "URB", "UBL",
    "ULF", "DRF", "DFL", "DLB", "DBR",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SingmasterError {
    #[error("Expected {n} cubies, got {0}", n = SLOTS.len())]
    WrongCubieCount(usize),
    #[error("Cubie `{token}` does not fit slot {slot}")]
    UnknownCubie { slot: &'static str, token: String },
    #[error(transparent)]
    IllegalCube(#[from] FaceletError),
}

/// For every slot of [`SLOTS`], the facelet index of each of its faces.
static SLOT_FACELETS: LazyLock<Vec<Vec<usize>>> = LazyLock::new(|| {
    SLOTS
        .iter()
        .map(|slot| {
            let faces = slot.chars().filter_map(Face::from_char).collect_vec();
            let facelet_of = |colors: &[Face], facelets: &[usize]| {
                faces
                    .iter()
                    .filter_map(|face| colors.iter().position(|c| c == face))
                    .map(|i| facelets[i])
                    .collect_vec()
            };
            let same_faces = |colors: &[Face]| faces.iter().all(|face| colors.contains(face));
            if faces.len() == 2 {
                let home = EDGE_COLORS
                    .iter()
                    .position(|colors| same_faces(colors))
                    .unwrap_or_default();
                facelet_of(&EDGE_COLORS[home], &EDGE_FACELETS[home])
            } else {
                let home = CORNER_COLORS
                    .iter()
                    .position(|colors| same_faces(colors))
                    .unwrap_or_default();
                facelet_of(&CORNER_COLORS[home], &CORNER_FACELETS[home])
            }
        })
        .collect()
});

/// Parse a cube written in Singmaster cubie notation.
///
/// # Errors
///
/// Fails on a wrong number of tokens, a token of the wrong size or with a
/// letter that is not a face, or a description of an unreachable cube.
pub fn parse_singmaster(s: &str) -> Result<CubeState, SingmasterError> {
    let tokens = s.split_whitespace().collect_vec();
    if tokens.len() != SLOTS.len() {
        return Err(SingmasterError::WrongCubieCount(tokens.len()));
    }

    let mut faces = to_faces(&CubeState::SOLVED);
    for ((&slot, token), facelets) in SLOTS.iter().zip(tokens).zip(SLOT_FACELETS.iter()) {
        let unknown = || SingmasterError::UnknownCubie {
            slot,
            token: token.to_owned(),
        };
        let colors = token
            .chars()
            .map(Face::from_char)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unknown)?;
        if colors.len() != facelets.len() {
            return Err(unknown());
        }
        for (&facelet, color) in facelets.iter().zip(colors) {
            faces[facelet] = color;
        }
    }

    Ok(from_faces(&faces)?)
}

/// Write a state in Singmaster cubie notation.
#[must_use]
pub fn to_singmaster(state: &CubeState) -> String {
    let faces = to_faces(state);
    SLOT_FACELETS
        .iter()
        .map(|facelets| {
            facelets
                .iter()
                .map(|&facelet| faces[facelet].to_char())
                .collect::<String>()
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{facelet::encode, moves::parse_moves};

    const SOLVED: &str = "UF UR UB UL DF DR DB DL FR FL BR BL UFR URB UBL ULF DRF DFL DLB DBR";

    #[test]
    fn test_solved() {
        assert_eq!(parse_singmaster(SOLVED).unwrap(), CubeState::SOLVED);
        assert_eq!(to_singmaster(&CubeState::SOLVED), SOLVED);
        assert!(SLOT_FACELETS.iter().all(|f| f.len() >= 2));
    }

    #[test]
    fn test_single_u_turn() {
        let state = CubeState::SOLVED.apply_moves(&parse_moves("U").unwrap());
        // The UF slot now holds the old UR edge
        let singmaster = to_singmaster(&state);
        assert!(singmaster.starts_with("UR UB UL UF "), "{singmaster}");
        assert_eq!(parse_singmaster(&singmaster).unwrap(), state);
    }

    #[test]
    fn test_round_trip_through_facelets() {
        let state = CubeState::SOLVED.apply_moves(
            &parse_moves("R L2 U2 D2 R2 U2 R' D2 R' F' R L2 B R2 L' F' B2 U' D' F B2 U R' L2")
                .unwrap(),
        );
        let singmaster = to_singmaster(&state);
        let parsed = parse_singmaster(&singmaster).unwrap();
        assert_eq!(encode(&parsed), encode(&state));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_singmaster("UF UR"),
            Err(SingmasterError::WrongCubieCount(2))
        );
        assert_eq!(
            SingmasterError::WrongCubieCount(2).to_string(),
            "Expected 20 cubies, got 2"
        );
        assert!(matches!(
            parse_singmaster(&SOLVED.replace("UFR", "UFX")),
            Err(SingmasterError::UnknownCubie { slot: "UFR", .. })
        ));
        assert!(matches!(
            parse_singmaster(&SOLVED.replacen("UF", "FU", 1)),
            Err(SingmasterError::IllegalCube(FaceletError::IllegalCube(_)))
        ));
    }
}
