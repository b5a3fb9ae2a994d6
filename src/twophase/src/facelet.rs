//! The 54-sticker description of a cube and its conversion to and from
//! [`CubeState`].
//!
//! Faces are listed in the order `U R F D L B`, nine stickers each, row by row
//! as seen when looking straight at the face with `U` (or `F`, for the `U`
//! and `D` faces) towards the top. The solved cube is
//! `UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB`.

use crate::{
    cube::{CubeState, InvariantViolation, NUM_CORNERS, NUM_EDGES},
    moves::Face,
};
use itertools::Itertools;
use thiserror::Error;

pub const NUM_FACELETS: usize = 54;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaceletError {
    #[error("Expected {NUM_FACELETS} facelets, got {0}")]
    WrongLength(usize),
    #[error("Unknown facelet label `{label}` at index {index}")]
    UnknownLabel { index: usize, label: char },
    #[error("Label `{label}` appears {count} times, expected 9")]
    BadColorCount { label: char, count: usize },
    #[error("Two centres share the label `{0}`")]
    DuplicateCentre(char),
    #[error("Not a reachable cube: {0}")]
    IllegalCube(#[from] InvariantViolation),
}

/// The facelets of each corner slot, clockwise starting from its `U` or `D`
/// sticker.
pub(crate) const CORNER_FACELETS: [[usize; 3]; NUM_CORNERS] = [
    [8, 9, 20],
    [6, 18, 38],
    [0, 36, 47],
    [2, 45, 11],
    [29, 26, 15],
    [27, 44, 24],
    [33, 53, 42],
    [35, 17, 51],
];

/// The colours of each corner piece, in the same order as its home slot's
/// facelets.
pub(crate) const CORNER_COLORS: [[Face; 3]; NUM_CORNERS] = {
    use Face::*;
    [
        [U, R, F],
        [U, F, L],
        [U, L, B],
        [U, B, R],
        [D, F, R],
        [D, L, F],
        [D, B, L],
        [D, R, B],
    ]
};

pub(crate) const EDGE_FACELETS: [[usize; 2]; NUM_EDGES] = [
    [5, 10],
    [7, 19],
    [3, 37],
    [1, 46],
    [32, 16],
    [28, 25],
    [30, 43],
    [34, 52],
    [23, 12],
    [21, 41],
    [50, 39],
    [48, 14],
];

pub(crate) const EDGE_COLORS: [[Face; 2]; NUM_EDGES] = {
    use Face::*;
    [
        [U, R],
        [U, F],
        [U, L],
        [U, B],
        [D, R],
        [D, F],
        [D, L],
        [D, B],
        [F, R],
        [F, L],
        [B, L],
        [B, R],
    ]
};

const fn centre(face: Face) -> usize {
    face.index() * 9 + 4
}

/// Decode a facelet string written with the face letters `URFDLB`.
///
/// # Errors
///
/// Fails on a wrong length, an unknown letter, a letter that does not appear
/// exactly nine times, or stickers that do not describe a reachable cube.
pub fn decode(facelets: &str) -> Result<CubeState, FaceletError> {
    let chars = facelets.trim().chars().collect_vec();
    if chars.len() != NUM_FACELETS {
        return Err(FaceletError::WrongLength(chars.len()));
    }
    let faces = chars
        .iter()
        .enumerate()
        .map(|(index, &label)| {
            Face::from_char(label).ok_or(FaceletError::UnknownLabel { index, label })
        })
        .collect::<Result<Vec<_>, _>>()?;
    from_faces(&faces)
}

/// Decode a facelet string written with arbitrary sticker symbols, one per
/// colour. Each face is identified by the symbol on its centre, so
/// `WWWWWWWWWRRRRRRRRRGGGGGGGGGYYYYYYYYYOOOOOOOOOBBBBBBBBB` is solved.
///
/// # Errors
///
/// As [`decode`], plus [`FaceletError::DuplicateCentre`] when two centres
/// carry the same symbol.
pub fn decode_colors(facelets: &str) -> Result<CubeState, FaceletError> {
    let chars = facelets.trim().chars().collect_vec();
    if chars.len() != NUM_FACELETS {
        return Err(FaceletError::WrongLength(chars.len()));
    }
    let centres = Face::ALL.map(|face| chars[centre(face)]);
    if let Some(dup) = centres.iter().duplicates().next() {
        return Err(FaceletError::DuplicateCentre(*dup));
    }
    let faces = chars
        .iter()
        .enumerate()
        .map(|(index, &label)| {
            centres
                .iter()
                .position(|&c| c == label)
                .map(|i| Face::ALL[i])
                .ok_or(FaceletError::UnknownLabel { index, label })
        })
        .collect::<Result<Vec<_>, _>>()?;
    from_faces(&faces)
}

pub(crate) fn from_faces(faces: &[Face]) -> Result<CubeState, FaceletError> {
    let counts = faces.iter().counts();
    for face in Face::ALL {
        let count = counts.get(&face).copied().unwrap_or(0);
        if count != 9 {
            return Err(FaceletError::BadColorCount {
                label: face.to_char(),
                count,
            });
        }
    }
    for face in Face::ALL {
        if faces[centre(face)] != face {
            return Err(InvariantViolation::MisplacedCentre { face }.into());
        }
    }

    let mut state = CubeState::SOLVED;
    for (slot, facelets) in CORNER_FACELETS.iter().enumerate() {
        let ori = (0..3)
            .find(|&k| matches!(faces[facelets[k]], Face::U | Face::D))
            .ok_or(InvariantViolation::UnrecognisedCorner { slot })?;
        let col1 = faces[facelets[(ori + 1) % 3]];
        let col2 = faces[facelets[(ori + 2) % 3]];
        let piece = CORNER_COLORS
            .iter()
            .position(|colors| colors[1] == col1 && colors[2] == col2)
            .ok_or(InvariantViolation::UnrecognisedCorner { slot })?;
        state.corner_positions[slot] = piece as u8;
        state.corner_orientations[slot] = ori as u8;
    }
    for (slot, facelets) in EDGE_FACELETS.iter().enumerate() {
        let stickers = [faces[facelets[0]], faces[facelets[1]]];
        let (piece, ori) = EDGE_COLORS
            .iter()
            .enumerate()
            .find_map(|(piece, colors)| {
                if stickers == *colors {
                    Some((piece, 0))
                } else if stickers == [colors[1], colors[0]] {
                    Some((piece, 1))
                } else {
                    None
                }
            })
            .ok_or(InvariantViolation::UnrecognisedEdge { slot })?;
        state.edge_positions[slot] = piece as u8;
        state.edge_orientations[slot] = ori;
    }

    state.verify()?;
    Ok(state)
}

pub(crate) fn to_faces(state: &CubeState) -> [Face; NUM_FACELETS] {
    let mut faces = [Face::U; NUM_FACELETS];
    for face in Face::ALL {
        faces[centre(face)] = face;
    }
    for (slot, facelets) in CORNER_FACELETS.iter().enumerate() {
        let piece = usize::from(state.corner_positions[slot]);
        let ori = usize::from(state.corner_orientations[slot]);
        for k in 0..3 {
            faces[facelets[(k + ori) % 3]] = CORNER_COLORS[piece][k];
        }
    }
    for (slot, facelets) in EDGE_FACELETS.iter().enumerate() {
        let piece = usize::from(state.edge_positions[slot]);
        let ori = usize::from(state.edge_orientations[slot]);
        for k in 0..2 {
            faces[facelets[(k + ori) % 2]] = EDGE_COLORS[piece][k];
        }
    }
    faces
}

/// The facelet string of a state, using the face letters `URFDLB`.
#[must_use]
pub fn encode(state: &CubeState) -> String {
    to_faces(state).iter().map(|face| face.to_char()).collect()
}
