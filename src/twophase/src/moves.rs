//! Face turns and move sequences in standard notation.

use itertools::Itertools;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The six faces, in the facelet order `U R F D L B`. A face and its opposite
/// are always three apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Self; 6] = {
        use Face::*;
        let v = [U, R, F, D, L, B];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self as usize + 3) % 6]
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'U' | 'u' => Some(Face::U),
            'R' | 'r' => Some(Face::R),
            'F' | 'f' => Some(Face::F),
            'D' | 'd' => Some(Face::D),
            'L' | 'l' => Some(Face::L),
            'B' | 'b' => Some(Face::B),
            _ => None,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// One of the 18 face turns: a face and a number of clockwise quarter turns
/// in `1..=3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    face: Face,
    turns: u8,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("Empty move token")]
    Empty,
    #[error("Unknown face `{0}`")]
    UnknownFace(char),
    #[error("Unknown turn suffix `{suffix}` in move `{token}`")]
    UnknownSuffix { token: String, suffix: String },
}

impl Move {
    /// All 18 moves ordered by face then by quarter turns, so that
    /// `Move::ALL[m.index()] == m`.
    pub const ALL: [Self; 18] = {
        let mut arr = [Move {
            face: Face::U,
            turns: 1,
        }; 18];
        let mut i = 0;
        while i < arr.len() {
            arr[i] = Move {
                face: Face::ALL[i / 3],
                turns: (i % 3) as u8 + 1,
            };
            i += 1;
        }
        arr
    };

    /// The ten moves that keep a cube inside `G1`: every turn of U and D, and
    /// half turns of the other four faces.
    pub const PHASE2: [Self; 10] = {
        use Face::*;
        [
            Move::new(U, 1),
            Move::new(U, 2),
            Move::new(U, 3),
            Move::new(R, 2),
            Move::new(F, 2),
            Move::new(D, 1),
            Move::new(D, 2),
            Move::new(D, 3),
            Move::new(L, 2),
            Move::new(B, 2),
        ]
    };

    /// # Panics
    ///
    /// Panics if `turns` is not in `1..=3`.
    #[must_use]
    pub const fn new(face: Face, turns: u8) -> Self {
        assert!(matches!(turns, 1..=3));
        Move { face, turns }
    }

    #[must_use]
    pub const fn face(self) -> Face {
        self.face
    }

    #[must_use]
    pub const fn turns(self) -> u8 {
        self.turns
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.face as usize * 3 + self.turns as usize - 1
    }

    #[must_use]
    pub const fn inverse(self) -> Self {
        Move {
            face: self.face,
            turns: 4 - self.turns,
        }
    }

    /// Whether this move is one of the [`Move::PHASE2`] generators.
    #[must_use]
    pub const fn preserves_g1(self) -> bool {
        matches!(self.face, Face::U | Face::D) || self.turns == 2
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turns {
            1 => write!(f, "{}", self.face),
            2 => write!(f, "{}2", self.face),
            _ => write!(f, "{}'", self.face),
        }
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let first = chars.next().ok_or(MoveParseError::Empty)?;
        let face = Face::from_char(first).ok_or(MoveParseError::UnknownFace(first))?;
        // `R1` and `R3` are what the native solver prints
        let turns = match chars.as_str() {
            "" | "1" => 1,
            "2" | "2'" => 2,
            "'" | "3" => 3,
            suffix => {
                return Err(MoveParseError::UnknownSuffix {
                    token: s.to_owned(),
                    suffix: suffix.to_owned(),
                });
            }
        };
        Ok(Move { face, turns })
    }
}

/// Parse a whitespace separated move sequence such as `R U' F2`.
///
/// # Errors
///
/// Fails on the first token that is not a move.
pub fn parse_moves(s: &str) -> Result<Vec<Move>, MoveParseError> {
    s.split_whitespace().map(str::parse).collect()
}

/// Format a move sequence with single spaces between moves.
#[must_use]
pub fn format_moves(moves: &[Move]) -> String {
    moves.iter().join(" ")
}

/// The sequence that undoes `moves`.
#[must_use]
pub fn invert(moves: &[Move]) -> Vec<Move> {
    moves.iter().rev().map(|m| m.inverse()).collect()
}

/// Merge adjacent turns of the same face until none are left. Turns that
/// cancel out are dropped, which may bring two more same-face turns together,
/// so a single pass over a stack is enough.
#[must_use]
pub fn simplify(moves: &[Move]) -> Vec<Move> {
    let mut simplified: Vec<Move> = Vec::with_capacity(moves.len());
    for &move_ in moves {
        match simplified.last() {
            Some(last) if last.face == move_.face => {
                let turns = (last.turns + move_.turns) % 4;
                simplified.pop();
                if turns != 0 {
                    simplified.push(Move::new(move_.face, turns));
                }
            }
            _ => simplified.push(move_),
        }
    }
    simplified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_moves_are_indexed_in_order() {
        for (i, move_) in Move::ALL.iter().enumerate() {
            assert_eq!(move_.index(), i);
        }
        assert_eq!(Move::ALL[0].to_string(), "U");
        assert_eq!(Move::ALL[17].to_string(), "B'");
    }

    #[test]
    fn test_opposite_faces() {
        assert_eq!(Face::U.opposite(), Face::D);
        assert_eq!(Face::R.opposite(), Face::L);
        assert_eq!(Face::F.opposite(), Face::B);
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn test_phase2_moves_preserve_g1() {
        assert_eq!(
            Move::ALL.iter().filter(|m| m.preserves_g1()).count(),
            Move::PHASE2.len()
        );
        assert!(Move::PHASE2.iter().all(|m| m.preserves_g1()));
    }

    #[test]
    fn test_parse_and_display() {
        let moves = parse_moves("R U' F2 D1 L3  B").unwrap();
        assert_eq!(format_moves(&moves), "R U' F2 D L' B");
        assert_eq!("X".parse::<Move>(), Err(MoveParseError::UnknownFace('X')));
        assert!(matches!(
            "R4".parse::<Move>(),
            Err(MoveParseError::UnknownSuffix { .. })
        ));
        assert_eq!(parse_moves("").unwrap(), vec![]);
    }

    #[test]
    fn test_invert() {
        let moves = parse_moves("R U' F2").unwrap();
        assert_eq!(format_moves(&invert(&moves)), "F2 U R'");
    }

    #[test]
    fn test_simplify() {
        let moves = parse_moves("R R U U2 D D' L2 L2 F").unwrap();
        assert_eq!(format_moves(&simplify(&moves)), "R2 U' F");
        let moves = parse_moves("R U U' R'").unwrap();
        assert!(simplify(&moves).is_empty());
    }
}
