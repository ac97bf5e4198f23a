use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::DomainError, protocol::PieceMarker};

pub const BOARD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawCoordinate {
    row: i64,
    col: i64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = DomainError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::from_signed(raw.row, raw.col)
    }
}

impl Coordinate {
    pub fn new(row: u8, col: u8) -> Result<Self, DomainError> {
        Self::from_signed(i64::from(row), i64::from(col))
    }

    pub fn from_signed(row: i64, col: i64) -> Result<Self, DomainError> {
        let in_range = |v: i64| (0..BOARD_SIZE as i64).contains(&v);
        if !in_range(row) || !in_range(col) {
            return Err(DomainError::CoordinateOutOfRange { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn row_distance(self, other: Coordinate) -> u8 {
        self.row.abs_diff(other.row)
    }

    pub fn col_distance(self, other: Coordinate) -> u8 {
        self.col.abs_diff(other.col)
    }

    /// Playable squares in checkers; the light squares never hold a piece.
    pub fn is_dark_square(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Coordinate { row, col }))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Which player a piece or turn belongs to. On the wire the human is
/// `"player"` and the remote opponent is `"bot"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "player")]
    Human,
    #[serde(rename = "bot")]
    Opponent,
}

impl Side {
    pub fn from_wire(token: &str) -> Result<Self, DomainError> {
        match token {
            "player" => Ok(Side::Human),
            "bot" => Ok(Side::Opponent),
            other => Err(DomainError::UnknownSide(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Regular,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub owner: Side,
    pub rank: Rank,
}

impl Piece {
    pub const fn new(owner: Side, rank: Rank) -> Self {
        Self { owner, rank }
    }

    pub const fn regular(owner: Side) -> Self {
        Self::new(owner, Rank::Regular)
    }

    pub const fn king(owner: Side) -> Self {
        Self::new(owner, Rank::King)
    }

    pub fn is_king(self) -> bool {
        self.rank == Rank::King
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<Option<PieceMarker>>>",
    into = "Vec<Vec<PieceMarker>>"
)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Human pieces on rows 0-2, opponent pieces on rows 5-7, dark squares only.
    pub fn starting_position() -> Self {
        let mut board = Self::empty();
        for coord in Coordinate::all().filter(|c| c.is_dark_square()) {
            match coord.row() {
                0..=2 => board.set(coord, Some(Piece::regular(Side::Human))),
                5..=7 => board.set(coord, Some(Piece::regular(Side::Opponent))),
                _ => {}
            }
        }
        board
    }

    pub fn piece_at(&self, coord: Coordinate) -> Option<Piece> {
        self.cells[coord.row() as usize][coord.col() as usize]
    }

    pub fn is_occupied(&self, coord: Coordinate) -> bool {
        self.piece_at(coord).is_some()
    }

    pub fn is_owned_by(&self, coord: Coordinate, side: Side) -> bool {
        self.piece_at(coord).is_some_and(|piece| piece.owner == side)
    }

    pub fn set(&mut self, coord: Coordinate, piece: Option<Piece>) {
        self.cells[coord.row() as usize][coord.col() as usize] = piece;
    }

    pub fn with_piece(mut self, coord: Coordinate, piece: Piece) -> Self {
        self.set(coord, Some(piece));
        self
    }

    pub fn cells(&self) -> impl Iterator<Item = (Coordinate, Option<Piece>)> + '_ {
        Coordinate::all().map(move |coord| (coord, self.piece_at(coord)))
    }

    pub fn count(&self, side: Side) -> usize {
        self.cells()
            .filter(|(_, piece)| piece.is_some_and(|p| p.owner == side))
            .count()
    }

    pub(crate) fn from_rows(rows: Vec<Vec<PieceMarker>>) -> Result<Self, DomainError> {
        if rows.len() != BOARD_SIZE {
            return Err(DomainError::BoardRowCount {
                expected: BOARD_SIZE,
                actual: rows.len(),
            });
        }
        let mut board = Self::empty();
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != BOARD_SIZE {
                return Err(DomainError::BoardRowWidth {
                    row: row_index,
                    expected: BOARD_SIZE,
                    actual: row.len(),
                });
            }
            for (col_index, marker) in row.into_iter().enumerate() {
                board.cells[row_index][col_index] = marker.into();
            }
        }
        Ok(board)
    }

    pub(crate) fn to_rows(&self) -> Vec<Vec<PieceMarker>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| PieceMarker::from(*cell)).collect())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Coordinate,
    pub to: Coordinate,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress { turn: Side },
    Won(Side),
    Draw,
}

/// Authoritative game view, exactly as last reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub board: Board,
    pub current_turn: Side,
    pub game_over: bool,
    pub winner: Option<Side>,
}

impl Session {
    pub fn accepts_human_input(&self) -> bool {
        !self.game_over && self.current_turn == Side::Human
    }

    pub fn outcome(&self) -> Outcome {
        match (self.game_over, self.winner) {
            (false, _) => Outcome::InProgress {
                turn: self.current_turn,
            },
            (true, Some(side)) => Outcome::Won(side),
            (true, None) => Outcome::Draw,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Tally {
    pub fn total(&self) -> u64 {
        u64::from(self.wins) + u64::from(self.losses) + u64::from(self.draws)
    }

    /// True when no counter went down relative to `earlier`.
    pub fn dominates(&self, earlier: &Tally) -> bool {
        self.wins >= earlier.wins && self.losses >= earlier.losses && self.draws >= earlier.draws
    }
}
