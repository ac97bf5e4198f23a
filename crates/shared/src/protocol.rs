//! JSON shapes exchanged with the remote checkers service.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{Board, Move, Piece, Rank, Session, Side, Tally},
    error::DomainError,
};

pub const NEW_GAME_ROUTE: &str = "/new-game";
pub const MAKE_MOVE_ROUTE: &str = "/make-move";
pub const WIN_RECORD_ROUTE: &str = "/win-record";

/// Opaque single-token cell marker supplied by the service. Owner and rank
/// are looked up from the variant, never from the token's casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceMarker {
    #[serde(rename = "")]
    Empty,
    #[serde(rename = "r")]
    HumanRegular,
    #[serde(rename = "R")]
    HumanKing,
    #[serde(rename = "b")]
    OpponentRegular,
    #[serde(rename = "B")]
    OpponentKing,
}

impl From<PieceMarker> for Option<Piece> {
    fn from(marker: PieceMarker) -> Self {
        match marker {
            PieceMarker::Empty => None,
            PieceMarker::HumanRegular => Some(Piece::new(Side::Human, Rank::Regular)),
            PieceMarker::HumanKing => Some(Piece::new(Side::Human, Rank::King)),
            PieceMarker::OpponentRegular => Some(Piece::new(Side::Opponent, Rank::Regular)),
            PieceMarker::OpponentKing => Some(Piece::new(Side::Opponent, Rank::King)),
        }
    }
}

impl From<Option<Piece>> for PieceMarker {
    fn from(cell: Option<Piece>) -> Self {
        match cell.map(|piece| (piece.owner, piece.rank)) {
            None => PieceMarker::Empty,
            Some((Side::Human, Rank::Regular)) => PieceMarker::HumanRegular,
            Some((Side::Human, Rank::King)) => PieceMarker::HumanKing,
            Some((Side::Opponent, Rank::Regular)) => PieceMarker::OpponentRegular,
            Some((Side::Opponent, Rank::King)) => PieceMarker::OpponentKing,
        }
    }
}

/// A `null` cell is read as empty, same as `""`.
impl TryFrom<Vec<Vec<Option<PieceMarker>>>> for Board {
    type Error = DomainError;

    fn try_from(rows: Vec<Vec<Option<PieceMarker>>>) -> Result<Self, Self::Error> {
        Board::from_rows(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| cell.unwrap_or(PieceMarker::Empty))
                        .collect()
                })
                .collect(),
        )
    }
}

impl From<Board> for Vec<Vec<PieceMarker>> {
    fn from(board: Board) -> Self {
        board.to_rows()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateWire {
    pub board: Board,
    pub current_turn: Side,
    pub game_over: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_winner",
        skip_serializing_if = "Option::is_none"
    )]
    pub winner: Option<Side>,
}

/// `"draw"` and the empty string both mean "no winner".
fn deserialize_winner<'de, D>(deserializer: D) -> Result<Option<Side>, D::Error>
where
    D: Deserializer<'de>,
{
    let token: Option<String> = Option::deserialize(deserializer)?;
    match token.as_deref() {
        None | Some("") | Some("draw") => Ok(None),
        Some(other) => Side::from_wire(other)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(DomainError::UnknownWinner(other.to_string()))),
    }
}

impl From<GameStateWire> for Session {
    fn from(wire: GameStateWire) -> Self {
        Session {
            board: wire.board,
            current_turn: wire.current_turn,
            game_over: wire.game_over,
            winner: wire.winner,
        }
    }
}

impl From<Session> for GameStateWire {
    fn from(session: Session) -> Self {
        GameStateWire {
            board: session.board,
            current_turn: session.current_turn,
            game_over: session.game_over,
            winner: session.winner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeMoveRequest {
    #[serde(rename = "move")]
    pub mv: Move,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveResponse {
    pub game_state: GameStateWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl From<WinRecord> for Tally {
    fn from(record: WinRecord) -> Self {
        Tally {
            wins: record.wins,
            losses: record.losses,
            draws: record.draws,
        }
    }
}

impl From<Tally> for WinRecord {
    fn from(tally: Tally) -> Self {
        WinRecord {
            wins: tally.wins,
            losses: tally.losses,
            draws: tally.draws,
        }
    }
}
