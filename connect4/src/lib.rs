//! Connect 4 engine with minimax, alpha-beta pruning and a transposition cache.
//! Positions come in as move histories (e.g. `P3A3P2`) or board layouts; the
//! AI is always the maximizing side and scores are positive when it is ahead.
//! [`best_move`] is the stateless entry point, [`Game`] keeps a session with
//! its own cache.
use serde::{Deserialize, Serialize};

pub mod board;
pub mod cache;
pub mod error;
pub mod eval;
pub mod game;
pub mod search;

pub use board::{parse_history, Board, Cell, Piece, TypedMove, Window, HEIGHT, WIDTH};
pub use cache::{Bound, CacheEntry, NodeKey, TranspositionCache};
pub use error::GameError;
pub use eval::{evaluate_window, score_position};
pub use game::{Difficulty, Game, GameStatus, MoveOutcome};
pub use search::{decide, exhaustive_minimax, minimax, Decision, Evaluation, WIN_SCORE};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub position: String,
    pub depth: u8,
    /// Defaults to the opponent of the last mover, or the AI on an empty history.
    #[serde(default)]
    pub to_move: Option<Piece>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub column: usize,
    pub score: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    InProgress,
    Won,
    Draw,
}

/// Serializable summary of a position, for drivers that highlight wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStatus {
    pub status: StatusKind,
    pub winner: Option<Piece>,
    pub cells: Vec<Cell>,
    pub valid_columns: Vec<usize>,
    pub board: String,
}

pub fn best_move(request: MoveRequest) -> Result<MoveResponse, GameError> {
    if request.depth == 0 {
        return Err(GameError::DepthOutOfRange(request.depth));
    }
    let moves = parse_history(&request.position)?;
    let board = Board::from_history(&moves)?;
    let to_move = match request.to_move {
        Some(Piece::Empty) => return Err(GameError::InvalidSide),
        Some(piece) => piece,
        None => moves
            .last()
            .map(|mv| mv.piece.opponent())
            .unwrap_or(Piece::Ai),
    };

    let mut cache = TranspositionCache::new();
    let decision = decide(
        &board,
        request.depth,
        to_move,
        &mut cache,
        &mut rand::thread_rng(),
    )?;
    Ok(MoveResponse {
        column: decision.column,
        score: decision.score,
    })
}

pub fn board_status(position: &str) -> Result<BoardStatus, GameError> {
    let board = Board::from_history(&parse_history(position)?)?;
    let (status, winner, cells) = match GameStatus::of(&board) {
        GameStatus::InProgress => (StatusKind::InProgress, None, Vec::new()),
        GameStatus::Draw => (StatusKind::Draw, None, Vec::new()),
        GameStatus::Won { piece, cells } => (StatusKind::Won, Some(piece), cells.to_vec()),
    };
    Ok(BoardStatus {
        status,
        winner,
        cells,
        valid_columns: board.valid_columns(),
        board: board.layout(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_depth() {
        let res = best_move(MoveRequest {
            position: "".to_string(),
            depth: 0,
            to_move: None,
        });
        assert!(matches!(res, Err(GameError::DepthOutOfRange(0))));
    }

    #[test]
    fn rejects_empty_side() {
        let res = best_move(MoveRequest {
            position: "P3".to_string(),
            depth: 2,
            to_move: Some(Piece::Empty),
        });
        assert_eq!(res, Err(GameError::InvalidSide));
    }

    #[test]
    fn opens_in_the_center() {
        let res = best_move(MoveRequest {
            position: "".to_string(),
            depth: 4,
            to_move: None,
        })
        .unwrap();
        assert_eq!(res, MoveResponse { column: 3, score: 12 });
    }

    #[test]
    fn choose_blocking_move() {
        let res = best_move(MoveRequest {
            // The player threatens a horizontal four on the bottom row.
            position: "P0A6P1A6P2".to_string(),
            depth: 4,
            to_move: None,
        })
        .unwrap();
        assert_eq!(res.column, 3);
    }

    #[test]
    fn plays_for_the_player_when_asked() {
        // The player completes the bottom row instead of the AI blocking it.
        let res = best_move(MoveRequest {
            position: "P0A6P1A6P2A5".to_string(),
            depth: 2,
            to_move: Some(Piece::Player),
        })
        .unwrap();
        assert_eq!(res, MoveResponse { column: 3, score: -WIN_SCORE });
    }

    #[test]
    fn full_column_in_history_is_an_error() {
        let res = best_move(MoveRequest {
            position: "P0A0P0A0P0A0P0".to_string(),
            depth: 2,
            to_move: None,
        });
        assert_eq!(res, Err(GameError::ColumnFull { column: 0 }));
    }

    #[test]
    fn status_of_won_position() {
        let status = board_status("P1A1P2A2P3A3P4").unwrap();
        assert_eq!(status.status, StatusKind::Won);
        assert_eq!(status.winner, Some(Piece::Player));
        assert_eq!(status.cells, vec![(0, 1), (0, 2), (0, 3), (0, 4)]);
        assert_eq!(status.valid_columns.len(), WIDTH);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(board_status("").unwrap()).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["winner"], serde_json::Value::Null);
        assert_eq!(json["valid_columns"].as_array().unwrap().len(), WIDTH);
    }

    #[test]
    fn request_deserializes_without_side() {
        let req: MoveRequest =
            serde_json::from_str(r#"{"position":"P3","depth":2}"#).unwrap();
        assert_eq!(req.to_move, None);
        let req: MoveRequest =
            serde_json::from_str(r#"{"position":"","depth":2,"to_move":"ai"}"#).unwrap();
        assert_eq!(req.to_move, Some(Piece::Ai));
    }
}
