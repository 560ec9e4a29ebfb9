use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid move string at position {position}: {reason}")]
    ParseMove { position: usize, reason: String },
    #[error("invalid board layout: {reason}")]
    ParseBoard { reason: String },
    #[error("piece at row {row}, column {col} is floating above an empty cell")]
    FloatingPiece { row: usize, col: usize },
    #[error("column {column} is full")]
    ColumnFull { column: usize },
    #[error("column {column} is out of bounds")]
    ColumnOutOfBounds { column: usize },
    #[error("no legal moves remain")]
    NoMoves,
    #[error("depth {0} is out of range")]
    DepthOutOfRange(u8),
    #[error("the game is already over")]
    GameOver,
    #[error("it is not the AI's turn")]
    NotAiTurn,
    #[error("the side to move must be the player or the AI")]
    InvalidSide,
    #[error("unknown difficulty {0:?} (expected easy, medium or hard)")]
    UnknownDifficulty(String),
}
