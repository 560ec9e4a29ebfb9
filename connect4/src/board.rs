//! Gravity-drop grid, win detection and the textual formats used to feed
//! positions into the engine.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const WIDTH: usize = 7;
pub const HEIGHT: usize = 6;
pub const WINDOW_LEN: usize = 4;
pub const CENTER_COLUMN: usize = WIDTH / 2;
const MAX_CELLS: usize = WIDTH * HEIGHT;

/// `(row, col)` with row 0 at the bottom.
pub type Cell = (usize, usize);
pub type Window = [Cell; WINDOW_LEN];

/// Every in-bounds window of four, in win-reporting scan order.
pub(crate) static WINDOWS: Lazy<Vec<Window>> = Lazy::new(generate_windows);

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    #[default]
    Empty,
    Player,
    Ai,
}

impl Piece {
    pub fn opponent(self) -> Piece {
        match self {
            Piece::Player => Piece::Ai,
            Piece::Ai => Piece::Player,
            Piece::Empty => Piece::Empty,
        }
    }

    fn symbol(self) -> char {
        match self {
            Piece::Empty => '.',
            Piece::Player => 'P',
            Piece::Ai => 'A',
        }
    }

    fn from_symbol(symbol: char) -> Option<Piece> {
        match symbol {
            '.' => Some(Piece::Empty),
            'P' | 'p' => Some(Piece::Player),
            'A' | 'a' => Some(Piece::Ai),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Board {
    cells: [[Piece; WIDTH]; HEIGHT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, col: usize) -> Piece {
        self.cells[row][col]
    }

    pub fn is_valid_column(&self, col: usize) -> bool {
        debug_assert!(col < WIDTH, "column {col} out of range");
        self.cells[HEIGHT - 1][col] == Piece::Empty
    }

    /// Lowest empty row of `col`, or `None` when the column is full.
    pub fn next_open_row(&self, col: usize) -> Option<usize> {
        (0..HEIGHT).find(|&row| self.cells[row][col] == Piece::Empty)
    }

    /// Unchecked placement; the caller supplies the landing row.
    pub fn drop_piece(&mut self, row: usize, col: usize, piece: Piece) {
        debug_assert_eq!(self.cells[row][col], Piece::Empty);
        debug_assert_eq!(self.next_open_row(col), Some(row));
        self.cells[row][col] = piece;
    }

    /// Checked drop for drivers. Returns the landing row.
    pub fn play(&mut self, column: usize, piece: Piece) -> Result<usize, GameError> {
        if column >= WIDTH {
            return Err(GameError::ColumnOutOfBounds { column });
        }
        let row = self
            .next_open_row(column)
            .ok_or(GameError::ColumnFull { column })?;
        self.drop_piece(row, column, piece);
        Ok(row)
    }

    pub fn valid_columns(&self) -> Vec<usize> {
        (0..WIDTH).filter(|&col| self.is_valid_column(col)).collect()
    }

    pub fn is_full(&self) -> bool {
        (0..WIDTH).all(|col| !self.is_valid_column(col))
    }

    pub fn move_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&piece| piece != Piece::Empty)
            .count()
    }

    /// First line of four `piece`s in scan order: horizontal, vertical,
    /// positive diagonal, negative diagonal.
    pub fn winning_cells(&self, piece: Piece) -> Option<Window> {
        if piece == Piece::Empty {
            return None;
        }
        WINDOWS
            .iter()
            .find(|window| window.iter().all(|&(row, col)| self.cells[row][col] == piece))
            .copied()
    }

    pub fn has_won(&self, piece: Piece) -> bool {
        self.winning_cells(piece).is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.has_won(Piece::Player) || self.has_won(Piece::Ai) || self.is_full()
    }

    pub(crate) fn window(&self, window: &Window) -> [Piece; WINDOW_LEN] {
        window.map(|(row, col)| self.cells[row][col])
    }

    pub fn from_history(moves: &[TypedMove]) -> Result<Self, GameError> {
        let mut board = Self::new();
        for mv in moves {
            board.play(mv.column, mv.piece)?;
        }
        Ok(board)
    }

    /// Rows top-to-bottom joined with `/`, the inverse of `FromStr`.
    pub fn layout(&self) -> String {
        (0..HEIGHT)
            .rev()
            .map(|row| self.cells[row].iter().map(|p| p.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..HEIGHT).rev() {
            for piece in &self.cells[row] {
                write!(f, "{}", piece.symbol())?;
            }
            writeln!(f)?;
        }
        for col in 0..WIDTH {
            write!(f, "{col}")?;
        }
        writeln!(f)
    }
}

impl FromStr for Board {
    type Err = GameError;

    fn from_str(layout: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = layout.trim().split('/').collect();
        if rows.len() != HEIGHT {
            return Err(GameError::ParseBoard {
                reason: format!("expected {HEIGHT} rows, found {}", rows.len()),
            });
        }
        let mut board = Board::new();
        for (idx, line) in rows.iter().enumerate() {
            let row = HEIGHT - 1 - idx;
            let symbols: Vec<char> = line.trim().chars().collect();
            if symbols.len() != WIDTH {
                return Err(GameError::ParseBoard {
                    reason: format!("row {row} has {} cells, expected {WIDTH}", symbols.len()),
                });
            }
            for (col, &symbol) in symbols.iter().enumerate() {
                board.cells[row][col] =
                    Piece::from_symbol(symbol).ok_or_else(|| GameError::ParseBoard {
                        reason: format!("unexpected cell {symbol:?} at row {row}, column {col}"),
                    })?;
            }
        }
        for col in 0..WIDTH {
            for row in 1..HEIGHT {
                if board.cells[row][col] != Piece::Empty
                    && board.cells[row - 1][col] == Piece::Empty
                {
                    return Err(GameError::FloatingPiece { row, col });
                }
            }
        }
        Ok(board)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedMove {
    pub piece: Piece,
    pub column: usize,
}

/// Parses a history such as `P3A3P2` (`P` = player, `A` = AI).
pub fn parse_history(history: &str) -> Result<Vec<TypedMove>, GameError> {
    let chars: Vec<char> = history.trim().chars().collect();
    if chars.len() > 2 * MAX_CELLS {
        return Err(GameError::ParseMove {
            position: 2 * MAX_CELLS,
            reason: format!("more than {MAX_CELLS} moves"),
        });
    }
    let mut moves = Vec::with_capacity(chars.len() / 2);
    let mut idx = 0;
    while idx < chars.len() {
        let side = chars[idx];
        let piece = match Piece::from_symbol(side) {
            Some(piece) if piece != Piece::Empty => piece,
            _ => {
                return Err(GameError::ParseMove {
                    position: idx,
                    reason: format!("expected P or A, found {side}"),
                })
            }
        };
        idx += 1;
        let Some(&column_char) = chars.get(idx) else {
            return Err(GameError::ParseMove {
                position: idx,
                reason: "missing column number".to_string(),
            });
        };
        let column = match column_char.to_digit(10) {
            Some(digit) => digit as usize,
            None => {
                return Err(GameError::ParseMove {
                    position: idx,
                    reason: format!("expected column digit, found {column_char}"),
                })
            }
        };
        if column >= WIDTH {
            return Err(GameError::ParseMove {
                position: idx,
                reason: format!("column must be 0-{}", WIDTH - 1),
            });
        }
        moves.push(TypedMove { piece, column });
        idx += 1;
    }
    Ok(moves)
}

fn generate_windows() -> Vec<Window> {
    let mut windows = Vec::new();
    // Horizontal
    for col in 0..=WIDTH - WINDOW_LEN {
        for row in 0..HEIGHT {
            windows.push(std::array::from_fn(|i| (row, col + i)));
        }
    }
    // Vertical
    for col in 0..WIDTH {
        for row in 0..=HEIGHT - WINDOW_LEN {
            windows.push(std::array::from_fn(|i| (row + i, col)));
        }
    }
    // Diagonal /
    for col in 0..=WIDTH - WINDOW_LEN {
        for row in 0..=HEIGHT - WINDOW_LEN {
            windows.push(std::array::from_fn(|i| (row + i, col + i)));
        }
    }
    // Diagonal \
    for col in 0..=WIDTH - WINDOW_LEN {
        for row in WINDOW_LEN - 1..HEIGHT {
            windows.push(std::array::from_fn(|i| (row - i, col + i)));
        }
    }
    windows
}
