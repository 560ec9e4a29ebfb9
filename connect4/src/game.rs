//! A game session: the board, whose turn it is, and the AI's cache. The
//! session owns the cache; it is cleared before every AI decision and when
//! a new game starts.
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Piece, Window};
use crate::cache::TranspositionCache;
use crate::error::GameError;
use crate::search::{decide, Decision};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn depth(self) -> u8 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 4,
            Difficulty::Hard => 6,
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won { piece: Piece, cells: Window },
    Draw,
}

impl GameStatus {
    pub fn of(board: &Board) -> Self {
        for piece in [Piece::Player, Piece::Ai] {
            if let Some(cells) = board.winning_cells(piece) {
                return GameStatus::Won { piece, cells };
            }
        }
        if board.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub piece: Piece,
    pub column: usize,
    pub row: usize,
    /// The completed line, if this move won the game.
    pub winning_cells: Option<Window>,
}

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    to_move: Piece,
    depth: u8,
    cache: TranspositionCache,
}

impl Game {
    pub fn new(difficulty: Difficulty, first: Piece) -> Self {
        Self::with_depth(difficulty.depth(), first)
    }

    /// # Panics
    /// If `depth` is zero or `first` is `Piece::Empty`.
    pub fn with_depth(depth: u8, first: Piece) -> Self {
        assert!(depth > 0, "search depth must be positive");
        assert_ne!(first, Piece::Empty, "an empty piece cannot move");
        Self {
            board: Board::new(),
            to_move: first,
            depth,
            cache: TranspositionCache::new(),
        }
    }

    /// Starts a game where a coin flip decides who moves first.
    pub fn with_random_first<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let first = if rng.gen_bool(0.5) {
            Piece::Player
        } else {
            Piece::Ai
        };
        Self::new(difficulty, first)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Piece {
        self.to_move
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.depth = difficulty.depth();
    }

    pub fn status(&self) -> GameStatus {
        GameStatus::of(&self.board)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops a piece for the side to move and passes the turn.
    pub fn play(&mut self, column: usize) -> Result<MoveOutcome, GameError> {
        if self.status().is_over() {
            return Err(GameError::GameOver);
        }
        let piece = self.to_move;
        let row = self.board.play(column, piece)?;
        let winning_cells = self.board.winning_cells(piece);
        self.to_move = piece.opponent();
        if winning_cells.is_some() {
            info!(?piece, column, "game won");
        }
        Ok(MoveOutcome {
            piece,
            column,
            row,
            winning_cells,
        })
    }

    /// Lets the AI search and play its move.
    pub fn play_ai<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(MoveOutcome, Decision), GameError> {
        if self.status().is_over() {
            return Err(GameError::GameOver);
        }
        if self.to_move != Piece::Ai {
            return Err(GameError::NotAiTurn);
        }
        let decision = decide(&self.board, self.depth, Piece::Ai, &mut self.cache, rng)?;
        let outcome = self.play(decision.column)?;
        Ok((outcome, decision))
    }

    pub fn new_game(&mut self, first: Piece) {
        assert_ne!(first, Piece::Empty, "an empty piece cannot move");
        debug!(entries = self.cache.len(), "starting a new game");
        self.board = Board::new();
        self.to_move = first;
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn difficulty_depths() {
        assert_eq!(Difficulty::Easy.depth(), 2);
        assert_eq!(Difficulty::Medium.depth(), 4);
        assert_eq!(Difficulty::Hard.depth(), 6);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn turns_alternate() {
        let mut game = Game::new(Difficulty::Easy, Piece::Player);
        let outcome = game.play(3).unwrap();
        assert_eq!(outcome.piece, Piece::Player);
        assert_eq!(outcome.row, 0);
        assert_eq!(game.to_move(), Piece::Ai);
        assert_eq!(game.board().get(0, 3), Piece::Player);
    }

    #[test]
    fn player_cannot_ask_the_ai_to_move() {
        let mut game = Game::new(Difficulty::Easy, Piece::Player);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(game.play_ai(&mut rng), Err(GameError::NotAiTurn)));
    }

    #[test]
    fn ai_blocks_and_game_reports_win() {
        let mut game = Game::new(Difficulty::Easy, Piece::Player);
        let mut rng = StdRng::seed_from_u64(5);
        game.play(0).unwrap();
        game.play(6).unwrap();
        game.play(1).unwrap();
        game.play(6).unwrap();
        game.play(2).unwrap();
        let (outcome, decision) = game.play_ai(&mut rng).unwrap();
        assert_eq!(outcome.column, 3);
        assert!(!decision.fell_back);
        assert!(game.cache_len() > 0);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn winning_move_ends_the_game() {
        let mut game = Game::new(Difficulty::Easy, Piece::Ai);
        for col in [0, 1, 0, 1, 0, 1] {
            game.play(col).unwrap();
        }
        let outcome = game.play(0).unwrap();
        assert_eq!(
            outcome.winning_cells,
            Some([(0, 0), (1, 0), (2, 0), (3, 0)])
        );
        assert!(matches!(
            game.status(),
            GameStatus::Won {
                piece: Piece::Ai,
                ..
            }
        ));
        assert_eq!(game.play(2), Err(GameError::GameOver));
    }

    #[test]
    fn new_game_resets_board_and_cache() {
        let mut game = Game::new(Difficulty::Easy, Piece::Ai);
        let mut rng = StdRng::seed_from_u64(9);
        game.play_ai(&mut rng).unwrap();
        assert!(game.cache_len() > 0);
        game.new_game(Piece::Player);
        assert_eq!(game.cache_len(), 0);
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.to_move(), Piece::Player);
    }

    #[test]
    fn each_decision_starts_from_an_empty_cache() {
        let mut game = Game::new(Difficulty::Easy, Piece::Ai);
        let mut rng = StdRng::seed_from_u64(4);
        game.play_ai(&mut rng).unwrap();
        game.play(3).unwrap();

        let before = *game.board();
        let mut fresh = TranspositionCache::new();
        decide(&before, game.depth(), Piece::Ai, &mut fresh, &mut rng).unwrap();

        game.play_ai(&mut rng).unwrap();
        assert_eq!(game.cache_len(), fresh.len());
    }

    #[test]
    fn difficulty_change_applies_to_next_decision() {
        let mut game = Game::new(Difficulty::Hard, Piece::Ai);
        game.set_difficulty(Difficulty::Easy);
        assert_eq!(game.depth(), 2);
    }

    #[test]
    fn illegal_columns_do_not_pass_the_turn() {
        let mut game = Game::new(Difficulty::Easy, Piece::Player);
        assert_eq!(game.play(9), Err(GameError::ColumnOutOfBounds { column: 9 }));
        assert_eq!(game.to_move(), Piece::Player);
    }
}
