//! Minimax with alpha-beta pruning over copied boards, memoised per decision.
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::board::{Board, Piece};
use crate::cache::{Bound, CacheEntry, NodeKey, TranspositionCache};
use crate::error::GameError;
use crate::eval::score_position;

/// Score of a decided game. Exceeds any heuristic sum (at most 69 * 1000 + 36).
pub const WIN_SCORE: i32 = 1_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub column: Option<usize>,
    pub score: i32,
}

impl Evaluation {
    fn leaf(score: i32) -> Self {
        Self {
            column: None,
            score,
        }
    }
}

/// Result of a top-level decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub column: usize,
    pub score: i32,
    /// The search produced no usable column and a random legal one was taken.
    pub fell_back: bool,
}

/// Scores a node without searching deeper, or `None` if it needs expanding.
fn base_case(board: &Board, depth: u8) -> Option<i32> {
    if board.has_won(Piece::Ai) {
        Some(WIN_SCORE)
    } else if board.has_won(Piece::Player) {
        Some(-WIN_SCORE)
    } else if board.is_full() {
        Some(0)
    } else if depth == 0 {
        Some(score_position(board, Piece::Ai))
    } else {
        None
    }
}

fn child(board: &Board, col: usize, piece: Piece) -> Board {
    let mut next = *board;
    if let Some(row) = board.next_open_row(col) {
        next.drop_piece(row, col, piece);
    }
    next
}

/// Alpha-beta minimax. Positive scores favour the AI, which is the
/// maximizing side; leaves are always scored from the AI's point of view.
///
/// Columns are tried in ascending order and only a strictly better score
/// replaces the running best, so ties go to the lowest column.
pub fn minimax(
    board: &Board,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    cache: &mut TranspositionCache,
) -> Evaluation {
    let key = NodeKey {
        board: *board,
        depth,
        maximizing,
    };
    if let Some(entry) = cache.probe(&key, alpha, beta) {
        return Evaluation {
            column: entry.column,
            score: entry.score,
        };
    }

    if let Some(score) = base_case(board, depth) {
        cache.store(
            key,
            CacheEntry {
                column: None,
                score,
                bound: Bound::Exact,
            },
        );
        return Evaluation::leaf(score);
    }

    let (alpha_in, beta_in) = (alpha, beta);
    let columns = board.valid_columns();
    let mut best = Evaluation {
        column: columns.first().copied(),
        score: if maximizing { -WIN_SCORE } else { WIN_SCORE },
    };

    for col in columns {
        if maximizing {
            let next = child(board, col, Piece::Ai);
            let score = minimax(&next, depth - 1, alpha, beta, false, cache).score;
            if score > best.score {
                best = Evaluation {
                    column: Some(col),
                    score,
                };
            }
            alpha = alpha.max(best.score);
        } else {
            let next = child(board, col, Piece::Player);
            let score = minimax(&next, depth - 1, alpha, beta, true, cache).score;
            if score < best.score {
                best = Evaluation {
                    column: Some(col),
                    score,
                };
            }
            beta = beta.min(best.score);
        }
        if alpha >= beta {
            break;
        }
    }

    cache.store(
        key,
        CacheEntry {
            column: best.column,
            score: best.score,
            bound: CacheEntry::classify(best.score, alpha_in, beta_in),
        },
    );
    best
}

/// Plain minimax without pruning or caching. Slow; used as the reference
/// the pruned search must agree with.
pub fn exhaustive_minimax(board: &Board, depth: u8, maximizing: bool) -> Evaluation {
    if let Some(score) = base_case(board, depth) {
        return Evaluation::leaf(score);
    }

    let columns = board.valid_columns();
    let mut best = Evaluation {
        column: columns.first().copied(),
        score: if maximizing { -WIN_SCORE } else { WIN_SCORE },
    };
    for col in columns {
        let piece = if maximizing { Piece::Ai } else { Piece::Player };
        let score = exhaustive_minimax(&child(board, col, piece), depth - 1, !maximizing).score;
        let better = if maximizing {
            score > best.score
        } else {
            score < best.score
        };
        if better {
            best = Evaluation {
                column: Some(col),
                score,
            };
        }
    }
    best
}

/// Picks a column for `to_move`: clears the cache, searches `depth` plies
/// from the full window and falls back to a random legal column when the
/// search has none to offer (e.g. the position is already won).
pub fn decide<R: Rng + ?Sized>(
    board: &Board,
    depth: u8,
    to_move: Piece,
    cache: &mut TranspositionCache,
    rng: &mut R,
) -> Result<Decision, GameError> {
    debug_assert_ne!(to_move, Piece::Empty);
    if depth == 0 {
        return Err(GameError::DepthOutOfRange(depth));
    }
    let legal = board.valid_columns();
    if legal.is_empty() {
        return Err(GameError::NoMoves);
    }

    cache.clear();
    let maximizing = to_move == Piece::Ai;
    let eval = minimax(board, depth, -WIN_SCORE, WIN_SCORE, maximizing, cache);

    let decision = match eval.column.filter(|&col| board.is_valid_column(col)) {
        Some(column) => Decision {
            column,
            score: eval.score,
            fell_back: false,
        },
        None => {
            let column = *legal.choose(rng).ok_or(GameError::NoMoves)?;
            trace!(column, "search returned no column, playing a random one");
            Decision {
                column,
                score: eval.score,
                fell_back: true,
            }
        }
    };

    debug!(
        depth,
        side = ?to_move,
        column = decision.column,
        score = decision.score,
        entries = cache.len(),
        probes = cache.probes(),
        hits = cache.hits(),
        "search finished"
    );
    Ok(decision)
}
