//! Static position scoring over windows of four.
use crate::board::{Board, Piece, CENTER_COLUMN, HEIGHT, WINDOW_LEN, WINDOWS};

pub const FOUR_SCORE: i32 = 1000;
pub const THREE_SCORE: i32 = 50;
pub const TWO_SCORE: i32 = 10;
/// Larger than `THREE_SCORE` so blocking outranks building.
pub const OPPONENT_THREE_PENALTY: i32 = -80;
pub const CENTER_WEIGHT: i32 = 6;

pub fn evaluate_window(window: &[Piece; WINDOW_LEN], piece: Piece) -> i32 {
    let opponent = piece.opponent();
    let mut own = 0;
    let mut theirs = 0;
    let mut empty = 0;
    for &cell in window {
        if cell == piece {
            own += 1;
        } else if cell == opponent {
            theirs += 1;
        } else {
            empty += 1;
        }
    }

    let mut score = match (own, empty) {
        (4, _) => FOUR_SCORE,
        (3, 1) => THREE_SCORE,
        (2, 2) => TWO_SCORE,
        _ => 0,
    };
    if theirs == 3 && empty == 1 {
        score += OPPONENT_THREE_PENALTY;
    }
    score
}

/// Scores `board` for `piece`: center occupancy plus every window of four.
pub fn score_position(board: &Board, piece: Piece) -> i32 {
    let center = (0..HEIGHT)
        .filter(|&row| board.get(row, CENTER_COLUMN) == piece)
        .count() as i32;

    WINDOWS.iter().fold(center * CENTER_WEIGHT, |score, window| {
        score + evaluate_window(&board.window(window), piece)
    })
}
