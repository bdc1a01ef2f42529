use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    #[error("guess must be {expected} letters, got {word:?}")]
    WrongLength { word: String, expected: usize },
    #[error("guess must only contain letters: {word:?}")]
    InvalidWord { word: String },
    #[error("not in word list: {word}")]
    NotInWordList { word: String },
    #[error("round is already over")]
    GameAlreadyCompleted,
    #[error("guess count {count} outside 1..=6")]
    InvalidGuessCount { count: usize },
    #[error("understanding rating {rating} outside 0..=10")]
    InvalidRating { rating: u8 },
    #[error("no words available")]
    NoWordsAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SyncCodeError {
    #[error("sync code must look like XXXX-XXXX, got {code:?}")]
    InvalidFormat { code: String },
}
