#![allow(dead_code)]

use game_core::{GameSession, LocalData, ManualClock, MemoryStore, WordSelector, WordValidator};
use game_types::{GameOutcome, HistoryEntry, WordSource};
use std::sync::Arc;

pub const TEST_WORDS: &str = "crane\nslate\nplant\nhello\nworld\nspeed\nerase\nlevel\nhouse\nmouse";

/// Creates a test WordValidator with a known set of words
pub fn create_test_validator() -> Arc<WordValidator> {
    Arc::new(WordValidator::from_word_list(TEST_WORDS))
}

pub fn create_test_selector() -> WordSelector {
    WordSelector::new(create_test_validator())
}

/// Local data over an in-memory store, with a clock the test controls
pub fn create_local_data(start_millis: i64) -> (LocalData<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_millis));
    (LocalData::load(MemoryStore::new(), clock.clone()), clock)
}

/// Creates a session with a specific target word
pub fn create_session_with_word(word: &str) -> GameSession {
    GameSession::new(word, WordSource::List, create_test_validator())
}

/// Plays a whole round to the given outcome, advancing the clock first
pub fn play_round(
    local: &mut LocalData<MemoryStore>,
    clock: &ManualClock,
    secret: &str,
    outcome: GameOutcome,
) -> HistoryEntry {
    clock.advance(1_000);
    let mut session = create_session_with_word(secret);
    let miss = if secret.eq_ignore_ascii_case("hello") { "world" } else { "hello" };

    loop {
        let guess = match outcome {
            GameOutcome::Won if session.rows().len() == 1 => secret,
            _ => miss,
        };
        let feedback = session.submit_guess(guess, local).unwrap();
        if let Some(finished) = feedback.finished {
            return finished.entry;
        }
    }
}
