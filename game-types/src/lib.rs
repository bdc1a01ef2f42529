pub mod errors;
pub mod game;
pub mod history;
pub mod settings;
pub mod snapshot;
pub mod stats;
pub mod sync_code;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use history::*;
pub use settings::*;
pub use snapshot::*;
pub use stats::*;
pub use sync_code::*;

/// Letters in every secret word and every accepted guess.
pub const WORD_LENGTH: usize = 5;

/// Rows on the board; also the size of the guess distribution.
pub const MAX_GUESSES: usize = 6;

/// Number of history entries kept locally and after a merge.
pub const MAX_HISTORY_SIZE: usize = 20;
