pub mod clock;
pub mod evaluation;
pub mod history;
pub mod local_data;
pub mod merge;
pub mod session;
pub mod statistics;
pub mod storage;
pub mod word_selection;
pub mod word_validation;

// Re-export main components
pub use clock::*;
pub use evaluation::*;
pub use history::*;
pub use local_data::*;
pub use merge::*;
pub use session::*;
pub use statistics::*;
pub use storage::*;
pub use word_selection::*;
pub use word_validation::*;
