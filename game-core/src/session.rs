use std::collections::BTreeMap;
use std::sync::Arc;

use game_types::{
    GameError, GameOutcome, GuessRow, HistoryEntry, LetterStatus, MAX_GUESSES, Statistics,
    WordSource,
};
use tracing::{debug, info};

use crate::{LetterEvaluator, LocalData, LocalStore, WordSelector, WordSuggester, WordValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Won,
    Lost,
}

/// Result of the round once it is over, after local state was updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub outcome: GameOutcome,
    pub guesses: usize,
    pub word: String,
    pub entry: HistoryEntry,
    pub stats: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessFeedback {
    pub row: GuessRow,
    pub remaining: usize,
    pub finished: Option<RoundOutcome>,
}

/// One round: a hidden word, up to six rows, and the keyboard state.
pub struct GameSession {
    secret: String,
    source: WordSource,
    reasoning: Option<String>,
    rows: Vec<GuessRow>,
    keyboard: BTreeMap<char, LetterStatus>,
    status: SessionStatus,
    validator: Arc<WordValidator>,
}

impl GameSession {
    pub fn new(secret: &str, source: WordSource, validator: Arc<WordValidator>) -> Self {
        Self {
            secret: secret.trim().to_uppercase(),
            source,
            reasoning: None,
            rows: Vec::with_capacity(MAX_GUESSES),
            keyboard: BTreeMap::new(),
            status: SessionStatus::InProgress,
            validator,
        }
    }

    /// Begin a new round.
    ///
    /// A rating queued from the previous round is attached first, so it
    /// lands on the game that was just played. The chosen word is marked
    /// used before play starts.
    pub async fn start<S: LocalStore>(
        local: &mut LocalData<S>,
        selector: &WordSelector,
        suggester: Option<&dyn WordSuggester>,
    ) -> Result<Self, GameError> {
        local.flush_pending_understanding();

        let recent_words = local
            .history()
            .iter()
            .rev()
            .map(|entry| entry.word.clone())
            .collect();
        let settings = local.settings().resolve();

        let selected = selector
            .select(&settings, local.used_words(), recent_words, suggester)
            .await?;

        if selected.used_words_reset {
            local.reset_used_words();
        }
        local.mark_word_used(&selected.word);

        info!("Starting round with a {:?} word", selected.source);
        let mut session = Self::new(&selected.word, selected.source, selector.validator().clone());
        session.reasoning = selected.reasoning;
        Ok(session)
    }

    /// Evaluate a guess. On the winning guess or the sixth miss the round is
    /// recorded into `local` before this returns.
    pub fn submit_guess<S: LocalStore>(
        &mut self,
        guess: &str,
        local: &mut LocalData<S>,
    ) -> Result<GuessFeedback, GameError> {
        if self.status != SessionStatus::InProgress {
            return Err(GameError::GameAlreadyCompleted);
        }

        // The secret is always guessable, even when it came from outside the list.
        let normalized = guess.trim().to_uppercase();
        let word = if normalized == self.secret {
            normalized
        } else {
            self.validator.check_guess(guess)?
        };

        let row = LetterEvaluator::evaluate(&word, &self.secret);
        for letter in &row.letters {
            self.keyboard
                .entry(letter.letter)
                .and_modify(|status| {
                    if letter.status.rank() > status.rank() {
                        *status = letter.status;
                    }
                })
                .or_insert(letter.status);
        }
        self.rows.push(row.clone());
        debug!("Guess {} of {}", self.rows.len(), MAX_GUESSES);

        let outcome = if row.is_solved() {
            Some(GameOutcome::Won)
        } else if self.rows.len() >= MAX_GUESSES {
            Some(GameOutcome::Lost)
        } else {
            None
        };

        let finished = match outcome {
            Some(outcome) => Some(self.finish(outcome, local)?),
            None => None,
        };

        Ok(GuessFeedback {
            row,
            remaining: MAX_GUESSES - self.rows.len(),
            finished,
        })
    }

    fn finish<S: LocalStore>(
        &mut self,
        outcome: GameOutcome,
        local: &mut LocalData<S>,
    ) -> Result<RoundOutcome, GameError> {
        self.status = match outcome {
            GameOutcome::Won => SessionStatus::Won,
            GameOutcome::Lost => SessionStatus::Lost,
        };

        let guesses = self.rows.len();
        let entry = local.record_game(&self.secret, outcome, guesses, self.source)?;

        Ok(RoundOutcome {
            outcome,
            guesses,
            word: self.secret.clone(),
            entry,
            stats: local.stats().clone(),
        })
    }

    pub fn rows(&self) -> &[GuessRow] {
        &self.rows
    }

    /// Best status seen so far for each guessed letter.
    pub fn keyboard(&self) -> &BTreeMap<char, LetterStatus> {
        &self.keyboard
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn source(&self) -> WordSource {
        self.source
    }

    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }

    /// The secret, only once the round is over.
    pub fn revealed_word(&self) -> Option<&str> {
        (self.status != SessionStatus::InProgress).then_some(self.secret.as_str())
    }
}
