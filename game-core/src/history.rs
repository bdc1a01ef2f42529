use std::sync::Arc;

use game_types::{GameError, HistoryEntry, MAX_HISTORY_SIZE, WordSource};
use tracing::debug;
use uuid::Uuid;

use crate::Clock;

/// Highest understanding rating a player can give.
pub const MAX_UNDERSTANDING: u8 = 10;

/// Fresh RFC 4122 version 4 identifier in its 36-character hyphenated form.
pub fn generate_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Give a legacy entry the id and timestamp it never had.
///
/// The timestamp is `now`, the moment of backfill, not the original play
/// time, which is unknown.
pub fn backfill_legacy(entry: &mut HistoryEntry, now: i64) -> bool {
    if !entry.is_legacy() {
        return false;
    }
    entry.id = Some(generate_id());
    entry.timestamp = Some(now);
    true
}

/// Sort oldest first and keep only the newest `MAX_HISTORY_SIZE` entries.
pub fn retain_most_recent(entries: &mut Vec<HistoryEntry>) {
    entries.sort_by_key(|entry| entry.timestamp.unwrap_or_default());
    if entries.len() > MAX_HISTORY_SIZE {
        let excess = entries.len() - MAX_HISTORY_SIZE;
        entries.drain(..excess);
    }
}

/// Bounded log of finished rounds, oldest first.
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    clock: Arc<dyn Clock>,
}

impl HistoryStore {
    /// Wrap previously stored entries, backfilling any legacy ones.
    pub fn new(mut entries: Vec<HistoryEntry>, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_millis();
        let backfilled = entries
            .iter_mut()
            .map(|entry| backfill_legacy(entry, now))
            .filter(|changed| *changed)
            .count();
        if backfilled > 0 {
            debug!("Backfilled {} legacy history entries", backfilled);
        }

        retain_most_recent(&mut entries);
        Self { entries, clock }
    }

    pub fn empty(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Vec::new(),
            clock,
        }
    }

    /// Record a finished round and return the stored entry.
    pub fn append(
        &mut self,
        word: &str,
        result: i8,
        understanding: Option<u8>,
        source: WordSource,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Some(generate_id()),
            word: word.to_uppercase(),
            result,
            source,
            timestamp: Some(self.clock.now_millis()),
            understanding,
        };

        self.entries.push(entry.clone());
        retain_most_recent(&mut self.entries);
        entry
    }

    /// Attach a rating to the chronologically last entry, whichever round
    /// was in progress when the player gave it.
    pub fn attach_understanding(&mut self, rating: u8) -> Result<Option<&HistoryEntry>, GameError> {
        if rating > MAX_UNDERSTANDING {
            return Err(GameError::InvalidRating { rating });
        }

        let latest = self
            .entries
            .iter_mut()
            .max_by_key(|entry| entry.timestamp.unwrap_or_default());

        Ok(latest.map(|entry| {
            entry.understanding = Some(rating);
            &*entry
        }))
    }

    /// Replace the whole log, e.g. with the result of a merge.
    pub fn replace(&mut self, entries: Vec<HistoryEntry>) {
        *self = Self::new(entries, self.clock.clone());
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
