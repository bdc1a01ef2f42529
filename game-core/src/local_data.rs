use std::collections::BTreeSet;
use std::sync::Arc;

use game_types::{
    GameError, GameOutcome, HistoryEntry, LOSS_RESULT, Settings, Snapshot, Statistics, SyncCode,
    WordSource,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::history::MAX_UNDERSTANDING;
use crate::{Clock, HistoryStore, LocalStore, StatisticsEngine};

/// Storage keys. Each value is the JSON encoding of the named entity.
pub mod keys {
    pub const STATS: &str = "wordle-stats";
    pub const HISTORY: &str = "wordle-history";
    pub const USED_WORDS: &str = "wordle-used-words";
    pub const SETTINGS: &str = "wordle-settings";
    pub const SYNC_CONFIG: &str = "wordle-sync-config";
    pub const API_KEY: &str = "wordle-api-key";
    pub const PENDING_UNDERSTANDING: &str = "wordle-pending-understanding";
}

/// Per-installation sync preferences. Never part of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalConfig {
    pub sync_enabled: bool,
    pub sync_code: Option<SyncCode>,
    pub last_version: Option<u64>,
    pub last_synced_at: Option<i64>,
}

impl LocalConfig {
    /// The code to sync against, if syncing is switched on.
    pub fn active_code(&self) -> Option<&SyncCode> {
        self.sync_code.as_ref().filter(|_| self.sync_enabled)
    }
}

/// In-memory view of everything the installation keeps, written through to
/// a `LocalStore`.
///
/// Storage failures never surface to callers: a value that cannot be read
/// falls back to its default, and a value that cannot be written stays
/// in memory for the rest of the session.
pub struct LocalData<S: LocalStore> {
    store: S,
    clock: Arc<dyn Clock>,
    stats: Statistics,
    history: HistoryStore,
    used_words: BTreeSet<String>,
    settings: Settings,
    config: LocalConfig,
    api_key: Option<String>,
    pending_understanding: Option<u8>,
}

impl<S: LocalStore> LocalData<S> {
    pub fn load(store: S, clock: Arc<dyn Clock>) -> Self {
        let entries: Vec<HistoryEntry> = load_json(&store, keys::HISTORY);
        let had_legacy = entries.iter().any(HistoryEntry::is_legacy);

        let api_key = match store.get(keys::API_KEY) {
            Ok(value) => value.filter(|key| !key.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read API key, continuing without one: {}", e);
                None
            }
        };

        let mut data = Self {
            stats: load_json(&store, keys::STATS),
            history: HistoryStore::new(entries, clock.clone()),
            used_words: load_json(&store, keys::USED_WORDS),
            settings: load_json(&store, keys::SETTINGS),
            config: load_json(&store, keys::SYNC_CONFIG),
            pending_understanding: load_json(&store, keys::PENDING_UNDERSTANDING),
            api_key,
            store,
            clock,
        };

        // Persist backfilled ids so they stay stable across restarts.
        if had_legacy {
            info!("Upgraded legacy history entries");
            data.persist_history();
        }

        data
    }

    /// Everything that syncs. The API key and sync config are not included.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            stats: self.stats.clone(),
            history: self.history.entries().to_vec(),
            used_words: self.used_words.clone(),
            settings: self.settings,
        }
    }

    /// Replace local state with a (merged) snapshot and persist it.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.stats = snapshot.stats.clone();
        self.history.replace(snapshot.history.clone());
        self.used_words = snapshot.used_words.clone();
        self.settings = snapshot.settings;

        write_json(&mut self.store, keys::STATS, &self.stats);
        self.persist_history();
        write_json(&mut self.store, keys::USED_WORDS, &self.used_words);
        write_json(&mut self.store, keys::SETTINGS, &self.settings);
        debug!("Applied snapshot with {} history entries", self.history.len());
    }

    /// Record a finished round: statistics first, then history.
    pub fn record_game(
        &mut self,
        word: &str,
        outcome: GameOutcome,
        guess_count: usize,
        source: WordSource,
    ) -> Result<HistoryEntry, GameError> {
        self.stats = StatisticsEngine::update(&self.stats, outcome, guess_count, source)?;

        let result = match outcome {
            GameOutcome::Won => guess_count as i8,
            GameOutcome::Lost => LOSS_RESULT,
        };
        let entry = self.history.append(word, result, None, source);

        write_json(&mut self.store, keys::STATS, &self.stats);
        self.persist_history();
        info!(
            "Recorded {:?} on {} after {} guesses (played {})",
            outcome, entry.word, guess_count, self.stats.played
        );
        Ok(entry)
    }

    /// Queue a rating to be attached at the start of the next round.
    pub fn queue_understanding(&mut self, rating: u8) -> Result<(), GameError> {
        if rating > MAX_UNDERSTANDING {
            return Err(GameError::InvalidRating { rating });
        }
        self.pending_understanding = Some(rating);
        write_json(&mut self.store, keys::PENDING_UNDERSTANDING, &self.pending_understanding);
        Ok(())
    }

    /// Attach a queued rating to the most recent history entry.
    pub fn flush_pending_understanding(&mut self) -> Option<HistoryEntry> {
        let rating = self.pending_understanding.take()?;
        remove_key(&mut self.store, keys::PENDING_UNDERSTANDING);

        let rated = match self.history.attach_understanding(rating) {
            Ok(rated) => rated.cloned(),
            Err(e) => {
                warn!("Dropping queued understanding rating: {}", e);
                None
            }
        };

        if rated.is_some() {
            self.persist_history();
        }
        rated
    }

    pub fn mark_word_used(&mut self, word: &str) {
        if self.used_words.insert(word.to_uppercase()) {
            write_json(&mut self.store, keys::USED_WORDS, &self.used_words);
        }
    }

    pub fn reset_used_words(&mut self) {
        info!("Clearing {} used words", self.used_words.len());
        self.used_words.clear();
        write_json(&mut self.store, keys::USED_WORDS, &self.used_words);
    }

    /// The only path that lowers counters.
    pub fn reset_statistics(&mut self) {
        info!("Resetting statistics");
        self.stats = Statistics::default();
        write_json(&mut self.store, keys::STATS, &self.stats);
    }

    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        write_json(&mut self.store, keys::SETTINGS, &self.settings);
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        match self.api_key.clone() {
            Some(key) => {
                if let Err(e) = self.store.set(keys::API_KEY, &key) {
                    warn!("Failed to persist API key, keeping it for this session: {}", e);
                }
            }
            None => remove_key(&mut self.store, keys::API_KEY),
        }
    }

    pub fn update_config(&mut self, update: impl FnOnce(&mut LocalConfig)) {
        update(&mut self.config);
        write_json(&mut self.store, keys::SYNC_CONFIG, &self.config);
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn used_words(&self) -> &BTreeSet<String> {
        &self.used_words
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn pending_understanding(&self) -> Option<u8> {
        self.pending_understanding
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist_history(&mut self) {
        write_json(&mut self.store, keys::HISTORY, &self.history.entries());
    }
}

fn write_json<T: Serialize + ?Sized>(store: &mut impl LocalStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(Into::into)
        .and_then(|json| store.set(key, &json));

    if let Err(e) = result {
        warn!("Failed to persist {}, keeping in-memory value: {}", key, e);
    }
}

fn remove_key(store: &mut impl LocalStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!("Failed to remove {}: {}", key, e);
    }
}

fn load_json<T: DeserializeOwned + Default>(store: &impl LocalStore, key: &str) -> T {
    match store.get(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Stored {} is unreadable, using default: {}", key, e);
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Failed to read {}, using default: {}", key, e);
            T::default()
        }
    }
}
