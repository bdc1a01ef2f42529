use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use game_types::{GameError, ResolvedSettings, WordSource};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::WordValidator;

/// What an external recommender is told about the player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Most recent words first.
    pub recent_words: Vec<String>,
    pub tier2_focus: bool,
    pub include_reasoning: bool,
}

/// Reply shape the core relies on; anything else from the service is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSuggestion {
    pub word: String,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// An external word recommender, e.g. an AI proxy.
#[async_trait]
pub trait WordSuggester: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> anyhow::Result<WordSuggestion>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedWord {
    pub word: String,
    pub source: WordSource,
    pub reasoning: Option<String>,
    /// The list was exhausted and the used-word set must be cleared.
    pub used_words_reset: bool,
}

pub struct WordSelector {
    validator: Arc<WordValidator>,
}

impl WordSelector {
    pub fn new(validator: Arc<WordValidator>) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &Arc<WordValidator> {
        &self.validator
    }

    /// Pick a secret, asking the suggester first when AI words are enabled.
    ///
    /// A failing or malformed suggestion never aborts the round: it is
    /// logged and the list is used instead.
    pub async fn select(
        &self,
        settings: &ResolvedSettings,
        used_words: &BTreeSet<String>,
        recent_words: Vec<String>,
        suggester: Option<&dyn WordSuggester>,
    ) -> Result<SelectedWord, GameError> {
        if let Some(suggester) = suggester.filter(|_| settings.ai_enabled) {
            let request = SuggestionRequest {
                recent_words,
                tier2_focus: settings.tier2_focus,
                include_reasoning: settings.show_reasoning,
            };

            match suggester.suggest(&request).await {
                Ok(suggestion) => match Self::validate_suggestion(&suggestion.word, used_words) {
                    Ok(word) => {
                        info!("Using suggested word");
                        return Ok(SelectedWord {
                            word,
                            source: WordSource::Ai,
                            reasoning: suggestion.reasoning,
                            used_words_reset: false,
                        });
                    }
                    Err(e) => warn!("Rejected suggested word, falling back to list: {}", e),
                },
                Err(e) => warn!("Word suggestion failed, falling back to list: {}", e),
            }
        }

        self.pick_from_list(used_words, &mut rand::rng())
    }

    /// Random list word not yet used. When every word has been used the
    /// whole list is available again and `used_words_reset` is set.
    pub fn pick_from_list<R: Rng + ?Sized>(
        &self,
        used_words: &BTreeSet<String>,
        rng: &mut R,
    ) -> Result<SelectedWord, GameError> {
        let words = self.validator.words();
        let fresh: Vec<&String> = words.iter().filter(|w| !used_words.contains(*w)).collect();

        let (word, used_words_reset) = match fresh.choose(rng) {
            Some(word) => ((*word).clone(), false),
            None => {
                info!("All {} words used, starting over", words.len());
                let word = words.choose(rng).ok_or(GameError::NoWordsAvailable)?;
                (word.clone(), true)
            }
        };

        debug!("Picked list word ({} unused remain)", fresh.len().saturating_sub(1));
        Ok(SelectedWord {
            word,
            source: WordSource::List,
            reasoning: None,
            used_words_reset,
        })
    }

    /// Suggested words must be five letters and not already played.
    pub fn validate_suggestion(
        raw: &str,
        used_words: &BTreeSet<String>,
    ) -> Result<String, GameError> {
        let word = raw.trim().to_uppercase();
        if !WordValidator::is_well_formed(&word) {
            return Err(GameError::InvalidWord { word });
        }
        if used_words.contains(&word) {
            return Err(GameError::InvalidWord { word });
        }
        Ok(word)
    }
}
