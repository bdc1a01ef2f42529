use game_types::{GameError, GameOutcome, MAX_GUESSES, Statistics, WordSource};

pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Fold one finished round into the statistics, returning a new value.
    ///
    /// `guess_count` is the number of rows used, 1..=6, for wins and losses
    /// alike; anything else is rejected before any counter moves.
    pub fn update(
        stats: &Statistics,
        outcome: GameOutcome,
        guess_count: usize,
        source: WordSource,
    ) -> Result<Statistics, GameError> {
        if !(1..=MAX_GUESSES).contains(&guess_count) {
            return Err(GameError::InvalidGuessCount { count: guess_count });
        }

        let mut next = stats.clone();
        next.played = next.played.saturating_add(1);

        match source {
            WordSource::Ai => next.ai_words = next.ai_words.saturating_add(1),
            WordSource::List => next.list_words = next.list_words.saturating_add(1),
        }

        match outcome {
            GameOutcome::Won => {
                next.wins = next.wins.saturating_add(1);
                next.current_streak = next.current_streak.saturating_add(1);
                next.max_streak = next.max_streak.max(next.current_streak);
                let slot = &mut next.guess_distribution[guess_count - 1];
                *slot = slot.saturating_add(1);
            }
            GameOutcome::Lost => {
                next.current_streak = 0;
            }
        }

        Ok(next)
    }
}
