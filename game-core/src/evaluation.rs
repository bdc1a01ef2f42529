use game_types::{GuessRow, LetterResult, LetterStatus};
use std::collections::HashMap;

pub struct LetterEvaluator;

impl LetterEvaluator {
    /// Evaluate a whole guess against the secret, position 0 first.
    ///
    /// Both words are compared case-insensitively. Greens always win their
    /// position; yellows are then handed out left to right while the
    /// secret still has unclaimed copies of that letter; the rest are gray.
    pub fn evaluate(guess: &str, secret: &str) -> GuessRow {
        let letters = RowEvaluator::new(guess, secret).collect();
        GuessRow {
            word: guess.to_uppercase(),
            letters,
        }
    }
}

/// Evaluates one guess row position by position.
///
/// Yields positions strictly in increasing order because whether a letter
/// is present depends on how many earlier copies were already marked present.
pub struct RowEvaluator {
    guess: Vec<char>,
    secret: Vec<char>,
    position: usize,
    // Copies of each letter already marked present at earlier positions.
    claimed: HashMap<char, usize>,
}

impl RowEvaluator {
    pub fn new(guess: &str, secret: &str) -> Self {
        Self {
            guess: guess.to_uppercase().chars().collect(),
            secret: secret.to_uppercase().chars().collect(),
            position: 0,
            claimed: HashMap::new(),
        }
    }

    fn status_at(&mut self, position: usize) -> LetterStatus {
        let letter = self.guess[position];

        if self.secret.get(position) == Some(&letter) {
            return LetterStatus::Correct;
        }

        let budget = self.secret.iter().filter(|&&c| c == letter).count();
        if budget == 0 {
            return LetterStatus::Absent;
        }

        // Exact matches anywhere in the row consume budget before any yellow.
        let exact = self
            .guess
            .iter()
            .zip(&self.secret)
            .filter(|&(&g, &s)| g == letter && s == letter)
            .count();

        let claimed = self.claimed.entry(letter).or_insert(0);
        if exact + *claimed < budget {
            *claimed += 1;
            LetterStatus::Present
        } else {
            LetterStatus::Absent
        }
    }
}

impl Iterator for RowEvaluator {
    type Item = LetterResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.guess.len() {
            return None;
        }

        let position = self.position;
        let status = self.status_at(position);
        self.position += 1;

        Some(LetterResult {
            letter: self.guess[position],
            status,
            position,
        })
    }
}
