use std::collections::HashSet;

use game_types::{GameError, WORD_LENGTH};

pub struct WordValidator {
    valid_words: HashSet<String>,
    // Same words in a stable order, for seeded random picks.
    ordered: Vec<String>,
}

impl WordValidator {
    /// Create a new word validator from a word list
    pub fn from_word_list(word_list: &str) -> Self {
        let valid_words: HashSet<String> = word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_uppercase)
            .filter(|word| Self::is_well_formed(word))
            .collect();

        let mut ordered: Vec<String> = valid_words.iter().cloned().collect();
        ordered.sort();

        Self {
            valid_words,
            ordered,
        }
    }

    /// Check if a word is in the list
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.valid_words.contains(&word.trim().to_uppercase())
    }

    /// Exactly five ASCII letters.
    pub fn is_well_formed(word: &str) -> bool {
        word.len() == WORD_LENGTH && word.chars().all(|c| c.is_ascii_alphabetic())
    }

    /// Normalise a guess and explain why it is unacceptable, if it is.
    pub fn check_guess(&self, guess: &str) -> Result<String, GameError> {
        let word = guess.trim().to_uppercase();

        if word.chars().count() != WORD_LENGTH {
            return Err(GameError::WrongLength {
                word,
                expected: WORD_LENGTH,
            });
        }
        if !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(GameError::InvalidWord { word });
        }
        if !self.valid_words.contains(&word) {
            return Err(GameError::NotInWordList { word });
        }

        Ok(word)
    }

    pub fn words(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_validator() {
        let word_list = "apple\nbanana\ncherry\n# comment\n\ntests\nvalid";
        let validator = WordValidator::from_word_list(word_list);

        assert!(validator.is_valid_word("apple"));
        assert!(validator.is_valid_word("APPLE")); // case insensitive
        assert!(validator.is_valid_word("tests"));
        assert!(validator.is_valid_word("valid"));
        assert!(!validator.is_valid_word("banana")); // wrong length
        assert!(!validator.is_valid_word("xyz"));
        assert_eq!(validator.len(), 3);
    }

    #[test]
    fn test_well_formed() {
        assert!(WordValidator::is_well_formed("HELLO"));
        assert!(!WordValidator::is_well_formed("HELL0"));
        assert!(!WordValidator::is_well_formed("HELLOS"));
        assert!(!WordValidator::is_well_formed("HÉLLO"));
        assert!(!WordValidator::is_well_formed(""));
    }

    #[test]
    fn test_comments_and_whitespace() {
        let word_list = "# This is a comment\nvalid\n   \n\t# Another comment\n  spaced  \n\n  crane ";
        let validator = WordValidator::from_word_list(word_list);

        assert!(validator.is_valid_word("valid"));
        assert!(validator.is_valid_word(" crane "));
        assert!(!validator.is_valid_word("spaced"));
        assert_eq!(validator.words(), &["CRANE".to_string(), "VALID".to_string()]);
    }

    #[test]
    fn test_check_guess_reasons() {
        let validator = WordValidator::from_word_list("crane\nslate");

        assert_eq!(validator.check_guess(" crane ").unwrap(), "CRANE");
        assert_eq!(
            validator.check_guess("cran"),
            Err(GameError::WrongLength {
                word: "CRAN".to_string(),
                expected: 5
            })
        );
        assert_eq!(
            validator.check_guess("cr4ne"),
            Err(GameError::InvalidWord {
                word: "CR4NE".to_string()
            })
        );
        assert_eq!(
            validator.check_guess("plant"),
            Err(GameError::NotInWordList {
                word: "PLANT".to_string()
            })
        );
    }

    #[test]
    fn test_empty_word_list() {
        let validator = WordValidator::from_word_list("");
        assert!(validator.is_empty());
        assert!(!validator.is_valid_word("hello"));
    }
}
