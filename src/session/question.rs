use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::session::setup::QuizConfigError;

pub const OPTION_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

pub const ALL_DIFFICULTIES: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Unrecognized labels count as medium, the same way a question with no
    /// difficulty is tallied.
    pub fn from_label_lenient(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuizConfigError::UnknownDifficulty(other.to_string())),
        }
    }
}

// Stored history and remote payloads may carry anything here.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(Difficulty::from_label_lenient)
            .unwrap_or_default())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty: Difficulty,
    pub explanation: String,
}

impl QuizQuestion {
    /// A question is playable when it has exactly four options and the
    /// correct answer is one of them.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == OPTION_COUNT
            && self.options.iter().any(|o| *o == self.correct_answer)
    }

    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }

    pub fn is_correct(&self, answer: Option<&str>) -> bool {
        answer == Some(self.correct_answer.as_str())
    }
}

/// Letter shown next to an option: A, B, C, D.
pub fn option_letter(index: usize) -> char {
    (b'A' + (index as u8 % 26)) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], correct: &str) -> QuizQuestion {
        QuizQuestion {
            id: "q1".to_string(),
            question: "Which?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.to_string(),
            difficulty: Difficulty::Easy,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_deserialize_unknown_becomes_medium() {
        let d: Difficulty = serde_json::from_str("\"impossible\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
        let d: Difficulty = serde_json::from_str("null").unwrap();
        assert_eq!(d, Difficulty::Medium);
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
    }

    #[test]
    fn test_well_formed_requires_four_options_and_listed_answer() {
        assert!(question(&["a", "b", "c", "d"], "c").is_well_formed());
        assert!(!question(&["a", "b", "c"], "c").is_well_formed());
        assert!(!question(&["a", "b", "c", "d"], "e").is_well_formed());
    }

    #[test]
    fn test_correct_index_and_letters() {
        let q = question(&["a", "b", "c", "d"], "c");
        assert_eq!(q.correct_index(), Some(2));
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert!(q.is_correct(Some("c")));
        assert!(!q.is_correct(None));
    }
}
