use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::question::Difficulty;

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;
pub const MIN_TIME_LIMIT: u32 = 10;
pub const MAX_TIME_LIMIT: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizConfigError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("question count {0} is outside 1..=20")]
    QuestionCount(u32),

    #[error("time limit {0}s is outside 10..=120s")]
    TimeLimit(u32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Javascript,
    React,
    Nextjs,
    Typescript,
    Python,
    Php,
    Java,
    Csharp,
    Golang,
    Ruby,
}

pub const ALL_CATEGORIES: [Category; 10] = [
    Category::Javascript,
    Category::React,
    Category::Nextjs,
    Category::Typescript,
    Category::Python,
    Category::Php,
    Category::Java,
    Category::Csharp,
    Category::Golang,
    Category::Ruby,
];

impl Category {
    pub fn id(self) -> &'static str {
        match self {
            Category::Javascript => "javascript",
            Category::React => "react",
            Category::Nextjs => "nextjs",
            Category::Typescript => "typescript",
            Category::Python => "python",
            Category::Php => "php",
            Category::Java => "java",
            Category::Csharp => "csharp",
            Category::Golang => "golang",
            Category::Ruby => "ruby",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Javascript => "JavaScript",
            Category::React => "React.js",
            Category::Nextjs => "Next.js",
            Category::Typescript => "TypeScript",
            Category::Python => "Python",
            Category::Php => "PHP",
            Category::Java => "Java",
            Category::Csharp => "C#",
            Category::Golang => "Go",
            Category::Ruby => "Ruby",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = QuizConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ALL_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.id() == needle)
            .ok_or(QuizConfigError::UnknownCategory(needle))
    }
}

/// Scoring variant. Affects the bonus only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    #[default]
    Standard,
    Timed,
    Challenge,
}

pub const ALL_MODES: [ScoringMode; 3] = [
    ScoringMode::Standard,
    ScoringMode::Timed,
    ScoringMode::Challenge,
];

impl ScoringMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringMode::Standard => "standard",
            ScoringMode::Timed => "timed",
            ScoringMode::Challenge => "challenge",
        }
    }

    /// Any label other than "timed" or "challenge" scores as standard.
    pub fn from_label(label: &str) -> Self {
        match label {
            "timed" => ScoringMode::Timed,
            "challenge" => ScoringMode::Challenge,
            _ => ScoringMode::Standard,
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ScoringMode::Standard),
            "timed" => Ok(ScoringMode::Timed),
            "challenge" => Ok(ScoringMode::Challenge),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Settings for one quiz session. Fixed once the session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfiguration {
    pub category: Category,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub time_limit: u32,
}

impl QuizConfiguration {
    pub fn new(
        category: Category,
        difficulty: Difficulty,
        question_count: u32,
        time_limit: u32,
    ) -> Result<Self, QuizConfigError> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&question_count) {
            return Err(QuizConfigError::QuestionCount(question_count));
        }
        if !(MIN_TIME_LIMIT..=MAX_TIME_LIMIT).contains(&time_limit) {
            return Err(QuizConfigError::TimeLimit(time_limit));
        }
        Ok(Self {
            category,
            difficulty,
            question_count,
            time_limit,
        })
    }

    /// Build a configuration, pulling numbers into range instead of failing.
    pub fn clamped(
        category: Category,
        difficulty: Difficulty,
        question_count: u32,
        time_limit: u32,
    ) -> Self {
        Self {
            category,
            difficulty,
            question_count: question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS),
            time_limit: time_limit.clamp(MIN_TIME_LIMIT, MAX_TIME_LIMIT),
        }
    }
}

impl Default for QuizConfiguration {
    fn default() -> Self {
        Self {
            category: Category::Javascript,
            difficulty: Difficulty::Medium,
            question_count: 5,
            time_limit: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_id() {
        for c in ALL_CATEGORIES {
            assert_eq!(c.id().parse::<Category>().unwrap(), c);
        }
        assert_eq!(
            "cobol".parse::<Category>(),
            Err(QuizConfigError::UnknownCategory("cobol".to_string()))
        );
    }

    #[test]
    fn test_configuration_rejects_out_of_range() {
        assert!(QuizConfiguration::new(Category::Python, Difficulty::Easy, 0, 30).is_err());
        assert!(QuizConfiguration::new(Category::Python, Difficulty::Easy, 21, 30).is_err());
        assert!(QuizConfiguration::new(Category::Python, Difficulty::Easy, 5, 9).is_err());
        assert!(QuizConfiguration::new(Category::Python, Difficulty::Easy, 5, 121).is_err());
        assert!(QuizConfiguration::new(Category::Python, Difficulty::Easy, 20, 120).is_ok());
        assert!(QuizConfiguration::new(Category::Python, Difficulty::Easy, 1, 10).is_ok());
    }

    #[test]
    fn test_clamped_pulls_into_range() {
        let cfg = QuizConfiguration::clamped(Category::Ruby, Difficulty::Hard, 99, 1);
        assert_eq!(cfg.question_count, MAX_QUESTIONS);
        assert_eq!(cfg.time_limit, MIN_TIME_LIMIT);
    }

    #[test]
    fn test_mode_from_label_defaults_to_standard() {
        assert_eq!(ScoringMode::from_label("timed"), ScoringMode::Timed);
        assert_eq!(ScoringMode::from_label("challenge"), ScoringMode::Challenge);
        assert_eq!(ScoringMode::from_label("practice"), ScoringMode::Standard);
    }

    #[test]
    fn test_configuration_serializes_camel_case() {
        let json = serde_json::to_string(&QuizConfiguration::default()).unwrap();
        assert!(json.contains("\"questionCount\":5"));
        assert!(json.contains("\"timeLimit\":30"));
        assert!(json.contains("\"category\":\"javascript\""));
    }
}
