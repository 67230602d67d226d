pub mod error;
pub mod extract;
pub mod fallback;
pub mod gemini;
pub mod mock;
pub mod prompt;

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::generator::error::FetchError;
use crate::session::question::{Difficulty, QuizQuestion};
use crate::session::setup::{Category, QuizConfiguration};

/// Shown when recommendations cannot be generated.
pub const FALLBACK_TIPS: [&str; 3] = [
    "Review key concepts in textbooks or online resources.",
    "Practice with additional quizzes on the topic.",
    "Consider watching educational videos on the subject.",
];

/// Sends one prompt to a text-generation backend and returns the raw
/// generated text. Implementations make a single attempt.
pub trait QuestionFetcher: Send + Sync {
    fn fetch(&self, prompt: &str) -> Result<String, FetchError>;
}

impl<T: QuestionFetcher + ?Sized> QuestionFetcher for Arc<T> {
    fn fetch(&self, prompt: &str) -> Result<String, FetchError> {
        (**self).fetch(prompt)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum QuestionOrigin {
    Remote,
    Fallback { reason: String },
}

#[derive(Clone, Debug)]
pub struct SourcedQuestions {
    pub questions: Vec<QuizQuestion>,
    pub origin: QuestionOrigin,
}

impl SourcedQuestions {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, QuestionOrigin::Fallback { .. })
    }
}

/// Remote generation with an offline bank behind it. Never fails.
pub struct QuestionSource {
    fetcher: Box<dyn QuestionFetcher>,
}

impl QuestionSource {
    pub fn new(fetcher: Box<dyn QuestionFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn offline() -> Self {
        Self::new(Box::new(gemini::DisabledFetcher))
    }

    pub fn questions_for(&self, config: &QuizConfiguration) -> SourcedQuestions {
        self.get_questions(
            config.category.id(),
            config.difficulty,
            config.question_count as usize,
        )
    }

    pub fn get_questions(&self, category: &str, difficulty: Difficulty, count: usize) -> SourcedQuestions {
        let label = category_label(category);
        let remote = self
            .fetcher
            .fetch(&prompt::questions_prompt(&label, difficulty, count))
            .and_then(|text| extract::parse_questions(&text, category, difficulty, count));

        match remote {
            Ok(questions) => {
                info!(category, count = questions.len(), "using generated questions");
                SourcedQuestions {
                    questions,
                    origin: QuestionOrigin::Remote,
                }
            }
            Err(e) => {
                warn!(category, "question generation failed, using built-in questions: {e}");
                SourcedQuestions {
                    questions: fallback::fallback_questions(category, &label, difficulty, count),
                    origin: QuestionOrigin::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Up to three short study tips for the missed questions.
    pub fn study_recommendations(&self, category: &str, weak_areas: &[String]) -> Vec<String> {
        if weak_areas.is_empty() {
            return fallback_tips();
        }
        let label = category_label(category);
        let tips = self
            .fetcher
            .fetch(&prompt::recommendations_prompt(&label, weak_areas))
            .map(|text| extract::split_recommendations(&text));
        match tips {
            Ok(tips) if !tips.is_empty() => tips,
            Ok(_) => fallback_tips(),
            Err(e) => {
                warn!("study recommendations failed: {e}");
                fallback_tips()
            }
        }
    }
}

fn fallback_tips() -> Vec<String> {
    FALLBACK_TIPS.iter().map(|t| t.to_string()).collect()
}

fn category_label(category: &str) -> String {
    Category::from_str(category)
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|_| category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::mock::MockFetcher;

    const TWO_EASY: &str = r#"[
        {"question": "Q1?", "options": ["a", "b", "c", "d"], "correctAnswer": "a", "difficulty": "easy"},
        {"question": "Q2?", "options": ["a", "b", "c", "d"], "correctAnswer": "b", "difficulty": "easy"}
    ]"#;

    #[test]
    fn test_remote_questions_are_used() {
        let source = QuestionSource::new(Box::new(MockFetcher::with_fixed_reply(TWO_EASY)));
        let sourced = source.get_questions("javascript", Difficulty::Easy, 2);
        assert_eq!(sourced.origin, QuestionOrigin::Remote);
        assert_eq!(sourced.questions.len(), 2);
        assert_eq!(sourced.questions[1].id, "javascript-easy-1");
    }

    #[test]
    fn test_prompt_uses_display_name() {
        let fetcher = Arc::new(MockFetcher::with_fixed_reply(TWO_EASY));
        let source = QuestionSource::new(Box::new(Arc::clone(&fetcher)));
        source.get_questions("csharp", Difficulty::Medium, 2);
        assert_eq!(fetcher.call_count(), 1);
        assert!(fetcher.last_prompt().unwrap().contains("about C# programming"));
    }

    #[test]
    fn test_failure_falls_back_with_reason() {
        let source = QuestionSource::new(Box::new(MockFetcher::failing()));
        let sourced = source.get_questions("python", Difficulty::Easy, 3);
        assert!(sourced.is_fallback());
        assert_eq!(sourced.questions.len(), 3);
        match sourced.origin {
            QuestionOrigin::Fallback { reason } => assert!(reason.contains("network")),
            QuestionOrigin::Remote => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_each_request_makes_one_attempt() {
        let fetcher = Arc::new(MockFetcher::scripted(vec![
            Err(FetchError::Timeout(15)),
            Ok(TWO_EASY.to_string()),
        ]));
        let source = QuestionSource::new(Box::new(Arc::clone(&fetcher)));
        assert!(source.get_questions("python", Difficulty::Easy, 2).is_fallback());
        assert!(!source.get_questions("python", Difficulty::Easy, 2).is_fallback());
        assert_eq!(fetcher.call_count(), 2);
    }

    #[test]
    fn test_unparsable_reply_falls_back() {
        let source = QuestionSource::new(Box::new(MockFetcher::with_fixed_reply("no questions today")));
        let sourced = source.get_questions("react", Difficulty::Hard, 1);
        assert!(sourced.is_fallback());
        assert_eq!(sourced.questions[0].id, "react3");
    }

    #[test]
    fn test_unknown_category_offline_never_fails() {
        let source = QuestionSource::offline();
        let sourced = source.get_questions("brainfuck", Difficulty::Easy, 5);
        assert!(sourced.is_fallback());
        assert!(sourced.questions.len() <= 5);
        assert!(!sourced.questions.is_empty());
    }

    #[test]
    fn test_recommendations_split_reply() {
        let source = QuestionSource::new(Box::new(MockFetcher::with_fixed_reply(
            "1. Study hoisting.\n2. Practice promises.\n3. Read about closures.",
        )));
        let tips = source.study_recommendations("javascript", &["What is a closure?".to_string()]);
        assert_eq!(tips.len(), 3);
        assert_eq!(tips[0], "Study hoisting.");
    }

    #[test]
    fn test_recommendations_fall_back_on_error() {
        let source = QuestionSource::new(Box::new(MockFetcher::failing()));
        let tips = source.study_recommendations("javascript", &["q".to_string()]);
        assert_eq!(tips, fallback_tips());
    }

    #[test]
    fn test_recommendations_skip_remote_when_nothing_missed() {
        let fetcher = Arc::new(MockFetcher::failing());
        let source = QuestionSource::new(Box::new(Arc::clone(&fetcher)));
        assert_eq!(source.study_recommendations("go", &[]), fallback_tips());
        assert_eq!(fetcher.call_count(), 0);
    }
}
