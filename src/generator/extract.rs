use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::generator::error::FetchError;
use crate::session::question::{Difficulty, QuizQuestion};

static JSON_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("static regex"));

static LIST_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s+|\n\s*[-•]\s+|\n+").expect("static regex"));

const NO_EXPLANATION: &str = "No explanation provided";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    explanation: Option<String>,
}

/// First `[` through last `]` of free text.
pub fn find_json_array(text: &str) -> Option<&str> {
    JSON_ARRAY.find(text).map(|m| m.as_str())
}

/// Turn generated text into validated questions, at most `count` of them.
/// Elements that fail to decode or validate are dropped.
pub fn parse_questions(
    text: &str,
    category: &str,
    difficulty: Difficulty,
    count: usize,
) -> Result<Vec<QuizQuestion>, FetchError> {
    let array = find_json_array(text).ok_or(FetchError::NoJsonArray)?;
    let values: Vec<Value> = serde_json::from_str(array)?;

    let questions: Vec<QuizQuestion> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value::<GeneratedQuestion>(v).ok())
        .map(|g| QuizQuestion {
            id: String::new(),
            question: g.question,
            options: g.options,
            correct_answer: g.correct_answer,
            difficulty: g.difficulty,
            explanation: g
                .explanation
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| NO_EXPLANATION.to_string()),
        })
        .filter(|q| {
            let ok = !q.question.trim().is_empty() && q.is_well_formed();
            if !ok {
                debug!(question = %q.question, "dropping malformed generated question");
            }
            ok
        })
        .take(count)
        .enumerate()
        .map(|(index, q)| QuizQuestion {
            id: format!("{category}-{}-{index}", difficulty.as_str()),
            ..q
        })
        .collect();

    if questions.is_empty() {
        return Err(FetchError::NoValidQuestions);
    }
    Ok(questions)
}

/// Split a numbered or bulleted reply into at most three items.
pub fn split_recommendations(text: &str) -> Vec<String> {
    LIST_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .take(3)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"Here are your questions:
```json
[
  {"question": "What does len() return?", "options": ["Length", "Type", "Id", "Hash"],
   "correctAnswer": "Length", "difficulty": "easy", "explanation": "It returns the item count."},
  {"question": "Which is immutable?", "options": ["list", "dict", "tuple", "set"],
   "correctAnswer": "tuple", "difficulty": "expert"}
]
```
Good luck!"#;

    #[test]
    fn test_finds_array_inside_prose() {
        let array = find_json_array("intro [1, [2]] outro").unwrap();
        assert_eq!(array, "[1, [2]]");
        assert!(find_json_array("no brackets here").is_none());
    }

    #[test]
    fn test_parses_and_normalizes_questions() {
        let questions = parse_questions(REPLY, "python", Difficulty::Easy, 5).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "python-easy-0");
        assert_eq!(questions[0].difficulty, Difficulty::Easy);
        assert_eq!(questions[1].id, "python-easy-1");
        assert_eq!(questions[1].difficulty, Difficulty::Medium);
        assert_eq!(questions[1].explanation, NO_EXPLANATION);
    }

    #[test]
    fn test_truncates_to_count() {
        let questions = parse_questions(REPLY, "python", Difficulty::Easy, 1).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_drops_questions_with_bad_options() {
        let text = r#"[
            {"question": "Three options?", "options": ["a", "b", "c"], "correctAnswer": "a"},
            {"question": "Answer missing?", "options": ["a", "b", "c", "d"], "correctAnswer": "z"},
            {"question": "Fine?", "options": ["a", "b", "c", "d"], "correctAnswer": "d"},
            {"options": ["a", "b", "c", "d"], "correctAnswer": "d"}
        ]"#;
        let questions = parse_questions(text, "go", Difficulty::Hard, 5).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Fine?");
        assert_eq!(questions[0].id, "go-hard-0");
    }

    #[test]
    fn test_ids_stay_dense_after_drops() {
        let text = r#"[
            {"question": "First?", "options": ["a", "b", "c", "d"], "correctAnswer": "a"},
            {"question": "Broken?", "options": ["a", "b"], "correctAnswer": "a"},
            {"question": "Third?", "options": ["a", "b", "c", "d"], "correctAnswer": "b"}
        ]"#;
        let ids: Vec<String> = parse_questions(text, "python", Difficulty::Easy, 5)
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec!["python-easy-0", "python-easy-1"]);
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            parse_questions("sorry, I can't", "go", Difficulty::Easy, 3),
            Err(FetchError::NoJsonArray)
        ));
        assert!(matches!(
            parse_questions("[not json]", "go", Difficulty::Easy, 3),
            Err(FetchError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_questions("[1, 2]", "go", Difficulty::Easy, 3),
            Err(FetchError::NoValidQuestions)
        ));
    }

    #[test]
    fn test_split_numbered_list() {
        let tips = split_recommendations(
            "1. Review closures.\n2. Practice async code.\n3. Read the docs.\n4. Extra.",
        );
        assert_eq!(
            tips,
            vec!["Review closures.", "Practice async code.", "Read the docs."]
        );
    }

    #[test]
    fn test_split_keeps_numbers_inside_sentences() {
        let tips = split_recommendations("1. Revisit Q2. Then retry.\n2. Learn ES6. Arrow functions too.");
        assert_eq!(
            tips,
            vec!["Revisit Q2. Then retry.", "Learn ES6. Arrow functions too."]
        );
    }

    #[test]
    fn test_split_bullets_and_blank_lines() {
        let tips = split_recommendations("Try these:\n- Drill hooks\n\n• Build a small app");
        assert_eq!(tips, vec!["Try these:", "Drill hooks", "Build a small app"]);
    }
}
