use rust_embed::Embed;
use tracing::warn;

use crate::session::question::{Difficulty, QuizQuestion};

#[derive(Embed)]
#[folder = "assets/questions/"]
struct QuestionAssets;

/// Bundled questions for a category id, empty when none ship for it.
pub fn bank(category: &str) -> Vec<QuizQuestion> {
    let Some(file) = QuestionAssets::get(&format!("{category}.json")) else {
        return Vec::new();
    };
    match serde_json::from_slice::<Vec<QuizQuestion>>(file.data.as_ref()) {
        Ok(questions) => questions,
        Err(e) => {
            warn!(category, "bundled question bank is invalid: {e}");
            Vec::new()
        }
    }
}

pub fn bundled_categories() -> Vec<String> {
    QuestionAssets::iter()
        .filter_map(|f| f.strip_suffix(".json").map(str::to_string))
        .collect()
}

fn generic_questions(category: &str, label: &str, difficulty: Difficulty) -> Vec<QuizQuestion> {
    vec![
        QuizQuestion {
            id: "generic1".to_string(),
            question: format!("What is a common use case for {label}?"),
            options: vec![
                "Building web applications".to_string(),
                "Data analysis and scientific computing".to_string(),
                "System programming and automation".to_string(),
                "Mobile app development".to_string(),
            ],
            correct_answer: "Building web applications".to_string(),
            difficulty,
            explanation: format!(
                "{label} is commonly used for various programming tasks including web development."
            ),
        },
        QuizQuestion {
            id: "generic2".to_string(),
            question: format!("Which of the following is a best practice in {label}?"),
            options: vec![
                "Writing clear and readable code".to_string(),
                "Using as few comments as possible".to_string(),
                "Nesting functions as deeply as possible".to_string(),
                "Avoiding version control".to_string(),
            ],
            correct_answer: "Writing clear and readable code".to_string(),
            difficulty,
            explanation: format!(
                "Writing clear and readable code is a universal best practice in all programming languages including {label}."
            ),
        },
    ]
    .into_iter()
    .map(|mut q| {
        q.id = format!("{category}-{}", q.id);
        q
    })
    .collect()
}

/// Deterministic offline question list. The bank is padded with generic
/// filler when it holds fewer than `count`; questions of the requested
/// difficulty are preferred only when there are enough of them. The result
/// may be shorter than `count` and never repeats a question.
pub fn fallback_questions(
    category: &str,
    label: &str,
    difficulty: Difficulty,
    count: usize,
) -> Vec<QuizQuestion> {
    let mut pool = bank(category);
    if pool.len() < count {
        pool.extend(generic_questions(category, label, difficulty));
    }

    let matching: Vec<&QuizQuestion> = pool.iter().filter(|q| q.difficulty == difficulty).collect();
    if matching.len() >= count {
        return matching.into_iter().take(count).cloned().collect();
    }
    pool.truncate(count);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_banks_are_well_formed() {
        let categories = bundled_categories();
        assert!(categories.contains(&"javascript".to_string()));
        for category in categories {
            let questions = bank(&category);
            assert!(!questions.is_empty(), "{category} bank is empty");
            assert!(questions.iter().all(QuizQuestion::is_well_formed));
        }
    }

    #[test]
    fn test_prefers_requested_difficulty_when_enough() {
        let questions = fallback_questions("python", "Python", Difficulty::Hard, 1);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "py3");
    }

    #[test]
    fn test_mixes_difficulties_when_not_enough() {
        let questions = fallback_questions("javascript", "JavaScript", Difficulty::Easy, 2);
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["js1", "js2"]);
    }

    #[test]
    fn test_pads_with_generic_questions() {
        let questions = fallback_questions("react", "React", Difficulty::Medium, 5);
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[3].id, "react-generic1");
        assert_eq!(questions[4].question, "Which of the following is a best practice in React?");
        assert_eq!(questions[4].difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_unknown_category_gets_generic_filler_only() {
        let questions = fallback_questions("cobol", "cobol", Difficulty::Hard, 10);
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(QuizQuestion::is_well_formed));
        assert!(questions.iter().all(|q| q.difficulty == Difficulty::Hard));

        let single = fallback_questions("cobol", "cobol", Difficulty::Hard, 1);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(fallback_questions("python", "Python", Difficulty::Easy, 0).is_empty());
    }
}
