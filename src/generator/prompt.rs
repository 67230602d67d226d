use crate::session::question::Difficulty;

pub fn questions_prompt(category: &str, difficulty: Difficulty, count: usize) -> String {
    let difficulty = difficulty.as_str();
    format!(
        "Generate {count} multiple-choice quiz questions about {category} programming language at {difficulty} difficulty level.
Each question should have 4 options with only one correct answer.
Make sure questions and options are specifically about {category} concepts, syntax, and best practices.
Do not use generic placeholders like \"Option A\" - provide real content for each answer.
Format the response as a JSON array with the following structure for each question:
{{
  \"question\": \"Detailed question about {category} here?\",
  \"options\": [\"First real option\", \"Second real option\", \"Third real option\", \"Fourth real option\"],
  \"correctAnswer\": \"The correct option text here\",
  \"difficulty\": \"{difficulty}\",
  \"explanation\": \"Brief explanation of why the answer is correct\"
}}"
    )
}

pub fn recommendations_prompt(category: &str, weak_areas: &[String]) -> String {
    format!(
        "Based on quiz performance in {category}, the user is struggling with these concepts: {}.

Provide 3 specific, focused study recommendations to help them improve in these areas. Each recommendation should be brief (max 1 sentence) and actionable.",
        weak_areas.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_prompt_embeds_parameters() {
        let prompt = questions_prompt("Python", Difficulty::Hard, 7);
        assert!(prompt.starts_with("Generate 7 multiple-choice quiz questions about Python"));
        assert!(prompt.contains("at hard difficulty level"));
        assert!(prompt.contains("\"correctAnswer\""));
        assert!(prompt.contains("\"difficulty\": \"hard\""));
    }

    #[test]
    fn test_recommendations_prompt_lists_weak_areas() {
        let prompt = recommendations_prompt("Ruby", &["blocks".to_string(), "mixins".to_string()]);
        assert!(prompt.contains("in Ruby"));
        assert!(prompt.contains("blocks, mixins."));
    }
}
