use serde::{Deserialize, Serialize};

use crate::session::question::{Difficulty, QuizQuestion};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCounts {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyCounts {
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    fn bump(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Hard => self.hard += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question: String,
    /// `None` when the question was skipped or timed out.
    #[serde(default)]
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    /// Seconds from the question appearing to the answer.
    #[serde(default)]
    pub time_spent: f64,
}

impl AnswerRecord {
    pub fn is_skipped(&self) -> bool {
        self.user_answer.is_none()
    }
}

/// Outcome of one quiz. Grows by one answer per question; the counters
/// always agree with `answers`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizResult {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub skipped_questions: u32,
    pub time_elapsed: f64,
    pub difficulty_levels: DifficultyCounts,
    pub answers: Vec<AnswerRecord>,
}

impl QuizResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the outcome for `question`. A `None` answer counts as skipped.
    pub fn record(
        &mut self,
        question: &QuizQuestion,
        user_answer: Option<String>,
        time_spent: f64,
    ) -> &AnswerRecord {
        let is_correct = question.is_correct(user_answer.as_deref());
        if is_correct {
            self.correct_answers += 1;
        } else if user_answer.is_some() {
            self.incorrect_answers += 1;
        } else {
            self.skipped_questions += 1;
        }
        self.difficulty_levels.bump(question.difficulty);
        self.total_questions += 1;
        self.answers.push(AnswerRecord {
            question: question.question.clone(),
            user_answer,
            correct_answer: question.correct_answer.clone(),
            is_correct,
            time_spent: time_spent.max(0.0),
        });
        &self.answers[self.answers.len() - 1]
    }

    /// correct + incorrect + skipped == total == answers.len()
    pub fn is_consistent(&self) -> bool {
        let tallied = self.correct_answers + self.incorrect_answers + self.skipped_questions;
        tallied == self.total_questions && self.answers.len() == self.total_questions as usize
    }

    /// Fraction of questions answered correctly, 0.0 for an empty result.
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / self.total_questions as f64
    }

    pub fn average_time_spent(&self) -> f64 {
        if self.answers.is_empty() {
            return 0.0;
        }
        self.answers.iter().map(|a| a.time_spent).sum::<f64>() / self.answers.len() as f64
    }

    /// Questions answered wrong or skipped, in quiz order.
    pub fn missed_questions(&self) -> Vec<&str> {
        self.answers
            .iter()
            .filter(|a| !a.is_correct)
            .map(|a| a.question.as_str())
            .collect()
    }
}
