use crate::session::result::QuizResult;
use crate::session::setup::ScoringMode;

pub const POINTS_PER_CORRECT: u32 = 10;
pub const FAST_ANSWER_BONUS: u32 = 5;
pub const FAST_ANSWER_SECS: f64 = 10.0;
pub const CHALLENGE_HARD_BONUS: u32 = 8;
pub const MEDIUM_BONUS: u32 = 3;
pub const HARD_BONUS: u32 = 5;

/// Score for a finished quiz: ten points per correct answer plus a
/// mode-dependent bonus. Depends on nothing but its arguments.
pub fn compute_score(result: &QuizResult, mode: ScoringMode) -> u32 {
    result.correct_answers * POINTS_PER_CORRECT + bonus(result, mode)
}

pub fn bonus(result: &QuizResult, mode: ScoringMode) -> u32 {
    match mode {
        ScoringMode::Timed => {
            let fast = result
                .answers
                .iter()
                .filter(|a| a.is_correct && a.time_spent < FAST_ANSWER_SECS)
                .count() as u32;
            fast * FAST_ANSWER_BONUS
        }
        // Counts every hard question seen, answered correctly or not.
        ScoringMode::Challenge => result.difficulty_levels.hard * CHALLENGE_HARD_BONUS,
        ScoringMode::Standard => {
            result.difficulty_levels.medium * MEDIUM_BONUS
                + result.difficulty_levels.hard * HARD_BONUS
        }
    }
}
