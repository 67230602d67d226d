use std::time::Instant;

use crate::session::question::QuizQuestion;
use crate::session::result::{AnswerRecord, QuizResult};

/// The answer given to the current question. Set once, never replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Answered {
    pub selected: Option<usize>,
    pub correct: bool,
    pub timed_out: bool,
    /// Countdown value at the moment of answering.
    pub time_left: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    TimedOut,
    /// The current question is already answered; the timer is stopped.
    Frozen,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Advance {
    NotAnswered,
    Next,
    Finished(QuizResult),
}

/// In-progress quiz: the question list, the countdown for the current
/// question and the result accumulated so far.
#[derive(Clone, Debug)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    index: usize,
    time_limit: u32,
    started_at: Instant,
    question_started_at: Instant,
    answered: Option<Answered>,
    result: QuizResult,
}

impl QuizSession {
    /// Returns `None` when there is nothing to ask.
    pub fn new(questions: Vec<QuizQuestion>, time_limit: u32, now: Instant) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        Some(Self {
            questions,
            index: 0,
            time_limit,
            started_at: now,
            question_started_at: now,
            answered: None,
            result: QuizResult::new(),
        })
    }

    pub fn current(&self) -> &QuizQuestion {
        &self.questions[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn answered(&self) -> Option<&Answered> {
        self.answered.as_ref()
    }

    pub fn result(&self) -> &QuizResult {
        &self.result
    }

    /// Fraction of questions already behind us, for the progress bar.
    pub fn progress(&self) -> f64 {
        self.index as f64 / self.questions.len() as f64
    }

    /// Whole seconds left on the countdown. Frozen once answered.
    pub fn time_left(&self, now: Instant) -> u32 {
        if let Some(ref answered) = self.answered {
            return answered.time_left;
        }
        let elapsed = now.saturating_duration_since(self.question_started_at).as_secs();
        (self.time_limit as u64).saturating_sub(elapsed) as u32
    }

    /// Advance the countdown. Reaching zero submits a skip.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.answered.is_some() {
            return TickOutcome::Frozen;
        }
        match self.time_left(now) {
            0 => {
                self.record(None, now, true);
                TickOutcome::TimedOut
            }
            left => TickOutcome::Running(left),
        }
    }

    /// Submit an answer by option index, or `None` to skip. Only the first
    /// submission for a question counts; later ones return `None`.
    pub fn submit(&mut self, choice: Option<usize>, now: Instant) -> Option<&AnswerRecord> {
        if self.answered.is_some() {
            return None;
        }
        // An index past the options is treated as no choice at all.
        let choice = choice.filter(|&i| i < self.current().options.len());
        Some(self.record(choice, now, false))
    }

    fn record(&mut self, choice: Option<usize>, now: Instant, timed_out: bool) -> &AnswerRecord {
        let time_left = self.time_left(now);
        let question = &self.questions[self.index];
        let answer = choice.and_then(|i| question.option(i)).map(str::to_string);
        let time_spent = now
            .saturating_duration_since(self.question_started_at)
            .as_secs_f64();

        self.answered = Some(Answered {
            selected: choice,
            correct: question.is_correct(answer.as_deref()),
            timed_out,
            time_left,
        });
        self.result.record(question, answer, time_spent)
    }

    /// Move past an answered question. On the last question this hands back
    /// the finished result with the total elapsed time filled in.
    pub fn advance(&mut self, now: Instant) -> Advance {
        if self.answered.is_none() {
            return Advance::NotAnswered;
        }
        if self.is_last() {
            let mut result = self.result.clone();
            result.time_elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
            return Advance::Finished(result);
        }
        self.index += 1;
        self.answered = None;
        self.question_started_at = now;
        Advance::Next
    }
}
