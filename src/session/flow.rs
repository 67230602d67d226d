//! Screen-level state machine for the quiz flow.
//!
//! `reduce` is a pure function from (state, event, now) to the next state
//! plus a list of effects for the shell to carry out. Nothing in here
//! touches the terminal, the network or the disk.

use std::time::Instant;

use tracing::debug;

use crate::engine::scoring;
use crate::session::question::QuizQuestion;
use crate::session::quiz::{Advance, QuizSession, TickOutcome};
use crate::session::result::QuizResult;
use crate::session::setup::{QuizConfiguration, ScoringMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Config,
    Quiz,
    Results,
    History,
}

#[derive(Clone, Debug)]
pub enum QuizPhase {
    Loading,
    /// The source came back with nothing to ask.
    Empty,
    Active(QuizSession),
}

#[derive(Clone, Debug)]
pub enum FlowState {
    Welcome,
    Config,
    Quiz {
        config: QuizConfiguration,
        mode: ScoringMode,
        phase: QuizPhase,
    },
    Results {
        config: QuizConfiguration,
        mode: ScoringMode,
        result: QuizResult,
        score: u32,
    },
    History,
}

impl FlowState {
    pub fn screen(&self) -> Screen {
        match self {
            FlowState::Welcome => Screen::Welcome,
            FlowState::Config => Screen::Config,
            FlowState::Quiz { .. } => Screen::Quiz,
            FlowState::Results { .. } => Screen::Results,
            FlowState::History => Screen::History,
        }
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match self {
            FlowState::Quiz {
                phase: QuizPhase::Active(session),
                ..
            } => Some(session),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum FlowEvent {
    Start,
    OpenHistory,
    Back,
    Submit {
        config: QuizConfiguration,
        mode: ScoringMode,
    },
    QuestionsLoaded(Vec<QuizQuestion>),
    /// Option index, or `None` to skip.
    Answer(Option<usize>),
    Tick,
    Advance,
    TryAgain,
    ClearHistory,
    ExportHistory,
    ExportResult,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    FetchQuestions(QuizConfiguration),
    /// Persist a finished quiz. `score` is final and travels with the result.
    SaveResult {
        config: QuizConfiguration,
        mode: ScoringMode,
        result: QuizResult,
        score: u32,
    },
    LoadHistory,
    ClearHistory,
    ExportHistory,
    ExportResult,
    TimeUp,
}

pub fn reduce(state: FlowState, event: FlowEvent, now: Instant) -> (FlowState, Vec<Effect>) {
    let before = state.screen();
    let (next, effects) = match (state, event) {
        (FlowState::Welcome, FlowEvent::Start) => (FlowState::Config, Vec::new()),
        (FlowState::Welcome, FlowEvent::OpenHistory) => {
            (FlowState::History, vec![Effect::LoadHistory])
        }

        (FlowState::Config, FlowEvent::Submit { config, mode }) => (
            FlowState::Quiz {
                config,
                mode,
                phase: QuizPhase::Loading,
            },
            vec![Effect::FetchQuestions(config)],
        ),
        (FlowState::Config, FlowEvent::Back) => (FlowState::Welcome, Vec::new()),

        (FlowState::Quiz { .. }, FlowEvent::Back) => {
            debug!("quiz abandoned");
            (FlowState::Welcome, Vec::new())
        }
        (
            FlowState::Quiz {
                config,
                mode,
                phase: QuizPhase::Loading,
            },
            FlowEvent::QuestionsLoaded(questions),
        ) => {
            let phase = match QuizSession::new(questions, config.time_limit, now) {
                Some(session) => QuizPhase::Active(session),
                None => QuizPhase::Empty,
            };
            (FlowState::Quiz { config, mode, phase }, Vec::new())
        }
        (
            FlowState::Quiz {
                config,
                mode,
                phase: QuizPhase::Active(session),
            },
            event,
        ) => return reduce_active(config, mode, session, event, now, before),

        (FlowState::Results { .. }, FlowEvent::TryAgain) => (FlowState::Config, Vec::new()),
        (FlowState::Results { .. }, FlowEvent::Back) => (FlowState::Welcome, Vec::new()),
        (state @ FlowState::Results { .. }, FlowEvent::ExportResult) => {
            (state, vec![Effect::ExportResult])
        }

        (FlowState::History, FlowEvent::Back) => (FlowState::Welcome, Vec::new()),
        (FlowState::History, FlowEvent::ClearHistory) => {
            (FlowState::History, vec![Effect::ClearHistory])
        }
        (FlowState::History, FlowEvent::ExportHistory) => {
            (FlowState::History, vec![Effect::ExportHistory])
        }

        (state, _) => (state, Vec::new()),
    };
    log_transition(before, &next);
    (next, effects)
}

fn reduce_active(
    config: QuizConfiguration,
    mode: ScoringMode,
    mut session: QuizSession,
    event: FlowEvent,
    now: Instant,
    before: Screen,
) -> (FlowState, Vec<Effect>) {
    let mut effects = Vec::new();
    match event {
        FlowEvent::Answer(choice) => {
            session.submit(choice, now);
        }
        FlowEvent::Tick => {
            if session.tick(now) == TickOutcome::TimedOut {
                effects.push(Effect::TimeUp);
            }
        }
        FlowEvent::Advance => {
            if let Advance::Finished(result) = session.advance(now) {
                let score = scoring::compute_score(&result, mode);
                effects.push(Effect::SaveResult {
                    config,
                    mode,
                    result: result.clone(),
                    score,
                });
                let next = FlowState::Results {
                    config,
                    mode,
                    result,
                    score,
                };
                log_transition(before, &next);
                return (next, effects);
            }
        }
        _ => {}
    }
    let state = FlowState::Quiz {
        config,
        mode,
        phase: QuizPhase::Active(session),
    };
    (state, effects)
}

fn log_transition(before: Screen, next: &FlowState) {
    let after = next.screen();
    if before != after {
        debug!(from = ?before, to = ?after, "screen transition");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::question::Difficulty;
    use crate::session::setup::Category;

    fn questions(n: usize, difficulty: Difficulty) -> Vec<QuizQuestion> {
        (0..n)
            .map(|i| QuizQuestion {
                id: format!("q{i}"),
                question: format!("Question {i}?"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: "c".to_string(),
                difficulty,
                explanation: String::new(),
            })
            .collect()
    }

    fn config(count: u32) -> QuizConfiguration {
        QuizConfiguration::new(Category::Javascript, Difficulty::Easy, count, 30).unwrap()
    }

    fn started(count: usize, t0: Instant) -> FlowState {
        let (state, effects) = reduce(
            FlowState::Config,
            FlowEvent::Submit {
                config: config(count as u32),
                mode: ScoringMode::Standard,
            },
            t0,
        );
        assert_eq!(effects, vec![Effect::FetchQuestions(config(count as u32))]);
        let (state, _) = reduce(
            state,
            FlowEvent::QuestionsLoaded(questions(count, Difficulty::Easy)),
            t0,
        );
        state
    }

    #[test]
    fn test_welcome_to_config_to_loading() {
        let t0 = Instant::now();
        let (state, effects) = reduce(FlowState::Welcome, FlowEvent::Start, t0);
        assert_eq!(state.screen(), Screen::Config);
        assert!(effects.is_empty());

        let (state, _) = reduce(
            state,
            FlowEvent::Submit {
                config: config(3),
                mode: ScoringMode::Timed,
            },
            t0,
        );
        assert!(matches!(
            state,
            FlowState::Quiz {
                phase: QuizPhase::Loading,
                mode: ScoringMode::Timed,
                ..
            }
        ));
    }

    #[test]
    fn test_history_reachable_from_welcome_only() {
        let t0 = Instant::now();
        let (state, effects) = reduce(FlowState::Welcome, FlowEvent::OpenHistory, t0);
        assert_eq!(state.screen(), Screen::History);
        assert_eq!(effects, vec![Effect::LoadHistory]);

        let (state, effects) = reduce(FlowState::Config, FlowEvent::OpenHistory, t0);
        assert_eq!(state.screen(), Screen::Config);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_empty_question_list_enters_empty_phase() {
        let t0 = Instant::now();
        let (state, _) = reduce(
            FlowState::Config,
            FlowEvent::Submit {
                config: config(3),
                mode: ScoringMode::Standard,
            },
            t0,
        );
        let (state, _) = reduce(state, FlowEvent::QuestionsLoaded(Vec::new()), t0);
        assert!(matches!(
            state,
            FlowState::Quiz {
                phase: QuizPhase::Empty,
                ..
            }
        ));
        let (state, _) = reduce(state, FlowEvent::Back, t0);
        assert_eq!(state.screen(), Screen::Welcome);
    }

    #[test]
    fn test_back_abandons_without_saving() {
        let t0 = Instant::now();
        let state = started(2, t0);
        let (state, _) = reduce(state, FlowEvent::Answer(Some(2)), t0);
        let (state, effects) = reduce(state, FlowEvent::Back, t0);
        assert_eq!(state.screen(), Screen::Welcome);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_late_questions_after_back_are_ignored() {
        let t0 = Instant::now();
        let (state, _) = reduce(
            FlowState::Config,
            FlowEvent::Submit {
                config: config(2),
                mode: ScoringMode::Standard,
            },
            t0,
        );
        let (state, _) = reduce(state, FlowEvent::Back, t0);
        let (state, effects) = reduce(
            state,
            FlowEvent::QuestionsLoaded(questions(2, Difficulty::Easy)),
            t0,
        );
        assert_eq!(state.screen(), Screen::Welcome);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_tick_timeout_emits_time_up_once() {
        let t0 = Instant::now();
        let state = started(1, t0);
        let (state, effects) = reduce(state, FlowEvent::Tick, t0 + Duration::from_secs(31));
        assert_eq!(effects, vec![Effect::TimeUp]);
        let (state, effects) = reduce(state, FlowEvent::Tick, t0 + Duration::from_secs(32));
        assert!(effects.is_empty());
        let session = state.session().unwrap();
        assert_eq!(session.result().skipped_questions, 1);
    }

    #[test]
    fn test_completion_saves_once_with_score() {
        let t0 = Instant::now();
        let state = started(1, t0);
        let (state, _) = reduce(state, FlowEvent::Answer(Some(2)), t0 + Duration::from_secs(1));
        let (state, effects) = reduce(state, FlowEvent::Advance, t0 + Duration::from_secs(2));

        match &state {
            FlowState::Results { result, score, .. } => {
                assert_eq!(result.correct_answers, 1);
                assert_eq!(*score, 10);
            }
            other => panic!("expected results, got {:?}", other.screen()),
        }
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::SaveResult { score: 10, .. }));
    }

    #[test]
    fn test_results_try_again_and_back() {
        let t0 = Instant::now();
        let results = FlowState::Results {
            config: config(1),
            mode: ScoringMode::Standard,
            result: QuizResult::new(),
            score: 0,
        };
        let (state, _) = reduce(results.clone(), FlowEvent::TryAgain, t0);
        assert_eq!(state.screen(), Screen::Config);
        let (state, _) = reduce(results.clone(), FlowEvent::Back, t0);
        assert_eq!(state.screen(), Screen::Welcome);
        let (state, effects) = reduce(results, FlowEvent::ExportResult, t0);
        assert_eq!(state.screen(), Screen::Results);
        assert_eq!(effects, vec![Effect::ExportResult]);
    }

    #[test]
    fn test_advance_before_answer_is_ignored() {
        let t0 = Instant::now();
        let state = started(2, t0);
        let (state, effects) = reduce(state, FlowEvent::Advance, t0);
        assert!(effects.is_empty());
        assert_eq!(state.session().unwrap().index(), 0);
    }
}
