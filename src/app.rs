use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::event::AppEvent;
use crate::generator::{QuestionOrigin, QuestionSource, SourcedQuestions};
use crate::session::flow::{Effect, FlowEvent, FlowState, QuizPhase, Screen, reduce};
use crate::session::question::ALL_DIFFICULTIES;
use crate::session::setup::{
    ALL_CATEGORIES, ALL_MODES, Category, MAX_QUESTIONS, MAX_TIME_LIMIT, MIN_QUESTIONS,
    MIN_TIME_LIMIT, QuizConfiguration, ScoringMode,
};
use crate::store::export;
use crate::store::history::{HistoryFilter, HistoryStore, filter_entries, filter_options};
use crate::store::schema::HistoryEntry;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

const NOTICE_TTL: Duration = Duration::from_secs(4);
const TIME_LIMIT_STEP: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub expires_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Category,
    Difficulty,
    Questions,
    TimeLimit,
    Mode,
    Theme,
}

pub const FORM_FIELDS: [FormField; 6] = [
    FormField::Category,
    FormField::Difficulty,
    FormField::Questions,
    FormField::TimeLimit,
    FormField::Mode,
    FormField::Theme,
];

/// Editable copy of the quiz setup. Numbers are kept in range while
/// editing, so submitting never fails.
#[derive(Clone, Debug)]
pub struct ConfigForm {
    pub selected: usize,
    pub quiz: QuizConfiguration,
    pub mode: ScoringMode,
}

impl ConfigForm {
    pub fn from_config(config: &Config) -> Self {
        Self {
            selected: 0,
            quiz: config.quiz_configuration(),
            mode: config.scoring_mode(),
        }
    }

    pub fn field(&self) -> FormField {
        FORM_FIELDS[self.selected.min(FORM_FIELDS.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % FORM_FIELDS.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(FORM_FIELDS.len() - 1);
    }

    /// Step the selected field. Theme is handled by the app since it
    /// swaps the loaded palette.
    pub fn cycle(&mut self, forward: bool) {
        match self.field() {
            FormField::Category => {
                self.quiz.category = step(&ALL_CATEGORIES, self.quiz.category, forward);
            }
            FormField::Difficulty => {
                self.quiz.difficulty = step(&ALL_DIFFICULTIES, self.quiz.difficulty, forward);
            }
            FormField::Questions => {
                self.quiz.question_count = if forward {
                    (self.quiz.question_count + 1).min(MAX_QUESTIONS)
                } else {
                    self.quiz.question_count.saturating_sub(1).max(MIN_QUESTIONS)
                };
            }
            FormField::TimeLimit => {
                self.quiz.time_limit = if forward {
                    (self.quiz.time_limit + TIME_LIMIT_STEP).min(MAX_TIME_LIMIT)
                } else {
                    self.quiz
                        .time_limit
                        .saturating_sub(TIME_LIMIT_STEP)
                        .max(MIN_TIME_LIMIT)
                };
            }
            FormField::Mode => self.mode = step(&ALL_MODES, self.mode, forward),
            FormField::Theme => {}
        }
    }
}

fn step<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else if idx == 0 {
        all.len() - 1
    } else {
        idx - 1
    };
    all[next]
}

/// Toggle target in the history filter bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterOption {
    Category(String),
    Mode(String),
}

#[derive(Default)]
pub struct HistoryView {
    pub entries: Vec<HistoryEntry>,
    pub filter: HistoryFilter,
    pub filter_cursor: usize,
    pub selected: usize,
    pub confirm_clear: bool,
}

impl HistoryView {
    pub fn visible(&self) -> Vec<&HistoryEntry> {
        filter_entries(&self.entries, &self.filter)
    }

    pub fn options(&self) -> Vec<FilterOption> {
        let (categories, modes) = filter_options(&self.entries);
        categories
            .into_iter()
            .map(FilterOption::Category)
            .chain(modes.into_iter().map(FilterOption::Mode))
            .collect()
    }

    pub fn is_active(&self, option: &FilterOption) -> bool {
        match option {
            FilterOption::Category(c) => self.filter.categories.contains(c),
            FilterOption::Mode(m) => self.filter.modes.contains(m),
        }
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
        self.filter_cursor = self.filter_cursor.min(self.options().len().saturating_sub(1));
    }
}

pub struct App {
    pub flow: FlowState,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu,
    pub form: ConfigForm,
    pub history: HistoryStore,
    pub history_view: HistoryView,
    pub notices: Vec<Notice>,
    pub recommendations: Option<Vec<String>>,
    pub recommendations_pending: bool,
    pub last_entry: Option<HistoryEntry>,
    pub review_scroll: usize,
    pub should_quit: bool,
    source: Arc<QuestionSource>,
    events_tx: Option<Sender<AppEvent>>,
    fetch_seq: u64,
    persist_config: bool,
}

impl App {
    pub fn new(config: Config, history: HistoryStore, source: QuestionSource) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let form = ConfigForm::from_config(&config);
        let last_entry = history.list().pop();

        Self {
            flow: FlowState::Welcome,
            config,
            theme,
            menu: Menu::default(),
            form,
            history,
            history_view: HistoryView::default(),
            notices: Vec::new(),
            recommendations: None,
            recommendations_pending: false,
            last_entry,
            review_scroll: 0,
            should_quit: false,
            source: Arc::new(source),
            events_tx: None,
            fetch_seq: 0,
            persist_config: false,
        }
    }

    /// Run background work on threads that post back through `tx`.
    /// Without a sender, fetches run inline.
    pub fn with_event_sender(mut self, tx: Sender<AppEvent>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    /// Write config changes to the user config file.
    pub fn with_persisted_config(mut self) -> Self {
        self.persist_config = true;
        self
    }

    pub fn screen(&self) -> Screen {
        self.flow.screen()
    }

    pub fn dispatch(&mut self, event: FlowEvent) {
        self.dispatch_at(event, Instant::now());
    }

    pub fn dispatch_at(&mut self, event: FlowEvent, now: Instant) {
        let state = std::mem::replace(&mut self.flow, FlowState::Welcome);
        let (next, effects) = reduce(state, event, now);
        self.flow = next;
        for effect in effects {
            self.run_effect(effect, now);
        }
    }

    fn run_effect(&mut self, effect: Effect, now: Instant) {
        match effect {
            Effect::FetchQuestions(quiz) => self.fetch_questions(quiz, now),
            Effect::SaveResult {
                config,
                mode,
                result,
                score,
            } => {
                let entry =
                    HistoryEntry::new(self.history.next_id(), Utc::now(), &config, mode, result, score);
                info!(
                    category = %entry.category,
                    mode = %entry.mode,
                    score = entry.score,
                    "quiz finished"
                );
                if let Err(e) = self.history.append(entry.clone()) {
                    error!("could not save result: {e:#}");
                    self.notify(NoticeKind::Error, "Could not save this result to history", now);
                }
                self.last_entry = Some(entry);
                self.review_scroll = 0;
            }
            Effect::LoadHistory => self.reload_history(),
            Effect::ClearHistory => {
                match self.history.clear() {
                    Ok(()) => self.notify(NoticeKind::Info, "History cleared", now),
                    Err(e) => {
                        error!("{e:#}");
                        self.notify(NoticeKind::Error, "Could not clear history", now);
                    }
                }
                self.reload_history();
            }
            Effect::ExportHistory => {
                let visible: Vec<HistoryEntry> =
                    self.history_view.visible().into_iter().cloned().collect();
                let outcome = export::export_history(&self.config.export_path(), &visible);
                self.report_export(outcome, now);
            }
            Effect::ExportResult => {
                let Some(entry) = self.last_entry.clone() else {
                    return;
                };
                let outcome = export::export_result(&self.config.export_path(), &entry);
                self.report_export(outcome, now);
            }
            Effect::TimeUp => self.notify(NoticeKind::Warning, "Time's up!", now),
        }
    }

    fn fetch_questions(&mut self, quiz: QuizConfiguration, now: Instant) {
        self.fetch_seq += 1;
        self.recommendations = None;
        self.recommendations_pending = false;
        let seq = self.fetch_seq;
        info!(
            category = quiz.category.id(),
            difficulty = quiz.difficulty.as_str(),
            count = quiz.question_count,
            "starting quiz"
        );

        match self.events_tx.clone() {
            Some(tx) => {
                let source = Arc::clone(&self.source);
                thread::spawn(move || {
                    let sourced = source.questions_for(&quiz);
                    let _ = tx.send(AppEvent::QuestionsReady(seq, sourced));
                });
            }
            None => {
                let sourced = self.source.questions_for(&quiz);
                self.questions_ready(seq, sourced, now);
            }
        }
    }

    pub fn questions_ready(&mut self, seq: u64, sourced: SourcedQuestions, now: Instant) {
        let waiting = matches!(
            self.flow,
            FlowState::Quiz {
                phase: QuizPhase::Loading,
                ..
            }
        );
        if seq != self.fetch_seq || !waiting {
            warn!(seq, "dropping questions for an abandoned quiz");
            return;
        }
        if let QuestionOrigin::Fallback { reason } = &sourced.origin {
            self.notify(
                NoticeKind::Warning,
                &format!("Using built-in questions ({reason})"),
                now,
            );
        }
        self.dispatch_at(FlowEvent::QuestionsLoaded(sourced.questions), now);
    }

    pub fn recommendations_ready(&mut self, seq: u64, tips: Vec<String>) {
        if seq != self.fetch_seq || self.screen() != Screen::Results {
            return;
        }
        self.recommendations_pending = false;
        self.recommendations = Some(tips);
    }

    pub fn request_recommendations(&mut self) {
        if self.recommendations_pending || self.recommendations.is_some() {
            return;
        }
        let FlowState::Results { config, result, .. } = &self.flow else {
            return;
        };
        let category = config.category.id().to_string();
        let missed: Vec<String> = result
            .missed_questions()
            .into_iter()
            .map(str::to_string)
            .collect();
        let seq = self.fetch_seq;

        match self.events_tx.clone() {
            Some(tx) => {
                self.recommendations_pending = true;
                let source = Arc::clone(&self.source);
                thread::spawn(move || {
                    let tips = source.study_recommendations(&category, &missed);
                    let _ = tx.send(AppEvent::Recommendations(seq, tips));
                });
            }
            None => {
                self.recommendations = Some(self.source.study_recommendations(&category, &missed));
            }
        }
    }

    pub fn share_results(&mut self, now: Instant) {
        if let Some(text) = self.last_entry.as_ref().map(HistoryEntry::share_text) {
            info!("{text}");
            self.notify(NoticeKind::Info, &text, now);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.notices.retain(|n| n.expires_at > now);
        if self.flow.session().is_some() {
            self.dispatch_at(FlowEvent::Tick, now);
        }
    }

    pub fn notify(&mut self, kind: NoticeKind, text: &str, now: Instant) {
        self.notices.push(Notice {
            text: text.to_string(),
            kind,
            expires_at: now + NOTICE_TTL,
        });
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    // --- welcome / config ---

    pub fn go_to_config(&mut self) {
        self.form = ConfigForm::from_config(&self.config);
        self.dispatch(FlowEvent::Start);
    }

    pub fn go_to_history(&mut self) {
        self.history_view.selected = 0;
        self.history_view.confirm_clear = false;
        self.dispatch(FlowEvent::OpenHistory);
    }

    /// Back to the setup form, prefilled with the quiz just played.
    pub fn try_again(&mut self) {
        self.form = ConfigForm::from_config(&self.config);
        self.dispatch(FlowEvent::TryAgain);
    }

    pub fn form_cycle(&mut self, forward: bool) {
        if self.form.field() == FormField::Theme {
            self.cycle_theme(forward);
        } else {
            self.form.cycle(forward);
        }
    }

    fn cycle_theme(&mut self, forward: bool) {
        let mut themes = Theme::available_themes();
        themes.sort();
        if themes.is_empty() {
            return;
        }
        let idx = themes.iter().position(|t| *t == self.config.theme);
        let next = match (idx, forward) {
            (Some(i), true) => (i + 1) % themes.len(),
            (Some(0), false) => themes.len() - 1,
            (Some(i), false) => i - 1,
            (None, _) => 0,
        };
        self.config.theme = themes[next].clone();
        if let Some(new_theme) = Theme::load(&self.config.theme) {
            let theme: &'static Theme = Box::leak(Box::new(new_theme));
            self.theme = theme;
        }
    }

    pub fn start_quiz(&mut self) {
        let quiz = self.form.quiz;
        let mode = self.form.mode;
        self.config.remember(&quiz, mode);
        self.save_config();
        self.dispatch(FlowEvent::Submit { config: quiz, mode });
    }

    pub fn leave_config(&mut self) {
        self.config.remember(&self.form.quiz, self.form.mode);
        self.save_config();
        self.dispatch(FlowEvent::Back);
    }

    fn save_config(&mut self) {
        if !self.persist_config {
            return;
        }
        if let Err(e) = self.config.save() {
            error!("could not save config: {e:#}");
            self.notify(NoticeKind::Error, "Could not save settings", Instant::now());
        }
    }

    // --- history ---

    pub fn reload_history(&mut self) {
        self.history_view.entries = self.history.list();
        let (categories, modes) = filter_options(&self.history_view.entries);
        // Drop selections that no longer match anything.
        self.history_view.filter.categories.retain(|c| categories.contains(c));
        self.history_view.filter.modes.retain(|m| modes.contains(m));
        self.history_view.clamp_selection();
    }

    pub fn toggle_filter_at_cursor(&mut self) {
        let options = self.history_view.options();
        let Some(option) = options.get(self.history_view.filter_cursor) else {
            return;
        };
        match option {
            FilterOption::Category(c) => self.history_view.filter.toggle_category(c),
            FilterOption::Mode(m) => self.history_view.filter.toggle_mode(m),
        }
        self.history_view.clamp_selection();
    }

    pub fn reset_filters(&mut self) {
        self.history_view.filter.clear();
        self.history_view.clamp_selection();
    }

    pub fn filter_cursor_move(&mut self, forward: bool) {
        let len = self.history_view.options().len();
        if len == 0 {
            return;
        }
        let cursor = &mut self.history_view.filter_cursor;
        *cursor = if forward {
            (*cursor + 1) % len
        } else {
            cursor.checked_sub(1).unwrap_or(len - 1)
        };
    }

    pub fn history_select_move(&mut self, down: bool) {
        let len = self.history_view.visible().len();
        if len == 0 {
            return;
        }
        let selected = &mut self.history_view.selected;
        *selected = if down {
            (*selected + 1).min(len - 1)
        } else {
            selected.saturating_sub(1)
        };
    }

    pub fn request_clear_history(&mut self) {
        if !self.history_view.entries.is_empty() {
            self.history_view.confirm_clear = true;
        }
    }

    pub fn confirm_clear_history(&mut self, confirmed: bool) {
        self.history_view.confirm_clear = false;
        if confirmed {
            self.dispatch(FlowEvent::ClearHistory);
        }
    }

    fn report_export(&mut self, outcome: anyhow::Result<std::path::PathBuf>, now: Instant) {
        match outcome {
            Ok(path) => self.notify(
                NoticeKind::Info,
                &format!("Exported to {}", path.display()),
                now,
            ),
            Err(e) => {
                error!("export failed: {e:#}");
                self.notify(NoticeKind::Error, "Export failed", now);
            }
        }
    }
}

/// Display name for a stored category id, which may predate the current
/// category list.
pub fn category_name(id: &str) -> String {
    id.parse::<Category>()
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|_| id.to_string())
}
