use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::app::category_name;
use crate::session::setup::{QuizConfiguration, ScoringMode};
use crate::store::schema::HistoryEntry;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    StartQuiz,
    History,
    Quit,
}

/// (hotkey, label, action)
pub const MENU_ITEMS: [(char, &str, MenuAction); 3] = [
    ('1', "Start Quiz", MenuAction::StartQuiz),
    ('h', "History", MenuAction::History),
    ('q', "Quit", MenuAction::Quit),
];

/// Cursor over the welcome actions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Menu {
    pub selected: usize,
}

impl Menu {
    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % MENU_ITEMS.len();
    }

    pub fn prev(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(MENU_ITEMS.len() - 1);
    }

    pub fn action(&self) -> MenuAction {
        MENU_ITEMS[self.selected % MENU_ITEMS.len()].2
    }
}

/// Landing screen: actions on the left, the quiz that Start will launch and
/// the most recent result on the right.
pub struct WelcomeScreen<'a> {
    pub menu: &'a Menu,
    pub next_quiz: QuizConfiguration,
    pub mode: ScoringMode,
    pub last: Option<&'a HistoryEntry>,
    pub theme: &'a Theme,
}

impl WelcomeScreen<'_> {
    fn action_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = Vec::new();
        for (i, (key, label, _)) in MENU_ITEMS.iter().enumerate() {
            let style = if i == self.menu.selected {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(format!(" [{key}] {label} "), style)));
            lines.push(Line::from(""));
        }
        lines
    }

    fn setup_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let quiz = &self.next_quiz;
        let muted = Style::default().fg(colors.text_muted());
        vec![
            Line::from(Span::styled(
                "Next quiz",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled(quiz.category.display_name().to_string(), Style::default().fg(colors.fg())),
                Span::styled(" · ", muted),
                Span::styled(
                    quiz.difficulty.label().to_string(),
                    Style::default().fg(colors.difficulty(quiz.difficulty)),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "{} questions, {}s each, {} scoring",
                    quiz.question_count, quiz.time_limit, self.mode
                ),
                muted,
            )),
        ]
    }

    fn last_result_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let heading = Line::from(Span::styled(
            "Last result",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ));
        let Some(entry) = self.last else {
            return vec![
                heading,
                Line::from(Span::styled(
                    "No quizzes yet",
                    Style::default().fg(colors.text_muted()),
                )),
            ];
        };
        vec![
            heading,
            Line::from(vec![
                Span::styled(
                    format!("{} pts", entry.score),
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "  {}/{} on {}",
                        entry.result.correct_answers,
                        entry.result.total_questions,
                        category_name(&entry.category)
                    ),
                    Style::default().fg(colors.fg()),
                ),
            ]),
            Line::from(Span::styled(
                entry.date.format("%Y-%m-%d %H:%M").to_string(),
                Style::default().fg(colors.text_muted()),
            )),
        ]
    }
}

impl Widget for WelcomeScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Mind Maze ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(inner);

        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Test your programming knowledge against the clock",
                Style::default().fg(colors.fg()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(rows[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        Paragraph::new(self.action_lines()).render(columns[0], buf);

        let mut info = self.setup_lines();
        info.push(Line::from(""));
        info.extend(self.last_result_lines());
        Paragraph::new(info)
            .wrap(Wrap { trim: true })
            .render(columns[1], buf);
    }
}
