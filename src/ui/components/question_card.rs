use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::question::option_letter;
use crate::session::quiz::QuizSession;
use crate::session::setup::{QuizConfiguration, ScoringMode};
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

const LOW_TIME_SECS: u32 = 10;

pub struct QuestionCard<'a> {
    pub session: &'a QuizSession,
    pub config: &'a QuizConfiguration,
    pub mode: ScoringMode,
    pub now: Instant,
    pub theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(
        session: &'a QuizSession,
        config: &'a QuizConfiguration,
        mode: ScoringMode,
        now: Instant,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            config,
            mode,
            now,
            theme,
        }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let session = self.session;
        let question = session.current();
        let answered = session.answered();

        let title = format!(
            " {} · {} · {} ",
            self.config.category.display_name(),
            self.config.difficulty.label(),
            self.mode
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(question_card_options_height(question.options.len())),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let bars = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(layout[0]);

        let progress_label = format!("Question {}/{}", session.index() + 1, session.len());
        ProgressBar::new(&progress_label, session.progress(), self.theme).render(bars[0], buf);

        let time_left = answered.map_or_else(|| session.time_left(self.now), |a| a.time_left);
        let time_ratio = time_left as f64 / session.time_limit().max(1) as f64;
        let time_color = if time_left < LOW_TIME_SECS {
            colors.error()
        } else {
            colors.bar_filled()
        };
        ProgressBar::new("Time", time_ratio, self.theme)
            .text(format!("{time_left}s"))
            .fill(time_color)
            .render(bars[1], buf);

        let question_lines = vec![
            Line::from(Span::styled(
                question.difficulty.label(),
                Style::default().fg(colors.difficulty(question.difficulty)),
            )),
            Line::from(Span::styled(
                question.question.as_str(),
                Style::default()
                    .fg(colors.fg())
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        Paragraph::new(question_lines)
            .wrap(Wrap { trim: true })
            .render(layout[1], buf);

        let correct_index = question.correct_index();
        let mut option_lines = Vec::new();
        for (i, option) in question.options.iter().enumerate() {
            let style = match answered {
                None => Style::default().fg(colors.fg()),
                Some(_) if Some(i) == correct_index => Style::default()
                    .fg(colors.correct())
                    .add_modifier(Modifier::BOLD),
                Some(a) if a.selected == Some(i) => Style::default()
                    .fg(colors.incorrect())
                    .add_modifier(Modifier::CROSSED_OUT),
                Some(_) => Style::default().fg(colors.text_muted()),
            };
            let marker = match answered {
                Some(_) if Some(i) == correct_index => "✓",
                Some(a) if a.selected == Some(i) => "✗",
                _ => " ",
            };
            option_lines.push(Line::from(Span::styled(
                format!("  {marker} {}. {option}", option_letter(i)),
                style,
            )));
            option_lines.push(Line::from(""));
        }
        Paragraph::new(option_lines)
            .wrap(Wrap { trim: false })
            .render(layout[2], buf);

        if let Some(a) = answered {
            let (verdict, color) = if a.correct {
                ("Correct!", colors.correct())
            } else if a.timed_out {
                ("Time's up! Counted as skipped.", colors.skipped())
            } else if a.selected.is_none() {
                ("Skipped.", colors.skipped())
            } else {
                ("Incorrect.", colors.incorrect())
            };
            let feedback = vec![
                Line::from(Span::styled(
                    verdict,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    question.explanation.as_str(),
                    Style::default().fg(colors.text_muted()),
                )),
            ];
            Paragraph::new(feedback)
                .wrap(Wrap { trim: true })
                .block(
                    Block::bordered()
                        .title(" Explanation ")
                        .border_style(Style::default().fg(colors.border())),
                )
                .render(layout[3], buf);
        }

        let hint = if answered.is_some() {
            if session.is_last() {
                "  [Enter] Finish Quiz  [Esc] Abandon"
            } else {
                "  [Enter] Next Question  [Esc] Abandon"
            }
        } else {
            "  [a-d / 1-4] Answer  [s] Skip  [Esc] Abandon"
        };
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.accent()),
        )))
        .render(layout[4], buf);
    }
}

fn question_card_options_height(options: usize) -> u16 {
    (options as u16).saturating_mul(2)
}
