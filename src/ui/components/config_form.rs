use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::{ConfigForm, FORM_FIELDS, FormField};
use crate::session::setup::ScoringMode;
use crate::ui::theme::Theme;

pub struct ConfigFormView<'a> {
    pub form: &'a ConfigForm,
    pub theme_name: &'a str,
    pub theme: &'a Theme,
}

impl<'a> ConfigFormView<'a> {
    pub fn new(form: &'a ConfigForm, theme_name: &'a str, theme: &'a Theme) -> Self {
        Self {
            form,
            theme_name,
            theme,
        }
    }

    fn field_row(&self, field: FormField) -> (&'static str, String) {
        let quiz = &self.form.quiz;
        match field {
            FormField::Category => ("Category", quiz.category.display_name().to_string()),
            FormField::Difficulty => ("Difficulty", quiz.difficulty.label().to_string()),
            FormField::Questions => ("Questions", quiz.question_count.to_string()),
            FormField::TimeLimit => ("Time per question", format!("{}s", quiz.time_limit)),
            FormField::Mode => ("Scoring mode", self.form.mode.as_str().to_string()),
            FormField::Theme => ("Theme", self.theme_name.to_string()),
        }
    }
}

impl Widget for ConfigFormView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Configure Your Quiz ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(FORM_FIELDS.len() as u16 * 2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            "Customize your quiz experience",
            Style::default().fg(colors.text_muted()),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let mut lines = Vec::new();
        for (i, field) in FORM_FIELDS.iter().enumerate() {
            let (name, value) = self.field_row(*field);
            let is_selected = i == self.form.selected;
            let indicator = if is_selected { ">" } else { " " };
            let value_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {indicator} {name:<20}"), Style::default().fg(colors.fg())),
                Span::styled(format!("< {value} >"), value_style),
            ]));
            lines.push(Line::from(""));
        }
        Paragraph::new(lines).render(layout[1], buf);

        let mode_hint = match self.form.mode {
            ScoringMode::Timed => "Timed: +5 for each correct answer under 10 seconds",
            ScoringMode::Challenge => "Challenge: +8 for every hard question",
            ScoringMode::Standard => "Standard: +3 per medium and +5 per hard question",
        };
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("  {mode_hint}"),
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "  [j/k] Field  [h/l] Change  [Enter] Start Quiz  [Esc] Back",
                Style::default().fg(colors.accent()),
            )),
        ])
        .render(layout[3], buf);
    }
}
