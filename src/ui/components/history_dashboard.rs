use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::app::{FilterOption, HistoryView, category_name};
use crate::engine::stats::{HistorySummary, performance_series};
use crate::store::schema::HistoryEntry;
use crate::ui::components::chart::PerformanceChart;
use crate::ui::components::results_dashboard::accuracy_color;
use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

const MAX_ROWS: usize = 50;

pub struct HistoryDashboard<'a> {
    pub view: &'a HistoryView,
    pub theme: &'a Theme,
}

impl<'a> HistoryDashboard<'a> {
    pub fn new(view: &'a HistoryView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl Widget for HistoryDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Quiz History ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.view.entries.is_empty() {
            Paragraph::new(vec![
                Line::styled(
                    "  No quiz history yet. Finish a quiz to see it here.",
                    Style::default().fg(colors.text_muted()),
                ),
                Line::from(""),
                Line::styled("  [Esc] Back", Style::default().fg(colors.accent())),
            ])
            .render(inner, buf);
            return;
        }

        let visible = self.view.visible();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(inner);

        self.render_summary(&visible, layout[0], buf);
        self.render_filters(layout[1], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(layout[2]);
        let series = performance_series(visible.iter().copied());
        PerformanceChart::new(&series, self.theme).render(body[0], buf);
        self.render_table(&visible, body[1], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [h/l] Filter  [Space] Toggle  [0] All  [j/k] Select  [e] Export  [x] Clear  [Esc] Back",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[3], buf);

        if self.view.confirm_clear {
            let dialog_area = centered_rect(40, 20, area);
            Clear.render(dialog_area, buf);
            Paragraph::new(vec![
                Line::from(""),
                Line::styled(
                    format!(
                        "  Delete all {} saved results? (y/n)  ",
                        self.view.entries.len()
                    ),
                    Style::default().fg(colors.fg()),
                ),
                Line::styled(
                    "  This cannot be undone.",
                    Style::default().fg(colors.text_muted()),
                ),
            ])
            .style(Style::default().bg(colors.bg()))
            .block(
                Block::bordered()
                    .title(" Confirm ")
                    .border_style(Style::default().fg(colors.error()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(dialog_area, buf);
        }
    }
}

impl HistoryDashboard<'_> {
    fn render_summary(&self, visible: &[&HistoryEntry], area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let summary = HistorySummary::from_entries(visible.iter().copied());

        let cells = [
            ("Quizzes", summary.count.to_string()),
            ("Avg score", format!("{:.1}", summary.mean_score)),
            ("Best score", summary.best_score.to_string()),
            ("Avg accuracy", format!("{:.1}%", summary.mean_accuracy * 100.0)),
        ];
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (i, (label, value)) in cells.iter().enumerate() {
            let value_color = if i == 3 {
                accuracy_color(self.theme, summary.mean_accuracy * 100.0)
            } else {
                colors.accent()
            };
            Paragraph::new(vec![
                Line::styled(format!(" {label}"), Style::default().fg(colors.text_muted())),
                Line::styled(
                    format!(" {value}"),
                    Style::default()
                        .fg(value_color)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
            .block(Block::bordered().border_style(Style::default().fg(colors.border())))
            .render(columns[i], buf);
        }
    }

    fn render_filters(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut spans = vec![Span::styled(
            "  Filter: ",
            Style::default().fg(colors.text_muted()),
        )];
        if self.view.filter.is_empty() {
            spans.push(Span::styled("(all) ", Style::default().fg(colors.text_muted())));
        }

        for (i, option) in self.view.options().iter().enumerate() {
            let active = self.view.is_active(option);
            let text = match option {
                FilterOption::Category(c) => category_name(c),
                FilterOption::Mode(m) => format!("mode:{m}"),
            };
            let check = if active { "[x]" } else { "[ ]" };
            let mut style = Style::default().fg(if active {
                colors.accent()
            } else {
                colors.fg()
            });
            if i == self.view.filter_cursor {
                style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!("{check} {text}"), style));
            spans.push(Span::raw("  "));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_table(&self, visible: &[&HistoryEntry], area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let table_block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" Results ({}) ", visible.len()),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()));
        let table_inner = table_block.inner(area);
        table_block.render(area, buf);

        let mut lines = vec![
            Line::styled(
                "  Date          Category      Mode       Score   Acc%   Correct",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                "  ──────────────────────────────────────────────────────────────",
                Style::default().fg(colors.border()),
            ),
        ];

        if visible.is_empty() {
            lines.push(Line::styled(
                "  No results match the selected filters.",
                Style::default().fg(colors.text_muted()),
            ));
        }

        // Newest first.
        for (i, entry) in visible.iter().rev().take(MAX_ROWS).enumerate() {
            let accuracy = entry.accuracy() * 100.0;
            let row = format!(
                "  {date:<12}  {category:<12}  {mode:<9}  {score:>5}  {accuracy:>5.1}  {correct:>3}/{total}",
                date = entry.date.format("%m/%d %H:%M").to_string(),
                category = category_name(&entry.category),
                mode = entry.mode,
                score = entry.score,
                correct = entry.result.correct_answers,
                total = entry.result.total_questions,
            );
            let style = if i == self.view.selected {
                Style::default()
                    .fg(accuracy_color(self.theme, accuracy))
                    .bg(colors.accent_dim())
            } else {
                Style::default().fg(accuracy_color(self.theme, accuracy))
            };
            lines.push(Line::styled(row, style));
        }

        Paragraph::new(lines).render(table_inner, buf);
    }
}
