use ratatui::buffer::Buffer;
use ratatui::layout::{Direction, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Line;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph, Widget,
};

use crate::engine::stats::PerformancePoint;
use crate::session::result::AnswerRecord;
use crate::ui::theme::Theme;

/// Score and accuracy per quiz, oldest to newest.
pub struct PerformanceChart<'a> {
    pub points: &'a [PerformancePoint],
    pub theme: &'a Theme,
}

impl<'a> PerformanceChart<'a> {
    pub fn new(points: &'a [PerformancePoint], theme: &'a Theme) -> Self {
        Self { points, theme }
    }
}

impl Widget for PerformanceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Performance Over Time ")
            .border_style(Style::default().fg(colors.border()));

        if self.points.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Line::styled(
                "  Nothing to chart yet",
                Style::default().fg(colors.text_muted()),
            ))
            .render(inner, buf);
            return;
        }

        let scores: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.index as f64, p.score as f64))
            .collect();
        let accuracy: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.index as f64, p.accuracy_pct))
            .collect();

        let max_x = (self.points.len() as f64).max(2.0);
        let max_y = scores
            .iter()
            .map(|(_, y)| *y)
            .fold(100.0f64, f64::max);

        let datasets = vec![
            Dataset::default()
                .name("Score")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.accent()))
                .data(&scores),
            Dataset::default()
                .name("Accuracy %")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.success()))
                .data(&accuracy),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Quiz #")
                    .style(Style::default().fg(colors.text_muted()))
                    .bounds([1.0, max_x])
                    .labels(["1".to_string(), format!("{}", self.points.len())]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(colors.text_muted()))
                    .bounds([0.0, max_y * 1.1])
                    .labels(["0".to_string(), format!("{:.0}", max_y * 1.1)]),
            );

        chart.render(area, buf);
    }
}

/// Seconds spent on each question, colored by outcome.
pub struct AnswerTimeChart<'a> {
    pub answers: &'a [AnswerRecord],
    pub theme: &'a Theme,
}

impl<'a> AnswerTimeChart<'a> {
    pub fn new(answers: &'a [AnswerRecord], theme: &'a Theme) -> Self {
        Self { answers, theme }
    }
}

impl Widget for AnswerTimeChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let bars: Vec<Bar> = self
            .answers
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                let color = if answer.is_correct {
                    colors.correct()
                } else if answer.is_skipped() {
                    colors.skipped()
                } else {
                    colors.incorrect()
                };
                Bar::default()
                    .value(answer.time_spent.round() as u64)
                    .text_value(format!("{:.0}", answer.time_spent))
                    .label(Line::from(format!("Q{}", i + 1)))
                    .style(Style::default().fg(color))
            })
            .collect();

        let bar_width = if self.answers.is_empty() {
            3
        } else {
            let fit = area.width.saturating_sub(2) / self.answers.len() as u16;
            fit.saturating_sub(1).clamp(3, 7)
        };

        BarChart::default()
            .block(
                Block::bordered()
                    .title(" Time per Question (s) ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .direction(Direction::Vertical)
            .bar_width(bar_width)
            .bar_gap(1)
            .value_style(Style::default().fg(colors.bg()).bg(colors.fg()))
            .label_style(Style::default().fg(colors.text_muted()))
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}
