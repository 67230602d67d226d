use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::question::ALL_DIFFICULTIES;
use crate::session::result::QuizResult;
use crate::session::setup::{QuizConfiguration, ScoringMode};
use crate::ui::components::chart::AnswerTimeChart;
use crate::ui::theme::Theme;

pub struct ResultsDashboard<'a> {
    pub result: &'a QuizResult,
    pub config: &'a QuizConfiguration,
    pub mode: ScoringMode,
    pub score: u32,
    pub recommendations: Option<&'a [String]>,
    pub recommendations_pending: bool,
    pub review_scroll: usize,
    pub theme: &'a Theme,
}

impl Widget for ResultsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(7),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(inner);

        let title = Line::from(vec![
            Span::styled(
                format!("{} points", self.score),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ·  {} · {} · {} mode",
                    self.config.category.display_name(),
                    self.config.difficulty.label(),
                    self.mode
                ),
                Style::default().fg(colors.text_muted()),
            ),
        ]);
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);
        self.render_summary(top[0], buf);
        self.render_breakdown(top[1], buf);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(layout[2]);
        AnswerTimeChart::new(&self.result.answers, self.theme).render(bottom[0], buf);
        self.render_review(bottom[1], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [r] Try Again  [s] Share  [e] Export  [t] Study Tips  [j/k] Scroll  [Esc] Home",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[3], buf);
    }
}

impl ResultsDashboard<'_> {
    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;
        let accuracy = result.accuracy() * 100.0;

        let label = |text: &'static str| Span::styled(text, Style::default().fg(colors.fg()));
        let lines = vec![
            Line::from(vec![
                label("  Accuracy:     "),
                Span::styled(
                    format!("{accuracy:.1}%"),
                    Style::default()
                        .fg(accuracy_color(self.theme, accuracy))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  ({}/{} correct)", result.correct_answers, result.total_questions),
                    Style::default().fg(colors.text_muted()),
                ),
            ]),
            Line::from(vec![
                label("  Time:         "),
                Span::raw(format_duration(result.time_elapsed)),
            ]),
            Line::from(vec![
                label("  Avg/question: "),
                Span::raw(format!("{:.1}s", result.average_time_spent())),
            ]),
            Line::from(vec![
                label("  Time limit:   "),
                Span::raw(format!("{}s", self.config.time_limit)),
            ]),
        ];
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Summary ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(area, buf);
    }

    fn render_breakdown(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;
        let block = Block::bordered()
            .title(" Breakdown ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let total = result.total_questions.max(1) as f64;
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);
        render_text_bar(
            &format!("  Correct {}", result.correct_answers),
            result.correct_answers as f64 / total,
            colors.correct(),
            colors.bar_empty(),
            halves[0],
            buf,
        );
        render_text_bar(
            &format!("  Incorrect {}", result.incorrect_answers),
            result.incorrect_answers as f64 / total,
            colors.incorrect(),
            colors.bar_empty(),
            halves[1],
            buf,
        );
        render_text_bar(
            &format!("  Skipped {}", result.skipped_questions),
            result.skipped_questions as f64 / total,
            colors.skipped(),
            colors.bar_empty(),
            rows[1],
            buf,
        );

        let spans: Vec<Span> = ALL_DIFFICULTIES
            .iter()
            .flat_map(|d| {
                vec![
                    Span::styled(
                        format!("  {} ", d.label()),
                        Style::default().fg(colors.difficulty(*d)),
                    ),
                    Span::raw(result.difficulty_levels.get(*d).to_string()),
                ]
            })
            .collect();
        Paragraph::new(Line::from(spans)).render(rows[2], buf);
    }

    fn render_review(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let mut lines = Vec::new();
        if self.recommendations_pending {
            lines.push(Line::styled(
                "Fetching study tips...",
                Style::default().fg(colors.text_muted()),
            ));
            lines.push(Line::from(""));
        } else if let Some(tips) = self.recommendations {
            lines.push(Line::styled(
                "Study tips",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ));
            for tip in tips {
                lines.push(Line::from(format!("• {tip}")));
            }
            lines.push(Line::from(""));
        }

        for (i, answer) in self.result.answers.iter().enumerate() {
            let (mark, color) = if answer.is_correct {
                ("✓", colors.correct())
            } else if answer.is_skipped() {
                ("–", colors.skipped())
            } else {
                ("✗", colors.incorrect())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{mark} Q{} ", i + 1), Style::default().fg(color)),
                Span::styled(answer.question.as_str(), Style::default().fg(colors.fg())),
            ]));
            let given = answer.user_answer.as_deref().unwrap_or("(no answer)");
            lines.push(Line::styled(
                format!("    yours: {given}  ·  correct: {}", answer.correct_answer),
                Style::default().fg(colors.text_muted()),
            ));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .scroll((self.review_scroll.min(u16::MAX as usize) as u16, 0))
            .block(
                Block::bordered()
                    .title(" Review ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(area, buf);
    }
}

pub fn accuracy_color(theme: &Theme, accuracy_pct: f64) -> Color {
    let colors = &theme.colors;
    if accuracy_pct >= 80.0 {
        colors.success()
    } else if accuracy_pct >= 50.0 {
        colors.warning()
    } else {
        colors.error()
    }
}

pub fn render_text_bar(
    label: &str,
    ratio: f64,
    fill_color: Color,
    empty_color: Color,
    area: Rect,
    buf: &mut Buffer,
) {
    if area.height < 2 || area.width < 10 {
        return;
    }

    buf.set_string(area.x, area.y, label, Style::default().fg(fill_color));

    let bar_width = (area.width as usize).saturating_sub(4);
    let filled = (ratio.clamp(0.0, 1.0) * bar_width as f64) as usize;
    let bar_y = area.y + 1;

    for i in 0..bar_width {
        let x = area.x + 2 + i as u16;
        if x >= area.x + area.width {
            break;
        }
        let (ch, color) = if i < filled {
            ('█', fill_color)
        } else {
            ('░', empty_color)
        };
        buf.set_string(x, bar_y, ch.to_string(), Style::default().fg(color));
    }
}

pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let s = total % 60;
    if hours > 0 {
        format!("{hours}h {mins}m {s}s")
    } else if mins > 0 {
        format!("{mins}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42.7), "42s");
        assert_eq!(format_duration(125.0), "2m 5s");
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
        assert_eq!(format_duration(-3.0), "0s");
    }

    #[test]
    fn test_accuracy_color_bands() {
        let theme = Theme::default();
        assert_eq!(accuracy_color(&theme, 90.0), theme.colors.success());
        assert_eq!(accuracy_color(&theme, 60.0), theme.colors.warning());
        assert_eq!(accuracy_color(&theme, 10.0), theme.colors.error());
    }
}
