use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::controller::{DrillStatus, Feedback};
use crate::ui::theme::Theme;

/// The question glyph, the answer field and feedback for the last answer.
pub struct PromptArea<'a> {
    status: DrillStatus,
    payload: Option<&'a str>,
    input: &'a str,
    answer_len: usize,
    feedback: &'a Feedback,
    hint: Option<&'a str>,
    shake: bool,
    theme: &'a Theme,
}

impl<'a> PromptArea<'a> {
    pub fn new(
        status: DrillStatus,
        payload: Option<&'a str>,
        input: &'a str,
        answer_len: usize,
        feedback: &'a Feedback,
        theme: &'a Theme,
    ) -> Self {
        Self {
            status,
            payload,
            input,
            answer_len,
            feedback,
            hint: None,
            shake: false,
            theme,
        }
    }

    pub fn hint(mut self, hint: Option<&'a str>) -> Self {
        self.hint = hint;
        self
    }

    pub fn shake(mut self, shake: bool) -> Self {
        self.shake = shake;
        self
    }
}

/// Typed letters uppercased, the rest of the field as underscores.
fn answer_slots(input: &str, answer_len: usize) -> String {
    let typed: Vec<char> = input.chars().take(answer_len).collect();
    (0..answer_len)
        .map(|i| typed.get(i).map_or('_', |c| c.to_ascii_uppercase()))
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Widget for PromptArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let mut inner = block.inner(area);
        block.render(area, buf);

        if self.shake && inner.width > 4 {
            inner.x += 2;
            inner.width -= 2;
        }

        let muted = Style::default().fg(colors.text_pending());
        let mut lines: Vec<Line> = vec![Line::from("")];

        match &self.status {
            DrillStatus::Loading => {
                lines.push(Line::from(Span::styled(t!("drill.loading").to_string(), muted)));
            }
            DrillStatus::Unavailable(message) => {
                lines.push(Line::from(Span::styled(
                    t!("drill.unavailable", message = message).to_string(),
                    Style::default().fg(colors.error()),
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(t!("drill.reload_hint").to_string(), muted)));
            }
            DrillStatus::Empty => {
                lines.push(Line::from(Span::styled(t!("drill.empty").to_string(), muted)));
            }
            DrillStatus::RoundComplete => {
                lines.push(Line::from(Span::styled(
                    t!("drill.complete").to_string(),
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(t!("drill.reset_hint").to_string(), muted)));
            }
            DrillStatus::InRound => {
                lines.push(Line::from(Span::styled(
                    self.payload.unwrap_or_default().to_string(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    answer_slots(self.input, self.answer_len),
                    Style::default().fg(colors.fg()),
                )));
                lines.push(Line::from(""));

                let feedback = match self.feedback {
                    Feedback::None => Span::raw(""),
                    Feedback::Correct => Span::styled(
                        t!("feedback.correct").to_string(),
                        Style::default().fg(colors.text_correct()),
                    ),
                    Feedback::Corrected => Span::styled(
                        t!("feedback.corrected").to_string(),
                        Style::default().fg(colors.warning()),
                    ),
                    Feedback::Incorrect { expected } => Span::styled(
                        t!("feedback.incorrect", expected = expected).to_string(),
                        Style::default().fg(colors.text_incorrect()),
                    ),
                };
                lines.push(Line::from(feedback));

                if let Some(hint) = self.hint {
                    lines.push(Line::from(Span::styled(
                        t!("drill.hint", radicals = hint).to_string(),
                        muted,
                    )));
                }
            }
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
