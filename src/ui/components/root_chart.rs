use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::practice::root::{KEYBOARD_ROWS, radicals_for_key};
use crate::scheme::Scheme;
use crate::ui::theme::Theme;

/// Keyboard-shaped reference of which radicals live on which key.
pub struct RootChart<'a> {
    scheme: Scheme,
    highlight: Option<char>,
    theme: &'a Theme,
}

impl<'a> RootChart<'a> {
    pub fn new(scheme: Scheme, theme: &'a Theme) -> Self {
        Self {
            scheme,
            highlight: None,
            theme,
        }
    }

    /// Mark one key, e.g. the answer to a missed question.
    pub fn highlight(mut self, key: Option<char>) -> Self {
        self.highlight = key.map(|k| k.to_ascii_uppercase());
        self
    }

    fn radicals(&self, key: char) -> String {
        radicals_for_key(self.scheme, key).join(" ")
    }
}

impl Widget for RootChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("drill.chart")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width < 20 {
            return;
        }

        let lines: Vec<Line> = KEYBOARD_ROWS
            .iter()
            .map(|row| {
                let mut spans = Vec::new();
                for &key in row.iter() {
                    let radicals = self.radicals(key);
                    let (key_style, radical_style) = if self.highlight == Some(key) {
                        let style = Style::default()
                            .fg(colors.bg())
                            .bg(colors.focused_key())
                            .add_modifier(Modifier::BOLD);
                        (style, style)
                    } else if radicals.is_empty() {
                        let style = Style::default().fg(colors.text_pending());
                        (style, style)
                    } else {
                        (
                            Style::default()
                                .fg(colors.accent())
                                .add_modifier(Modifier::BOLD),
                            Style::default().fg(colors.fg()),
                        )
                    };
                    spans.push(Span::styled(format!(" {key} "), key_style));
                    spans.push(Span::styled(radicals, radical_style));
                    spans.push(Span::styled(" ", Style::default().fg(colors.accent_dim())));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
