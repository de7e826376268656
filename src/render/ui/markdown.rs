//! Markdown answers to styled ratatui lines.
//!
//! Covers what the ask endpoint produces in practice: paragraphs, headings, emphasis,
//! bullet and numbered lists, inline code and fenced code blocks. Anything else is
//! rendered as its plain text.

use crate::render::ui::theme::ColorTheme;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

pub fn markdown_lines(source: &str, theme: &ColorTheme) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new(theme);
    for event in Parser::new(source) {
        builder.push(event);
    }
    builder.finish()
}

struct LineBuilder<'t> {
    theme: &'t ColorTheme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Next number for ordered lists, None for bullets
    lists: Vec<Option<u64>>,
    in_code_block: bool,
}

impl<'t> LineBuilder<'t> {
    fn new(theme: &'t ColorTheme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default().fg(self.theme.normal_text), |base, s| {
                base.patch(*s)
            })
    }

    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                self.flush();
                self.styles.push(self.theme.heading());
            }
            Event::End(TagEnd::Heading(_)) => {
                self.styles.pop();
                self.flush();
                self.blank();
            }
            Event::End(TagEnd::Paragraph) => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::Strong) => self
                .styles
                .push(Style::default().add_modifier(Modifier::BOLD)),
            Event::Start(Tag::Emphasis) => self
                .styles
                .push(Style::default().add_modifier(Modifier::ITALIC)),
            Event::End(TagEnd::Strong) | Event::End(TagEnd::Emphasis) => {
                self.styles.pop();
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.current.push(Span::styled(
                    format!("{}{}", "  ".repeat(depth), marker),
                    Style::default().fg(self.theme.accent),
                ));
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                self.blank();
            }
            Event::Text(text) if self.in_code_block => {
                for line in text.lines() {
                    self.lines.push(Line::from(Span::styled(
                        format!("  {}", line),
                        self.theme.code,
                    )));
                }
            }
            Event::Text(text) => {
                let style = self.style();
                self.current.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => self
                .current
                .push(Span::styled(code.into_string(), self.theme.code)),
            Event::SoftBreak => {
                let style = self.style();
                self.current.push(Span::styled(" ", style));
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "────────",
                    Style::default().fg(self.theme.muted_text),
                )));
            }
            _ => {}
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let lines = markdown_lines("First line\ncontinues.\n\nSecond.", &ColorTheme::dark());
        assert_eq!(plain(&lines), vec!["First line continues.", "", "Second."]);
    }

    #[test]
    fn lists_get_markers() {
        let lines = markdown_lines("- one\n- two\n\n1. a\n2. b\n", &ColorTheme::dark());
        assert_eq!(plain(&lines), vec!["• one", "• two", "", "1. a", "2. b"]);
    }

    #[test]
    fn emphasis_and_code_are_styled() {
        let theme = ColorTheme::light();
        let lines = markdown_lines("A **bold** `call()`", &theme);
        let spans = &lines[0].spans;
        assert_eq!(spans[1].content, "bold");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[3].content, "call()");
        assert_eq!(spans[3].style, theme.code);
    }

    #[test]
    fn headings_and_code_blocks() {
        let theme = ColorTheme::dark();
        let lines = markdown_lines("# Paging\n\n```\nlet x = 1;\n```\n", &theme);
        assert_eq!(plain(&lines), vec!["Paging", "", "  let x = 1;"]);
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.accent));
    }
}
