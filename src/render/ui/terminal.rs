//! Terminal UI implementation using ratatui
//!
//! Concrete [`UIRenderer`] with the crossterm backend. Layout:
//!
//! ```text
//! +---------------------------+----------------+
//! |                           | slide summary  |
//! |        slide canvas       +----------------+
//! |                           | question       |
//! |                           +----------------+
//! |                           | answer         |
//! +---------------------------+----------------+
//! | progress (while polling)                   |
//! | status line                                |
//! +--------------------------------------------+
//! ```

use crate::error::Result;
use crate::input::PromptKind;
use crate::render::ui::canvas::{sample_cells, CellGrid, SlideCanvas};
use crate::render::ui::markdown::markdown_lines;
use crate::render::ui::state::{ResponsePanel, ViewState};
use crate::render::ui::{ColorTheme, UIRenderer};
use ratatui::crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Sampled canvas for one surface generation at one panel size.
struct CanvasCache {
    generation: u64,
    area: (u16, u16),
    grid: CellGrid,
}

/// Split of the frame into panels.
struct Panels {
    canvas: Rect,
    summary: Rect,
    question: Rect,
    answer: Rect,
    progress: Option<Rect>,
    status: Rect,
}

impl Panels {
    fn split(size: Rect, show_progress: bool) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(u16::from(show_progress)),
                Constraint::Length(1),
            ])
            .split(size);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(rows[0]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Length(4),
                Constraint::Min(3),
            ])
            .split(columns[1]);

        Self {
            canvas: columns[0],
            summary: side[0],
            question: side[1],
            answer: side[2],
            progress: show_progress.then_some(rows[1]),
            status: rows[2],
        }
    }
}

/// Terminal UI implementation with ratatui backend
///
/// Pure presentation: it reads [`ViewState`] and never mutates viewer state.
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    canvas_cache: Option<CanvasCache>,
    /// Enhancement flags were pushed and must be popped on cleanup
    keyboard_enhanced: bool,
}

impl TerminalUI {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: None,
            canvas_cache: None,
            keyboard_enhanced: false,
        })
    }

    /// Flags that make modified Enter distinguishable from plain Enter.
    fn keyboard_flags() -> KeyboardEnhancementFlags {
        KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
    }

    fn panel<'a>(title: impl Into<Line<'a>>, theme: &ColorTheme) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(title)
            .title_style(theme.heading())
            .style(theme.text())
    }

    fn render_canvas(
        frame: &mut Frame,
        area: Rect,
        view_state: &ViewState,
        theme: &ColorTheme,
        cache: &mut Option<CanvasCache>,
    ) {
        let title = format!(" {} · {} ", view_state.document_name, view_state.page_counter());
        let block = Self::panel(title, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let surface = view_state.surface.lock();
        if surface.is_empty() {
            let placeholder = if view_state.page_count.is_none() {
                "Loading slides..."
            } else {
                "Rendering..."
            };
            frame.render_widget(
                Paragraph::new(placeholder).style(Style::default().fg(theme.muted_text)),
                inner,
            );
            return;
        }

        let key = (inner.width, inner.height);
        let stale = cache
            .as_ref()
            .map_or(true, |c| c.generation != surface.generation() || c.area != key);
        if stale {
            *cache = Some(CanvasCache {
                generation: surface.generation(),
                area: key,
                grid: sample_cells(surface.pixels(), inner.width, inner.height),
            });
        }
        drop(surface);

        if let Some(cached) = cache.as_ref() {
            frame.render_widget(SlideCanvas::new(&cached.grid, theme.canvas_bg), inner);
        }
    }

    fn render_summary(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
        let slide = &view_state.slide;
        let title = match &slide.title {
            Some(title) => format!(" {} ", title),
            None => format!(" Slide {} ", view_state.page),
        };

        let mut lines: Vec<Line> = slide
            .body
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect();
        if let Some(related) = slide.related_label() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                related,
                Style::default()
                    .fg(theme.muted_text)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(Self::panel(title, theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_question(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
        let editing = match &view_state.status_line.prompt {
            Some((PromptKind::Question, buffer)) => Some(buffer.as_str()),
            _ => None,
        };
        let (text, style) = match editing {
            Some(buffer) => (format!("{}▏", buffer), Style::default().fg(theme.normal_text)),
            None if view_state.question.is_empty() => (
                "Press Tab to ask about this slide".to_string(),
                Style::default().fg(theme.muted_text),
            ),
            None => (
                view_state.question.clone(),
                Style::default().fg(theme.muted_text),
            ),
        };

        let paragraph = Paragraph::new(text)
            .style(style)
            .block(Self::panel(" Ask ", theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_answer(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
        let lines = match &view_state.response {
            ResponsePanel::Answer(answer) => markdown_lines(answer, theme),
            ResponsePanel::Empty => Vec::new(),
            ResponsePanel::Loading => vec![Line::from(Span::styled(
                view_state.response.text().to_string(),
                Style::default()
                    .fg(theme.muted_text)
                    .add_modifier(Modifier::ITALIC),
            ))],
            ResponsePanel::Error(message) => vec![Line::from(Span::styled(
                message.clone(),
                Style::default().fg(theme.error_text),
            ))],
        };

        let paragraph = Paragraph::new(lines)
            .block(Self::panel(" Answer ", theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_progress(frame: &mut Frame, area: Rect, percent: u8, theme: &ColorTheme) {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.gauge).bg(theme.status_bg))
            .percent(u16::from(percent.min(100)))
            .label(format!("Processing {}%", percent));
        frame.render_widget(gauge, area);
    }

    fn render_status(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
        let status = Paragraph::new(view_state.format_status_line()).style(theme.status());
        frame.render_widget(status, area);
    }
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, view_state: &ViewState) -> Result<()> {
        let Self {
            terminal,
            canvas_cache,
            ..
        } = self;
        let Some(terminal) = terminal.as_mut() else {
            return Ok(());
        };
        let theme = ColorTheme::for_mode(view_state.theme);

        terminal.draw(|frame| {
            let panels = Panels::split(frame.size(), view_state.progress.is_some());

            Self::render_canvas(frame, panels.canvas, view_state, &theme, canvas_cache);
            Self::render_summary(frame, panels.summary, view_state, &theme);
            Self::render_question(frame, panels.question, view_state, &theme);
            Self::render_answer(frame, panels.answer, view_state, &theme);
            if let (Some(area), Some(percent)) = (panels.progress, view_state.progress) {
                Self::render_progress(frame, area, percent, &theme);
            }
            Self::render_status(frame, panels.status, view_state, &theme);
        })?;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        // Legacy terminals report Shift+Enter as plain Enter; Alt+Enter still works there
        if matches!(supports_keyboard_enhancement(), Ok(true)) {
            execute!(stdout, PushKeyboardEnhancementFlags(Self::keyboard_flags()))?;
            self.keyboard_enhanced = true;
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            if self.keyboard_enhanced {
                execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
                self.keyboard_enhanced = false;
            }
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
            self.terminal = None;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_ui_creation() {
        let ui = TerminalUI::new().unwrap();
        assert!(ui.terminal.is_none());
        assert!(ui.canvas_cache.is_none());
        assert!(!ui.keyboard_enhanced);
    }

    #[test]
    fn enhancement_only_disambiguates_escape_codes() {
        let flags = TerminalUI::keyboard_flags();
        assert!(flags.contains(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES));
        // Release events would double every keystroke
        assert!(!flags.contains(KeyboardEnhancementFlags::REPORT_EVENT_TYPES));
    }

    #[test]
    fn cleanup_without_initialize_is_a_no_op() {
        let mut ui = TerminalUI::new().unwrap();
        ui.cleanup().unwrap();
        assert!(!ui.keyboard_enhanced);
    }

    #[test]
    fn progress_row_only_while_polling() {
        let size = Rect::new(0, 0, 100, 40);
        let idle = Panels::split(size, false);
        assert!(idle.progress.is_none());
        assert_eq!(idle.status.y, 39);
        assert_eq!(idle.canvas.height, 39);

        let polling = Panels::split(size, true);
        assert_eq!(polling.progress.map(|r| r.y), Some(38));
        assert_eq!(polling.canvas.height, 38);
    }

    #[test]
    fn side_column_stacks_summary_question_answer() {
        let panels = Panels::split(Rect::new(0, 0, 100, 41), false);
        assert_eq!(panels.summary.x, panels.answer.x);
        assert_eq!(panels.question.y, panels.summary.y + panels.summary.height);
        assert_eq!(panels.question.height, 4);
        assert!(panels.canvas.width > panels.summary.width);
    }
}
