//! UI state management structures
//!
//! Everything the terminal renderer needs for one frame. The coordinator owns the
//! [`ViewState`] and mutates it in response to input actions and worker events; the renderer
//! only reads it.

use crate::annotations::SlideText;
use crate::config::ThemeMode;
use crate::document::SharedSurface;
use crate::input::PromptKind;

/// Literal shown when an empty question is submitted.
pub const EMPTY_QUESTION: &str = "Please enter a question";
/// Response panel text while an answer is outstanding.
pub const ASKING: &str = "Asking Gemini...";

/// Viewport state for rendering
#[derive(Debug)]
pub struct ViewState {
    /// Document name for the panel title
    pub document_name: String,

    /// Current 1-based page
    pub page: u32,

    /// Total pages, None until the document has loaded
    pub page_count: Option<u32>,

    /// Annotation shown beside the slide
    pub slide: SlidePanel,

    /// Last submitted question, shown above the answer
    pub question: String,

    pub response: ResponsePanel,

    /// Processing progress, None when no poll is running
    pub progress: Option<u8>,

    /// Status line content
    pub status_line: StatusLine,

    pub theme: ThemeMode,

    /// Surface the render scheduler draws pages onto
    pub surface: SharedSurface,

    /// True while a page render is in flight
    pub rendering: bool,

    /// Viewport dimensions
    pub viewport_width: u16,
    pub viewport_height: u16,
}

impl ViewState {
    pub fn new(
        document_name: impl Into<String>,
        surface: SharedSurface,
        theme: ThemeMode,
        viewport_width: u16,
        viewport_height: u16,
    ) -> Self {
        Self {
            document_name: document_name.into(),
            page: 1,
            page_count: None,
            slide: SlidePanel::default(),
            question: String::new(),
            response: ResponsePanel::Empty,
            progress: None,
            status_line: StatusLine::new(),
            theme,
            surface,
            rendering: false,
            viewport_width,
            viewport_height,
        }
    }

    /// "Slide 3 / 12", or "Slide 3 / ?" before the document loads
    pub fn page_counter(&self) -> String {
        match self.page_count {
            Some(total) => format!("Slide {} / {}", self.page, total),
            None => format!("Slide {} / ?", self.page),
        }
    }

    /// Update terminal dimensions. Returns true if they actually changed.
    pub fn update_terminal_size(&mut self, width: u16, height: u16) -> bool {
        let changed = self.viewport_width != width || self.viewport_height != height;
        if changed {
            self.viewport_width = width;
            self.viewport_height = height;
        }
        changed
    }

    /// Format the status line for this view state
    pub fn format_status_line(&self) -> String {
        self.status_line.format_status_line(
            &self.document_name,
            &self.page_counter(),
            self.rendering,
        )
    }
}

/// Annotation panel content for the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlidePanel {
    pub title: Option<String>,
    pub body: String,
    /// Pages sharing this page's summary
    pub related: Vec<u32>,
}

impl SlidePanel {
    pub fn new(text: SlideText, related: Vec<u32>) -> Self {
        Self {
            title: text.title,
            body: text.body,
            related,
        }
    }

    /// "Slides 3-5", "Slides 2, 4" or None when the page stands alone
    pub fn related_label(&self) -> Option<String> {
        if self.related.len() < 2 {
            return None;
        }
        let contiguous = self.related.windows(2).all(|pair| pair[1] == pair[0] + 1);
        let (first, last) = (self.related[0], self.related[self.related.len() - 1]);
        if contiguous {
            Some(format!("Slides {}-{}", first, last))
        } else {
            let pages: Vec<String> = self.related.iter().map(u32::to_string).collect();
            Some(format!("Slides {}", pages.join(", ")))
        }
    }
}

/// Answer panel states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponsePanel {
    #[default]
    Empty,
    Loading,
    /// Markdown answer text
    Answer(String),
    /// Complete error line, already prefixed where needed
    Error(String),
}

impl ResponsePanel {
    pub fn error(err: impl std::fmt::Display) -> Self {
        ResponsePanel::Error(format!("Error: {}", err))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ResponsePanel::Loading)
    }

    pub fn text(&self) -> &str {
        match self {
            ResponsePanel::Empty => "",
            ResponsePanel::Loading => ASKING,
            ResponsePanel::Answer(text) | ResponsePanel::Error(text) => text,
        }
    }
}

/// Status line information
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub message: Option<String>,
    pub prompt: Option<(PromptKind, String)>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a temporary message
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn set_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some((kind, String::new()));
    }

    pub fn update_prompt(&mut self, kind: PromptKind, buffer: String) {
        self.prompt = Some((kind, buffer));
    }

    pub fn clear_prompt(&mut self) {
        self.prompt = None;
    }

    /// Prompt text when a prompt is open, otherwise position and message.
    pub fn format_status_line(&self, document: &str, counter: &str, rendering: bool) -> String {
        if let Some((kind, buffer)) = &self.prompt {
            // Multi-line buffers show their last line only
            let tail = buffer.rsplit('\n').next().unwrap_or("");
            return format!("{}: {}", kind.label(), tail);
        }

        let counter = if rendering {
            format!("{} (rendering)", counter)
        } else {
            counter.to_string()
        };
        match &self.message {
            Some(message) => format!("{} | {} | {}", document, counter, message),
            None => format!("{} | {}", document, counter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DrawingSurface;

    fn state() -> ViewState {
        ViewState::new("03-storage1", DrawingSurface::shared(), ThemeMode::Dark, 80, 24)
    }

    #[test]
    fn test_view_state_creation() {
        let state = state();
        assert_eq!(state.page, 1);
        assert_eq!(state.page_count, None);
        assert_eq!(state.response, ResponsePanel::Empty);
        assert_eq!(state.page_counter(), "Slide 1 / ?");
    }

    #[test]
    fn test_status_line_format() {
        let mut state = state();
        state.page = 3;
        state.page_count = Some(12);
        assert_eq!(state.format_status_line(), "03-storage1 | Slide 3 / 12");

        state.rendering = true;
        state.status_line.set_message("Theme: light");
        assert_eq!(
            state.format_status_line(),
            "03-storage1 | Slide 3 / 12 (rendering) | Theme: light"
        );

        state.status_line.set_prompt(PromptKind::UploadPath);
        state
            .status_line
            .update_prompt(PromptKind::UploadPath, "/tmp/deck.pdf".to_string());
        assert_eq!(state.format_status_line(), "Upload PDF: /tmp/deck.pdf");
    }

    #[test]
    fn multi_line_prompts_show_the_last_line() {
        let mut status = StatusLine::new();
        status.update_prompt(PromptKind::Question, "first\nsecond".to_string());
        assert_eq!(status.format_status_line("doc", "Slide 1 / 1", false), "Ask: second");
    }

    #[test]
    fn related_labels() {
        let panel = |related: Vec<u32>| SlidePanel {
            related,
            ..SlidePanel::default()
        };
        assert_eq!(panel(vec![4]).related_label(), None);
        assert_eq!(panel(vec![3, 4, 5]).related_label().as_deref(), Some("Slides 3-5"));
        assert_eq!(panel(vec![2, 4]).related_label().as_deref(), Some("Slides 2, 4"));
    }

    #[test]
    fn response_panel_text() {
        assert_eq!(ResponsePanel::Loading.text(), "Asking Gemini...");
        assert_eq!(ResponsePanel::error("boom").text(), "Error: boom");
        assert_eq!(
            ResponsePanel::Error(EMPTY_QUESTION.to_string()).text(),
            "Please enter a question"
        );
    }

    #[test]
    fn test_terminal_resize() {
        let mut state = state();
        assert!(!state.update_terminal_size(80, 24));
        assert!(state.update_terminal_size(120, 30));
        assert_eq!((state.viewport_width, state.viewport_height), (120, 30));
    }
}
