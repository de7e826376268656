//! High-level input service.
//!
//! Consumes coalesced raw events, runs the viewer's input state machine, and yields
//! domain-level `InputAction`s that the view coordinator consumes.

use crate::error::Result;
use crate::input::raw::{RawInputCollector, RawInputEvent, WheelDirection};
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Text prompts the viewer can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Question for the ask endpoint
    Question,
    /// Path of a PDF to upload
    UploadPath,
    /// New title for the current slide
    EditTitle,
    /// New summary for the current slide
    EditSummary,
}

impl PromptKind {
    /// Label displayed in front of the prompt buffer.
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Question => "Ask",
            PromptKind::UploadPath => "Upload PDF",
            PromptKind::EditTitle => "Title",
            PromptKind::EditSummary => "Summary",
        }
    }

    /// Shift+Enter inserts a newline instead of submitting.
    pub fn is_multiline(self) -> bool {
        matches!(self, PromptKind::Question | PromptKind::EditSummary)
    }
}

/// Current input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Navigation,
    Prompt { kind: PromptKind },
}

/// High-level input actions emitted by the state machine/service.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    PreviousPage,
    NextPage,
    ToggleTheme,
    ReprocessDocument,
    StartPrompt(PromptKind),
    UpdatePrompt { kind: PromptKind, buffer: String },
    CancelPrompt,
    SubmitPrompt { kind: PromptKind, value: String },
    Resize { width: u16, height: u16 },
    Quit,
    NoAction,
    InvalidInput,
}

/// Maps key presses to actions; owns the prompt buffer while a prompt is open.
pub struct InputStateMachine {
    state: InputState,
    buffer: String,
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self {
            state: InputState::Navigation,
            buffer: String::new(),
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputAction {
        if key_event.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }
        match self.state {
            InputState::Navigation => self.handle_navigation(key_event),
            InputState::Prompt { kind } => self.handle_prompt(kind, key_event),
        }
    }

    fn handle_navigation(&mut self, key_event: KeyEvent) -> InputAction {
        let plain = !key_event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                InputAction::Quit
            }
            KeyCode::Left | KeyCode::PageUp | KeyCode::Up => InputAction::PreviousPage,
            KeyCode::Right | KeyCode::PageDown | KeyCode::Down => InputAction::NextPage,
            KeyCode::Tab => self.open_prompt(PromptKind::Question),
            KeyCode::Char(ch) if plain => match ch {
                'h' | 'p' | 'k' => InputAction::PreviousPage,
                'l' | 'n' | 'j' | ' ' => InputAction::NextPage,
                'd' => InputAction::ToggleTheme,
                'r' => InputAction::ReprocessDocument,
                'a' | '?' => self.open_prompt(PromptKind::Question),
                'u' => self.open_prompt(PromptKind::UploadPath),
                't' => self.open_prompt(PromptKind::EditTitle),
                'e' => self.open_prompt(PromptKind::EditSummary),
                'q' => InputAction::Quit,
                _ => InputAction::InvalidInput,
            },
            _ => InputAction::InvalidInput,
        }
    }

    fn handle_prompt(&mut self, kind: PromptKind, key_event: KeyEvent) -> InputAction {
        let modifiers = key_event.modifiers;
        match key_event.code {
            KeyCode::Esc => self.close_prompt(),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.close_prompt()
            }
            KeyCode::Enter
                if kind.is_multiline()
                    && modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.buffer.push('\n');
                self.updated(kind)
            }
            KeyCode::Enter => {
                let value = std::mem::take(&mut self.buffer);
                self.state = InputState::Navigation;
                InputAction::SubmitPrompt { kind, value }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                self.updated(kind)
            }
            KeyCode::Char(ch)
                if !ch.is_control()
                    && !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.buffer.push(ch);
                self.updated(kind)
            }
            _ => InputAction::NoAction,
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) -> InputAction {
        self.state = InputState::Prompt { kind };
        self.buffer.clear();
        InputAction::StartPrompt(kind)
    }

    fn close_prompt(&mut self) -> InputAction {
        self.state = InputState::Navigation;
        self.buffer.clear();
        InputAction::CancelPrompt
    }

    fn updated(&self, kind: PromptKind) -> InputAction {
        InputAction::UpdatePrompt {
            kind,
            buffer: self.buffer.clone(),
        }
    }

    pub fn get_buffer(&self) -> &str {
        &self.buffer
    }

    pub fn get_state(&self) -> InputState {
        self.state
    }
}

impl Default for InputStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Service responsible for producing high-level `InputAction`s from terminal events.
pub struct InputService {
    state_machine: InputStateMachine,
    raw_input: RawInputCollector,
}

impl InputService {
    pub fn new() -> Self {
        Self {
            state_machine: InputStateMachine::new(),
            raw_input: RawInputCollector::new(),
        }
    }

    pub fn poll_actions(&mut self, timeout: Option<Duration>) -> Result<Vec<InputAction>> {
        let mut actions = Vec::new();

        if let Some(raw_event) = self.raw_input.poll_event(timeout)? {
            actions.extend(self.process_raw_event(raw_event));
            while let Some(extra_event) = self.raw_input.try_flush() {
                actions.extend(self.process_raw_event(extra_event));
            }
        }

        Ok(actions)
    }

    pub fn process_event(&mut self, event: Event) -> Vec<InputAction> {
        self.raw_input.process_event(event);
        let mut actions = Vec::new();
        while let Some(raw_event) = self.raw_input.try_flush() {
            actions.extend(self.process_raw_event(raw_event));
        }
        actions
    }

    fn process_raw_event(&mut self, event: RawInputEvent) -> Option<InputAction> {
        let action = match event {
            RawInputEvent::Key(key_event) => self.state_machine.handle_key_event(key_event),
            RawInputEvent::Resize { width, height } => InputAction::Resize { width, height },
            // One slide per wheel burst, and only while navigating
            RawInputEvent::Wheel { direction, .. } => match self.state_machine.get_state() {
                InputState::Navigation => match direction {
                    WheelDirection::Up => InputAction::PreviousPage,
                    WheelDirection::Down => InputAction::NextPage,
                },
                InputState::Prompt { .. } => InputAction::NoAction,
            },
        };

        match action {
            InputAction::NoAction | InputAction::InvalidInput => None,
            _ => Some(action),
        }
    }
}

impl Default for InputService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{MouseEvent, MouseEventKind};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(sm: &mut InputStateMachine, text: &str) {
        for ch in text.chars() {
            sm.handle_key_event(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn navigation_keys() {
        let mut sm = InputStateMachine::new();
        for code in [KeyCode::Left, KeyCode::Char('h'), KeyCode::Char('p')] {
            assert_eq!(sm.handle_key_event(key(code)), InputAction::PreviousPage);
        }
        for code in [
            KeyCode::Right,
            KeyCode::Char('l'),
            KeyCode::Char('n'),
            KeyCode::Char(' '),
        ] {
            assert_eq!(sm.handle_key_event(key(code)), InputAction::NextPage);
        }
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Char('d'))),
            InputAction::ToggleTheme
        );
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Char('r'))),
            InputAction::ReprocessDocument
        );
        assert_eq!(sm.handle_key_event(key(KeyCode::Char('q'))), InputAction::Quit);
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputAction::Quit
        );
    }

    #[test]
    fn enter_submits_question_and_returns_to_navigation() {
        let mut sm = InputStateMachine::new();
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Tab)),
            InputAction::StartPrompt(PromptKind::Question)
        );
        type_text(&mut sm, "why?");
        assert_eq!(sm.get_buffer(), "why?");

        assert_eq!(
            sm.handle_key_event(key(KeyCode::Enter)),
            InputAction::SubmitPrompt {
                kind: PromptKind::Question,
                value: "why?".to_string()
            }
        );
        assert_eq!(sm.get_state(), InputState::Navigation);
        assert_eq!(sm.get_buffer(), "");
    }

    #[test]
    fn shift_enter_inserts_newline_in_question() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('a')));
        type_text(&mut sm, "one");
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
            InputAction::UpdatePrompt {
                kind: PromptKind::Question,
                buffer: "one\n".to_string()
            }
        );
        type_text(&mut sm, "two");
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Enter)),
            InputAction::SubmitPrompt {
                kind: PromptKind::Question,
                value: "one\ntwo".to_string()
            }
        );
    }

    #[test]
    fn alt_enter_inserts_newline_in_summary() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('e')));
        type_text(&mut sm, "disks");
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)),
            InputAction::UpdatePrompt {
                kind: PromptKind::EditSummary,
                buffer: "disks\n".to_string()
            }
        );
        assert_eq!(sm.get_state(), InputState::Prompt { kind: PromptKind::EditSummary });
    }

    #[test]
    fn shift_enter_submits_single_line_prompts() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('u')));
        type_text(&mut sm, "deck.pdf");
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
            InputAction::SubmitPrompt {
                kind: PromptKind::UploadPath,
                value: "deck.pdf".to_string()
            }
        );
    }

    #[test]
    fn prompt_keys_are_text_not_commands() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('t')));
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Char('q'))),
            InputAction::UpdatePrompt {
                kind: PromptKind::EditTitle,
                buffer: "q".to_string()
            }
        );
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Backspace)),
            InputAction::UpdatePrompt {
                kind: PromptKind::EditTitle,
                buffer: String::new()
            }
        );
        assert_eq!(sm.handle_key_event(key(KeyCode::Esc)), InputAction::CancelPrompt);
        assert_eq!(sm.get_state(), InputState::Navigation);
    }

    #[test]
    fn wheel_burst_turns_one_slide() {
        let mut service = InputService::new();
        let tick = || {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollDown,
                column: 0,
                row: 0,
                modifiers: KeyModifiers::NONE,
            })
        };
        assert!(service.process_event(tick()).is_empty());
        assert!(service.process_event(tick()).is_empty());

        let actions = service.process_event(Event::Resize(100, 30));
        assert_eq!(
            actions,
            vec![
                InputAction::NextPage,
                InputAction::Resize {
                    width: 100,
                    height: 30
                },
            ]
        );
    }

    #[test]
    fn unbound_keys_are_filtered() {
        let mut service = InputService::new();
        assert!(service
            .process_event(Event::Key(key(KeyCode::Char('z'))))
            .is_empty());
    }
}
