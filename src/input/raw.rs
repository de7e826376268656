//! Low-level input collection: crossterm polling, mouse wheel coalescing, and
//! translation into primitive events that the higher-level input service can consume.
//!
//! A burst of wheel ticks in one direction collapses into a single [`RawInputEvent::Wheel`]
//! so that a trackpad swipe turns one slide instead of a dozen.

use crate::error::Result;
use ratatui::crossterm::event::{self, Event, KeyEvent, MouseEvent, MouseEventKind};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default coalescing window for wheel events.
const DEFAULT_COALESCE_WINDOW_MS: u64 = 120;
/// Poll timeout used when the caller does not provide one.
const DEFAULT_POLL_TIMEOUT_MS: u64 = 50;

/// Wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// Low-level events surfaced by the raw input collector.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Wheel { direction: WheelDirection, ticks: u32 },
}

/// Aggregates high-frequency wheel events into one step.
#[derive(Debug, Clone)]
pub struct InputCoalescer {
    window: Duration,
    pending: Option<PendingWheel>,
}

#[derive(Debug, Clone)]
struct PendingWheel {
    direction: WheelDirection,
    ticks: u32,
    last_event: Instant,
}

impl InputCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Register a wheel tick, returning a previously queued burst that must be flushed first.
    pub fn push(&mut self, direction: WheelDirection, now: Instant) -> Option<(WheelDirection, u32)> {
        match self.pending {
            Some(ref mut pending) if pending.direction == direction => {
                pending.ticks = pending.ticks.saturating_add(1);
                pending.last_event = now;
                None
            }
            _ => {
                let flushed = self.flush();
                self.pending = Some(PendingWheel {
                    direction,
                    ticks: 1,
                    last_event: now,
                });
                flushed
            }
        }
    }

    /// Flush the burst if the window has expired since its last tick.
    pub fn flush_if_stale(&mut self, now: Instant) -> Option<(WheelDirection, u32)> {
        if let Some(pending) = &self.pending {
            if now.duration_since(pending.last_event) >= self.window {
                return self.flush();
            }
        }
        None
    }

    pub fn flush(&mut self) -> Option<(WheelDirection, u32)> {
        self.pending
            .take()
            .map(|pending| (pending.direction, pending.ticks))
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

/// Collector that polls crossterm for events and applies wheel coalescing.
#[derive(Debug)]
pub struct RawInputCollector {
    coalescer: InputCoalescer,
    pending_events: VecDeque<RawInputEvent>,
}

impl RawInputCollector {
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS))
    }

    /// Create a collector with a custom coalescing window (useful for tests).
    pub fn with_window(window: Duration) -> Self {
        Self {
            coalescer: InputCoalescer::new(window),
            pending_events: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending_events.is_empty() && self.coalescer.is_empty()
    }

    /// Process a synthetic event (primarily used by unit tests).
    pub fn process_event(&mut self, event: Event) {
        self.enqueue_event(event);
    }

    /// Next queued event or stale wheel burst, without polling crossterm.
    pub fn try_flush(&mut self) -> Option<RawInputEvent> {
        if let Some(event) = self.pop_pending() {
            return Some(event);
        }
        self.coalescer
            .flush_if_stale(Instant::now())
            .map(|(direction, ticks)| RawInputEvent::Wheel { direction, ticks })
    }

    /// Retrieve the next raw input event, blocking up to `timeout`.
    pub fn poll_event(&mut self, timeout: Option<Duration>) -> Result<Option<RawInputEvent>> {
        if let Some(event) = self.try_flush() {
            return Ok(Some(event));
        }

        let poll_timeout = timeout.unwrap_or(Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS));
        if !event::poll(poll_timeout)? {
            return Ok(self.try_flush());
        }

        let event = event::read()?;
        self.enqueue_event(event);
        Ok(self.pop_pending())
    }

    fn enqueue_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event) => {
                self.flush_pending_wheel();
                self.pending_events.push_back(RawInputEvent::Key(key_event));
            }
            Event::Resize(width, height) => {
                self.flush_pending_wheel();
                self.pending_events
                    .push_back(RawInputEvent::Resize { width, height });
            }
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        let direction = match mouse_event.kind {
            MouseEventKind::ScrollUp => WheelDirection::Up,
            MouseEventKind::ScrollDown => WheelDirection::Down,
            _ => return,
        };

        if let Some((flushed, ticks)) = self.coalescer.push(direction, Instant::now()) {
            self.pending_events.push_back(RawInputEvent::Wheel {
                direction: flushed,
                ticks,
            });
        }
    }

    fn flush_pending_wheel(&mut self) {
        if let Some((direction, ticks)) = self.coalescer.flush() {
            self.pending_events
                .push_back(RawInputEvent::Wheel { direction, ticks });
        }
    }

    fn pop_pending(&mut self) -> Option<RawInputEvent> {
        self.pending_events.pop_front()
    }
}

impl Default for RawInputCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn wheel(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn accumulates_same_direction_within_window() {
        let mut coalescer = InputCoalescer::new(Duration::from_millis(10));
        let now = Instant::now();

        assert_eq!(coalescer.push(WheelDirection::Down, now), None);
        assert_eq!(
            coalescer.push(WheelDirection::Down, now + Duration::from_millis(5)),
            None
        );
        assert_eq!(coalescer.flush_if_stale(now + Duration::from_millis(8)), None);
        assert_eq!(
            coalescer.flush_if_stale(now + Duration::from_millis(20)),
            Some((WheelDirection::Down, 2))
        );
        assert!(coalescer.is_empty());
    }

    #[test]
    fn flushes_on_direction_change() {
        let mut coalescer = InputCoalescer::new(Duration::from_millis(10));
        let now = Instant::now();

        coalescer.push(WheelDirection::Up, now);
        let flushed = coalescer.push(WheelDirection::Down, now + Duration::from_millis(3));
        assert_eq!(flushed, Some((WheelDirection::Up, 1)));
        assert_eq!(coalescer.flush(), Some((WheelDirection::Down, 1)));
    }

    #[test]
    fn key_press_flushes_pending_wheel_first() {
        let mut collector = RawInputCollector::new();
        collector.process_event(wheel(MouseEventKind::ScrollDown));
        collector.process_event(wheel(MouseEventKind::ScrollDown));
        collector.process_event(Event::Key(KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
        )));

        assert_eq!(
            collector.try_flush(),
            Some(RawInputEvent::Wheel {
                direction: WheelDirection::Down,
                ticks: 2
            })
        );
        match collector.try_flush() {
            Some(RawInputEvent::Key(key)) => assert_eq!(key.code, KeyCode::Char('q')),
            other => panic!("expected key event, got {other:?}"),
        }
        assert!(collector.is_idle());
    }

    #[test]
    fn handles_resize_after_wheel() {
        let mut collector = RawInputCollector::new();
        collector.process_event(wheel(MouseEventKind::ScrollUp));
        collector.process_event(Event::Resize(80, 40));

        assert!(matches!(
            collector.try_flush(),
            Some(RawInputEvent::Wheel {
                direction: WheelDirection::Up,
                ..
            })
        ));
        assert_eq!(
            collector.try_flush(),
            Some(RawInputEvent::Resize {
                width: 80,
                height: 40
            })
        );
    }
}
