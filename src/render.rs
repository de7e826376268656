//! Rendering subsystem: the render scheduler, the view controller that drives it, the event
//! protocol background tasks report through, and the terminal UI.

pub mod protocol;
pub mod scheduler;
pub mod service;
pub mod ui;

pub use scheduler::{RenderDecision, RenderScheduler, SchedulerState};
pub use service::{next_page, previous_page, ViewController};
