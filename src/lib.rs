//! # slidewise - Terminal Slide Viewer
//!
//! Renders a lecture PDF slide by slide in the terminal, shows the AI-generated summary for
//! each slide next to it, and relays questions about the current slide to the summarization
//! backend.
//!
//! ## Features
//!
//! - **Single-flight rendering**: rapid navigation never queues renders; the latest request wins
//! - **Slide summaries**: legacy plain-text and structured `{title, summary}` annotations
//! - **Question relay**: markdown answers from the backend's ask endpoint
//! - **Processing**: upload or reprocess a PDF and follow progress until the session reloads
//! - **Themes**: light and dark palettes with a persisted preference
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`config`] - Viewer configuration and persisted preferences
//! - [`annotations`] - Per-slide annotation map
//! - [`document`] - Paged documents, PDFium rasterization and the drawing surface
//! - [`backend`] - HTTP contract with the summarization backend
//! - [`render`] - Render scheduler, view controller and terminal UI
//! - [`input`] - Key bindings and prompts
//! - [`app`] - Application core and component coordination

// Core modules
pub mod annotations;
pub mod config;
pub mod error;

// Collaborators
pub mod backend;
pub mod document;

// Subsystems
pub mod input;
pub mod render;

pub mod app;

// Re-export commonly used types for convenience
pub use error::{Result, SlideError};

// Public API surface for external usage
pub use annotations::AnnotationMap;
pub use app::Application;
pub use backend::{HttpBackend, SlideBackend};
pub use config::{PreferencesStore, ThemeMode, ViewerConfig};
pub use document::{DocumentOpener, PagedDocument, PdfiumOpener};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
