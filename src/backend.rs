//! Client side of the summarization backend's HTTP contract.
//!
//! - [`SlideBackend`] is the seam the view controller talks to
//! - [`http::HttpBackend`] implements it with `reqwest`
//! - [`gate::RequestGate`] keeps requests single-flight per endpoint
//! - [`poll::poll_progress`] drives the `/progress` loop

pub mod gate;
pub mod http;
pub mod poll;

use crate::annotations::AnnotationMap;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use gate::RequestGate;
pub use http::HttpBackend;
pub use poll::poll_progress;

/// Fallback shown when the ask endpoint fails without an error message.
pub const ASK_FALLBACK_ERROR: &str = "Failed to get response from Gemini";

/// Backend endpoints, one single-flight slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SlideTexts,
    Document,
    Ask,
    Process,
    Upload,
    Progress,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::SlideTexts => "/slide_texts",
            Endpoint::Document => "/pdf",
            Endpoint::Ask => "/ask_gemini",
            Endpoint::Process => "/process_pdf",
            Endpoint::Upload => "/upload",
            Endpoint::Progress => "/progress",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Body of `POST /ask_gemini`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest<'a> {
    pub question: &'a str,
    pub current_slide: u32,
}

/// Reply of `POST /ask_gemini`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AskReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of `POST /process_pdf`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of `GET /progress`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressReply {
    pub progress: f64,
}

impl ProgressReply {
    /// Whole percentage clamped to 0..=100, rounded down so only a real 100 completes.
    pub fn percent(&self) -> u8 {
        if self.progress.is_nan() {
            0
        } else {
            self.progress.clamp(0.0, 100.0).floor() as u8
        }
    }
}

/// Operations the viewer needs from the backend.
#[async_trait]
pub trait SlideBackend: Send + Sync {
    async fn slide_texts(&self) -> Result<AnnotationMap>;

    /// Raw bytes of `/pdf/<name>.pdf`
    async fn document_bytes(&self, name: &str) -> Result<Vec<u8>>;

    /// Answer text; `success: false` maps to [`crate::SlideError::Backend`]
    async fn ask(&self, question: &str, current_slide: u32) -> Result<String>;

    async fn process_pdf(&self) -> Result<()>;

    async fn upload(&self, path: &Path) -> Result<()>;

    /// Current processing progress, 0..=100
    async fn progress(&self) -> Result<u8>;
}
