//! Events exchanged between background tasks and the view coordinator.

use crate::annotations::AnnotationMap;
use crate::document::{PagedDocument, RenderedPage};
use crate::error::SlideError;
use std::sync::Arc;

/// Identifier attached to backend requests so responses can be correlated.
pub type RequestId = u64;

/// Progress poller reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Latest reported percentage, clamped to 0..=100
    Report(u8),
    /// 100% observed; polling has stopped
    Complete,
    /// Polling gave up after too many consecutive failures
    Failed { message: String },
}

/// Completions delivered to the coordinator, one per finished background task.
#[derive(Debug)]
pub enum AppEvent {
    AnnotationsLoaded {
        request_id: RequestId,
        result: Result<AnnotationMap, SlideError>,
    },
    DocumentLoaded {
        request_id: RequestId,
        result: Result<Arc<dyn PagedDocument>, SlideError>,
    },
    PageRendered {
        page: u32,
        result: Result<RenderedPage, SlideError>,
    },
    AnswerReady {
        request_id: RequestId,
        result: Result<String, SlideError>,
    },
    ProcessFinished {
        request_id: RequestId,
        result: Result<(), SlideError>,
    },
    UploadFinished {
        request_id: RequestId,
        result: Result<(), SlideError>,
    },
    Progress {
        request_id: RequestId,
        update: ProgressUpdate,
    },
}

impl AppEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AppEvent::AnnotationsLoaded { .. } => "annotations-loaded",
            AppEvent::DocumentLoaded { .. } => "document-loaded",
            AppEvent::PageRendered { .. } => "page-rendered",
            AppEvent::AnswerReady { .. } => "answer-ready",
            AppEvent::ProcessFinished { .. } => "process-finished",
            AppEvent::UploadFinished { .. } => "upload-finished",
            AppEvent::Progress { .. } => "progress",
        }
    }
}
