//! Render coordination.
//!
//! [`ViewController`] is the state machine that mediates between input actions, background
//! work and view updates. It owns the document handle, the annotation map, the render
//! scheduler and the per-endpoint request gate. All completions come back through one
//! [`AppEvent`] channel and are applied by the coordinator one at a time.

use crate::annotations::AnnotationMap;
use crate::backend::{poll_progress, Endpoint, RequestGate, SlideBackend};
use crate::config::{Preferences, PreferencesStore, ViewerConfig};
use crate::document::{render_page, DocumentOpener, PagedDocument, SharedSurface};
use crate::error::{Result, SlideError};
use crate::input::{InputAction, PromptKind};
use crate::render::protocol::{AppEvent, ProgressUpdate, RequestId};
use crate::render::scheduler::{RenderDecision, RenderScheduler, SchedulerState};
use crate::render::ui::state::{ResponsePanel, SlidePanel, ViewState, EMPTY_QUESTION};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Page before `current`, wrapping from the first page to the last.
pub fn previous_page(current: u32, page_count: u32) -> u32 {
    if current <= 1 {
        page_count
    } else {
        current - 1
    }
}

/// Page after `current`, wrapping from the last page to the first.
pub fn next_page(current: u32, page_count: u32) -> u32 {
    if current >= page_count {
        1
    } else {
        current + 1
    }
}

pub struct ViewController {
    backend: Arc<dyn SlideBackend>,
    opener: Arc<dyn DocumentOpener>,
    events_tx: UnboundedSender<AppEvent>,
    config: ViewerConfig,
    preferences: PreferencesStore,
    surface: SharedSurface,
    document: Option<Arc<dyn PagedDocument>>,
    annotations: AnnotationMap,
    scheduler: RenderScheduler,
    gate: RequestGate,
    poller: Option<JoinHandle<()>>,
    reloads: u32,
}

impl ViewController {
    pub fn new(
        backend: Arc<dyn SlideBackend>,
        opener: Arc<dyn DocumentOpener>,
        config: ViewerConfig,
        preferences: PreferencesStore,
        surface: SharedSurface,
        events_tx: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            backend,
            opener,
            events_tx,
            config,
            preferences,
            surface,
            document: None,
            annotations: AnnotationMap::new(),
            scheduler: RenderScheduler::new(),
            gate: RequestGate::new(),
            poller: None,
            reloads: 0,
        }
    }

    /// Kick off the initial fetch of annotations and document.
    pub fn start(&mut self, view_state: &mut ViewState) {
        self.load_session(view_state);
    }

    pub fn document(&self) -> Option<&Arc<dyn PagedDocument>> {
        self.document.as_ref()
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Session reloads triggered by completed processing
    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    pub fn is_polling(&self) -> bool {
        self.gate.is_in_flight(Endpoint::Progress)
    }

    /// Stop background polling before the coordinator exits.
    pub fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        self.gate.cancel(Endpoint::Progress);
    }

    /// Apply one input action. Returns false when the viewer should quit.
    pub fn process_action(
        &mut self,
        action: InputAction,
        view_state: &mut ViewState,
    ) -> Result<bool> {
        match action {
            InputAction::Quit => return Ok(false),
            InputAction::PreviousPage => self.navigate(view_state, previous_page),
            InputAction::NextPage => self.navigate(view_state, next_page),
            InputAction::ToggleTheme => self.toggle_theme(view_state),
            InputAction::ReprocessDocument => self.request_processing(view_state),
            InputAction::StartPrompt(kind) => {
                view_state.status_line.clear_message();
                view_state.status_line.set_prompt(kind);
            }
            InputAction::UpdatePrompt { kind, buffer } => {
                view_state.status_line.update_prompt(kind, buffer);
            }
            InputAction::CancelPrompt => view_state.status_line.clear_prompt(),
            InputAction::SubmitPrompt { kind, value } => {
                view_state.status_line.clear_prompt();
                match kind {
                    PromptKind::Question => self.ask(value, view_state),
                    PromptKind::UploadPath => self.upload(value, view_state),
                    PromptKind::EditTitle => self.edit_title(value, view_state),
                    PromptKind::EditSummary => self.edit_summary(value, view_state),
                }
            }
            InputAction::Resize { width, height } => {
                view_state.update_terminal_size(width, height);
            }
            InputAction::NoAction | InputAction::InvalidInput => {}
        }
        Ok(true)
    }

    /// Apply one background completion.
    pub fn handle_event(&mut self, event: AppEvent, view_state: &mut ViewState) -> Result<()> {
        log::trace!("handling {}", event.kind());
        match event {
            AppEvent::AnnotationsLoaded { request_id, result } => {
                if !self.gate.finish(Endpoint::SlideTexts, request_id) {
                    log::debug!("dropping stale slide texts response {}", request_id);
                    return Ok(());
                }
                match result {
                    Ok(annotations) => {
                        log::info!("loaded {} slide annotations", annotations.len());
                        self.annotations = annotations;
                        self.refresh_slide_panel(view_state);
                    }
                    Err(err) => {
                        log::warn!("failed to load slide texts: {}", err);
                        view_state
                            .status_line
                            .set_message(format!("Failed to load slide texts: {}", err));
                    }
                }
            }
            AppEvent::DocumentLoaded { request_id, result } => {
                if !self.gate.finish(Endpoint::Document, request_id) {
                    log::debug!("dropping stale document response {}", request_id);
                    return Ok(());
                }
                match result {
                    Ok(document) => self.install_document(document, view_state),
                    Err(err) => {
                        log::error!("failed to load document: {}", err);
                        view_state
                            .status_line
                            .set_message(format!("Failed to load document: {}", err));
                    }
                }
            }
            AppEvent::PageRendered { page, result } => {
                match result {
                    Ok(rendered) => log::debug!(
                        "rendered slide {} at {}x{}",
                        rendered.page,
                        rendered.width,
                        rendered.height
                    ),
                    Err(err) => {
                        log::error!("render of slide {} failed: {}", page, err);
                        view_state.status_line.set_message(err.to_string());
                    }
                }
                // Failed or not, the scheduler must drain so later requests are never blocked
                match self.scheduler.complete() {
                    Some(next) => self.start_render(next, view_state),
                    None => view_state.rendering = false,
                }
            }
            AppEvent::AnswerReady { request_id, result } => {
                if !self.gate.finish(Endpoint::Ask, request_id) {
                    log::debug!("dropping stale answer {}", request_id);
                    return Ok(());
                }
                view_state.response = match result {
                    Ok(answer) => ResponsePanel::Answer(answer),
                    Err(err) => {
                        log::warn!("ask failed: {}", err);
                        ResponsePanel::error(err)
                    }
                };
            }
            AppEvent::ProcessFinished { request_id, result } => {
                if !self.gate.finish(Endpoint::Process, request_id) {
                    return Ok(());
                }
                match result {
                    Ok(()) => {
                        view_state.status_line.set_message("Processing started");
                        self.start_polling(view_state);
                    }
                    Err(err) => {
                        log::warn!("reprocess failed: {}", err);
                        view_state.status_line.set_message(format!("Error: {}", err));
                    }
                }
            }
            AppEvent::UploadFinished { request_id, result } => {
                if !self.gate.finish(Endpoint::Upload, request_id) {
                    return Ok(());
                }
                match result {
                    Ok(()) => {
                        view_state.status_line.set_message("Upload complete, processing");
                        self.start_polling(view_state);
                    }
                    Err(err) => {
                        log::warn!("upload failed: {}", err);
                        view_state
                            .status_line
                            .set_message(format!("Upload failed: {}", err));
                    }
                }
            }
            AppEvent::Progress { request_id, update } => {
                self.handle_progress(request_id, update, view_state)
            }
        }
        Ok(())
    }

    fn handle_progress(
        &mut self,
        request_id: RequestId,
        update: ProgressUpdate,
        view_state: &mut ViewState,
    ) {
        if !self.gate.is_current(Endpoint::Progress, request_id) {
            log::debug!("dropping stale progress update from poll {}", request_id);
            return;
        }
        match update {
            ProgressUpdate::Report(percent) => view_state.progress = Some(percent),
            ProgressUpdate::Complete => {
                self.gate.finish(Endpoint::Progress, request_id);
                self.poller = None;
                view_state.progress = None;
                self.reloads += 1;
                log::info!("processing complete, reloading session");
                view_state.status_line.set_message("Processing complete, reloading");
                self.load_session(view_state);
            }
            ProgressUpdate::Failed { message } => {
                self.gate.finish(Endpoint::Progress, request_id);
                self.poller = None;
                view_state.progress = None;
                view_state
                    .status_line
                    .set_message(format!("Progress polling stopped: {}", message));
            }
        }
    }

    /// Fetch annotations and document; responses from an earlier load become stale.
    fn load_session(&mut self, view_state: &mut ViewState) {
        let texts_id = self.gate.supersede(Endpoint::SlideTexts);
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.slide_texts().await;
            let _ = tx.send(AppEvent::AnnotationsLoaded {
                request_id: texts_id,
                result,
            });
        });

        let document_id = self.gate.supersede(Endpoint::Document);
        let backend = Arc::clone(&self.backend);
        let opener = Arc::clone(&self.opener);
        let name = self.config.document.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match backend.document_bytes(&name).await {
                Ok(bytes) => opener.open(&name, bytes).await,
                Err(err) => Err(err),
            };
            let _ = tx.send(AppEvent::DocumentLoaded {
                request_id: document_id,
                result,
            });
        });

        view_state.document_name = self.config.document.clone();
    }

    fn install_document(&mut self, document: Arc<dyn PagedDocument>, view_state: &mut ViewState) {
        let page_count = document.page_count();
        log::info!("opened {} with {} pages", document.name(), page_count);

        view_state.document_name = document.name().to_string();
        view_state.page_count = Some(page_count);
        view_state.page = 1;
        self.document = Some(document);
        self.refresh_slide_panel(view_state);

        if page_count == 0 {
            view_state.status_line.set_message("Document has no pages");
            return;
        }
        self.request_render(1, view_state);
    }

    fn navigate(&mut self, view_state: &mut ViewState, step: fn(u32, u32) -> u32) {
        let Some(page_count) = self.document.as_ref().map(|doc| doc.page_count()) else {
            view_state.status_line.set_message("Document not loaded yet");
            return;
        };
        if page_count == 0 {
            return;
        }

        let page = step(view_state.page, page_count);
        view_state.page = page;
        view_state.status_line.clear_message();
        self.refresh_slide_panel(view_state);
        self.request_render(page, view_state);
    }

    fn request_render(&mut self, page: u32, view_state: &mut ViewState) {
        match self.scheduler.request(page) {
            RenderDecision::Start(page) => self.start_render(page, view_state),
            RenderDecision::Deferred { superseded } => {
                if let Some(dropped) = superseded {
                    log::debug!("pending render of slide {} superseded by {}", dropped, page);
                }
            }
        }
    }

    /// Spawn the render for `page`. The scheduler must already be busy with it.
    fn start_render(&mut self, page: u32, view_state: &mut ViewState) {
        let Some(document) = self.document.clone() else {
            log::warn!("render of slide {} requested without a document", page);
            if let Some(dropped) = self.scheduler.reset() {
                log::debug!("dropping pending render of slide {}", dropped);
            }
            view_state.rendering = false;
            return;
        };
        // Pending pages may predate a reload that shrank the document
        let page = page.clamp(1, document.page_count().max(1));

        view_state.rendering = true;
        let surface = Arc::clone(&self.surface);
        let scale = self.config.render_scale;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = render_page(document.as_ref(), page, scale, &surface).await;
            let _ = tx.send(AppEvent::PageRendered { page, result });
        });
    }

    fn refresh_slide_panel(&self, view_state: &mut ViewState) {
        let page = view_state.page;
        view_state.slide = SlidePanel::new(
            self.annotations.slide_text(page),
            self.annotations.related_slides(page),
        );
    }

    fn ask(&mut self, value: String, view_state: &mut ViewState) {
        let question = value.trim().to_string();
        if question.is_empty() {
            view_state.response = ResponsePanel::Error(EMPTY_QUESTION.to_string());
            return;
        }
        let Some(request_id) = self.gate.begin(Endpoint::Ask) else {
            view_state
                .status_line
                .set_message("Still waiting for the previous answer");
            return;
        };

        let current_slide = view_state.page;
        view_state.question = question.clone();
        view_state.response = ResponsePanel::Loading;

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.ask(&question, current_slide).await;
            let _ = tx.send(AppEvent::AnswerReady { request_id, result });
        });
    }

    fn request_processing(&mut self, view_state: &mut ViewState) {
        let Some(request_id) = self.gate.begin(Endpoint::Process) else {
            view_state
                .status_line
                .set_message("Processing request already pending");
            return;
        };
        view_state.status_line.set_message("Requesting reprocess");

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.process_pdf().await;
            let _ = tx.send(AppEvent::ProcessFinished { request_id, result });
        });
    }

    fn upload(&mut self, value: String, view_state: &mut ViewState) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            view_state.status_line.set_message("Upload cancelled");
            return;
        }
        let path = PathBuf::from(trimmed);
        if let Err(err) = validate_upload_path(&path) {
            view_state.status_line.set_message(err.to_string());
            return;
        }
        let Some(request_id) = self.gate.begin(Endpoint::Upload) else {
            view_state.status_line.set_message("An upload is already running");
            return;
        };
        view_state
            .status_line
            .set_message(format!("Uploading {}", path.display()));

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.upload(&path).await;
            let _ = tx.send(AppEvent::UploadFinished { request_id, result });
        });
    }

    fn start_polling(&mut self, view_state: &mut ViewState) {
        let Some(request_id) = self.gate.begin(Endpoint::Progress) else {
            log::debug!("progress poll already running");
            return;
        };
        view_state.progress = Some(0);
        self.poller = Some(tokio::spawn(poll_progress(
            Arc::clone(&self.backend),
            self.config.poll_policy(),
            request_id,
            self.events_tx.clone(),
        )));
    }

    fn edit_title(&mut self, value: String, view_state: &mut ViewState) {
        let title = value.trim();
        if title.is_empty() {
            view_state.status_line.set_message("Title unchanged");
            return;
        }
        self.annotations.set_title(view_state.page, title);
        self.refresh_slide_panel(view_state);
        view_state
            .status_line
            .set_message(format!("Title of slide {} updated", view_state.page));
    }

    fn edit_summary(&mut self, value: String, view_state: &mut ViewState) {
        let summary = value.trim();
        if summary.is_empty() {
            view_state.status_line.set_message("Summary unchanged");
            return;
        }
        self.annotations.set_summary(view_state.page, summary);
        self.refresh_slide_panel(view_state);
        view_state
            .status_line
            .set_message(format!("Summary of slide {} updated", view_state.page));
    }

    fn toggle_theme(&mut self, view_state: &mut ViewState) {
        view_state.theme = view_state.theme.toggled();
        let preferences = Preferences {
            theme: Some(view_state.theme),
        };
        match self.preferences.save(&preferences) {
            Ok(()) => view_state
                .status_line
                .set_message(format!("Theme: {}", view_state.theme.label())),
            Err(err) => {
                log::warn!("failed to persist theme: {}", err);
                view_state
                    .status_line
                    .set_message(format!("Theme not saved: {}", err));
            }
        }
    }
}

impl Drop for ViewController {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

fn validate_upload_path(path: &std::path::Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SlideError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => SlideError::file_error(format!("inspecting {}", path.display()), e),
    })?;
    if !metadata.is_file() {
        return Err(SlideError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
