//! Application orchestration layer
//!
//! Wires the backend, the document opener and the terminal renderer around one
//! [`ViewController`], then runs the coordinator loop: input actions and background
//! completions are applied one at a time and every change is followed by a redraw.

pub mod runtime;

use crate::backend::SlideBackend;
use crate::config::{PreferencesStore, ViewerConfig};
use crate::document::{DocumentOpener, DrawingSurface};
use crate::error::Result;
use crate::render::protocol::AppEvent;
use crate::render::ui::{UIRenderer, ViewState};
use crate::render::ViewController;
use runtime::spawn_input_thread;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Redraw cadence while nothing else happens, so finished renders appear promptly.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Application orchestrator
pub struct Application {
    controller: ViewController,
    ui_renderer: Box<dyn UIRenderer>,
    view_state: ViewState,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl Application {
    /// Create application by initializing and wiring components together
    pub fn new(
        config: ViewerConfig,
        backend: Arc<dyn SlideBackend>,
        opener: Arc<dyn DocumentOpener>,
        preferences: PreferencesStore,
        ui_renderer: Box<dyn UIRenderer>,
    ) -> Result<Self> {
        let (width, height) = ui_renderer.get_terminal_size()?;
        let theme = preferences.theme_or(config.theme);
        let surface = DrawingSurface::shared();
        let view_state = ViewState::new(
            config.document.clone(),
            Arc::clone(&surface),
            theme,
            width,
            height,
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller =
            ViewController::new(backend, opener, config, preferences, surface, events_tx);

        Ok(Self {
            controller,
            ui_renderer,
            view_state,
            events_rx,
        })
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    /// Run until the user quits. The terminal is restored even when the loop fails.
    pub async fn run(&mut self) -> Result<()> {
        self.ui_renderer.initialize()?;
        let outcome = self.run_loop().await;
        self.controller.shutdown();
        self.ui_renderer.cleanup()?;
        outcome
    }

    async fn run_loop(&mut self) -> Result<()> {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let input_handle = spawn_input_thread(input_tx, Arc::clone(&shutdown), INPUT_POLL_INTERVAL);

        self.controller.start(&mut self.view_state);
        self.ui_renderer.render(&self.view_state)?;

        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        let outcome = loop {
            tokio::select! {
                action = input_rx.recv() => {
                    let Some(action) = action else {
                        log::warn!("input channel closed");
                        break Ok(());
                    };
                    match self.controller.process_action(action, &mut self.view_state) {
                        Ok(true) => {}
                        Ok(false) => break Ok(()),
                        Err(err) => break Err(err),
                    }
                }
                Some(event) = self.events_rx.recv() => {
                    if let Err(err) = self.controller.handle_event(event, &mut self.view_state) {
                        break Err(err);
                    }
                }
                _ = frames.tick() => {}
            }

            if let Err(err) = self.ui_renderer.render(&self.view_state) {
                break Err(err);
            }
        };

        shutdown.store(true, Ordering::SeqCst);
        let _ = tokio::task::spawn_blocking(move || input_handle.join()).await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationMap;
    use crate::config::{Preferences, ThemeMode};
    use crate::document::PagedDocument;
    use crate::error::SlideError;
    use crate::render::ui::MockUIRenderer;
    use async_trait::async_trait;
    use std::path::Path;

    struct OfflineBackend;

    #[async_trait]
    impl SlideBackend for OfflineBackend {
        async fn slide_texts(&self) -> Result<AnnotationMap> {
            Err(SlideError::other("offline"))
        }

        async fn document_bytes(&self, _name: &str) -> Result<Vec<u8>> {
            Err(SlideError::other("offline"))
        }

        async fn ask(&self, _question: &str, _current_slide: u32) -> Result<String> {
            Err(SlideError::other("offline"))
        }

        async fn process_pdf(&self) -> Result<()> {
            Err(SlideError::other("offline"))
        }

        async fn upload(&self, _path: &Path) -> Result<()> {
            Err(SlideError::other("offline"))
        }

        async fn progress(&self) -> Result<u8> {
            Err(SlideError::other("offline"))
        }
    }

    struct NoOpener;

    #[async_trait]
    impl DocumentOpener for NoOpener {
        async fn open(&self, _name: &str, _bytes: Vec<u8>) -> Result<Arc<dyn PagedDocument>> {
            Err(SlideError::document("unsupported"))
        }
    }

    fn application(config: ViewerConfig, preferences: PreferencesStore) -> Application {
        let mut renderer = MockUIRenderer::new();
        renderer.set_terminal_size(132, 40);
        Application::new(
            config,
            Arc::new(OfflineBackend),
            Arc::new(NoOpener),
            preferences,
            Box::new(renderer),
        )
        .unwrap()
    }

    #[test]
    fn view_state_starts_on_the_first_slide() {
        let app = application(ViewerConfig::default(), PreferencesStore::in_memory());
        let view = app.view_state();
        assert_eq!(view.page, 1);
        assert_eq!(view.document_name, "03-storage1");
        assert_eq!((view.viewport_width, view.viewport_height), (132, 40));
    }

    #[test]
    fn saved_theme_wins_over_configured_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::new(Some(dir.path().join("preferences.toml")));
        store
            .save(&Preferences {
                theme: Some(ThemeMode::Light),
            })
            .unwrap();

        let config = ViewerConfig {
            theme: ThemeMode::Dark,
            ..ViewerConfig::default()
        };
        let app = application(config, store);
        assert_eq!(app.view_state().theme, ThemeMode::Light);
    }

    #[test]
    fn configured_theme_applies_without_preferences() {
        let config = ViewerConfig {
            theme: ThemeMode::Light,
            ..ViewerConfig::default()
        };
        let app = application(config, PreferencesStore::in_memory());
        assert_eq!(app.view_state().theme, ThemeMode::Light);
    }
}
