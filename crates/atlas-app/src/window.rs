//! Window creation and event handling via winit.
//!
//! [`ViewerApp`] implements winit's [`ApplicationHandler`] and translates
//! window events into viewer calls: redraws drive frames, occlusion drives
//! visibility, resizes are debounced, and closing disposes the viewer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use atlas_config::{ActivationMode, Config};
use atlas_viewer::{GpuProbe, LifecycleState, ResizeDebouncer, Viewer, ViewerOptions};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::host::{WindowHost, gpu_options};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Whether the viewer area counts as on-screen. A desktop window is either
/// fully shown or not at all, so the visible fraction is 0 or 1.
pub fn meets_visibility_threshold(occluded: bool, width: u32, height: u32, threshold: f32) -> bool {
    let fraction = if occluded || width == 0 || height == 0 {
        0.0
    } else {
        1.0
    };
    fraction > 0.0 && fraction >= threshold
}

/// The config directory and the file contents the app started from, so
/// edits made while running can be picked up.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub dir: PathBuf,
    pub on_disk: Config,
}

impl ConfigSource {
    /// Re-read the file and copy its live settings into `running`.
    /// Returns `true` when anything changed on disk.
    pub fn refresh(&mut self, running: &mut Config) -> bool {
        match self.on_disk.reload(&self.dir) {
            Ok(Some(fresh)) => {
                running.apply_live_settings(&fresh);
                self.on_disk = fresh;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Keeping current settings: {e}");
                false
            }
        }
    }
}

pub struct ViewerApp {
    config: Config,
    source: Option<ConfigSource>,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer<WindowHost, GpuProbe>>,
    resize: ResizeDebouncer,
    occluded: bool,
    visible: bool,
    cursor: (f64, f64),
}

impl ViewerApp {
    pub fn with_config(config: Config) -> Self {
        let delay = Duration::from_millis(config.viewer.resize_debounce_ms);
        Self {
            config,
            source: None,
            window: None,
            viewer: None,
            resize: ResizeDebouncer::new(delay),
            occluded: false,
            visible: false,
            cursor: (0.0, 0.0),
        }
    }

    /// Reload `config.ron` from `source` whenever the window regains focus.
    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.source = Some(source);
        self
    }

    fn reload_config(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        if !source.refresh(&mut self.config) {
            return;
        }
        self.resize
            .set_delay(Duration::from_millis(self.config.viewer.resize_debounce_ms));
        info!(
            "Applied reloaded settings (threshold {}, debounce {} ms)",
            self.config.viewer.visibility_threshold, self.config.viewer.resize_debounce_ms
        );
        self.refresh_visibility();
    }

    /// Recompute visibility from occlusion and size; notify the viewer on change.
    fn refresh_visibility(&mut self) {
        let (Some(window), Some(viewer)) = (self.window.as_ref(), self.viewer.as_mut()) else {
            return;
        };
        let size = window.inner_size();
        let visible = meets_visibility_threshold(
            self.occluded,
            size.width,
            size.height,
            self.config.viewer.visibility_threshold,
        );
        viewer.host_mut().set_visible(visible);
        if visible != self.visible {
            self.visible = visible;
            info!("Viewer visibility changed: {visible}");
            viewer.on_visibility_change(visible);
            // Coming back on-screen draws at the final size straight away.
            if visible && let Some(viewport) = self.resize.flush() {
                viewer.handle_resize(viewport);
            }
        }
    }

    fn queue_resize(&mut self) {
        let Some(viewer) = self.viewer.as_ref() else {
            return;
        };
        let viewport = viewer.host().viewport();
        if !viewport.is_empty() {
            self.resize.notify(viewport, Instant::now());
        }
        self.refresh_visibility();
    }

    fn shutdown(&mut self) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.dispose();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let host = WindowHost::new(window.clone(), &self.config);
        let probe = GpuProbe::new(gpu_options(&self.config));
        let mut viewer = Viewer::new(host, probe, ViewerOptions::from_config(&self.config));
        if self.config.viewer.activation == ActivationMode::Immediate {
            viewer.activate();
        }

        self.viewer = Some(viewer);
        self.window = Some(window.clone());
        self.refresh_visibility();
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.queue_resize();
            }
            WindowEvent::Focused(true) => self.reload_config(),
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                self.refresh_visibility();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.pointer_move(position.x, position.y);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(viewer) = self.viewer.as_mut() {
                    match state {
                        ElementState::Pressed => viewer.pointer_down(self.cursor.0, self.cursor.1),
                        ElementState::Released => viewer.pointer_up(),
                    }
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.pointer_up();
                }
            }
            WindowEvent::Touch(touch) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    let (x, y) = (touch.location.x, touch.location.y);
                    match touch.phase {
                        TouchPhase::Started => viewer.pointer_down(x, y),
                        TouchPhase::Moved => viewer.pointer_move(x, y),
                        TouchPhase::Ended | TouchPhase::Cancelled => viewer.pointer_up(),
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(viewer) = self.viewer.as_mut() {
                    if viewer.state() == LifecycleState::Uninitialized && self.visible {
                        viewer.on_visibility_change(true);
                    }
                    viewer.on_frame();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(viewport) = self.resize.poll(Instant::now())
            && let Some(viewer) = self.viewer.as_mut()
        {
            viewer.handle_resize(viewport);
        }
        match self.resize.deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Creates an event loop and runs the viewer with the given config. With a
/// `source`, live settings follow edits to `config.ron`.
///
/// This function blocks until the window is closed.
#[instrument(skip_all)]
pub fn run_with_config(config: Config, source: Option<ConfigSource>) {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = ViewerApp::with_config(config);
    if let Some(source) = source {
        app = app.with_source(source);
    }
    event_loop.run_app(&mut app).expect("Event loop failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.title = "Probe".to_string();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Probe");
    }

    #[test]
    fn test_visibility_threshold() {
        assert!(meets_visibility_threshold(false, 800, 600, 0.1));
        assert!(!meets_visibility_threshold(true, 800, 600, 0.1), "occluded");
        assert!(!meets_visibility_threshold(false, 0, 600, 0.1), "minimized");
        assert!(!meets_visibility_threshold(false, 800, 600, 1.5), "unreachable threshold");
    }

    #[test]
    fn test_app_starts_without_window() {
        let app = ViewerApp::with_config(Config::default());
        assert!(app.window.is_none());
        assert!(app.viewer.is_none());
        assert_eq!(app.resize.delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_focus_reload_updates_debounce() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = Config::default();
        on_disk.save(dir.path()).unwrap();
        let mut running = on_disk.clone();
        running.viewer.force_fallback = true;

        let mut app = ViewerApp::with_config(running).with_source(ConfigSource {
            dir: dir.path().to_path_buf(),
            on_disk,
        });
        app.reload_config();
        assert_eq!(app.resize.delay(), Duration::from_millis(250), "unchanged file");

        let mut edited = Config::default();
        edited.viewer.resize_debounce_ms = 40;
        edited.save(dir.path()).unwrap();
        app.reload_config();
        assert_eq!(app.resize.delay(), Duration::from_millis(40));
        assert!(app.config.viewer.force_fallback);
    }

    #[test]
    fn test_invalid_reload_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = Config::default();
        let mut source = ConfigSource {
            dir: dir.path().to_path_buf(),
            on_disk: on_disk.clone(),
        };
        let mut bad = Config::default();
        bad.viewer.visibility_threshold = 3.0;
        bad.save(dir.path()).unwrap();

        let mut running = on_disk;
        assert!(!source.refresh(&mut running));
        assert_eq!(running.viewer.visibility_threshold, 0.1);
    }
}
