//! Lifecycle state machine tying probe, renderers, frames and input together.

use atlas_canvas::FallbackStyle;
use atlas_config::{ActivationMode, Config, Theme};
use atlas_mesh::{CapsuleParams, ProceduralMeshBuilder};
use atlas_render::{Capability, SceneGraph};
use atlas_space::{STAR_COUNT, StarField};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument, warn};

use crate::error::ViewerError;
use crate::host::Host;
use crate::interaction::InteractionController;
use crate::probe::CapabilityProbe;
use crate::renderer::{AcceleratedRenderer, ActiveRenderer, FallbackView, Renderer};
use crate::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    ProbingCapability,
    AcceleratedActive,
    FallbackActive,
    Paused,
    /// Terminal.
    Disposed,
}

/// Construction-time settings for a [`Viewer`].
#[derive(Clone, Debug)]
pub struct ViewerOptions {
    /// Skip the probe and go straight to the fallback.
    pub force_fallback: bool,
    /// Wait for the first visibility notification before activating.
    pub activate_on_visible: bool,
    /// Seed for mesh perturbation and stars. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub capsule: CapsuleParams,
    pub fallback_style: FallbackStyle,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            force_fallback: false,
            activate_on_visible: true,
            seed: None,
            capsule: CapsuleParams::default(),
            fallback_style: FallbackStyle::default(),
        }
    }
}

impl ViewerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            force_fallback: config.viewer.force_fallback,
            activate_on_visible: config.viewer.activation == ActivationMode::OnVisible,
            seed: config.viewer.seed,
            capsule: CapsuleParams::default(),
            fallback_style: FallbackStyle::new(
                config.theme.theme == Theme::Dark,
                config.theme.background_rgb(),
            ),
        }
    }
}

type Active<H> = ActiveRenderer<<H as Host>::Surface, <H as Host>::Presenter>;

/// One viewer instance with its host and probe injected.
pub struct Viewer<H: Host, P: CapabilityProbe> {
    host: H,
    probe: P,
    options: ViewerOptions,
    state: LifecycleState,
    renderer: Option<Active<H>>,
    interaction: InteractionController,
    // An activate() call found no container and is waiting for one.
    activation_deferred: bool,
}

impl<H: Host, P: CapabilityProbe> Viewer<H, P> {
    pub fn new(host: H, probe: P, options: ViewerOptions) -> Self {
        Self {
            host,
            probe,
            options,
            state: LifecycleState::Uninitialized,
            renderer: None,
            interaction: InteractionController::new(),
            activation_deferred: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn renderer(&self) -> Option<&Active<H>> {
        self.renderer.as_ref()
    }

    /// The accelerated scene, if that is the live renderer.
    pub fn scene(&self) -> Option<&SceneGraph> {
        match self.renderer.as_ref()? {
            ActiveRenderer::Accelerated(r) => Some(r.scene()),
            ActiveRenderer::Fallback(_) => None,
        }
    }

    /// Probe, then build the accelerated scene or the fallback, then start.
    ///
    /// Runs once; later calls do nothing. With no container the viewer stays
    /// uninitialized and retries on the next visible notification.
    #[instrument(skip_all)]
    pub fn activate(&mut self) {
        if self.state != LifecycleState::Uninitialized {
            debug!("activate ignored in state {:?}", self.state);
            return;
        }
        let Some(viewport) = self.host.container_size() else {
            warn!("{}", ViewerError::ResourceMissing("container"));
            self.activation_deferred = true;
            return;
        };
        self.activation_deferred = false;

        self.state = LifecycleState::ProbingCapability;
        let capability = if self.options.force_fallback {
            info!("Fallback forced by configuration");
            Capability::Unavailable
        } else {
            self.probe.probe()
        };

        let renderer = match capability {
            Capability::Accelerated => match self.build_accelerated(viewport) {
                Ok(renderer) => {
                    info!("Viewer activated with accelerated rendering");
                    ActiveRenderer::Accelerated(renderer)
                }
                Err(e) => {
                    warn!("{e}, switching to 2D fallback");
                    self.build_fallback(viewport)
                }
            },
            Capability::Unavailable => {
                info!("{}, activating 2D fallback", ViewerError::CapabilityUnavailable);
                self.build_fallback(viewport)
            }
        };

        self.state = if renderer.is_accelerated() {
            LifecycleState::AcceleratedActive
        } else {
            LifecycleState::FallbackActive
        };
        self.renderer = Some(renderer);
        self.start();
    }

    fn build_accelerated(
        &mut self,
        viewport: Viewport,
    ) -> Result<AcceleratedRenderer<H::Surface>, ViewerError> {
        self.host
            .load_rendering_library()
            .map_err(ViewerError::LibraryLoadFailure)?;

        let mut rng = match self.options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        let object = ProceduralMeshBuilder::new(self.options.capsule.clone()).build(&mut rng);
        let stars = StarField::generate(&mut rng, STAR_COUNT);

        let (width, height) = viewport.physical_size();
        let scene = SceneGraph::assemble(width, height, object, stars);
        let surface = self.host.create_scene_surface(&scene, viewport)?;
        Ok(AcceleratedRenderer::new(scene, surface))
    }

    fn build_fallback(&mut self, viewport: Viewport) -> Active<H> {
        let presenter = self.host.create_fallback_canvas(viewport);
        if presenter.is_none() {
            warn!("{}", ViewerError::ResourceMissing("2d canvas"));
        }
        ActiveRenderer::Fallback(FallbackView::new(
            self.options.fallback_style,
            viewport,
            presenter,
        ))
    }

    /// Start or resume the frame loop. No-op before activation, while
    /// running, and after disposal.
    pub fn start(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if renderer.start() {
            self.host.request_frame();
        }
        if self.state == LifecycleState::Paused {
            self.state = if renderer.is_accelerated() {
                LifecycleState::AcceleratedActive
            } else {
                LifecycleState::FallbackActive
            };
        }
    }

    /// Cancel the pending frame. Idempotent.
    pub fn pause(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.pause();
        }
        if matches!(
            self.state,
            LifecycleState::AcceleratedActive | LifecycleState::FallbackActive
        ) {
            self.state = LifecycleState::Paused;
            debug!("Animation paused");
        }
    }

    /// Host frame callback. Reschedules before doing any work; hidden pages
    /// skip the accelerated work for this frame.
    pub fn on_frame(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if renderer.frame_loop().begin_frame().is_none() {
            return;
        }
        self.host.request_frame();
        if renderer.gated_by_visibility() && !self.host.is_page_visible() {
            return;
        }
        renderer.draw();
    }

    /// Visibility of the viewer area changed. Visible activates lazily, or
    /// retries an activation that had no container, then starts; hidden
    /// pauses.
    pub fn on_visibility_change(&mut self, visible: bool) {
        if visible {
            if self.state == LifecycleState::Uninitialized
                && (self.options.activate_on_visible || self.activation_deferred)
            {
                self.activate();
            }
            self.start();
        } else {
            self.pause();
        }
    }

    /// Apply a new container size. No-op before activation.
    #[instrument(skip_all, fields(width = viewport.width, height = viewport.height))]
    pub fn handle_resize(&mut self, viewport: Viewport) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.resize(viewport);
        info!(
            "Viewer resized to {}x{} (ratio {:.2})",
            viewport.width, viewport.height, viewport.pixel_ratio
        );
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if matches!(self.renderer, Some(ActiveRenderer::Accelerated(_))) {
            self.interaction.pointer_down(x, y);
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let target = match self.renderer.as_mut() {
            Some(ActiveRenderer::Accelerated(r)) => Some(r.orientation_mut()),
            _ => None,
        };
        self.interaction.pointer_move(x, y, target);
    }

    pub fn pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    /// Stop frames and release every resource. Safe before activation and
    /// on repeated calls.
    #[instrument(skip_all)]
    pub fn dispose(&mut self) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        self.pause();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        self.interaction.pointer_up();
        self.state = LifecycleState::Disposed;
        info!("Viewer disposed");
    }
}

impl<H: Host, P: CapabilityProbe> Drop for Viewer<H, P> {
    fn drop(&mut self) {
        self.dispose();
    }
}
