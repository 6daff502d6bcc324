//! Device and window surface ownership.
//!
//! [`RenderContext`] is created once per accelerated activation and destroyed
//! when the viewer falls back or is disposed. The probe in [`crate::probe`]
//! shares [`new_instance`] and [`request_adapter`] so both paths pick the
//! same adapter.

use std::sync::Arc;

use winit::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// The adapter cannot present to this window in any format.
    #[error("surface has no supported formats")]
    NoSurfaceFormat,

    #[error("device is not usable: {0}")]
    Unusable(String),
}

/// Why a frame could not be acquired.
///
/// `Timeout` is transient and the frame is simply skipped. The other two
/// leave the surface unusable until it is rebuilt.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface lost")]
    Lost,
    #[error("out of memory")]
    OutOfMemory,
    #[error("timeout")]
    Timeout,
}

/// Adapter and presentation preferences taken from the config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuOptions {
    pub vsync: bool,
    /// Prefer a discrete adapter over an integrated one.
    pub high_performance: bool,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            vsync: true,
            high_performance: true,
        }
    }
}

impl GpuOptions {
    pub fn power_preference(&self) -> wgpu::PowerPreference {
        match self.high_performance {
            true => wgpu::PowerPreference::HighPerformance,
            false => wgpu::PowerPreference::LowPower,
        }
    }

    fn present_mode(&self, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        choose_present_mode(supported, self.vsync)
    }
}

/// An instance over every backend compiled in.
pub(crate) fn new_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Ask `instance` for an adapter, optionally one that can present to `surface`.
pub(crate) async fn request_adapter(
    instance: &wgpu::Instance,
    options: GpuOptions,
    surface: Option<&wgpu::Surface<'_>>,
) -> Result<wgpu::Adapter, RenderContextError> {
    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: options.power_preference(),
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .map_err(|_| RenderContextError::NoAdapter)
}

/// Device, queue and configured window surface.
pub struct RenderContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_format: wgpu::TextureFormat,
    config: wgpu::SurfaceConfiguration,
    // Held so the surface never outlives its instance or adapter.
    _adapter: wgpu::Adapter,
    _instance: wgpu::Instance,
}

impl RenderContext {
    /// Open a device that can present to `window` and configure the surface
    /// at `width` x `height` physical pixels.
    pub async fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        options: GpuOptions,
    ) -> Result<Self, RenderContextError> {
        let instance = new_instance();
        let surface = instance.create_surface(window)?;
        let adapter = request_adapter(&instance, options, Some(&surface)).await?;

        let info = adapter.get_info();
        log::info!(
            "Using adapter {} on {:?} ({:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("atlas-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let Some(surface_format) = choose_surface_format(&caps.formats) else {
            device.destroy();
            return Err(RenderContextError::NoSurfaceFormat);
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: options.present_mode(&caps.present_modes),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface,
            surface_format,
            config,
            _adapter: adapter,
            _instance: instance,
        })
    }

    /// Configured surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure for a new size. Zero extents become 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == self.size() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquire the next swapchain texture.
    ///
    /// A lost or outdated surface is reconfigured once before giving up.
    pub fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        let err = match self.surface.get_current_texture() {
            Ok(texture) => return Ok(texture),
            Err(err) => err,
        };
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::warn!("Surface {err:?}, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
            wgpu::SurfaceError::Timeout => Err(SurfaceError::Timeout),
            wgpu::SurfaceError::OutOfMemory => Err(SurfaceError::OutOfMemory),
            wgpu::SurfaceError::Other => {
                log::error!("Surface reported an unspecified error");
                Err(SurfaceError::Lost)
            }
        }
    }

    /// Destroy the device. Buffers and textures created from it become invalid.
    pub fn destroy(self) {
        self.device.destroy();
        log::debug!("Render context destroyed");
    }
}

/// Blocking wrapper around [`RenderContext::new`].
pub fn init_render_context_blocking(
    window: Arc<Window>,
    width: u32,
    height: u32,
    options: GpuOptions,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, width, height, options))
}

/// Headless device for GPU-backed tests. `None` when the machine has no adapter.
#[cfg(test)]
pub(crate) fn test_device() -> Option<wgpu::Device> {
    pollster::block_on(async {
        let adapter = request_adapter(&new_instance(), GpuOptions::default(), None)
            .await
            .ok()?;
        let (device, _queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()?;
        Some(device)
    })
}

/// sRGB BGRA, then sRGB RGBA, then any sRGB format, then whatever is listed first.
fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    const PREFERRED: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    PREFERRED
        .into_iter()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| formats.first().copied())
}

fn choose_present_mode(supported: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|m| supported.contains(m))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn test_surface_format_preference_order() {
        let cases: [(&[F], Option<F>); 5] = [
            (&[F::Rgba8Unorm, F::Bgra8UnormSrgb, F::Rgba8UnormSrgb], Some(F::Bgra8UnormSrgb)),
            (&[F::Rgba8Unorm, F::Rgba8UnormSrgb], Some(F::Rgba8UnormSrgb)),
            (&[F::Rgba16Float, F::Bgra8Unorm], Some(F::Rgba16Float)),
            (&[F::Bgra8Unorm, F::Rgba8Unorm], Some(F::Bgra8Unorm)),
            (&[], None),
        ];
        for (formats, expected) in cases {
            assert_eq!(choose_surface_format(formats), expected, "formats {formats:?}");
        }
    }

    #[test]
    fn test_present_mode_with_and_without_vsync() {
        use wgpu::PresentMode as P;
        let all = [P::Fifo, P::Immediate, P::Mailbox];
        assert_eq!(choose_present_mode(&all, true), P::Fifo);
        assert_eq!(choose_present_mode(&all, false), P::Mailbox);
        assert_eq!(choose_present_mode(&[P::Fifo, P::Immediate], false), P::Immediate);
        assert_eq!(
            choose_present_mode(&[P::Fifo], false),
            P::Fifo,
            "Fifo is always available"
        );
    }

    #[test]
    fn test_power_preference_follows_option() {
        let low = GpuOptions {
            high_performance: false,
            ..GpuOptions::default()
        };
        assert_eq!(
            GpuOptions::default().power_preference(),
            wgpu::PowerPreference::HighPerformance
        );
        assert_eq!(low.power_preference(), wgpu::PowerPreference::LowPower);
    }

    #[test]
    fn test_headless_adapter_request() {
        let instance = new_instance();
        match pollster::block_on(request_adapter(&instance, GpuOptions::default(), None)) {
            Ok(adapter) => assert!(adapter.limits().max_texture_dimension_2d > 0),
            Err(err) => eprintln!("Skipping: {err}"),
        }
    }
}
