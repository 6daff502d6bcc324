use atlas_render::{Capability, GpuOptions, probe_with};

/// Decides whether accelerated rendering is usable.
pub trait CapabilityProbe {
    fn probe(&mut self) -> Capability;
}

impl<F> CapabilityProbe for F
where
    F: FnMut() -> Capability,
{
    fn probe(&mut self) -> Capability {
        self()
    }
}

/// Probes the real GPU through a headless wgpu device.
#[derive(Clone, Copy, Debug, Default)]
pub struct GpuProbe {
    pub options: GpuOptions,
}

impl GpuProbe {
    pub fn new(options: GpuOptions) -> Self {
        Self { options }
    }
}

impl CapabilityProbe for GpuProbe {
    fn probe(&mut self) -> Capability {
        probe_with(self.options)
    }
}
