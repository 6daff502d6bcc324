//! Off-screen check for whether accelerated rendering works on this machine.
//!
//! The probe builds a throwaway instance, adapter and device without any
//! window, reads back identifying information, and tears everything down.
//! Every failure, including a panic inside a backend, reads as
//! [`Capability::Unavailable`].

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::gpu::{GpuOptions, RenderContextError, new_instance, request_adapter};

/// Result of a capability probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Accelerated,
    Unavailable,
}

impl Capability {
    pub fn is_accelerated(self) -> bool {
        matches!(self, Capability::Accelerated)
    }
}

/// What the probe learned about the adapter it opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterSummary {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

/// Open a headless adapter and device and describe them.
pub async fn probe_adapter(options: GpuOptions) -> Result<AdapterSummary, RenderContextError> {
    let instance = new_instance();
    let adapter = request_adapter(&instance, options, None).await?;

    let (device, _queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("atlas-probe-device"),
            ..Default::default()
        })
        .await?;

    // A device that cannot hold even a small render target is not functional
    let max_texture_dimension = device.limits().max_texture_dimension_2d;
    device.destroy();
    if max_texture_dimension == 0 {
        return Err(RenderContextError::Unusable(
            "max_texture_dimension_2d is zero".to_string(),
        ));
    }

    let info = adapter.get_info();
    Ok(AdapterSummary {
        name: info.name,
        backend: info.backend,
        device_type: info.device_type,
        max_texture_dimension,
    })
}

/// Probe with default options. Never panics.
pub fn probe() -> Capability {
    probe_with(GpuOptions::default())
}

/// Probe with explicit adapter preferences. Never panics.
pub fn probe_with(options: GpuOptions) -> Capability {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pollster::block_on(probe_adapter(options))
    }));

    match outcome {
        Ok(Ok(summary)) => {
            log::info!(
                "Accelerated rendering available: {} ({:?}, {:?})",
                summary.name,
                summary.backend,
                summary.device_type
            );
            Capability::Accelerated
        }
        Ok(Err(e)) => {
            log::warn!("Accelerated rendering unavailable: {e}");
            Capability::Unavailable
        }
        Err(_) => {
            log::warn!("Accelerated rendering unavailable: backend panicked during probe");
            Capability::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_never_panics() {
        // Headless CI has no adapter; either answer is fine as long as we get one
        let capability = probe();
        assert!(matches!(
            capability,
            Capability::Accelerated | Capability::Unavailable
        ));
    }

    #[test]
    fn test_probe_agrees_with_adapter_query() {
        let direct = pollster::block_on(probe_adapter(GpuOptions::default()));
        let capability = probe();
        assert_eq!(
            capability.is_accelerated(),
            direct.is_ok(),
            "probe() should report exactly what the adapter query found"
        );
    }

    #[test]
    fn test_is_accelerated() {
        assert!(Capability::Accelerated.is_accelerated());
        assert!(!Capability::Unavailable.is_accelerated());
    }
}
