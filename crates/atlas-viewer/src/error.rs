use thiserror::Error;

/// Failures inside the viewer. None of them escape [`crate::Viewer`]; each
/// one either redirects activation to the fallback or is logged and skipped.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("accelerated rendering is unavailable")]
    CapabilityUnavailable,

    #[error("failed to load rendering library: {0}")]
    LibraryLoadFailure(String),

    #[error("scene assembly failed: {0}")]
    AssemblyFailure(String),

    #[error("required resource missing: {0}")]
    ResourceMissing(&'static str),

    #[error("frame failed: {0}")]
    FrameFailure(String),
}
