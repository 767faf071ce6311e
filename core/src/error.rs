//! Error taxonomy for the host bridge

use std::path::PathBuf;

use emubridge_shared::{GraphicsBackend, UnknownValue};

use crate::graphics::BridgePhase;

/// Errors reported by bridge operations.
///
/// The C ABI flattens these into boolean or sentinel returns after logging
/// them; Rust hosts get the full value.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A configuration field is out of range or unknown
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A native procedure required by the chosen backend was not supplied
    #[error("{backend} backend requires interop field `{field}`")]
    InteropMissing {
        backend: GraphicsBackend,
        field: &'static str,
    },

    /// The core rejected context or surface creation
    #[error("native context creation failed: {0}")]
    ContextCreation(String),

    /// Call issued out of the required order
    #[error("{operation} is not valid while {state}")]
    StateSequence {
        operation: &'static str,
        state: SequenceState,
    },

    /// Input event for a controller slot that is not connected
    #[error("no controller connected at index {0}")]
    InputTargetUnresolved(usize),

    /// The backend was lost mid-session; the host must fully reinitialize
    #[error("graphics backend lost: {0}")]
    BackendLost(String),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// State an out-of-order call was rejected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Graphics(BridgePhase),
    InputUninitialized,
    InputInitialized,
}

impl From<BridgePhase> for SequenceState {
    fn from(phase: BridgePhase) -> Self {
        Self::Graphics(phase)
    }
}

impl std::fmt::Display for SequenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graphics(phase) => write!(f, "graphics is {phase}"),
            Self::InputUninitialized => f.write_str("input is not initialized"),
            Self::InputInitialized => f.write_str("input is already initialized"),
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Resolution scale must be finite and greater than zero
    #[error("resolution scale {0} must be finite and greater than 0")]
    ResolutionScale(f32),

    /// Anisotropy must be -1 (auto) or within 1..=16
    #[error("max anisotropy {0} must be -1 (auto) or within 1..=16")]
    Anisotropy(f32),

    /// Enumerated field outside its contract table
    #[error(transparent)]
    UnknownValue(#[from] UnknownValue),

    /// Surface or client area with a zero or negative dimension
    #[error("size {width}x{height} must be positive in both dimensions")]
    Size { width: i64, height: i64 },

    /// Controller slot count outside 1..=MAX_CONTROLLERS
    #[error("max_controllers {0} must be within 1..={max}", max = emubridge_shared::MAX_CONTROLLERS)]
    ControllerCount(usize),
}

/// Device lifecycle failures.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Process bootstrap through `initialize` failed
    #[error("bridge bootstrap: {0}")]
    Bootstrap(&'static str),

    /// The device context needs an initialized renderer
    #[error("device requires an initialized renderer")]
    RendererNotReady,

    /// Operation needs a device context that does not exist
    #[error("device context is not initialized")]
    NotInitialized,

    /// Path does not name a loadable application
    #[error("couldn't load '{0}': specify a valid XCI/NCA/NSP/PFS0/NRO file or cart directory")]
    UnsupportedApplication(PathBuf),

    /// The embedded core reported a failure
    #[error("core: {0:#}")]
    Core(#[from] anyhow::Error),
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
