//! Embedded core traits and associated types
//!
//! The emulation core owns CPU/GPU emulation, shader compilation and its
//! virtual filesystem. The bridge reaches it only through [`EmulationCore`]
//! (lifecycle and renderer creation) and [`Renderer`] (per-frame work on the
//! render thread).

use std::path::PathBuf;

use anyhow::Result;

use emubridge_shared::{AspectRatio, DeviceOptions, GraphicsBackend, GraphicsConfiguration};

use crate::graphics::{FrameGeometry, NativeCapabilities};
use crate::input::InputSnapshot;

/// Lifecycle surface of the embedded emulation core.
///
/// Called from the host thread. Implementations are installed once per
/// process (see [`crate::ffi::register_core`]) or handed to
/// [`crate::HostBridge::new`] directly.
pub trait EmulationCore: Send + 'static {
    /// Create the native renderer for `backend`.
    ///
    /// `capabilities` borrows the host's interop table for the duration of
    /// this call only. Everything the renderer needs from it (surfaces,
    /// resolved procedures) must be created before returning.
    fn create_renderer(
        &mut self,
        capabilities: &NativeCapabilities<'_>,
        config: &GraphicsConfiguration,
    ) -> Result<Box<dyn Renderer>>;

    /// Create the emulated device context.
    fn initialize_device(&mut self, options: &DeviceOptions, context: &DeviceContext) -> Result<()>;

    /// Drop the device context after a failed load.
    fn dispose_device(&mut self);

    /// Rescan installed content after the host changed files on disk.
    fn reload_filesystem(&mut self) -> Result<()>;

    /// Load an application image.
    fn load_application(&mut self, application: &Application) -> Result<()>;

    /// Install system firmware from an archive.
    fn install_firmware(&mut self, source: &FirmwareSource, is_xci: bool) -> Result<()>;

    /// Installed firmware version string, if any firmware is installed.
    fn installed_firmware_version(&self) -> Option<String>;
}

/// Renderer-derived settings the device context is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceContext {
    pub backend: GraphicsBackend,
    /// Whether backend work runs on a dedicated thread
    pub threaded_backend: bool,
    pub aspect_ratio: AspectRatio,
}

/// Application image classified from a host path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Application {
    /// Extracted cart directory, with its RomFS image when one was found
    Cart {
        path: PathBuf,
        romfs: Option<PathBuf>,
    },
    Xci(PathBuf),
    Nca(PathBuf),
    /// NSP or PFS0 package
    Nsp(PathBuf),
    /// Anything else (NRO, NSO, ELF): handed to the core as homebrew
    Homebrew(PathBuf),
}

/// Where a firmware archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareSource {
    Path(PathBuf),
    /// Open file descriptor owned by the host (sandboxed platforms)
    Descriptor(i32),
}

/// Native renderer created by the core.
///
/// Owned by the render thread while the run loop is active. Geometry and
/// vsync changes are delivered between frames, never mid-submission.
pub trait Renderer: Send {
    /// Backend this renderer was created for
    fn backend(&self) -> GraphicsBackend;

    /// Whether the renderer benefits from a threaded backend
    fn prefers_threading(&self) -> bool {
        false
    }

    /// Hardware anisotropy ceiling
    fn max_anisotropy(&self) -> f32 {
        emubridge_shared::MAX_ANISOTROPY
    }

    /// Surface size changed
    fn resize(&mut self, width: u32, height: u32);

    /// Present mode changed
    fn set_vsync(&mut self, enabled: bool);

    /// Run the core for one frame using the given inputs.
    fn submit_frame(&mut self, frame: &FrameSubmission<'_>) -> Result<FrameStatus, RenderError>;

    /// Present the frame produced by the last successful submission.
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Everything the core needs for one render tick.
#[derive(Debug)]
pub struct FrameSubmission<'a> {
    /// Monotonic frame counter, starting at 0 for each run loop
    pub frame_index: u64,
    pub config: &'a GraphicsConfiguration,
    pub geometry: &'a FrameGeometry,
    pub input: &'a InputSnapshot,
}

/// Outcome of a frame submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A new image is ready to present
    Presentable,
    /// The core had no new image this tick
    Idle,
}

/// Backend failure during a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Frame-local hiccup; the loop logs it and carries on with the next frame
    #[error("recoverable: {0}")]
    Recoverable(String),

    /// The device or surface is gone; the loop exits
    #[error("device lost: {0}")]
    DeviceLost(String),
}
