//! Graphics backend bridge
//!
//! Brings a native graphics context up in stages and drives the per-frame
//! render/present cycle:
//!
//! ```text
//! Uninitialized -> GraphicsConfigured -> RendererInitialized -> Running -> Stopped
//! ```
//!
//! Each call checks the phase it needs, so render or resize calls before a
//! context exists, and reconfiguration of a live context, are rejected
//! instead of reaching the core.

mod capabilities;
mod stats;
mod surface;


use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use emubridge_shared::{
    ANISOTROPY_AUTO, GraphicsBackend, GraphicsConfiguration, MAX_ANISOTROPY, MIN_ANISOTROPY,
    NativeGraphicsInterop,
};

use crate::emulation::{EmulationCore, FrameStatus, FrameSubmission, RenderError, Renderer};
use crate::error::{BridgeError, ConfigurationError, Result};
use crate::input::InputRouter;

pub use capabilities::{GlCapabilities, NativeCapabilities, VulkanCapabilities};
pub use stats::RenderStats;
pub use surface::{FrameGeometry, SwapCallback};

use surface::SurfaceState;

/// Graphics state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Uninitialized,
    GraphicsConfigured,
    RendererInitialized,
    Running,
    Stopped,
}

impl std::fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::GraphicsConfigured => "configured",
            Self::RendererInitialized => "renderer-initialized",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// What the renderer negotiated at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererInfo {
    pub backend: GraphicsBackend,
    /// Backend threading after resolving `Auto` against the renderer
    pub threaded_backend: bool,
    /// Anisotropy ceiling reported by the renderer
    pub max_anisotropy: f32,
}

/// Why the run loop returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLoopExit {
    /// The host requested a stop
    Stopped,
}

#[derive(Default)]
struct GraphicsState {
    phase: Option<BridgePhase>,
    /// Configuration as accepted from the host
    requested: Option<GraphicsConfiguration>,
    /// Configuration after backend ceilings were applied
    effective: Option<GraphicsConfiguration>,
    renderer: Option<Box<dyn Renderer>>,
    info: Option<RendererInfo>,
}

impl GraphicsState {
    fn phase(&self) -> BridgePhase {
        self.phase.unwrap_or(BridgePhase::Uninitialized)
    }

    fn require(&self, operation: &'static str, allowed: &[BridgePhase]) -> Result<()> {
        let phase = self.phase();
        if allowed.contains(&phase) {
            Ok(())
        } else {
            tracing::warn!("{} rejected: graphics is {}", operation, phase);
            Err(BridgeError::StateSequence {
                operation,
                state: phase.into(),
            })
        }
    }
}

/// Validate numeric ranges of a host configuration.
///
/// Values outside the contract are rejected; nothing is clamped here.
pub fn validate_configuration(config: &GraphicsConfiguration) -> Result<(), ConfigurationError> {
    if !config.res_scale.is_finite() || config.res_scale <= 0.0 {
        return Err(ConfigurationError::ResolutionScale(config.res_scale));
    }

    let anisotropy = config.max_anisotropy;
    let in_range = (MIN_ANISOTROPY..=MAX_ANISOTROPY).contains(&anisotropy);
    if anisotropy != ANISOTROPY_AUTO && !in_range {
        return Err(ConfigurationError::Anisotropy(anisotropy));
    }

    Ok(())
}

/// Staged native graphics bring-up and the blocking render loop.
///
/// All methods take `&self`: configuration calls come from the host thread
/// while [`run_loop`](Self::run_loop) blocks the render thread.
pub struct GraphicsBridge {
    state: Mutex<GraphicsState>,
    surface: Mutex<SurfaceState>,
    stop_requested: AtomicBool,
    stats: Mutex<RenderStats>,
}

impl Default for GraphicsBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBridge {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GraphicsState::default()),
            surface: Mutex::new(SurfaceState::default()),
            stop_requested: AtomicBool::new(false),
            stats: Mutex::new(RenderStats::default()),
        }
    }

    /// Current phase
    pub fn phase(&self) -> BridgePhase {
        self.state.lock().phase()
    }

    /// Accept the session configuration.
    ///
    /// `Uninitialized -> GraphicsConfigured`. Calling it again without
    /// [`teardown`](Self::teardown) is a sequence error.
    pub fn initialize(&self, config: GraphicsConfiguration) -> Result<()> {
        let mut state = self.state.lock();
        state.require("graphics_initialize", &[BridgePhase::Uninitialized])?;

        if let Err(e) = validate_configuration(&config) {
            tracing::warn!("Rejected graphics configuration: {}", e);
            return Err(e.into());
        }

        state.requested = Some(config);
        state.phase = Some(BridgePhase::GraphicsConfigured);
        tracing::info!(
            "Graphics configured (scale {}x, anisotropy {}, {:?}, {:?})",
            config.res_scale,
            config.max_anisotropy,
            config.backend_threading,
            config.aspect_ratio
        );
        Ok(())
    }

    /// Configuration as accepted by [`initialize`](Self::initialize)
    pub fn configuration(&self) -> Option<GraphicsConfiguration> {
        self.state.lock().requested
    }

    /// Configuration the core renders with, after backend ceilings
    pub fn effective_configuration(&self) -> Option<GraphicsConfiguration> {
        let state = self.state.lock();
        state.effective.or(state.requested)
    }

    /// Negotiated renderer details, once a renderer exists
    pub fn renderer_info(&self) -> Option<RendererInfo> {
        self.state.lock().info
    }

    /// Validate the host interop table for `backend` and create the renderer.
    ///
    /// Nothing in `interop` is retained once this returns.
    ///
    /// # Safety
    ///
    /// Same contract as [`NativeCapabilities::from_interop`].
    pub unsafe fn initialize_renderer(
        &self,
        core: &mut dyn EmulationCore,
        backend: GraphicsBackend,
        interop: &NativeGraphicsInterop,
    ) -> Result<RendererInfo> {
        self.state
            .lock()
            .require("graphics_initialize_renderer", &[BridgePhase::GraphicsConfigured])?;

        // SAFETY: forwarded from this function's contract.
        let capabilities = match unsafe { NativeCapabilities::from_interop(backend, interop) } {
            Ok(capabilities) => capabilities,
            Err(e) => {
                tracing::warn!("Renderer initialization failed: {}", e);
                return Err(e);
            }
        };
        self.initialize_renderer_with(core, &capabilities)
    }

    /// Create the renderer from already-validated capabilities.
    ///
    /// `GraphicsConfigured -> RendererInitialized`. On failure the phase is
    /// left at `GraphicsConfigured`.
    pub fn initialize_renderer_with(
        &self,
        core: &mut dyn EmulationCore,
        capabilities: &NativeCapabilities<'_>,
    ) -> Result<RendererInfo> {
        let mut state = self.state.lock();
        state.require("graphics_initialize_renderer", &[BridgePhase::GraphicsConfigured])?;

        let Some(requested) = state.requested else {
            return Err(BridgeError::StateSequence {
                operation: "graphics_initialize_renderer",
                state: state.phase().into(),
            });
        };

        let backend = capabilities.backend();
        let renderer = core.create_renderer(capabilities, &requested).map_err(|e| {
            tracing::error!("{} context creation failed: {:#}", backend, e);
            BridgeError::ContextCreation(format!("{e:#}"))
        })?;

        let mut effective = requested;
        let ceiling = renderer.max_anisotropy();
        if effective.max_anisotropy > ceiling {
            tracing::info!(
                "Clamping anisotropy {} to the {} ceiling {}",
                effective.max_anisotropy,
                backend,
                ceiling
            );
            effective.max_anisotropy = ceiling;
        }

        let info = RendererInfo {
            backend,
            threaded_backend: requested
                .backend_threading
                .resolve(renderer.prefers_threading()),
            max_anisotropy: ceiling,
        };

        state.renderer = Some(renderer);
        state.effective = Some(effective);
        state.info = Some(info);
        state.phase = Some(BridgePhase::RendererInitialized);

        self.surface.lock().invalidate();
        self.stop_requested.store(false, Ordering::Release);

        tracing::info!(
            "{} renderer initialized (threaded backend: {})",
            backend,
            info.threaded_backend
        );
        Ok(info)
    }

    /// Stage a new surface size for the next frame.
    ///
    /// Valid once the renderer exists; identical sizes are a no-op.
    pub fn set_size(&self, width: i32, height: i32) -> Result<()> {
        self.state.lock().require(
            "graphics_renderer_set_size",
            &[BridgePhase::RendererInitialized, BridgePhase::Running],
        )?;

        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(size_error(width, height));
        };
        if w == 0 || h == 0 {
            return Err(size_error(width, height));
        }

        if self.surface.lock().set_size(w, h) {
            tracing::debug!("Surface resized to {}x{}", w, h);
        }
        Ok(())
    }

    /// Stage a present-mode change. Never blocks on the render thread.
    pub fn set_vsync(&self, enabled: bool) {
        self.surface.lock().set_vsync(enabled);
        tracing::debug!("VSync {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Install (or clear) the host's swap-buffers callback.
    pub fn set_swap_buffer_callback(&self, callback: Option<SwapCallback>) {
        self.surface.lock().set_swap_callback(callback);
    }

    /// Geometry staged for the next frame
    pub fn geometry(&self) -> FrameGeometry {
        self.surface.lock().staged()
    }

    /// Statistics for the current or last run loop
    pub fn stats(&self) -> RenderStats {
        *self.stats.lock()
    }

    /// Ask the run loop to exit after the frame in flight.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        tracing::debug!("Render loop stop requested");
    }

    /// Drop the renderer, configuration and staged geometry, back to
    /// `Uninitialized`. The swap callback stays installed.
    ///
    /// Not allowed while the loop is running; stop it first.
    pub fn teardown(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.phase() == BridgePhase::Running {
            return state.require("graphics_teardown", &[]);
        }

        *state = GraphicsState::default();
        self.surface.lock().reset();
        self.stop_requested.store(false, Ordering::Release);
        tracing::info!("Graphics torn down");
        Ok(())
    }

    /// Block the calling thread running frames until stopped.
    ///
    /// `RendererInitialized -> Running`, then `Stopped` on exit. The stop
    /// flag is checked between frames only, so a frame is never abandoned
    /// mid-submission. Recoverable renderer errors are logged and the loop
    /// continues; device loss ends it with [`BridgeError::BackendLost`]. A
    /// panic in the core or the swap callback also leaves the bridge
    /// `Stopped`, ready for [`teardown`](Self::teardown).
    pub fn run_loop(&self, input: &InputRouter) -> Result<RunLoopExit> {
        let (mut renderer, config) = {
            let mut state = self.state.lock();
            state.require("graphics_renderer_run_loop", &[BridgePhase::RendererInitialized])?;

            let (Some(renderer), Some(config)) = (state.renderer.take(), state.effective) else {
                return Err(BridgeError::StateSequence {
                    operation: "graphics_renderer_run_loop",
                    state: state.phase().into(),
                });
            };
            state.phase = Some(BridgePhase::Running);
            (renderer, config)
        };
        let _stopped = StopOnExit(&self.state);

        *self.stats.lock() = RenderStats::default();
        if !self.surface.lock().has_swap_callback() {
            tracing::warn!("Render loop started without a swap-buffers callback");
        }
        tracing::info!("{} render loop started", renderer.backend());

        let mut frame_index = 0u64;
        let outcome = loop {
            if self.stop_requested.swap(false, Ordering::AcqRel) {
                tracing::info!("Render loop stopped after {} frames", frame_index);
                break Ok(RunLoopExit::Stopped);
            }

            match self.run_frame(renderer.as_mut(), &config, input, frame_index) {
                Ok(()) => {}
                Err(RenderError::Recoverable(reason)) => {
                    tracing::warn!("Frame {} failed, retrying next frame: {}", frame_index, reason);
                    self.stats.lock().record_recoverable_error();
                }
                Err(RenderError::DeviceLost(reason)) => {
                    tracing::error!("Graphics backend lost at frame {}: {}", frame_index, reason);
                    break Err(BridgeError::BackendLost(reason));
                }
            }
            frame_index += 1;
        };

        // Tear the context down on the render thread that owned it.
        drop(renderer);
        outcome
    }

    fn run_frame(
        &self,
        renderer: &mut dyn Renderer,
        config: &GraphicsConfiguration,
        input: &InputRouter,
        frame_index: u64,
    ) -> Result<(), RenderError> {
        let frame_start = Instant::now();

        let (changes, swap_callback) = self.surface.lock().begin_frame();
        let geometry = changes.geometry;
        if changes.resized {
            renderer.resize(geometry.width, geometry.height);
        }
        if changes.vsync_changed {
            renderer.set_vsync(geometry.vsync);
        }

        let snapshot = input.snapshot();
        let submission = FrameSubmission {
            frame_index,
            config,
            geometry: &geometry,
            input: snapshot.as_ref(),
        };

        let submit_start = Instant::now();
        let status = renderer.submit_frame(&submission)?;
        let submit_time = submit_start.elapsed();

        let presented = status == FrameStatus::Presentable;
        if presented {
            renderer.present()?;
            if let Some(callback) = swap_callback {
                callback();
            }
        }

        self.stats
            .lock()
            .record_frame(frame_start.elapsed(), submit_time, presented);
        Ok(())
    }
}

/// Leaves the bridge `Stopped` when the run loop exits, unwinding included.
struct StopOnExit<'a>(&'a Mutex<GraphicsState>);

impl Drop for StopOnExit<'_> {
    fn drop(&mut self) {
        self.0.lock().phase = Some(BridgePhase::Stopped);
    }
}

fn size_error(width: i32, height: i32) -> BridgeError {
    ConfigurationError::Size {
        width: width.into(),
        height: height.into(),
    }
    .into()
}
