//! Host-facing facade tying graphics, input and device lifecycle together

use std::path::Path;

use parking_lot::Mutex;

use emubridge_shared::{DeviceOptions, GameStats, GraphicsBackend, GraphicsConfiguration, NativeGraphicsInterop};

use crate::config::BridgeConfig;
use crate::device::DeviceManager;
use crate::emulation::{Application, DeviceContext, EmulationCore, FirmwareSource};
use crate::error::{DeviceError, Result};
use crate::graphics::{BridgePhase, GraphicsBridge, NativeCapabilities, RendererInfo, RunLoopExit};
use crate::input::InputRouter;

/// One embedding session: the core plus the three host-facing components.
///
/// Every method takes `&self`, so a host can share the bridge between its
/// UI thread and the render thread blocked in [`run_loop`](Self::run_loop).
/// The core lock is always taken before any graphics lock, and the render
/// loop never takes it.
pub struct HostBridge {
    config: BridgeConfig,
    core: Mutex<Box<dyn EmulationCore>>,
    graphics: GraphicsBridge,
    input: InputRouter,
    device: DeviceManager,
}

impl HostBridge {
    pub fn new(core: Box<dyn EmulationCore>, config: BridgeConfig) -> Result<Self> {
        let input = InputRouter::new(config.input.max_controllers)?;
        Ok(Self {
            config,
            core: Mutex::new(core),
            graphics: GraphicsBridge::new(),
            input,
            device: DeviceManager::new(),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn graphics(&self) -> &GraphicsBridge {
        &self.graphics
    }

    pub fn input(&self) -> &InputRouter {
        &self.input
    }

    pub fn device(&self) -> &DeviceManager {
        &self.device
    }

    // ========================================================================
    // Graphics
    // ========================================================================

    /// Accept the session graphics configuration and share its aspect ratio
    /// with touch mapping.
    pub fn graphics_initialize(&self, config: GraphicsConfiguration) -> Result<()> {
        self.graphics.initialize(config)?;
        self.input.set_aspect_ratio(config.aspect_ratio);
        Ok(())
    }

    /// [`graphics_initialize`](Self::graphics_initialize) with the `[graphics]`
    /// section of the bridge config.
    pub fn graphics_initialize_configured(&self) -> Result<()> {
        self.graphics_initialize(self.config.graphics)
    }

    /// # Safety
    ///
    /// Same contract as [`NativeCapabilities::from_interop`].
    pub unsafe fn graphics_initialize_renderer(
        &self,
        backend: GraphicsBackend,
        interop: &NativeGraphicsInterop,
    ) -> Result<RendererInfo> {
        let mut core = self.core.lock();
        // SAFETY: forwarded from this function's contract.
        unsafe { self.graphics.initialize_renderer(core.as_mut(), backend, interop) }
    }

    /// Create the renderer from capabilities a Rust host built itself.
    pub fn graphics_initialize_renderer_with(
        &self,
        capabilities: &NativeCapabilities<'_>,
    ) -> Result<RendererInfo> {
        let mut core = self.core.lock();
        self.graphics.initialize_renderer_with(core.as_mut(), capabilities)
    }

    /// Block the calling thread in the render loop.
    pub fn run_loop(&self) -> Result<RunLoopExit> {
        self.graphics.run_loop(&self.input)
    }

    pub fn game_stats(&self) -> GameStats {
        self.graphics.stats().into()
    }

    // ========================================================================
    // Device
    // ========================================================================

    /// Create the device context for the initialized renderer.
    pub fn device_initialize(&self, options: DeviceOptions) -> Result<()> {
        let phase = self.graphics.phase();
        let ready = matches!(phase, BridgePhase::RendererInitialized | BridgePhase::Running);
        let (Some(info), Some(config), true) = (
            self.graphics.renderer_info(),
            self.graphics.effective_configuration(),
            ready,
        ) else {
            tracing::warn!("device_initialize rejected: graphics is {}", phase);
            return Err(DeviceError::RendererNotReady.into());
        };

        let context = DeviceContext {
            backend: info.backend,
            threaded_backend: info.threaded_backend,
            aspect_ratio: config.aspect_ratio,
        };
        let mut core = self.core.lock();
        self.device.initialize(core.as_mut(), options, context)
    }

    /// [`device_initialize`](Self::device_initialize) with the `[device]`
    /// section of the bridge config.
    pub fn device_initialize_configured(&self) -> Result<()> {
        self.device_initialize(self.config.device.clone())
    }

    pub fn device_reload_filesystem(&self) -> Result<()> {
        let mut core = self.core.lock();
        self.device.reload_filesystem(core.as_mut())
    }

    pub fn device_load(&self, path: &Path) -> Result<Application> {
        let mut core = self.core.lock();
        self.device.load(core.as_mut(), path)
    }

    pub fn device_install_firmware(&self, source: &FirmwareSource, is_xci: bool) -> Result<()> {
        let mut core = self.core.lock();
        self.device.install_firmware(core.as_mut(), source, is_xci)
    }

    pub fn device_installed_firmware_version(&self) -> Option<String> {
        let core = self.core.lock();
        self.device.installed_firmware_version(core.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use emubridge_shared::{AspectRatio, GamepadButtonInputId};

    use super::*;
    use crate::error::BridgeError;
    use crate::test_utils::{MockCore, RenderEvent, fake_get_proc_address};

    fn gl_interop() -> NativeGraphicsInterop {
        NativeGraphicsInterop {
            gl_get_proc_address: Some(fake_get_proc_address),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_bad_controller_count() {
        let mut config = BridgeConfig::default();
        config.input.max_controllers = 9;
        assert!(HostBridge::new(Box::new(MockCore::default()), config).is_err());
    }

    #[test]
    fn test_device_requires_renderer() {
        let bridge = HostBridge::new(Box::new(MockCore::default()), BridgeConfig::default()).unwrap();
        bridge.graphics_initialize(GraphicsConfiguration::default()).unwrap();

        let err = bridge.device_initialize(DeviceOptions::default()).unwrap_err();
        assert!(matches!(err, BridgeError::Device(DeviceError::RendererNotReady)));
    }

    #[test]
    fn test_device_context_uses_negotiated_renderer() {
        let core = MockCore::default();
        let log = Arc::clone(&core.log);
        let bridge = HostBridge::new(Box::new(core), BridgeConfig::default()).unwrap();

        bridge
            .graphics_initialize(GraphicsConfiguration {
                aspect_ratio: AspectRatio::Fixed21x9,
                ..Default::default()
            })
            .unwrap();
        unsafe { bridge.graphics_initialize_renderer(GraphicsBackend::OpenGl, &gl_interop()) }.unwrap();
        bridge.device_initialize(DeviceOptions::default()).unwrap();

        let (_, context) = log.lock().device.clone().unwrap();
        assert_eq!(
            context,
            DeviceContext {
                backend: GraphicsBackend::OpenGl,
                threaded_backend: false,
                aspect_ratio: AspectRatio::Fixed21x9,
            }
        );
    }

    #[test]
    fn test_configured_defaults_reach_the_core() {
        let mut config = BridgeConfig::default();
        config.graphics.aspect_ratio = AspectRatio::Fixed4x3;
        config.device.time_zone = "Asia/Tokyo".to_string();
        config.device.docked_mode = false;

        let core = MockCore::default();
        let log = Arc::clone(&core.log);
        let bridge = HostBridge::new(Box::new(core), config).unwrap();

        bridge.graphics_initialize_configured().unwrap();
        assert_eq!(
            bridge.graphics().configuration().unwrap().aspect_ratio,
            AspectRatio::Fixed4x3
        );
        unsafe { bridge.graphics_initialize_renderer(GraphicsBackend::OpenGl, &gl_interop()) }.unwrap();
        bridge.device_initialize_configured().unwrap();

        let (options, context) = log.lock().device.clone().unwrap();
        assert_eq!(options.time_zone, "Asia/Tokyo");
        assert!(!options.docked_mode);
        assert_eq!(context.aspect_ratio, AspectRatio::Fixed4x3);
    }

    #[test]
    fn test_session_across_threads() {
        let core = MockCore::default();
        let render_log = Arc::clone(&core.render_log);
        let bridge = Arc::new(HostBridge::new(Box::new(core), BridgeConfig::default()).unwrap());

        bridge.graphics_initialize(GraphicsConfiguration::default()).unwrap();
        unsafe { bridge.graphics_initialize_renderer(GraphicsBackend::OpenGl, &gl_interop()) }.unwrap();
        bridge.graphics().set_size(1280, 720).unwrap();
        bridge.input().initialize(1280, 720).unwrap();
        bridge.input().connect_gamepad(0).unwrap();

        let render = {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || bridge.run_loop())
        };

        bridge.input().set_button_pressed(GamepadButtonInputId::A, 0);
        let published = bridge.input().update();
        while render_log
            .lock()
            .events
            .iter()
            .all(|e| !matches!(e, RenderEvent::Submit { input_tick, .. } if *input_tick >= published.tick))
        {
            thread::yield_now();
        }
        bridge.graphics().request_stop();

        assert_eq!(render.join().unwrap().unwrap(), RunLoopExit::Stopped);
        assert_eq!(bridge.graphics().phase(), BridgePhase::Stopped);
        assert!(bridge.game_stats().game_fps >= 0.0);
    }
}
