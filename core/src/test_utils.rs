//! Shared test utilities for unit tests

use std::collections::VecDeque;
use std::ffi::{CStr, CString, c_char, c_void};
use std::ptr::NonNull;
use std::sync::Arc;

use anyhow::{Result, bail};
use parking_lot::Mutex;

use emubridge_shared::{DeviceOptions, GraphicsBackend, GraphicsConfiguration};

use crate::emulation::{
    Application, DeviceContext, EmulationCore, FirmwareSource, FrameStatus, FrameSubmission,
    RenderError, Renderer,
};
use crate::graphics::{FrameGeometry, NativeCapabilities};

// ============================================================================
// Fake host procedures
// ============================================================================

/// GL resolver that knows every name except `glDoesNotExist`.
pub unsafe extern "C" fn fake_get_proc_address(name: *const c_char) -> *mut c_void {
    // SAFETY: callers pass NUL-terminated names.
    let name = unsafe { CStr::from_ptr(name) };
    if name == c"glDoesNotExist" {
        std::ptr::null_mut()
    } else {
        NonNull::<c_void>::dangling().as_ptr()
    }
}

pub unsafe extern "C" fn fake_vk_loader(_instance: *mut c_void, _name: *const c_char) -> *mut c_void {
    NonNull::<c_void>::dangling().as_ptr()
}

/// Surface creator returning `0xABCD`, or 0 for a null instance.
pub unsafe extern "C" fn fake_create_surface(instance: *mut c_void) -> u64 {
    if instance.is_null() { 0 } else { 0xABCD }
}

/// Owned C string array in the layout the host passes extension names in.
pub struct HostExtensions {
    _names: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl HostExtensions {
    pub fn new(names: &[&str]) -> Self {
        let names: Vec<CString> = names.iter().map(|n| CString::new(*n).unwrap()).collect();
        let pointers = names.iter().map(|n| n.as_ptr()).collect();
        Self {
            _names: names,
            pointers,
        }
    }

    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }
}

// ============================================================================
// Mock core
// ============================================================================

/// Calls the bridge made into [`MockCore`].
#[derive(Debug, Default)]
pub struct CoreLog {
    pub renderers_created: usize,
    pub last_backend: Option<GraphicsBackend>,
    pub vulkan_extensions: Vec<String>,
    pub device: Option<(DeviceOptions, DeviceContext)>,
    pub disposed: usize,
    pub reloads: usize,
    pub loaded: Vec<Application>,
    pub firmware_installs: Vec<(FirmwareSource, bool)>,
}

/// What a [`MockRenderer`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Resize(u32, u32),
    Vsync(bool),
    Submit {
        frame_index: u64,
        geometry: FrameGeometry,
        input_tick: u64,
    },
    Present,
}

#[derive(Debug, Default)]
pub struct RenderLog {
    pub events: Vec<RenderEvent>,
    pub dropped: bool,
}

impl RenderLog {
    pub fn submissions(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Submit { frame_index, .. } => Some(*frame_index),
                _ => None,
            })
            .collect()
    }

    pub fn presents(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RenderEvent::Present))
            .count()
    }
}

/// Knobs for [`MockCore`] and the renderers it creates.
#[derive(Debug, Clone, Default)]
pub struct MockSettings {
    pub prefers_threading: bool,
    pub max_anisotropy: Option<f32>,
    pub fail_renderer: bool,
    pub fail_load: bool,
    pub firmware_version: Option<String>,
    /// Per-frame submit results; `Presentable` once exhausted
    pub frame_script: Vec<Result<FrameStatus, RenderError>>,
}

/// Scriptable [`EmulationCore`] that records every call.
#[derive(Default)]
pub struct MockCore {
    pub log: Arc<Mutex<CoreLog>>,
    pub render_log: Arc<Mutex<RenderLog>>,
    pub settings: MockSettings,
}

impl MockCore {
    pub fn with_settings(settings: MockSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
}

impl EmulationCore for MockCore {
    fn create_renderer(
        &mut self,
        capabilities: &NativeCapabilities<'_>,
        _config: &GraphicsConfiguration,
    ) -> Result<Box<dyn Renderer>> {
        if self.settings.fail_renderer {
            bail!("no suitable device");
        }

        let mut log = self.log.lock();
        log.renderers_created += 1;
        log.last_backend = Some(capabilities.backend());
        if let NativeCapabilities::Vulkan(vk) = capabilities {
            log.vulkan_extensions = vk.required_extensions().to_vec();
        }

        *self.render_log.lock() = RenderLog::default();
        Ok(Box::new(MockRenderer {
            backend: capabilities.backend(),
            prefers_threading: self.settings.prefers_threading,
            max_anisotropy: self
                .settings
                .max_anisotropy
                .unwrap_or(emubridge_shared::MAX_ANISOTROPY),
            script: self.settings.frame_script.iter().cloned().collect(),
            log: Arc::clone(&self.render_log),
        }))
    }

    fn initialize_device(&mut self, options: &DeviceOptions, context: &DeviceContext) -> Result<()> {
        self.log.lock().device = Some((options.clone(), *context));
        Ok(())
    }

    fn dispose_device(&mut self) {
        let mut log = self.log.lock();
        log.device = None;
        log.disposed += 1;
    }

    fn reload_filesystem(&mut self) -> Result<()> {
        self.log.lock().reloads += 1;
        Ok(())
    }

    fn load_application(&mut self, application: &Application) -> Result<()> {
        if self.settings.fail_load {
            bail!("title key missing");
        }
        self.log.lock().loaded.push(application.clone());
        Ok(())
    }

    fn install_firmware(&mut self, source: &FirmwareSource, is_xci: bool) -> Result<()> {
        self.log
            .lock()
            .firmware_installs
            .push((source.clone(), is_xci));
        self.settings.firmware_version = Some("17.0.0".to_string());
        Ok(())
    }

    fn installed_firmware_version(&self) -> Option<String> {
        self.settings.firmware_version.clone()
    }
}

/// Renderer that logs every call and plays back a frame script.
pub struct MockRenderer {
    backend: GraphicsBackend,
    prefers_threading: bool,
    max_anisotropy: f32,
    script: VecDeque<Result<FrameStatus, RenderError>>,
    log: Arc<Mutex<RenderLog>>,
}

impl Renderer for MockRenderer {
    fn backend(&self) -> GraphicsBackend {
        self.backend
    }

    fn prefers_threading(&self) -> bool {
        self.prefers_threading
    }

    fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.log.lock().events.push(RenderEvent::Resize(width, height));
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.log.lock().events.push(RenderEvent::Vsync(enabled));
    }

    fn submit_frame(&mut self, frame: &FrameSubmission<'_>) -> Result<FrameStatus, RenderError> {
        self.log.lock().events.push(RenderEvent::Submit {
            frame_index: frame.frame_index,
            geometry: *frame.geometry,
            input_tick: frame.input.tick,
        });
        self.script.pop_front().unwrap_or(Ok(FrameStatus::Presentable))
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.log.lock().events.push(RenderEvent::Present);
        Ok(())
    }
}

impl Drop for MockRenderer {
    fn drop(&mut self) {
        self.log.lock().dropped = true;
    }
}
