//! C ABI for host applications
//!
//! The embedding crate installs its core with [`register_core`]; the host
//! then calls `initialize(base_path)` once and drives everything else through
//! the `graphics_*`, `input_*` and `device_*` entry points. Matching
//! declarations live in `include/emubridge.h`.
//!
//! No entry point unwinds into the host. Failures are logged and reported as
//! `false`, `0` or a null pointer.

pub mod device;
pub mod graphics;
pub mod input;

#[cfg(test)]
mod tests;

use std::ffi::{CStr, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::bridge::HostBridge;
use crate::config;
use crate::emulation::EmulationCore;
use crate::error::{DeviceError, Result};
use crate::logging;

/// Core waiting for `initialize`
static PENDING_CORE: Mutex<Option<Box<dyn EmulationCore>>> = parking_lot::const_mutex(None);

static BRIDGE: OnceLock<HostBridge> = OnceLock::new();

/// Install the emulation core used by the next `initialize` call.
///
/// Returns false once the bridge is already bootstrapped.
pub fn register_core(core: Box<dyn EmulationCore>) -> bool {
    if BRIDGE.get().is_some() {
        tracing::warn!("register_core ignored: bridge already initialized");
        return false;
    }
    *PENDING_CORE.lock() = Some(core);
    true
}

/// The process-wide bridge, once `initialize` succeeded
pub fn bridge() -> Option<&'static HostBridge> {
    BRIDGE.get()
}

/// Bootstrap the process-wide bridge.
///
/// Loads `<base_path>/config.toml` (the platform data directory when
/// `base_path` is null), installs the tracing subscriber and creates the
/// bridge around the registered core. A second call fails.
///
/// # Safety
///
/// `base_path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn initialize(base_path: *const c_char) -> bool {
    // SAFETY: forwarded from this function's contract.
    let base_path = unsafe { opt_str(base_path) };
    guard("initialize", false, move || match bootstrap(base_path) {
        Ok(bridge) => {
            if BRIDGE.set(bridge).is_err() {
                tracing::warn!("initialize raced with another initialize");
                return false;
            }
            true
        }
        Err(e) => {
            tracing::error!("initialize failed: {}", e);
            false
        }
    })
}

/// Build the bridge for `initialize` without publishing it.
fn bootstrap(base_path: Option<Result<&str, ()>>) -> Result<HostBridge> {
    if BRIDGE.get().is_some() {
        return Err(DeviceError::Bootstrap("bridge is already initialized").into());
    }

    let base_path = match base_path {
        Some(Ok(path)) => PathBuf::from(path),
        Some(Err(())) => return Err(DeviceError::Bootstrap("base path is not valid UTF-8").into()),
        None => config::default_base_path()
            .ok_or(DeviceError::Bootstrap("no base path and no home directory"))?,
    };

    let (config, config_error) = match config::load(&base_path) {
        Ok(config) => (config, None),
        Err(e) => (Default::default(), Some(e)),
    };
    logging::init(&config.logging.filter);
    if let Some(e) = config_error {
        tracing::warn!("Using default configuration: {:#}", e);
    }

    let core = PENDING_CORE
        .lock()
        .take()
        .ok_or(DeviceError::Bootstrap("no emulation core registered"))?;
    let bridge = HostBridge::new(core, config)?;
    tracing::info!("Bridge initialized at {}", base_path.display());
    Ok(bridge)
}

/// Run `f`, turning a panic into `fallback`.
fn guard<T>(operation: &'static str, fallback: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("{} panicked: {}", operation, message);
            fallback
        }
    }
}

/// Run `f` against the bootstrapped bridge, or return `fallback` before
/// `initialize` or on panic.
pub(crate) fn with_bridge<T: Copy>(
    operation: &'static str,
    fallback: T,
    f: impl FnOnce(&'static HostBridge) -> T,
) -> T {
    guard(operation, fallback, || match BRIDGE.get() {
        Some(bridge) => f(bridge),
        None => {
            tracing::warn!("{} called before initialize", operation);
            fallback
        }
    })
}

/// Log a failed operation and flatten it to a boolean.
pub(crate) fn report<T>(operation: &str, result: Result<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("{} failed: {}", operation, e);
            false
        }
    }
}

/// Borrow an optional C string.
///
/// # Safety
///
/// `ptr` must be null or a NUL-terminated string that outlives the result.
pub(crate) unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<Result<&'a str, ()>> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let s = unsafe { CStr::from_ptr(ptr) };
    Some(s.to_str().map_err(|_| ()))
}

/// Controller slot from a C index; negative indices never resolve.
pub(crate) fn slot(index: i32) -> usize {
    usize::try_from(index).unwrap_or(usize::MAX)
}
