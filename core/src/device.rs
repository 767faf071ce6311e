//! Device lifecycle: device context, application loading and firmware
//!
//! A thin layer over [`EmulationCore`]. It tracks whether a device context
//! exists, classifies application paths and disposes the context when a load
//! fails so the host always sees a consistent state.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use emubridge_shared::DeviceOptions;

use crate::emulation::{Application, DeviceContext, EmulationCore, FirmwareSource};
use crate::error::{DeviceError, Result};

/// RomFS image extensions searched in cart directories, in priority order.
const ROMFS_EXTENSIONS: [&str; 2] = ["istorage", "romfs"];

/// Classify an application path by its on-disk shape.
///
/// Directories are extracted carts, with the first `*.istorage` (else
/// `*.romfs`) image as RomFS. Files are classified by extension; anything
/// unrecognized is treated as homebrew.
pub fn detect_application(path: &Path) -> Result<Application, DeviceError> {
    if path.is_dir() {
        let romfs = find_romfs(path)?;
        return Ok(Application::Cart {
            path: path.to_path_buf(),
            romfs,
        });
    }

    if !path.is_file() {
        return Err(DeviceError::UnsupportedApplication(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let path = path.to_path_buf();
    Ok(match extension.as_deref() {
        Some("xci") => Application::Xci(path),
        Some("nca") => Application::Nca(path),
        Some("nsp" | "pfs0") => Application::Nsp(path),
        _ => Application::Homebrew(path),
    })
}

fn find_romfs(dir: &Path) -> Result<Option<PathBuf>, DeviceError> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| DeviceError::Core(e.into()))?;
    for entry in entries {
        let path = entry.map_err(|e| DeviceError::Core(e.into()))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    for wanted in ROMFS_EXTENSIONS {
        let found = files.iter().find(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
        });
        if let Some(found) = found {
            return Ok(Some(found.clone()));
        }
    }
    Ok(None)
}

#[derive(Default)]
struct DeviceState {
    options: Option<DeviceOptions>,
    loaded: Option<Application>,
}

/// Device context bookkeeping around the core.
#[derive(Default)]
pub struct DeviceManager {
    state: Mutex<DeviceState>,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the device context. An existing context is disposed first.
    pub fn initialize(
        &self,
        core: &mut dyn EmulationCore,
        options: DeviceOptions,
        context: DeviceContext,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.options.take().is_some() {
            tracing::info!("Replacing existing device context");
            core.dispose_device();
            state.loaded = None;
        }

        core.initialize_device(&options, &context)
            .map_err(DeviceError::Core)?;

        tracing::info!(
            "Device initialized ({}, threaded backend: {}, {:?}, {:?}/{:?})",
            context.backend,
            context.threaded_backend,
            context.aspect_ratio,
            options.system_language,
            options.region
        );
        state.options = Some(options);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().options.is_some()
    }

    /// Options the current device context was created with
    pub fn options(&self) -> Option<DeviceOptions> {
        self.state.lock().options.clone()
    }

    pub fn loaded_application(&self) -> Option<Application> {
        self.state.lock().loaded.clone()
    }

    pub fn reload_filesystem(&self, core: &mut dyn EmulationCore) -> Result<()> {
        core.reload_filesystem().map_err(DeviceError::Core)?;
        tracing::info!("Filesystem reloaded");
        Ok(())
    }

    /// Load the application at `path`.
    ///
    /// On failure the device context is disposed and must be initialized again.
    pub fn load(&self, core: &mut dyn EmulationCore, path: &Path) -> Result<Application> {
        let mut state = self.state.lock();
        if state.options.is_none() {
            return Err(DeviceError::NotInitialized.into());
        }

        let outcome = detect_application(path).and_then(|application| {
            core.load_application(&application)
                .map(|()| application)
                .map_err(DeviceError::Core)
        });

        match outcome {
            Ok(application) => {
                tracing::info!("Loaded {:?}", application);
                state.loaded = Some(application.clone());
                Ok(application)
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", path.display(), e);
                core.dispose_device();
                state.options = None;
                state.loaded = None;
                Err(e.into())
            }
        }
    }

    pub fn install_firmware(
        &self,
        core: &mut dyn EmulationCore,
        source: &FirmwareSource,
        is_xci: bool,
    ) -> Result<()> {
        core.install_firmware(source, is_xci)
            .map_err(DeviceError::Core)?;
        tracing::info!("Firmware installed from {:?}", source);
        Ok(())
    }

    pub fn installed_firmware_version(&self, core: &dyn EmulationCore) -> Option<String> {
        core.installed_firmware_version()
    }
}
