//! Device lifecycle entry points

use std::ffi::{CString, c_char};
use std::path::Path;

use emubridge_shared::{DeviceOptions, GameStats, RegionCode, SystemLanguage};

use super::{opt_str, report, with_bridge};
use crate::emulation::FirmwareSource;
use crate::error::{BridgeError, ConfigurationError};

/// Create the device context. Requires an initialized renderer.
///
/// `system_language` and `region` use the contract tables of
/// `SystemLanguage` and `RegionCode`; a null `time_zone` falls back to the
/// `[device]` section of `config.toml`.
///
/// # Safety
///
/// `time_zone` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn device_initialize(
    host_mapped: bool,
    use_nce: bool,
    system_language: i32,
    region: i32,
    enable_vsync: bool,
    docked_mode: bool,
    enable_ptc: bool,
    enable_internet_access: bool,
    time_zone: *const c_char,
    ignore_missing_services: bool,
) -> bool {
    // SAFETY: forwarded from this function's contract.
    let time_zone = unsafe { opt_str(time_zone) };
    with_bridge("device_initialize", false, |bridge| {
        let time_zone = match time_zone {
            Some(Ok(zone)) => zone.to_string(),
            Some(Err(())) => {
                tracing::error!("device_initialize: time zone is not valid UTF-8");
                return false;
            }
            None => bridge.config().device.time_zone.clone(),
        };

        let tables = SystemLanguage::try_from(system_language)
            .and_then(|language| RegionCode::try_from(region).map(|region| (language, region)));
        let (system_language, region) = match tables {
            Ok(values) => values,
            Err(e) => {
                let e = BridgeError::Configuration(ConfigurationError::UnknownValue(e));
                return report::<()>("device_initialize", Err(e));
            }
        };

        let options = DeviceOptions {
            host_mapped,
            use_nce,
            system_language,
            region,
            enable_vsync,
            docked_mode,
            enable_ptc,
            enable_internet_access,
            time_zone,
            ignore_missing_services,
        };
        report("device_initialize", bridge.device_initialize(options))
    })
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "C" fn device_reloadFilesystem() -> bool {
    with_bridge("device_reloadFilesystem", false, |bridge| {
        report("device_reloadFilesystem", bridge.device_reload_filesystem())
    })
}

/// Load an application image or extracted cart directory.
///
/// # Safety
///
/// `path` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn device_load(path: *const c_char) -> bool {
    // SAFETY: forwarded from this function's contract.
    let path = unsafe { opt_str(path) };
    with_bridge("device_load", false, |bridge| match path {
        Some(Ok(path)) => report("device_load", bridge.device_load(Path::new(path))),
        _ => {
            tracing::error!("device_load: path is null or not valid UTF-8");
            false
        }
    })
}

/// Install firmware from an archive the host opened as `descriptor`.
#[unsafe(no_mangle)]
pub extern "C" fn device_install_firmware(descriptor: i32, is_xci: bool) -> bool {
    with_bridge("device_install_firmware", false, |bridge| {
        report(
            "device_install_firmware",
            bridge.device_install_firmware(&FirmwareSource::Descriptor(descriptor), is_xci),
        )
    })
}

/// Installed firmware version, or null when none is installed.
///
/// The string is owned by the caller and must be released with
/// `bridge_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn device_get_installed_firmware_version() -> *mut c_char {
    with_bridge(
        "device_get_installed_firmware_version",
        std::ptr::null_mut(),
        |bridge| {
            bridge
                .device_installed_firmware_version()
                .and_then(|version| CString::new(version).ok())
                .map_or(std::ptr::null_mut(), CString::into_raw)
        },
    )
}

/// Smoothed statistics of the current or last render loop.
#[unsafe(no_mangle)]
pub extern "C" fn device_get_game_stats() -> GameStats {
    with_bridge("device_get_game_stats", GameStats::default(), |bridge| {
        bridge.game_stats()
    })
}

/// Release a string returned by the bridge. Null is ignored.
///
/// # Safety
///
/// `s` must be null or a pointer returned by a bridge function that has not
/// been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bridge_free_string(s: *mut c_char) {
    if !s.is_null() {
        // SAFETY: `s` came from `CString::into_raw` per this function's contract.
        drop(unsafe { CString::from_raw(s) });
    }
}
