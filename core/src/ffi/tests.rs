//! C ABI tests
//!
//! The bridge is a process-wide singleton, so the whole host sequence runs
//! as one test.

use std::ffi::{CStr, CString};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use emubridge_shared::{
    GameStats, GamepadButtonInputId, GraphicsConfiguration, NativeGraphicsInterop,
    RawGraphicsConfiguration, Vector2,
};

use super::device::*;
use super::graphics::*;
use super::input::*;
use super::*;
use crate::error::{BridgeError, DeviceError};
use crate::graphics::BridgePhase;
use crate::test_utils::{MockCore, fake_get_proc_address};

static SWAPS: AtomicUsize = AtomicUsize::new(0);

unsafe extern "C" fn stop_after_two_swaps() {
    if SWAPS.fetch_add(1, Ordering::SeqCst) + 1 >= 2 {
        graphics_renderer_stop();
    }
}

#[test]
fn test_slot_conversion() {
    assert_eq!(slot(3), 3);
    assert_eq!(slot(-1), usize::MAX);
}

#[test]
fn test_guard_turns_panic_into_fallback() {
    assert!(!guard("panicking", false, || panic!("boom")));
    assert_eq!(guard("fine", 0, || 7), 7);
}

#[test]
fn test_bootstrap_rejects_invalid_base_path() {
    let err = bootstrap(Some(Err(()))).err().unwrap();
    assert!(matches!(err, BridgeError::Device(DeviceError::Bootstrap(_))));
}

#[test]
fn test_host_sequence() {
    // ========================================================================
    // Bootstrap
    // ========================================================================

    let base = tempfile::tempdir().unwrap();
    std::fs::write(base.path().join("config.toml"), "[input]\nmax_controllers = 2\n\n[device]\ntime_zone = \"Asia/Tokyo\"\n").unwrap();
    let base_path = CString::new(base.path().to_str().unwrap()).unwrap();

    assert!(!graphics_initialize(GraphicsConfiguration::default().into()));
    assert!(unsafe { !initialize(base_path.as_ptr()) }, "no core registered yet");

    assert!(register_core(Box::new(MockCore::default())));
    assert!(unsafe { initialize(base_path.as_ptr()) });
    assert!(unsafe { !initialize(base_path.as_ptr()) });
    assert!(!register_core(Box::new(MockCore::default())));
    assert_eq!(bridge().unwrap().input().max_controllers(), 2);

    // ========================================================================
    // Graphics bring-up
    // ========================================================================

    let bad = RawGraphicsConfiguration {
        aspect_ratio: 42,
        ..RawGraphicsConfiguration::from(GraphicsConfiguration::default())
    };
    assert!(!graphics_initialize(bad));
    assert!(!graphics_renderer_set_size(1280, 720));
    assert!(graphics_initialize(GraphicsConfiguration::default().into()));

    let interop = NativeGraphicsInterop {
        gl_get_proc_address: Some(fake_get_proc_address),
        ..Default::default()
    };
    assert!(unsafe { !graphics_initialize_renderer(7, interop) });
    assert!(unsafe { !graphics_initialize_renderer(0, interop) });
    assert!(unsafe { graphics_initialize_renderer(1, interop) });
    assert!(graphics_renderer_set_size(1280, 720));
    assert!(!graphics_renderer_set_size(0, 720));
    graphics_renderer_set_vsync(false);

    // ========================================================================
    // Input
    // ========================================================================

    assert_eq!(input_connect_gamepad(0), 0);
    assert!(input_initialize(1280, 720));
    assert!(!input_initialize(1280, 720));

    let handle = input_connect_gamepad(0);
    assert_ne!(handle, 0);
    assert_eq!(input_connect_gamepad(0), handle);
    assert_eq!(input_connect_gamepad(2), 0);
    assert_eq!(input_connect_gamepad(-1), 0);

    input_set_button_pressed(GamepadButtonInputId::A.value(), 0);
    input_set_button_pressed(200, 0);
    input_set_button_pressed(GamepadButtonInputId::B.value(), 1);
    input_set_stick_axis(1, Vector2::new(0.5, -0.5), 0);
    input_set_touch_point(640, 360);
    input_release_touch_point();
    input_update();

    let snapshot = bridge().unwrap().input().snapshot();
    assert!(snapshot.is_pressed(0, GamepadButtonInputId::A));
    assert!(snapshot.controller(1).is_none());
    assert_eq!(snapshot.controller(0).unwrap().left_stick.x, 0.5);
    assert!(snapshot.touch.is_some());

    // ========================================================================
    // Device
    // ========================================================================

    assert!(unsafe { device_initialize(true, false, 1, 1, true, true, true, false, std::ptr::null(), false) });
    let options = bridge().unwrap().device().options().unwrap();
    assert_eq!(options.time_zone, "Asia/Tokyo");
    assert!(unsafe { !device_initialize(true, false, 99, 1, true, true, true, false, std::ptr::null(), false) });
    assert!(unsafe { device_initialize(true, false, 1, 1, true, true, true, false, c"Europe/Paris".as_ptr(), false) });
    assert!(device_reloadFilesystem());

    let rom = base.path().join("game.nro");
    std::fs::write(&rom, b"").unwrap();
    let rom = CString::new(rom.to_str().unwrap()).unwrap();
    assert!(unsafe { device_load(rom.as_ptr()) });
    assert!(unsafe { !device_load(std::ptr::null()) });

    assert!(device_get_installed_firmware_version().is_null());
    assert!(device_install_firmware(3, true));
    let version = device_get_installed_firmware_version();
    assert!(!version.is_null());
    assert_eq!(unsafe { CStr::from_ptr(version) }.to_str().unwrap(), "17.0.0");
    unsafe {
        bridge_free_string(version);
        bridge_free_string(std::ptr::null_mut());
    }

    // ========================================================================
    // Render loop
    // ========================================================================

    unsafe { graphics_renderer_set_swap_buffer_callback(Some(stop_after_two_swaps)) };
    let render = thread::spawn(|| graphics_renderer_run_loop());
    assert!(render.join().unwrap());
    assert_eq!(SWAPS.load(Ordering::SeqCst), 2);
    assert_eq!(bridge().unwrap().graphics().phase(), BridgePhase::Stopped);
    assert!(!graphics_renderer_run_loop());

    let stats = device_get_game_stats();
    assert_ne!(stats, GameStats::default());

    // ========================================================================
    // Teardown
    // ========================================================================

    unsafe { graphics_renderer_set_swap_buffer_callback(None) };
    assert!(graphics_teardown());
    assert_eq!(bridge().unwrap().graphics().phase(), BridgePhase::Uninitialized);
    assert!(graphics_initialize(GraphicsConfiguration::default().into()));
}
