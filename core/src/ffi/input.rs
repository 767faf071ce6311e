//! Input entry points
//!
//! Event calls for unknown ids or unconnected indices are dropped silently
//! (trace-logged) to match the router.

use glam::{Vec2, Vec3};

use emubridge_shared::{GamepadButtonInputId, StickInputId, Vector2, Vector3};

use super::{report, slot, with_bridge};

#[unsafe(no_mangle)]
pub extern "C" fn input_initialize(width: i32, height: i32) -> bool {
    with_bridge("input_initialize", false, |bridge| {
        report("input_initialize", bridge.input().initialize(width, height))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_set_client_size(width: i32, height: i32) -> bool {
    with_bridge("input_set_client_size", false, |bridge| {
        report(
            "input_set_client_size",
            bridge.input().set_client_size(width, height),
        )
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_set_touch_point(x: i32, y: i32) {
    with_bridge("input_set_touch_point", (), |bridge| {
        bridge.input().set_touch_point(x, y)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_release_touch_point() {
    with_bridge("input_release_touch_point", (), |bridge| {
        bridge.input().release_touch_point()
    })
}

/// Publish accumulated input as the next snapshot.
#[unsafe(no_mangle)]
pub extern "C" fn input_update() {
    with_bridge("input_update", (), |bridge| {
        bridge.input().update();
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_set_button_pressed(id: u8, index: i32) {
    with_bridge("input_set_button_pressed", (), |bridge| {
        if let Some(id) = button(id) {
            bridge.input().set_button_pressed(id, slot(index));
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_set_button_released(id: u8, index: i32) {
    with_bridge("input_set_button_released", (), |bridge| {
        if let Some(id) = button(id) {
            bridge.input().set_button_released(id, slot(index));
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_set_accelerometer_data(value: Vector3, index: i32) {
    with_bridge("input_set_accelerometer_data", (), |bridge| {
        bridge
            .input()
            .set_accelerometer_data(vec3(value), slot(index))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_set_gyro_data(value: Vector3, index: i32) {
    with_bridge("input_set_gyro_data", (), |bridge| {
        bridge.input().set_gyro_data(vec3(value), slot(index))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn input_set_stick_axis(id: u8, value: Vector2, index: i32) {
    with_bridge("input_set_stick_axis", (), |bridge| {
        match StickInputId::try_from(id) {
            Ok(id) => bridge
                .input()
                .set_stick_axis(id, Vec2::new(value.x, value.y), slot(index)),
            Err(e) => tracing::trace!("Dropped stick event: {}", e),
        }
    })
}

/// Connect controller slot `index`. Returns its handle, or 0 when the index
/// is out of range or input is not initialized.
#[unsafe(no_mangle)]
pub extern "C" fn input_connect_gamepad(index: i32) -> u64 {
    with_bridge("input_connect_gamepad", 0, |bridge| {
        bridge
            .input()
            .connect_gamepad(slot(index))
            .map_or(0, |handle| handle.get())
    })
}

fn button(id: u8) -> Option<GamepadButtonInputId> {
    GamepadButtonInputId::try_from(id)
        .map_err(|e| tracing::trace!("Dropped button event: {}", e))
        .ok()
}

fn vec3(value: Vector3) -> Vec3 {
    Vec3::new(value.x, value.y, value.z)
}
