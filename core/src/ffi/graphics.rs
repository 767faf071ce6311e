//! Graphics entry points

use std::sync::Arc;

use emubridge_shared::{
    GraphicsBackend, GraphicsConfiguration, NativeGraphicsInterop, RawGraphicsConfiguration,
    SwapBuffersFn,
};

use super::{report, with_bridge};
use crate::error::{BridgeError, ConfigurationError};
use crate::graphics::SwapCallback;

/// Accept the session graphics configuration.
#[unsafe(no_mangle)]
pub extern "C" fn graphics_initialize(config: RawGraphicsConfiguration) -> bool {
    with_bridge("graphics_initialize", false, |bridge| {
        let result = GraphicsConfiguration::try_from(config)
            .map_err(|e| BridgeError::Configuration(ConfigurationError::UnknownValue(e)))
            .and_then(|config| bridge.graphics_initialize(config));
        report("graphics_initialize", result)
    })
}

/// Validate the interop table and create the native renderer.
///
/// `backend` is 0 for Vulkan and 1 for OpenGL. Nothing in `interop` is read
/// after this call returns.
///
/// # Safety
///
/// Non-null function pointers in `interop` must be callable with their
/// documented signatures, and `vk_required_extensions`, when non-null, must
/// point to `vk_required_extensions_count` null or NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn graphics_initialize_renderer(
    backend: i32,
    interop: NativeGraphicsInterop,
) -> bool {
    with_bridge("graphics_initialize_renderer", false, |bridge| {
        let result = GraphicsBackend::try_from(backend)
            .map_err(|e| BridgeError::Configuration(ConfigurationError::UnknownValue(e)))
            // SAFETY: forwarded from this function's contract.
            .and_then(|backend| unsafe { bridge.graphics_initialize_renderer(backend, &interop) });
        report("graphics_initialize_renderer", result)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn graphics_renderer_set_size(width: i32, height: i32) -> bool {
    with_bridge("graphics_renderer_set_size", false, |bridge| {
        report(
            "graphics_renderer_set_size",
            bridge.graphics().set_size(width, height),
        )
    })
}

/// Block the calling thread in the render loop.
///
/// Returns true when the loop ended through `graphics_renderer_stop`, false
/// when it could not start or the backend was lost.
#[unsafe(no_mangle)]
pub extern "C" fn graphics_renderer_run_loop() -> bool {
    with_bridge("graphics_renderer_run_loop", false, |bridge| {
        report("graphics_renderer_run_loop", bridge.run_loop())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn graphics_renderer_set_vsync(enabled: bool) {
    with_bridge("graphics_renderer_set_vsync", (), |bridge| {
        bridge.graphics().set_vsync(enabled)
    })
}

/// Install the callback run on the render thread after each presented
/// frame. Null clears it.
///
/// # Safety
///
/// `callback` must stay callable from the render thread until replaced.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn graphics_renderer_set_swap_buffer_callback(callback: Option<SwapBuffersFn>) {
    with_bridge("graphics_renderer_set_swap_buffer_callback", (), |bridge| {
        let callback = callback.map(|swap| -> SwapCallback {
            // SAFETY: the host keeps `swap` callable per this function's contract.
            Arc::new(move || unsafe { swap() })
        });
        bridge.graphics().set_swap_buffer_callback(callback)
    })
}

/// Ask the render loop to exit after the frame in flight.
#[unsafe(no_mangle)]
pub extern "C" fn graphics_renderer_stop() {
    with_bridge("graphics_renderer_stop", (), |bridge| {
        bridge.graphics().request_stop()
    })
}

/// Drop the renderer and configuration. Fails while the loop is running.
#[unsafe(no_mangle)]
pub extern "C" fn graphics_teardown() -> bool {
    with_bridge("graphics_teardown", false, |bridge| {
        report("graphics_teardown", bridge.graphics().teardown())
    })
}
