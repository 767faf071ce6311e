//! Native graphics interop table filled in by the host.
//!
//! The table is foreign-owned memory: the bridge reads it only while
//! `graphics_initialize_renderer` is executing and never frees it.

use std::ffi::{c_char, c_void};

/// Resolves a named native procedure (`eglGetProcAddress`, `glfwGetProcAddress`, ...).
pub type GetProcAddressFn = unsafe extern "C" fn(name: *const c_char) -> *mut c_void;

/// Loads Vulkan entry points for an instance (`vkGetInstanceProcAddr` shape).
pub type VkContextLoaderFn =
    unsafe extern "C" fn(instance: *mut c_void, name: *const c_char) -> *mut c_void;

/// Creates a presentation surface for a Vulkan instance; returns the
/// `VkSurfaceKHR` handle, or 0 on failure.
pub type VkCreateSurfaceFn = unsafe extern "C" fn(instance: *mut c_void) -> u64;

/// Invoked by the render thread after each presented frame.
pub type SwapBuffersFn = unsafe extern "C" fn();

/// Host-supplied native procedure table.
///
/// Every field is nullable. Which fields are required depends on the chosen
/// backend: Vulkan needs the context loader, the surface creator and a
/// non-empty extension list; OpenGL needs only `gl_get_proc_address`.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct NativeGraphicsInterop {
    pub gl_get_proc_address: Option<GetProcAddressFn>,
    pub vk_native_context_loader: Option<VkContextLoaderFn>,
    pub vk_create_surface: Option<VkCreateSurfaceFn>,
    /// Array of `vk_required_extensions_count` NUL-terminated names
    pub vk_required_extensions: *const *const c_char,
    pub vk_required_extensions_count: i64,
}

impl Default for NativeGraphicsInterop {
    fn default() -> Self {
        Self {
            gl_get_proc_address: None,
            vk_native_context_loader: None,
            vk_create_surface: None,
            vk_required_extensions: std::ptr::null(),
            vk_required_extensions_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_option_fn_is_pointer_sized() {
        // Nullable function pointers must match the header's plain pointers.
        assert_eq!(
            std::mem::size_of::<Option<GetProcAddressFn>>(),
            std::mem::size_of::<*const c_void>()
        );
        assert_eq!(
            std::mem::size_of::<NativeGraphicsInterop>(),
            5 * std::mem::size_of::<u64>()
        );
    }

    #[test]
    fn test_default_is_empty() {
        let interop = NativeGraphicsInterop::default();
        assert!(interop.gl_get_proc_address.is_none());
        assert!(interop.vk_required_extensions.is_null());
        assert_eq!(interop.vk_required_extensions_count, 0);
    }
}
