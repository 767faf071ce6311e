//! Borrowed views over the host's native interop table
//!
//! [`NativeCapabilities`] is what the core sees of the host's procedure
//! addresses. The lifetime ties every view to the `graphics_initialize_renderer`
//! call that produced it, and the raw function pointers stay private, so the
//! core can use them while building its context but cannot keep them.

use std::ffi::{CStr, c_void};
use std::marker::PhantomData;
use std::ptr::NonNull;

use emubridge_shared::{
    GetProcAddressFn, GraphicsBackend, NativeGraphicsInterop, VkContextLoaderFn, VkCreateSurfaceFn,
};

use crate::error::{BridgeError, Result};

/// Validated capability set for one backend.
#[derive(Debug)]
pub enum NativeCapabilities<'a> {
    Vulkan(VulkanCapabilities<'a>),
    OpenGl(GlCapabilities<'a>),
}

impl<'a> NativeCapabilities<'a> {
    /// Validate `interop` against the requirements of `backend`.
    ///
    /// Vulkan needs the context loader, the surface creator and a non-empty
    /// extension list; OpenGL needs only the procedure resolver. Extension
    /// names are copied out so nothing in `interop` is read after this call.
    ///
    /// # Safety
    ///
    /// Every non-null function pointer in `interop` must be callable with the
    /// documented signature for the lifetime `'a`, and when
    /// `vk_required_extensions` is non-null it must point to
    /// `vk_required_extensions_count` readable pointers, each null or pointing
    /// to a NUL-terminated string.
    pub unsafe fn from_interop(
        backend: GraphicsBackend,
        interop: &'a NativeGraphicsInterop,
    ) -> Result<Self> {
        match backend {
            GraphicsBackend::Vulkan => {
                let context_loader = interop
                    .vk_native_context_loader
                    .ok_or(missing(backend, "vk_native_context_loader"))?;
                let create_surface = interop
                    .vk_create_surface
                    .ok_or(missing(backend, "vk_create_surface"))?;
                // SAFETY: forwarded from this function's contract.
                let required_extensions = unsafe { read_extension_names(interop)? };

                Ok(Self::Vulkan(VulkanCapabilities {
                    context_loader,
                    create_surface,
                    required_extensions,
                    _interop: PhantomData,
                }))
            }
            GraphicsBackend::OpenGl => {
                let get_proc_address = interop
                    .gl_get_proc_address
                    .ok_or(missing(backend, "gl_get_proc_address"))?;

                Ok(Self::OpenGl(GlCapabilities {
                    get_proc_address,
                    _interop: PhantomData,
                }))
            }
        }
    }

    /// Backend these capabilities were validated for
    pub fn backend(&self) -> GraphicsBackend {
        match self {
            Self::Vulkan(_) => GraphicsBackend::Vulkan,
            Self::OpenGl(_) => GraphicsBackend::OpenGl,
        }
    }
}

fn missing(backend: GraphicsBackend, field: &'static str) -> BridgeError {
    BridgeError::InteropMissing { backend, field }
}

/// Copy the host's extension name array into owned strings.
///
/// # Safety
///
/// See [`NativeCapabilities::from_interop`].
unsafe fn read_extension_names(interop: &NativeGraphicsInterop) -> Result<Vec<String>> {
    let backend = GraphicsBackend::Vulkan;
    let count = usize::try_from(interop.vk_required_extensions_count)
        .ok()
        .filter(|&count| count > 0)
        .ok_or(missing(backend, "vk_required_extensions_count"))?;

    if interop.vk_required_extensions.is_null() {
        return Err(missing(backend, "vk_required_extensions"));
    }

    // SAFETY: the caller guarantees `count` readable pointers at this address.
    let entries = unsafe { std::slice::from_raw_parts(interop.vk_required_extensions, count) };

    let mut names = Vec::with_capacity(count);
    for (i, &entry) in entries.iter().enumerate() {
        if entry.is_null() {
            tracing::warn!("Vulkan extension entry {} is null", i);
            return Err(missing(backend, "vk_required_extensions"));
        }
        // SAFETY: non-null entries are NUL-terminated per the caller's contract.
        let name = unsafe { CStr::from_ptr(entry) };
        match name.to_str() {
            Ok(name) => names.push(name.to_owned()),
            Err(e) => {
                tracing::warn!("Vulkan extension entry {} is not UTF-8: {}", i, e);
                return Err(missing(backend, "vk_required_extensions"));
            }
        }
    }

    Ok(names)
}

/// Vulkan procedures and instance requirements supplied by the host.
pub struct VulkanCapabilities<'a> {
    context_loader: VkContextLoaderFn,
    create_surface: VkCreateSurfaceFn,
    required_extensions: Vec<String>,
    _interop: PhantomData<&'a NativeGraphicsInterop>,
}

impl VulkanCapabilities<'_> {
    /// Instance extensions the host surface needs (e.g. `VK_KHR_surface`)
    pub fn required_extensions(&self) -> &[String] {
        &self.required_extensions
    }

    /// Resolve an instance-level entry point through the host loader.
    ///
    /// # Safety
    ///
    /// `instance` must be null or a live `VkInstance` created by the caller.
    pub unsafe fn instance_proc_address(
        &self,
        instance: *mut c_void,
        name: &CStr,
    ) -> Option<NonNull<c_void>> {
        // SAFETY: loader validity comes from `from_interop`; instance from the caller.
        NonNull::new(unsafe { (self.context_loader)(instance, name.as_ptr()) })
    }

    /// Ask the host to create a presentation surface for `instance`.
    ///
    /// Returns `None` when the host reports failure (a null handle).
    ///
    /// # Safety
    ///
    /// `instance` must be a live `VkInstance` created with
    /// [`required_extensions`](Self::required_extensions) enabled.
    pub unsafe fn create_surface(&self, instance: *mut c_void) -> Option<u64> {
        // SAFETY: callback validity comes from `from_interop`; instance from the caller.
        let surface = unsafe { (self.create_surface)(instance) };
        (surface != 0).then_some(surface)
    }
}

impl std::fmt::Debug for VulkanCapabilities<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanCapabilities")
            .field("required_extensions", &self.required_extensions)
            .finish_non_exhaustive()
    }
}

/// OpenGL procedure resolver supplied by the host.
pub struct GlCapabilities<'a> {
    get_proc_address: GetProcAddressFn,
    _interop: PhantomData<&'a NativeGraphicsInterop>,
}

impl GlCapabilities<'_> {
    /// Resolve a GL entry point. The host context must be current on the
    /// calling thread.
    pub fn proc_address(&self, name: &CStr) -> Option<NonNull<c_void>> {
        // SAFETY: resolver validity comes from `from_interop`; `name` is NUL-terminated.
        NonNull::new(unsafe { (self.get_proc_address)(name.as_ptr()) })
    }
}

impl std::fmt::Debug for GlCapabilities<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlCapabilities").finish_non_exhaustive()
    }
}
