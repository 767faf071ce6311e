//! Shared contract types for the EmuBridge host boundary.
//!
//! Everything in this crate is part of the binary contract with the host
//! application: the input id tables, the `#[repr(C)]` capability descriptors
//! and the option enums forwarded to the embedded core.

pub mod constants;
pub mod device;
pub mod graphics;
pub mod ids;
pub mod interop;
pub mod math;

pub use constants::*;
pub use device::{DeviceOptions, GameStats, RegionCode, SystemLanguage};
pub use graphics::{
    AspectRatio, BackendThreading, GraphicsBackend, GraphicsConfiguration,
    RawGraphicsConfiguration,
};
pub use ids::{GamepadButtonInputId, StickInputId};
pub use interop::{
    GetProcAddressFn, NativeGraphicsInterop, SwapBuffersFn, VkContextLoaderFn, VkCreateSurfaceFn,
};
pub use math::{Vector2, Vector3};

/// A raw integer from the host that is not in the named contract table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value {value}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: i64,
}

impl UnknownValue {
    pub fn new(kind: &'static str, value: impl Into<i64>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
