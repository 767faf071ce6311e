//! EmuBridge Core - host integration layer for an embedded emulation core
//!
//! This crate sits between a host application (mobile shell, desktop
//! frontend) and an emulation core, and owns the pieces of session state
//! that cross that boundary.
//!
//! # Architecture
//!
//! - [`GraphicsBridge`] - Staged native graphics bring-up and the render loop
//! - [`InputRouter`] - Host input events published as per-tick snapshots
//! - [`DeviceManager`] - Device context, application loading and firmware
//! - [`HostBridge`] - One session tying the three to an [`EmulationCore`]
//! - [`ffi`] - The C ABI over a process-wide [`HostBridge`]

pub mod bridge;
pub mod config;
pub mod device;
pub mod emulation;
pub mod error;
pub mod ffi;
pub mod graphics;
pub mod input;
pub mod logging;
#[cfg(test)]
pub mod test_utils;

pub use bridge::HostBridge;
pub use config::BridgeConfig;
pub use device::{DeviceManager, detect_application};
pub use emulation::{
    Application, DeviceContext, EmulationCore, FirmwareSource, FrameStatus, FrameSubmission,
    RenderError, Renderer,
};
pub use error::{BridgeError, ConfigurationError, DeviceError, Result, SequenceState};
pub use graphics::{
    BridgePhase, FrameGeometry, GlCapabilities, GraphicsBridge, NativeCapabilities, RenderStats,
    RendererInfo, RunLoopExit, SwapCallback, VulkanCapabilities,
};
pub use input::{
    ButtonSet, ControllerSnapshot, GamepadHandle, InputRouter, InputSnapshot, TouchPoint,
};

// Re-export the shared contract types for embedding crates
pub use emubridge_shared as shared;
