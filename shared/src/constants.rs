//! Centralized constants for the host bridge.
//!
//! Single source of truth for limits used by both the bridge and hosts.

/// Default number of controller slots exposed to the host.
pub const DEFAULT_MAX_CONTROLLERS: usize = 4;

/// Hard ceiling on controller slots (players supported by the core).
pub const MAX_CONTROLLERS: usize = 8;

/// Sentinel anisotropy meaning "let the core pick".
pub const ANISOTROPY_AUTO: f32 = -1.0;

/// Lowest explicit anisotropy level.
pub const MIN_ANISOTROPY: f32 = 1.0;

/// Highest anisotropy level accepted from the host.
///
/// Renderers may report a lower hardware ceiling, in which case the value is
/// clamped when the renderer is created.
pub const MAX_ANISOTROPY: f32 = 16.0;

/// Height of the emulated touch panel in pixels.
pub const PANEL_HEIGHT: u32 = 720;

/// Width of the emulated touch panel in pixels.
pub const PANEL_WIDTH: u32 = 1280;

/// Configuration file name under the base path.
pub const CONFIG_FILE_NAME: &str = "config.toml";
