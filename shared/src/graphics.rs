//! Graphics configuration passed once at setup.

use serde::{Deserialize, Serialize};

use crate::UnknownValue;
use crate::constants::ANISOTROPY_AUTO;

/// How the core schedules backend work relative to the GPU thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackendThreading {
    /// Threaded when the renderer prefers it
    #[default]
    Auto,
    Off,
    On,
}

impl BackendThreading {
    /// Whether backend work runs on its own thread for a renderer with the
    /// given preference.
    pub fn resolve(self, renderer_prefers_threading: bool) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Auto => renderer_prefers_threading,
        }
    }
}

impl TryFrom<i32> for BackendThreading {
    type Error = UnknownValue;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Auto),
            1 => Ok(Self::Off),
            2 => Ok(Self::On),
            _ => Err(UnknownValue::new("BackendThreading", value)),
        }
    }
}

/// Output aspect ratio applied by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    Fixed4x3,
    #[default]
    Fixed16x9,
    Fixed16x10,
    Fixed21x9,
    Fixed32x9,
    Stretched,
}

impl AspectRatio {
    /// Width over height.
    ///
    /// `Stretched` fills the surface, but touch mapping still uses the
    /// native 16:9 panel.
    pub fn to_float(self) -> f32 {
        match self {
            Self::Fixed4x3 => 4.0 / 3.0,
            Self::Fixed16x9 => 16.0 / 9.0,
            Self::Fixed16x10 => 16.0 / 10.0,
            Self::Fixed21x9 => 21.0 / 9.0,
            Self::Fixed32x9 => 32.0 / 9.0,
            Self::Stretched => 16.0 / 9.0,
        }
    }
}

impl TryFrom<i32> for AspectRatio {
    type Error = UnknownValue;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Fixed4x3),
            1 => Ok(Self::Fixed16x9),
            2 => Ok(Self::Fixed16x10),
            3 => Ok(Self::Fixed21x9),
            4 => Ok(Self::Fixed32x9),
            5 => Ok(Self::Stretched),
            _ => Err(UnknownValue::new("AspectRatio", value)),
        }
    }
}

/// Native graphics API the renderer is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphicsBackend {
    Vulkan,
    OpenGl,
}

impl std::fmt::Display for GraphicsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vulkan => f.write_str("Vulkan"),
            Self::OpenGl => f.write_str("OpenGL"),
        }
    }
}

impl TryFrom<i32> for GraphicsBackend {
    type Error = UnknownValue;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Vulkan),
            1 => Ok(Self::OpenGl),
            _ => Err(UnknownValue::new("GraphicsBackend", value)),
        }
    }
}

/// Session graphics configuration.
///
/// Numeric ranges are checked by the bridge when the configuration is
/// accepted; this type only guarantees the enumerated fields are known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfiguration {
    /// Internal resolution multiplier (must be > 0)
    pub res_scale: f32,
    /// Anisotropic filtering level, or -1.0 for the core default
    pub max_anisotropy: f32,
    pub fast_gpu_time: bool,
    pub fast_2d_copy: bool,
    pub enable_macro_jit: bool,
    pub enable_macro_hle: bool,
    pub enable_shader_cache: bool,
    pub enable_texture_recompression: bool,
    pub backend_threading: BackendThreading,
    pub aspect_ratio: AspectRatio,
}

impl Default for GraphicsConfiguration {
    fn default() -> Self {
        Self {
            res_scale: 1.0,
            max_anisotropy: ANISOTROPY_AUTO,
            fast_gpu_time: true,
            fast_2d_copy: true,
            enable_macro_jit: false,
            enable_macro_hle: true,
            enable_shader_cache: false,
            enable_texture_recompression: false,
            backend_threading: BackendThreading::Auto,
            aspect_ratio: AspectRatio::Fixed16x9,
        }
    }
}

/// `GraphicsConfiguration` as laid out in the C header.
///
/// Enumerated fields arrive as plain integers so an out-of-table value from
/// the host is a conversion error rather than an invalid Rust enum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct RawGraphicsConfiguration {
    pub res_scale: f32,
    pub max_anisotropy: f32,
    pub fast_gpu_time: bool,
    pub fast_2d_copy: bool,
    pub enable_macro_jit: bool,
    pub enable_macro_hle: bool,
    pub enable_shader_cache: bool,
    pub enable_texture_recompression: bool,
    pub backend_threading: i32,
    pub aspect_ratio: i32,
}

impl TryFrom<RawGraphicsConfiguration> for GraphicsConfiguration {
    type Error = UnknownValue;

    fn try_from(raw: RawGraphicsConfiguration) -> Result<Self, Self::Error> {
        Ok(Self {
            res_scale: raw.res_scale,
            max_anisotropy: raw.max_anisotropy,
            fast_gpu_time: raw.fast_gpu_time,
            fast_2d_copy: raw.fast_2d_copy,
            enable_macro_jit: raw.enable_macro_jit,
            enable_macro_hle: raw.enable_macro_hle,
            enable_shader_cache: raw.enable_shader_cache,
            enable_texture_recompression: raw.enable_texture_recompression,
            backend_threading: BackendThreading::try_from(raw.backend_threading)?,
            aspect_ratio: AspectRatio::try_from(raw.aspect_ratio)?,
        })
    }
}

impl From<GraphicsConfiguration> for RawGraphicsConfiguration {
    fn from(config: GraphicsConfiguration) -> Self {
        Self {
            res_scale: config.res_scale,
            max_anisotropy: config.max_anisotropy,
            fast_gpu_time: config.fast_gpu_time,
            fast_2d_copy: config.fast_2d_copy,
            enable_macro_jit: config.enable_macro_jit,
            enable_macro_hle: config.enable_macro_hle,
            enable_shader_cache: config.enable_shader_cache,
            enable_texture_recompression: config.enable_texture_recompression,
            backend_threading: config.backend_threading as i32,
            aspect_ratio: config.aspect_ratio as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_host_defaults() {
        let config = GraphicsConfiguration::default();
        assert_eq!(config.res_scale, 1.0);
        assert_eq!(config.max_anisotropy, -1.0);
        assert!(config.fast_gpu_time);
        assert!(config.enable_macro_hle);
        assert!(!config.enable_macro_jit);
        assert_eq!(config.backend_threading, BackendThreading::Auto);
        assert_eq!(config.aspect_ratio, AspectRatio::Fixed16x9);
    }

    #[test]
    fn test_raw_conversion_rejects_unknown_enums() {
        let mut raw = RawGraphicsConfiguration::from(GraphicsConfiguration::default());
        raw.aspect_ratio = 6;
        let err = GraphicsConfiguration::try_from(raw).unwrap_err();
        assert_eq!(err.kind, "AspectRatio");
        assert_eq!(err.value, 6);

        raw.aspect_ratio = 5;
        raw.backend_threading = -1;
        let err = GraphicsConfiguration::try_from(raw).unwrap_err();
        assert_eq!(err.kind, "BackendThreading");
    }

    #[test]
    fn test_raw_conversion_preserves_fields() {
        let config = GraphicsConfiguration {
            res_scale: 2.0,
            max_anisotropy: 8.0,
            aspect_ratio: AspectRatio::Stretched,
            backend_threading: BackendThreading::On,
            ..Default::default()
        };
        let back = GraphicsConfiguration::try_from(RawGraphicsConfiguration::from(config)).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_backend_threading_resolve() {
        assert!(BackendThreading::On.resolve(false));
        assert!(!BackendThreading::Off.resolve(true));
        assert!(BackendThreading::Auto.resolve(true));
        assert!(!BackendThreading::Auto.resolve(false));
    }

    #[test]
    fn test_aspect_ratio_values() {
        assert!((AspectRatio::Fixed4x3.to_float() - 1.3333).abs() < 1e-3);
        assert_eq!(AspectRatio::Stretched.to_float(), AspectRatio::Fixed16x9.to_float());
        assert!((AspectRatio::Fixed32x9.to_float() - 3.5555).abs() < 1e-3);
    }

    #[test]
    fn test_backend_from_raw() {
        assert_eq!(GraphicsBackend::try_from(0), Ok(GraphicsBackend::Vulkan));
        assert_eq!(GraphicsBackend::try_from(1), Ok(GraphicsBackend::OpenGl));
        assert!(GraphicsBackend::try_from(2).is_err());
        assert_eq!(GraphicsBackend::OpenGl.to_string(), "OpenGL");
    }
}
