//! Device option types forwarded to the embedded core.

use serde::{Deserialize, Serialize};

use crate::UnknownValue;

/// System language reported to guest software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SystemLanguage {
    Japanese,
    #[default]
    AmericanEnglish,
    French,
    German,
    Italian,
    Spanish,
    Chinese,
    Korean,
    Dutch,
    Portuguese,
    Russian,
    Taiwanese,
    BritishEnglish,
    CanadianFrench,
    LatinAmericanSpanish,
    SimplifiedChinese,
    TraditionalChinese,
    BrazilianPortuguese,
}

impl SystemLanguage {
    const TABLE: [Self; 18] = [
        Self::Japanese,
        Self::AmericanEnglish,
        Self::French,
        Self::German,
        Self::Italian,
        Self::Spanish,
        Self::Chinese,
        Self::Korean,
        Self::Dutch,
        Self::Portuguese,
        Self::Russian,
        Self::Taiwanese,
        Self::BritishEnglish,
        Self::CanadianFrench,
        Self::LatinAmericanSpanish,
        Self::SimplifiedChinese,
        Self::TraditionalChinese,
        Self::BrazilianPortuguese,
    ];
}

impl TryFrom<i32> for SystemLanguage {
    type Error = UnknownValue;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::TABLE.get(i).copied())
            .ok_or(UnknownValue::new("SystemLanguage", value))
    }
}

/// Console region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RegionCode {
    Japan,
    #[default]
    Usa,
    Europe,
    Australia,
    China,
    Korea,
    Taiwan,
}

impl TryFrom<i32> for RegionCode {
    type Error = UnknownValue;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Japan),
            1 => Ok(Self::Usa),
            2 => Ok(Self::Europe),
            3 => Ok(Self::Australia),
            4 => Ok(Self::China),
            5 => Ok(Self::Korea),
            6 => Ok(Self::Taiwan),
            _ => Err(UnknownValue::new("RegionCode", value)),
        }
    }
}

/// Options for creating the emulated device context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceOptions {
    /// Map guest memory directly into the host address space
    pub host_mapped: bool,
    /// Native code execution instead of the JIT
    pub use_nce: bool,
    pub system_language: SystemLanguage,
    pub region: RegionCode,
    pub enable_vsync: bool,
    pub docked_mode: bool,
    /// Profiled translation cache
    pub enable_ptc: bool,
    pub enable_internet_access: bool,
    pub time_zone: String,
    pub ignore_missing_services: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            host_mapped: true,
            use_nce: false,
            system_language: SystemLanguage::AmericanEnglish,
            region: RegionCode::Usa,
            enable_vsync: true,
            docked_mode: true,
            enable_ptc: true,
            enable_internet_access: false,
            time_zone: "UTC".to_string(),
            ignore_missing_services: false,
        }
    }
}

/// Per-frame performance figures reported to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct GameStats {
    /// Share of the frame spent inside the core's frame submission (percent)
    pub fifo: f64,
    pub game_fps: f64,
    /// Smoothed frame time in milliseconds
    pub game_time: f64,
}
