//! Vector types that cross the host boundary
//!
//! POD (Plain Old Data) `#[repr(C)]` types matching the host header's
//! `Vector2`/`Vector3` structs. Kept free of glam so the contract crate has
//! no math dependency; the core converts them on entry.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Two-component vector (stick axes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Three-component vector (accelerometer and gyroscope samples).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_header() {
        assert_eq!(std::mem::size_of::<Vector2>(), 8);
        assert_eq!(std::mem::size_of::<Vector3>(), 12);
        assert_eq!(std::mem::align_of::<Vector3>(), 4);
    }

    #[test]
    fn test_pod_cast() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let floats: &[f32; 3] = bytemuck::cast_ref(&v);
        assert_eq!(floats, &[1.0, 2.0, 3.0]);
    }
}
