//! Logical input identifiers shared with the host.
//!
//! These tables are persisted by hosts in their input-mapping files, so the
//! numeric values are part of the contract. New entries may only be appended
//! before the `COUNT` sentinel; existing values are never renumbered.

use crate::UnknownValue;

/// Logical gamepad button.
///
/// Triggers are listed here even though cores usually treat them as analog
/// axes; the host reports them as digital presses.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButtonInputId {
    Unbound = 0,
    A = 1,
    B = 2,
    X = 3,
    Y = 4,
    LeftStick = 5,
    RightStick = 6,
    LeftShoulder = 7,
    RightShoulder = 8,
    LeftTrigger = 9,
    RightTrigger = 10,
    DpadUp = 11,
    DpadDown = 12,
    DpadLeft = 13,
    DpadRight = 14,
    Minus = 15,
    Plus = 16,
    Guide = 17,
    Misc1 = 18,
    /// Xbox Elite paddles
    Paddle1 = 19,
    Paddle2 = 20,
    Paddle3 = 21,
    Paddle4 = 22,
    /// PS5 touchpad click
    Touchpad = 23,
    /// Virtual triggers for a single sideways joycon
    SingleLeftTrigger0 = 24,
    SingleRightTrigger0 = 25,
    SingleLeftTrigger1 = 26,
    SingleRightTrigger1 = 27,
}

impl GamepadButtonInputId {
    /// Number of ids in the table (the C header's `Count` sentinel).
    pub const COUNT: usize = 28;

    /// `Back` shares its value with `Minus`.
    pub const BACK: Self = Self::Minus;
    /// `Start` shares its value with `Plus`.
    pub const START: Self = Self::Plus;

    /// Every bindable id, in table order (excludes `Unbound`).
    pub const ALL: [Self; Self::COUNT - 1] = [
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::LeftStick,
        Self::RightStick,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftTrigger,
        Self::RightTrigger,
        Self::DpadUp,
        Self::DpadDown,
        Self::DpadLeft,
        Self::DpadRight,
        Self::Minus,
        Self::Plus,
        Self::Guide,
        Self::Misc1,
        Self::Paddle1,
        Self::Paddle2,
        Self::Paddle3,
        Self::Paddle4,
        Self::Touchpad,
        Self::SingleLeftTrigger0,
        Self::SingleRightTrigger0,
        Self::SingleLeftTrigger1,
        Self::SingleRightTrigger1,
    ];

    /// Raw contract value.
    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for GamepadButtonInputId {
    type Error = UnknownValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value == 0 {
            return Ok(Self::Unbound);
        }
        Self::ALL
            .get(value as usize - 1)
            .copied()
            .ok_or(UnknownValue {
                kind: "GamepadButtonInputId",
                value: value as i64,
            })
    }
}

/// Analog stick identifier.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickInputId {
    Unbound = 0,
    Left = 1,
    Right = 2,
}

impl StickInputId {
    /// Number of ids in the table (the C header's `StickCount` sentinel).
    pub const COUNT: usize = 3;

    /// Raw contract value.
    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for StickInputId {
    type Error = UnknownValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unbound),
            1 => Ok(Self::Left),
            2 => Ok(Self::Right),
            _ => Err(UnknownValue {
                kind: "StickInputId",
                value: value as i64,
            }),
        }
    }
}
