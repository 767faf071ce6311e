//! Immutable per-tick input views handed to the render thread

use glam::{Vec2, Vec3};

use emubridge_shared::{GamepadButtonInputId, MAX_CONTROLLERS, StickInputId};

bitflags::bitflags! {
    /// Held buttons of one controller, one bit per `GamepadButtonInputId` value.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ButtonSet: u32 {
        const A = 1 << 1;
        const B = 1 << 2;
        const X = 1 << 3;
        const Y = 1 << 4;
        const LEFT_STICK = 1 << 5;
        const RIGHT_STICK = 1 << 6;
        const LEFT_SHOULDER = 1 << 7;
        const RIGHT_SHOULDER = 1 << 8;
        const LEFT_TRIGGER = 1 << 9;
        const RIGHT_TRIGGER = 1 << 10;
        const DPAD_UP = 1 << 11;
        const DPAD_DOWN = 1 << 12;
        const DPAD_LEFT = 1 << 13;
        const DPAD_RIGHT = 1 << 14;
        const MINUS = 1 << 15;
        const PLUS = 1 << 16;
        const GUIDE = 1 << 17;
        const MISC1 = 1 << 18;
        const PADDLE1 = 1 << 19;
        const PADDLE2 = 1 << 20;
        const PADDLE3 = 1 << 21;
        const PADDLE4 = 1 << 22;
        const TOUCHPAD = 1 << 23;
        const SINGLE_LEFT_TRIGGER0 = 1 << 24;
        const SINGLE_RIGHT_TRIGGER0 = 1 << 25;
        const SINGLE_LEFT_TRIGGER1 = 1 << 26;
        const SINGLE_RIGHT_TRIGGER1 = 1 << 27;
    }
}

impl ButtonSet {
    /// Bit for a single id. `Unbound` maps to the empty set.
    pub fn from_id(id: GamepadButtonInputId) -> Self {
        match id {
            GamepadButtonInputId::Unbound => Self::empty(),
            id => Self::from_bits_retain(1 << id.value()),
        }
    }

    pub fn is_pressed(self, id: GamepadButtonInputId) -> bool {
        let bit = Self::from_id(id);
        !bit.is_empty() && self.contains(bit)
    }
}

/// Opaque id issued by `connect_gamepad`. Never 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GamepadHandle(pub(crate) u64);

impl GamepadHandle {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// State of one connected controller slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSnapshot {
    pub handle: GamepadHandle,
    pub buttons: ButtonSet,
    pub left_stick: Vec2,
    pub right_stick: Vec2,
    /// Latest accelerometer sample
    pub accelerometer: Vec3,
    /// Latest gyroscope sample
    pub gyro: Vec3,
}

impl ControllerSnapshot {
    pub(crate) fn connected(handle: GamepadHandle) -> Self {
        Self {
            handle,
            buttons: ButtonSet::empty(),
            left_stick: Vec2::ZERO,
            right_stick: Vec2::ZERO,
            accelerometer: Vec3::ZERO,
            gyro: Vec3::ZERO,
        }
    }

    /// Stick vector by id; `Unbound` reads as zero.
    pub fn stick(&self, id: StickInputId) -> Vec2 {
        match id {
            StickInputId::Left => self.left_stick,
            StickInputId::Right => self.right_stick,
            StickInputId::Unbound => Vec2::ZERO,
        }
    }
}

/// The single touch point as published for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Host client-area coordinates
    pub client: Vec2,
    /// Position on the emulated panel, `None` outside the letterboxed area
    pub panel: Option<Vec2>,
}

/// Everything the core reads from input for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSnapshot {
    /// Number of `input_update` calls that produced this snapshot
    pub tick: u64,
    pub controllers: [Option<ControllerSnapshot>; MAX_CONTROLLERS],
    pub touch: Option<TouchPoint>,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            controllers: [None; MAX_CONTROLLERS],
            touch: None,
        }
    }
}

impl InputSnapshot {
    pub fn controller(&self, index: usize) -> Option<&ControllerSnapshot> {
        self.controllers.get(index).and_then(Option::as_ref)
    }

    /// Connected slots with their index
    pub fn connected(&self) -> impl Iterator<Item = (usize, &ControllerSnapshot)> {
        self.controllers
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (i, c)))
    }

    pub fn is_pressed(&self, index: usize, id: GamepadButtonInputId) -> bool {
        self.controller(index)
            .is_some_and(|c| c.buttons.is_pressed(id))
    }
}
