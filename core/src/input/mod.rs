//! Input event router
//!
//! Host input events arrive on the UI thread at arbitrary times. They are
//! accumulated in one locked state block and published as an immutable
//! [`InputSnapshot`] by [`InputRouter::update`]; the render thread only ever
//! reads published snapshots, so a frame never sees half of an update.

mod snapshot;
mod touch;


use std::sync::Arc;

use glam::{Vec2, Vec3};
use parking_lot::Mutex;

use emubridge_shared::{
    AspectRatio, DEFAULT_MAX_CONTROLLERS, GamepadButtonInputId, MAX_CONTROLLERS, StickInputId,
};

use crate::error::{BridgeError, ConfigurationError, Result, SequenceState};

pub use snapshot::{ButtonSet, ControllerSnapshot, GamepadHandle, InputSnapshot, TouchPoint};
pub use touch::panel_position;

use touch::TouchLatch;

struct InputState {
    /// Host client area; `None` until `initialize`
    client_size: Option<(u32, u32)>,
    aspect_ratio: AspectRatio,
    controllers: [Option<ControllerSnapshot>; MAX_CONTROLLERS],
    touch: TouchLatch,
    tick: u64,
    next_handle: u64,
    published: Arc<InputSnapshot>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            client_size: None,
            aspect_ratio: AspectRatio::default(),
            controllers: [None; MAX_CONTROLLERS],
            touch: TouchLatch::default(),
            tick: 0,
            next_handle: 1,
            published: Arc::new(InputSnapshot::default()),
        }
    }
}

impl InputState {
    /// Apply `f` to the controller at `index`, dropping the event otherwise.
    fn with_controller(&mut self, event: &str, index: usize, f: impl FnOnce(&mut ControllerSnapshot)) {
        match self.controllers.get_mut(index).and_then(Option::as_mut) {
            Some(controller) => f(controller),
            None => tracing::trace!(
                "Dropped {}: {}",
                event,
                BridgeError::InputTargetUnresolved(index)
            ),
        }
    }
}

/// Thread-safe store of pending host input and the last published snapshot.
pub struct InputRouter {
    max_controllers: usize,
    state: Mutex<InputState>,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self {
            max_controllers: DEFAULT_MAX_CONTROLLERS,
            state: Mutex::new(InputState::default()),
        }
    }
}

impl InputRouter {
    /// Router with `max_controllers` slots (1..=[`MAX_CONTROLLERS`]).
    pub fn new(max_controllers: usize) -> Result<Self, ConfigurationError> {
        if !(1..=MAX_CONTROLLERS).contains(&max_controllers) {
            return Err(ConfigurationError::ControllerCount(max_controllers));
        }
        Ok(Self {
            max_controllers,
            ..Self::default()
        })
    }

    pub fn max_controllers(&self) -> usize {
        self.max_controllers
    }

    /// Establish the client coordinate space. Only valid once.
    pub fn initialize(&self, width: i32, height: i32) -> Result<()> {
        let size = client_size(width, height)?;
        let mut state = self.state.lock();
        if state.client_size.is_some() {
            tracing::warn!("input_initialize rejected: input is already initialized");
            return Err(BridgeError::StateSequence {
                operation: "input_initialize",
                state: SequenceState::InputInitialized,
            });
        }

        state.client_size = Some(size);
        tracing::info!("Input initialized ({}x{} client area)", size.0, size.1);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().client_size.is_some()
    }

    /// Update the client coordinate space used for touch mapping.
    ///
    /// Only valid after [`initialize`](Self::initialize).
    pub fn set_client_size(&self, width: i32, height: i32) -> Result<()> {
        let size = client_size(width, height)?;
        let mut state = self.state.lock();
        if state.client_size.is_none() {
            tracing::warn!("input_set_client_size rejected: input is not initialized");
            return Err(BridgeError::StateSequence {
                operation: "input_set_client_size",
                state: SequenceState::InputUninitialized,
            });
        }
        state.client_size = Some(size);
        tracing::debug!("Input client area {}x{}", size.0, size.1);
        Ok(())
    }

    /// Aspect ratio of the emulated screen inside the client area.
    pub fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        self.state.lock().aspect_ratio = aspect_ratio;
    }

    /// Register the controller slot `index`.
    ///
    /// Reconnecting a connected slot returns its existing handle. Returns
    /// `None` before [`initialize`](Self::initialize) or for indices at or
    /// beyond `max_controllers`.
    pub fn connect_gamepad(&self, index: usize) -> Option<GamepadHandle> {
        if index >= self.max_controllers {
            tracing::warn!(
                "Gamepad index {} out of range (max {})",
                index,
                self.max_controllers
            );
            return None;
        }

        let mut state = self.state.lock();
        if state.client_size.is_none() {
            tracing::warn!("input_connect_gamepad called before input_initialize");
            return None;
        }

        if let Some(existing) = &state.controllers[index] {
            return Some(existing.handle);
        }

        let handle = GamepadHandle(state.next_handle);
        state.next_handle += 1;
        state.controllers[index] = Some(ControllerSnapshot::connected(handle));
        tracing::info!("Gamepad connected at index {} (handle {})", index, handle.get());
        Some(handle)
    }

    pub fn set_button_pressed(&self, id: GamepadButtonInputId, index: usize) {
        self.set_button(id, index, true);
    }

    pub fn set_button_released(&self, id: GamepadButtonInputId, index: usize) {
        self.set_button(id, index, false);
    }

    fn set_button(&self, id: GamepadButtonInputId, index: usize, pressed: bool) {
        let bit = ButtonSet::from_id(id);
        if bit.is_empty() {
            tracing::trace!("Dropped unbound button event for index {}", index);
            return;
        }

        self.state.lock().with_controller("button event", index, |c| {
            c.buttons.set(bit, pressed);
        });
    }

    /// Overwrite a stick vector. No deadzone or clamping is applied.
    pub fn set_stick_axis(&self, id: StickInputId, value: Vec2, index: usize) {
        self.state.lock().with_controller("stick event", index, |c| match id {
            StickInputId::Left => c.left_stick = value,
            StickInputId::Right => c.right_stick = value,
            StickInputId::Unbound => {
                tracing::trace!("Dropped unbound stick event for index {}", index)
            }
        });
    }

    pub fn set_accelerometer_data(&self, value: Vec3, index: usize) {
        self.state
            .lock()
            .with_controller("accelerometer sample", index, |c| c.accelerometer = value);
    }

    pub fn set_gyro_data(&self, value: Vec3, index: usize) {
        self.state
            .lock()
            .with_controller("gyro sample", index, |c| c.gyro = value);
    }

    /// Press or move the touch point, in client coordinates.
    pub fn set_touch_point(&self, x: i32, y: i32) {
        self.state.lock().touch.press(Vec2::new(x as f32, y as f32));
    }

    pub fn release_touch_point(&self) {
        self.state.lock().touch.release();
    }

    /// Publish the accumulated state as the next snapshot.
    pub fn update(&self) -> Arc<InputSnapshot> {
        let mut state = self.state.lock();
        state.tick += 1;

        let aspect = state.aspect_ratio.to_float();
        let client_size = state.client_size;
        let touch = state.touch.publish().map(|client| TouchPoint {
            client,
            panel: client_size.and_then(|(w, h)| panel_position(client, w, h, aspect)),
        });

        let snapshot = Arc::new(InputSnapshot {
            tick: state.tick,
            controllers: state.controllers,
            touch,
        });
        state.published = Arc::clone(&snapshot);
        snapshot
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> Arc<InputSnapshot> {
        Arc::clone(&self.state.lock().published)
    }
}

fn client_size(width: i32, height: i32) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(ConfigurationError::Size {
            width: width.into(),
            height: height.into(),
        }
        .into()),
    }
}
