//! Touch latching and client-to-panel mapping

use glam::Vec2;

use emubridge_shared::{PANEL_HEIGHT, PANEL_WIDTH};

/// Single touch point with one-snapshot tap latching.
///
/// A press that is released before the next publish is still reported once,
/// so quick taps are not lost between two updates.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TouchLatch {
    position: Option<Vec2>,
    held: bool,
    unpublished: bool,
}

impl TouchLatch {
    pub fn press(&mut self, position: Vec2) {
        self.position = Some(position);
        self.held = true;
        self.unpublished = true;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    /// Position to publish for this tick, consuming the tap latch.
    pub fn publish(&mut self) -> Option<Vec2> {
        let published = if self.held || self.unpublished {
            self.position
        } else {
            None
        };

        self.unpublished = false;
        if !self.held {
            self.position = None;
        }
        published
    }
}

/// Map a client-area point onto the emulated touch panel.
///
/// The emulated screen is fitted into the client area at `aspect_ratio` and
/// centered, leaving letterbox bars on one axis. Points on the bars have no
/// panel position.
pub fn panel_position(point: Vec2, client_width: u32, client_height: u32, aspect_ratio: f32) -> Option<Vec2> {
    if client_width == 0 || client_height == 0 || aspect_ratio <= 0.0 {
        return None;
    }

    let client = Vec2::new(client_width as f32, client_height as f32);
    let screen = if client.x > client.y * aspect_ratio {
        Vec2::new(client.y * aspect_ratio, client.y)
    } else {
        Vec2::new(client.x, client.x / aspect_ratio)
    };

    let start = (client - screen) * 0.5;
    let end = start + screen;
    if point.x < start.x || point.y < start.y || point.x >= end.x || point.y >= end.y {
        return None;
    }

    let panel = Vec2::new(PANEL_WIDTH as f32, PANEL_HEIGHT as f32);
    Some((point - start) / screen * panel)
}
