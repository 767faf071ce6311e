//! Render surface geometry staged by the host thread

use std::sync::Arc;

/// Host callback invoked after each presented frame.
pub type SwapCallback = Arc<dyn Fn() + Send + Sync>;

/// Surface geometry the core renders a frame with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            vsync: true,
        }
    }
}

/// Changes to push to the renderer at a frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameChanges {
    pub geometry: FrameGeometry,
    pub resized: bool,
    pub vsync_changed: bool,
}

/// Staged geometry plus what the renderer last received.
///
/// Host calls only touch `staged`; the render thread diffs it against
/// `applied` once per frame.
#[derive(Default)]
pub(crate) struct SurfaceState {
    staged: FrameGeometry,
    applied: Option<FrameGeometry>,
    swap_callback: Option<SwapCallback>,
}

impl SurfaceState {
    /// Stage a new size. Returns false when it matches the staged size.
    pub fn set_size(&mut self, width: u32, height: u32) -> bool {
        if self.staged.width == width && self.staged.height == height {
            return false;
        }
        self.staged.width = width;
        self.staged.height = height;
        true
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.staged.vsync = enabled;
    }

    pub fn set_swap_callback(&mut self, callback: Option<SwapCallback>) {
        self.swap_callback = callback;
    }

    pub fn has_swap_callback(&self) -> bool {
        self.swap_callback.is_some()
    }

    pub fn staged(&self) -> FrameGeometry {
        self.staged
    }

    /// Force the next frame to push the full geometry (new renderer).
    pub fn invalidate(&mut self) {
        self.applied = None;
    }

    /// Forget the session's geometry. The host's swap callback stays.
    pub fn reset(&mut self) {
        self.staged = FrameGeometry::default();
        self.applied = None;
    }

    /// Consume staged changes for the frame about to start.
    pub fn begin_frame(&mut self) -> (FrameChanges, Option<SwapCallback>) {
        let staged = self.staged;
        let resized = staged.width != 0
            && staged.height != 0
            && self
                .applied
                .is_none_or(|a| a.width != staged.width || a.height != staged.height);
        let vsync_changed = self.applied.is_none_or(|a| a.vsync != staged.vsync);

        // A zero size never reaches the renderer, so keep the old applied size.
        let mut applied = self.applied.unwrap_or(staged);
        if resized {
            applied.width = staged.width;
            applied.height = staged.height;
        }
        applied.vsync = staged.vsync;
        self.applied = Some(applied);

        let changes = FrameChanges {
            geometry: applied,
            resized,
            vsync_changed,
        };
        (changes, self.swap_callback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_pushes_everything() {
        let mut surface = SurfaceState::default();
        surface.set_size(1280, 720);

        let (changes, callback) = surface.begin_frame();
        assert!(changes.resized);
        assert!(changes.vsync_changed);
        assert_eq!(changes.geometry.width, 1280);
        assert!(callback.is_none());

        let (changes, _) = surface.begin_frame();
        assert!(!changes.resized);
        assert!(!changes.vsync_changed);
    }

    #[test]
    fn test_unchanged_size_is_noop() {
        let mut surface = SurfaceState::default();
        assert!(surface.set_size(800, 600));
        assert!(!surface.set_size(800, 600));
        assert!(surface.set_size(800, 601));
    }

    #[test]
    fn test_resize_between_frames() {
        let mut surface = SurfaceState::default();
        surface.set_size(800, 600);
        surface.begin_frame();

        surface.set_size(1024, 768);
        surface.set_vsync(false);
        let (changes, _) = surface.begin_frame();
        assert!(changes.resized);
        assert!(changes.vsync_changed);
        assert_eq!(
            changes.geometry,
            FrameGeometry {
                width: 1024,
                height: 768,
                vsync: false
            }
        );
    }

    #[test]
    fn test_zero_size_not_pushed() {
        let mut surface = SurfaceState::default();
        let (changes, _) = surface.begin_frame();
        assert!(!changes.resized);
        assert!(changes.vsync_changed);
    }

    #[test]
    fn test_reset_keeps_swap_callback() {
        let mut surface = SurfaceState::default();
        surface.set_size(1280, 720);
        surface.set_vsync(false);
        surface.set_swap_callback(Some(Arc::new(|| {})));
        surface.begin_frame();

        surface.reset();
        assert_eq!(surface.staged(), FrameGeometry::default());
        assert!(surface.has_swap_callback());
        let (changes, _) = surface.begin_frame();
        assert!(!changes.resized);
        assert!(changes.vsync_changed);
    }

    #[test]
    fn test_invalidate_repushes() {
        let mut surface = SurfaceState::default();
        surface.set_size(640, 480);
        surface.begin_frame();
        surface.invalidate();

        let (changes, _) = surface.begin_frame();
        assert!(changes.resized);
        assert!(changes.vsync_changed);
    }
}
