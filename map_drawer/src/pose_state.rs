use parking_lot::Mutex;
use slamview_core::math::{CameraPose, RenderMatrix, render_matrix};

/// Latest camera pose, shared between the tracking and render threads.
///
/// A single slot: every [`set_pose`](Self::set_pose) overwrites the previous
/// value. The mutex is held only while the raw pose is copied in or out;
/// the render-matrix conversion runs after the lock is released.
#[derive(Debug, Default)]
pub struct CameraPoseState {
    pose: Mutex<Option<CameraPose>>,
}

impl CameraPoseState {
    /// Create an empty state. [`render_matrix`](Self::render_matrix)
    /// returns identity until the first pose arrives.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored camera-from-world pose.
    pub fn set_pose(&self, pose: CameraPose) {
        *self.pose.lock() = Some(pose);
    }

    /// Forget the stored pose (e.g. after a tracking reset).
    pub fn clear(&self) {
        *self.pose.lock() = None;
    }

    /// Copy of the stored pose, if any.
    pub fn pose(&self) -> Option<CameraPose> {
        *self.pose.lock()
    }

    /// Whether a pose has been set since creation or the last [`clear`](Self::clear).
    pub fn has_pose(&self) -> bool {
        self.pose.lock().is_some()
    }

    /// World-from-camera matrix of the stored pose, or identity if none.
    pub fn render_matrix(&self) -> RenderMatrix {
        let pose = *self.pose.lock();
        match pose {
            Some(pose) => render_matrix(&pose),
            None => RenderMatrix::IDENTITY,
        }
    }
}
