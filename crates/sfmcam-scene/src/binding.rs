//! The interface a host scene exposes to the emitter.

use std::fmt;

use glam::DMat4;
use serde::{Deserialize, Serialize};
use sfmcam_core::Result;

/// An animatable property of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// World position.
    Position,
    /// World orientation.
    Rotation,
    /// Lens (focal length in scene units).
    Lens,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Position => f.write_str("position"),
            Channel::Rotation => f.write_str("rotation"),
            Channel::Lens => f.write_str("lens"),
        }
    }
}

/// A host scene able to hold an animated camera.
///
/// Implementations own the scene graph; the emitter only drives it through
/// these calls, one at a time and in frame order.
pub trait SceneBinding {
    /// Identifies an object created in the host scene.
    type Handle: Copy;

    /// Creates an empty marker object at the scene origin.
    fn create_root_marker(&mut self, name: &str) -> Result<Self::Handle>;

    /// Creates a camera parented to `parent`.
    fn create_camera(&mut self, name: &str, parent: Self::Handle) -> Result<Self::Handle>;

    /// Moves the host time cursor.
    fn set_current_time(&mut self, frame: u64) -> Result<()>;

    /// Places an object in world space.
    fn set_world_transform(&mut self, object: Self::Handle, transform: DMat4) -> Result<()>;

    /// Sets a camera lens, in scene units.
    fn set_lens(&mut self, camera: Self::Handle, focal_length: f64) -> Result<()>;

    /// Records the current value of `channel` as a time sample at `frame`.
    fn insert_time_sample(
        &mut self,
        object: Self::Handle,
        channel: Channel,
        frame: u64,
    ) -> Result<()>;
}
