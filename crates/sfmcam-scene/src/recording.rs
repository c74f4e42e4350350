//! An in-memory scene that records what the emitter does.
//!
//! [`RecordingScene`] stands in for a real host: it keeps a flat list of
//! nodes, a time cursor, and per-channel keyframe tracks, and can dump the
//! whole thing as JSON.

use glam::{DMat4, DVec3};
use serde::Serialize;
use sfmcam_core::{euler_xyz, Result, SfmError};

use crate::binding::{Channel, SceneBinding};

/// Index of a node in a [`RecordingScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Marker,
    Camera,
}

/// A value recorded at a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keyframe<T> {
    pub frame: u64,
    pub value: T,
}

/// Keyframes of one node, one track per channel, each sorted by frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tracks {
    pub position: Vec<Keyframe<DVec3>>,
    /// XYZ Euler angles in radians.
    pub rotation: Vec<Keyframe<DVec3>>,
    pub lens: Vec<Keyframe<f64>>,
}

impl Tracks {
    /// Number of keyframes on a channel.
    #[must_use]
    pub fn len(&self, channel: Channel) -> usize {
        match channel {
            Channel::Position => self.position.len(),
            Channel::Rotation => self.rotation.len(),
            Channel::Lens => self.lens.len(),
        }
    }

    /// Returns true if no channel holds a keyframe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty() && self.rotation.is_empty() && self.lens.is_empty()
    }
}

/// An object in the recorded scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Current world placement.
    pub world_transform: DMat4,
    /// Current lens, cameras only.
    pub lens: Option<f64>,
    pub tracks: Tracks,
}

impl Node {
    fn new(name: &str, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            parent,
            world_transform: DMat4::IDENTITY,
            lens: None,
            tracks: Tracks::default(),
        }
    }
}

/// A host scene kept in memory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingScene {
    nodes: Vec<Node>,
    current_frame: u64,
}

impl RecordingScene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current time cursor.
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Returns all nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns a node by handle.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Finds a node by name.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the scene holds no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serializes the scene as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn add(&mut self, node: Node) -> Result<NodeId> {
        if self.nodes.iter().any(|n| n.name == node.name) {
            return Err(SfmError::SceneError(format!(
                "object '{}' already exists",
                node.name
            )));
        }
        self.nodes.push(node);
        Ok(NodeId(self.nodes.len() - 1))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| SfmError::SceneError(format!("no object with handle {}", id.0)))
    }
}

/// Inserts a keyframe, replacing one already at the same frame.
fn upsert<T>(track: &mut Vec<Keyframe<T>>, frame: u64, value: T) {
    match track.binary_search_by_key(&frame, |k| k.frame) {
        Ok(i) => track[i].value = value,
        Err(i) => track.insert(i, Keyframe { frame, value }),
    }
}

impl SceneBinding for RecordingScene {
    type Handle = NodeId;

    fn create_root_marker(&mut self, name: &str) -> Result<NodeId> {
        self.add(Node::new(name, NodeKind::Marker, None))
    }

    fn create_camera(&mut self, name: &str, parent: NodeId) -> Result<NodeId> {
        if self.get(parent).is_none() {
            return Err(SfmError::SceneError(format!(
                "parent handle {} does not exist",
                parent.0
            )));
        }
        self.add(Node::new(name, NodeKind::Camera, Some(parent)))
    }

    fn set_current_time(&mut self, frame: u64) -> Result<()> {
        self.current_frame = frame;
        Ok(())
    }

    fn set_world_transform(&mut self, object: NodeId, transform: DMat4) -> Result<()> {
        self.node_mut(object)?.world_transform = transform;
        Ok(())
    }

    fn set_lens(&mut self, camera: NodeId, focal_length: f64) -> Result<()> {
        let node = self.node_mut(camera)?;
        if node.kind != NodeKind::Camera {
            return Err(SfmError::SceneError(format!(
                "'{}' is not a camera",
                node.name
            )));
        }
        node.lens = Some(focal_length);
        Ok(())
    }

    fn insert_time_sample(&mut self, object: NodeId, channel: Channel, frame: u64) -> Result<()> {
        let node = self.node_mut(object)?;
        match channel {
            Channel::Position => {
                let position = node.world_transform.w_axis.truncate();
                upsert(&mut node.tracks.position, frame, position);
            }
            Channel::Rotation => {
                let rotation = euler_xyz(node.world_transform);
                upsert(&mut node.tracks.rotation, frame, rotation);
            }
            Channel::Lens => {
                let lens = node.lens.ok_or_else(|| {
                    SfmError::SceneError(format!("'{}' has no lens to key", node.name))
                })?;
                upsert(&mut node.tracks.lens, frame, lens);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_create_nodes() {
        let mut scene = RecordingScene::new();
        let root = scene.create_root_marker("origin").unwrap();
        let camera = scene.create_camera("cam", root).unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(camera).unwrap().parent, Some(root));
        assert_eq!(scene.find("origin").unwrap().kind, NodeKind::Marker);
        assert!(scene.create_root_marker("origin").is_err());
    }

    #[test]
    fn test_keyframes_capture_current_values() {
        let mut scene = RecordingScene::new();
        let root = scene.create_root_marker("origin").unwrap();
        let camera = scene.create_camera("cam", root).unwrap();

        scene.set_current_time(7).unwrap();
        scene
            .set_world_transform(camera, DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        scene.set_lens(camera, 50.0).unwrap();
        scene.insert_time_sample(camera, Channel::Position, 7).unwrap();
        scene.insert_time_sample(camera, Channel::Rotation, 7).unwrap();
        scene.insert_time_sample(camera, Channel::Lens, 7).unwrap();

        let tracks = &scene.get(camera).unwrap().tracks;
        assert_eq!(scene.current_frame(), 7);
        assert_eq!(tracks.position[0].value, DVec3::new(1.0, 2.0, 3.0));
        assert!(tracks.rotation[0].value.length() < 1e-12);
        assert_eq!(tracks.lens[0].value, 50.0);
    }

    #[test]
    fn test_keyframe_at_same_frame_is_replaced() {
        let mut scene = RecordingScene::new();
        let root = scene.create_root_marker("origin").unwrap();
        let camera = scene.create_camera("cam", root).unwrap();

        for (frame, x) in [(5, 1.0), (2, 2.0), (5, 3.0)] {
            scene
                .set_world_transform(camera, DMat4::from_translation(DVec3::new(x, 0.0, 0.0)))
                .unwrap();
            scene.insert_time_sample(camera, Channel::Position, frame).unwrap();
        }

        let track = &scene.get(camera).unwrap().tracks.position;
        assert_eq!(track.len(), 2);
        assert_eq!(track[0].frame, 2);
        assert_eq!(track[1].frame, 5);
        assert_eq!(track[1].value.x, 3.0);
    }

    #[test]
    fn test_lens_errors() {
        let mut scene = RecordingScene::new();
        let root = scene.create_root_marker("origin").unwrap();
        let camera = scene.create_camera("cam", root).unwrap();
        assert!(scene.set_lens(root, 35.0).is_err());
        assert!(scene.insert_time_sample(camera, Channel::Lens, 0).is_err());
    }

    #[test]
    fn test_to_json() {
        let mut scene = RecordingScene::new();
        scene.create_root_marker("origin").unwrap();
        let json = scene.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["name"], "origin");
        assert_eq!(value["nodes"][0]["kind"], "marker");
    }

    proptest! {
        #[test]
        fn tracks_stay_sorted_and_unique(frames in prop::collection::vec(0u64..64, 0..40)) {
            let mut scene = RecordingScene::new();
            let root = scene.create_root_marker("origin").unwrap();
            let camera = scene.create_camera("cam", root).unwrap();
            for frame in &frames {
                scene.insert_time_sample(camera, Channel::Position, *frame).unwrap();
            }

            let track = &scene.get(camera).unwrap().tracks.position;
            let mut expected = frames.clone();
            expected.sort_unstable();
            expected.dedup();
            let recorded: Vec<u64> = track.iter().map(|k| k.frame).collect();
            prop_assert_eq!(recorded, expected);
        }
    }
}
