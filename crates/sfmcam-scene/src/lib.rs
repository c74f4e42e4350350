//! Scene side of sfmcam.
//!
//! This crate connects resolved camera samples to a host scene:
//! - [`SceneBinding`] trait the host implements
//! - [`emit`] drives a binding through the samples in frame order
//! - [`RecordingScene`] in-memory binding used for exports and tests

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod binding;
pub mod emitter;
pub mod recording;

pub use binding::{Channel, SceneBinding};
pub use emitter::{emit, EmitOptions, EmitSummary};
pub use recording::{Keyframe, Node, NodeId, NodeKind, RecordingScene, Tracks};
