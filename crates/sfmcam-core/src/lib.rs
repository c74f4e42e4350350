//! Core of sfmcam.
//!
//! This crate turns a structure-from-motion document into camera samples:
//! - [`document`] reads views, poses, and intrinsics from the JSON file
//! - [`convention`] and [`axis`] describe how raw rotations map to the scene
//! - [`resolve`] joins the three and orders the result by frame
//!
//! Nothing here touches a scene; see the `sfmcam-scene` crate for that.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Type names like ResolveOptions repeat their module name
#![allow(clippy::module_name_repetitions)]

pub mod axis;
pub mod convention;
pub mod document;
pub mod error;
pub mod options;
pub mod resolve;

pub use axis::{axis_conversion, Axis, AxisConvention};
pub use convention::{euler_xyz, Convention};
pub use document::{parse, parse_str, read_file, Document, Intrinsic, Pose, View};
pub use error::{FieldError, ParseError, Result, SfmError};
pub use options::ImportOptions;
pub use resolve::{resolve, Diagnostics, Gap, Resolution, ResolveOptions, ResolvedSample};

// Re-export glam types for convenience
pub use glam::{DMat3, DMat4, DQuat, DVec3, DVec4, EulerRot};
