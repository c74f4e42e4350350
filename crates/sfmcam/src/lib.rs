//! sfmcam: import structure-from-motion camera tracks as animated cameras.
//!
//! A reconstruction file lists views (one per frame), solved poses, and
//! camera intrinsics. sfmcam joins them into a frame-ordered list of camera
//! placements and keys them onto a camera in a host scene.
//!
//! # Quick Start
//!
//! ```no_run
//! use sfmcam::*;
//!
//! fn main() -> Result<()> {
//!     let mut scene = RecordingScene::new();
//!     let summary = import_file("cameras.sfm", &ImportOptions::default(), &mut scene)?;
//!     println!("keyed {} frames", summary.emitted.frames);
//!     println!("{}", scene.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! - [`parse`] reads the document; a malformed view or intrinsic aborts here
//! - [`resolve`] builds world transforms and sorts by frame; missing poses and
//!   intrinsics are reported in [`Diagnostics`], never as errors, while a
//!   malformed pose aborts only if a view refers to it
//! - [`emit`] replays the samples through a [`SceneBinding`]
//!
//! The scene is only touched once the first two steps have succeeded.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]

use std::path::Path;

use serde::Serialize;

// Re-export core types
pub use sfmcam_core::{
    axis_conversion, euler_xyz, parse, parse_str, read_file, resolve, Axis, AxisConvention,
    Convention, DMat3, DMat4, DQuat, DVec3, DVec4, Diagnostics, Document, EulerRot, FieldError,
    Gap, ImportOptions, Intrinsic, ParseError, Pose, Resolution, ResolveOptions, ResolvedSample,
    Result, SfmError, View,
};

// Re-export scene types
pub use sfmcam_scene::{
    emit, Channel, EmitOptions, EmitSummary, Keyframe, Node, NodeId, NodeKind, RecordingScene,
    SceneBinding, Tracks,
};

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    /// What was keyed into the scene.
    pub emitted: EmitSummary,
    /// Views skipped or degraded during resolution.
    pub diagnostics: Diagnostics,
}

/// Parses and resolves a document without touching any scene.
pub fn load_samples(bytes: &[u8], options: &ImportOptions) -> Result<Resolution> {
    let resolve_options = options.resolve_options()?;
    let document = parse(bytes)?;
    log::debug!(
        "parsed {} view(s), {} pose(s), {} intrinsic(s)",
        document.views.len(),
        document.poses.len(),
        document.intrinsics.len()
    );
    Ok(resolve(&document, &resolve_options)?)
}

/// Imports a document held in memory into `scene`.
pub fn import_bytes<B: SceneBinding>(
    bytes: &[u8],
    options: &ImportOptions,
    scene: &mut B,
) -> Result<ImportSummary> {
    let Resolution {
        samples,
        diagnostics,
    } = load_samples(bytes, options)?;

    let emitted = emit(&samples, scene, &EmitOptions::from(options))?;
    log::info!(
        "imported {} camera sample(s), {} view(s) without pose",
        emitted.frames,
        diagnostics.dangling_poses.len()
    );

    Ok(ImportSummary {
        emitted,
        diagnostics,
    })
}

/// Imports an SfM file into `scene`.
pub fn import_file<B: SceneBinding>(
    path: impl AsRef<Path>,
    options: &ImportOptions,
    scene: &mut B,
) -> Result<ImportSummary> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) != Some("sfm") {
        log::warn!("{} does not have the .sfm extension", path.display());
    }
    let bytes = std::fs::read(path)?;
    import_bytes(&bytes, options, scene)
}
