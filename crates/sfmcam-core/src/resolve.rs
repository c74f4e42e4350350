//! Joins views with their poses and intrinsics into an ordered sample list.

use glam::{DMat3, DMat4, DVec3};
use serde::Serialize;

use crate::convention::{euler_xyz, orthonormality_error, Convention};
use crate::document::Document;
use crate::error::ParseError;

/// Rotations deviating from orthonormal by more than this are reported.
pub const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Parameters of a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    /// Mapping of raw pose rotations to world orientation.
    pub convention: Convention,
    /// Applied on the left of every raw world transform.
    pub axis_conversion: DMat4,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            convention: Convention::default(),
            axis_conversion: DMat4::IDENTITY,
        }
    }
}

impl ResolveOptions {
    /// Creates options for a convention with no axis conversion.
    #[must_use]
    pub fn new(convention: Convention) -> Self {
        Self {
            convention,
            ..Default::default()
        }
    }

    /// Sets the axis conversion from a rotation block.
    #[must_use]
    pub fn with_axis_conversion(mut self, rotation: DMat3) -> Self {
        self.axis_conversion = DMat4::from_mat3(rotation);
        self
    }
}

/// A camera placement at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedSample {
    pub frame: u64,
    pub world_transform: DMat4,
    /// Focal length over sensor width; `None` when the view's intrinsic is
    /// unknown.
    pub h_fov_ratio: Option<f64>,
}

impl ResolvedSample {
    /// Camera position in world space.
    #[must_use]
    pub fn translation(&self) -> DVec3 {
        self.world_transform.w_axis.truncate()
    }

    /// Orientation as XYZ Euler angles in radians.
    #[must_use]
    pub fn rotation_euler(&self) -> DVec3 {
        euler_xyz(self.world_transform)
    }

    /// Lens value in the unit of `sensor_width`.
    #[must_use]
    pub fn lens(&self, sensor_width: f64) -> Option<f64> {
        self.h_fov_ratio.map(|ratio| ratio * sensor_width)
    }
}

/// A view whose reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    /// Position of the view in the document.
    pub view_index: usize,
    pub frame: u64,
    /// The id that had no match.
    pub missing_id: u64,
}

/// Non-fatal findings of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Views dropped because their pose id has no pose.
    pub dangling_poses: Vec<Gap>,
    /// Views kept without a lens because their intrinsic id has no intrinsic.
    pub missing_intrinsics: Vec<Gap>,
    /// Frames claimed by more than one resolved view.
    pub duplicate_frames: Vec<u64>,
    /// Pose ids whose rotation is not orthonormal.
    pub non_orthonormal_poses: Vec<u64>,
}

impl Diagnostics {
    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling_poses.is_empty()
            && self.missing_intrinsics.is_empty()
            && self.duplicate_frames.is_empty()
            && self.non_orthonormal_poses.is_empty()
    }
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    /// Samples in strictly increasing frame order.
    pub samples: Vec<ResolvedSample>,
    pub diagnostics: Diagnostics,
}

/// Resolves every view of a document into a camera sample.
///
/// Views are visited in file order. A view whose pose is missing is dropped;
/// a view whose intrinsic is missing keeps its placement without a lens. The
/// result is stably sorted by frame, and when several views share a frame the
/// one appearing last in the file is kept.
///
/// Fails only when a view refers to a pose listed in
/// [`Document::malformed_poses`]. Unreferenced malformed poses are ignored.
pub fn resolve(
    document: &Document,
    options: &ResolveOptions,
) -> std::result::Result<Resolution, ParseError> {
    let mut diagnostics = Diagnostics::default();
    let mut samples = Vec::with_capacity(document.views.len());

    for (view_index, view) in document.views.iter().enumerate() {
        if let Some(err) = document.malformed_poses.get(&view.pose_id) {
            return Err(err.clone().into());
        }
        let Some(pose) = document.pose(view.pose_id) else {
            log::debug!(
                "view {view_index} (frame {}) references unknown pose {}, skipped",
                view.frame,
                view.pose_id
            );
            diagnostics.dangling_poses.push(Gap {
                view_index,
                frame: view.frame,
                missing_id: view.pose_id,
            });
            continue;
        };

        if orthonormality_error(pose.rotation) > ORTHONORMAL_TOLERANCE
            && !diagnostics.non_orthonormal_poses.contains(&pose.pose_id)
        {
            diagnostics.non_orthonormal_poses.push(pose.pose_id);
        }

        let h_fov_ratio = match document.intrinsic(view.intrinsic_id) {
            Some(intrinsic) => Some(intrinsic.h_fov_ratio()),
            None => {
                log::debug!(
                    "view {view_index} (frame {}) references unknown intrinsic {}",
                    view.frame,
                    view.intrinsic_id
                );
                diagnostics.missing_intrinsics.push(Gap {
                    view_index,
                    frame: view.frame,
                    missing_id: view.intrinsic_id,
                });
                None
            }
        };

        samples.push(ResolvedSample {
            frame: view.frame,
            world_transform: options.axis_conversion
                * options.convention.world_transform(pose),
            h_fov_ratio,
        });
    }

    samples.sort_by_key(|s| s.frame);
    collapse_duplicate_frames(&mut samples, &mut diagnostics.duplicate_frames);

    if !diagnostics.is_clean() {
        log::warn!(
            "{} view(s) without pose, {} without intrinsic, \
             {} duplicate frame(s), {} non-orthonormal pose(s)",
            diagnostics.dangling_poses.len(),
            diagnostics.missing_intrinsics.len(),
            diagnostics.duplicate_frames.len(),
            diagnostics.non_orthonormal_poses.len()
        );
    }

    Ok(Resolution {
        samples,
        diagnostics,
    })
}

/// Keeps the last sample of every run of equal frames.
fn collapse_duplicate_frames(samples: &mut Vec<ResolvedSample>, duplicates: &mut Vec<u64>) {
    let mut kept: Vec<ResolvedSample> = Vec::with_capacity(samples.len());
    for sample in samples.drain(..) {
        match kept.last_mut() {
            Some(last) if last.frame == sample.frame => {
                if duplicates.last() != Some(&sample.frame) {
                    duplicates.push(sample.frame);
                }
                *last = sample;
            }
            _ => kept.push(sample),
        }
    }
    *samples = kept;
}
