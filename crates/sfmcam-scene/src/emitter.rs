//! Replays resolved samples into a host scene.

use serde::Serialize;
use sfmcam_core::{ImportOptions, ResolvedSample, Result, SfmError};

use crate::binding::{Channel, SceneBinding};

/// Settings for [`emit`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmitOptions {
    pub root_name: String,
    pub camera_name: String,
    /// Multiplies the FOV ratio of each sample to give its lens value.
    pub sensor_width: f64,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self::from(&ImportOptions::default())
    }
}

impl From<&ImportOptions> for EmitOptions {
    fn from(options: &ImportOptions) -> Self {
        Self {
            root_name: options.root_name.clone(),
            camera_name: options.camera_name.clone(),
            sensor_width: options.sensor_width,
        }
    }
}

/// What an [`emit`] call wrote to the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmitSummary {
    /// Number of frames keyed.
    pub frames: usize,
    /// Number of frames that also received a lens sample.
    pub lens_frames: usize,
    pub first_frame: Option<u64>,
    pub last_frame: Option<u64>,
}

/// Creates the marker and camera, then keys one sample per frame.
///
/// `samples` must be strictly increasing in frame; this is checked before the
/// scene is touched.
pub fn emit<B: SceneBinding>(
    samples: &[ResolvedSample],
    scene: &mut B,
    options: &EmitOptions,
) -> Result<EmitSummary> {
    check_order(samples)?;

    let root = scene.create_root_marker(&options.root_name)?;
    let camera = scene.create_camera(&options.camera_name, root)?;

    let mut summary = EmitSummary::default();
    for sample in samples {
        scene.set_current_time(sample.frame)?;
        scene.set_world_transform(camera, sample.world_transform)?;
        let lens = sample.lens(options.sensor_width);
        if let Some(lens) = lens {
            scene.set_lens(camera, lens)?;
        }

        scene.insert_time_sample(camera, Channel::Position, sample.frame)?;
        scene.insert_time_sample(camera, Channel::Rotation, sample.frame)?;
        if lens.is_some() {
            scene.insert_time_sample(camera, Channel::Lens, sample.frame)?;
            summary.lens_frames += 1;
        }

        summary.frames += 1;
        summary.first_frame.get_or_insert(sample.frame);
        summary.last_frame = Some(sample.frame);
    }

    log::debug!(
        "keyed {} frame(s) on '{}', {} with lens",
        summary.frames,
        options.camera_name,
        summary.lens_frames
    );
    Ok(summary)
}

fn check_order(samples: &[ResolvedSample]) -> Result<()> {
    for pair in samples.windows(2) {
        if pair[1].frame <= pair[0].frame {
            return Err(SfmError::UnorderedSamples {
                previous: pair[0].frame,
                next: pair[1].frame,
            });
        }
    }
    Ok(())
}
