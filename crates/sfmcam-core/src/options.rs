//! Configuration options for an import.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::axis::{axis_conversion, AxisConvention};
use crate::convention::Convention;
use crate::error::{Result, SfmError};
use crate::resolve::ResolveOptions;

/// Options controlling how a reconstruction is imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Mapping of raw pose rotations to world orientation.
    pub convention: Convention,

    /// Forward/up convention of the reconstruction.
    pub source_axes: AxisConvention,

    /// Forward/up convention of the destination scene.
    pub target_axes: AxisConvention,

    /// Camera sensor width used to turn FOV ratios into lens values.
    pub sensor_width: f64,

    /// Name of the marker object the camera is parented to.
    pub root_name: String,

    /// Name of the animated camera.
    pub camera_name: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            convention: Convention::Legacy,
            source_axes: AxisConvention::y_up(),
            target_axes: AxisConvention::z_up(),
            sensor_width: 36.0,
            root_name: "Meshroom sfm origin".to_string(),
            camera_name: "Camera Meshroom".to_string(),
        }
    }
}

impl ImportOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sets the rotation convention.
    #[must_use]
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }

    /// Sets the source axis convention.
    #[must_use]
    pub fn with_source_axes(mut self, axes: AxisConvention) -> Self {
        self.source_axes = axes;
        self
    }

    /// Sets the destination axis convention.
    #[must_use]
    pub fn with_target_axes(mut self, axes: AxisConvention) -> Self {
        self.target_axes = axes;
        self
    }

    /// Sets the sensor width.
    #[must_use]
    pub fn with_sensor_width(mut self, sensor_width: f64) -> Self {
        self.sensor_width = sensor_width;
        self
    }

    /// Sets the names of the marker and camera objects.
    #[must_use]
    pub fn with_names(
        mut self,
        root_name: impl Into<String>,
        camera_name: impl Into<String>,
    ) -> Self {
        self.root_name = root_name.into();
        self.camera_name = camera_name.into();
        self
    }

    /// Derives resolver options, validating both axis conventions and the
    /// sensor width.
    pub fn resolve_options(&self) -> Result<ResolveOptions> {
        if !(self.sensor_width.is_finite() && self.sensor_width > 0.0) {
            return Err(SfmError::InvalidSensorWidth(self.sensor_width));
        }
        let rotation = axis_conversion(self.source_axes, self.target_axes)?;
        Ok(ResolveOptions::new(self.convention).with_axis_conversion(rotation))
    }
}
