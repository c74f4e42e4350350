//! Conversion of raw pose rotations into world transforms.

use std::fmt;
use std::str::FromStr;

use glam::{DMat3, DMat4, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::document::Pose;

/// How the nine raw rotation values of a pose become a world orientation.
///
/// The two modes are independent and cannot be combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// Rows of the raw rotation are used as rows of the world block, with
    /// the second and third columns negated to flip the camera Y and Z axes.
    ///
    /// ```text
    /// [ xx  -xy  -xz  x ]
    /// [ yx  -yy  -yz  y ]
    /// [ zx  -zy  -zz  z ]
    /// [ 0    0    0   1 ]
    /// ```
    #[default]
    Legacy,
    /// The raw rotation is transposed into the world block, no flip.
    ///
    /// ```text
    /// [ xx  yx  zx  x ]
    /// [ xy  yy  zy  y ]
    /// [ xz  yz  zz  z ]
    /// [ 0   0   0   1 ]
    /// ```
    Direct,
}

impl Convention {
    /// Builds the world orientation block from a raw rotation.
    #[must_use]
    pub fn orientation(self, rotation: DMat3) -> DMat3 {
        match self {
            Convention::Legacy => rotation * DMat3::from_diagonal(DVec3::new(1.0, -1.0, -1.0)),
            Convention::Direct => rotation.transpose(),
        }
    }

    /// Builds the 4x4 world transform of a pose under this convention.
    #[must_use]
    pub fn world_transform(self, pose: &Pose) -> DMat4 {
        let block = self.orientation(pose.rotation);
        DMat4::from_cols(
            block.x_axis.extend(0.0),
            block.y_axis.extend(0.0),
            block.z_axis.extend(0.0),
            pose.center.extend(1.0),
        )
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Legacy => f.write_str("legacy"),
            Convention::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for Convention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Convention::Legacy),
            "direct" => Ok(Convention::Direct),
            other => Err(format!(
                "unknown convention '{other}', expected 'legacy' or 'direct'"
            )),
        }
    }
}

/// Largest deviation of `m * mᵀ` from the identity.
#[must_use]
pub fn orthonormality_error(m: DMat3) -> f64 {
    let gram = m * m.transpose();
    (gram - DMat3::IDENTITY)
        .to_cols_array()
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// XYZ Euler angles, in radians, of the rotation part of a world transform.
#[must_use]
pub fn euler_xyz(transform: DMat4) -> DVec3 {
    let (_, rotation, _) = transform.to_scale_rotation_translation();
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    DVec3::new(x, y, z)
}
