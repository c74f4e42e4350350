//! Axis conventions and the rotation that converts between them.
//!
//! An [`AxisConvention`] names which signed world axis points "forward" and
//! which points "up". Reconstructions are usually exported with forward `-Z`
//! and up `Y`; Z-up scenes expect forward `Y` and up `Z`.

use std::fmt;
use std::str::FromStr;

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SfmError};

/// A signed coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "X")]
    X,
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "Z")]
    Z,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "-Z")]
    NegZ,
}

impl Axis {
    /// Returns the unit direction vector for this axis.
    #[must_use]
    pub fn direction(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
            Axis::NegX => DVec3::NEG_X,
            Axis::NegY => DVec3::NEG_Y,
            Axis::NegZ => DVec3::NEG_Z,
        }
    }

    /// Returns true if both axes lie on the same line, regardless of sign.
    #[must_use]
    pub fn is_parallel_to(self, other: Axis) -> bool {
        self.direction().dot(other.direction()).abs() > 0.5
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::NegX => "-X",
            Axis::NegY => "-Y",
            Axis::NegZ => "-Z",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing an [`Axis`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAxisError(String);

impl fmt::Display for ParseAxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown axis '{}', expected one of X, Y, Z, -X, -Y, -Z", self.0)
    }
}

impl std::error::Error for ParseAxisError {}

impl FromStr for Axis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" | "+X" => Ok(Axis::X),
            "Y" | "+Y" => Ok(Axis::Y),
            "Z" | "+Z" => Ok(Axis::Z),
            "-X" | "NEG_X" => Ok(Axis::NegX),
            "-Y" | "NEG_Y" => Ok(Axis::NegY),
            "-Z" | "NEG_Z" => Ok(Axis::NegZ),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

/// A forward/up pair describing an orientation convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConvention {
    /// Axis the camera looks along.
    pub forward: Axis,
    /// Axis pointing up.
    pub up: Axis,
}

impl AxisConvention {
    /// Creates a new convention.
    #[must_use]
    pub fn new(forward: Axis, up: Axis) -> Self {
        Self { forward, up }
    }

    /// Forward `-Z`, up `Y`: the convention reconstructions are exported in.
    #[must_use]
    pub fn y_up() -> Self {
        Self::new(Axis::NegZ, Axis::Y)
    }

    /// Forward `Y`, up `Z`: the convention of Z-up scenes.
    #[must_use]
    pub fn z_up() -> Self {
        Self::new(Axis::Y, Axis::Z)
    }

    /// Checks that forward and up are perpendicular.
    pub fn validate(&self) -> Result<()> {
        if self.forward.is_parallel_to(self.up) {
            return Err(SfmError::InvalidAxes {
                forward: self.forward,
                up: self.up,
            });
        }
        Ok(())
    }

    /// Orthonormal basis with columns (forward, up, forward x up).
    fn basis(&self) -> DMat3 {
        let forward = self.forward.direction();
        let up = self.up.direction();
        DMat3::from_cols(forward, up, forward.cross(up))
    }
}

/// Builds the rotation mapping the `from` convention onto the `to` convention.
///
/// The result sends `from.forward` to `to.forward` and `from.up` to `to.up`.
/// It is always a signed permutation matrix with determinant `+1`, so applying
/// it never introduces scale.
pub fn axis_conversion(from: AxisConvention, to: AxisConvention) -> Result<DMat3> {
    from.validate()?;
    to.validate()?;
    if from == to {
        return Ok(DMat3::IDENTITY);
    }
    // The source basis is orthonormal, so its inverse is its transpose.
    Ok(to.basis() * from.basis().transpose())
}
