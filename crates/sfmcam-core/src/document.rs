//! SfM document parsing.
//!
//! An SfM document is a JSON object with three arrays: `views`, `poses`, and
//! `intrinsics`. Exporters write most numbers as decimal strings, so every
//! numeric field here accepts either a JSON number or a string holding one.
//!
//! Parsing is a pure read. Nothing outside the returned [`Document`] is
//! touched, and the first malformed view or intrinsic aborts with a
//! [`ParseError`] naming its path. A pose whose transform cannot be read is
//! kept aside in [`Document::malformed_poses`]; it only fails an import once
//! a view refers to it.

use std::collections::HashMap;
use std::path::Path;

use glam::{DMat3, DVec3};
use serde_json::{Map, Value};

use crate::error::{FieldError, ParseError, Result};

/// One captured image, linking a frame to a pose and an intrinsic.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Frame number taken from the view metadata.
    pub frame: u64,
    /// Pose this view refers to. May be absent from the pose set.
    pub pose_id: u64,
    /// Intrinsic this view refers to. May be absent from the intrinsic set.
    pub intrinsic_id: u64,
    /// Exporter view id, when present.
    pub view_id: Option<String>,
    /// Source image path, when present.
    pub path: Option<String>,
}

/// A solved camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pose_id: u64,
    /// Rotation block. Built from the nine row-major values of the file, so
    /// `rotation.row(0)` is `(xx, xy, xz)`.
    pub rotation: DMat3,
    /// Camera center in world units.
    pub center: DVec3,
}

/// Optical parameters shared by views taken with the same camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intrinsic {
    pub intrinsic_id: u64,
    /// Sensor width. Pixels when read from `width`, millimetres when read
    /// from `sensorWidth`; only the ratio to the focal length matters.
    pub sensor_width: f64,
    /// Focal length in the same unit as `sensor_width`.
    pub focal_length: f64,
}

impl Intrinsic {
    /// Focal length divided by sensor width.
    #[must_use]
    pub fn h_fov_ratio(&self) -> f64 {
        self.focal_length / self.sensor_width
    }
}

/// A parsed SfM document.
///
/// Views keep their file order. Poses and intrinsics are keyed by id; a later
/// entry with an id already seen replaces the earlier one, whether or not
/// either of them is readable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub views: Vec<View>,
    pub poses: HashMap<u64, Pose>,
    pub intrinsics: HashMap<u64, Intrinsic>,
    /// Poses with a readable id but a broken transform, with the first
    /// problem found in each.
    pub malformed_poses: HashMap<u64, FieldError>,
}

impl Document {
    /// Looks up a pose by id.
    #[must_use]
    pub fn pose(&self, pose_id: u64) -> Option<&Pose> {
        self.poses.get(&pose_id)
    }

    /// Looks up an intrinsic by id.
    #[must_use]
    pub fn intrinsic(&self, intrinsic_id: u64) -> Option<&Intrinsic> {
        self.intrinsics.get(&intrinsic_id)
    }
}

/// Parses an SfM document from raw bytes.
pub fn parse(bytes: &[u8]) -> std::result::Result<Document, ParseError> {
    let root: Value = serde_json::from_slice(bytes)?;
    parse_value(&root)
}

/// Parses an SfM document from a string.
pub fn parse_str(text: &str) -> std::result::Result<Document, ParseError> {
    parse(text.as_bytes())
}

/// Reads and parses an SfM document from disk.
///
/// The whole file is read before parsing starts; no handle outlives the read.
pub fn read_file(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = std::fs::read(path.as_ref())?;
    log::debug!(
        "read {} bytes from {}",
        bytes.len(),
        path.as_ref().display()
    );
    Ok(parse(&bytes)?)
}

fn parse_value(root: &Value) -> std::result::Result<Document, ParseError> {
    let root = root.as_object().ok_or_else(|| ParseError::InvalidValue {
        path: "$".to_string(),
        reason: "document root is not an object".to_string(),
    })?;

    let views = required_array(root, "views")?
        .iter()
        .enumerate()
        .map(|(i, v)| parse_view(v, &format!("views[{i}]")))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut poses = HashMap::new();
    let mut malformed_poses = HashMap::new();
    for (i, p) in optional_array(root, "poses")?.iter().enumerate() {
        let path = format!("poses[{i}]");
        let pose_id = id(field(p, "poseId", &path)?, &format!("{path}.poseId"))?;
        let redefined = match parse_pose(p, pose_id, &path) {
            Ok(pose) => {
                let was_malformed = malformed_poses.remove(&pose_id).is_some();
                poses.insert(pose_id, pose).is_some() || was_malformed
            }
            Err(err) => {
                log::debug!("pose {pose_id} kept aside: {err}");
                let was_valid = poses.remove(&pose_id).is_some();
                malformed_poses.insert(pose_id, err).is_some() || was_valid
            }
        };
        if redefined {
            log::debug!("pose id {pose_id} redefined at {path}");
        }
    }

    let mut intrinsics = HashMap::new();
    for (i, it) in optional_array(root, "intrinsics")?.iter().enumerate() {
        let intrinsic = parse_intrinsic(it, &format!("intrinsics[{i}]"))?;
        if intrinsics
            .insert(intrinsic.intrinsic_id, intrinsic)
            .is_some()
        {
            log::debug!(
                "intrinsic id {} redefined at intrinsics[{i}]",
                intrinsic.intrinsic_id
            );
        }
    }

    Ok(Document {
        views,
        poses,
        intrinsics,
        malformed_poses,
    })
}

fn parse_view(value: &Value, path: &str) -> std::result::Result<View, ParseError> {
    let frame_path = format!("{path}.metadata.Frame");
    let frame = field(value, "metadata", path)
        .and_then(|metadata| field(metadata, "Frame", &format!("{path}.metadata")))
        .and_then(|frame| integer(frame, &frame_path))?;
    let frame = u64::try_from(frame).map_err(|_| ParseError::InvalidValue {
        path: frame_path,
        reason: format!("frame {frame} is negative"),
    })?;

    Ok(View {
        frame,
        pose_id: id(field(value, "poseId", path)?, &format!("{path}.poseId"))?,
        intrinsic_id: id(
            field(value, "intrinsicId", path)?,
            &format!("{path}.intrinsicId"),
        )?,
        view_id: optional_text(value, "viewId"),
        path: optional_text(value, "path"),
    })
}

fn parse_pose(
    value: &Value,
    pose_id: u64,
    path: &str,
) -> std::result::Result<Pose, FieldError> {
    let transform_path = format!("{path}.pose.transform");
    let transform = field(value, "pose", path)
        .and_then(|pose| field(pose, "transform", &format!("{path}.pose")))?;

    let r: [f64; 9] = fixed_numbers(transform, "rotation", &transform_path)?;
    let c: [f64; 3] = fixed_numbers(transform, "center", &transform_path)?;

    Ok(Pose {
        pose_id,
        // DMat3 is column-major, the file is row-major.
        rotation: DMat3::from_cols_array(&r).transpose(),
        center: DVec3::from_array(c),
    })
}

fn parse_intrinsic(value: &Value, path: &str) -> std::result::Result<Intrinsic, ParseError> {
    let intrinsic_id = id(
        field(value, "intrinsicId", path)?,
        &format!("{path}.intrinsicId"),
    )?;

    // Pixel pair first; newer exports may only carry the metric pair.
    let (sensor_width, focal_length, width_path, focal_path) =
        if let Some(px_focal) = value.get("pxFocalLength") {
            let width_path = format!("{path}.width");
            let focal_path = format!("{path}.pxFocalLength");
            (
                number(field(value, "width", path)?, &width_path)?,
                number(px_focal, &focal_path)?,
                width_path,
                focal_path,
            )
        } else if let (Some(sensor), Some(focal)) =
            (value.get("sensorWidth"), value.get("focalLength"))
        {
            let width_path = format!("{path}.sensorWidth");
            let focal_path = format!("{path}.focalLength");
            (
                number(sensor, &width_path)?,
                number(focal, &focal_path)?,
                width_path,
                focal_path,
            )
        } else {
            return Err(FieldError::Missing(format!("{path}.pxFocalLength")).into());
        };

    positive(sensor_width, &width_path)?;
    positive(focal_length, &focal_path)?;

    Ok(Intrinsic {
        intrinsic_id,
        sensor_width,
        focal_length,
    })
}

fn field<'a>(
    value: &'a Value,
    key: &str,
    path: &str,
) -> std::result::Result<&'a Value, FieldError> {
    value
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| FieldError::Missing(format!("{path}.{key}")))
}

fn required_array<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> std::result::Result<&'a Vec<Value>, FieldError> {
    root.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| FieldError::Missing(key.to_string()))
}

fn optional_array<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> std::result::Result<&'a [Value], FieldError> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(FieldError::Invalid {
            path: key.to_string(),
            reason: "expected an array".to_string(),
        }),
    }
}

fn optional_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a float from a JSON number or a numeric string.
fn number(value: &Value, path: &str) -> std::result::Result<f64, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::Missing(path.to_string()))
}

/// Reads a signed integer from a JSON integer or an integer string.
fn integer(value: &Value, path: &str) -> std::result::Result<i64, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FieldError::Missing(path.to_string()))
}

/// Reads an id: a non-negative integer or an integer string.
fn id(value: &Value, path: &str) -> std::result::Result<u64, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FieldError::Missing(path.to_string()))
}

fn fixed_numbers<const N: usize>(
    parent: &Value,
    key: &str,
    parent_path: &str,
) -> std::result::Result<[f64; N], FieldError> {
    let path = format!("{parent_path}.{key}");
    let items = field(parent, key, parent_path)?
        .as_array()
        .ok_or_else(|| FieldError::Missing(path.clone()))?;
    if items.len() != N {
        return Err(FieldError::Invalid {
            path,
            reason: format!("expected {N} components, found {}", items.len()),
        });
    }

    let mut out = [0.0; N];
    for (i, (slot, item)) in out.iter_mut().zip(items).enumerate() {
        *slot = number(item, &format!("{path}[{i}]"))?;
    }
    Ok(out)
}

fn positive(value: f64, path: &str) -> std::result::Result<(), FieldError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::Invalid {
            path: path.to_string(),
            reason: format!("expected a positive value, found {value}"),
        })
    }
}
