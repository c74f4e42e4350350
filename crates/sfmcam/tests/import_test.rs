//! End-to-end import tests for sfmcam.
//!
//! Documents are built with `serde_json::json!` and run through the whole
//! parse, resolve, emit pipeline into a [`RecordingScene`].

use serde_json::{json, Value};
use sfmcam::*;

fn identity_pose(pose_id: u64, center: [f64; 3]) -> Value {
    json!({
        "poseId": pose_id.to_string(),
        "pose": {
            "transform": {
                "rotation": ["1", "0", "0", "0", "1", "0", "0", "0", "1"],
                "center": center.map(|c| c.to_string()),
            },
            "locked": "0"
        }
    })
}

fn view(frame: u64, pose_id: u64, intrinsic_id: u64) -> Value {
    json!({
        "viewId": (1000 + frame).to_string(),
        "poseId": pose_id.to_string(),
        "intrinsicId": intrinsic_id.to_string(),
        "metadata": { "Frame": frame.to_string() }
    })
}

fn scenario() -> Value {
    json!({
        "views": [view(5, 1, 1), view(2, 2, 1)],
        "poses": [identity_pose(1, [1.0, 2.0, 3.0]), identity_pose(2, [4.0, 5.0, 6.0])],
        "intrinsics": [{ "intrinsicId": "1", "width": "36", "pxFocalLength": "50" }]
    })
}

fn bytes(doc: &Value) -> Vec<u8> {
    serde_json::to_vec(doc).unwrap()
}

#[test]
fn test_example_scenario() {
    let options = ImportOptions::default();
    let resolution = load_samples(&bytes(&scenario()), &options).unwrap();

    let frames: Vec<u64> = resolution.samples.iter().map(|s| s.frame).collect();
    assert_eq!(frames, vec![2, 5]);
    for sample in &resolution.samples {
        assert!((sample.h_fov_ratio.unwrap() - 50.0 / 36.0).abs() < 1e-12);
    }
}

#[test]
fn test_identity_round_trip_per_convention() {
    let doc = json!({
        "views": [view(0, 1, 1)],
        "poses": [identity_pose(1, [1.0, 2.0, 3.0])],
        "intrinsics": []
    });
    let same_axes = ImportOptions::new().with_target_axes(AxisConvention::y_up());

    let legacy = load_samples(&bytes(&doc), &same_axes).unwrap().samples[0];
    assert_eq!(legacy.translation(), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(
        DMat3::from_mat4(legacy.world_transform),
        DMat3::from_diagonal(DVec3::new(1.0, -1.0, -1.0))
    );

    let direct_options = same_axes.with_convention(Convention::Direct);
    let direct = load_samples(&bytes(&doc), &direct_options).unwrap().samples[0];
    assert_eq!(direct.translation(), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(DMat3::from_mat4(direct.world_transform), DMat3::IDENTITY);
}

#[test]
fn test_import_into_recording_scene() {
    let mut scene = RecordingScene::new();
    let options = ImportOptions::default();
    let summary = import_bytes(&bytes(&scenario()), &options, &mut scene).unwrap();

    assert_eq!(summary.emitted.frames, 2);
    assert_eq!(summary.emitted.lens_frames, 2);
    assert_eq!(summary.emitted.first_frame, Some(2));
    assert_eq!(summary.emitted.last_frame, Some(5));
    assert!(summary.diagnostics.is_clean());

    let root = scene.find(&options.root_name).unwrap();
    assert_eq!(root.kind, NodeKind::Marker);
    let camera = scene.find(&options.camera_name).unwrap();
    assert_eq!(camera.kind, NodeKind::Camera);
    assert!(camera.parent.is_some());

    let tracks = &camera.tracks;
    assert_eq!(tracks.len(Channel::Position), 2);
    assert_eq!(tracks.len(Channel::Rotation), 2);
    assert_eq!(tracks.len(Channel::Lens), 2);
    assert_eq!(tracks.position[0].frame, 2);
    assert!((tracks.lens[0].value - 50.0).abs() < 1e-9);

    // Y-up center (4, 5, 6) lands at (4, -6, 5) in the default Z-up scene.
    assert!((tracks.position[0].value - DVec3::new(4.0, -6.0, 5.0)).length() < 1e-12);
}

#[test]
fn test_dangling_pose_skipped_without_abort() {
    let doc = json!({
        "views": [view(1, 99, 1), view(2, 1, 1), view(3, 99, 1), view(4, 2, 1)],
        "poses": [identity_pose(1, [0.0, 0.0, 0.0]), identity_pose(2, [1.0, 0.0, 0.0])],
        "intrinsics": [{ "intrinsicId": 1, "width": 36, "pxFocalLength": 50 }]
    });
    let mut scene = RecordingScene::new();
    let summary = import_bytes(&bytes(&doc), &ImportOptions::default(), &mut scene).unwrap();

    assert_eq!(summary.emitted.frames, 4 - 2);
    assert_eq!(summary.diagnostics.dangling_poses.len(), 2);
    assert_eq!(summary.diagnostics.dangling_poses[0].missing_id, 99);
    let camera = scene.find("Camera Meshroom").unwrap();
    let frames: Vec<u64> = camera.tracks.position.iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![2, 4]);
}

#[test]
fn test_missing_intrinsic_keeps_position_only() {
    let doc = json!({
        "views": [view(1, 1, 1), view(2, 1, 8)],
        "poses": [identity_pose(1, [0.0, 0.0, 0.0])],
        "intrinsics": [{ "intrinsicId": 1, "width": 36, "pxFocalLength": 50 }]
    });
    let mut scene = RecordingScene::new();
    let summary = import_bytes(&bytes(&doc), &ImportOptions::default(), &mut scene).unwrap();

    assert_eq!(summary.emitted.frames, 2);
    assert_eq!(summary.emitted.lens_frames, 1);
    assert_eq!(summary.diagnostics.missing_intrinsics.len(), 1);

    let tracks = &scene.find("Camera Meshroom").unwrap().tracks;
    assert_eq!(tracks.position.len(), 2);
    assert_eq!(tracks.rotation.len(), 2);
    assert_eq!(tracks.lens.len(), 1);
    assert_eq!(tracks.lens[0].frame, 1);
}

#[test]
fn test_parse_error_leaves_scene_untouched() {
    let mut scene = RecordingScene::new();
    let result = import_bytes(b"{ not json", &ImportOptions::default(), &mut scene);
    assert!(matches!(result, Err(SfmError::Parse(ParseError::Syntax(_)))));
    assert!(scene.is_empty());

    let doc = json!({
        "views": [view(1, 1, 1)],
        "poses": [{ "poseId": 1, "pose": { "transform": {
            "rotation": ["1", "0", "0", "0", "1", "0", "0", "0"],
            "center": ["0", "0", "0"] } } }]
    });
    let result = import_bytes(&bytes(&doc), &ImportOptions::default(), &mut scene);
    assert!(matches!(result, Err(SfmError::Parse(ParseError::InvalidValue { .. }))));
    assert!(scene.is_empty());
}

#[test]
fn test_malformed_orphan_pose_is_ignored() {
    let broken = json!({ "poseId": "7", "pose": { "transform": {
        "rotation": ["1", "0"],
        "center": ["0", "0", "0"] } } });
    let doc = json!({
        "views": [view(1, 1, 1)],
        "poses": [identity_pose(1, [0.0, 0.0, 0.0]), broken],
        "intrinsics": [{ "intrinsicId": 1, "width": 36, "pxFocalLength": 50 }]
    });
    let resolution = load_samples(&bytes(&doc), &ImportOptions::default()).unwrap();
    assert_eq!(resolution.samples.len(), 1);
    assert!(resolution.diagnostics.is_clean());

    let mut referenced = doc.clone();
    referenced["views"] = json!([view(1, 1, 1), view(2, 7, 1)]);
    let mut scene = RecordingScene::new();
    match import_bytes(&bytes(&referenced), &ImportOptions::default(), &mut scene) {
        Err(SfmError::Parse(ParseError::InvalidValue { path, .. })) => {
            assert_eq!(path, "poses[1].pose.transform.rotation");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(scene.is_empty());
}

#[test]
fn test_invalid_sensor_width_leaves_scene_untouched() {
    let mut scene = RecordingScene::new();
    let options = ImportOptions::new().with_sensor_width(0.0);
    let result = import_bytes(&bytes(&scenario()), &options, &mut scene);
    assert!(matches!(result, Err(SfmError::InvalidSensorWidth(_))));
    assert!(scene.is_empty());
}

#[test]
fn test_invalid_axes_leave_scene_untouched() {
    let mut scene = RecordingScene::new();
    let options = ImportOptions::new().with_source_axes(AxisConvention::new(Axis::X, Axis::NegX));
    let result = import_bytes(&bytes(&scenario()), &options, &mut scene);
    assert!(matches!(result, Err(SfmError::InvalidAxes { .. })));
    assert!(scene.is_empty());
}

#[test]
fn test_import_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cameras.sfm");
    std::fs::write(&path, bytes(&scenario())).unwrap();

    let mut scene = RecordingScene::new();
    let summary = import_file(&path, &ImportOptions::default(), &mut scene).unwrap();
    assert_eq!(summary.emitted.frames, 2);

    let missing = import_file(dir.path().join("nope.sfm"), &ImportOptions::default(), &mut scene);
    assert!(matches!(missing, Err(SfmError::IoError(_))));
}

#[test]
fn test_importing_twice_into_same_scene_fails() {
    let mut scene = RecordingScene::new();
    let options = ImportOptions::default();
    import_bytes(&bytes(&scenario()), &options, &mut scene).unwrap();
    let again = import_bytes(&bytes(&scenario()), &options, &mut scene);
    assert!(matches!(again, Err(SfmError::SceneError(_))));

    let renamed = options.with_names("origin 2", "camera 2");
    assert!(import_bytes(&bytes(&scenario()), &renamed, &mut scene).is_ok());
    assert_eq!(scene.len(), 4);
}
