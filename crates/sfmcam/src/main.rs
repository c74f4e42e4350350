use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use sfmcam::{import_file, Axis, AxisConvention, Convention, ImportOptions, RecordingScene};

/// Import a structure-from-motion camera track (cameras.sfm) as an animated camera.
#[derive(Debug, Parser)]
#[command(author, version, about = "Meshroom camera tracking import (.sfm)")]
struct Args {
    /// Path to the .sfm reconstruction file.
    input: PathBuf,

    /// Forward axis of the reconstruction.
    #[arg(long, allow_hyphen_values = true)]
    forward: Option<Axis>,

    /// Up axis of the reconstruction.
    #[arg(long, allow_hyphen_values = true)]
    up: Option<Axis>,

    /// Rotation convention: legacy or direct.
    #[arg(long)]
    convention: Option<Convention>,

    /// Sensor width used to convert FOV ratios into lens values.
    #[arg(long)]
    sensor_width: Option<f64>,

    /// Optional path to a JSON ImportOptions file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the recorded animation here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn build_options(args: &Args) -> Result<ImportOptions, Box<dyn Error>> {
    let mut options = match &args.config {
        Some(path) => ImportOptions::from_json_file(path)?,
        None => ImportOptions::default(),
    };

    let source = options.source_axes;
    options.source_axes = AxisConvention::new(
        args.forward.unwrap_or(source.forward),
        args.up.unwrap_or(source.up),
    );
    if let Some(convention) = args.convention {
        options.convention = convention;
    }
    if let Some(sensor_width) = args.sensor_width {
        options.sensor_width = sensor_width;
    }
    Ok(options)
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let options = build_options(&args)?;

    let mut scene = RecordingScene::new();
    let summary = import_file(&args.input, &options, &mut scene)?;
    log::info!(
        "frames {:?}..={:?}, {} keyed",
        summary.emitted.first_frame,
        summary.emitted.last_frame,
        summary.emitted.frames
    );

    let json = scene.to_json()?;
    match &args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
