//! CLI application for trait analysis from detector landmarks.
//!
//! Usage:
//!   anthro-traits <image> --landmarks face.json                 # Human-readable output
//!   anthro-traits <image> --landmarks pose.json --mode body     # Body type
//!   anthro-traits <image> --landmarks face.json --json          # JSON output
//!   anthro-traits <image> --landmarks face.json -o traits.json  # Save to file

use std::path::PathBuf;

use anthro_traits::{
    AnalysisConfig, BodyAnalyzer, BodyReport, BodyScores, ColorReading, FaceAnalyzer, FaceReport,
    ImageAccess, LandmarkSet,
};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "anthro-traits")]
#[command(author, version, about = "Skin, eye, face-shape and body-type traits from landmarks", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Landmark JSON: an array of {x, y, visibility?} or an object keyed by index
    #[arg(long)]
    landmarks: PathBuf,

    /// What the landmarks describe
    #[arg(long, value_enum, default_value_t = Mode::Face)]
    mode: Mode,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Analysis config JSON (defaults apply to missing keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    Face,
    Body,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    image: String,
    width: u32,
    height: u32,
    mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    face: Option<FaceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<BodyOutput>,
}

#[derive(Serialize)]
struct BodyOutput {
    #[serde(flatten)]
    report: BodyReport,
    scores: BodyScores,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "anthro_traits=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    debug!(?config, "using analysis config");

    info!(path = %args.landmarks.display(), "loading landmarks");
    let landmarks: LandmarkSet = serde_json::from_str(&std::fs::read_to_string(&args.landmarks)?)?;
    debug!(count = landmarks.len(), "landmarks loaded");

    info!(path = %args.image.display(), "loading image");
    let img = image::open(&args.image)?.to_rgb8();
    let size = ImageAccess::size(&img);

    let (face, body) = match args.mode {
        Mode::Face => {
            let report = FaceAnalyzer::new(&config).analyze(&img, &landmarks)?;
            (Some(report), None)
        }
        Mode::Body => {
            let result = BodyAnalyzer::new(&config).classify(&landmarks, size)?;
            let scores = result.scores;
            let body = BodyOutput {
                report: BodyReport::from(result),
                scores,
            };
            (None, Some(body))
        }
    };

    let output = Output {
        image: args.image.display().to_string(),
        width: size.width,
        height: size.height,
        mode: args.mode,
        face,
        body,
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        info!(path = %path.display(), "output written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_color(label: &str, reading: Option<&ColorReading>) -> String {
    match reading {
        Some(c) => format!("  {:<11}{} ({} {})\n", label, c.category, c.hex, c.rgb),
        None => format!("  {:<11}not sampled\n", label),
    }
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!("Image: {} ({}x{})\n", output.image, output.width, output.height));

    if let Some(face) = &output.face {
        s.push_str("\nColors:\n");
        s.push_str(&format_color("Skin tone:", face.skin_tone.as_ref()));
        s.push_str(&format_color("Eye color:", face.eye_color.as_ref()));

        s.push_str("\nFace shape:\n");
        s.push_str(&format!("  {} (width/height {:.2})\n", face.face_shape.shape, face.face_shape.ratio));
    }

    if let Some(body) = &output.body {
        s.push_str(&format!("\nBody type: {}\n", body.report.body_type));
        s.push_str(&format!("  {}\n", body.report.description));

        s.push_str("\nRatios:\n");
        s.push_str(&format!("  Shoulder/Hip:  {:.2}\n", body.report.ratios.shoulder_hip));
        s.push_str(&format!("  Waist/Hip:     {:.2}\n", body.report.ratios.waist_hip));
        s.push_str(&format!("  Height/Width:  {:.2}\n", body.report.ratios.height_width));

        s.push_str("\nScores:\n");
        s.push_str(&format!("  Ectomorph: {}\n", body.scores.ectomorph));
        s.push_str(&format!("  Mesomorph: {}\n", body.scores.mesomorph));
        s.push_str(&format!("  Endomorph: {}\n", body.scores.endomorph));
    }

    s
}
