//! Rep Coach - repetition counting and form feedback from pose landmarks
//!
//! Reads a stream of pose frames (JSON lines, or a generated curl set when no
//! file is given), runs one session over it and prints events and a summary.

mod cli;

use clap::Parser;
use cli::{skip_unreadable, Display, FrameReader};
use rep_coach::config::ScorerKind;
use rep_coach::pose::{CurlProfile, SyntheticCurl};
use rep_coach::{Coach, CounterConfig, JsonCatalog, PoseFrame};
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "rep-coach")]
#[command(about = "Count repetitions and check exercise form from pose landmarks")]
struct Args {
    /// Exercise id from the catalog
    #[arg(short, long, default_value = "xiA6lRr")]
    exercise: String,

    /// Exercise catalog (JSON)
    #[arg(short, long, default_value = "data/exercises.json")]
    catalog: PathBuf,

    /// Pose frames as JSON lines; a synthetic curl set is used when omitted
    #[arg(short, long)]
    frames: Option<PathBuf>,

    /// Counter configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sequence model weights; enables the sequence scorer
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Reps in the synthetic set
    #[arg(long, default_value = "5")]
    demo_reps: usize,

    /// Seed for the synthetic set
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Print events and summary as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => CounterConfig::load(path)?,
        None => CounterConfig::default(),
    };
    if let Some(weights) = &args.model {
        config.scorer.kind = ScorerKind::Sequence;
        config.scorer.weights = Some(weights.clone());
    }

    let catalog = JsonCatalog::load(&args.catalog)?;
    let coach = Coach::new(catalog, config)?;
    let mut session = coach.start_session(&args.exercise)?;

    let frames: Box<dyn Iterator<Item = Result<PoseFrame, Box<dyn Error>>>> = match &args.frames {
        Some(path) => Box::new(FrameReader::open(path)?),
        None => {
            info!("No frame file given, generating {} synthetic curls", args.demo_reps);
            let profile = CurlProfile {
                reps: args.demo_reps,
                ..CurlProfile::default()
            };
            Box::new(SyntheticCurl::new(profile, args.seed).map(Ok::<PoseFrame, Box<dyn Error>>))
        }
    };

    let mut display = Display::new(args.json);
    display.show_header(&session)?;

    // Unreadable lines and rejected frames are logged and skipped
    for frame in skip_unreadable(frames) {
        if let Ok(events) = session.process(&frame) {
            for event in &events {
                display.show_event(event)?;
            }
        }
    }

    if let Some(event) = session.finish() {
        display.show_event(&event)?;
    }
    display.show_summary(&session.summary())?;

    Ok(())
}
