use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use weft_client::{ClientConfig, ReplayOptions, Replayer};
use weft_core::ClearPose;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ClearPoseArg {
    ThumbsDown,
    CrossedWrists,
}

impl From<ClearPoseArg> for ClearPose {
    fn from(arg: ClearPoseArg) -> Self {
        match arg {
            ClearPoseArg::ThumbsDown => ClearPose::ThumbsDown,
            ClearPoseArg::CrossedWrists => ClearPose::CrossedWrists,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay recorded hand landmarks through the gesture engine", long_about = None)]
struct Args {
    /// JSON-lines landmark recording, or '-' for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Frame width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Frame rate used when a line has no timestamp
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Two-hand pose that clears the canvas
    #[arg(long, value_enum)]
    clear_pose: Option<ClearPoseArg>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input).with_context(|| format!("Failed to open {}", input))?;
    Ok(Box::new(BufReader::new(file)))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(pose) = args.clear_pose {
        config.gesture.pose.clear_pose = pose.into();
    }

    let options = ReplayOptions {
        frame_width: args.width,
        frame_height: args.height,
        fps: args.fps,
    };

    log::info!("Weft replay starting...");
    log::info!("Input: {}", args.input);
    log::info!("Frame: {}x{} @ {} fps", args.width, args.height, args.fps);
    log::info!("Clear pose: {:?}", config.gesture.pose.clear_pose);

    let mut replayer = Replayer::new(config, options).context("Invalid replay options")?;
    let input = open_input(&args.input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = replayer.run(input, &mut out).context("Replay failed")?;

    serde_json::to_writer(&mut out, &summary).context("Failed to write summary")?;
    writeln!(out)?;

    Ok(())
}
