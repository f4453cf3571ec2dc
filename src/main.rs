use clap::Parser;
use log::{info, warn, LevelFilter};
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use osu_trace::{Beatmap, ConvertorConfig, DatasetBuilder, FrameClock, LabeledFrame};

/// Turn a beatmap into per-frame cursor labels
#[derive(Parser, Debug)]
#[command(name = "osu-trace", version, about, long_about = None)]
struct Args {
    /// Job file with osu=, osr=, delay= and size= lines
    job: PathBuf,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit raw frame labels instead of the filled-in dataset
    #[arg(long)]
    labels: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let job = ConvertorConfig::load(&args.job)?;
    if let Some(video) = &job.video {
        warn!(
            "video decoding is not built in, labeling {} against a frame clock",
            video.display()
        );
    }

    let beatmap = Beatmap::open(&job.beatmap)?;
    info!(
        "{}: {} hit objects, ends at {}ms",
        job.beatmap.display(),
        beatmap.hit_objects.len(),
        beatmap.end_time().unwrap_or(0)
    );

    let clock = args.frames.map_or_else(FrameClock::new, FrameClock::with_limit);
    let frames = beatmap.label_frames(clock, job.sync_config());

    if args.labels {
        let labels: Vec<LabeledFrame<u64>> = frames.collect();
        info!("labeled {} frames", labels.len());
        let json = serde_json::to_string(&labels)?;
        match &args.output {
            Some(path) => {
                fs::write(path, json)?;
                info!("wrote {}", path.display());
            }
            None => print_line(&json)?,
        }
    } else {
        let mut builder = DatasetBuilder::new(job.viewport());
        builder.extend(frames.map(|frame| frame.position));
        let dataset = builder.finish();
        info!(
            "built {} frames, {} clicked",
            dataset.len(),
            dataset.clicks.iter().filter(|&&click| click == 1).count()
        );
        match &args.output {
            Some(path) => {
                dataset.write_json(path)?;
                info!("wrote {}", path.display());
            }
            None => print_line(&dataset.to_json()?)?,
        }
    }

    Ok(())
}

fn print_line(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.write_all(b"\n")
}
