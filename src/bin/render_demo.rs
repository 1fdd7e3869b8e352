//! render_demo - render dashboard artifacts to disk
//!
//! Plays the video once into a display slot and writes the last frame, the
//! four interval heatmaps, the object counts and one HTML page to an output
//! directory. The page links `frame.png` next to it.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

use crowd_monitor::heatmap::interval_heatmaps;
use crowd_monitor::html::{render_document_with, DocumentOptions};
use crowd_monitor::pages::render_with_playback;
use crowd_monitor::ui::{Ui, UiMode};
use crowd_monitor::{
    BoundedPlayer, Dashboard, DisplaySlot, Page, PlaybackPolicy, DEFAULT_MAX_FRAMES,
    REFERENCE_COUNTS,
};

const FRAME_FILE: &str = "frame.png";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Video to play (local path or stub:// source).
    #[arg(long, env = "DASHBOARD_VIDEO_PATH", default_value = "crowd_detection_video.mp4")]
    video: String,
    /// Frame cap for playback.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    max_frames: u64,
    /// Fail when the video cannot be opened instead of playing nothing.
    #[arg(long)]
    strict: bool,
    /// Page to render as HTML (home, about, real-time-monitoring, nx-features).
    #[arg(long, default_value = "real-time-monitoring")]
    page: String,
    /// Output directory.
    #[arg(long, default_value = "demo_out")]
    out: PathBuf,
    /// Optional seed for heatmaps and simulated insights.
    #[arg(long)]
    seed: Option<u64>,
    /// Progress output style.
    #[arg(long, value_enum, default_value_t = UiMode::Auto)]
    ui: UiMode,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let page = Page::from_slug(&args.page).ok_or_else(|| anyhow!("unknown page '{}'", args.page))?;
    let ui = Ui::new(args.ui, std::io::stderr().is_terminal());

    fs::create_dir_all(&args.out)
        .with_context(|| format!("create output directory {}", args.out.display()))?;

    let policy = if args.strict {
        PlaybackPolicy::Strict
    } else {
        PlaybackPolicy::Lenient
    };
    let dashboard = Dashboard::new(BoundedPlayer::new(args.max_frames, policy), args.video.clone());
    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };
    let mut display = DisplaySlot::new();

    let report = {
        let mut stage = ui.stage("play video");
        let report = dashboard.play(&mut display)?;
        stage.set_detail(format!(
            "{} frames, {:?}",
            report.frames_emitted, report.outcome
        ));
        if let Some(frame) = display.current() {
            fs::write(args.out.join(FRAME_FILE), frame.to_png()?)?;
        }
        report
    };

    {
        let mut stage = ui.stage("generate heatmaps");
        let heatmaps = interval_heatmaps(&mut rng)?;
        for (i, heatmap) in heatmaps.iter().enumerate() {
            fs::write(
                args.out.join(format!("heatmap_{}.png", i)),
                heatmap.frame.to_png()?,
            )?;
        }
        stage.set_detail(format!("{} images", heatmaps.len()));
    }

    {
        let _stage = ui.stage("write counts");
        let counts = serde_json::to_vec_pretty(&REFERENCE_COUNTS)?;
        fs::write(args.out.join("counts.json"), counts)?;
    }

    {
        let mut stage = ui.stage("render page");
        let view = render_with_playback(page, Some(report), &mut rng)?;
        let options = DocumentOptions {
            frame_src: FRAME_FILE,
            cache_bust: false,
        };
        let file = args.out.join(format!("{}.html", page.slug()));
        fs::write(&file, render_document_with(&view, &options)?)?;
        stage.set_detail(file.display().to_string());
    }

    Ok(())
}
