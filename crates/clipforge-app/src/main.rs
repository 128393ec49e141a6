//! ClipForge - headless runner
//!
//! Imports the files given on the command line, appends them to the
//! timeline, optionally simulates a preview pass and exports the result.
//!
//! ```text
//! clipforge [--preview] [--output <path>] <media>...
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clipforge_app::EditorController;
use clipforge_core::time::format_clock;
use clipforge_core::EditorConfig;
use clipforge_media::{ExportCancel, FfmpegEncoder, FfprobeInspector};
use clipforge_playback::{SimulatedEngine, TickOutcome};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Preview frame step, in seconds.
const PREVIEW_STEP: f64 = 1.0 / 30.0;

struct Args {
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    preview: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        inputs: Vec::new(),
        output: None,
        preview: false,
    };
    let mut iter = std::env::args_os().skip(1);
    while let Some(arg) = iter.next() {
        match arg.to_str() {
            Some("--preview") => args.preview = true,
            Some("--output") | Some("-o") => {
                let path = iter.next().context("--output needs a path")?;
                args.output = Some(PathBuf::from(path));
            }
            _ => args.inputs.push(PathBuf::from(arg)),
        }
    }
    if args.inputs.is_empty() {
        bail!("usage: clipforge [--preview] [--output <path>] <media>...");
    }
    Ok(args)
}

fn main() -> Result<()> {
    let config = match EditorConfig::resolve_path() {
        Some(path) => EditorConfig::load_or_default(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EditorConfig::default(),
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("ClipForge starting...");
    let args = parse_args()?;

    if !clipforge_media::tools_available() {
        warn!("ffmpeg/ffprobe not found; import and export will fail");
    }

    let encoder = FfmpegEncoder::new(config.export.clone());
    let mut editor = EditorController::new(config, SimulatedEngine::new());
    let events = editor.subscribe();

    let inspector = FfprobeInspector::new();
    for path in &args.inputs {
        match editor.import_media(&inspector, path) {
            Ok(media) => {
                editor.append_to_timeline(media)?;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping file"),
        }
    }

    for clip in editor.clips() {
        info!(
            clip = %clip.id,
            start = %format_clock(clip.start_time_sec),
            duration = clip.duration(),
            "Timeline clip"
        );
    }
    info!(
        clips = editor.clips().len(),
        duration = %format_clock(editor.timeline_duration()),
        "Timeline ready"
    );

    if args.preview {
        preview(&mut editor)?;
    }

    if let Some(output) = args.output {
        let cancel = ExportCancel::new();
        let path = editor.export(&encoder, &output, &cancel)?;
        info!(path = %path.display(), "Export complete");
    }

    for event in events.try_iter() {
        debug!(?event, "Editor event");
    }
    Ok(())
}

/// Play the timeline through the simulated engine at a fixed frame step.
fn preview(editor: &mut EditorController<SimulatedEngine>) -> Result<()> {
    if !editor.play()? {
        info!("Nothing to preview");
        return Ok(());
    }
    // Gap skips and crossings only move forward, so the pass ends well
    // inside this bound.
    let limit = (editor.timeline_duration() / PREVIEW_STEP).ceil() as u64 * 2 + 60;
    let mut frames = 0u64;
    loop {
        if frames > limit {
            bail!("preview did not finish after {frames} frames");
        }
        editor.engine_mut().advance(PREVIEW_STEP);
        frames += 1;
        match editor.tick()? {
            TickOutcome::Finished => break,
            TickOutcome::Crossed { index, playhead } => {
                info!(index, playhead = %format_clock(playhead), "Preview entered clip");
            }
            _ => {}
        }
    }
    info!(frames, "Preview finished");
    Ok(())
}
