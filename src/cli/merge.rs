//! The merge command: resolve inputs, run the pipeline, report the result.

use audio_merger::config::Config;
use audio_merger::error::MergeError;
use audio_merger::media::engine::FfmpegEngine;
use audio_merger::merge::{self, OutputSpec, resolve_inputs};
use audio_merger::utils::progress::BarObserver;
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub struct MergeArgs {
    pub input_files: Vec<PathBuf>,
    pub output: String,
    pub working_folder: Option<String>,
}

pub fn handle_merge(args: MergeArgs, config: &Config) -> Result<(), MergeError> {
    let working_folder = resolve_working_folder(args.working_folder.as_deref())?;
    let output = OutputSpec::new(args.output, &working_folder);

    let inputs = resolve_inputs(&args.input_files, &working_folder, Some(&output))?;

    let engine = FfmpegEngine::new(config.ffmpeg_program());
    engine.check_available()?;

    println!(
        "{} {} files {}",
        "Merging".bright_black(),
        inputs.len().to_string().cyan(),
        format!("from {}", working_folder.display()).bright_black()
    );
    for file in inputs.files() {
        println!("  {} {}", "→".bright_black(), file.display());
    }

    let observer = BarObserver::new(inputs.len());
    let report = match merge::merge(&inputs, &output, &engine, config.headroom_db, &observer) {
        Ok(report) => report,
        Err(e) => {
            observer.abandon();
            return Err(e);
        }
    };

    println!(
        "{} Successfully merged {} files into: {} ({:.1}s)",
        "✓".green().bold(),
        report.input_count,
        report.output_path.display().to_string().cyan(),
        report.duration.as_secs_f64()
    );
    if let Some(tags) = &report.tags {
        println!(
            "  {} Track title: {}, album: {}",
            "→".bright_black(),
            tags.title().unwrap_or("-"),
            tags.album().unwrap_or("-")
        );
    }

    Ok(())
}

/// The `-w` folder with `~` and variables expanded, or the current directory.
fn resolve_working_folder(arg: Option<&str>) -> Result<PathBuf, MergeError> {
    match arg {
        Some(folder) => {
            let expanded = shellexpand::full(folder)
                .map_err(|e| MergeError::Config(format!("working folder '{folder}': {e}")))?;
            Ok(PathBuf::from(expanded.as_ref()))
        }
        None => std::env::current_dir().map_err(|e| {
            MergeError::Config(format!("cannot determine current directory: {e}"))
        }),
    }
}
