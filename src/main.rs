//! audio-merger - merge audio files into one normalized MP3.
//!
//! Input files are taken from the command line in the order given, or found
//! by scanning a working folder (the current directory by default) for WAV,
//! MP3 and OGG files. They are decoded and joined end to end, peak-normalized
//! once, and encoded as a stereo 44.1 kHz 128 kbps CBR MP3. Tags from the
//! first input that has any are copied to the result.
//!
//! Decoding and encoding are done by ffmpeg, which must be installed.

use audio_merger::config::Config;
use audio_merger::constants::DEFAULT_OUTPUT_NAME;
use clap::Parser;
use owo_colors::OwoColorize;
use simplelog::{
    ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::{Path, PathBuf};

mod cli;

#[derive(Parser)]
#[command(name = "audio-merger")]
#[command(about = "Merge multiple source audio files into a single output MP3 file")]
#[command(version)]
struct Cli {
    /// Input files (wav, mp3, ogg), merged in the order given
    input_files: Vec<PathBuf>,

    /// Output MP3 file; a name without .mp3 gets the track title appended
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_NAME)]
    output: String,

    /// Working folder for input and output files (defaults to current directory)
    #[arg(short = 'w', long = "working-folder")]
    working_folder: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8, log_file: Option<&Path>) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(
                LevelFilter::Debug,
                simplelog::Config::default(),
                file,
            )),
            Err(e) => eprintln!("Warning: could not open log file {}: {e}", path.display()),
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, None);
            eprintln!("{} {e}", "Error:".red().bold());
            std::process::exit(1);
        }
    };
    init_logging(cli.verbose, config.log_file.as_deref());

    let args = cli::merge::MergeArgs {
        input_files: cli.input_files,
        output: cli.output,
        working_folder: cli.working_folder,
    };

    if let Err(e) = cli::merge::handle_merge(args, &config) {
        log::debug!("Merge failed: {e:?}");
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}
