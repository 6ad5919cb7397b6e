//! Error taxonomy for the merge pipeline.
//!
//! Every variant is fatal to the run. The binary prints the `Display` text and
//! exits non-zero.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    /// No qualifying audio files in the given list or folder
    #[error("No input files provided, and no audio files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    /// An explicitly named input does not exist
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// An input's extension is not wav, mp3 or ogg
    #[error("File {} is not a supported input audio file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The engine could not decode one input
    #[error("Could not decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Normalization or MP3 encoding failed
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Cannot write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write tags to {}: {message}", path.display())]
    TagWrite { path: PathBuf, message: String },

    #[error("Audio engine '{program}' is not available: {message}")]
    EngineUnavailable { program: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl MergeError {
    pub fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }
}
