//! Project-wide constants used across multiple modules.
//!
//! The output encoding parameters are fixed for every run; only the
//! normalization headroom can be changed through the config file.

/// Spinner animation characters for progress indicators
pub const SPINNER_CHARS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Supported input audio file extensions (matched case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg"];

/// Output file name used when `-o` is not given
pub const DEFAULT_OUTPUT_NAME: &str = "output.mp3";

/// Extension of the merged output file
pub const OUTPUT_EXTENSION: &str = "mp3";

pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;
pub const OUTPUT_CHANNELS: u16 = 2;
pub const OUTPUT_BITRATE_KBPS: u32 = 128;

/// Peak headroom left by normalization, in dB below full scale
pub const DEFAULT_HEADROOM_DB: f32 = 0.1;

/// Default external engine executable
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Prefix of the temporary output file written next to the final output
pub const TEMP_OUTPUT_PREFIX: &str = ".audio-merger-";
