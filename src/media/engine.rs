//! External audio engine.
//!
//! Decoding every supported input format and encoding MP3 is delegated to
//! ffmpeg, run synchronously as a child process. The pipeline only talks to
//! the [`AudioEngine`] trait so tests can swap in an in-process engine.

use super::PcmBuffer;
use crate::constants::{OUTPUT_BITRATE_KBPS, OUTPUT_CHANNELS, OUTPUT_SAMPLE_RATE};
use crate::error::MergeError;
use std::path::Path;
use std::process::{Command, Output};

/// Fixed parameters of the encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub sample_rate: u32,
    pub channels: u16,
    pub bitrate_kbps: u32,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            sample_rate: OUTPUT_SAMPLE_RATE,
            channels: OUTPUT_CHANNELS,
            bitrate_kbps: OUTPUT_BITRATE_KBPS,
        }
    }
}

pub trait AudioEngine {
    /// Decode one file to PCM in the given sample rate and channel layout.
    fn decode(
        &self,
        path: &Path,
        sample_rate: u32,
        channels: u16,
    ) -> Result<PcmBuffer, MergeError>;

    /// Encode PCM to an MP3 file at `dest`, overwriting it.
    fn encode(
        &self,
        pcm: &PcmBuffer,
        dest: &Path,
        settings: &EncodeSettings,
    ) -> Result<(), MergeError>;
}

pub struct FfmpegEngine {
    program: String,
}

impl FfmpegEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run `ffmpeg -version` to fail fast before any work is done.
    pub fn check_available(&self) -> Result<(), MergeError> {
        let output = self.run(&["-version".to_string()])?;
        if !output.status.success() {
            return Err(MergeError::EngineUnavailable {
                program: self.program.clone(),
                message: format!("exited with {}", output.status),
            });
        }
        if let Some(first_line) = String::from_utf8_lossy(&output.stdout).lines().next() {
            log::debug!("Using {first_line}");
        }
        Ok(())
    }

    fn run(&self, args: &[String]) -> Result<Output, MergeError> {
        log::debug!("Running {} {}", self.program, args.join(" "));
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| MergeError::EngineUnavailable {
                program: self.program.clone(),
                message: e.to_string(),
            })
    }
}

impl AudioEngine for FfmpegEngine {
    fn decode(
        &self,
        path: &Path,
        sample_rate: u32,
        channels: u16,
    ) -> Result<PcmBuffer, MergeError> {
        let args = decode_args(path, sample_rate, channels);
        let output = self.run(&args)?;

        if !output.status.success() {
            return Err(MergeError::decode(path, stderr_message(&output)));
        }

        let pcm = pcm_from_f32le(&output.stdout, sample_rate, channels)
            .map_err(|e| MergeError::decode(path, e))?;
        log::debug!(
            "Decoded {}: {} frames ({:.2}s)",
            path.display(),
            pcm.frames(),
            pcm.duration().as_secs_f64()
        );
        Ok(pcm)
    }

    fn encode(
        &self,
        pcm: &PcmBuffer,
        dest: &Path,
        settings: &EncodeSettings,
    ) -> Result<(), MergeError> {
        // Intermediate WAV lives in its own temp dir, removed on every exit path
        let scratch = tempfile::TempDir::new()
            .map_err(|e| MergeError::Encode(format!("cannot create temp dir: {e}")))?;
        let wav_path = scratch.path().join("merged.wav");
        write_float_wav(pcm, &wav_path)?;

        let args = encode_args(&wav_path, dest, settings);
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(MergeError::Encode(stderr_message(&output)));
        }

        log::debug!("Encoded {}", dest.display());
        Ok(())
    }
}

fn decode_args(path: &Path, sample_rate: u32, channels: u16) -> Vec<String> {
    vec![
        "-nostdin".into(),
        "-v".into(),
        "error".into(),
        "-i".into(),
        path.to_string_lossy().into_owned(),
        "-f".into(),
        "f32le".into(),
        "-acodec".into(),
        "pcm_f32le".into(),
        "-ac".into(),
        channels.to_string(),
        "-ar".into(),
        sample_rate.to_string(),
        "pipe:1".into(),
    ]
}

fn encode_args(wav_path: &Path, dest: &Path, settings: &EncodeSettings) -> Vec<String> {
    vec![
        "-nostdin".into(),
        "-v".into(),
        "error".into(),
        "-y".into(),
        "-i".into(),
        wav_path.to_string_lossy().into_owned(),
        "-map_metadata".into(),
        "-1".into(),
        "-codec:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        format!("{}k", settings.bitrate_kbps),
        "-ac".into(),
        settings.channels.to_string(),
        "-ar".into(),
        settings.sample_rate.to_string(),
        "-f".into(),
        "mp3".into(),
        dest.to_string_lossy().into_owned(),
    ]
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("ffmpeg exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}

/// Interpret raw little-endian f32 bytes as interleaved PCM.
pub fn pcm_from_f32le(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<PcmBuffer, String> {
    if bytes.is_empty() {
        return Err("no audio samples decoded".to_string());
    }
    let frame_bytes = 4 * channels as usize;
    if frame_bytes == 0 || bytes.len() % frame_bytes != 0 {
        return Err(format!("truncated PCM stream ({} bytes)", bytes.len()));
    }

    let samples = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(PcmBuffer {
        sample_rate,
        channels,
        samples,
    })
}

fn write_float_wav(pcm: &PcmBuffer, path: &Path) -> Result<(), MergeError> {
    let spec = hound::WavSpec {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let to_encode_error = |e: hound::Error| MergeError::Encode(format!("intermediate WAV: {e}"));

    let mut writer = hound::WavWriter::create(path, spec).map_err(to_encode_error)?;
    for &sample in &pcm.samples {
        writer.write_sample(sample).map_err(to_encode_error)?;
    }
    writer.finalize().map_err(to_encode_error)?;
    Ok(())
}
