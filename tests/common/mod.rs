#![allow(dead_code)]

use audio_merger::error::MergeError;
use audio_merger::media::PcmBuffer;
use audio_merger::media::engine::{AudioEngine, EncodeSettings};
use std::path::Path;

/// In-process engine for tests: decodes 16-bit WAV with hound and "encodes"
/// by writing a float WAV, whatever the destination extension.
pub struct WavEngine;

impl AudioEngine for WavEngine {
    fn decode(
        &self,
        path: &Path,
        sample_rate: u32,
        channels: u16,
    ) -> Result<PcmBuffer, MergeError> {
        let mut reader =
            hound::WavReader::open(path).map_err(|e| MergeError::decode(path, e))?;
        let spec = reader.spec();
        if spec.sample_rate != sample_rate {
            return Err(MergeError::decode(path, "unexpected sample rate"));
        }

        let raw: Vec<f32> = reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()
            .map_err(|e| MergeError::decode(path, e))?;

        let samples = match (spec.channels, channels) {
            (1, 2) => raw.iter().flat_map(|s| [*s, *s]).collect(),
            (a, b) if a == b => raw,
            _ => return Err(MergeError::decode(path, "unexpected channel count")),
        };

        Ok(PcmBuffer {
            sample_rate,
            channels,
            samples,
        })
    }

    fn encode(
        &self,
        pcm: &PcmBuffer,
        dest: &Path,
        settings: &EncodeSettings,
    ) -> Result<(), MergeError> {
        let spec = hound::WavSpec {
            channels: settings.channels,
            sample_rate: settings.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let to_err = |e: hound::Error| MergeError::Encode(e.to_string());
        let mut writer = hound::WavWriter::create(dest, spec).map_err(to_err)?;
        for &s in &pcm.samples {
            writer.write_sample(s).map_err(to_err)?;
        }
        writer.finalize().map_err(to_err)
    }
}

/// Write a 16-bit 44.1 kHz WAV holding a quiet sine tone.
pub fn write_tone(path: &Path, seconds: f32, channels: u16, amplitude: f32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (44_100.0 * seconds) as usize;
    for i in 0..frames {
        let t = i as f32 / 44_100.0;
        let v = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * amplitude;
        for _ in 0..channels {
            writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

pub fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
