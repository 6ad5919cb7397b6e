//! Audio data and the collaborators that produce and consume it.

use std::time::Duration;

pub mod engine;
pub mod normalize;
pub mod tags;

/// Interleaved 32-bit float PCM, the common form every input is decoded to.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl PcmBuffer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            samples: Vec::new(),
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Sample-accurate append. Both buffers must share one layout.
    pub fn append(&mut self, other: &PcmBuffer) -> Result<(), String> {
        if other.sample_rate != self.sample_rate || other.channels != self.channels {
            return Err(format!(
                "layout mismatch: {} Hz/{} ch vs {} Hz/{} ch",
                other.sample_rate, other.channels, self.sample_rate, self.channels
            ));
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }
}
