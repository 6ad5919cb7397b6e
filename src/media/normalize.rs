//! Single-pass peak normalization.
//!
//! The whole concatenated buffer is scaled by one gain so that its loudest
//! sample sits `headroom_db` below full scale. Segments are never normalized
//! individually.

use super::PcmBuffer;

/// Convert a dB value to a linear amplitude ratio.
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Largest absolute sample value in the buffer.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Normalize the buffer in place and return the gain that was applied.
///
/// A silent buffer is left untouched and reports a gain of 1.0.
pub fn normalize_peak(buffer: &mut PcmBuffer, headroom_db: f32) -> f32 {
    let peak = peak(&buffer.samples);
    if peak <= f32::EPSILON {
        return 1.0;
    }

    let gain = db_to_gain(-headroom_db) / peak;
    for sample in buffer.samples.iter_mut() {
        *sample *= gain;
    }

    log::debug!("Normalized peak {peak:.4} with gain {gain:.4}");
    gain
}
