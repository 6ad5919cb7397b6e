//! The merge pipeline.
//!
//! Inputs are decoded in order and appended sample-accurately into one
//! buffer, normalized once, encoded once, and tagged with the first non-empty
//! tag set found among the inputs. The encoded file is written to a hidden
//! temp file beside the target and renamed into place only after every step
//! succeeded, so a failed run never leaves a partial output behind.

pub mod inputs;
pub mod output;

use crate::constants::{OUTPUT_EXTENSION, TEMP_OUTPUT_PREFIX};
use crate::error::MergeError;
use crate::media::PcmBuffer;
use crate::media::engine::AudioEngine;
use crate::media::normalize::normalize_peak;
use crate::media::tags::{self, TagSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use inputs::{InputFileSet, resolve_inputs};
pub use output::OutputSpec;

/// Progress callbacks. The library prints nothing itself.
pub trait MergeObserver {
    fn decoding(&self, _index: usize, _total: usize, _path: &Path) {}
    fn encoding(&self) {}
    fn finished(&self) {}
}

/// Observer that ignores every event.
pub struct NoProgress;

impl MergeObserver for NoProgress {}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub input_count: usize,
    pub output_path: PathBuf,
    pub duration: Duration,
    pub tags: Option<TagSet>,
}

/// Merge the inputs into one normalized, tagged MP3.
///
/// Nothing is written at the final path unless every step succeeds.
///
/// # Arguments
///
/// * `inputs` - Files to merge, in order
/// * `output` - Where to write and which encoding parameters to use
/// * `engine` - Decoder/encoder for the audio data
/// * `headroom_db` - Peak level after normalization, in dB below full scale
/// * `observer` - Receives progress events
///
/// # Returns
///
/// * `Ok(MergeReport)` with the final path, total duration and copied tags
/// * `Err(MergeError)` from the first failing step; no output is left behind
///
/// # Example
///
/// ```ignore
/// use audio_merger::media::engine::FfmpegEngine;
/// use audio_merger::merge::{NoProgress, OutputSpec, merge, resolve_inputs};
///
/// let output = OutputSpec::new("output.mp3", folder);
/// let inputs = resolve_inputs(&[], folder, Some(&output))?;
/// let report = merge(&inputs, &output, &FfmpegEngine::new("ffmpeg"), 0.1, &NoProgress)?;
/// println!("{}", report.output_path.display());
/// ```
pub fn merge(
    inputs: &InputFileSet,
    output: &OutputSpec,
    engine: &dyn AudioEngine,
    headroom_db: f32,
    observer: &dyn MergeObserver,
) -> Result<MergeReport, MergeError> {
    let settings = output.settings;
    let mut merged = PcmBuffer::new(settings.sample_rate, settings.channels);
    let mut selected_tags: Option<TagSet> = None;

    for (index, path) in inputs.files().iter().enumerate() {
        observer.decoding(index, inputs.len(), path);

        let pcm = engine.decode(path, settings.sample_rate, settings.channels)?;
        merged
            .append(&pcm)
            .map_err(|e| MergeError::decode(path, e))?;

        if selected_tags.is_none() {
            selected_tags = tags::first_tagged(read_tags_lenient(path));
            if let Some(found) = &selected_tags {
                log::info!(
                    "Using tags from {} ({} fields)",
                    path.display(),
                    found.iter().count()
                );
            }
        }
    }

    log::info!(
        "Concatenated {} inputs: {:.2}s",
        inputs.len(),
        merged.duration().as_secs_f64()
    );

    normalize_peak(&mut merged, headroom_db);

    let output_path = output.resolve_path(selected_tags.as_ref());
    let staged = stage_output(&output_path)?;

    observer.encoding();
    engine.encode(&merged, staged.path(), &settings)?;

    if let Some(selected) = &selected_tags {
        tags::write_tags(staged.path(), selected).map_err(|message| MergeError::TagWrite {
            path: output_path.clone(),
            message,
        })?;
    }

    apply_output_permissions(&staged, &output_path)?;
    staged
        .persist(&output_path)
        .map_err(|e| MergeError::output_write(&output_path, e.error))?;
    observer.finished();

    log::info!("Wrote {}", output_path.display());
    Ok(MergeReport {
        input_count: inputs.len(),
        output_path,
        duration: merged.duration(),
        tags: selected_tags,
    })
}

/// Tags of one input; unreadable tags count as none.
fn read_tags_lenient(path: &Path) -> Option<TagSet> {
    match tags::read_tags(path) {
        Ok(tags) => Some(tags),
        Err(e) => {
            log::warn!("Could not read tags from {}: {e}", path.display());
            None
        }
    }
}

/// Hidden temp file in the output's directory, deleted on drop unless persisted.
fn stage_output(output_path: &Path) -> Result<tempfile::NamedTempFile, MergeError> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    tempfile::Builder::new()
        .prefix(TEMP_OUTPUT_PREFIX)
        .suffix(&format!(".{OUTPUT_EXTENSION}"))
        .tempfile_in(dir)
        .map_err(|e| MergeError::output_write(output_path, e))
}

/// Temp files are created owner-only; give the output the mode of the file it
/// replaces, or 0644 for a new file.
#[cfg(unix)]
fn apply_output_permissions(
    staged: &tempfile::NamedTempFile,
    output_path: &Path,
) -> Result<(), MergeError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match std::fs::metadata(output_path) {
        Ok(existing) => existing.permissions(),
        Err(_) => std::fs::Permissions::from_mode(0o644),
    };
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(|e| MergeError::output_write(output_path, e))
}

#[cfg(not(unix))]
fn apply_output_permissions(
    _staged: &tempfile::NamedTempFile,
    _output_path: &Path,
) -> Result<(), MergeError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::engine::EncodeSettings;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Decodes by file stem: "silent" gives zeros, "bad" fails, anything else
    /// gives one second of a 0.25 amplitude square wave.
    struct StubEngine {
        encoded: RefCell<Option<PcmBuffer>>,
        fail_encode: bool,
    }

    impl StubEngine {
        fn new() -> Self {
            Self {
                encoded: RefCell::new(None),
                fail_encode: false,
            }
        }
    }

    impl AudioEngine for StubEngine {
        fn decode(
            &self,
            path: &Path,
            sample_rate: u32,
            channels: u16,
        ) -> Result<PcmBuffer, MergeError> {
            let stem = path.file_stem().unwrap().to_string_lossy();
            let n = sample_rate as usize * channels as usize;
            let samples = match stem.as_ref() {
                "bad" => return Err(MergeError::decode(path, "corrupt")),
                "silent" => vec![0.0; n],
                _ => (0..n).map(|i| if i % 4 < 2 { 0.25 } else { -0.25 }).collect(),
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
            _settings: &EncodeSettings,
        ) -> Result<(), MergeError> {
            if self.fail_encode {
                return Err(MergeError::Encode("stub failure".into()));
            }
            *self.encoded.borrow_mut() = Some(pcm.clone());
            fs::write(dest, b"encoded").map_err(|e| MergeError::output_write(dest, e))
        }
    }

    fn inputs_in(dir: &Path, names: &[&str]) -> InputFileSet {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
        let files: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        resolve_inputs(&files, dir, None).unwrap()
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_OUTPUT_PREFIX))
            .count()
    }

    #[test]
    fn test_merge_concatenates_and_normalizes() {
        let temp_dir = TempDir::new().unwrap();
        let inputs = inputs_in(temp_dir.path(), &["a.wav", "silent.ogg", "c.mp3"]);
        let output = OutputSpec::new("output.mp3", temp_dir.path());
        let engine = StubEngine::new();

        let report = merge(&inputs, &output, &engine, 0.0, &NoProgress).unwrap();

        assert_eq!(report.input_count, 3);
        assert_eq!(report.duration, Duration::from_secs(3));
        assert_eq!(report.output_path, temp_dir.path().join("output.mp3"));
        assert!(report.output_path.exists());
        assert!(report.tags.is_none());

        let encoded = engine.encoded.borrow().clone().unwrap();
        assert_eq!(encoded.frames(), 44_100 * 3);
        // Peak raised to full scale, silent middle stays silent
        let peak = crate::media::normalize::peak(&encoded.samples);
        assert!((peak - 1.0).abs() < 1e-6);
        let middle = &encoded.samples[44_100 * 2..44_100 * 4];
        assert!(middle.iter().all(|s| *s == 0.0));

        assert_eq!(leftover_temp_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_decode_failure_leaves_no_output() {
        let temp_dir = TempDir::new().unwrap();
        let inputs = inputs_in(temp_dir.path(), &["a.wav", "bad.mp3", "c.ogg"]);
        let output = OutputSpec::new("output.mp3", temp_dir.path());
        let engine = StubEngine::new();

        let err = merge(&inputs, &output, &engine, 0.1, &NoProgress).unwrap_err();

        assert!(err.to_string().contains("bad.mp3"));
        assert!(!temp_dir.path().join("output.mp3").exists());
        assert!(engine.encoded.borrow().is_none());
        assert_eq!(leftover_temp_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_encode_failure_cleans_up_and_keeps_old_output() {
        let temp_dir = TempDir::new().unwrap();
        let inputs = inputs_in(temp_dir.path(), &["a.wav"]);
        fs::write(temp_dir.path().join("output.mp3"), b"previous").unwrap();
        let output = OutputSpec::new("output.mp3", temp_dir.path());
        let engine = StubEngine {
            encoded: RefCell::new(None),
            fail_encode: true,
        };

        let result = merge(&inputs, &output, &engine, 0.1, &NoProgress);

        assert!(matches!(result, Err(MergeError::Encode(_))));
        assert_eq!(
            fs::read(temp_dir.path().join("output.mp3")).unwrap(),
            b"previous"
        );
        assert_eq!(leftover_temp_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_unwritable_output_dir_is_output_error() {
        let temp_dir = TempDir::new().unwrap();
        let inputs = inputs_in(temp_dir.path(), &["a.wav"]);
        let output = OutputSpec::new("missing/dir/output.mp3", temp_dir.path());
        let engine = StubEngine::new();

        let result = merge(&inputs, &output, &engine, 0.1, &NoProgress);
        assert!(matches!(result, Err(MergeError::OutputWrite { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let inputs = inputs_in(temp_dir.path(), &["a.wav"]);
        let output = OutputSpec::new("output.mp3", temp_dir.path());

        let report = merge(&inputs, &output, &StubEngine::new(), 0.1, &NoProgress).unwrap();

        let mode = fs::metadata(&report.output_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwritten_output_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let inputs = inputs_in(temp_dir.path(), &["a.wav"]);
        let existing = temp_dir.path().join("output.mp3");
        fs::write(&existing, b"previous").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o640)).unwrap();
        let output = OutputSpec::new("output.mp3", temp_dir.path());

        merge(&inputs, &output, &StubEngine::new(), 0.1, &NoProgress).unwrap();

        assert_eq!(fs::read(&existing).unwrap(), b"encoded");
        let mode = fs::metadata(&existing).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_observer_sees_every_input_in_order() {
        struct Recorder(RefCell<Vec<String>>);
        impl MergeObserver for Recorder {
            fn decoding(&self, index: usize, total: usize, path: &Path) {
                let name = path.file_name().unwrap().to_string_lossy();
                self.0.borrow_mut().push(format!("{index}/{total} {name}"));
            }
            fn encoding(&self) {
                self.0.borrow_mut().push("encode".into());
            }
            fn finished(&self) {
                self.0.borrow_mut().push("done".into());
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let inputs = inputs_in(temp_dir.path(), &["b.wav", "a.wav"]);
        let output = OutputSpec::new("output.mp3", temp_dir.path());
        let recorder = Recorder(RefCell::new(Vec::new()));

        merge(&inputs, &output, &StubEngine::new(), 0.1, &recorder).unwrap();

        assert_eq!(
            *recorder.0.borrow(),
            vec!["0/2 b.wav", "1/2 a.wav", "encode", "done"]
        );
    }
}
