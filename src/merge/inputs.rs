//! Resolution of the ordered input file set.

use super::output::OutputSpec;
use crate::error::MergeError;
use crate::utils::validation::{has_supported_extension, validate_input_file};
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered, validated input files. Order decides both concatenation order and
/// which file's tags are used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFileSet {
    files: Vec<PathBuf>,
}

impl InputFileSet {
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Build the input set from explicit files, or by scanning `working_folder`.
///
/// Relative explicit paths resolve against `working_folder`. When `files` is
/// empty the folder is scanned (non-recursively) and any file that `exclude`
/// would produce as output is left out of the result.
///
/// # Arguments
///
/// * `files` - Explicit input files in merge order; empty means scan
/// * `working_folder` - Base for relative paths and the folder to scan
/// * `exclude` - The run's output, so previous results are never merged
///
/// # Returns
///
/// * `Ok(InputFileSet)` with at least one file
/// * `Err(MergeError::NoInputFiles)` if the scan finds nothing
/// * `Err(MergeError::InputNotFound)` or `Err(MergeError::UnsupportedFormat)`
///   for a bad explicit file
///
/// # Example
///
/// ```ignore
/// use audio_merger::merge::{OutputSpec, resolve_inputs};
/// use std::path::Path;
///
/// let folder = Path::new("/music/session");
/// let output = OutputSpec::new("output.mp3", folder);
/// let inputs = resolve_inputs(&[], folder, Some(&output))?;
/// ```
pub fn resolve_inputs(
    files: &[PathBuf],
    working_folder: &Path,
    exclude: Option<&OutputSpec>,
) -> Result<InputFileSet, MergeError> {
    if files.is_empty() {
        let files = scan_folder(working_folder, exclude)?;
        if files.is_empty() {
            return Err(MergeError::NoInputFiles(working_folder.to_path_buf()));
        }
        return Ok(InputFileSet { files });
    }

    let mut resolved = Vec::with_capacity(files.len());
    for file in files {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            working_folder.join(file)
        };
        validate_input_file(&path)?;
        resolved.push(path);
    }

    Ok(InputFileSet { files: resolved })
}

/// Supported audio files directly inside `dir`, sorted by file name.
fn scan_folder(dir: &Path, exclude: Option<&OutputSpec>) -> Result<Vec<PathBuf>, MergeError> {
    if !dir.is_dir() {
        return Err(MergeError::NoInputFiles(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        log::warn!("Could not read {}: {e}", dir.display());
        MergeError::NoInputFiles(dir.to_path_buf())
    })?;

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();

        // Skip hidden files, including our own temp output
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if !path.is_file() || !has_supported_extension(&path) {
            continue;
        }
        if exclude.is_some_and(|output| output.is_output_file(&path)) {
            log::info!("Skipping previous output {}", path.display());
            continue;
        }
        found.push(path);
    }

    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::info!("Found {} audio files in {}", found.len(), dir.display());
    Ok(found)
}
