//! Path and input validation utilities.
//!
//! This module provides common validation functions to ensure consistent
//! error handling across the codebase.

use crate::constants::SUPPORTED_EXTENSIONS;
use crate::error::MergeError;
use std::path::Path;

/// Lowercased extension of a path, if it has one.
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Whether the file has one of the supported input extensions, ignoring case.
pub fn has_supported_extension(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Validate an explicitly named input: it must exist and be a supported format.
pub fn validate_input_file(path: &Path) -> Result<(), MergeError> {
    if !path.is_file() {
        return Err(MergeError::InputNotFound(path.to_path_buf()));
    }
    if !has_supported_extension(path) {
        return Err(MergeError::UnsupportedFormat(path.to_path_buf()));
    }
    Ok(())
}
