//! Output location and naming.
//!
//! A name ending in `.mp3` is used exactly. Any other name is treated as a
//! stem: the title of the copied tags (transliterated to ASCII) is appended
//! as ` - <title>`, followed by `.mp3`.

use crate::constants::OUTPUT_EXTENSION;
use crate::media::engine::EncodeSettings;
use crate::media::tags::TagSet;
use crate::utils::validation::extension_lowercase;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct OutputSpec {
    name: String,
    dir: PathBuf,
    pub settings: EncodeSettings,
}

impl OutputSpec {
    /// `name` may be relative (resolved against `dir`) or absolute.
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            settings: EncodeSettings::default(),
        }
    }

    fn has_mp3_extension(&self) -> bool {
        extension_lowercase(Path::new(&self.name)).as_deref() == Some(OUTPUT_EXTENSION)
    }

    /// The output path when it does not depend on tags.
    pub fn fixed_path(&self) -> Option<PathBuf> {
        self.has_mp3_extension().then(|| self.dir.join(&self.name))
    }

    /// Final output path, given the tags that will be written.
    pub fn resolve_path(&self, tags: Option<&TagSet>) -> PathBuf {
        if let Some(path) = self.fixed_path() {
            return path;
        }

        let mut file_name = self.name.clone();
        if let Some(title) = tags.and_then(|t| t.title()) {
            let title = sanitize_title(title);
            if !title.is_empty() {
                file_name.push_str(" - ");
                file_name.push_str(&title);
            }
        }
        file_name.push('.');
        file_name.push_str(OUTPUT_EXTENSION);
        self.dir.join(file_name)
    }

    /// Whether `candidate` is a file this spec writes: the exact name, or for
    /// a stem either `<stem>.mp3` or `<stem> - <title>.mp3`. Names compare
    /// case-insensitively.
    pub fn is_output_file(&self, candidate: &Path) -> bool {
        let target = self.dir.join(&self.name);
        let (Some(target_name), Some(candidate_name)) = (target.file_name(), candidate.file_name())
        else {
            return false;
        };
        let target_dir = target.parent().unwrap_or(Path::new("."));
        let candidate_dir = candidate.parent().unwrap_or(Path::new("."));
        if same_dir_key(target_dir) != same_dir_key(candidate_dir) {
            return false;
        }

        let target_name = target_name.to_string_lossy().to_lowercase();
        let candidate_name = candidate_name.to_string_lossy().to_lowercase();
        if self.has_mp3_extension() {
            return candidate_name == target_name;
        }

        let suffix = format!(".{OUTPUT_EXTENSION}");
        candidate_name == format!("{target_name}{suffix}")
            || (candidate_name.starts_with(&format!("{target_name} - "))
                && candidate_name.ends_with(&suffix))
    }
}

fn same_dir_key(dir: &Path) -> PathBuf {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

fn sanitize_title(title: &str) -> String {
    deunicode::deunicode(title)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
