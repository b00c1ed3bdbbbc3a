use std::path::{Path, PathBuf};

use anyhow::Context;

pub const ARCHIVE_EXTENSION: &str = "wiiu_textures";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputKind {
    Archive,
    /// Searched recursively for archives.
    Directory,
}

impl InputKind {
    pub fn guess_from_path(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return Some(Self::Directory);
        }

        is_texture_archive(path).then_some(Self::Archive)
    }
}

pub fn is_texture_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// All archives below `dir`, sorted.
pub fn find_archives(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/*.{ARCHIVE_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut paths: Vec<PathBuf> = glob::glob_with(&pattern, options)
        .with_context(|| format!("Invalid search pattern {pattern}"))?
        .flatten()
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    Ok(paths)
}
