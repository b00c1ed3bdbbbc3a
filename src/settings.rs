use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSettings {
    /// The `.wiiu_textures` archive to read.
    pub input: PathBuf,
    /// Directory the DDS files are written under.
    pub output: PathBuf,
    /// Reorder tiled block data into row-major order.
    pub detile: bool,
}

impl ExtractSettings {
    /// Settings that extract next to the input, with detiling on.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        Self {
            output: default_output_for(&input),
            input,
            detile: true,
        }
    }
}

/// `LEVELS/HUB.wiiu_textures` extracts into `LEVELS/HUB`.
pub fn default_output_for(input: &Path) -> PathBuf {
    input.with_extension("")
}
