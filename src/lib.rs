//! Extracts the DDS textures stored in Wii U `.wiiu_textures` archives,
//! undoing the console's block tiling on the way out.

pub mod directory;
pub mod extract;
pub mod filetype;
pub mod settings;

pub use extract::{extract, extract_archive, read_textures, ExtractSummary, RetrievedTexture};
pub use settings::ExtractSettings;
