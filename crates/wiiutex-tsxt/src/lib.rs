//! Reader for `.wiiu_textures` archives (the `.CC4TSXT` texture container).
//!
//! The archive holds a table of texture records followed by the DDS files
//! themselves, back to back. [`TsxtArchive::parse`] decodes the table and
//! [`resolve_sub_image`] works out how many bytes each embedded DDS spans.

pub mod archive;
pub mod error;
pub mod io;
pub mod record;
pub mod sub_image;

pub use archive::{TsxtArchive, TsxtVersion};
pub use error::{Error, Result};
pub use record::{TextureKind, TextureRecord};
pub use sub_image::{calculate_size, resolve_sub_image, DdsHeader, SubImageInfo};
