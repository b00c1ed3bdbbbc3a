use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read structure: {0}")]
    Read(#[from] binrw::Error),

    /// One of the fixed tokens in the container header didn't match.
    #[error("expected {marker}, found {found:02X?}")]
    BadMarker {
        marker: &'static str,
        found: Vec<u8>,
    },

    #[error("unsupported TSXT version 0x{0:X} (expected 0xC or 0xE)")]
    UnsupportedVersion(u32),

    /// Fewer bytes than a DDS header remain where a sub-image should start.
    #[error("sub-image at offset 0x{offset:X} is truncated ({remaining} bytes left)")]
    TruncatedSubImage { offset: u64, remaining: u64 },
}
