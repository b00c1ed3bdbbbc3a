/// Compressed block encoding of a sub-image, identified by the DDS fourcc.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum BlockFormat {
    /// `DXT1`, 8-byte blocks
    Bc1,
    /// `DXT5`, 16-byte blocks
    Bc3,
    #[default]
    Unknown,
}

impl BlockFormat {
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Self {
        match fourcc {
            b"DXT1" => Self::Bc1,
            b"DXT5" => Self::Bc3,
            _ => Self::Unknown,
        }
    }

    /// Size of a single compressed 4x4 block in bytes.
    ///
    /// Unknown formats are sized as 16-byte blocks, which is what the size
    /// formula in the container assumes for anything that isn't DXT1.
    pub fn block_size(&self) -> usize {
        match self {
            Self::Bc1 => 8,
            Self::Bc3 | Self::Unknown => 16,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// How many 16-byte block pairs make up one row of 4x4 blocks, per pixel
    /// of width. DXT1 packs two blocks into a pair, DXT5 one.
    pub(crate) fn pixels_per_pair(&self) -> u32 {
        match self {
            Self::Bc1 => 8,
            Self::Bc3 | Self::Unknown => 4,
        }
    }
}
