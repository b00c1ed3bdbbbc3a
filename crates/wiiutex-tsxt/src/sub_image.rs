//! Sizing of the DDS files embedded in the data region.
//!
//! The archive doesn't store how long each DDS is. [`calculate_size`]
//! predicts it from the header, which is right for nearly every texture; the
//! prediction is then checked against the next `"DDS "` magic and, if it
//! doesn't line up, replaced by a forward scan for that magic.

use std::io::{Read, Seek, SeekFrom};

use binrw::{BinRead, BinReaderExt};
use tracing::debug;
use wiiutex_texture::BlockFormat;

use crate::io::ReaderExt;
use crate::{Error, Result};

pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
pub const DDS_HEADER_SIZE: u64 = 0x80;

/// Some cubemaps carry this many extra bytes after their faces.
pub const CUBEMAP_TRAILER_SIZE: u64 = 0x70;
const CUBEMAP_TRAILER_FLAG: u8 = 0x40;

/// The parts of a DDS header needed to size the file.
#[derive(BinRead, Debug, Clone, PartialEq, Eq)]
#[br(little)]
pub struct DdsHeader {
    #[br(pad_before = 12)]
    pub height: i32,
    pub width: i32,
    #[br(pad_before = 8)]
    pub mipmap_count: i32,
    #[br(pad_before = 52)]
    pub fourcc: [u8; 4],
    /// Byte 2 of the caps2 field. `0x40` marks cubemaps with a trailer.
    #[br(pad_before = 0x1a)]
    pub trailer_flag: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubImageInfo {
    pub width: u32,
    pub height: u32,
    /// As declared in the header, may be zero.
    pub mipmap_count: i32,
    pub format: BlockFormat,
    /// Span of the DDS file in the archive, header included.
    pub byte_length: u64,
    /// What [`calculate_size`] predicted, header included.
    pub nominal_length: u64,
}

impl SubImageInfo {
    /// Whether the nominal length had to be replaced by a scan.
    pub fn was_repaired(&self) -> bool {
        self.byte_length != self.nominal_length
    }
}

/// Predicted size of the block data of a surface, all levels (and faces) included.
pub fn calculate_size(
    width: u32,
    height: u32,
    mipmap_count: u32,
    format: BlockFormat,
    cubemap: bool,
) -> u64 {
    let block_size = format.block_size() as u64;
    let mut width = width as u64;
    let mut height = height as u64;
    let mut total = 0u64;

    for level in 0..mipmap_count as u64 {
        if width == 0 && height == 0 {
            // Every remaining level is a single block
            total = total.saturating_add((mipmap_count as u64 - level).saturating_mul(block_size));
            break;
        }

        let blocks = (width.div_ceil(4) * height.div_ceil(4)).max(1);
        total = total.saturating_add(blocks.saturating_mul(block_size));
        width /= 2;
        height /= 2;
    }

    if cubemap {
        total.saturating_mul(6)
    } else {
        total
    }
}

/// Reads the DDS header at the current position and works out its span.
///
/// The stream position is restored before returning.
pub fn resolve_sub_image<R: Read + Seek>(r: &mut R, cubemap: bool) -> Result<SubImageInfo> {
    let origin = r.stream_position()?;
    let stream_len = r.total_len()?;

    let remaining = stream_len.saturating_sub(origin);
    if remaining < DDS_HEADER_SIZE {
        return Err(Error::TruncatedSubImage {
            offset: origin,
            remaining,
        });
    }

    let header: DdsHeader = r.read_le()?;
    let format = BlockFormat::from_fourcc(&header.fourcc);
    let width = header.width.max(0) as u32;
    let height = header.height.max(0) as u32;

    let trailer = if cubemap && header.trailer_flag == CUBEMAP_TRAILER_FLAG {
        CUBEMAP_TRAILER_SIZE
    } else {
        0
    };
    let nominal_length = calculate_size(
        width,
        height,
        header.mipmap_count.max(1) as u32,
        format,
        cubemap,
    )
    .saturating_add(DDS_HEADER_SIZE + trailer);

    let byte_length = if lands_on_boundary(r, origin.saturating_add(nominal_length), stream_len)? {
        nominal_length
    } else {
        let repaired = repair_length(r, origin, stream_len)?;
        debug!(
            "DDS at 0x{origin:X}: predicted 0x{nominal_length:X} bytes but found 0x{repaired:X}"
        );
        repaired
    };

    r.seek(SeekFrom::Start(origin))?;

    Ok(SubImageInfo {
        width,
        height,
        mipmap_count: header.mipmap_count,
        format,
        byte_length,
        nominal_length,
    })
}

/// A span is plausible if it ends exactly at the end of the stream or right
/// before the next DDS magic.
fn lands_on_boundary<R: Read + Seek>(r: &mut R, end: u64, stream_len: u64) -> Result<bool> {
    if end == stream_len {
        return Ok(true);
    }
    if end > stream_len {
        return Ok(false);
    }

    r.seek(SeekFrom::Start(end))?;
    let mut magic = [0u8; 4];
    match r.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == DDS_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Length up to the next DDS magic after `origin`, or up to the end of the
/// stream if there is none. Linear in the distance scanned.
fn repair_length<R: Read + Seek>(r: &mut R, origin: u64, stream_len: u64) -> Result<u64> {
    r.seek(SeekFrom::Start(origin + 1))?;
    Ok(match r.find(DDS_MAGIC)? {
        Some(next) => next - origin,
        None => stream_len - origin,
    })
}
