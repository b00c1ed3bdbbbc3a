//! Reverses the Wii U GPU tiling applied to DXT1/DXT5 block data.
//!
//! Block data is handled in 16-byte pairs. For DXT5 a pair is a single
//! block, for DXT1 it holds two neighbouring blocks. Every mip level is
//! reordered independently: for a linear source index `i` the per-format
//! transforms produce a block-pair coordinate, which is then linearized with
//! the row stride of that level.

use std::ops::Add;

use tracing::{debug, warn};

use crate::{bc1, bc3, BlockFormat};

/// Size of the unit moved around by the detiler.
pub const PAIR_SIZE: usize = 16;

/// Neither dimension is tiled on the console once it drops to this size.
pub const MIN_TILED_DIMENSION: u32 = 64;

/// Geometry of one compressed surface (all mip levels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub format: BlockFormat,
    pub width: u32,
    pub height: u32,
    /// Declared mip count. Zero and negative values are treated as one level.
    pub mipmap_count: i32,
    pub cubemap: bool,
}

impl Surface {
    pub fn is_detile_eligible(&self) -> bool {
        is_detile_eligible(self.width, self.height, self.cubemap)
    }

    fn level_count(&self) -> usize {
        self.mipmap_count.max(1) as usize
    }
}

/// Only power of two surfaces larger than 64x64 are tiled, and cubemaps never are.
pub fn is_detile_eligible(width: u32, height: u32, cubemap: bool) -> bool {
    width.is_power_of_two()
        && height.is_power_of_two()
        && width > MIN_TILED_DIMENSION
        && height > MIN_TILED_DIMENSION
        && !cubemap
}

/// Block-pair coordinate inside a mip level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockPos {
    pub x: i64,
    pub y: i64,
}

impl BlockPos {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl Add for BlockPos {
    type Output = BlockPos;

    fn add(self, rhs: Self) -> Self::Output {
        BlockPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Per-level state shared by the transforms of one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelContext {
    /// Block pairs per row of 4x4 blocks at this level.
    pub pairs_per_line: usize,
}

impl LevelContext {
    /// Converts a coordinate into an index within the level.
    pub fn linearize(&self, pos: BlockPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.pairs_per_line {
            return None;
        }

        Some(pos.x as usize + pos.y as usize * self.pairs_per_line)
    }
}

/// Builds the 4x2 primitive both formats start from.
pub(crate) fn local_offset(i: usize) -> BlockPos {
    BlockPos::new(((i / 2) % 4) as i64, (i % 2) as i64)
}

/// Index within the level that source pair `i` is moved to.
///
/// Returns `None` for formats that can't be detiled.
pub fn destination_index(format: BlockFormat, ctx: LevelContext, i: usize) -> Option<usize> {
    match format {
        BlockFormat::Bc1 => ctx.linearize(bc1::destination(ctx, i)),
        BlockFormat::Bc3 => ctx.linearize(bc3::destination(ctx, i)),
        BlockFormat::Unknown => None,
    }
}

/// Detiles the block region of `surface`, returning a buffer of the same length.
///
/// `data` is everything after the DDS header: all mip levels, largest first.
pub fn detile(surface: &Surface, data: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; data.len()];
    detile_into(surface, data, &mut result);
    result
}

/// Same as [`detile`], writing into a caller provided buffer.
///
/// # Panics
/// Panics if `dst` and `src` differ in length.
pub fn detile_into(surface: &Surface, src: &[u8], dst: &mut [u8]) {
    assert_eq!(
        src.len(),
        dst.len(),
        "detile source and destination must be the same length"
    );

    // Anything the loop below doesn't touch stays in source order
    dst.copy_from_slice(src);

    if !surface.is_detile_eligible() {
        return;
    }

    if !surface.format.is_known() {
        warn!("Surface uses an unknown compression type, leaving block data as-is");
        return;
    }

    let pair_count = src.len() / PAIR_SIZE;
    let mut width = surface.width;
    let mut height = surface.height;
    let mut pairs_per_line = (width / surface.format.pixels_per_pair()) as usize;
    let mut level_pairs = pairs_per_line * (height / 4) as usize;
    let mut level_offset = 0usize;

    for level in 0..surface.level_count() {
        let level_end = level_offset + level_pairs;
        if level_pairs == 0 || level_end > pair_count {
            debug!(
                "Mip level {level} needs {level_pairs} block pairs but only {} remain, copying the rest verbatim",
                pair_count.saturating_sub(level_offset)
            );
            break;
        }

        let ctx = LevelContext { pairs_per_line };
        for i in 0..level_pairs {
            let Some(dest) = destination_index(surface.format, ctx, i) else {
                continue;
            };
            if dest >= level_pairs {
                continue;
            }

            let from = (level_offset + i) * PAIR_SIZE;
            let to = (level_offset + dest) * PAIR_SIZE;
            dst[to..to + PAIR_SIZE].copy_from_slice(&src[from..from + PAIR_SIZE]);
        }

        level_offset = level_end;
        level_pairs /= 4;
        pairs_per_line /= 2;
        width /= 2;
        height /= 2;
        if width <= MIN_TILED_DIMENSION || height <= MIN_TILED_DIMENSION {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Block data where every pair is tagged with its own index.
    fn tagged_pairs(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| {
                let mut pair = [0u8; PAIR_SIZE];
                pair[..8].copy_from_slice(&(i as u64).to_le_bytes());
                pair[8..].copy_from_slice(&(!(i as u64)).to_le_bytes());
                pair
            })
            .collect()
    }

    fn pair_tag(data: &[u8], index: usize) -> u64 {
        let start = index * PAIR_SIZE;
        u64::from_le_bytes(data[start..start + 8].try_into().unwrap())
    }

    fn surface(format: BlockFormat, width: u32, height: u32, mipmap_count: i32) -> Surface {
        Surface {
            format,
            width,
            height,
            mipmap_count,
            cubemap: false,
        }
    }

    fn level_pairs(format: BlockFormat, width: u32, height: u32) -> usize {
        (width / format.pixels_per_pair()) as usize * (height / 4) as usize
    }

    #[test]
    fn eligibility() {
        assert!(is_detile_eligible(128, 128, false));
        assert!(is_detile_eligible(1024, 128, false));
        assert!(!is_detile_eligible(64, 128, false));
        assert!(!is_detile_eligible(128, 64, false));
        assert!(!is_detile_eligible(192, 256, false));
        assert!(!is_detile_eligible(256, 256, true));
        assert!(!is_detile_eligible(0, 0, false));
    }

    #[test]
    fn destination_is_a_permutation_per_level() {
        for format in [BlockFormat::Bc1, BlockFormat::Bc3] {
            for width in [128u32, 256, 512, 1024] {
                for height in [128u32, 256, 512, 1024] {
                    let count = level_pairs(format, width, height);
                    let ctx = LevelContext {
                        pairs_per_line: (width / format.pixels_per_pair()) as usize,
                    };

                    let mut seen = vec![false; count];
                    for i in 0..count {
                        let dest = destination_index(format, ctx, i)
                            .unwrap_or_else(|| panic!("{format:?} {width}x{height}: {i} unmapped"));
                        assert!(dest < count, "{format:?} {width}x{height}: {i} -> {dest}");
                        assert!(!seen[dest], "{format:?} {width}x{height}: {dest} hit twice");
                        seen[dest] = true;
                    }
                }
            }
        }
    }

    #[test]
    fn detile_then_retile_restores_source() {
        for format in [BlockFormat::Bc1, BlockFormat::Bc3] {
            for (width, height) in [(128, 128), (256, 128), (128, 512), (512, 512)] {
                let count = level_pairs(format, width, height);
                let source = tagged_pairs(count);
                let detiled = detile(&surface(format, width, height, 1), &source);

                let ctx = LevelContext {
                    pairs_per_line: (width / format.pixels_per_pair()) as usize,
                };
                let mut retiled = vec![0u8; source.len()];
                for i in 0..count {
                    let dest = destination_index(format, ctx, i).unwrap();
                    retiled[i * PAIR_SIZE..(i + 1) * PAIR_SIZE]
                        .copy_from_slice(&detiled[dest * PAIR_SIZE..(dest + 1) * PAIR_SIZE]);
                }

                assert_eq!(retiled, source, "{format:?} {width}x{height}");
            }
        }
    }

    #[test]
    fn small_or_odd_surfaces_pass_through() {
        let data = tagged_pairs(512);
        for s in [
            surface(BlockFormat::Bc1, 64, 64, 1),
            surface(BlockFormat::Bc1, 128, 64, 1),
            surface(BlockFormat::Bc3, 96, 128, 1),
            surface(BlockFormat::Unknown, 128, 128, 1),
            Surface {
                cubemap: true,
                ..surface(BlockFormat::Bc1, 128, 128, 1)
            },
        ] {
            assert_eq!(detile(&s, &data), data, "{s:?}");
        }
    }

    #[test]
    fn first_pairs_of_bc1_level() {
        let data = tagged_pairs(level_pairs(BlockFormat::Bc1, 128, 128));
        let detiled = detile(&surface(BlockFormat::Bc1, 128, 128, 1), &data);

        // 128px wide DXT1 -> 16 pairs per line
        assert_eq!(pair_tag(&detiled, 0), 0);
        assert_eq!(pair_tag(&detiled, 16), 1);
        assert_eq!(pair_tag(&detiled, 1), 2);
        assert_eq!(pair_tag(&detiled, 32), 8);
        assert_eq!(pair_tag(&detiled, 128), 16);
        assert_eq!(pair_tag(&detiled, 64), 128);
        assert_eq!(pair_tag(&detiled, 264), 256);
    }

    #[test]
    fn first_pairs_of_bc3_level() {
        let data = tagged_pairs(level_pairs(BlockFormat::Bc3, 128, 128));
        let detiled = detile(&surface(BlockFormat::Bc3, 128, 128, 1), &data);

        // 128px wide DXT5 -> 32 pairs per line
        assert_eq!(pair_tag(&detiled, 0), 0);
        assert_eq!(pair_tag(&detiled, 32), 1);
        assert_eq!(pair_tag(&detiled, 256), 16);
        assert_eq!(pair_tag(&detiled, 16), 64);
        assert_eq!(pair_tag(&detiled, 528), 512);
        assert_eq!(pair_tag(&detiled, 772), 600);
    }

    #[test]
    fn untiled_mip_levels_are_copied_verbatim() {
        let format = BlockFormat::Bc1;
        let tiled_levels = level_pairs(format, 256, 256) + level_pairs(format, 128, 128);
        let total = tiled_levels + level_pairs(format, 64, 64) + level_pairs(format, 32, 32);
        let data = tagged_pairs(total);

        let detiled = detile(&surface(format, 256, 256, 4), &data);

        assert_ne!(&detiled[..tiled_levels * PAIR_SIZE], &data[..tiled_levels * PAIR_SIZE]);
        assert_eq!(&detiled[tiled_levels * PAIR_SIZE..], &data[tiled_levels * PAIR_SIZE..]);

        // Second level is reordered with its own stride, within its own range
        let second = level_pairs(format, 256, 256);
        assert_eq!(pair_tag(&detiled, second), second as u64);
        assert_eq!(pair_tag(&detiled, second + 16), second as u64 + 1);
    }

    #[test]
    fn mip_count_is_clamped_to_one() {
        let format = BlockFormat::Bc3;
        let data = tagged_pairs(level_pairs(format, 128, 128));

        let zero = detile(&surface(format, 128, 128, 0), &data);
        let negative = detile(&surface(format, 128, 128, -3), &data);
        let one = detile(&surface(format, 128, 128, 1), &data);

        assert_eq!(zero, one);
        assert_eq!(negative, one);
        assert_ne!(one, data);
    }

    #[test]
    fn trailing_and_missing_data_is_left_alone() {
        let format = BlockFormat::Bc1;
        let count = level_pairs(format, 128, 128);

        let mut data = tagged_pairs(count);
        data.extend_from_slice(&[0xAB; 7]);
        let detiled = detile(&surface(format, 128, 128, 1), &data);
        assert_eq!(detiled.len(), data.len());
        assert_eq!(&detiled[count * PAIR_SIZE..], &[0xABu8; 7]);

        // A level that runs past the end of the data is not touched
        let short = tagged_pairs(count - 1);
        assert_eq!(detile(&surface(format, 128, 128, 1), &short), short);
    }

    #[test]
    fn detile_into_matches_detile() {
        let s = surface(BlockFormat::Bc3, 256, 128, 2);
        let data = tagged_pairs(level_pairs(BlockFormat::Bc3, 256, 128) + 64);

        let mut out = vec![0u8; data.len()];
        detile_into(&s, &data, &mut out);

        assert_eq!(out, detile(&s, &data));
    }
}
