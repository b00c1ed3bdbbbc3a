//! DXT5 block arrangement.
//!
//! Every pair is one DXT5 block. 4x2 primitives are laid out in strips of
//! eight, two strips form a 32x8 block, and each second band of rows is
//! mirrored within its pair of blocks.

use crate::detile::{local_offset, BlockPos, LevelContext};

/// Primitive origins within a strip, indexed through [`STRIP_ARRANGEMENTS`].
const STRIP_OFFSETS: [BlockPos; 8] = [
    BlockPos::new(0, 0),
    BlockPos::new(4, 0),
    BlockPos::new(0, 8),
    BlockPos::new(4, 8),
    BlockPos::new(8, 8),
    BlockPos::new(12, 8),
    BlockPos::new(8, 0),
    BlockPos::new(12, 0),
];

const STRIP_ARRANGEMENTS: [[u8; 8]; 2] = [[0, 1, 2, 3, 4, 5, 6, 7], [4, 5, 6, 7, 0, 1, 2, 3]];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StripParity {
    Even,
    Odd,
}

impl StripParity {
    fn of(ctx: LevelContext, i: usize) -> Self {
        match (i / (ctx.pairs_per_line * 32)) % 2 {
            0 => Self::Even,
            1 => Self::Odd,
            // The modulus keeps this unreachable
            _ => Self::Even,
        }
    }

    fn arrangement(self) -> &'static [u8; 8] {
        &STRIP_ARRANGEMENTS[self as usize]
    }
}

fn strip_offset(local: BlockPos, ctx: LevelContext, i: usize) -> BlockPos {
    let slot = (i / 8) % 8;
    let arrangement = StripParity::of(ctx, i).arrangement();
    local + STRIP_OFFSETS[arrangement[slot] as usize]
}

/// Builds a 128x64 px block.
fn block_offset(strip: BlockPos, i: usize) -> BlockPos {
    strip + BlockPos::new((((i / 64) % 2) * 16) as i64, (((i / 128) % 4) * 2) as i64)
}

/// Moves blocks right while there's room on the line, otherwise down.
fn displacement(block: BlockPos, ctx: LevelContext, i: usize) -> BlockPos {
    let columns = (ctx.pairs_per_line / 32).max(1);
    let x = ((i / 512) % columns) * 32;
    let y = (i / (512 * columns)) * 16;
    block + BlockPos::new(x as i64, y as i64)
}

/// Odd bands swap each pair of neighbouring blocks.
fn row_inversion(displaced: BlockPos, ctx: LevelContext, i: usize) -> BlockPos {
    if (i / (ctx.pairs_per_line * 16)) % 2 == 0 {
        return displaced;
    }

    let shift = if (i / 64) % 2 == 0 { 16 } else { -16 };
    displaced + BlockPos::new(shift, 0)
}

/// Row-major coordinate of tiled pair `i` within its level.
pub fn destination(ctx: LevelContext, i: usize) -> BlockPos {
    let local = local_offset(i);
    let strip = strip_offset(local, ctx, i);
    let block = block_offset(strip, i);
    let displaced = displacement(block, ctx, i);
    row_inversion(displaced, ctx, i)
}
