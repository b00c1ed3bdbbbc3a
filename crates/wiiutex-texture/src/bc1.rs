//! DXT1 block arrangement.
//!
//! A pair holds two horizontally adjacent DXT1 blocks. The tiled layout
//! builds 4x2 pair primitives, folds two of them into 4x4 chunks, then lays
//! eight chunks out in a "W" over a 16x16 macro block.

use crate::detile::{local_offset, BlockPos, LevelContext};

/// Chunk origins within a macro block, indexed through [`W_ARRANGEMENTS`].
const CHUNK_OFFSETS: [BlockPos; 8] = [
    BlockPos::new(0, 0),
    BlockPos::new(0, 8),
    BlockPos::new(4, 8),
    BlockPos::new(4, 0),
    BlockPos::new(8, 0),
    BlockPos::new(8, 8),
    BlockPos::new(12, 8),
    BlockPos::new(12, 0),
];

/// Chunk order of each macro block row band, see [`WBand`].
const W_ARRANGEMENTS: [[u8; 8]; 4] = [
    [0, 1, 2, 3, 4, 5, 6, 7],
    [4, 5, 6, 7, 0, 1, 2, 3],
    [2, 3, 0, 1, 6, 7, 4, 5],
    [6, 7, 4, 5, 2, 3, 0, 1],
];

/// Which of the four repeating macro block rows a pair falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WBand {
    First,
    Second,
    Third,
    Fourth,
}

impl WBand {
    fn of(ctx: LevelContext, i: usize) -> Self {
        match (i / (ctx.pairs_per_line * 16)) % 4 {
            0 => Self::First,
            1 => Self::Second,
            2 => Self::Third,
            3 => Self::Fourth,
            // The modulus keeps this unreachable
            _ => Self::First,
        }
    }

    fn arrangement(self) -> &'static [u8; 8] {
        &W_ARRANGEMENTS[self as usize]
    }
}

/// Builds 4x4 chunks out of two 4x2 primitives.
fn chunk_offset(local: BlockPos, i: usize) -> BlockPos {
    if i % 16 > 7 {
        local + BlockPos::new(0, 2)
    } else {
        local
    }
}

/// Places the chunk along the W for its band.
fn w_offset(chunk: BlockPos, ctx: LevelContext, i: usize) -> BlockPos {
    let slot = (i / 16) % 8;
    let arrangement = WBand::of(ctx, i).arrangement();
    chunk + CHUNK_OFFSETS[arrangement[slot] as usize]
}

/// Moves the W right while there's room on the line, then down.
fn global_offset(w: BlockPos, ctx: LevelContext, i: usize) -> BlockPos {
    let columns = (ctx.pairs_per_line / 16).max(1);
    let x = ((i / 256) % columns) * 16;
    let y = (i / (ctx.pairs_per_line * 16)) * 16 + ((i / 128) % 2) * 4;
    w + BlockPos::new(x as i64, y as i64)
}

/// Row-major coordinate of tiled pair `i` within its level.
pub fn destination(ctx: LevelContext, i: usize) -> BlockPos {
    let local = local_offset(i);
    let chunk = chunk_offset(local, i);
    let w = w_offset(chunk, ctx, i);
    global_offset(w, ctx, i)
}
