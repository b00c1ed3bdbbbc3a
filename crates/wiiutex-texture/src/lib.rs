pub mod bc1;
pub mod bc3;
pub mod detile;
pub mod format;

pub use detile::{detile, detile_into, is_detile_eligible, Surface};
pub use format::BlockFormat;
