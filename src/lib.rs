//! Compression and decompression of DXT1, DXT3 and DXT5 (BC1, BC2 and BC3)
//! texture blocks.
//!
//! Every 4x4 tile of pixels is encoded as one block of 8 (DXT1) or 16 (DXT3,
//! DXT5) bytes. Most of the work goes into choosing the two colour endpoints
//! of a block, which is done by one of several fits:
//!
//! - a lookup table for blocks with a single colour,
//! - a fast fit along the principal axis of the colours
//!   ([`Flags::COLOUR_RANGE_FIT`]),
//! - an exhaustive search over all clusterings of the colours
//!   ([`Flags::COLOUR_CLUSTER_FIT`], the default), optionally repeated along
//!   improved axes ([`Flags::COLOUR_ITERATIVE_CLUSTER_FIT`]).
//!
//! ```
//! use squish_bc::{compress_image, decompress_image, storage_requirements, Flags};
//!
//! let (width, height) = (8, 8);
//! let rgba = vec![128_u8; width * height * 4];
//! let flags = Flags::DXT5 | Flags::COLOUR_RANGE_FIT;
//!
//! let mut blocks = vec![0; storage_requirements(width, height, flags).unwrap()];
//! compress_image(&rgba, width, height, &mut blocks, flags).unwrap();
//!
//! let mut decoded = vec![0; width * height * 4];
//! decompress_image(&mut decoded, width, height, &blocks, flags).unwrap();
//! ```

#![forbid(unsafe_code)]

mod alpha;
mod block;
mod colour;
mod colour_set;
mod compress;
mod error;
mod fit;
mod flags;
mod image;
mod progress;
mod util;

pub use block::ColourBlock;
pub use colour::R5G6B5;
pub use compress::*;
pub use error::*;
pub use flags::*;
pub use image::*;
pub use progress::Progress;
