//! Bit-exact encoding and decoding of the 8-byte colour block shared by
//! DXT1, DXT3 and DXT5.
//!
//! Layout: `colour0: u16 LE`, `colour1: u16 LE`, then 16 two-bit indices
//! (pixel 0 in the lowest bits).

use glam::Vec3A;

use crate::colour::R5G6B5;

/// A decoded colour block.
///
/// This is the raw content of the block. How the indices are interpreted
/// depends on the order of the two endpoints, see [`ColourBlock::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColourBlock {
    pub colour0: R5G6B5,
    pub colour1: R5G6B5,
    /// The 2-bit palette index of each pixel in row-major order.
    pub indices: [u8; 16],
}
impl ColourBlock {
    pub fn from_bytes(bytes: &[u8; 8]) -> Self {
        let colour0 = R5G6B5::from_u16(u16::from_le_bytes([bytes[0], bytes[1]]));
        let colour1 = R5G6B5::from_u16(u16::from_le_bytes([bytes[2], bytes[3]]));
        let packed = IndexList {
            data: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        };

        Self {
            colour0,
            colour1,
            indices: std::array::from_fn(|i| packed.get(i)),
        }
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let c0 = self.colour0.to_u16().to_le_bytes();
        let c1 = self.colour1.to_u16().to_le_bytes();
        let [i0, i1, i2, i3] = IndexList::from_indices(&self.indices).data.to_le_bytes();

        [c0[0], c0[1], c1[0], c1[1], i0, i1, i2, i3]
    }

    /// Whether the block uses the 3-colour palette when decoded as DXT1.
    ///
    /// This is the case iff `colour0 <= colour1` as packed 16-bit values.
    pub fn is_three_colour(&self) -> bool {
        self.colour0.to_u16() <= self.colour1.to_u16()
    }

    /// Returns the 4 palette entries the indices select from.
    ///
    /// With `dxt1 == true` and `colour0 <= colour1`, the palette is
    /// `[c0, c1, (c0 + c1) / 2, transparent black]`. Otherwise it is
    /// `[c0, c1, (2 c0 + c1) / 3, (c0 + 2 c1) / 3]`, all opaque.
    pub fn palette(&self, dxt1: bool) -> [[u8; 4]; 4] {
        let [r0, g0, b0] = self.colour0.to_n8().map(u16::from);
        let [r1, g1, b1] = self.colour1.to_n8().map(u16::from);
        let c0 = [r0, g0, b0];
        let c1 = [r1, g1, b1];

        let rgba = |c: [u16; 3], a: u8| [c[0] as u8, c[1] as u8, c[2] as u8, a];

        if dxt1 && self.is_three_colour() {
            let mid = std::array::from_fn(|i| (c0[i] + c1[i]) / 2);
            [rgba(c0, 255), rgba(c1, 255), rgba(mid, 255), [0, 0, 0, 0]]
        } else {
            let third = std::array::from_fn(|i| (2 * c0[i] + c1[i]) / 3);
            let two_thirds = std::array::from_fn(|i| (c0[i] + 2 * c1[i]) / 3);
            [
                rgba(c0, 255),
                rgba(c1, 255),
                rgba(third, 255),
                rgba(two_thirds, 255),
            ]
        }
    }

    /// Decodes the block into 16 RGBA pixels.
    ///
    /// `dxt1` must be `true` iff this is a DXT1 block. Colour blocks inside
    /// DXT3 and DXT5 blocks always use the 4-colour palette.
    pub fn decode(&self, dxt1: bool) -> [[u8; 4]; 16] {
        let palette = self.palette(dxt1);
        self.indices.map(|index| palette[index as usize])
    }
}

/// Decodes an 8-byte colour block into 16 RGBA pixels.
pub(crate) fn decompress_colour(bytes: &[u8; 8], dxt1: bool) -> [[u8; 4]; 16] {
    ColourBlock::from_bytes(bytes).decode(dxt1)
}

/// Writes a block using the 3-colour palette (`colour0 <= colour1`).
///
/// `indices` refer to the palette `[start, end, (start + end) / 2, transparent]`.
pub(crate) fn write_colour_block3(start: Vec3A, end: Vec3A, indices: &[u8; 16]) -> [u8; 8] {
    let mut a = R5G6B5::from_colour_round(start);
    let mut b = R5G6B5::from_colour_round(end);

    let mut indices = *indices;
    if a.to_u16() > b.to_u16() {
        std::mem::swap(&mut a, &mut b);
        for index in indices.iter_mut() {
            *index = match *index {
                0 => 1,
                1 => 0,
                other => other,
            };
        }
    }

    ColourBlock {
        colour0: a,
        colour1: b,
        indices,
    }
    .to_bytes()
}

/// Writes a block using the 4-colour palette (`colour0 > colour1`).
///
/// `indices` refer to the palette `[start, end, 2/3 start + 1/3 end, 1/3 start + 2/3 end]`.
/// If both endpoints quantize to the same value, the block degenerates to a
/// single colour and all indices are set to 0.
pub(crate) fn write_colour_block4(start: Vec3A, end: Vec3A, indices: &[u8; 16]) -> [u8; 8] {
    let mut a = R5G6B5::from_colour_round(start);
    let mut b = R5G6B5::from_colour_round(end);

    let mut indices = *indices;
    #[allow(clippy::comparison_chain)]
    if a.to_u16() < b.to_u16() {
        std::mem::swap(&mut a, &mut b);
        for index in indices.iter_mut() {
            // 0 <-> 1, 2 <-> 3
            *index = (*index ^ 1) & 3;
        }
    } else if a.to_u16() == b.to_u16() {
        indices = [0; 16];
    }

    ColourBlock {
        colour0: a,
        colour1: b,
        indices,
    }
    .to_bytes()
}

struct IndexList {
    data: u32,
}
impl IndexList {
    fn from_indices(indices: &[u8; 16]) -> Self {
        let mut data = 0;
        for (i, &index) in indices.iter().enumerate() {
            debug_assert!(index < 4);
            data |= ((index & 3) as u32) << (i * 2);
        }
        Self { data }
    }

    fn get(&self, index: usize) -> u8 {
        debug_assert!(index < 16);
        ((self.data >> (index * 2)) & 0b11) as u8
    }
}
