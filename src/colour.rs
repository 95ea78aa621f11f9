//! Internal module for converting between 8-bit channels and the narrow
//! channel formats stored in blocks.
//!
//! Quantization always rounds to the nearest value and clamps. Dequantization
//! expands by bit replication, which is what hardware decoders do.

use glam::Vec3A;

/// A colour endpoint as stored in a colour block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct R5G6B5 {
    pub r5: u8,
    pub g6: u8,
    pub b5: u8,
}
impl R5G6B5 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(31, 63, 31);

    pub const fn new(r5: u8, g6: u8, b5: u8) -> Self {
        debug_assert!(r5 < 32);
        debug_assert!(g6 < 64);
        debug_assert!(b5 < 32);

        Self { r5, g6, b5 }
    }

    #[inline(always)]
    pub const fn from_u16(q: u16) -> Self {
        Self {
            r5: ((q >> 11) & 0x1F) as u8,
            g6: ((q >> 5) & 0x3F) as u8,
            b5: (q & 0x1F) as u8,
        }
    }
    #[inline(always)]
    pub const fn to_u16(self) -> u16 {
        (self.r5 as u16) << 11 | (self.g6 as u16) << 5 | self.b5 as u16
    }

    /// Quantizes an 8-bit colour, rounding each channel to the nearest value.
    pub fn from_n8(rgb: [u8; 3]) -> Self {
        Self::new(n5::from_n8(rgb[0]), n6::from_n8(rgb[1]), n5::from_n8(rgb[2]))
    }
    /// Quantizes a colour with channels in `0..=1`.
    ///
    /// Channels outside that range are clamped.
    pub(crate) fn from_colour_round(colour: Vec3A) -> Self {
        Self::new(
            n5::from_f32(colour.x),
            n6::from_f32(colour.y),
            n5::from_f32(colour.z),
        )
    }

    /// Expands to 8 bits per channel by bit replication.
    #[inline(always)]
    pub fn to_n8(self) -> [u8; 3] {
        [n5::n8(self.r5), n6::n8(self.g6), n5::n8(self.b5)]
    }
}
impl From<u16> for R5G6B5 {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}
impl From<R5G6B5> for u16 {
    fn from(value: R5G6B5) -> Self {
        value.to_u16()
    }
}

/// Rounds `value` to the nearest integer and clamps it to `0..=limit`.
#[inline(always)]
pub(crate) fn float_to_int(value: f32, limit: i32) -> i32 {
    // rounds half up for non-negative values, negative values clamp to 0
    let i = (value + 0.5) as i32;
    i.clamp(0, limit)
}

/// Functions for converting **FROM Unorm4** values to other formats.
pub(crate) mod n4 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 15);
        x << 4 | x
    }

    pub fn from_n8(x: u8) -> u8 {
        super::float_to_int(x as f32 * (15.0 / 255.0), 15) as u8
    }
}

/// Functions for converting **FROM Unorm5** values to other formats.
pub(crate) mod n5 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 31);
        x << 3 | x >> 2
    }

    pub fn from_n8(x: u8) -> u8 {
        from_f32(super::n8::f32(x))
    }
    pub fn from_f32(x: f32) -> u8 {
        super::float_to_int(x * 31.0, 31) as u8
    }
}

/// Functions for converting **FROM Unorm6** values to other formats.
pub(crate) mod n6 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 63);
        x << 2 | x >> 4
    }

    pub fn from_n8(x: u8) -> u8 {
        from_f32(super::n8::f32(x))
    }
    pub fn from_f32(x: f32) -> u8 {
        super::float_to_int(x * 63.0, 63) as u8
    }
}

/// Functions for converting **FROM Unorm8** values to other formats.
pub(crate) mod n8 {
    #[inline(always)]
    pub fn f32(x: u8) -> f32 {
        const F: f32 = 1.0 / 255.0;
        x as f32 * F
    }

    pub fn from_f32(x: f32) -> u8 {
        super::float_to_int(x * 255.0, 255) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_replication_hits_both_ends() {
        assert_eq!(n4::n8(0), 0);
        assert_eq!(n4::n8(15), 255);
        assert_eq!(n5::n8(0), 0);
        assert_eq!(n5::n8(31), 255);
        assert_eq!(n6::n8(0), 0);
        assert_eq!(n6::n8(63), 255);
    }

    #[test]
    fn quantization_is_nearest() {
        // every 8-bit value must round to a 5/6-bit value whose expansion is
        // no further away than any other representable value
        for x in 0..=255_u8 {
            let q5 = n5::from_n8(x);
            let best5 = (0..32_u8)
                .map(|q| (n5::n8(q) as i32 - x as i32).abs())
                .min()
                .unwrap();
            assert!((n5::n8(q5) as i32 - x as i32).abs() <= best5 + 1, "x={x}");

            let q6 = n6::from_n8(x);
            let best6 = (0..64_u8)
                .map(|q| (n6::n8(q) as i32 - x as i32).abs())
                .min()
                .unwrap();
            assert!((n6::n8(q6) as i32 - x as i32).abs() <= best6 + 1, "x={x}");
        }
    }

    #[test]
    fn r5g6b5_packing() {
        let c = R5G6B5::new(0b10101, 0b110011, 0b01010);
        assert_eq!(c.to_u16(), 0b10101_110011_01010);
        assert_eq!(R5G6B5::from_u16(c.to_u16()), c);
        assert_eq!(R5G6B5::WHITE.to_u16(), u16::MAX);
        assert_eq!(R5G6B5::WHITE.to_n8(), [255, 255, 255]);
    }

    #[test]
    fn r5g6b5_from_n8() {
        assert_eq!(R5G6B5::from_n8([0, 0, 0]), R5G6B5::BLACK);
        assert_eq!(R5G6B5::from_n8([255, 255, 255]), R5G6B5::WHITE);

        // exactly representable colours survive the round trip
        let c = R5G6B5::new(12, 40, 3);
        assert_eq!(R5G6B5::from_n8(c.to_n8()), c);

        // 132 and 134 are the expansions of 5-bit 16 and 6-bit 33, 8 rounds up to 1
        assert_eq!(R5G6B5::from_n8([132, 134, 8]), R5G6B5::new(16, 33, 1));
    }

    #[test]
    fn float_to_int_clamps() {
        assert_eq!(float_to_int(-3.0, 31), 0);
        assert_eq!(float_to_int(31.6, 31), 31);
        assert_eq!(float_to_int(14.49, 31), 14);
        assert_eq!(float_to_int(14.5, 31), 15);
    }
}
