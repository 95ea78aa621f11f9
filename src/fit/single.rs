use std::sync::OnceLock;

use glam::Vec3A;

use crate::{
    colour::{n5, n6, n8},
    colour_set::ColourSet,
};

use super::{FitResult, Palette};

/// The best endpoint pair for one 8-bit channel value, for one position
/// of the value within the palette.
#[derive(Debug, Clone, Copy, Default)]
struct SourceBlock {
    start: u8,
    end: u8,
    error: u8,
}

/// For one 8-bit channel value: the best endpoints if the value is
/// reproduced by the palette entry at `start` (`sources[0]`) or by the first
/// interpolated entry (`sources[1]`).
#[derive(Debug, Clone, Copy, Default)]
struct SingleColourLookup {
    sources: [SourceBlock; 2],
}

type LookupTable = [SingleColourLookup; 256];

struct LookupTables {
    ramp3_5: LookupTable,
    ramp3_6: LookupTable,
    ramp4_5: LookupTable,
    ramp4_6: LookupTable,
}

fn build_table(bits: u32, ramp_len: u32) -> LookupTable {
    debug_assert!(ramp_len == 3 || ramp_len == 4);
    let expand = |q: u8| if bits == 5 { n5::n8(q) } else { n6::n8(q) };
    let count = 1_u8 << bits;
    let divisor = ramp_len as i32 - 1;

    let mut table = [SingleColourLookup::default(); 256];
    for (value, lookup) in table.iter_mut().enumerate() {
        let value = value as i32;
        for (j, source) in lookup.sources.iter_mut().enumerate() {
            let j = j as i32;
            let mut best_error = i32::MAX;

            'search: for start in 0..count {
                let vs = expand(start) as i32;
                for end in 0..count {
                    let ve = expand(end) as i32;
                    let v = ((divisor - j) * vs + j * ve) / divisor;
                    let error = (v - value).abs();

                    if error < best_error {
                        best_error = error;
                        *source = SourceBlock {
                            start,
                            end,
                            error: error as u8,
                        };
                        if error == 0 {
                            break 'search;
                        }
                    }
                }
            }
        }
    }
    table
}

fn lookup_tables() -> &'static LookupTables {
    static TABLES: OnceLock<LookupTables> = OnceLock::new();
    TABLES.get_or_init(|| LookupTables {
        ramp3_5: build_table(5, 3),
        ramp3_6: build_table(6, 3),
        ramp4_5: build_table(5, 4),
        ramp4_6: build_table(6, 4),
    })
}

/// Finds the best encoding of a block with exactly one colour.
///
/// The colour is either reproduced exactly by an endpoint, or by the first
/// interpolated palette entry. Both options are tried and the one with the
/// smallest error in 8-bit space wins.
pub(crate) struct SingleColourFit<'a> {
    set: &'a ColourSet,
    colour: [u8; 3],
}
impl<'a> SingleColourFit<'a> {
    pub fn new(set: &'a ColourSet) -> Self {
        debug_assert!(set.count() >= 1);
        let point = set.points()[0];
        Self {
            set,
            colour: [
                n8::from_f32(point.x),
                n8::from_f32(point.y),
                n8::from_f32(point.z),
            ],
        }
    }

    pub fn fit3(&self, bound: f32) -> Option<FitResult> {
        let tables = lookup_tables();
        self.fit(
            [&tables.ramp3_5, &tables.ramp3_6, &tables.ramp3_5],
            Palette::Three,
            bound,
        )
    }
    pub fn fit4(&self, bound: f32) -> Option<FitResult> {
        let tables = lookup_tables();
        self.fit(
            [&tables.ramp4_5, &tables.ramp4_6, &tables.ramp4_5],
            Palette::Four,
            bound,
        )
    }

    fn fit(&self, tables: [&LookupTable; 3], palette: Palette, bound: f32) -> Option<FitResult> {
        let mut best_error = i32::MAX;
        let mut best: [SourceBlock; 3] = Default::default();
        let mut best_source = 0;

        for source_index in 0..2 {
            let sources: [SourceBlock; 3] =
                std::array::from_fn(|c| tables[c][self.colour[c] as usize].sources[source_index]);
            let error: i32 = sources.iter().map(|s| s.error as i32 * s.error as i32).sum();

            if error < best_error {
                best_error = error;
                best = sources;
                best_source = source_index;
            }
        }

        let error = best_error as f32;
        if error >= bound {
            return None;
        }

        let start = Vec3A::new(
            best[0].start as f32 / 31.0,
            best[1].start as f32 / 63.0,
            best[2].start as f32 / 31.0,
        );
        let end = Vec3A::new(
            best[0].end as f32 / 31.0,
            best[1].end as f32 / 63.0,
            best[2].end as f32 / 31.0,
        );

        // source 0 is the start endpoint, source 1 the first interpolant,
        // which is palette index 2 in both ramps
        let index = 2 * best_source as u8;

        Some(FitResult {
            palette,
            start,
            end,
            indices: self.set.remap_indices(&[index]),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::ColourBlock, Config, Flags};

    fn decode_single(rgb: [u8; 3], palette: Palette) -> [u8; 4] {
        let rgba = [[rgb[0], rgb[1], rgb[2], 255]; 16];
        let set = ColourSet::new(&rgba, 0xFFFF, Config::from(Flags::DXT1));
        let fit = SingleColourFit::new(&set);
        let result = match palette {
            Palette::Three => fit.fit3(f32::INFINITY),
            Palette::Four => fit.fit4(f32::INFINITY),
        };
        let block = result.unwrap().to_block();
        let decoded = ColourBlock::from_bytes(&block).decode(true);
        assert!(decoded.iter().all(|p| *p == decoded[0]));
        decoded[0]
    }

    #[test]
    fn tables_have_exact_endpoints() {
        let tables = lookup_tables();
        for q in 0..32_u8 {
            let v = n5::n8(q) as usize;
            assert_eq!(tables.ramp4_5[v].sources[0].error, 0);
            assert_eq!(tables.ramp3_5[v].sources[0].error, 0);
        }
        for q in 0..64_u8 {
            let v = n6::n8(q) as usize;
            assert_eq!(tables.ramp4_6[v].sources[0].error, 0);
        }
    }

    #[test]
    fn interpolated_entries_get_within_one() {
        // with an interpolated entry, every 8-bit value is reachable to within 1
        let tables = lookup_tables();
        for v in 0..256 {
            for table in [&tables.ramp4_5, &tables.ramp4_6] {
                let best = table[v].sources.iter().map(|s| s.error).min().unwrap();
                assert!(best <= 1, "v={v}");
            }
        }
    }

    #[test]
    fn single_colour_round_trips_closely() {
        for rgb in [[0, 0, 0], [255, 255, 255], [12, 200, 77], [128, 128, 128], [1, 2, 3]] {
            for palette in [Palette::Three, Palette::Four] {
                let decoded = decode_single(rgb, palette);
                for c in 0..3 {
                    let diff = (decoded[c] as i32 - rgb[c] as i32).abs();
                    assert!(diff <= 2, "{rgb:?} {palette:?} -> {decoded:?}");
                }
                assert_eq!(decoded[3], 255);
            }
        }
    }

    #[test]
    fn respects_the_error_bound() {
        let rgba = [[12, 200, 77, 255]; 16];
        let set = ColourSet::new(&rgba, 0xFFFF, Config::default());
        let fit = SingleColourFit::new(&set);
        assert!(fit.fit4(0.0).is_none());
    }
}
