use glam::Vec3A;

use crate::{colour_set::ColourSet, Config};

use super::{line::ColourLine, two_colour::snap_to_grid, FitResult, Palette};

/// A fast fit that uses the extreme colours along the principal axis as
/// the endpoints.
pub(crate) struct RangeFit<'a> {
    set: &'a ColourSet,
    metric: Vec3A,
    start: Vec3A,
    end: Vec3A,
}
impl<'a> RangeFit<'a> {
    pub fn new(set: &'a ColourSet, config: Config) -> Self {
        let points = set.points();

        let (start, end) = if points.is_empty() {
            (Vec3A::ZERO, Vec3A::ZERO)
        } else {
            let line = ColourLine::new(points, set.weights());

            let mut start = points[0];
            let mut end = points[0];
            let mut min = line.project(points[0]);
            let mut max = min;
            for &p in &points[1..] {
                let t = line.project(p);
                if t < min {
                    start = p;
                    min = t;
                } else if t > max {
                    end = p;
                    max = t;
                }
            }
            (start, end)
        };

        Self {
            set,
            metric: config.metric.weights(),
            start: snap_to_grid(start),
            end: snap_to_grid(end),
        }
    }

    pub fn fit3(&self, bound: f32) -> Option<FitResult> {
        let codes = [self.start, self.end, 0.5 * self.start + 0.5 * self.end];
        self.fit(&codes, Palette::Three, bound)
    }
    pub fn fit4(&self, bound: f32) -> Option<FitResult> {
        let codes = [
            self.start,
            self.end,
            (2.0 / 3.0) * self.start + (1.0 / 3.0) * self.end,
            (1.0 / 3.0) * self.start + (2.0 / 3.0) * self.end,
        ];
        self.fit(&codes, Palette::Four, bound)
    }

    fn fit(&self, codes: &[Vec3A], palette: Palette, bound: f32) -> Option<FitResult> {
        let mut closest = [0_u8; 16];
        let mut error = 0.0;
        for (i, &p) in self.set.points().iter().enumerate() {
            let mut best_dist = f32::INFINITY;
            for (j, &code) in codes.iter().enumerate() {
                let dist = (self.metric * (p - code)).length_squared();
                if dist < best_dist {
                    best_dist = dist;
                    closest[i] = j as u8;
                }
            }
            error += best_dist;
        }

        if error >= bound {
            return None;
        }

        Some(FitResult {
            palette,
            start: self.start,
            end: self.end,
            indices: self.set.remap_indices(&closest),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::ColourBlock, Flags};

    #[test]
    fn gradient_uses_extremes() {
        let rgba: [[u8; 4]; 16] = std::array::from_fn(|i| {
            let v = (i * 17) as u8;
            [v, v, v, 255]
        });
        let config = Config::from(Flags::DXT5 | Flags::COLOUR_RANGE_FIT);
        let set = ColourSet::new(&rgba, 0xFFFF, config);
        let fit = RangeFit::new(&set, config);
        let result = fit.fit4(f32::INFINITY).unwrap();

        let block = ColourBlock::from_bytes(&result.to_block());
        let mut endpoints = [block.colour0.to_n8(), block.colour1.to_n8()];
        endpoints.sort();
        assert_eq!(endpoints, [[0, 0, 0], [255, 255, 255]]);

        // monotone gradient must decode to a monotone gradient
        let decoded = block.decode(false);
        for pair in decoded.windows(2) {
            assert!(pair[0][0] <= pair[1][0]);
        }
    }

    #[test]
    fn empty_set() {
        let rgba = [[0, 0, 0, 0]; 16];
        let config = Config::default();
        let set = ColourSet::new(&rgba, 0xFFFF, config);
        assert_eq!(set.count(), 0);

        let result = RangeFit::new(&set, config).fit3(f32::INFINITY).unwrap();
        assert_eq!(result.error, 0.0);
        assert_eq!(result.indices, [3; 16]);
    }
}
