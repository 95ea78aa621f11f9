use glam::Vec3A;

use crate::{colour_set::ColourSet, Config};

use super::{FitResult, Palette};

/// Uses the two distinct colours of a block directly as the endpoints.
///
/// Every pixel is assigned to the endpoint it was equal to, so the only
/// error is the 5:6:5 quantization of the endpoints themselves.
pub(crate) struct TwoColourFit<'a> {
    set: &'a ColourSet,
    metric: Vec3A,
}
impl<'a> TwoColourFit<'a> {
    pub fn new(set: &'a ColourSet, config: Config) -> Self {
        debug_assert_eq!(set.count(), 2);
        Self {
            set,
            metric: config.metric.weights(),
        }
    }

    pub fn fit3(&self, bound: f32) -> Option<FitResult> {
        self.fit(Palette::Three, bound)
    }
    pub fn fit4(&self, bound: f32) -> Option<FitResult> {
        self.fit(Palette::Four, bound)
    }

    fn fit(&self, palette: Palette, bound: f32) -> Option<FitResult> {
        let points = self.set.points();
        let weights = self.set.weights();
        let start = snap_to_grid(points[0]);
        let end = snap_to_grid(points[1]);

        let error = weights[0] * (self.metric * (points[0] - start)).length_squared()
            + weights[1] * (self.metric * (points[1] - end)).length_squared();
        if error >= bound {
            return None;
        }

        Some(FitResult {
            palette,
            start: points[0],
            end: points[1],
            indices: self.set.remap_indices(&[0, 1]),
            error,
        })
    }
}

const GRID: Vec3A = Vec3A::new(31.0, 63.0, 31.0);
const GRID_RCP: Vec3A = Vec3A::new(1.0 / 31.0, 1.0 / 63.0, 1.0 / 31.0);

/// Rounds a colour to the closest colour representable as R5G6B5.
pub(crate) fn snap_to_grid(colour: Vec3A) -> Vec3A {
    (GRID * colour.clamp(Vec3A::ZERO, Vec3A::ONE) + Vec3A::splat(0.5)).floor() * GRID_RCP
}
