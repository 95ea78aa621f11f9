use glam::Vec3A;

/// The weighted best-fit line through a set of colours.
pub(crate) struct ColourLine {
    /// The weighted centroid of the colours
    pub centroid: Vec3A,
    /// The direction of maximum variance. Unit length.
    pub axis: Vec3A,
}
impl ColourLine {
    pub fn new(colours: &[Vec3A], weights: &[f32]) -> Self {
        debug_assert_eq!(colours.len(), weights.len());

        fn weighted_mean(colours: &[Vec3A], weights: &[f32]) -> Vec3A {
            let mut total = 0.0;
            let mut mean = Vec3A::ZERO;
            for (&colour, &w) in colours.iter().zip(weights) {
                total += w;
                mean += colour * w;
            }
            if total > f32::EPSILON {
                mean / total
            } else {
                mean
            }
        }
        fn covariance_matrix(colours: &[Vec3A], weights: &[f32], centroid: Vec3A) -> [Vec3A; 3] {
            let mut cov = [Vec3A::ZERO; 3];

            for (&p, &w) in colours.iter().zip(weights) {
                let d = p - centroid;
                let wd = d * w;
                cov[0] += wd * d.x;
                cov[1] += wd * d.y;
                cov[2] += wd * d.z;
            }

            cov
        }
        fn largest_eigenvector(matrix: [Vec3A; 3]) -> Vec3A {
            // Start the power iteration at the longest row. Starting at a
            // constant vector fails for colours that only vary orthogonally
            // to it (e.g. pure red vs pure green).
            let mut v = matrix[0];
            for row in &matrix[1..] {
                if row.length_squared() > v.length_squared() {
                    v = *row;
                }
            }

            for _ in 0..8 {
                let r = matrix[0].dot(v);
                let g = matrix[1].dot(v);
                let b = matrix[2].dot(v);
                let next = Vec3A::new(r, g, b).normalize_or_zero();
                if next == Vec3A::ZERO {
                    break;
                }
                v = next;
            }

            v.try_normalize().unwrap_or(Vec3A::ONE.normalize())
        }

        let centroid = weighted_mean(colours, weights);
        let covariance = covariance_matrix(colours, weights, centroid);

        Self {
            centroid,
            axis: largest_eigenvector(covariance),
        }
    }

    /// Projects the colour onto the line and returns the parameter `t`.
    pub fn project(&self, colour: Vec3A) -> f32 {
        (colour - self.centroid).dot(self.axis)
    }
}
