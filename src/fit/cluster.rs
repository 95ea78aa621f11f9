use glam::{Vec3A, Vec4};

use crate::{colour_set::ColourSet, Config, FitQuality};

use super::{line::ColourLine, FitResult, Palette};

/// The number of orderings the iterative fit tries at most.
const MAX_ITERATIONS: usize = 8;

const GRID: Vec4 = Vec4::new(31.0, 63.0, 31.0, 0.0);
const GRID_RCP: Vec4 = Vec4::new(1.0 / 31.0, 1.0 / 63.0, 1.0 / 31.0, 0.0);

/// An exhaustive fit over all ways to split the colours, ordered along an
/// axis, into contiguous clusters.
///
/// For every split, the optimal endpoints are solved for in closed form
/// (least squares) and then snapped to the R5G6B5 grid.
pub(crate) struct ClusterFit<'a> {
    set: &'a ColourSet,
    iteration_count: usize,
    /// The metric, with `w = 0`.
    metric: Vec4,
    /// The axis of the initial ordering.
    principal: Vec3A,
    /// The metric-weighted `sum(w * x^2)` over all points. This is the part
    /// of the error that does not depend on the endpoints.
    base_error: f32,
}

/// The points of the set sorted along an axis.
struct Ordering {
    /// `order[i]` is the index of the i-th point along the axis.
    order: [u8; 16],
    /// `(w*x, w*y, w*z, w)` of each point in sorted order.
    weighted: [Vec4; 16],
    /// The sum of all `weighted` values.
    sum: Vec4,
}

impl<'a> ClusterFit<'a> {
    pub fn new(set: &'a ColourSet, config: Config) -> Self {
        let iteration_count = if config.fit == FitQuality::IterativeCluster {
            MAX_ITERATIONS
        } else {
            1
        };

        let principal = ColourLine::new(set.points(), set.weights()).axis;

        let metric = config.metric.weights();
        let base_error = set
            .points()
            .iter()
            .zip(set.weights())
            .map(|(&p, &w)| (p * p * w).dot(metric))
            .sum();

        Self {
            set,
            iteration_count,
            metric: metric.extend(0.0),
            principal,
            base_error,
        }
    }

    /// Sorts the points along `axis`.
    ///
    /// Points with equal projection keep their original order. Returns
    /// `None` if the resulting order was already tried.
    fn construct_ordering(&self, axis: Vec3A, tried: &[[u8; 16]]) -> Option<Ordering> {
        let points = self.set.points();
        let count = points.len();

        let mut dots = [0.0_f32; 16];
        let mut order = [0_u8; 16];
        for (i, &p) in points.iter().enumerate() {
            dots[i] = p.dot(axis);
            order[i] = i as u8;
        }

        // stable insertion sort
        for i in 1..count {
            let mut j = i;
            while j > 0 && dots[j] < dots[j - 1] {
                dots.swap(j, j - 1);
                order.swap(j, j - 1);
                j -= 1;
            }
        }

        if tried.iter().any(|previous| previous[..count] == order[..count]) {
            return None;
        }

        let weights = self.set.weights();
        let mut weighted = [Vec4::ZERO; 16];
        let mut sum = Vec4::ZERO;
        for (i, &index) in order[..count].iter().enumerate() {
            let p = points[index as usize];
            let w = weights[index as usize];
            weighted[i] = (p * w).extend(w);
            sum += weighted[i];
        }

        Some(Ordering {
            order,
            weighted,
            sum,
        })
    }

    pub fn fit3(&self, bound: f32) -> Option<FitResult> {
        self.iterate(bound, Palette::Three)
    }
    pub fn fit4(&self, bound: f32) -> Option<FitResult> {
        self.iterate(bound, Palette::Four)
    }

    fn iterate(&self, bound: f32, palette: Palette) -> Option<FitResult> {
        let count = self.set.count();

        let mut tried: [[u8; 16]; MAX_ITERATIONS] = [[0; 16]; MAX_ITERATIONS];
        let mut tried_count = 0;

        let mut best: Option<FitResult> = None;
        let mut best_error = bound;
        let mut axis = self.principal;

        for _ in 0..self.iteration_count {
            let Some(ordering) = self.construct_ordering(axis, &tried[..tried_count]) else {
                break;
            };
            tried[tried_count] = ordering.order;
            tried_count += 1;

            let candidate = match palette {
                Palette::Three => self.search3(&ordering, best_error),
                Palette::Four => self.search4(&ordering, best_error),
            };
            let Some(candidate) = candidate else {
                // this ordering did not improve on the best, so neither will
                // further ones along the same axis
                break;
            };

            // map the indices from sorted order back to points
            let mut unordered = [0_u8; 16];
            for (i, &index) in ordering.order[..count].iter().enumerate() {
                unordered[index as usize] = candidate.indices[i];
            }

            axis = (candidate.end - candidate.start).truncate().into();
            best_error = candidate.error;
            best = Some(FitResult {
                palette,
                start: candidate.start.truncate().into(),
                end: candidate.end.truncate().into(),
                indices: self.set.remap_indices(&unordered),
                error: candidate.error,
            });
        }

        best
    }

    /// Tries every split of the ordered points into 3 clusters: start,
    /// midpoint and end.
    fn search3(&self, ordering: &Ordering, bound: f32) -> Option<Candidate> {
        let count = self.set.count();
        let half_half2 = Vec4::new(0.5, 0.5, 0.5, 0.25);

        let mut best: Option<Candidate> = None;
        let mut best_error = bound;

        // part0 is the start cluster, part1 the midpoint cluster
        let mut part0 = Vec4::ZERO;
        for i in 0..count {
            let mut part1 = Vec4::ZERO;
            for j in i..=count {
                let part2 = ordering.sum - part1 - part0;

                let alphax_sum = part1 * half_half2 + part0;
                let betax_sum = part1 * half_half2 + part2;
                let alphabeta = (part1 * half_half2).w;

                if let Some((a, b, error)) =
                    self.solve(alphax_sum, betax_sum, alphabeta, best_error)
                {
                    best_error = error;
                    let mut indices = [0_u8; 16];
                    indices[i..j].fill(2);
                    indices[j..count].fill(1);
                    best = Some(Candidate {
                        start: a,
                        end: b,
                        indices,
                        error,
                    });
                }

                if j == count {
                    break;
                }
                part1 += ordering.weighted[j];
            }
            part0 += ordering.weighted[i];
        }

        best
    }

    /// Tries every split of the ordered points into 4 clusters: start, the
    /// two interpolants and end.
    fn search4(&self, ordering: &Ordering, bound: f32) -> Option<Candidate> {
        let count = self.set.count();
        let onethird_onethird2 = Vec4::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 9.0);
        let twothirds_twothirds2 = Vec4::new(2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 4.0 / 9.0);

        let mut best: Option<Candidate> = None;
        let mut best_error = bound;

        let mut part0 = Vec4::ZERO;
        for i in 0..count {
            let mut part1 = Vec4::ZERO;
            for j in i..=count {
                let mut part2 = Vec4::ZERO;
                for k in j..=count {
                    let part3 = ordering.sum - part2 - part1 - part0;

                    let alphax_sum =
                        part2 * onethird_onethird2 + (part1 * twothirds_twothirds2 + part0);
                    let betax_sum =
                        part1 * onethird_onethird2 + (part2 * twothirds_twothirds2 + part3);
                    let alphabeta = (2.0 / 9.0) * (part1 + part2).w;

                    if let Some((a, b, error)) =
                        self.solve(alphax_sum, betax_sum, alphabeta, best_error)
                    {
                        best_error = error;
                        let mut indices = [0_u8; 16];
                        indices[i..j].fill(2);
                        indices[j..k].fill(3);
                        indices[k..count].fill(1);
                        best = Some(Candidate {
                            start: a,
                            end: b,
                            indices,
                            error,
                        });
                    }

                    if k == count {
                        break;
                    }
                    part2 += ordering.weighted[k];
                }

                if j == count {
                    break;
                }
                part1 += ordering.weighted[j];
            }
            part0 += ordering.weighted[i];
        }

        best
    }

    /// Solves the least squares problem for the endpoints of one split and
    /// returns the snapped endpoints and their error.
    ///
    /// The `w` components of the sums hold the sums of the squared weights
    /// (`alpha^2`, `beta^2`). Returns `None` if the system is singular or the
    /// error is not below `bound`.
    fn solve(
        &self,
        alphax_sum: Vec4,
        betax_sum: Vec4,
        alphabeta: f32,
        bound: f32,
    ) -> Option<(Vec4, Vec4, f32)> {
        let alpha2 = alphax_sum.w;
        let beta2 = betax_sum.w;

        let factor = 1.0 / (alpha2 * beta2 - alphabeta * alphabeta);
        let a = (alphax_sum * beta2 - betax_sum * alphabeta) * factor;
        let b = (betax_sum * alpha2 - alphax_sum * alphabeta) * factor;
        if !a.is_finite() || !b.is_finite() {
            return None;
        }

        let a = snap(a);
        let b = snap(b);

        let e1 = a * a * alpha2 + b * b * beta2;
        let e2 = a * b * alphabeta - a * alphax_sum;
        let e3 = e2 - b * betax_sum;
        let e4 = 2.0 * e3 + e1;
        let error = (e4 * self.metric).dot(Vec4::new(1.0, 1.0, 1.0, 0.0)) + self.base_error;

        if error < bound {
            Some((a, b, error))
        } else {
            None
        }
    }
}

/// Clamps to `0..=1` and rounds to the R5G6B5 grid. The `w` component
/// becomes 0.
fn snap(v: Vec4) -> Vec4 {
    (GRID * v.clamp(Vec4::ZERO, Vec4::ONE) + Vec4::splat(0.5)).floor() * GRID_RCP
}

/// The best split of one ordering. Indices are in sorted order.
struct Candidate {
    start: Vec4,
    end: Vec4,
    indices: [u8; 16],
    error: f32,
}
