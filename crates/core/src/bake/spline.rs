//! Spline wind function fitted to a traced streamline.
//!
//! The control points and per-point forces define a clamped uniform B-spline
//! of the requested degree, evaluated with De Boor's algorithm. The curve is
//! pre-sampled into a dense polyline at construction; `evaluate` finds the
//! nearest sample and returns the flow direction there scaled by the
//! interpolated force and a smooth radial falloff.

use crate::core_types::Vec3;
use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

/// Wire shape of a [`SplineFn`]. Everything derived is rebuilt on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SplineParams {
    points: Vec<Vec3>,
    forces: Vec<f32>,
    degree: usize,
    sample_count: usize,
}

/// One pre-evaluated point along the curve
#[derive(Debug, Clone, Copy, PartialEq)]
struct SplineSample {
    position: Vec3,
    /// Unit tangent, or zero where the curve is degenerate
    tangent: Vec3,
    force: f32,
}

/// Streamline-following wind function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SplineParams", into = "SplineParams")]
pub struct SplineFn {
    points: Vec<Vec3>,
    forces: Vec<f32>,
    degree: usize,
    sample_count: usize,

    samples: Vec<SplineSample>,
    /// Distance at which the influence reaches zero
    radius: f32,
}

impl SplineFn {
    /// Fit a spline through `points` (world meters) with one force per point.
    ///
    /// Extra points or forces beyond the shorter list are ignored. The degree
    /// is limited to `points.len() - 1` and at least 1; at least 2 samples are
    /// taken.
    #[must_use]
    pub fn new(
        mut points: Vec<Vec3>,
        mut forces: Vec<f32>,
        degree: usize,
        sample_count: usize,
    ) -> Self {
        let n = points.len().min(forces.len());
        points.truncate(n);
        forces.truncate(n);
        let degree = degree.clamp(1, n.saturating_sub(1).max(1));
        let sample_count = sample_count.max(2);

        let control: Vec<Vector4<f32>> = points
            .iter()
            .zip(&forces)
            .map(|(p, &f)| Vector4::new(p.x, p.y, p.z, f))
            .collect();
        let samples = build_samples(&control, degree, sample_count);
        let radius = 2.0 * mean_spacing(&points);

        Self {
            points,
            forces,
            degree,
            sample_count,
            samples,
            radius,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[must_use]
    pub fn forces(&self) -> &[f32] {
        &self.forces
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Influence radius in meters (twice the mean control point spacing)
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Wind contributed at `point` (world meters).
    ///
    /// Zero beyond [`Self::radius`] from the curve and for degenerate curves.
    #[must_use]
    pub fn evaluate(&self, point: Vec3) -> Vec3 {
        if self.radius <= 0.0 {
            return Vec3::zeros();
        }

        let nearest = self.samples.iter().min_by(|a, b| {
            (a.position - point)
                .norm_squared()
                .total_cmp(&(b.position - point).norm_squared())
        });
        let Some(nearest) = nearest else {
            return Vec3::zeros();
        };

        let distance = (nearest.position - point).norm();
        if distance >= self.radius {
            return Vec3::zeros();
        }

        let q = distance / self.radius;
        let falloff = (1.0 - q * q) * (1.0 - q * q);
        nearest.tangent * (nearest.force * falloff)
    }
}

impl From<SplineParams> for SplineFn {
    fn from(params: SplineParams) -> Self {
        Self::new(params.points, params.forces, params.degree, params.sample_count)
    }
}

impl From<SplineFn> for SplineParams {
    fn from(spline: SplineFn) -> Self {
        Self {
            points: spline.points,
            forces: spline.forces,
            degree: spline.degree,
            sample_count: spline.sample_count,
        }
    }
}

/// Clamped uniform knot vector for `n` control points of degree `k`
fn clamped_knots(n: usize, k: usize) -> Vec<f32> {
    (0..n + k + 1)
        .map(|i| {
            if i <= k {
                0.0
            } else if i >= n {
                (n - k) as f32
            } else {
                (i - k) as f32
            }
        })
        .collect()
}

/// De Boor evaluation at `t`. Requires `control.len() > k`.
fn de_boor(control: &[Vector4<f32>], knots: &[f32], k: usize, t: f32) -> Vector4<f32> {
    let n = control.len();
    let t = t.clamp(0.0, knots[n] - 1e-4);

    let mut span = k;
    for i in k..n {
        if t < knots[i + 1] {
            span = i;
            break;
        }
    }

    let mut d: Vec<Vector4<f32>> = (0..=k).map(|j| control[span - k + j]).collect();
    for r in 1..=k {
        for j in (r..=k).rev() {
            let i = span - k + j;
            let alpha = (t - knots[i]) / (knots[i + k + 1 - r] - knots[i]);
            d[j] = d[j - 1] * (1.0 - alpha) + d[j] * alpha;
        }
    }
    d[k]
}

fn build_samples(control: &[Vector4<f32>], degree: usize, count: usize) -> Vec<SplineSample> {
    match control.len() {
        0 => return Vec::new(),
        1 => {
            let c = control[0];
            return vec![SplineSample {
                position: c.xyz(),
                tangent: Vec3::zeros(),
                force: c.w,
            }];
        }
        _ => {}
    }

    let knots = clamped_knots(control.len(), degree);
    let t_max = knots[control.len()];
    let raw: Vec<Vector4<f32>> = (0..count)
        .map(|s| de_boor(control, &knots, degree, s as f32 / (count - 1) as f32 * t_max))
        .collect();

    (0..count)
        .map(|s| {
            let ahead = raw[(s + 1).min(count - 1)].xyz();
            let behind = raw[s.saturating_sub(1)].xyz();
            SplineSample {
                position: raw[s].xyz(),
                tangent: (ahead - behind)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vec3::zeros),
                force: raw[s].w,
            }
        })
        .collect()
}

fn mean_spacing(points: &[Vec3]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    let total: f32 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    total / (points.len() - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_line() -> SplineFn {
        let points = (0..6).map(|i| Vec3::new(0.0, 0.0, i as f32)).collect();
        SplineFn::new(points, vec![2.0; 6], 3, 24)
    }

    #[test]
    fn test_clamped_curve_hits_endpoints() {
        let control: Vec<Vector4<f32>> = (0..5)
            .map(|i| Vector4::new(i as f32, (i * i) as f32, 0.0, 1.0))
            .collect();
        let samples = build_samples(&control, 3, 10);
        assert_eq!(samples.len(), 10);
        assert_relative_eq!(samples[0].position, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(samples[9].position, Vec3::new(4.0, 16.0, 0.0), epsilon = 1e-2);
    }

    #[test]
    fn test_straight_line_flow_follows_tangent() {
        let spline = straight_line();
        assert_relative_eq!(spline.radius(), 2.0);

        let on_curve = spline.evaluate(Vec3::new(0.0, 0.0, 2.5));
        assert_relative_eq!(on_curve, Vec3::new(0.0, 0.0, 2.0), epsilon = 0.02);

        let off_curve = spline.evaluate(Vec3::new(1.0, 0.0, 2.5));
        assert!(off_curve.z > 0.0 && off_curve.z < 2.0);
        assert_eq!(off_curve.x, 0.0);
    }

    #[test]
    fn test_zero_beyond_radius() {
        let spline = straight_line();
        assert_eq!(spline.evaluate(Vec3::new(5.0, 0.0, 2.5)), Vec3::zeros());
    }

    #[test]
    fn test_degree_limited_by_point_count() {
        let points = vec![Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        let spline = SplineFn::new(points, vec![1.0; 3], 5, 8);
        assert_eq!(spline.degree(), 2);
        assert!(spline.evaluate(Vec3::new(1.0, 0.0, 0.0)).x > 0.0);
    }

    #[test]
    fn test_degenerate_inputs_evaluate_to_zero() {
        let empty = SplineFn::new(Vec::new(), Vec::new(), 3, 8);
        assert_eq!(empty.evaluate(Vec3::zeros()), Vec3::zeros());

        let single = SplineFn::new(vec![Vec3::zeros()], vec![1.0, 2.0], 3, 8);
        assert_eq!(single.forces().len(), 1);
        assert_eq!(single.evaluate(Vec3::zeros()), Vec3::zeros());
    }
}
