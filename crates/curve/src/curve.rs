//! Open Catmull-Rom curve through the track's control points.
//!
//! The curve uses the uniform Catmull-Rom basis (tension 0.5) and duplicates
//! the first and last control points to close off the end spans, so it passes
//! exactly through every control point. By default the parameter `t` is
//! proportional to control-point index, which makes apparent speed depend on
//! span length; [`Parameterization::ArcLength`] remaps `t` through a
//! cumulative-length table so equal steps cover equal distance.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use trackway_common::TrackError;

/// Dense samples per span used for the length table.
const SAMPLES_PER_SPAN: usize = 32;

/// Curves shorter than this are treated as collapsed.
const MIN_LENGTH: f32 = 1e-4;

/// How the public parameter `t ∈ [0,1]` maps onto the spline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameterization {
    /// `t` is proportional to control-point index.
    #[default]
    Uniform,
    /// `t` is proportional to distance travelled along the curve.
    ArcLength,
}

/// Immutable curve through an ordered list of control points.
#[derive(Debug, Clone)]
pub struct Curve {
    points: Vec<Vec3>,
    parameterization: Parameterization,
    /// Cumulative length at `SAMPLES_PER_SPAN * spans + 1` uniform steps.
    arc_table: Vec<f32>,
}

impl Curve {
    /// Build a curve. Fails on fewer than two points, non-finite points, or a
    /// curve whose total length collapses to zero.
    pub fn new(points: Vec<Vec3>, parameterization: Parameterization) -> Result<Self, TrackError> {
        if points.len() < 2 {
            return Err(TrackError::TooFewControlPoints {
                count: points.len(),
            });
        }
        if !points.iter().all(|p| p.is_finite()) {
            return Err(TrackError::NonFinite("control point"));
        }

        let mut curve = Self {
            points,
            parameterization,
            arc_table: Vec::new(),
        };
        curve.arc_table = curve.build_arc_table();

        let length = curve.length();
        if !length.is_finite() {
            return Err(TrackError::NonFinite("curve length"));
        }
        if length < MIN_LENGTH {
            return Err(TrackError::ZeroLength);
        }
        Ok(curve)
    }

    /// Uniformly parameterized curve.
    pub fn uniform(points: Vec<Vec3>) -> Result<Self, TrackError> {
        Self::new(points, Parameterization::Uniform)
    }

    pub fn parameterization(&self) -> Parameterization {
        self.parameterization
    }

    /// Total length, measured once at construction by dense sampling.
    pub fn length(&self) -> f32 {
        self.arc_table.last().copied().unwrap_or(0.0)
    }

    /// Point on the curve. `position(0)` and `position(1)` are exactly the
    /// first and last control points. `t` outside `[0,1]` is clamped.
    pub fn position(&self, t: f32) -> Vec3 {
        let u = self.to_uniform(clamp_parameter(t));
        self.eval(u)
    }

    /// Unit direction of travel at `t`. `t` outside `[0,1]` is clamped.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let u = self.to_uniform(clamp_parameter(t));
        let (span, _) = self.locate(u);
        let [_, p1, p2, _] = self.span_points(span);
        self.derivative(u)
            .try_normalize()
            .or_else(|| (p2 - p1).try_normalize())
            .unwrap_or(Vec3::NEG_Z)
    }

    fn span_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Span index and local parameter for a uniform parameter.
    fn locate(&self, u: f32) -> (usize, f32) {
        let spans = self.span_count();
        let f = u * spans as f32;
        let span = (f.floor().max(0.0) as usize).min(spans - 1);
        (span, f - span as f32)
    }

    fn span_points(&self, span: usize) -> [Vec3; 4] {
        let last = self.points.len() - 1;
        [
            self.points[span.saturating_sub(1)],
            self.points[span],
            self.points[span + 1],
            self.points[(span + 2).min(last)],
        ]
    }

    fn eval(&self, u: f32) -> Vec3 {
        if u <= 0.0 {
            return self.points[0];
        }
        if u >= 1.0 {
            return self.points[self.points.len() - 1];
        }
        let (span, s) = self.locate(u);
        let [a, b, c, d] = coefficients(self.span_points(span));
        ((a * s + b) * s + c) * s + d
    }

    fn derivative(&self, u: f32) -> Vec3 {
        let (span, s) = self.locate(u);
        let [a, b, c, _] = coefficients(self.span_points(span));
        (3.0 * a * s + 2.0 * b) * s + c
    }

    fn build_arc_table(&self) -> Vec<f32> {
        let samples = self.span_count() * SAMPLES_PER_SPAN;
        let mut table = Vec::with_capacity(samples + 1);
        let mut total = 0.0;
        let mut prev = self.eval(0.0);
        table.push(0.0);
        for i in 1..=samples {
            let p = self.eval(i as f32 / samples as f32);
            total += p.distance(prev);
            table.push(total);
            prev = p;
        }
        table
    }

    /// Map the public parameter onto the uniform spline parameter.
    fn to_uniform(&self, t: f32) -> f32 {
        match self.parameterization {
            Parameterization::Uniform => t,
            Parameterization::ArcLength => {
                if t <= 0.0 {
                    return 0.0;
                }
                if t >= 1.0 {
                    return 1.0;
                }
                let target = t * self.length();
                let samples = self.arc_table.len() - 1;
                let i = self
                    .arc_table
                    .partition_point(|&d| d < target)
                    .clamp(1, samples);
                let (lo, hi) = (self.arc_table[i - 1], self.arc_table[i]);
                let frac = if hi - lo > f32::EPSILON {
                    (target - lo) / (hi - lo)
                } else {
                    0.0
                };
                ((i - 1) as f32 + frac) / samples as f32
            }
        }
    }
}

/// Cubic coefficients `[a, b, c, d]` of the Catmull-Rom span between `p1`
/// and `p2`, so that `p(s) = a s³ + b s² + c s + d`.
fn coefficients([p0, p1, p2, p3]: [Vec3; 4]) -> [Vec3; 4] {
    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = 0.5 * (p2 - p0);
    [a, b, c, p1]
}

fn clamp_parameter(t: f32) -> f32 {
    if t.is_nan() {
        tracing::trace!("curve parameter is NaN, using 0");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&t) {
        tracing::trace!(t, "curve parameter out of range, clamping");
    }
    t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 1.0, -20.0),
            Vec3::new(-2.0, 2.0, -40.0),
            Vec3::new(5.0, 0.5, -60.0),
            Vec3::new(1.0, 0.0, -80.0),
        ]
    }

    #[test]
    fn rejects_too_few_points() {
        assert_eq!(
            Curve::uniform(vec![Vec3::ZERO]).unwrap_err(),
            TrackError::TooFewControlPoints { count: 1 }
        );
        assert!(Curve::uniform(Vec::new()).is_err());
    }

    #[test]
    fn rejects_collapsed_curve() {
        let err = Curve::uniform(vec![Vec3::ONE, Vec3::ONE, Vec3::ONE]).unwrap_err();
        assert_eq!(err, TrackError::ZeroLength);
    }

    #[test]
    fn rejects_non_finite_points() {
        let err = Curve::uniform(vec![Vec3::ZERO, Vec3::splat(f32::INFINITY)]).unwrap_err();
        assert!(matches!(err, TrackError::NonFinite(_)));
    }

    #[test]
    fn endpoints_are_exact() {
        for mode in [Parameterization::Uniform, Parameterization::ArcLength] {
            let points = zigzag();
            let curve = Curve::new(points.clone(), mode).unwrap();
            assert_eq!(curve.position(0.0), points[0]);
            assert_eq!(curve.position(1.0), points[points.len() - 1]);
        }
    }

    #[test]
    fn passes_through_interior_control_points() {
        let points = zigzag();
        let curve = Curve::uniform(points.clone()).unwrap();
        for (i, p) in points.iter().enumerate() {
            let t = i as f32 / (points.len() - 1) as f32;
            assert!((curve.position(t) - *p).length() < 1e-3, "point {i}");
        }
    }

    #[test]
    fn out_of_range_parameter_is_clamped() {
        let curve = Curve::uniform(zigzag()).unwrap();
        assert_eq!(curve.position(-0.5), curve.position(0.0));
        assert_eq!(curve.position(7.0), curve.position(1.0));
        assert_eq!(curve.position(f32::NAN), curve.position(0.0));
        assert!(curve.tangent(2.0).is_finite());
    }

    #[test]
    fn tangent_is_unit_and_points_forward() {
        let curve = Curve::uniform(zigzag()).unwrap();
        for i in 0..=50 {
            let t = i as f32 / 50.0;
            let tan = curve.tangent(t);
            assert!((tan.length() - 1.0).abs() < 1e-4, "t={t}");
            assert!(tan.z < 0.0, "t={t} tangent {tan:?}");
        }
    }

    #[test]
    fn straight_line_length_is_exact() {
        let points = vec![
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, -20.0),
        ];
        let curve = Curve::uniform(points).unwrap();
        assert!((curve.length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn two_point_curve_is_valid() {
        let curve = Curve::uniform(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0)]).unwrap();
        assert!((curve.length() - 5.0).abs() < 1e-3);
        assert!((curve.tangent(0.0) - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn arc_length_parameter_is_proportional_to_distance() {
        // Unevenly spaced points: uniform parameterization would run fast on
        // the long span.
        let points = vec![
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(0.0, 0.0, -4.0),
            Vec3::new(0.0, 0.0, -40.0),
        ];
        let curve = Curve::new(points.clone(), Parameterization::ArcLength).unwrap();
        let walked = path_length(&curve, 0.0, 0.5, 2000);
        let expected = curve.length() * 0.5;
        assert!(
            (walked - expected).abs() < expected * 0.02,
            "{walked} vs {expected}"
        );

        let uniform = Curve::uniform(points).unwrap();
        let walked_uniform = path_length(&uniform, 0.0, 0.5, 2000);
        assert!(walked_uniform < expected * 0.5);
    }

    fn path_length(curve: &Curve, from: f32, to: f32, steps: usize) -> f32 {
        let mut total = 0.0;
        let mut prev = curve.position(from);
        for i in 1..=steps {
            let t = from + (to - from) * i as f32 / steps as f32;
            let p = curve.position(t);
            total += p.distance(prev);
            prev = p;
        }
        total
    }
}
