//! Randomized control-point generation.
//!
//! The walk starts at the origin heading down -Z. Every segment advances the
//! forward coordinate by exactly one segment length, so control points are
//! evenly spaced along Z and the interpolator sees uniform spans. Lateral and
//! elevation drift are random but clamped to fixed bounds.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Direction the walk advances in.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Scale applied to the final lateral offset over the last three points,
/// oldest first. Pulls the end of the track back toward the centerline.
const RECENTER_FACTORS: [f32; 3] = [0.75, 0.5, 0.25];

/// Perturbation rules for the random walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathBounds {
    /// Probability that a segment drifts sideways.
    pub turn_probability: f32,
    /// Largest lateral change a single segment may apply.
    pub max_lateral_step: f32,
    /// Running lateral coordinate stays within `[-lateral_limit, lateral_limit]`.
    pub lateral_limit: f32,
    /// Probability that a segment changes elevation.
    pub elevation_probability: f32,
    /// Largest elevation change a single segment may apply.
    pub max_elevation_step: f32,
    /// Running elevation stays within `[0, max_elevation]`.
    pub max_elevation: f32,
}

impl Default for PathBounds {
    fn default() -> Self {
        Self {
            turn_probability: 0.3,
            max_lateral_step: 5.0,
            lateral_limit: 30.0,
            elevation_probability: 0.2,
            max_elevation_step: 2.0,
            max_elevation: 10.0,
        }
    }
}

/// Generate `segment_count + 1` control points (the origin plus one point per
/// segment).
///
/// Pure with respect to `rng`: the same seed and parameters always produce the
/// same sequence.
pub fn generate<R: Rng + ?Sized>(
    segment_count: usize,
    segment_length: f32,
    bounds: &PathBounds,
    rng: &mut R,
) -> Vec<Vec3> {
    let lateral_limit = bounds.lateral_limit.max(0.0);
    let max_elevation = bounds.max_elevation.max(0.0);

    let mut points = Vec::with_capacity(segment_count + 1);
    let mut cursor = Vec3::ZERO;
    points.push(cursor);

    for _ in 0..segment_count {
        if chance(rng, bounds.turn_probability) {
            let dx = symmetric(rng, bounds.max_lateral_step);
            cursor.x = (cursor.x + dx).clamp(-lateral_limit, lateral_limit);
        }
        if chance(rng, bounds.elevation_probability) {
            let dy = symmetric(rng, bounds.max_elevation_step);
            cursor.y = (cursor.y + dy).clamp(0.0, max_elevation);
        }
        cursor += FORWARD * segment_length;
        points.push(cursor);
    }

    recenter_tail(&mut points);

    tracing::trace!(
        segments = segment_count,
        final_x = points.last().map(|p| p.x).unwrap_or_default(),
        "generated control points"
    );

    points
}

/// Ramp the last generated points (never the origin) toward x = 0, scaling
/// the final point's lateral offset by [`RECENTER_FACTORS`].
fn recenter_tail(points: &mut [Vec3]) {
    let Some(final_x) = points.last().map(|p| p.x) else {
        return;
    };
    let generated = points.len().saturating_sub(1);
    let count = generated.min(RECENTER_FACTORS.len());
    let start = points.len() - count;
    let factors = &RECENTER_FACTORS[RECENTER_FACTORS.len() - count..];
    for (point, factor) in points[start..].iter_mut().zip(factors) {
        point.x = final_x * factor;
    }
}

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    probability > 0.0 && rng.gen_bool(f64::from(probability.min(1.0)))
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
    let max = max.abs();
    if max.is_finite() && max > 0.0 {
        rng.gen_range(-max..=max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn wild_bounds() -> PathBounds {
        PathBounds {
            turn_probability: 1.0,
            max_lateral_step: 12.0,
            elevation_probability: 1.0,
            max_elevation_step: 6.0,
            ..PathBounds::default()
        }
    }

    #[test]
    fn starts_at_origin_with_one_point_per_segment() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = generate(20, 20.0, &PathBounds::default(), &mut rng);
        assert_eq!(points.len(), 21);
        assert_eq!(points[0], Vec3::ZERO);
    }

    #[test]
    fn points_respect_bounds_across_seeds() {
        let bounds = wild_bounds();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let points = generate(40, 20.0, &bounds, &mut rng);
            for p in &points {
                assert!(p.x.abs() <= 30.0, "seed {seed}: x={}", p.x);
                assert!(
                    p.y >= 0.0 && p.y <= bounds.max_elevation,
                    "seed {seed}: y={}",
                    p.y
                );
            }
            for pair in points.windows(2) {
                assert_eq!(pair[0].z - pair[1].z, 20.0, "seed {seed}");
            }
        }
    }

    #[test]
    fn same_seed_same_points() {
        let bounds = PathBounds::default();
        let a = generate(30, 20.0, &bounds, &mut StdRng::seed_from_u64(99));
        let b = generate(30, 20.0, &bounds, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn tail_ramps_toward_center() {
        let mut points = vec![
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, -1.0),
            Vec3::new(6.0, 0.0, -2.0),
            Vec3::new(8.0, 0.0, -3.0),
            Vec3::new(8.0, 0.0, -4.0),
        ];
        recenter_tail(&mut points);
        assert_eq!(points[1].x, 4.0);
        assert_eq!(points[2].x, 6.0);
        assert_eq!(points[3].x, 4.0);
        assert_eq!(points[4].x, 2.0);
    }

    #[test]
    fn short_walk_never_moves_origin() {
        let mut points = vec![Vec3::ZERO, Vec3::new(10.0, 0.0, -20.0)];
        recenter_tail(&mut points);
        assert_eq!(points[0], Vec3::ZERO);
        assert_eq!(points[1].x, 2.5);
    }

    #[test]
    fn zero_segments_yields_only_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = generate(0, 20.0, &PathBounds::default(), &mut rng);
        assert_eq!(points, vec![Vec3::ZERO]);
    }

    #[test]
    fn zero_probabilities_give_straight_line() {
        let bounds = PathBounds {
            turn_probability: 0.0,
            elevation_probability: 0.0,
            ..PathBounds::default()
        };
        let points = generate(10, 5.0, &bounds, &mut StdRng::seed_from_u64(5));
        assert!(points.iter().all(|p| p.x == 0.0 && p.y == 0.0));
    }
}
