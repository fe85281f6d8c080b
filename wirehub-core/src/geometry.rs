//! Connector Geometry
//!
//! World-space queries used to decide where a rendered wire attaches to a hub,
//! and the curve a wire follows between its two anchors.

use glam::{Quat, Vec3};
use tracing::warn;

/// Placement of a hub in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Map a local-space point into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.translation
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The world-space connector closest to `origin`.
///
/// Returns the transform's own position when there are no offsets. Ties go to
/// the earliest offset.
pub fn closest_connector(transform: &Transform, offsets: &[Vec3], origin: Vec3) -> Vec3 {
    let mut best: Option<(Vec3, f32)> = None;

    for &offset in offsets {
        let point = transform.transform_point(offset);
        let distance = point.distance_squared(origin);
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((point, distance));
        }
    }

    best.map_or(transform.translation, |(point, _)| point)
}

/// A cubic Bezier curve between two wire anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireCurve {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl WireCurve {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// A curve from `from` to `to` whose middle hangs `slack` units below the
    /// straight line (measured at the control points).
    pub fn with_slack(from: Vec3, to: Vec3, slack: f32) -> Self {
        let sag = Vec3::NEG_Y * slack;
        Self {
            p0: from,
            p1: from.lerp(to, 1.0 / 3.0) + sag,
            p2: from.lerp(to, 2.0 / 3.0) + sag,
            p3: to,
        }
    }

    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        if !(0.0..=1.0).contains(&t) {
            warn!(t, "wire curve parameter outside [0, 1], clamping");
        }
        let t = t.clamp(0.0, 1.0);

        let u = 1.0 - t;
        let tt = t * t;
        let uu = u * u;

        self.p0 * (uu * u) + self.p1 * (3.0 * uu * t) + self.p2 * (3.0 * u * tt) + self.p3 * (tt * t)
    }

    /// `segments + 1` evenly spaced points from start to end.
    pub fn sample(&self, segments: usize) -> Vec<Vec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_offsets_falls_back_to_position() {
        let transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            closest_connector(&transform, &[], Vec3::new(100.0, 0.0, 0.0)),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn picks_nearest_connector() {
        let transform = Transform::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let offsets = [Vec3::ZERO, Vec3::X];

        assert_eq!(
            closest_connector(&transform, &offsets, Vec3::new(6.0, 0.0, 0.0)),
            Vec3::new(6.0, 0.0, 0.0)
        );
        assert_eq!(
            closest_connector(&transform, &offsets, Vec3::new(-10.0, 0.0, 0.0)),
            Vec3::new(5.0, 0.0, 0.0)
        );
    }

    #[test]
    fn ties_go_to_first_offset() {
        let transform = Transform::IDENTITY;
        let offsets = [Vec3::X, Vec3::NEG_X];

        // Equidistant from both connectors
        assert_eq!(closest_connector(&transform, &offsets, Vec3::Y), Vec3::X);
    }

    #[test]
    fn offsets_follow_rotation() {
        let transform = Transform::from_translation_rotation(
            Vec3::new(0.0, 0.0, 10.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        );

        // +X rotated a quarter turn about Z points along +Y
        let point = closest_connector(&transform, &[Vec3::X], Vec3::ZERO);
        assert!(point.abs_diff_eq(Vec3::new(0.0, 1.0, 10.0), 1e-5));
    }

    #[test]
    fn curve_hits_its_endpoints() {
        let from = Vec3::new(-2.0, 1.0, 0.0);
        let to = Vec3::new(4.0, 3.0, 1.0);
        let curve = WireCurve::with_slack(from, to, 0.5);

        assert_eq!(curve.point_at(0.0), from);
        assert_eq!(curve.point_at(1.0), to);
    }

    #[test]
    fn curve_sags_in_the_middle() {
        let curve = WireCurve::with_slack(Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0), 1.0);
        let mid = curve.point_at(0.5);

        assert!(mid.abs_diff_eq(Vec3::new(3.0, -0.75, 0.0), 1e-5));
    }

    #[test]
    fn curve_clamps_out_of_range_parameters() {
        let curve = WireCurve::with_slack(Vec3::ZERO, Vec3::X, 0.2);
        assert_eq!(curve.point_at(-1.0), curve.point_at(0.0));
        assert_eq!(curve.point_at(7.0), curve.point_at(1.0));
    }

    #[test]
    fn sample_spans_whole_curve() {
        let curve = WireCurve::with_slack(Vec3::ZERO, Vec3::X, 0.0);
        let points = curve.sample(4);

        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Vec3::ZERO);
        assert_eq!(points[4], Vec3::X);

        // Zero segments still yields a drawable line
        assert_eq!(curve.sample(0).len(), 2);
    }
}
