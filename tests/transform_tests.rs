// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Property tests for the geometry engine.

use proptest::prelude::*;
use sonarcodec::transform::{
    interpolate_angles, regeoreference, wrap_pi, Angles, GeorefOutcome, GeorefStage,
    Georeferenced, LeverArm, Matrix, NavUpdate, PingGeometry, Quaternion, Regeoreferencer,
    Vector3,
};

// ============================================================================
// Strategies
// ============================================================================

fn arb_matrix() -> impl Strategy<Value = Matrix> {
    (
        -1.0e4..1.0e4f64,
        -1.0e4..1.0e4f64,
        -1.0e4..1.0e4f64,
        -7.0..7.0f64,
        -7.0..7.0f64,
        -7.0..7.0f64,
    )
        .prop_map(|(dx, dy, dz, rx, ry, rz)| {
            Matrix::identity()
                .rotate_z(rz)
                .rotate_x(rx)
                .translate(dx, dy, dz)
                .rotate_y(ry)
        })
}

fn arb_point() -> impl Strategy<Value = Vector3> {
    (-1.0e4..1.0e4f64, -1.0e4..1.0e4f64, -1.0e4..1.0e4f64)
        .prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn arb_angles() -> impl Strategy<Value = Angles> {
    (-179.0..179.0f64, -80.0..80.0f64, -179.0..179.0f64)
        .prop_map(|(h, p, b)| Angles::from_degrees(h, p, b))
}

fn arb_unit_quaternion() -> impl Strategy<Value = Quaternion> {
    arb_angles().prop_map(|a| Quaternion::from_angles(&a))
}

fn arb_geometry() -> impl Strategy<Value = PingGeometry> {
    (
        (400_000.0..600_000.0f64, 5_000_000.0..7_000_000.0f64),
        (-2.0..2.0f64, -1.0..1.0f64),
        (0.0..360.0f64, -15.0..15.0f64, -25.0..25.0f64),
        (-3.0..3.0f64, -3.0..3.0f64, -2.0..2.0f64),
    )
        .prop_map(
            |((easting, northing), (height, tide), (heading, pitch, roll), (s, f, h))| {
                PingGeometry {
                    easting,
                    northing,
                    height,
                    tide,
                    heading,
                    pitch,
                    roll,
                    lever_arm: LeverArm {
                        starboard: s,
                        forward: f,
                        height: h,
                    },
                }
            },
        )
}

fn close(a: &Vector3, b: &Vector3, tolerance: f64) -> bool {
    (*a - *b).norm() <= tolerance
}

fn same_rotation(a: &Quaternion, b: &Quaternion, tolerance: f64) -> bool {
    (a.dot(b).abs() - 1.0).abs() <= tolerance
}

struct Cloud {
    geometry: PingGeometry,
    points: Vec<Vector3>,
}

impl Georeferenced for Cloud {
    fn geometry(&self) -> PingGeometry {
        self.geometry
    }

    fn set_geometry(&mut self, geometry: &PingGeometry) {
        self.geometry = *geometry;
    }

    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn for_each_point(&mut self, f: &mut dyn FnMut(&mut Vector3)) {
        self.points.iter_mut().for_each(|p| f(p));
    }
}

// ============================================================================
// Matrix
// ============================================================================

proptest! {
    #[test]
    fn prop_identity_is_neutral(m in arb_matrix()) {
        let identity = Matrix::identity();
        prop_assert!(Matrix::compose(&identity, &m).max_abs_diff(&m) < 1e-12);
        prop_assert!(Matrix::compose(&m, &identity).max_abs_diff(&m) < 1e-12);
    }

    #[test]
    fn prop_compose_applies_first_then_second(
        a in arb_matrix(),
        b in arb_matrix(),
        p in arb_point(),
    ) {
        let composed = Matrix::compose(&a, &b).apply(&p);
        let stepwise = b.apply(&a.apply(&p));
        prop_assert!(close(&composed, &stepwise, 1e-6), "{composed:?} vs {stepwise:?}");
    }

    #[test]
    fn prop_rotations_preserve_length(angle in -7.0..7.0f64, p in arb_point()) {
        for m in [
            Matrix::rotation_x(angle),
            Matrix::rotation_y(angle),
            Matrix::rotation_z(angle),
        ] {
            prop_assert!((m.apply(&p).norm() - p.norm()).abs() < 1e-6);
        }
    }

    #[test]
    fn prop_body_frame_round_trip(g in arb_geometry(), p in arb_point()) {
        let there_and_back = g.world_to_body().then(&g.body_to_world());
        let q = there_and_back.apply(&p);
        prop_assert!(close(&q, &p, 1e-6));
    }
}

// ============================================================================
// Quaternion
// ============================================================================

proptest! {
    #[test]
    fn prop_slerp_endpoints(q0 in arb_unit_quaternion(), q1 in arb_unit_quaternion()) {
        prop_assert_eq!(Quaternion::slerp(&q0, &q1, 0.0), q0);
        prop_assert_eq!(Quaternion::slerp(&q0, &q1, 1.0), q1);
        prop_assert_eq!(Quaternion::slerp(&q0, &q1, -0.5), q0);
        prop_assert_eq!(Quaternion::slerp(&q0, &q1, 1.5), q1);
    }

    #[test]
    fn prop_slerp_stays_near_unit(
        q0 in arb_unit_quaternion(),
        q1 in arb_unit_quaternion(),
        t in 0.0..1.0f64,
    ) {
        let q = Quaternion::slerp(&q0, &q1, t);
        // the linear fallback for nearly equal inputs is not renormalised
        prop_assert!((q.norm() - 1.0).abs() < 1e-4, "norm {}", q.norm());
    }

    #[test]
    fn prop_slerp_ignores_sign_of_end(
        q0 in arb_unit_quaternion(),
        q1 in arb_unit_quaternion(),
        t in 0.0..1.0f64,
    ) {
        let negated = Quaternion::new(-q1.w, -q1.x, -q1.y, -q1.z);
        let a = Quaternion::slerp(&q0, &q1, t);
        let b = Quaternion::slerp(&q0, &negated, t);
        prop_assert!(same_rotation(&a.normalized(), &b.normalized(), 1e-9));
    }

    #[test]
    fn prop_slerp_takes_shorter_arc(
        q0 in arb_unit_quaternion(),
        q1 in arb_unit_quaternion(),
    ) {
        let mid = Quaternion::slerp(&q0, &q1, 0.5).normalized();
        let half = q0.dot(&q1).abs();
        // the midpoint is never further from q0 than q1 is
        prop_assert!(mid.dot(&q0).abs() + 1e-9 >= half);
    }

    #[test]
    fn prop_angles_round_trip(a in arb_angles()) {
        let back = Quaternion::from_angles(&a).to_angles();
        prop_assert!(wrap_pi(back.heading - a.heading).abs() < 1e-9);
        prop_assert!((back.pitch - a.pitch).abs() < 1e-9);
        prop_assert!(wrap_pi(back.bank - a.bank).abs() < 1e-9);
    }

    #[test]
    fn prop_interpolating_equal_angles_is_identity(a in arb_angles(), t in 0.0..1.0f64) {
        let mid = interpolate_angles(&a, &a, t);
        prop_assert!(wrap_pi(mid.heading - a.heading).abs() < 1e-9);
        prop_assert!((mid.pitch - a.pitch).abs() < 1e-9);
        prop_assert!(wrap_pi(mid.bank - a.bank).abs() < 1e-9);
    }

    #[test]
    fn prop_wrap_pi_range(angle in -100.0..100.0f64) {
        let w = wrap_pi(angle);
        prop_assert!(w > -std::f64::consts::PI && w <= std::f64::consts::PI);
        prop_assert!(wrap_pi(w - angle).abs() < 1e-9);
    }
}

// ============================================================================
// Re-georeferencing
// ============================================================================

proptest! {
    #[test]
    fn prop_same_navigation_is_unchanged(g in arb_geometry(), p in arb_point()) {
        let mut cloud = Cloud { geometry: g, points: vec![p] };
        let update = NavUpdate::from_geometry(&g);
        prop_assert_eq!(regeoreference(&mut cloud, &update), GeorefOutcome::Unchanged);
        prop_assert_eq!(cloud.points[0], p);
        prop_assert_eq!(cloud.geometry, g);
    }

    #[test]
    fn prop_update_and_restore(
        g in arb_geometry(),
        moved in arb_geometry(),
        p in arb_point(),
    ) {
        let start = Vector3::new(g.easting + p.x * 0.01, -20.0, g.northing + p.z * 0.01);
        let mut cloud = Cloud { geometry: g, points: vec![start] };

        let update = NavUpdate::from_geometry(&PingGeometry {
            lever_arm: g.lever_arm,
            ..moved
        });
        let outcome = regeoreference(&mut cloud, &update);
        prop_assert_eq!(outcome, GeorefOutcome::Transformed { points: 1 });

        regeoreference(&mut cloud, &NavUpdate::from_geometry(&g));
        prop_assert!(cloud.geometry.approx_eq(&g, 1e-6));
        prop_assert!(close(&cloud.points[0], &start, 1e-5), "{:?}", cloud.points[0]);
    }
}

#[test]
fn test_pure_translation_moves_points_rigidly() {
    let g = PingGeometry {
        easting: 500_000.0,
        northing: 6_000_000.0,
        height: 0.5,
        tide: 0.2,
        heading: 30.0,
        pitch: 2.0,
        roll: -1.0,
        lever_arm: LeverArm {
            starboard: 1.0,
            forward: 2.0,
            height: 0.5,
        },
    };
    let points = vec![
        Vector3::new(500_012.0, -18.0, 6_000_004.0),
        Vector3::new(499_995.0, -19.5, 5_999_990.0),
    ];
    let mut cloud = Cloud {
        geometry: g,
        points: points.clone(),
    };

    let mut update = NavUpdate::from_geometry(&g);
    update.navlon += 3.0;
    update.navlat -= 4.0;
    update.heave += 0.25;

    let mut engine = Regeoreferencer::new(&mut cloud, &update);
    let mut stages = vec![engine.stage()];
    while engine.stage() != GeorefStage::Emit {
        stages.push(engine.step());
    }
    assert_eq!(
        stages,
        vec![
            GeorefStage::Decoded,
            GeorefStage::ComputeOldFrameTransform,
            GeorefStage::ComputeNewFrameTransform,
            GeorefStage::TransformEachPoint,
            GeorefStage::Emit,
        ]
    );
    assert_eq!(engine.run(), GeorefOutcome::Transformed { points: 2 });

    for (moved, old) in cloud.points.iter().zip(&points) {
        let shift = *moved - *old;
        assert!((shift.x - 3.0).abs() < 1e-6, "{shift:?}");
        assert!((shift.y - 0.25).abs() < 1e-6, "{shift:?}");
        assert!((shift.z + 4.0).abs() < 1e-6, "{shift:?}");
    }
    assert!((cloud.geometry.height - (g.height - 0.25)).abs() < 1e-9);
}
