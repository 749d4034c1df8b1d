// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Attitude quaternions and heading/pitch/bank Euler angles.
//!
//! Angles follow the heading > pitch > bank (3-2-1) convention in radians,
//! matching the rotation order of [`super::Matrix`].

use std::f64::consts::{FRAC_PI_2, PI};

use serde::Serialize;

/// Above this |sin(pitch)| the attitude is treated as gimbal locked.
const GIMBAL_LOCK: f64 = 0.9999;

/// Above this cosine the arc is short enough to interpolate linearly.
const SLERP_LINEAR: f64 = 0.9999;

/// Heading, pitch and bank in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Angles {
    pub heading: f64,
    pub pitch: f64,
    pub bank: f64,
}

impl Angles {
    /// Create from radians.
    pub const fn new(heading: f64, pitch: f64, bank: f64) -> Self {
        Self {
            heading,
            pitch,
            bank,
        }
    }

    /// Create from degrees.
    pub fn from_degrees(heading: f64, pitch: f64, bank: f64) -> Self {
        Self::new(heading.to_radians(), pitch.to_radians(), bank.to_radians())
    }
}

/// Quaternion `[w, x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create from components.
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// No rotation.
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Vessel-to-world rotation for the given attitude.
    pub fn from_angles(angles: &Angles) -> Self {
        let (sh, ch) = (angles.heading * 0.5).sin_cos();
        let (sp, cp) = (angles.pitch * 0.5).sin_cos();
        let (sb, cb) = (angles.bank * 0.5).sin_cos();

        Self {
            w: ch * cp * cb + sh * sp * sb,
            x: ch * sp * cb + sh * cp * sb,
            y: -ch * sp * sb + sh * cp * cb,
            z: -sh * sp * cb + ch * cp * sb,
        }
    }

    /// Recover heading, pitch and bank.
    ///
    /// Near ±90° pitch, bank is folded into heading and returned as zero.
    pub fn to_angles(&self) -> Angles {
        let Self { w, x, y, z } = *self;
        let sp = -2.0 * (y * z - w * x);

        if sp.abs() > GIMBAL_LOCK {
            Angles {
                pitch: FRAC_PI_2 * sp,
                heading: (-x * z + w * y).atan2(0.5 - y * y - z * z),
                bank: 0.0,
            }
        } else {
            Angles {
                pitch: sp.asin(),
                heading: (x * z + w * y).atan2(0.5 - x * x - y * y),
                bank: (x * y + w * z).atan2(0.5 - x * x - z * z),
            }
        }
    }

    /// Four-component dot product.
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scale to unit length; a zero quaternion becomes the identity.
    pub fn normalized(&self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            return Self::identity();
        }
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }

    /// Spherical linear interpolation from `q0` (t = 0) to `q1` (t = 1).
    ///
    /// Always takes the shorter arc. `t` outside `(0, 1)` returns the
    /// nearer endpoint unchanged.
    pub fn slerp(q0: &Quaternion, q1: &Quaternion, t: f64) -> Quaternion {
        if t <= 0.0 {
            return *q0;
        }
        if t >= 1.0 {
            return *q1;
        }

        let mut cos_omega = q0.dot(q1);
        let mut end = *q1;
        if cos_omega < 0.0 {
            end = Quaternion::new(-q1.w, -q1.x, -q1.y, -q1.z);
            cos_omega = -cos_omega;
        }

        let (k0, k1) = if cos_omega > SLERP_LINEAR {
            (1.0 - t, t)
        } else {
            let sin_omega = (1.0 - cos_omega * cos_omega).sqrt();
            let omega = sin_omega.atan2(cos_omega);
            (
                ((1.0 - t) * omega).sin() / sin_omega,
                (t * omega).sin() / sin_omega,
            )
        };

        Quaternion {
            w: k0 * q0.w + k1 * end.w,
            x: k0 * q0.x + k1 * end.x,
            y: k0 * q0.y + k1 * end.y,
            z: k0 * q0.z + k1 * end.z,
        }
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_pi(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Interpolate attitude between two samples.
pub fn interpolate_angles(a0: &Angles, a1: &Angles, t: f64) -> Angles {
    let q0 = Quaternion::from_angles(a0);
    let q1 = Quaternion::from_angles(a1);
    Quaternion::slerp(&q0, &q1, t).to_angles()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles_close(a: &Angles, b: &Angles) -> bool {
        wrap_pi(a.heading - b.heading).abs() < 1e-9
            && (a.pitch - b.pitch).abs() < 1e-9
            && wrap_pi(a.bank - b.bank).abs() < 1e-9
    }

    #[test]
    fn test_identity_angles() {
        let q = Quaternion::from_angles(&Angles::default());
        assert_eq!(q, Quaternion::identity());
        assert_eq!(q.to_angles(), Angles::default());
    }

    #[test]
    fn test_angles_roundtrip() {
        let a = Angles::from_degrees(123.0, -4.5, 2.25);
        let q = Quaternion::from_angles(&a);
        assert!((q.norm() - 1.0).abs() < 1e-12);
        assert!(angles_close(&q.to_angles(), &a));
    }

    #[test]
    fn test_gimbal_lock_branch() {
        let q = Quaternion::from_angles(&Angles::new(0.4, FRAC_PI_2, 0.0));
        let a = q.to_angles();
        assert!((a.pitch - FRAC_PI_2).abs() < 1e-3);
        assert_eq!(a.bank, 0.0);
    }

    #[test]
    fn test_slerp_endpoints() {
        let q0 = Quaternion::from_angles(&Angles::from_degrees(10.0, 1.0, 0.0));
        let q1 = Quaternion::from_angles(&Angles::from_degrees(50.0, -2.0, 3.0));
        assert_eq!(Quaternion::slerp(&q0, &q1, 0.0), q0);
        assert_eq!(Quaternion::slerp(&q0, &q1, -1.0), q0);
        assert_eq!(Quaternion::slerp(&q0, &q1, 1.0), q1);
        assert_eq!(Quaternion::slerp(&q0, &q1, 2.0), q1);
    }

    #[test]
    fn test_slerp_midpoint_heading() {
        let a = interpolate_angles(
            &Angles::from_degrees(10.0, 0.0, 0.0),
            &Angles::from_degrees(30.0, 0.0, 0.0),
            0.5,
        );
        assert!((a.heading.to_degrees() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_slerp_short_arc() {
        // 350 -> 10 degrees should pass through 0, not 180
        let a = interpolate_angles(
            &Angles::from_degrees(350.0, 0.0, 0.0),
            &Angles::from_degrees(10.0, 0.0, 0.0),
            0.5,
        );
        assert!(wrap_pi(a.heading).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_pi() {
        assert!((wrap_pi(3.0 * PI / 2.0) + FRAC_PI_2).abs() < 1e-12);
        assert!((wrap_pi(-3.0 * PI / 2.0) - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(wrap_pi(PI), PI);
    }
}
