// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! 4x3 affine transforms.
//!
//! Points are row vectors: `p' = p * R + t`. Axes are x positive starboard,
//! y positive up, z positive forward. Elementary operations compose onto an
//! accumulator in the order they are called, so
//!
//! ```
//! use sonarcodec::transform::{Matrix, Vector3};
//!
//! let m = Matrix::identity()
//!     .translate(-10.0, 0.0, -20.0)
//!     .rotate_y(std::f64::consts::FRAC_PI_2);
//! let p = m.apply(&Vector3::new(10.0, 0.0, 21.0));
//! assert!((p.x - 1.0).abs() < 1e-12);
//! ```
//!
//! first moves the point, then rotates it.

use std::ops::{Add, Neg, Sub};

use serde::Serialize;

/// A point or offset in the x-right, y-up, z-forward frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Create a vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

/// Affine transform: 3x3 rotation block plus translation row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matrix {
    pub m11: f64,
    pub m12: f64,
    pub m13: f64,
    pub m21: f64,
    pub m22: f64,
    pub m23: f64,
    pub m31: f64,
    pub m32: f64,
    pub m33: f64,
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// The transform that leaves every point unchanged.
    pub const fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m13: 0.0,
            m21: 0.0,
            m22: 1.0,
            m23: 0.0,
            m31: 0.0,
            m32: 0.0,
            m33: 1.0,
            tx: 0.0,
            ty: 0.0,
            tz: 0.0,
        }
    }

    /// Pure translation by `(dx, dy, dz)`.
    pub const fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Self::identity();
        m.tx = dx;
        m.ty = dy;
        m.tz = dz;
        m
    }

    /// Rotation about x (pitch) by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::identity();
        m.m22 = c;
        m.m23 = s;
        m.m32 = -s;
        m.m33 = c;
        m
    }

    /// Rotation about y (heading) by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::identity();
        m.m11 = c;
        m.m13 = -s;
        m.m31 = s;
        m.m33 = c;
        m
    }

    /// Rotation about z (bank) by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::identity();
        m.m11 = c;
        m.m12 = s;
        m.m21 = -s;
        m.m22 = c;
        m
    }

    /// Transform that applies `a` and then `b`.
    ///
    /// Not commutative: `compose(a, b)` and `compose(b, a)` generally differ.
    pub fn compose(a: &Matrix, b: &Matrix) -> Matrix {
        Matrix {
            m11: a.m11 * b.m11 + a.m12 * b.m21 + a.m13 * b.m31,
            m12: a.m11 * b.m12 + a.m12 * b.m22 + a.m13 * b.m32,
            m13: a.m11 * b.m13 + a.m12 * b.m23 + a.m13 * b.m33,

            m21: a.m21 * b.m11 + a.m22 * b.m21 + a.m23 * b.m31,
            m22: a.m21 * b.m12 + a.m22 * b.m22 + a.m23 * b.m32,
            m23: a.m21 * b.m13 + a.m22 * b.m23 + a.m23 * b.m33,

            m31: a.m31 * b.m11 + a.m32 * b.m21 + a.m33 * b.m31,
            m32: a.m31 * b.m12 + a.m32 * b.m22 + a.m33 * b.m32,
            m33: a.m31 * b.m13 + a.m32 * b.m23 + a.m33 * b.m33,

            tx: a.tx * b.m11 + a.ty * b.m21 + a.tz * b.m31 + b.tx,
            ty: a.tx * b.m12 + a.ty * b.m22 + a.tz * b.m32 + b.ty,
            tz: a.tx * b.m13 + a.ty * b.m23 + a.tz * b.m33 + b.tz,
        }
    }

    /// Follow this transform with `next`.
    pub fn then(&self, next: &Matrix) -> Matrix {
        Matrix::compose(self, next)
    }

    /// Follow this transform with a translation.
    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> Matrix {
        self.then(&Matrix::translation(dx, dy, dz))
    }

    /// Follow this transform with a translation by `v`.
    pub fn translate_by(&self, v: &Vector3) -> Matrix {
        self.translate(v.x, v.y, v.z)
    }

    /// Follow this transform with a pitch rotation.
    pub fn rotate_x(&self, pitch: f64) -> Matrix {
        self.then(&Matrix::rotation_x(pitch))
    }

    /// Follow this transform with a heading rotation.
    pub fn rotate_y(&self, heading: f64) -> Matrix {
        self.then(&Matrix::rotation_y(heading))
    }

    /// Follow this transform with a bank rotation.
    pub fn rotate_z(&self, bank: f64) -> Matrix {
        self.then(&Matrix::rotation_z(bank))
    }

    /// Transform a point.
    pub fn apply(&self, p: &Vector3) -> Vector3 {
        Vector3 {
            x: p.x * self.m11 + p.y * self.m21 + p.z * self.m31 + self.tx,
            y: p.x * self.m12 + p.y * self.m22 + p.z * self.m32 + self.ty,
            z: p.x * self.m13 + p.y * self.m23 + p.z * self.m33 + self.tz,
        }
    }

    /// Largest absolute element-wise difference to `other`.
    pub fn max_abs_diff(&self, other: &Matrix) -> f64 {
        let a = self.elements();
        let b = other.elements();
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    fn elements(&self) -> [f64; 12] {
        [
            self.m11, self.m12, self.m13, self.m21, self.m22, self.m23, self.m31, self.m32,
            self.m33, self.tx, self.ty, self.tz,
        ]
    }
}
