// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Coordinate transforms for sonar soundings.
//!
//! - [`Matrix`] and [`Vector3`]: 4x3 affine transforms with elementary
//!   translate/rotate operations composed in call order
//! - [`Quaternion`] and [`Angles`]: attitude conversion and slerp for
//!   sub-sample attitude estimation
//! - [`georef`]: moving a ping's soundings to revised navigation
//!
//! # Example
//!
//! ```
//! use sonarcodec::transform::{Angles, Quaternion};
//!
//! let q0 = Quaternion::from_angles(&Angles::from_degrees(10.0, 0.0, 0.0));
//! let q1 = Quaternion::from_angles(&Angles::from_degrees(30.0, 0.0, 0.0));
//! let mid = Quaternion::slerp(&q0, &q1, 0.5).to_angles();
//! assert!((mid.heading.to_degrees() - 20.0).abs() < 1e-9);
//! ```

pub mod georef;
pub mod matrix;
pub mod quaternion;

pub use georef::{
    regeoreference, GeorefOutcome, GeorefStage, Georeferenced, LeverArm, NavUpdate,
    PingGeometry, Regeoreferencer,
};
pub use matrix::{Matrix, Vector3};
pub use quaternion::{interpolate_angles, wrap_pi, Angles, Quaternion};
