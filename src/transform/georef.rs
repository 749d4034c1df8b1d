// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Re-georeferencing of already georeferenced pings.
//!
//! When navigation or attitude is revised after a ping was written, its
//! soundings are moved from the old world frame back into the vessel body
//! frame and out again into the new world frame:
//!
//! ```text
//! Decoded ──(navigation unchanged)──────────────────────────────────────> Emit
//! Decoded ─> ComputeOldFrameTransform ─> ComputeNewFrameTransform
//!         ─> TransformEachPoint ─> Emit
//! ```
//!
//! The pass is not idempotent in general. It trusts the ping's stored
//! navigation to describe the frame its points are in; points that were
//! already moved under different stored navigation are moved again. Callers
//! track which pings are already in the new frame.
//!
//! World coordinates are x = easting, y = up, z = northing. Angles in
//! [`PingGeometry`] are degrees in the sonar's own convention: roll positive
//! starboard down, pitch positive bow up, height positive down.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::matrix::{Matrix, Vector3};

/// Geometries closer than this in every field count as unchanged.
const UNCHANGED_TOLERANCE: f64 = 1e-9;

/// Transducer lever arm in the vessel body frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeverArm {
    /// Starboard (m)
    pub starboard: f64,
    /// Forward (m)
    pub forward: f64,
    /// Height (m, positive down)
    pub height: f64,
}

impl LeverArm {
    fn body_vector(&self) -> Vector3 {
        Vector3::new(self.starboard, -self.height, self.forward)
    }
}

/// Navigation and attitude under which a ping's points were computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PingGeometry {
    /// Transducer easting (m)
    pub easting: f64,
    /// Transducer northing (m)
    pub northing: f64,
    /// Transducer height (m, positive down)
    pub height: f64,
    /// Tide (m)
    pub tide: f64,
    /// Heading (degrees)
    pub heading: f64,
    /// Pitch (degrees, positive bow up)
    pub pitch: f64,
    /// Roll (degrees, positive starboard down)
    pub roll: f64,
    /// Transducer lever arm
    pub lever_arm: LeverArm,
}

impl PingGeometry {
    /// Lever arm rotated into the world frame by this attitude.
    pub fn lever_arm_world(&self) -> Vector3 {
        Matrix::identity()
            .rotate_z(-self.roll.to_radians())
            .rotate_x(-self.pitch.to_radians())
            .rotate_y(self.heading.to_radians())
            .apply(&self.lever_arm.body_vector())
    }

    /// Heave of the vessel reference point (m, positive up).
    pub fn heave(&self) -> f64 {
        -self.height - self.lever_arm_world().y
    }

    /// Transducer height that corresponds to `heave` at this attitude.
    pub fn height_for_heave(&self, heave: f64) -> f64 {
        -heave - self.lever_arm_world().y
    }

    /// True if every field matches `other` to within `tolerance`.
    pub fn approx_eq(&self, other: &PingGeometry, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        close(self.easting, other.easting)
            && close(self.northing, other.northing)
            && close(self.height, other.height)
            && close(self.tide, other.tide)
            && close(self.heading, other.heading)
            && close(self.pitch, other.pitch)
            && close(self.roll, other.roll)
            && self.lever_arm == other.lever_arm
    }

    /// World to vessel body transform.
    pub fn world_to_body(&self) -> Matrix {
        let lever = self.lever_arm_world();
        Matrix::identity()
            .translate(-self.easting, self.height - self.tide, -self.northing)
            .translate_by(&-lever)
            .rotate_y(-self.heading.to_radians())
            .rotate_x(self.pitch.to_radians())
            .rotate_z(self.roll.to_radians())
    }

    /// Vessel body to world transform; the inverse of [`Self::world_to_body`].
    pub fn body_to_world(&self) -> Matrix {
        let lever = self.lever_arm_world();
        Matrix::identity()
            .rotate_z(-self.roll.to_radians())
            .rotate_x(-self.pitch.to_radians())
            .rotate_y(self.heading.to_radians())
            .translate_by(&lever)
            .translate(self.easting, self.tide - self.height, self.northing)
    }
}

/// Revised navigation for one ping, in vessel conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NavUpdate {
    /// Easting (m)
    pub navlon: f64,
    /// Northing (m)
    pub navlat: f64,
    /// Heading (degrees)
    pub heading: f64,
    /// Roll (degrees, positive starboard up)
    pub roll: f64,
    /// Pitch (degrees, positive bow up)
    pub pitch: f64,
    /// Heave (m, positive up)
    pub heave: f64,
}

impl NavUpdate {
    /// The update that leaves `geometry` unchanged.
    pub fn from_geometry(geometry: &PingGeometry) -> Self {
        Self {
            navlon: geometry.easting,
            navlat: geometry.northing,
            heading: geometry.heading,
            roll: -geometry.roll,
            pitch: geometry.pitch,
            heave: geometry.heave(),
        }
    }

    /// Geometry of a ping after applying this update to `old`.
    pub fn apply_to(&self, old: &PingGeometry) -> PingGeometry {
        let mut new = PingGeometry {
            easting: self.navlon,
            northing: self.navlat,
            heading: self.heading,
            roll: -self.roll,
            pitch: self.pitch,
            ..*old
        };
        new.height = new.height_for_heave(self.heave);
        new
    }
}

/// A ping whose soundings can be moved between world frames.
pub trait Georeferenced {
    /// Current navigation and attitude of the ping.
    fn geometry(&self) -> PingGeometry;

    /// Store revised navigation and attitude.
    fn set_geometry(&mut self, geometry: &PingGeometry);

    /// Number of soundings.
    fn point_count(&self) -> usize;

    /// Visit every sounding as a world-frame point (x east, y up, z north).
    fn for_each_point(&mut self, f: &mut dyn FnMut(&mut Vector3));
}

/// Stage of a re-georeferencing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeorefStage {
    Decoded,
    ComputeOldFrameTransform,
    ComputeNewFrameTransform,
    TransformEachPoint,
    Emit,
}

impl fmt::Display for GeorefStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeorefStage::Decoded => "decoded",
            GeorefStage::ComputeOldFrameTransform => "compute-old-frame",
            GeorefStage::ComputeNewFrameTransform => "compute-new-frame",
            GeorefStage::TransformEachPoint => "transform-points",
            GeorefStage::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// Result of a completed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeorefOutcome {
    /// Navigation matched; nothing was touched.
    Unchanged,
    /// Points and navigation were rewritten.
    Transformed {
        /// Number of soundings moved
        points: usize,
    },
}

/// Drives one ping through the re-georeferencing stages.
pub struct Regeoreferencer<'a, P: Georeferenced + ?Sized> {
    ping: &'a mut P,
    old: PingGeometry,
    new: PingGeometry,
    stage: GeorefStage,
    transform: Matrix,
    outcome: GeorefOutcome,
}

impl<'a, P: Georeferenced + ?Sized> Regeoreferencer<'a, P> {
    /// Prepare to move `ping` to the frame described by `update`.
    pub fn new(ping: &'a mut P, update: &NavUpdate) -> Self {
        let old = ping.geometry();
        let new = update.apply_to(&old);
        Self {
            ping,
            old,
            new,
            stage: GeorefStage::Decoded,
            transform: Matrix::identity(),
            outcome: GeorefOutcome::Unchanged,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> GeorefStage {
        self.stage
    }

    /// Accumulated old-to-new transform.
    pub fn transform(&self) -> &Matrix {
        &self.transform
    }

    /// Geometry the ping will have after the pass.
    pub fn target(&self) -> &PingGeometry {
        &self.new
    }

    /// Advance one stage and return the new stage. `Emit` is terminal.
    pub fn step(&mut self) -> GeorefStage {
        self.stage = match self.stage {
            GeorefStage::Decoded => {
                if self.new.approx_eq(&self.old, UNCHANGED_TOLERANCE) {
                    GeorefStage::Emit
                } else {
                    GeorefStage::ComputeOldFrameTransform
                }
            }
            GeorefStage::ComputeOldFrameTransform => {
                self.transform = self.old.world_to_body();
                GeorefStage::ComputeNewFrameTransform
            }
            GeorefStage::ComputeNewFrameTransform => {
                self.transform = self.transform.then(&self.new.body_to_world());
                GeorefStage::TransformEachPoint
            }
            GeorefStage::TransformEachPoint => {
                let m = self.transform;
                self.ping.for_each_point(&mut |p| *p = m.apply(p));
                self.ping.set_geometry(&self.new);
                self.outcome = GeorefOutcome::Transformed {
                    points: self.ping.point_count(),
                };
                GeorefStage::Emit
            }
            GeorefStage::Emit => GeorefStage::Emit,
        };
        trace!(stage = %self.stage, "re-georeference");
        self.stage
    }

    /// Run to completion.
    pub fn run(mut self) -> GeorefOutcome {
        while self.step() != GeorefStage::Emit {}
        self.outcome
    }
}

/// Move `ping` into the frame described by `update`.
pub fn regeoreference<P: Georeferenced + ?Sized>(ping: &mut P, update: &NavUpdate) -> GeorefOutcome {
    Regeoreferencer::new(ping, update).run()
}
