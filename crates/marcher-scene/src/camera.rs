//! Persisted view state
//!
//! Only `loc`, `at` and `up` are authoritative. The viewing direction and
//! right vector are written out for consumers of the saved file but are
//! recomputed whenever a camera is built or decoded.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::value::NumVec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CameraRecord", into = "CameraRecord")]
pub struct CameraState {
    loc: NumVec3,
    at: NumVec3,
    up: NumVec3,
    dir: NumVec3,
    right: NumVec3,
}

#[derive(Serialize, Deserialize)]
struct CameraRecord {
    loc: NumVec3,
    at: NumVec3,
    up: NumVec3,
    #[serde(default)]
    dir: NumVec3,
    #[serde(default)]
    right: NumVec3,
}

impl From<CameraRecord> for CameraState {
    fn from(record: CameraRecord) -> Self {
        Self::new(record.loc.into(), record.at.into(), record.up.into())
    }
}

impl From<CameraState> for CameraRecord {
    fn from(cam: CameraState) -> Self {
        Self {
            loc: cam.loc,
            at: cam.at,
            up: cam.up,
            dir: cam.dir,
            right: cam.right,
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Vec3::new(2.0, 1.5, 2.0), Vec3::ZERO, Vec3::Y)
    }
}

impl CameraState {
    /// Camera at `loc` looking at `at`
    ///
    /// A degenerate setup (`loc == at`, or `up` parallel to the view) yields
    /// zero derived vectors instead of NaNs.
    pub fn new(loc: Vec3, at: Vec3, up: Vec3) -> Self {
        let dir = (at - loc).normalize_or_zero();
        let right = dir.cross(up).normalize_or_zero();
        Self {
            loc: loc.into(),
            at: at.into(),
            up: up.into(),
            dir: dir.into(),
            right: right.into(),
        }
    }

    pub fn loc(&self) -> Vec3 {
        self.loc.to_vec3()
    }

    pub fn at(&self) -> Vec3 {
        self.at.to_vec3()
    }

    pub fn up(&self) -> Vec3 {
        self.up.to_vec3()
    }

    pub fn dir(&self) -> Vec3 {
        self.dir.to_vec3()
    }

    pub fn right(&self) -> Vec3 {
        self.right.to_vec3()
    }

    /// Distance from the eye to the target
    pub fn distance(&self) -> f32 {
        (self.at() - self.loc()).length()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_vectors() {
        let cam = CameraState::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_relative_eq!(cam.dir().z, -1.0);
        assert_relative_eq!(cam.right().x, 1.0);
        assert_relative_eq!(cam.distance(), 5.0);
    }

    #[test]
    fn test_degenerate_camera_has_no_nans() {
        let cam = CameraState::new(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(cam.dir(), Vec3::ZERO);
        assert_eq!(cam.right(), Vec3::ZERO);
    }

    #[test]
    fn test_camera_uses_vec_tag() {
        let json = encode(&CameraState::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["loc"]["dataType"], "Vec");
        assert_eq!(value["dir"]["dataType"], "Vec");
    }

    #[test]
    fn test_decode_recomputes_derived_fields() {
        let json = r#"{
            "loc": {"dataType": "Vec", "value": {"x": 0, "y": 0, "z": 5}},
            "at": {"dataType": "Vec", "value": {"x": 0, "y": 0, "z": 0}},
            "up": {"dataType": "Vec", "value": {"x": 0, "y": 1, "z": 0}},
            "dir": {"dataType": "Vec", "value": {"x": 9, "y": 9, "z": 9}}
        }"#;
        let cam: CameraState = decode(json).unwrap();
        assert_relative_eq!(cam.dir().z, -1.0);
    }

    #[test]
    fn test_camera_round_trip() {
        let cam = CameraState::new(Vec3::new(3.0, 2.0, 1.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y);
        let restored: CameraState = decode(&encode(&cam).unwrap()).unwrap();
        assert_eq!(restored, cam);
    }
}
