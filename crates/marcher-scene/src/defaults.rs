//! Built-in scene and camera
//!
//! Both are kept in their persisted form and go through the same decoder
//! as saved data, so the allocator is advanced past their ids too.

use crate::camera::CameraState;
use crate::codec;
use crate::ids::IdAllocator;
use crate::shape::{Shape, ShapeKind};

/// A ground plane next to a box with a spherical bite taken out of it
pub const DEFAULT_ROOT: &str = r#"{
  "kind": "Union",
  "shapes": {"dataType": "Map", "value": [
    ["2", {
      "kind": "Plane",
      "normal": {"dataType": "SVec", "value": {"x": 0, "y": 1, "z": 0}},
      "height": {"dataType": "S", "value": {"s": 1}},
      "transform": {
        "position": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
        "rotation": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
        "scale": {"dataType": "S", "value": {"s": 1}}
      },
      "color": {"dataType": "SVec", "value": {"x": 0.6, "y": 0.6, "z": 0.6}},
      "id": "2"
    }],
    ["3", {
      "kind": "Subtraction",
      "shapes": {"dataType": "Map", "value": [
        ["4", {
          "kind": "Box",
          "radius": {"dataType": "S", "value": {"s": 0.1}},
          "sideLengths": {"dataType": "SVec", "value": {"x": 1, "y": 1, "z": 1}},
          "transform": {
            "position": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
            "rotation": {"dataType": "SVec", "value": {"x": 0, "y": 30, "z": 0}},
            "scale": {"dataType": "S", "value": {"s": 1}}
          },
          "color": {"dataType": "SVec", "value": {"x": 1, "y": 0, "z": 0}},
          "id": "4"
        }],
        ["5", {
          "kind": "Sphere",
          "position": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
          "radius": {"dataType": "S", "value": {"s": 1.3}},
          "transform": {
            "position": {"dataType": "SVec", "value": {"x": 0, "y": 0.5, "z": 0}},
            "rotation": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
            "scale": {"dataType": "S", "value": {"s": 1}}
          },
          "color": {"dataType": "SVec", "value": {"x": 0.8, "y": 0.8, "z": 0.8}},
          "id": "5"
        }]
      ]},
      "smoothness": {"dataType": "S", "value": {"s": 0.2}},
      "transform": {
        "position": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
        "rotation": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
        "scale": {"dataType": "S", "value": {"s": 1}}
      },
      "id": "3"
    }]
  ]},
  "smoothness": {"dataType": "S", "value": {"s": 0}},
  "transform": {
    "position": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
    "rotation": {"dataType": "SVec", "value": {"x": 0, "y": 0, "z": 0}},
    "scale": {"dataType": "S", "value": {"s": 1}}
  },
  "id": "1"
}"#;

pub const DEFAULT_CAMERA: &str = r#"{
  "loc": {"dataType": "Vec", "value": {"x": 6, "y": 4, "z": 6}},
  "at": {"dataType": "Vec", "value": {"x": 0, "y": 0, "z": 0}},
  "up": {"dataType": "Vec", "value": {"x": 0, "y": 1, "z": 0}}
}"#;

/// Decode the built-in scene, advancing `ids` past its node ids
pub fn default_content(ids: &mut IdAllocator) -> Shape {
    codec::decode_shape(DEFAULT_ROOT, ids).unwrap_or_else(|err| {
        tracing::error!(%err, "built-in scene failed to decode");
        Shape::create(ShapeKind::Union, ids)
    })
}

pub fn default_camera() -> CameraState {
    codec::decode(DEFAULT_CAMERA).unwrap_or_else(|err| {
        tracing::error!(%err, "built-in camera failed to decode");
        CameraState::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_default_scene_decodes() {
        let mut ids = IdAllocator::new();
        let shape = codec::decode_shape(DEFAULT_ROOT, &mut ids).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Union);
        assert_eq!(shape.node_count(), 5);
        assert_eq!(ids.floor(), 5);
    }

    #[test]
    fn test_default_content_advances_ids() {
        let mut ids = IdAllocator::new();
        let shape = default_content(&mut ids);
        let next = ids.next_id();
        assert!(!shape.contains(&next));
    }

    #[test]
    fn test_default_camera_decodes() {
        let cam: CameraState = codec::decode(DEFAULT_CAMERA).unwrap();
        assert_eq!(cam.loc(), Vec3::new(6.0, 4.0, 6.0));
        assert_eq!(cam, default_camera());
    }
}
