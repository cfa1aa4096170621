//! Saving and loading scenes through a [`Store`]
//!
//! Loading never fails outright: a missing entry or unreadable data falls
//! back to the built-in defaults, and the reason is logged.

use crate::camera::CameraState;
use crate::codec;
use crate::defaults;
use crate::ids::IdAllocator;
use crate::shape::Shape;
use crate::store::{CAMERA_KEY, ROOT_KEY, Store};
use crate::Result;

pub fn save_content(store: &mut impl Store, content: &Shape) -> Result<()> {
    let json = codec::encode(content)?;
    store.set(ROOT_KEY, &json)?;
    tracing::debug!(nodes = content.node_count(), bytes = json.len(), "saved scene");
    Ok(())
}

pub fn save_camera(store: &mut impl Store, camera: &CameraState) -> Result<()> {
    store.set(CAMERA_KEY, &codec::encode(camera)?)
}

/// Read the persisted top-level shape, `None` if nothing was saved
pub fn load_content(store: &impl Store, ids: &mut IdAllocator) -> Result<Option<Shape>> {
    match store.get(ROOT_KEY)? {
        Some(json) => codec::decode_shape(&json, ids).map(Some),
        None => Ok(None),
    }
}

pub fn load_camera(store: &impl Store) -> Result<Option<CameraState>> {
    match store.get(CAMERA_KEY)? {
        Some(json) => codec::decode(&json).map(Some),
        None => Ok(None),
    }
}

/// Persisted shape, or the built-in scene if there is none or it is broken
pub fn load_content_or_default(store: &impl Store, ids: &mut IdAllocator) -> Shape {
    match load_content(store, ids) {
        Ok(Some(shape)) => {
            tracing::debug!(nodes = shape.node_count(), "loaded scene");
            shape
        }
        Ok(None) => {
            tracing::debug!("no saved scene, using default");
            defaults::default_content(ids)
        }
        Err(err) => {
            tracing::warn!(%err, "saved scene could not be loaded, using default");
            defaults::default_content(ids)
        }
    }
}

pub fn load_camera_or_default(store: &impl Store) -> CameraState {
    match load_camera(store) {
        Ok(Some(camera)) => camera,
        Ok(None) => defaults::default_camera(),
        Err(err) => {
            tracing::warn!(%err, "saved camera could not be loaded, using default");
            defaults::default_camera()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shape::{ShapeKind, Two};
    use crate::store::MemoryStore;
    use glam::Vec3;

    #[test]
    fn test_save_then_load() {
        let mut ids = IdAllocator::new();
        let sphere = Shape::create(ShapeKind::Sphere, &mut ids);
        let tree = Shape::Union(Two::with_children(ids.next_id(), [sphere]));
        let mut store = MemoryStore::new();
        save_content(&mut store, &tree).unwrap();

        let mut fresh = IdAllocator::new();
        let loaded = load_content_or_default(&store, &mut fresh);
        assert_eq!(loaded, tree);
        assert_eq!(fresh.floor(), 2);
    }

    #[test]
    fn test_missing_entry_uses_default() {
        let store = MemoryStore::new();
        let mut ids = IdAllocator::new();
        let loaded = load_content_or_default(&store, &mut ids);
        assert_eq!(loaded, codec::decode_shape(defaults::DEFAULT_ROOT, &mut IdAllocator::new()).unwrap());
    }

    #[test]
    fn test_malformed_entry_uses_default() {
        let mut store = MemoryStore::new();
        store
            .set(ROOT_KEY, r#"{"kind":"Sphere","radius":{"dataType":"Nope"}}"#)
            .unwrap();
        let mut ids = IdAllocator::new();
        let loaded = load_content_or_default(&store, &mut ids);
        assert_eq!(loaded.node_count(), 5);
        assert!(load_content(&store, &mut IdAllocator::new()).is_err());
    }

    #[test]
    fn test_oversized_id_uses_default() {
        let mut ids = IdAllocator::new();
        let sphere = Shape::create(ShapeKind::Sphere, &mut ids);
        let big = crate::NodeId::new(u64::MAX.to_string());
        let tree = Shape::Union(Two::with_children(big, [sphere]));
        let mut store = MemoryStore::new();
        save_content(&mut store, &tree).unwrap();

        let mut fresh = IdAllocator::new();
        let loaded = load_content_or_default(&store, &mut fresh);
        assert_eq!(loaded.node_count(), 5);
        assert_eq!(fresh.floor(), 5);
        assert_eq!(fresh.next_id().as_str(), "6");
    }

    #[test]
    fn test_camera_save_then_load() {
        let mut store = MemoryStore::new();
        assert_eq!(load_camera_or_default(&store), defaults::default_camera());

        let cam = CameraState::new(Vec3::X, Vec3::ZERO, Vec3::Y);
        save_camera(&mut store, &cam).unwrap();
        assert_eq!(load_camera_or_default(&store), cam);

        store.set(CAMERA_KEY, "not json").unwrap();
        assert_eq!(load_camera_or_default(&store), defaults::default_camera());
    }
}
