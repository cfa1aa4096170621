//! The editable scene
//!
//! A [`Scene`] owns the root union (fixed id [`SCENE_ROOT_ID`]). The
//! root itself is never persisted: its first child is the displayed shape,
//! and that child is what gets saved and compiled. Parents are addressed by
//! id, and the root id addresses the root.

use crate::edit;
use crate::events::HistorySink;
use crate::ids::{IdAllocator, NodeId};
use crate::shape::{Shape, ShapeKind, Two};
use crate::{Error, Result};

/// Id of the unpersisted root union
pub const SCENE_ROOT_ID: &str = "shapes";

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    root: Two,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An empty scene
    pub fn new() -> Self {
        Self {
            root: Two::new(NodeId::new(SCENE_ROOT_ID)),
        }
    }

    /// A scene displaying `content`
    pub fn with_content(content: Shape) -> Self {
        let mut scene = Self::new();
        scene.set_content(content);
        scene
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root.id
    }

    pub fn root(&self) -> &Two {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Two {
        &mut self.root
    }

    /// The displayed shape, if any
    pub fn content(&self) -> Option<&Shape> {
        self.root.shapes.values().next()
    }

    pub fn content_mut(&mut self) -> Option<&mut Shape> {
        self.root.shapes.values_mut().next()
    }

    /// Replace everything under the root with `content`
    pub fn set_content(&mut self, content: Shape) {
        self.root.shapes.clear();
        self.root.shapes.insert(content.id().clone(), content);
    }

    pub fn find(&self, id: &NodeId) -> Option<&Shape> {
        self.root.shapes.values().find_map(|shape| shape.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Shape> {
        self.root
            .shapes
            .values_mut()
            .find_map(|shape| shape.find_mut(id))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        id == &self.root.id || self.find(id).is_some()
    }

    /// Id of the combinator holding `id` directly
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        if self.root.shapes.contains_key(id) {
            return Some(&self.root.id);
        }
        self.root
            .shapes
            .values()
            .find_map(|shape| shape.find_parent(id))
    }

    /// Resolve a parent id to a combinator that can hold children
    pub fn combinator_mut(&mut self, id: &NodeId) -> Result<&mut Two> {
        if id == &self.root.id {
            return Ok(&mut self.root);
        }
        self.find_mut(id)
            .ok_or_else(|| Error::ParentNotFound(id.clone()))?
            .as_two_mut()
            .ok_or_else(|| Error::NotACombinator(id.clone()))
    }

    /// Fail if any id of `shape`'s subtree is already in the scene,
    /// ignoring the subtree rooted at `replacing`
    fn check_fresh(&self, shape: &Shape, replacing: Option<&NodeId>) -> Result<()> {
        let replaced = replacing.and_then(|id| self.find(id));
        for id in shape.ids() {
            let taken = self.contains(id) && !replaced.is_some_and(|old| old.contains(id));
            if taken {
                return Err(Error::DuplicateId(id.clone()));
            }
        }
        Ok(())
    }

    /// Create a default `kind` node under `parent`
    pub fn add_shape(
        &mut self,
        kind: ShapeKind,
        parent: &NodeId,
        ids: &mut IdAllocator,
        history: &mut impl HistorySink,
    ) -> Result<NodeId> {
        let target = self.combinator_mut(parent)?;
        let id = edit::add_shape(kind, target, ids, history);
        tracing::debug!(%id, %kind, %parent, "added shape");
        Ok(id)
    }

    /// Re-attach a previously detached subtree under `parent`
    pub fn insert_shape(
        &mut self,
        shape: Shape,
        parent: &NodeId,
        history: &mut impl HistorySink,
    ) -> Result<NodeId> {
        self.check_fresh(&shape, None)?;
        let target = self.combinator_mut(parent)?;
        edit::insert_shape(shape, target, history)
    }

    /// Delete `child` and its subtree from `parent`
    pub fn delete_shape(
        &mut self,
        child: &NodeId,
        parent: &NodeId,
        history: &mut impl HistorySink,
    ) -> Result<Shape> {
        let target = self.combinator_mut(parent)?;
        let removed = edit::delete_shape(child, target, history)?;
        tracing::debug!(%child, %parent, nodes = removed.node_count(), "deleted shape");
        Ok(removed)
    }

    /// Swap `old` for `new` under `parent`
    pub fn replace_shape(
        &mut self,
        old: &NodeId,
        new: Shape,
        parent: &NodeId,
        history: &mut impl HistorySink,
    ) -> Result<Shape> {
        self.check_fresh(&new, Some(old))?;
        let target = self.combinator_mut(parent)?;
        edit::replace_shape(old, new, target, history)
    }

    /// Replace `node` with a fresh default node of `kind`
    ///
    /// Kind decides the field set, so the old node's fields and children
    /// are discarded rather than converted.
    pub fn change_kind(
        &mut self,
        node: &NodeId,
        kind: ShapeKind,
        parent: &NodeId,
        ids: &mut IdAllocator,
        history: &mut impl HistorySink,
    ) -> Result<NodeId> {
        let target = self.combinator_mut(parent)?;
        if !target.shapes.contains_key(node) {
            return Err(Error::ChildNotFound {
                parent: parent.clone(),
                child: node.clone(),
            });
        }
        let fresh = Shape::create(kind, ids);
        let id = fresh.id().clone();
        edit::replace_shape(node, fresh, target, history)?;
        tracing::debug!(old = %node, new = %id, %kind, "changed shape kind");
        Ok(id)
    }
}
