//! Shape tree to distance-field expression
//!
//! Lowers a [`Shape`] into one expression string for the raymarching
//! shader. Combinators with more than two children are split into nested
//! binary calls before they are emitted.

// String writing is infallible, so .unwrap() is safe here
#![allow(clippy::unwrap_used)]

use std::fmt::Write;

use marcher_scene::{CombinatorKind, IdAllocator, LeafView, Shape, Transform, Two};
use serde::{Deserialize, Serialize};

use crate::preview::{NoPreview, PreviewSink};

/// Emitted when there is nothing to draw
pub const NEUTRAL_EXPR: &str = "Col(0.0, vec3(0.0))";

/// How combinators with three or more children are split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlattenMode {
    /// Rewrite the live tree so the split survives saving and later compiles
    #[default]
    InPlace,
    /// Split a scratch copy and leave the tree as it was
    Transient,
}

/// Turns a shape tree into one `Col`-valued expression
pub struct DistanceFieldCompiler {
    flatten: FlattenMode,
    /// Receives every successful top-level result
    preview: Box<dyn PreviewSink>,
    /// Synthetic nodes created by the current compile
    synthesized: usize,
}

impl Default for DistanceFieldCompiler {
    fn default() -> Self {
        Self::new(FlattenMode::default())
    }
}

impl DistanceFieldCompiler {
    pub fn new(flatten: FlattenMode) -> Self {
        Self {
            flatten,
            preview: Box::new(NoPreview),
            synthesized: 0,
        }
    }

    /// Publish every successful top-level compile to `sink`
    pub fn with_preview(mut self, sink: impl PreviewSink + 'static) -> Self {
        self.preview = Box::new(sink);
        self
    }

    pub fn flatten_mode(&self) -> FlattenMode {
        self.flatten
    }

    pub fn set_flatten_mode(&mut self, flatten: FlattenMode) {
        self.flatten = flatten;
    }

    /// Compile a whole tree
    ///
    /// Returns [`NEUTRAL_EXPR`] when the tree draws nothing. With
    /// [`FlattenMode::InPlace`] this rewrites wide combinators in `shape`
    /// and draws the new node ids from `ids`.
    pub fn compile(&mut self, shape: Option<&mut Shape>, ids: &mut IdAllocator) -> String {
        self.synthesized = 0;
        match self.compile_shape(shape, &Transform::default(), ids) {
            Some(expr) => {
                tracing::debug!(
                    bytes = expr.len(),
                    synthesized = self.synthesized,
                    "compiled scene"
                );
                self.preview.publish(&expr);
                expr
            }
            None => {
                tracing::debug!("scene is empty, using neutral expression");
                NEUTRAL_EXPR.to_string()
            }
        }
    }

    /// Compile one node relative to `parent`, `None` if it draws nothing
    pub fn compile_shape(
        &mut self,
        shape: Option<&mut Shape>,
        parent: &Transform,
        ids: &mut IdAllocator,
    ) -> Option<String> {
        let shape = shape?;
        tracing::trace!(id = %shape.id(), kind = %shape.kind(), "compiling node");

        if let Some(leaf) = shape.as_leaf() {
            return Some(leaf_expr(&leaf, parent));
        }

        if let Shape::Custom(custom) = &*shape {
            return (!custom.content.is_empty()).then(|| custom.content.clone());
        }

        let kind = shape.combinator_kind()?;
        let two = shape.as_two_mut()?;
        self.compile_combinator(kind, two, ids)
    }

    fn compile_combinator(
        &mut self,
        kind: CombinatorKind,
        two: &mut Two,
        ids: &mut IdAllocator,
    ) -> Option<String> {
        match two.shapes.len() {
            0 => None,
            1 => {
                let transform = two.transform;
                self.compile_shape(two.shapes.values_mut().next(), &transform, ids)
            }
            2 => self.compile_pair(kind, two, ids),
            _ => match self.flatten {
                FlattenMode::InPlace => {
                    self.rebalance(kind, two, ids);
                    self.compile_pair(kind, two, ids)
                }
                FlattenMode::Transient => {
                    let mut scratch = two.clone();
                    let mut scratch_ids = ids.clone();
                    self.rebalance(kind, &mut scratch, &mut scratch_ids);
                    self.compile_pair(kind, &mut scratch, ids)
                }
            },
        }
    }

    fn compile_pair(
        &mut self,
        kind: CombinatorKind,
        two: &mut Two,
        ids: &mut IdAllocator,
    ) -> Option<String> {
        let transform = two.transform;
        let smoothness = two.smoothness;
        let mut children = two.shapes.values_mut();
        let first = children.next();
        let second = children.next();

        let left = self.compile_shape(first, &transform, ids);
        let right = self.compile_shape(second, &transform, ids);

        match (left, right) {
            (None, None) => None,
            (Some(expr), None) | (None, Some(expr)) => Some(expr),
            (Some(left), Some(right)) => Some(format!(
                "{}({},{},{})",
                kind.name(),
                left,
                right,
                smoothness
            )),
        }
    }

    /// Keep the first child and move the rest under a new node of the same
    /// kind, transform and smoothness
    fn rebalance(&mut self, kind: CombinatorKind, two: &mut Two, ids: &mut IdAllocator) {
        let mut rest = std::mem::take(&mut two.shapes);
        let Some((first_id, first)) = rest.shift_remove_index(0) else {
            return;
        };

        let synthetic = Two {
            shapes: rest,
            smoothness: two.smoothness,
            transform: two.transform,
            id: ids.next_id(),
        };
        tracing::trace!(
            parent = %two.id,
            synthetic = %synthetic.id,
            moved = synthetic.shapes.len(),
            "split wide combinator"
        );
        self.synthesized += 1;

        two.shapes.insert(first_id, first);
        two.shapes
            .insert(synthetic.id.clone(), Shape::combinator(kind, synthetic));
    }
}

/// `Col(Kind(<point>,<params>...)*<scale>,<color>)`
fn leaf_expr(leaf: &LeafView<'_>, parent: &Transform) -> String {
    let mut code = String::new();
    write!(code, "Col({}(", leaf.kind.name()).unwrap();
    write_local_point(&mut code, leaf.transform, parent);
    for (_, param) in &leaf.params {
        write!(code, ",{}", param).unwrap();
    }
    write!(code, ")*{}", leaf.transform.scale).unwrap();
    if !parent.is_identity() {
        write!(code, "*{}", parent.scale).unwrap();
    }
    write!(code, ",{})", leaf.color).unwrap();
    code
}

/// The sample point in the leaf's frame. The parent transform is undone
/// first, then the leaf's own.
fn write_local_point(code: &mut String, own: &Transform, parent: &Transform) {
    let outer = if parent.is_identity() {
        "p".to_string()
    } else {
        let mut point = String::new();
        write_inverse(&mut point, parent, "p");
        point
    };
    write_inverse(code, own, &outer);
}

fn write_inverse(code: &mut String, transform: &Transform, point: &str) {
    let r = &transform.rotation;
    let t = &transform.position;
    write!(
        code,
        "vec3(inverse(MatrRotateTranslate(D2R({}),D2R({}),D2R({}),{},{},{}))*vec4({},1.0))/{}",
        r.x, r.y, r.z, t.x, t.y, t.z, point, transform.scale
    )
    .unwrap();
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::preview::SharedPreview;
    use marcher_scene::{Custom, NodeId, Scalar, ShapeKind, Sphere};

    const IDENTITY_POINT: &str =
        "vec3(inverse(MatrRotateTranslate(D2R(0.0),D2R(0.0),D2R(0.0),0.0,0.0,0.0))*vec4(p,1.0))/1.0";

    fn sphere(ids: &mut IdAllocator, radius: f32) -> Shape {
        let mut sphere = Sphere::new(ids.next_id());
        sphere.radius = Scalar(radius);
        Shape::Sphere(sphere)
    }

    fn union(ids: &mut IdAllocator, children: impl IntoIterator<Item = Shape>) -> Shape {
        Shape::Union(Two::with_children(ids.next_id(), children))
    }

    fn compile_one(shape: &mut Shape, ids: &mut IdAllocator) -> Option<String> {
        DistanceFieldCompiler::default().compile_shape(Some(shape), &Transform::default(), ids)
    }

    #[test]
    fn test_sphere_expression() {
        let mut ids = IdAllocator::new();
        let mut shape = sphere(&mut ids, 1.0);
        let expr = compile_one(&mut shape, &mut ids).expect("sphere draws");
        assert_eq!(
            expr,
            format!(
                "Col(Sphere({},vec3(0.0,0.0,0.0),1.0)*1.0,vec3(0.8,0.8,0.8))",
                IDENTITY_POINT
            )
        );
    }

    #[test]
    fn test_one_decimal_formatting() {
        let mut ids = IdAllocator::new();
        let mut shape = sphere(&mut ids, 1.2345);
        let expr = compile_one(&mut shape, &mut ids).expect("sphere draws");
        assert!(expr.contains(",1.2)*1.0"));
        assert!(!expr.contains("1.2345"));
    }

    #[test]
    fn test_box_field_order() {
        let mut ids = IdAllocator::new();
        let mut shape = Shape::create(ShapeKind::Box, &mut ids);
        let expr = compile_one(&mut shape, &mut ids).expect("box draws");
        assert!(expr.starts_with("Col(Box("));
        assert!(expr.contains(",0.0,vec3(1.0,1.0,1.0))*1.0,vec3(1.0,0.0,0.0))"));
    }

    #[test]
    fn test_custom_nodes() {
        let mut ids = IdAllocator::new();
        let mut empty = Shape::Custom(Custom::new(ids.next_id()));
        assert_eq!(compile_one(&mut empty, &mut ids), None);

        let mut custom = Custom::new(ids.next_id());
        custom.content = "Col(Sphere(p,vec3(0.0),2.0),vec3(1.0))".to_string();
        let mut shape = Shape::Custom(custom.clone());
        assert_eq!(compile_one(&mut shape, &mut ids), Some(custom.content));
    }

    #[test]
    fn test_empty_combinator_is_none() {
        let mut ids = IdAllocator::new();
        let mut shape = Shape::create(ShapeKind::Intersection, &mut ids);
        assert_eq!(compile_one(&mut shape, &mut ids), None);
    }

    #[test]
    fn test_none_compiles_to_neutral() {
        let mut ids = IdAllocator::new();
        let mut compiler = DistanceFieldCompiler::default();
        assert_eq!(compiler.compile(None, &mut ids), NEUTRAL_EXPR);

        let mut empty = Shape::create(ShapeKind::Union, &mut ids);
        assert_eq!(compiler.compile(Some(&mut empty), &mut ids), NEUTRAL_EXPR);
    }

    #[test]
    fn test_preview_gets_successful_compiles_only() {
        let mut ids = IdAllocator::new();
        let preview = SharedPreview::new();
        let mut compiler = DistanceFieldCompiler::default().with_preview(preview.clone());

        compiler.compile(None, &mut ids);
        assert_eq!(preview.latest(), None);

        let mut shape = sphere(&mut ids, 1.0);
        let expr = compiler.compile(Some(&mut shape), &mut ids);
        assert_eq!(preview.latest(), Some(expr));
    }

    #[test]
    fn test_pair_passes_through_empty_branch() {
        let mut ids = IdAllocator::new();
        let mut alone = sphere(&mut ids, 1.0);
        let expected = compile_one(&mut alone, &mut ids).expect("sphere draws");

        let custom = Shape::Custom(Custom::new(ids.next_id()));
        let mut shape = union(&mut ids, [custom, alone]);
        assert_eq!(compile_one(&mut shape, &mut ids), Some(expected));
    }

    #[test]
    fn test_pair_emits_binary_call() {
        let mut ids = IdAllocator::new();
        let a = sphere(&mut ids, 1.0);
        let b = sphere(&mut ids, 2.0);
        let mut two = Two::with_children(ids.next_id(), [a, b]);
        two.smoothness = Scalar(0.25);
        let mut shape = Shape::Subtraction(two);

        let expr = compile_one(&mut shape, &mut ids).expect("pair draws");
        assert!(expr.starts_with("Subtraction(Col(Sphere("));
        assert!(expr.ends_with(&format!(",{})", Scalar(0.25))));
        assert!(expr.find(",1.0)*1.0").expect("first") < expr.find(",2.0)*1.0").expect("second"));
    }

    #[test]
    fn test_single_child_is_elided() {
        let mut ids = IdAllocator::new();
        let child = sphere(&mut ids, 1.0);
        let mut wrapper = Two::with_children(ids.next_id(), [child.clone()]);
        wrapper.transform.position.y = Scalar(2.0);
        wrapper.transform.scale = Scalar(3.0);
        let parent = wrapper.transform;
        let mut shape = Shape::Union(wrapper);

        let mut child = child;
        let mut compiler = DistanceFieldCompiler::default();
        let expected = compiler.compile_shape(Some(&mut child), &parent, &mut ids);
        assert_eq!(compile_one(&mut shape, &mut ids), expected);

        let expr = expected.expect("child draws");
        assert!(expr.contains("0.0,2.0,0.0))*vec4(p,1.0))/3.0"));
        assert!(expr.contains(")*1.0*3.0,"));
    }

    #[test]
    fn test_in_place_flattening() {
        let mut ids = IdAllocator::new();
        let children = [sphere(&mut ids, 1.0), sphere(&mut ids, 2.0), sphere(&mut ids, 3.0)];
        let first = children[0].id().clone();
        let mut shape = union(&mut ids, children);
        let mut compiler = DistanceFieldCompiler::default();

        let expr = compiler.compile(Some(&mut shape), &mut ids);
        let two = shape.as_two().expect("still a union");
        assert_eq!(two.shapes.len(), 2);
        assert_eq!(two.shapes.keys().next(), Some(&first));

        let synthetic = two.shapes.values().nth(1).expect("synthetic node");
        assert_eq!(synthetic.kind(), ShapeKind::Union);
        assert_eq!(synthetic.as_two().expect("union").shapes.len(), 2);
        assert_eq!(synthetic.id(), &NodeId::new("5"));

        let again = compiler.compile(Some(&mut shape), &mut ids);
        assert_eq!(again, expr);
        assert_eq!(ids.floor(), 5);
    }

    #[test]
    fn test_transient_flattening_leaves_tree() {
        let mut ids = IdAllocator::new();
        let children = (1..=4).map(|r| sphere(&mut ids, r as f32)).collect::<Vec<_>>();
        let mut shape = union(&mut ids, children);
        let before = shape.clone();

        let mut transient = DistanceFieldCompiler::new(FlattenMode::Transient);
        let expr = transient.compile(Some(&mut shape), &mut ids);
        assert_eq!(shape, before);
        assert_eq!(ids.floor(), 5);

        let mut in_place = DistanceFieldCompiler::new(FlattenMode::InPlace);
        assert_eq!(in_place.compile(Some(&mut shape), &mut ids), expr);
        assert_ne!(shape, before);
        assert!(expr.starts_with("Union(Col(Sphere("));
        assert_eq!(expr.matches("Union(").count(), 3);
    }
}
