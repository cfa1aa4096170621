//! Shape tree model
//!
//! A [`Shape`] is a closed tagged union over primitives, boolean
//! combinators and custom code nodes. Primitive parameter fields are
//! declared in the order the compiler emits them as call arguments, and
//! that order is part of the generated expression's format.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{IdAllocator, NodeId};
use crate::value::{SVec3, Scalar};
use crate::{Error, Result};

/// Colour given to most primitives on creation
pub const DEFAULT_COLOR: SVec3 = SVec3::new(0.8, 0.8, 0.8);

/// Position, Euler XYZ rotation in degrees, and uniform scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation in world units
    pub position: SVec3,
    /// Euler angles in degrees
    pub rotation: SVec3,
    /// Uniform scale factor
    pub scale: Scalar,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: SVec3::ZERO,
            rotation: SVec3::ZERO,
            scale: Scalar::ONE,
        }
    }
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Sphere around `position`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Centre in the node's local space
    pub position: SVec3,
    pub radius: Scalar,
    pub transform: Transform,
    /// RGB in `[0, 1]`
    pub color: SVec3,
    pub id: NodeId,
}

/// Rounded box, persisted with kind `Box`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxShape {
    /// Corner rounding
    pub radius: Scalar,
    /// Full extent along each axis
    pub side_lengths: SVec3,
    pub transform: Transform,
    pub color: SVec3,
    pub id: NodeId,
}

/// Torus around the local origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    /// Distance from the centre to the middle of the tube
    pub radius1: Scalar,
    /// Tube radius
    pub radius2: Scalar,
    pub transform: Transform,
    pub color: SVec3,
    pub id: NodeId,
}

/// Infinite cylinder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfCylinder {
    /// Cylinder parameters, passed to the shader call as one vector
    pub point: SVec3,
    pub transform: Transform,
    pub color: SVec3,
    pub id: NodeId,
}

/// Capped cone between two end points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub point1: SVec3,
    pub point2: SVec3,
    /// Radius at `point1`
    pub radius1: Scalar,
    /// Radius at `point2`
    pub radius2: Scalar,
    pub transform: Transform,
    pub color: SVec3,
    pub id: NodeId,
}

/// Infinite plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: SVec3,
    /// Offset along `normal`
    pub height: Scalar,
    pub transform: Transform,
    pub color: SVec3,
    pub id: NodeId,
}

/// Flat triangle through three corners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub point1: SVec3,
    pub point2: SVec3,
    pub point3: SVec3,
    pub transform: Transform,
    pub color: SVec3,
    pub id: NodeId,
}

/// Boolean combinator over an ordered set of children
///
/// The kind lives on the enclosing [`Shape`] variant. Child order is
/// observable in compiled output, so `shapes` keeps insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Two {
    /// Children keyed by their own id
    #[serde(with = "crate::codec::tagged_map")]
    pub shapes: IndexMap<NodeId, Shape>,
    /// Blend radius, `0` for a hard combination
    pub smoothness: Scalar,
    pub transform: Transform,
    pub id: NodeId,
}

/// Hand-written expression emitted verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Custom {
    /// Expression text, empty to contribute nothing
    pub content: String,
    pub transform: Transform,
    pub id: NodeId,
}

impl Sphere {
    pub fn new(id: NodeId) -> Self {
        Self {
            position: SVec3::ZERO,
            radius: Scalar::ONE,
            transform: Transform::default(),
            color: DEFAULT_COLOR,
            id,
        }
    }
}

impl BoxShape {
    pub fn new(id: NodeId) -> Self {
        Self {
            radius: Scalar::ZERO,
            side_lengths: SVec3::splat(1.0),
            transform: Transform::default(),
            color: SVec3::new(1.0, 0.0, 0.0),
            id,
        }
    }
}

impl Torus {
    pub fn new(id: NodeId) -> Self {
        Self {
            radius1: Scalar::ONE,
            radius2: Scalar::new(0.3),
            transform: Transform::default(),
            color: DEFAULT_COLOR,
            id,
        }
    }
}

impl InfCylinder {
    pub fn new(id: NodeId) -> Self {
        Self {
            point: SVec3::splat(1.0),
            transform: Transform::default(),
            color: DEFAULT_COLOR,
            id,
        }
    }
}

impl Cone {
    pub fn new(id: NodeId) -> Self {
        Self {
            point1: SVec3::ZERO,
            point2: SVec3::ZERO,
            radius1: Scalar::ONE,
            radius2: Scalar::ONE,
            transform: Transform::default(),
            color: DEFAULT_COLOR,
            id,
        }
    }
}

impl Plane {
    pub fn new(id: NodeId) -> Self {
        Self {
            normal: SVec3::new(0.0, 1.0, 0.0),
            height: Scalar::ZERO,
            transform: Transform::default(),
            color: DEFAULT_COLOR,
            id,
        }
    }
}

impl Triangle {
    pub fn new(id: NodeId) -> Self {
        Self {
            point1: SVec3::new(1.0, 0.0, 0.0),
            point2: SVec3::new(1.0, 0.0, 0.0),
            point3: SVec3::new(1.0, 0.0, 0.0),
            transform: Transform::default(),
            color: DEFAULT_COLOR,
            id,
        }
    }
}

impl Two {
    pub fn new(id: NodeId) -> Self {
        Self {
            shapes: IndexMap::new(),
            smoothness: Scalar::ZERO,
            transform: Transform::default(),
            id,
        }
    }

    /// Build a combinator that owns the given children in order
    pub fn with_children(id: NodeId, children: impl IntoIterator<Item = Shape>) -> Self {
        let mut two = Self::new(id);
        for child in children {
            two.shapes.insert(child.id().clone(), child);
        }
        two
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Custom {
    pub fn new(id: NodeId) -> Self {
        Self {
            content: String::new(),
            transform: Transform::default(),
            id,
        }
    }
}

/// The four boolean combinator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinatorKind {
    Union,
    Subtraction,
    Xor,
    Intersection,
}

impl CombinatorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Union => "Union",
            Self::Subtraction => "Subtraction",
            Self::Xor => "Xor",
            Self::Intersection => "Intersection",
        }
    }

    pub fn shape_kind(self) -> ShapeKind {
        match self {
            Self::Union => ShapeKind::Union,
            Self::Subtraction => ShapeKind::Subtraction,
            Self::Xor => ShapeKind::Xor,
            Self::Intersection => ShapeKind::Intersection,
        }
    }
}

/// Every kind a node can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Box,
    Torus,
    InfCylinder,
    Cone,
    Plane,
    Triangle,
    Union,
    Subtraction,
    Xor,
    Intersection,
    Custom,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 12] = [
        Self::Sphere,
        Self::Box,
        Self::Torus,
        Self::InfCylinder,
        Self::Cone,
        Self::Plane,
        Self::Triangle,
        Self::Union,
        Self::Subtraction,
        Self::Xor,
        Self::Intersection,
        Self::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sphere => "Sphere",
            Self::Box => "Box",
            Self::Torus => "Torus",
            Self::InfCylinder => "InfCylinder",
            Self::Cone => "Cone",
            Self::Plane => "Plane",
            Self::Triangle => "Triangle",
            Self::Union => "Union",
            Self::Subtraction => "Subtraction",
            Self::Xor => "Xor",
            Self::Intersection => "Intersection",
            Self::Custom => "Custom",
        }
    }

    pub fn combinator(self) -> Option<CombinatorKind> {
        match self {
            Self::Union => Some(CombinatorKind::Union),
            Self::Subtraction => Some(CombinatorKind::Subtraction),
            Self::Xor => Some(CombinatorKind::Xor),
            Self::Intersection => Some(CombinatorKind::Intersection),
            _ => None,
        }
    }

    pub fn is_combinator(self) -> bool {
        self.combinator().is_some()
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidValue(format!("unknown shape kind '{}'", s)))
    }
}

/// Borrowed primitive parameter, in emission order
#[derive(Debug, Clone, Copy)]
pub enum Param<'a> {
    Scalar(&'a Scalar),
    Vector(&'a SVec3),
}

impl fmt::Display for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Scalar(s) => s.fmt(f),
            Param::Vector(v) => v.fmt(f),
        }
    }
}

/// Everything the compiler needs from a primitive
#[derive(Debug, Clone)]
pub struct LeafView<'a> {
    pub kind: ShapeKind,
    pub params: Vec<(&'static str, Param<'a>)>,
    pub transform: &'a Transform,
    pub color: &'a SVec3,
}

/// A node of the shape tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Shape {
    Sphere(Sphere),
    Box(BoxShape),
    Torus(Torus),
    InfCylinder(InfCylinder),
    Cone(Cone),
    Plane(Plane),
    Triangle(Triangle),
    Union(Two),
    Subtraction(Two),
    Xor(Two),
    Intersection(Two),
    Custom(Custom),
}

impl Shape {
    /// Build a node of `kind` with its default field set and a fresh id
    pub fn create(kind: ShapeKind, ids: &mut IdAllocator) -> Self {
        let id = ids.next_id();
        match kind {
            ShapeKind::Sphere => Self::Sphere(Sphere::new(id)),
            ShapeKind::Box => Self::Box(BoxShape::new(id)),
            ShapeKind::Torus => Self::Torus(Torus::new(id)),
            ShapeKind::InfCylinder => Self::InfCylinder(InfCylinder::new(id)),
            ShapeKind::Cone => Self::Cone(Cone::new(id)),
            ShapeKind::Plane => Self::Plane(Plane::new(id)),
            ShapeKind::Triangle => Self::Triangle(Triangle::new(id)),
            ShapeKind::Union => Self::Union(Two::new(id)),
            ShapeKind::Subtraction => Self::Subtraction(Two::new(id)),
            ShapeKind::Xor => Self::Xor(Two::new(id)),
            ShapeKind::Intersection => Self::Intersection(Two::new(id)),
            ShapeKind::Custom => Self::Custom(Custom::new(id)),
        }
    }

    /// Wrap a combinator body in the variant for `kind`
    pub fn combinator(kind: CombinatorKind, two: Two) -> Self {
        match kind {
            CombinatorKind::Union => Self::Union(two),
            CombinatorKind::Subtraction => Self::Subtraction(two),
            CombinatorKind::Xor => Self::Xor(two),
            CombinatorKind::Intersection => Self::Intersection(two),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Box(_) => ShapeKind::Box,
            Self::Torus(_) => ShapeKind::Torus,
            Self::InfCylinder(_) => ShapeKind::InfCylinder,
            Self::Cone(_) => ShapeKind::Cone,
            Self::Plane(_) => ShapeKind::Plane,
            Self::Triangle(_) => ShapeKind::Triangle,
            Self::Union(_) => ShapeKind::Union,
            Self::Subtraction(_) => ShapeKind::Subtraction,
            Self::Xor(_) => ShapeKind::Xor,
            Self::Intersection(_) => ShapeKind::Intersection,
            Self::Custom(_) => ShapeKind::Custom,
        }
    }

    pub fn id(&self) -> &NodeId {
        match self {
            Self::Sphere(s) => &s.id,
            Self::Box(s) => &s.id,
            Self::Torus(s) => &s.id,
            Self::InfCylinder(s) => &s.id,
            Self::Cone(s) => &s.id,
            Self::Plane(s) => &s.id,
            Self::Triangle(s) => &s.id,
            Self::Union(t) | Self::Subtraction(t) | Self::Xor(t) | Self::Intersection(t) => &t.id,
            Self::Custom(c) => &c.id,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Self::Sphere(s) => &s.transform,
            Self::Box(s) => &s.transform,
            Self::Torus(s) => &s.transform,
            Self::InfCylinder(s) => &s.transform,
            Self::Cone(s) => &s.transform,
            Self::Plane(s) => &s.transform,
            Self::Triangle(s) => &s.transform,
            Self::Union(t) | Self::Subtraction(t) | Self::Xor(t) | Self::Intersection(t) => {
                &t.transform
            }
            Self::Custom(c) => &c.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Self::Sphere(s) => &mut s.transform,
            Self::Box(s) => &mut s.transform,
            Self::Torus(s) => &mut s.transform,
            Self::InfCylinder(s) => &mut s.transform,
            Self::Cone(s) => &mut s.transform,
            Self::Plane(s) => &mut s.transform,
            Self::Triangle(s) => &mut s.transform,
            Self::Union(t) | Self::Subtraction(t) | Self::Xor(t) | Self::Intersection(t) => {
                &mut t.transform
            }
            Self::Custom(c) => &mut c.transform,
        }
    }

    pub fn is_combinator(&self) -> bool {
        self.kind().is_combinator()
    }

    pub fn combinator_kind(&self) -> Option<CombinatorKind> {
        self.kind().combinator()
    }

    pub fn as_two(&self) -> Option<&Two> {
        match self {
            Self::Union(t) | Self::Subtraction(t) | Self::Xor(t) | Self::Intersection(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_two_mut(&mut self) -> Option<&mut Two> {
        match self {
            Self::Union(t) | Self::Subtraction(t) | Self::Xor(t) | Self::Intersection(t) => Some(t),
            _ => None,
        }
    }

    /// Parameters, transform and colour of a primitive; `None` for
    /// combinators and custom nodes
    pub fn as_leaf(&self) -> Option<LeafView<'_>> {
        use crate::shape::Param::{Scalar as S, Vector as V};

        let (params, transform, color) = match self {
            Self::Sphere(s) => (
                vec![("position", V(&s.position)), ("radius", S(&s.radius))],
                &s.transform,
                &s.color,
            ),
            Self::Box(b) => (
                vec![("radius", S(&b.radius)), ("sideLengths", V(&b.side_lengths))],
                &b.transform,
                &b.color,
            ),
            Self::Torus(t) => (
                vec![("radius1", S(&t.radius1)), ("radius2", S(&t.radius2))],
                &t.transform,
                &t.color,
            ),
            Self::InfCylinder(c) => (vec![("point", V(&c.point))], &c.transform, &c.color),
            Self::Cone(c) => (
                vec![
                    ("point1", V(&c.point1)),
                    ("point2", V(&c.point2)),
                    ("radius1", S(&c.radius1)),
                    ("radius2", S(&c.radius2)),
                ],
                &c.transform,
                &c.color,
            ),
            Self::Plane(p) => (
                vec![("normal", V(&p.normal)), ("height", S(&p.height))],
                &p.transform,
                &p.color,
            ),
            Self::Triangle(t) => (
                vec![
                    ("point1", V(&t.point1)),
                    ("point2", V(&t.point2)),
                    ("point3", V(&t.point3)),
                ],
                &t.transform,
                &t.color,
            ),
            Self::Union(_)
            | Self::Subtraction(_)
            | Self::Xor(_)
            | Self::Intersection(_)
            | Self::Custom(_) => return None,
        };

        Some(LeafView {
            kind: self.kind(),
            params,
            transform,
            color,
        })
    }

    /// Find a node anywhere in this subtree, including `self`
    pub fn find(&self, id: &NodeId) -> Option<&Shape> {
        if self.id() == id {
            return Some(self);
        }
        self.as_two()?.shapes.values().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Shape> {
        if self.id() == id {
            return Some(self);
        }
        self.as_two_mut()?
            .shapes
            .values_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Id of the combinator directly holding `id`, if it is in this subtree
    pub fn find_parent(&self, id: &NodeId) -> Option<&NodeId> {
        let two = self.as_two()?;
        if two.shapes.contains_key(id) {
            return Some(&two.id);
        }
        two.shapes.values().find_map(|child| child.find_parent(id))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Visit every node depth-first in child order, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Shape)) {
        visit(self);
        if let Some(two) = self.as_two() {
            for child in two.shapes.values() {
                child.walk(visit);
            }
        }
    }

    /// All ids in this subtree, depth-first
    pub fn ids(&self) -> Vec<&NodeId> {
        let mut ids = Vec::new();
        self.walk(&mut |shape| ids.push(shape.id()));
        ids
    }

    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}
