//! Structural edits on a single combinator
//!
//! These are the building blocks used by [`crate::Scene`]. Each successful
//! add or delete reports exactly one event to the history sink. Nothing here
//! recompiles the scene.

use crate::events::{ChangeEvent, HistorySink};
use crate::ids::{IdAllocator, NodeId};
use crate::shape::{Shape, ShapeKind, Two};
use crate::value::{SVec3, Scalar};
use crate::{Error, Result};

/// Create a default node of `kind` at the end of `parent`
pub fn add_shape(
    kind: ShapeKind,
    parent: &mut Two,
    ids: &mut IdAllocator,
    history: &mut impl HistorySink,
) -> NodeId {
    let shape = Shape::create(kind, ids);
    let id = shape.id().clone();
    history.record(ChangeEvent::add(&parent.id, &shape));
    parent.shapes.insert(id.clone(), shape);
    id
}

/// Append an existing subtree to `parent`
pub fn insert_shape(
    shape: Shape,
    parent: &mut Two,
    history: &mut impl HistorySink,
) -> Result<NodeId> {
    let id = shape.id().clone();
    if parent.shapes.contains_key(&id) || parent.id == id {
        return Err(Error::DuplicateId(id));
    }
    history.record(ChangeEvent::add(&parent.id, &shape));
    parent.shapes.insert(id.clone(), shape);
    Ok(id)
}

/// Remove a direct child of `parent` together with its subtree
///
/// The delete event is recorded before the child leaves the map. Remaining
/// children keep their order.
pub fn delete_shape(
    child: &NodeId,
    parent: &mut Two,
    history: &mut impl HistorySink,
) -> Result<Shape> {
    let Some(existing) = parent.shapes.get(child) else {
        return Err(Error::ChildNotFound {
            parent: parent.id.clone(),
            child: child.clone(),
        });
    };
    history.record(ChangeEvent::delete(&parent.id, existing));
    parent
        .shapes
        .shift_remove(child)
        .ok_or_else(|| Error::ChildNotFound {
            parent: parent.id.clone(),
            child: child.clone(),
        })
}

/// Delete `old` and append `new` as one edit
///
/// Either both events are recorded or, if `old` is missing or `new` could
/// not be inserted, neither is and `parent` is unchanged.
pub fn replace_shape(
    old: &NodeId,
    new: Shape,
    parent: &mut Two,
    history: &mut impl HistorySink,
) -> Result<Shape> {
    if !parent.shapes.contains_key(old) {
        return Err(Error::ChildNotFound {
            parent: parent.id.clone(),
            child: old.clone(),
        });
    }
    if new.id() == &parent.id || (new.id() != old && parent.shapes.contains_key(new.id())) {
        return Err(Error::DuplicateId(new.id().clone()));
    }
    let removed = delete_shape(old, parent, history)?;
    insert_shape(new, parent, history)?;
    Ok(removed)
}

fn parse_vector(text: &str) -> Result<SVec3> {
    let parts: Vec<&str> = text.split(',').collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(Error::InvalidValue(format!(
            "'{}' is not a vector, expected x,y,z",
            text
        )));
    };
    Ok(SVec3 {
        x: x.parse()?,
        y: y.parse()?,
        z: z.parse()?,
    })
}

fn set_scalar(target: &mut Scalar, text: &str) -> Result<()> {
    target.set_text(text)
}

fn set_vector(target: &mut SVec3, text: &str) -> Result<()> {
    *target = parse_vector(text)?;
    Ok(())
}

/// Set a field of a node from editor text
///
/// Field names are the persisted ones (`radius`, `sideLengths`, `color`,
/// `smoothness`, `content`, ...), plus `transform.position`,
/// `transform.rotation` and `transform.scale`. Vectors are written as
/// `x,y,z`. Value edits are not structural and record no event.
pub fn set_field(shape: &mut Shape, field: &str, text: &str) -> Result<()> {
    if let Some(part) = field.strip_prefix("transform.") {
        let transform = shape.transform_mut();
        return match part {
            "position" => set_vector(&mut transform.position, text),
            "rotation" => set_vector(&mut transform.rotation, text),
            "scale" => set_scalar(&mut transform.scale, text),
            _ => Err(unknown_field(field)),
        };
    }

    match (shape, field) {
        (Shape::Sphere(s), "position") => set_vector(&mut s.position, text),
        (Shape::Sphere(s), "radius") => set_scalar(&mut s.radius, text),
        (Shape::Sphere(s), "color") => set_vector(&mut s.color, text),
        (Shape::Box(b), "radius") => set_scalar(&mut b.radius, text),
        (Shape::Box(b), "sideLengths") => set_vector(&mut b.side_lengths, text),
        (Shape::Box(b), "color") => set_vector(&mut b.color, text),
        (Shape::Torus(t), "radius1") => set_scalar(&mut t.radius1, text),
        (Shape::Torus(t), "radius2") => set_scalar(&mut t.radius2, text),
        (Shape::Torus(t), "color") => set_vector(&mut t.color, text),
        (Shape::InfCylinder(c), "point") => set_vector(&mut c.point, text),
        (Shape::InfCylinder(c), "color") => set_vector(&mut c.color, text),
        (Shape::Cone(c), "point1") => set_vector(&mut c.point1, text),
        (Shape::Cone(c), "point2") => set_vector(&mut c.point2, text),
        (Shape::Cone(c), "radius1") => set_scalar(&mut c.radius1, text),
        (Shape::Cone(c), "radius2") => set_scalar(&mut c.radius2, text),
        (Shape::Cone(c), "color") => set_vector(&mut c.color, text),
        (Shape::Plane(p), "normal") => set_vector(&mut p.normal, text),
        (Shape::Plane(p), "height") => set_scalar(&mut p.height, text),
        (Shape::Plane(p), "color") => set_vector(&mut p.color, text),
        (Shape::Triangle(t), "point1") => set_vector(&mut t.point1, text),
        (Shape::Triangle(t), "point2") => set_vector(&mut t.point2, text),
        (Shape::Triangle(t), "point3") => set_vector(&mut t.point3, text),
        (Shape::Triangle(t), "color") => set_vector(&mut t.color, text),
        (Shape::Custom(c), "content") => {
            c.content = text.to_string();
            Ok(())
        }
        (
            Shape::Union(t) | Shape::Subtraction(t) | Shape::Xor(t) | Shape::Intersection(t),
            "smoothness",
        ) => set_scalar(&mut t.smoothness, text),
        _ => Err(unknown_field(field)),
    }
}

fn unknown_field(field: &str) -> Error {
    Error::InvalidValue(format!("no editable field '{}'", field))
}
