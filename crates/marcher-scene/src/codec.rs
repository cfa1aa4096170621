//! Tagged JSON codec
//!
//! Wrapper values are persisted as `{"dataType": <tag>, "value": <payload>}`
//! so that decoding rebuilds the right wrapper instead of a bare object:
//!
//! | Type | Tag | Payload |
//! |------|-----|---------|
//! | child map | `Map` | `[[id, shape], ...]` in insertion order |
//! | [`SVec3`] | `SVec` | `{x, y, z}` |
//! | [`NumVec3`] | `Vec` | `{x, y, z}` |
//! | [`Scalar`] | `S` | `{s}` |
//!
//! Payload numbers may also be numeric strings, which is how editor text
//! ends up in older saves.

use std::collections::HashSet;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::ids::IdAllocator;
use crate::shape::Shape;
use crate::value::{NumVec3, SVec3, Scalar};
use crate::{Error, Result};

/// Persistence tag of a wrapper value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Map,
    SVec,
    Vec,
    S,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    #[serde(rename = "dataType")]
    data_type: DataType,
    value: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "dataType")]
    data_type: DataType,
    value: T,
}

impl<T> Envelope<T> {
    fn expect<E: de::Error>(self, tag: DataType) -> std::result::Result<T, E> {
        if self.data_type == tag {
            Ok(self.value)
        } else {
            Err(E::custom(format!(
                "expected dataType {:?}, found {:?}",
                tag, self.data_type
            )))
        }
    }
}

/// Payload number: written as a float, read from a float or numeric text
#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Value(f32),
    Text(String),
}

impl Number {
    fn resolve<E: de::Error>(self) -> std::result::Result<f32, E> {
        let value = match self {
            Number::Value(v) => v,
            Number::Text(text) => text.trim().parse().map_err(|_| {
                E::custom(format!("'{}' is not a number", text))
            })?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(E::custom("non-finite number"))
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ScalarPayload<N> {
    s: N,
}

#[derive(Serialize, Deserialize)]
struct VecPayload<N> {
    x: N,
    y: N,
    z: N,
}

impl VecPayload<Number> {
    fn resolve<E: de::Error>(self) -> std::result::Result<[f32; 3], E> {
        Ok([
            self.x.resolve::<E>()?,
            self.y.resolve::<E>()?,
            self.z.resolve::<E>()?,
        ])
    }
}

fn serialize_wrapped<S: Serializer, T: Serialize>(
    serializer: S,
    data_type: DataType,
    value: &T,
) -> std::result::Result<S::Ok, S::Error> {
    EnvelopeRef { data_type, value }.serialize(serializer)
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_wrapped(serializer, DataType::S, &ScalarPayload { s: self.0 })
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let payload: ScalarPayload<Number> =
            Envelope::deserialize(deserializer)?.expect::<D::Error>(DataType::S)?;
        Ok(Scalar(payload.s.resolve::<D::Error>()?))
    }
}

impl Serialize for SVec3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let payload = VecPayload {
            x: self.x.0,
            y: self.y.0,
            z: self.z.0,
        };
        serialize_wrapped(serializer, DataType::SVec, &payload)
    }
}

impl<'de> Deserialize<'de> for SVec3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let payload: VecPayload<Number> =
            Envelope::deserialize(deserializer)?.expect::<D::Error>(DataType::SVec)?;
        let [x, y, z] = payload.resolve::<D::Error>()?;
        Ok(SVec3::new(x, y, z))
    }
}

impl Serialize for NumVec3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let payload = VecPayload {
            x: self.x,
            y: self.y,
            z: self.z,
        };
        serialize_wrapped(serializer, DataType::Vec, &payload)
    }
}

impl<'de> Deserialize<'de> for NumVec3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let payload: VecPayload<Number> =
            Envelope::deserialize(deserializer)?.expect::<D::Error>(DataType::Vec)?;
        let [x, y, z] = payload.resolve::<D::Error>()?;
        Ok(NumVec3::new(x, y, z))
    }
}

/// `#[serde(with)]` adaptor for a combinator's ordered child map
pub mod tagged_map {
    use indexmap::IndexMap;
    use serde::Deserialize;
    use serde::de::{self, Deserializer};
    use serde::ser::Serializer;

    use super::{DataType, Envelope, serialize_wrapped};
    use crate::ids::NodeId;
    use crate::shape::Shape;

    pub fn serialize<S: Serializer>(
        map: &IndexMap<NodeId, Shape>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<(&NodeId, &Shape)> = map.iter().collect();
        serialize_wrapped(serializer, DataType::Map, &entries)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<NodeId, Shape>, D::Error> {
        let entries: Vec<(NodeId, Shape)> =
            Envelope::deserialize(deserializer)?.expect::<D::Error>(DataType::Map)?;

        let mut map = IndexMap::with_capacity(entries.len());
        for (key, shape) in entries {
            if &key != shape.id() {
                return Err(de::Error::custom(format!(
                    "child keyed as {} has id {}",
                    key,
                    shape.id()
                )));
            }
            if map.insert(key.clone(), shape).is_some() {
                return Err(de::Error::custom(format!("duplicate child {}", key)));
            }
        }
        Ok(map)
    }
}

/// Encode any tagged value (shape tree, camera) as JSON text
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a tagged value that carries no node ids
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

/// Decode a shape tree and advance `ids` past every node id in it
///
/// Fails without touching `ids` if the same id appears twice or an id is
/// too large to allocate past.
pub fn decode_shape(json: &str, ids: &mut IdAllocator) -> Result<Shape> {
    let shape: Shape = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for id in shape.ids() {
        if !seen.insert(id) {
            return Err(Error::DuplicateId(id.clone()));
        }
    }

    let mut observed = ids.clone();
    for id in seen {
        observed.observe(id)?;
    }
    *ids = observed;

    Ok(shape)
}
