//! Scalar and vector wrappers
//!
//! Every editable number in the tree is a [`Scalar`]. Its canonical text
//! form has exactly one decimal place, which is also the form the
//! distance-field compiler emits. Vectors come in two flavours that behave
//! identically: [`SVec3`] lives inside shapes and [`NumVec3`] is used for
//! plain numeric state such as the camera. Only their persistence tag
//! differs (`SVec` vs `Vec`).

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::Error;

/// Format a number the way the compiler emits it: one decimal place, no
/// negative zero.
pub fn format_number(value: f32) -> String {
    let text = format!("{:.1}", value);
    if text == "-0.0" { "0.0".to_string() } else { text }
}

fn parse_number(text: &str) -> Result<f32, Error> {
    let trimmed = text.trim();
    let value: f32 = trimmed
        .parse()
        .map_err(|_| Error::InvalidValue(format!("'{}' is not a number", trimmed)))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidValue(format!("'{}' is not finite", trimmed)))
    }
}

/// A single editable number
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scalar(pub f32);

impl Scalar {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> f32 {
        self.0
    }

    pub fn set(&mut self, value: f32) {
        self.0 = value;
    }

    /// Replace the value from editor text, leaving it unchanged on error
    pub fn set_text(&mut self, text: &str) -> Result<(), Error> {
        self.0 = parse_number(text)?;
        Ok(())
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl FromStr for Scalar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_number(s).map(Self)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self.0))
    }
}

/// Editable 3-vector stored in shape fields
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SVec3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl SVec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Scalar(x),
            y: Scalar(y),
            z: Scalar(z),
        }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.0, self.y.0, self.z.0)
    }
}

impl fmt::Display for SVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vec3({},{},{})", self.x, self.y, self.z)
    }
}

impl From<Vec3> for SVec3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Plain numeric 3-vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl NumVec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl fmt::Display for NumVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vec3({},{},{})",
            format_number(self.x),
            format_number(self.y),
            format_number(self.z)
        )
    }
}

impl From<Vec3> for NumVec3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<NumVec3> for Vec3 {
    fn from(v: NumVec3) -> Self {
        v.to_vec3()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_one_decimal_text() {
        assert_eq!(Scalar(1.2345).to_string(), "1.2");
        assert_eq!(Scalar(1.0).to_string(), "1.0");
        assert_eq!(Scalar(-3.0).to_string(), "-3.0");
    }

    #[test]
    fn test_negative_zero_is_normalised() {
        assert_eq!(Scalar(-0.0).to_string(), "0.0");
        assert_eq!(Scalar(-0.01).to_string(), "0.0");
    }

    #[test]
    fn test_parse_editor_text() {
        let s: Scalar = " 2.5 ".parse().unwrap();
        assert_eq!(s, Scalar(2.5));
        assert!("abc".parse::<Scalar>().is_err());
        assert!("inf".parse::<Scalar>().is_err());
    }

    #[test]
    fn test_set_text_keeps_value_on_error() {
        let mut s = Scalar(4.0);
        assert!(s.set_text("nope").is_err());
        assert_eq!(s.get(), 4.0);
        s.set_text("7").unwrap();
        assert_eq!(s.get(), 7.0);
    }

    #[test]
    fn test_vector_text() {
        assert_eq!(SVec3::new(0.8, 0.8, 0.8).to_string(), "vec3(0.8,0.8,0.8)");
        assert_eq!(NumVec3::new(1.0, -2.0, 0.04).to_string(), "vec3(1.0,-2.0,0.0)");
    }

    #[test]
    fn test_glam_conversion() {
        let v = SVec3::new(1.0, 2.0, 3.0).to_vec3();
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
        let n: NumVec3 = Vec3::Y.into();
        assert_eq!(n, NumVec3::new(0.0, 1.0, 0.0));
    }
}
