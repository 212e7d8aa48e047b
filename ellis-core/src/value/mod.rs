//! The polymorphic tree node at the center of Ellis: [`Value`].
//!
//! `Value` is a tagged union over eight variants. The four composite
//! variants share their backing storage through an [`Rc`], so copying a
//! `Value` is cheap and mutation is copy-on-write via [`Rc::make_mut`].

mod array;
mod binary;
mod map;
mod u8str;

pub use array::*;
pub use map::*;

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// The backing collection for [`Value::Map`]. Iteration order is insertion
/// order; callers must not depend on any particular order (§3.1).
pub type Map = indexmap::IndexMap<String, Value>;

/// The eight-variant tagged union described in §3.1 of the specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int64(i64),
    Double(f64),
    U8Str(Rc<String>),
    Array(Rc<Vec<Value>>),
    Map(Rc<Map>),
    Binary(Rc<Vec<u8>>),
}

/// A `Value`'s variant, independent of its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Bool,
    Int64,
    Double,
    U8Str,
    Array,
    Map,
    Binary,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Int64 => "int64",
            Kind::Double => "double",
            Kind::U8Str => "u8str",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Binary => "binary",
        };
        f.write_str(s)
    }
}

impl Value {
    // ---- Construction -----------------------------------------------

    pub fn nil() -> Value {
        Value::Nil
    }

    pub fn array() -> Value {
        Value::Array(Rc::new(Vec::new()))
    }

    pub fn array_from(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(items))
    }

    pub fn map() -> Value {
        Value::Map(Rc::new(Map::new()))
    }

    pub fn map_from(entries: Map) -> Value {
        Value::Map(Rc::new(entries))
    }

    pub fn binary() -> Value {
        Value::Binary(Rc::new(Vec::new()))
    }

    pub fn binary_from(bytes: &[u8]) -> Value {
        Value::Binary(Rc::new(bytes.to_vec()))
    }

    pub fn u8str(s: impl Into<String>) -> Value {
        Value::U8Str(Rc::new(s.into()))
    }

    // ---- Variant query ------------------------------------------------

    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::Int64(_) => Kind::Int64,
            Value::Double(_) => Kind::Double,
            Value::U8Str(_) => Kind::U8Str,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
            Value::Binary(_) => Kind::Binary,
        }
    }

    pub fn is_kind(&self, k: Kind) -> bool {
        self.kind() == k
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[track_caller]
    fn type_error(&self, wanted: Kind) -> Error {
        Error::type_mismatch(format!("expected {wanted}, found {}", self.kind()))
    }

    // ---- Read accessors ------------------------------------------------

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.type_error(Kind::Bool)),
        }
    }

    pub fn as_int64(&self) -> Result<i64> {
        match self {
            Value::Int64(i) => Ok(*i),
            _ => Err(self.type_error(Kind::Int64)),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            Value::Double(d) => Ok(*d),
            _ => Err(self.type_error(Kind::Double)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::U8Str(s) => Ok(s.as_str()),
            _ => Err(self.type_error(Kind::U8Str)),
        }
    }

    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Value::Array(a) => Ok(a.as_slice()),
            _ => Err(self.type_error(Kind::Array)),
        }
    }

    pub fn as_map(&self) -> Result<&Map> {
        match self {
            Value::Map(m) => Ok(m),
            _ => Err(self.type_error(Kind::Map)),
        }
    }

    pub fn as_binary(&self) -> Result<&[u8]> {
        match self {
            Value::Binary(b) => Ok(b.as_slice()),
            _ => Err(self.type_error(Kind::Binary)),
        }
    }

    // ---- Mutating accessors (trigger COW) ------------------------------

    pub fn as_array_mut(&mut self) -> Result<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Ok(Rc::make_mut(a)),
            _ => Err(self.type_error(Kind::Array)),
        }
    }

    pub fn as_map_mut(&mut self) -> Result<&mut Map> {
        match self {
            Value::Map(m) => Ok(Rc::make_mut(m)),
            _ => Err(self.type_error(Kind::Map)),
        }
    }

    pub fn as_binary_mut(&mut self) -> Result<&mut Vec<u8>> {
        match self {
            Value::Binary(b) => Ok(Rc::make_mut(b)),
            _ => Err(self.type_error(Kind::Binary)),
        }
    }

    pub fn as_str_mut(&mut self) -> Result<&mut String> {
        match self {
            Value::U8Str(s) => Ok(Rc::make_mut(s)),
            _ => Err(self.type_error(Kind::U8Str)),
        }
    }

    // ---- Assignment / deep copy -----------------------------------------

    /// Replaces the contents of `self` with a (cheap, COW-sharing) copy of
    /// `other`.
    pub fn assign(&mut self, other: &Value) {
        *self = other.clone();
    }

    /// Materializes a payload graph that shares nothing with `self`: every
    /// composite node along the way is freshly allocated, regardless of its
    /// current reference count.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Nil => Value::Nil,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int64(i) => Value::Int64(*i),
            Value::Double(d) => Value::Double(*d),
            Value::U8Str(s) => Value::U8Str(Rc::new((**s).clone())),
            Value::Binary(b) => Value::Binary(Rc::new((**b).clone())),
            Value::Array(a) => {
                Value::Array(Rc::new(a.iter().map(Value::deep_copy).collect()))
            }
            Value::Map(m) => Value::Map(Rc::new(
                m.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect(),
            )),
        }
    }

    // ---- Arithmetic / comparison (§3.1) ----------------------------------

    pub fn try_add(&self, other: &Value) -> Result<Value> {
        self.numeric_op(other, "add", |a, b| a + b, |a, b| a + b)
    }

    pub fn try_sub(&self, other: &Value) -> Result<Value> {
        self.numeric_op(other, "subtract", |a, b| a - b, |a, b| a - b)
    }

    pub fn try_mul(&self, other: &Value) -> Result<Value> {
        self.numeric_op(other, "multiply", |a, b| a * b, |a, b| a * b)
    }

    pub fn try_div(&self, other: &Value) -> Result<Value> {
        self.numeric_op(other, "divide", |a, b| a / b, |a, b| a / b)
    }

    fn numeric_op(
        &self,
        other: &Value,
        verb: &str,
        int_op: impl Fn(i64, i64) -> i64,
        dbl_op: impl Fn(f64, f64) -> f64,
    ) -> Result<Value> {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(int_op(*a, *b))),
            (Value::Double(a), Value::Double(b)) => Ok(Value::Double(dbl_op(*a, *b))),
            _ => Err(Error::type_mismatch(format!(
                "cannot {verb} {} and {}",
                self.kind(),
                other.kind()
            ))),
        }
    }

    /// Ordering between two Int64s or two Doubles; `TYPE_MISMATCH`
    /// otherwise. See also the [`PartialOrd`] impl, which exposes the same
    /// comparison through `<`/`<=`/`>`/`>=` and returns `None` (rather than
    /// an `Error`) for incomparable variants.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => Ok(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => {
                a.partial_cmp(b).ok_or_else(|| Error::type_mismatch("NaN is unordered"))
            }
            _ => Err(Error::type_mismatch(format!(
                "cannot compare {} and {}",
                self.kind(),
                other.kind()
            ))),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int64(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::Int64(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Value {
        Value::Int64(i as i64)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Value {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::u8str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::u8str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Value {
        Value::Binary(Rc::new(b))
    }
}

/// Human-readable rendering for logging and diagnostics. Not to be
/// confused with any codec's wire output.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::U8Str(s) => write!(f, "{s:?}"),
            Value::Binary(b) => write!(f, "<binary {} bytes>", b.len()),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Untagged convenience serialization for diagnostics: a `Value` serializes
/// as whatever its contents naturally look like (a number, a string, a
/// sequence, a map), never as an `{"Int64": 5}`-style enum wrapper.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::U8Str(s) => serializer.serialize_str(s),
            Value::Binary(b) => serializer.serialize_bytes(b),
            Value::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for v in a.iter() {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
