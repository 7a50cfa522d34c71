use std::fmt;
use gc::{Gc, Trace, Finalize};

use crate::status::Status;
use crate::storage::{ArrayRef, Comparing, DictRef, Visiting};

/// Dynamic value stored in every engine slot.
///
/// `==` compares nested containers by content. `Float(NaN)` is unequal to
/// itself there, as in IEEE 754; dictionary keys use [`Variant::key_eq`].
#[derive(Debug, Clone, Default, Trace, Finalize)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(VarString),
    Array(ArrayRef),
    Dictionary(DictRef),
}

/// Type tag of a [`Variant`]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantType {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Array = 5,
    Dictionary = 6,
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantType::Nil => "Nil",
            VariantType::Bool => "Bool",
            VariantType::Int => "Int",
            VariantType::Float => "Float",
            VariantType::String => "String",
            VariantType::Array => "Array",
            VariantType::Dictionary => "Dictionary",
        };
        f.write_str(name)
    }
}

impl Variant {
    pub fn get_type(&self) -> VariantType {
        match self {
            Variant::Nil => VariantType::Nil,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int(_) => VariantType::Int,
            Variant::Float(_) => VariantType::Float,
            Variant::String(_) => VariantType::String,
            Variant::Array(_) => VariantType::Array,
            Variant::Dictionary(_) => VariantType::Dictionary,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    /// Equality used to match dictionary keys: like `==`, except that a
    /// `NaN` key matches another `NaN`.
    pub fn key_eq(&self, other: &Variant) -> bool {
        self.equals(other, Compare::Key, &mut Comparing::new())
    }

    pub(crate) fn equals(&self, other: &Variant, mode: Compare, comparing: &mut Comparing) -> bool {
        match (self, other) {
            (Variant::Nil, Variant::Nil) => true,
            (Variant::Bool(a), Variant::Bool(b)) => a == b,
            (Variant::Int(a), Variant::Int(b)) => a == b,
            (Variant::Float(a), Variant::Float(b)) => a == b || (mode == Compare::Key && a.is_nan() && b.is_nan()),
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Array(a), Variant::Array(b)) => a.equals(b, mode, comparing),
            (Variant::Dictionary(a), Variant::Dictionary(b)) => a.equals(b, mode, comparing),
            _ => false,
        }
    }

    /// Copy for storage in a duplicated container. Nested containers are
    /// shared unless `deep` is set.
    pub(crate) fn duplicate_in(&self, deep: bool, visiting: &mut Visiting) -> Result<Variant, Status> {
        match self {
            Variant::Array(array) if deep => array.duplicate_in(true, visiting).map(Variant::Array),
            Variant::Dictionary(dict) if deep => dict.duplicate_in(true, visiting).map(Variant::Dictionary),
            other => Ok(other.clone()),
        }
    }

    /// Render; strings are quoted when `nested` inside a container.
    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, nested: bool, visiting: &mut Visiting) -> fmt::Result {
        match self {
            Variant::String(s) if nested => write!(f, "\"{}\"", s),
            Variant::Array(array) => array.render(f, visiting),
            Variant::Dictionary(dict) => dict.render(f, visiting),
            other => write!(f, "{}", other),
        }
    }
}

/// How [`Variant::equals`] treats `NaN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Compare {
    Value,
    Key,
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, Compare::Value, &mut Comparing::new())
    }
}

/// GC-managed string payload
#[derive(Debug, Clone, Trace, Finalize)]
pub struct VarString {
    data: Gc<String>,
}

impl PartialEq for VarString {
    fn eq(&self, other: &Self) -> bool {
        self.data.as_str() == other.data.as_str()
    }
}

impl VarString {
    pub fn new(s: String) -> Self {
        Self { data: Gc::new(s) }
    }

    pub fn as_str(&self) -> &str {
        self.data.as_str()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for VarString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data.as_str())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Nil => write!(f, "null"),
            Variant::Bool(b) => write!(f, "{}", b),
            Variant::Int(i) => write!(f, "{}", i),
            Variant::Float(x) => write!(f, "{:?}", x),
            Variant::String(s) => write!(f, "{}", s),
            Variant::Array(array) => write!(f, "{}", array),
            Variant::Dictionary(dict) => write!(f, "{}", dict),
        }
    }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self {
        Variant::Bool(b)
    }
}

impl From<i64> for Variant {
    fn from(i: i64) -> Self {
        Variant::Int(i)
    }
}

impl From<f64> for Variant {
    fn from(x: f64) -> Self {
        Variant::Float(x)
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Variant::String(VarString::new(s))
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Variant::String(VarString::new(s.to_string()))
    }
}

impl From<VarString> for Variant {
    fn from(s: VarString) -> Self {
        Variant::String(s)
    }
}
