//! Conversions between host values and engine [`Variant`]s.
//!
//! `ToVariant` never fails. `FromVariant` checks the variant's tag and, for
//! narrower numeric types, its range; it never truncates or coerces between
//! tags.

use vessel_engine::{VarString, Variant};

use crate::error::{CollectionError, Result};

/// Host value to dynamic value
pub trait ToVariant {
    fn to_variant(&self) -> Variant;
}

/// Dynamic value to host value, verified against `Self`
pub trait FromVariant: Sized {
    fn from_variant(value: &Variant) -> Result<Self>;
}

/// Types that cross the boundary in both directions
pub trait Marshal: ToVariant + FromVariant {}

impl<T: ToVariant + FromVariant> Marshal for T {}

impl<T: ToVariant + ?Sized> ToVariant for &T {
    fn to_variant(&self) -> Variant {
        (**self).to_variant()
    }
}

impl ToVariant for Variant {
    fn to_variant(&self) -> Variant {
        self.clone()
    }
}

impl FromVariant for Variant {
    fn from_variant(value: &Variant) -> Result<Self> {
        Ok(value.clone())
    }
}

impl ToVariant for bool {
    fn to_variant(&self) -> Variant {
        Variant::Bool(*self)
    }
}

impl FromVariant for bool {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Bool(b) => Ok(*b),
            other => Err(CollectionError::conversion::<bool>(other.get_type())),
        }
    }
}

impl ToVariant for i64 {
    fn to_variant(&self) -> Variant {
        Variant::Int(*self)
    }
}

impl FromVariant for i64 {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Int(i) => Ok(*i),
            other => Err(CollectionError::conversion::<i64>(other.get_type())),
        }
    }
}

macro_rules! impl_marshal_narrow_int {
    ($($ty:ty),*) => {
        $(
            impl ToVariant for $ty {
                fn to_variant(&self) -> Variant {
                    Variant::Int(i64::from(*self))
                }
            }

            impl FromVariant for $ty {
                fn from_variant(value: &Variant) -> Result<Self> {
                    match value {
                        Variant::Int(i) => <$ty>::try_from(*i)
                            .map_err(|_| CollectionError::conversion::<$ty>(value.get_type())),
                        other => Err(CollectionError::conversion::<$ty>(other.get_type())),
                    }
                }
            }
        )*
    };
}

impl_marshal_narrow_int!(i8, i16, i32, u8, u16, u32);

impl ToVariant for f64 {
    fn to_variant(&self) -> Variant {
        Variant::Float(*self)
    }
}

impl FromVariant for f64 {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Float(x) => Ok(*x),
            other => Err(CollectionError::conversion::<f64>(other.get_type())),
        }
    }
}

impl ToVariant for f32 {
    fn to_variant(&self) -> Variant {
        Variant::Float(f64::from(*self))
    }
}

impl FromVariant for f32 {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            // Only values that survive the round trip are representable.
            Variant::Float(x) if x.is_nan() || f64::from(*x as f32) == *x => Ok(*x as f32),
            other => Err(CollectionError::conversion::<f32>(other.get_type())),
        }
    }
}

impl ToVariant for str {
    fn to_variant(&self) -> Variant {
        Variant::from(self)
    }
}

impl ToVariant for String {
    fn to_variant(&self) -> Variant {
        Variant::from(self.as_str())
    }
}

impl FromVariant for String {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::String(s) => Ok(s.as_str().to_string()),
            other => Err(CollectionError::conversion::<String>(other.get_type())),
        }
    }
}

impl ToVariant for VarString {
    fn to_variant(&self) -> Variant {
        Variant::String(self.clone())
    }
}

impl FromVariant for VarString {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::String(s) => Ok(s.clone()),
            other => Err(CollectionError::conversion::<VarString>(other.get_type())),
        }
    }
}

/// `None` crosses as `Nil`
impl<T: ToVariant> ToVariant for Option<T> {
    fn to_variant(&self) -> Variant {
        match self {
            Some(value) => value.to_variant(),
            None => Variant::Nil,
        }
    }
}

impl<T: FromVariant> FromVariant for Option<T> {
    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Nil => Ok(None),
            other => T::from_variant(other).map(Some),
        }
    }
}
