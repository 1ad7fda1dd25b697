//! Conversions between `Value` and statically typed Rust values.
//!
//! `FromValue`/`IntoValue` are the static side: member implementations
//! registered through `TypeBuilder` receive their arguments through
//! `FromValue` and hand results back through `IntoValue`.
//!
//! The coercion table is the dynamic side: when a value's runtime type is not
//! exactly the declared parameter type, `coerce` looks for a registered
//! widening (`i32 -> i64`, `f32 -> f64`, `&'static str -> String`, ...).
//!
//! # Example
//!
//! ```ignore
//! #[derive(Clone)]
//! struct Point { x: f64, y: f64 }
//!
//! shimcall_reflect::reflect_value!(Point);
//!
//! let v = Point { x: 1.0, y: 2.0 }.into_value();
//! let p = Point::from_value(&v)?;
//! ```

use std::any::{Any, TypeId};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::error::AbiResult;
use crate::types::TypeHandle;
use crate::value::Value;

/// Convert from `Value` to a Rust type.
pub trait FromValue: Sized + Any {
    /// Convert from a borrowed value, returning an error if the type doesn't match.
    fn from_value(value: &Value) -> AbiResult<Self>;

    /// Convert from an owned value, avoiding a copy when possible.
    fn take_value(value: Value) -> AbiResult<Self> {
        Self::from_value(&value)
    }

    /// Copy out a value already of exactly this type, `None` otherwise.
    ///
    /// Used by in-place entries, which fall back to a converting frame on
    /// `None`.
    fn from_exact(value: &Value) -> Option<Self> {
        Self::from_value(value).ok()
    }
}

/// Convert from a Rust type to `Value`.
pub trait IntoValue: Any + Send + Sync {
    /// Convert to a `Value`.
    fn into_value(self) -> Value;
}

/// Implement `FromValue` and `IntoValue` for `Clone + Send + Sync` types.
#[macro_export]
macro_rules! reflect_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::FromValue for $ty {
                fn from_value(value: &$crate::Value) -> $crate::AbiResult<Self> {
                    value.extract::<$ty>()
                }

                fn take_value(value: $crate::Value) -> $crate::AbiResult<Self> {
                    value.into_inner::<$ty>()
                }

                #[inline]
                fn from_exact(value: &$crate::Value) -> Option<Self> {
                    value.downcast_ref::<$ty>().cloned()
                }
            }

            impl $crate::IntoValue for $ty {
                fn into_value(self) -> $crate::Value {
                    $crate::Value::new(self)
                }
            }
        )*
    };
}

reflect_value!(
    String,
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
);

impl FromValue for Value {
    fn from_value(value: &Value) -> AbiResult<Self> {
        Ok(value.clone())
    }

    fn take_value(value: Value) -> AbiResult<Self> {
        Ok(value)
    }

    fn from_exact(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

// Unit (for members that return void)
impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::null()
    }
}

// ============================================================================
// Coercions
// ============================================================================

/// A runtime widening from one concrete type to another
pub type Coercion = fn(&Value) -> Option<Value>;

macro_rules! widen {
    ($table:ident: $from:ty => $($to:ty),+) => {
        $(
            $table.insert(
                (TypeId::of::<$from>(), TypeId::of::<$to>()),
                |v: &Value| v.downcast_ref::<$from>().map(|x| Value::new(<$to>::from(*x))),
            );
        )+
    };
}

static COERCIONS: Lazy<FxHashMap<(TypeId, TypeId), Coercion>> = Lazy::new(|| {
    let mut table: FxHashMap<(TypeId, TypeId), Coercion> = FxHashMap::default();

    widen!(table: i8 => i16, i32, i64, f32, f64);
    widen!(table: i16 => i32, i64, f32, f64);
    widen!(table: i32 => i64, f64);
    widen!(table: u8 => u16, u32, u64, usize, i16, i32, i64, f32, f64);
    widen!(table: u16 => u32, u64, usize, i32, i64, f32, f64);
    widen!(table: u32 => u64, i64, f64);
    widen!(table: f32 => f64);

    table.insert((TypeId::of::<&'static str>(), TypeId::of::<String>()), |v| {
        v.downcast_ref::<&'static str>().map(|s| Value::new(s.to_string()))
    });
    table.insert((TypeId::of::<char>(), TypeId::of::<String>()), |v| {
        v.downcast_ref::<char>().map(|c| Value::new(c.to_string()))
    });

    table
});

/// Look up the widening from `from` to `to`
pub fn find_coercion(from: TypeId, to: TypeId) -> Option<Coercion> {
    COERCIONS.get(&(from, to)).copied()
}

/// Convert `value` to the runtime type `to`.
///
/// Returns the value unchanged when it already has that type (or when `to`
/// is `Value` itself), a widened copy when a coercion is registered, and
/// `None` otherwise. Null only converts to `Value`.
pub fn coerce(value: &Value, to: TypeHandle) -> Option<Value> {
    if to.is_value() {
        return Some(value.clone());
    }
    let from = value.type_id()?;
    if from == to.id() {
        return Some(value.clone());
    }
    find_coercion(from, to.id()).and_then(|widen| widen(value))
}

/// Check whether values of type `from` are accepted where `to` is declared
pub fn is_assignable(from: TypeHandle, to: TypeHandle) -> bool {
    to.is_value() || from == to || find_coercion(from.id(), to.id()).is_some()
}
