//! Loosely typed, shareable values
//!
//! A `Value` is either null or a reference-counted handle to any
//! `Send + Sync` Rust value. It is the "any value" element type of argument
//! containers and the result type of untyped calls.
//!
//! # Encoding
//!
//! ```text
//! null:     data = None
//! boxed:    data = Some(Arc<dyn Object>)   (runtime type recoverable)
//! ```
//!
//! `Value::new(())` produces null, and `Value::new(value)` where `value` is
//! itself a `Value` does not nest.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::{AbiResult, ReflectError};
use crate::types::TypeHandle;

// ============================================================================
// Object
// ============================================================================

/// Any instance the introspection layer can address ("any object").
///
/// Blanket-implemented for every `Any + Send + Sync` type, so `&mut T`
/// coerces to `&mut dyn Object` at call sites.
pub trait Object: Any + Send + Sync {
    /// View as `Any`
    fn as_any(&self) -> &dyn Any;

    /// Mutable view as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Runtime type of this instance
    fn type_handle(&self) -> TypeHandle;

    /// Convert a shared handle into an `Any` handle
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> Object for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn type_handle(&self) -> TypeHandle {
        TypeHandle::of::<T>()
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl dyn Object {
    /// Check the runtime type
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow as `T` if the runtime type matches
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as `T` if the runtime type matches
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

// ============================================================================
// Value
// ============================================================================

/// Loosely typed value handle
#[derive(Clone, Default)]
pub struct Value {
    data: Option<Arc<dyn Object>>,
}

impl Value {
    /// Create a null value
    #[inline]
    pub const fn null() -> Self {
        Value { data: None }
    }

    /// Wrap any value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            return Value::null();
        }
        let mut slot = Some(value);
        if let Some(inner) = (&mut slot as &mut dyn Any).downcast_mut::<Option<Value>>() {
            return inner.take().unwrap_or_default();
        }
        match slot {
            Some(value) => Value {
                data: Some(Arc::new(value)),
            },
            None => Value::null(),
        }
    }

    /// Check if this is the null value
    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Runtime type of the wrapped value (`None` for null)
    #[inline]
    pub fn type_handle(&self) -> Option<TypeHandle> {
        self.data.as_deref().map(Object::type_handle)
    }

    /// Runtime `TypeId` of the wrapped value (`None` for null)
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.data.as_deref().map(|obj| obj.as_any().type_id())
    }

    /// Type name for diagnostics ("null" for null)
    pub fn type_name(&self) -> String {
        match self.type_handle() {
            Some(ty) => ty.short_name(),
            None => "null".to_string(),
        }
    }

    /// Check if the wrapped value is a `T`
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.data.as_deref().is_some_and(|obj| obj.is::<T>())
    }

    /// Borrow the wrapped value as `T`
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|obj| obj.downcast_ref::<T>())
    }

    /// Borrow the wrapped value as an object
    pub fn as_object(&self) -> Option<&dyn Object> {
        self.data.as_deref()
    }

    /// Mutably borrow the wrapped value as an object.
    ///
    /// Only succeeds while this handle is the sole owner; a shared value is
    /// never mutated through one of its clones.
    pub fn object_mut(&mut self) -> Option<&mut dyn Object> {
        self.data.as_mut().and_then(Arc::get_mut)
    }

    /// Mutably borrow the wrapped value as `T` (sole owner only)
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.object_mut().and_then(|obj| obj.downcast_mut::<T>())
    }

    /// Copy the wrapped value out as `T`
    pub fn extract<T: Any + Clone>(&self) -> AbiResult<T> {
        self.downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| self.mismatch::<T>())
    }

    /// Take the wrapped value as `T`, cloning only if the handle is shared
    pub fn into_inner<T: Any + Send + Sync + Clone>(self) -> AbiResult<T> {
        let Some(data) = self.data else {
            return Err(ReflectError::type_mismatch(
                TypeHandle::of::<T>().short_name(),
                "null",
            ));
        };
        let got = (*data).type_handle();
        match data.into_any_arc().downcast::<T>() {
            Ok(arc) => Ok(Arc::try_unwrap(arc).unwrap_or_else(|shared| (*shared).clone())),
            Err(_) => Err(ReflectError::type_mismatch(
                TypeHandle::of::<T>().short_name(),
                got.short_name(),
            )),
        }
    }

    /// Check whether two handles share the same allocation
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn mismatch<T: Any>(&self) -> ReflectError {
        ReflectError::type_mismatch(TypeHandle::of::<T>().short_name(), self.type_name())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(obj) = self.data.as_deref() else {
            return write!(f, "Value::Null");
        };
        if let Some(s) = obj.downcast_ref::<String>() {
            write!(f, "Value::String({:?})", s)
        } else if let Some(s) = obj.downcast_ref::<&'static str>() {
            write!(f, "Value::Str({:?})", s)
        } else if let Some(b) = obj.downcast_ref::<bool>() {
            write!(f, "Value::Bool({})", b)
        } else if let Some(i) = obj.downcast_ref::<i32>() {
            write!(f, "Value::I32({})", i)
        } else if let Some(i) = obj.downcast_ref::<i64>() {
            write!(f, "Value::I64({})", i)
        } else if let Some(x) = obj.downcast_ref::<f64>() {
            write!(f, "Value::F64({})", x)
        } else {
            write!(f, "Value::Object({})", obj.type_handle())
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::new(s.to_string())
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::new(v)
                }
            }
        )*
    };
}

impl_from_for_value!(String, bool, char, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);
