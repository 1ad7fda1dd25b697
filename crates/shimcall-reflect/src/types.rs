//! Type handles and parameter types
//!
//! `TypeHandle` is the runtime identity of a Rust type (its `TypeId`) paired
//! with the compiler-provided type name for diagnostics. Equality and hashing
//! only look at the `TypeId`.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::value::Value;

/// Runtime identity of a type
#[derive(Clone, Copy)]
pub struct TypeHandle {
    id: TypeId,
    name: &'static str,
}

impl TypeHandle {
    /// Handle for `T`
    #[inline]
    pub fn of<T: ?Sized + Any>() -> Self {
        TypeHandle {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped (`Vec<String>` rather than
    /// `alloc::vec::Vec<alloc::string::String>`)
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }

    /// Check whether this handle identifies `T`
    #[inline]
    pub fn is<T: ?Sized + Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// The loosely typed `Value` type ("any value")
    #[inline]
    pub fn is_value(&self) -> bool {
        self.is::<Value>()
    }

    /// The unit type, used as the return type of void members
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.is::<()>()
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.name)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// Strip module paths from every path segment of a type name.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(segment_start);
            }
            '<' | '>' | ',' | ' ' | '&' | '(' | ')' | '[' | ']' | ';' | '*' => {
                out.push(c);
                segment_start = out.len();
            }
            _ => out.push(c),
        }
    }

    out
}

// ============================================================================
// Parameter types
// ============================================================================

/// Declared type of a formal parameter, by value or by reference
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamType {
    ty: TypeHandle,
    by_ref: bool,
}

impl ParamType {
    /// By-value parameter of type `T`
    pub fn of<T: Any>() -> Self {
        ParamType {
            ty: TypeHandle::of::<T>(),
            by_ref: false,
        }
    }

    /// By-reference parameter whose referent is `T`
    pub fn by_ref<T: Any>() -> Self {
        ParamType {
            ty: TypeHandle::of::<T>(),
            by_ref: true,
        }
    }

    /// Whether the parameter is passed by reference
    pub fn is_by_ref(&self) -> bool {
        self.by_ref
    }

    /// The referent type for by-ref parameters, the type itself otherwise
    pub fn element_type(&self) -> TypeHandle {
        self.ty
    }
}

impl From<TypeHandle> for ParamType {
    fn from(ty: TypeHandle) -> Self {
        ParamType { ty, by_ref: false }
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParamType({})", self)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_ref {
            write!(f, "&mut {}", self.ty)
        } else {
            write!(f, "{}", self.ty)
        }
    }
}
