//! shimcall-reflect - runtime type introspection for Rust types
//!
//! Rust carries no member metadata at run time, so types opt in by
//! registering their constructors, methods and properties through a
//! `TypeBuilder`. The resulting `TypeInfo` supports late-bound lookup (by
//! name, signature and binding flags) and validating reflective invocation
//! over loosely typed `Value`s.
//!
//! # Example
//!
//! ```ignore
//! use shimcall_reflect::{TypeBuilder, TypeRegistry, Value};
//!
//! let info = TypeRegistry::global().register(
//!     TypeBuilder::<Counter>::new()
//!         .constructor(&[], Counter::default)
//!         .method("add", &["n"], Counter::add)
//!         .build(),
//! );
//!
//! let mut counter = Counter::default();
//! let total = info.invoke_method("add", &mut counter, &[Value::from(3i64)])?;
//! ```

pub mod builder;
pub mod convert;
pub mod error;
pub mod flags;
pub mod invoker;
pub mod member;
pub mod registry;
pub mod type_info;
pub mod types;
pub mod value;

pub use builder::{IntoConstructor, IntoMethod, TypeBuilder};
pub use convert::{coerce, find_coercion, is_assignable, Coercion, FromValue, IntoValue};
pub use error::{AbiResult, ReflectError};
pub use flags::BindingFlags;
pub use invoker::{
    BorrowedCtorFn, BorrowedMethodFn, ConstructorInvoker, CtorFn, ErasedBorrowedCtorFn,
    ErasedBorrowedMethodFn, ErasedCtorFn, ErasedGetterFn, ErasedMethodFn, ErasedSetterFn,
    GetterFn, GetterInvoker, MethodFn, MethodInvoker, SetterFn, SetterInvoker, ValueSetterFn,
};
pub use member::{
    ConstructorInfo, MemberDescriptor, MemberKind, MethodInfo, ParameterInfo, PropertyInfo,
    Visibility,
};
pub use registry::TypeRegistry;
pub use type_info::TypeInfo;
pub use types::{ParamType, TypeHandle};
pub use value::{Object, Value};
