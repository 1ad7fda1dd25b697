//! shimcall - fast late-bound invocation
//!
//! Reflective invocation through `shimcall-reflect` validates everything on
//! every call: member lookup, instance type, arity, and a coercion lookup per
//! argument. This crate compiles a member descriptor once into a shim, a
//! closure that goes straight to the member's typed entry point, so each
//! subsequent call only pays for argument conversion and the call itself.
//!
//! # Architecture
//!
//! ```text
//! MemberDescriptor
//!     │
//!     ▼
//! expr::build / build_by_ref     argument expressions
//!     │
//!     ▼
//! compiler::plan                 CallPlan (instance, args, return, variant)
//!     │
//!     ▼
//! compiler::compile_*            lowering into a shim closure
//!     │
//!     ▼
//! ConstructorShim / MethodShim / RefMethodShim / GetterShim / SetterShim
//! ```
//!
//! Shims come in three tiers selected by their type parameters: untyped
//! (`dyn Object` in, `Value` out), instance-typed (`T` in, `Value` out) and
//! fully typed (`T` in, `R` out).
//!
//! # Example
//!
//! ```ignore
//! use shimcall::{compile_method, TypeInfoExt};
//!
//! let method = info.get_method("test_method_no_overload")?;
//! let shim = compile_method(method)?;
//! let result = shim.invoke(&mut instance, &[Value::from("a"), Value::from("b")])?;
//! ```

pub mod compiler;
pub mod convert;
pub mod error;
pub mod expr;
pub mod facade;
pub mod plan;
pub mod shim;

pub use compiler::{
    compile_constructor, compile_constructor_typed, compile_getter, compile_getter_for,
    compile_getter_typed, compile_method, compile_method_by_ref, compile_method_by_ref_for,
    compile_method_by_ref_typed, compile_method_for, compile_method_typed, compile_setter,
    compile_setter_for, compile_setter_typed,
};
pub use error::{ShimError, ShimResult};
pub use facade::{MethodQuery, TypeInfoExt};
pub use plan::{CallPlan, CallVariant, Tier};
pub use shim::{ConstructorShim, GetterShim, MethodShim, RefMethodShim, SetterShim};
