//! Member lookup plus compilation in one step
//!
//! `TypeInfoExt` resolves a member on a `TypeInfo` and hands the descriptor
//! to the compiler. Lookup failures (no match, or an ambiguous overload)
//! surface as `ShimError::MemberNotFound` before anything is compiled.
//!
//! ```ignore
//! use shimcall::{MethodQuery, TypeInfoExt};
//!
//! let shim = info.method_shim(
//!     MethodQuery::new("test_method").signature(&[ParamType::of::<String>(); 3]),
//! )?;
//! let result = shim.invoke(&mut instance, &args)?;
//! ```

use std::any::Any;

use shimcall_reflect::{BindingFlags, MethodInfo, Object, ParamType, TypeInfo, Value};

use crate::compiler;
use crate::error::ShimResult;
use crate::shim::{ConstructorShim, GetterShim, MethodShim, RefMethodShim, SetterShim};

/// Method lookup request: name, binding rules, and optional exact signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodQuery {
    name: String,
    flags: BindingFlags,
    signature: Option<Vec<ParamType>>,
}

impl MethodQuery {
    /// Public instance method called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: BindingFlags::DEFAULT,
            signature: None,
        }
    }

    /// Replace the binding rules
    pub fn flags(mut self, flags: BindingFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Require exactly these parameter types
    pub fn signature(mut self, signature: &[ParamType]) -> Self {
        self.signature = Some(signature.to_vec());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for MethodQuery {
    fn from(name: &str) -> Self {
        MethodQuery::new(name)
    }
}

impl From<String> for MethodQuery {
    fn from(name: String) -> Self {
        MethodQuery::new(name)
    }
}

/// Shim construction directly from a `TypeInfo`
pub trait TypeInfoExt {
    /// Look up the method a query selects
    fn resolve_method(&self, query: impl Into<MethodQuery>) -> ShimResult<&MethodInfo>;

    /// Untyped method shim
    fn method_shim(&self, query: impl Into<MethodQuery>)
        -> ShimResult<MethodShim<dyn Object, Value>>;

    /// Instance-typed method shim
    fn method_shim_for<T: Any + Send + Sync>(
        &self,
        query: impl Into<MethodQuery>,
    ) -> ShimResult<MethodShim<T, Value>>;

    /// Fully typed method shim
    fn method_shim_typed<T: Any + Send + Sync, R: Any>(
        &self,
        query: impl Into<MethodQuery>,
    ) -> ShimResult<MethodShim<T, R>>;

    /// Method shim writing by-ref parameters back (`R = Value` for an
    /// untyped result)
    fn method_shim_by_ref<T: Any + Send + Sync, R: Any>(
        &self,
        query: impl Into<MethodQuery>,
    ) -> ShimResult<RefMethodShim<T, R>>;

    /// Untyped constructor shim for the constructor with `signature`
    fn constructor_shim(&self, signature: &[ParamType]) -> ShimResult<ConstructorShim<Value>>;

    /// Typed constructor shim for the constructor with `signature`
    fn constructor_shim_typed<T: Any + Send + Sync>(
        &self,
        signature: &[ParamType],
    ) -> ShimResult<ConstructorShim<T>>;

    /// Untyped shim for a public property's get accessor
    fn getter_shim(&self, name: &str) -> ShimResult<GetterShim<dyn Object, Value>>;

    /// Typed shim for a public property's get accessor
    fn getter_shim_typed<T: Any + Send + Sync, V: Any>(
        &self,
        name: &str,
    ) -> ShimResult<GetterShim<T, V>>;

    /// Untyped shim for a public property's set accessor
    fn setter_shim(&self, name: &str) -> ShimResult<SetterShim<dyn Object, Value>>;

    /// Typed shim for a public property's set accessor
    fn setter_shim_typed<T: Any + Send + Sync, V: Any + Send + Sync>(
        &self,
        name: &str,
    ) -> ShimResult<SetterShim<T, V>>;
}

impl TypeInfoExt for TypeInfo {
    fn resolve_method(&self, query: impl Into<MethodQuery>) -> ShimResult<&MethodInfo> {
        let query = query.into();
        tracing::trace!(
            type_name = self.name(),
            member = %query.name,
            flags = ?query.flags,
            "resolving method"
        );
        Ok(self.find_method(&query.name, query.flags, query.signature.as_deref())?)
    }

    fn method_shim(
        &self,
        query: impl Into<MethodQuery>,
    ) -> ShimResult<MethodShim<dyn Object, Value>> {
        compiler::compile_method(self.resolve_method(query)?)
    }

    fn method_shim_for<T: Any + Send + Sync>(
        &self,
        query: impl Into<MethodQuery>,
    ) -> ShimResult<MethodShim<T, Value>> {
        compiler::compile_method_for::<T>(self.resolve_method(query)?)
    }

    fn method_shim_typed<T: Any + Send + Sync, R: Any>(
        &self,
        query: impl Into<MethodQuery>,
    ) -> ShimResult<MethodShim<T, R>> {
        compiler::compile_method_typed::<T, R>(self.resolve_method(query)?)
    }

    fn method_shim_by_ref<T: Any + Send + Sync, R: Any>(
        &self,
        query: impl Into<MethodQuery>,
    ) -> ShimResult<RefMethodShim<T, R>> {
        compiler::compile_method_by_ref_typed::<T, R>(self.resolve_method(query)?)
    }

    fn constructor_shim(&self, signature: &[ParamType]) -> ShimResult<ConstructorShim<Value>> {
        compiler::compile_constructor(self.get_constructor(signature)?)
    }

    fn constructor_shim_typed<T: Any + Send + Sync>(
        &self,
        signature: &[ParamType],
    ) -> ShimResult<ConstructorShim<T>> {
        compiler::compile_constructor_typed::<T>(self.get_constructor(signature)?)
    }

    fn getter_shim(&self, name: &str) -> ShimResult<GetterShim<dyn Object, Value>> {
        compiler::compile_getter(self.get_property(name)?)
    }

    fn getter_shim_typed<T: Any + Send + Sync, V: Any>(
        &self,
        name: &str,
    ) -> ShimResult<GetterShim<T, V>> {
        compiler::compile_getter_typed::<T, V>(self.get_property(name)?)
    }

    fn setter_shim(&self, name: &str) -> ShimResult<SetterShim<dyn Object, Value>> {
        compiler::compile_setter(self.get_property(name)?)
    }

    fn setter_shim_typed<T: Any + Send + Sync, V: Any + Send + Sync>(
        &self,
        name: &str,
    ) -> ShimResult<SetterShim<T, V>> {
        compiler::compile_setter_typed::<T, V>(self.get_property(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = MethodQuery::from("run")
            .flags(BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
            .signature(&[ParamType::of::<String>()]);

        assert_eq!(query.name(), "run");
        assert_eq!(query.flags, BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE);
        assert_eq!(query.signature, Some(vec![ParamType::of::<String>()]));
    }

    #[test]
    fn test_query_defaults() {
        let query = MethodQuery::new(String::from("run"));
        assert_eq!(query.flags, BindingFlags::DEFAULT);
        assert!(query.signature.is_none());
    }
}
