//! Compiled shims
//!
//! A shim is the lowered form of a call plan: one boxed closure plus the
//! rendered member name for diagnostics. Shims are immutable, `Send + Sync`
//! and owned by the caller; nothing is cached on the compiler side.
//!
//! Type parameters select the tier. `I` is the receiver (`dyn Object` or the
//! declaring type); `R`/`V` is the result or property value (`Value` or a
//! concrete type).
//!
//! Invocation does not re-validate arity: passing fewer arguments than the
//! member declares panics on the out-of-range container read.

use std::fmt;

use shimcall_reflect::Value;

use crate::error::ShimResult;

type CtorCall<T> = Box<dyn Fn(&[Value]) -> ShimResult<T> + Send + Sync>;
type MethodCall<I, R> = Box<dyn Fn(&mut I, &[Value]) -> ShimResult<R> + Send + Sync>;
type RefMethodCall<I, R> = Box<dyn Fn(&mut I, &mut [Value]) -> ShimResult<R> + Send + Sync>;
type GetterCall<I, V> = Box<dyn Fn(&I) -> ShimResult<V> + Send + Sync>;
type SetterCall<I, V> = Box<dyn Fn(&mut I, V) -> ShimResult<()> + Send + Sync>;

/// Compiled constructor
pub struct ConstructorShim<T> {
    member: String,
    call: CtorCall<T>,
}

impl<T> ConstructorShim<T> {
    pub(crate) fn new<F>(member: String, call: F) -> Self
    where
        F: Fn(&[Value]) -> ShimResult<T> + Send + Sync + 'static,
    {
        Self {
            member,
            call: Box::new(call),
        }
    }

    /// Construct a new instance
    #[inline]
    pub fn invoke(&self, args: &[Value]) -> ShimResult<T> {
        (self.call)(args)
    }

    /// Signature of the compiled member
    pub fn member(&self) -> &str {
        &self.member
    }
}

/// Compiled instance method
pub struct MethodShim<I: ?Sized, R> {
    member: String,
    call: MethodCall<I, R>,
}

impl<I: ?Sized, R> MethodShim<I, R> {
    pub(crate) fn new<F>(member: String, call: F) -> Self
    where
        F: Fn(&mut I, &[Value]) -> ShimResult<R> + Send + Sync + 'static,
    {
        Self {
            member,
            call: Box::new(call),
        }
    }

    /// Invoke on `instance`; by-ref parameters receive copies
    #[inline]
    pub fn invoke(&self, instance: &mut I, args: &[Value]) -> ShimResult<R> {
        (self.call)(instance, args)
    }

    /// Signature of the compiled member
    pub fn member(&self) -> &str {
        &self.member
    }
}

/// Compiled instance method that writes by-ref parameters back
pub struct RefMethodShim<I: ?Sized, R> {
    member: String,
    call: RefMethodCall<I, R>,
}

impl<I: ?Sized, R> RefMethodShim<I, R> {
    pub(crate) fn new<F>(member: String, call: F) -> Self
    where
        F: Fn(&mut I, &mut [Value]) -> ShimResult<R> + Send + Sync + 'static,
    {
        Self {
            member,
            call: Box::new(call),
        }
    }

    /// Invoke on `instance`, storing by-ref results into `args`
    #[inline]
    pub fn invoke(&self, instance: &mut I, args: &mut [Value]) -> ShimResult<R> {
        (self.call)(instance, args)
    }

    /// Signature of the compiled member
    pub fn member(&self) -> &str {
        &self.member
    }
}

/// Compiled property read
pub struct GetterShim<I: ?Sized, V> {
    member: String,
    call: GetterCall<I, V>,
}

impl<I: ?Sized, V> GetterShim<I, V> {
    pub(crate) fn new<F>(member: String, call: F) -> Self
    where
        F: Fn(&I) -> ShimResult<V> + Send + Sync + 'static,
    {
        Self {
            member,
            call: Box::new(call),
        }
    }

    /// Read the property of `instance`
    #[inline]
    pub fn invoke(&self, instance: &I) -> ShimResult<V> {
        (self.call)(instance)
    }

    /// Name of the compiled property
    pub fn member(&self) -> &str {
        &self.member
    }
}

/// Compiled property write
pub struct SetterShim<I: ?Sized, V> {
    member: String,
    call: SetterCall<I, V>,
}

impl<I: ?Sized, V> SetterShim<I, V> {
    pub(crate) fn new<F>(member: String, call: F) -> Self
    where
        F: Fn(&mut I, V) -> ShimResult<()> + Send + Sync + 'static,
    {
        Self {
            member,
            call: Box::new(call),
        }
    }

    /// Assign `value` to the property of `instance`
    #[inline]
    pub fn invoke(&self, instance: &mut I, value: V) -> ShimResult<()> {
        (self.call)(instance, value)
    }

    /// Name of the compiled property
    pub fn member(&self) -> &str {
        &self.member
    }
}

impl<T> fmt::Debug for ConstructorShim<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstructorShim({})", self.member)
    }
}

impl<I: ?Sized, R> fmt::Debug for MethodShim<I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodShim({})", self.member)
    }
}

impl<I: ?Sized, R> fmt::Debug for RefMethodShim<I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefMethodShim({})", self.member)
    }
}

impl<I: ?Sized, V> fmt::Debug for GetterShim<I, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GetterShim({})", self.member)
    }
}

impl<I: ?Sized, V> fmt::Debug for SetterShim<I, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetterShim({})", self.member)
    }
}
