//! Member descriptors
//!
//! Descriptors are immutable once registered and cheap to clone (`Arc`
//! handles). Each one owns the member's invoker, plus the validating
//! reflective entry points (`invoke`, `get_value`, ...) that check arity,
//! instance type and argument types on every call.

use std::fmt;
use std::sync::Arc;

use crate::convert::coerce;
use crate::error::{AbiResult, ReflectError};
use crate::invoker::{ConstructorInvoker, GetterInvoker, MethodInvoker, SetterInvoker};
use crate::types::{ParamType, TypeHandle};
use crate::value::{Object, Value};

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Reachable with `BindingFlags::PUBLIC`
    Public,
    /// Reachable with `BindingFlags::NON_PUBLIC`
    Private,
}

/// Formal parameter information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub param_type: ParamType,
    /// Zero-based position
    pub index: usize,
}

impl ParameterInfo {
    /// Create parameter info
    pub fn new(name: impl Into<String>, param_type: ParamType, index: usize) -> Self {
        Self {
            name: name.into(),
            param_type,
            index,
        }
    }

    /// Whether the parameter is passed by reference
    pub fn is_by_ref(&self) -> bool {
        self.param_type.is_by_ref()
    }
}

fn param_types(parameters: &[ParameterInfo]) -> Vec<ParamType> {
    parameters.iter().map(|p| p.param_type).collect()
}

fn write_signature(f: &mut fmt::Formatter<'_>, parameters: &[ParameterInfo]) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in parameters.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", p.name, p.param_type)?;
    }
    write!(f, ")")
}

/// Convert each argument to its declared parameter type.
///
/// The result is a fresh container; by-ref slots of `args` are not touched.
fn coerce_arguments(
    member: &str,
    parameters: &[ParameterInfo],
    args: &[Value],
) -> AbiResult<Vec<Value>> {
    if args.len() != parameters.len() {
        return Err(ReflectError::ArgumentCount {
            member: member.to_string(),
            expected: parameters.len(),
            got: args.len(),
        });
    }
    parameters
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param.param_type.element_type();
            coerce(arg, ty)
                .ok_or_else(|| ReflectError::type_mismatch(ty.short_name(), arg.type_name()))
        })
        .collect()
}

// ============================================================================
// Constructors
// ============================================================================

struct ConstructorData {
    declaring_type: TypeHandle,
    parameters: Vec<ParameterInfo>,
    invoker: ConstructorInvoker,
}

/// Constructor descriptor
#[derive(Clone)]
pub struct ConstructorInfo {
    inner: Arc<ConstructorData>,
}

impl ConstructorInfo {
    pub(crate) fn new(
        declaring_type: TypeHandle,
        parameters: Vec<ParameterInfo>,
        invoker: ConstructorInvoker,
    ) -> Self {
        Self {
            inner: Arc::new(ConstructorData {
                declaring_type,
                parameters,
                invoker,
            }),
        }
    }

    /// Type this constructor creates
    pub fn declaring_type(&self) -> TypeHandle {
        self.inner.declaring_type
    }

    /// Formal parameters
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.inner.parameters
    }

    /// Declared parameter types, in order
    pub fn parameter_types(&self) -> Vec<ParamType> {
        param_types(&self.inner.parameters)
    }

    /// Entry points
    pub fn invoker(&self) -> &ConstructorInvoker {
        &self.inner.invoker
    }

    /// Construct an instance reflectively
    pub fn invoke(&self, args: &[Value]) -> AbiResult<Value> {
        let name = format!("{}::new", self.inner.declaring_type);
        let args = coerce_arguments(&name, &self.inner.parameters, args)?;
        (self.inner.invoker.erased())(&args)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstructorInfo({})", self)
    }
}

impl fmt::Display for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::new", self.inner.declaring_type)?;
        write_signature(f, &self.inner.parameters)
    }
}

// ============================================================================
// Methods
// ============================================================================

struct MethodData {
    name: String,
    declaring_type: TypeHandle,
    parameters: Vec<ParameterInfo>,
    return_type: Option<TypeHandle>,
    visibility: Visibility,
    invoker: MethodInvoker,
}

/// Instance method descriptor
#[derive(Clone)]
pub struct MethodInfo {
    inner: Arc<MethodData>,
}

impl MethodInfo {
    pub(crate) fn new(
        name: String,
        declaring_type: TypeHandle,
        parameters: Vec<ParameterInfo>,
        return_type: Option<TypeHandle>,
        visibility: Visibility,
        invoker: MethodInvoker,
    ) -> Self {
        Self {
            inner: Arc::new(MethodData {
                name,
                declaring_type,
                parameters,
                return_type,
                visibility,
                invoker,
            }),
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Type declaring the method
    pub fn declaring_type(&self) -> TypeHandle {
        self.inner.declaring_type
    }

    /// Formal parameters
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.inner.parameters
    }

    /// Declared parameter types, in order
    pub fn parameter_types(&self) -> Vec<ParamType> {
        param_types(&self.inner.parameters)
    }

    /// Return type, `None` for void
    pub fn return_type(&self) -> Option<TypeHandle> {
        self.inner.return_type
    }

    /// Whether the method returns nothing
    pub fn is_void(&self) -> bool {
        self.inner.return_type.is_none()
    }

    /// Method visibility
    pub fn visibility(&self) -> Visibility {
        self.inner.visibility
    }

    /// Whether any parameter is passed by reference
    pub fn has_by_ref_parameters(&self) -> bool {
        self.inner.parameters.iter().any(ParameterInfo::is_by_ref)
    }

    /// Entry points
    pub fn invoker(&self) -> &MethodInvoker {
        &self.inner.invoker
    }

    /// Check that the parameter types equal `signature` exactly
    pub fn matches_signature(&self, signature: &[ParamType]) -> bool {
        self.inner.parameters.len() == signature.len()
            && self
                .inner
                .parameters
                .iter()
                .zip(signature)
                .all(|(p, ty)| p.param_type == *ty)
    }

    /// Invoke reflectively.
    ///
    /// Arguments are copied before the call, so by-ref parameters behave as
    /// by-value ones.
    pub fn invoke(&self, instance: &mut dyn Object, args: &[Value]) -> AbiResult<Value> {
        self.check_instance(&*instance)?;
        let mut args = coerce_arguments(&self.inner.name, &self.inner.parameters, args)?;
        (self.inner.invoker.erased())(instance, &mut args)
    }

    /// Invoke reflectively, copying by-ref parameters back into `args`
    pub fn invoke_by_ref(&self, instance: &mut dyn Object, args: &mut [Value]) -> AbiResult<Value> {
        self.check_instance(&*instance)?;
        let mut frame = coerce_arguments(&self.inner.name, &self.inner.parameters, args)?;
        let result = (self.inner.invoker.erased())(instance, &mut frame)?;
        for (param, value) in self.inner.parameters.iter().zip(frame) {
            if param.is_by_ref() {
                args[param.index] = value;
            }
        }
        Ok(result)
    }

    fn check_instance(&self, instance: &dyn Object) -> AbiResult<()> {
        let actual = instance.type_handle();
        if actual == self.inner.declaring_type {
            Ok(())
        } else {
            Err(ReflectError::type_mismatch(
                self.inner.declaring_type.short_name(),
                actual.short_name(),
            ))
        }
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodInfo({})", self)
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inner.visibility == Visibility::Private {
            write!(f, "private ")?;
        }
        write!(f, "{}::{}", self.inner.declaring_type, self.inner.name)?;
        write_signature(f, &self.inner.parameters)?;
        if let Some(ret) = self.inner.return_type {
            write!(f, " -> {}", ret)?;
        }
        Ok(())
    }
}

// ============================================================================
// Properties
// ============================================================================

struct PropertyData {
    name: String,
    declaring_type: TypeHandle,
    property_type: TypeHandle,
    visibility: Visibility,
    getter: Option<GetterInvoker>,
    setter: Option<SetterInvoker>,
}

/// Property descriptor
#[derive(Clone)]
pub struct PropertyInfo {
    inner: Arc<PropertyData>,
}

impl PropertyInfo {
    pub(crate) fn new(
        name: String,
        declaring_type: TypeHandle,
        property_type: TypeHandle,
        visibility: Visibility,
        getter: Option<GetterInvoker>,
        setter: Option<SetterInvoker>,
    ) -> Self {
        Self {
            inner: Arc::new(PropertyData {
                name,
                declaring_type,
                property_type,
                visibility,
                getter,
                setter,
            }),
        }
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Type declaring the property
    pub fn declaring_type(&self) -> TypeHandle {
        self.inner.declaring_type
    }

    /// Property value type
    pub fn property_type(&self) -> TypeHandle {
        self.inner.property_type
    }

    /// Property visibility
    pub fn visibility(&self) -> Visibility {
        self.inner.visibility
    }

    /// Whether the property has a read accessor
    pub fn can_read(&self) -> bool {
        self.inner.getter.is_some()
    }

    /// Whether the property has a write accessor
    pub fn can_write(&self) -> bool {
        self.inner.setter.is_some()
    }

    /// Read accessor entry points
    pub fn getter(&self) -> Option<&GetterInvoker> {
        self.inner.getter.as_ref()
    }

    /// Write accessor entry points
    pub fn setter(&self) -> Option<&SetterInvoker> {
        self.inner.setter.as_ref()
    }

    /// Read the property reflectively
    pub fn get_value(&self, instance: &dyn Object) -> AbiResult<Value> {
        let getter = self.inner.getter.as_ref().ok_or_else(|| self.missing("get"))?;
        (getter.erased())(instance)
    }

    /// Write the property reflectively, converting `value` first
    pub fn set_value(&self, instance: &mut dyn Object, value: Value) -> AbiResult<()> {
        let setter = self.inner.setter.as_ref().ok_or_else(|| self.missing("set"))?;
        let ty = self.inner.property_type;
        let value = coerce(&value, ty)
            .ok_or_else(|| ReflectError::type_mismatch(ty.short_name(), value.type_name()))?;
        (setter.erased())(instance, value)
    }

    fn missing(&self, accessor: &'static str) -> ReflectError {
        ReflectError::MissingAccessor {
            property: format!("{}::{}", self.inner.declaring_type, self.inner.name),
            accessor,
        }
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyInfo({})", self)
    }
}

impl fmt::Display for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match (self.can_read(), self.can_write()) {
            (true, true) => "get; set",
            (true, false) => "get",
            (false, true) => "set",
            (false, false) => "",
        };
        write!(
            f,
            "{}::{}: {} {{ {} }}",
            self.inner.declaring_type, self.inner.name, self.inner.property_type, access
        )
    }
}

// ============================================================================
// Polymorphic view
// ============================================================================

/// Kind of member a descriptor refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Constructor,
    Method,
    PropertyGetter,
    PropertySetter,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberKind::Constructor => "constructor",
            MemberKind::Method => "method",
            MemberKind::PropertyGetter => "property getter",
            MemberKind::PropertySetter => "property setter",
        };
        f.write_str(s)
    }
}

/// Any invocable member
#[derive(Debug, Clone, Copy)]
pub enum MemberDescriptor<'a> {
    Constructor(&'a ConstructorInfo),
    Method(&'a MethodInfo),
    PropertyGetter(&'a PropertyInfo),
    PropertySetter(&'a PropertyInfo),
}

impl<'a> MemberDescriptor<'a> {
    /// Member kind
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberDescriptor::Constructor(_) => MemberKind::Constructor,
            MemberDescriptor::Method(_) => MemberKind::Method,
            MemberDescriptor::PropertyGetter(_) => MemberKind::PropertyGetter,
            MemberDescriptor::PropertySetter(_) => MemberKind::PropertySetter,
        }
    }

    /// Member name (`new` for constructors)
    pub fn name(&self) -> &'a str {
        match self {
            MemberDescriptor::Constructor(_) => "new",
            MemberDescriptor::Method(m) => m.name(),
            MemberDescriptor::PropertyGetter(p) | MemberDescriptor::PropertySetter(p) => p.name(),
        }
    }

    /// Declaring type
    pub fn declaring_type(&self) -> TypeHandle {
        match self {
            MemberDescriptor::Constructor(c) => c.declaring_type(),
            MemberDescriptor::Method(m) => m.declaring_type(),
            MemberDescriptor::PropertyGetter(p) | MemberDescriptor::PropertySetter(p) => {
                p.declaring_type()
            }
        }
    }

    /// Parameter types in call order.
    ///
    /// A setter takes the assigned value as its single parameter.
    pub fn parameter_types(&self) -> Vec<ParamType> {
        match self {
            MemberDescriptor::Constructor(c) => c.parameter_types(),
            MemberDescriptor::Method(m) => m.parameter_types(),
            MemberDescriptor::PropertyGetter(_) => Vec::new(),
            MemberDescriptor::PropertySetter(p) => vec![ParamType::from(p.property_type())],
        }
    }

    /// Result type, `None` for void
    pub fn return_type(&self) -> Option<TypeHandle> {
        match self {
            MemberDescriptor::Constructor(c) => Some(c.declaring_type()),
            MemberDescriptor::Method(m) => m.return_type(),
            MemberDescriptor::PropertyGetter(p) => Some(p.property_type()),
            MemberDescriptor::PropertySetter(_) => None,
        }
    }

    /// Whether the member operates on an instance
    pub fn has_instance(&self) -> bool {
        !matches!(self, MemberDescriptor::Constructor(_))
    }
}

impl fmt::Display for MemberDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberDescriptor::Constructor(c) => write!(f, "{}", c),
            MemberDescriptor::Method(m) => write!(f, "{}", m),
            MemberDescriptor::PropertyGetter(p) => {
                write!(f, "get {}::{}", p.declaring_type(), p.name())
            }
            MemberDescriptor::PropertySetter(p) => {
                write!(f, "set {}::{}", p.declaring_type(), p.name())
            }
        }
    }
}

impl<'a> From<&'a ConstructorInfo> for MemberDescriptor<'a> {
    fn from(c: &'a ConstructorInfo) -> Self {
        MemberDescriptor::Constructor(c)
    }
}

impl<'a> From<&'a MethodInfo> for MemberDescriptor<'a> {
    fn from(m: &'a MethodInfo) -> Self {
        MemberDescriptor::Method(m)
    }
}
