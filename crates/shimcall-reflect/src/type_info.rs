//! Registered type information and member lookup

use std::fmt;

use crate::convert::is_assignable;
use crate::error::{AbiResult, ReflectError};
use crate::flags::BindingFlags;
use crate::member::{ConstructorInfo, MemberDescriptor, MethodInfo, PropertyInfo};
use crate::types::{ParamType, TypeHandle};
use crate::value::{Object, Value};

/// Members of one registered type
pub struct TypeInfo {
    handle: TypeHandle,
    name: String,
    constructors: Vec<ConstructorInfo>,
    methods: Vec<MethodInfo>,
    properties: Vec<PropertyInfo>,
}

impl TypeInfo {
    pub(crate) fn new(
        handle: TypeHandle,
        name: String,
        constructors: Vec<ConstructorInfo>,
        methods: Vec<MethodInfo>,
        properties: Vec<PropertyInfo>,
    ) -> Self {
        Self {
            handle,
            name,
            constructors,
            methods,
            properties,
        }
    }

    /// Runtime type
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Registered type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All constructors, in registration order
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// All methods (public and private), in registration order
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// All properties, in registration order
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    /// Every invocable member: constructors, methods, then property accessors
    pub fn members(&self) -> Vec<MemberDescriptor<'_>> {
        let mut members: Vec<MemberDescriptor<'_>> = Vec::new();
        members.extend(self.constructors.iter().map(MemberDescriptor::Constructor));
        members.extend(self.methods.iter().map(MemberDescriptor::Method));
        for property in &self.properties {
            if property.can_read() {
                members.push(MemberDescriptor::PropertyGetter(property));
            }
            if property.can_write() {
                members.push(MemberDescriptor::PropertySetter(property));
            }
        }
        members
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Public instance method by name; fails if the name is overloaded
    pub fn get_method(&self, name: &str) -> AbiResult<&MethodInfo> {
        self.find_method(name, BindingFlags::DEFAULT, None)
    }

    /// Method by name under explicit binding rules
    pub fn get_method_with(&self, name: &str, flags: BindingFlags) -> AbiResult<&MethodInfo> {
        self.find_method(name, flags, None)
    }

    /// Public instance method by name and exact parameter types
    pub fn get_method_by_signature(
        &self,
        name: &str,
        signature: &[ParamType],
    ) -> AbiResult<&MethodInfo> {
        self.find_method(name, BindingFlags::DEFAULT, Some(signature))
    }

    /// Method lookup with full binding rules.
    ///
    /// Candidates must match the name (case-insensitively under
    /// `IGNORE_CASE`), be admitted by `flags`, and, when a signature is
    /// given, have exactly those parameter types. Zero candidates is
    /// `MemberNotFound`, more than one is `AmbiguousMatch`.
    pub fn find_method(
        &self,
        name: &str,
        flags: BindingFlags,
        signature: Option<&[ParamType]>,
    ) -> AbiResult<&MethodInfo> {
        let candidates: Vec<&MethodInfo> = self
            .methods
            .iter()
            .filter(|m| flags.name_matches(m.name(), name))
            .filter(|m| flags.admits(m.visibility()))
            .filter(|m| signature.map_or(true, |sig| m.matches_signature(sig)))
            .collect();

        tracing::trace!(
            type_name = %self.name,
            member = name,
            ?flags,
            candidates = candidates.len(),
            "method lookup"
        );

        self.single(name, candidates)
    }

    /// Constructor with exactly the given parameter types; two registrations
    /// of the same signature are ambiguous
    pub fn get_constructor(&self, signature: &[ParamType]) -> AbiResult<&ConstructorInfo> {
        let candidates = self
            .constructors
            .iter()
            .filter(|c| c.parameter_types() == signature)
            .collect();
        self.single("new", candidates)
    }

    /// Public property by name
    pub fn get_property(&self, name: &str) -> AbiResult<&PropertyInfo> {
        self.get_property_with(name, BindingFlags::DEFAULT)
    }

    /// Property by name under explicit binding rules
    pub fn get_property_with(&self, name: &str, flags: BindingFlags) -> AbiResult<&PropertyInfo> {
        let candidates: Vec<&PropertyInfo> = self
            .properties
            .iter()
            .filter(|p| flags.name_matches(p.name(), name))
            .filter(|p| flags.admits(p.visibility()))
            .collect();
        self.single(name, candidates)
    }

    // ========================================================================
    // Late-bound invocation
    // ========================================================================

    /// Invoke a public method by name, resolving the overload from the
    /// runtime types of `args` on every call
    pub fn invoke_method(
        &self,
        name: &str,
        instance: &mut dyn Object,
        args: &[Value],
    ) -> AbiResult<Value> {
        let candidates: Vec<&MethodInfo> = self
            .methods
            .iter()
            .filter(|m| BindingFlags::DEFAULT.name_matches(m.name(), name))
            .filter(|m| BindingFlags::DEFAULT.admits(m.visibility()))
            .filter(|m| accepts(&m.parameter_types(), args))
            .collect();
        self.single(name, candidates)?.invoke(instance, args)
    }

    /// Create an instance, resolving the constructor from the runtime types
    /// of `args`
    pub fn create_instance(&self, args: &[Value]) -> AbiResult<Value> {
        let candidates: Vec<&ConstructorInfo> = self
            .constructors
            .iter()
            .filter(|c| accepts(&c.parameter_types(), args))
            .collect();
        self.single("new", candidates)?.invoke(args)
    }

    fn single<'a, M>(&self, member: &str, mut candidates: Vec<&'a M>) -> AbiResult<&'a M> {
        match candidates.len() {
            0 => Err(self.not_found(member)),
            1 => Ok(candidates.remove(0)),
            n => Err(ReflectError::AmbiguousMatch {
                type_name: self.name.clone(),
                member: member.to_string(),
                candidates: n,
            }),
        }
    }

    fn not_found(&self, member: &str) -> ReflectError {
        ReflectError::MemberNotFound {
            type_name: self.name.clone(),
            member: member.to_string(),
        }
    }
}

fn accepts(params: &[ParamType], args: &[Value]) -> bool {
    params.len() == args.len()
        && params.iter().zip(args).all(|(param, arg)| match arg.type_handle() {
            Some(ty) => is_assignable(ty, param.element_type()),
            None => param.element_type().is_value(),
        })
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("properties", &self.properties.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TypeBuilder;
    use crate::member::MemberKind;

    #[derive(Debug, Default)]
    struct Shape {
        sides: u32,
    }

    fn shape_type() -> TypeInfo {
        TypeBuilder::<Shape>::new()
            .constructor(&[], Shape::default)
            .constructor(&["sides"], |sides: u32| Shape { sides })
            .method("scale", &["by"], |s: &Shape, by: u32| s.sides * by)
            .method("scale", &["by", "plus"], |s: &Shape, by: u32, plus: u32| {
                s.sides * by + plus
            })
            .method("describe", &[], |s: &Shape| format!("{} sides", s.sides))
            .private_method("secret", &[], |_: &Shape| 42i32)
            .read_only_property("sides", |s: &Shape| s.sides)
            .build()
    }

    #[test]
    fn test_overloaded_name_is_ambiguous() {
        let info = shape_type();
        let err = info.get_method("scale").unwrap_err();
        assert!(matches!(err, ReflectError::AmbiguousMatch { candidates: 2, .. }));
    }

    #[test]
    fn test_signature_selects_overload() {
        let info = shape_type();
        let m = info
            .get_method_by_signature("scale", &[ParamType::of::<u32>(), ParamType::of::<u32>()])
            .unwrap();
        assert_eq!(m.parameters().len(), 2);

        let err = info
            .get_method_by_signature("scale", &[ParamType::of::<String>()])
            .unwrap_err();
        assert!(matches!(err, ReflectError::MemberNotFound { .. }));
    }

    #[test]
    fn test_private_needs_non_public() {
        let info = shape_type();
        assert!(info.get_method("secret").is_err());
        assert!(info
            .get_method_with("secret", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
            .is_ok());
        assert!(info.get_method_with("secret", BindingFlags::NON_PUBLIC).is_err());
    }

    #[test]
    fn test_ignore_case() {
        let info = shape_type();
        assert!(info.get_method("DESCRIBE").is_err());
        assert!(info
            .get_method_with("DESCRIBE", BindingFlags::DEFAULT | BindingFlags::IGNORE_CASE)
            .is_ok());
    }

    #[test]
    fn test_invoke_method_resolves_by_argument_types() {
        let info = shape_type();
        let mut shape = Shape { sides: 3 };

        let one = info
            .invoke_method("scale", &mut shape, &[Value::from(2u32)])
            .unwrap();
        assert_eq!(one.extract::<u32>().unwrap(), 6);

        let two = info
            .invoke_method("scale", &mut shape, &[Value::from(2u32), Value::from(1u8)])
            .unwrap();
        assert_eq!(two.extract::<u32>().unwrap(), 7);

        assert!(info
            .invoke_method("scale", &mut shape, &[Value::from("two")])
            .is_err());
    }

    #[test]
    fn test_create_instance() {
        let info = shape_type();
        let shape = info.create_instance(&[Value::from(5u32)]).unwrap();
        assert_eq!(shape.downcast_ref::<Shape>().unwrap().sides, 5);

        let ctor = info.get_constructor(&[]).unwrap();
        let shape = ctor.invoke(&[]).unwrap();
        assert_eq!(shape.downcast_ref::<Shape>().unwrap().sides, 0);
    }

    #[test]
    fn test_constructor_lookup_by_signature() {
        let info = shape_type();
        let ctor = info.get_constructor(&[ParamType::of::<u32>()]).unwrap();
        assert_eq!(ctor.parameters()[0].name, "sides");

        let err = info.get_constructor(&[ParamType::of::<String>()]).unwrap_err();
        assert!(matches!(err, ReflectError::MemberNotFound { ref member, .. } if member == "new"));
    }

    #[test]
    fn test_duplicate_constructor_signature_is_ambiguous() {
        let info = TypeBuilder::<Shape>::new()
            .constructor(&["sides"], |sides: u32| Shape { sides })
            .constructor(&["doubled"], |sides: u32| Shape { sides: sides * 2 })
            .build();
        let err = info.get_constructor(&[ParamType::of::<u32>()]).unwrap_err();
        assert!(matches!(err, ReflectError::AmbiguousMatch { candidates: 2, .. }));
        assert!(info.get_constructor(&[]).is_err());
    }

    #[test]
    fn test_members_listing() {
        let info = shape_type();
        let kinds: Vec<MemberKind> = info.members().iter().map(|m| m.kind()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == MemberKind::Constructor).count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == MemberKind::Method).count(), 4);
        assert_eq!(kinds.last(), Some(&MemberKind::PropertyGetter));
    }
}
