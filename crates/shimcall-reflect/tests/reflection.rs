//! Integration tests for registration and reflective invocation

use shimcall_reflect::{
    AbiResult, BindingFlags, MemberKind, ParamType, ReflectError, TypeBuilder, TypeHandle,
    TypeInfo, TypeRegistry, Value,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Vector {
    x: f64,
    y: f64,
}

impl Vector {
    fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    fn scale(&mut self, by: f64) {
        self.x *= by;
        self.y *= by;
    }
}

fn vector_type() -> TypeInfo {
    TypeBuilder::<Vector>::new()
        .constructor(&["x", "y"], Vector::new)
        .method("length", &[], Vector::length)
        .method("scale", &["by"], Vector::scale)
        .method_raw(
            "split",
            &[
                ("x", ParamType::by_ref::<f64>()),
                ("y", ParamType::by_ref::<f64>()),
            ],
            |v: &mut Vector, args: &mut [Value]| -> AbiResult<()> {
                args[0] = Value::new(v.x);
                args[1] = Value::new(v.y);
                Ok(())
            },
        )
        .property("x", |v: &Vector| v.x, |v: &mut Vector, x: f64| v.x = x)
        .read_only_property("y", |v: &Vector| v.y)
        .write_only_property("both", |v: &mut Vector, n: f64| {
            v.x = n;
            v.y = n;
        })
        .build()
}

#[test]
fn test_constructor_invoke_coerces_arguments() {
    let info = vector_type();
    let ctor = info
        .get_constructor(&[ParamType::of::<f64>(), ParamType::of::<f64>()])
        .unwrap();

    // f32 and i32 widen to f64
    let v = ctor.invoke(&[Value::from(3.0f32), Value::from(4i32)]).unwrap();
    assert_eq!(v.downcast_ref::<Vector>(), Some(&Vector::new(3.0, 4.0)));
}

#[test]
fn test_constructor_invoke_rejects_bad_arguments() {
    let info = vector_type();
    let ctor = &info.constructors()[0];

    let err = ctor.invoke(&[Value::from(1.0f64)]).unwrap_err();
    assert!(matches!(err, ReflectError::ArgumentCount { expected: 2, got: 1, .. }));

    let err = ctor.invoke(&[Value::from("1"), Value::from(2.0f64)]).unwrap_err();
    assert_eq!(err, ReflectError::type_mismatch("f64", "String"));
}

#[test]
fn test_method_invoke() {
    let info = vector_type();
    let mut v = Vector::new(3.0, 4.0);

    let length = info.get_method("length").unwrap();
    assert_eq!(length.invoke(&mut v, &[]).unwrap().extract::<f64>().unwrap(), 5.0);

    let scale = info.get_method("scale").unwrap();
    assert!(scale.invoke(&mut v, &[Value::from(2.0f64)]).unwrap().is_null());
    assert_eq!(v, Vector::new(6.0, 8.0));
}

#[test]
fn test_method_invoke_checks_instance_type() {
    let info = vector_type();
    let mut not_a_vector = String::from("vector");
    let err = info
        .get_method("length")
        .unwrap()
        .invoke(&mut not_a_vector, &[])
        .unwrap_err();
    assert_eq!(err, ReflectError::type_mismatch("Vector", "String"));
}

#[test]
fn test_by_ref_only_written_back_by_invoke_by_ref() {
    let info = vector_type();
    let split = info.get_method("split").unwrap();
    let mut v = Vector::new(1.5, 2.5);

    let mut args = [Value::from(0.0f64), Value::from(0.0f64)];
    split.invoke(&mut v, &args).unwrap();
    assert_eq!(args[0].extract::<f64>().unwrap(), 0.0);

    split.invoke_by_ref(&mut v, &mut args).unwrap();
    assert_eq!(args[0].extract::<f64>().unwrap(), 1.5);
    assert_eq!(args[1].extract::<f64>().unwrap(), 2.5);
}

#[test]
fn test_property_access() {
    let info = vector_type();
    let mut v = Vector::new(1.0, 2.0);

    let x = info.get_property("x").unwrap();
    x.set_value(&mut v, Value::from(7i32)).unwrap();
    assert_eq!(x.get_value(&v).unwrap().extract::<f64>().unwrap(), 7.0);

    let y = info.get_property("y").unwrap();
    assert!(!y.can_write());
    assert_eq!(
        y.set_value(&mut v, Value::from(1.0f64)).unwrap_err(),
        ReflectError::MissingAccessor {
            property: "Vector::y".to_string(),
            accessor: "set",
        }
    );

    let both = info.get_property("both").unwrap();
    assert!(both.get_value(&v).is_err());
    both.set_value(&mut v, Value::from(9.0f64)).unwrap();
    assert_eq!(v, Vector::new(9.0, 9.0));
}

#[test]
fn test_member_descriptors() {
    let info = vector_type();
    let members = info.members();

    let setters: Vec<&str> = members
        .iter()
        .filter(|m| m.kind() == MemberKind::PropertySetter)
        .map(|m| m.name())
        .collect();
    assert_eq!(setters, vec!["x", "both"]);

    let split = members.iter().find(|m| m.name() == "split").unwrap();
    assert_eq!(split.return_type(), None);
    assert!(split.has_instance());
    assert_eq!(split.to_string(), "Vector::split(x: &mut f64, y: &mut f64)");

    let ctor = members[0];
    assert_eq!(ctor.return_type(), Some(TypeHandle::of::<Vector>()));
    assert!(!ctor.has_instance());
}

#[test]
fn test_global_registry() {
    struct OnlyHere;

    let info = TypeRegistry::global().get_or_register::<OnlyHere>(|| {
        TypeBuilder::<OnlyHere>::named("OnlyHere")
            .private_method("hidden", &[], |_: &OnlyHere| true)
            .build()
    });

    let found = TypeRegistry::global().get_by_name("OnlyHere").unwrap();
    assert_eq!(found.name(), info.name());
    assert!(found
        .get_method_with("hidden", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
        .is_ok());
}
