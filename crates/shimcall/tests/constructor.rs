//! Constructor shims

mod common;

use common::{strings, test_class_type, TestClass};
use shimcall::{compile_constructor, compile_constructor_typed, compile_getter, ShimError};
use shimcall_reflect::{ConstructorInfo, ParamType, Value};

#[test]
fn test_untyped_constructor() {
    let info = test_class_type();
    let ctor = info.get_constructor(&[ParamType::of::<String>()]).unwrap();
    let shim = compile_constructor(ctor).unwrap();

    let instance = shim.invoke(&strings(&["injected"])).unwrap();
    assert!(instance.is::<TestClass>());

    let getter = compile_getter(info.get_property("property").unwrap()).unwrap();
    let object = instance.as_object().unwrap();
    assert_eq!(getter.invoke(object).unwrap().extract::<String>().unwrap(), "injected");
}

#[test]
fn test_typed_constructor() {
    let info = test_class_type();
    let ctor = info.get_constructor(&[ParamType::of::<String>()]).unwrap();
    let shim = compile_constructor_typed::<TestClass>(ctor).unwrap();

    let instance = shim.invoke(&strings(&["injected"])).unwrap();
    assert_eq!(instance, TestClass::new("injected".to_string()));
}

#[test]
fn test_matches_reflective_construction() {
    let info = test_class_type();
    let ctor = info.get_constructor(&[ParamType::of::<String>()]).unwrap();
    let shim = compile_constructor(ctor).unwrap();
    let args = strings(&["same"]);

    let via_shim = shim.invoke(&args).unwrap();
    let via_reflection = ctor.invoke(&args).unwrap();
    assert_eq!(
        via_shim.downcast_ref::<TestClass>(),
        via_reflection.downcast_ref::<TestClass>()
    );
}

#[test]
fn test_each_call_builds_a_new_instance() {
    let info = test_class_type();
    let shim = compile_constructor(&info.constructors()[0]).unwrap();
    let args = strings(&["a"]);

    let first = shim.invoke(&args).unwrap();
    let second = shim.invoke(&args).unwrap();
    assert!(!first.ptr_eq(&second));
}

#[test]
fn test_converted_and_exact_arguments_build_equal_instances() {
    let info = test_class_type();
    let ctor = info.get_constructor(&[ParamType::of::<String>()]).unwrap();
    let untyped = compile_constructor(ctor).unwrap();
    let typed = compile_constructor_typed::<TestClass>(ctor).unwrap();

    let exact = typed.invoke(&strings(&["x"])).unwrap();
    let converted = typed.invoke(&[Value::new("x")]).unwrap();
    assert_eq!(exact, converted);

    let converted = untyped.invoke(&[Value::from('x')]).unwrap();
    assert_eq!(converted.downcast_ref::<TestClass>(), Some(&exact));
}

#[test]
fn test_wrong_type_requested() {
    let info = test_class_type();
    let ctor = &info.constructors()[0];
    let err = compile_constructor_typed::<String>(ctor).unwrap_err();
    assert!(matches!(err, ShimError::InvalidMember(_)));
}

#[test]
fn test_argument_mismatch() {
    let info = test_class_type();
    let shim = compile_constructor(&info.constructors()[0]).unwrap();
    let err = shim.invoke(&[Value::from(false)]).unwrap_err();
    assert_eq!(
        err,
        ShimError::TypeMismatch {
            expected: "String".to_string(),
            got: "bool".to_string()
        }
    );
}

#[test]
fn test_absent_descriptor() {
    assert!(matches!(
        compile_constructor(None::<&ConstructorInfo>),
        Err(ShimError::InvalidMember(_))
    ));
    assert!(matches!(
        compile_constructor_typed::<TestClass>(None::<&ConstructorInfo>),
        Err(ShimError::InvalidMember(_))
    ));
}
