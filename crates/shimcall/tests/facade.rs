//! Looking members up and compiling them through `TypeInfoExt`

mod common;

use common::{injected, strings, test_class_type, three_strings, two_strings, TestClass};
use shimcall::{MethodQuery, ShimError, TypeInfoExt};
use shimcall_reflect::{BindingFlags, ParamType, TypeBuilder, Value};

#[test]
fn test_method_by_name() {
    let info = test_class_type();
    let shim = info.method_shim("test_method_no_overload").unwrap();

    let mut tc = injected();
    let result = shim.invoke(&mut tc, &strings(&["param1", "param2"])).unwrap();
    assert_eq!(result.extract::<String>().unwrap(), "param1-param2-injected");
}

#[test]
fn test_overloaded_name_needs_signature() {
    let info = test_class_type();

    let err = info.method_shim("test_method").unwrap_err();
    match err {
        ShimError::MemberNotFound { member, reason, .. } => {
            assert_eq!(member, "test_method");
            assert!(reason.starts_with("ambiguous"));
        }
        other => panic!("expected MemberNotFound, got {:?}", other),
    }

    let mut tc = injected();
    let two = info
        .method_shim_typed::<TestClass, String>(
            MethodQuery::new("test_method").signature(&two_strings()),
        )
        .unwrap();
    assert_eq!(
        two.invoke(&mut tc, &strings(&["param1", "param2"])).unwrap(),
        "param1-param2-injected"
    );

    let three = info
        .method_shim(MethodQuery::new("test_method").signature(&three_strings()))
        .unwrap();
    let result = three
        .invoke(&mut tc, &strings(&["param1", "param2", "param3"]))
        .unwrap();
    assert_eq!(result.extract::<String>().unwrap(), "param1-param2-param3");
}

#[test]
fn test_private_method_needs_non_public_flag() {
    let info = test_class_type();

    let err = info.method_shim("test_private_method").unwrap_err();
    assert!(matches!(err, ShimError::MemberNotFound { .. }));

    let shim = info
        .method_shim_for::<TestClass>(
            MethodQuery::new("test_private_method")
                .flags(BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE),
        )
        .unwrap();
    let mut tc = injected();
    let result = shim.invoke(&mut tc, &[]).unwrap();
    assert_eq!(result.extract::<String>().unwrap(), "TestPrivateMethod");
}

#[test]
fn test_ignore_case() {
    let info = test_class_type();
    let query = MethodQuery::new("TEST_METHOD_NO_OVERLOAD")
        .flags(BindingFlags::DEFAULT | BindingFlags::IGNORE_CASE);
    assert!(info.method_shim(query).is_ok());
    assert!(info.method_shim("TEST_METHOD_NO_OVERLOAD").is_err());
}

#[test]
fn test_unknown_member() {
    let info = test_class_type();
    let err = info.method_shim("missing").unwrap_err();
    assert_eq!(
        err,
        ShimError::MemberNotFound {
            type_name: "TestClass".to_string(),
            member: "missing".to_string(),
            reason: "no match".to_string(),
        }
    );
    assert!(matches!(
        info.getter_shim("missing"),
        Err(ShimError::MemberNotFound { .. })
    ));
    assert!(matches!(
        info.constructor_shim(&[ParamType::of::<i64>()]),
        Err(ShimError::MemberNotFound { .. })
    ));
}

#[test]
fn test_by_ref_method() {
    let info = test_class_type();
    let by_ref = [ParamType::by_ref::<String>(), ParamType::by_ref::<String>()];
    let shim = info
        .method_shim_by_ref::<TestClass, Value>(
            MethodQuery::new("test_method_reference_params").signature(&by_ref),
        )
        .unwrap();

    let mut tc = injected();
    let mut args = strings(&["param1", "param2"]);
    shim.invoke(&mut tc, &mut args).unwrap();
    assert_eq!(args[0].extract::<String>().unwrap(), "param1:end");
    assert_eq!(args[1].extract::<String>().unwrap(), "param2:end");

    // by-value parameter types do not match by-ref ones
    let err = info
        .method_shim(MethodQuery::new("test_method_reference_params").signature(&two_strings()))
        .unwrap_err();
    assert!(matches!(err, ShimError::MemberNotFound { .. }));
}

#[test]
fn test_construct_then_read_property() {
    let info = test_class_type();
    let ctor = info.constructor_shim(&[ParamType::of::<String>()]).unwrap();
    let getter = info.getter_shim("property").unwrap();

    let instance = ctor.invoke(&strings(&["injected"])).unwrap();
    let property = getter.invoke(instance.as_object().unwrap()).unwrap();
    assert_eq!(property.extract::<String>().unwrap(), "injected");

    let typed = info
        .constructor_shim_typed::<TestClass>(&[ParamType::of::<String>()])
        .unwrap();
    assert_eq!(typed.invoke(&strings(&["x"])).unwrap().property, "x");
}

#[test]
fn test_duplicate_constructor_signature_is_not_compiled() {
    let info = TypeBuilder::<TestClass>::new()
        .constructor(&["property"], TestClass::new)
        .constructor(&["property"], |p: String| TestClass::new(p.to_uppercase()))
        .build();
    let err = info.constructor_shim(&[ParamType::of::<String>()]).err().unwrap();
    assert_eq!(
        err,
        ShimError::MemberNotFound {
            type_name: "TestClass".to_string(),
            member: "new".to_string(),
            reason: "ambiguous, 2 candidates".to_string(),
        }
    );
    assert!(info.constructor_shim(&[]).is_err());
}

#[test]
fn test_property_shims() {
    let info = test_class_type();
    let setter = info.setter_shim("property").unwrap();
    let typed_setter = info.setter_shim_typed::<TestClass, String>("property").unwrap();
    let typed_getter = info.getter_shim_typed::<TestClass, String>("property").unwrap();

    let mut tc = injected();
    setter.invoke(&mut tc, Value::from("Test")).unwrap();
    assert_eq!(typed_getter.invoke(&tc).unwrap(), "Test");

    typed_setter.invoke(&mut tc, "Again".to_string()).unwrap();
    assert_eq!(typed_getter.invoke(&tc).unwrap(), "Again");
}

#[test]
fn test_wrong_types_are_invalid_not_missing() {
    let info = test_class_type();
    let err = info
        .method_shim_typed::<TestClass, i64>("test_method_no_overload")
        .unwrap_err();
    assert!(matches!(err, ShimError::InvalidMember(_)));
}
