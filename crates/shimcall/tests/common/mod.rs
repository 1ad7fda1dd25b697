//! Shared fixture for the shim integration tests

#![allow(dead_code)]

use shimcall_reflect::{AbiResult, ParamType, TypeBuilder, TypeInfo, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestClass {
    pub property: String,
}

impl TestClass {
    pub fn new(property: String) -> Self {
        TestClass { property }
    }

    pub fn test_method(&self, param1: String, param2: String) -> String {
        format!("{}-{}-{}", param1, param2, self.property)
    }

    pub fn test_method_3(&self, param1: String, param2: String, param3: String) -> String {
        format!("{}-{}-{}", param1, param2, param3)
    }

    pub fn test_method_no_overload(&self, param1: String, param2: String) -> String {
        format!("{}-{}-{}", param1, param2, self.property)
    }

    pub fn test_method_reference_params(&self, param1: &mut String, param2: &mut String) {
        param1.push_str(":end");
        param2.push_str(":end");
    }

    pub fn test_void(&mut self, _param1: String, _param2: String) {
        self.property = "TestVoid Run".to_string();
    }

    fn test_private_method(&self) -> String {
        "TestPrivateMethod".to_string()
    }
}

/// Introspection data for `TestClass`
pub fn test_class_type() -> TypeInfo {
    TypeBuilder::<TestClass>::new()
        .constructor(&["property"], TestClass::new)
        .method("test_method", &["param1", "param2"], TestClass::test_method)
        .method(
            "test_method",
            &["param1", "param2", "param3"],
            TestClass::test_method_3,
        )
        .method(
            "test_method_no_overload",
            &["param1", "param2"],
            TestClass::test_method_no_overload,
        )
        .method_raw(
            "test_method_reference_params",
            &[
                ("param1", ParamType::by_ref::<String>()),
                ("param2", ParamType::by_ref::<String>()),
            ],
            |this: &mut TestClass, args: &mut [Value]| -> AbiResult<()> {
                let mut param1 = args[0].extract::<String>()?;
                let mut param2 = args[1].extract::<String>()?;
                this.test_method_reference_params(&mut param1, &mut param2);
                args[0] = Value::new(param1);
                args[1] = Value::new(param2);
                Ok(())
            },
        )
        .method("test_void", &["param1", "param2"], TestClass::test_void)
        .private_method("test_private_method", &[], TestClass::test_private_method)
        .property(
            "property",
            |this: &TestClass| this.property.clone(),
            |this: &mut TestClass, value: String| this.property = value,
        )
        .build()
}

pub fn injected() -> TestClass {
    TestClass::new("injected".to_string())
}

pub fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

pub fn two_strings() -> Vec<ParamType> {
    vec![ParamType::of::<String>(); 2]
}

pub fn three_strings() -> Vec<ParamType> {
    vec![ParamType::of::<String>(); 3]
}
