//! Demo type every command works against

use std::sync::Arc;

use shimcall_reflect::{AbiResult, ParamType, TypeBuilder, TypeInfo, TypeRegistry, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub label: String,
}

impl Sample {
    pub fn new(label: String) -> Self {
        Sample { label }
    }

    pub fn format(&self, first: String, second: String) -> String {
        format!("{}-{}-{}", first, second, self.label)
    }

    pub fn format3(&self, first: String, second: String, third: String) -> String {
        format!("{}-{}-{}", first, second, third)
    }

    pub fn reset(&mut self, first: String, second: String) {
        self.label = format!("{}/{}", first, second);
    }

    pub fn append_suffix(&self, first: &mut String, second: &mut String) {
        first.push_str(":end");
        second.push_str(":end");
    }

    fn secret(&self) -> String {
        "hidden".to_string()
    }
}

/// `Sample` introspection data, registered once in the global registry
pub fn sample_type() -> Arc<TypeInfo> {
    TypeRegistry::global().get_or_register::<Sample>(|| {
        TypeBuilder::<Sample>::new()
            .constructor(&["label"], Sample::new)
            .method("format", &["first", "second"], Sample::format)
            .method("format", &["first", "second", "third"], Sample::format3)
            .method("reset", &["first", "second"], Sample::reset)
            .method_raw(
                "append_suffix",
                &[
                    ("first", ParamType::by_ref::<String>()),
                    ("second", ParamType::by_ref::<String>()),
                ],
                |this: &mut Sample, args: &mut [Value]| -> AbiResult<()> {
                    let mut first = args[0].extract::<String>()?;
                    let mut second = args[1].extract::<String>()?;
                    this.append_suffix(&mut first, &mut second);
                    args[0] = Value::new(first);
                    args[1] = Value::new(second);
                    Ok(())
                },
            )
            .private_method("secret", &[], Sample::secret)
            .property(
                "label",
                |this: &Sample| this.label.clone(),
                |this: &mut Sample, label: String| this.label = label,
            )
            .build()
    })
}
