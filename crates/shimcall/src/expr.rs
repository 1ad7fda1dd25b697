//! Call-expression builder
//!
//! Describes, per formal parameter, how the argument is read out of the
//! caller's argument container and converted to the declared type. The
//! expressions are pure data; the compiler lowers them into argument slots.
//!
//! ```text
//! by value:   convert(args[i], T)
//! by ref:     &mut args[i] as T        (read, then written back)
//! ```
//!
//! Binding is positional only: no named arguments, no defaults, no rest
//! parameters.

use std::fmt;

use shimcall_reflect::{MemberDescriptor, ParamType, TypeHandle};

/// Call-expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// The receiver
    Instance,
    /// The argument container, read-only
    Arguments,
    /// The argument container, writable
    ArgumentsByRef,
    /// The value being assigned by a setter
    Assigned,
    /// Element `index` of a container
    Index { container: Box<Expr>, index: usize },
    /// Checked conversion to `to`
    Convert { operand: Box<Expr>, to: TypeHandle },
    /// Read/write view of a container slot holding a `ty`
    Referent { operand: Box<Expr>, ty: TypeHandle },
}

impl Expr {
    pub fn index(container: Expr, index: usize) -> Self {
        Expr::Index {
            container: Box::new(container),
            index,
        }
    }

    pub fn convert(operand: Expr, to: TypeHandle) -> Self {
        Expr::Convert {
            operand: Box::new(operand),
            to,
        }
    }

    pub fn referent(operand: Expr, ty: TypeHandle) -> Self {
        Expr::Referent {
            operand: Box::new(operand),
            ty,
        }
    }

    /// Container slot this expression reads, if any
    pub fn slot(&self) -> Option<usize> {
        match self {
            Expr::Index { index, .. } => Some(*index),
            Expr::Convert { operand, .. } | Expr::Referent { operand, .. } => operand.slot(),
            _ => None,
        }
    }

    /// Type the expression produces, when it converts
    pub fn target_type(&self) -> Option<TypeHandle> {
        match self {
            Expr::Convert { to, .. } => Some(*to),
            Expr::Referent { ty, .. } => Some(*ty),
            _ => None,
        }
    }

    /// Whether the slot is written back after the call
    pub fn writes_back(&self) -> bool {
        matches!(self, Expr::Referent { .. })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Instance => write!(f, "instance"),
            Expr::Arguments => write!(f, "args"),
            Expr::ArgumentsByRef => write!(f, "args"),
            Expr::Assigned => write!(f, "value"),
            Expr::Index { container, index } => write!(f, "{}[{}]", container, index),
            Expr::Convert { operand, to } => write!(f, "convert({}, {})", operand, to),
            Expr::Referent { operand, ty } => write!(f, "&mut {} as {}", operand, ty),
        }
    }
}

fn parameter_types(member: MemberDescriptor<'_>) -> Vec<ParamType> {
    match member {
        // The assigned value is not read from the container
        MemberDescriptor::PropertySetter(_) => Vec::new(),
        _ => member.parameter_types(),
    }
}

/// Argument expressions for a by-value call.
///
/// A by-ref parameter is passed a converted copy of its referent; nothing is
/// written back.
pub fn build(member: MemberDescriptor<'_>, args: &Expr) -> Vec<Expr> {
    parameter_types(member)
        .into_iter()
        .enumerate()
        .map(|(i, param)| Expr::convert(Expr::index(args.clone(), i), param.element_type()))
        .collect()
}

/// Argument expressions for a call that writes by-ref parameters back
pub fn build_by_ref(member: MemberDescriptor<'_>, args: &Expr) -> Vec<Expr> {
    parameter_types(member)
        .into_iter()
        .enumerate()
        .map(|(i, param)| {
            let slot = Expr::index(args.clone(), i);
            if param.is_by_ref() {
                Expr::referent(slot, param.element_type())
            } else {
                Expr::convert(slot, param.element_type())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shimcall_reflect::{AbiResult, TypeBuilder, TypeInfo, Value};

    struct Pair;

    fn pair_type() -> TypeInfo {
        TypeBuilder::<Pair>::new()
            .method("pair", &["a", "b"], |_: &Pair, a: String, b: i64| {
                format!("{}{}", a, b)
            })
            .method_raw(
                "mixed",
                &[
                    ("a", ParamType::of::<String>()),
                    ("b", ParamType::by_ref::<i32>()),
                ],
                |_: &mut Pair, _: &mut [Value]| -> AbiResult<()> { Ok(()) },
            )
            .build()
    }

    #[test]
    fn test_build_converts_each_parameter() {
        let info = pair_type();
        let method = info.get_method("pair").unwrap();
        let exprs = build(method.into(), &Expr::Arguments);

        assert_eq!(
            exprs,
            vec![
                Expr::convert(Expr::index(Expr::Arguments, 0), TypeHandle::of::<String>()),
                Expr::convert(Expr::index(Expr::Arguments, 1), TypeHandle::of::<i64>()),
            ]
        );
        assert_eq!(exprs[1].to_string(), "convert(args[1], i64)");
    }

    #[test]
    fn test_build_copies_by_ref_referent() {
        let info = pair_type();
        let method = info.get_method("mixed").unwrap();
        let exprs = build(method.into(), &Expr::Arguments);

        assert_eq!(exprs[1].target_type(), Some(TypeHandle::of::<i32>()));
        assert!(!exprs[1].writes_back());
    }

    #[test]
    fn test_build_by_ref_marks_write_back() {
        let info = pair_type();
        let method = info.get_method("mixed").unwrap();
        let exprs = build_by_ref(method.into(), &Expr::ArgumentsByRef);

        assert!(!exprs[0].writes_back());
        assert!(exprs[1].writes_back());
        assert_eq!(exprs[1].slot(), Some(1));
        assert_eq!(exprs[1].to_string(), "&mut args[1] as i32");
    }

    #[test]
    fn test_parameterless_member() {
        let info = TypeBuilder::<Pair>::new()
            .method("nothing", &[], |_: &Pair| ())
            .build();
        let method = info.get_method("nothing").unwrap();
        assert!(build(method.into(), &Expr::Arguments).is_empty());
    }
}
