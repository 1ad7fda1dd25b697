//! Call plans
//!
//! A `CallPlan` records every decision the compiler makes for one member
//! before lowering: how the instance is reached, how each argument is read
//! and converted, what happens to the result, and whether by-ref slots are
//! written back. Plans are built per compile request and dropped once the
//! shim closure exists; their `Display` form is what the compiler logs.

use std::fmt;

use shimcall_reflect::{MemberKind, TypeHandle};

use crate::expr::Expr;

/// Genericity tier of a compiled shim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Instance and result are untyped
    Untyped,
    /// Instance is the declaring type, result untyped
    InstanceTyped,
    /// Instance and result are both concrete
    Typed,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Untyped => write!(f, "untyped"),
            Tier::InstanceTyped => write!(f, "instance-typed"),
            Tier::Typed => write!(f, "typed"),
        }
    }
}

/// How by-ref parameters are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallVariant {
    /// Arguments are read only
    ByValue,
    /// By-ref slots are written back after the call
    ByRef,
}

impl fmt::Display for CallVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallVariant::ByValue => write!(f, "by-value"),
            CallVariant::ByRef => write!(f, "by-ref"),
        }
    }
}

/// How the receiver reaches the member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAccess {
    /// Constructors have no receiver
    Absent,
    /// Untyped instance, downcast per call
    Downcast { to: TypeHandle },
    /// Already the declaring type
    Direct { ty: TypeHandle },
}

/// What happens to the member's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnHandling {
    /// Returned as is
    Direct { ty: TypeHandle },
    /// Boxed into a `Value`
    Widen { from: TypeHandle },
    /// Void member; the caller gets `Value::null()`
    DiscardDefault,
    /// Void member; the caller gets `()`
    Unit,
}

/// Compile-time plan of one member invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPlan {
    /// Rendered member signature
    pub member: String,
    pub kind: MemberKind,
    pub tier: Tier,
    pub variant: CallVariant,
    pub instance: InstanceAccess,
    /// One expression per formal parameter, in order
    pub arguments: Vec<Expr>,
    pub ret: ReturnHandling,
}

impl CallPlan {
    /// Number of by-ref slots written back after the call
    pub fn write_backs(&self) -> usize {
        self.arguments.iter().filter(|a| a.writes_back()).count()
    }
}

impl fmt::Display for InstanceAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceAccess::Absent => write!(f, "none"),
            InstanceAccess::Downcast { to } => write!(f, "downcast Object -> {}", to),
            InstanceAccess::Direct { ty } => write!(f, "direct {}", ty),
        }
    }
}

impl fmt::Display for ReturnHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnHandling::Direct { ty } => write!(f, "direct {}", ty),
            ReturnHandling::Widen { from } => write!(f, "widen {} -> Value", from),
            ReturnHandling::DiscardDefault => write!(f, "discard, yield null"),
            ReturnHandling::Unit => write!(f, "discard, yield ()"),
        }
    }
}

impl fmt::Display for CallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} [{}, {}] {{",
            self.kind, self.member, self.tier, self.variant
        )?;
        writeln!(f, "  instance: {}", self.instance)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            writeln!(f, "  arg {}: {}", i, arg)?;
        }
        writeln!(f, "  return: {}", self.ret)?;
        write!(f, "}}")
    }
}
