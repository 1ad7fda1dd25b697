//! Shim compiler
//!
//! Every compile call runs the same linear pipeline:
//! 1. Instance access: none for constructors, a per-call downcast for the
//!    untyped tier, direct access once the requested instance type is
//!    checked against the declaring type
//! 2. Argument expressions from the call-expression builder
//! 3. Entry point selection on the member's invoker for the tier
//! 4. Return handling: void yields the tier default, values are widened or
//!    passed through after checking the requested result type
//! 5. Lowering into a closure over the argument slots and the entry
//!
//! Steps 1, 2 and 4 produce a `CallPlan` (see [`plan`]); steps 3 and 5 happen
//! in the per-kind modules. Compilation never invokes the member.

mod constructor;
mod method;
mod property;

pub use constructor::{compile_constructor, compile_constructor_typed};
pub use method::{
    compile_method, compile_method_by_ref, compile_method_by_ref_for, compile_method_by_ref_typed,
    compile_method_for, compile_method_typed,
};
pub use property::{
    compile_getter, compile_getter_for, compile_getter_typed, compile_setter, compile_setter_for,
    compile_setter_typed,
};

use std::any::Any;

use shimcall_reflect::{MemberDescriptor, Object, TypeHandle};

use crate::error::{ShimError, ShimResult};
use crate::expr::{self, Expr};
use crate::plan::{CallPlan, CallVariant, InstanceAccess, ReturnHandling, Tier};

/// Plan the invocation of `member` through a shim with receiver `I` and
/// result `R`.
///
/// `I` is `dyn Object` for an untyped receiver, otherwise it must be the
/// declaring type. `R` is `Value`, the member's result type, or `()` for void
/// members. For property setters `R` is the assigned value type.
pub fn plan<I, R>(member: MemberDescriptor<'_>, variant: CallVariant) -> ShimResult<CallPlan>
where
    I: ?Sized + Any,
    R: Any,
{
    if let MemberDescriptor::PropertyGetter(p) = member {
        if !p.can_read() {
            return Err(ShimError::invalid(format!("{} has no get accessor", p)));
        }
    }
    if let MemberDescriptor::PropertySetter(p) = member {
        if !p.can_write() {
            return Err(ShimError::invalid(format!("{} has no set accessor", p)));
        }
    }

    // Step 1: instance
    let instance = instance_access::<I>(member)?;

    // Step 2: arguments
    let (arguments, ret) = match member {
        MemberDescriptor::PropertySetter(p) => {
            let assigned = assigned_value::<R>(member, p.property_type())?;
            (vec![assigned], ReturnHandling::Unit)
        }
        _ => {
            let arguments = match variant {
                CallVariant::ByValue => expr::build(member, &Expr::Arguments),
                CallVariant::ByRef => expr::build_by_ref(member, &Expr::ArgumentsByRef),
            };
            // Step 4: return
            (arguments, return_handling::<R>(member)?)
        }
    };

    Ok(CallPlan {
        member: member.to_string(),
        kind: member.kind(),
        tier: tier_of::<I, R>(member),
        variant,
        instance,
        arguments,
        ret,
    })
}

fn tier_of<I: ?Sized + Any, R: Any>(member: MemberDescriptor<'_>) -> Tier {
    let untyped_instance = !member.has_instance() || TypeHandle::of::<I>().is::<dyn Object>();
    let untyped_result = TypeHandle::of::<R>().is_value();
    match (untyped_instance, untyped_result) {
        (true, true) => Tier::Untyped,
        (false, true) => Tier::InstanceTyped,
        _ => Tier::Typed,
    }
}

fn instance_access<I: ?Sized + Any>(member: MemberDescriptor<'_>) -> ShimResult<InstanceAccess> {
    if !member.has_instance() {
        return Ok(InstanceAccess::Absent);
    }
    let declaring = member.declaring_type();
    let requested = TypeHandle::of::<I>();
    if requested.is::<dyn Object>() {
        Ok(InstanceAccess::Downcast { to: declaring })
    } else if requested == declaring {
        Ok(InstanceAccess::Direct { ty: declaring })
    } else {
        Err(ShimError::invalid(format!(
            "{} is declared on {}, not {}",
            member, declaring, requested
        )))
    }
}

fn return_handling<R: Any>(member: MemberDescriptor<'_>) -> ShimResult<ReturnHandling> {
    let requested = TypeHandle::of::<R>();
    match member.return_type() {
        None if requested.is_value() => Ok(ReturnHandling::DiscardDefault),
        None if requested.is_unit() => Ok(ReturnHandling::Unit),
        None => Err(ShimError::invalid(format!(
            "{} returns nothing, cannot produce {}",
            member, requested
        ))),
        Some(ty) if ty == requested => Ok(ReturnHandling::Direct { ty }),
        Some(ty) if requested.is_value() => Ok(ReturnHandling::Widen { from: ty }),
        Some(ty) => Err(ShimError::invalid(format!(
            "{} returns {}, not {}",
            member, ty, requested
        ))),
    }
}

fn assigned_value<V: Any>(member: MemberDescriptor<'_>, declared: TypeHandle) -> ShimResult<Expr> {
    let requested = TypeHandle::of::<V>();
    if requested.is_value() {
        Ok(Expr::convert(Expr::Assigned, declared))
    } else if requested == declared {
        Ok(Expr::Assigned)
    } else {
        Err(ShimError::invalid(format!(
            "{} takes {}, not {}",
            member, declared, requested
        )))
    }
}

pub(crate) fn require<'a, M>(member: Option<&'a M>, what: &str) -> ShimResult<&'a M> {
    member.ok_or_else(|| ShimError::invalid(format!("no {} descriptor supplied", what)))
}

pub(crate) fn missing_entry(plan: &CallPlan) -> ShimError {
    ShimError::invalid(format!(
        "{} has no {} entry point for the requested types",
        plan.member, plan.tier
    ))
}

pub(crate) fn log_compiled(plan: &CallPlan) {
    tracing::debug!(
        kind = %plan.kind,
        tier = %plan.tier,
        variant = %plan.variant,
        "compiled shim\n{}",
        plan
    );
}
