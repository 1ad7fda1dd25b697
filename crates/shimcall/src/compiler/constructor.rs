//! Constructor shims

use std::any::Any;

use shimcall_reflect::{ConstructorInfo, Value};

use super::{log_compiled, missing_entry, plan, require};
use crate::convert::{lower_all, marshal};
use crate::error::ShimResult;
use crate::plan::CallVariant;
use crate::shim::ConstructorShim;

/// Compile a constructor into a shim producing an untyped instance.
///
/// There is no receiver, so this also serves as the instance-typed tier.
pub fn compile_constructor<'a>(
    ctor: impl Into<Option<&'a ConstructorInfo>>,
) -> ShimResult<ConstructorShim<Value>> {
    let ctor = require(ctor.into(), "constructor")?;
    let plan = plan::<Value, Value>(ctor.into(), CallVariant::ByValue)?;
    let slots = lower_all(&plan.arguments)?;
    let entry = ctor.invoker().erased();
    log_compiled(&plan);

    let Some(in_place) = ctor.invoker().borrowed_erased() else {
        return Ok(ConstructorShim::<Value>::new(plan.member, move |args| {
            let frame = marshal(&slots, args)?;
            Ok(entry(&frame)?)
        }));
    };
    Ok(ConstructorShim::<Value>::new(plan.member, move |args| {
        if let Some(instance) = in_place(args) {
            return Ok(instance);
        }
        let frame = marshal(&slots, args)?;
        Ok(entry(&frame)?)
    }))
}

/// Compile a constructor into a shim producing `T`, which must be the
/// declaring type
pub fn compile_constructor_typed<'a, T>(
    ctor: impl Into<Option<&'a ConstructorInfo>>,
) -> ShimResult<ConstructorShim<T>>
where
    T: Any + Send + Sync,
{
    let ctor = require(ctor.into(), "constructor")?;
    let plan = plan::<Value, T>(ctor.into(), CallVariant::ByValue)?;
    let slots = lower_all(&plan.arguments)?;
    let entry = ctor
        .invoker()
        .typed::<T>()
        .ok_or_else(|| missing_entry(&plan))?;
    log_compiled(&plan);

    let Some(in_place) = ctor.invoker().borrowed::<T>() else {
        return Ok(ConstructorShim::<T>::new(plan.member, move |args| {
            let frame = marshal(&slots, args)?;
            Ok(entry(&frame)?)
        }));
    };
    Ok(ConstructorShim::<T>::new(plan.member, move |args| {
        if let Some(instance) = in_place(args) {
            return Ok(instance);
        }
        let frame = marshal(&slots, args)?;
        Ok(entry(&frame)?)
    }))
}
