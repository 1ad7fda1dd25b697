//! Method shims, by value and by reference

use std::any::Any;

use shimcall_reflect::{MethodInfo, Object, Value};

use super::{log_compiled, missing_entry, plan, require};
use crate::convert::{lower_all, marshal, write_back};
use crate::error::ShimResult;
use crate::plan::CallVariant;
use crate::shim::{MethodShim, RefMethodShim};

/// Compile a method into a shim taking any instance and returning `Value`.
///
/// The instance is downcast to the declaring type on each call; a void
/// method yields `Value::null()`. Arguments already of their declared types
/// are read in place; any other argument sends the call through a converted
/// frame, so the member still runs exactly once.
pub fn compile_method<'a>(
    method: impl Into<Option<&'a MethodInfo>>,
) -> ShimResult<MethodShim<dyn Object, Value>> {
    let method = require(method.into(), "method")?;
    let plan = plan::<dyn Object, Value>(method.into(), CallVariant::ByValue)?;
    let slots = lower_all(&plan.arguments)?;
    let entry = method.invoker().erased();
    log_compiled(&plan);

    let Some(in_place) = method.invoker().borrowed_erased() else {
        return Ok(MethodShim::<dyn Object, Value>::new(plan.member, move |instance, args| {
            let mut frame = marshal(&slots, args)?;
            Ok(entry(instance, &mut frame)?)
        }));
    };
    Ok(MethodShim::<dyn Object, Value>::new(plan.member, move |instance, args| {
        if let Ok(Some(result)) = in_place(&mut *instance, args) {
            return Ok(result);
        }
        let mut frame = marshal(&slots, args)?;
        Ok(entry(instance, &mut frame)?)
    }))
}

/// Compile a method into a shim taking the declaring type and returning `Value`
pub fn compile_method_for<'a, T>(
    method: impl Into<Option<&'a MethodInfo>>,
) -> ShimResult<MethodShim<T, Value>>
where
    T: Any + Send + Sync,
{
    compile_method_typed::<T, Value>(method)
}

/// Compile a method into a fully typed shim.
///
/// `T` must be the declaring type and `R` the declared result (`()` for void
/// methods); `R = Value` gives the instance-typed tier.
pub fn compile_method_typed<'a, T, R>(
    method: impl Into<Option<&'a MethodInfo>>,
) -> ShimResult<MethodShim<T, R>>
where
    T: Any + Send + Sync,
    R: Any,
{
    let method = require(method.into(), "method")?;
    let plan = plan::<T, R>(method.into(), CallVariant::ByValue)?;
    let slots = lower_all(&plan.arguments)?;
    let entry = method
        .invoker()
        .entry::<T, R>()
        .ok_or_else(|| missing_entry(&plan))?;
    log_compiled(&plan);

    let Some(in_place) = method.invoker().borrowed_entry::<T, R>() else {
        return Ok(MethodShim::<T, R>::new(plan.member, move |instance, args| {
            let mut frame = marshal(&slots, args)?;
            Ok(entry(instance, &mut frame)?)
        }));
    };
    Ok(MethodShim::<T, R>::new(plan.member, move |instance, args| {
        if let Some(result) = in_place(&mut *instance, args) {
            return Ok(result);
        }
        let mut frame = marshal(&slots, args)?;
        Ok(entry(instance, &mut frame)?)
    }))
}

/// Compile a method with by-reference parameters into a shim taking any
/// instance; by-ref slots of the container are updated after each call
pub fn compile_method_by_ref<'a>(
    method: impl Into<Option<&'a MethodInfo>>,
) -> ShimResult<RefMethodShim<dyn Object, Value>> {
    let method = require(method.into(), "method")?;
    let plan = plan::<dyn Object, Value>(method.into(), CallVariant::ByRef)?;
    let slots = lower_all(&plan.arguments)?;
    let entry = method.invoker().erased();
    log_compiled(&plan);

    Ok(RefMethodShim::<dyn Object, Value>::new(plan.member, move |instance, args| {
        let mut frame = marshal(&slots, args)?;
        let result = entry(instance, &mut frame)?;
        write_back(&slots, frame, args);
        Ok(result)
    }))
}

/// By-reference counterpart of [`compile_method_for`]
pub fn compile_method_by_ref_for<'a, T>(
    method: impl Into<Option<&'a MethodInfo>>,
) -> ShimResult<RefMethodShim<T, Value>>
where
    T: Any + Send + Sync,
{
    compile_method_by_ref_typed::<T, Value>(method)
}

/// By-reference counterpart of [`compile_method_typed`]
pub fn compile_method_by_ref_typed<'a, T, R>(
    method: impl Into<Option<&'a MethodInfo>>,
) -> ShimResult<RefMethodShim<T, R>>
where
    T: Any + Send + Sync,
    R: Any,
{
    let method = require(method.into(), "method")?;
    let plan = plan::<T, R>(method.into(), CallVariant::ByRef)?;
    let slots = lower_all(&plan.arguments)?;
    let entry = method
        .invoker()
        .entry::<T, R>()
        .ok_or_else(|| missing_entry(&plan))?;
    log_compiled(&plan);

    Ok(RefMethodShim::<T, R>::new(plan.member, move |instance, args| {
        let mut frame = marshal(&slots, args)?;
        let result = entry(instance, &mut frame)?;
        write_back(&slots, frame, args);
        Ok(result)
    }))
}
