//! Property getter and setter shims

use std::any::Any;

use shimcall_reflect::{MemberDescriptor, Object, PropertyInfo, Value};

use super::{log_compiled, missing_entry, plan, require};
use crate::convert::Conversion;
use crate::error::ShimResult;
use crate::plan::{CallPlan, CallVariant};
use crate::shim::{GetterShim, SetterShim};

fn assigned_conversion(plan: &CallPlan) -> Conversion {
    match plan.arguments.first().and_then(|arg| arg.target_type()) {
        Some(ty) => Conversion::to_type(ty),
        None => Conversion::Passthrough,
    }
}

/// Compile a property's get accessor into a shim taking any instance
pub fn compile_getter<'a>(
    property: impl Into<Option<&'a PropertyInfo>>,
) -> ShimResult<GetterShim<dyn Object, Value>> {
    let property = require(property.into(), "property")?;
    let plan = plan::<dyn Object, Value>(
        MemberDescriptor::PropertyGetter(property),
        CallVariant::ByValue,
    )?;
    let entry = property
        .getter()
        .ok_or_else(|| missing_entry(&plan))?
        .erased();
    log_compiled(&plan);

    Ok(GetterShim::<dyn Object, Value>::new(plan.member, move |instance| {
        Ok(entry(instance)?)
    }))
}

/// Compile a property's get accessor into a shim taking the declaring type
/// and returning `Value`
pub fn compile_getter_for<'a, T>(
    property: impl Into<Option<&'a PropertyInfo>>,
) -> ShimResult<GetterShim<T, Value>>
where
    T: Any + Send + Sync,
{
    compile_getter_typed::<T, Value>(property)
}

/// Compile a property's get accessor into a fully typed shim
pub fn compile_getter_typed<'a, T, V>(
    property: impl Into<Option<&'a PropertyInfo>>,
) -> ShimResult<GetterShim<T, V>>
where
    T: Any + Send + Sync,
    V: Any,
{
    let property = require(property.into(), "property")?;
    let plan = plan::<T, V>(MemberDescriptor::PropertyGetter(property), CallVariant::ByValue)?;
    let entry = property
        .getter()
        .and_then(|getter| getter.entry::<T, V>())
        .ok_or_else(|| missing_entry(&plan))?;
    log_compiled(&plan);

    Ok(GetterShim::<T, V>::new(plan.member, move |instance| {
        Ok(entry(instance))
    }))
}

/// Compile a property's set accessor into a shim taking any instance and
/// an untyped value, converted to the property type on each call
pub fn compile_setter<'a>(
    property: impl Into<Option<&'a PropertyInfo>>,
) -> ShimResult<SetterShim<dyn Object, Value>> {
    let property = require(property.into(), "property")?;
    let plan = plan::<dyn Object, Value>(
        MemberDescriptor::PropertySetter(property),
        CallVariant::ByValue,
    )?;
    let conversion = assigned_conversion(&plan);
    let entry = property
        .setter()
        .ok_or_else(|| missing_entry(&plan))?
        .erased();
    log_compiled(&plan);

    Ok(SetterShim::<dyn Object, Value>::new(plan.member, move |instance, value| {
        let value = conversion.apply_owned(value)?;
        Ok(entry(instance, value)?)
    }))
}

/// Compile a property's set accessor into a shim taking the declaring type
/// and an untyped value
pub fn compile_setter_for<'a, T>(
    property: impl Into<Option<&'a PropertyInfo>>,
) -> ShimResult<SetterShim<T, Value>>
where
    T: Any + Send + Sync,
{
    compile_setter_typed::<T, Value>(property)
}

/// Compile a property's set accessor into a fully typed shim.
///
/// `V` must be the property type, or `Value` for the instance-typed tier.
pub fn compile_setter_typed<'a, T, V>(
    property: impl Into<Option<&'a PropertyInfo>>,
) -> ShimResult<SetterShim<T, V>>
where
    T: Any + Send + Sync,
    V: Any + Send + Sync,
{
    let property = require(property.into(), "property")?;
    let plan = plan::<T, V>(MemberDescriptor::PropertySetter(property), CallVariant::ByValue)?;
    let setter = property.setter().ok_or_else(|| missing_entry(&plan))?;

    if let Some(entry) = setter.typed::<T, V>() {
        log_compiled(&plan);
        return Ok(SetterShim::<T, V>::new(plan.member, move |instance, value| {
            entry(instance, value);
            Ok(())
        }));
    }

    // `V` is `Value` here; the plan rejects any other mismatch
    let conversion = assigned_conversion(&plan);
    let entry = setter.widened::<T>().ok_or_else(|| missing_entry(&plan))?;
    log_compiled(&plan);

    Ok(SetterShim::<T, V>::new(plan.member, move |instance, value| {
        let value = conversion.apply_owned(Value::new(value))?;
        Ok(entry(instance, value)?)
    }))
}
