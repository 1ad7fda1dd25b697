//! `shimcall plan`: show what the compiler decides for one member

use anyhow::{bail, Result};
use clap::ValueEnum;
use shimcall::compiler::plan;
use shimcall::{CallPlan, CallVariant};
use shimcall_reflect::{BindingFlags, MemberDescriptor, Object, TypeInfo, Value};
use termcolor::ColorChoice;

use crate::demo::{sample_type, Sample};
use crate::output::StyledOutput;

/// Tier selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    /// `dyn Object` receiver, `Value` result
    Untyped,
    /// `Sample` receiver, `Value` result
    Instance,
    /// `Sample` receiver, declared result type
    Typed,
}

/// Find the member named by `spec`: `new`, `get:<property>`,
/// `set:<property>`, or a method name (public or private)
pub fn resolve<'a>(
    info: &'a TypeInfo,
    spec: &str,
    arity: Option<usize>,
) -> Result<MemberDescriptor<'a>> {
    let arity_matches = |n: usize| arity.map_or(true, |want| want == n);

    if spec == "new" {
        let found: Vec<_> = info
            .constructors()
            .iter()
            .filter(|c| arity_matches(c.parameters().len()))
            .collect();
        return single(spec, found).map(MemberDescriptor::Constructor);
    }
    if let Some(name) = spec.strip_prefix("get:") {
        return Ok(MemberDescriptor::PropertyGetter(info.get_property(name)?));
    }
    if let Some(name) = spec.strip_prefix("set:") {
        return Ok(MemberDescriptor::PropertySetter(info.get_property(name)?));
    }

    let flags = BindingFlags::PUBLIC | BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE;
    let found: Vec<_> = info
        .methods()
        .iter()
        .filter(|m| flags.name_matches(m.name(), spec))
        .filter(|m| arity_matches(m.parameters().len()))
        .collect();
    single(spec, found).map(MemberDescriptor::Method)
}

fn single<'a, M>(spec: &str, mut found: Vec<&'a M>) -> Result<&'a M> {
    match found.len() {
        0 => bail!("no member matches `{}`", spec),
        1 => Ok(found.remove(0)),
        n => bail!("`{}` matches {} overloads, pick one with --arity", spec, n),
    }
}

/// Plan `member` for the requested tier
pub fn build_plan(
    member: MemberDescriptor<'_>,
    tier: TierArg,
    variant: CallVariant,
) -> Result<CallPlan> {
    let plan = match tier {
        TierArg::Untyped => plan::<dyn Object, Value>(member, variant)?,
        TierArg::Instance => plan::<Sample, Value>(member, variant)?,
        TierArg::Typed => typed_plan(member, variant)?,
    };
    Ok(plan)
}

// The typed tier needs the concrete result type as a type parameter, so
// dispatch on the types the demo type actually uses.
fn typed_plan(member: MemberDescriptor<'_>, variant: CallVariant) -> Result<CallPlan> {
    let value_type = match member {
        MemberDescriptor::PropertySetter(p) => Some(p.property_type()),
        _ => member.return_type(),
    };
    let plan = match value_type {
        None => plan::<Sample, ()>(member, variant)?,
        Some(ty) if ty.is::<String>() => plan::<Sample, String>(member, variant)?,
        Some(ty) if ty.is::<Sample>() => plan::<Sample, Sample>(member, variant)?,
        Some(ty) => bail!("no typed plan for result type {}", ty),
    };
    Ok(plan)
}

pub fn execute(
    spec: &str,
    tier: TierArg,
    by_ref: bool,
    arity: Option<usize>,
    choice: ColorChoice,
) -> Result<()> {
    let info = sample_type();
    let member = resolve(&info, spec, arity)?;
    let variant = if by_ref {
        CallVariant::ByRef
    } else {
        CallVariant::ByValue
    };
    let plan = build_plan(member, tier, variant)?;

    let mut out = StyledOutput::new(choice);
    out.heading(&member.to_string());
    out.dim(&plan.to_string());
    out.newline();
    if plan.write_backs() > 0 {
        out.label(&format!("{} by-ref slot(s) written back", plan.write_backs()));
        out.newline();
    }
    out.flush();
    Ok(())
}
