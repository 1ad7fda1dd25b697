//! `shimcall bench`: per-call cost of shims against reflection and direct
//! calls on the demo type
//!
//! Every strategy is first called once to capture its observable result,
//! which must match the direct call's, then timed over `iterations` calls.

use std::hint::black_box;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use shimcall::{
    compile_constructor, compile_constructor_typed, compile_getter, compile_getter_for,
    compile_getter_typed, compile_method, compile_method_by_ref, compile_method_by_ref_typed,
    compile_method_for, compile_method_typed, compile_setter, compile_setter_for,
    compile_setter_typed,
};
use shimcall_reflect::{MemberDescriptor, ParamType, TypeInfo, Value};
use termcolor::ColorChoice;

use crate::demo::{sample_type, Sample};
use crate::output::StyledOutput;

/// Member kind to measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchKind {
    Constructor,
    Method,
    Void,
    Getter,
    Setter,
    ByRef,
}

impl BenchKind {
    pub const ALL: &[BenchKind] = &[
        BenchKind::Constructor,
        BenchKind::Method,
        BenchKind::Void,
        BenchKind::Getter,
        BenchKind::Setter,
        BenchKind::ByRef,
    ];
}

/// Timing of one strategy
#[derive(Debug, Serialize)]
pub struct Measurement {
    pub strategy: &'static str,
    pub total_ns: u128,
    pub per_call_ns: f64,
    /// Observable result of a single call
    pub result: String,
    pub matches_direct: bool,
}

/// All strategies for one member kind
#[derive(Debug, Serialize)]
pub struct KindReport {
    pub kind: BenchKind,
    pub member: String,
    pub iterations: u64,
    pub measurements: Vec<Measurement>,
}

impl KindReport {
    pub fn all_match(&self) -> bool {
        self.measurements.iter().all(|m| m.matches_direct)
    }
}

struct Strategy<'a> {
    name: &'static str,
    call: Box<dyn FnMut() -> Result<String> + 'a>,
}

fn strategy<'a>(name: &'static str, call: impl FnMut() -> Result<String> + 'a) -> Strategy<'a> {
    Strategy {
        name,
        call: Box::new(call),
    }
}

fn sample() -> Sample {
    Sample::new("bench".to_string())
}

fn joined(args: &[Value]) -> Result<String> {
    let parts = args
        .iter()
        .map(|v| v.extract::<String>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(","))
}

fn label_of(instance: &Value) -> Result<String> {
    instance
        .downcast_ref::<Sample>()
        .map(|s| s.label.clone())
        .context("constructor produced a foreign type")
}

// ============================================================================
// Strategies per kind
// ============================================================================

fn constructor<'a>(info: &'a TypeInfo) -> Result<(String, Vec<Strategy<'a>>)> {
    let ctor = info.get_constructor(&[ParamType::of::<String>()])?;
    let args = vec![Value::from("bench")];
    let untyped = compile_constructor(ctor)?;
    let typed = compile_constructor_typed::<Sample>(ctor)?;

    let strategies = vec![
        strategy("direct", || Ok(Sample::new(black_box("bench").to_string()).label)),
        strategy("reflection", {
            let args = args.clone();
            move || label_of(&ctor.invoke(&args)?)
        }),
        strategy("shim (untyped)", {
            let args = args.clone();
            move || label_of(&untyped.invoke(&args)?)
        }),
        strategy("shim (typed)", move || Ok(typed.invoke(&args)?.label)),
    ];
    Ok((MemberDescriptor::from(ctor).to_string(), strategies))
}

fn method<'a>(info: &'a TypeInfo) -> Result<(String, Vec<Strategy<'a>>)> {
    let method = info.get_method_by_signature("format", &[ParamType::of::<String>(); 2])?;
    let args = vec![Value::from("a"), Value::from("b")];
    let untyped = compile_method(method)?;
    let instance = compile_method_for::<Sample>(method)?;
    let typed = compile_method_typed::<Sample, String>(method)?;

    let strategies = vec![
        strategy("direct", {
            let s = sample();
            move || Ok(s.format(black_box("a").to_string(), black_box("b").to_string()))
        }),
        strategy("reflection", {
            let (mut s, args) = (sample(), args.clone());
            move || Ok(method.invoke(&mut s, &args)?.extract::<String>()?)
        }),
        strategy("shim (untyped)", {
            let (mut s, args) = (sample(), args.clone());
            move || Ok(untyped.invoke(&mut s, &args)?.extract::<String>()?)
        }),
        strategy("shim (instance-typed)", {
            let (mut s, args) = (sample(), args.clone());
            move || Ok(instance.invoke(&mut s, &args)?.extract::<String>()?)
        }),
        strategy("shim (typed)", {
            let mut s = sample();
            move || Ok(typed.invoke(&mut s, &args)?)
        }),
    ];
    Ok((method.to_string(), strategies))
}

fn void<'a>(info: &'a TypeInfo) -> Result<(String, Vec<Strategy<'a>>)> {
    let method = info.get_method("reset")?;
    let args = vec![Value::from("a"), Value::from("b")];
    let untyped = compile_method(method)?;
    let typed = compile_method_typed::<Sample, ()>(method)?;

    let strategies = vec![
        strategy("direct", {
            let mut s = sample();
            move || {
                s.reset(black_box("a").to_string(), black_box("b").to_string());
                Ok(s.label.clone())
            }
        }),
        strategy("reflection", {
            let (mut s, args) = (sample(), args.clone());
            move || {
                method.invoke(&mut s, &args)?;
                Ok(s.label.clone())
            }
        }),
        strategy("shim (untyped)", {
            let (mut s, args) = (sample(), args.clone());
            move || {
                untyped.invoke(&mut s, &args)?;
                Ok(s.label.clone())
            }
        }),
        strategy("shim (typed)", {
            let mut s = sample();
            move || {
                typed.invoke(&mut s, &args)?;
                Ok(s.label.clone())
            }
        }),
    ];
    Ok((method.to_string(), strategies))
}

fn getter<'a>(info: &'a TypeInfo) -> Result<(String, Vec<Strategy<'a>>)> {
    let property = info.get_property("label")?;
    let untyped = compile_getter(property)?;
    let instance = compile_getter_for::<Sample>(property)?;
    let typed = compile_getter_typed::<Sample, String>(property)?;

    let strategies = vec![
        strategy("direct", {
            let s = sample();
            move || Ok(black_box(&s).label.clone())
        }),
        strategy("reflection", {
            let s = sample();
            move || Ok(property.get_value(&s)?.extract::<String>()?)
        }),
        strategy("shim (untyped)", {
            let s = sample();
            move || Ok(untyped.invoke(&s)?.extract::<String>()?)
        }),
        strategy("shim (instance-typed)", {
            let s = sample();
            move || Ok(instance.invoke(&s)?.extract::<String>()?)
        }),
        strategy("shim (typed)", {
            let s = sample();
            move || Ok(typed.invoke(&s)?)
        }),
    ];
    Ok((MemberDescriptor::PropertyGetter(property).to_string(), strategies))
}

fn setter<'a>(info: &'a TypeInfo) -> Result<(String, Vec<Strategy<'a>>)> {
    let property = info.get_property("label")?;
    let value = Value::from("written");
    let untyped = compile_setter(property)?;
    let instance = compile_setter_for::<Sample>(property)?;
    let typed = compile_setter_typed::<Sample, String>(property)?;

    let strategies = vec![
        strategy("direct", {
            let mut s = sample();
            move || {
                s.label = black_box("written").to_string();
                Ok(s.label.clone())
            }
        }),
        strategy("reflection", {
            let (mut s, value) = (sample(), value.clone());
            move || {
                property.set_value(&mut s, value.clone())?;
                Ok(s.label.clone())
            }
        }),
        strategy("shim (untyped)", {
            let (mut s, value) = (sample(), value.clone());
            move || {
                untyped.invoke(&mut s, value.clone())?;
                Ok(s.label.clone())
            }
        }),
        strategy("shim (instance-typed)", {
            let mut s = sample();
            move || {
                instance.invoke(&mut s, value.clone())?;
                Ok(s.label.clone())
            }
        }),
        strategy("shim (typed)", {
            let mut s = sample();
            move || {
                typed.invoke(&mut s, black_box("written").to_string())?;
                Ok(s.label.clone())
            }
        }),
    ];
    Ok((MemberDescriptor::PropertySetter(property).to_string(), strategies))
}

fn by_ref<'a>(info: &'a TypeInfo) -> Result<(String, Vec<Strategy<'a>>)> {
    let method = info.get_method("append_suffix")?;
    let args = vec![Value::from("a"), Value::from("b")];
    let untyped = compile_method_by_ref(method)?;
    let typed = compile_method_by_ref_typed::<Sample, ()>(method)?;

    // Each call starts from fresh arguments; write-back would grow them
    let strategies = vec![
        strategy("direct", {
            let s = sample();
            move || {
                let mut first = black_box("a").to_string();
                let mut second = black_box("b").to_string();
                s.append_suffix(&mut first, &mut second);
                Ok(format!("{},{}", first, second))
            }
        }),
        strategy("reflection", {
            let (mut s, args) = (sample(), args.clone());
            move || {
                let mut args = args.clone();
                method.invoke_by_ref(&mut s, &mut args)?;
                joined(&args)
            }
        }),
        strategy("shim (untyped)", {
            let (mut s, args) = (sample(), args.clone());
            move || {
                let mut args = args.clone();
                untyped.invoke(&mut s, &mut args)?;
                joined(&args)
            }
        }),
        strategy("shim (typed)", {
            let mut s = sample();
            move || {
                let mut args = args.clone();
                typed.invoke(&mut s, &mut args)?;
                joined(&args)
            }
        }),
    ];
    Ok((method.to_string(), strategies))
}

// ============================================================================
// Measurement
// ============================================================================

fn measure(strategies: Vec<Strategy<'_>>, iterations: u64) -> Result<Vec<Measurement>> {
    let mut expected: Option<String> = None;
    let mut measurements = Vec::with_capacity(strategies.len());

    for mut strategy in strategies {
        let result = (strategy.call)()
            .with_context(|| format!("{} failed", strategy.name))?;
        let matches_direct = expected.get_or_insert_with(|| result.clone()) == &result;

        let start = Instant::now();
        for _ in 0..iterations {
            black_box((strategy.call)()?);
        }
        let elapsed = start.elapsed();

        measurements.push(Measurement {
            strategy: strategy.name,
            total_ns: elapsed.as_nanos(),
            per_call_ns: elapsed.as_nanos() as f64 / iterations as f64,
            result,
            matches_direct,
        });
    }
    Ok(measurements)
}

/// Measure one kind on `info`
pub fn run(info: &TypeInfo, kind: BenchKind, iterations: u64) -> Result<KindReport> {
    if iterations == 0 {
        bail!("--iterations must be at least 1");
    }
    let (member, strategies) = match kind {
        BenchKind::Constructor => constructor(info)?,
        BenchKind::Method => method(info)?,
        BenchKind::Void => void(info)?,
        BenchKind::Getter => getter(info)?,
        BenchKind::Setter => setter(info)?,
        BenchKind::ByRef => by_ref(info)?,
    };
    tracing::debug!(?kind, %member, iterations, "benchmarking");

    Ok(KindReport {
        kind,
        member,
        iterations,
        measurements: measure(strategies, iterations)?,
    })
}

fn print_report(out: &mut StyledOutput, report: &KindReport) {
    out.label(&format!("{:?}", report.kind).to_lowercase());
    out.plain("  ");
    out.heading(&report.member);

    let baseline = report
        .measurements
        .first()
        .map(|m| m.per_call_ns)
        .unwrap_or(0.0);
    for m in &report.measurements {
        out.plain(&format!("  {:<24}{:>10.1} ns/call", m.strategy, m.per_call_ns));
        if baseline > 0.0 && m.per_call_ns != baseline {
            out.dim(&format!("  {:>6.2}x", m.per_call_ns / baseline));
        }
        if !m.matches_direct {
            out.plain("  ");
            out.error(&format!("got {:?}", m.result));
        }
        out.newline();
    }
    out.plain("  ");
    out.check_badge(report.all_match());
    out.newline();
    out.newline();
}

pub fn execute(
    kinds: &[BenchKind],
    iterations: u64,
    json: bool,
    choice: ColorChoice,
) -> Result<()> {
    let info = sample_type();
    let kinds = if kinds.is_empty() {
        BenchKind::ALL
    } else {
        kinds
    };

    let reports = kinds
        .iter()
        .map(|&kind| run(&info, kind, iterations))
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let mut out = StyledOutput::new(choice);
        out.success(&format!("{} calls per strategy", iterations));
        out.newline();
        out.newline();
        for report in &reports {
            print_report(&mut out, report);
        }
        out.flush();
    }

    if reports.iter().any(|r| !r.all_match()) {
        let mut out = StyledOutput::new(choice);
        out.stderr_warning("some strategies disagree with the direct call");
        bail!("result mismatch");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_agrees_with_direct_call() {
        let info = sample_type();
        for &kind in BenchKind::ALL {
            let report = run(&info, kind, 3).unwrap();
            assert!(report.all_match(), "{:?}: {:?}", kind, report.measurements);
            assert!(report.measurements.len() >= 4);
            assert_eq!(report.measurements[0].strategy, "direct");
        }
    }

    #[test]
    fn test_observed_results() {
        let info = sample_type();
        let by_ref = run(&info, BenchKind::ByRef, 1).unwrap();
        assert_eq!(by_ref.measurements[0].result, "a:end,b:end");

        let void = run(&info, BenchKind::Void, 1).unwrap();
        assert_eq!(void.measurements[0].result, "a/b");
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let info = sample_type();
        assert!(run(&info, BenchKind::Method, 0).is_err());
    }

    #[test]
    fn test_report_serializes() {
        let info = sample_type();
        let report = run(&info, BenchKind::ByRef, 1).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "by-ref");
        assert_eq!(json["iterations"], 1);
        assert!(json["measurements"].as_array().unwrap().len() >= 4);
    }
}
