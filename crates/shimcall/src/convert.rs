//! Argument conversion and frame marshalling
//!
//! Each argument expression lowers to an `ArgSlot`: the container index to
//! read, the conversion to apply, and whether the converted value is copied
//! back after the call. The exact-type check is a `TypeId` comparison; the
//! coercion table is only consulted when it fails.

use smallvec::SmallVec;

use shimcall_reflect::{coerce, TypeHandle, Value};

use crate::error::{ShimError, ShimResult};
use crate::expr::Expr;

/// Arguments as handed to a member entry point
pub type Frame = SmallVec<[Value; 4]>;

/// Conversion applied to one argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Declared type is `Value`; anything goes
    Passthrough,
    /// Must be (or widen to) `to`
    Checked { to: TypeHandle },
}

impl Conversion {
    pub fn to_type(to: TypeHandle) -> Self {
        if to.is_value() {
            Conversion::Passthrough
        } else {
            Conversion::Checked { to }
        }
    }

    #[inline]
    pub fn apply(&self, value: &Value) -> ShimResult<Value> {
        match self {
            Conversion::Passthrough => Ok(value.clone()),
            Conversion::Checked { to } => {
                if value.type_id() == Some(to.id()) {
                    Ok(value.clone())
                } else {
                    coerce_slow(value, *to)
                }
            }
        }
    }

    /// Like `apply`, but hands an exact match back without cloning
    #[inline]
    pub fn apply_owned(&self, value: Value) -> ShimResult<Value> {
        match self {
            Conversion::Checked { to } if value.type_id() != Some(to.id()) => {
                coerce_slow(&value, *to)
            }
            _ => Ok(value),
        }
    }
}

#[cold]
fn coerce_slow(value: &Value, to: TypeHandle) -> ShimResult<Value> {
    coerce(value, to).ok_or_else(|| ShimError::TypeMismatch {
        expected: to.short_name(),
        got: value.type_name(),
    })
}

/// Lowered argument expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSlot {
    pub index: usize,
    pub conversion: Conversion,
    pub write_back: bool,
}

impl ArgSlot {
    /// Lower an argument expression read from the argument container
    pub fn lower(expr: &Expr) -> ShimResult<Self> {
        let index = expr
            .slot()
            .ok_or_else(|| ShimError::invalid(format!("`{}` does not read an argument", expr)))?;
        let conversion = match expr.target_type() {
            Some(ty) => Conversion::to_type(ty),
            None => Conversion::Passthrough,
        };
        Ok(ArgSlot {
            index,
            conversion,
            write_back: expr.writes_back(),
        })
    }
}

/// Lower every argument expression
pub fn lower_all(exprs: &[Expr]) -> ShimResult<Vec<ArgSlot>> {
    exprs.iter().map(ArgSlot::lower).collect()
}

/// Read and convert the arguments for one call.
///
/// # Panics
///
/// Panics if `args` is shorter than the member's parameter list.
#[inline]
pub fn marshal(slots: &[ArgSlot], args: &[Value]) -> ShimResult<Frame> {
    let mut frame = Frame::with_capacity(slots.len());
    for slot in slots {
        frame.push(slot.conversion.apply(&args[slot.index])?);
    }
    Ok(frame)
}

/// Copy by-ref slots of `frame` back into `args`
#[inline]
pub fn write_back(slots: &[ArgSlot], frame: Frame, args: &mut [Value]) {
    for (slot, value) in slots.iter().zip(frame) {
        if slot.write_back {
            args[slot.index] = value;
        }
    }
}
