//! Member entry points
//!
//! Every registered member carries an invoker built while the member's Rust
//! types were still statically known. An invoker exposes the same
//! implementation at three levels of typing:
//!
//! | Level     | Instance          | Result / value |
//! |-----------|-------------------|----------------|
//! | erased    | `&mut dyn Object` | `Value`        |
//! | widened   | `&mut T`          | `Value`        |
//! | typed     | `&mut T`          | `R`            |
//!
//! The typed and widened entries are stored type-erased (`Arc<dyn Any>`) and
//! recovered by downcasting with the caller's type parameters, so a request
//! for the wrong `T` or `R` yields `None` instead of a bad call.

use std::any::Any;
use std::sync::Arc;

use crate::convert::{FromValue, IntoValue};
use crate::error::{AbiResult, ReflectError};
use crate::types::TypeHandle;
use crate::value::{Object, Value};

/// Typed constructor entry
pub type CtorFn<T> = Arc<dyn Fn(&[Value]) -> AbiResult<T> + Send + Sync>;
/// Erased constructor entry
pub type ErasedCtorFn = Arc<dyn Fn(&[Value]) -> AbiResult<Value> + Send + Sync>;

/// Typed method entry; by-ref parameters are written back into the slice
pub type MethodFn<T, R> = Arc<dyn Fn(&mut T, &mut [Value]) -> AbiResult<R> + Send + Sync>;
/// Erased method entry
pub type ErasedMethodFn =
    Arc<dyn Fn(&mut dyn Object, &mut [Value]) -> AbiResult<Value> + Send + Sync>;

/// Typed property read
pub type GetterFn<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;
/// Method entry reading arguments in place. Yields `None` without calling
/// the member when an argument is not exactly its declared type.
pub type BorrowedMethodFn<T, R> = Arc<dyn Fn(&mut T, &[Value]) -> Option<R> + Send + Sync>;
/// Erased in-place method entry; `Err` only for a foreign instance
pub type ErasedBorrowedMethodFn =
    Arc<dyn Fn(&mut dyn Object, &[Value]) -> AbiResult<Option<Value>> + Send + Sync>;

/// Constructor entry reading arguments in place, `None` on an inexact argument
pub type BorrowedCtorFn<T> = Arc<dyn Fn(&[Value]) -> Option<T> + Send + Sync>;
/// Erased in-place constructor entry
pub type ErasedBorrowedCtorFn = Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>;

/// Erased property read
pub type ErasedGetterFn = Arc<dyn Fn(&dyn Object) -> AbiResult<Value> + Send + Sync>;

/// Typed property write
pub type SetterFn<T, V> = Arc<dyn Fn(&mut T, V) + Send + Sync>;
/// Property write taking an untyped value
pub type ValueSetterFn<T> = Arc<dyn Fn(&mut T, Value) -> AbiResult<()> + Send + Sync>;
/// Erased property write
pub type ErasedSetterFn = Arc<dyn Fn(&mut dyn Object, Value) -> AbiResult<()> + Send + Sync>;

fn instance_mismatch<T: Any>(instance: &dyn Object) -> ReflectError {
    ReflectError::type_mismatch(
        TypeHandle::of::<T>().short_name(),
        instance.type_handle().short_name(),
    )
}

// ============================================================================
// Constructors
// ============================================================================

/// Entry points of a constructor
#[derive(Clone)]
pub struct ConstructorInvoker {
    erased: ErasedCtorFn,
    typed: Arc<dyn Any + Send + Sync>,
    borrowed_erased: Option<ErasedBorrowedCtorFn>,
    borrowed: Option<Arc<dyn Any + Send + Sync>>,
}

impl ConstructorInvoker {
    /// Build from the typed entry
    pub fn new<T: Any + Send + Sync>(typed: CtorFn<T>) -> Self {
        let inner = typed.clone();
        let erased: ErasedCtorFn = Arc::new(move |args: &[Value]| inner(args).map(Value::new));
        ConstructorInvoker {
            erased,
            typed: Arc::new(typed),
            borrowed_erased: None,
            borrowed: None,
        }
    }

    /// Attach the in-place entry
    pub fn with_borrowed<T: Any + Send + Sync>(mut self, borrowed: BorrowedCtorFn<T>) -> Self {
        let inner = borrowed.clone();
        self.borrowed_erased = Some(Arc::new(move |args: &[Value]| inner(args).map(Value::new)));
        self.borrowed = Some(Arc::new(borrowed));
        self
    }

    /// Erased in-place entry, if the constructor has one
    pub fn borrowed_erased(&self) -> Option<ErasedBorrowedCtorFn> {
        self.borrowed_erased.clone()
    }

    /// In-place entry producing `T`
    pub fn borrowed<T: Any>(&self) -> Option<BorrowedCtorFn<T>> {
        self.borrowed
            .as_ref()
            .and_then(|b| b.downcast_ref::<BorrowedCtorFn<T>>())
            .cloned()
    }

    /// Entry producing an untyped instance
    pub fn erased(&self) -> ErasedCtorFn {
        self.erased.clone()
    }

    /// Entry producing `T`, if `T` is the constructed type
    pub fn typed<T: Any>(&self) -> Option<CtorFn<T>> {
        self.typed.downcast_ref::<CtorFn<T>>().cloned()
    }
}

// ============================================================================
// Methods
// ============================================================================

/// Entry points of an instance method
#[derive(Clone)]
pub struct MethodInvoker {
    erased: ErasedMethodFn,
    widened: Arc<dyn Any + Send + Sync>,
    typed: Arc<dyn Any + Send + Sync>,
    borrowed_erased: Option<ErasedBorrowedMethodFn>,
    borrowed_widened: Option<Arc<dyn Any + Send + Sync>>,
    borrowed_typed: Option<Arc<dyn Any + Send + Sync>>,
}

impl MethodInvoker {
    /// Build from the typed entry
    pub fn new<T, R>(typed: MethodFn<T, R>) -> Self
    where
        T: Any + Send + Sync,
        R: IntoValue,
    {
        let inner = typed.clone();
        let widened: MethodFn<T, Value> =
            Arc::new(move |this: &mut T, args: &mut [Value]| inner(this, args).map(R::into_value));

        let inner = widened.clone();
        let erased: ErasedMethodFn = Arc::new(move |this: &mut dyn Object, args: &mut [Value]| {
            match this.as_any_mut().downcast_mut::<T>() {
                Some(this) => inner(this, args),
                None => Err(instance_mismatch::<T>(&*this)),
            }
        });

        MethodInvoker {
            erased,
            widened: Arc::new(widened),
            typed: Arc::new(typed),
            borrowed_erased: None,
            borrowed_widened: None,
            borrowed_typed: None,
        }
    }

    /// Attach the in-place entry.
    ///
    /// Only members whose parameters are all by value have one; by-ref
    /// members always go through a frame.
    pub fn with_borrowed<T, R>(mut self, borrowed: BorrowedMethodFn<T, R>) -> Self
    where
        T: Any + Send + Sync,
        R: IntoValue,
    {
        let inner = borrowed.clone();
        let widened: BorrowedMethodFn<T, Value> =
            Arc::new(move |this: &mut T, args: &[Value]| inner(this, args).map(R::into_value));

        let inner = borrowed.clone();
        let erased: ErasedBorrowedMethodFn =
            Arc::new(move |this: &mut dyn Object, args: &[Value]| {
                match this.as_any_mut().downcast_mut::<T>() {
                    Some(this) => Ok(inner(this, args).map(R::into_value)),
                    None => Err(instance_mismatch::<T>(&*this)),
                }
            });

        self.borrowed_erased = Some(erased);
        self.borrowed_widened = Some(Arc::new(widened));
        self.borrowed_typed = Some(Arc::new(borrowed));
        self
    }

    /// Erased in-place entry, if the method has one
    pub fn borrowed_erased(&self) -> Option<ErasedBorrowedMethodFn> {
        self.borrowed_erased.clone()
    }

    /// In-place counterpart of [`entry`](Self::entry)
    pub fn borrowed_entry<T: Any, R: Any>(&self) -> Option<BorrowedMethodFn<T, R>> {
        let typed = self
            .borrowed_typed
            .as_ref()
            .and_then(|b| b.downcast_ref::<BorrowedMethodFn<T, R>>());
        let widened = self
            .borrowed_widened
            .as_ref()
            .and_then(|b| b.downcast_ref::<BorrowedMethodFn<T, R>>());
        typed.or(widened).cloned()
    }

    /// Entry taking any instance and returning an untyped result
    pub fn erased(&self) -> ErasedMethodFn {
        self.erased.clone()
    }

    /// Entry taking `&mut T` and returning an untyped result
    pub fn widened<T: Any>(&self) -> Option<MethodFn<T, Value>> {
        self.widened.downcast_ref::<MethodFn<T, Value>>().cloned()
    }

    /// Entry taking `&mut T` and returning `R`
    pub fn typed<T: Any, R: Any>(&self) -> Option<MethodFn<T, R>> {
        self.typed.downcast_ref::<MethodFn<T, R>>().cloned()
    }

    /// The typed entry when `R` is the declared result, else the widened
    /// entry when `R` is `Value`
    pub fn entry<T: Any, R: Any>(&self) -> Option<MethodFn<T, R>> {
        self.typed
            .downcast_ref::<MethodFn<T, R>>()
            .or_else(|| self.widened.downcast_ref::<MethodFn<T, R>>())
            .cloned()
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Entry points of a property read accessor
#[derive(Clone)]
pub struct GetterInvoker {
    erased: ErasedGetterFn,
    widened: Arc<dyn Any + Send + Sync>,
    typed: Arc<dyn Any + Send + Sync>,
}

impl GetterInvoker {
    /// Build from the typed entry
    pub fn new<T, V>(typed: GetterFn<T, V>) -> Self
    where
        T: Any + Send + Sync,
        V: IntoValue,
    {
        let inner = typed.clone();
        let widened: GetterFn<T, Value> = Arc::new(move |this: &T| inner(this).into_value());

        let inner = widened.clone();
        let erased: ErasedGetterFn = Arc::new(move |this: &dyn Object| {
            match this.downcast_ref::<T>() {
                Some(this) => Ok(inner(this)),
                None => Err(instance_mismatch::<T>(this)),
            }
        });

        GetterInvoker {
            erased,
            widened: Arc::new(widened),
            typed: Arc::new(typed),
        }
    }

    /// Read from any instance
    pub fn erased(&self) -> ErasedGetterFn {
        self.erased.clone()
    }

    /// Read from `&T` as an untyped value
    pub fn widened<T: Any>(&self) -> Option<GetterFn<T, Value>> {
        self.widened.downcast_ref::<GetterFn<T, Value>>().cloned()
    }

    /// Read from `&T` as `V`
    pub fn typed<T: Any, V: Any>(&self) -> Option<GetterFn<T, V>> {
        self.typed.downcast_ref::<GetterFn<T, V>>().cloned()
    }

    /// The typed entry when `V` is the property type, else the widened
    /// entry when `V` is `Value`
    pub fn entry<T: Any, V: Any>(&self) -> Option<GetterFn<T, V>> {
        self.typed
            .downcast_ref::<GetterFn<T, V>>()
            .or_else(|| self.widened.downcast_ref::<GetterFn<T, V>>())
            .cloned()
    }
}

/// Entry points of a property write accessor
#[derive(Clone)]
pub struct SetterInvoker {
    erased: ErasedSetterFn,
    widened: Arc<dyn Any + Send + Sync>,
    typed: Arc<dyn Any + Send + Sync>,
}

impl SetterInvoker {
    /// Build from the typed entry
    pub fn new<T, V>(typed: SetterFn<T, V>) -> Self
    where
        T: Any + Send + Sync,
        V: FromValue,
    {
        let inner = typed.clone();
        let widened: ValueSetterFn<T> = Arc::new(move |this: &mut T, value: Value| {
            inner(this, V::take_value(value)?);
            Ok(())
        });

        let inner = widened.clone();
        let erased: ErasedSetterFn = Arc::new(move |this: &mut dyn Object, value: Value| {
            match this.as_any_mut().downcast_mut::<T>() {
                Some(this) => inner(this, value),
                None => Err(instance_mismatch::<T>(&*this)),
            }
        });

        SetterInvoker {
            erased,
            widened: Arc::new(widened),
            typed: Arc::new(typed),
        }
    }

    /// Write to any instance from an untyped value
    pub fn erased(&self) -> ErasedSetterFn {
        self.erased.clone()
    }

    /// Write to `&mut T` from an untyped value
    pub fn widened<T: Any>(&self) -> Option<ValueSetterFn<T>> {
        self.widened.downcast_ref::<ValueSetterFn<T>>().cloned()
    }

    /// Write `V` to `&mut T`
    pub fn typed<T: Any, V: Any>(&self) -> Option<SetterFn<T, V>> {
        self.typed.downcast_ref::<SetterFn<T, V>>().cloned()
    }
}
