//! Type registration
//!
//! `TypeBuilder<T>` turns ordinary Rust functions and closures into member
//! descriptors. Argument and result types are taken from the function
//! signature, so the builder can produce the fully typed entry point of every
//! member alongside its erased one.
//!
//! ```ignore
//! let info = TypeBuilder::<Greeter>::new()
//!     .constructor(&["name"], Greeter::new)
//!     .method("greet", &["greeting"], Greeter::greet)
//!     .property("name", |g: &Greeter| g.name.clone(), |g: &mut Greeter, v| g.name = v)
//!     .build();
//! ```
//!
//! Methods may take `&T` or `&mut T` and up to six arguments implementing
//! `FromValue`. Members with by-reference parameters are registered with
//! `method_raw`, which receives the argument container directly.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::convert::{FromValue, IntoValue};
use crate::error::AbiResult;
use crate::invoker::{
    BorrowedCtorFn, BorrowedMethodFn, ConstructorInvoker, CtorFn, GetterFn, GetterInvoker,
    MethodFn, MethodInvoker, SetterFn, SetterInvoker,
};
use crate::member::{ConstructorInfo, MethodInfo, ParameterInfo, PropertyInfo, Visibility};
use crate::type_info::TypeInfo;
use crate::types::{ParamType, TypeHandle};
use crate::value::Value;

/// Marker for methods taking `&T`
#[doc(hidden)]
pub struct SharedReceiver;

/// Marker for methods taking `&mut T`
#[doc(hidden)]
pub struct ExclusiveReceiver;

/// A function usable as an instance method of `T`
pub trait IntoMethod<T, Marker>: Send + Sync + 'static {
    /// Result type
    type Output: IntoValue;

    /// Declared parameter types
    fn parameter_types() -> Vec<ParamType>;

    /// Typed entry point, plus its in-place counterpart
    fn into_method_fns(self) -> (MethodFn<T, Self::Output>, BorrowedMethodFn<T, Self::Output>);
}

/// A function usable as a constructor of `T`
pub trait IntoConstructor<T, Marker>: Send + Sync + 'static {
    /// Declared parameter types
    fn parameter_types() -> Vec<ParamType>;

    /// Typed entry point, plus its in-place counterpart
    fn into_ctor_fns(self) -> (CtorFn<T>, BorrowedCtorFn<T>);
}

macro_rules! impl_into_member {
    ($($arg:ident),*) => {
        impl<T, F, R, $($arg,)*> IntoMethod<T, (SharedReceiver, fn($($arg,)*) -> R)> for F
        where
            T: Any + Send + Sync,
            F: Fn(&T, $($arg,)*) -> R + Send + Sync + 'static,
            R: IntoValue,
            $($arg: FromValue,)*
        {
            type Output = R;

            fn parameter_types() -> Vec<ParamType> {
                vec![$(ParamType::of::<$arg>(),)*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_method_fns(self) -> (MethodFn<T, R>, BorrowedMethodFn<T, R>) {
                let f = Arc::new(self);
                let framed = f.clone();
                let framed: MethodFn<T, R> =
                    Arc::new(move |this: &mut T, args: &mut [Value]| -> AbiResult<R> {
                        let mut i = 0;
                        $(
                            let $arg = $arg::from_value(&args[i])?;
                            i += 1;
                        )*
                        Ok(framed(&*this, $($arg,)*))
                    });
                let borrowed: BorrowedMethodFn<T, R> =
                    Arc::new(move |this: &mut T, args: &[Value]| -> Option<R> {
                        let mut i = 0;
                        $(
                            let $arg = $arg::from_exact(args.get(i)?)?;
                            i += 1;
                        )*
                        Some(f(&*this, $($arg,)*))
                    });
                (framed, borrowed)
            }
        }

        impl<T, F, R, $($arg,)*> IntoMethod<T, (ExclusiveReceiver, fn($($arg,)*) -> R)> for F
        where
            T: Any + Send + Sync,
            F: Fn(&mut T, $($arg,)*) -> R + Send + Sync + 'static,
            R: IntoValue,
            $($arg: FromValue,)*
        {
            type Output = R;

            fn parameter_types() -> Vec<ParamType> {
                vec![$(ParamType::of::<$arg>(),)*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_method_fns(self) -> (MethodFn<T, R>, BorrowedMethodFn<T, R>) {
                let f = Arc::new(self);
                let framed = f.clone();
                let framed: MethodFn<T, R> =
                    Arc::new(move |this: &mut T, args: &mut [Value]| -> AbiResult<R> {
                        let mut i = 0;
                        $(
                            let $arg = $arg::from_value(&args[i])?;
                            i += 1;
                        )*
                        Ok(framed(this, $($arg,)*))
                    });
                let borrowed: BorrowedMethodFn<T, R> =
                    Arc::new(move |this: &mut T, args: &[Value]| -> Option<R> {
                        let mut i = 0;
                        $(
                            let $arg = $arg::from_exact(args.get(i)?)?;
                            i += 1;
                        )*
                        Some(f(this, $($arg,)*))
                    });
                (framed, borrowed)
            }
        }

        impl<T, F, $($arg,)*> IntoConstructor<T, fn($($arg,)*) -> T> for F
        where
            T: Any + Send + Sync,
            F: Fn($($arg,)*) -> T + Send + Sync + 'static,
            $($arg: FromValue,)*
        {
            fn parameter_types() -> Vec<ParamType> {
                vec![$(ParamType::of::<$arg>(),)*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_ctor_fns(self) -> (CtorFn<T>, BorrowedCtorFn<T>) {
                let f = Arc::new(self);
                let framed = f.clone();
                let framed: CtorFn<T> = Arc::new(move |args: &[Value]| -> AbiResult<T> {
                    let mut i = 0;
                    $(
                        let $arg = $arg::from_value(&args[i])?;
                        i += 1;
                    )*
                    Ok(framed($($arg,)*))
                });
                let borrowed: BorrowedCtorFn<T> = Arc::new(move |args: &[Value]| -> Option<T> {
                    let mut i = 0;
                    $(
                        let $arg = $arg::from_exact(args.get(i)?)?;
                        i += 1;
                    )*
                    Some(f($($arg,)*))
                });
                (framed, borrowed)
            }
        }
    };
}

impl_into_member!();
impl_into_member!(A1);
impl_into_member!(A1, A2);
impl_into_member!(A1, A2, A3);
impl_into_member!(A1, A2, A3, A4);
impl_into_member!(A1, A2, A3, A4, A5);
impl_into_member!(A1, A2, A3, A4, A5, A6);

fn parameters(names: &[&str], types: Vec<ParamType>) -> Vec<ParameterInfo> {
    types
        .into_iter()
        .enumerate()
        .map(|(index, ty)| {
            let name = match names.get(index) {
                Some(name) => name.to_string(),
                None => format!("arg{}", index),
            };
            ParameterInfo::new(name, ty, index)
        })
        .collect()
}

fn return_type<R: Any>() -> Option<TypeHandle> {
    let ty = TypeHandle::of::<R>();
    if ty.is_unit() {
        None
    } else {
        Some(ty)
    }
}

/// Builder collecting the members of `T`
pub struct TypeBuilder<T> {
    name: String,
    constructors: Vec<ConstructorInfo>,
    methods: Vec<MethodInfo>,
    properties: Vec<PropertyInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
    /// Start a type named after `T`
    pub fn new() -> Self {
        Self::named(TypeHandle::of::<T>().short_name())
    }

    /// Start a type with an explicit name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructors: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Add a constructor
    pub fn constructor<F, M>(mut self, param_names: &[&str], f: F) -> Self
    where
        F: IntoConstructor<T, M>,
    {
        let params = parameters(param_names, F::parameter_types());
        let (framed, borrowed) = f.into_ctor_fns();
        let invoker = ConstructorInvoker::new(framed).with_borrowed(borrowed);
        self.constructors
            .push(ConstructorInfo::new(TypeHandle::of::<T>(), params, invoker));
        self
    }

    /// Add a public method
    pub fn method<F, M>(self, name: &str, param_names: &[&str], f: F) -> Self
    where
        F: IntoMethod<T, M>,
    {
        self.add_method::<F, M>(name, param_names, f, Visibility::Public)
    }

    /// Add a private method
    pub fn private_method<F, M>(self, name: &str, param_names: &[&str], f: F) -> Self
    where
        F: IntoMethod<T, M>,
    {
        self.add_method::<F, M>(name, param_names, f, Visibility::Private)
    }

    /// Add a public method operating on the argument container directly.
    ///
    /// `params` declares the signature, including by-reference parameters;
    /// the implementation reads its arguments from the slice and writes
    /// by-reference results back into it.
    pub fn method_raw<R, F>(mut self, name: &str, params: &[(&str, ParamType)], f: F) -> Self
    where
        R: IntoValue,
        F: Fn(&mut T, &mut [Value]) -> AbiResult<R> + Send + Sync + 'static,
    {
        let params = params
            .iter()
            .enumerate()
            .map(|(index, (name, ty))| ParameterInfo::new(*name, *ty, index))
            .collect();
        let typed: MethodFn<T, R> = Arc::new(f);
        self.methods.push(MethodInfo::new(
            name.to_string(),
            TypeHandle::of::<T>(),
            params,
            return_type::<R>(),
            Visibility::Public,
            MethodInvoker::new(typed),
        ));
        self
    }

    /// Add a read/write property
    pub fn property<V, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        V: FromValue + IntoValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let getter: GetterFn<T, V> = Arc::new(get);
        let setter: SetterFn<T, V> = Arc::new(set);
        self.properties.push(PropertyInfo::new(
            name.to_string(),
            TypeHandle::of::<T>(),
            TypeHandle::of::<V>(),
            Visibility::Public,
            Some(GetterInvoker::new(getter)),
            Some(SetterInvoker::new(setter)),
        ));
        self
    }

    /// Add a property without a write accessor
    pub fn read_only_property<V, G>(mut self, name: &str, get: G) -> Self
    where
        V: IntoValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let getter: GetterFn<T, V> = Arc::new(get);
        self.properties.push(PropertyInfo::new(
            name.to_string(),
            TypeHandle::of::<T>(),
            TypeHandle::of::<V>(),
            Visibility::Public,
            Some(GetterInvoker::new(getter)),
            None,
        ));
        self
    }

    /// Add a property without a read accessor
    pub fn write_only_property<V, S>(mut self, name: &str, set: S) -> Self
    where
        V: FromValue,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter: SetterFn<T, V> = Arc::new(set);
        self.properties.push(PropertyInfo::new(
            name.to_string(),
            TypeHandle::of::<T>(),
            TypeHandle::of::<V>(),
            Visibility::Public,
            None,
            Some(SetterInvoker::new(setter)),
        ));
        self
    }

    /// Finish the type
    pub fn build(self) -> TypeInfo {
        TypeInfo::new(
            TypeHandle::of::<T>(),
            self.name,
            self.constructors,
            self.methods,
            self.properties,
        )
    }

    fn add_method<F, M>(
        mut self,
        name: &str,
        param_names: &[&str],
        f: F,
        visibility: Visibility,
    ) -> Self
    where
        F: IntoMethod<T, M>,
    {
        let params = parameters(param_names, F::parameter_types());
        let (framed, borrowed) = f.into_method_fns();
        self.methods.push(MethodInfo::new(
            name.to_string(),
            TypeHandle::of::<T>(),
            params,
            return_type::<F::Output>(),
            visibility,
            MethodInvoker::new(framed).with_borrowed(borrowed),
        ));
        self
    }
}

impl<T: Any + Send + Sync> Default for TypeBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Account {
        owner: String,
        balance: i64,
    }

    impl Account {
        fn open(owner: String, balance: i64) -> Self {
            Account { owner, balance }
        }

        fn deposit(&mut self, amount: i64) -> i64 {
            self.balance += amount;
            self.balance
        }

        fn summary(&self) -> String {
            format!("{}: {}", self.owner, self.balance)
        }

        fn close(&mut self) {
            self.balance = 0;
        }
    }

    fn account_type() -> TypeInfo {
        TypeBuilder::<Account>::new()
            .constructor(&["owner", "balance"], Account::open)
            .method("deposit", &["amount"], Account::deposit)
            .method("summary", &[], Account::summary)
            .method("close", &[], Account::close)
            .property(
                "owner",
                |a: &Account| a.owner.clone(),
                |a: &mut Account, v: String| a.owner = v,
            )
            .build()
    }

    #[test]
    fn test_signatures_from_functions() {
        let info = account_type();
        assert_eq!(info.name(), "Account");

        let ctor = &info.constructors()[0];
        assert_eq!(
            ctor.parameter_types(),
            vec![ParamType::of::<String>(), ParamType::of::<i64>()]
        );
        assert_eq!(ctor.parameters()[1].name, "balance");

        let deposit = info.get_method("deposit").unwrap();
        assert_eq!(deposit.return_type(), Some(TypeHandle::of::<i64>()));
        assert_eq!(deposit.parameters()[0].name, "amount");

        assert!(info.get_method("close").unwrap().is_void());
    }

    #[test]
    fn test_missing_parameter_names_are_generated() {
        let info = TypeBuilder::<Account>::new()
            .method("deposit", &[], Account::deposit)
            .build();
        assert_eq!(info.get_method("deposit").unwrap().parameters()[0].name, "arg0");
    }

    #[test]
    fn test_typed_entries_run_the_function() {
        let info = account_type();
        let ctor = info.constructors()[0].invoker().typed::<Account>().unwrap();
        let mut account = ctor(&[Value::from("ada"), Value::from(10i64)]).unwrap();

        let deposit = info
            .get_method("deposit")
            .unwrap()
            .invoker()
            .typed::<Account, i64>()
            .unwrap();
        assert_eq!(deposit(&mut account, &mut [Value::from(5i64)]).unwrap(), 15);

        let summary = info.get_method("summary").unwrap().invoker().erased();
        let result = summary(&mut account, &mut []).unwrap();
        assert_eq!(result.extract::<String>().unwrap(), "ada: 15");
    }

    #[test]
    fn test_in_place_entries_need_exact_arguments() {
        let info = account_type();
        let deposit = info
            .get_method("deposit")
            .unwrap()
            .invoker()
            .borrowed_entry::<Account, i64>()
            .unwrap();

        let mut account = Account::open("ada".to_string(), 10);
        assert_eq!(deposit(&mut account, &[Value::from(5i64)]), Some(15));
        assert_eq!(deposit(&mut account, &[Value::from(5i32)]), None);
        assert_eq!(deposit(&mut account, &[]), None);
        assert_eq!(account.balance, 15);

        let open = info.constructors()[0].invoker().borrowed::<Account>().unwrap();
        let opened = open(&[Value::from("bo"), Value::from(1i64)]).unwrap();
        assert_eq!(opened.summary(), "bo: 1");
        assert!(open(&[Value::from("bo"), Value::from(1u8)]).is_none());
    }

    #[test]
    fn test_raw_method_has_no_in_place_entry() {
        let info = TypeBuilder::<Account>::new()
            .method_raw("peek", &[], |a: &mut Account, _: &mut [Value]| -> AbiResult<i64> {
                Ok(a.balance)
            })
            .build();
        let invoker = info.get_method("peek").unwrap().invoker();
        assert!(invoker.borrowed_erased().is_none());
        assert!(invoker.borrowed_entry::<Account, i64>().is_none());
    }

    #[test]
    fn test_raw_method_with_by_ref_parameter() {
        let info = TypeBuilder::<Account>::new()
            .method_raw(
                "swap_owner",
                &[("owner", ParamType::by_ref::<String>())],
                |a: &mut Account, args: &mut [Value]| -> AbiResult<()> {
                    let incoming = args[0].extract::<String>()?;
                    let outgoing = std::mem::replace(&mut a.owner, incoming);
                    args[0] = Value::new(outgoing);
                    Ok(())
                },
            )
            .build();

        let method = info.get_method("swap_owner").unwrap();
        assert!(method.has_by_ref_parameters());
        assert!(method.is_void());

        let mut account = Account::open("old".to_string(), 0);
        let mut args = [Value::from("new")];
        method.invoke_by_ref(&mut account, &mut args).unwrap();
        assert_eq!(account.owner, "new");
        assert_eq!(args[0].extract::<String>().unwrap(), "old");
    }
}
