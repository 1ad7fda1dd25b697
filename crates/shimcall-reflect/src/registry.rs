//! Type registry
//!
//! Maps Rust types (and their registered names) to `TypeInfo`. Lookups take a
//! shared lock; registration takes the exclusive lock. A process-wide
//! instance is available through `TypeRegistry::global()`.
//!
//! Types are keyed by `TypeId`, names are not unique. When two types share a
//! name, the name resolves to the most recent registration; the other type
//! stays reachable through `get` and `get_by_handle`, and takes the name back
//! if its holder is re-registered under another one.

use std::any::{Any, TypeId};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::type_info::TypeInfo;
use crate::types::TypeHandle;

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

#[derive(Default)]
struct Tables {
    by_type: FxHashMap<TypeId, Arc<TypeInfo>>,
    by_name: FxHashMap<String, TypeId>,
}

impl Tables {
    fn insert(&mut self, id: TypeId, info: Arc<TypeInfo>) {
        let name = info.name().to_string();
        if let Some(previous) = self.by_type.insert(id, info) {
            if previous.name() != name {
                self.release_name(previous.name(), id);
            }
        }
        self.by_name.insert(name, id);
    }

    /// Drop `owner`'s claim on `name`, handing it to another type of that
    /// name if one is registered
    fn release_name(&mut self, name: &str, owner: TypeId) {
        if self.by_name.get(name) != Some(&owner) {
            return;
        }
        let heir = self
            .by_type
            .iter()
            .find(|(id, info)| **id != owner && info.name() == name)
            .map(|(id, _)| *id);
        match heir {
            Some(id) => {
                self.by_name.insert(name.to_string(), id);
            }
            None => {
                self.by_name.remove(name);
            }
        }
    }
}

/// Registry of introspectable types
#[derive(Default)]
pub struct TypeRegistry {
    tables: RwLock<Tables>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// Register a type, replacing any earlier registration of the same type.
    ///
    /// The type's name now resolves to it, even if another type registered
    /// the same name first.
    pub fn register(&self, info: TypeInfo) -> Arc<TypeInfo> {
        let info = Arc::new(info);
        let id = info.handle().id();

        tracing::debug!(
            type_name = info.name(),
            constructors = info.constructors().len(),
            methods = info.methods().len(),
            properties = info.properties().len(),
            "registered type"
        );

        self.tables.write().insert(id, info.clone());
        info
    }

    /// Return the registration for `T`, building it with `build` on first use
    pub fn get_or_register<T: Any>(&self, build: impl FnOnce() -> TypeInfo) -> Arc<TypeInfo> {
        if let Some(info) = self.get::<T>() {
            return info;
        }
        let info = build();
        let mut tables = self.tables.write();
        // Another thread may have registered in between
        if let Some(existing) = tables.by_type.get(&TypeId::of::<T>()) {
            return existing.clone();
        }
        let info = Arc::new(info);
        tables.insert(TypeId::of::<T>(), info.clone());
        tracing::debug!(type_name = info.name(), "registered type");
        info
    }

    /// Registration for `T`
    pub fn get<T: Any>(&self) -> Option<Arc<TypeInfo>> {
        self.tables.read().by_type.get(&TypeId::of::<T>()).cloned()
    }

    /// Registration for a runtime type
    pub fn get_by_handle(&self, handle: TypeHandle) -> Option<Arc<TypeInfo>> {
        self.tables.read().by_type.get(&handle.id()).cloned()
    }

    /// Registration by type name
    pub fn get_by_name(&self, name: &str) -> Option<Arc<TypeInfo>> {
        let tables = self.tables.read();
        let id = tables.by_name.get(name)?;
        tables.by_type.get(id).cloned()
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.tables.read().by_type.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TypeBuilder;

    struct Alpha;
    struct Beta;
    struct Gamma;

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());

        registry.register(TypeBuilder::<Alpha>::new().build());
        registry.register(TypeBuilder::<Beta>::named("beta").build());

        assert_eq!(registry.len(), 2);
        assert!(registry.get::<Alpha>().is_some());
        assert_eq!(registry.get_by_name("beta").unwrap().name(), "beta");
        assert!(registry.get_by_handle(TypeHandle::of::<Beta>()).is_some());
        assert!(registry.get_by_name("Gamma").is_none());
        assert_eq!(registry.type_names(), vec!["Alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_reregistration_replaces_name() {
        let registry = TypeRegistry::new();
        registry.register(TypeBuilder::<Alpha>::named("first").build());
        registry.register(TypeBuilder::<Alpha>::named("second").build());

        assert_eq!(registry.len(), 1);
        assert!(registry.get_by_name("first").is_none());
        assert_eq!(registry.get::<Alpha>().unwrap().name(), "second");
    }

    #[test]
    fn test_get_or_register_builds_once() {
        let registry = TypeRegistry::new();
        let first = registry.get_or_register::<Alpha>(|| TypeBuilder::<Alpha>::new().build());
        let second = registry.get_or_register::<Alpha>(|| unreachable!());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_shared_name_resolves_to_latest_registration() {
        let registry = TypeRegistry::new();
        registry.register(TypeBuilder::<Alpha>::named("Foo").build());
        registry.register(TypeBuilder::<Beta>::named("Foo").build());

        let by_name = registry.get_by_name("Foo").unwrap();
        assert_eq!(by_name.handle(), TypeHandle::of::<Beta>());
        assert_eq!(registry.get::<Alpha>().unwrap().name(), "Foo");
        assert_eq!(registry.type_names(), vec!["Foo".to_string()]);
    }

    #[test]
    fn test_renaming_a_displaced_type_keeps_the_holder() {
        let registry = TypeRegistry::new();
        registry.register(TypeBuilder::<Alpha>::named("Foo").build());
        registry.register(TypeBuilder::<Beta>::named("Foo").build());
        registry.register(TypeBuilder::<Alpha>::named("AFoo").build());

        let foo = registry.get_by_name("Foo").unwrap();
        assert_eq!(foo.handle(), TypeHandle::of::<Beta>());
        let afoo = registry.get_by_name("AFoo").unwrap();
        assert_eq!(afoo.handle(), TypeHandle::of::<Alpha>());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_renamed_holder_hands_name_back() {
        let registry = TypeRegistry::new();
        registry.register(TypeBuilder::<Alpha>::named("Foo").build());
        registry.register(TypeBuilder::<Beta>::named("Foo").build());
        registry.register(TypeBuilder::<Beta>::named("Bar").build());

        let foo = registry.get_by_name("Foo").unwrap();
        assert_eq!(foo.handle(), TypeHandle::of::<Alpha>());
        let bar = registry.get_by_name("Bar").unwrap();
        assert_eq!(bar.handle(), TypeHandle::of::<Beta>());
    }

    #[test]
    fn test_get_or_register_with_a_taken_name() {
        let registry = TypeRegistry::new();
        registry.register(TypeBuilder::<Alpha>::named("Foo").build());
        registry.get_or_register::<Gamma>(|| TypeBuilder::<Gamma>::named("Foo").build());
        registry.register(TypeBuilder::<Gamma>::named("Gamma").build());

        let foo = registry.get_by_name("Foo").unwrap();
        assert_eq!(foo.handle(), TypeHandle::of::<Alpha>());
        assert!(registry.get_by_name("Gamma").is_some());
        assert_eq!(registry.len(), 2);
    }
}
