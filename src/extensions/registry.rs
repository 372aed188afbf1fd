//! Name-to-constructor registries for every extension kind.

use super::{
    DataSourceFactory, DatabaseIdProvider, Interceptor, LogImpl, ObjectFactory,
    ObjectWrapperFactory, ProxyFactory, ReflectorFactory, TransactionFactory, TypeHandler, VfsImpl,
};
use std::collections::BTreeMap;

/// Constructors for one extension kind, keyed by canonical type name.
pub struct Constructors<T: ?Sized> {
    constructors: BTreeMap<String, Box<dyn Fn() -> Box<T>>>,
}

impl<T: ?Sized> Constructors<T> {
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register a constructor under a canonical type name. Re-registration
    /// replaces the previous constructor.
    pub fn register(&mut self, name: impl Into<String>, ctor: impl Fn() -> Box<T> + 'static) {
        self.constructors.insert(name.into(), Box::new(ctor));
    }

    /// Construct a fresh instance by canonical name.
    pub fn create(&self, name: &str) -> Option<Box<T>> {
        self.constructors.get(name).map(|ctor| ctor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Canonical names under a namespace prefix, in sorted order. A name
    /// matches when it continues the prefix at a path separator.
    pub fn names_under(&self, prefix: &str) -> Vec<&str> {
        self.constructors
            .keys()
            .filter(|name| crate::registry::in_namespace(name, prefix))
            .map(String::as_str)
            .collect()
    }
}

impl<T: ?Sized> Default for Constructors<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All extension-kind registries consulted by the builder.
pub struct ExtensionRegistry {
    pub interceptors: Constructors<dyn Interceptor>,
    pub object_factories: Constructors<dyn ObjectFactory>,
    pub object_wrapper_factories: Constructors<dyn ObjectWrapperFactory>,
    pub reflector_factories: Constructors<dyn ReflectorFactory>,
    pub proxy_factories: Constructors<dyn ProxyFactory>,
    pub transaction_factories: Constructors<dyn TransactionFactory>,
    pub data_source_factories: Constructors<dyn DataSourceFactory>,
    pub database_id_providers: Constructors<dyn DatabaseIdProvider>,
    pub type_handlers: Constructors<dyn TypeHandler>,
    pub vfs_impls: Constructors<dyn VfsImpl>,
    pub log_impls: Constructors<dyn LogImpl>,
}

impl ExtensionRegistry {
    /// Empty registry with no constructors.
    pub fn new() -> Self {
        Self {
            interceptors: Constructors::new(),
            object_factories: Constructors::new(),
            object_wrapper_factories: Constructors::new(),
            reflector_factories: Constructors::new(),
            proxy_factories: Constructors::new(),
            transaction_factories: Constructors::new(),
            data_source_factories: Constructors::new(),
            database_id_providers: Constructors::new(),
            type_handlers: Constructors::new(),
            vfs_impls: Constructors::new(),
            log_impls: Constructors::new(),
        }
    }

    /// Registry pre-populated with the built-in implementations under their
    /// canonical names.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .transaction_factories
            .register("LOCAL", || Box::new(super::LocalTransactionFactory::new()));
        registry
            .transaction_factories
            .register("MANAGED", || Box::new(super::ManagedTransactionFactory::new()));
        registry
            .data_source_factories
            .register("UNPOOLED", || Box::new(super::UnpooledDataSourceFactory::new()));
        registry
            .data_source_factories
            .register("POOLED", || Box::new(super::PooledDataSourceFactory::new()));
        registry
            .database_id_providers
            .register("DB_VENDOR", || Box::new(super::VendorDatabaseIdProvider::new()));
        registry
            .object_factories
            .register("DEFAULT", || Box::new(super::DefaultObjectFactory));
        registry
            .object_wrapper_factories
            .register("DEFAULT", || Box::new(super::DefaultObjectWrapperFactory));
        registry
            .reflector_factories
            .register("DEFAULT", || Box::new(super::DefaultReflectorFactory));
        registry
            .proxy_factories
            .register("DEFAULT", || Box::new(super::DefaultProxyFactory));
        registry
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::Extension;

    struct NamedInterceptor(&'static str);
    impl Extension for NamedInterceptor {
        fn type_name(&self) -> &str {
            self.0
        }
    }
    impl crate::extensions::Interceptor for NamedInterceptor {}

    #[test]
    fn test_register_and_create() {
        let mut ctors: Constructors<dyn crate::extensions::Interceptor> = Constructors::new();
        ctors.register("tests::audit::AuditPlugin", || {
            Box::new(NamedInterceptor("tests::audit::AuditPlugin"))
        });

        assert!(ctors.contains("tests::audit::AuditPlugin"));
        let instance = ctors.create("tests::audit::AuditPlugin").unwrap();
        assert_eq!(instance.type_name(), "tests::audit::AuditPlugin");
        assert!(ctors.create("tests::Other").is_none());
    }

    #[test]
    fn test_names_under_prefix() {
        let mut ctors: Constructors<dyn crate::extensions::Interceptor> = Constructors::new();
        ctors.register("tests::audit::A", || Box::new(NamedInterceptor("a")));
        ctors.register("tests::audit::B", || Box::new(NamedInterceptor("b")));
        ctors.register("tests::auditing::C", || Box::new(NamedInterceptor("c")));

        let names = ctors.names_under("tests::audit");
        assert_eq!(names, vec!["tests::audit::A", "tests::audit::B"]);
    }

    #[test]
    fn test_defaults_present() {
        let registry = ExtensionRegistry::with_defaults();
        assert!(registry.transaction_factories.contains("LOCAL"));
        assert!(registry.transaction_factories.contains("MANAGED"));
        assert!(registry.data_source_factories.contains("POOLED"));
        assert!(registry.data_source_factories.contains("UNPOOLED"));
        assert!(registry.database_id_providers.contains("DB_VENDOR"));
    }
}
