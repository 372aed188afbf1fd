//! The configuration aggregate: the single mutable object a parse produces.
//!
//! A configuration is created once per build, mutated incrementally by every
//! section applier, and handed to the caller exactly once. A failure mid-parse
//! discards it; no partial configuration ever escapes.

use crate::document::Properties;
use crate::extensions::{
    DataSource, DefaultObjectFactory, DefaultObjectWrapperFactory, DefaultProxyFactory,
    DefaultReflectorFactory, Interceptor, LogImpl, ObjectFactory, ObjectWrapperFactory,
    ProxyFactory, ReflectorFactory, TransactionFactory, VfsImpl,
};
use crate::registry::{MapperRegistry, SqlFragmentRegistry, TypeAliasRegistry, TypeHandlerRegistry};

mod settings;

pub use settings::{
    is_known_setting, AutoMappingBehavior, ExecutorType, LocalCacheScope, ResultSetType, Settings,
    UnknownColumnBehavior, KNOWN_SETTINGS,
};

/// A named pairing of a transaction strategy and a realized data source.
/// Built once environment selection completes; never mutated afterward.
pub struct Environment {
    id: String,
    transaction_factory: Box<dyn TransactionFactory>,
    data_source: Box<dyn DataSource>,
}

impl Environment {
    pub fn new(
        id: impl Into<String>,
        transaction_factory: Box<dyn TransactionFactory>,
        data_source: Box<dyn DataSource>,
    ) -> Self {
        Self {
            id: id.into(),
            transaction_factory,
            data_source,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transaction_factory(&self) -> &dyn TransactionFactory {
        self.transaction_factory.as_ref()
    }

    pub fn data_source(&self) -> &dyn DataSource {
        self.data_source.as_ref()
    }
}

/// Runtime configuration for the mapping engine.
pub struct Configuration {
    variables: Properties,
    type_aliases: TypeAliasRegistry,
    type_handlers: TypeHandlerRegistry,
    mappers: MapperRegistry,
    sql_fragments: SqlFragmentRegistry,
    interceptors: Vec<Box<dyn Interceptor>>,
    environment: Option<Environment>,
    database_id: Option<String>,
    object_factory: Box<dyn ObjectFactory>,
    object_wrapper_factory: Box<dyn ObjectWrapperFactory>,
    reflector_factory: Box<dyn ReflectorFactory>,
    proxy_factory: Box<dyn ProxyFactory>,
    vfs_impl: Option<Box<dyn VfsImpl>>,
    log_impl: Option<Box<dyn LogImpl>>,
    settings: Settings,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("variables", &self.variables)
            .field("database_id", &self.database_id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Configuration {
    /// New configuration with default factories and default settings.
    pub fn new() -> Self {
        Self {
            variables: Properties::new(),
            type_aliases: TypeAliasRegistry::new(),
            type_handlers: TypeHandlerRegistry::new(),
            mappers: MapperRegistry::new(),
            sql_fragments: SqlFragmentRegistry::new(),
            interceptors: Vec::new(),
            environment: None,
            database_id: None,
            object_factory: Box::new(DefaultObjectFactory),
            object_wrapper_factory: Box::new(DefaultObjectWrapperFactory),
            reflector_factory: Box::new(DefaultReflectorFactory),
            proxy_factory: Box::new(DefaultProxyFactory),
            vfs_impl: None,
            log_impl: None,
            settings: Settings::default(),
        }
    }

    pub fn variables(&self) -> &Properties {
        &self.variables
    }

    pub fn set_variables(&mut self, variables: Properties) {
        self.variables = variables;
    }

    pub fn type_aliases(&self) -> &TypeAliasRegistry {
        &self.type_aliases
    }

    pub fn type_aliases_mut(&mut self) -> &mut TypeAliasRegistry {
        &mut self.type_aliases
    }

    pub fn type_handlers(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub fn type_handlers_mut(&mut self) -> &mut TypeHandlerRegistry {
        &mut self.type_handlers
    }

    pub fn mappers(&self) -> &MapperRegistry {
        &self.mappers
    }

    pub fn mappers_mut(&mut self) -> &mut MapperRegistry {
        &mut self.mappers
    }

    pub fn sql_fragments(&self) -> &SqlFragmentRegistry {
        &self.sql_fragments
    }

    pub fn set_sql_fragments(&mut self, fragments: SqlFragmentRegistry) {
        self.sql_fragments = fragments;
    }

    /// Append an interceptor. Document order is invocation-wrapping order and
    /// is preserved exactly.
    pub fn add_interceptor(&mut self, interceptor: Box<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn interceptors(&self) -> &[Box<dyn Interceptor>] {
        &self.interceptors
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = Some(environment);
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    pub fn set_database_id(&mut self, database_id: Option<String>) {
        self.database_id = database_id;
    }

    pub fn object_factory(&self) -> &dyn ObjectFactory {
        self.object_factory.as_ref()
    }

    pub fn set_object_factory(&mut self, factory: Box<dyn ObjectFactory>) {
        self.object_factory = factory;
    }

    pub fn object_wrapper_factory(&self) -> &dyn ObjectWrapperFactory {
        self.object_wrapper_factory.as_ref()
    }

    pub fn set_object_wrapper_factory(&mut self, factory: Box<dyn ObjectWrapperFactory>) {
        self.object_wrapper_factory = factory;
    }

    pub fn reflector_factory(&self) -> &dyn ReflectorFactory {
        self.reflector_factory.as_ref()
    }

    pub fn set_reflector_factory(&mut self, factory: Box<dyn ReflectorFactory>) {
        self.reflector_factory = factory;
    }

    pub fn proxy_factory(&self) -> &dyn ProxyFactory {
        self.proxy_factory.as_ref()
    }

    pub fn set_proxy_factory(&mut self, factory: Box<dyn ProxyFactory>) {
        self.proxy_factory = factory;
    }

    pub fn vfs_impl(&self) -> Option<&dyn VfsImpl> {
        self.vfs_impl.as_deref()
    }

    pub fn set_vfs_impl(&mut self, vfs: Box<dyn VfsImpl>) {
        self.vfs_impl = Some(vfs);
    }

    pub fn log_impl(&self) -> Option<&dyn LogImpl> {
        self.log_impl.as_deref()
    }

    pub fn set_log_impl(&mut self, log: Box<dyn LogImpl>) {
        self.log_impl = Some(log);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{Extension, GenericDataSource, LocalTransactionFactory};

    #[test]
    fn test_new_configuration_defaults() {
        let config = Configuration::new();
        assert!(config.variables().is_empty());
        assert!(config.interceptors().is_empty());
        assert!(config.environment().is_none());
        assert!(config.database_id().is_none());
        assert!(config.settings().cache_enabled);
        assert_eq!(config.object_factory().type_name(), "DEFAULT");
        assert!(config.vfs_impl().is_none());
    }

    #[test]
    fn test_environment_binding() {
        let mut config = Configuration::new();
        let env = Environment::new(
            "dev",
            Box::new(LocalTransactionFactory::new()),
            Box::new(GenericDataSource::new(
                [("product".to_string(), "H2".to_string())].into(),
            )),
        );
        config.set_environment(env);

        let env = config.environment().unwrap();
        assert_eq!(env.id(), "dev");
        assert_eq!(env.transaction_factory().type_name(), "LOCAL");
        assert_eq!(env.data_source().product_name().unwrap(), "H2");
    }
}
