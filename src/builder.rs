//! Configuration builder: turns a declarative document into a fully-wired
//! [`Configuration`].
//!
//! Sections are applied in a fixed order because later sections depend on
//! earlier ones: variables must exist before any other read, settings are
//! schema-gated before anything that could consume them, environments are
//! selected after the factory overrides land, and mappers run last so alias,
//! handler, and environment state is complete when mapping files reference
//! it. Each builder instance is single-use.

use crate::config::{is_known_setting, Configuration, Environment};
use crate::document::{Node, Properties};
use crate::error::BuildError;
use crate::extensions::{Constructors, ExtensionRegistry};
use crate::registry::{MapperFileParser, NoopMapperParser, SqlFragmentRegistry};
use crate::resources::{FsResourceLoader, ResourceLoader};
use tracing::debug;

/// Single-use builder producing one [`Configuration`] from one document.
pub struct ConfigurationBuilder {
    parsed: bool,
    root: Node,
    environment: Option<String>,
    vars: Properties,
    configuration: Option<Configuration>,
    extensions: ExtensionRegistry,
    resources: Box<dyn ResourceLoader>,
    mapper_parser: Box<dyn MapperFileParser>,
    sql_fragments: SqlFragmentRegistry,
}

impl ConfigurationBuilder {
    /// Builder over a document rooted at `<configuration>`.
    pub fn new(root: Node) -> Self {
        Self {
            parsed: false,
            root,
            environment: None,
            vars: Properties::new(),
            configuration: Some(Configuration::new()),
            extensions: ExtensionRegistry::with_defaults(),
            resources: Box::new(FsResourceLoader::new()),
            mapper_parser: Box::new(NoopMapperParser),
            sql_fragments: SqlFragmentRegistry::new(),
        }
    }

    /// Select the environment id to bind, overriding the document's
    /// `default=` attribute.
    pub fn with_environment(mut self, id: impl Into<String>) -> Self {
        self.environment = Some(id.into());
        self
    }

    /// Externally-supplied variables. These win over document-declared
    /// properties during resolution.
    pub fn with_variables(mut self, vars: Properties) -> Self {
        if let Some(configuration) = self.configuration.as_mut() {
            configuration.set_variables(vars.clone());
        }
        self.vars = vars;
        self
    }

    pub fn with_resource_loader(mut self, loader: Box<dyn ResourceLoader>) -> Self {
        self.resources = loader;
        self
    }

    pub fn with_mapper_parser(mut self, parser: Box<dyn MapperFileParser>) -> Self {
        self.mapper_parser = parser;
        self
    }

    /// Extension constructors consulted when sections name types.
    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    /// Add a canonical type name to the catalog that namespace (package)
    /// sections scan.
    pub fn register_type(&mut self, canonical: impl Into<String>) {
        if let Some(configuration) = self.configuration.as_mut() {
            configuration.type_aliases_mut().register_type(canonical);
        }
    }

    /// Run the full section pipeline and hand over the configuration.
    ///
    /// May complete at most once per builder; any further call fails with a
    /// re-use error without mutating anything.
    pub fn parse(&mut self) -> Result<Configuration, BuildError> {
        if self.parsed {
            return Err(BuildError::AlreadyParsed);
        }
        self.parsed = true;

        let root = std::mem::replace(&mut self.root, Node::element("configuration"));
        let mut configuration = self.configuration.take().ok_or(BuildError::AlreadyParsed)?;

        match self.parse_configuration(&root, &mut configuration) {
            Ok(()) => Ok(configuration),
            Err(cause) => Err(BuildError::Parse {
                cause: Box::new(cause),
            }),
        }
    }

    fn parse_configuration(
        &mut self,
        root: &Node,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        if root.name() != "configuration" {
            return Err(BuildError::Schema(format!(
                "expected a 'configuration' root element, got '{}'",
                root.name()
            )));
        }

        // Properties first: every later attribute read substitutes them.
        self.properties_element(root.first_child("properties"), configuration)?;
        let settings = self.settings_as_properties(root.first_child("settings"))?;
        self.load_custom_vfs(&settings, configuration)?;
        self.load_custom_log(&settings, configuration)?;
        self.type_aliases_element(root.first_child("typeAliases"), configuration)?;
        self.plugin_element(root.first_child("plugins"), configuration)?;
        self.object_factory_element(root.first_child("objectFactory"), configuration)?;
        self.object_wrapper_factory_element(root.first_child("objectWrapperFactory"), configuration)?;
        self.reflector_factory_element(root.first_child("reflectorFactory"), configuration)?;
        self.settings_element(&settings, configuration)?;
        // Environments come after the factory overrides above.
        self.environments_element(root.first_child("environments"), configuration)?;
        self.database_id_provider_element(root.first_child("databaseIdProvider"), configuration)?;
        self.type_handler_element(root.first_child("typeHandlers"), configuration)?;
        // Mappers last: mapping files reference everything established above.
        self.mapper_element(root.first_child("mappers"), configuration)?;

        configuration.set_sql_fragments(std::mem::take(&mut self.sql_fragments));
        Ok(())
    }

    fn properties_element(
        &mut self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };

        let mut defaults = node.children_as_properties(&self.vars);
        let resource = node.string_attribute("resource", &self.vars);
        let url = node.string_attribute("url", &self.vars);
        if resource.is_some() && url.is_some() {
            return Err(BuildError::Schema(
                "the properties element cannot specify both a url and a resource based \
                 property file reference. Please specify one or the other"
                    .to_string(),
            ));
        }
        if let Some(resource) = resource {
            defaults.extend(self.resources.resource_properties(&resource)?);
        } else if let Some(url) = url {
            defaults.extend(self.resources.url_properties(&url)?);
        }
        // Externally-supplied variables win over document-declared ones.
        defaults.extend(configuration.variables().clone());

        debug!(variables = defaults.len(), "resolved property variables");
        self.vars = defaults.clone();
        configuration.set_variables(defaults);
        Ok(())
    }

    /// Flatten the settings section and validate every key against the
    /// configuration's known attribute set before anything is applied.
    fn settings_as_properties(&self, node: Option<&Node>) -> Result<Properties, BuildError> {
        let Some(node) = node else {
            return Ok(Properties::new());
        };
        let props = node.children_as_properties(&self.vars);
        for key in props.keys() {
            if !is_known_setting(key) {
                return Err(BuildError::UnknownSetting(key.clone()));
            }
        }
        Ok(props)
    }

    fn load_custom_vfs(
        &self,
        settings: &Properties,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(value) = settings.get("vfsImpl") else {
            return Ok(());
        };
        for name in value.split(',').filter(|n| !n.is_empty()) {
            let vfs = create_extension(
                &self.extensions.vfs_impls,
                configuration,
                name,
                "vfsImpl setting",
            )?;
            configuration.set_vfs_impl(vfs);
        }
        Ok(())
    }

    fn load_custom_log(
        &self,
        settings: &Properties,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(name) = settings.get("logImpl") else {
            return Ok(());
        };
        let log = create_extension(
            &self.extensions.log_impls,
            configuration,
            name,
            "logImpl setting",
        )?;
        configuration.set_log_impl(log);
        Ok(())
    }

    fn type_aliases_element(
        &self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        for child in node.children() {
            if child.name() == "package" {
                let Some(namespace) = child.string_attribute("name", &self.vars) else {
                    return Err(BuildError::Schema(
                        "a typeAliases package element requires a name attribute".to_string(),
                    ));
                };
                configuration
                    .type_aliases_mut()
                    .register_namespace(&namespace);
            } else {
                let alias = child.string_attribute("alias", &self.vars);
                let Some(type_name) = child.string_attribute("type", &self.vars) else {
                    return Err(BuildError::Schema(
                        "a typeAlias element requires a type attribute".to_string(),
                    ));
                };
                match alias {
                    Some(alias) => configuration
                        .type_aliases_mut()
                        .register_alias(&alias, type_name)?,
                    None => configuration
                        .type_aliases_mut()
                        .register_alias_for(&type_name)?,
                }
            }
        }
        Ok(())
    }

    fn plugin_element(
        &self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        for child in node.children() {
            let Some(name) = child.string_attribute("interceptor", &self.vars) else {
                return Err(BuildError::Schema(
                    "a plugin element requires an interceptor attribute".to_string(),
                ));
            };
            let props = child.children_as_properties(&self.vars);
            let mut interceptor =
                create_extension(&self.extensions.interceptors, configuration, &name, "plugins")?;
            interceptor
                .configure(&props)
                .map_err(|e| resolution("plugins", &name, e))?;
            debug!(interceptor = %name, "registered interceptor");
            configuration.add_interceptor(interceptor);
        }
        Ok(())
    }

    fn object_factory_element(
        &self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        let Some(name) = node.string_attribute("type", &self.vars) else {
            return Ok(());
        };
        let props = node.children_as_properties(&self.vars);
        let mut factory = create_extension(
            &self.extensions.object_factories,
            configuration,
            &name,
            "objectFactory",
        )?;
        factory
            .configure(&props)
            .map_err(|e| resolution("objectFactory", &name, e))?;
        configuration.set_object_factory(factory);
        Ok(())
    }

    fn object_wrapper_factory_element(
        &self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        let Some(name) = node.string_attribute("type", &self.vars) else {
            return Ok(());
        };
        let factory = create_extension(
            &self.extensions.object_wrapper_factories,
            configuration,
            &name,
            "objectWrapperFactory",
        )?;
        configuration.set_object_wrapper_factory(factory);
        Ok(())
    }

    fn reflector_factory_element(
        &self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        let Some(name) = node.string_attribute("type", &self.vars) else {
            return Ok(());
        };
        let factory = create_extension(
            &self.extensions.reflector_factories,
            configuration,
            &name,
            "reflectorFactory",
        )?;
        configuration.set_reflector_factory(factory);
        Ok(())
    }

    fn settings_element(
        &self,
        settings: &Properties,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        configuration.settings_mut().apply(settings)?;
        if let Some(name) = settings.get("proxyFactory") {
            let factory = create_extension(
                &self.extensions.proxy_factories,
                configuration,
                name,
                "proxyFactory setting",
            )?;
            configuration.set_proxy_factory(factory);
        }
        Ok(())
    }

    fn environments_element(
        &mut self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        if self.environment.is_none() {
            self.environment = node.string_attribute("default", &self.vars);
        }
        for child in node.children() {
            let Some(id) = child.string_attribute("id", &self.vars) else {
                return Err(BuildError::Environment(
                    "environment requires an id attribute".to_string(),
                ));
            };
            if !self.is_specified_environment(&id)? {
                continue;
            }
            let tx_factory =
                self.transaction_manager_element(child.first_child("transactionManager"), configuration)?;
            let ds_factory =
                self.data_source_element(child.first_child("dataSource"), configuration)?;
            let data_source = ds_factory
                .data_source()
                .map_err(|e| BuildError::Environment(e.to_string()))?;
            debug!(environment = %id, "bound active environment");
            configuration.set_environment(Environment::new(id, tx_factory, data_source));
        }
        Ok(())
    }

    fn is_specified_environment(&self, id: &str) -> Result<bool, BuildError> {
        match &self.environment {
            None => Err(BuildError::Environment(
                "no default environment specified".to_string(),
            )),
            Some(selected) => Ok(selected == id),
        }
    }

    fn transaction_manager_element(
        &self,
        node: Option<&Node>,
        configuration: &Configuration,
    ) -> Result<Box<dyn crate::extensions::TransactionFactory>, BuildError> {
        let Some(node) = node else {
            return Err(BuildError::Environment(
                "environment declaration requires a transaction factory".to_string(),
            ));
        };
        let Some(name) = node.string_attribute("type", &self.vars) else {
            return Err(BuildError::Schema(
                "a transactionManager element requires a type attribute".to_string(),
            ));
        };
        let props = node.children_as_properties(&self.vars);
        let mut factory = create_extension(
            &self.extensions.transaction_factories,
            configuration,
            &name,
            "transactionManager",
        )?;
        factory
            .configure(&props)
            .map_err(|e| resolution("transactionManager", &name, e))?;
        Ok(factory)
    }

    fn data_source_element(
        &self,
        node: Option<&Node>,
        configuration: &Configuration,
    ) -> Result<Box<dyn crate::extensions::DataSourceFactory>, BuildError> {
        let Some(node) = node else {
            return Err(BuildError::Environment(
                "environment declaration requires a data source factory".to_string(),
            ));
        };
        let Some(name) = node.string_attribute("type", &self.vars) else {
            return Err(BuildError::Schema(
                "a dataSource element requires a type attribute".to_string(),
            ));
        };
        let props = node.children_as_properties(&self.vars);
        let mut factory = create_extension(
            &self.extensions.data_source_factories,
            configuration,
            &name,
            "dataSource",
        )?;
        factory
            .configure(&props)
            .map_err(|e| resolution("dataSource", &name, e))?;
        Ok(factory)
    }

    fn database_id_provider_element(
        &self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        let Some(mut name) = node.string_attribute("type", &self.vars) else {
            return Ok(());
        };
        // Legacy alias kept for backward compatibility.
        if name == "VENDOR" {
            name = "DB_VENDOR".to_string();
        }
        let props = node.children_as_properties(&self.vars);
        let mut provider = create_extension(
            &self.extensions.database_id_providers,
            configuration,
            &name,
            "databaseIdProvider",
        )?;
        provider
            .configure(&props)
            .map_err(|e| resolution("databaseIdProvider", &name, e))?;

        // The provider is only queried once an environment is bound; without
        // one the identifier stays unset.
        if let Some(environment) = configuration.environment() {
            let database_id = provider.database_id(environment.data_source())?;
            debug!(database_id = ?database_id, "derived database id");
            configuration.set_database_id(database_id);
        }
        Ok(())
    }

    fn type_handler_element(
        &self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        for child in node.children() {
            if child.name() == "package" {
                let Some(namespace) = child.string_attribute("name", &self.vars) else {
                    return Err(BuildError::Schema(
                        "a typeHandlers package element requires a name attribute".to_string(),
                    ));
                };
                self.register_handler_namespace(&namespace, configuration)?;
            } else {
                let value_type = child
                    .string_attribute("valueType", &self.vars)
                    .map(|v| configuration.type_aliases().resolve(&v));
                let wire_type = child
                    .string_attribute("wireType", &self.vars)
                    .map(|w| {
                        w.parse().map_err(|reason: String| {
                            BuildError::Schema(format!("invalid wireType '{}': {}", w, reason))
                        })
                    })
                    .transpose()?;
                let Some(name) = child.string_attribute("handler", &self.vars) else {
                    return Err(BuildError::Schema(
                        "a typeHandler element requires a handler attribute".to_string(),
                    ));
                };
                let handler = create_extension(
                    &self.extensions.type_handlers,
                    configuration,
                    &name,
                    "typeHandlers",
                )?;
                configuration
                    .type_handlers_mut()
                    .register(value_type.as_deref(), wire_type, handler)?;
            }
        }
        Ok(())
    }

    fn register_handler_namespace(
        &self,
        namespace: &str,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let names: Vec<String> = self
            .extensions
            .type_handlers
            .names_under(namespace)
            .into_iter()
            .map(str::to_string)
            .collect();
        debug!(namespace, handlers = names.len(), "registering type handlers from namespace");
        for name in names {
            let handler = create_extension(
                &self.extensions.type_handlers,
                configuration,
                &name,
                "typeHandlers",
            )?;
            configuration
                .type_handlers_mut()
                .register(None, None, handler)?;
        }
        Ok(())
    }

    fn mapper_element(
        &mut self,
        node: Option<&Node>,
        configuration: &mut Configuration,
    ) -> Result<(), BuildError> {
        let Some(node) = node else { return Ok(()) };
        for child in node.children() {
            if child.name() == "package" {
                let Some(namespace) = child.string_attribute("name", &self.vars) else {
                    return Err(BuildError::Schema(
                        "a mappers package element requires a name attribute".to_string(),
                    ));
                };
                let types: Vec<String> = configuration
                    .type_aliases()
                    .catalog_under(&namespace)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                for type_name in types {
                    configuration.mappers_mut().add_mapper(type_name)?;
                }
                continue;
            }

            let resource = child.string_attribute("resource", &self.vars);
            let url = child.string_attribute("url", &self.vars);
            let class = child.string_attribute("class", &self.vars);
            match (resource, url, class) {
                (Some(resource), None, None) => {
                    let content = self.resources.resource_bytes(&resource)?;
                    self.mapper_parser.parse(
                        &content,
                        &resource,
                        configuration,
                        &mut self.sql_fragments,
                    )?;
                    configuration.mappers_mut().add_loaded_source(resource);
                }
                (None, Some(url), None) => {
                    let content = self.resources.url_bytes(&url)?;
                    self.mapper_parser.parse(
                        &content,
                        &url,
                        configuration,
                        &mut self.sql_fragments,
                    )?;
                    configuration.mappers_mut().add_loaded_source(url);
                }
                (None, None, Some(class)) => {
                    let canonical = configuration.type_aliases().resolve(&class);
                    configuration.mappers_mut().add_mapper(canonical)?;
                }
                _ => {
                    return Err(BuildError::Schema(
                        "a mapper element may only specify a url, resource or class, but not \
                         more than one"
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Resolve a declared type name through the alias registry and construct it.
/// A missing constructor surfaces as a resolution error naming the section
/// and the offending type name.
fn create_extension<T: ?Sized>(
    constructors: &Constructors<T>,
    configuration: &Configuration,
    name: &str,
    section: &str,
) -> Result<Box<T>, BuildError> {
    let canonical = configuration.type_aliases().resolve(name);
    constructors
        .create(&canonical)
        .ok_or_else(|| BuildError::Resolution {
            section: section.to_string(),
            type_name: name.to_string(),
            reason: format!("no constructor registered for '{}'", canonical),
        })
}

fn resolution(section: &str, type_name: &str, cause: BuildError) -> BuildError {
    BuildError::Resolution {
        section: section.to_string(),
        type_name: type_name.to_string(),
        reason: cause.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_single_use() {
        let root = Node::element("configuration");
        let mut builder = ConfigurationBuilder::new(root);
        assert!(builder.parse().is_ok());

        let err = builder.parse().unwrap_err();
        assert!(matches!(err, BuildError::AlreadyParsed));
        // And every call after that keeps failing the same way.
        assert!(matches!(builder.parse(), Err(BuildError::AlreadyParsed)));
    }

    #[test]
    fn test_wrong_root_element_fails() {
        let mut builder = ConfigurationBuilder::new(Node::element("settings"));
        let err = builder.parse().unwrap_err();
        assert!(matches!(err.root_cause(), BuildError::Schema(_)));
    }

    #[test]
    fn test_section_errors_are_wrapped_once() {
        let root = Node::element("configuration").child(
            Node::element("settings").child(Node::property("noSuchSetting", "1")),
        );
        let err = ConfigurationBuilder::new(root).parse().unwrap_err();
        match &err {
            BuildError::Parse { cause } => {
                assert!(matches!(cause.as_ref(), BuildError::UnknownSetting(_)));
            }
            other => panic!("expected wrapped error, got {:?}", other),
        }
    }
}
