//! Built-in extension implementations registered under canonical names.

use super::{
    DataSource, DataSourceFactory, DatabaseIdProvider, Extension, ObjectFactory,
    ObjectWrapperFactory, ProxyFactory, ReflectorFactory, TransactionFactory,
};
use crate::document::Properties;
use crate::error::BuildError;
use tracing::warn;

/// Transaction strategy that commits and rolls back on the connection itself.
pub struct LocalTransactionFactory {
    props: Properties,
}

impl LocalTransactionFactory {
    pub fn new() -> Self {
        Self {
            props: Properties::new(),
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.props
    }
}

impl Default for LocalTransactionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for LocalTransactionFactory {
    fn type_name(&self) -> &str {
        "LOCAL"
    }

    fn configure(&mut self, props: &Properties) -> Result<(), BuildError> {
        self.props = props.clone();
        Ok(())
    }
}

impl TransactionFactory for LocalTransactionFactory {}

/// Transaction strategy that defers lifecycle to an external container.
pub struct ManagedTransactionFactory {
    close_connection: bool,
}

impl ManagedTransactionFactory {
    pub fn new() -> Self {
        Self {
            close_connection: true,
        }
    }

    pub fn close_connection(&self) -> bool {
        self.close_connection
    }
}

impl Default for ManagedTransactionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for ManagedTransactionFactory {
    fn type_name(&self) -> &str {
        "MANAGED"
    }

    fn configure(&mut self, props: &Properties) -> Result<(), BuildError> {
        if let Some(value) = props.get("closeConnection") {
            self.close_connection = value.parse().map_err(|_| BuildError::Schema(format!(
                "closeConnection must be a boolean, got '{}'",
                value
            )))?;
        }
        Ok(())
    }
}

impl TransactionFactory for ManagedTransactionFactory {}

/// Data source realized from declared connection properties.
///
/// Connectivity is out of scope; the product name is taken from the declared
/// `product` property, falling back to the scheme of the declared `url`.
pub struct GenericDataSource {
    props: Properties,
}

impl GenericDataSource {
    pub fn new(props: Properties) -> Self {
        Self { props }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }
}

impl Extension for GenericDataSource {
    fn type_name(&self) -> &str {
        "GENERIC"
    }
}

impl DataSource for GenericDataSource {
    fn product_name(&self) -> Result<String, BuildError> {
        if let Some(product) = self.props.get("product") {
            return Ok(product.clone());
        }
        if let Some(url) = self.props.get("url") {
            if let Some(scheme) = url.split(':').next().filter(|s| !s.is_empty()) {
                return Ok(scheme.to_string());
            }
        }
        Err(BuildError::Environment(
            "data source declares neither a product nor a url".to_string(),
        ))
    }
}

/// Factory for unpooled [`GenericDataSource`] instances.
pub struct UnpooledDataSourceFactory {
    props: Properties,
}

impl UnpooledDataSourceFactory {
    pub fn new() -> Self {
        Self {
            props: Properties::new(),
        }
    }
}

impl Default for UnpooledDataSourceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for UnpooledDataSourceFactory {
    fn type_name(&self) -> &str {
        "UNPOOLED"
    }

    fn configure(&mut self, props: &Properties) -> Result<(), BuildError> {
        self.props = props.clone();
        Ok(())
    }
}

impl DataSourceFactory for UnpooledDataSourceFactory {
    fn data_source(&self) -> Result<Box<dyn DataSource>, BuildError> {
        Ok(Box::new(GenericDataSource::new(self.props.clone())))
    }
}

/// Factory for pooled [`GenericDataSource`] instances. Pooling itself lives in
/// the execution layer; here the pool settings are only carried along.
pub struct PooledDataSourceFactory {
    props: Properties,
}

impl PooledDataSourceFactory {
    pub fn new() -> Self {
        Self {
            props: Properties::new(),
        }
    }
}

impl Default for PooledDataSourceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for PooledDataSourceFactory {
    fn type_name(&self) -> &str {
        "POOLED"
    }

    fn configure(&mut self, props: &Properties) -> Result<(), BuildError> {
        self.props = props.clone();
        Ok(())
    }
}

impl DataSourceFactory for PooledDataSourceFactory {
    fn data_source(&self) -> Result<Box<dyn DataSource>, BuildError> {
        Ok(Box::new(GenericDataSource::new(self.props.clone())))
    }
}

/// Vendor-keyed database id provider.
///
/// With no configured properties the raw product name is the id. Otherwise the
/// first property whose key is contained in the product name supplies the id;
/// no match yields no id.
pub struct VendorDatabaseIdProvider {
    vendors: Properties,
}

impl VendorDatabaseIdProvider {
    pub fn new() -> Self {
        Self {
            vendors: Properties::new(),
        }
    }
}

impl Default for VendorDatabaseIdProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for VendorDatabaseIdProvider {
    fn type_name(&self) -> &str {
        "DB_VENDOR"
    }

    fn configure(&mut self, props: &Properties) -> Result<(), BuildError> {
        self.vendors = props.clone();
        Ok(())
    }
}

impl DatabaseIdProvider for VendorDatabaseIdProvider {
    fn database_id(&self, data_source: &dyn DataSource) -> Result<Option<String>, BuildError> {
        let product = data_source.product_name()?;
        if self.vendors.is_empty() {
            return Ok(Some(product));
        }
        for (key, id) in &self.vendors {
            if product.contains(key.as_str()) {
                return Ok(Some(id.clone()));
            }
        }
        warn!(product = %product, "no database id declared for product");
        Ok(None)
    }
}

/// Default result-object factory installed on every configuration.
pub struct DefaultObjectFactory;

impl Extension for DefaultObjectFactory {
    fn type_name(&self) -> &str {
        "DEFAULT"
    }
}

impl ObjectFactory for DefaultObjectFactory {}

/// Default object-wrapper factory installed on every configuration.
pub struct DefaultObjectWrapperFactory;

impl Extension for DefaultObjectWrapperFactory {
    fn type_name(&self) -> &str {
        "DEFAULT"
    }
}

impl ObjectWrapperFactory for DefaultObjectWrapperFactory {}

/// Default reflector factory installed on every configuration.
pub struct DefaultReflectorFactory;

impl Extension for DefaultReflectorFactory {
    fn type_name(&self) -> &str {
        "DEFAULT"
    }
}

impl ReflectorFactory for DefaultReflectorFactory {}

/// Default lazy-loading proxy factory installed on every configuration.
pub struct DefaultProxyFactory;

impl Extension for DefaultProxyFactory {
    fn type_name(&self) -> &str {
        "DEFAULT"
    }
}

impl ProxyFactory for DefaultProxyFactory {}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_generic_data_source_product_from_property() {
        let ds = GenericDataSource::new(props(&[("product", "MySQL")]));
        assert_eq!(ds.product_name().unwrap(), "MySQL");
    }

    #[test]
    fn test_generic_data_source_product_from_url_scheme() {
        let ds = GenericDataSource::new(props(&[("url", "postgres://localhost/app")]));
        assert_eq!(ds.product_name().unwrap(), "postgres");
    }

    #[test]
    fn test_generic_data_source_without_product_fails() {
        let ds = GenericDataSource::new(Properties::new());
        assert!(matches!(
            ds.product_name(),
            Err(BuildError::Environment(_))
        ));
    }

    #[test]
    fn test_vendor_provider_passthrough_without_vendors() {
        let provider = VendorDatabaseIdProvider::new();
        let ds = GenericDataSource::new(props(&[("product", "PostgreSQL 15")]));
        assert_eq!(
            provider.database_id(&ds).unwrap().as_deref(),
            Some("PostgreSQL 15")
        );
    }

    #[test]
    fn test_vendor_provider_maps_product_substring() {
        let mut provider = VendorDatabaseIdProvider::new();
        provider
            .configure(&props(&[("PostgreSQL", "postgres"), ("MySQL", "mysql")]))
            .unwrap();
        let ds = GenericDataSource::new(props(&[("product", "PostgreSQL 15.2")]));
        assert_eq!(provider.database_id(&ds).unwrap().as_deref(), Some("postgres"));
    }

    #[test]
    fn test_vendor_provider_no_match_yields_none() {
        let mut provider = VendorDatabaseIdProvider::new();
        provider.configure(&props(&[("Oracle", "oracle")])).unwrap();
        let ds = GenericDataSource::new(props(&[("product", "SQLite")]));
        assert_eq!(provider.database_id(&ds).unwrap(), None);
    }

    #[test]
    fn test_managed_transaction_factory_close_connection() {
        let mut factory = ManagedTransactionFactory::new();
        assert!(factory.close_connection());
        factory
            .configure(&props(&[("closeConnection", "false")]))
            .unwrap();
        assert!(!factory.close_connection());
        assert!(factory.configure(&props(&[("closeConnection", "nope")])).is_err());
    }

    #[test]
    fn test_factories_produce_data_sources() {
        let mut factory = UnpooledDataSourceFactory::new();
        factory.configure(&props(&[("product", "H2")])).unwrap();
        let ds = factory.data_source().unwrap();
        assert_eq!(ds.product_name().unwrap(), "H2");
    }
}
