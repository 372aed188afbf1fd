//! Extension points: document-declared, dynamically-resolved implementations
//! configured via key/value properties.
//!
//! Every extension kind is a capability trait extending [`Extension`], and is
//! constructed by name through [`registry::ExtensionRegistry`]. The
//! `configure` step is applied exactly once at instantiation time; afterwards
//! instances are opaque to the builder and owned by the configuration.

use crate::document::Properties;
use crate::error::BuildError;

mod builtin;
mod registry;

pub use builtin::{
    DefaultObjectFactory, DefaultObjectWrapperFactory, DefaultProxyFactory,
    DefaultReflectorFactory, GenericDataSource, LocalTransactionFactory,
    ManagedTransactionFactory, PooledDataSourceFactory, UnpooledDataSourceFactory,
    VendorDatabaseIdProvider,
};
pub use registry::{Constructors, ExtensionRegistry};

/// Base contract shared by all extension points.
pub trait Extension {
    /// The canonical type name this instance was registered under, used for
    /// diagnostics and chain inspection.
    fn type_name(&self) -> &str;

    /// Apply the section's declared key/value properties. Called exactly once
    /// at construction time; absent properties arrive as an empty map.
    fn configure(&mut self, props: &Properties) -> Result<(), BuildError> {
        let _ = props;
        Ok(())
    }
}

/// Statement-pipeline interceptor. The chain is ordered; registration order
/// determines wrapping order in the consuming runtime.
pub trait Interceptor: Extension {}

/// Creates result objects for mapped statements.
pub trait ObjectFactory: Extension {}

/// Wraps result objects for property access.
pub trait ObjectWrapperFactory: Extension {}

/// Builds the per-type shape indexes used for attribute lookup.
pub trait ReflectorFactory: Extension {}

/// Builds lazy-loading proxies around result objects.
pub trait ProxyFactory: Extension {}

/// Produces the transaction strategy for an environment.
pub trait TransactionFactory: Extension {}

/// A realized data source bound into an environment. Connectivity is out of
/// scope; the only thing the bootstrap ever asks of a data source is which
/// database product it fronts.
pub trait DataSource: Extension {
    fn product_name(&self) -> Result<String, BuildError>;
}

/// Produces the data source for an environment.
pub trait DataSourceFactory: Extension {
    fn data_source(&self) -> Result<Box<dyn DataSource>, BuildError>;
}

/// Derives the vendor tag distinguishing database-specific statement
/// variants.
pub trait DatabaseIdProvider: Extension {
    fn database_id(&self, data_source: &dyn DataSource) -> Result<Option<String>, BuildError>;
}

/// Converts between a value type and its wire representation.
pub trait TypeHandler: Extension {
    /// The value type this handler covers, when the handler is
    /// self-describing. `None` means the type must be named at registration.
    fn value_type(&self) -> Option<&str> {
        None
    }
}

/// Virtual filesystem used for resource discovery.
pub trait VfsImpl: Extension {}

/// Engine-internal logging backend.
pub trait LogImpl: Extension {}
