//! Shared registries: type aliases, type handlers, mappers, SQL fragments.
//!
//! These are the cross-file lookup tables a configuration carries so that
//! mapping files parsed later resolve names consistently.

mod mapper;
mod sql_fragment;
mod type_alias;
mod type_handler;

pub use mapper::{MapperFileParser, MapperRegistry, NoopMapperParser};
pub use sql_fragment::SqlFragmentRegistry;
pub use type_alias::TypeAliasRegistry;
pub use type_handler::{TypeHandlerRegistry, WireType};

/// Whether `name` lives under the namespace `prefix`, i.e. continues it at a
/// path separator. Both `::` and `.` separators are accepted so documents can
/// use either convention.
pub fn in_namespace(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
        None => false,
    }
}

/// The simple (last-segment) name of a possibly-qualified type name.
pub fn simple_name(name: &str) -> &str {
    let tail = name.rsplit("::").next().unwrap_or(name);
    tail.rsplit('.').next().unwrap_or(tail)
}
