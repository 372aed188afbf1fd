//! Type handler registry: (value type, optional wire type) to handler
//! instance.

use crate::error::BuildError;
use crate::extensions::TypeHandler;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Wire-level column type a handler can be scoped to. `Other` is the
/// catch-all used when a document leaves the wire type open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WireType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    Text,
    Date,
    Time,
    Timestamp,
    Binary,
    Blob,
    Clob,
    Boolean,
    Null,
    Other,
}

impl FromStr for WireType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BIT" => Ok(WireType::Bit),
            "TINYINT" => Ok(WireType::TinyInt),
            "SMALLINT" => Ok(WireType::SmallInt),
            "INTEGER" => Ok(WireType::Integer),
            "BIGINT" => Ok(WireType::BigInt),
            "FLOAT" => Ok(WireType::Float),
            "DOUBLE" => Ok(WireType::Double),
            "NUMERIC" => Ok(WireType::Numeric),
            "DECIMAL" => Ok(WireType::Decimal),
            "CHAR" => Ok(WireType::Char),
            "VARCHAR" => Ok(WireType::Varchar),
            "TEXT" => Ok(WireType::Text),
            "DATE" => Ok(WireType::Date),
            "TIME" => Ok(WireType::Time),
            "TIMESTAMP" => Ok(WireType::Timestamp),
            "BINARY" => Ok(WireType::Binary),
            "BLOB" => Ok(WireType::Blob),
            "CLOB" => Ok(WireType::Clob),
            "BOOLEAN" => Ok(WireType::Boolean),
            "NULL" => Ok(WireType::Null),
            "OTHER" => Ok(WireType::Other),
            other => Err(format!("unknown wire type '{}'", other)),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Registry of type handler instances keyed by value type and optional wire
/// type. A `None` wire type covers all wire types for that value type.
#[derive(Default)]
pub struct TypeHandlerRegistry {
    handlers: BTreeMap<(String, Option<WireType>), Box<dyn TypeHandler>>,
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. When `value_type` is `None` the handler must be
    /// self-describing via [`TypeHandler::value_type`].
    pub fn register(
        &mut self,
        value_type: Option<&str>,
        wire_type: Option<WireType>,
        handler: Box<dyn TypeHandler>,
    ) -> Result<(), BuildError> {
        let value_type = match value_type {
            Some(v) => v.to_string(),
            None => handler
                .value_type()
                .map(str::to_string)
                .ok_or_else(|| {
                    BuildError::Schema(format!(
                        "type handler '{}' declares no value type and none was given",
                        handler.type_name()
                    ))
                })?,
        };
        self.handlers.insert((value_type, wire_type), handler);
        Ok(())
    }

    pub fn has_handler(&self, value_type: &str, wire_type: Option<WireType>) -> bool {
        self.handlers
            .contains_key(&(value_type.to_string(), wire_type))
    }

    /// Look up a handler, falling back to the all-wire-types binding.
    pub fn handler(
        &self,
        value_type: &str,
        wire_type: Option<WireType>,
    ) -> Option<&dyn TypeHandler> {
        self.handlers
            .get(&(value_type.to_string(), wire_type))
            .or_else(|| self.handlers.get(&(value_type.to_string(), None)))
            .map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::Extension;

    struct StubHandler {
        declared: Option<&'static str>,
    }

    impl Extension for StubHandler {
        fn type_name(&self) -> &str {
            "tests::handlers::StubHandler"
        }
    }

    impl TypeHandler for StubHandler {
        fn value_type(&self) -> Option<&str> {
            self.declared
        }
    }

    #[test]
    fn test_register_with_explicit_value_and_wire_type() {
        let mut registry = TypeHandlerRegistry::new();
        registry
            .register(
                Some("app::model::Money"),
                Some(WireType::Numeric),
                Box::new(StubHandler { declared: None }),
            )
            .unwrap();
        assert!(registry.has_handler("app::model::Money", Some(WireType::Numeric)));
        assert!(!registry.has_handler("app::model::Money", Some(WireType::Varchar)));
    }

    #[test]
    fn test_all_wire_types_fallback() {
        let mut registry = TypeHandlerRegistry::new();
        registry
            .register(Some("String"), None, Box::new(StubHandler { declared: None }))
            .unwrap();
        assert!(registry.handler("String", Some(WireType::Varchar)).is_some());
        assert!(registry.handler("String", None).is_some());
    }

    #[test]
    fn test_self_describing_handler() {
        let mut registry = TypeHandlerRegistry::new();
        registry
            .register(
                None,
                None,
                Box::new(StubHandler {
                    declared: Some("app::model::Status"),
                }),
            )
            .unwrap();
        assert!(registry.has_handler("app::model::Status", None));
    }

    #[test]
    fn test_undeclared_value_type_is_schema_error() {
        let mut registry = TypeHandlerRegistry::new();
        let err = registry
            .register(None, None, Box::new(StubHandler { declared: None }))
            .unwrap_err();
        assert!(matches!(err, BuildError::Schema(_)));
    }

    #[test]
    fn test_wire_type_parsing() {
        assert_eq!("VARCHAR".parse::<WireType>().unwrap(), WireType::Varchar);
        assert_eq!("OTHER".parse::<WireType>().unwrap(), WireType::Other);
        assert!("varchar".parse::<WireType>().is_err());
    }
}
