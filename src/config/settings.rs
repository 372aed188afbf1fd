//! The typed settings block of a configuration and its known-key table.
//!
//! Document keys are camelCase; each setting carries a documented default.
//! The key table is the schema gate: a settings section is validated in full
//! against it before any value is applied.

use crate::document::Properties;
use crate::error::BuildError;
use crate::registry::WireType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Column auto-mapping behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoMappingBehavior {
    None,
    Partial,
    Full,
}

impl FromStr for AutoMappingBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Self::None),
            "PARTIAL" => Ok(Self::Partial),
            "FULL" => Ok(Self::Full),
            other => Err(format!("expected NONE, PARTIAL or FULL, got '{}'", other)),
        }
    }
}

/// What to do when auto-mapping meets an unknown column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownColumnBehavior {
    None,
    Warning,
    Failing,
}

impl FromStr for UnknownColumnBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Self::None),
            "WARNING" => Ok(Self::Warning),
            "FAILING" => Ok(Self::Failing),
            other => Err(format!("expected NONE, WARNING or FAILING, got '{}'", other)),
        }
    }
}

/// Statement executor flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutorType {
    Simple,
    Reuse,
    Batch,
}

impl FromStr for ExecutorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIMPLE" => Ok(Self::Simple),
            "REUSE" => Ok(Self::Reuse),
            "BATCH" => Ok(Self::Batch),
            other => Err(format!("expected SIMPLE, REUSE or BATCH, got '{}'", other)),
        }
    }
}

/// Result set cursor capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultSetType {
    ForwardOnly,
    ScrollInsensitive,
    ScrollSensitive,
    Default,
}

impl FromStr for ResultSetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORWARD_ONLY" => Ok(Self::ForwardOnly),
            "SCROLL_INSENSITIVE" => Ok(Self::ScrollInsensitive),
            "SCROLL_SENSITIVE" => Ok(Self::ScrollSensitive),
            "DEFAULT" => Ok(Self::Default),
            other => Err(format!(
                "expected FORWARD_ONLY, SCROLL_INSENSITIVE, SCROLL_SENSITIVE or DEFAULT, got '{}'",
                other
            )),
        }
    }
}

/// Scope of the statement-local result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalCacheScope {
    Session,
    Statement,
}

impl FromStr for LocalCacheScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SESSION" => Ok(Self::Session),
            "STATEMENT" => Ok(Self::Statement),
            other => Err(format!("expected SESSION or STATEMENT, got '{}'", other)),
        }
    }
}

/// Every document settings key the configuration understands. Extension-
/// flavored keys (`proxyFactory`, `logImpl`, `vfsImpl`, ...) are listed here
/// too: the schema gate covers the whole section even though their values are
/// resolved through the extension registries rather than parsed in place.
pub const KNOWN_SETTINGS: &[&str] = &[
    "autoMappingBehavior",
    "autoMappingUnknownColumnBehavior",
    "cacheEnabled",
    "proxyFactory",
    "lazyLoadingEnabled",
    "aggressiveLazyLoading",
    "multipleResultSetsEnabled",
    "useColumnLabel",
    "useGeneratedKeys",
    "defaultExecutorType",
    "defaultStatementTimeout",
    "defaultFetchSize",
    "defaultResultSetType",
    "mapUnderscoreToCamelCase",
    "safeRowBoundsEnabled",
    "localCacheScope",
    "wireTypeForNull",
    "lazyLoadTriggerMethods",
    "safeResultHandlerEnabled",
    "defaultScriptingLanguage",
    "defaultEnumTypeHandler",
    "callSettersOnNulls",
    "useActualParamName",
    "returnInstanceForEmptyRow",
    "logPrefix",
    "logImpl",
    "vfsImpl",
    "configurationFactory",
    "shrinkWhitespacesInSql",
];

/// Whether `key` is a settable attribute of the configuration.
pub fn is_known_setting(key: &str) -> bool {
    KNOWN_SETTINGS.contains(&key)
}

/// Behavioral settings of a configuration, with their documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub auto_mapping_behavior: AutoMappingBehavior,
    pub auto_mapping_unknown_column_behavior: UnknownColumnBehavior,
    pub cache_enabled: bool,
    pub lazy_loading_enabled: bool,
    pub aggressive_lazy_loading: bool,
    pub multiple_result_sets_enabled: bool,
    pub use_column_label: bool,
    pub use_generated_keys: bool,
    pub default_executor_type: ExecutorType,
    pub default_statement_timeout: Option<u32>,
    pub default_fetch_size: Option<u32>,
    pub default_result_set_type: Option<ResultSetType>,
    pub map_underscore_to_camel_case: bool,
    pub safe_row_bounds_enabled: bool,
    pub local_cache_scope: LocalCacheScope,
    pub wire_type_for_null: WireType,
    pub lazy_load_trigger_methods: BTreeSet<String>,
    pub safe_result_handler_enabled: bool,
    pub default_scripting_language: Option<String>,
    pub default_enum_type_handler: Option<String>,
    pub call_setters_on_nulls: bool,
    pub use_actual_param_name: bool,
    pub return_instance_for_empty_row: bool,
    pub log_prefix: Option<String>,
    pub configuration_factory: Option<String>,
    pub shrink_whitespaces_in_sql: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_mapping_behavior: AutoMappingBehavior::Partial,
            auto_mapping_unknown_column_behavior: UnknownColumnBehavior::None,
            cache_enabled: true,
            lazy_loading_enabled: false,
            aggressive_lazy_loading: false,
            multiple_result_sets_enabled: true,
            use_column_label: true,
            use_generated_keys: false,
            default_executor_type: ExecutorType::Simple,
            default_statement_timeout: None,
            default_fetch_size: None,
            default_result_set_type: None,
            map_underscore_to_camel_case: false,
            safe_row_bounds_enabled: false,
            local_cache_scope: LocalCacheScope::Session,
            wire_type_for_null: WireType::Other,
            lazy_load_trigger_methods: ["equals", "clone", "hashCode", "toString"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            safe_result_handler_enabled: true,
            default_scripting_language: None,
            default_enum_type_handler: None,
            call_setters_on_nulls: false,
            use_actual_param_name: true,
            return_instance_for_empty_row: false,
            log_prefix: None,
            configuration_factory: None,
            shrink_whitespaces_in_sql: false,
        }
    }
}

impl Settings {
    /// Apply the plain-valued settings from a validated property map.
    /// Extension-flavored keys are applied by the builder, which owns the
    /// extension registries.
    pub fn apply(&mut self, props: &Properties) -> Result<(), BuildError> {
        self.auto_mapping_behavior = enum_value(props, "autoMappingBehavior", AutoMappingBehavior::Partial)?;
        self.auto_mapping_unknown_column_behavior = enum_value(
            props,
            "autoMappingUnknownColumnBehavior",
            UnknownColumnBehavior::None,
        )?;
        self.cache_enabled = bool_value(props, "cacheEnabled", true)?;
        self.lazy_loading_enabled = bool_value(props, "lazyLoadingEnabled", false)?;
        self.aggressive_lazy_loading = bool_value(props, "aggressiveLazyLoading", false)?;
        self.multiple_result_sets_enabled = bool_value(props, "multipleResultSetsEnabled", true)?;
        self.use_column_label = bool_value(props, "useColumnLabel", true)?;
        self.use_generated_keys = bool_value(props, "useGeneratedKeys", false)?;
        self.default_executor_type = enum_value(props, "defaultExecutorType", ExecutorType::Simple)?;
        self.default_statement_timeout = opt_u32_value(props, "defaultStatementTimeout")?;
        self.default_fetch_size = opt_u32_value(props, "defaultFetchSize")?;
        self.default_result_set_type = opt_enum_value(props, "defaultResultSetType")?;
        self.map_underscore_to_camel_case = bool_value(props, "mapUnderscoreToCamelCase", false)?;
        self.safe_row_bounds_enabled = bool_value(props, "safeRowBoundsEnabled", false)?;
        self.local_cache_scope = enum_value(props, "localCacheScope", LocalCacheScope::Session)?;
        self.wire_type_for_null = enum_value(props, "wireTypeForNull", WireType::Other)?;
        if let Some(methods) = props.get("lazyLoadTriggerMethods") {
            self.lazy_load_trigger_methods = methods
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
        }
        self.safe_result_handler_enabled = bool_value(props, "safeResultHandlerEnabled", true)?;
        self.default_scripting_language = props.get("defaultScriptingLanguage").cloned();
        self.default_enum_type_handler = props.get("defaultEnumTypeHandler").cloned();
        self.call_setters_on_nulls = bool_value(props, "callSettersOnNulls", false)?;
        self.use_actual_param_name = bool_value(props, "useActualParamName", true)?;
        self.return_instance_for_empty_row = bool_value(props, "returnInstanceForEmptyRow", false)?;
        self.log_prefix = props.get("logPrefix").cloned();
        self.configuration_factory = props.get("configurationFactory").cloned();
        self.shrink_whitespaces_in_sql = bool_value(props, "shrinkWhitespacesInSql", false)?;
        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> BuildError {
    BuildError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn bool_value(props: &Properties, key: &str, default: bool) -> Result<bool, BuildError> {
    match props.get(key) {
        Some(value) => value
            .parse()
            .map_err(|_| invalid(key, value, "expected true or false")),
        None => Ok(default),
    }
}

fn opt_u32_value(props: &Properties, key: &str) -> Result<Option<u32>, BuildError> {
    match props.get(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, value, "expected a non-negative integer")),
        None => Ok(None),
    }
}

fn enum_value<T>(props: &Properties, key: &str, default: T) -> Result<T, BuildError>
where
    T: FromStr<Err = String>,
{
    match props.get(key) {
        Some(value) => value.parse().map_err(|reason| invalid(key, value, reason)),
        None => Ok(default),
    }
}

fn opt_enum_value<T>(props: &Properties, key: &str) -> Result<Option<T>, BuildError>
where
    T: FromStr<Err = String>,
{
    match props.get(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|reason| invalid(key, value, reason)),
        None => Ok(None),
    }
}

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
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.cache_enabled);
        assert!(!settings.lazy_loading_enabled);
        assert_eq!(settings.auto_mapping_behavior, AutoMappingBehavior::Partial);
        assert_eq!(settings.default_executor_type, ExecutorType::Simple);
        assert_eq!(settings.local_cache_scope, LocalCacheScope::Session);
        assert_eq!(settings.wire_type_for_null, WireType::Other);
        assert_eq!(settings.default_statement_timeout, None);
        assert!(settings.lazy_load_trigger_methods.contains("hashCode"));
    }

    #[test]
    fn test_known_settings_table() {
        assert!(is_known_setting("cacheEnabled"));
        assert!(is_known_setting("vfsImpl"));
        assert!(!is_known_setting("cacheenabled"));
        assert!(!is_known_setting("unknownKey"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        settings
            .apply(&props(&[
                ("cacheEnabled", "false"),
                ("defaultExecutorType", "BATCH"),
                ("defaultStatementTimeout", "25"),
                ("localCacheScope", "STATEMENT"),
                ("lazyLoadTriggerMethods", "equals, toString"),
            ]))
            .unwrap();
        assert!(!settings.cache_enabled);
        assert_eq!(settings.default_executor_type, ExecutorType::Batch);
        assert_eq!(settings.default_statement_timeout, Some(25));
        assert_eq!(settings.local_cache_scope, LocalCacheScope::Statement);
        assert_eq!(settings.lazy_load_trigger_methods.len(), 2);
    }

    #[test]
    fn test_apply_invalid_value_names_key_and_value() {
        let mut settings = Settings::default();
        let err = settings
            .apply(&props(&[("cacheEnabled", "yes")]))
            .unwrap_err();
        match err {
            BuildError::InvalidSetting { key, value, .. } => {
                assert_eq!(key, "cacheEnabled");
                assert_eq!(value, "yes");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_apply_invalid_enum_token() {
        let mut settings = Settings::default();
        let err = settings
            .apply(&props(&[("defaultExecutorType", "simple")]))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidSetting { .. }));
    }
}
