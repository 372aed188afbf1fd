//! Type alias registry: short names bound to fully-qualified type names.

use crate::error::BuildError;
use crate::registry::{in_namespace, simple_name};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone)]
struct AliasEntry {
    type_name: String,
    explicit: bool,
}

/// Maps lower-cased aliases to canonical type names, and carries the catalog
/// of type names the engine knows about, which namespace (package) bulk
/// registration scans.
#[derive(Debug, Default)]
pub struct TypeAliasRegistry {
    aliases: BTreeMap<String, AliasEntry>,
    catalog: BTreeSet<String>,
}

impl TypeAliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canonical type name to the catalog of known types.
    pub fn register_type(&mut self, canonical: impl Into<String>) {
        self.catalog.insert(canonical.into());
    }

    /// Known type names under a namespace prefix.
    pub fn catalog_under(&self, prefix: &str) -> Vec<&str> {
        self.catalog
            .iter()
            .filter(|name| in_namespace(name, prefix))
            .map(String::as_str)
            .collect()
    }

    /// Register an explicit alias. Idempotent for the same type; re-binding an
    /// explicit alias to a different type is an error, while an automatic
    /// (namespace-derived) binding is silently replaced.
    pub fn register_alias(
        &mut self,
        alias: &str,
        type_name: impl Into<String>,
    ) -> Result<(), BuildError> {
        self.register(alias, type_name.into(), true)
    }

    /// Register a type under its lower-cased simple name.
    pub fn register_alias_for(&mut self, type_name: &str) -> Result<(), BuildError> {
        let alias = simple_name(type_name).to_lowercase();
        self.register(&alias, type_name.to_string(), true)
    }

    /// Bulk-register every catalog type under `prefix` by lower-cased simple
    /// name. Automatic registrations never displace an existing alias, so an
    /// explicit alias always wins.
    pub fn register_namespace(&mut self, prefix: &str) {
        let found: Vec<String> = self
            .catalog_under(prefix)
            .into_iter()
            .map(str::to_string)
            .collect();
        debug!(namespace = prefix, types = found.len(), "registering aliases from namespace");
        for type_name in found {
            let alias = simple_name(&type_name).to_lowercase();
            if !self.aliases.contains_key(&alias) {
                self.aliases.insert(
                    alias,
                    AliasEntry {
                        type_name,
                        explicit: false,
                    },
                );
            }
        }
    }

    fn register(
        &mut self,
        alias: &str,
        type_name: String,
        explicit: bool,
    ) -> Result<(), BuildError> {
        let key = alias.to_lowercase();
        if let Some(existing) = self.aliases.get(&key) {
            if existing.type_name == type_name {
                return Ok(());
            }
            if existing.explicit {
                return Err(BuildError::DuplicateAlias {
                    alias: key,
                    existing: existing.type_name.clone(),
                    requested: type_name,
                });
            }
        }
        self.catalog.insert(type_name.clone());
        self.aliases.insert(
            key,
            AliasEntry {
                type_name,
                explicit,
            },
        );
        Ok(())
    }

    /// Resolve a name to its canonical type name. Unaliased names pass
    /// through unchanged.
    pub fn resolve(&self, name: &str) -> String {
        match self.aliases.get(&name.to_lowercase()) {
            Some(entry) => entry.type_name.clone(),
            None => name.to_string(),
        }
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.contains_key(&alias.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_alias_resolution_is_case_insensitive() {
        let mut registry = TypeAliasRegistry::new();
        registry.register_alias("User", "app::model::User").unwrap();
        assert_eq!(registry.resolve("user"), "app::model::User");
        assert_eq!(registry.resolve("USER"), "app::model::User");
        assert_eq!(registry.resolve("unaliased"), "unaliased");
    }

    #[test]
    fn test_duplicate_alias_for_different_type_fails() {
        let mut registry = TypeAliasRegistry::new();
        registry.register_alias("user", "app::model::User").unwrap();
        // Same binding again is fine.
        registry.register_alias("user", "app::model::User").unwrap();
        let err = registry
            .register_alias("user", "app::admin::User")
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateAlias { .. }));
    }

    #[test]
    fn test_namespace_registration_uses_lowercased_simple_names() {
        let mut registry = TypeAliasRegistry::new();
        registry.register_type("app::model::User");
        registry.register_type("app::model::Order");
        registry.register_type("app::other::Ignored");

        registry.register_namespace("app::model");
        assert_eq!(registry.resolve("user"), "app::model::User");
        assert_eq!(registry.resolve("order"), "app::model::Order");
        assert!(!registry.has_alias("ignored"));
    }

    #[test]
    fn test_explicit_wins_over_automatic() {
        let mut registry = TypeAliasRegistry::new();
        registry.register_type("app::model::User");
        registry.register_alias("user", "app::custom::User").unwrap();

        // Automatic registration must not displace the explicit binding.
        registry.register_namespace("app::model");
        assert_eq!(registry.resolve("user"), "app::custom::User");

        // And an explicit binding replaces an automatic one.
        let mut registry = TypeAliasRegistry::new();
        registry.register_type("app::model::User");
        registry.register_namespace("app::model");
        registry.register_alias("user", "app::custom::User").unwrap();
        assert_eq!(registry.resolve("user"), "app::custom::User");
    }

    #[test]
    fn test_register_alias_for_derives_simple_name() {
        let mut registry = TypeAliasRegistry::new();
        registry.register_alias_for("com.example.model.Account").unwrap();
        assert_eq!(registry.resolve("account"), "com.example.model.Account");
    }
}
