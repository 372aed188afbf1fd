//! Mapper registry and the per-mapping-file parser contract.

use crate::config::Configuration;
use crate::error::BuildError;
use crate::registry::SqlFragmentRegistry;
use std::collections::BTreeSet;

/// Registered mapper interfaces and the mapping sources already consumed.
#[derive(Debug, Default)]
pub struct MapperRegistry {
    interfaces: BTreeSet<String>,
    loaded_sources: Vec<String>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper interface by canonical type name. Registering the
    /// same interface twice is an error.
    pub fn add_mapper(&mut self, type_name: impl Into<String>) -> Result<(), BuildError> {
        let type_name = type_name.into();
        if !self.interfaces.insert(type_name.clone()) {
            return Err(BuildError::Schema(format!(
                "mapper '{}' is already registered",
                type_name
            )));
        }
        Ok(())
    }

    pub fn has_mapper(&self, type_name: &str) -> bool {
        self.interfaces.contains(type_name)
    }

    pub fn mappers(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(String::as_str)
    }

    pub fn mapper_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Record that a mapping source (resource path or URL) was parsed.
    pub fn add_loaded_source(&mut self, source: impl Into<String>) {
        self.loaded_sources.push(source.into());
    }

    pub fn is_source_loaded(&self, source: &str) -> bool {
        self.loaded_sources.iter().any(|s| s == source)
    }

    pub fn loaded_sources(&self) -> &[String] {
        &self.loaded_sources
    }
}

/// Per-mapping-file parser: turns one mapping document into statement,
/// result-map, and cache-ref definitions on the shared configuration.
///
/// Statement parsing itself is a separate stage of the engine; the bootstrap
/// only routes each source's bytes here together with the shared registries.
pub trait MapperFileParser {
    fn parse(
        &mut self,
        content: &[u8],
        source: &str,
        configuration: &mut Configuration,
        fragments: &mut SqlFragmentRegistry,
    ) -> Result<(), BuildError>;
}

/// Parser that accepts every source without producing definitions. Used when
/// the statement-parsing stage is wired in later.
#[derive(Debug, Default)]
pub struct NoopMapperParser;

impl MapperFileParser for NoopMapperParser {
    fn parse(
        &mut self,
        _content: &[u8],
        _source: &str,
        _configuration: &mut Configuration,
        _fragments: &mut SqlFragmentRegistry,
    ) -> Result<(), BuildError> {
        Ok(())
    }
}
