//! SQL fragment registry: reusable statement fragments shared across mapping
//! files.

use crate::document::Node;
use crate::error::BuildError;
use std::collections::BTreeMap;

/// Fragment id to fragment node. Ids are global across the document set so
/// cross-file `<include>` references resolve consistently.
#[derive(Debug, Default)]
pub struct SqlFragmentRegistry {
    fragments: BTreeMap<String, Node>,
}

impl SqlFragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment. Duplicate ids are an error since a later mapping
    /// file would silently shadow an earlier one otherwise.
    pub fn add(&mut self, id: impl Into<String>, fragment: Node) -> Result<(), BuildError> {
        let id = id.into();
        if self.fragments.contains_key(&id) {
            return Err(BuildError::Schema(format!(
                "sql fragment '{}' is already registered",
                id
            )));
        }
        self.fragments.insert(id, fragment);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.fragments.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fragments.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut registry = SqlFragmentRegistry::new();
        registry
            .add("userColumns", Node::element("sql").text("id, name"))
            .unwrap();
        assert!(registry.contains("userColumns"));
        assert_eq!(registry.get("userColumns").unwrap().body(), Some("id, name"));
    }

    #[test]
    fn test_duplicate_fragment_id_fails() {
        let mut registry = SqlFragmentRegistry::new();
        registry.add("cols", Node::element("sql")).unwrap();
        let err = registry.add("cols", Node::element("sql")).unwrap_err();
        assert!(matches!(err, BuildError::Schema(_)));
    }
}
