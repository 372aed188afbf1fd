//! Document node tree: the navigable form of a declarative configuration
//! document.
//!
//! Markup parsing is an external collaborator; this module only defines the
//! node shape the builder consumes: named elements with ordered attributes,
//! ordered children, and optional text, plus `${var}` substitution applied at
//! every attribute read.

use std::collections::BTreeMap;

/// Flat key/value map used for variables, section properties, and extension
/// configuration.
pub type Properties = BTreeMap<String, String>;

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    text: Option<String>,
}

impl Node {
    /// Create an element with the given tag name.
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Shorthand for a `<property name=... value=.../>` element.
    pub fn property(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::element("property")
            .attr("name", name)
            .attr("value", value)
    }

    /// Append an attribute (builder style).
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append a child element (builder style).
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Set the text body (builder style).
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Raw attribute lookup, no variable substitution.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute lookup with `${var}` substitution against `vars`.
    pub fn string_attribute(&self, name: &str, vars: &Properties) -> Option<String> {
        self.attribute(name).map(|raw| substitute(raw, vars))
    }

    /// Children in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First child with the given tag name.
    pub fn first_child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Flatten `<property name=... value=.../>` children into a key/value map,
    /// substituting variables into both names and values.
    ///
    /// Children missing either attribute are skipped; property sections are
    /// flat by contract, nested children are not descended into.
    pub fn children_as_properties(&self, vars: &Properties) -> Properties {
        let mut props = Properties::new();
        for child in &self.children {
            let name = child.string_attribute("name", vars);
            let value = child.string_attribute("value", vars);
            if let (Some(name), Some(value)) = (name, value) {
                props.insert(name, value);
            }
        }
        props
    }
}

/// Substitute `${name}` tokens from `vars`.
///
/// Unknown variables are left literal, matching the engine's property parser
/// with default values disabled.
pub fn substitute(input: &str, vars: &Properties) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated token, keep the remainder verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_known_variable() {
        let vars = vars(&[("driver", "org.example.Driver")]);
        assert_eq!(substitute("${driver}", &vars), "org.example.Driver");
        assert_eq!(
            substitute("url=${driver}!", &vars),
            "url=org.example.Driver!"
        );
    }

    #[test]
    fn test_substitute_unknown_variable_left_literal() {
        let vars = Properties::new();
        assert_eq!(substitute("${missing}", &vars), "${missing}");
    }

    #[test]
    fn test_substitute_unterminated_token() {
        let vars = vars(&[("a", "1")]);
        assert_eq!(substitute("x${a", &vars), "x${a");
    }

    #[test]
    fn test_string_attribute_substitutes() {
        let vars = vars(&[("env", "dev")]);
        let node = Node::element("environment").attr("id", "${env}");
        assert_eq!(node.string_attribute("id", &vars).as_deref(), Some("dev"));
        assert_eq!(node.attribute("id"), Some("${env}"));
    }

    #[test]
    fn test_children_as_properties() {
        let vars = vars(&[("user", "root")]);
        let node = Node::element("dataSource")
            .child(Node::property("username", "${user}"))
            .child(Node::property("password", "secret"))
            .child(Node::element("comment"));

        let props = node.children_as_properties(&vars);
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("username").map(String::as_str), Some("root"));
        assert_eq!(props.get("password").map(String::as_str), Some("secret"));
    }

    #[test]
    fn test_first_child_and_order() {
        let node = Node::element("environments")
            .child(Node::element("environment").attr("id", "a"))
            .child(Node::element("environment").attr("id", "b"));
        assert_eq!(node.first_child("environment").unwrap().attribute("id"), Some("a"));
        let ids: Vec<_> = node.children().iter().filter_map(|c| c.attribute("id")).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
