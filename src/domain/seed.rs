//! Seed data: the built-in dataset and the TOML seed file format.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId};

/// The built-in three-root list.
pub fn initial_items() -> Vec<Node> {
    vec![
        Node::new("1", "Item 1").children([
            Node::new("1-1", "Item 1.1"),
            Node::new("1-2", "Item 1.2").child(Node::new("1-2-1", "Item 1.2.1")),
        ]),
        Node::new("2", "Item 2"),
        Node::new("3", "Item 3"),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SeedItem>,
}

impl SeedFile {
    pub fn parse(content: &str) -> DomainResult<Self> {
        toml::from_str(content).map_err(|e| DomainError::InvalidSeed(e.to_string()))
    }

    /// Converts seed items into nodes.
    ///
    /// Items without an id get a UUID when `generate_missing` is set,
    /// otherwise they fail with `EmptyId`.
    #[instrument(level = "debug", skip(self))]
    pub fn into_nodes(self, generate_missing: bool) -> DomainResult<Vec<Node>> {
        let nodes = self
            .items
            .into_iter()
            .map(|item| item.into_node(generate_missing))
            .collect::<DomainResult<Vec<_>>>()?;
        debug!(roots = nodes.len(), "seed converted");
        Ok(nodes)
    }

    pub fn from_nodes(nodes: &[Node]) -> Self {
        Self {
            items: nodes.iter().map(SeedItem::from_node).collect(),
        }
    }

    pub fn to_toml(&self) -> DomainResult<String> {
        toml::to_string_pretty(self).map_err(|e| DomainError::InvalidSeed(e.to_string()))
    }
}

impl SeedItem {
    fn into_node(self, generate_missing: bool) -> DomainResult<Node> {
        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => NodeId::new(id),
            None if generate_missing => NodeId::generate(),
            None => return Err(DomainError::EmptyId { label: self.label }),
        };
        let children = self
            .children
            .into_iter()
            .map(|child| child.into_node(generate_missing))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Node {
            id,
            label: self.label,
            children,
        })
    }

    fn from_node(node: &Node) -> Self {
        Self {
            id: Some(node.id.to_string()),
            label: node.label.clone(),
            children: node.children.iter().map(SeedItem::from_node).collect(),
        }
    }
}

/// Renders nodes in the seed file format.
pub fn to_toml(nodes: &[Node]) -> DomainResult<String> {
    SeedFile::from_nodes(nodes).to_toml()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::count_nodes;

    const SEED: &str = r#"
[[items]]
id = "a"
label = "Alpha"

  [[items.children]]
  id = "a-1"
  label = "Alpha one"

[[items]]
label = "No id"
"#;

    #[test]
    fn given_builtin_seed_then_has_three_roots_and_six_nodes() {
        let items = initial_items();
        assert_eq!(items.len(), 3);
        assert_eq!(count_nodes(&items), 6);
    }

    #[test]
    fn given_seed_with_missing_id_when_generating_then_assigns_uuid() {
        let nodes = SeedFile::parse(SEED).unwrap().into_nodes(true).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].children[0].id.as_str(), "a-1");
        assert_eq!(nodes[1].label, "No id");
        assert_eq!(nodes[1].id.as_str().len(), 36);
    }

    #[test]
    fn given_seed_with_missing_id_when_not_generating_then_fails() {
        let err = SeedFile::parse(SEED).unwrap().into_nodes(false).unwrap_err();
        assert_eq!(
            err,
            DomainError::EmptyId {
                label: "No id".to_string()
            }
        );
    }

    #[test]
    fn given_malformed_toml_when_parsing_then_invalid_seed() {
        let result = SeedFile::parse("[[items]]\nid = 3");
        assert!(matches!(result, Err(DomainError::InvalidSeed(_))));
    }

    #[test]
    fn given_nodes_when_exporting_then_parses_back_identically() {
        let exported = to_toml(&initial_items()).unwrap();
        assert!(exported.contains("label = \"Item 1.2.1\""));
        let nodes = SeedFile::parse(&exported).unwrap().into_nodes(false).unwrap();
        assert_eq!(nodes, initial_items());
    }
}
