//! Guarded move: the only mutation the presentation layer calls.

use std::fmt;

use tracing::{debug, info, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::error::DomainResult;
use crate::domain::node::{Node, NodeId};

/// Result of a move request. Only `Moved` changes the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { node: NodeId, parent: NodeId },
    /// Dragged node dropped onto itself
    SelfTarget(NodeId),
    /// Target lies inside the dragged node's subtree
    DescendantTarget { node: NodeId, target: NodeId },
    /// Target is an ancestor of the dragged node, its parent included
    AncestorTarget { node: NodeId, target: NodeId },
    NotFound(NodeId),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOutcome::Moved { node, parent } => write!(f, "moved {} under {}", node, parent),
            MoveOutcome::SelfTarget(id) => {
                write!(f, "rejected: {} cannot become its own parent", id)
            }
            MoveOutcome::DescendantTarget { node, target } => {
                write!(f, "rejected: {} is a descendant of {}", target, node)
            }
            MoveOutcome::AncestorTarget { node, target } => {
                write!(f, "rejected: {} already lies inside {}", node, target)
            }
            MoveOutcome::NotFound(id) => write!(f, "ignored: node not found: {}", id),
        }
    }
}

impl TreeArena {
    /// Moves `dragged` with its subtree to become the last child of `target`.
    ///
    /// Every guard runs against the pre-move state and leaves the tree
    /// untouched when it fires.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&mut self, dragged: &str, target: &str) -> MoveOutcome {
        let outcome = self.check_move(dragged, target);
        if let Some(rejected) = outcome {
            info!(%rejected, "move rejected");
            return rejected;
        }

        let Some(detached) = self.detach(dragged) else {
            return MoveOutcome::NotFound(NodeId::new(dragged));
        };
        if let Err(e) = self.attach(target, detached) {
            info!(error = %e, "attach failed, node restored");
            return MoveOutcome::NotFound(NodeId::new(target));
        }

        debug!(%dragged, %target, "moved");
        MoveOutcome::Moved {
            node: NodeId::new(dragged),
            parent: NodeId::new(target),
        }
    }

    fn check_move(&self, dragged: &str, target: &str) -> Option<MoveOutcome> {
        if dragged == target {
            return Some(MoveOutcome::SelfTarget(NodeId::new(dragged)));
        }
        if self.is_descendant(dragged, target) {
            return Some(MoveOutcome::DescendantTarget {
                node: NodeId::new(dragged),
                target: NodeId::new(target),
            });
        }
        if self.is_descendant(target, dragged) {
            return Some(MoveOutcome::AncestorTarget {
                node: NodeId::new(dragged),
                target: NodeId::new(target),
            });
        }
        [dragged, target]
            .into_iter()
            .find(|id| !self.contains(id))
            .map(|missing| MoveOutcome::NotFound(NodeId::new(missing)))
    }
}

/// Value-level move: the input is never mutated and shares nothing with
/// the returned forest.
///
/// Fails only when `nodes` itself is malformed (empty or duplicate ids).
#[instrument(level = "debug", skip(nodes))]
pub fn move_tree(nodes: &[Node], dragged: &str, target: &str) -> DomainResult<Vec<Node>> {
    let mut tree = TreeArena::from_nodes(nodes)?;
    tree.move_node(dragged, target);
    Ok(tree.to_nodes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Vec<Node> {
        vec![
            Node::new("1", "Item 1").children([
                Node::new("1-1", "Item 1.1"),
                Node::new("1-2", "Item 1.2").child(Node::new("1-2-1", "Item 1.2.1")),
            ]),
            Node::new("2", "Item 2"),
            Node::new("3", "Item 3"),
        ]
    }

    #[test]
    fn given_root_when_moving_under_other_root_then_appends_last() {
        let mut tree = TreeArena::from_nodes(&forest()).unwrap();
        let outcome = tree.move_node("3", "1");
        assert!(outcome.is_moved());
        let children: Vec<_> = tree
            .children_of("1")
            .unwrap()
            .into_iter()
            .map(NodeId::as_str)
            .collect();
        assert_eq!(children, vec!["1-1", "1-2", "3"]);
    }

    #[test]
    fn given_guard_order_when_target_missing_and_self_then_self_wins() {
        let mut tree = TreeArena::from_nodes(&forest()).unwrap();
        assert_eq!(
            tree.move_node("x", "x"),
            MoveOutcome::SelfTarget(NodeId::new("x"))
        );
        assert_eq!(
            tree.move_node("2", "x"),
            MoveOutcome::NotFound(NodeId::new("x"))
        );
        assert_eq!(
            tree.move_node("x", "2"),
            MoveOutcome::NotFound(NodeId::new("x"))
        );
        assert_eq!(tree.to_nodes(), forest());
    }

    #[test]
    fn given_child_when_dropped_on_own_parent_then_sibling_order_kept() {
        let mut tree = TreeArena::from_nodes(&forest()).unwrap();
        assert_eq!(
            tree.move_node("1-1", "1"),
            MoveOutcome::AncestorTarget {
                node: NodeId::new("1-1"),
                target: NodeId::new("1"),
            }
        );
        assert!(!tree.move_node("1-2-1", "1").is_moved());
        assert_eq!(tree.to_nodes(), forest());
    }

    #[test]
    fn given_outcomes_when_displayed_then_explain_result() {
        let outcome = MoveOutcome::DescendantTarget {
            node: NodeId::new("1"),
            target: NodeId::new("1-2-1"),
        };
        assert_eq!(outcome.to_string(), "rejected: 1-2-1 is a descendant of 1");
        let outcome = MoveOutcome::Moved {
            node: NodeId::new("3"),
            parent: NodeId::new("1"),
        };
        assert_eq!(outcome.to_string(), "moved 3 under 1");
        let outcome = MoveOutcome::AncestorTarget {
            node: NodeId::new("1-1"),
            target: NodeId::new("1"),
        };
        assert_eq!(outcome.to_string(), "rejected: 1-1 already lies inside 1");
    }

    #[test]
    fn given_malformed_forest_when_moving_by_value_then_fails() {
        let nodes = vec![Node::new("a", "A"), Node::new("a", "A again")];
        assert!(move_tree(&nodes, "a", "a").is_err());
    }
}
