use std::collections::{HashMap, HashSet};
use std::fmt;
use std::iter;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId};

/// Data payload for tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub id: NodeId,
    /// Display text, no role in mutation
    pub label: String,
}

impl NodeData {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for roots and detached subtrees
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    pub children: Vec<Index>,
}

/// A subtree unlinked from its position but still owned by the arena.
///
/// Remembers where it came from so a failed attach can put it back.
/// Dropping the handle leaves the subtree stored but unreachable for good:
/// its ids stay taken and count as absent for `contains` and moves.
#[must_use = "a detached subtree stays unreachable until attached or restored"]
#[derive(Debug, PartialEq, Eq)]
pub struct Detached {
    index: Index,
    id: NodeId,
    origin: Option<Index>,
    position: usize,
}

impl Detached {
    pub fn id(&self) -> &NodeId {
        &self.id
    }
}

/// Arena-based forest holding the nested list.
///
/// Every id maps to exactly one arena slot. Parent and child links are
/// indices, so detaching and attaching rewrite O(depth) links and never
/// copy a subtree. Ids are checked for uniqueness only when nodes enter
/// the arena.
#[derive(Debug, Clone)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    /// Root nodes in display order
    roots: Vec<Index>,
    ids: HashMap<NodeId, Index>,
    /// Tops of subtrees currently unlinked by `detach`
    detached: HashSet<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            ids: HashMap::new(),
            detached: HashSet::new(),
        }
    }

    /// Builds an arena from nested nodes, preserving sibling order.
    ///
    /// Fails on empty or duplicate ids.
    #[instrument(level = "debug", skip(nodes), fields(roots = nodes.len()))]
    pub fn from_nodes(nodes: &[Node]) -> DomainResult<Self> {
        let mut tree = Self::new();
        let mut stack: Vec<(&Node, Option<Index>)> =
            nodes.iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent_idx)) = stack.pop() {
            let data = NodeData::new(node.id.clone(), node.label.clone());
            let current_idx = tree.insert_at(data, parent_idx)?;

            // Push in reverse so siblings pop in their original order
            for child in node.children.iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        debug!(nodes = tree.len(), "arena built");
        Ok(tree)
    }

    /// Converts the forest back into nested nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn to_nodes(&self) -> Vec<Node> {
        self.fold_postorder(self.iter_postorder(), Self::build_node)
    }

    /// Nested copy of the subtree rooted at `id`.
    pub fn subtree(&self, id: &str) -> Option<Node> {
        let idx = self.index_of(id)?;
        self.fold_postorder(PostOrderIterator::new(self, &[idx]), Self::build_node).pop()
    }

    fn build_node(node: &TreeNode, children: Vec<Node>) -> Node {
        Node {
            id: node.data.id.clone(),
            label: node.data.label.clone(),
            children,
        }
    }

    /// Builds one value per top of `nodes`, children before parents.
    ///
    /// `build` gets each node with its children's values in order. Runs on
    /// an explicit stack, so chain depth is bounded only by the heap.
    pub(crate) fn fold_postorder<T>(
        &self,
        nodes: PostOrderIterator<'_>,
        mut build: impl FnMut(&TreeNode, Vec<T>) -> T,
    ) -> Vec<T> {
        let mut built: Vec<T> = Vec::new();
        for (_, node) in nodes {
            let live = node
                .children
                .iter()
                .filter(|&&child| self.arena.contains(child))
                .count();
            let children = built.split_off(built.len().saturating_sub(live));
            built.push(build(node, children));
        }
        built
    }

    /// Inserts a new node as the last child of `parent`, or as the last root.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<&str>) -> DomainResult<Index> {
        let parent_idx = match parent {
            Some(parent_id) => Some(
                self.index_of(parent_id)
                    .filter(|&idx| self.is_attached(idx))
                    .ok_or_else(|| DomainError::ParentNotFound(NodeId::new(parent_id)))?,
            ),
            None => None,
        };
        self.insert_at(data, parent_idx)
    }

    fn insert_at(&mut self, data: NodeData, parent: Option<Index>) -> DomainResult<Index> {
        if data.id.is_empty() {
            return Err(DomainError::EmptyId { label: data.label });
        }
        if self.ids.contains_key(&data.id) {
            return Err(DomainError::DuplicateId(data.id));
        }

        let id = data.id.clone();
        let node_idx = self.arena.insert(TreeNode {
            data,
            parent,
            children: Vec::new(),
        });

        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(node_idx);
                }
            }
            None => self.roots.push(node_idx),
        }
        self.ids.insert(id, node_idx);

        Ok(node_idx)
    }

    /// Number of stored nodes, including any currently detached subtree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Whether `id` is stored and reachable from the roots.
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some_and(|idx| self.is_attached(idx))
    }

    /// False for nodes inside a subtree unlinked by `detach`.
    fn is_attached(&self, idx: Index) -> bool {
        if self.detached.is_empty() {
            return true;
        }
        let top = self.ancestor_indices(idx).last().unwrap_or(idx);
        !self.detached.contains(&top)
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&NodeData> {
        self.index_of(id)
            .and_then(|idx| self.arena.get(idx))
            .map(|node| &node.data)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn root_ids(&self) -> Vec<&NodeId> {
        self.roots
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|node| &node.data.id)
            .collect()
    }

    /// Parent id of `id`; None for roots, detached subtrees and unknown ids.
    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        let node = self.arena.get(self.index_of(id)?)?;
        self.arena.get(node.parent?).map(|parent| &parent.data.id)
    }

    /// Child ids of `id` in order; None for unknown ids.
    pub fn children_of(&self, id: &str) -> Option<Vec<&NodeId>> {
        let node = self.arena.get(self.index_of(id)?)?;
        Some(
            node.children
                .iter()
                .filter_map(|&child| self.arena.get(child))
                .map(|child| &child.data.id)
                .collect(),
        )
    }

    /// Ancestor ids of `id`, nearest first.
    pub fn ancestors(&self, id: &str) -> Vec<&NodeId> {
        match self.index_of(id) {
            Some(idx) => self
                .ancestor_indices(idx)
                .filter_map(|ancestor| self.arena.get(ancestor))
                .map(|node| &node.data.id)
                .collect(),
            None => Vec::new(),
        }
    }

    fn ancestor_indices(&self, idx: Index) -> impl Iterator<Item = Index> + '_ {
        let parent_of = move |current: &Index| self.arena.get(*current).and_then(|n| n.parent);
        iter::successors(parent_of(&idx), parent_of)
    }

    /// Whether `descendant` lies strictly inside the subtree of `ancestor`.
    ///
    /// Unknown ids yield `false`. Walks the parent chain of `descendant`.
    #[instrument(level = "trace", skip(self))]
    pub fn is_descendant(&self, ancestor: &str, descendant: &str) -> bool {
        let (Some(ancestor_idx), Some(descendant_idx)) =
            (self.index_of(ancestor), self.index_of(descendant))
        else {
            return false;
        };
        self.ancestor_indices(descendant_idx)
            .any(|idx| idx == ancestor_idx)
    }

    /// Unlinks `id` and its subtree from its parent, closing the gap.
    ///
    /// Returns None if `id` is unknown or lies in a detached subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn detach(&mut self, id: &str) -> Option<Detached> {
        let index = self.index_of(id).filter(|&idx| self.is_attached(idx))?;
        let origin = self.arena.get(index)?.parent;

        let siblings = match origin {
            Some(parent_idx) => &mut self.arena.get_mut(parent_idx)?.children,
            None => &mut self.roots,
        };
        let position = siblings.iter().position(|&sibling| sibling == index)?;
        siblings.remove(position);

        if let Some(node) = self.arena.get_mut(index) {
            node.parent = None;
        }
        self.detached.insert(index);
        debug!(%id, position, "detached");

        Some(Detached {
            index,
            id: NodeId::new(id),
            origin,
            position,
        })
    }

    /// Appends a detached subtree as the last child of `parent_id`.
    ///
    /// A missing or unreachable parent, or a parent inside the detached
    /// subtree itself, is an error; the subtree is restored to its origin
    /// before returning.
    #[instrument(level = "debug", skip(self))]
    pub fn attach(&mut self, parent_id: &str, detached: Detached) -> DomainResult<()> {
        let Some(parent_idx) = self.index_of(parent_id) else {
            self.restore(detached);
            return Err(DomainError::ParentNotFound(NodeId::new(parent_id)));
        };

        if parent_idx == detached.index
            || self
                .ancestor_indices(parent_idx)
                .any(|idx| idx == detached.index)
        {
            let err = DomainError::CycleDetected {
                node: detached.id.clone(),
                parent: NodeId::new(parent_id),
            };
            self.restore(detached);
            return Err(err);
        }
        if !self.is_attached(parent_idx) {
            self.restore(detached);
            return Err(DomainError::ParentNotFound(NodeId::new(parent_id)));
        }

        self.detached.remove(&detached.index);
        if let Some(parent) = self.arena.get_mut(parent_idx) {
            parent.children.push(detached.index);
        }
        if let Some(node) = self.arena.get_mut(detached.index) {
            node.parent = Some(parent_idx);
        }
        debug!(id = %detached.id, %parent_id, "attached");

        Ok(())
    }

    /// Puts a detached subtree back at the position it was detached from.
    #[instrument(level = "debug", skip(self))]
    pub fn restore(&mut self, detached: Detached) {
        let Detached {
            index,
            origin,
            position,
            ..
        } = detached;
        self.detached.remove(&index);
        let origin = origin.filter(|&parent_idx| self.arena.contains(parent_idx));

        let siblings = match origin.and_then(|parent_idx| self.arena.get_mut(parent_idx)) {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        let position = position.min(siblings.len());
        siblings.insert(position, index);

        if let Some(node) = self.arena.get_mut(index) {
            node.parent = origin;
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, &self.roots)
    }

    /// Number of levels of the deepest root; 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&idx| (idx, 1)).collect();
        let mut deepest = 0;
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.arena.get(idx) {
                deepest = deepest.max(level);
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Ids of all reachable nodes without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<&NodeId> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| &node.data.id)
            .collect()
    }
}

/// Pre-order traversal across all roots, children left to right.
pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Post-order traversal from a set of tops: children before their parent.
pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena, tops: &[Index]) -> Self {
        let stack = tops.iter().rev().map(|&idx| (idx, false)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
