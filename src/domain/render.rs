use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::TreeArena;
use crate::domain::node::NodeId;

const DRAG_MARKER: &str = "(dragging)";
const EMPTY_FOREST: &str = "(empty)";

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub show_ids: bool,
    /// Node currently held as drag source
    pub highlight: Option<NodeId>,
}

impl RenderOptions {
    pub fn new(show_ids: bool) -> Self {
        Self {
            show_ids,
            highlight: None,
        }
    }

    pub fn with_highlight(mut self, highlight: Option<NodeId>) -> Self {
        self.highlight = highlight;
        self
    }
}

pub trait TreeRender {
    /// One display tree per root, in root order.
    fn to_display_trees(&self, options: &RenderOptions) -> Vec<Tree<String>>;
}

impl TreeRender for TreeArena {
    #[instrument(level = "trace", skip(self))]
    fn to_display_trees(&self, options: &RenderOptions) -> Vec<Tree<String>> {
        self.fold_postorder(self.iter_postorder(), |node, leaves| {
            Tree::new(label_for(&node.data.id, &node.data.label, options)).with_leaves(leaves)
        })
    }
}

fn label_for(id: &NodeId, label: &str, options: &RenderOptions) -> String {
    let mut text = label.to_string();
    if options.show_ids {
        text.push_str(&format!(" [{}]", id));
    }
    if options.highlight.as_ref() == Some(id) {
        text.push(' ');
        text.push_str(DRAG_MARKER);
    }
    text
}

/// Renders the whole forest as indented text, one block per root.
pub fn render_forest(tree: &TreeArena, options: &RenderOptions) -> String {
    let trees = tree.to_display_trees(options);
    if trees.is_empty() {
        return format!("{}\n", EMPTY_FOREST);
    }
    trees.iter().map(|t| t.to_string()).collect()
}
