//! Tree service
//!
//! Loads the initial forest from the built-in list or a seed file, creates
//! new items and exports the current forest in the seed format.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, ResultExt};
use crate::config::Settings;
use crate::domain::{
    self, render_forest, MoveOutcome, Node, NodeData, NodeId, RenderOptions, SeedFile, TreeArena,
};
use crate::infrastructure::traits::FileSystem;

/// Service for loading, extending and exporting the forest.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl TreeService {
    /// Create a new tree service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Nodes from the configured seed file, or the built-in list.
    pub fn load_nodes(&self) -> ApplicationResult<Vec<Node>> {
        match &self.settings.seed_file {
            Some(path) => self.load_seed_file(path),
            None => {
                debug!("using built-in seed");
                Ok(domain::initial_items())
            }
        }
    }

    /// Parse a TOML seed file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_seed_file(&self, path: &Path) -> ApplicationResult<Vec<Node>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("seed file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read seed file", path)?;
        let nodes = SeedFile::parse(&content)?.into_nodes(self.settings.generate_missing_ids)?;
        info!(path = %path.display(), nodes = domain::count_nodes(&nodes), "seed loaded");
        Ok(nodes)
    }

    /// Build the arena; duplicate or empty ids are rejected here.
    pub fn load_tree(&self) -> ApplicationResult<TreeArena> {
        let nodes = self.load_nodes()?;
        Ok(TreeArena::from_nodes(&nodes)?)
    }

    /// Create a node with a fresh id as last child of `parent`, or as last root.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn add_item(
        &self,
        tree: &mut TreeArena,
        label: &str,
        parent: Option<&str>,
    ) -> ApplicationResult<NodeId> {
        let id = NodeId::generate();
        tree.insert_node(NodeData::new(id.clone(), label.trim()), parent)?;
        debug!(%id, "item added");
        Ok(id)
    }

    /// Applies one move and renders the result, as seed TOML when `export`.
    ///
    /// The outcome is returned alongside so callers report rejections in
    /// both modes.
    pub fn move_and_render(
        &self,
        tree: &mut TreeArena,
        dragged: &str,
        target: &str,
        export: bool,
    ) -> ApplicationResult<(MoveOutcome, String)> {
        let outcome = tree.move_node(dragged, target);
        let body = if export {
            self.export_toml(tree)?
        } else {
            self.render(tree, None)
        };
        Ok((outcome, body))
    }

    /// One-line shape of the forest: node count, depth and leaf ids.
    pub fn summary(&self, tree: &TreeArena) -> String {
        let leaves = itertools::join(tree.leaf_ids(), ", ");
        format!("{} items, depth {}, leaves: {}", tree.len(), tree.depth(), leaves)
    }

    /// The forest in seed file format.
    pub fn export_toml(&self, tree: &TreeArena) -> ApplicationResult<String> {
        Ok(domain::seed::to_toml(&tree.to_nodes())?)
    }

    /// Indented text rendering honouring `show_ids`.
    pub fn render(&self, tree: &TreeArena, highlight: Option<&NodeId>) -> String {
        let options = RenderOptions::new(self.settings.show_ids).with_highlight(highlight.cloned());
        render_forest(tree, &options)
    }
}
