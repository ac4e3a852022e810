//! Domain layer: the nested list and its mutation engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod engine;
pub mod error;
pub mod node;
pub mod render;
pub mod seed;

pub use arena::{Detached, NodeData, TreeArena, TreeNode};
pub use engine::{move_tree, MoveOutcome};
pub use error::{DomainError, DomainResult};
pub use node::{count_nodes, find_node, Node, NodeId};
pub use render::{render_forest, RenderOptions, TreeRender};
pub use seed::{initial_items, SeedFile, SeedItem};
