//! Nested drag-and-drop list engine
//!
//! An arena-backed forest whose nodes can be moved, with their subtrees,
//! to become the last child of another node. Moves that would create a
//! cycle are rejected and leave the forest unchanged.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
