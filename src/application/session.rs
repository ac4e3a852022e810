//! Drag session: the presentation-side state around the engine
//!
//! Holds the tree together with the id of the node being dragged. The
//! engine stays stateless; the drag source lives here and is cleared on
//! every drop, whatever the outcome.

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, MoveOutcome, NodeId, RenderOptions, TreeArena};

#[derive(Debug, Clone, Default)]
pub struct DragSession {
    tree: TreeArena,
    dragged: Option<NodeId>,
}

impl DragSession {
    pub fn new(tree: TreeArena) -> Self {
        Self {
            tree,
            dragged: None,
        }
    }

    /// Drag-start: remember `id` as the drag source.
    ///
    /// A second call replaces the previous source.
    #[instrument(level = "debug", skip(self))]
    pub fn begin_move(&mut self, id: &str) -> ApplicationResult<()> {
        if !self.tree.contains(id) {
            return Err(DomainError::NodeNotFound(NodeId::new(id)).into());
        }
        if let Some(previous) = self.dragged.replace(NodeId::new(id)) {
            debug!(%previous, "drag source replaced");
        }
        Ok(())
    }

    /// Drop: move the drag source under `target_id`.
    ///
    /// The drag source is consumed before the move runs, so it is cleared
    /// even when the move is rejected.
    #[instrument(level = "debug", skip(self))]
    pub fn complete_move(&mut self, target_id: &str) -> ApplicationResult<MoveOutcome> {
        let dragged = self.dragged.take().ok_or(ApplicationError::NoActiveDrag)?;
        let outcome = self.tree.move_node(dragged.as_str(), target_id);
        info!(%outcome, "drop completed");
        Ok(outcome)
    }

    /// Abandon the drag without moving anything.
    pub fn cancel(&mut self) -> Option<NodeId> {
        self.dragged.take()
    }

    pub fn dragged(&self) -> Option<&NodeId> {
        self.dragged.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TreeArena {
        &mut self.tree
    }

    /// Render options with the current drag source highlighted.
    pub fn render_options(&self, show_ids: bool) -> RenderOptions {
        RenderOptions::new(show_ids).with_highlight(self.dragged.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::initial_items;

    fn session() -> DragSession {
        DragSession::new(TreeArena::from_nodes(&initial_items()).unwrap())
    }

    #[test]
    fn given_unknown_id_when_beginning_move_then_no_drag_starts() {
        let mut session = session();
        let err = session.begin_move("42").unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::NodeNotFound(_))
        ));
        assert!(!session.is_dragging());
    }

    #[test]
    fn given_no_drag_when_dropping_then_no_active_drag() {
        let mut session = session();
        assert!(matches!(
            session.complete_move("1"),
            Err(ApplicationError::NoActiveDrag)
        ));
    }

    #[test]
    fn given_drag_when_cancelled_then_source_returned_and_cleared() {
        let mut session = session();
        session.begin_move("2").unwrap();
        assert_eq!(session.cancel(), Some(NodeId::new("2")));
        assert_eq!(session.dragged(), None);
    }

    #[test]
    fn given_second_drag_when_dropping_then_latest_source_moves() {
        let mut session = session();
        session.begin_move("2").unwrap();
        session.begin_move("3").unwrap();
        let outcome = session.complete_move("1").unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                node: NodeId::new("3"),
                parent: NodeId::new("1"),
            }
        );
        assert_eq!(session.tree().parent_of("2"), None);
    }

    #[test]
    fn given_drag_when_rendering_then_highlights_source() {
        let mut session = session();
        session.begin_move("1-1").unwrap();
        let options = session.render_options(false);
        assert_eq!(options.highlight, Some(NodeId::new("1-1")));
        assert!(!options.show_ids);
    }
}
