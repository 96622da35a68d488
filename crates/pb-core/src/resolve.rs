//! Insertion-target resolution for user-facing "add" actions.

use crate::id::NodeId;
use crate::model::Document;
use crate::tree::find_node_and_parent;

/// Decide which container receives a newly added node.
///
/// Returns `None` for root level. Resolution order:
/// 1. an explicit target (a container asked "add inside me");
/// 2. the selected node if it is a container, else the selected node's
///    parent (root level when the selection is itself at root);
/// 3. root level.
///
/// A selection that no longer exists in the document resolves to root.
pub fn resolve_target(
    doc: &Document,
    explicit: Option<NodeId>,
    selected: Option<NodeId>,
) -> Option<NodeId> {
    if explicit.is_some() {
        return explicit;
    }
    let loc = find_node_and_parent(&doc.components, selected?)?;
    if loc.node.is_container() {
        Some(loc.node.id)
    } else {
        loc.parent.map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, Node};

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn doc() -> Document {
        let section = Node::new(id("r_section"), ComponentType::Container)
            .with_child(Node::new(id("r_title"), ComponentType::Text));
        let mut d = Document::new("r", "Resolve");
        d.components = vec![section, Node::new(id("r_loose"), ComponentType::Button)];
        d
    }

    #[test]
    fn explicit_target_wins() {
        let d = doc();
        assert_eq!(
            resolve_target(&d, Some(id("r_section")), Some(id("r_loose"))),
            Some(id("r_section"))
        );
    }

    #[test]
    fn selected_container_is_target() {
        assert_eq!(resolve_target(&doc(), None, Some(id("r_section"))), Some(id("r_section")));
    }

    #[test]
    fn selected_leaf_targets_its_parent() {
        assert_eq!(resolve_target(&doc(), None, Some(id("r_title"))), Some(id("r_section")));
    }

    #[test]
    fn root_level_leaf_and_nothing_selected_target_root() {
        let d = doc();
        assert_eq!(resolve_target(&d, None, Some(id("r_loose"))), None);
        assert_eq!(resolve_target(&d, None, None), None);
        assert_eq!(resolve_target(&d, None, Some(id("r_stale"))), None);
    }
}
