//! Stateless tree utilities over the component forest.
//!
//! All searches are depth-first, pre-order, left-to-right in `children`
//! order, so "first match" is deterministic.

use crate::id::NodeId;
use crate::model::Node;
use smallvec::SmallVec;
use std::collections::HashSet;

/// Root-first chain of ancestor ids.
pub type AncestorPath = SmallVec<[NodeId; 8]>;

/// Result of [`find_node_and_parent`].
#[derive(Debug, Clone, Copy)]
pub struct NodeLocation<'a> {
    pub node: &'a Node,
    /// `None` when the node sits at root level.
    pub parent: Option<&'a Node>,
    /// Position within the sibling vector that holds the node.
    pub index: usize,
}

// ─── Lookup ──────────────────────────────────────────────────────────────

/// Locate a node together with its parent and sibling index.
pub fn find_node_and_parent(forest: &[Node], id: NodeId) -> Option<NodeLocation<'_>> {
    locate(forest, id, None)
}

fn locate<'a>(
    nodes: &'a [Node],
    id: NodeId,
    parent: Option<&'a Node>,
) -> Option<NodeLocation<'a>> {
    for (index, node) in nodes.iter().enumerate() {
        if node.id == id {
            return Some(NodeLocation {
                node,
                parent,
                index,
            });
        }
        if let Some(found) = locate(node.children(), id, Some(node)) {
            return Some(found);
        }
    }
    None
}

pub fn find_node(forest: &[Node], id: NodeId) -> Option<&Node> {
    find_node_and_parent(forest, id).map(|loc| loc.node)
}

pub fn contains(forest: &[Node], id: NodeId) -> bool {
    find_node(forest, id).is_some()
}

/// Mutable lookup, used by the mutation engine on its private copy.
pub fn find_node_mut(forest: &mut [Node], id: NodeId) -> Option<&mut Node> {
    for node in forest.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children.as_mut()
            && let Some(found) = find_node_mut(children, id)
        {
            return Some(found);
        }
    }
    None
}

/// The sibling vector holding `id`, plus the node's index within it.
pub fn find_siblings_mut(forest: &mut Vec<Node>, id: NodeId) -> Option<(&mut Vec<Node>, usize)> {
    if let Some(index) = forest.iter().position(|n| n.id == id) {
        return Some((forest, index));
    }
    for node in forest.iter_mut() {
        if let Some(children) = node.children.as_mut()
            && let Some(found) = find_siblings_mut(children, id)
        {
            return Some(found);
        }
    }
    None
}

/// Detach the node with `id` from wherever it lives, preserving the order
/// of its remaining siblings.
pub fn detach(forest: &mut Vec<Node>, id: NodeId) -> Option<Node> {
    let (siblings, index) = find_siblings_mut(forest, id)?;
    Some(siblings.remove(index))
}

/// Root-first ids of every ancestor of `id`. `Some(empty)` for a root-level
/// node, `None` if the id is not in the forest.
pub fn ancestors(forest: &[Node], id: NodeId) -> Option<AncestorPath> {
    let mut path = AncestorPath::new();
    if collect_path(forest, id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn collect_path(nodes: &[Node], id: NodeId, path: &mut AncestorPath) -> bool {
    for node in nodes {
        if node.id == id {
            return true;
        }
        path.push(node.id);
        if collect_path(node.children(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// True if `descendant` lives somewhere below `ancestor`.
pub fn is_descendant_of(forest: &[Node], ancestor: NodeId, descendant: NodeId) -> bool {
    ancestors(forest, descendant).is_some_and(|path| path.contains(&ancestor))
}

// ─── Traversal ───────────────────────────────────────────────────────────

/// Pre-order iterator yielding `(depth, node)`.
pub struct Walk<'a> {
    stack: SmallVec<[(usize, &'a Node); 16]>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for child in node.children().iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

pub fn walk(forest: &[Node]) -> Walk<'_> {
    Walk {
        stack: forest.iter().rev().map(|n| (0, n)).collect(),
    }
}

/// Number of nodes in the forest, including nodes parked as container
/// backgrounds.
pub fn count_nodes(forest: &[Node]) -> usize {
    walk(forest)
        .map(|(_, node)| {
            1 + node
                .background_source
                .as_deref()
                .map_or(0, |source| count_nodes(std::slice::from_ref(source)))
        })
        .sum()
}

/// Every id in the forest, including nodes parked as container backgrounds.
pub fn collect_ids(forest: &[Node]) -> HashSet<NodeId> {
    let mut ids = HashSet::new();
    for (_, node) in walk(forest) {
        ids.insert(node.id);
        if let Some(source) = &node.background_source {
            ids.extend(collect_ids(std::slice::from_ref(source.as_ref())));
        }
    }
    ids
}

/// Children ordered for layout: ascending `placement.order`, where a
/// missing order falls back to the child's position. Ties keep document
/// order.
pub fn placement_sorted(children: &[Node]) -> Vec<&Node> {
    let mut keyed: Vec<(i64, &Node)> = children
        .iter()
        .enumerate()
        .map(|(i, c)| (c.effective_order(i), c))
        .collect();
    keyed.sort_by_key(|(order, _)| *order);
    keyed.into_iter().map(|(_, c)| c).collect()
}

// ─── Identity ────────────────────────────────────────────────────────────

/// Deep-clone `node`, giving it and every descendant a fresh id.
pub fn regenerate_ids(node: &Node) -> Node {
    let mut copy = node.clone();
    reassign(&mut copy);
    copy
}

fn reassign(node: &mut Node) {
    node.id = NodeId::generate();
    if let Some(children) = node.children.as_mut() {
        for child in children {
            reassign(child);
        }
    }
    if let Some(source) = node.background_source.as_mut() {
        reassign(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, Placement};
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    /// page ─┬─ header ─┬─ logo
    ///       │          └─ nav ── link
    ///       └─ footer
    fn sample() -> Vec<Node> {
        let link = Node::new(id("t_link"), ComponentType::Text);
        let nav = Node::new(id("t_nav"), ComponentType::Container).with_child(link);
        let logo = Node::new(id("t_logo"), ComponentType::Image);
        let header = Node::new(id("t_header"), ComponentType::Container)
            .with_child(logo)
            .with_child(nav);
        let footer = Node::new(id("t_footer"), ComponentType::Text);
        vec![header, footer]
    }

    #[test]
    fn finds_root_level_node() {
        let forest = sample();
        let loc = find_node_and_parent(&forest, id("t_footer")).unwrap();
        assert!(loc.parent.is_none());
        assert_eq!(loc.index, 1);
    }

    #[test]
    fn finds_nested_node_with_parent() {
        let forest = sample();
        let loc = find_node_and_parent(&forest, id("t_link")).unwrap();
        assert_eq!(loc.parent.map(|p| p.id), Some(id("t_nav")));
        assert_eq!(loc.index, 0);
        assert!(find_node_and_parent(&forest, id("t_missing")).is_none());
    }

    #[test]
    fn counts_include_parked_backgrounds() {
        let mut forest = sample();
        let parked = Node::new(id("t_parked"), ComponentType::Image);
        forest[0].background_source = Some(Box::new(parked));
        assert_eq!(count_nodes(&forest), 6);
        assert_eq!(collect_ids(&forest).len(), count_nodes(&forest));
    }

    #[test]
    fn walk_is_preorder() {
        let forest = sample();
        let order: Vec<(usize, &str)> = walk(&forest).map(|(d, n)| (d, n.id.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (0, "t_header"),
                (1, "t_logo"),
                (1, "t_nav"),
                (2, "t_link"),
                (0, "t_footer"),
            ]
        );
    }

    #[test]
    fn ancestor_paths() {
        let forest = sample();
        assert_eq!(
            ancestors(&forest, id("t_link")).unwrap().as_slice(),
            &[id("t_header"), id("t_nav")]
        );
        assert!(ancestors(&forest, id("t_header")).unwrap().is_empty());
        assert!(is_descendant_of(&forest, id("t_header"), id("t_link")));
        assert!(!is_descendant_of(&forest, id("t_nav"), id("t_logo")));
    }

    #[test]
    fn detach_preserves_sibling_order() {
        let mut forest = sample();
        let logo = detach(&mut forest, id("t_logo")).unwrap();
        assert_eq!(logo.id, id("t_logo"));
        let header = find_node(&forest, id("t_header")).unwrap();
        assert_eq!(header.children().len(), 1);
        assert_eq!(header.children()[0].id, id("t_nav"));
    }

    #[test]
    fn regenerate_gives_disjoint_ids() {
        let forest = sample();
        let copy = regenerate_ids(&forest[0]);
        let before = collect_ids(&forest);
        let after = collect_ids(std::slice::from_ref(&copy));
        assert_eq!(after.len(), 4);
        assert!(before.is_disjoint(&after));
        assert_eq!(copy.children()[1].kind, ComponentType::Container);
    }

    #[test]
    fn placement_sort_orders_by_order_key() {
        let order = |n: i64| Placement {
            order: Some(n),
            align_self: None,
        };
        let children = vec![
            Node::new(id("p_a"), ComponentType::Text).with_placement(order(2)),
            Node::new(id("p_b"), ComponentType::Text).with_placement(order(0)),
            Node::new(id("p_c"), ComponentType::Text).with_placement(order(1)),
        ];
        let sorted: Vec<&str> = placement_sorted(&children)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(sorted, vec!["p_b", "p_c", "p_a"]);
    }
}
