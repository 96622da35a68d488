//! Mutation engine: pure snapshot → snapshot transforms.
//!
//! Every operation borrows the current [`Document`] and returns
//! `Some(next)` with the edit applied to a private copy, or `None` when the
//! operation does not apply (unknown id, non-container target, boundary
//! move). The input snapshot is never touched, which is what lets the
//! history stack keep earlier snapshots without copying them at capture
//! time.
//!
//! Callers that need "always a document" semantics can write
//! `op(&doc, ..).unwrap_or(doc)`.

use crate::id::NodeId;
use crate::model::*;
use crate::tree::{self, find_node, find_node_mut, find_siblings_mut};
use serde::{Deserialize, Serialize};

/// Prop key a promoted background image is written to.
pub const BACKGROUND_IMAGE_PROP: &str = "backgroundImage";

// ─── Structural operations ───────────────────────────────────────────────

/// Append `node` to the root sequence, or to the children of the container
/// `parent`. `node` must already carry fresh ids.
pub fn add_component(doc: &Document, node: Node, parent: Option<NodeId>) -> Option<Document> {
    let Some(parent_id) = parent else {
        let mut next = doc.clone();
        next.components.push(node);
        return Some(next);
    };

    match find_node(&doc.components, parent_id) {
        Some(target) if target.is_container() => {}
        Some(_) => {
            log::debug!("add_component: {parent_id} is not a container");
            return None;
        }
        None => {
            log::debug!("add_component: parent {parent_id} not found");
            return None;
        }
    }

    let mut next = doc.clone();
    let target = find_node_mut(&mut next.components, parent_id)?;
    target.children.get_or_insert_with(Vec::new).push(node);
    Some(next)
}

/// Remove the node with `id` and its whole subtree, wherever it lives.
pub fn remove_component(doc: &Document, id: NodeId) -> Option<Document> {
    if !tree::contains(&doc.components, id) {
        log::debug!("remove_component: {id} not found");
        return None;
    }
    let mut next = doc.clone();
    tree::detach(&mut next.components, id)?;
    Some(next)
}

/// Apply a partial update to the node with `id`.
///
/// A props-only patch shallow-merges into the existing props; a `Null`
/// value removes that key. A patch that carries `kind` or `children`
/// replaces those fields (and `props`, if given) wholesale. In both cases
/// `name` and `placement` are applied when present.
pub fn update_component(doc: &Document, id: NodeId, patch: &NodePatch) -> Option<Document> {
    if !tree::contains(&doc.components, id) {
        log::debug!("update_component: {id} not found");
        return None;
    }
    let mut next = doc.clone();
    let node = find_node_mut(&mut next.components, id)?;

    if patch.is_props_merge() {
        if let Some(props) = &patch.props {
            merge_props(&mut node.props, props);
        }
    } else {
        if let Some(kind) = patch.kind {
            node.kind = kind;
        }
        if let Some(props) = &patch.props {
            node.props = props
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }
        if node.kind.is_container() {
            if let Some(children) = &patch.children {
                node.children = Some(children.clone());
            }
        } else if patch.children.as_ref().is_some_and(|c| !c.is_empty()) {
            log::warn!("update_component: dropping children supplied for leaf {id}");
        }
        node.normalize();
    }

    if let Some(name) = &patch.name {
        node.name = Some(name.clone());
    }
    if let Some(placement) = &patch.placement {
        node.placement.get_or_insert_with(Placement::default).merge(placement);
    }
    Some(next)
}

fn merge_props(target: &mut Props, update: &Props) {
    for (key, value) in update {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Merge `order` / `alignSelf` into the node's placement hint.
pub fn update_child_placement(doc: &Document, id: NodeId, placement: Placement) -> Option<Document> {
    if !tree::contains(&doc.components, id) {
        log::debug!("update_child_placement: {id} not found");
        return None;
    }
    let mut next = doc.clone();
    let node = find_node_mut(&mut next.components, id)?;
    node.placement.get_or_insert_with(Placement::default).merge(&placement);
    Some(next)
}

/// Swap the node with its previous or next sibling. `None` at either end
/// of the sibling vector.
pub fn move_component(doc: &Document, id: NodeId, direction: MoveDirection) -> Option<Document> {
    let loc = tree::find_node_and_parent(&doc.components, id)?;
    let len = match loc.parent {
        Some(parent) => parent.children().len(),
        None => doc.components.len(),
    };
    let neighbor = match direction {
        MoveDirection::Previous => loc.index.checked_sub(1)?,
        MoveDirection::Next if loc.index + 1 < len => loc.index + 1,
        MoveDirection::Next => return None,
    };

    let mut next = doc.clone();
    let (siblings, index) = find_siblings_mut(&mut next.components, id)?;
    siblings.swap(index, neighbor);
    Some(next)
}

/// Set the display name of the node with `id`. An empty name clears it.
pub fn rename_component(doc: &Document, id: NodeId, name: &str) -> Option<Document> {
    if !tree::contains(&doc.components, id) {
        log::debug!("rename_component: {id} not found");
        return None;
    }
    let mut next = doc.clone();
    let node = find_node_mut(&mut next.components, id)?;
    node.name = (!name.is_empty()).then(|| name.to_string());
    Some(next)
}

/// Move a node under a different container (or to root level when
/// `new_parent` is `None`) at `index`, clamped to the end.
///
/// Refuses targets that are leaves, the node itself, or one of its own
/// descendants.
pub fn reparent_component(
    doc: &Document,
    id: NodeId,
    new_parent: Option<NodeId>,
    index: Option<usize>,
) -> Option<Document> {
    if !tree::contains(&doc.components, id) {
        return None;
    }
    if let Some(parent_id) = new_parent {
        let target = find_node(&doc.components, parent_id)?;
        if !target.is_container()
            || parent_id == id
            || tree::is_descendant_of(&doc.components, id, parent_id)
        {
            log::debug!("reparent_component: {parent_id} is not a valid parent for {id}");
            return None;
        }
    }

    let mut next = doc.clone();
    let node = tree::detach(&mut next.components, id)?;
    let siblings = match new_parent {
        Some(parent_id) => find_node_mut(&mut next.components, parent_id)?
            .children
            .get_or_insert_with(Vec::new),
        None => &mut next.components,
    };
    let at = index.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(at, node);
    Some(next)
}

// ─── Background promotion ────────────────────────────────────────────────

/// Turn the image child `image_id` of `container_id` into the container's
/// background: the child is removed, its `src` becomes
/// `backgroundImage: url(...)`, and the node itself is parked on the
/// container so [`restore_background_child`] can undo the promotion.
pub fn promote_child_to_background(
    doc: &Document,
    container_id: NodeId,
    image_id: NodeId,
) -> Option<Document> {
    let container = find_node(&doc.components, container_id)?;
    if !container.is_container() || container.background_source.is_some() {
        return None;
    }
    let index = container.children().iter().position(|c| c.id == image_id)?;
    let image = &container.children()[index];
    let src = image.props.get("src").and_then(PropValue::as_str)?;
    if image.kind != ComponentType::Image || src.is_empty() {
        return None;
    }
    let background = format!("url({src})");

    let mut next = doc.clone();
    let container = find_node_mut(&mut next.components, container_id)?;
    let image = container.children.as_mut()?.remove(index);
    container
        .props
        .insert(BACKGROUND_IMAGE_PROP.to_string(), PropValue::Str(background));
    container.background_source = Some(Box::new(image));
    Some(next)
}

/// Reverse of [`promote_child_to_background`]: the parked image goes back
/// as the container's first child and the background is cleared.
pub fn restore_background_child(doc: &Document, container_id: NodeId) -> Option<Document> {
    let container = find_node(&doc.components, container_id)?;
    container.background_source.as_ref()?;

    let mut next = doc.clone();
    let container = find_node_mut(&mut next.components, container_id)?;
    let image = container.background_source.take()?;
    container.props.remove(BACKGROUND_IMAGE_PROP);
    container
        .children
        .get_or_insert_with(Vec::new)
        .insert(0, *image);
    Some(next)
}

// ─── Page-level operations ───────────────────────────────────────────────

/// Shallow-merge into the page styles.
pub fn set_page_styles(doc: &Document, styles: &Styles) -> Option<Document> {
    let mut next = doc.clone();
    for (key, value) in styles {
        next.styles.insert(key.clone(), value.clone());
    }
    Some(next)
}

pub fn set_page_name(doc: &Document, name: &str) -> Option<Document> {
    let mut next = doc.clone();
    next.name = name.to_string();
    Some(next)
}

// ─── Mutation values ─────────────────────────────────────────────────────

/// A mutation as a value, so controllers can route every edit through one
/// commit path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    Add {
        node: Box<Node>,
        parent: Option<NodeId>,
    },
    Remove {
        id: NodeId,
    },
    Update {
        id: NodeId,
        patch: NodePatch,
    },
    UpdatePlacement {
        id: NodeId,
        placement: Placement,
    },
    Move {
        id: NodeId,
        direction: MoveDirection,
    },
    Rename {
        id: NodeId,
        name: String,
    },
    Reparent {
        id: NodeId,
        parent: Option<NodeId>,
        index: Option<usize>,
    },
    PromoteToBackground {
        container: NodeId,
        image: NodeId,
    },
    RestoreBackground {
        container: NodeId,
    },
    SetPageStyles {
        styles: Styles,
    },
    SetPageName {
        name: String,
    },
}

impl Mutation {
    /// Apply to `doc`, returning the next snapshot or `None` for a no-op.
    pub fn apply(&self, doc: &Document) -> Option<Document> {
        match self {
            Mutation::Add { node, parent } => add_component(doc, (**node).clone(), *parent),
            Mutation::Remove { id } => remove_component(doc, *id),
            Mutation::Update { id, patch } => update_component(doc, *id, patch),
            Mutation::UpdatePlacement { id, placement } => {
                update_child_placement(doc, *id, *placement)
            }
            Mutation::Move { id, direction } => move_component(doc, *id, *direction),
            Mutation::Rename { id, name } => rename_component(doc, *id, name),
            Mutation::Reparent { id, parent, index } => {
                reparent_component(doc, *id, *parent, *index)
            }
            Mutation::PromoteToBackground { container, image } => {
                promote_child_to_background(doc, *container, *image)
            }
            Mutation::RestoreBackground { container } => restore_background_child(doc, *container),
            Mutation::SetPageStyles { styles } => set_page_styles(doc, styles),
            Mutation::SetPageName { name } => set_page_name(doc, name),
        }
    }

    /// Short description for undo/redo affordances.
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::Add { .. } => "add component",
            Mutation::Remove { .. } => "remove component",
            Mutation::Update { .. } => "update component",
            Mutation::UpdatePlacement { .. } => "update placement",
            Mutation::Move { .. } => "move component",
            Mutation::Rename { .. } => "rename component",
            Mutation::Reparent { .. } => "reparent component",
            Mutation::PromoteToBackground { .. } => "set image as background",
            Mutation::RestoreBackground { .. } => "restore background image",
            Mutation::SetPageStyles { .. } => "page styles",
            Mutation::SetPageName { .. } => "page name",
        }
    }
}
