//! Core document model for page-builder documents.
//!
//! A document is an ordered forest of component nodes plus page-level
//! styles. Parent → child links live only in each container's `children`
//! vector; there are no back-pointers, so "parent of X" is always answered
//! by a tree search (see [`crate::tree`]).
//!
//! Documents are treated as immutable values between operations: the
//! mutation engine clones the snapshot it is handed and returns the edited
//! copy, which keeps every earlier snapshot valid for the history stack.

use crate::error::InvariantError;
use crate::id::NodeId;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// ─── Component Types ─────────────────────────────────────────────────────

/// The closed set of component variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Container,
    Text,
    Button,
    Image,
    Input,
    Icon,
}

impl ComponentType {
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Container,
        ComponentType::Text,
        ComponentType::Button,
        ComponentType::Image,
        ComponentType::Input,
        ComponentType::Icon,
    ];

    /// Only containers own a `children` vector.
    pub fn is_container(self) -> bool {
        matches!(self, ComponentType::Container)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Container => "container",
            ComponentType::Text => "text",
            ComponentType::Button => "button",
            ComponentType::Image => "image",
            ComponentType::Input => "input",
            ComponentType::Icon => "icon",
        }
    }

    /// Parse the lowercase wire name (`"container"`, `"text"`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Human-readable label used by palettes and toasts.
    pub fn label(self) -> &'static str {
        match self {
            ComponentType::Container => "Container",
            ComponentType::Text => "Text",
            ComponentType::Button => "Button",
            ComponentType::Image => "Image",
            ComponentType::Input => "Input",
            ComponentType::Icon => "Icon",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Property Values ─────────────────────────────────────────────────────

/// `n` as an integer when it has no fractional part and fits exactly.
fn whole(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.abs() < 1e15).then_some(n as i64)
}

fn format_num(n: f64) -> String {
    whole(n).map_or_else(|| n.to_string(), |i| i.to_string())
}

/// Whole numbers are written as integers (`24`, not `24.0`).
fn serialize_num<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match whole(*n) {
        Some(i) => serializer.serialize_i64(i),
        None => serializer.serialize_f64(*n),
    }
}

/// A single property value. `Null` is the "unset" sentinel: in a props-only
/// update it removes the key instead of storing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Num(#[serde(serialize_with = "serialize_num")] f64),
    Str(String),
    Null,
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    /// Render the value the way it would appear in a CSS declaration or
    /// HTML attribute. `Null` renders as the empty string.
    pub fn to_css(&self) -> String {
        match self {
            PropValue::Str(s) => s.clone(),
            PropValue::Num(n) => format_num(*n),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Null => String::new(),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Num(n)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Num(n as f64)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

/// The open property bag carried by every node. Ordered so serialized
/// output is stable.
pub type Props = BTreeMap<String, PropValue>;

/// Build a `Props` map from `(key, value)` pairs.
pub fn props<K, V, I>(pairs: I) -> Props
where
    K: Into<String>,
    V: Into<PropValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Page-level style value: string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Num(#[serde(serialize_with = "serialize_num")] f64),
    Str(String),
}

impl StyleValue {
    pub fn to_css(&self) -> String {
        match self {
            StyleValue::Str(s) => s.clone(),
            StyleValue::Num(n) => format_num(*n),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Str(s.to_string())
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Num(n)
    }
}

pub type Styles = BTreeMap<String, StyleValue>;

// ─── Child Placement ─────────────────────────────────────────────────────

/// Cross-axis alignment of a child inside a row container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignSelf {
    #[default]
    Auto,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
    Stretch,
}

impl AlignSelf {
    pub fn as_css(self) -> &'static str {
        match self {
            AlignSelf::Auto => "auto",
            AlignSelf::FlexStart => "flex-start",
            AlignSelf::FlexEnd => "flex-end",
            AlignSelf::Center => "center",
            AlignSelf::Baseline => "baseline",
            AlignSelf::Stretch => "stretch",
        }
    }
}

/// Layout hint for a child of a row container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_self: Option<AlignSelf>,
}

impl Placement {
    /// Overwrite only the fields that `other` sets.
    pub fn merge(&mut self, other: &Placement) {
        if other.order.is_some() {
            self.order = other.order;
        }
        if other.align_self.is_some() {
            self.align_self = other.align_self;
        }
    }
}

// ─── Component Nodes ─────────────────────────────────────────────────────

/// A single component in the document forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique, immutable for the node's lifetime.
    pub id: NodeId,

    #[serde(rename = "type")]
    pub kind: ComponentType,

    /// Optional display label shown in the layers panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub props: Props,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    /// `Some` for containers (possibly empty), `None` for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,

    /// Image child promoted to this container's background, kept so the
    /// promotion can be reversed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_source: Option<Box<Node>>,
}

impl Node {
    pub fn new(id: NodeId, kind: ComponentType) -> Self {
        Self {
            id,
            kind,
            name: None,
            props: Props::new(),
            placement: None,
            children: kind.is_container().then(Vec::new),
            background_source: None,
        }
    }

    /// A node of `kind` with a freshly generated id.
    pub fn new_of_type(kind: ComponentType) -> Self {
        Self::new(NodeId::generate(), kind)
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Append a child. Has no effect on leaf nodes.
    pub fn with_child(mut self, child: Node) -> Self {
        if let Some(children) = self.children.as_mut() {
            children.push(child);
        }
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Children as a slice; empty for leaves.
    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Sort key among siblings: explicit `placement.order`, else position.
    pub fn effective_order(&self, index: usize) -> i64 {
        self.placement
            .and_then(|p| p.order)
            .unwrap_or(index as i64)
    }

    pub fn effective_align_self(&self) -> AlignSelf {
        self.placement
            .and_then(|p| p.align_self)
            .unwrap_or_default()
    }

    /// Label for layer lists: the user name if set, else the type label.
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => self.kind.label(),
        }
    }

    /// Enforce the children-shape rule recursively: containers always carry
    /// a (possibly empty) vector, leaves never do. Returns `true` if any
    /// leaf had children that were dropped.
    pub fn normalize(&mut self) -> bool {
        let mut dropped = false;
        if self.kind.is_container() {
            let children = self.children.get_or_insert_with(Vec::new);
            for child in children.iter_mut() {
                dropped |= child.normalize();
            }
        } else if self.children.take().is_some_and(|c| !c.is_empty()) {
            dropped = true;
        }
        if let Some(source) = self.background_source.as_mut() {
            dropped |= source.normalize();
        }
        dropped
    }
}

/// Partial update for [`crate::mutations::update_component`].
///
/// When only `props` (and optionally `name`/`placement`) is supplied, the
/// props are shallow-merged into the node. Supplying `kind` or `children`
/// switches to whole-field replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComponentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl NodePatch {
    pub fn props(props: Props) -> Self {
        Self {
            props: Some(props),
            ..Default::default()
        }
    }

    /// True when the patch takes the props-merge path.
    pub fn is_props_merge(&self) -> bool {
        self.props.is_some() && self.kind.is_none() && self.children.is_none()
    }
}

/// Direction for sibling swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Previous,
    Next,
}

impl MoveDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "previous" | "prev" | "up" => Some(MoveDirection::Previous),
            "next" | "down" => Some(MoveDirection::Next),
            _ => None,
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// One editable page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub components: Vec<Node>,
    #[serde(default)]
    pub styles: Styles,
}

impl Document {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            components: Vec::new(),
            styles: Styles::new(),
        }
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// A new blank document with a generated `doc-<time>` id.
    pub fn blank(name: impl Into<String>, styles: Styles) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let id = format!("doc-{millis:x}-{:04x}", rand::random::<u16>());
        Self::new(id, name).with_styles(styles)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Normalize every node's children shape. Returns `true` if anything
    /// was dropped.
    pub fn normalize(&mut self) -> bool {
        let mut dropped = false;
        for node in &mut self.components {
            dropped |= node.normalize();
        }
        dropped
    }

    /// Verify the forest invariant: every node id, including nodes parked
    /// as container backgrounds, occurs exactly once.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut seen = HashSet::new();
        check_unique(&self.components, &mut seen)
    }
}

fn check_unique(nodes: &[Node], seen: &mut HashSet<NodeId>) -> Result<(), InvariantError> {
    for node in nodes {
        if !seen.insert(node.id) {
            return Err(InvariantError::DuplicateId(node.id.as_str().to_string()));
        }
        check_unique(node.children(), seen)?;
        if let Some(source) = &node.background_source {
            check_unique(std::slice::from_ref(source.as_ref()), seen)?;
        }
    }
    Ok(())
}
