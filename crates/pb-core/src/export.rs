//! Export: Document → JSON text or a static HTML page.
//!
//! Both exporters are read-only views of a snapshot.

use crate::model::{ComponentType, Document, Node, PropValue, StyleValue};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Options for [`to_json`] and [`to_html`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// `<title>` used when the document name is blank.
    pub fallback_title: String,
    /// Emit a full `<!DOCTYPE html>` page instead of just the canvas div.
    pub full_page: bool,
    /// Indent JSON output.
    pub pretty_json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fallback_title: "Untitled".to_string(),
            full_page: true,
            pretty_json: true,
        }
    }
}

// ─── JSON ────────────────────────────────────────────────────────────────

/// Serialize the whole document in its persisted shape.
#[must_use]
pub fn to_json(doc: &Document, config: &ExportConfig) -> String {
    let result = if config.pretty_json {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    result.unwrap_or_else(|e| {
        log::error!("to_json: {e}");
        String::new()
    })
}

// ─── HTML ────────────────────────────────────────────────────────────────

/// Props that carry content rather than style, per component type.
fn content_keys(kind: ComponentType) -> &'static [&'static str] {
    match kind {
        ComponentType::Container => &["name"],
        ComponentType::Text => &["content", "italic", "underline"],
        ComponentType::Button => &["text", "content"],
        ComponentType::Image => &["src", "alt"],
        ComponentType::Input => &["label", "placeholder", "kind"],
        ComponentType::Icon => &["name", "size"],
    }
}

/// CSS properties that take bare numbers.
const UNITLESS: [&str; 7] = [
    "order",
    "zIndex",
    "opacity",
    "flexGrow",
    "flexShrink",
    "fontWeight",
    "lineHeight",
];

/// Render a static HTML page for the document.
#[must_use]
pub fn to_html(doc: &Document, config: &ExportConfig) -> String {
    let mut out = String::with_capacity(4096);
    let depth = if config.full_page {
        let title = if doc.name.trim().is_empty() {
            config.fallback_title.as_str()
        } else {
            doc.name.as_str()
        };
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("  <meta charset=\"utf-8\">\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        let _ = writeln!(out, "  <title>{}</title>", escape_text(title));
        out.push_str("</head>\n<body>\n");
        1
    } else {
        0
    };

    let page_style = declarations(doc.styles.iter().map(|(k, v)| (k.as_str(), v.to_css(), is_num(v))));
    indent(&mut out, depth);
    let _ = writeln!(out, "<div class=\"canvas\"{}>", style_attr(&page_style));
    for node in &doc.components {
        emit_node(&mut out, node, None, depth + 1);
    }
    indent(&mut out, depth);
    out.push_str("</div>\n");

    if config.full_page {
        out.push_str("</body>\n</html>\n");
    }
    out
}

fn is_num(v: &StyleValue) -> bool {
    matches!(v, StyleValue::Num(_))
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// `index` is the child's position under its parent, `None` at root.
fn emit_node(out: &mut String, node: &Node, index: Option<usize>, depth: usize) {
    let mut css = node_style(node);
    if let Some(i) = index {
        if node.placement.and_then(|p| p.order).is_some() {
            css.push(("order".to_string(), node.effective_order(i).to_string()));
        }
        if let Some(align) = node.placement.and_then(|p| p.align_self) {
            css.push(("align-self".to_string(), align.as_css().to_string()));
        }
    }
    let style = style_attr(&css);
    let id = escape_attr(node.id.as_str());

    indent(out, depth);
    match node.kind {
        ComponentType::Container => {
            let _ = writeln!(out, "<div id=\"{id}\"{style}>");
            let mut children: Vec<(usize, &Node)> = node.children().iter().enumerate().collect();
            children.sort_by_key(|&(i, child)| child.effective_order(i));
            for (i, child) in children {
                emit_node(out, child, Some(i), depth + 1);
            }
            indent(out, depth);
            out.push_str("</div>\n");
        }
        ComponentType::Text => {
            let text = prop_text(node, "content");
            let _ = writeln!(out, "<p id=\"{id}\"{style}>{}</p>", escape_text(&text));
        }
        ComponentType::Button => {
            let mut text = prop_text(node, "text");
            if text.is_empty() {
                text = prop_text(node, "content");
            }
            let _ = writeln!(out, "<button id=\"{id}\"{style}>{}</button>", escape_text(&text));
        }
        ComponentType::Image => {
            let _ = writeln!(
                out,
                "<img id=\"{id}\" src=\"{}\" alt=\"{}\"{style}>",
                escape_attr(&prop_text(node, "src")),
                escape_attr(&prop_text(node, "alt")),
            );
        }
        ComponentType::Input => {
            let kind = match node.props.get("kind").and_then(PropValue::as_str) {
                Some(k @ ("checkbox" | "radio")) => k,
                _ => "text",
            };
            let label = prop_text(node, "label");
            let _ = writeln!(out, "<label id=\"{id}\"{style}>");
            if kind == "text" {
                if !label.is_empty() {
                    indent(out, depth + 1);
                    let _ = writeln!(out, "<span>{}</span>", escape_text(&label));
                }
                indent(out, depth + 1);
                let _ = writeln!(
                    out,
                    "<input type=\"text\" placeholder=\"{}\">",
                    escape_attr(&prop_text(node, "placeholder"))
                );
            } else {
                indent(out, depth + 1);
                let _ = writeln!(out, "<input type=\"{kind}\">");
                indent(out, depth + 1);
                let _ = writeln!(out, "<span>{}</span>", escape_text(&label));
            }
            indent(out, depth);
            out.push_str("</label>\n");
        }
        ComponentType::Icon => {
            let _ = writeln!(
                out,
                "<span id=\"{id}\" data-icon=\"{}\"{style}></span>",
                escape_attr(&prop_text(node, "name"))
            );
        }
    }
}

fn prop_text(node: &Node, key: &str) -> String {
    node.props.get(key).map(PropValue::to_css).unwrap_or_default()
}

/// Style declarations for a node's props, skipping content keys.
fn node_style(node: &Node) -> Vec<(String, String)> {
    let skip = content_keys(node.kind);
    let mut css = declarations(
        node.props
            .iter()
            .filter(|(k, v)| !skip.contains(&k.as_str()) && !v.is_null())
            .map(|(k, v)| (k.as_str(), v.to_css(), matches!(v, PropValue::Num(_)))),
    );

    match node.kind {
        ComponentType::Text => {
            if node.props.get("italic").and_then(PropValue::as_bool) == Some(true) {
                css.push(("font-style".into(), "italic".into()));
            }
            if node.props.get("underline").and_then(PropValue::as_bool) == Some(true) {
                css.push(("text-decoration".into(), "underline".into()));
            }
        }
        ComponentType::Icon => {
            let size = node.props.get("size").map(PropValue::to_css).unwrap_or_else(|| "24".into());
            let size = if size.chars().all(|c| c.is_ascii_digit() || c == '.') {
                format!("{size}px")
            } else {
                size
            };
            css.push(("display".into(), "inline-block".into()));
            css.push(("width".into(), size.clone()));
            css.push(("height".into(), size));
        }
        _ => {}
    }
    css
}

fn declarations<'a>(
    entries: impl Iterator<Item = (&'a str, String, bool)>,
) -> Vec<(String, String)> {
    entries
        .filter(|(_, value, _)| !value.is_empty())
        .map(|(key, value, numeric)| {
            let value = if key == "backgroundImage" && !value.starts_with("url(") {
                format!("url({value})")
            } else if numeric && !UNITLESS.contains(&key) {
                format!("{value}px")
            } else {
                value
            };
            (kebab_case(key), value)
        })
        .collect()
}

fn style_attr(css: &[(String, String)]) -> String {
    if css.is_empty() {
        return String::new();
    }
    let body: Vec<String> = css.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!(" style=\"{}\"", escape_attr(&body.join("; ")))
}

/// `backgroundColor` → `background-color`.
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;").replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::{AlignSelf, Placement, Styles, props};
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    #[test]
    fn kebab_case_keys() {
        assert_eq!(kebab_case("backgroundColor"), "background-color");
        assert_eq!(kebab_case("padding"), "padding");
        assert_eq!(kebab_case("borderTopLeftRadius"), "border-top-left-radius");
    }

    #[test]
    fn text_is_escaped() {
        let mut doc = Document::new("e", "<Escapes>");
        doc.components = vec![
            Node::new(id("e_text"), ComponentType::Text)
                .with_props(props([("content", "a < b & \"c\"")])),
        ];
        let html = to_html(&doc, &ExportConfig::default());
        assert!(html.contains("<title>&lt;Escapes&gt;</title>"));
        assert!(html.contains("<p id=\"e_text\">a &lt; b &amp; \"c\"</p>"));
    }

    #[test]
    fn fragment_output_for_nested_tree() {
        let row = Node::new(id("h_row"), ComponentType::Container)
            .with_props(props([("flexDirection", "row")]))
            .with_child(
                Node::new(id("h_late"), ComponentType::Button)
                    .with_props(props([("text", "Late")]))
                    .with_placement(Placement {
                        order: Some(5),
                        align_self: Some(AlignSelf::Center),
                    }),
            )
            .with_child(
                Node::new(id("h_img"), ComponentType::Image)
                    .with_props(props([("src", "a.png"), ("alt", "A")])),
            )
            .with_child(
                Node::new(id("h_icon"), ComponentType::Icon)
                    .with_props(props([("name", PropValue::from("Star")), ("size", PropValue::Num(16.0))])),
            );
        let mut styles = Styles::new();
        styles.insert("backgroundColor".into(), StyleValue::from("#fff"));
        styles.insert("padding".into(), StyleValue::Num(0.0));
        let mut doc = Document::new("h", "Fragment").with_styles(styles);
        doc.components = vec![row];

        let config = ExportConfig {
            full_page: false,
            ..ExportConfig::default()
        };
        let expected = "\
<div class=\"canvas\" style=\"background-color: #fff; padding: 0px\">
  <div id=\"h_row\" style=\"flex-direction: row\">
    <img id=\"h_img\" src=\"a.png\" alt=\"A\">
    <span id=\"h_icon\" data-icon=\"Star\" style=\"display: inline-block; width: 16px; height: 16px\"></span>
    <button id=\"h_late\" style=\"order: 5; align-self: center\">Late</button>
  </div>
</div>
";
        assert_eq!(to_html(&doc, &config), expected);
    }

    #[test]
    fn ordered_children_keep_ties_in_tree_order() {
        let order = |n: i64| Placement {
            order: Some(n),
            align_self: None,
        };
        let mut row = Node::new(id("t_row"), ComponentType::Container);
        for (name, placement) in [
            ("t_a", Some(order(1))),
            ("t_b", None),
            ("t_c", Some(order(-2))),
            ("t_d", Some(order(1))),
        ] {
            let child = Node::new(id(name), ComponentType::Text);
            row = row.with_child(match placement {
                Some(p) => child.with_placement(p),
                None => child,
            });
        }
        let mut doc = Document::new("t", "Ties");
        doc.components = vec![row];

        let html = to_html(&doc, &ExportConfig::default());
        let positions: Vec<usize> = ["t_c", "t_a", "t_b", "t_d"]
            .iter()
            .map(|name| html.find(&format!("id=\"{name}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(html.contains("<p id=\"t_c\" style=\"order: -2\">"));
        assert!(html.contains("<p id=\"t_b\"></p>"));
    }

    #[test]
    fn input_kinds_render_label_and_control() {
        let mut doc = Document::new("i", "Inputs");
        doc.components = vec![
            Node::new(id("i_text"), ComponentType::Input)
                .with_props(props([("label", "Email"), ("placeholder", "you@example.com")])),
            Node::new(id("i_box"), ComponentType::Input)
                .with_props(props([("label", "Agree"), ("kind", "checkbox")])),
        ];
        let html = to_html(&doc, &ExportConfig::default());
        assert!(html.contains("<span>Email</span>"));
        assert!(html.contains("<input type=\"text\" placeholder=\"you@example.com\">"));
        assert!(html.contains("<input type=\"checkbox\">"));
    }

    #[test]
    fn background_image_is_wrapped_in_url() {
        let mut doc = Document::new("b", "Bg");
        doc.components = vec![
            Node::new(id("b_box"), ComponentType::Container)
                .with_props(props([("backgroundImage", "hero.jpg")])),
        ];
        let html = to_html(&doc, &ExportConfig::default());
        assert!(html.contains("background-image: url(hero.jpg)"));
    }

    #[test]
    fn json_export_matches_document_shape() {
        let mut doc = Document::new("j", "Json");
        doc.components = vec![Node::new(id("j_box"), ComponentType::Container)];
        let compact = to_json(
            &doc,
            &ExportConfig {
                pretty_json: false,
                ..ExportConfig::default()
            },
        );
        assert_eq!(
            compact,
            r#"{"id":"j","name":"Json","components":[{"id":"j_box","type":"container","props":{},"children":[]}],"styles":{}}"#
        );
        let back: Document = serde_json::from_str(&to_json(&doc, &ExportConfig::default())).unwrap();
        assert_eq!(back, doc);
    }
}
