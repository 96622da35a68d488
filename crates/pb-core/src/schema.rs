//! Per-type lookup tables: palette defaults and property-editor schemas.
//!
//! The mutation engine never consults these; they exist so front ends can
//! build palettes and inspector forms from one table keyed by
//! [`ComponentType`].

use crate::model::{ComponentType, Node, PropValue, Props, props};

// ─── Palette defaults ────────────────────────────────────────────────────

/// Default props for a node freshly added from the palette.
pub fn palette_defaults(kind: ComponentType) -> Props {
    match kind {
        ComponentType::Container => props([
            ("padding", "20px"),
            ("display", "flex"),
            ("flexDirection", "column"),
            ("gap", "10px"),
        ]),
        ComponentType::Text => props([("content", "Type something..."), ("fontSize", "16px")]),
        ComponentType::Button => props([
            ("text", "Click me"),
            ("padding", "10px 20px"),
            ("backgroundColor", "#2563eb"),
            ("color", "#ffffff"),
            ("border", "none"),
            ("borderRadius", "8px"),
            ("width", "auto"),
            ("height", "auto"),
        ]),
        ComponentType::Image => props([
            ("src", "https://via.placeholder.com/150"),
            ("width", "150px"),
            ("height", "150px"),
            ("alt", "Placeholder"),
        ]),
        ComponentType::Input => props([
            ("label", "Field Label"),
            ("placeholder", "Enter value..."),
            ("kind", "text"),
            ("width", "auto"),
            ("height", "auto"),
        ]),
        ComponentType::Icon => {
            let mut p = props([("name", "Square"), ("color", "#111827")]);
            p.insert("size".into(), PropValue::Num(24.0));
            p
        }
    }
}

/// A palette node: fresh id, default props overlaid with `overrides`.
pub fn palette_node(kind: ComponentType, overrides: Props) -> Node {
    let mut props = palette_defaults(kind);
    for (key, value) in overrides {
        if value.is_null() {
            props.remove(&key);
        } else {
            props.insert(key, value);
        }
    }
    Node::new_of_type(kind).with_props(props)
}

// ─── Inspector schema ────────────────────────────────────────────────────

/// Which form widget edits a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Number,
    Color,
    Select,
    Toggle,
    /// Four-sided shorthand (padding / margin).
    Box,
    ButtonGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlDefinition {
    pub prop: &'static str,
    pub label: &'static str,
    pub control: ControlKind,
    pub options: &'static [ControlOption],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDefinition {
    pub title: &'static str,
    pub controls: &'static [ControlDefinition],
}

const fn control(prop: &'static str, label: &'static str, control: ControlKind) -> ControlDefinition {
    ControlDefinition {
        prop,
        label,
        control,
        options: &[],
    }
}

const fn select(
    prop: &'static str,
    label: &'static str,
    options: &'static [ControlOption],
) -> ControlDefinition {
    ControlDefinition {
        prop,
        label,
        control: ControlKind::Select,
        options,
    }
}

const fn opt(value: &'static str, label: &'static str) -> ControlOption {
    ControlOption { value, label }
}

const SIZING: GroupDefinition = GroupDefinition {
    title: "Sizing & Spacing",
    controls: &[
        control("width", "Width", ControlKind::Text),
        control("height", "Height", ControlKind::Text),
        control("padding", "Padding", ControlKind::Box),
        control("margin", "Margin", ControlKind::Box),
    ],
};

const TYPOGRAPHY: GroupDefinition = GroupDefinition {
    title: "Typography",
    controls: &[
        control("fontSize", "Font Size", ControlKind::Text),
        control("color", "Color", ControlKind::Color),
        ControlDefinition {
            prop: "textAlign",
            label: "Align",
            control: ControlKind::ButtonGroup,
            options: &[
                opt("left", "Left"),
                opt("center", "Center"),
                opt("right", "Right"),
                opt("justify", "Justify"),
            ],
        },
        select("fontWeight", "Weight", &[opt("normal", "Normal"), opt("bold", "Bold")]),
        control("italic", "Italic", ControlKind::Toggle),
        control("underline", "Underline", ControlKind::Toggle),
    ],
};

const CONTAINER_GROUPS: &[GroupDefinition] = &[
    GroupDefinition {
        title: "Layout",
        controls: &[
            select(
                "display",
                "Display",
                &[opt("flex", "Flex"), opt("grid", "Grid"), opt("block", "Block")],
            ),
            select("flexDirection", "Direction", &[opt("row", "Row"), opt("column", "Column")]),
            select(
                "justifyContent",
                "Justify",
                &[
                    opt("flex-start", "Start"),
                    opt("center", "Center"),
                    opt("flex-end", "End"),
                    opt("space-between", "Space Between"),
                ],
            ),
            select(
                "alignItems",
                "Align",
                &[
                    opt("flex-start", "Start"),
                    opt("center", "Center"),
                    opt("flex-end", "End"),
                    opt("stretch", "Stretch"),
                ],
            ),
            control("gap", "Gap", ControlKind::Text),
        ],
    },
    GroupDefinition {
        title: "Appearance",
        controls: &[
            control("backgroundColor", "Background", ControlKind::Color),
            control("borderRadius", "Radius", ControlKind::Text),
            control("border", "Border", ControlKind::Text),
            control("backgroundImage", "Background Image URL", ControlKind::Text),
        ],
    },
    SIZING,
];

const TEXT_GROUPS: &[GroupDefinition] = &[
    GroupDefinition {
        title: "Content",
        controls: &[control("content", "Text", ControlKind::Text)],
    },
    TYPOGRAPHY,
    SIZING,
];

const BUTTON_GROUPS: &[GroupDefinition] = &[
    GroupDefinition {
        title: "Content",
        controls: &[control("text", "Label", ControlKind::Text)],
    },
    GroupDefinition {
        title: "Appearance",
        controls: &[
            control("backgroundColor", "Background", ControlKind::Color),
            control("color", "Text Color", ControlKind::Color),
            control("border", "Border", ControlKind::Text),
            control("borderRadius", "Radius", ControlKind::Text),
        ],
    },
    SIZING,
];

const IMAGE_GROUPS: &[GroupDefinition] = &[
    GroupDefinition {
        title: "Source",
        controls: &[
            control("src", "Image URL", ControlKind::Text),
            control("alt", "Alt Text", ControlKind::Text),
            select(
                "objectFit",
                "Fit",
                &[
                    opt("fill", "Fill"),
                    opt("contain", "Contain"),
                    opt("cover", "Cover"),
                    opt("none", "None"),
                ],
            ),
        ],
    },
    SIZING,
];

const INPUT_GROUPS: &[GroupDefinition] = &[
    GroupDefinition {
        title: "Field",
        controls: &[
            control("label", "Label", ControlKind::Text),
            control("placeholder", "Placeholder", ControlKind::Text),
            select(
                "kind",
                "Kind",
                &[opt("text", "Text"), opt("checkbox", "Checkbox"), opt("radio", "Radio")],
            ),
        ],
    },
    SIZING,
];

const ICON_GROUPS: &[GroupDefinition] = &[GroupDefinition {
    title: "Icon",
    controls: &[
        control("name", "Icon", ControlKind::Text),
        control("size", "Size", ControlKind::Number),
        control("color", "Color", ControlKind::Color),
    ],
}];

/// Inspector groups for a component type.
pub fn editor_groups(kind: ComponentType) -> &'static [GroupDefinition] {
    match kind {
        ComponentType::Container => CONTAINER_GROUPS,
        ComponentType::Text => TEXT_GROUPS,
        ComponentType::Button => BUTTON_GROUPS,
        ComponentType::Image => IMAGE_GROUPS,
        ComponentType::Input => INPUT_GROUPS,
        ComponentType::Icon => ICON_GROUPS,
    }
}

/// Look up the control editing `prop` on `kind`, if any.
pub fn find_control(kind: ComponentType, prop: &str) -> Option<&'static ControlDefinition> {
    editor_groups(kind)
        .iter()
        .flat_map(|g| g.controls.iter())
        .find(|c| c.prop == prop)
}
