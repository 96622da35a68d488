//! Built-in library of ready-made sections.
//!
//! Templates are stored as clipboard payloads, so instantiating one goes
//! through the same validation and id regeneration as a paste.

use crate::error::TranscodeError;
use crate::model::Node;
use crate::transcode;

/// A named, ready-to-insert section template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrebuiltComponent {
    pub name: &'static str,
    pub description: &'static str,
    template: &'static str,
}

impl PrebuiltComponent {
    /// Parse the template into a node with fresh ids.
    pub fn instantiate(&self) -> Result<Node, TranscodeError> {
        transcode::deserialize(self.template)
    }
}

const CATALOG: &[PrebuiltComponent] = &[
    PrebuiltComponent {
        name: "Navbar",
        description: "Brand, links and a call-to-action in one row",
        template: include_str!("prebuilt/navbar.json"),
    },
    PrebuiltComponent {
        name: "Footer",
        description: "Dark footer with brand and two link columns",
        template: include_str!("prebuilt/footer.json"),
    },
    PrebuiltComponent {
        name: "Hero Section",
        description: "Full-width banner with headline over an image",
        template: include_str!("prebuilt/hero.json"),
    },
    PrebuiltComponent {
        name: "Cards Section",
        description: "Three feature cards side by side",
        template: include_str!("prebuilt/cards.json"),
    },
];

pub fn catalog() -> &'static [PrebuiltComponent] {
    CATALOG
}

/// Case-insensitive lookup by name.
pub fn find(name: &str) -> Option<&'static PrebuiltComponent> {
    CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Instantiate the named template.
///
/// # Errors
/// [`TranscodeError::UnknownPrebuilt`] if no template has that name.
pub fn instantiate(name: &str) -> Result<Node, TranscodeError> {
    find(name)
        .ok_or_else(|| TranscodeError::UnknownPrebuilt(name.to_string()))?
        .instantiate()
}
