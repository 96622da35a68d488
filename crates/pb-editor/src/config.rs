//! Editor configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes.

use crate::error::EditorError;
use pb_core::export::ExportConfig;
use pb_core::{StyleValue, Styles};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum retained history snapshots (0 = unlimited).
    pub history_limit: usize,
    /// Quiet period before a pending change is written.
    pub autosave_delay_ms: u64,
    /// How long the "saved" indicator stays up before going idle.
    pub saved_indicator_ms: u64,
    pub default_document_name: String,
    /// Page styles applied to every new document.
    pub default_page_styles: Styles,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let mut styles = Styles::new();
        styles.insert("backgroundColor".into(), StyleValue::from("#ffffff"));
        styles.insert("padding".into(), StyleValue::from("0"));
        styles.insert("margin".into(), StyleValue::from("0"));
        styles.insert("minHeight".into(), StyleValue::from("calc(100vh - 40px)"));
        styles.insert("border".into(), StyleValue::from("1px solid #eee"));
        Self {
            history_limit: 200,
            autosave_delay_ms: 1500,
            saved_indicator_ms: 3000,
            default_document_name: "New Project".to_string(),
            default_page_styles: styles,
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config, filling absent keys from [`Default`].
    pub fn from_json(text: &str) -> Result<Self, EditorError> {
        serde_json::from_str(text).map_err(|e| EditorError::Config(e.to_string()))
    }
}
