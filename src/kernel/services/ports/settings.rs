use serde::{Deserialize, Serialize};

pub const DEFAULT_PREVIEW_DEBOUNCE_MS: u64 = 120;
pub const DEFAULT_SIDEBAR_WIDTH: u16 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Store root; the working directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_root: Option<String>,
    /// Directory holding the statically served copy used as fetch fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_root: Option<String>,
    pub preview_debounce_ms: u64,
    pub sidebar_width: u16,
    pub theme: ThemeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docs_root: None,
            static_root: None,
            preview_debounce_ms: DEFAULT_PREVIEW_DEBOUNCE_MS,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
            theme: ThemeSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive_border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_active_bg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_fg: Option<String>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            focus_border: Some("cyan".to_string()),
            inactive_border: Some("dark_gray".to_string()),
            accent_fg: Some("yellow".to_string()),
            header_fg: Some("cyan".to_string()),
            error_fg: Some("light_red".to_string()),
            nav_active_bg: Some("dark_gray".to_string()),
            heading_fg: Some("light_cyan".to_string()),
            link_fg: Some("light_blue".to_string()),
            code_fg: Some("light_yellow".to_string()),
            quote_fg: Some("gray".to_string()),
            diagram_fg: Some("light_green".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
