//! Export configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Every value has a
//! stock default; a user file only overrides the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [brand]
//! primary_color = "#0b3d6e"   # Headings, table headers, cover rule
//! accent_color = "#c8a24a"    # Section header underline
//! english_font = "Calibri"
//! arabic_font = "Simplified Arabic"
//! font_size_pt = 11
//! logo = ""                   # Path to the cover logo (empty = none)
//!
//! [cover]
//! organization = "Bank"
//! arabic_label = "عنوان السياسة"
//!
//! [page]
//! size = "A4"
//! margin = "2.54cm"
//!
//! [approval]
//! headers = ["Version", "Date", "Description", "Approved By"]
//! rows = [["1.0", "", "Initial issue", ""]]
//!
//! [footer]
//! text = "Internal Use Only"
//!
//! [processing]
//! max_processes = 4           # Batch render workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Export configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocConfig {
    /// Colors, fonts, and logo.
    pub brand: BrandConfig,
    /// Cover page labels.
    pub cover: CoverConfig,
    /// Word page setup.
    pub page: PageConfig,
    /// The approval table on the last page.
    pub approval: ApprovalConfig,
    /// Footer text.
    pub footer: FooterConfig,
    /// Batch rendering settings.
    pub processing: ProcessingConfig,
}

impl DocConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("brand.primary_color", &self.brand.primary_color),
            ("brand.accent_color", &self.brand.accent_color),
        ] {
            if !value.starts_with('#') {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a hex color like #0b3d6e"
                )));
            }
        }
        if !(6..=72).contains(&self.brand.font_size_pt) {
            return Err(ConfigError::Validation(
                "brand.font_size_pt must be 6-72".into(),
            ));
        }
        if self.approval.headers.is_empty() {
            return Err(ConfigError::Validation(
                "approval.headers must not be empty".into(),
            ));
        }
        let width = self.approval.headers.len();
        if let Some(pos) = self.approval.rows.iter().position(|r| r.len() != width) {
            return Err(ConfigError::Validation(format!(
                "approval.rows[{pos}] must have {width} cells"
            )));
        }
        Ok(())
    }
}

/// Brand styling constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandConfig {
    pub primary_color: String,
    pub accent_color: String,
    /// Font family for left-to-right text.
    pub english_font: String,
    /// Font family for right-to-left text.
    pub arabic_font: String,
    pub font_size_pt: u32,
    /// Logo image path, relative to the config directory. Empty means none.
    pub logo: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            primary_color: "#0b3d6e".to_string(),
            accent_color: "#c8a24a".to_string(),
            english_font: "Calibri".to_string(),
            arabic_font: "Simplified Arabic".to_string(),
            font_size_pt: 11,
            logo: String::new(),
        }
    }
}

/// Cover page labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverConfig {
    pub organization: String,
    /// Fixed Arabic label printed under the title.
    pub arabic_label: String,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            organization: "Bank".to_string(),
            arabic_label: "عنوان السياسة".to_string(),
        }
    }
}

/// Page setup for the Word section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub size: String,
    pub margin: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: "A4".to_string(),
            margin: "2.54cm".to_string(),
        }
    }
}

/// Static approval table rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApprovalConfig {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            headers: ["Version", "Date", "Description", "Approved By"]
                .map(String::from)
                .to_vec(),
            rows: vec![
                ["1.0", "", "Initial issue", ""]
                    .map(String::from)
                    .to_vec(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterConfig {
    pub text: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            text: "Internal Use Only".to_string(),
        }
    }
}

/// Batch rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of documents rendered in parallel.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never less than one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(DocConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<DocConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DocConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<DocConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# policy-doc configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Brand styling
# ---------------------------------------------------------------------------
[brand]
# Headings, table header background, cover rule.
primary_color = "#0b3d6e"
# Underline under section headers.
accent_color = "#c8a24a"
# Font families for left-to-right and right-to-left text.
english_font = "Calibri"
arabic_font = "Simplified Arabic"
# Body font size in points (6-72).
font_size_pt = 11
# Cover logo, relative to this directory. Empty for no logo.
logo = ""

# ---------------------------------------------------------------------------
# Cover page
# ---------------------------------------------------------------------------
[cover]
organization = "Bank"
# Fixed Arabic label printed under the document title.
arabic_label = "عنوان السياسة"

# ---------------------------------------------------------------------------
# Page setup
# ---------------------------------------------------------------------------
[page]
size = "A4"
margin = "2.54cm"

# ---------------------------------------------------------------------------
# Approval table (last page)
# ---------------------------------------------------------------------------
[approval]
headers = ["Version", "Date", "Description", "Approved By"]
# Every row needs one cell per header.
rows = [["1.0", "", "Initial issue", ""]]

# ---------------------------------------------------------------------------
# Footer
# ---------------------------------------------------------------------------
[footer]
text = "Internal Use Only"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum documents rendered in parallel by `render <DIR>`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate the Word-HTML stylesheet from brand and page settings.
pub fn generate_brand_css(brand: &BrandConfig, page: &PageConfig) -> String {
    format!(
        r#"@page WordSection1 {{
    size: {size};
    margin: {margin};
}}
div.WordSection1 {{ page: WordSection1; }}
body {{
    font-family: '{english_font}', sans-serif;
    font-size: {font_size}pt;
}}
[dir="rtl"] {{
    font-family: '{arabic_font}', serif;
    text-align: right;
    direction: rtl;
}}
h1, h2, h3, h4 {{ color: {primary}; }}
.section-header {{ border-bottom: 2pt solid {accent}; margin-top: 18pt; }}
.subsection-header {{ margin-top: 12pt; }}
.cover {{ text-align: center; margin-top: 120pt; }}
.cover-title {{ font-size: 26pt; border-top: 3pt solid {primary}; padding-top: 12pt; }}
.toc-subsection {{ margin-left: 24pt; }}
table.doc-table {{ border-collapse: collapse; width: 100%; margin: 8pt 0; }}
table.doc-table th {{ background: {primary}; color: #ffffff; }}
table.doc-table th, table.doc-table td {{ border: 1pt solid #999999; padding: 4pt; }}
.footer {{ font-size: 9pt; text-align: center; color: #666666; }}"#,
        size = page.size,
        margin = page.margin,
        english_font = brand.english_font,
        arabic_font = brand.arabic_font,
        font_size = brand.font_size_pt,
        primary = brand.primary_color,
        accent = brand.accent_color,
    )
}
