//! shengyun-core
//!
//! Builds the finals keyboards of the shengyun (声韵) Trime skin. A finals
//! layer exists for every initial; each of its keys types initial + final.
//!
//! Public API:
//! - `PhoneticTable` - which finals combine with which initial (TSV)
//! - `MaskConfig` - hand-maintained masked finals per initial
//! - `LayoutGrid` - the finals grid (CSV)
//! - `KeyboardStyle` - builds `Keyboard`s from the inputs above
//! - `TrimeDocument`, `splice_lines` - merge the result into a skin file
//! - `GeneratorConfig` - configuration and default paths
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod phonetic;
pub use phonetic::{PhoneticTable, INITIALS_ORDER, ZERO_INITIAL};

pub mod mask;
pub use mask::MaskConfig;

pub mod layout;
pub use layout::{row_width, Cell, LayoutGrid};

pub mod spelling;

pub mod keyboard;
pub use keyboard::{Key, Keyboard, KeyboardStyle, PresetKey};

pub mod render;
pub use render::render_keyboard;

pub mod document;
pub use document::{splice_lines, Region, TrimeDocument};

pub mod generate;
pub use generate::{generate_legacy, generate_table_mode, merge_table_mode, LegacyOutput, MergeReport};

/// Input and output locations, relative to the working directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Initial × final syllable table (TSV)
    pub table: PathBuf,
    /// Finals grid for the table-driven keyboards (CSV)
    pub layout: PathBuf,
    /// 4-row finals grid for the hand-masked keyboards (CSV)
    pub legacy_layout: PathBuf,
    /// Masked finals per initial
    pub mask: PathBuf,
    /// Trime skin the keyboards are merged into
    pub document: PathBuf,
    /// Optional copy of the generated legacy text, for review
    pub review_output: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            table: PathBuf::from("data/pinyin.tsv"),
            layout: PathBuf::from("data/finals_all.csv"),
            legacy_layout: PathBuf::from("data/finals_legacy.csv"),
            mask: PathBuf::from("data/finals_mask_config.yaml"),
            document: PathBuf::from("data/shengyun.trime.yaml"),
            review_output: None,
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `author` written into the table-driven keyboards
    pub author: String,
    /// `author` of the hand-masked legacy layers
    pub legacy_author: String,
    pub keyboard_height: u32,
    /// Keyboard display names are `<name_prefix>-<initial>`
    pub name_prefix: String,
    /// Display suffix of the all-finals layer
    pub universal_suffix: String,
    /// Generated keyboard ids are `<keyboard_prefix>_<initial>`; every
    /// keyboard with this prefix is owned by the generator
    pub keyboard_prefix: String,
    /// Keyboard a final key returns to after typing
    pub select_target: String,
    /// Display name of the initials keyboard when it has to be created
    pub initials_name: String,
    /// Label of the preset key switching back to the initials keyboard
    pub initials_label: String,
    /// Keys per row on a created initials keyboard
    pub initials_columns: usize,
    /// Set `once: true` on table-driven keyboards
    pub once: bool,
    /// Initials that get a finals layer, in output order
    pub initials_order: Vec<String>,
    /// Rows the legacy layout must have
    pub legacy_rows: usize,
    /// Lines delimiting the generated region in legacy splice mode
    pub begin_marker: String,
    pub end_marker: String,
    pub paths: PathsConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            author: "gshmu".to_string(),
            legacy_author: "shengyun".to_string(),
            keyboard_height: 70,
            name_prefix: "韵母层".to_string(),
            universal_suffix: "全部".to_string(),
            keyboard_prefix: "shengyun_finals".to_string(),
            select_target: "shengyun_initials".to_string(),
            initials_name: "声母层".to_string(),
            initials_label: "声母".to_string(),
            initials_columns: 6,
            once: true,
            initials_order: INITIALS_ORDER.iter().map(|s| s.to_string()).collect(),
            legacy_rows: 4,
            begin_marker: "# >>> shengyun_finals".to_string(),
            end_marker: "# <<< shengyun_finals".to_string(),
            paths: PathsConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn style(&self) -> KeyboardStyle {
        KeyboardStyle::from(self)
    }

    /// Markers region for legacy splicing.
    pub fn marker_region(&self) -> Region {
        Region::Markers {
            begin: self.begin_marker.clone(),
            end: self.end_marker.clone(),
        }
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    ///
    /// Layout files edited on different systems may carry `ü` as `u` plus a
    /// combining diaeresis; NFC folds both spellings together.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
