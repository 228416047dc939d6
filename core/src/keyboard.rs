//! Trime keyboard model and the builders that fill it from a finals grid.
//!
//! Field order of [`Key`] and [`Keyboard`] is the order Trime skins are
//! written in; serde keeps declaration order, so do not reorder fields.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::layout::{row_width, Cell, LayoutGrid, BACKSPACE_GLYPH, SHIFT_GLYPH, SPACE_GLYPH};
use crate::phonetic::{PhoneticTable, ZERO_INITIAL};
use crate::spelling::{click_code, display_label, legacy_click_final, select_final, to_input_code};
use crate::GeneratorConfig;

/// Final shown on the first key of the zero-initial and overview layers.
pub const ER: &str = "er";
const SPACE_ACTION: &str = "space";
const BACKSPACE_ACTION: &str = "BackSpace";
const TOGGLE_SEND: &str = "Eisu_toggle";
const BLANK_LABEL: &str = " ";
const ZERO_LABEL: &str = "∅";
/// Preset key label of the overview layer.
const UNIVERSAL_PRESET_LABEL: &str = "finals";

/// A single key of a preset keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub click: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_click: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    pub label: String,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_bindings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hilited: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<bool>,
}

impl Key {
    pub fn new(click: impl Into<String>, label: impl Into<String>, width: f64) -> Self {
        Self {
            click: click.into(),
            long_click: None,
            select: None,
            label: label.into(),
            width,
            functional: None,
            send_bindings: None,
            hilited: None,
            repeat: None,
        }
    }

    /// A space key with a blank label, used for masked positions.
    pub fn blank(width: f64) -> Self {
        Self::new(SPACE_ACTION, BLANK_LABEL, width)
    }

    pub fn with_select(mut self, target: impl Into<String>) -> Self {
        self.select = Some(target.into());
        self
    }

    pub fn is_blank(&self) -> bool {
        self.click == SPACE_ACTION && self.label == BLANK_LABEL
    }
}

/// One entry of `preset_keyboards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    pub name: String,
    pub author: String,
    pub ascii_mode: u8,
    pub width: f64,
    pub height: u32,
    pub lock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub once: Option<bool>,
    pub keys: Vec<Key>,
}

/// One entry of `preset_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetKey {
    pub label: String,
    pub send: String,
    pub select: String,
}

/// Naming and header values shared by every generated keyboard.
#[derive(Debug, Clone)]
pub struct KeyboardStyle {
    pub author: String,
    /// `author` of the hand-masked legacy layers
    pub legacy_author: String,
    pub height: u32,
    pub name_prefix: String,
    pub universal_suffix: String,
    pub keyboard_prefix: String,
    pub select_target: String,
    pub initials_name: String,
    pub initials_label: String,
    pub initials_columns: usize,
    pub once: bool,
}

impl From<&GeneratorConfig> for KeyboardStyle {
    fn from(cfg: &GeneratorConfig) -> Self {
        Self {
            author: cfg.author.clone(),
            legacy_author: cfg.legacy_author.clone(),
            height: cfg.keyboard_height,
            name_prefix: cfg.name_prefix.clone(),
            universal_suffix: cfg.universal_suffix.clone(),
            keyboard_prefix: cfg.keyboard_prefix.clone(),
            select_target: cfg.select_target.clone(),
            initials_name: cfg.initials_name.clone(),
            initials_label: cfg.initials_label.clone(),
            initials_columns: cfg.initials_columns,
            once: cfg.once,
        }
    }
}

impl Default for KeyboardStyle {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl KeyboardStyle {
    /// `preset_keyboards` id of the finals layer for `initial`.
    pub fn keyboard_id(&self, initial: &str) -> String {
        format!("{}_{}", self.keyboard_prefix, initial)
    }

    /// Id of the overview layer with every final.
    pub fn universal_id(&self) -> String {
        self.keyboard_prefix.clone()
    }

    /// Id of the legacy zero-initial layer.
    pub fn legacy_zero_id(&self) -> String {
        self.keyboard_id("all")
    }

    fn switch_action(target: &str) -> String {
        format!("Keyboard_{target}")
    }

    fn header(&self, name: String, width: f64, once: Option<bool>, keys: Vec<Key>) -> Keyboard {
        self.header_by(&self.author, name, width, once, keys)
    }

    fn header_by(&self, author: &str, name: String, width: f64, once: Option<bool>, keys: Vec<Key>) -> Keyboard {
        Keyboard {
            name,
            author: author.to_string(),
            ascii_mode: 0,
            width,
            height: self.height,
            lock: true,
            once,
            keys,
        }
    }

    fn once_flag(&self) -> Option<bool> {
        self.once.then_some(true)
    }

    /// Keys for `⇧`, `␣` and `⌫`; `None` for any other cell.
    fn control_key(&self, cell: &Cell, width: f64) -> Option<Key> {
        match cell {
            Cell::Shift => {
                let mut key = Key::new(Self::switch_action(&self.select_target), SHIFT_GLYPH, width);
                key.send_bindings = Some(false);
                key.hilited = Some(true);
                Some(key)
            }
            Cell::Space => Some(Key::new(SPACE_ACTION, SPACE_GLYPH, width)),
            Cell::Backspace => {
                let mut key = Key::new(BACKSPACE_ACTION, BACKSPACE_GLYPH, width);
                key.repeat = Some(true);
                Some(key)
            }
            _ => None,
        }
    }

    fn final_key(&self, click: String, label: impl Into<String>, width: f64) -> Key {
        Key::new(click, label, width).with_select(self.select_target.clone())
    }

    /// Finals layer for one initial (or [`ZERO_INITIAL`]) driven by the
    /// syllable table.
    pub fn finals_keyboard(&self, initial: &str, grid: &LayoutGrid, table: &PhoneticTable) -> Keyboard {
        let mut keys = Vec::new();

        for (row_idx, row) in grid.rows.iter().enumerate() {
            let width = row_width(row.len());
            for (col_idx, cell) in row.iter().enumerate() {
                if row_idx == 0 && col_idx == 0 {
                    keys.push(self.lead_key(initial, width));
                    continue;
                }
                if let Some(key) = self.control_key(cell, width) {
                    keys.push(key);
                    continue;
                }

                let options = cell.options();
                let key = match select_final(&options, |f| table.is_available(initial, f)) {
                    Some(selected) => self.final_key(click_code(selected, initial), selected, width),
                    None => Key::blank(width),
                };
                keys.push(key);
            }
        }

        let name = format!("{}-{}", self.name_prefix, initial);
        self.header(name, 100.0, self.once_flag(), keys)
    }

    /// First key of a finals layer: the initial itself, or `er` on the zero layer.
    fn lead_key(&self, initial: &str, width: f64) -> Key {
        if initial == ZERO_INITIAL {
            return self.final_key(ER.to_string(), ER, width);
        }
        let mut key = self.final_key(initial.to_string(), initial, width);
        key.functional = Some(true);
        key
    }

    /// Overview layer listing every final regardless of initial.
    pub fn universal_keyboard(&self, grid: &LayoutGrid) -> Keyboard {
        let mut keys = Vec::new();

        for (row_idx, row) in grid.rows.iter().enumerate() {
            let width = row_width(row.len());
            for (col_idx, cell) in row.iter().enumerate() {
                if row_idx == 0 && col_idx == 0 {
                    let mut key = Key::new(ER, ER, width);
                    key.functional = Some(true);
                    keys.push(key);
                    continue;
                }
                if let Some(key) = self.control_key(cell, width) {
                    keys.push(key);
                    continue;
                }

                let key = match cell {
                    Cell::Final(f) => self.final_key(to_input_code(f), f.as_str(), width),
                    Cell::Exclusive(options) if options.len() >= 2 => {
                        let (long, short) = (&options[0], &options[1]);
                        let mut key = Key::new(to_input_code(short), short.as_str(), width);
                        key.long_click = Some(to_input_code(long));
                        key
                    }
                    Cell::Exclusive(options) if options.len() == 1 => {
                        self.final_key(to_input_code(&options[0]), options[0].as_str(), width)
                    }
                    _ => Key::blank(width),
                };
                keys.push(key);
            }
        }

        let name = format!("{}-{}", self.name_prefix, self.universal_suffix);
        self.header(name, 100.0, self.once_flag(), keys)
    }

    /// Finals layer for the hand-masked 9-column layout.
    pub fn legacy_keyboard(&self, initial: &str, grid: &LayoutGrid, masked: &BTreeSet<String>) -> Keyboard {
        let mut keys = Vec::new();

        for (row_idx, row) in grid.rows.iter().enumerate() {
            let width = row_width(row.len());
            for (col_idx, cell) in row.iter().enumerate() {
                if row_idx == 0 && col_idx == 0 {
                    keys.push(self.final_key(initial.to_string(), initial, width));
                    continue;
                }
                if let Some(key) = self.control_key(cell, width) {
                    keys.push(key);
                    continue;
                }
                keys.push(self.legacy_final_key(cell, width, masked, |f| {
                    (
                        format!("{}{}", initial, legacy_click_final(f, initial)),
                        display_label(f, initial),
                    )
                }));
            }
        }

        let name = format!("{}-{}", self.name_prefix, initial);
        self.header_by(&self.legacy_author, name, self.first_row_width(grid), None, keys)
    }

    /// Zero-initial layer of the legacy layout: every unmasked final typed alone.
    pub fn legacy_zero_keyboard(&self, grid: &LayoutGrid, masked: &BTreeSet<String>) -> Keyboard {
        let mut keys = Vec::new();

        for row in &grid.rows {
            let width = row_width(row.len());
            for cell in row {
                if let Some(key) = self.control_key(cell, width) {
                    keys.push(key);
                    continue;
                }
                keys.push(self.legacy_final_key(cell, width, masked, |f| {
                    (to_input_code(f), f.to_string())
                }));
            }
        }

        let name = format!("{}-{}", self.name_prefix, self.universal_suffix);
        self.header_by(&self.legacy_author, name, self.first_row_width(grid), None, keys)
    }

    fn legacy_final_key<F>(&self, cell: &Cell, width: f64, masked: &BTreeSet<String>, spell: F) -> Key
    where
        F: Fn(&str) -> (String, String),
    {
        let final_name = match cell {
            Cell::Final(f) => f.as_str(),
            Cell::Exclusive(options) if !options.is_empty() => options[0].as_str(),
            _ => return Key::blank(width),
        };
        if masked.contains(final_name) {
            return Key::blank(width);
        }
        let (click, label) = spell(final_name);
        self.final_key(click, label, width)
    }

    fn first_row_width(&self, grid: &LayoutGrid) -> f64 {
        grid.rows.first().map(|r| row_width(r.len())).unwrap_or(100.0)
    }

    /// Initials picker: one key per initial that opens its finals layer,
    /// followed by the zero and overview layers, space and backspace.
    pub fn initials_keyboard(&self, order: &[String]) -> Keyboard {
        let mut cells: Vec<Key> = order
            .iter()
            .map(|initial| Key::new(Self::switch_action(&self.keyboard_id(initial)), initial.as_str(), 0.0))
            .collect();
        cells.push(Key::new(Self::switch_action(&self.keyboard_id(ZERO_INITIAL)), ZERO_LABEL, 0.0));
        cells.push(Key::new(
            Self::switch_action(&self.universal_id()),
            self.universal_suffix.as_str(),
            0.0,
        ));
        cells.push(Key::new(SPACE_ACTION, SPACE_GLYPH, 0.0));
        let mut backspace = Key::new(BACKSPACE_ACTION, BACKSPACE_GLYPH, 0.0);
        backspace.repeat = Some(true);
        cells.push(backspace);

        let columns = self.initials_columns.max(1);
        let mut keys = Vec::with_capacity(cells.len());
        for chunk in cells.chunks(columns) {
            let width = row_width(chunk.len());
            keys.extend(chunk.iter().cloned().map(|mut key| {
                key.width = width;
                key
            }));
        }

        self.header(self.initials_name.clone(), 100.0, None, keys)
    }

    /// `preset_keys` entries that switch to each generated layer.
    pub fn preset_keys(&self, order: &[String]) -> Vec<(String, PresetKey)> {
        let toggle = |label: &str, target: String| PresetKey {
            label: label.to_string(),
            send: TOGGLE_SEND.to_string(),
            select: target,
        };

        let mut out: Vec<(String, PresetKey)> = order
            .iter()
            .map(|initial| {
                let target = self.keyboard_id(initial);
                (Self::switch_action(&target), toggle(initial, target))
            })
            .collect();

        let zero = self.keyboard_id(ZERO_INITIAL);
        out.push((Self::switch_action(&zero), toggle(SHIFT_GLYPH, zero)));

        let universal = self.universal_id();
        out.push((
            Self::switch_action(&universal),
            toggle(UNIVERSAL_PRESET_LABEL, universal),
        ));

        out.push((
            Self::switch_action(&self.select_target),
            toggle(&self.initials_label, self.select_target.clone()),
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> LayoutGrid {
        LayoutGrid::from_csv_str("er,a,ü\nun|ün,,⇧,␣,⌫\n").unwrap()
    }

    fn table() -> PhoneticTable {
        let mut t = PhoneticTable::new();
        t.insert("b", "a");
        t.insert("b", "un");
        t.insert("j", "ü");
        t.insert("j", "ün");
        t.insert(ZERO_INITIAL, "er");
        t.insert(ZERO_INITIAL, "a");
        t
    }

    #[test]
    fn test_lead_key_is_functional_initial() {
        let kb = KeyboardStyle::default().finals_keyboard("b", &grid(), &table());
        let lead = &kb.keys[0];
        assert_eq!(lead.click, "b");
        assert_eq!(lead.label, "b");
        assert_eq!(lead.functional, Some(true));
        assert_eq!(lead.select.as_deref(), Some("shengyun_initials"));
    }

    #[test]
    fn test_exclusive_cell_picks_available_option() {
        let style = KeyboardStyle::default();
        let b = style.finals_keyboard("b", &grid(), &table());
        assert_eq!(b.keys[3].click, "bun");
        let j = style.finals_keyboard("j", &grid(), &table());
        assert_eq!(j.keys[3].click, "jvn");
        assert_eq!(j.keys[3].label, "ün");
        assert_eq!(j.keys[2].click, "jv");
        assert_eq!(j.keys[2].label, "ü");
    }

    #[test]
    fn test_unavailable_and_empty_cells_are_blank() {
        let kb = KeyboardStyle::default().finals_keyboard("b", &grid(), &table());
        assert!(kb.keys[2].is_blank());
        assert!(kb.keys[4].is_blank());
    }

    #[test]
    fn test_rows_get_their_own_width() {
        let kb = KeyboardStyle::default().finals_keyboard("b", &grid(), &table());
        assert_eq!(kb.keys[0].width, 33.33);
        assert_eq!(kb.keys[3].width, 20.0);
        assert_eq!(kb.width, 100.0);
        assert_eq!(kb.once, Some(true));
    }

    #[test]
    fn test_zero_layer_types_final_alone() {
        let kb = KeyboardStyle::default().finals_keyboard(ZERO_INITIAL, &grid(), &table());
        assert_eq!(kb.keys[0].click, "er");
        assert_eq!(kb.keys[0].functional, None);
        assert_eq!(kb.keys[1].click, "a");
        assert_eq!(kb.name, "韵母层-zero");
    }

    #[test]
    fn test_universal_exclusive_uses_long_click() {
        let kb = KeyboardStyle::default().universal_keyboard(&grid());
        let key = &kb.keys[3];
        assert_eq!(key.click, "vn");
        assert_eq!(key.long_click.as_deref(), Some("un"));
        assert_eq!(key.label, "ün");
        assert_eq!(key.select, None);
        assert_eq!(kb.keys[2].click, "v");
        assert_eq!(kb.keys[2].label, "ü");
    }

    #[test]
    fn test_control_keys() {
        let kb = KeyboardStyle::default().universal_keyboard(&grid());
        let shift = &kb.keys[5];
        assert_eq!(shift.click, "Keyboard_shengyun_initials");
        assert_eq!(shift.send_bindings, Some(false));
        assert_eq!(shift.hilited, Some(true));
        assert_eq!(kb.keys[6].click, "space");
        assert_eq!(kb.keys[6].label, "␣");
        assert_eq!(kb.keys[7].repeat, Some(true));
    }

    #[test]
    fn test_legacy_layers_use_legacy_author() {
        let style = KeyboardStyle::default();
        let grid = LayoutGrid::from_csv_str("er,a,ü\n⇧,␣,⌫\n").unwrap();
        let masked = BTreeSet::new();
        assert_eq!(style.legacy_keyboard("b", &grid, &masked).author, "shengyun");
        assert_eq!(style.legacy_zero_keyboard(&grid, &masked).author, "shengyun");
        assert_eq!(style.finals_keyboard("b", &grid, &table()).author, "gshmu");
    }

    #[test]
    fn test_initials_keyboard_rows() {
        let style = KeyboardStyle {
            initials_columns: 3,
            ..KeyboardStyle::default()
        };
        let order: Vec<String> = ["b", "p"].iter().map(|s| s.to_string()).collect();
        let kb = style.initials_keyboard(&order);
        // b p ∅ | 全部 ␣ ⌫
        assert_eq!(kb.keys.len(), 6);
        assert_eq!(kb.keys[0].click, "Keyboard_shengyun_finals_b");
        assert_eq!(kb.keys[2].click, "Keyboard_shengyun_finals_zero");
        assert_eq!(kb.keys[3].click, "Keyboard_shengyun_finals");
        let labels: Vec<&str> = kb.keys.iter().map(|k| k.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "p", "∅", "全部", "␣", "⌫"]);
        assert_eq!(kb.keys[5].repeat, Some(true));
        assert!(kb.keys.iter().all(|k| k.width == 33.33));
    }

    #[test]
    fn test_preset_keys() {
        let order = vec!["b".to_string()];
        let keys = KeyboardStyle::default().preset_keys(&order);
        let names: Vec<&str> = keys.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Keyboard_shengyun_finals_b",
                "Keyboard_shengyun_finals_zero",
                "Keyboard_shengyun_finals",
                "Keyboard_shengyun_initials",
            ]
        );
        assert_eq!(keys[1].1.label, "⇧");
        assert_eq!(keys[2].1.label, "finals");
        assert_eq!(keys[2].1.select, "shengyun_finals");
        assert_eq!(keys[3].1.label, "声母");
        assert!(keys.iter().all(|(_, k)| k.send == "Eisu_toggle"));
    }
}
