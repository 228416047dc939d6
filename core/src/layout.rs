//! Finals layout grid read from CSV.
//!
//! Each CSV row is one keyboard row. Cells are finals, control glyphs
//! (`⇧`, `␣`, `⌫`), empty placeholders, or two mutually exclusive finals
//! joined by `|` (`un|ün`).
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::utils::normalize;

/// Separator between mutually exclusive finals in one cell.
pub const EXCLUSIVE_SEPARATOR: char = '|';

pub const SHIFT_GLYPH: &str = "⇧";
pub const SPACE_GLYPH: &str = "␣";
pub const BACKSPACE_GLYPH: &str = "⌫";

/// One position in the finals grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Final(String),
    /// Finals that never share an initial; the first is the long-press form
    /// on the overview layer.
    Exclusive(Vec<String>),
    Shift,
    Space,
    Backspace,
    Blank,
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let text = normalize(raw);
        match text.as_str() {
            "" => Cell::Blank,
            SHIFT_GLYPH => Cell::Shift,
            SPACE_GLYPH => Cell::Space,
            BACKSPACE_GLYPH => Cell::Backspace,
            _ if text.contains(EXCLUSIVE_SEPARATOR) => Cell::Exclusive(
                text.split(EXCLUSIVE_SEPARATOR)
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect(),
            ),
            _ => Cell::Final(text),
        }
    }

    /// The cell as written in the layout file.
    pub fn source_text(&self) -> String {
        match self {
            Cell::Final(f) => f.clone(),
            Cell::Exclusive(options) => options.join("|"),
            Cell::Shift => SHIFT_GLYPH.to_string(),
            Cell::Space => SPACE_GLYPH.to_string(),
            Cell::Backspace => BACKSPACE_GLYPH.to_string(),
            Cell::Blank => String::new(),
        }
    }

    /// Finals this cell can stand for, in preference order.
    pub fn options(&self) -> Vec<String> {
        match self {
            Cell::Final(f) => vec![f.clone()],
            Cell::Exclusive(options) => options.clone(),
            _ => Vec::new(),
        }
    }
}

/// Key width in percent for a row of `len` keys, truncated to two decimals.
pub fn row_width(len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    (10000 / len) as f64 / 100.0
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutGrid {
    pub rows: Vec<Vec<Cell>>,
}

impl LayoutGrid {
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for (idx, rec) in reader.records().enumerate() {
            let rec = rec.with_context(|| format!("read layout row {}", idx + 1))?;
            if rec.iter().all(|field| field.trim().is_empty()) && rec.len() <= 1 {
                continue;
            }
            rows.push(rec.iter().map(Cell::parse).collect());
        }
        Ok(Self { rows })
    }

    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read layout {}", path.display()))?;
        Self::from_csv_str(&content).with_context(|| format!("parse {}", path.display()))
    }

    /// Fail unless the grid has exactly `expected` rows.
    pub fn expect_rows(&self, expected: usize) -> Result<()> {
        if self.rows.len() != expected {
            bail!(
                "layout should have {} rows, got {}",
                expected,
                self.rows.len()
            );
        }
        Ok(())
    }

    /// Number of final-bearing cells (exclusive cells count once).
    pub fn final_cells(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|c| matches!(c, Cell::Final(_) | Cell::Exclusive(_)))
            .count()
    }
}
