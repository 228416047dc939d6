//! Initials and the initial × final syllable table.
//!
//! The table is a TSV grid: the header row names the initials, every later
//! row starts with a final and holds the spelled syllable (or `-`) for each
//! initial column.
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::utils::normalize;

/// Keyboard initials in pinyin order. `y` and `w` get their own finals layer.
pub const INITIALS_ORDER: &[&str] = &[
    "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "zh", "ch", "sh", "r",
    "z", "c", "s", "y", "w",
];

/// Pseudo-initial for syllables spelled from the final alone.
pub const ZERO_INITIAL: &str = "zero";

/// Marker for an impossible combination in the syllable table.
const UNAVAILABLE: &str = "-";

fn is_available_cell(cell: &str) -> bool {
    !cell.is_empty() && cell != UNAVAILABLE
}

/// Which finals each initial combines with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneticTable {
    /// Initials in header order.
    initials: Vec<String>,
    /// initial -> finals in table row order
    finals: BTreeMap<String, Vec<String>>,
}

impl PhoneticTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the tab-separated syllable table.
    pub fn from_tsv_str(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(content.as_bytes());

        let mut records = reader.records();
        let header = match records.next() {
            Some(rec) => rec.context("read syllable table header")?,
            None => bail!("syllable table is empty"),
        };

        let header: Vec<String> = header.iter().map(normalize).collect();
        if header.len() < 2 {
            bail!("syllable table header names no initials");
        }

        let mut table = PhoneticTable::new();
        for initial in &header[1..] {
            table.add_initial(initial);
        }

        // The corner cell is the final only the zero initial takes (er).
        let corner = &header[0];
        if is_available_cell(corner) {
            table.insert(ZERO_INITIAL, corner);
        }

        for (line, rec) in records.enumerate() {
            let rec = rec.with_context(|| format!("read syllable table row {}", line + 2))?;
            let cells: Vec<String> = rec.iter().map(normalize).collect();
            let Some(final_name) = cells.first().filter(|f| !f.is_empty()) else {
                continue;
            };
            for (col, initial) in header.iter().enumerate().skip(1) {
                if cells.get(col).is_some_and(|c| is_available_cell(c)) {
                    table.insert(initial, final_name);
                }
            }
        }

        debug!(
            initials = table.initials.len(),
            combinations = table.combination_count(),
            "parsed syllable table"
        );
        Ok(table)
    }

    /// Load the syllable table from disk.
    pub fn load_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read syllable table {}", path.display()))?;
        Self::from_tsv_str(&content).with_context(|| format!("parse {}", path.display()))
    }

    fn add_initial(&mut self, initial: &str) {
        if !self.finals.contains_key(initial) {
            self.initials.push(initial.to_string());
            self.finals.insert(initial.to_string(), Vec::new());
        }
    }

    /// Record that `initial` combines with `final_name`.
    pub fn insert(&mut self, initial: &str, final_name: &str) {
        self.add_initial(initial);
        let list = self.finals.entry(initial.to_string()).or_default();
        if !list.iter().any(|f| f == final_name) {
            list.push(final_name.to_string());
        }
    }

    pub fn initials(&self) -> &[String] {
        &self.initials
    }

    pub fn finals_for(&self, initial: &str) -> Option<&[String]> {
        self.finals.get(initial).map(Vec::as_slice)
    }

    pub fn is_available(&self, initial: &str, final_name: &str) -> bool {
        self.finals_for(initial)
            .is_some_and(|list| list.iter().any(|f| f == final_name))
    }

    /// Total number of valid initial/final pairs.
    pub fn combination_count(&self) -> usize {
        self.finals.values().map(Vec::len).sum()
    }
}
