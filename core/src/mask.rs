// shengyun/core/src/mask.rs
//
// Hand-maintained masks for the 9-column finals layout.
//
// The mask file looks like YAML but only a fixed line shape is understood:
//
//   zero_initial:
//     masked_finals: [i, u, ...]
//   initials:
//     b:
//       masked_finals: [er, e, ...]
//
// Anything else (comments, blank lines, unknown keys) is skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::normalize;

static ZERO_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^zero_initial:").unwrap());
static INITIALS_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^initials:").unwrap());
static INITIAL_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^  ([a-z]+):$").unwrap());
static MASKED_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+masked_finals:\s*\[(.*)\]$").unwrap());

/// Masked finals per initial plus the zero-initial layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskConfig {
    initials: BTreeMap<String, BTreeSet<String>>,
    zero: BTreeSet<String>,
}

fn parse_list(items: &str) -> BTreeSet<String> {
    items
        .split(',')
        .map(normalize)
        .filter(|item| !item.is_empty())
        .collect()
}

impl MaskConfig {
    /// Parse the mask file line by line.
    pub fn parse(content: &str) -> Self {
        let mut config = MaskConfig::default();
        let mut current: Option<String> = None;
        let mut in_zero = false;

        for line in content.lines() {
            let line = line.trim_end();

            if ZERO_SECTION.is_match(line) {
                in_zero = true;
                current = None;
                continue;
            }
            if INITIALS_SECTION.is_match(line) {
                in_zero = false;
                continue;
            }

            if !in_zero {
                if let Some(caps) = INITIAL_ENTRY.captures(line) {
                    let initial = caps[1].to_string();
                    config.initials.insert(initial.clone(), BTreeSet::new());
                    current = Some(initial);
                    continue;
                }
            }

            if let Some(caps) = MASKED_LIST.captures(line) {
                let finals = parse_list(&caps[1]);
                if in_zero {
                    config.zero = finals;
                } else if let Some(initial) = &current {
                    config.initials.insert(initial.clone(), finals);
                }
            }
        }

        config
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read mask config {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// `None` when the initial has no entry at all.
    pub fn masked_for(&self, initial: &str) -> Option<&BTreeSet<String>> {
        self.initials.get(initial)
    }

    pub fn zero_masked(&self) -> &BTreeSet<String> {
        &self.zero
    }

    pub fn initial_count(&self) -> usize {
        self.initials.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# masks
zero_initial:
  masked_finals: [i, u, ong]

initials:
  b:
    masked_finals: [er, e , ü]
  j:
    masked_finals: []
  zh:
";

    #[test]
    fn test_sections() {
        let cfg = MaskConfig::parse(SAMPLE);
        assert_eq!(cfg.zero_masked().len(), 3);
        assert!(cfg.zero_masked().contains("ong"));
        assert_eq!(cfg.initial_count(), 3);
    }

    #[test]
    fn test_items_are_trimmed() {
        let cfg = MaskConfig::parse(SAMPLE);
        let b = cfg.masked_for("b").unwrap();
        assert!(b.contains("e"));
        assert!(b.contains("ü"));
        assert!(!b.contains("e "));
    }

    #[test]
    fn test_entry_without_list_masks_nothing() {
        let cfg = MaskConfig::parse(SAMPLE);
        assert!(cfg.masked_for("j").unwrap().is_empty());
        assert!(cfg.masked_for("zh").unwrap().is_empty());
        assert!(cfg.masked_for("q").is_none());
    }

    #[test]
    fn test_initial_lines_inside_zero_section_are_ignored() {
        let cfg = MaskConfig::parse("zero_initial:\n  b:\n  masked_finals: [a]\n");
        assert_eq!(cfg.initial_count(), 0);
        assert!(cfg.zero_masked().contains("a"));
    }
}
