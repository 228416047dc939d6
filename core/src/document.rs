//! Merging generated keyboards into a Trime skin.
//!
//! Two strategies are supported:
//! - text splicing: a line range or a marker-delimited region of the file is
//!   replaced by rendered text, everything else stays byte-for-byte;
//! - document merge: the skin is parsed, generator-owned keyboards are
//!   dropped by id prefix and the fresh ones inserted. Comments are lost.
use std::path::Path;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};

use crate::keyboard::{Keyboard, PresetKey};
use crate::render::format_width;

const PRESET_KEYBOARDS: &str = "preset_keyboards";
const PRESET_KEYS: &str = "preset_keys";

/// A `width:` entry holding a plain number, in block or sequence position.
static WIDTH_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\s*(?:- )?width: )(-?[0-9]+(?:\.[0-9]+)?)$").unwrap());

/// Rewrite every numeric `width:` value with two decimals (`10.0` -> `10.00`).
fn format_widths(yaml: &str) -> String {
    WIDTH_LINE
        .replace_all(yaml, |caps: &Captures| match caps[2].parse::<f64>() {
            Ok(width) => format!("{}{}", &caps[1], format_width(width)),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

/// Part of a text document to replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// 1-based, inclusive line range.
    Lines { start: usize, end: usize },
    /// Lines strictly between the `begin` and `end` marker lines.
    Markers { begin: String, end: String },
}

impl std::str::FromStr for Region {
    type Err = anyhow::Error;

    /// Parse `START:END` (or `START-END`) into a line range.
    fn from_str(s: &str) -> Result<Self> {
        let Some((a, b)) = s.split_once(':').or_else(|| s.split_once('-')) else {
            bail!("line range must look like START:END, got {s:?}");
        };
        let start: usize = a.trim().parse().with_context(|| format!("bad start line {a:?}"))?;
        let end: usize = b.trim().parse().with_context(|| format!("bad end line {b:?}"))?;
        Ok(Region::Lines { start, end })
    }
}

/// Replace `region` of `text` with `replacement`.
pub fn splice_lines(text: &str, region: &Region, replacement: &str) -> Result<String> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let (head, tail) = match region {
        Region::Lines { start, end } => {
            if *start == 0 || start > end {
                bail!("invalid line range {start}:{end}");
            }
            if *end > lines.len() {
                bail!(
                    "line range {start}:{end} is past the end of the document ({} lines)",
                    lines.len()
                );
            }
            (&lines[..start - 1], &lines[*end..])
        }
        Region::Markers { begin, end } => {
            let b = lines
                .iter()
                .position(|l| l.trim() == begin.trim())
                .with_context(|| format!("begin marker {begin:?} not found"))?;
            let e = lines[b + 1..]
                .iter()
                .position(|l| l.trim() == end.trim())
                .map(|i| i + b + 1)
                .with_context(|| format!("end marker {end:?} not found after line {}", b + 1))?;
            (&lines[..=b], &lines[e..])
        }
    };

    let mut out = String::with_capacity(text.len() + replacement.len());
    out.extend(head.iter().copied());
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(replacement);
    if !replacement.is_empty() && !replacement.ends_with('\n') {
        out.push('\n');
    }
    out.extend(tail.iter().copied());
    Ok(out)
}

/// A parsed Trime skin.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimeDocument {
    root: Mapping,
}

impl TrimeDocument {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = if content.trim().is_empty() {
            Value::Mapping(Mapping::new())
        } else {
            serde_yaml::from_str(content).context("parse trime document")?
        };
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Ok(Self { root: Mapping::new() }),
            _ => bail!("trime document root must be a mapping"),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("load {}", path.display()))
    }

    /// Serialize the skin. Widths are written with two decimals.
    pub fn to_yaml_string(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.root)?;
        Ok(format_widths(&yaml))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml_string()?)
            .with_context(|| format!("write {}", path.display()))
    }

    /// The named top-level mapping, created (or replaced, if it is not a
    /// mapping) on demand.
    fn section_mut(&mut self, name: &str) -> &mut Mapping {
        let key = Value::from(name);
        if !matches!(self.root.get(&key), Some(Value::Mapping(_))) {
            self.root.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        match self.root.get_mut(&key) {
            Some(Value::Mapping(m)) => m,
            _ => unreachable!("section {name} was just inserted as a mapping"),
        }
    }

    fn section(&self, name: &str) -> Option<&Mapping> {
        self.root.get(name).and_then(Value::as_mapping)
    }

    pub fn keyboard_ids(&self) -> Vec<String> {
        self.section(PRESET_KEYBOARDS)
            .map(|m| m.keys().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_keyboard(&self, id: &str) -> bool {
        self.section(PRESET_KEYBOARDS)
            .is_some_and(|m| m.contains_key(id))
    }

    /// Typed view of one keyboard, if it deserializes.
    pub fn keyboard(&self, id: &str) -> Option<Keyboard> {
        let value = self.section(PRESET_KEYBOARDS)?.get(id)?;
        serde_yaml::from_value(value.clone()).ok()
    }

    pub fn preset_key(&self, name: &str) -> Option<PresetKey> {
        let value = self.section(PRESET_KEYS)?.get(name)?;
        serde_yaml::from_value(value.clone()).ok()
    }

    /// Keep only keyboards whose id satisfies `keep`; returns how many were dropped.
    pub fn retain_keyboards<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let keyboards = self.section_mut(PRESET_KEYBOARDS);
        let before = keyboards.len();
        keyboards.retain(|k, _| k.as_str().map_or(true, &mut keep));
        before - keyboards.len()
    }

    /// Drop every keyboard whose id starts with `prefix`.
    pub fn remove_generated(&mut self, prefix: &str) -> usize {
        self.retain_keyboards(|id| !id.starts_with(prefix))
    }

    /// Insert or replace a keyboard. New ids go to the end.
    pub fn insert_keyboard(&mut self, id: &str, keyboard: &Keyboard) -> Result<()> {
        let value = serde_yaml::to_value(keyboard)?;
        self.section_mut(PRESET_KEYBOARDS).insert(Value::from(id), value);
        Ok(())
    }

    /// Insert or replace preset keys, keeping existing positions.
    pub fn upsert_preset_keys<'a, I>(&mut self, keys: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a (String, PresetKey)>,
    {
        let section = self.section_mut(PRESET_KEYS);
        let mut count = 0;
        for (name, key) in keys {
            section.insert(Value::from(name.as_str()), serde_yaml::to_value(key)?);
            count += 1;
        }
        Ok(count)
    }
}
