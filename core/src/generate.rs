//! End-to-end generation: inputs in, keyboards (or rendered text) out.
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::document::TrimeDocument;
use crate::keyboard::Keyboard;
use crate::layout::{Cell, LayoutGrid};
use crate::mask::MaskConfig;
use crate::phonetic::{PhoneticTable, ZERO_INITIAL};
use crate::render::{render_keyboard, RowNote};
use crate::GeneratorConfig;

/// What a table-mode merge changed in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub removed: usize,
    pub inserted: usize,
    pub initials_keyboard_created: bool,
    pub preset_keys: usize,
}

/// Table-driven keyboards in document order: zero layer, one layer per
/// initial, then the all-finals overview.
pub fn generate_table_mode(
    table: &PhoneticTable,
    grid: &LayoutGrid,
    config: &GeneratorConfig,
) -> Vec<(String, Keyboard)> {
    let style = config.style();
    let mut out = Vec::with_capacity(config.initials_order.len() + 2);

    out.push((
        style.keyboard_id(ZERO_INITIAL),
        style.finals_keyboard(ZERO_INITIAL, grid, table),
    ));

    for initial in &config.initials_order {
        if table.finals_for(initial).is_none() {
            warn!(initial = %initial, "initial missing from syllable table, every final is masked");
        }
        out.push((
            style.keyboard_id(initial),
            style.finals_keyboard(initial, grid, table),
        ));
    }

    out.push((style.universal_id(), style.universal_keyboard(grid)));
    debug!(keyboards = out.len(), "generated table-mode keyboards");
    out
}

/// Replace every generator-owned keyboard in `doc` with fresh ones.
pub fn merge_table_mode(
    doc: &mut TrimeDocument,
    table: &PhoneticTable,
    grid: &LayoutGrid,
    config: &GeneratorConfig,
) -> Result<MergeReport> {
    let style = config.style();
    let mut report = MergeReport {
        removed: doc.remove_generated(&config.keyboard_prefix),
        ..MergeReport::default()
    };

    // Created ahead of the finals layers so a second run keeps the same order.
    if !doc.has_keyboard(&config.select_target) {
        info!(id = %config.select_target, "initials keyboard missing, creating it");
        let keyboard = style.initials_keyboard(&config.initials_order);
        doc.insert_keyboard(&config.select_target, &keyboard)?;
        report.initials_keyboard_created = true;
    }

    for (id, keyboard) in generate_table_mode(table, grid, config) {
        doc.insert_keyboard(&id, &keyboard)?;
        report.inserted += 1;
    }

    let preset_keys = style.preset_keys(&config.initials_order);
    report.preset_keys = doc.upsert_preset_keys(&preset_keys)?;

    info!(
        removed = report.removed,
        inserted = report.inserted,
        preset_keys = report.preset_keys,
        "merged finals keyboards"
    );
    Ok(report)
}

/// Rendered blocks of the hand-masked layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyOutput {
    /// One block per initial, concatenated.
    pub finals: String,
    /// The zero-initial "all" layer.
    pub zero: String,
    /// Initials that got a layer.
    pub initials: Vec<String>,
    /// Initials skipped for lack of a mask entry.
    pub skipped: Vec<String>,
}

impl LegacyOutput {
    /// Both blocks, in splice order.
    pub fn combined(&self) -> String {
        let mut out = String::with_capacity(self.finals.len() + self.zero.len());
        out.push_str(&self.finals);
        out.push_str(&self.zero);
        out
    }
}

fn row_notes(grid: &LayoutGrid, lead: Option<&str>, sep: &str) -> Vec<RowNote> {
    grid.rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells: Vec<String> = row.iter().map(Cell::source_text).collect();
            let text = match lead {
                Some(initial) => format!("行{}：{} {}", idx + 1, initial, cells.join(sep)),
                None => format!("行{}：{}", idx + 1, cells.join(sep)),
            };
            RowNote {
                text,
                keys: row.len(),
            }
        })
        .collect()
}

/// Render the masked 9-column layers for every configured initial plus the
/// zero-initial layer.
pub fn generate_legacy(
    grid: &LayoutGrid,
    masks: &MaskConfig,
    config: &GeneratorConfig,
) -> Result<LegacyOutput> {
    grid.expect_rows(config.legacy_rows)?;
    let style = config.style();
    let mut out = LegacyOutput::default();

    for initial in &config.initials_order {
        let Some(masked) = masks.masked_for(initial) else {
            warn!(initial = %initial, "not in mask config, skipping");
            out.skipped.push(initial.clone());
            continue;
        };
        let keyboard = style.legacy_keyboard(initial, grid, masked);
        debug!(
            initial = %initial,
            masked = keyboard.keys.iter().filter(|k| k.is_blank()).count(),
            "legacy layer built"
        );
        let notes = row_notes(grid, Some(initial), ", ");
        out.finals.push_str(&render_keyboard(
            &style.keyboard_id(initial),
            &keyboard,
            &format!("{initial} 的韵母层"),
            &notes,
        ));
        out.initials.push(initial.clone());
    }

    let zero = style.legacy_zero_keyboard(grid, masks.zero_masked());
    let columns = grid.rows.first().map_or(0, Vec::len);
    let comment = format!(
        "通用韵母层（显示所有{}个韵母，西文模式专用，{}列布局）",
        grid.final_cells(),
        columns
    );
    out.zero = render_keyboard(
        &style.legacy_zero_id(),
        &zero,
        &comment,
        &row_notes(grid, None, " "),
    );

    info!(
        layers = out.initials.len(),
        skipped = out.skipped.len(),
        "rendered legacy finals layers"
    );
    Ok(out)
}
