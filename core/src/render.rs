//! Text rendering of keyboards for line-based splicing.
//!
//! Output is a block meant to sit under `preset_keyboards:` (two-space
//! indent), one flow mapping per key, with a comment line before each row.
use std::fmt::Write;

use crate::keyboard::{Key, Keyboard};

/// Comment placed before a row and the number of keys the row holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNote {
    pub text: String,
    pub keys: usize,
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Widths are always written with two decimals (`11.11`, `10.00`).
pub fn format_width(width: f64) -> String {
    format!("{width:.2}")
}

/// One key as a YAML flow mapping.
pub fn render_key(key: &Key) -> String {
    let mut fields = vec![format!("click: {}", key.click)];
    if let Some(long) = &key.long_click {
        fields.push(format!("long_click: {long}"));
    }
    if let Some(select) = &key.select {
        fields.push(format!("select: {select}"));
    }
    fields.push(format!("label: {}", quote(&key.label)));
    fields.push(format!("width: {}", format_width(key.width)));
    let flags = [
        ("functional", key.functional),
        ("send_bindings", key.send_bindings),
        ("hilited", key.hilited),
        ("repeat", key.repeat),
    ];
    for (name, value) in flags {
        if let Some(v) = value {
            fields.push(format!("{name}: {v}"));
        }
    }
    format!("{{{}}}", fields.join(", "))
}

/// Render `keyboard` as a `preset_keyboards` entry named `id`.
///
/// Keys are grouped by `rows`; keys beyond the last note are emitted without
/// a comment. The block ends with an empty line.
pub fn render_keyboard(id: &str, keyboard: &Keyboard, comment: &str, rows: &[RowNote]) -> String {
    let mut out = String::new();
    // writeln! on a String cannot fail
    let _ = writeln!(out, "  # {comment}");
    let _ = writeln!(out, "  {id}:");
    let _ = writeln!(out, "    name: {}", keyboard.name);
    let _ = writeln!(out, "    author: {}", keyboard.author);
    let _ = writeln!(out, "    ascii_mode: {}", keyboard.ascii_mode);
    let _ = writeln!(out, "    width: {}", format_width(keyboard.width));
    let _ = writeln!(out, "    height: {}", keyboard.height);
    let _ = writeln!(out, "    lock: {}", keyboard.lock);
    if let Some(once) = keyboard.once {
        let _ = writeln!(out, "    once: {once}");
    }
    let _ = writeln!(out, "    keys:");

    let mut keys = keyboard.keys.iter();
    for note in rows {
        let _ = writeln!(out, "      # {}", note.text);
        for key in keys.by_ref().take(note.keys) {
            let _ = writeln!(out, "      - {}", render_key(key));
        }
    }
    for key in keys {
        let _ = writeln!(out, "      - {}", render_key(key));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_key_field_order() {
        let mut key = Key::new("Keyboard_shengyun_initials", "⇧", 11.11);
        key.send_bindings = Some(false);
        key.hilited = Some(true);
        assert_eq!(
            render_key(&key),
            "{click: Keyboard_shengyun_initials, label: \"⇧\", width: 11.11, send_bindings: false, hilited: true}"
        );
    }

    #[test]
    fn test_render_blank_and_select() {
        assert_eq!(
            render_key(&Key::blank(10.0)),
            "{click: space, label: \" \", width: 10.00}"
        );
        let key = Key::new("bun", "un", 12.5).with_select("shengyun_initials");
        assert_eq!(
            render_key(&key),
            "{click: bun, select: shengyun_initials, label: \"un\", width: 12.50}"
        );
    }

    #[test]
    fn test_render_keyboard_groups_rows() {
        let kb = Keyboard {
            name: "韵母层-b".into(),
            author: "shengyun".into(),
            ascii_mode: 0,
            width: 50.0,
            height: 70,
            lock: true,
            once: None,
            keys: vec![Key::new("b", "b", 50.0), Key::new("ba", "a", 50.0), Key::blank(100.0)],
        };
        let rows = vec![
            RowNote { text: "row 1".into(), keys: 2 },
            RowNote { text: "row 2".into(), keys: 1 },
        ];
        let text = render_keyboard("shengyun_finals_b", &kb, "b finals", &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  # b finals");
        assert_eq!(lines[1], "  shengyun_finals_b:");
        assert_eq!(lines[5], "    width: 50.00");
        assert_eq!(lines[8], "    keys:");
        assert_eq!(lines[9], "      # row 1");
        assert_eq!(lines[12], "      # row 2");
        assert_eq!(lines[13], "      - {click: space, label: \" \", width: 100.00}");
        assert!(text.ends_with("\n\n"));
    }
}
