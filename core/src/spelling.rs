//! Spelling rules that turn a layout final into a key label and a click code.
//!
//! RIME spells `ü` as `v`, so every click code goes through [`to_input_code`].
//! Labels follow the printed pinyin convention: after j/q/x/y the umlaut is
//! dropped (`ju`, `xue`), after n/l it is kept (`nü`).
use phf::{phf_set, Set};

use crate::phonetic::ZERO_INITIAL;

/// Initials after which `ü` is written `u`.
pub static U_CONVERT_INITIALS: Set<&'static str> = phf_set! { "j", "q", "x", "y" };

/// Initials that keep the umlaut on `ün`.
pub static UMLAUT_KEEP_INITIALS: Set<&'static str> = phf_set! { "n", "l" };

const UMLAUT_UN: &str = "ün";

/// Replace `ü` with the RIME input letter `v`.
pub fn to_input_code(final_name: &str) -> String {
    final_name.replace('ü', "v")
}

/// Label shown on the key for `final_name` on the `initial` layer.
pub fn display_label(final_name: &str, initial: &str) -> String {
    if final_name == UMLAUT_UN {
        return if UMLAUT_KEEP_INITIALS.contains(initial) {
            UMLAUT_UN.to_string()
        } else {
            "un".to_string()
        };
    }

    if U_CONVERT_INITIALS.contains(initial) {
        return final_name.replace('ü', "u");
    }

    final_name.to_string()
}

/// Click value for a final on the `initial` layer: the zero initial types the
/// final alone, every other layer prefixes its initial.
pub fn click_code(final_name: &str, initial: &str) -> String {
    let code = to_input_code(final_name);
    if initial == ZERO_INITIAL {
        code
    } else {
        format!("{initial}{code}")
    }
}

/// Final typed after the initial in the hand-masked layout, where a single
/// `ün` position stands for both `un` and `ün`.
pub fn legacy_click_final(final_name: &str, initial: &str) -> String {
    if final_name == UMLAUT_UN && !UMLAUT_KEEP_INITIALS.contains(initial) {
        // j/q/x/y: "jun" is read as jün by the engine; others really are "un"
        return "un".to_string();
    }
    final_name.to_string()
}

/// Pick the first option the initial can combine with.
pub fn select_final<'a, F>(options: &'a [String], mut available: F) -> Option<&'a str>
where
    F: FnMut(&str) -> bool,
{
    options
        .iter()
        .map(String::as_str)
        .find(|option| available(*option))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_un_label_by_initial() {
        assert_eq!(display_label("ün", "j"), "un");
        assert_eq!(display_label("ün", "y"), "un");
        assert_eq!(display_label("ün", "n"), "ün");
        assert_eq!(display_label("ün", "l"), "ün");
        assert_eq!(display_label("ün", "k"), "un");
    }

    #[test]
    fn test_umlaut_dropped_after_jqxy_only() {
        assert_eq!(display_label("üe", "x"), "ue");
        assert_eq!(display_label("üan", "q"), "uan");
        assert_eq!(display_label("üe", "n"), "üe");
        assert_eq!(display_label("ian", "j"), "ian");
    }

    #[test]
    fn test_click_code_uses_v() {
        assert_eq!(click_code("ü", "l"), "lv");
        assert_eq!(click_code("üe", "j"), "jve");
        assert_eq!(click_code("ang", "zh"), "zhang");
        assert_eq!(click_code("er", ZERO_INITIAL), "er");
    }

    #[test]
    fn test_legacy_un_distribution() {
        assert_eq!(legacy_click_final("ün", "j"), "un");
        assert_eq!(legacy_click_final("ün", "n"), "ün");
        assert_eq!(legacy_click_final("ün", "k"), "un");
        assert_eq!(legacy_click_final("uan", "j"), "uan");
    }

    #[test]
    fn test_select_first_available_option() {
        let options = vec!["un".to_string(), "ün".to_string()];
        assert_eq!(select_final(&options, |f| f == "ün"), Some("ün"));
        assert_eq!(select_final(&options, |_| true), Some("un"));
        assert_eq!(select_final(&options, |_| false), None);
    }
}
