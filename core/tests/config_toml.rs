//! GeneratorConfig TOML round trips and partial files.

#[cfg(test)]
mod tests {
    use shengyun_core::{GeneratorConfig, Region};
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_config_save_and_load() {
        let mut config = GeneratorConfig::default();
        config.author = "tester".to_string();
        config.initials_order = vec!["b".to_string(), "zh".to_string()];
        config.paths.review_output = Some(PathBuf::from("out.yaml"));

        let path = std::env::temp_dir().join(format!(
            "shengyun_config_{}.toml",
            std::process::id()
        ));
        config.save_toml(&path).expect("Failed to save TOML config");
        let loaded = GeneratorConfig::load_toml(&path).expect("Failed to load TOML config");

        assert_eq!(loaded.author, "tester");
        assert_eq!(loaded.initials_order, vec!["b", "zh"]);
        assert_eq!(loaded.paths.review_output, Some(PathBuf::from("out.yaml")));
        assert_eq!(loaded.keyboard_height, config.keyboard_height);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config = GeneratorConfig::from_toml_str(
            "author = \"someone\"\n[paths]\ndocument = \"skin.trime.yaml\"\n",
        )
        .unwrap();
        assert_eq!(config.author, "someone");
        assert_eq!(config.legacy_author, "shengyun");
        assert_eq!(config.keyboard_prefix, "shengyun_finals");
        assert_eq!(config.initials_order.len(), 23);
        assert_eq!(config.paths.document, PathBuf::from("skin.trime.yaml"));
        assert_eq!(config.paths.table, PathBuf::from("data/pinyin.tsv"));
        assert!(config.paths.review_output.is_none());
    }

    #[test]
    fn test_checked_in_config_parses() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data/gen_keyboards.toml");
        let config = GeneratorConfig::load_toml(path).unwrap();
        assert_eq!(
            config.marker_region(),
            Region::Markers {
                begin: "# >>> shengyun_finals".to_string(),
                end: "# <<< shengyun_finals".to_string(),
            }
        );
        assert_eq!(config.legacy_rows, 4);
    }

    #[test]
    fn test_toml_string_round_trip() {
        let config = GeneratorConfig::default();
        let text = config.to_toml_string().unwrap();
        let back = GeneratorConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.name_prefix, config.name_prefix);
        assert_eq!(back.paths.mask, config.paths.mask);
    }
}
