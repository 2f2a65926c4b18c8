use std::path::PathBuf;

use gitgraph_md::config::{ConfigFlags, load_config_flags, parse_flag_tokens};
use gitgraph_md::options::{Column, OutputLayout, ResolvedOptions};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gitgraphrc");
    let content = r#"
# comment
--watch

--point-space 40

--options=theme.json5
--date-format %d %b %Y
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.overrides.theme.point_space, Some(40.0));
    assert_eq!(flags.options_file, Some(PathBuf::from("theme.json5")));
    assert_eq!(flags.overrides.theme.date_format.as_deref(), Some("%d %b %Y"));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gitgraphrc");
    let content = "--watch\n--point-space 40\n--colors red,green\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "gitgraph-md".to_string(),
        "README.md".to_string(),
        "--point-space".to_string(),
        "30".to_string(),
        "--table".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert_eq!(effective.overrides.theme.point_space, Some(30.0), "cli should override");
    assert_eq!(
        effective.overrides.colors,
        Some(vec!["red".to_string(), "green".to_string()]),
        "file config should be preserved when CLI does not override"
    );

    let options = ResolvedOptions::default().merge(&effective.overrides);
    assert_eq!(options.theme.layout, OutputLayout::Table);
    assert_eq!(options.theme.point_space, 30.0);
    assert_eq!(options.branch_color(1, "dev"), "green");
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "gitgraph-md".to_string(),
        "--columns=hash,message,date".to_string(),
        "--default-branch=trunk".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(
        flags.overrides.theme.columns,
        Some(vec![Column::Hash, Column::Message, Column::Date])
    );
    assert_eq!(flags.overrides.default_branch_name.as_deref(), Some("trunk"));
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        watch: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        perf: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.watch);
    assert!(merged.perf);
}

#[test]
fn test_missing_config_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
