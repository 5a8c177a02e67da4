// tests/config_loading.rs

mod common;
use crate::common::TestResult;

use clap::Parser;

use tailrelay::cli::{CliArgs, LogLevel};
use tailrelay::config::{
    ConfigFile, UNGROUPED, apply_cli_overrides, load_and_validate, load_with_overrides,
};
use tailrelay::errors::TailRelayError;
use tailrelay::logging::resolve_level;
use tailrelay_test_utils::builders::ConfigBuilder;

fn config_error(result: Result<ConfigFile, TailRelayError>) -> String {
    match result {
        Err(TailRelayError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn full_config_file_loads() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tailrelay.toml");
    std::fs::write(
        &path,
        r#"
[server]
bind = "0.0.0.0:9000"
relative_root = "/logs/"
allow_transfers = true

[commands]
awk = "/usr/bin/mawk"

[files]
"__ungrouped__" = ["/var/log/syslog"]
nginx = ["/var/log/nginx/access.log", "/var/log/nginx/error.log"]
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.server.bind.port(), 9000);
    assert_eq!(cfg.server.relative_root, "/logs");
    assert!(cfg.server.allow_transfers);
    assert!(!cfg.server.debug);
    assert_eq!(cfg.commands.tail, "tail");
    assert_eq!(cfg.commands.awk, "/usr/bin/mawk");

    assert_eq!(cfg.allow_list.len(), 3);
    assert!(cfg.allow_list.contains("/var/log/nginx/error.log"));
    let groups: Vec<&str> = cfg.allow_list.groups().map(|(name, _)| name).collect();
    assert_eq!(groups, vec![UNGROUPED, "nginx"]);
    Ok(())
}

#[test]
fn defaults_apply_when_sections_are_missing() {
    let cfg = ConfigBuilder::new()
        .bind("127.0.0.1:8084")
        .with_file("/var/log/app.log")
        .build();
    assert_eq!(cfg.server.bind.to_string(), "127.0.0.1:8084");
    assert_eq!(cfg.server.relative_root, "/");
    assert!(!cfg.server.allow_transfers);
    assert_eq!(cfg.commands.awk, "gawk");
}

#[test]
fn at_least_one_file_is_required() {
    let msg = config_error(ConfigFile::try_from(ConfigBuilder::new().raw()));
    assert!(msg.contains("no files configured"));
}

#[test]
fn file_paths_must_be_absolute() {
    let raw = ConfigBuilder::new().with_file("relative/app.log").raw();
    let msg = config_error(ConfigFile::try_from(raw));
    assert!(msg.contains("must be an absolute path"));
}

#[test]
fn relative_root_must_start_with_slash() {
    let raw = ConfigBuilder::new()
        .with_file("/var/log/app.log")
        .relative_root("logs")
        .raw();
    let msg = config_error(ConfigFile::try_from(raw));
    assert!(msg.contains("relative_root"));

    let cfg = ConfigBuilder::new()
        .with_file("/var/log/app.log")
        .relative_root("///")
        .build();
    assert_eq!(cfg.server.relative_root, "/");
}

#[test]
fn bind_must_be_a_socket_address() {
    let raw = ConfigBuilder::new()
        .with_file("/var/log/app.log")
        .bind("localhost")
        .raw();
    let msg = config_error(ConfigFile::try_from(raw));
    assert!(msg.contains("[server].bind"));
}

#[test]
fn executables_must_not_be_empty() {
    let raw = ConfigBuilder::new()
        .with_file("/var/log/app.log")
        .awk_program("  ")
        .raw();
    let msg = config_error(ConfigFile::try_from(raw));
    assert!(msg.contains("[commands].awk"));
}

#[test]
fn unknown_toml_is_a_parse_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[server\nbind = ")?;
    assert!(matches!(
        load_and_validate(&path),
        Err(TailRelayError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn cli_arguments_parse() {
    let args = CliArgs::try_parse_from([
        "tailrelay",
        "-b",
        "0.0.0.0:7000",
        "--allow-transfers",
        "--log-level",
        "debug",
        "/var/log/a.log",
        "/var/log/b.log",
    ])
    .expect("valid arguments");

    assert_eq!(args.bind.as_deref(), Some("0.0.0.0:7000"));
    assert!(args.allow_transfers);
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert_eq!(args.files, vec!["/var/log/a.log", "/var/log/b.log"]);
}

#[test]
fn cli_overrides_layer_on_top_of_the_file() {
    let mut raw = ConfigBuilder::new()
        .with_file("/var/log/app.log")
        .relative_root("/a")
        .raw();
    let args = CliArgs {
        files: vec!["/var/log/extra.log".into()],
        relative_root: Some("/b".into()),
        debug: true,
        ..CliArgs::default()
    };
    apply_cli_overrides(&mut raw, &args);

    assert_eq!(raw.server.relative_root, "/b");
    assert!(raw.server.debug);
    assert!(!raw.server.allow_transfers);
    assert_eq!(
        raw.files[UNGROUPED],
        vec!["/var/log/app.log", "/var/log/extra.log"]
    );
}

#[test]
fn positional_files_are_enough_without_config_file() -> TestResult {
    let args = CliArgs {
        files: vec!["/var/log/app.log".into()],
        ..CliArgs::default()
    };
    let cfg = load_with_overrides(&args)?;
    assert!(cfg.allow_list.contains("/var/log/app.log"));
    assert_eq!(cfg.server.bind.to_string(), "127.0.0.1:8084");
    Ok(())
}

#[test]
fn log_level_priority() {
    use tracing::Level;

    assert_eq!(
        resolve_level(Some(LogLevel::Warn), Some("trace"), true),
        Level::WARN
    );
    assert_eq!(resolve_level(None, Some("trace"), true), Level::TRACE);
    assert_eq!(resolve_level(None, Some("bogus"), true), Level::DEBUG);
    assert_eq!(resolve_level(None, None, false), Level::INFO);
}
