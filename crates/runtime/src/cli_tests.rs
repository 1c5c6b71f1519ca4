// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for compose command construction (no engine required).

use super::*;
use podx_config::Settings;
use std::ffi::OsStr;
use std::sync::Arc;

fn cli() -> ComposeCli {
    ComposeCli::new(Arc::new(Settings::new()))
}

#[test]
fn compose_cmd_interleaves_file_flags() {
    let cli = cli();
    let cmd = cli.compose_cmd(
        &[PathBuf::from("a-generated.yml"), PathBuf::from("b-generated.yml")],
        &["up", "-d"],
    );
    let std_cmd = cmd.as_std();
    assert_eq!(std_cmd.get_program(), OsStr::new("docker-compose"));
    let args: Vec<&OsStr> = std_cmd.get_args().collect();
    assert_eq!(
        args,
        vec![
            OsStr::new("-f"),
            OsStr::new("a-generated.yml"),
            OsStr::new("-f"),
            OsStr::new("b-generated.yml"),
            OsStr::new("up"),
            OsStr::new("-d"),
        ]
    );
}

#[test]
fn compose_cmd_carries_http_timeout_env() {
    let settings = Arc::new(Settings::new());
    settings.set("launchtask.composehttptimeout", serde_yaml::Value::from(120u64));
    let cli = ComposeCli::new(settings);
    let cmd = cli.compose_cmd(&[PathBuf::from("a.yml")], &["pull"]);
    let envs: Vec<_> = cmd.as_std().get_envs().collect();
    assert!(envs
        .iter()
        .any(|(k, v)| *k == OsStr::new("COMPOSE_HTTP_TIMEOUT")
            && *v == Some(OsStr::new("120"))));
}

#[test]
fn lines_of_trims_and_drops_blanks() {
    let out = b"abc123\n\n  def456  \n";
    assert_eq!(lines_of(out), vec!["abc123".to_string(), "def456".to_string()]);
}
