use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TRIAGE_ENV"));
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.api_url, "http://127.0.0.1:8000");
    assert_eq!(cfg.log_level, "warn");
    assert_eq!(
        cfg.session_path,
        std::path::PathBuf::from("./.triage/session.json")
    );
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "triage/0.1 (admin-console)");
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("TRIAGE_ENV", "production");
    map.insert("TRIAGE_API_URL", "https://complaints.example.org");
    map.insert("TRIAGE_LOG_LEVEL", "debug");
    map.insert("TRIAGE_SESSION_PATH", "/tmp/triage/session.json");
    map.insert("TRIAGE_REQUEST_TIMEOUT_SECS", "5");
    map.insert("TRIAGE_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.api_url, "https://complaints.example.org");
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(
        cfg.session_path,
        std::path::PathBuf::from("/tmp/triage/session.json")
    );
    assert_eq!(cfg.request_timeout_secs, 5);
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
}

#[test]
fn build_app_config_rejects_non_http_api_url() {
    let mut map = HashMap::new();
    map.insert("TRIAGE_API_URL", "ftp://complaints.example.org");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRIAGE_API_URL"),
        "expected InvalidEnvVar(TRIAGE_API_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("TRIAGE_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRIAGE_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(TRIAGE_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = HashMap::new();
    map.insert("TRIAGE_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRIAGE_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(TRIAGE_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn debug_output_lists_every_field() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    for field in [
        "env: Development",
        "api_url: \"http://127.0.0.1:8000\"",
        "log_level: \"warn\"",
        "session_path:",
        "request_timeout_secs: 30",
        "user_agent: \"triage/0.1 (admin-console)\"",
    ] {
        assert!(rendered.contains(field), "missing {field} in: {rendered}");
    }
}
