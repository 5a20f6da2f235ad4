use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_game_server() {
    let settings = ClientSettings::default();
    assert_eq!(settings.server_url, "http://127.0.0.1:5001");
    assert_eq!(settings.request_timeout(), Duration::from_secs(10));
    assert_eq!(settings.headline_period(), Duration::from_secs(20));
    assert_eq!(settings.player_name, "Trader");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = ClientSettings::default();
    apply_file(
        &mut settings,
        "server_url = \"http://game.local:8080\"\nheadline_refresh_secs = 5\n",
    )
    .expect("valid toml");

    assert_eq!(settings.server_url, "http://game.local:8080");
    assert_eq!(settings.headline_refresh_secs, 5);
    assert_eq!(settings.request_timeout_secs, 10);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = ClientSettings::default();
    assert!(apply_file(&mut settings, "sever_url = \"typo\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = ClientSettings::default();
    apply_env(
        &mut settings,
        lookup_from(&[
            ("YOLO_SERVER_URL", "http://plain:1"),
            ("APP__SERVER_URL", "http://prefixed:2"),
            ("APP__PLAYER_NAME", "Ada"),
        ]),
    );

    assert_eq!(settings.server_url, "http://prefixed:2");
    assert_eq!(settings.player_name, "Ada");
}

#[test]
fn unparsable_env_numbers_are_ignored() {
    let mut settings = ClientSettings::default();
    apply_env(
        &mut settings,
        lookup_from(&[
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
            ("APP__HEADLINE_REFRESH_SECS", "45"),
        ]),
    );

    assert_eq!(settings.request_timeout_secs, 10);
    assert_eq!(settings.headline_refresh_secs, 45);
}

#[test]
fn cli_overrides_win_last() {
    let mut settings = ClientSettings::default();
    apply_cli(
        &mut settings,
        CliOverrides {
            request_timeout_secs: Some(3),
            ..CliOverrides::default()
        },
    );

    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    assert_eq!(settings.server_url, "http://127.0.0.1:5001");
}

#[test]
fn zero_durations_are_floored_to_one_second() {
    let settings = ClientSettings {
        request_timeout_secs: 0,
        headline_refresh_secs: 0,
        ..ClientSettings::default()
    };
    assert_eq!(settings.request_timeout(), Duration::from_secs(1));
    assert_eq!(settings.headline_period(), Duration::from_secs(1));
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("yolo_terminal_missing_{suffix}.toml"));

    let settings = load_settings(&path).expect("load");
    assert_eq!(settings.request_timeout_secs, ClientSettings::default().request_timeout_secs);
}

#[test]
fn malformed_config_file_is_an_error() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("yolo_terminal_bad_{suffix}.toml"));
    fs::write(&path, "server_url = [").expect("write config");

    let err = load_settings(&path).expect_err("malformed toml");
    assert!(err.to_string().contains("invalid config file"));

    fs::remove_file(path).expect("cleanup");
}
