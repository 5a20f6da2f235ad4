use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use client_core::validation::DEFAULT_PLAYER_NAME;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "yolo_terminal.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub headline_refresh_secs: u64,
    pub player_name: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5001".into(),
            request_timeout_secs: 10,
            headline_refresh_secs: 20,
            player_name: DEFAULT_PLAYER_NAME.into(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn headline_period(&self) -> Duration {
        Duration::from_secs(self.headline_refresh_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    headline_refresh_secs: Option<u64>,
    player_name: Option<String>,
}

/// Values given on the command line; they win over the file and the environment.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub server_url: Option<String>,
    pub player_name: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub headline_refresh_secs: Option<u64>,
}

/// Defaults, then the optional config file, then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file.headline_refresh_secs {
        settings.headline_refresh_secs = v;
    }
    if let Some(v) = file.player_name {
        settings.player_name = v;
    }
    Ok(())
}

fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("YOLO_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = lookup("APP__HEADLINE_REFRESH_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.headline_refresh_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__HEADLINE_REFRESH_SECS"),
        }
    }

    if let Some(v) = lookup("APP__PLAYER_NAME") {
        settings.player_name = v;
    }
}

pub fn apply_cli(settings: &mut ClientSettings, cli: CliOverrides) {
    if let Some(v) = cli.server_url {
        settings.server_url = v;
    }
    if let Some(v) = cli.player_name {
        settings.player_name = v;
    }
    if let Some(v) = cli.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = cli.headline_refresh_secs {
        settings.headline_refresh_secs = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
