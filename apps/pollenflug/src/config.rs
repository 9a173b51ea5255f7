use std::{collections::HashMap, fs, io, path::Path, time::Duration};

use anyhow::Context;
use client_core::{DEFAULT_DATASET_URL, DEFAULT_FETCH_TIMEOUT};
use shared::domain::DayKey;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dataset_url: String,
    pub database_url: String,
    pub default_region: String,
    pub default_day: DayKey,
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.into(),
            database_url: default_database_url(),
            default_region: shared::regions::default_region().key(),
            default_day: DayKey::Today,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

fn default_database_url() -> String {
    match dirs::data_local_dir() {
        Some(base) => normalize_database_url(
            base.join("pollenflug")
                .join("pollenflug.sqlite3")
                .to_string_lossy()
                .as_ref(),
        ),
        None => "sqlite://./data/pollenflug.db".into(),
    }
}

/// Defaults, then `path` (flat string keys), then environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    for (key, value) in &file_cfg {
        apply_value(settings, key, value);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["dataset_url", "database_url", "region", "day", "fetch_timeout_secs"] {
        let upper = key.to_ascii_uppercase();
        for name in [format!("POLLENFLUG_{upper}"), format!("APP__{upper}")] {
            if let Some(value) = lookup(&name).filter(|v| !v.trim().is_empty()) {
                apply_value(settings, key, &value);
            }
        }
    }
}

fn apply_value(settings: &mut Settings, key: &str, value: &str) {
    match key {
        "dataset_url" => settings.dataset_url = value.trim().to_string(),
        "database_url" => settings.database_url = normalize_database_url(value),
        "region" => settings.default_region = value.trim().to_string(),
        "day" => match DayKey::parse(value) {
            Some(day) => settings.default_day = day,
            None => warn!(value, "ignoring unknown day setting"),
        },
        "fetch_timeout_secs" => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => settings.fetch_timeout = Duration::from_secs(secs),
            _ => warn!(value, "ignoring invalid fetch timeout"),
        },
        other => warn!(key = other, "ignoring unknown setting"),
    }
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return default_database_url();
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
