use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Typed process configuration.
///
/// Credentials come from the environment only; the destination list lives in
/// the settings file (see [`crate::settings`]).
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub slack_bot_token: String,
    pub slack_app_token: String,

    // Paths
    pub data_dir: PathBuf,
    pub settings_file: PathBuf,
    pub log_dir: PathBuf,

    // Runtime
    pub log_retention_days: usize,
    pub reconnect_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let slack_bot_token = required("SLACK_BOT_TOKEN")?;
        let slack_app_token = required("SLACK_APP_TOKEN")?;

        let data_dir = env_path("ANONBOT_DATA_DIR").unwrap_or_else(default_data_dir);
        let settings_file = data_dir.join(
            env_str("ANONBOT_SETTINGS_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string()),
        );
        let log_dir = data_dir.join("logs");

        fs::create_dir_all(&log_dir)?;

        let log_retention_days = env_usize("ANONBOT_LOG_RETENTION_DAYS").unwrap_or(30);
        let reconnect_delay =
            Duration::from_secs(env_u64("ANONBOT_RECONNECT_DELAY_SECS").unwrap_or(5));

        Ok(Self {
            slack_bot_token,
            slack_app_token,
            data_dir,
            settings_file,
            log_dir,
            log_retention_days,
            reconnect_delay,
        })
    }
}

/// `data/` next to the executable, or `./data` when that cannot be resolved.
fn default_data_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("data")))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn required(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_str(key).and_then(non_empty).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
