//! Settings store: the JSON file listing where reports may be sent.
//!
//! File schema: `{ "Channels": [ { "name": "...", "id": "C..." } ] }`.
//! The file is read once at startup; edits require a restart.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use crate::{errors::Error, Result};

pub const PLACEHOLDER_NAME: &str = "Report Box";
pub const PLACEHOLDER_ID: &str = "C1234567890";

/// A place a report can be routed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub id: String,
}

impl Destination {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Root configuration object. Order of `channels` is display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "Channels", default)]
    pub channels: Vec<Destination>,
}

impl Settings {
    /// One placeholder destination, written on first run.
    pub fn placeholder() -> Self {
        Self {
            channels: vec![Destination::new(PLACEHOLDER_NAME, PLACEHOLDER_ID)],
        }
    }
}

#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load settings, pausing on stdin for the operator when the file had to be created.
    pub fn load(&self) -> Result<Settings> {
        self.load_with_gate(wait_for_enter)
    }

    /// Load settings; `gate` runs after a default file has been written.
    ///
    /// A fresh install returns empty settings for this run, so the operator has
    /// to fill in real destinations and restart. A malformed file is an error.
    pub fn load_with_gate<F>(&self, gate: F) -> Result<Settings>
    where
        F: FnOnce() -> io::Result<()>,
    {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    "Settings file not found. Creating new settings file at {}",
                    self.path.display()
                );
                self.save(&Settings::placeholder())?;
                gate()?;
                Ok(Settings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the file with `settings`, pretty-printed with 4-space indentation.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, to_pretty_json(settings)?)?;
        Ok(())
    }
}

fn to_pretty_json(settings: &Settings) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    settings.serialize(&mut ser).map_err(Error::Json)?;
    Ok(buf)
}

fn wait_for_enter() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(b"Press Enter to continue...")?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn test_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "anonbot-settings-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("settings.json")
    }

    #[test]
    fn missing_file_writes_placeholder_and_returns_empty() {
        let path = test_path("fresh");
        let store = SettingsStore::new(&path);
        let gate_calls = Cell::new(0);

        let loaded = store
            .load_with_gate(|| {
                gate_calls.set(gate_calls.get() + 1);
                Ok(())
            })
            .unwrap();

        assert_eq!(gate_calls.get(), 1);
        assert!(loaded.channels.is_empty());

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!({"Channels": [{"name": "Report Box", "id": "C1234567890"}]})
        );
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn saved_file_uses_four_space_indent() {
        let path = test_path("indent");
        SettingsStore::new(&path)
            .save(&Settings::placeholder())
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n    \"Channels\": [\n        {\n            \"name\""));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let path = test_path("roundtrip");
        let store = SettingsStore::new(&path);
        let settings = Settings {
            channels: vec![
                Destination::new("Support", "C222"),
                Destination::new("Sales", "C111"),
            ],
        };

        store.save(&settings).unwrap();
        let loaded = store
            .load_with_gate(|| panic!("gate must not run when the file exists"))
            .unwrap();

        assert_eq!(loaded, settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn save_into_unwritable_location_is_io_error() {
        let path = test_path("unwritable");
        let dir = path.parent().unwrap();
        fs::create_dir_all(dir).unwrap();
        // A regular file where a directory is expected fails even for root.
        let blocker = dir.join("blocker");
        fs::write(&blocker, "x").unwrap();

        let err = SettingsStore::new(blocker.join("settings.json"))
            .save(&Settings::placeholder())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = test_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = SettingsStore::new(&path)
            .load_with_gate(|| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
