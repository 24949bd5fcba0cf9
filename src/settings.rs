//! Hierarchical key-value settings store.
//!
//! Paths look like `/sets/set000/name`. Intermediate segments are tables,
//! the last segment holds a value. The registry only talks to the
//! [`ConfigStore`] trait; [`TomlStore`] keeps everything in a `toml::Table`
//! and optionally mirrors it to a file on [`ConfigStore::flush`].

use std::fs;
use std::path::PathBuf;

/// A value stored at a leaf path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Str(String),
    Int(i64),
    List(Vec<String>),
}

/// Persistence collaborator consumed by the compiler registry.
pub trait ConfigStore {
    fn read(&self, path: &str) -> Option<ConfigValue>;

    fn write(&mut self, path: &str, value: ConfigValue);

    /// Names of the child tables directly under `path`, sorted.
    fn enumerate_subpaths(&self, path: &str) -> Vec<String>;

    /// Remove the value or table at `path`.
    fn unset(&mut self, path: &str);

    /// Push pending writes to durable storage.
    fn flush(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }

    fn read_str(&self, path: &str) -> Option<String> {
        match self.read(path)? {
            ConfigValue::Str(s) => Some(s),
            ConfigValue::Int(i) => Some(i.to_string()),
            ConfigValue::List(_) => None,
        }
    }

    fn read_int(&self, path: &str) -> Option<i64> {
        match self.read(path)? {
            ConfigValue::Int(i) => Some(i),
            ConfigValue::Str(s) => s.trim().parse().ok(),
            ConfigValue::List(_) => None,
        }
    }

    fn read_list(&self, path: &str) -> Option<Vec<String>> {
        match self.read(path)? {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    fn write_str(&mut self, path: &str, value: &str) {
        self.write(path, ConfigValue::Str(value.to_string()));
    }

    fn write_int(&mut self, path: &str, value: i64) {
        self.write(path, ConfigValue::Int(value));
    }

    fn write_list(&mut self, path: &str, value: &[String]) {
        self.write(path, ConfigValue::List(value.to_vec()));
    }
}

/// Error type for settings persistence
#[derive(Debug)]
pub enum SettingsError {
    /// Settings file exists but is not valid TOML
    Parse(String),
    /// Settings could not be serialized
    Serialize(String),
    /// IO error
    Io(std::io::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Parse(msg) => write!(f, "Invalid settings file: {}", msg),
            SettingsError::Serialize(msg) => write!(f, "Failed to serialize settings: {}", msg),
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

/// TOML-backed store. Without a file path it lives purely in memory.
#[derive(Debug, Default, Clone)]
pub struct TomlStore {
    root: toml::Table,
    path: Option<PathBuf>,
}

impl TomlStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store mirrored to `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let root = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str::<toml::Table>(&content)
                .map_err(|e| SettingsError::Parse(e.to_string()))?
        } else {
            toml::Table::new()
        };
        Ok(Self {
            root,
            path: Some(path),
        })
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(&self.root).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    fn table_at(&self, segments: &[&str]) -> Option<&toml::Table> {
        let mut table = &self.root;
        for seg in segments {
            table = table.get(*seg)?.as_table()?;
        }
        Some(table)
    }

    fn table_at_mut(&mut self, segments: &[&str]) -> Option<&mut toml::Table> {
        let mut table = &mut self.root;
        for seg in segments {
            let entry = table
                .entry(seg.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if !entry.is_table() {
                *entry = toml::Value::Table(toml::Table::new());
            }
            table = entry.as_table_mut()?;
        }
        Some(table)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn from_toml(value: &toml::Value) -> Option<ConfigValue> {
    match value {
        toml::Value::String(s) => Some(ConfigValue::Str(s.clone())),
        toml::Value::Integer(i) => Some(ConfigValue::Int(*i)),
        toml::Value::Boolean(b) => Some(ConfigValue::Int(i64::from(*b))),
        toml::Value::Array(items) => Some(ConfigValue::List(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )),
        _ => None,
    }
}

fn to_toml(value: ConfigValue) -> toml::Value {
    match value {
        ConfigValue::Str(s) => toml::Value::String(s),
        ConfigValue::Int(i) => toml::Value::Integer(i),
        ConfigValue::List(items) => {
            toml::Value::Array(items.into_iter().map(toml::Value::String).collect())
        }
    }
}

impl ConfigStore for TomlStore {
    fn read(&self, path: &str) -> Option<ConfigValue> {
        let segments = split_path(path);
        let (leaf, parents) = segments.split_last()?;
        self.table_at(parents)?.get(*leaf).and_then(from_toml)
    }

    fn write(&mut self, path: &str, value: ConfigValue) {
        let segments = split_path(path);
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };
        if let Some(table) = self.table_at_mut(parents) {
            table.insert(leaf.to_string(), to_toml(value));
        }
    }

    fn enumerate_subpaths(&self, path: &str) -> Vec<String> {
        let segments = split_path(path);
        let Some(table) = self.table_at(&segments) else {
            return Vec::new();
        };
        let mut names: Vec<String> = table
            .iter()
            .filter(|(_, v)| v.is_table())
            .map(|(k, _)| k.clone())
            .collect();
        names.sort();
        names
    }

    fn unset(&mut self, path: &str) {
        let segments = split_path(path);
        let Some((leaf, parents)) = segments.split_last() else {
            self.root.clear();
            return;
        };
        let mut table = &mut self.root;
        for seg in parents {
            let Some(next) = table.get_mut(*seg).and_then(toml::Value::as_table_mut) else {
                return;
            };
            table = next;
        }
        table.remove(*leaf);
    }

    fn flush(&mut self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
