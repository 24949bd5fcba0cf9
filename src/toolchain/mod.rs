//! Compiler registry and toolchain discovery
//!
//! Descriptors describe one toolchain each; the registry holds them in order
//! together with the default selection and persists them into a
//! [`ConfigStore`](crate::settings::ConfigStore). Missing installations are
//! located by the auto-detection probe.

pub mod builtin;
pub mod descriptor;
pub mod detect;
pub mod lineage;
pub mod persist;
pub mod registry;
pub mod types;

#[cfg(windows)]
pub mod windows;

pub use descriptor::CompilerDescriptor;
pub use detect::{
    AutoDetector, DetectionProgress, DetectionReport, Environment, HostEnvironment, NoProgress,
};
pub use registry::{CompilerRegistry, LoadOutcome, RestoreSummary};
pub use types::{CompilerError, CompilerFamily, CompilerId, Switches, Tool, ToolNames};

use crate::settings::{SettingsError, TomlStore};
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "CBT_SETTINGS";

/// Get the path to the compiler settings file
pub fn settings_path() -> PathBuf {
    if let Ok(path) = std::env::var(SETTINGS_ENV)
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cbt")
        .join("compilers.toml")
}

/// Open the settings file, build the registry and load it.
///
/// This is the startup sequence: built-ins, persisted descriptors, settings,
/// and auto-detection when something is still unresolved.
pub fn open_registry(
    path: &Path,
    detector: &AutoDetector,
) -> Result<(CompilerRegistry, LoadOutcome), SettingsError> {
    let store = TomlStore::open(path)?;
    let mut registry = CompilerRegistry::new(Box::new(store));
    registry.initialize();
    let outcome = registry.load_settings(detector);
    Ok((registry, outcome))
}
