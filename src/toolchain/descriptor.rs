//! The compiler descriptor: one configured toolchain.

use std::path::{Path, PathBuf};

use super::types::{CompilerFamily, CompilerId, Tool, ToolNames};
use crate::build::{OptionCategory, OptionSet};
use crate::settings::ConfigStore;

/// Data record describing one toolchain.
///
/// An empty `master_path` means the installation has not been located yet;
/// the registry reacts to that by running auto-detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerDescriptor {
    id: CompilerId,
    name: String,
    family: CompilerFamily,
    master_path: PathBuf,
    tools: ToolNames,
    options: OptionSet,
    parent: Option<CompilerId>,
}

impl CompilerDescriptor {
    /// A root descriptor with the family's default tool names.
    pub fn new(id: impl Into<CompilerId>, name: impl Into<String>, family: CompilerFamily) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            family,
            master_path: PathBuf::new(),
            tools: family.default_tools(),
            options: OptionSet::default(),
            parent: None,
        }
    }

    pub fn with_master_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.master_path = path.into();
        self
    }

    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    pub fn id(&self) -> &CompilerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn family(&self) -> CompilerFamily {
        self.family
    }

    pub fn master_path(&self) -> &Path {
        &self.master_path
    }

    pub fn set_master_path(&mut self, path: impl Into<PathBuf>) {
        self.master_path = path.into();
    }

    pub fn has_master_path(&self) -> bool {
        !self.master_path.as_os_str().is_empty()
    }

    pub fn tools(&self) -> &ToolNames {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolNames {
        &mut self.tools
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.options
    }

    pub fn parent(&self) -> Option<&CompilerId> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<CompilerId>) {
        self.parent = parent;
    }

    /// Directory holding the tool executables.
    pub fn bin_path(&self) -> PathBuf {
        self.master_path.join(self.family.bin_dir())
    }

    /// Derive a child descriptor. The source is left untouched.
    pub fn create_copy(&self, new_id: CompilerId) -> CompilerDescriptor {
        CompilerDescriptor {
            id: new_id,
            parent: Some(self.id.clone()),
            ..self.clone()
        }
    }

    /// Write every attribute below `prefix`. The parent link is written by
    /// the registry, which knows the positional layout.
    pub fn save_settings(&self, store: &mut dyn ConfigStore, prefix: &str) {
        store.write_str(&format!("{}/id", prefix), self.id.as_str());
        store.write_str(&format!("{}/family", prefix), self.family.key());
        store.write_str(&format!("{}/name", prefix), &self.name);
        store.write_str(
            &format!("{}/master_path", prefix),
            &self.master_path.to_string_lossy(),
        );
        for tool in Tool::ALL {
            store.write_str(
                &format!("{}/tools/{}", prefix, tool.key()),
                self.tools.get(tool),
            );
        }
        for category in OptionCategory::ALL {
            store.write_list(
                &format!("{}/options/{}", prefix, category.key()),
                self.options.get(category),
            );
        }
    }

    /// Read attributes from below `prefix`.
    ///
    /// Keys that are absent keep their current value, except the master
    /// path: an incomplete record leaves it empty.
    pub fn load_settings(&mut self, store: &dyn ConfigStore, prefix: &str) {
        if let Some(name) = store.read_str(&format!("{}/name", prefix)) {
            self.name = name;
        }
        self.master_path = store
            .read_str(&format!("{}/master_path", prefix))
            .map(PathBuf::from)
            .unwrap_or_default();
        for tool in Tool::ALL {
            if let Some(value) = store.read_str(&format!("{}/tools/{}", prefix, tool.key())) {
                self.tools.set(tool, value);
            }
        }
        for category in OptionCategory::ALL {
            if let Some(values) = store.read_list(&format!("{}/options/{}", prefix, category.key()))
            {
                *self.options.get_mut(category) = values;
            }
        }
    }
}
