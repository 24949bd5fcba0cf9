//! Projects and build targets as seen by the option resolver.

use serde::{Deserialize, Serialize};

use super::options::{OptionCategory, OptionSet};
use crate::toolchain::{CompilerId, CompilerRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildTarget {
    pub name: String,
    /// Compiler for this target; falls back to the project's
    #[serde(default)]
    pub compiler: Option<CompilerId>,
    #[serde(default)]
    pub options: OptionSet,
}

impl BuildTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub compiler: Option<CompilerId>,
    #[serde(default)]
    pub options: OptionSet,
    #[serde(default, rename = "target")]
    pub targets: Vec<BuildTarget>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn target(&self, name: &str) -> Option<&BuildTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn add_compiler_option(&mut self, option: impl Into<String>) {
        self.options.push(OptionCategory::Compiler, option);
    }

    pub fn add_linker_option(&mut self, option: impl Into<String>) {
        self.options.push(OptionCategory::Linker, option);
    }

    /// Point the project and every target at the registry's default
    /// compiler, as a freshly created project does. Returns the id used.
    pub fn apply_default_compiler(&mut self, registry: &CompilerRegistry) -> Option<CompilerId> {
        let id = registry.default_compiler()?.id().clone();
        self.compiler = Some(id.clone());
        for target in &mut self.targets {
            target.compiler = Some(id.clone());
        }
        Some(id)
    }

    /// Compiler id a target builds with: the target's own, else the project's.
    pub fn compiler_for<'a>(&'a self, target: Option<&'a BuildTarget>) -> Option<&'a CompilerId> {
        target
            .and_then(|t| t.compiler.as_ref())
            .or(self.compiler.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TomlStore;
    use crate::toolchain::{CompilerDescriptor, CompilerFamily};

    const MANIFEST: &str = r#"
name = "demo"
compiler = "gcc"

[options]
compiler = ["-Wall"]

[[target]]
name = "debug"
options = { compiler = ["-g"] }

[[target]]
name = "release"
compiler = "clang"
"#;

    #[test]
    fn test_parse_manifest() {
        let project: Project = toml::from_str(MANIFEST).unwrap();
        assert_eq!(project.name, "demo");
        assert_eq!(project.targets.len(), 2);
        assert_eq!(project.target("debug").unwrap().options.compiler, vec!["-g"]);
        assert_eq!(
            project.target("release").unwrap().compiler,
            Some(CompilerId::new("clang"))
        );
    }

    #[test]
    fn test_compiler_for_falls_back_to_project() {
        let project: Project = toml::from_str(MANIFEST).unwrap();
        let debug = project.target("debug");
        let release = project.target("release");
        assert_eq!(project.compiler_for(debug).unwrap().as_str(), "gcc");
        assert_eq!(project.compiler_for(release).unwrap().as_str(), "clang");
        assert_eq!(project.compiler_for(None).unwrap().as_str(), "gcc");
    }

    #[test]
    fn test_compiler_for_target_outside_project() {
        let project: Project = toml::from_str(MANIFEST).unwrap();
        let mut scratch = BuildTarget::new("scratch");
        scratch.compiler = Some("msvc".into());
        let id = project.compiler_for(Some(&scratch)).cloned();
        drop(scratch);
        assert_eq!(id.unwrap().as_str(), "msvc");
    }

    #[test]
    fn test_add_options_append() {
        let mut project = Project::new("demo");
        project.add_compiler_option("-D__GNUWIN32__");
        project.add_compiler_option("-DBUILDING_PLUGIN");
        project.add_linker_option("-mthreads");
        assert_eq!(project.options.compiler, vec!["-D__GNUWIN32__", "-DBUILDING_PLUGIN"]);
        assert_eq!(project.options.linker, vec!["-mthreads"]);
    }

    #[test]
    fn test_apply_default_compiler() {
        let mut registry = CompilerRegistry::new(Box::new(TomlStore::in_memory()));
        registry.register_compiler(CompilerDescriptor::new("gcc", "GCC", CompilerFamily::GCC));
        registry.register_compiler(CompilerDescriptor::new("clang", "Clang", CompilerFamily::Clang));
        registry.set_default_compiler_index(1);

        let mut project = Project::new("demo");
        project.targets.push(BuildTarget::new("debug"));
        project.targets.push(BuildTarget::new("release"));

        let id = project.apply_default_compiler(&registry).unwrap();
        assert_eq!(id.as_str(), "clang");
        assert!(project.targets.iter().all(|t| t.compiler == Some(id.clone())));
    }

    #[test]
    fn test_apply_default_compiler_on_empty_registry() {
        let registry = CompilerRegistry::new(Box::new(TomlStore::in_memory()));
        let mut project = Project::new("demo");
        assert!(project.apply_default_compiler(&registry).is_none());
        assert!(project.compiler.is_none());
    }
}
