//! Build-option resolution.
//!
//! The effective options for a target are the compiler's, then the
//! project's, then the target's, concatenated per category. Later entries
//! can override earlier ones where the toolchain honours "last wins".
//! Nothing is deduplicated or reordered.

use std::fmt;
use std::path::PathBuf;

use super::options::{OptionCategory, OptionSet};
use super::project::{BuildTarget, Project};
use crate::toolchain::{CompilerFamily, CompilerId, CompilerRegistry, Tool, ToolNames};

/// Error type for option resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The compiler id is not registered
    UnknownCompiler(CompilerId),
    /// The compiler is registered but its installation was never located
    ToolchainNotConfigured(CompilerId),
    /// Neither the target nor the project names a compiler
    NoCompilerSelected,
    /// The project has no target with this name
    UnknownTarget(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownCompiler(id) => {
                write!(f, "Unknown compiler '{}'. Select a valid compiler.", id)
            }
            ResolveError::ToolchainNotConfigured(id) => write!(
                f,
                "Compiler '{}' has no master path. Run auto-detection or set it manually.",
                id
            ),
            ResolveError::NoCompilerSelected => {
                write!(f, "No compiler selected for this project or target")
            }
            ResolveError::UnknownTarget(name) => write!(f, "Unknown build target '{}'", name),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Options ready to hand to the toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub compiler_id: CompilerId,
    pub family: CompilerFamily,
    pub bin_path: PathBuf,
    pub tools: ToolNames,
    pub options: OptionSet,
}

impl ResolvedOptions {
    pub fn compile_flags(&self) -> &[String] {
        self.options.get(OptionCategory::Compiler)
    }

    pub fn link_flags(&self) -> &[String] {
        self.options.get(OptionCategory::Linker)
    }

    pub fn include_dirs(&self) -> &[String] {
        self.options.get(OptionCategory::IncludeDirs)
    }

    pub fn lib_dirs(&self) -> &[String] {
        self.options.get(OptionCategory::LibDirs)
    }

    pub fn link_libraries(&self) -> &[String] {
        self.options.get(OptionCategory::LinkLibraries)
    }

    /// Absolute path of one of the toolchain's executables.
    pub fn tool_path(&self, tool: Tool) -> PathBuf {
        self.bin_path.join(self.tools.get(tool))
    }

    /// Compiler flags followed by include switches.
    pub fn compiler_args(&self) -> Vec<String> {
        let switches = self.family.switches();
        let mut args: Vec<String> = self.compile_flags().to_vec();
        args.extend(
            self.include_dirs()
                .iter()
                .map(|dir| format!("{}{}", switches.include_dir, dir)),
        );
        args
    }

    /// Linker flags, library search switches, then libraries in order.
    pub fn linker_args(&self) -> Vec<String> {
        let switches = self.family.switches();
        let mut args: Vec<String> = self.link_flags().to_vec();
        args.extend(
            self.lib_dirs()
                .iter()
                .map(|dir| format!("{}{}", switches.lib_dir, dir)),
        );
        args.extend(self.link_libraries().iter().map(|lib| {
            if lib.ends_with(switches.link_lib_suffix) && !switches.link_lib_suffix.is_empty() {
                lib.clone()
            } else {
                format!(
                    "{}{}{}",
                    switches.link_lib_prefix, lib, switches.link_lib_suffix
                )
            }
        }));
        args
    }
}

/// Resolve options for `target` of `project` (or the project alone) built
/// with `compiler_id`.
pub fn resolve(
    registry: &CompilerRegistry,
    project: &Project,
    target: Option<&BuildTarget>,
    compiler_id: &CompilerId,
) -> Result<ResolvedOptions, ResolveError> {
    let compiler = registry
        .find(compiler_id)
        .ok_or_else(|| ResolveError::UnknownCompiler(compiler_id.clone()))?;
    if !compiler.has_master_path() {
        return Err(ResolveError::ToolchainNotConfigured(compiler_id.clone()));
    }

    let mut options = compiler.options().clone();
    options.append(&project.options);
    if let Some(target) = target {
        options.append(&target.options);
    }

    Ok(ResolvedOptions {
        compiler_id: compiler_id.clone(),
        family: compiler.family(),
        bin_path: compiler.bin_path(),
        tools: compiler.tools().clone(),
        options,
    })
}

/// Resolve options for the named target using the compiler the target (or
/// its project) selects. There is no fallback to the default compiler.
pub fn resolve_target(
    registry: &CompilerRegistry,
    project: &Project,
    target_name: Option<&str>,
) -> Result<ResolvedOptions, ResolveError> {
    let target = match target_name {
        Some(name) => Some(
            project
                .target(name)
                .ok_or_else(|| ResolveError::UnknownTarget(name.to_string()))?,
        ),
        None => None,
    };
    let compiler_id = project
        .compiler_for(target)
        .ok_or(ResolveError::NoCompilerSelected)?;
    resolve(registry, project, target, compiler_id)
}
