//! Resolve command handler
//!
//! Handles `cbt resolve`: prints the effective build options of a project
//! or one of its targets.

use anyhow::{Context, Result};
use colored::*;
use serde_json::json;
use std::path::Path;

use crate::build::{self, Project, ResolvedOptions};
use crate::config;
use crate::toolchain::{CompilerId, CompilerRegistry, Tool};

#[derive(Clone, Debug, Default)]
pub struct ResolveArgs {
    pub project: Option<std::path::PathBuf>,
    pub target: Option<String>,
    pub compiler: Option<String>,
    pub json: bool,
}

/// Resolve against an explicit compiler when given, else the one the
/// target or project selects.
pub fn resolve_project(
    registry: &CompilerRegistry,
    project: &Project,
    target: Option<&str>,
    compiler: Option<&str>,
) -> Result<ResolvedOptions> {
    let resolved = match compiler {
        Some(id) => {
            let target = match target {
                Some(name) => Some(
                    project
                        .target(name)
                        .ok_or_else(|| build::ResolveError::UnknownTarget(name.to_string()))?,
                ),
                None => None,
            };
            build::resolve(registry, project, target, &CompilerId::new(id))?
        }
        None => build::resolve_target(registry, project, target)?,
    };
    Ok(resolved)
}

/// JSON view of resolved options, shaped for tooling.
pub fn to_json(project: &Project, target: Option<&str>, resolved: &ResolvedOptions) -> serde_json::Value {
    json!({
        "project": project.name,
        "target": target,
        "compiler": resolved.compiler_id.as_str(),
        "family": resolved.family.key(),
        "c_compiler": resolved.tool_path(Tool::CCompiler).to_string_lossy(),
        "cpp_compiler": resolved.tool_path(Tool::CppCompiler).to_string_lossy(),
        "linker": resolved.tool_path(Tool::Linker).to_string_lossy(),
        "compiler_args": resolved.compiler_args(),
        "linker_args": resolved.linker_args(),
    })
}

fn print_human(project: &Project, target: Option<&str>, resolved: &ResolvedOptions) {
    let scope = match target {
        Some(name) => format!("{} / {}", project.name, name),
        None => project.name.clone(),
    };
    println!(
        "{} {} with {}",
        "⚙".cyan(),
        scope.bold(),
        resolved.compiler_id.to_string().green()
    );
    println!(
        "   compile: {} {}",
        resolved.tool_path(Tool::CppCompiler).display(),
        resolved.compiler_args().join(" ")
    );
    println!(
        "   link:    {} {}",
        resolved.tool_path(Tool::Linker).display(),
        resolved.linker_args().join(" ")
    );
}

pub fn handle_resolve(args: ResolveArgs, registry: &CompilerRegistry) -> Result<()> {
    let manifest = args
        .project
        .unwrap_or_else(|| Path::new(config::MANIFEST_FILE).to_path_buf());
    let project = config::load_project(&manifest)?;

    let resolved = resolve_project(
        registry,
        &project,
        args.target.as_deref(),
        args.compiler.as_deref(),
    )
    .with_context(|| format!("Cannot resolve build options for '{}'", project.name))?;

    if args.json {
        let value = to_json(&project, args.target.as_deref(), &resolved);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_human(&project, args.target.as_deref(), &resolved);
    }
    Ok(())
}
