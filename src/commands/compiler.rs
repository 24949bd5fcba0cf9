//! Compiler command handler
//!
//! Handles `cbt compiler` subcommands for inspecting and editing the
//! compiler registry.

use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;

use crate::toolchain::{builtin, lineage};
use crate::toolchain::{AutoDetector, CompilerId, CompilerRegistry, DetectionReport, Tool};
use crate::ui;

/// Compiler subcommand operations
#[derive(Clone, Debug)]
pub enum CompilerOp {
    /// List every registered compiler
    List,
    /// Show one compiler with its lineage and options
    Show { id: String },
    /// Derive a user copy of a compiler
    Copy { id: String, name: Option<String> },
    /// Remove a compiler, relinking its children
    Remove { id: String, yes: bool },
    /// Select the default compiler
    Default { id: String },
    /// Run toolchain auto-detection
    Detect,
    /// Set the master path of a compiler
    SetPath { id: String, path: PathBuf },
}

pub fn handle_compiler_command(
    op: CompilerOp,
    registry: &mut CompilerRegistry,
    detector: &AutoDetector,
) -> Result<()> {
    match op {
        CompilerOp::List => {
            list_compilers(registry);
            Ok(())
        }
        CompilerOp::Show { id } => show_compiler(registry, &CompilerId::new(id)),
        CompilerOp::Copy { id, name } => copy_compiler(registry, &CompilerId::new(id), name),
        CompilerOp::Remove { id, yes } => remove_compiler(registry, &CompilerId::new(id), yes),
        CompilerOp::Default { id } => set_default(registry, &CompilerId::new(id)),
        CompilerOp::Detect => run_detection(registry, detector),
        CompilerOp::SetPath { id, path } => set_master_path(registry, &CompilerId::new(id), path),
    }
}

fn display_path(path: &std::path::Path) -> String {
    if path.as_os_str().is_empty() {
        "(not found)".dimmed().to_string()
    } else {
        path.display().to_string()
    }
}

/// Table rows for the registry, default marked with `*`.
pub fn compiler_rows(registry: &CompilerRegistry) -> Vec<Vec<String>> {
    let default = registry.default_compiler().map(|c| c.id().clone());
    registry
        .compilers()
        .iter()
        .enumerate()
        .map(|(index, compiler)| {
            let marker = if Some(compiler.id()) == default.as_ref() {
                "*"
            } else {
                ""
            };
            vec![
                format!("{}{}", index, marker),
                compiler.id().to_string(),
                compiler.name().to_string(),
                compiler.family().to_string(),
                display_path(compiler.master_path()),
                compiler
                    .parent()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect()
}

fn list_compilers(registry: &CompilerRegistry) {
    if registry.is_empty() {
        println!("{} No compilers registered.", "x".red());
        return;
    }

    println!("{}", "Registered Compilers:".bold());
    let mut table = ui::Table::new(&["#", "Id", "Name", "Family", "Master Path", "Parent"]);
    for row in compiler_rows(registry) {
        let is_default = row[0].ends_with('*');
        if is_default {
            table.add_row(row.into_iter().map(|s| s.green().bold().to_string()).collect());
        } else {
            table.add_row(row);
        }
    }
    table.print();
}

fn show_compiler(registry: &CompilerRegistry, id: &CompilerId) -> Result<()> {
    let compiler = registry
        .find(id)
        .with_context(|| format!("Unknown compiler '{}'", id))?;

    println!("{} {}", compiler.name().bold(), format!("({})", compiler.id()).dimmed());
    println!("   Family:      {}", compiler.family().to_string().cyan());
    println!("   Master path: {}", display_path(compiler.master_path()));
    if registry.default_compiler().map(|c| c.id()) == Some(compiler.id()) {
        println!("   Default:     {}", "yes".green());
    }

    let chain = lineage::ancestors(registry, id);
    if !chain.is_empty() {
        let names: Vec<String> = chain.iter().map(|c| c.id().to_string()).collect();
        println!("   Derived from: {}", names.join(" <- "));
    }
    let children: Vec<&str> = registry
        .compilers()
        .iter()
        .filter(|c| lineage::is_ancestor(registry, id, c.id()))
        .map(|c| c.id().as_str())
        .collect();
    if !children.is_empty() {
        println!("   Descendants: {}", children.join(", "));
    }

    println!("{}", "Tools:".bold());
    for tool in Tool::ALL {
        println!("   {:<13} {}", tool.key(), compiler.tools().get(tool));
    }

    if !compiler.options().is_empty() {
        println!("{}", "Options:".bold());
        for category in crate::build::OptionCategory::ALL {
            let values = compiler.options().get(category);
            if !values.is_empty() {
                println!("   {:<13} {}", category.key(), values.join(" "));
            }
        }
    }
    Ok(())
}

fn copy_compiler(registry: &mut CompilerRegistry, id: &CompilerId, name: Option<String>) -> Result<()> {
    let index = registry.create_compiler_copy(id)?;
    let copy = registry
        .get_mut(index)
        .with_context(|| format!("Copy of '{}' vanished", id))?;
    if let Some(name) = name {
        copy.set_name(name);
    }
    let new_id = copy.id().clone();
    registry
        .save_settings()
        .context("Failed to save compiler settings")?;
    println!("{} Created {} from {}", "✓".green(), new_id.to_string().bold(), id);
    Ok(())
}

fn remove_compiler(registry: &mut CompilerRegistry, id: &CompilerId, yes: bool) -> Result<()> {
    let Some(compiler) = registry.find(id) else {
        anyhow::bail!("Unknown compiler '{}'", id);
    };
    if builtin::is_builtin(compiler) {
        anyhow::bail!(
            "Compiler '{}' is built in and cannot be removed\n\n💡 Tip: use 'cbt compiler copy {}' to derive an editable copy",
            id,
            id
        );
    }
    if !yes {
        let confirm = inquire::Confirm::new(&format!("Remove compiler '{}'?", id))
            .with_default(false)
            .prompt()?;
        if !confirm {
            println!("{} Cancelled", "!".yellow());
            return Ok(());
        }
    }
    let removed = registry
        .remove_compiler(id)
        .context("Failed to save compiler settings")?;
    println!("{} Removed {}", "✓".green(), removed.name().bold());
    Ok(())
}

fn set_default(registry: &mut CompilerRegistry, id: &CompilerId) -> Result<()> {
    if !registry.set_default_compiler(id) {
        anyhow::bail!("Unknown compiler '{}'", id);
    }
    registry
        .save_settings()
        .context("Failed to save compiler settings")?;
    println!("{} Default compiler is now {}", "✓".green(), id.to_string().bold());
    Ok(())
}

/// Summary lines for a detection run.
pub fn describe_report(report: &DetectionReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .found
        .iter()
        .map(|i| format!("found {} at {}", i.family, i.master_path.display()))
        .collect();
    lines.extend(report.filled.iter().map(|id| format!("configured {}", id)));
    lines.extend(report.registered.iter().map(|id| format!("registered {}", id)));
    lines
}

fn run_detection(registry: &mut CompilerRegistry, detector: &AutoDetector) -> Result<()> {
    let report = detector.detect(registry);
    if report.found.is_empty() {
        println!("{} No toolchains found.", "x".red());
    }
    for line in describe_report(&report) {
        println!("   {}", line);
    }
    if report.changed() {
        registry
            .save_settings()
            .context("Failed to save compiler settings")?;
        println!("{} Compiler settings updated", "✓".green());
    } else if !report.found.is_empty() {
        println!("{} Nothing new to register", "✓".green());
    }
    Ok(())
}

fn set_master_path(registry: &mut CompilerRegistry, id: &CompilerId, path: PathBuf) -> Result<()> {
    let compiler = registry
        .find_mut(id)
        .with_context(|| format!("Unknown compiler '{}'", id))?;
    compiler.set_master_path(&path);
    if !compiler.bin_path().is_dir() {
        println!(
            "{} {} does not exist yet",
            "!".yellow(),
            compiler.bin_path().display()
        );
    }
    registry
        .save_settings()
        .context("Failed to save compiler settings")?;
    println!("{} {} now uses {}", "✓".green(), id, path.display());
    Ok(())
}
