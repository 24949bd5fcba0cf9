//! Project manifest loading (`cbt.toml`).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::build::Project;

/// Default manifest file name looked up in the current directory
pub const MANIFEST_FILE: &str = "cbt.toml";

/// Load a project manifest from `path`.
pub fn load_project(path: &Path) -> Result<Project> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} not found.\n\n\
            💡 Tip: Pass --project <FILE> or create a {} with a [options] table.",
            path.display(),
            MANIFEST_FILE
        ));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} - check file permissions", path.display()))?;
    parse_project(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse manifest text. Target names must be unique.
pub fn parse_project(content: &str) -> Result<Project> {
    let project: Project = toml::from_str(content)
        .context("Invalid manifest - check for syntax errors (missing quotes, brackets)")?;

    let mut seen = std::collections::HashSet::new();
    for target in &project.targets {
        if !seen.insert(target.name.as_str()) {
            anyhow::bail!("Duplicate build target '{}'", target.name);
        }
    }
    log::debug!(
        "Loaded project '{}' with {} target(s)",
        project.name,
        project.targets.len()
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project(&dir.path().join(MANIFEST_FILE)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_manifest_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        fs::write(
            &path,
            "name = \"app\"\ncompiler = \"gcc\"\n[options]\nlinker = [\"-s\"]\n",
        )
        .unwrap();
        let project = load_project(&path).unwrap();
        assert_eq!(project.name, "app");
        assert_eq!(project.options.linker, vec!["-s"]);
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let manifest = "name = \"app\"\n[[target]]\nname = \"a\"\n[[target]]\nname = \"a\"\n";
        let err = parse_project(manifest).unwrap_err();
        assert!(err.to_string().contains("Duplicate build target"));
    }

    #[test]
    fn test_syntax_error_reported() {
        assert!(parse_project("name = ").is_err());
    }
}
