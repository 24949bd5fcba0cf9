//! Ordered option sets shared by compilers, projects and build targets.
//!
//! Order is significant (library link order, last-wins flags), so every
//! category is a plain `Vec<String>`. Nothing here deduplicates.

use serde::{Deserialize, Serialize};

/// Named option categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionCategory {
    /// Flags passed to the compiler (`-Wall`, `-O2`, `/EHsc`)
    Compiler,
    /// Flags passed to the linker
    Linker,
    /// Libraries to link against, without prefix/suffix
    LinkLibraries,
    /// Include search directories
    IncludeDirs,
    /// Library search directories
    LibDirs,
}

impl OptionCategory {
    pub const ALL: [OptionCategory; 5] = [
        OptionCategory::Compiler,
        OptionCategory::Linker,
        OptionCategory::LinkLibraries,
        OptionCategory::IncludeDirs,
        OptionCategory::LibDirs,
    ];

    /// Settings and manifest key of this category.
    pub fn key(&self) -> &'static str {
        match self {
            OptionCategory::Compiler => "compiler",
            OptionCategory::Linker => "linker",
            OptionCategory::LinkLibraries => "libs",
            OptionCategory::IncludeDirs => "include_dirs",
            OptionCategory::LibDirs => "lib_dirs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSet {
    pub compiler: Vec<String>,
    pub linker: Vec<String>,
    pub libs: Vec<String>,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
}

impl OptionSet {
    pub fn get(&self, category: OptionCategory) -> &[String] {
        match category {
            OptionCategory::Compiler => &self.compiler,
            OptionCategory::Linker => &self.linker,
            OptionCategory::LinkLibraries => &self.libs,
            OptionCategory::IncludeDirs => &self.include_dirs,
            OptionCategory::LibDirs => &self.lib_dirs,
        }
    }

    pub fn get_mut(&mut self, category: OptionCategory) -> &mut Vec<String> {
        match category {
            OptionCategory::Compiler => &mut self.compiler,
            OptionCategory::Linker => &mut self.linker,
            OptionCategory::LinkLibraries => &mut self.libs,
            OptionCategory::IncludeDirs => &mut self.include_dirs,
            OptionCategory::LibDirs => &mut self.lib_dirs,
        }
    }

    pub fn push(&mut self, category: OptionCategory, value: impl Into<String>) {
        self.get_mut(category).push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        OptionCategory::ALL.iter().all(|c| self.get(*c).is_empty())
    }

    /// Append every category of `other` after the entries already present.
    pub fn append(&mut self, other: &OptionSet) {
        for category in OptionCategory::ALL {
            self.get_mut(category)
                .extend(other.get(category).iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let mut base = OptionSet::default();
        base.push(OptionCategory::Compiler, "-Wall");
        base.push(OptionCategory::LinkLibraries, "m");

        let mut more = OptionSet::default();
        more.push(OptionCategory::Compiler, "-Wall");
        more.push(OptionCategory::Compiler, "-O2");
        more.push(OptionCategory::LinkLibraries, "pthread");

        base.append(&more);
        assert_eq!(base.compiler, vec!["-Wall", "-Wall", "-O2"]);
        assert_eq!(base.libs, vec!["m", "pthread"]);
    }

    #[test]
    fn test_deserialize_partial_manifest_table() {
        let set: OptionSet = toml::from_str(r#"compiler = ["-g"]"#).unwrap();
        assert_eq!(set.compiler, vec!["-g"]);
        assert!(set.linker.is_empty());
        assert!(!set.is_empty());
    }
}
