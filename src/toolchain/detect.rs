//! Toolchain auto-detection.
//!
//! Each family has a [`DetectionSignature`]: environment variables that name
//! an install root, well-known install roots, and whether `PATH` is searched.
//! A root matches when `<root>/<bin dir>/<c compiler>` exists.
//!
//! Detection only ever fills empty master paths or adds new root
//! descriptors, so running it twice registers nothing new the second time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::builtin::builtin_name;
use super::descriptor::CompilerDescriptor;
use super::registry::CompilerRegistry;
use super::types::{CompilerFamily, CompilerId};

/// Host facts the probe looks at.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;

    fn is_file(&self, path: &Path) -> bool;

    /// Resolve symlinks so `/bin` and `/usr/bin` count as one location.
    fn canonicalize_dir(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }

    /// Install roots known through other channels (the Windows registry).
    fn extra_roots(&self, _family: CompilerFamily) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// The real host, with optional variable overrides.
#[derive(Debug, Default, Clone)]
pub struct HostEnvironment {
    overrides: HashMap<String, String>,
}

impl HostEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }
}

impl Environment for HostEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn canonicalize_dir(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    fn extra_roots(&self, family: CompilerFamily) -> Vec<PathBuf> {
        #[cfg(windows)]
        {
            super::windows::registry_roots(family)
        }

        #[cfg(not(windows))]
        {
            let _ = family;
            Vec::new()
        }
    }
}

/// How to recognise one toolchain family on disk.
#[derive(Debug, Clone, Copy)]
pub struct DetectionSignature {
    pub family: CompilerFamily,
    /// Variables holding an install root
    pub env_vars: &'static [&'static str],
    pub unix_roots: &'static [&'static str],
    pub windows_roots: &'static [&'static str],
    /// Also derive roots from `PATH` entries ending in the bin dir
    pub search_path: bool,
}

impl DetectionSignature {
    pub fn roots(&self) -> &'static [&'static str] {
        if cfg!(windows) {
            self.windows_roots
        } else {
            self.unix_roots
        }
    }
}

pub const SIGNATURES: &[DetectionSignature] = &[
    DetectionSignature {
        family: CompilerFamily::GCC,
        env_vars: &["MINGW_HOME", "GCC_ROOT"],
        unix_roots: &["/usr", "/usr/local", "/opt/local"],
        windows_roots: &[
            r"C:\MinGW",
            r"C:\msys64\mingw64",
            r"C:\msys64\ucrt64",
            r"C:\TDM-GCC-64",
        ],
        search_path: true,
    },
    DetectionSignature {
        family: CompilerFamily::Clang,
        env_vars: &["LLVM_ROOT", "LLVM_HOME"],
        unix_roots: &[
            "/usr",
            "/usr/local",
            "/opt/homebrew/opt/llvm",
            "/usr/local/opt/llvm",
        ],
        windows_roots: &[r"C:\Program Files\LLVM", r"C:\Program Files (x86)\LLVM"],
        search_path: true,
    },
    DetectionSignature {
        family: CompilerFamily::MSVC,
        env_vars: &["VCToolsInstallDir"],
        unix_roots: &[],
        windows_roots: &[],
        search_path: true,
    },
    DetectionSignature {
        family: CompilerFamily::ClangCL,
        env_vars: &["LLVM_ROOT", "LLVM_HOME"],
        unix_roots: &[],
        windows_roots: &[r"C:\Program Files\LLVM", r"C:\Program Files (x86)\LLVM"],
        search_path: false,
    },
];

/// A toolchain installation found on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub family: CompilerFamily,
    pub master_path: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetectionReport {
    pub found: Vec<Installation>,
    /// Descriptors whose empty master path was filled in
    pub filled: Vec<CompilerId>,
    /// Descriptors added for installations nothing represented yet
    pub registered: Vec<CompilerId>,
    pub cancelled: bool,
}

impl DetectionReport {
    pub fn changed(&self) -> bool {
        !self.filled.is_empty() || !self.registered.is_empty()
    }
}

/// Presentation collaborator for detection progress.
pub trait DetectionProgress {
    fn begin(&self, _total: usize) {}

    fn step(&self, _family: CompilerFamily, _found: &[PathBuf]) {}

    fn finish(&self, _report: &DetectionReport) {}

    /// Checked between signatures.
    fn cancelled(&self) -> bool {
        false
    }
}

pub struct NoProgress;

impl DetectionProgress for NoProgress {}

pub struct AutoDetector {
    env: Box<dyn Environment>,
    signatures: Vec<DetectionSignature>,
    progress: Box<dyn DetectionProgress>,
}

impl AutoDetector {
    pub fn new(env: impl Environment + 'static) -> Self {
        Self {
            env: Box::new(env),
            signatures: SIGNATURES.to_vec(),
            progress: Box::new(NoProgress),
        }
    }

    pub fn host() -> Self {
        Self::new(HostEnvironment::new())
    }

    pub fn with_signatures(mut self, signatures: Vec<DetectionSignature>) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn with_progress(mut self, progress: impl DetectionProgress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    fn has_tool(&self, root: &Path, family: CompilerFamily) -> bool {
        let tool = family.default_tools().c_compiler;
        self.env.is_file(&root.join(family.bin_dir()).join(tool))
    }

    /// Map a bin directory back to its install root.
    fn root_of_bin_dir(&self, dir: &Path, family: CompilerFamily) -> Option<PathBuf> {
        let dir = self.env.canonicalize_dir(dir);
        let mut root = dir.as_path();
        for component in Path::new(family.bin_dir()).components().rev() {
            if root.file_name()? != component.as_os_str() {
                return None;
            }
            root = root.parent()?;
        }
        Some(root.to_path_buf())
    }

    fn normalize_root(&self, root: &Path, family: CompilerFamily) -> PathBuf {
        let bin = self.env.canonicalize_dir(&root.join(family.bin_dir()));
        self.root_of_bin_dir(&bin, family)
            .unwrap_or_else(|| root.to_path_buf())
    }

    /// Install roots of `signature`'s family, most explicit source first,
    /// without duplicates.
    pub fn find_roots(&self, signature: &DetectionSignature) -> Vec<PathBuf> {
        let family = signature.family;
        let mut candidates: Vec<PathBuf> = Vec::new();

        for var in signature.env_vars {
            if let Some(value) = self.env.var(var)
                && !value.trim().is_empty()
            {
                candidates.push(PathBuf::from(value.trim()));
            }
        }
        candidates.extend(self.env.extra_roots(family));

        if signature.search_path
            && let Some(path) = self.env.var("PATH")
        {
            for dir in std::env::split_paths(&path) {
                if let Some(root) = self.root_of_bin_dir(&dir, family) {
                    candidates.push(root);
                }
            }
        }
        candidates.extend(signature.roots().iter().map(PathBuf::from));

        let mut roots: Vec<PathBuf> = Vec::new();
        for candidate in candidates {
            if !self.has_tool(&candidate, family) {
                continue;
            }
            let root = self.normalize_root(&candidate, family);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Scan the host and bring `registry` up to date.
    ///
    /// For each installation not yet represented by a same-family descriptor
    /// with that master path: fill the master path of every same-family
    /// descriptor that has none, or, if there are none, register a new root
    /// descriptor. A non-empty master path is never overwritten.
    pub fn detect(&self, registry: &mut CompilerRegistry) -> DetectionReport {
        let mut report = DetectionReport::default();
        self.progress.begin(self.signatures.len());

        for signature in &self.signatures {
            if self.progress.cancelled() {
                log::info!("Compiler auto-detection cancelled");
                report.cancelled = true;
                break;
            }

            let family = signature.family;
            let roots = self.find_roots(signature);
            self.progress.step(family, &roots);

            for root in roots {
                report.found.push(Installation {
                    family,
                    master_path: root.clone(),
                });

                let represented = registry.compilers().iter().any(|c| {
                    c.family() == family
                        && c.has_master_path()
                        && (c.master_path() == root
                            || self.normalize_root(c.master_path(), family) == root)
                });
                if represented {
                    continue;
                }

                let unresolved: Vec<CompilerId> = registry
                    .compilers()
                    .iter()
                    .filter(|c| c.family() == family && !c.has_master_path())
                    .map(|c| c.id().clone())
                    .collect();

                if unresolved.is_empty() {
                    let id = registry.unique_id(family.key());
                    let name = format!("{} ({})", builtin_name(family), root.display());
                    log::info!("Detected {} at {}, registering \"{}\"", family, root.display(), id);
                    registry.register_compiler(
                        CompilerDescriptor::new(id.clone(), name, family).with_master_path(&root),
                    );
                    report.registered.push(id);
                } else {
                    for id in unresolved {
                        if let Some(compiler) = registry.find_mut(&id) {
                            log::info!("Detected {} at {} for \"{}\"", family, root.display(), id);
                            compiler.set_master_path(&root);
                            report.filled.push(id);
                        }
                    }
                }
            }
        }

        self.progress.finish(&report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TomlStore;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeEnv {
        vars: HashMap<String, String>,
        files: HashSet<PathBuf>,
        links: HashMap<PathBuf, PathBuf>,
    }

    impl FakeEnv {
        /// Make `from`'s bin directory resolve to `to`'s.
        fn link_root(mut self, from: &str, to: &str, family: CompilerFamily) -> Self {
            self.links.insert(
                Path::new(from).join(family.bin_dir()),
                Path::new(to).join(family.bin_dir()),
            );
            self
        }

        fn with_var(mut self, k: &str, v: &str) -> Self {
            self.vars.insert(k.to_string(), v.to_string());
            self
        }

        fn tool(mut self, root: &str, family: CompilerFamily) -> Self {
            let tool = family.default_tools().c_compiler;
            self.files
                .insert(Path::new(root).join(family.bin_dir()).join(tool));
            self
        }
    }

    impl Environment for FakeEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.vars.get(name).cloned()
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.contains(path)
        }

        fn canonicalize_dir(&self, path: &Path) -> PathBuf {
            self.links
                .get(path)
                .cloned()
                .unwrap_or_else(|| path.to_path_buf())
        }
    }

    fn gcc_only() -> Vec<DetectionSignature> {
        vec![DetectionSignature {
            family: CompilerFamily::GCC,
            env_vars: &["GCC_ROOT"],
            unix_roots: &["/usr"],
            windows_roots: &["/usr"],
            search_path: true,
        }]
    }

    fn registry() -> CompilerRegistry {
        CompilerRegistry::new(Box::new(TomlStore::in_memory()))
    }

    #[test]
    fn test_find_roots_env_path_and_wellknown_deduplicated() {
        let path = std::env::join_paths(["/opt/gcc-13/bin", "/usr/bin", "/nowhere/bin"])
            .unwrap()
            .into_string()
            .unwrap();
        let env = FakeEnv::default()
            .with_var("GCC_ROOT", "/opt/gcc-13")
            .with_var("PATH", &path)
            .tool("/opt/gcc-13", CompilerFamily::GCC)
            .tool("/usr", CompilerFamily::GCC);
        let detector = AutoDetector::new(env).with_signatures(gcc_only());

        let roots = detector.find_roots(&gcc_only()[0]);
        assert_eq!(
            roots,
            vec![PathBuf::from("/opt/gcc-13"), PathBuf::from("/usr")]
        );
    }

    #[test]
    fn test_symlinked_master_path_counts_as_represented() {
        let env = FakeEnv::default()
            .with_var("GCC_ROOT", "/opt/real-gcc")
            .tool("/opt/real-gcc", CompilerFamily::GCC)
            .link_root("/opt/gcc", "/opt/real-gcc", CompilerFamily::GCC);
        let detector = AutoDetector::new(env).with_signatures(gcc_only());

        let mut reg = registry();
        reg.register_compiler(
            CompilerDescriptor::new("gcc", "GCC", CompilerFamily::GCC).with_master_path("/opt/gcc"),
        );
        reg.register_compiler(CompilerDescriptor::new("gcc-cross", "Cross", CompilerFamily::GCC));

        let report = detector.detect(&mut reg);
        assert_eq!(report.found.len(), 1);
        assert!(!report.changed());
        assert_eq!(reg.len(), 2);
        assert!(!reg.find(&"gcc-cross".into()).unwrap().has_master_path());
    }

    #[test]
    fn test_detect_fills_empty_then_registers_new() {
        let env = FakeEnv::default()
            .with_var("GCC_ROOT", "/opt/gcc-13")
            .tool("/opt/gcc-13", CompilerFamily::GCC)
            .tool("/usr", CompilerFamily::GCC);
        let detector = AutoDetector::new(env).with_signatures(gcc_only());

        let mut reg = registry();
        reg.register_compiler(CompilerDescriptor::new("gcc", "GCC", CompilerFamily::GCC));
        let report = detector.detect(&mut reg);

        assert_eq!(report.filled, vec![CompilerId::new("gcc")]);
        assert_eq!(report.registered, vec![CompilerId::new("gcc-2")]);
        assert_eq!(reg.find(&"gcc".into()).unwrap().master_path(), Path::new("/opt/gcc-13"));
        assert_eq!(reg.find(&"gcc-2".into()).unwrap().master_path(), Path::new("/usr"));
    }

    #[test]
    fn test_detect_twice_is_idempotent() {
        let env = FakeEnv::default()
            .tool("/usr", CompilerFamily::GCC)
            .with_var("GCC_ROOT", "/opt/gcc")
            .tool("/opt/gcc", CompilerFamily::GCC);
        let detector = AutoDetector::new(env).with_signatures(gcc_only());

        let mut reg = registry();
        detector.detect(&mut reg);
        let after_first = reg.len();
        assert_eq!(after_first, 2);

        let second = detector.detect(&mut reg);
        assert_eq!(reg.len(), after_first);
        assert!(!second.changed());
    }

    #[test]
    fn test_detect_never_overwrites_configured_path() {
        let env = FakeEnv::default().tool("/usr", CompilerFamily::GCC);
        let detector = AutoDetector::new(env).with_signatures(gcc_only());

        let mut reg = registry();
        reg.register_compiler(
            CompilerDescriptor::new("gcc", "GCC", CompilerFamily::GCC).with_master_path("/custom/gcc"),
        );
        let report = detector.detect(&mut reg);

        assert_eq!(reg.find(&"gcc".into()).unwrap().master_path(), Path::new("/custom/gcc"));
        assert_eq!(report.registered.len(), 1);
        assert!(report.filled.is_empty());
    }

    #[test]
    fn test_detect_nothing_found_leaves_registry() {
        let detector = AutoDetector::new(FakeEnv::default()).with_signatures(gcc_only());
        let mut reg = registry();
        reg.register_compiler(CompilerDescriptor::new("gcc", "GCC", CompilerFamily::GCC));
        let report = detector.detect(&mut reg);
        assert!(report.found.is_empty());
        assert!(!reg.find(&"gcc".into()).unwrap().has_master_path());
    }

    struct CancelAfterFirst {
        steps: Rc<Cell<usize>>,
    }

    impl DetectionProgress for CancelAfterFirst {
        fn step(&self, _family: CompilerFamily, _found: &[PathBuf]) {
            self.steps.set(self.steps.get() + 1);
        }

        fn cancelled(&self) -> bool {
            self.steps.get() >= 1
        }
    }

    #[test]
    fn test_cancellation_between_signatures() {
        let steps = Rc::new(Cell::new(0));
        let detector = AutoDetector::new(FakeEnv::default()).with_progress(CancelAfterFirst {
            steps: Rc::clone(&steps),
        });
        let mut reg = registry();
        let report = detector.detect(&mut reg);
        assert!(report.cancelled);
        assert_eq!(steps.get(), 1);
    }

    #[test]
    fn test_root_of_bin_dir_requires_bin_suffix() {
        let detector = AutoDetector::new(FakeEnv::default());
        assert_eq!(
            detector.root_of_bin_dir(Path::new("/usr/bin"), CompilerFamily::GCC),
            Some(PathBuf::from("/usr"))
        );
        assert_eq!(
            detector.root_of_bin_dir(Path::new("/usr/lib"), CompilerFamily::GCC),
            None
        );
        assert_eq!(
            detector.root_of_bin_dir(
                Path::new("/vc/14.38/bin/Hostx64/x64"),
                CompilerFamily::MSVC
            ),
            Some(PathBuf::from("/vc/14.38"))
        );
    }
}
