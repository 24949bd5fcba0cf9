//! The compiler registry.
//!
//! An ordered collection of descriptors plus the default selection. The
//! position of a descriptor is its positional index: transient, re-packed on
//! every removal. The descriptor id is the durable identity, and parent links
//! are ids, so removals never have to shift stored indices.
//!
//! The registry is an ordinary value owned by the application's composition
//! root. Lifecycle: [`CompilerRegistry::new`], [`CompilerRegistry::initialize`],
//! [`CompilerRegistry::load_settings`], ..., [`CompilerRegistry::unregister_all`].

use super::builtin::{builtin_descriptors, builtin_name, is_builtin};
use super::descriptor::CompilerDescriptor;
use super::detect::{AutoDetector, DetectionReport};
use super::persist::{self, PersistedSet};
use super::types::{CompilerError, CompilerId};
use crate::settings::ConfigStore;
use std::collections::HashMap;

/// Persisted descriptors brought back by [`CompilerRegistry::register_user_compilers`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Registered again with their lineage (copies, detected roots)
    pub restored: Vec<CompilerId>,
    /// Registered as roots because their parent could not be resolved
    pub promoted: Vec<CompilerId>,
    /// Dropped: no family to rebuild from and no usable parent
    pub skipped: Vec<CompilerId>,
}

/// What [`CompilerRegistry::load_settings`] did.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// See [`RestoreSummary::restored`]
    pub restored: Vec<CompilerId>,
    /// See [`RestoreSummary::promoted`]
    pub promoted: Vec<CompilerId>,
    /// See [`RestoreSummary::skipped`]
    pub skipped: Vec<CompilerId>,
    /// Present when auto-detection ran
    pub detection: Option<DetectionReport>,
}

pub struct CompilerRegistry {
    compilers: Vec<CompilerDescriptor>,
    default_id: Option<CompilerId>,
    store: Box<dyn ConfigStore>,
    initialized: bool,
}

impl CompilerRegistry {
    /// An empty registry persisting into `store`.
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        Self {
            compilers: Vec::new(),
            default_id: None,
            store,
            initialized: false,
        }
    }

    /// Register the built-in descriptors. Calling it again is a no-op.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        for compiler in builtin_descriptors() {
            self.register_compiler(compiler);
        }
        self.initialized = true;
    }

    /// Drop every descriptor and the default selection.
    pub fn unregister_all(&mut self) {
        self.compilers.clear();
        self.default_id = None;
        self.initialized = false;
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    pub fn into_store(self) -> Box<dyn ConfigStore> {
        self.store
    }

    /// Append `compiler` and return its positional index.
    ///
    /// Ids are not checked for uniqueness here; registering a duplicate id
    /// is a caller error and lookups by id return the first match.
    pub fn register_compiler(&mut self, compiler: CompilerDescriptor) -> usize {
        self.compilers.push(compiler);
        self.compilers.len() - 1
    }

    pub fn compilers(&self) -> &[CompilerDescriptor] {
        &self.compilers
    }

    pub fn len(&self) -> usize {
        self.compilers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compilers.is_empty()
    }

    pub fn compiler_index_ok(&self, index: usize) -> bool {
        !self.compilers.is_empty() && index < self.compilers.len()
    }

    pub fn get(&self, index: usize) -> Option<&CompilerDescriptor> {
        self.compilers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CompilerDescriptor> {
        self.compilers.get_mut(index)
    }

    pub fn find(&self, id: &CompilerId) -> Option<&CompilerDescriptor> {
        self.compilers.iter().find(|c| c.id() == id)
    }

    pub fn find_mut(&mut self, id: &CompilerId) -> Option<&mut CompilerDescriptor> {
        self.compilers.iter_mut().find(|c| c.id() == id)
    }

    pub fn index_of(&self, id: &CompilerId) -> Option<usize> {
        self.compilers.iter().position(|c| c.id() == id)
    }

    /// `base`, or `base-2`, `base-3`, ... whichever is not taken yet.
    pub fn unique_id(&self, base: &str) -> CompilerId {
        let mut candidate = CompilerId::new(base);
        let mut n = 2;
        while self.find(&candidate).is_some() {
            candidate = CompilerId::new(format!("{}-{}", base, n));
            n += 1;
        }
        candidate
    }

    /// Positional index of the default compiler, `0` when the stored
    /// selection no longer resolves.
    pub fn default_compiler_index(&self) -> usize {
        self.default_id
            .as_ref()
            .and_then(|id| self.index_of(id))
            .unwrap_or(0)
    }

    /// Out-of-range indices are ignored.
    pub fn set_default_compiler_index(&mut self, index: usize) {
        if let Some(compiler) = self.compilers.get(index) {
            self.default_id = Some(compiler.id().clone());
        }
    }

    pub fn default_compiler(&self) -> Option<&CompilerDescriptor> {
        self.compilers.get(self.default_compiler_index())
    }

    /// Select `id` as the default. Returns `false` and leaves the selection
    /// unchanged when no such compiler exists.
    pub fn set_default_compiler(&mut self, id: &CompilerId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.set_default_compiler_index(index);
                true
            }
            None => false,
        }
    }

    /// Derive a child of `source`, register it and apply any persisted
    /// override for the new id. Returns the new positional index.
    pub fn create_compiler_copy(&mut self, source: &CompilerId) -> Result<usize, CompilerError> {
        let new_id = self.unique_id(&format!("{}-copy", source));
        let mut copy = self
            .find(source)
            .ok_or_else(|| CompilerError::NotFound(source.clone()))?
            .create_copy(new_id);

        if let Some(set) = persist::read_sets(self.store.as_ref())
            .iter()
            .find(|s| &s.id == copy.id())
        {
            copy.load_settings(self.store.as_ref(), &set.prefix);
        }

        log::debug!("Added compiler \"{}\"", copy.name());
        Ok(self.register_compiler(copy))
    }

    /// Remove `id`, hand its children over to its own parent, and rewrite
    /// the persisted settings.
    ///
    /// Built-in descriptors are refused with [`CompilerError::BuiltIn`].
    /// When the rewrite fails the removal still stands in memory and the
    /// settings error is returned.
    pub fn remove_compiler(&mut self, id: &CompilerId) -> Result<CompilerDescriptor, CompilerError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| CompilerError::NotFound(id.clone()))?;
        if is_builtin(&self.compilers[index]) {
            return Err(CompilerError::BuiltIn(id.clone()));
        }
        let removed = self.compilers.remove(index);

        let grandparent = removed.parent().cloned();
        for compiler in &mut self.compilers {
            if compiler.parent() == Some(removed.id()) {
                compiler.set_parent(grandparent.clone());
            }
        }

        log::debug!("Compiler \"{}\" removed", removed.name());
        self.save_settings()?;
        Ok(removed)
    }

    /// Register the persisted descriptors that are not registered yet:
    /// detected roots by family, user copies through their parent slot.
    ///
    /// Parents stored after their children are picked up by later passes.
    /// When a pass makes no progress, the first record whose parent never
    /// resolves (out of range, dangling, cyclic) is restored as a root of its
    /// stored family and the passes resume. Records without a family cannot
    /// be rebuilt and are skipped.
    pub fn register_user_compilers(&mut self) -> RestoreSummary {
        let sets = persist::read_sets(self.store.as_ref());
        let by_slot = persist::ids_by_slot(&sets);

        let mut pending: Vec<&PersistedSet> =
            sets.iter().filter(|s| self.find(&s.id).is_none()).collect();
        let mut summary = RestoreSummary::default();

        loop {
            let before = pending.len();
            let mut unresolved = Vec::new();
            for set in pending {
                if self.find(&set.id).is_some() {
                    log::warn!("Duplicate compiler id \"{}\" in {}, ignoring", set.id, set.prefix);
                } else if self.restore_set(set, &by_slot) {
                    summary.restored.push(set.id.clone());
                } else {
                    unresolved.push(set);
                }
            }
            pending = unresolved;
            if pending.is_empty() {
                break;
            }
            if pending.len() == before {
                let Some(pos) = pending.iter().position(|s| s.family.is_some()) else {
                    break;
                };
                let set = pending.remove(pos);
                if self.restore_as_root(set) {
                    summary.promoted.push(set.id.clone());
                }
            }
        }

        summary.skipped = pending
            .iter()
            .map(|s| {
                log::warn!(
                    "Skipping compiler set {} (\"{}\"): no family and no usable parent",
                    s.prefix,
                    s.id
                );
                s.id.clone()
            })
            .collect();
        summary
    }

    fn restore_set(&mut self, set: &PersistedSet, by_slot: &HashMap<usize, &CompilerId>) -> bool {
        let mut compiler = match set.parent_slot {
            None => return self.restore_as_root(set),
            Some(slot) => {
                let Some(parent) = by_slot.get(&slot).and_then(|id| self.find(id)) else {
                    return false;
                };
                parent.create_copy(set.id.clone())
            }
        };
        compiler.load_settings(self.store.as_ref(), &set.prefix);
        log::debug!("Restored compiler \"{}\"", compiler.name());
        self.register_compiler(compiler);
        true
    }

    /// Rebuild `set` as a root of its stored family, ignoring any parent.
    fn restore_as_root(&mut self, set: &PersistedSet) -> bool {
        let Some(family) = set.family else {
            return false;
        };
        if set.parent_slot.is_some() {
            log::warn!(
                "Parent of compiler \"{}\" ({}) could not be resolved, restoring it without a parent",
                set.id,
                set.prefix
            );
        }
        let mut compiler = CompilerDescriptor::new(set.id.clone(), builtin_name(family), family);
        compiler.load_settings(self.store.as_ref(), &set.prefix);
        log::debug!("Restored compiler \"{}\"", compiler.name());
        self.register_compiler(compiler);
        true
    }

    /// Rewrite every descriptor in sequence order plus the default slot,
    /// then flush the store.
    pub fn save_settings(&mut self) -> Result<(), CompilerError> {
        let default_index = self.default_compiler_index();
        persist::write_sets(self.store.as_mut(), &self.compilers, default_index);
        self.store.flush().map_err(|e| {
            log::error!("Failed to save compiler settings: {}", e);
            CompilerError::from(e)
        })
    }

    /// Restore persisted descriptors, load every descriptor's settings and
    /// the default selection. If any descriptor is left without a master
    /// path, `detector` runs once.
    pub fn load_settings(&mut self, detector: &AutoDetector) -> LoadOutcome {
        let RestoreSummary {
            restored,
            promoted,
            skipped,
        } = self.register_user_compilers();

        let sets = persist::read_sets(self.store.as_ref());
        let mut needs_detection = false;
        for compiler in &mut self.compilers {
            if let Some(set) = sets.iter().find(|s| &s.id == compiler.id()) {
                compiler.load_settings(self.store.as_ref(), &set.prefix);
            }
            if !compiler.has_master_path() {
                needs_detection = true;
            }
        }

        let by_slot = persist::ids_by_slot(&sets);
        if let Some(slot) = self
            .store
            .read_int(persist::DEFAULT_KEY)
            .and_then(|raw| usize::try_from(raw).ok())
            && let Some(id) = by_slot.get(&slot)
        {
            let id = (*id).clone();
            self.set_default_compiler(&id);
        }

        let detection = if needs_detection {
            log::info!("Some compilers have no master path, running auto-detection");
            Some(detector.detect(self))
        } else {
            None
        };

        LoadOutcome {
            restored,
            promoted,
            skipped,
            detection,
        }
    }
}
