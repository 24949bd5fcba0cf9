//! Ancestor walks over the registry's parent links.
//!
//! Persisted configuration can be malformed, so every walk is bounded by
//! the registry size and stops at the first repeated or unknown id.

use std::collections::HashSet;

use super::descriptor::CompilerDescriptor;
use super::registry::CompilerRegistry;
use super::types::CompilerId;

/// Parents of `id`, nearest first. Empty when `id` is a root or unknown.
pub fn ancestors<'a>(registry: &'a CompilerRegistry, id: &CompilerId) -> Vec<&'a CompilerDescriptor> {
    let mut chain = Vec::new();
    let Some(start) = registry.find(id) else {
        return chain;
    };

    let mut seen: HashSet<&CompilerId> = HashSet::new();
    seen.insert(start.id());
    let mut next = start.parent();

    while let Some(parent_id) = next {
        if chain.len() >= registry.len() || !seen.insert(parent_id) {
            log::warn!("Compiler lineage of \"{}\" loops back on itself", id);
            break;
        }
        let Some(parent) = registry.find(parent_id) else {
            break;
        };
        chain.push(parent);
        next = parent.parent();
    }
    chain
}

/// True when `ancestor` appears in the lineage of `of`.
pub fn is_ancestor(registry: &CompilerRegistry, ancestor: &CompilerId, of: &CompilerId) -> bool {
    ancestors(registry, of).iter().any(|d| d.id() == ancestor)
}
