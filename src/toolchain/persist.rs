//! Positional layout of compiler sets in the settings store.
//!
//! On disk every descriptor lives at `/sets/setNNN`, where `NNN` is its
//! positional index at save time, and refers to its parent by positional
//! index plus one (`0` means no parent). Inside the process parents are ids;
//! this module is the only place that converts between the two.

use std::collections::HashMap;

use super::descriptor::CompilerDescriptor;
use super::types::{CompilerFamily, CompilerId};
use crate::settings::ConfigStore;

pub const SETS_ROOT: &str = "/sets";
pub const DEFAULT_KEY: &str = "/default_compiler";

/// Settings prefix of the descriptor stored at `slot`.
pub fn slot_prefix(slot: usize) -> String {
    format!("{}/set{:03}", SETS_ROOT, slot)
}

fn parse_slot(name: &str) -> Option<usize> {
    name.strip_prefix("set")?.parse().ok()
}

/// One persisted compiler set, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSet {
    pub slot: usize,
    pub prefix: String,
    pub id: CompilerId,
    pub family: Option<CompilerFamily>,
    /// Parent slot after removing the `+1` encoding.
    pub parent_slot: Option<usize>,
}

/// Decode the stored `parent` field. Negative values are malformed and read
/// as "no parent".
pub fn decode_parent(raw: i64) -> Option<usize> {
    if raw <= 0 {
        None
    } else {
        usize::try_from(raw - 1).ok()
    }
}

pub fn encode_parent(parent_index: Option<usize>) -> i64 {
    parent_index.map(|i| i as i64 + 1).unwrap_or(0)
}

/// Every persisted set, ordered by slot. Entries without an id are skipped.
pub fn read_sets(store: &dyn ConfigStore) -> Vec<PersistedSet> {
    let mut sets: Vec<PersistedSet> = store
        .enumerate_subpaths(SETS_ROOT)
        .into_iter()
        .filter_map(|name| {
            let Some(slot) = parse_slot(&name) else {
                log::warn!("Ignoring unexpected settings entry {}/{}", SETS_ROOT, name);
                return None;
            };
            let prefix = format!("{}/{}", SETS_ROOT, name);
            let Some(id) = store.read_str(&format!("{}/id", prefix)) else {
                log::warn!("Compiler set {} has no id, skipping", prefix);
                return None;
            };
            Some(PersistedSet {
                slot,
                family: store
                    .read_str(&format!("{}/family", prefix))
                    .and_then(|f| CompilerFamily::from_key(&f)),
                parent_slot: store
                    .read_int(&format!("{}/parent", prefix))
                    .and_then(decode_parent),
                id: CompilerId::new(id),
                prefix,
            })
        })
        .collect();
    sets.sort_by_key(|s| s.slot);
    sets
}

/// Map from slot to the id stored there.
pub fn ids_by_slot(sets: &[PersistedSet]) -> HashMap<usize, &CompilerId> {
    sets.iter().map(|s| (s.slot, &s.id)).collect()
}

/// Rewrite the whole `/sets` tree from `compilers` in sequence order.
pub fn write_sets(store: &mut dyn ConfigStore, compilers: &[CompilerDescriptor], default_index: usize) {
    store.unset(SETS_ROOT);

    let index_of: HashMap<&CompilerId, usize> = compilers
        .iter()
        .enumerate()
        .rev()
        .map(|(i, c)| (c.id(), i))
        .collect();

    for (slot, compiler) in compilers.iter().enumerate() {
        let prefix = slot_prefix(slot);
        compiler.save_settings(store, &prefix);
        let parent_index = compiler.parent().and_then(|p| index_of.get(p).copied());
        store.write_int(&format!("{}/parent", prefix), encode_parent(parent_index));
    }
    store.write_int(DEFAULT_KEY, default_index as i64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TomlStore;

    #[test]
    fn test_parent_encoding() {
        assert_eq!(encode_parent(None), 0);
        assert_eq!(encode_parent(Some(0)), 1);
        assert_eq!(decode_parent(0), None);
        assert_eq!(decode_parent(1), Some(0));
        assert_eq!(decode_parent(-4), None);
    }

    #[test]
    fn test_write_then_read_sets() {
        let gcc = CompilerDescriptor::new("gcc", "GCC", CompilerFamily::GCC);
        let copy = gcc.create_copy("gcc-copy".into());
        let mut store = TomlStore::in_memory();
        write_sets(&mut store, &[gcc, copy], 1);

        let sets = read_sets(&store);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].id.as_str(), "gcc");
        assert_eq!(sets[0].parent_slot, None);
        assert_eq!(sets[1].id.as_str(), "gcc-copy");
        assert_eq!(sets[1].parent_slot, Some(0));
        assert_eq!(sets[1].family, Some(CompilerFamily::GCC));
        assert_eq!(store.read_int(DEFAULT_KEY), Some(1));
    }

    #[test]
    fn test_rewrite_drops_stale_slots() {
        let gcc = CompilerDescriptor::new("gcc", "GCC", CompilerFamily::GCC);
        let clang = CompilerDescriptor::new("clang", "Clang", CompilerFamily::Clang);
        let mut store = TomlStore::in_memory();
        write_sets(&mut store, &[gcc.clone(), clang], 0);
        write_sets(&mut store, &[gcc], 0);
        assert_eq!(read_sets(&store).len(), 1);
    }

    #[test]
    fn test_dangling_parent_written_as_none() {
        let mut orphan = CompilerDescriptor::new("orphan", "Orphan", CompilerFamily::GCC);
        orphan.set_parent(Some("gone".into()));
        let mut store = TomlStore::in_memory();
        write_sets(&mut store, &[orphan], 0);
        assert_eq!(store.read_int("/sets/set000/parent"), Some(0));
    }

    #[test]
    fn test_slots_sorted_numerically() {
        let mut store = TomlStore::in_memory();
        store.write_str("/sets/set1000/id", "late");
        store.write_str("/sets/set002/id", "early");
        store.write_str("/sets/bogus/id", "ignored");
        let ids: Vec<String> = read_sets(&store).into_iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }
}
