use crate::handle::Handle;
use bit_set::BitSet;
use fxhash::FxHashMap;

/// Interned identifier for a set of component handles.
///
/// Two families built from the same set of handles are the identical value:
/// `FamilyIndex` only ever allocates one `FamilyId` per distinct set.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct FamilyId(pub u32);

impl FamilyId {
    /// The empty family. Every system's per-operator family starts out here;
    /// `FamilyIndex` predicates treat it as vacuously satisfied.
    pub const EMPTY: FamilyId = FamilyId(0);
}

#[derive(Default)]
struct FamilyEntry {
    bits: BitSet,
    /// Members in the order they were first inserted. `family_contains`'s
    /// "first match" behavior (open question (b) in DESIGN.md) depends on
    /// this order, not on numeric handle order.
    members: Vec<Handle>,
}

/// Interns component-handle sets and answers the two queries the systems
/// engine needs: set insertion (`add`) and "does this family contain any/all
/// of that family" (`contains`).
#[derive(Default)]
pub struct FamilyIndex {
    entries: Vec<FamilyEntry>,
    interned: FxHashMap<Vec<u32>, FamilyId>,
}

impl FamilyIndex {
    pub fn new() -> Self {
        let mut index = FamilyIndex {
            entries: Vec::new(),
            interned: FxHashMap::default(),
        };
        index.entries.push(FamilyEntry::default());
        index.interned.insert(Vec::new(), FamilyId::EMPTY);
        index
    }

    /// `family_add(F, h) -> F'`: returns the interned family containing every
    /// member of `family` plus `handle`. A no-op (returns `family` itself) if
    /// `handle` is already a member.
    pub fn add(&mut self, family: FamilyId, handle: Handle) -> FamilyId {
        let entry = &self.entries[family.0 as usize];
        if entry.bits.contains(handle.index()) {
            return family;
        }

        let mut members = entry.members.clone();
        members.push(handle);

        let mut key: Vec<u32> = members.iter().map(|h| h.0).collect();
        key.sort_unstable();
        key.dedup();

        if let Some(existing) = self.interned.get(&key) {
            return *existing;
        }

        let mut bits = entry.bits.clone();
        bits.insert(handle.index());

        let id = FamilyId(self.entries.len() as u32);
        self.entries.push(FamilyEntry { bits, members });
        self.interned.insert(key, id);
        id
    }

    /// `family_contains(table_family, needle_family, match_all)`: returns a
    /// handle from `needle` present in `table_family`, or `Handle::NIL`. With
    /// `match_all`, every handle in `needle` must be present; the returned
    /// handle is then an arbitrary member of `needle` (the last one checked).
    pub fn contains(&self, table_family: FamilyId, needle: FamilyId, match_all: bool) -> Handle {
        if needle == FamilyId::EMPTY {
            // An unset family is vacuously satisfied but has no member to
            // name; callers only reach this when a column payload is itself
            // empty, which the builder never produces.
            return Handle::NIL;
        }

        let table_bits = &self.entries[table_family.0 as usize].bits;
        let needle_members = &self.entries[needle.0 as usize].members;

        if match_all {
            let mut found = Handle::NIL;
            for &h in needle_members {
                if !table_bits.contains(h.index()) {
                    return Handle::NIL;
                }
                found = h;
            }
            found
        } else {
            for &h in needle_members {
                if table_bits.contains(h.index()) {
                    return h;
                }
            }
            Handle::NIL
        }
    }

    /// `family_index.get(family)`: the members of `family` in insertion
    /// order. Used by the table matcher to enumerate the entities/components
    /// that make up a table's family when evaluating `FromComponent`
    /// predicates.
    pub fn members(&self, family: FamilyId) -> &[Handle] {
        &self.entries[family.0 as usize].members
    }

    pub fn is_empty(&self, family: FamilyId) -> bool {
        family == FamilyId::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_identical_sets() {
        let mut index = FamilyIndex::new();
        let a = index.add(FamilyId::EMPTY, Handle(1));
        let a = index.add(a, Handle(2));

        let b = index.add(FamilyId::EMPTY, Handle(2));
        let b = index.add(b, Handle(1));

        assert_eq!(a, b);
    }

    #[test]
    fn contains_match_any_and_all() {
        let mut index = FamilyIndex::new();
        let table = index.add(FamilyId::EMPTY, Handle(1));
        let table = index.add(table, Handle(2));

        let needle_any = index.add(FamilyId::EMPTY, Handle(3));
        let needle_any = index.add(needle_any, Handle(2));
        assert_eq!(index.contains(table, needle_any, false), Handle(2));

        let needle_all = index.add(FamilyId::EMPTY, Handle(1));
        let needle_all = index.add(needle_all, Handle(2));
        assert_ne!(index.contains(table, needle_all, true), Handle::NIL);

        let needle_missing = index.add(FamilyId::EMPTY, Handle(9));
        assert_eq!(index.contains(table, needle_missing, false), Handle::NIL);

        let needle_all_missing = index.add(FamilyId::EMPTY, Handle(1));
        let needle_all_missing = index.add(needle_all_missing, Handle(42));
        assert_eq!(index.contains(table, needle_all_missing, true), Handle::NIL);
    }
}
