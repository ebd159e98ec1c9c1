use ecs_core::{Handle, TableId};
use smallvec::SmallVec;

/// `{entity, component}` — resolved to a live pointer just before each
/// invocation via `world.get(entity, component)`.
#[derive(Clone, Copy, Debug)]
pub struct RefRecord {
    pub entity: Handle,
    pub component: Handle,
}

/// Per-table binding: which table, where this table's block of reference
/// records starts in `SystemState::refs` (1-based, 0 = no references), and
/// one offset code per signature column.
///
/// A code is table-local: non-negative is a byte offset into the row's
/// component region; negative `-k` means "the k-th reference record of
/// *this table's own block*" (`k` counts only the `FromComponent` columns
/// bound for this table, starting at 1) — matching the ancestor's local
/// `ref` counter in `add_table`, not a global position in `SystemState::refs`.
#[derive(Clone, Debug)]
pub struct TableDescriptor {
    pub table: TableId,
    pub refs_index: u32,
    pub offsets: SmallVec<[i32; 8]>,
}

impl TableDescriptor {
    /// Number of `FromComponent` columns bound for this table — the length
    /// of its block inside `SystemState::refs`.
    pub fn ref_block_len(&self) -> usize {
        self.offsets.iter().filter(|&&o| o < 0).count()
    }
}
