use crate::descriptor::TableDescriptor;
use crate::state::SystemState;
use ecs_core::World;
use smallvec::SmallVec;

/// Per-run scratch for resolved reference pointers, sized to the column
/// count. Inline up to 8 slots (the common case — see `TableDescriptor`'s
/// own `offsets` buffer) so a run with few `FromComponent` columns costs no
/// heap allocation at all, preserving §5's "no allocations on the hot
/// dispatch path" property without requiring a caller-side VLA.
pub type RefsBuf = SmallVec<[*const u8; 8]>;

pub fn new_refs_buf(column_count: usize) -> RefsBuf {
    smallvec::smallvec![std::ptr::null(); column_count.max(1)]
}

/// C5 — fills `out` (scratch sized to the column count) with live component
/// pointers for a table descriptor's reference block.
///
/// Only the slots a `FromComponent` column actually uses are written;
/// `FromEntity` slots are left untouched, matching the dispatcher's contract
/// that it only ever reads `refs[k-1]` for a code `-k` it saw in
/// `descriptor.offsets`.
pub fn resolve_refs(world: &World, state: &SystemState, descriptor: &TableDescriptor, out: &mut RefsBuf) {
    if descriptor.refs_index == 0 {
        return;
    }

    let start = descriptor.refs_index as usize - 1;
    let block_len = descriptor.ref_block_len();

    for local in 0..block_len {
        let record = &state.refs[start + local];
        out[local] = world.get_raw(record.entity, record.component).unwrap_or(std::ptr::null());
    }
}
