use crate::state::SystemState;
use ecs_core::TableId;

/// What changed for the world's active/inactive system lists as a result of
/// moving one table between partitions. `Engine` (C7) interprets this and
/// calls `activate_system` on the world-level lists it owns.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Transition {
    None,
    BecameActive,
    BecameInactive,
}

/// C4 — moves `table` between `state.tables` and `state.inactive_tables`.
/// Move semantics are swap-with-last: order within a partition is not
/// meaningful.
///
/// Precondition (caller bug if violated, per §7): `table` must currently sit
/// in the *source* partition for the direction requested.
pub fn move_table(state: &mut SystemState, table: TableId, active: bool) -> Transition {
    let (src, dst) = if active {
        (&mut state.inactive_tables, &mut state.tables)
    } else {
        (&mut state.tables, &mut state.inactive_tables)
    };

    let pos = src
        .iter()
        .position(|d| d.table == table)
        .expect("activate_table: table not present in the expected partition");
    let descriptor = src.swap_remove(pos);
    dst.push(descriptor);

    if active {
        if state.tables.len() == 1 && state.enabled {
            Transition::BecameActive
        } else {
            Transition::None
        }
    } else if state.tables.is_empty() {
        Transition::BecameInactive
    } else {
        Transition::None
    }
}
