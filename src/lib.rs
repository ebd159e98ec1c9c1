//! Entity-component-system runtime: matching, table binding and dispatch
//! engine.
//!
//! This crate is a thin facade over its two workspace members —
//! `ecs-core` (world, entity index, table storage, family interning) and
//! `ecs-systems` (signature matching, table binding, activation and
//! dispatch) — mirroring the base workspace's own root `src/lib.rs`
//! re-export pattern.
//!
//! It additionally provides [`Runtime`], a small convenience pairing of
//! [`World`] and [`Engine`] that wires up the notifications spec.md
//! describes the world as sending the systems engine (table creation, table
//! activation, per-row init/deinit) on every `spawn`/`despawn`. The engine
//! itself stays decoupled from the world (spec.md §1): `Runtime` is just one
//! way to drive both together, not a requirement the core imposes.

pub use ecs_core as core;
pub use ecs_systems as systems;

pub mod prelude {
    pub use ecs_core::{Component, FamilyId, Handle, Table, TableId, Universe, World};
    pub use ecs_systems::{
        BuildError, Column, Engine, Info, Job, LookupError, Operator, Payload, Source,
        SystemKind, SystemState, TableDescriptor,
    };

    pub use crate::Runtime;
}

use ecs_core::{Handle, TableId, World};
use ecs_systems::{BuildError, Engine, Info, SystemKind};

/// Every system with *any* descriptor bound to `table` — periodic, on-init
/// and on-deinit alike. A table's 0↔1 row transition has to be offered to
/// all three, not just the periodic ones: an `OnInit`/`OnDeinit` system's
/// descriptor is parked in `inactive_tables` the same way a periodic one's
/// is (C4 makes no distinction by kind), and `system_notify`'s `find_table`
/// only looks in `tables`, so a descriptor left behind in `inactive_tables`
/// would silently swallow every future notification for that table.
fn bound_systems(world: &World, table: TableId) -> Vec<Handle> {
    let table = world.table(table);
    table
        .periodic_systems
        .iter()
        .chain(table.init_systems.iter())
        .chain(table.deinit_systems.iter())
        .copied()
        .collect()
}

/// Pairs a [`World`] with the [`Engine`] matched against it, and drives the
/// notifications described in spec.md §4.4/§4.7 on every mutation: table
/// creation broadcasts `notify_create_table` to every system, a table's
/// first row triggers `activate_table(.., true)`, and removing its last row
/// triggers `activate_table(.., false)`. `OnInit`/`OnDeinit` systems bound to
/// the affected table are notified via `system_notify` around the same
/// mutation.
#[derive(Default)]
pub struct Runtime {
    pub world: World,
    pub engine: Engine,
}

impl Runtime {
    pub fn new() -> Self {
        Runtime {
            world: World::new(),
            engine: Engine::new(),
        }
    }

    /// Registers a new system, matching it against every table that exists
    /// right now (spec.md §4.7 step 5).
    pub fn new_system(
        &mut self,
        id: &str,
        kind: SystemKind,
        signature: &str,
        action: impl for<'a> Fn(&Info<'a>) + Send + Sync + 'static,
    ) -> Result<Handle, BuildError> {
        self.engine
            .new_system(&mut self.world, id, kind, signature, action)
    }

    /// Spawns an entity and drives the table-creation/activation/on-init
    /// notifications its insertion may trigger.
    ///
    /// Mirrors what a real table database does: the table is resolved (and,
    /// if new, broadcast to every system while still empty) *before* the row
    /// is inserted, so a freshly created table is bound through the
    /// `inactive_tables` path and then observably activated by the 0→1 row
    /// transition, rather than skipping straight to `tables`.
    pub fn spawn(&mut self, components: &[(Handle, &[u8])]) -> Handle {
        let (table_id, created_table) = self.world.ensure_table(components);
        if created_table {
            self.engine
                .broadcast_table_created(&mut self.world, table_id);
        }

        let result = self.world.insert_into(table_id, components);

        if result.row_count_after == 1 {
            for system in bound_systems(&self.world, result.table) {
                self.engine.activate_table(system, result.table, true);
            }
        }

        let row_index = result.row_count_after - 1;
        let init_systems: Vec<Handle> = self
            .world
            .table(result.table)
            .init_systems
            .iter()
            .copied()
            .collect();
        for system in init_systems {
            self.engine
                .system_notify(&self.world, system, result.table, row_index);
        }

        result.entity
    }

    /// Despawns `entity`, notifying `OnDeinit` systems *before* the row is
    /// actually removed (so their action still sees the row's component
    /// data) and driving the deactivation notification if the table's row
    /// count drops to zero. Returns `false` if `entity` was already dead.
    pub fn despawn(&mut self, entity: Handle) -> bool {
        let Some(record) = self.world.entity_index_get(entity) else {
            return false;
        };

        let deinit_systems: Vec<Handle> = self
            .world
            .table(record.table)
            .deinit_systems
            .iter()
            .copied()
            .collect();
        for system in &deinit_systems {
            self.engine
                .system_notify(&self.world, *system, record.table, record.row);
        }

        let Some(result) = self.world.despawn(entity) else {
            return false;
        };

        if result.row_count_after == 0 {
            for system in bound_systems(&self.world, result.table) {
                self.engine.activate_table(system, result.table, false);
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecs_systems::SystemKind;

    #[derive(Clone, Copy)]
    struct Position {
        #[allow(dead_code)]
        x: f32,
        #[allow(dead_code)]
        y: f32,
    }

    fn bytes_of<T: Copy>(value: &T) -> &[u8] {
        unsafe { std::slice::from_raw_parts(value as *const T as *const u8, std::mem::size_of::<T>()) }
    }

    #[test]
    fn runtime_spawns_and_matches_a_periodic_system() {
        let mut rt = Runtime::new();
        let pos = rt.world.register_component::<Position>("Position");

        let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let count_clone = count.clone();
        rt.new_system("move", SystemKind::Periodic, "Position", move |info| {
            count_clone.fetch_add(info.count, std::sync::atomic::Ordering::SeqCst);
        })
        .unwrap();

        let value = Position { x: 1.0, y: 2.0 };
        rt.spawn(&[(pos, bytes_of(&value))]);

        for handle in rt.engine.periodic_active().to_vec() {
            rt.engine.run_system(&rt.world, handle, std::ptr::null());
        }

        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
