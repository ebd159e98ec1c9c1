use crate::column::{Payload, Source};
use crate::descriptor::{RefRecord, TableDescriptor};
use crate::matcher::components_contain_with_entity;
use crate::state::{SystemKind, SystemState};
use ecs_core::{FamilyId, Handle, TableId, World};
use smallvec::SmallVec;

/// C3 — once a table matches (C2 confirmed it), compute its descriptor and
/// file it into `state.tables`/`state.inactive_tables`, then register the
/// system in the table's own bound-system list (§3, "table descriptor"
/// ownership note).
pub fn bind_table(world: &mut World, system: Handle, state: &mut SystemState, table_id: TableId) {
    let table_family = world.table(table_id).family();

    let mut offsets: SmallVec<[i32; 8]> = SmallVec::with_capacity(state.columns.len());
    let mut refs_index: u32 = 0;
    let mut local_ref: u32 = 0;

    // Collect the fully-resolved columns up front so we don't hold a
    // borrow of `state.columns` while also pushing into `state.refs`.
    let columns = state.columns.clone();

    for column in &columns {
        match column.source {
            Source::FromEntity => {
                let component = match column.payload {
                    Payload::Handle(h) => h,
                    Payload::Family(family) => world.family_contains(table_family, family, false),
                };
                let offset = world
                    .column_offset(table_id, component)
                    .expect("table matcher confirmed a component this table does not carry");
                offsets.push(offset as i32);
            }
            Source::FromComponent => {
                if local_ref == 0 {
                    refs_index = state.refs.len() as u32 + 1;
                }

                let (entity, component) = match column.payload {
                    Payload::Handle(h) => {
                        let needle = world.family_add(FamilyId::EMPTY, h);
                        components_contain_with_entity(world, table_family, needle, true)
                    }
                    Payload::Family(family) => {
                        components_contain_with_entity(world, table_family, family, false)
                    }
                }
                .expect("table matcher confirmed a FromComponent requirement with no carrier");

                state.refs.push(RefRecord { entity, component });
                local_ref += 1;
                offsets.push(-(local_ref as i32));
            }
        }
    }

    let descriptor = TableDescriptor {
        table: table_id,
        refs_index,
        offsets,
    };

    let row_count = world.table(table_id).row_count();
    if row_count > 0 {
        state.tables.push(descriptor);
    } else {
        state.inactive_tables.push(descriptor);
    }

    let bound_list = match state.kind {
        SystemKind::Periodic | SystemKind::OnDemand => &mut world.table_mut(table_id).periodic_systems,
        SystemKind::OnInit => &mut world.table_mut(table_id).init_systems,
        SystemKind::OnDeinit => &mut world.table_mut(table_id).deinit_systems,
    };
    bound_list.push(system);
}

/// Runs the table matcher (C2) against `table_id` and binds it (C3) on a
/// match. Shared by `new_system`'s initial scan and `notify_create_table`'s
/// late-binding path — the "symmetric path" the spec requires (§4.7, §8
/// invariant 7).
pub fn match_and_bind(world: &mut World, system: Handle, state: &mut SystemState, table_id: TableId) {
    let matched = {
        let table = world.table(table_id);
        crate::matcher::match_table(world, table, &state.from_entity, &state.from_component)
    };
    if matched {
        bind_table(world, system, state, table_id);
    }
}
