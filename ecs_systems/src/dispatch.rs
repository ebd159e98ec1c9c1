use crate::descriptor::TableDescriptor;
use crate::refs::{new_refs_buf, resolve_refs};
use crate::state::SystemState;
use ecs_core::{Handle, World};

/// Per-invocation descriptor handed to the user action. `first..last` is a
/// contiguous half-open range of row *component regions* (i.e. already past
/// each row's leading entity handle) inside exactly one table.
pub struct Info<'a> {
    pub world: &'a World,
    pub system: Handle,
    /// Opaque caller payload passed through from `run_system`; null when
    /// none was supplied (matches the C ancestor's `void *param`).
    pub param: *const (),
    pub columns: &'a [i32],
    pub refs: &'a [*const u8],
    pub first: *const u8,
    pub last: *const u8,
    pub count: usize,
    pub element_size: usize,
}

impl<'a> Info<'a> {
    /// Resolves column `i` for `row` (0-based, within this invocation's
    /// range): a non-negative code is a byte offset from the row's
    /// component-region start; a negative `-k` looks up the k-th resolved
    /// reference instead.
    ///
    /// # Safety
    /// The caller must know `T` is the actual type stored at that column.
    pub unsafe fn component<T>(&self, row: usize, column: usize) -> &T {
        let ptr = self.component_ptr(row, column);
        &*(ptr as *const T)
    }

    pub unsafe fn component_mut<T>(&self, row: usize, column: usize) -> &mut T {
        let ptr = self.component_ptr(row, column) as *mut u8;
        &mut *(ptr as *mut T)
    }

    fn component_ptr(&self, row: usize, column: usize) -> *const u8 {
        let code = self.columns[column];
        if code >= 0 {
            unsafe { self.first.add(row * self.element_size + code as usize) }
        } else {
            let k = (-code) as usize;
            self.refs[k - 1]
        }
    }

    pub unsafe fn param_as<T>(&self) -> Option<&T> {
        if self.param.is_null() {
            None
        } else {
            Some(&*(self.param as *const T))
        }
    }
}

pub type Action = dyn for<'a> Fn(&Info<'a>) + Send + Sync;

fn build_info<'a>(
    world: &'a World,
    system: Handle,
    param: *const (),
    descriptor: &'a TableDescriptor,
    refs: &'a [*const u8],
    first_row: usize,
    row_count: usize,
) -> Info<'a> {
    let table = world.table(descriptor.table);
    Info {
        world,
        system,
        param,
        columns: &descriptor.offsets,
        refs,
        first: table.component_region_ptr(first_row),
        last: table.component_region_ptr(first_row + row_count),
        count: row_count,
        element_size: table.stride(),
    }
}

/// Whole-system run: every table in `state.tables`, entire row range each.
/// Silently does nothing if the system is disabled, per §6.
pub fn run_system(world: &World, system: Handle, state: &SystemState, param: *const ()) {
    if !state.enabled {
        return;
    }

    let mut refs_buf = new_refs_buf(state.column_count());

    for descriptor in &state.tables {
        if descriptor.refs_index != 0 {
            resolve_refs(world, state, descriptor, &mut refs_buf);
        }
        let table = world.table(descriptor.table);
        let info = build_info(world, system, param, descriptor, &refs_buf, 0, table.row_count());
        (state.action)(&info);
    }
}

/// Per-row notify, used for `OnInit`/`OnDeinit`: a no-op if `table` is not
/// bound to this system.
pub fn notify_row(world: &World, system: Handle, state: &SystemState, table: ecs_core::TableId, row_index: usize) {
    let Some(descriptor) = state.find_table(table) else {
        return;
    };

    let mut refs_buf = new_refs_buf(state.column_count());
    if descriptor.refs_index != 0 {
        resolve_refs(world, state, descriptor, &mut refs_buf);
    }

    let info = build_info(world, system, std::ptr::null(), descriptor, &refs_buf, row_index, 1);
    (state.action)(&info);
}

/// A contiguous slice of matched rows, possibly spanning several adjacent
/// bound tables. `table_index` indexes into `SystemState::tables`, not the
/// world's table database.
#[derive(Copy, Clone, Debug)]
pub struct Job {
    pub table_index: usize,
    pub start_index: usize,
    pub row_count: usize,
}

/// Worker entry point: processes `job`'s rows table by table, guaranteeing
/// each `action` call sees rows from exactly one table (§4.6, "Job run").
pub fn run_job(world: &World, system: Handle, state: &SystemState, job: &Job) {
    let mut table_index = job.table_index;
    let mut local_start = job.start_index;
    let mut remaining = job.row_count;
    let mut refs_buf = new_refs_buf(state.column_count());

    while remaining > 0 {
        let descriptor = &state.tables[table_index];
        let table = world.table(descriptor.table);
        let available = table.row_count() - local_start;
        let consumed = remaining.min(available);

        if descriptor.refs_index != 0 {
            resolve_refs(world, state, descriptor, &mut refs_buf);
        }

        let info = build_info(world, system, std::ptr::null(), descriptor, &refs_buf, local_start, consumed);
        (state.action)(&info);

        remaining -= consumed;
        table_index += 1;
        local_start = 0;
    }
}
