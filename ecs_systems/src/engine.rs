use crate::activation::{move_table, Transition};
use crate::binder::match_and_bind;
use crate::column::SignatureBuilder;
use crate::descriptor::TableDescriptor;
use crate::dispatch::{self, Info, Job};
use crate::error::{BuildError, LookupError};
use crate::state::{SystemKind, SystemState};
use ecs_core::signature::{parse, term_count};
use ecs_core::{Handle, TableId, World};
use fxhash::FxHashMap;

/// C7 — creates, enables, classifies and dispatches systems, and owns the
/// world-level `periodic_systems`/`inactive_systems`/`other_systems` lists
/// described in spec.md §3/§4.7.
///
/// An `Engine` is a sibling of `World`, not a wrapper around it: both are
/// passed explicitly to every operation, matching the spec's insistence that
/// the core does not own the world (§1, "Out of scope").
#[derive(Default)]
pub struct Engine {
    systems: FxHashMap<Handle, SystemState>,
    /// Periodic systems with ≥1 bound table and `enabled == true`.
    periodic_active: Vec<Handle>,
    /// Periodic systems that are disabled or have zero bound tables.
    periodic_inactive: Vec<Handle>,
    /// `OnDemand`/`OnInit`/`OnDeinit` systems. Unlike periodic systems these
    /// are never moved between lists post-registration (§4.7 step 6 names
    /// only one destination list for non-periodic kinds).
    other_systems: Vec<Handle>,
}

impl Engine {
    pub fn new() -> Self {
        Engine::default()
    }

    pub fn periodic_active(&self) -> &[Handle] {
        &self.periodic_active
    }

    pub fn periodic_inactive(&self) -> &[Handle] {
        &self.periodic_inactive
    }

    pub fn other_systems(&self) -> &[Handle] {
        &self.other_systems
    }

    pub fn kind_of(&self, handle: Handle) -> Option<SystemKind> {
        self.systems.get(&handle).map(|s| s.kind)
    }

    /// `new_system`: §4.7 steps 1–6.
    ///
    /// Rejects an empty signature (term count zero), resolves every token
    /// through the world, and on any build failure reclaims the entity
    /// handle it had already allocated for the system — "delete the entity"
    /// per §4.1's failure clause.
    pub fn new_system(
        &mut self,
        world: &mut World,
        id: &str,
        kind: SystemKind,
        signature: &str,
        action: impl for<'a> Fn(&Info<'a>) + Send + Sync + 'static,
    ) -> Result<Handle, BuildError> {
        if term_count(signature) == 0 {
            return Err(BuildError::EmptySignature);
        }

        let handle = world.alloc_named(id);

        let mut builder = SignatureBuilder::new();
        let mut failure: Option<BuildError> = None;
        let parsed = parse(signature, |source, operator, name| {
            if failure.is_some() {
                return;
            }
            if let Err(e) = builder.add_component(world, source, operator, name) {
                failure = Some(e);
            }
        });

        if let Err(e) = parsed {
            world.free_handle(handle);
            return Err(e.into());
        }
        if let Some(e) = failure {
            world.free_handle(handle);
            return Err(e);
        }

        let mut state = SystemState {
            kind,
            enabled: true,
            columns: builder.columns,
            from_entity: builder.from_entity,
            from_component: builder.from_component,
            tables: Vec::new(),
            inactive_tables: Vec::new(),
            refs: Vec::new(),
            action: Box::new(action),
        };

        let table_count = world.tables().len();
        for i in 0..table_count {
            match_and_bind(world, handle, &mut state, TableId(i as u32));
        }

        let has_rows = !state.tables.is_empty();
        self.systems.insert(handle, state);

        match kind {
            SystemKind::Periodic => {
                if has_rows {
                    self.periodic_active.push(handle);
                } else {
                    self.periodic_inactive.push(handle);
                }
            }
            SystemKind::OnDemand | SystemKind::OnInit | SystemKind::OnDeinit => {
                self.other_systems.push(handle);
            }
        }

        tracing::debug!(system = handle.0, id, ?kind, "created system");
        Ok(handle)
    }

    /// `enable`: toggles `enabled`, idempotent, and only reaches into the
    /// world-level lists when the flag actually flips and the system has at
    /// least one bound table (matches `ecs_enable` exactly: it never moves a
    /// system with zero tables, since it is already sitting in the inactive
    /// list and has nothing to vacate).
    pub fn enable(&mut self, handle: Handle, on: bool) -> Result<(), LookupError> {
        let state = self.systems.get_mut(&handle).ok_or(LookupError)?;
        if state.enabled == on {
            return Ok(());
        }
        state.enabled = on;
        let has_tables = !state.tables.is_empty();
        let kind = state.kind;
        if has_tables {
            self.world_activate_system(kind, handle, on);
        }
        Ok(())
    }

    /// `is_enabled`: defaults to `true` for a handle that does not name a
    /// system (§6, "benign default").
    pub fn is_enabled(&self, handle: Handle) -> bool {
        self.systems.get(&handle).map(|s| s.enabled).unwrap_or(true)
    }

    /// `run_system`: whole-system run, silently a no-op if disabled or the
    /// handle is not a system.
    pub fn run_system(&self, world: &World, handle: Handle, param: *const ()) {
        if let Some(state) = self.systems.get(&handle) {
            dispatch::run_system(world, handle, state, param);
        }
    }

    /// `run_job`: worker entry point.
    pub fn run_job(&self, world: &World, handle: Handle, job: &Job) {
        if let Some(state) = self.systems.get(&handle) {
            dispatch::run_job(world, handle, state, job);
        }
    }

    /// `system_notify`: per-row notify used by `OnInit`/`OnDeinit` callers;
    /// a no-op if `table` is not bound to `handle`.
    pub fn system_notify(&self, world: &World, handle: Handle, table: TableId, row_index: usize) {
        if let Some(state) = self.systems.get(&handle) {
            dispatch::notify_row(world, handle, state, table, row_index);
        }
    }

    /// `notify_create_table`: the "late table creation" path (§4.7). Runs
    /// the matcher against the new table and binds it on a match; a no-op
    /// (not an error) if the table does not match.
    pub fn notify_create_table(
        &mut self,
        world: &mut World,
        handle: Handle,
        table: TableId,
    ) -> Result<(), LookupError> {
        let mut state = self.systems.remove(&handle).ok_or(LookupError)?;
        match_and_bind(world, handle, &mut state, table);
        self.systems.insert(handle, state);
        Ok(())
    }

    /// Broadcasts `notify_create_table` to every registered system — the
    /// caller-side equivalent of the world iterating its systems when it
    /// creates a table (§4.7).
    pub fn broadcast_table_created(&mut self, world: &mut World, table: TableId) {
        let handles: Vec<Handle> = self.systems.keys().copied().collect();
        for handle in handles {
            let _ = self.notify_create_table(world, handle, table);
        }
    }

    /// `activate_table`: moves `table` between `handle`'s bound/inactive
    /// partitions (C4) and, on a partition-emptying/filling transition,
    /// flips the system's own world-list membership — but only for
    /// `Periodic` systems, whose membership in `periodic_systems` vs.
    /// `inactive_systems` is the only world-visible active/inactive split
    /// this spec defines (§4.7 step 6 gives non-periodic kinds a single,
    /// static destination list).
    pub fn activate_table(&mut self, handle: Handle, table: TableId, active: bool) {
        if let Some(state) = self.systems.get_mut(&handle) {
            let transition = move_table(state, table, active);
            let kind = state.kind;
            match transition {
                Transition::BecameActive => self.world_activate_system(kind, handle, true),
                Transition::BecameInactive => self.world_activate_system(kind, handle, false),
                Transition::None => {}
            }
        }
    }

    fn world_activate_system(&mut self, kind: SystemKind, handle: Handle, active: bool) {
        if kind != SystemKind::Periodic {
            return;
        }
        if active {
            self.periodic_inactive.retain(|h| *h != handle);
            if !self.periodic_active.contains(&handle) {
                self.periodic_active.push(handle);
            }
        } else {
            self.periodic_active.retain(|h| *h != handle);
            if !self.periodic_inactive.contains(&handle) {
                self.periodic_inactive.push(handle);
            }
        }
    }

    /// Tables currently bound and active (≥1 row) for `handle`.
    pub fn tables_of(&self, handle: Handle) -> &[TableDescriptor] {
        self.systems
            .get(&handle)
            .map(|s| s.tables.as_slice())
            .unwrap_or(&[])
    }

    /// Tables matched but currently empty for `handle`.
    pub fn inactive_tables_of(&self, handle: Handle) -> &[TableDescriptor] {
        self.systems
            .get(&handle)
            .map(|s| s.inactive_tables.as_slice())
            .unwrap_or(&[])
    }

    pub fn state(&self, handle: Handle) -> Option<&SystemState> {
        self.systems.get(&handle)
    }
}
