use crate::component::{Component, ComponentMeta};
use crate::entity::EntityAllocator;
use crate::error::CoreError;
use crate::family::{FamilyId, FamilyIndex};
use crate::handle::Handle;
use crate::table::{Table, TableId};
use fxhash::FxHashMap;

/// What `entity_index.get(entity)` decodes to: which table an entity lives
/// in, at which row, and (redundantly, for cheap lookups) its family.
#[derive(Copy, Clone, Debug)]
pub struct EntityRecord {
    pub family: FamilyId,
    pub table: TableId,
    pub row: usize,
}

pub struct SpawnResult {
    pub entity: Handle,
    pub table: TableId,
    pub created_table: bool,
    pub row_count_after: usize,
}

pub struct DespawnResult {
    pub table: TableId,
    pub row_count_after: usize,
}

/// The external collaborator the systems engine is written against: resolves
/// names to handles, enumerates tables, interns families, and reads/writes
/// component bytes. Out of scope for the engine itself (see spec.md §1), but
/// a concrete implementation is needed for the engine to be exercised.
pub struct World {
    entities: EntityAllocator,
    names: FxHashMap<String, Handle>,
    component_meta: FxHashMap<Handle, ComponentMeta>,
    family_index: FamilyIndex,
    entity_index: FxHashMap<Handle, EntityRecord>,
    tables: Vec<Table>,
    table_by_family: FxHashMap<FamilyId, TableId>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_allocator(EntityAllocator::new())
    }

    /// Builds a world drawing its entity/component handles from `allocator`
    /// rather than a fresh private one — how [`crate::entity::Universe`]
    /// gives every world it creates a disjoint slice of one shared id space.
    pub fn with_allocator(allocator: EntityAllocator) -> Self {
        World {
            entities: allocator,
            names: FxHashMap::default(),
            component_meta: FxHashMap::default(),
            family_index: FamilyIndex::new(),
            entity_index: FxHashMap::default(),
            tables: Vec::new(),
            table_by_family: FxHashMap::default(),
        }
    }

    /// `lookup(name) -> handle | 0`.
    pub fn lookup(&self, name: &str) -> Handle {
        self.names.get(name).copied().unwrap_or(Handle::NIL)
    }

    pub fn lookup_or_err(&self, name: &str) -> Result<Handle, CoreError> {
        let h = self.lookup(name);
        if h.is_nil() {
            Err(CoreError::UnknownName(name.to_string()))
        } else {
            Ok(h)
        }
    }

    /// Registers a data-carrying component type under `name`, allocating it
    /// a fresh handle from the same allocator entities come from.
    pub fn register_component<T: Component>(&mut self, name: &str) -> Handle {
        let handle = self.entities.create();
        self.names.insert(name.to_string(), handle);
        self.component_meta.insert(handle, ComponentMeta::of::<T>());
        handle
    }

    /// Registers a zero-sized tag (marker) component under `name`.
    pub fn register_tag(&mut self, name: &str) -> Handle {
        let handle = self.entities.create();
        self.names.insert(name.to_string(), handle);
        self.component_meta.insert(handle, ComponentMeta::tag());
        handle
    }

    /// Allocates a fresh handle named `name` with no component metadata —
    /// the "system-as-entity" shape (spec.md §9) needs an id in the same
    /// handle space as entities and components, but carries no row data of
    /// its own here.
    pub fn alloc_named(&mut self, name: &str) -> Handle {
        let handle = self.entities.create();
        self.names.insert(name.to_string(), handle);
        handle
    }

    /// Reclaims a handle allocated by `alloc_named`, used to unwind a
    /// partially constructed system on build failure.
    pub fn free_handle(&mut self, handle: Handle) {
        self.names.retain(|_, h| *h != handle);
        self.component_meta.remove(&handle);
        self.entities.free(handle);
    }

    fn component_meta(&self, handle: Handle) -> ComponentMeta {
        self.component_meta
            .get(&handle)
            .copied()
            .unwrap_or_else(ComponentMeta::tag)
    }

    pub fn family_add(&mut self, family: FamilyId, handle: Handle) -> FamilyId {
        self.family_index.add(family, handle)
    }

    pub fn family_contains(&self, table_family: FamilyId, needle: FamilyId, match_all: bool) -> Handle {
        self.family_index.contains(table_family, needle, match_all)
    }

    pub fn family_members(&self, family: FamilyId) -> &[Handle] {
        self.family_index.members(family)
    }

    pub fn entity_index_get(&self, entity: Handle) -> Option<EntityRecord> {
        self.entity_index.get(&entity).copied()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0 as usize]
    }

    pub fn table_mut(&mut self, id: TableId) -> &mut Table {
        &mut self.tables[id.0 as usize]
    }

    pub fn column_offset(&self, table: TableId, component: Handle) -> Option<usize> {
        self.table(table).column_offset(component)
    }

    /// `get(entity, component) -> pointer | null`, typed.
    pub fn get<T: Component>(&self, entity: Handle, component: Handle) -> Option<&T> {
        let ptr = self.get_raw(entity, component)?;
        Some(unsafe { &*(ptr as *const T) })
    }

    pub fn get_raw(&self, entity: Handle, component: Handle) -> Option<*const u8> {
        let record = self.entity_index_get(entity)?;
        self.table(record.table).component_ptr(record.row, component)
    }

    fn find_or_create_table(&mut self, family: FamilyId) -> (TableId, bool) {
        if let Some(id) = self.table_by_family.get(&family) {
            return (*id, false);
        }

        let members = self.family_index.members(family).to_vec();
        let components = members
            .iter()
            .map(|&h| (h, self.component_meta(h)))
            .collect();

        let id = TableId(self.tables.len() as u32);
        self.tables.push(Table::new(family, components));
        self.table_by_family.insert(family, id);
        tracing::debug!(table = id.0, family = family.0, "created table");
        (id, true)
    }

    /// Resolves (creating if necessary) the table that an entity carrying
    /// exactly `components` would live in, *without* inserting any row.
    ///
    /// Split out of `spawn` so a caller can bind systems against a table
    /// while it still has zero rows — the table-creation notification
    /// (spec.md §4.7, "late table creation") has to reach the matcher
    /// before the row that would otherwise immediately activate it exists,
    /// or the activation transition in §4.4 is never observable.
    pub fn ensure_table(&mut self, components: &[(Handle, &[u8])]) -> (TableId, bool) {
        let mut family = FamilyId::EMPTY;
        for &(h, _) in components {
            family = self.family_index.add(family, h);
        }
        self.find_or_create_table(family)
    }

    /// Inserts a new entity carrying `components` into the table already
    /// resolved by [`World::ensure_table`]. `components` must match the
    /// table's family (the same slice passed to `ensure_table` is the
    /// typical caller).
    pub fn insert_into(&mut self, table_id: TableId, components: &[(Handle, &[u8])]) -> SpawnResult {
        let entity = self.entities.create();
        let family = self.table(table_id).family();
        let row = self.table_mut(table_id).insert_row(entity, components);

        self.entity_index.insert(
            entity,
            EntityRecord {
                family,
                table: table_id,
                row,
            },
        );

        let row_count_after = self.table(table_id).row_count();
        tracing::trace!(entity = entity.0, table = table_id.0, row, "spawned entity");

        SpawnResult {
            entity,
            table: table_id,
            created_table: false,
            row_count_after,
        }
    }

    /// Spawns a new entity whose family is exactly the set of handles in
    /// `components`, storing the accompanying bytes (empty slice for tags).
    /// Equivalent to `ensure_table` immediately followed by `insert_into`;
    /// use the split form directly when a table needs to exist (and be
    /// matched) before its first row lands.
    pub fn spawn(&mut self, components: &[(Handle, &[u8])]) -> SpawnResult {
        let (table_id, created_table) = self.ensure_table(components);
        let mut result = self.insert_into(table_id, components);
        result.created_table = created_table;
        result
    }

    /// Removes `entity`, swap-removing its row and fixing up the entity
    /// index of whichever entity moved into its slot.
    pub fn despawn(&mut self, entity: Handle) -> Option<DespawnResult> {
        let record = self.entity_index.remove(&entity)?;
        let table = self.table_mut(record.table);
        if let Some(moved_entity) = table.remove_row(record.row) {
            if let Some(moved) = self.entity_index.get_mut(&moved_entity) {
                moved.row = record.row;
            }
        }
        self.entities.free(entity);

        let row_count_after = self.table(record.table).row_count();
        tracing::trace!(entity = entity.0, table = record.table.0, "despawned entity");

        Some(DespawnResult {
            table: record.table,
            row_count_after,
        })
    }
}
