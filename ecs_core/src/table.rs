use crate::component::ComponentMeta;
use crate::family::FamilyId;
use crate::handle::Handle;

/// Index of a table inside the world's table database. Table descriptors in
/// the systems engine carry this, never a pointer, so the table store can
/// grow (reallocate its backing `Vec`) without invalidating anything a
/// system has already bound.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TableId(pub u32);

/// A world-level storage block holding every entity whose family equals
/// `family`. Rows are fixed stride: a leading `Handle` (the entity id)
/// followed by the table's component data laid out back to back in
/// ascending handle order.
///
/// Storage is a flat byte buffer rather than per-column `Vec<T>`s so that
/// `column_offset` can hand out a plain byte offset the dispatcher adds to a
/// row pointer, matching the "offset code" scheme the spec describes.
pub struct Table {
    family: FamilyId,
    /// (component handle, byte offset within the component region, size)
    /// sorted by handle for a deterministic, allocation-stable layout.
    layout: Vec<(Handle, usize, usize)>,
    /// size of the component region (excludes the leading entity handle).
    component_region_size: usize,
    stride: usize,
    data: Vec<u8>,
    row_count: usize,

    pub periodic_systems: Vec<Handle>,
    pub init_systems: Vec<Handle>,
    pub deinit_systems: Vec<Handle>,
}

const HANDLE_SIZE: usize = std::mem::size_of::<u32>();

impl Table {
    pub fn new(family: FamilyId, mut components: Vec<(Handle, ComponentMeta)>) -> Self {
        components.sort_by_key(|(h, _)| *h);

        let mut layout = Vec::with_capacity(components.len());
        let mut offset = 0usize;
        for (handle, meta) in components {
            if meta.size == 0 {
                layout.push((handle, offset, 0));
                continue;
            }
            let align = meta.align.max(1);
            offset = (offset + align - 1) / align * align;
            layout.push((handle, offset, meta.size));
            offset += meta.size;
        }

        Table {
            family,
            layout,
            component_region_size: offset,
            stride: HANDLE_SIZE + offset,
            data: Vec::new(),
            row_count: 0,
            periodic_systems: Vec::new(),
            init_systems: Vec::new(),
            deinit_systems: Vec::new(),
        }
    }

    pub fn family(&self) -> FamilyId {
        self.family
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Full per-row size in bytes, leading entity handle included — the
    /// value the dispatcher advances a row pointer by.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Size of the component region alone (i.e. `stride()` minus the leading
    /// entity handle).
    pub fn component_region_size(&self) -> usize {
        self.component_region_size
    }

    /// Byte offset of `component`'s payload inside the component region of a
    /// row (i.e. *after* the leading entity handle), or `None` if this
    /// table's family does not carry that component's data.
    pub fn column_offset(&self, component: Handle) -> Option<usize> {
        self.layout
            .iter()
            .find(|(h, _, _)| *h == component)
            .map(|(_, offset, _)| *offset)
    }

    pub fn entity_at(&self, row: usize) -> Handle {
        debug_assert!(row < self.row_count);
        let base = row * self.stride;
        let bytes = &self.data[base..base + HANDLE_SIZE];
        Handle(u32::from_ne_bytes(bytes.try_into().unwrap()))
    }

    /// Raw pointer to the start of the component region of `row`; `row ==
    /// row_count` is valid and yields the one-past-the-end pointer the
    /// dispatcher uses as `info.last`.
    pub fn component_region_ptr(&self, row: usize) -> *const u8 {
        debug_assert!(row <= self.row_count);
        unsafe { self.data.as_ptr().add(row * self.stride + HANDLE_SIZE) }
    }

    pub fn component_region_ptr_mut(&mut self, row: usize) -> *mut u8 {
        debug_assert!(row <= self.row_count);
        unsafe { self.data.as_mut_ptr().add(row * self.stride + HANDLE_SIZE) }
    }

    /// Pointer to a specific component's bytes within `row`, or `None` if
    /// the table does not store that component (used by `World::get`).
    pub fn component_ptr(&self, row: usize, component: Handle) -> Option<*const u8> {
        let offset = self.column_offset(component)?;
        Some(unsafe { self.component_region_ptr(row).add(offset) })
    }

    /// Inserts a new row for `entity`. `values` must supply bytes for every
    /// non-tag component in this table's layout; unrecognised handles are
    /// ignored. Returns the new row's index.
    pub fn insert_row(&mut self, entity: Handle, values: &[(Handle, &[u8])]) -> usize {
        let row = self.row_count;
        self.data.resize(self.data.len() + self.stride, 0);
        let base = row * self.stride;
        self.data[base..base + HANDLE_SIZE].copy_from_slice(&entity.0.to_ne_bytes());

        for &(handle, offset, size) in &self.layout {
            if size == 0 {
                continue;
            }
            if let Some((_, bytes)) = values.iter().find(|(h, _)| *h == handle) {
                debug_assert_eq!(bytes.len(), size);
                let start = base + HANDLE_SIZE + offset;
                self.data[start..start + size].copy_from_slice(bytes);
            }
        }

        self.row_count += 1;
        row
    }

    /// Removes `row` by swapping the last row into its place (order is not
    /// preserved). Returns the entity that used to occupy the last slot, if
    /// any row other than the removed one moved.
    pub fn remove_row(&mut self, row: usize) -> Option<Handle> {
        debug_assert!(row < self.row_count);
        let last = self.row_count - 1;
        let moved = if row != last {
            let moved_entity = self.entity_at(last);
            let (dst, src) = self.data.split_at_mut(last * self.stride);
            dst[row * self.stride..row * self.stride + self.stride]
                .copy_from_slice(&src[..self.stride]);
            Some(moved_entity)
        } else {
            None
        };
        self.data.truncate(last * self.stride);
        self.row_count -= 1;
        moved
    }
}
