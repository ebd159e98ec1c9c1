/// Marker for types the table storage will copy by value into a row.
///
/// Mirrors the `'static + Send + Sync` shape of the base workspace's own
/// `Resource`/`Component` marker traits, narrowed to `Copy` because rows are
/// raw byte buffers the table moves with `memcpy`-style copies rather than
/// drops/clones.
pub trait Component: Copy + 'static {}
impl<T: Copy + 'static> Component for T {}

#[derive(Clone, Copy, Debug)]
pub struct ComponentMeta {
    pub size: usize,
    pub align: usize,
}

impl ComponentMeta {
    pub fn of<T: Component>() -> Self {
        ComponentMeta {
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }

    /// A zero-sized tag: present in a family, occupies no row bytes.
    pub fn tag() -> Self {
        ComponentMeta { size: 0, align: 1 }
    }
}
