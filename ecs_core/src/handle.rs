use std::fmt;

/// Opaque, totally-ordered identifier shared by entities and component types.
///
/// The runtime does not distinguish entity ids from component-type ids: a
/// component is itself an entity carrying metadata, so both are drawn from
/// the same allocator and the same numeric space. `NIL` is never a valid
/// live handle and is used as the "no value" sentinel the spec calls `0`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Handle(pub u32);

impl Handle {
    pub const NIL: Handle = Handle(0);

    #[inline]
    pub fn is_nil(self) -> bool {
        self == Handle::NIL
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
