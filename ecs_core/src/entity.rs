use crate::handle::Handle;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counter {
    next: u32,
    free: Vec<u32>,
}

/// Hands out fresh handles and recycles freed ones.
///
/// Entities and registered component types are both just handles drawn from
/// this allocator — a component is an entity that happens to carry a
/// `Component` marker, which is how the spec's "system-as-entity" shape
/// (§9, Design Notes) falls out naturally: there is only ever one id space.
///
/// The counter lives behind an `Arc<Mutex<_>>` so that every `World` a
/// `Universe` creates shares one id space — mirroring the base workspace's
/// `Universe` sharing one `Arc<Mutex<BlockAllocator>>` across the
/// `EntityAllocator`s of every world it hands out, so two worlds from the
/// same universe never mint the same handle. A standalone `World::new()`
/// still gets its own private counter.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    counter: Arc<Mutex<Counter>>,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityAllocator {
    pub fn new() -> Self {
        // 0 is reserved for Handle::NIL.
        EntityAllocator {
            counter: Arc::new(Mutex::new(Counter { next: 1, free: Vec::new() })),
        }
    }

    pub fn create(&mut self) -> Handle {
        let mut counter = self.counter.lock();
        if let Some(id) = counter.free.pop() {
            Handle(id)
        } else {
            let id = counter.next;
            counter.next += 1;
            Handle(id)
        }
    }

    pub fn free(&mut self, handle: Handle) {
        debug_assert!(!handle.is_nil());
        self.counter.lock().free.push(handle.0);
    }
}

/// Owns the allocator shared by worlds created from it, so that entity and
/// component handles never collide between two worlds of the same universe
/// (mirrors the base workspace's `Universe -> create_world` split).
#[derive(Debug, Default)]
pub struct Universe {
    name: String,
    allocator: EntityAllocator,
}

impl Universe {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::info!(universe = %name, "starting universe");
        Universe {
            name,
            allocator: EntityAllocator::new(),
        }
    }

    pub fn create_world(&self) -> crate::world::World {
        tracing::debug!(universe = %self.name, "creating world");
        crate::world::World::with_allocator(self.allocator.clone())
    }
}
