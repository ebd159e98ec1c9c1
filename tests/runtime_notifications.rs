//! Regression coverage for `Runtime::spawn`/`despawn`: a freshly created
//! table's first row has to activate *every* system bound to that table,
//! not just `Periodic` ones — otherwise an `OnInit`/`OnDeinit` system's
//! descriptor is stranded in `inactive_tables` and `system_notify` silently
//! drops every row it should have seen.

use ecs::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

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
fn on_init_fires_for_the_first_row_of_a_brand_new_table() {
    let mut rt = Runtime::new();
    let position = rt.world.register_component::<Position>("Position");

    let init_count = Arc::new(AtomicUsize::new(0));
    let init_count_clone = init_count.clone();
    rt.new_system("spawned", SystemKind::OnInit, "Position", move |_| {
        init_count_clone.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    // This table does not exist yet: `spawn` must create it, bind the
    // on-init system while it is still empty, and still deliver the
    // notification for this very first row.
    let value = Position { x: 1.0, y: 1.0 };
    rt.spawn(&[(position, bytes_of(&value))]);

    assert_eq!(init_count.load(Ordering::SeqCst), 1);
}

#[test]
fn on_deinit_fires_before_the_last_row_of_a_table_is_removed() {
    let mut rt = Runtime::new();
    let position = rt.world.register_component::<Position>("Position");

    let deinit_count = Arc::new(AtomicUsize::new(0));
    let deinit_count_clone = deinit_count.clone();
    rt.new_system("despawned", SystemKind::OnDeinit, "Position", move |_| {
        deinit_count_clone.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    let value = Position { x: 2.0, y: 2.0 };
    let entity = rt.spawn(&[(position, bytes_of(&value))]);
    assert_eq!(deinit_count.load(Ordering::SeqCst), 0);

    assert!(rt.despawn(entity));
    assert_eq!(deinit_count.load(Ordering::SeqCst), 1);
}
