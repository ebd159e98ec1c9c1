//! Signature matching, table binding and dispatch for the ecs runtime: C1–C7
//! from spec.md. This crate is written against `ecs-core`'s `World` but does
//! not own it — see spec.md §1 ("Out of scope").

mod activation;
mod binder;
mod column;
mod descriptor;
mod dispatch;
mod engine;
mod error;
mod matcher;
mod refs;
mod schedule;
mod state;

pub use column::{Column, Operator, OperatorFamilies, Payload, Source};
pub use descriptor::{RefRecord, TableDescriptor};
pub use dispatch::{Action, Info, Job};
pub use engine::Engine;
pub use error::{BuildError, LookupError};
pub use state::{SystemKind, SystemState};

#[cfg(feature = "par-iter")]
pub use schedule::run_system_parallel;
pub use schedule::partition_jobs;
