use crate::column::{Column, OperatorFamilies};
use crate::descriptor::{RefRecord, TableDescriptor};
use ecs_core::Handle;

/// §6 "System kinds".
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SystemKind {
    /// Run once per frame/tick via `run_system`.
    Periodic,
    /// Run on demand, same dispatch path as `Periodic`.
    OnDemand,
    /// Notified once per newly bound row.
    OnInit,
    /// Notified once per about-to-be-removed row.
    OnDeinit,
}

/// Everything C7 owns for one system: the action, its classification, its
/// signature, and the two table partitions the activation manager keeps
/// disjoint.
pub struct SystemState {
    pub kind: SystemKind,
    pub enabled: bool,
    pub columns: Vec<Column>,
    pub from_entity: OperatorFamilies,
    pub from_component: OperatorFamilies,
    pub tables: Vec<TableDescriptor>,
    pub inactive_tables: Vec<TableDescriptor>,
    pub refs: Vec<RefRecord>,
    pub action: Box<crate::dispatch::Action>,
}

impl SystemState {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn find_table(&self, table: ecs_core::TableId) -> Option<&TableDescriptor> {
        self.tables.iter().find(|d| d.table == table)
    }
}
