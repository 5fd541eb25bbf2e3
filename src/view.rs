//! Pure recomputation of the dashboard view from a cached snapshot.

use crate::aggregate::{aggregate, Table};
use crate::fields::Strategy;
use crate::filter::{apply, FilterOptions, Filters};
use crate::snapshot::Snapshot;
use crate::summary::Summary;

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Filtered rows.
    pub table: Table,
    /// Filter control values, taken from the unfiltered table.
    pub options: FilterOptions,
    pub summary: Summary,
}

/// Aggregate, filter and summarise a snapshot. Performs no I/O.
pub fn compute_view(snapshot: &Snapshot, strategy: Strategy, filters: &Filters) -> View {
    let full = aggregate(snapshot, strategy);
    let options = FilterOptions::from_table(&full);
    let table = apply(&full, filters);
    let summary = Summary::from_table(&table);
    View { table, options, summary }
}
