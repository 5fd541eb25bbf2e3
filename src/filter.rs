//! Filter predicates over an aggregated table.
//!
//! Filters combine with AND across product, bucket and team; a multi-select
//! matches when ANY of its chosen values matches. Grouped rows are matched by
//! substring against the joined bucket/team text, flat rows by exact value.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::aggregate::{AggregatedProductRow, FlatTaskRow, Table};

/// Product selector value meaning "no product filter".
pub const ALL_PRODUCTS: &str = "All";

/// User-selected filter values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Single-select product; `None` or `"All"` disables the filter.
    pub product: Option<String>,
    /// Multi-select buckets; empty disables the filter.
    pub buckets: Vec<String>,
    /// Multi-select teams; empty disables the filter.
    pub teams: Vec<String>,
}

impl Filters {
    /// The active product filter, if any.
    pub fn active_product(&self) -> Option<&str> {
        self.product.as_deref().filter(|p| *p != ALL_PRODUCTS)
    }

    pub fn is_empty(&self) -> bool {
        self.active_product().is_none() && self.buckets.is_empty() && self.teams.is_empty()
    }

    fn matches_grouped(&self, row: &AggregatedProductRow) -> bool {
        if let Some(p) = self.active_product() {
            if row.product != p {
                return false;
            }
        }
        if !self.buckets.is_empty() {
            let joined = row.buckets_joined();
            if !self.buckets.iter().any(|b| joined.contains(b.as_str())) {
                return false;
            }
        }
        if !self.teams.is_empty() {
            let joined = row.teams_joined();
            if !self.teams.iter().any(|t| joined.contains(t.as_str())) {
                return false;
            }
        }
        true
    }

    fn matches_flat(&self, row: &FlatTaskRow) -> bool {
        if let Some(p) = self.active_product() {
            if row.product != p {
                return false;
            }
        }
        if !self.buckets.is_empty() && !self.buckets.iter().any(|b| *b == row.bucket) {
            return false;
        }
        if !self.teams.is_empty() && !self.teams.iter().any(|t| *t == row.team) {
            return false;
        }
        true
    }
}

/// Return the rows of `table` satisfying every active filter.
pub fn apply(table: &Table, filters: &Filters) -> Table {
    match table {
        Table::Flat(rows) => Table::Flat(
            rows.iter()
                .filter(|r| filters.matches_flat(r))
                .cloned()
                .collect(),
        ),
        Table::Grouped(rows) => Table::Grouped(
            rows.iter()
                .filter(|r| filters.matches_grouped(r))
                .cloned()
                .collect(),
        ),
    }
}

/// Value sets offered by the three filter controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub buckets: Vec<String>,
    pub teams: Vec<String>,
}

impl FilterOptions {
    /// Collect sorted distinct products, buckets and teams from a table.
    pub fn from_table(table: &Table) -> Self {
        let mut products = BTreeSet::new();
        let mut buckets = BTreeSet::new();
        let mut teams = BTreeSet::new();
        match table {
            Table::Flat(rows) => {
                for r in rows {
                    products.insert(r.product.clone());
                    buckets.insert(r.bucket.clone());
                    teams.insert(r.team.clone());
                }
            }
            Table::Grouped(rows) => {
                for r in rows {
                    products.insert(r.product.clone());
                    buckets.extend(r.buckets.iter().cloned());
                    teams.extend(r.teams.iter().cloned());
                }
            }
        }
        FilterOptions {
            products: products.into_iter().collect(),
            buckets: buckets.into_iter().collect(),
            teams: teams.into_iter().collect(),
        }
    }

    /// Product selector choices, led by `"All"`.
    pub fn product_choices(&self) -> Vec<String> {
        std::iter::once(ALL_PRODUCTS.to_string())
            .chain(self.products.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::aggregate::tests::widget_snapshot;
    use crate::fields::Strategy;

    fn filters(product: Option<&str>, buckets: &[&str], teams: &[&str]) -> Filters {
        Filters {
            product: product.map(Into::into),
            buckets: buckets.iter().map(|s| s.to_string()).collect(),
            teams: teams.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_filters_keep_everything() {
        for strategy in [Strategy::Flat, Strategy::Grouped] {
            let table = aggregate(&widget_snapshot(), strategy);
            assert_eq!(apply(&table, &Filters::default()), table);
            assert_eq!(apply(&table, &filters(Some("All"), &[], &[])), table);
        }
    }

    #[test]
    fn test_product_and_bucket_are_anded() {
        let table = aggregate(&widget_snapshot(), Strategy::Flat);
        let out = apply(&table, &filters(Some("Widget"), &["Design"], &[]));
        let Table::Flat(rows) = out else { panic!("expected flat") };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bucket, "Design");

        let out = apply(&table, &filters(Some("Gizmo"), &["Design"], &[]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_multi_select_is_ored() {
        let table = aggregate(&widget_snapshot(), Strategy::Flat);
        let out = apply(&table, &filters(None, &["Design", "Unknown"], &[]));
        assert_eq!(out.products(), vec!["Widget", "Gizmo"]);
    }

    #[test]
    fn test_grouped_matches_by_substring() {
        let table = aggregate(&widget_snapshot(), Strategy::Grouped);
        let out = apply(&table, &filters(None, &["QA"], &[]));
        assert_eq!(out.products(), vec!["Widget"]);

        // "Des" is not a bucket but appears inside the joined "Design, QA".
        let out = apply(&table, &filters(None, &["Des"], &[]));
        assert_eq!(out.products(), vec!["Widget"]);

        let out = apply(&table, &filters(None, &[], &["Beta"]));
        assert_eq!(out.products(), vec!["Widget", "Gizmo"]);
    }

    #[test]
    fn test_flat_matches_exactly() {
        let table = aggregate(&widget_snapshot(), Strategy::Flat);
        let out = apply(&table, &filters(None, &["Des"], &[]));
        assert!(out.is_empty());
        let out = apply(&table, &filters(None, &[], &["Alpha"]));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_filter_idempotent() {
        let f = filters(Some("Widget"), &["QA", "Design"], &["Beta"]);
        for strategy in [Strategy::Flat, Strategy::Grouped] {
            let table = aggregate(&widget_snapshot(), strategy);
            let once = apply(&table, &f);
            assert_eq!(apply(&once, &f), once);
        }
    }

    #[test]
    fn test_options() {
        let table = aggregate(&widget_snapshot(), Strategy::Grouped);
        let opts = FilterOptions::from_table(&table);
        assert_eq!(opts.products, vec!["Gizmo", "Widget"]);
        assert_eq!(opts.buckets, vec!["Design", "QA", "Unknown"]);
        assert_eq!(opts.teams, vec!["Alpha", "Beta"]);
        assert_eq!(opts.product_choices()[0], ALL_PRODUCTS);
        assert_eq!(
            FilterOptions::from_table(&aggregate(&widget_snapshot(), Strategy::Flat)),
            opts
        );
    }
}
