//! Summary statistics driving the product count and the team chart.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::aggregate::Table;

/// Counts derived from a filtered table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub row_count: usize,
    pub distinct_products: usize,
    pub team_counts: BTreeMap<String, usize>,
}

impl Summary {
    pub fn from_table(table: &Table) -> Self {
        let distinct_products = table.products().into_iter().collect::<BTreeSet<_>>().len();

        let mut team_counts: BTreeMap<String, usize> = BTreeMap::new();
        match table {
            Table::Flat(rows) => {
                for r in rows {
                    *team_counts.entry(r.team.clone()).or_default() += 1;
                }
            }
            Table::Grouped(rows) => {
                for r in rows {
                    for team in &r.teams {
                        *team_counts.entry(team.clone()).or_default() += 1;
                    }
                }
            }
        }

        Summary {
            row_count: table.len(),
            distinct_products,
            team_counts,
        }
    }

    /// Chart rendering is skipped when there is nothing to chart.
    pub fn has_chart(&self) -> bool {
        !self.team_counts.is_empty()
    }

    /// Team counts ordered by descending count, then name.
    pub fn ranked_teams(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .team_counts
            .iter()
            .map(|(team, count)| (team.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked
    }

    /// Share of the chart held by `count`, in percent.
    pub fn share(&self, count: usize) -> f64 {
        let total: usize = self.team_counts.values().sum();
        if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        }
    }
}
