//! Enumerations and field types for the tracker.
//!
//! This module defines the derived status classification of a task and the
//! aggregation strategy selector used to shape the output table.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Derived completion state of a task, recomputed on every run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StatusLabel {
    NotStarted,
    InProgress,
    Completed,
}

impl StatusLabel {
    /// Display label rendered in tables and filter controls.
    pub fn label(self) -> &'static str {
        match self {
            StatusLabel::NotStarted => "🟡 Not Started",
            StatusLabel::InProgress => "🔄 In Progress",
            StatusLabel::Completed => "✅ Completed",
        }
    }
}

/// Classify a task from its completion percentage.
///
/// Exactly 100 is completed, anything else above zero is in progress, and
/// zero, negative or missing values are not started.
pub fn classify(percent: Option<i64>) -> StatusLabel {
    match percent.unwrap_or(0) {
        100 => StatusLabel::Completed,
        p if p > 0 => StatusLabel::InProgress,
        _ => StatusLabel::NotStarted,
    }
}

/// Output shape of the aggregation step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One row per open task.
    Flat,
    /// One row per product title, merging buckets, statuses and teams.
    #[default]
    Grouped,
}

impl Strategy {
    /// The other strategy, used by the dashboard toggle.
    pub fn toggled(self) -> Self {
        match self {
            Strategy::Flat => Strategy::Grouped,
            Strategy::Grouped => Strategy::Flat,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Flat => "Flat",
            Strategy::Grouped => "Grouped",
        }
    }
}
