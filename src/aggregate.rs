//! Classification and aggregation of fetched tasks into table rows.
//!
//! Completed tasks never produce a row. The flat strategy emits one row per
//! open task; the grouped strategy merges open tasks by title so a product
//! shows every bucket, status and team it currently has open work in.

use std::collections::{BTreeSet, HashMap};

use crate::fields::{classify, StatusLabel, Strategy};
use crate::snapshot::{format_timestamp, resolve_bucket, Snapshot};

/// Separator for set-valued columns.
pub const SET_SEPARATOR: &str = ", ";
/// Separator for the link column of a grouped row.
pub const LINK_SEPARATOR: &str = " | ";
/// Due column value when a task has no due date.
pub const NO_DUE_DATE: &str = "No Due Date";

/// One open task.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTaskRow {
    pub product: String,
    pub bucket: String,
    pub status: StatusLabel,
    pub team: String,
    pub created: Option<String>,
    pub due: String,
    pub link: String,
}

/// All open tasks sharing a product title.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedProductRow {
    pub product: String,
    pub buckets: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    pub teams: BTreeSet<String>,
    /// Markdown links in encounter order, one per contributing task.
    pub links: Vec<String>,
}

impl AggregatedProductRow {
    pub fn buckets_joined(&self) -> String {
        join_set(&self.buckets)
    }

    pub fn statuses_joined(&self) -> String {
        join_set(&self.statuses)
    }

    pub fn teams_joined(&self) -> String {
        join_set(&self.teams)
    }

    pub fn links_joined(&self) -> String {
        self.links.join(LINK_SEPARATOR)
    }
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(SET_SEPARATOR)
}

/// Output table in the shape of the selected strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Flat(Vec<FlatTaskRow>),
    Grouped(Vec<AggregatedProductRow>),
}

impl Table {
    pub fn len(&self) -> usize {
        match self {
            Table::Flat(rows) => rows.len(),
            Table::Grouped(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Table::Flat(_) => Strategy::Flat,
            Table::Grouped(_) => Strategy::Grouped,
        }
    }

    /// Product title of every row, in row order.
    pub fn products(&self) -> Vec<&str> {
        match self {
            Table::Flat(rows) => rows.iter().map(|r| r.product.as_str()).collect(),
            Table::Grouped(rows) => rows.iter().map(|r| r.product.as_str()).collect(),
        }
    }
}

/// Deep link to a task in the planner web UI.
pub fn permalink(tenant_id: &str, group_id: &str, plan_id: &str, task_id: &str) -> String {
    format!(
        "https://tasks.office.com/{}/en-US/Home/Planner/#/plantaskboard?groupId={}&planId={}&taskId={}",
        tenant_id, group_id, plan_id, task_id
    )
}

/// Open task with everything resolved, shared by both strategies.
struct OpenTask<'a> {
    title: &'a str,
    bucket: &'a str,
    status: StatusLabel,
    team: &'a str,
    created: Option<&'a str>,
    due: Option<&'a str>,
    link: String,
}

fn open_tasks(snapshot: &Snapshot) -> Vec<OpenTask<'_>> {
    let mut out = Vec::new();
    for plan in &snapshot.plans {
        let buckets = plan.bucket_map();
        for task in &plan.tasks {
            let status = classify(task.percent_complete);
            if status == StatusLabel::Completed {
                continue;
            }
            out.push(OpenTask {
                title: &task.title,
                bucket: resolve_bucket(&buckets, task.bucket_id.as_deref()),
                status,
                team: &plan.plan_name,
                created: task.created_date_time.as_deref(),
                due: task.due_date_time.as_deref(),
                link: permalink(&snapshot.tenant_id, &plan.group_id, &plan.plan_id, &task.id),
            });
        }
    }
    out
}

/// Build the output table for a snapshot.
pub fn aggregate(snapshot: &Snapshot, strategy: Strategy) -> Table {
    let tasks = open_tasks(snapshot);
    tracing::debug!(
        open = tasks.len(),
        total = snapshot.task_count(),
        strategy = strategy.name(),
        "aggregating tasks"
    );
    match strategy {
        Strategy::Flat => Table::Flat(tasks.into_iter().map(flat_row).collect()),
        Strategy::Grouped => Table::Grouped(group_rows(tasks)),
    }
}

fn flat_row(t: OpenTask<'_>) -> FlatTaskRow {
    FlatTaskRow {
        product: t.title.to_string(),
        bucket: t.bucket.to_string(),
        status: t.status,
        team: t.team.to_string(),
        created: format_timestamp(t.created),
        due: format_timestamp(t.due).unwrap_or_else(|| NO_DUE_DATE.to_string()),
        link: t.link,
    }
}

fn group_rows(tasks: Vec<OpenTask<'_>>) -> Vec<AggregatedProductRow> {
    let mut rows: Vec<AggregatedProductRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for t in tasks {
        let idx = *index.entry(t.title.to_string()).or_insert_with(|| {
            rows.push(AggregatedProductRow {
                product: t.title.to_string(),
                ..Default::default()
            });
            rows.len() - 1
        });
        let row = &mut rows[idx];
        row.buckets.insert(t.bucket.to_string());
        row.statuses.insert(t.status.label().to_string());
        row.teams.insert(t.team.to_string());
        row.links.push(format!("[{}]({})", t.bucket, t.link));
    }
    rows
}
