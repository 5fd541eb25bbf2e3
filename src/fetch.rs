//! Plan fetching from the remote planner API.
//!
//! Each plan costs three sequential GETs: metadata, buckets, tasks. Any failed
//! call, or plan metadata without an owning group, drops the whole plan for the
//! run; nothing from a failed plan reaches the snapshot.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::Result;
use crate::snapshot::{PlanData, Snapshot};
use crate::task::{Bucket, ListResponse, Plan, Task};

/// Raw response from the transport.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Read-only access to the planner API, addressed by path below the base URL.
pub trait Transport {
    fn get(&self, path: &str) -> Result<Response>;
}

/// Blocking HTTP transport sending the bearer token on every request.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config, token: String) -> Result<Self> {
        Self::new(&config.api.base_url, token)
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(Response { status, body })
    }
}

/// Why a plan was dropped from the run.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Status { endpoint: &'static str, status: u16 },
    Transport { endpoint: &'static str, message: String },
    Decode { endpoint: &'static str, message: String },
    MissingOwner,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Status { endpoint, status } => write!(f, "{} returned HTTP {}", endpoint, status),
            SkipReason::Transport { endpoint, message } => write!(f, "{} request failed: {}", endpoint, message),
            SkipReason::Decode { endpoint, message } => write!(f, "{} body undecodable: {}", endpoint, message),
            SkipReason::MissingOwner => write!(f, "plan has no owning group"),
        }
    }
}

/// Fetches plans one at a time through a `Transport`.
pub struct PlanFetcher<T: Transport> {
    transport: T,
    tenant_id: String,
}

impl<T: Transport> PlanFetcher<T> {
    pub fn new(transport: T, tenant_id: &str) -> Self {
        Self {
            transport,
            tenant_id: tenant_id.to_string(),
        }
    }

    fn get_json<R: DeserializeOwned>(&self, endpoint: &'static str, path: &str) -> std::result::Result<R, SkipReason> {
        let resp = self.transport.get(path).map_err(|e| SkipReason::Transport {
            endpoint,
            message: e.to_string(),
        })?;
        if resp.status != 200 {
            return Err(SkipReason::Status { endpoint, status: resp.status });
        }
        serde_json::from_str(&resp.body).map_err(|e| SkipReason::Decode {
            endpoint,
            message: e.to_string(),
        })
    }

    /// Fetch one plan with its buckets and tasks.
    pub fn try_fetch_plan(&self, plan_id: &str) -> std::result::Result<PlanData, SkipReason> {
        let plan: Plan = self.get_json("plan", &format!("/plans/{}", plan_id))?;
        let group_id = plan
            .owner
            .clone()
            .filter(|g| !g.is_empty())
            .ok_or(SkipReason::MissingOwner)?;

        let buckets: ListResponse<Bucket> =
            self.get_json("buckets", &format!("/plans/{}/buckets", plan_id))?;
        let tasks: ListResponse<Task> = self.get_json("tasks", &format!("/plans/{}/tasks", plan_id))?;

        Ok(PlanData {
            plan_id: plan_id.to_string(),
            plan_name: plan.display_name(plan_id),
            group_id,
            buckets: buckets.value,
            tasks: tasks.value,
        })
    }

    /// Fetch one plan, logging and discarding it on failure.
    pub fn fetch_plan(&self, plan_id: &str) -> Option<PlanData> {
        match self.try_fetch_plan(plan_id) {
            Ok(plan) => {
                tracing::info!(
                    plan_id,
                    plan = %plan.plan_name,
                    buckets = plan.buckets.len(),
                    tasks = plan.tasks.len(),
                    "fetched plan"
                );
                Some(plan)
            }
            Err(reason) => {
                tracing::warn!(plan_id, %reason, "skipping plan");
                None
            }
        }
    }

    /// Fetch every plan in order into a new snapshot.
    pub fn fetch_all(&self, plan_ids: &[String]) -> Snapshot {
        let mut snapshot = Snapshot::new(&self.tenant_id);
        for plan_id in plan_ids {
            if let Some(plan) = self.fetch_plan(plan_id) {
                snapshot.plans.push(plan);
            }
        }
        tracing::info!(
            requested = plan_ids.len(),
            fetched = snapshot.plans.len(),
            tasks = snapshot.task_count(),
            "fetch complete"
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, Table};
    use crate::error::Error;
    use crate::fields::{classify, StatusLabel, Strategy};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned responses keyed by path; unknown paths return 404.
    #[derive(Default)]
    struct FakeTransport {
        routes: HashMap<String, (u16, String)>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        fn route(mut self, path: &str, status: u16, body: &str) -> Self {
            self.routes.insert(path.to_string(), (status, body.to_string()));
            self
        }

        fn plan(self, id: &str, title: &str, buckets: &str, tasks: &str) -> Self {
            self.route(
                &format!("/plans/{}", id),
                200,
                &format!(r#"{{"id":"{}","title":"{}","owner":"grp-{}"}}"#, id, title, id),
            )
            .route(&format!("/plans/{}/buckets", id), 200, buckets)
            .route(&format!("/plans/{}/tasks", id), 200, tasks)
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, path: &str) -> Result<Response> {
            self.calls.borrow_mut().push(path.to_string());
            if path == "/plans/boom" {
                return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "reset")));
            }
            let (status, body) = self
                .routes
                .get(path)
                .cloned()
                .unwrap_or((404, String::new()));
            Ok(Response { status, body })
        }
    }

    const BUCKETS: &str = r#"{"value":[{"id":"b1","name":"Design"}]}"#;
    const TASKS: &str = r#"{"value":[
        {"id":"t1","title":"Widget","bucketId":"b1","percentComplete":50},
        {"id":"t2","title":"Done thing","bucketId":"b1","percentComplete":100}
    ]}"#;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fetch_plan_success() {
        let fetcher = PlanFetcher::new(FakeTransport::default().plan("p1", "Alpha", BUCKETS, TASKS), "tn");
        let plan = fetcher.try_fetch_plan("p1").unwrap();
        assert_eq!(plan.plan_name, "Alpha");
        assert_eq!(plan.group_id, "grp-p1");
        assert_eq!(plan.buckets.len(), 1);
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(
            *fetcher.transport.calls.borrow(),
            vec!["/plans/p1", "/plans/p1/buckets", "/plans/p1/tasks"]
        );
    }

    #[test]
    fn test_metadata_failure_skips_plan() {
        let transport = FakeTransport::default()
            .route("/plans/p1", 403, "")
            .plan("p2", "Beta", BUCKETS, TASKS);
        let fetcher = PlanFetcher::new(transport, "tn");
        assert_eq!(
            fetcher.try_fetch_plan("p1").unwrap_err(),
            SkipReason::Status { endpoint: "plan", status: 403 }
        );

        let snap = fetcher.fetch_all(&ids(&["p1", "p2"]));
        assert_eq!(snap.plans.len(), 1);
        assert_eq!(snap.plans[0].plan_id, "p2");
        assert_eq!(snap.tenant_id, "tn");
        for strategy in [Strategy::Flat, Strategy::Grouped] {
            let table = aggregate(&snap, strategy);
            assert_eq!(table.len(), 1);
            assert_eq!(table.products(), vec!["Widget"]);
        }
    }

    #[test]
    fn test_later_call_failure_discards_partial_plan() {
        let transport = FakeTransport::default()
            .route("/plans/p1", 200, r#"{"id":"p1","title":"Alpha","owner":"g"}"#)
            .route("/plans/p1/buckets", 200, BUCKETS)
            .route("/plans/p1/tasks", 500, "oops");
        let fetcher = PlanFetcher::new(transport, "tn");
        assert_eq!(
            fetcher.try_fetch_plan("p1").unwrap_err(),
            SkipReason::Status { endpoint: "tasks", status: 500 }
        );
        assert!(fetcher.fetch_all(&ids(&["p1"])).plans.is_empty());
    }

    #[test]
    fn test_missing_owner_skips_before_buckets() {
        let transport = FakeTransport::default()
            .route("/plans/p1", 200, r#"{"id":"p1","title":"Alpha"}"#)
            .route("/plans/p1/buckets", 200, BUCKETS)
            .route("/plans/p1/tasks", 200, TASKS);
        let fetcher = PlanFetcher::new(transport, "tn");
        assert_eq!(fetcher.try_fetch_plan("p1").unwrap_err(), SkipReason::MissingOwner);
        assert_eq!(*fetcher.transport.calls.borrow(), vec!["/plans/p1"]);
    }

    #[test]
    fn test_transport_and_decode_errors_skip() {
        let transport = FakeTransport::default()
            .route("/plans/p1", 200, "not json")
            .plan("p2", "", BUCKETS, TASKS);
        let fetcher = PlanFetcher::new(transport, "tn");
        assert!(matches!(fetcher.try_fetch_plan("boom"), Err(SkipReason::Transport { .. })));
        assert!(matches!(fetcher.try_fetch_plan("p1"), Err(SkipReason::Decode { .. })));

        let snap = fetcher.fetch_all(&ids(&["boom", "p1", "p2"]));
        assert_eq!(snap.plans.len(), 1);
        assert_eq!(snap.plans[0].plan_name, "Plan p2");
    }

    #[test]
    fn test_malformed_task_fields_keep_plan() {
        let tasks = r#"{"value":[
            {"id":"t1","title":"Widget","bucketId":"b1","percentComplete":50},
            {"id":"t2","title":null,"bucketId":"b1","percentComplete":"half"}
        ]}"#;
        let fetcher = PlanFetcher::new(FakeTransport::default().plan("p1", "Alpha", BUCKETS, tasks), "tn");
        let plan = fetcher.try_fetch_plan("p1").unwrap();
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[1].title, "");
        assert_eq!(classify(plan.tasks[1].percent_complete), StatusLabel::NotStarted);

        let snap = fetcher.fetch_all(&ids(&["p1"]));
        match aggregate(&snap, Strategy::Flat) {
            Table::Flat(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].product, "Widget");
                assert_eq!(rows[1].product, "");
                assert_eq!(rows[1].status, StatusLabel::NotStarted);
            }
            Table::Grouped(_) => panic!("expected flat table"),
        }
    }
}
