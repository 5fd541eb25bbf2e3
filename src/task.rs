//! Planner records as returned by the remote API.
//!
//! Every field the tracker does not strictly need is optional so that absent
//! or null values fall back to documented defaults instead of failing to decode.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept any JSON value; anything but a string decodes as empty.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Integers pass through, fractional numbers truncate, anything else is absent.
fn lenient_opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    })
}

/// Plan metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    /// Owning group identifier; required to build task permalinks.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub owner: Option<String>,
}

impl Plan {
    /// Display name of the plan, falling back to `Plan {id}`.
    pub fn display_name(&self, plan_id: &str) -> String {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Plan {}", plan_id),
        }
    }
}

/// A named sub-grouping of tasks within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

/// A unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub bucket_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub percent_complete: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub due_date_time: Option<String>,
}

/// Envelope used by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}
