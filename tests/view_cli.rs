mod support;

use predicates::prelude::*;
use serde_json::Value;

use support::{TestHome, WIDGET_SNAPSHOT};

fn view_json(home: &TestHome, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
    let output = home
        .cmd()
        .arg("--snapshot")
        .arg(home.snapshot_path())
        .arg("view")
        .args(args)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    Ok(serde_json::from_slice(&output)?)
}

#[test]
fn grouped_view_merges_products() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.write_snapshot(WIDGET_SNAPSHOT)?;

    let value = view_json(&home, &["--strategy", "grouped"])?;
    let rows = value["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["product"], "Widget");
    assert_eq!(rows[0]["buckets"], "Design, QA");
    assert_eq!(rows[0]["team"], "Alpha, Beta");
    assert_eq!(rows[0]["statuses"], "🔄 In Progress");
    assert_eq!(rows[0]["links"].as_array().map(|l| l.len()), Some(2));
    assert_eq!(rows[1]["buckets"], "Unknown");
    assert_eq!(value["summary"]["distinct_products"], 2);
    assert_eq!(value["summary"]["team_counts"]["Beta"], 2);
    Ok(())
}

#[test]
fn flat_view_keeps_task_rows() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.write_snapshot(WIDGET_SNAPSHOT)?;

    let value = view_json(&home, &["--strategy", "flat"])?;
    let rows = value["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["created"], "2024-05-01");
    assert_eq!(rows[0]["due"], "2024-06-30");
    assert_eq!(rows[1]["due"], "No Due Date");
    assert_eq!(rows[2]["bucket"], "Unknown");
    assert!(rows.iter().all(|r| r["product"] != "Gadget"));
    assert!(rows[0]["link"]
        .as_str()
        .unwrap_or_default()
        .ends_with("groupId=ga&planId=pa&taskId=t1"));
    Ok(())
}

#[test]
fn filters_combine_with_and() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.write_snapshot(WIDGET_SNAPSHOT)?;

    let value = view_json(
        &home,
        &["--strategy", "flat", "--product", "Widget", "--bucket", "Design"],
    )?;
    assert_eq!(value["rows"].as_array().map(|r| r.len()), Some(1));
    assert_eq!(value["rows"][0]["team"], "Alpha");

    let value = view_json(&home, &["--product", "Gizmo", "--team", "Alpha"])?;
    assert_eq!(value["rows"].as_array().map(|r| r.len()), Some(0));
    assert_eq!(value["summary"]["distinct_products"], 0);
    Ok(())
}

#[test]
fn table_output_skips_chart_when_empty() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.write_snapshot(WIDGET_SNAPSHOT)?;

    home.cmd()
        .args(["view", "--team", "Alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Products: 1"))
        .stdout(predicate::str::contains("Product Distribution by Team"));

    home.cmd()
        .args(["view", "--team", "Nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Products: 0"))
        .stdout(predicate::str::contains("Product Distribution by Team").not());
    Ok(())
}

#[test]
fn options_lists_filter_values() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.write_snapshot(WIDGET_SNAPSHOT)?;

    let output = home
        .cmd()
        .args(["options", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value["products"], serde_json::json!(["Gizmo", "Widget"]));
    assert_eq!(value["buckets"], serde_json::json!(["Design", "QA", "Unknown"]));
    assert_eq!(value["teams"], serde_json::json!(["Alpha", "Beta"]));
    Ok(())
}

#[test]
fn export_writes_csv() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.write_snapshot(WIDGET_SNAPSHOT)?;

    home.cmd()
        .args(["export", "--output", "out.csv", "--strategy", "grouped"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 row(s) to out.csv"));

    let csv = std::fs::read_to_string(home.path().join("out.csv"))?;
    assert!(csv.starts_with("Product Name,Buckets,Statuses,Team,Open Task Links\n"));
    assert!(csv.contains("Widget,\"Design, QA\""));
    Ok(())
}

#[test]
fn corrupt_snapshot_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.write_snapshot("{ not json")?;

    home.cmd()
        .arg("view")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Snapshot unreadable"));
    Ok(())
}
