use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("weekplan-{nanos}-{name}"))
}

fn write_store(store_dir: &Path, content: &str) {
    std::fs::create_dir_all(store_dir).unwrap();
    std::fs::write(store_dir.join("week-planner-todos.json"), content).unwrap();
}

fn run(store_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_weekplan"))
        .args(args)
        .env("WEEKPLAN_STORE_DIR", store_dir)
        .env("WEEKPLAN_CONFIG_PATH", store_dir.join("config.json"))
        .output()
        .expect("failed to run weekplan")
}

fn sample_week() -> String {
    serde_json::json!({
        "monday": [
            {"id": "m-old", "text": "old pending", "completed": false,
             "createdAt": "2025-12-01T08:00:00.000Z", "priority": "low"},
            {"id": "m-done", "text": "finished", "completed": true,
             "createdAt": "2025-12-03T08:00:00.000Z", "priority": "high"},
            {"id": "m-new", "text": "new pending", "completed": false,
             "createdAt": "2025-12-02T08:00:00.000Z", "priority": "medium"}
        ],
        "tuesday": [], "wednesday": [], "thursday": [],
        "friday": [], "saturday": [], "sunday": []
    })
    .to_string()
}

#[test]
fn list_orders_pending_first_then_newest() {
    let store_dir = temp_path("cli-list");
    write_store(&store_dir, &sample_week());

    let output = run(&store_dir, &["list", "--day", "monday", "--json"]);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["m-new", "m-old", "m-done"]);
}

#[test]
fn list_plain_text_shows_header_and_marks() {
    let store_dir = temp_path("cli-list-plain");
    write_store(&store_dir, &sample_week());

    let output = run(&store_dir, &["list", "--day", "mon"]);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Monday (1/3)"));
    assert!(stdout.contains("[x] m-done | finished | high"));
    assert!(stdout.contains("[ ] m-old | old pending | low"));
}

#[test]
fn list_empty_day_prints_only_header() {
    let store_dir = temp_path("cli-list-empty");
    write_store(&store_dir, &sample_week());

    let output = run(&store_dir, &["list", "--day", "sunday", "--json"]);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed, serde_json::json!([]));
}

#[test]
fn malformed_store_falls_back_to_empty_week() {
    let store_dir = temp_path("cli-list-malformed");
    write_store(&store_dir, "not json");

    let output = run(&store_dir, &["week", "--json"]);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let week: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let days = week["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert!(days.iter().all(|day| day["total"] == 0));
    assert_eq!(week["week_progress"], 100.0);
}

#[test]
fn week_table_shows_all_days() {
    let store_dir = temp_path("cli-week");
    write_store(&store_dir, &sample_week());

    let output = run(&store_dir, &["week"]);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for short in ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"] {
        assert!(stdout.contains(short), "missing {short}");
    }
    assert!(stdout.contains("1/3"));
    assert!(stdout.contains("Week progress:"));
}

#[test]
fn unknown_day_is_rejected() {
    let store_dir = temp_path("cli-list-bad-day");
    let output = run(&store_dir, &["list", "--day", "someday"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
