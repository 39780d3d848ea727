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

fn write_store(store_dir: &Path, content: serde_json::Value) {
    std::fs::create_dir_all(store_dir).unwrap();
    std::fs::write(
        store_dir.join("week-planner-todos.json"),
        serde_json::to_string_pretty(&content).unwrap(),
    )
    .unwrap();
}

fn read_store(store_dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(store_dir.join("week-planner-todos.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn run(store_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_weekplan"))
        .args(args)
        .env("WEEKPLAN_STORE_DIR", store_dir)
        .env("WEEKPLAN_CONFIG_PATH", store_dir.join("config.json"))
        .output()
        .expect("failed to run weekplan")
}

fn seed(store_dir: &Path) {
    write_store(
        store_dir,
        serde_json::json!({
            "wednesday": [
                {"id": "w-1", "text": "draft report", "completed": false,
                 "createdAt": "2025-12-20T08:00:00Z", "priority": "high"},
                {"id": "w-2", "text": "water plants", "completed": true,
                 "createdAt": "2025-12-20T09:00:00Z", "priority": "low"},
                {"id": "w-3", "text": "gym", "completed": false,
                 "createdAt": "2025-12-20T10:00:00Z", "priority": "medium"}
            ],
            "friday": [
                {"id": "f-1", "text": "groceries", "completed": true,
                 "createdAt": "2025-12-20T11:00:00Z", "priority": "medium"}
            ]
        }),
    );
}

#[test]
fn edit_replaces_text_and_keeps_identity() {
    let store_dir = temp_path("cli-edit");
    seed(&store_dir);

    let output = run(&store_dir, &["edit", "w-1", "  final report "]);
    let stored = read_store(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let task = &stored["wednesday"][0];
    assert_eq!(task["id"], "w-1");
    assert_eq!(task["text"], "final report");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["createdAt"], "2025-12-20T08:00:00Z");
}

#[test]
fn edit_rejects_blank_text() {
    let store_dir = temp_path("cli-edit-blank");
    seed(&store_dir);

    let output = run(&store_dir, &["edit", "w-1", "   "]);
    let stored = read_store(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));
    assert_eq!(stored["wednesday"][0]["text"], "draft report");
}

#[test]
fn edit_with_wrong_day_reports_missing_task() {
    let store_dir = temp_path("cli-edit-wrong-day");
    seed(&store_dir);

    let output = run(&store_dir, &["edit", "w-1", "moved", "--day", "friday"]);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
}

#[test]
fn priority_command_updates_level() {
    let store_dir = temp_path("cli-priority");
    seed(&store_dir);

    let output = run(&store_dir, &["priority", "w-3", "high", "--json"]);
    let stored = read_store(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert_eq!(stored["wednesday"][2]["priority"], "high");
}

#[test]
fn toggle_flips_completion_both_ways() {
    let store_dir = temp_path("cli-toggle");
    seed(&store_dir);

    let first = run(&store_dir, &["toggle", "w-3"]);
    let after_first = read_store(&store_dir);
    let second = run(&store_dir, &["toggle", "w-3"]);
    let after_second = read_store(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("Completed task: gym"));
    assert_eq!(after_first["wednesday"][2]["completed"], true);
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("Reopened task: gym"));
    assert_eq!(after_second["wednesday"][2]["completed"], false);
}

#[test]
fn delete_removes_task() {
    let store_dir = temp_path("cli-delete");
    seed(&store_dir);

    let output = run(&store_dir, &["delete", "w-2"]);
    let stored = read_store(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let ids: Vec<_> = stored["wednesday"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["w-1", "w-3"]);
}

#[test]
fn delete_unknown_id_is_reported() {
    let store_dir = temp_path("cli-delete-missing");
    seed(&store_dir);

    let output = run(&store_dir, &["delete", "nope"]);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("task not found"));
}

#[test]
fn clear_completed_keeps_pending_in_order() {
    let store_dir = temp_path("cli-clear-completed");
    seed(&store_dir);

    let output = run(&store_dir, &["clear-completed", "--day", "wednesday"]);
    let stored = read_store(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Cleared 1 task(s) from Wednesday"));
    let wednesday = stored["wednesday"].as_array().unwrap();
    assert_eq!(wednesday.len(), 2);
    assert_eq!(wednesday[0]["id"], "w-1");
    assert_eq!(wednesday[1]["id"], "w-3");
    assert_eq!(stored["friday"][0]["id"], "f-1");
}

#[test]
fn clear_empties_only_selected_day() {
    let store_dir = temp_path("cli-clear");
    seed(&store_dir);

    let output = run(&store_dir, &["clear", "--day", "friday"]);
    let stored = read_store(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert_eq!(stored["friday"], serde_json::json!([]));
    assert_eq!(stored["wednesday"].as_array().unwrap().len(), 3);
}
