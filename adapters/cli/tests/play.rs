use std::process::Command;

fn bunny_hop(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bunny-hop"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch bunny-hop binary")
}

#[test]
fn play_reports_completed_run_as_json() {
    let output = bunny_hop(&["play", "--level", "0", "--json", "f", "f"]);
    assert!(output.status.success(), "play should succeed: {output:?}");

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds a JSON report");
    assert_eq!(report["state"], "Complete");
    assert_eq!(report["outcome"], "Complete");
    assert_eq!(report["slots_used"], 2);
    assert_eq!(report["dispatched"].as_array().map(Vec::len), Some(2));
}

#[test]
fn play_rejects_unknown_instruction() {
    let output = bunny_hop(&["play", "f", "jump"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown instruction `jump`"), "{stderr}");
}

#[test]
fn levels_lists_builtin_catalog() {
    let output = bunny_hop(&["levels"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 9);
    assert!(stdout.lines().next().is_some_and(|line| line.starts_with("0: 3 cells")));
}
