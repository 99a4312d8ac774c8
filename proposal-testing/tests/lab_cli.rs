use std::process::Command;

use serde_json::Value;

use proposal_testing::spec;

fn run_lab_with_stderr(args: &[&str]) -> (Value, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_proposal-lab"))
        .args(args)
        .output()
        .expect("run proposal-lab");
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    assert!(output.status.success(), "proposal-lab failed: {stderr}");
    let stdout = serde_json::from_slice(&output.stdout).expect("proposal-lab prints JSON");
    (stdout, stderr)
}

fn run_lab(args: &[&str]) -> Value {
    run_lab_with_stderr(args).0
}

fn product_path(name: &str) -> String {
    spec::product_path_for_name(name).display().to_string()
}

#[test]
fn templates_lists_product_volumes() {
    let templates = run_lab(&["templates", "--config", &product_path("server")]);
    let paths: Vec<&str> = templates
        .as_array()
        .expect("template list")
        .iter()
        .filter_map(|volume| volume["mount"]["path"].as_str())
        .collect();
    assert_eq!(paths, vec!["/", "/var", "swap"]);
}

#[test]
fn propose_prints_settings_and_actions() {
    let dir = std::env::temp_dir().join(format!("proposal-lab-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let settings = dir.join("settings.json");
    std::fs::write(&settings, r#"{"target": "disk"}"#).expect("write settings");

    let (output, stderr) = run_lab_with_stderr(&[
        "propose",
        "--config",
        &product_path("desktop"),
        "--settings",
        &settings.display().to_string(),
        "--spec",
        "one-empty-disk",
    ]);

    assert_eq!(output["success"], Value::Bool(true));
    assert_eq!(output["settings"]["target"], serde_json::json!({"disk": "/dev/vda"}));
    assert!(!output["actions"].as_array().expect("actions").is_empty());
    assert!(
        stderr.contains("swap: 8.00 GiB (8,589,934,592 bytes) to 8.00 GiB (8,589,934,592 bytes)"),
        "volume sizes missing from: {stderr}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
