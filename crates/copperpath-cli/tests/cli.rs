use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;

const BOARD: &str = r#"{
  "pads": [
    { "id": 1, "position": { "x": 0, "y": 0 }, "width": 20, "height": 20, "net": 1 },
    { "id": 2, "position": { "x": 300, "y": 0 }, "width": 20, "height": 20, "net": 1 }
  ],
  "tracks": [
    {
      "id": 1,
      "start": { "x": 0, "y": 0 },
      "end": { "x": 300, "y": 0 },
      "layer": 0,
      "width": 10,
      "net": 1
    }
  ]
}"#;

const RULES: &str = r#"
current_track_width = 10
grid_size = 20

[policies]
auto_45_corners = false

[net_classes.default]
clearance = 5
"#;

const REROUTE: &str = r#"[
  { "event": "click", "x": 0, "y": 0 },
  { "event": "motion", "x": 0, "y": 60 },
  { "event": "click", "x": 0, "y": 100 },
  { "event": "click", "x": 300, "y": 100 },
  { "event": "end", "x": 300, "y": 0 }
]"#;

fn copperpath() -> Command {
    Command::cargo_bin("copperpath").unwrap()
}

#[test]
fn route_replaces_the_old_track() {
    let temp = TempDir::new().unwrap();
    temp.child("board.json").write_str(BOARD).unwrap();
    temp.child("rules.toml").write_str(RULES).unwrap();
    temp.child("events.json").write_str(REROUTE).unwrap();

    let output = temp.child("routed.json");
    copperpath()
        .current_dir(temp.path())
        .args([
            "route",
            "board.json",
            "--events",
            "events.json",
            "--rules",
            "rules.toml",
            "--output",
            "routed.json",
        ])
        .assert()
        .success();

    let routed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output.path()).unwrap()).unwrap();
    let ids: Vec<u64> = routed["tracks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3, 4]);
    assert_eq!(routed["tracks"][2]["end_anchor"], serde_json::json!({ "Pad": 2 }));
}

#[test]
fn rejected_events_fail_in_strict_mode() {
    let temp = TempDir::new().unwrap();
    temp.child("board.json").write_str(
        r#"{ "tracks": [ { "id": 1, "start": { "x": 50, "y": -100 }, "end": { "x": 50, "y": 100 },
             "layer": 0, "width": 10, "net": 2 } ] }"#,
    )
    .unwrap();
    temp.child("rules.toml").write_str(RULES).unwrap();
    temp.child("events.json").write_str(
        r#"[ { "event": "click", "x": 0, "y": 0 }, { "event": "end", "x": 100, "y": 0 } ]"#,
    )
    .unwrap();

    let args = [
        "route",
        "board.json",
        "-e",
        "events.json",
        "-r",
        "rules.toml",
    ];

    // Without --strict the rejected end is reported and the route discarded.
    let assert = copperpath()
        .current_dir(temp.path())
        .args(args)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let board: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(board["tracks"].as_array().map(Vec::len), Some(1));

    let assert = copperpath()
        .current_dir(temp.path())
        .args(args)
        .arg("--strict")
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Event 1"), "{stderr}");
}

#[test]
fn missing_board_is_reported() {
    let temp = TempDir::new().unwrap();
    temp.child("events.json").write_str("[]").unwrap();

    let assert = copperpath()
        .current_dir(temp.path())
        .args(["route", "nope.json", "--events", "events.json"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Failed to read board nope.json"), "{stderr}");
}

#[test]
fn snap_prints_the_constrained_endpoint() {
    let assert = copperpath()
        .args(["snap", "--from", "100,100", "--to", "110,0"])
        .assert()
        .success();
    assert_eq!(
        String::from_utf8_lossy(&assert.get_output().stdout),
        "100,0 90°\n"
    );

    let assert = copperpath()
        .args(["snap", "--from", "0,0", "--to", "-50,-40"])
        .assert()
        .success();
    assert_eq!(
        String::from_utf8_lossy(&assert.get_output().stdout),
        "-40,-40 45°\n"
    );
}
