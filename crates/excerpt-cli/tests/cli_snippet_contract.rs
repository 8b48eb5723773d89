use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const DOC: &str = "The committee met on Tuesday to discuss the budget.\n\n\
                   After a long debate they decided to bite the bullet and raise fees.\n\n\
                   Weather was mild & nobody complained about <the> weather.\n";

fn excerpt() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("excerpt"));
    // Keep contracts hermetic: no env-file or env knobs from the caller.
    for k in [
        "EXCERPT_ENV_FILE",
        "EXCERPT_MAX_LENGTH",
        "EXCERPT_MAX_KEYWORDS",
        "EXCERPT_HIGHLIGHT_START",
        "EXCERPT_HIGHLIGHT_END",
    ] {
        cmd.env_remove(k);
    }
    cmd
}

fn doc_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(DOC.as_bytes()).expect("write doc");
    f
}

#[test]
fn snippet_json_contract() {
    let f = doc_file();
    let out = excerpt()
        .args(["snippet", "-k", "BULLET", "-k", "Bite", "-k", "zebra", "--input"])
        .arg(f.path())
        .output()
        .expect("run excerpt snippet");
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse snippet json");
    assert_eq!(v["kind"].as_str(), Some("snippet"));
    assert_eq!(v["max_length"].as_u64(), Some(80));
    let snippet = v["snippet"].as_str().expect("snippet text");
    assert!(snippet.contains("bite the bullet"), "got {snippet:?}");
    assert_eq!(v["uncovered"], serde_json::json!(["zebra"]));
    assert_eq!(v["segments"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(v["highlights"].as_array().map(|a| a.len()), Some(2));
}

#[test]
fn snippet_text_output_from_stdin() {
    excerpt()
        .args(["snippet", "-k", "budget", "--output", "text"])
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::contains("budget"))
        .stdout(predicate::str::contains("bullet").not());
}

#[test]
fn no_match_prints_null_snippet() {
    let out = excerpt()
        .args(["snippet", "-k", "giraffe"])
        .write_stdin(DOC)
        .output()
        .expect("run excerpt snippet");
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert!(v["snippet"].is_null());

    excerpt()
        .args(["snippet", "-k", "giraffe", "--output", "text"])
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn markup_escapes_text_and_uses_custom_delimiters() {
    excerpt()
        .args([
            "markup", "-k", "weather", "--start", "[[", "--end", "]]", "--output", "text",
            "--max-length", "200",
        ])
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::contains("[[Weather]] was mild &amp; nobody"))
        .stdout(predicate::str::contains("&lt;the&gt; [[weather]]."));
}

#[test]
fn markup_without_escaping_keeps_raw_text() {
    excerpt()
        .args([
            "markup", "-k", "weather", "--escape", "none", "--output", "text",
            "--max-length", "200",
        ])
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::contains("mild & nobody complained about <the> <b>weather</b>."));
}

#[test]
fn markup_delimiters_come_from_env() {
    excerpt()
        .args(["markup", "-k", "budget", "--output", "text"])
        .env("EXCERPT_HIGHLIGHT_START", "<mark>")
        .env("EXCERPT_HIGHLIGHT_END", "</mark>")
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::contains("<mark>budget</mark>"));
}

#[test]
fn unknown_escape_mode_fails() {
    excerpt()
        .args(["markup", "-k", "budget", "--escape", "latex"])
        .write_stdin(DOC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown --escape value"));
}

#[test]
fn missing_input_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    excerpt()
        .args(["snippet", "-k", "budget", "--input"])
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input"));
}

#[test]
fn oversized_keyword_cap_is_rejected() {
    excerpt()
        .args(["snippet", "-k", "budget", "--max-keywords", "64"])
        .write_stdin(DOC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
