//! CLI behavior of the `ctc` binary.
//!
//! The compdb tests use a shell script as a stand-in compiler so they do not
//! depend on a toolchain being installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn ctc_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ctc"))
}

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".tmp_test_projects")
        .join("cli")
        .join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("Failed to create test directory");
    dir
}

fn run_ctc(dir: &Path, args: &[&str]) -> Output {
    Command::new(ctc_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run ctc")
}

fn output_text(output: &Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn parse_prints_json_for_single_string_command() {
    let dir = test_dir("parse_json");
    let output = run_ctc(&dir, &["parse", "--json", "cc -DX -c a.c -o a.o"]);
    let text = output_text(&output);
    assert!(output.status.success(), "parse failed:\n{}", text);

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(json["compiler"], "cc");
    assert_eq!(json["input_path"], "a.c");
    assert_eq!(json["output_path"], "a.o");
    assert_eq!(json["arguments"], serde_json::json!(["-DX"]));
    assert_eq!(json["dialect"], "Gnu");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn parse_accepts_split_words_after_double_dash() {
    let dir = test_dir("parse_words");
    let output = run_ctc(
        &dir,
        &["parse", "--json", "--", "clang-cl", "/EHsc", "-c", "a.cpp", "/Foa.obj"],
    );
    let text = output_text(&output);
    assert!(output.status.success(), "parse failed:\n{}", text);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["output_path"], "a.obj");
    assert_eq!(json["dialect"], "Msvc");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn parse_missing_path_fails() {
    let dir = test_dir("parse_missing");
    let output = run_ctc(&dir, &["parse", "cc -DX foo.c"]);
    let text = output_text(&output);
    assert!(!output.status.success(), "parse should fail:\n{}", text);
    assert!(text.contains("unable to determine"), "{}", text);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn hash_missing_compiler_gives_hint() {
    let dir = test_dir("hash_missing_compiler");
    let output = run_ctc(&dir, &["hash", "ctc-no-such-compiler -c a.c -o a.o"]);
    let text = output_text(&output);
    assert!(!output.status.success());
    assert!(text.contains("was not found"), "{}", text);

    fs::remove_dir_all(&dir).ok();
}

#[cfg(unix)]
fn write_fake_compiler(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    // Copies the last argument to the file after -o; fails on "bad.c"
    let script = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
  src="$arg"
done
if [ "$src" = "bad.c" ]; then
  echo "bad.c:1:10: fatal error: nope.h: No such file or directory" >&2
  exit 1
fi
cat "$src" > "$out"
"#;
    let path = dir.join("fakecc");
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn hash_prints_stable_fingerprint() {
    let dir = test_dir("hash_stable");
    let cc = write_fake_compiler(&dir);
    fs::write(dir.join("a.c"), "int a;\n").unwrap();
    let command = format!("{} -c a.c -o a.o", cc.display());

    let first = run_ctc(&dir, &["hash", &command]);
    let second = run_ctc(&dir, &["hash", &command]);
    assert!(first.status.success(), "{}", output_text(&first));
    assert_eq!(first.stdout, second.stdout);

    let hex = String::from_utf8_lossy(&first.stdout).trim().to_string();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));

    fs::remove_dir_all(&dir).ok();
}

#[cfg(unix)]
#[test]
fn compdb_continues_past_failures() {
    let dir = test_dir("compdb_failures");
    let cc = write_fake_compiler(&dir);
    fs::write(dir.join("a.c"), "int a;\n").unwrap();
    fs::write(dir.join("bad.c"), "#include <nope.h>\n").unwrap();
    fs::write(dir.join("b.c"), "int b;\n").unwrap();

    let db = serde_json::json!([
        {"directory": ".", "file": "a.c", "command": format!("{} -c a.c -o a.o", cc.display())},
        {"directory": ".", "file": "bad.c", "arguments": [cc.display().to_string(), "-c", "bad.c", "-o", "bad.o"]},
        {"directory": ".", "file": "b.c", "command": format!("{} -c b.c -o b.o", cc.display())}
    ]);
    fs::write(
        dir.join("compile_commands.json"),
        serde_json::to_string_pretty(&db).unwrap(),
    )
    .unwrap();

    let output = run_ctc(&dir, &["compdb", "--jobs", "2"]);
    let text = output_text(&output);
    assert!(!output.status.success(), "one entry failed:\n{}", text);
    assert!(text.contains("2 fingerprinted, 1 failed"), "{}", text);
    assert!(text.contains("nope.h"), "{}", text);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn compdb_rejects_zero_jobs() {
    let dir = test_dir("compdb_zero_jobs");
    fs::write(dir.join("compile_commands.json"), "[]").unwrap();

    let output = run_ctc(&dir, &["compdb", "--jobs", "0"]);
    let text = output_text(&output);
    assert!(!output.status.success(), "--jobs 0 should be rejected:\n{}", text);
    assert!(text.contains("--jobs"), "{}", text);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn compdb_reads_config_next_to_database() {
    let dir = test_dir("compdb_local_config");
    let build = dir.join("build");
    fs::create_dir_all(&build).unwrap();
    fs::write(
        build.join("compile_commands.json"),
        r#"[{"directory": ".", "file": "a.c", "command": "cc -c a.c -o a.o"}]"#,
    )
    .unwrap();
    fs::write(build.join("ctc.toml"), "[fingerprint]\njobs = 0\n").unwrap();

    let output = run_ctc(&dir, &["compdb", "build/compile_commands.json"]);
    let text = output_text(&output);
    assert!(!output.status.success(), "invalid config should fail:\n{}", text);
    assert!(text.contains("'jobs' must be at least 1"), "{}", text);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn completion_generates_script() {
    let dir = test_dir("completion");
    let output = run_ctc(&dir, &["completion", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ctc"));

    fs::remove_dir_all(&dir).ok();
}
