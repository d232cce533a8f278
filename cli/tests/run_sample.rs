//! End-to-end driver tests: exit codes and dump output.

use assert_cmd::Command;

fn write_program(dir: &tempfile::TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).unwrap();
    path
}

#[test]
fn compiles_a_file_and_dumps_ir() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_program(&dir, "prog.sy", "int main() { return 0; }");
    let assert = Command::cargo_bin("syc")
        .unwrap()
        .arg(&path)
        .args(["--dump", "ir"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("define i32 @main()"));
    assert!(stdout.contains("ret i32 0"));
}

#[test]
fn reads_from_standard_input() {
    Command::cargo_bin("syc")
        .unwrap()
        .write_stdin("int main() { return 0; }")
        .assert()
        .success();
}

#[test]
fn redeclaration_fails_with_the_annotated_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_program(
        &dir,
        "redecl.sy",
        "int main() {\n    int x = 1;\n    int x = 2;\n    return 0;\n}",
    );
    let assert = Command::cargo_bin("syc").unwrap().arg(&path).assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Error at line 3: Redeclaration of symbol 'x'"));
}

#[test]
fn syntax_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_program(&dir, "broken.sy", "int main( { return 0; }");
    Command::cargo_bin("syc").unwrap().arg(&path).assert().failure();
}

#[test]
fn missing_files_exit_nonzero() {
    Command::cargo_bin("syc").unwrap().arg("no-such-file.sy").assert().failure();
}

#[test]
fn writes_ir_to_an_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_program(&dir, "prog.sy", "int main() { return 3; }");
    let out = dir.path().join("prog.ir");
    Command::cargo_bin("syc")
        .unwrap()
        .arg(&path)
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("ret i32 3"));
}

#[test]
fn dumps_symbols_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_program(&dir, "prog.sy", "int answer = 42; int main() { return answer; }");
    let assert = Command::cargo_bin("syc")
        .unwrap()
        .arg(&path)
        .args(["--dump", "symbols", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("\"answer\""));
}
