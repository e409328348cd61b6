use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn projmap(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_projmap"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn analyze_prints_map_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("demo");
    fs::create_dir_all(&project).unwrap();
    fs::write(
        project.join("m.py"),
        "def f():\n    pass\n\nclass C:\n    def g(self):\n        pass\n",
    )
    .unwrap();

    let output = projmap(&["analyze", path_arg(&project)], dir.path());
    assert!(
        output.status.success(),
        "projmap analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let map: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(map["project_name"], "demo");
    assert!(map["analysis_timestamp"].as_str().unwrap().ends_with('Z'));

    let key = fs::canonicalize(&project).unwrap().join("m.py");
    assert_eq!(
        map["files"][key.to_str().unwrap()],
        serde_json::json!({
            "imports": [],
            "classes": [{"name": "C", "methods": ["g"]}],
            "functions": ["f"]
        })
    );
}

#[test]
fn analyze_writes_output_file_and_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("proj");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("ok.py"), "import a\nimport b\n").unwrap();
    fs::write(project.join("broken.py"), "def invalid_syntax(").unwrap();
    let out = dir.path().join("map.json");

    let output = projmap(
        &["analyze", path_arg(&project), "--output", path_arg(&out)],
        dir.path(),
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "map must not go to stdout");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.py"), "summary should name the failed file: {stderr}");
    assert!(stderr.contains("1 failed to parse"), "summary: {stderr}");

    let map: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let files = map["files"].as_object().unwrap();
    assert_eq!(files.len(), 1);
    let (_, entities) = files.iter().next().unwrap();
    assert_eq!(entities["imports"], serde_json::json!(["a", "b"]));
}

#[test]
fn missing_directory_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("map.json");
    let missing = dir.path().join("does-not-exist");

    let output = projmap(
        &["analyze", path_arg(&missing), "--output", path_arg(&out)],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("path not found"));
}

#[test]
fn file_root_is_not_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("single.py");
    fs::write(&file, "x = 1\n").unwrap();

    let output = projmap(&["analyze", path_arg(&file)], dir.path());
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn empty_directory_is_no_parsable_files() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("empty");
    fs::create_dir_all(&project).unwrap();

    let output = projmap(&["analyze", path_arg(&project)], dir.path());
    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty());
}

#[test]
fn unwritable_output_is_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("proj");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("m.py"), "x = 1\n").unwrap();
    let out = dir.path().join("no-such-dir").join("map.json");

    let output = projmap(
        &["analyze", path_arg(&project), "--output", path_arg(&out)],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn config_file_in_working_directory_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("proj");
    fs::create_dir_all(project.join("generated")).unwrap();
    fs::write(project.join("m.py"), "def keep(): pass\n").unwrap();
    fs::write(project.join("generated/gen.py"), "def skip(): pass\n").unwrap();
    fs::write(
        dir.path().join(".projmap.toml"),
        "[scan]\nexclude_dirs = [\"generated\"]\njobs = 1\n",
    )
    .unwrap();

    let output = projmap(&["analyze", path_arg(&project)], dir.path());
    assert!(output.status.success());
    let map: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(map["files"].as_object().unwrap().len(), 1);
}

#[test]
fn invalid_config_fails_before_scanning() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[scan]\nlanguage = \"cobol\"\n").unwrap();

    let output = projmap(
        &["--config", path_arg(&config), "analyze", path_arg(dir.path())],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(1));
}
