//! End-to-end tests running the `eprename` binary against temporary directories.

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use tempfile::TempDir;

#[allow(deprecated)]
fn eprename() -> Command {
    let mut cmd = Command::cargo_bin("eprename").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn create_files(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), name).unwrap();
    }
}

/// Sorted file names and contents, without following links.
fn snapshot(dir: &Path) -> Vec<(String, bool, Vec<u8>)> {
    let mut entries: Vec<(String, bool, Vec<u8>)> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let is_symlink = fs::symlink_metadata(&path).unwrap().file_type().is_symlink();
            let content = if is_symlink {
                fs::read_link(&path).unwrap().to_string_lossy().into_owned().into_bytes()
            } else {
                fs::read(&path).unwrap()
            };
            (path.file_name().unwrap().to_string_lossy().into_owned(), is_symlink, content)
        })
        .collect();
    entries.sort();
    entries
}

#[test]
fn title_is_required() {
    eprename().assert().failure().code(2);
}

#[cfg(unix)]
#[test]
fn creates_symlinks_with_canonical_names() {
    let dir = TempDir::new().unwrap();
    create_files(
        dir.path(),
        &[
            "fullmetal_alchemist_brotherhood_-_01_[1080p_bd-rip].mkv",
            "fullmetal_alchemist_brotherhood_-_02_[1080p_bd-rip].mkv",
        ],
    );

    let output = eprename()
        .arg(dir.path())
        .args(["-t", "Fullmetal Alchemist Brotherhood"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Created 2 symbolic links"));

    let link = dir.path().join("Fullmetal Alchemist Brotherhood 01.mkv");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    let target = fs::read_link(&link).unwrap();
    assert!(target.is_absolute());
    assert_eq!(
        fs::read_to_string(&link).unwrap(),
        "fullmetal_alchemist_brotherhood_-_01_[1080p_bd-rip].mkv"
    );
    assert!(dir.path().join("Fullmetal Alchemist Brotherhood 02.mkv").exists());
}

#[test]
fn dry_run_leaves_directory_untouched() {
    let dir = TempDir::new().unwrap();
    create_files(dir.path(), &["[Sub] show - 01 [720p].mkv", "[Sub] show - 02 [720p].mkv"]);
    let before = snapshot(dir.path());

    let output = eprename()
        .arg(dir.path())
        .args(["-t", "Show", "--dry", "-v"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Dryrun: would have created 2 symbolic links"));

    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn collisions_fail_without_creating_anything() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    create_files(
        dir.path(),
        &["[GroupA] Show - 01.mkv", "[GroupB] Show - 01.mkv", "[GroupA] Show - 02.mkv"],
    );
    let before = snapshot(dir.path());

    let output = eprename()
        .arg(dir.path())
        .args(["-t", "Show", "-d"])
        .arg(out.path())
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Show 01.mkv"));
    assert!(stderr.contains("[GroupA] Show - 01.mkv"));
    assert!(stderr.contains("[GroupB] Show - 01.mkv"));
    assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    assert_eq!(snapshot(dir.path()), before);
}

#[cfg(unix)]
#[test]
fn newest_policy_links_most_recent_source() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    create_files(dir.path(), &["[Old] Show - 01.mkv", "[New] Show - 01.mkv"]);

    let now = SystemTime::now();
    File::options()
        .write(true)
        .open(dir.path().join("[Old] Show - 01.mkv"))
        .unwrap()
        .set_modified(now - Duration::from_secs(3600))
        .unwrap();
    File::options()
        .write(true)
        .open(dir.path().join("[New] Show - 01.mkv"))
        .unwrap()
        .set_modified(now)
        .unwrap();

    eprename()
        .arg(dir.path())
        .args(["-t", "Show", "--resolve-overlaps", "newest", "-d"])
        .arg(out.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out.path().join("Show 01.mkv")).unwrap(),
        "[New] Show - 01.mkv"
    );
}

#[test]
fn copy_output_with_season_and_zero_pad() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    create_files(dir.path(), &["show 1.mkv", "show 2.mkv", "show 10.mkv"]);

    eprename()
        .arg(dir.path())
        .args(["-t", "Show", "-s", "2", "--zero-pad=2", "-o", "copy", "-d"])
        .arg(out.path())
        .assert()
        .success();

    let names: Vec<String> = snapshot(out.path()).into_iter().map(|(name, _, _)| name).collect();
    assert_eq!(names, vec!["Show s2e01.mkv", "Show s2e02.mkv", "Show s2e10.mkv"]);
    assert_eq!(fs::read_to_string(out.path().join("Show s2e10.mkv")).unwrap(), "show 10.mkv");
}

#[test]
fn existing_destination_requires_overwrite() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    create_files(dir.path(), &["show 01.mkv"]);
    fs::write(out.path().join("Show 01.mkv"), "existing").unwrap();

    let output = eprename()
        .arg(dir.path())
        .args(["-t", "Show", "-o", "copy", "-d"])
        .arg(out.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--overwrite"));
    assert_eq!(fs::read_to_string(out.path().join("Show 01.mkv")).unwrap(), "existing");

    eprename()
        .arg(dir.path())
        .args(["-t", "Show", "-o", "copy", "--overwrite", "-d"])
        .arg(out.path())
        .assert()
        .success();
    assert_eq!(fs::read_to_string(out.path().join("Show 01.mkv")).unwrap(), "show 01.mkv");
}

#[cfg(unix)]
#[test]
fn relative_destination_equal_to_input_keeps_sources_on_overwrite() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Show 01.mkv"), "original").unwrap();
    fs::write(dir.path().join("x 02.mkv"), "second").unwrap();

    let output = eprename()
        .current_dir(dir.path())
        .args(["-t", "Show", "-d", ".", "--overwrite", "-v"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already named"));

    let source = dir.path().join("Show 01.mkv");
    assert!(!fs::symlink_metadata(&source).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&source).unwrap(), "original");
    assert_eq!(fs::read_to_string(dir.path().join("Show 02.mkv")).unwrap(), "second");
}

#[test]
fn zero_pad_before_path_keeps_path_positional() {
    let dir = TempDir::new().unwrap();
    create_files(dir.path(), &["show 1.mkv"]);

    let output = eprename()
        .args(["-t", "Show", "--dry", "--zero-pad"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn conflicting_options_exit_with_usage_error() {
    let dir = TempDir::new().unwrap();
    create_files(dir.path(), &["show 01.mkv"]);

    for args in [
        vec!["--renumber", "--strip-leading-zeros"],
        vec!["--zero-pad", "--strip-leading-zeros"],
        vec!["-s", "1", "--strip-season"],
        vec!["--renumber-start", "5"],
        vec!["--skip", "1"],
        vec!["-i", "%a.%f"],
    ] {
        let output = eprename()
            .arg(dir.path())
            .args(["-t", "Show"])
            .args(&args)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2), "args: {args:?}");
    }
    assert_eq!(snapshot(dir.path()).len(), 1);
}
