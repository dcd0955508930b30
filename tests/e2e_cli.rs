//! CLI end-to-end tests
//!
//! Tests for the audex command-line interface. Runs that need the media
//! toolchain use small shell scripts standing in for ffmpeg and ffprobe.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the audex binary
#[allow(deprecated)]
fn audex_cmd() -> Command {
    Command::cargo_bin("audex").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = audex_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = audex_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audex"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = audex_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("audex"));
}

#[test]
fn test_cli_run_help_lists_options() {
    let mut cmd = audex_cmd();
    cmd.args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--directory"))
        .stdout(predicate::str::contains("--no-resume"))
        .stdout(predicate::str::contains("--sequential"))
        .stdout(predicate::str::contains("--adaptive"))
        .stdout(predicate::str::contains("default unless the config disables it"));
}

#[test]
fn test_cli_adaptive_flags_conflict() {
    let dir = tempdir().unwrap();
    let mut cmd = audex_cmd();
    cmd.current_dir(dir.path())
        .args(["run", "--adaptive", "--no-adaptive"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--no-adaptive"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = audex_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").or(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_unsupported_format_is_usage_error() {
    let dir = tempdir().unwrap();
    let mut cmd = audex_cmd();
    cmd.current_dir(dir.path())
        .args(["run", "--format", "ogg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ogg"));
}

#[test]
fn test_cli_run_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = audex_cmd();
    cmd.current_dir(dir.path())
        .args(["run", "-d", "does-not-exist", "-o", "out"])
        .assert()
        .code(1);
    assert!(!dir.path().join("extraction_record_mp3.json").exists());
}

#[test]
fn test_cli_status_without_ledger() {
    let dir = tempdir().unwrap();
    let mut cmd = audex_cmd();
    cmd.current_dir(dir.path())
        .args(["status", "--format", "aac"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No ledger"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("audex.toml");
    fs::write(&config, "[extraction]\nformat = \"wav\"\njobs = 2\n").unwrap();

    let mut cmd = audex_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("wav"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("audex.toml");
    fs::write(&config, "[extraction]\nformat = \"ogg\"\n").unwrap();

    let mut cmd = audex_cmd();
    cmd.arg("validate").arg(&config).assert().failure();
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Lay out fake tools, a config pointing at them, and an input directory.
    fn setup(root: &Path, videos: &[&str]) {
        let bin = root.join("bin");
        fs::create_dir(&bin).unwrap();
        script(
            &bin,
            "ffprobe",
            r#"echo '{"streams": [{"codec_type": "audio", "bit_rate": "128000"}]}'"#,
        );
        // Fails for inputs named broken.*, otherwise writes to the last argument.
        script(
            &bin,
            "ffmpeg",
            "case \"$2\" in *broken*) echo 'Invalid data found' >&2; exit 1;; esac\n\
             for last; do :; done\nprintf 'audio' > \"$last\"",
        );

        fs::write(
            root.join("audex.toml"),
            format!(
                "[tools]\nffmpeg_path = \"{}\"\nffprobe_path = \"{}\"\n",
                bin.join("ffmpeg").display(),
                bin.join("ffprobe").display()
            ),
        )
        .unwrap();

        let input = root.join("original");
        fs::create_dir(&input).unwrap();
        for name in videos {
            fs::write(input.join(name), b"video").unwrap();
        }
    }

    fn run(root: &Path) -> assert_cmd::assert::Assert {
        audex_cmd()
            .current_dir(root)
            .args(["--config", "audex.toml", "run", "-j", "2"])
            .assert()
    }

    #[test]
    fn test_cli_run_extracts_and_resumes() {
        let dir = tempdir().unwrap();
        setup(dir.path(), &["talk.mkv", "demo.mp4"]);

        run(dir.path())
            .success()
            .stdout(predicate::str::contains("Batch complete"))
            .stdout(predicate::str::contains("Extracted this run:  2/2"));

        assert!(dir.path().join("extracted_audio/talk.mp3").exists());
        assert!(dir.path().join("extracted_audio/demo.mp3").exists());

        let ledger: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("extraction_record_mp3.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(ledger["talk.mkv"]["status"], "completed");
        // 192k target capped to the 128 kb/s source.
        assert_eq!(ledger["talk.mkv"]["quality"], "128k");

        run(dir.path())
            .success()
            .stdout(predicate::str::contains("Already processed:   2"))
            .stdout(predicate::str::contains("Extracted this run:  0/0"));
    }

    #[test]
    fn test_cli_failed_file_does_not_fail_run() {
        let dir = tempdir().unwrap();
        setup(dir.path(), &["good.mkv", "broken.mkv"]);

        run(dir.path())
            .success()
            .stdout(predicate::str::contains("Failed:              1"));

        let content = fs::read_to_string(dir.path().join("extraction_record_mp3.json")).unwrap();
        assert!(content.contains("good.mkv"));
        assert!(!content.contains("broken.mkv"));
    }

    #[test]
    fn test_cli_status_lists_records() {
        let dir = tempdir().unwrap();
        setup(dir.path(), &["talk.mkv"]);
        run(dir.path()).success();

        audex_cmd()
            .current_dir(dir.path())
            .args(["--config", "audex.toml", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Completed: 1 of 1"))
            .stdout(predicate::str::contains("talk.mkv"));
    }

    #[test]
    fn test_cli_probe_reports_resolved_quality() {
        let dir = tempdir().unwrap();
        setup(dir.path(), &["talk.mkv"]);

        audex_cmd()
            .current_dir(dir.path())
            .args(["--config", "audex.toml", "probe", "original/talk.mkv", "-q", "256k"])
            .assert()
            .success()
            .stdout(predicate::str::contains("128000"))
            .stdout(predicate::str::contains(": 128k"));
    }
}
