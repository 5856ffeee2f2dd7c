use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

// Helper function to get the path to the compiled binary
fn tlapse_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tlapse").expect("Failed to find tlapse binary");
    cmd.env_remove("TLAPSE_CONFIG").env("NO_COLOR", "1");
    cmd
}

/// Writes a settings document rooted in `root` and returns its path.
fn write_config(root: &Path, encoder: &Path, save_metadata: bool) -> PathBuf {
    let document = format!(
        r#"image_input:
  folder: "{root}/images"
  folder_structure: "%Y/%m/%d"
  extension: .jpg
video_output:
  folder: "{root}/videos"
  folder_structure: "%Y/%m"
  video_filter: "scale=1280:720"
  codec: libx264
  crf: 23
  preset: veryfast
  min_bitrate: 1M
  max_bitrate: 4M
  buffer_size: 8M
  video_size: 1280x720
filename:
  prefix: "cam_"
  extension: .mp4
  append_metadata: false
metadata:
  save_to_file: {save_metadata}
log:
  folder: "{root}/logs"
  filename: tlapse.log
  level: debug
encoder:
  binary: "{encoder}"
  manifest: "{root}/ffmpeg_images.txt"
"#,
        root = root.display(),
        encoder = encoder.display(),
    );
    let path = root.join("config.yaml");
    fs::write(&path, document).expect("write config");
    path
}

fn add_images(root: &Path, count: usize) {
    let folder = root.join("images/2024/06/15");
    fs::create_dir_all(&folder).expect("create image folder");
    for i in 0..count {
        fs::write(folder.join(format!("img_{i:03}.jpg")), b"jpeg").expect("write image");
    }
}

fn log_contents(root: &TempDir) -> String {
    fs::read_to_string(root.path().join("logs/tlapse.log")).unwrap_or_default()
}

#[test]
fn test_missing_config_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    tlapse_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(dir.path().join("nope.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to load settings"));
    Ok(())
}

#[test]
fn test_invalid_config_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("config.yaml");
    fs::write(&config, "image_input:\n  folder: /tmp\n")?;

    tlapse_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(1);
    Ok(())
}

#[test]
fn test_invalid_date_is_rejected() {
    tlapse_cmd()
        .args(["--date", "June 15th"])
        .assert()
        .failure()
        .stderr(contains("YYYY-MM-DD"));
}

#[test]
fn test_zero_test_amount_is_rejected() {
    tlapse_cmd().args(["--test-amount", "0"]).assert().failure();
}

#[test]
fn test_no_images_exits_cleanly() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = write_config(dir.path(), Path::new("/nonexistent/ffmpeg"), true);

    tlapse_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--date", "2024-06-15", "--no-progress"])
        .assert()
        .success();

    let log = log_contents(&dir);
    assert!(log.contains("No images found for the selected date: 2024-06-15"));
    assert!(log.contains(" - ERROR - "));
    assert!(!log.contains('\u{1b}'));
    assert!(!dir.path().join("ffmpeg_images.txt").exists());
    Ok(())
}

#[test]
fn test_missing_encoder_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    add_images(dir.path(), 3);
    let config = write_config(dir.path(), Path::new("/nonexistent/ffmpeg"), true);

    tlapse_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--date", "2024-06-15", "--no-progress"])
        .assert()
        .failure()
        .code(1);

    let log = log_contents(&dir);
    assert!(log.contains("Failed to start encoder '/nonexistent/ffmpeg'"));
    // The manifest was written before the launch attempt
    assert_eq!(
        fs::read_to_string(dir.path().join("ffmpeg_images.txt"))?.lines().count(),
        3
    );
    Ok(())
}

#[cfg(unix)]
fn write_fake_encoder(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake encoder");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake encoder");
    path
}

#[cfg(unix)]
#[test]
fn test_end_to_end_with_fake_encoder() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    add_images(dir.path(), 4);
    // Writes progress to stdout and the output file named by the last argument
    let encoder = write_fake_encoder(
        dir.path(),
        "for last; do :; done\n\
         printf 'frame=1\\nframe=2\\nframe=4\\nprogress=end\\n'\n\
         printf 'video' > \"$last\"",
    );
    let config = write_config(dir.path(), &encoder, true);

    tlapse_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--date", "2024-06-15", "--test-amount", "2", "--no-progress"])
        .assert()
        .success();

    let video = dir.path().join("videos/2024/06/cam_2024_06_15.mp4");
    assert_eq!(fs::read(&video)?, b"video");

    let sidecar: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(video.with_extension("json"))?)?;
    assert_eq!(sidecar["number_of_images"], 2);
    assert_eq!(sidecar["test_amount"], 2);
    assert_eq!(sidecar["file_size_MB"], "0.00");

    let log = log_contents(&dir);
    assert!(log.contains("Timelapse created successfully"));
    assert!(log.contains("-progress pipe:1 -nostats"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_encoder_error_exit_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    add_images(dir.path(), 2);
    let encoder = write_fake_encoder(dir.path(), "echo 'Unknown encoder' >&2\nexit 1");
    let config = write_config(dir.path(), &encoder, true);

    tlapse_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--date", "2024-06-15", "--no-progress"])
        .assert()
        .failure()
        .code(1);

    let log = log_contents(&dir);
    assert!(log.contains("Encoder exited with exit code 1: Unknown encoder"));
    assert!(!dir.path().join("videos/2024/06/cam_2024_06_15.json").exists());
    Ok(())
}
