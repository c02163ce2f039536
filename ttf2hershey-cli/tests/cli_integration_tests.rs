//! Integration tests for the ttf2hershey CLI
//!
//! Runs the built binary against fonts written by `FontBuilder`.

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};
use ttf2hershey::builder::{table_range, FontBuilder, SimpleGlyphSpec};
use ttf2hershey::Tag;

/// Test helper to get the CLI binary path
fn get_cli_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    if path.ends_with("deps") {
        path.pop(); // Remove "deps" directory
    }
    path.push("ttf2hershey");
    #[cfg(windows)]
    path.set_extension("exe");
    path
}

fn setup_temp_dir() -> TempDir {
    tempdir().expect("Failed to create temp directory")
}

fn run_cli_command(args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new(get_cli_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

/// Writes a font with 'x' (box across the baseline) and 'v' (triangle)
fn write_test_font(dir: &Path) -> PathBuf {
    let data = FontBuilder::new()
        .empty()
        .simple(SimpleGlyphSpec::new().contour(&[
            (0, -128, true),
            (128, -128, true),
            (128, 128, true),
            (0, 128, true),
        ]))
        .simple(SimpleGlyphSpec::new().contour(&[
            (0, 128, true),
            (64, 0, true),
            (128, 128, true),
        ]))
        .map_char('x', 1)
        .map_char('v', 2)
        .build();
    let path = dir.join("test.ttf");
    fs::write(&path, data).expect("Failed to write font");
    path
}

#[test]
fn test_cli_help() {
    let output = run_cli_command(&["--help"]).expect("CLI command should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("encode"));
    assert!(stdout.contains("info"));
}

#[test]
fn test_cli_encode_chars_to_stdout() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());

    let output = run_cli_command(&["encode", font.to_str().unwrap(), "--chars", " v"])
        .expect("CLI command should run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Scale is 72/256: space is half of 'x' (-9..9), 'v' spans -18..18
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "   32  2I[\n  118 10@d@.RRd.@.\n");
}

#[test]
fn test_cli_encode_range_to_file() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());
    let output_path = temp_dir.path().join("out.jhf");

    let output = run_cli_command(&[
        "encode",
        font.to_str().unwrap(),
        "--range",
        "118-120",
        "-o",
        output_path.to_str().unwrap(),
    ])
    .expect("CLI command should run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Wrote"));

    let content = fs::read_to_string(&output_path).expect("Failed to read output");
    let codes: Vec<&str> = content.lines().map(|line| line[..5].trim()).collect();
    assert_eq!(codes, vec!["118", "119", "120"]);
    // 'w' is unmapped and falls back to the empty glyph 0
    assert_eq!(content.lines().nth(1), Some("  119  2RR"));
}

#[test]
fn test_cli_encode_default_range() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());

    let output =
        run_cli_command(&["encode", font.to_str().unwrap()]).expect("CLI command should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 96);
    assert!(stdout.starts_with("   32"));
}

#[test]
fn test_cli_encode_json() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());

    let output = run_cli_command(&[
        "encode",
        font.to_str().unwrap(),
        "--chars",
        "v",
        "--format",
        "json",
    ])
    .expect("CLI command should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value[0]["char"], "v");
    assert_eq!(value[0]["glyph"], 2);
    assert_eq!(value[0]["polylines"][0].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_encode_negative_kern() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());

    let output = run_cli_command(&["encode", font.to_str().unwrap(), "-c", "v", "--kern", "-2"])
        .expect("CLI command should run");
    assert!(output.status.success());
    // Scale 76/256 puts the bounds at -19/19, narrowed by 2
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("  118 10Ac"), "got {stdout}");
}

#[test]
fn test_cli_info() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());

    let output = run_cli_command(&["info", font.to_str().unwrap(), "--detailed"])
        .expect("CLI command should run");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Units per em: 1000"));
    assert!(stdout.contains("Glyphs: 3"));
    assert!(stdout.contains("Bounding box: (0, -128) - (128, 128)"));
    for tag in ["cmap", "glyf", "head", "loca", "maxp"] {
        assert!(stdout.contains(tag), "missing table {tag}");
    }
}

#[test]
fn test_cli_missing_file() {
    let temp_dir = setup_temp_dir();
    let missing = temp_dir.path().join("missing.ttf");

    let output = run_cli_command(&["encode", missing.to_str().unwrap()])
        .expect("CLI command should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load font"));
}

#[test]
fn test_cli_corrupted_font() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());
    let mut data = fs::read(&font).unwrap();
    let glyf = table_range(&data, Tag::GLYF).unwrap();
    data[glyf.start] ^= 0xFF;
    fs::write(&font, data).unwrap();

    let output = run_cli_command(&["info", font.to_str().unwrap()]).expect("CLI command should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Checksum mismatch"));
}

#[test]
fn test_cli_invalid_range() {
    let temp_dir = setup_temp_dir();
    let font = write_test_font(temp_dir.path());

    let output = run_cli_command(&["encode", font.to_str().unwrap(), "--range", "90-40"])
        .expect("CLI command should run");
    assert!(!output.status.success());
}

#[test]
fn test_cli_encode_skips_unencodable_character() {
    let temp_dir = setup_temp_dir();
    // Nothing below the baseline, so the apex of 'A' lands on a line break
    let data = FontBuilder::new()
        .empty()
        .simple(SimpleGlyphSpec::new().contour(&[
            (0, 0, true),
            (100, 0, true),
            (50, 100, true),
        ]))
        .map_char('A', 1)
        .build();
    let font = temp_dir.path().join("tall.ttf");
    fs::write(&font, data).expect("Failed to write font");

    let output =
        run_cli_command(&["encode", font.to_str().unwrap()]).expect("CLI command should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 95);
    assert!(stdout.lines().all(|line| !line.starts_with("   65")));
    assert!(stdout.contains("   66  2RR\n"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipped 1 character"));
}
