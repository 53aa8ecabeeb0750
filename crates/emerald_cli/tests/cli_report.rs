use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use emerald_core::checksum::compute_checksum;
use emerald_core::layout::{
    CHECKSUM_OFFSET, IMAGE_LEN, SAVE_BLOCK_LEN, SAVE_INDEX_OFFSET, SECTION_ID_OFFSET, SLOT_LEN,
    SLOTS_PER_BLOCK, payload_size,
};
use serde_json::Value;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_emerald-check"))
        .args(args)
        .output()
        .expect("failed to run emerald-check CLI")
}

fn temp_save_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.sav", std::process::id(), nanos))
}

fn build_image(corrupt: impl FnOnce(&mut [u8])) -> Vec<u8> {
    let mut image = vec![0u8; IMAGE_LEN];
    for block in 0..2 {
        for slot in 0..SLOTS_PER_BLOCK {
            let start = block * SAVE_BLOCK_LEN + slot * SLOT_LEN;
            for (i, b) in image[start..start + SLOT_LEN].iter_mut().enumerate() {
                *b = (i * 3 + slot) as u8;
            }
            let id = ((slot + 5) % SLOTS_PER_BLOCK) as u16;
            image[start + SECTION_ID_OFFSET..start + SECTION_ID_OFFSET + 2]
                .copy_from_slice(&id.to_le_bytes());
            image[start + SAVE_INDEX_OFFSET..start + SAVE_INDEX_OFFSET + 4]
                .copy_from_slice(&(30 + block as u32).to_le_bytes());
            let size = payload_size(u32::from(id)).expect("valid id");
            let checksum = compute_checksum(&image[start..start + size]).expect("aligned");
            image[start + CHECKSUM_OFFSET..start + CHECKSUM_OFFSET + 2]
                .copy_from_slice(&checksum.to_le_bytes());
        }
    }
    corrupt(&mut image);
    image
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn write_save(prefix: &str, bytes: &[u8]) -> PathBuf {
    let path = temp_save_path(prefix);
    fs::write(&path, bytes).expect("failed to write temp save");
    path
}

#[test]
fn clean_save_reports_no_anomalies() {
    let path = write_save("clean", &build_image(|_| {}));
    let output = run_cli(&[&arg(&path)]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "0 anomalies found\nNewest intact save: 1\n");
}

#[test]
fn anomalies_keep_exit_status_zero_by_default() {
    let path = write_save("corrupt", &build_image(|img| img[0x10] ^= 0x04));
    let output = run_cli(&[&arg(&path)]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bad checksum"), "{stdout}");
    assert!(stdout.contains("section 5 of save 0 at offset 0."), "{stdout}");
    assert!(stdout.contains("1 anomaly found"));
}

#[test]
fn fail_on_anomalies_sets_exit_status() {
    let at = SAVE_BLOCK_LEN + 4 * SLOT_LEN + SAVE_INDEX_OFFSET;
    let path = write_save(
        "strict",
        &build_image(|img| img[at..at + 4].copy_from_slice(&1u32.to_le_bytes())),
    );
    let output = run_cli(&["--fail-on-anomalies", &arg(&path)]);
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(3));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Inconsistent save index 1 found in section 9 of save 1"));
}

#[test]
fn fail_on_anomalies_is_zero_for_clean_save() {
    let path = write_save("strict_clean", &build_image(|_| {}));
    let output = run_cli(&["--fail-on-anomalies", &arg(&path)]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
}

#[test]
fn truncated_file_is_an_error() {
    let mut bytes = build_image(|_| {});
    bytes.truncate(100_000);
    let path = write_save("short", &bytes);
    let output = run_cli(&[&arg(&path)]);
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("100000 bytes"), "{stderr}");
}

#[test]
fn missing_file_is_an_error() {
    let path = temp_save_path("missing");
    let output = run_cli(&[&arg(&path)]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error reading"), "{stderr}");
}

#[test]
fn missing_argument_is_a_usage_error() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn json_report_is_valid() {
    let path = write_save("json", &build_image(|img| img[SAVE_BLOCK_LEN + 8] ^= 0x80));
    let output = run_cli(&["--json", &arg(&path)]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["file_len"], IMAGE_LEN);
    assert_eq!(json["anomaly_count"], 1);
    assert_eq!(json["newest_block"], 0);
    assert_eq!(json["blocks"][1]["findings"][0]["kind"], "checksum_mismatch");
}

#[test]
fn layout_json_reports_regions() {
    let path = write_save("layout", &build_image(|_| {}));
    let output = run_cli(&["--layout", "--json", &arg(&path)]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["validation_ok"], true);
    assert_eq!(json["regions"][0]["id"], "save block 0");
    assert_eq!(json["regions"][2]["start"], 0x1c000);
}

#[test]
fn sections_flag_lists_each_slot() {
    let path = write_save("sections", &build_image(|_| {}));
    let output = run_cli(&["--sections", &arg(&path)]);
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Save 0 (save index 30, canonical section 5)"));
    assert!(stdout.contains("Save 1 (save index 31, canonical section 5)"));
}

#[test]
fn findings_are_not_echoed_to_stderr_by_default() {
    let path = write_save(
        "quiet",
        &build_image(|img| {
            img[SLOT_LEN + 0x20] ^= 0x01;
            let at = 4 * SLOT_LEN + SECTION_ID_OFFSET;
            img[at..at + 2].copy_from_slice(&0x40u16.to_le_bytes());
        }),
    );
    let output = Command::new(env!("CARGO_BIN_EXE_emerald-check"))
        .arg(arg(&path))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run emerald-check CLI");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("Bad checksum "), "{stdout}");
    assert!(lines[0].contains("of save 0 at offset 1000"), "{stdout}");
    assert_eq!(
        lines[1],
        "Save 0 not analyzed: illegal section id 64 (expected 0..=13) at offset 4000"
    );
    assert_eq!(lines[2], "2 anomalies found");
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));
}
