//! Integration tests for the `marksheet` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

/// Local port nothing listens on.
const REFUSED_ENDPOINT: &str = "http://127.0.0.1:9/api/generate";

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("marksheet").unwrap();
    cmd.env_remove("MARKSHEET_ENDPOINT")
        .env_remove("MARKSHEET_MODEL")
        .env_remove("MARKSHEET_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Multi-page PDF; each page shows its lines in 12pt Helvetica, 20pt apart.
fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = lopdf::Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = pages
        .iter()
        .map(|lines| {
            let body: Vec<String> = lines.iter().map(|line| format!("({line}) Tj")).collect();
            let content = format!("BT /F1 12 Tf 20 TL 72 720 Td {} ET", body.join(" T* "));
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            Object::Reference(page_id)
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn write_sample(dir: &Path) -> PathBuf {
    let path = dir.join("marksheet.pdf");
    std::fs::write(
        &path,
        pdf_with_pages(&[
            &["Student Name: Asha Verma", "Total Marks: 500 415"],
            &["Grade: A"],
        ]),
    )
    .unwrap();
    path
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("lines"))
        .stdout(predicate::str::contains("probe"));
}

#[test]
fn extract_help_shows_oracle_flags() {
    cmd()
        .args(["extract", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE"))
        .stdout(predicate::str::contains("--no-oracle"))
        .stdout(predicate::str::contains("--endpoint"))
        .stdout(predicate::str::contains("--name-label"));
}

#[test]
fn extract_without_oracle_writes_header_only_table() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample(dir.path());
    let output = dir.path().join("records.csv");

    cmd()
        .arg("extract")
        .arg(&pdf)
        .arg("--no-oracle")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 0 records from 2 pages"));

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "Name,Registration,TotalMarks,SGPA,Grade\n"
    );
}

#[test]
fn extract_defaults_output_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample(dir.path());

    cmd()
        .arg("extract")
        .arg(&pdf)
        .arg("--no-oracle")
        .assert()
        .success();

    assert!(dir.path().join("marksheet.csv").exists());
}

#[test]
fn unreachable_oracle_does_not_fail_extract() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample(dir.path());
    let output = dir.path().join("records.csv");

    cmd()
        .arg("extract")
        .arg(&pdf)
        .args(["--endpoint", REFUSED_ENDPOINT, "--timeout", "5"])
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn extract_missing_file_fails() {
    cmd()
        .args(["extract", "no/such/file.pdf", "--no-oracle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn extract_unreadable_pdf_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("broken.pdf");
    std::fs::write(&pdf, b"not a pdf at all").unwrap();
    let output = dir.path().join("records.csv");

    cmd()
        .arg("extract")
        .arg(&pdf)
        .arg("--no-oracle")
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error processing PDF"));

    assert!(!output.exists());
}

#[test]
fn lines_prints_positioned_lines() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample(dir.path());

    cmd()
        .arg("lines")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Page 1 ---"))
        .stdout(predicate::str::contains("63.00\tStudent Name: Asha Verma"))
        .stdout(predicate::str::contains("83.00\tTotal Marks: 500 415"))
        .stdout(predicate::str::contains("--- Page 2 ---"));
}

#[test]
fn lines_json_for_selected_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample(dir.path());

    let output = cmd()
        .arg("lines")
        .arg(&pdf)
        .args(["--pages", "2", "--format", "json", "--blocks"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["page"], 2);
    assert_eq!(rows[0]["plain_text"], false);
    assert_eq!(rows[0]["lines"][0]["text"], "Grade: A");
    assert_eq!(rows[0]["blocks"][0], "Grade: A");
}

#[test]
fn lines_rejects_out_of_range_pages() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample(dir.path());

    cmd()
        .arg("lines")
        .arg(&pdf)
        .args(["--pages", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds"));
}

#[test]
fn probe_reports_unreachable_oracle() {
    cmd()
        .args(["probe", "--endpoint", REFUSED_ENDPOINT, "--timeout", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("oracle probe failed"));
}

#[test]
fn endpoint_is_read_from_environment() {
    cmd()
        .env("MARKSHEET_ENDPOINT", REFUSED_ENDPOINT)
        .env("MARKSHEET_TIMEOUT", "5")
        .arg("probe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("oracle probe failed"));
}
