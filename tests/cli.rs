use predicates::prelude::*;
use std::path::{Path, PathBuf};

struct Replay {
    cmd: assert_cmd::Command,
}

impl Replay {
    fn new() -> Self {
        Replay {
            cmd: assert_cmd::Command::cargo_bin("pdfcairo-replay").unwrap(),
        }
    }
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_png(path: &Path) -> cairo::ImageSurface {
    let mut file = std::fs::File::open(path).unwrap();
    cairo::ImageSurface::create_from_png(&mut file).unwrap()
}

#[test]
fn version() {
    let expected = predicate::str::starts_with("pdfcairo-replay ");
    Replay::new().cmd.arg("--version").assert().success().stdout(expected);
}

#[test]
fn renders_page_to_png() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.png");

    Replay::new()
        .cmd
        .arg(fixture("square.json"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let surface = read_png(&output);
    assert_eq!((surface.width(), surface.height()), (40, 30));
}

#[test]
fn reads_trace_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.png");
    let trace = std::fs::read_to_string(fixture("square.json")).unwrap();

    Replay::new()
        .cmd
        .arg("-")
        .arg("-o")
        .arg(&output)
        .write_stdin(trace)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn extracts_images() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("images");

    Replay::new()
        .cmd
        .arg(fixture("square.json"))
        .arg("--extract-images")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("image-000.png: 2x2 at (0, 26) - (8, 30)"));

    let surface = read_png(&output.join("image-000.png"));
    assert_eq!((surface.width(), surface.height()), (2, 2));
    assert!(!output.join("image-001.png").exists());
}

#[test]
fn invalid_trace_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.png");

    Replay::new()
        .cmd
        .arg("-")
        .arg("-o")
        .arg(&output)
        .write_stdin(r#"{ "width": 10, "height": 10, "ops": [ { "op": "juggle" } ] }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid trace"));

    assert!(!output.exists());
}

#[test]
fn empty_page_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    Replay::new()
        .cmd
        .arg("-")
        .arg("-o")
        .arg(dir.path().join("page.png"))
        .write_stdin(r#"{ "width": 0, "height": 10, "ops": [] }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no area"));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();

    Replay::new()
        .cmd
        .arg(dir.path().join("nope.json"))
        .arg("-o")
        .arg(dir.path().join("page.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
}
