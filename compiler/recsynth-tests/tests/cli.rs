//! End-to-end tests driving the `recsynthc` binary over the declaration files in `demos/`.

use insta_cmd::get_cargo_bin;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn demo(name: &str) -> String {
    format!("{}/../../demos/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn recsynthc(args: &[&str]) -> Output {
    Command::new(get_cargo_bin("recsynthc"))
        .args(args)
        .env_remove("RECSYNTH_LOG")
        .output()
        .expect("failed to run recsynthc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_emit_member_signatures() {
    let point = demo("point.ron");
    let output = recsynthc(&[
        &point,
        "--emit-members",
        "--emit-query",
        "member.Point.op_Equality",
        "--emit-query",
        "member.Point.Deconstruct",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @r"
    public static System.Boolean Point.op_Equality(Point? left, Point? right)
    public void Point.Deconstruct(out System.Int32 X, out System.Int32 Y)
    ");
}

#[test]
fn test_emit_plans_for_every_record() {
    let output = recsynthc(&[&demo("shapes.ron"), "--emit-plans", "--sequential"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    for header in ["record Shape {", "record Circle {", "record Square {", "record struct Color {"] {
        assert!(text.contains(header), "missing {header} in\n{text}");
    }
    assert!(!text.contains("Canvas {"));
}

#[test]
fn test_threads_option_matches_sequential_output() {
    let shapes = demo("shapes.ron");
    let sequential = recsynthc(&[&shapes, "--emit-ron", "--sequential"]);
    let pooled = recsynthc(&[&shapes, "--emit-ron", "--threads", "3"]);
    assert!(sequential.status.success(), "{}", stderr(&sequential));
    assert!(pooled.status.success(), "{}", stderr(&pooled));
    assert_eq!(stdout(&sequential), stdout(&pooled));
    assert!(stdout(&pooled).contains("captured"));
}

#[test]
fn test_read_declarations_from_stdin() {
    let source = std::fs::read_to_string(demo("point.ron")).expect("failed to read demo");
    let mut child = Command::new(get_cargo_bin("recsynthc"))
        .args(["-", "--emit-members", "--emit-query", "member.Point.<Clone>$"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn recsynthc");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(source.as_bytes())
        .expect("failed to write stdin");
    let output = child.wait_with_output().expect("failed to wait for recsynthc");
    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @"public virtual Point Point.<Clone>$()");
}

#[test]
fn test_record_errors_fail_after_emission() {
    let output = recsynthc(&[&demo("clone.ron"), "--emit-members"]);
    assert!(!output.status.success());
    assert!(stdout(&output).starts_with("Token:\n"));
    let errors = stderr(&output);
    assert!(errors.contains("record synthesis reported"), "{errors}");
    assert!(errors.contains("members named 'Clone' are disallowed in records"), "{errors}");
}

#[test]
fn test_invalid_query_is_reported() {
    let output = recsynthc(&[&demo("point.ron"), "--emit-plans", "--emit-query", "hir.fn.main"]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("failed to parse emit query 'hir.fn.main'"));
}

#[test]
fn test_unknown_type_in_declarations() {
    let mut child = Command::new(get_cargo_bin("recsynthc"))
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn recsynthc");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"#![enable(implicit_some)]\n(types: [(name: \"R\", kind: RecordClass, base: \"Missing\")])")
        .expect("failed to write stdin");
    let output = child.wait_with_output().expect("failed to wait for recsynthc");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Missing does not name a known type"));
}
