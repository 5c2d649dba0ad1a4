use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn recursive_fibonacci_from_a_file_argument() {
    Command::cargo_bin("msc")
        .unwrap()
        .arg(fixture("fibonacci.msvm"))
        .assert()
        .success()
        .stdout(predicate::str::contains("832040"));
}

#[test]
fn recursive_fibonacci_from_stdin() {
    let source = std::fs::read_to_string(fixture("fibonacci.msvm")).unwrap();
    Command::cargo_bin("msc")
        .unwrap()
        .write_stdin(source)
        .assert()
        .success()
        .stdout(predicate::str::contains("832040"));
}

#[test]
fn malformed_assembly_exits_nonzero_with_a_line_number() {
    Command::cargo_bin("msc")
        .unwrap()
        .write_stdin("@main:\n  NOTANOPCODE r0, r1\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("2:"));
}

#[test]
fn program_with_no_main_is_an_error() {
    Command::cargo_bin("msc")
        .unwrap()
        .write_stdin("@helper:\n  RETURN\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no @main"));
}

#[test]
fn dump_bytecode_prints_disassembly_without_running() {
    Command::cargo_bin("msc")
        .unwrap()
        .arg("--dump-bytecode")
        .arg(fixture("fibonacci.msvm"))
        .assert()
        .success()
        .stdout(predicate::str::contains("@fib"))
        .stdout(predicate::str::contains("CALLF"))
        .stdout(predicate::str::contains("832040").not());
}

#[test]
fn cycle_budget_can_be_exhausted() {
    Command::cargo_bin("msc")
        .unwrap()
        .arg("--max-cycles")
        .arg("5")
        .write_stdin("@main:\nloop:\n  JMP loop\n")
        .assert()
        .failure()
        .code(1);
}
