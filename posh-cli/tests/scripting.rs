// This file is part of posh, a POSIX command language interpreter.
// Copyright (C) 2024 the posh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! End-to-end tests running the real shell binary
//!
//! Each test executes a small script with `posh -c` (or from a file or
//! the standard input) and checks the literal output and exit status.
//! Unlike the unit tests, these exercise real processes: pipelines,
//! command substitution, subshells, and external utilities.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_command(script: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_posh"))
        .args(["-c", script])
        .output()
        .expect("failed to run the shell")
}

fn stdout_of(script: &str) -> String {
    let output = run_command(script);
    assert!(
        output.status.success(),
        "script {script:?} failed: {output:?}"
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn sequential_commands() {
    assert_eq!(stdout_of("echo hello; echo world"), "hello\nworld\n");
}

#[test]
fn variable_assignment_and_expansion() {
    assert_eq!(stdout_of("a=1 b=2; echo $a $b"), "1 2\n");
}

#[test]
fn for_loop() {
    assert_eq!(stdout_of("for i in 1 2 3; do echo $i; done"), "1\n2\n3\n");
}

#[test]
fn function_with_local_scope() {
    assert_eq!(
        stdout_of("f() { local x=$1; echo $x; }; x=outer; f inner; echo $x"),
        "inner\nouter\n"
    );
}

#[test]
fn command_substitution_is_field_split() {
    assert_eq!(stdout_of("echo $( echo ab ; echo cd )"), "ab cd\n");
}

#[test]
fn backquote_substitution() {
    assert_eq!(stdout_of("echo `echo quoted`"), "quoted\n");
}

#[test]
fn here_document_with_default_expansion() {
    assert_eq!(
        stdout_of("cat <<EOF\nline1\n${x:-dflt}\nEOF"),
        "line1\ndflt\n"
    );
}

#[test]
fn here_document_with_quoted_delimiter_is_literal() {
    assert_eq!(stdout_of("cat <<'EOF'\n$x `y`\nEOF"), "$x `y`\n");
}

#[test]
fn pipeline_through_external_command() {
    assert_eq!(stdout_of("echo piped | cat"), "piped\n");
    assert_eq!(stdout_of("echo a b c | cat | cat"), "a b c\n");
}

#[test]
fn pipeline_status_is_last_stage() {
    let output = run_command("false | true");
    assert_eq!(output.status.code(), Some(0));
    let output = run_command("true | false");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn negated_pipeline() {
    let output = run_command("! false");
    assert_eq!(output.status.code(), Some(0));
    let output = run_command("! true");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn subshell_does_not_leak_state() {
    assert_eq!(stdout_of("x=outer; (x=inner; echo $x); echo $x"), "inner\nouter\n");
}

#[test]
fn exit_status_propagation() {
    let output = run_command("exit 7");
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn command_not_found_is_127() {
    let output = run_command("definitely-no-such-command-posh");
    assert_eq!(output.status.code(), Some(127));
}

#[test]
fn syntax_error_is_2() {
    let output = run_command("if true; then echo x;");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn errexit_stops_the_script() {
    let output = run_command("set -e; false; echo unreachable");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(output.stdout, b"");
}

#[test]
fn errexit_spares_conditions() {
    let output = run_command("set -e; if false; then :; fi; echo survived");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"survived\n");
}

#[test]
fn set_dashdash_clears_positional_parameters() {
    assert_eq!(stdout_of("set -- a b; set --; echo $#"), "0\n");
}

#[test]
fn quoted_at_with_no_parameters_yields_no_fields() {
    assert_eq!(
        stdout_of("set --; n=0; for i in \"$@\"; do n=1; done; echo $n"),
        "0\n"
    );
}

#[test]
fn case_and_glob_quoting() {
    assert_eq!(
        stdout_of("case hello in h*) echo matched;; *) echo no;; esac"),
        "matched\n"
    );
}

#[test]
fn arithmetic_expansion() {
    assert_eq!(stdout_of("x=5; echo $((x * 2 + 1))"), "11\n");
}

#[test]
fn parameter_modifiers() {
    assert_eq!(
        stdout_of("v=a/b/c.txt; echo ${v##*/} ${v%.txt} ${#v}"),
        "c.txt a/b/c 9\n"
    );
}

#[test]
fn redirection_to_file_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let script = format!(
        "echo first >{0}; echo second >>{0}; cat <{0}",
        path.display()
    );
    assert_eq!(stdout_of(&script), "first\nsecond\n");
}

#[test]
fn script_file_with_positional_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.sh");
    std::fs::write(&path, "echo $0 $1 $2\n").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_posh"))
        .args([path.to_str().unwrap(), "one", "two"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.ends_with("script.sh one two\n"), "{stdout:?}");
}

#[test]
fn reading_commands_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_posh"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"echo from stdin\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.stdout, b"from stdin\n");
}

#[test]
fn async_command_and_wait() {
    assert_eq!(stdout_of("sleep 0 & wait; echo done"), "done\n");
}

#[test]
fn eval_builds_commands_at_runtime() {
    assert_eq!(stdout_of("c=echo; eval $c evaluated"), "evaluated\n");
}

#[test]
fn exit_trap_runs_on_termination() {
    assert_eq!(stdout_of("trap 'echo bye' EXIT; echo hi"), "hi\nbye\n");
}

#[test]
fn assignment_prefix_exports_to_child() {
    // The assignment reaches the child environment without persisting.
    assert_eq!(
        stdout_of("X=fromparent sh -c 'echo $X'; echo ${X:-unset}"),
        "fromparent\nunset\n"
    );
}
