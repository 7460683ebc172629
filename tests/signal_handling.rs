#![cfg(unix)]

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

fn spawn_shell() -> Child {
    Command::new(env!("CARGO_BIN_EXE_jsh"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn jsh")
}

fn send(child: &mut Child, line: &str) {
    writeln!(child.stdin.as_mut().expect("stdin"), "{line}").expect("write line");
}

fn sleep_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}

#[test]
fn pipeline_sigpipe_does_not_abort_shell() {
    // yes writes indefinitely; head -1 exits after one line, closing the read
    // end. yes gets SIGPIPE with SIG_DFL (reset post-fork) and dies; the shell
    // itself runs with SIGPIPE = SIG_IGN and keeps taking commands.
    let mut child = spawn_shell();
    send(&mut child, "yes | head -1");
    sleep_ms(100);
    send(&mut child, "echo ALIVE");
    send(&mut child, "exit");

    let output = child.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ALIVE"), "stdout was: {stdout}");
    assert!(output.status.success(), "shell did not exit cleanly");
}

#[test]
fn shell_ignores_sigtstp_with_no_foreground_job() {
    // SIGTSTP sent straight to the shell's own pid while nothing is running
    // in the foreground: the handler only forwards to foreground_pgid, which
    // is 0 at the prompt, so it's a no-op rather than stopping the shell.
    let mut child = spawn_shell();
    sleep_ms(100);
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTSTP);
    }
    sleep_ms(100);
    send(&mut child, "echo ALIVE");
    send(&mut child, "exit");

    let output = child.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ALIVE"), "stdout was: {stdout}");
}

#[test]
fn sigint_on_foreground_job_does_not_kill_shell() {
    let mut child = spawn_shell();
    send(&mut child, "sleep 100");
    sleep_ms(150);
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGINT);
    }
    sleep_ms(150);
    send(&mut child, "echo ALIVE");
    send(&mut child, "exit");

    let output = child.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ALIVE"), "stdout was: {stdout}");
}
