//! Fork/exec for a simple command or an exactly-two-stage pipeline (§4.5).
//!
//! Uses a raw `fork()` rather than `std::process::Command` — the spec's
//! exit-code mapping (127/126/errno) has to be the literal exit status of a
//! real child process a parent `waitpid`s on, not an error folded back into
//! the parent the way `Command::spawn` handles a failed `exec`.

use std::ffi::CString;
use std::io;
use std::os::unix::io::AsRawFd;

use crate::jobs::JobTable;
use crate::parser::{Command, Line};
use crate::procctl::{self, GroupWaitOutcome};
use crate::redirect;
use crate::signals;

/// Run a parsed line, dispatching to the simple-command or pipeline path.
pub fn execute(line: &Line, jobs: &mut JobTable) {
    if line.is_pipeline {
        execute_pipeline(line, jobs);
    } else {
        execute_simple(&line.left, &line.original, jobs);
    }
}

fn execute_simple(command: &Command, original: &str, jobs: &mut JobTable) {
    if redirect::probe_input_file(command).is_err() {
        println!();
        return;
    }

    let pid = unsafe { libc::fork() };
    if pid < 0 {
        log::debug!("fork failed: {}", io::Error::last_os_error());
        return;
    }
    if pid == 0 {
        run_in_child(command, 0, None, None);
    }

    finish_launch(pid, pid, command.background, original, jobs);
}

fn execute_pipeline(line: &Line, jobs: &mut JobTable) {
    let left = &line.left;
    let right = line.right.as_ref().expect("a pipeline Line always has a right command");

    if redirect::probe_input_file(left).is_err() || redirect::probe_input_file(right).is_err() {
        println!();
        return;
    }

    let (reader, writer) = match os_pipe::pipe() {
        Ok(pair) => pair,
        Err(err) => {
            log::debug!("pipe() failed: {err}");
            return;
        }
    };
    let reader_fd = reader.as_raw_fd();
    let writer_fd = writer.as_raw_fd();

    let left_pid = unsafe { libc::fork() };
    if left_pid < 0 {
        log::debug!("fork failed: {}", io::Error::last_os_error());
        return;
    }
    if left_pid == 0 {
        drop(reader);
        run_in_child(left, 0, None, Some(writer_fd));
    }

    let right_pid = unsafe { libc::fork() };
    if right_pid < 0 {
        log::debug!("fork failed: {}", io::Error::last_os_error());
        drop(reader);
        drop(writer);
        // Partial pipeline: whatever was already forked still gets waited on (§4.5).
        finish_launch(left_pid, left_pid, false, &line.original, jobs);
        return;
    }
    if right_pid == 0 {
        drop(writer);
        run_in_child(right, left_pid, Some(reader_fd), None);
    }

    drop(reader);
    drop(writer);

    if let Err(err) = procctl::set_process_group(left_pid, left_pid) {
        log::debug!("parent setpgid (left) failed: {err}");
    }
    if let Err(err) = procctl::set_process_group(right_pid, left_pid) {
        log::debug!("parent setpgid (right) failed: {err}");
    }

    signals::set_foreground_pgid(left_pid);
    let outcome = procctl::wait_for_group(left_pid);
    signals::clear_foreground_pgid();

    match outcome {
        Ok(GroupWaitOutcome::Stopped) => {
            if jobs.add(left_pid, &line.original, false).is_err() {
                log::debug!("job table full; stopped pipeline pgid {left_pid} went untracked");
            }
        }
        Ok(GroupWaitOutcome::Done) => {}
        Err(err) => log::debug!("wait failed: {err}"),
    }
}

/// Apply the process group, signal, and redirection setup shared by both
/// executor paths, then `execvp` or die (§4.5 redirection primitive).
/// `target_pgid` of 0 means "my own pid" (the group leader case); any other
/// value joins an already-known leader's group. Never returns.
fn run_in_child(
    command: &Command,
    target_pgid: libc::pid_t,
    pipe_read_fd: Option<libc::c_int>,
    pipe_write_fd: Option<libc::c_int>,
) -> ! {
    let _ = unsafe { libc::setpgid(0, target_pgid) };
    signals::reset_child_dispositions();

    if let Some(fd) = pipe_read_fd {
        redirect::dup2_pipe_fd(fd, libc::STDIN_FILENO);
    }
    if let Some(fd) = pipe_write_fd {
        redirect::dup2_pipe_fd(fd, libc::STDOUT_FILENO);
    }
    redirect::apply_file_redirections(command);

    exec_or_die(command)
}

fn exec_or_die(command: &Command) -> ! {
    let program = match CString::new(command.program()) {
        Ok(c) => c,
        Err(_) => std::process::exit(126),
    };
    let arg_cstrings: Vec<CString> = command
        .argv
        .iter()
        .map(|a| CString::new(a.as_str()).unwrap_or_default())
        .collect();
    let mut argv: Vec<*const libc::c_char> = arg_cstrings.iter().map(|a| a.as_ptr()).collect();
    argv.push(std::ptr::null());

    unsafe {
        libc::execvp(program.as_ptr(), argv.as_ptr());
    }

    let not_found = io::Error::last_os_error().raw_os_error() == Some(libc::ENOENT);
    std::process::exit(if not_found { 127 } else { 126 });
}

/// Parent-side continuation shared by the simple-command path and the
/// partial-pipeline failure corner case: redundant `setpgid`, then either
/// hand a background job straight to the table or wait for it in the
/// foreground (§4.5 "Simple command path").
fn finish_launch(pid: libc::pid_t, pgid: libc::pid_t, background: bool, original: &str, jobs: &mut JobTable) {
    if let Err(err) = procctl::set_process_group(pid, pgid) {
        log::debug!("parent setpgid failed: {err}");
    }

    if background {
        if jobs.add(pgid, original, true).is_err() {
            log::debug!("job table full; background pgid {pgid} running untracked");
        }
        return;
    }

    signals::set_foreground_pgid(pgid);
    let outcome = procctl::wait_for_group(pgid);
    signals::clear_foreground_pgid();

    match outcome {
        Ok(GroupWaitOutcome::Stopped) => {
            if jobs.add(pgid, original, false).is_err() {
                log::debug!("job table full; stopped pgid {pgid} went untracked");
            }
        }
        Ok(GroupWaitOutcome::Done) => {}
        Err(err) => log::debug!("wait failed: {err}"),
    }
}
