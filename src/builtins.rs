//! `exit`, `jobs`, `fg`, `bg` (§4.6), plus the supplemental `wait` (§4.6 of
//! SPEC_FULL.md). Invoked only in the parent, never forked, and ignoring
//! any arguments/redirections the parser still accepted alongside them.

use crate::jobs::{JobStatus, JobTable};
use crate::parser::Command;
use crate::procctl::{self, GroupWaitOutcome};
use crate::signals;

const BUILTINS: &[&str] = &["exit", "jobs", "fg", "bg", "wait"];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Dispatch a builtin named by `command.program()`. Panics if called with a
/// non-builtin — callers must gate on [`is_builtin`] first.
pub fn execute(command: &Command, jobs: &mut JobTable) {
    match command.program() {
        "exit" => std::process::exit(0),
        "jobs" => run_jobs(jobs),
        "fg" => run_fg(jobs),
        "bg" => run_bg(jobs),
        "wait" => run_wait(command, jobs),
        other => unreachable!("{other} is not a builtin"),
    }
}

fn sign_for(id: u32, highest_id: Option<u32>) -> char {
    if Some(id) == highest_id {
        '+'
    } else {
        '-'
    }
}

fn status_word(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Running => "Running",
        JobStatus::Stopped => "Stopped",
        JobStatus::Done => "Done",
    }
}

/// jobs: one `"[id] <sign> <status> <cmdline>"` line per non-Done entry.
fn run_jobs(jobs: &JobTable) {
    let highest = jobs.highest_id();
    for job in jobs.non_done_sorted() {
        println!("[{}] {} {} {}", job.id, sign_for(job.id, highest), status_word(job.status), job.cmdline);
    }
}

/// Strip the saved cmdline down to what `fg` echoes: trailing whitespace,
/// then one trailing `&`, then whatever whitespace preceded it (§4.6, §9
/// "quirk c" — preserve literally, the test suite depends on it).
fn strip_fg_echo(cmdline: &str) -> &str {
    let trimmed = cmdline.trim_end();
    match trimmed.strip_suffix('&') {
        Some(rest) => rest.trim_end(),
        None => trimmed,
    }
}

fn run_fg(jobs: &mut JobTable) {
    let Some(id) = jobs.pick_most_recent_for_fg() else {
        println!("fg: no current job");
        return;
    };
    let pgid = jobs.get_pgid(id).expect("picked fg id must exist");
    let cmdline = jobs.get_cmdline(id).expect("picked fg id must exist").to_string();
    println!("{}", strip_fg_echo(&cmdline));

    if let Err(err) = procctl::send_signal_to_group(pgid, libc::SIGCONT) {
        log::debug!("fg: SIGCONT failed: {err}");
    }

    signals::set_foreground_pgid(pgid);
    let outcome = procctl::wait_for_group(pgid);
    signals::clear_foreground_pgid();

    match outcome {
        Ok(GroupWaitOutcome::Stopped) => jobs.mark(pgid, JobStatus::Stopped),
        Ok(GroupWaitOutcome::Done) => jobs.mark(pgid, JobStatus::Done),
        Err(err) => log::debug!("fg: wait failed: {err}"),
    }
}

fn run_bg(jobs: &mut JobTable) {
    let Some(id) = jobs.pick_most_recent_stopped_for_bg() else {
        println!("bg: no current job");
        return;
    };
    let pgid = jobs.get_pgid(id).expect("picked bg id must exist");

    if let Err(err) = procctl::send_signal_to_group(pgid, libc::SIGCONT) {
        log::debug!("bg: SIGCONT failed: {err}");
    }
    jobs.mark(pgid, JobStatus::Running);
    jobs.set_background(pgid, true);

    let highest = jobs.highest_id();
    let cmdline = jobs.get_cmdline(id).expect("picked bg id must exist");
    println!("[{}] {} Running {} &", id, sign_for(id, highest), cmdline);
}

/// `wait` (no args): block until every currently-Running background job has
/// left the table. `wait %N`: block on job N, or fail immediately (rather
/// than block forever) if N isn't a live job. Mirrors `fg`/`bg`'s "no
/// current job" handling for the equivalent no-such-job cases.
fn run_wait(command: &Command, jobs: &mut JobTable) {
    match command.args().first() {
        None => {
            if jobs.any_running_id().is_none() {
                println!("wait: no current job");
                return;
            }
            while let Some(id) = jobs.any_running_id() {
                let pgid = match jobs.get_pgid(id) {
                    Some(pgid) => pgid,
                    None => break,
                };
                if let Err(err) = procctl::wait_for_group(pgid) {
                    log::debug!("wait: {err}");
                    break;
                }
                jobs.mark(pgid, JobStatus::Done);
            }
        }
        Some(arg) => {
            let Some(id) = arg.strip_prefix('%').and_then(|n| n.parse::<u32>().ok()) else {
                println!("wait: no such job");
                return;
            };
            let Some(job) = jobs.get(id) else {
                println!("wait: no such job");
                return;
            };
            if job.status == JobStatus::Done {
                return;
            }
            let pgid = job.pgid;
            if procctl::wait_for_group(pgid).is_ok() {
                jobs.mark(pgid, JobStatus::Done);
            }
        }
    }
}
