mod builtins;
mod error;
mod executor;
mod jobs;
mod lexer;
mod parser;
mod procctl;
mod redirect;
mod signals;
mod status;

use std::io::{self, BufRead, Write};

use jobs::JobTable;

/// Command-line length ceiling; a line longer than this is drained and
/// silently re-prompted rather than truncated (§4.7 step 4, §5 resource caps).
const MAX_CMDLINE: usize = 2000;

enum ReadOutcome {
    Eof,
    TooLong,
    Line(String),
}

/// Read one physical line from `reader`, bounded to [`MAX_CMDLINE`] bytes.
/// `read_until` already consumes through the delimiter regardless of length,
/// so an oversized line is drained in the same call that detects it.
fn read_bounded_line(reader: &mut impl BufRead) -> ReadOutcome {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return ReadOutcome::Eof,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                if buf.len() > MAX_CMDLINE {
                    return ReadOutcome::TooLong;
                }
                return ReadOutcome::Line(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return ReadOutcome::Eof,
        }
    }
}

/// Drain every pending child-state change and apply it to the job table
/// (§4.7 step 1): Stopped/Continued/Exited-or-Signalled map to
/// Stopped/Running/Done respectively.
fn drain_pending_reap(jobs: &mut JobTable) {
    if !signals::take_pending_reap() {
        return;
    }
    loop {
        match procctl::poll_any_child() {
            Ok(Some((pid, outcome))) => {
                let pgid = procctl::process_group_id_or_self(pid);
                let status = match outcome {
                    status::WaitOutcome::Stopped => jobs::JobStatus::Stopped,
                    status::WaitOutcome::Continued => jobs::JobStatus::Running,
                    status::WaitOutcome::Exited(_) => jobs::JobStatus::Done,
                };
                jobs.mark(pgid, status);
            }
            Ok(None) => break,
            Err(err) => {
                log::debug!("pending-reap poll failed: {err}");
                break;
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = signals::install() {
        log::warn!("failed to install signal handlers: {err}");
    }

    let mut jobs = JobTable::new();
    let stdin = io::stdin();
    let mut reader = stdin.lock();

    loop {
        drain_pending_reap(&mut jobs);
        jobs.reap_done_and_print();

        print!("# ");
        if io::stdout().flush().is_err() {
            break;
        }

        let line = match read_bounded_line(&mut reader) {
            ReadOutcome::Eof => break,
            ReadOutcome::TooLong => continue,
            ReadOutcome::Line(line) => line,
        };

        if line.is_empty() {
            continue;
        }

        if let Ok(parsed) = parser::parse(&line) {
            if !parsed.is_pipeline && builtins::is_builtin(parsed.left.program()) {
                builtins::execute(&parsed.left, &mut jobs);
            } else {
                executor::execute(&parsed, &mut jobs);
            }
        }

        drain_pending_reap(&mut jobs);
    }
}
