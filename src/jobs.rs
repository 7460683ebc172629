//! Fixed-capacity job table (§4.3). Capacity 20; a `Done` slot is a vacant
//! slot — there is no separate "free list", `Done` entries are simply
//! invisible to every query until `reap_done_and_print` compacts them away.

pub const CAPACITY: usize = 20;
/// Bounded copy length for a stored command line (§3 "Job").
pub const MAX_CMDLINE: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Stopped,
    Done,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: u32,
    pub pgid: libc::pid_t,
    pub cmdline: String,
    pub status: JobStatus,
    pub background: bool,
}

/// Fixed array of `CAPACITY` slots, keyed by process-group id and by a
/// stable small-integer job id (§4.3 contract). Accessed only from the main
/// thread — never from a signal handler.
pub struct JobTable {
    slots: Vec<Option<Job>>,
}

/// Returned by [`JobTable::add`] when all `CAPACITY` slots are occupied by
/// non-`Done` entries (§7 "Job table full").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    /// init: zero all slots, every slot vacant (Done).
    pub fn new() -> Self {
        Self {
            slots: (0..CAPACITY).map(|_| None).collect(),
        }
    }

    fn max_id(&self) -> u32 {
        self.slots.iter().flatten().map(|j| j.id).max().unwrap_or(0)
    }

    /// add(pgid, cmdline, is_background) -> id | Full.
    pub fn add(&mut self, pgid: libc::pid_t, cmdline: &str, is_background: bool) -> Result<u32, Full> {
        let slot = self.slots.iter_mut().find(|s| s.is_none()).ok_or(Full)?;
        let id = self.max_id() + 1;
        let mut cmdline = cmdline.to_string();
        cmdline.truncate(MAX_CMDLINE);
        *slot = Some(Job {
            id,
            pgid,
            cmdline,
            status: if is_background { JobStatus::Running } else { JobStatus::Stopped },
            background: is_background,
        });
        Ok(id)
    }

    fn find_by_pgid_mut(&mut self, pgid: libc::pid_t) -> Option<&mut Job> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|j| j.status != JobStatus::Done && j.pgid == pgid)
    }

    fn find_by_id_mut(&mut self, id: u32) -> Option<&mut Job> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|j| j.status != JobStatus::Done && j.id == id)
    }

    fn find_by_id(&self, id: u32) -> Option<&Job> {
        self.slots
            .iter()
            .flatten()
            .find(|j| j.status != JobStatus::Done && j.id == id)
    }

    /// mark(pgid, status): mutates the first non-Done entry whose pgid matches.
    pub fn mark(&mut self, pgid: libc::pid_t, status: JobStatus) {
        if let Some(job) = self.find_by_pgid_mut(pgid) {
            job.status = status;
        }
    }

    /// set_background(pgid, flag).
    pub fn set_background(&mut self, pgid: libc::pid_t, flag: bool) {
        if let Some(job) = self.find_by_pgid_mut(pgid) {
            job.background = flag;
        }
    }

    pub fn get_pgid(&self, id: u32) -> Option<libc::pid_t> {
        self.find_by_id(id).map(|j| j.pgid)
    }

    pub fn get_cmdline(&self, id: u32) -> Option<&str> {
        self.find_by_id(id).map(|j| j.cmdline.as_str())
    }

    pub fn get(&self, id: u32) -> Option<&Job> {
        self.find_by_id(id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Job> {
        self.find_by_id_mut(id)
    }

    /// pick_most_recent_for_fg(): highest id among Running or Stopped.
    pub fn pick_most_recent_for_fg(&self) -> Option<u32> {
        self.slots
            .iter()
            .flatten()
            .filter(|j| matches!(j.status, JobStatus::Running | JobStatus::Stopped))
            .map(|j| j.id)
            .max()
    }

    /// pick_most_recent_stopped_for_bg(): highest id among Stopped.
    pub fn pick_most_recent_stopped_for_bg(&self) -> Option<u32> {
        self.slots
            .iter()
            .flatten()
            .filter(|j| j.status == JobStatus::Stopped)
            .map(|j| j.id)
            .max()
    }

    /// Any currently Running job's id, for the `wait` builtin's no-argument
    /// form (§4.6 supplement) to drain one job at a time.
    pub fn any_running_id(&self) -> Option<u32> {
        self.slots
            .iter()
            .flatten()
            .find(|j| j.status == JobStatus::Running)
            .map(|j| j.id)
    }

    /// Highest id among any currently non-Done entry — used to tag the `+`
    /// row of `jobs` output (§4.6).
    pub fn highest_id(&self) -> Option<u32> {
        self.slots
            .iter()
            .flatten()
            .filter(|j| j.status != JobStatus::Done)
            .map(|j| j.id)
            .max()
    }

    /// All non-Done entries, ascending by id, for `jobs` listing.
    pub fn non_done_sorted(&self) -> Vec<&Job> {
        let mut list: Vec<&Job> = self.slots.iter().flatten().filter(|j| j.status != JobStatus::Done).collect();
        list.sort_by_key(|j| j.id);
        list
    }

    /// reap_done_and_print(): emit `"[id] - Done cmdline\n"` for every
    /// background Done entry, then compact the table.
    pub fn reap_done_and_print(&mut self) {
        for job in self.slots.iter().flatten() {
            if job.status == JobStatus::Done && job.background {
                println!("[{}] - Done {}", job.id, job.cmdline);
            }
        }
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(j) if j.status == JobStatus::Done) {
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_assigned_in_order_from_init() {
        let mut table = JobTable::new();
        let id1 = table.add(100, "sleep 1", true).unwrap();
        let id2 = table.add(200, "sleep 2", true).unwrap();
        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut table = JobTable::new();
        for i in 0..CAPACITY {
            table.add(100 + i as libc::pid_t, "sleep 1", true).unwrap();
        }
        assert_eq!(table.add(999, "sleep 1", true), Err(Full));
    }

    #[test]
    fn done_entries_are_invisible_until_reap() {
        let mut table = JobTable::new();
        let id = table.add(100, "sleep 1", true).unwrap();
        table.mark(100, JobStatus::Done);
        assert!(table.pick_most_recent_for_fg().is_none());
        assert_eq!(table.non_done_sorted().len(), 0);
        table.reap_done_and_print();
        assert!(table.get(id).is_none());
    }

    #[test]
    fn next_id_never_recycles_while_higher_job_alive() {
        let mut table = JobTable::new();
        let id1 = table.add(100, "a", true).unwrap();
        let _id2 = table.add(200, "b", true).unwrap();
        table.mark(100, JobStatus::Done);
        table.reap_done_and_print();
        assert!(table.get(id1).is_none());
        let id3 = table.add(300, "c", true).unwrap();
        assert_eq!(id3, 3);
    }

    #[test]
    fn fg_pick_prefers_highest_id() {
        let mut table = JobTable::new();
        table.add(100, "a", false).unwrap();
        let id2 = table.add(200, "b", false).unwrap();
        assert_eq!(table.pick_most_recent_for_fg(), Some(id2));
    }

    #[test]
    fn stopped_pick_ignores_running_jobs() {
        let mut table = JobTable::new();
        let stopped_id = table.add(100, "a", false).unwrap();
        table.add(200, "b", true).unwrap();
        assert_eq!(table.pick_most_recent_stopped_for_bg(), Some(stopped_id));
    }
}
