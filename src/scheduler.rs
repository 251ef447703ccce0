use crate::config::ArchiverConfig;
use crate::jellyfin::{Library, LibraryKind};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// A library relocation fired once a day at a fixed local time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub library: Library,
    pub at: NaiveTime,
    next_run: NaiveDateTime,
}

impl ScheduledJob {
    pub const fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    /// First occurrence of `at` strictly after `after`
    fn next_occurrence(at: NaiveTime, after: NaiveDateTime) -> NaiveDateTime {
        let today = after.date().and_time(at);
        if today > after {
            today
        } else {
            today + TimeDelta::days(1)
        }
    }
}

/// Daily job table, driven by an external clock
#[derive(Debug, Default)]
pub struct Scheduler {
    jobs: Vec<ScheduledJob>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one job per library: movie libraries at `schedule.movies`,
    /// series libraries at `schedule.series`. Excluded and unsupported
    /// libraries are left out.
    pub fn for_libraries(libraries: &[Library], config: &ArchiverConfig, now: NaiveDateTime) -> Self {
        let mut scheduler = Self::new();

        for library in libraries {
            if config.is_excluded(&library.id) {
                tracing::info!("Library '{}' is excluded, not scheduling it", library.id);
                continue;
            }

            let at = match library.kind {
                LibraryKind::Movie => config.schedule.movies,
                LibraryKind::Series => config.schedule.series,
                LibraryKind::Other => {
                    tracing::warn!(
                        "Skipping library '{}'. Unsupported library type: {}",
                        library.id,
                        library.kind
                    );
                    continue;
                }
            };

            scheduler.every_day_at(at, library.clone(), now);
        }

        scheduler
    }

    pub fn every_day_at(&mut self, at: NaiveTime, library: Library, now: NaiveDateTime) {
        let next_run = ScheduledJob::next_occurrence(at, now);
        tracing::info!(
            "Scheduled {} library '{}' daily at {} (next run: {})",
            library.kind,
            library.id,
            at.format("%H:%M"),
            next_run
        );
        self.jobs.push(ScheduledJob {
            library,
            at,
            next_run,
        });
    }

    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().map(ScheduledJob::next_run).min()
    }

    /// Run every job due at `now`, earliest first, and reschedule each for
    /// its next daily occurrence. Returns the number of jobs run.
    pub fn run_pending<F>(&mut self, now: NaiveDateTime, mut run: F) -> usize
    where
        F: FnMut(&Library),
    {
        let mut due: Vec<usize> = (0..self.jobs.len())
            .filter(|&i| self.jobs[i].next_run <= now)
            .collect();
        due.sort_by_key(|&i| self.jobs[i].next_run);

        for &i in &due {
            run(&self.jobs[i].library);
            let at = self.jobs[i].at;
            self.jobs[i].next_run = ScheduledJob::next_occurrence(at, now);
        }

        due.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::Path;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_next_occurrence_later_today() {
        assert_eq!(
            ScheduledJob::next_occurrence(time(2, 0), at(1, 1, 0)),
            at(1, 2, 0)
        );
    }

    #[test]
    fn test_next_occurrence_passed_today() {
        assert_eq!(
            ScheduledJob::next_occurrence(time(2, 0), at(1, 2, 0)),
            at(2, 2, 0)
        );
        assert_eq!(
            ScheduledJob::next_occurrence(time(2, 0), at(1, 13, 0)),
            at(2, 2, 0)
        );
    }

    #[test]
    fn test_job_runs_once_per_day() {
        let mut scheduler = Scheduler::new();
        scheduler.every_day_at(time(2, 0), Library::new("movies", LibraryKind::Movie), at(1, 12, 0));

        let mut runs = Vec::new();
        assert_eq!(scheduler.run_pending(at(1, 23, 59), |l| runs.push(l.id.clone())), 0);
        assert_eq!(scheduler.run_pending(at(2, 2, 0), |l| runs.push(l.id.clone())), 1);
        assert_eq!(scheduler.run_pending(at(2, 2, 0), |l| runs.push(l.id.clone())), 0);
        assert_eq!(scheduler.run_pending(at(2, 9, 0), |l| runs.push(l.id.clone())), 0);
        assert_eq!(scheduler.run_pending(at(3, 2, 0), |l| runs.push(l.id.clone())), 1);

        assert_eq!(runs, vec!["movies".to_string(), "movies".to_string()]);
        assert_eq!(scheduler.next_run(), Some(at(4, 2, 0)));
    }

    #[test]
    fn test_due_jobs_run_earliest_first() {
        let mut scheduler = Scheduler::new();
        let now = at(1, 0, 30);
        scheduler.every_day_at(time(7, 0), Library::new("shows", LibraryKind::Series), now);
        scheduler.every_day_at(time(2, 0), Library::new("movies", LibraryKind::Movie), now);

        let mut runs = Vec::new();
        // Process was asleep through both times
        scheduler.run_pending(at(1, 8, 0), |l| runs.push(l.id.clone()));

        assert_eq!(runs, vec!["movies".to_string(), "shows".to_string()]);
        assert!(scheduler.jobs().iter().all(|j| j.next_run().date() == at(2, 0, 0).date()));
    }

    #[test]
    fn test_for_libraries_uses_schedule_and_exclusions() {
        let mut config = crate::config::test_config(Path::new("/backup"));
        config.excluded_libraries = vec!["kids".to_string()];

        let libraries = vec![
            Library::new("movies", LibraryKind::Movie),
            Library::new("shows", LibraryKind::Series),
            Library::new("music", LibraryKind::Other),
            Library::new("kids", LibraryKind::Movie),
        ];

        let scheduler = Scheduler::for_libraries(&libraries, &config, at(1, 12, 0));
        let jobs = scheduler.jobs();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].library.id, "movies");
        assert_eq!(jobs[0].at, time(2, 0));
        assert_eq!(jobs[1].library.id, "shows");
        assert_eq!(jobs[1].at, time(7, 0));
        assert_eq!(scheduler.next_run(), Some(at(2, 2, 0)));
    }

    #[test]
    fn test_empty_scheduler() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_run(), None);
        assert_eq!(scheduler.run_pending(at(1, 0, 0), |_| {}), 0);
    }
}
