use chrono::NaiveDate;
use log::{info, warn};

use super::{
    penalty::{self, PenaltyPolicy},
    store::{AppointmentStore, PenaltyStore},
    transition, AppointmentStatus, PenalizedAccount, QueueError, LIVE_STATUSES,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub missed: Vec<u64>,
    /// Patients blocked during this pass.
    pub blocked: Vec<String>,
}

/// Marks every stale appointment missed and strikes its patient once.
///
/// Callers run this inside one store transaction: an `Err` must discard every
/// write made so far. Re-running after a failure is safe, rows that were
/// already marked no longer match the sweep predicate.
pub fn run_sweep<S>(store: &S, today: NaiveDate, policy: &PenaltyPolicy) -> Result<SweepReport, QueueError>
where
    S: AppointmentStore + PenaltyStore,
{
    let candidates = store.query_by_date_before(today, &LIVE_STATUSES)?;
    let mut missed = transition::sweep(today, &candidates);
    if missed.is_empty() {
        return Ok(SweepReport::default());
    }
    missed.appointments.sort_by_key(|appo| (appo.date, appo.time, appo.aid));

    let ids = missed.ids();
    let updated = store.batch_update_status(&ids, AppointmentStatus::Missed, &LIVE_STATUSES)?;
    if updated != ids.len() {
        return Err(QueueError::StoreUnavailable(format!(
            "sweep updated {} of {} appointments, another writer got there first",
            updated,
            ids.len()
        )));
    }

    let mut report = SweepReport {
        missed: ids,
        blocked: vec![],
    };
    for appo in missed.appointments.iter() {
        let account = store
            .get_account(&appo.username)?
            .unwrap_or_else(|| PenalizedAccount::new(appo.username.as_str()));
        let was_blocked = account.blocked;
        let account = penalty::on_missed(account, appo.date, today, policy);
        store.save_account(&account)?;

        if account.blocked && !was_blocked {
            report.blocked.push(account.username);
        }
    }

    info!(
        "sweep on {}: {} appointments missed, {} accounts blocked",
        today,
        report.missed.len(),
        report.blocked.len()
    );
    Ok(report)
}

/// Outcome of a sweep run as part of rendering a page.
///
/// A failed sweep degrades to an empty report plus a warning; the next page
/// load tries again.
pub fn sweep_or_warn<F>(run: F) -> (SweepReport, Option<String>)
where
    F: FnOnce() -> anyhow::Result<SweepReport>,
{
    match run() {
        Ok(report) => (report, None),
        Err(err) => {
            warn!("sweep skipped: {:#}", err);
            (
                SweepReport::default(),
                Some(format!("Missed-appointment sweep failed: {}", err)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{test_appointment, Appointment, AppointmentStatus::*};
    use std::{cell::RefCell, collections::HashMap};

    #[derive(Default)]
    struct MemoryStore {
        appointments: RefCell<Vec<Appointment>>,
        accounts: RefCell<HashMap<String, PenalizedAccount>>,
        fail_updates: bool,
        fail_saves: bool,
    }

    impl MemoryStore {
        fn with(appointments: Vec<Appointment>) -> Self {
            Self {
                appointments: RefCell::new(appointments),
                ..Default::default()
            }
        }

        fn status_of(&self, aid: u64) -> AppointmentStatus {
            self.appointments
                .borrow()
                .iter()
                .find(|appo| appo.aid == aid)
                .map(|appo| appo.status)
                .unwrap()
        }
    }

    impl AppointmentStore for MemoryStore {
        fn query_by_date_before(
            &self,
            date: NaiveDate,
            statuses: &[AppointmentStatus],
        ) -> Result<Vec<Appointment>, QueueError> {
            Ok(self
                .appointments
                .borrow()
                .iter()
                .filter(|appo| appo.date < date && statuses.contains(&appo.status))
                .cloned()
                .collect())
        }

        fn batch_update_status(
            &self,
            ids: &[u64],
            new_status: AppointmentStatus,
            guard: &[AppointmentStatus],
        ) -> Result<usize, QueueError> {
            if self.fail_updates {
                return Err(QueueError::StoreUnavailable("connection reset".to_string()));
            }
            let mut updated = 0;
            for appo in self.appointments.borrow_mut().iter_mut() {
                if ids.contains(&appo.aid) && guard.contains(&appo.status) {
                    appo.status = new_status;
                    updated += 1;
                }
            }
            Ok(updated)
        }

        fn query_all(&self) -> Result<Vec<Appointment>, QueueError> {
            let mut all = self.appointments.borrow().clone();
            all.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
            Ok(all)
        }

        fn query_page(&self, first_index: i64, limit: i64) -> Result<Vec<Appointment>, QueueError> {
            Ok(self
                .query_all()?
                .into_iter()
                .skip(first_index as usize)
                .take(limit as usize)
                .collect())
        }
    }

    impl PenaltyStore for MemoryStore {
        fn get_account(&self, username: &str) -> Result<Option<PenalizedAccount>, QueueError> {
            Ok(self.accounts.borrow().get(username).cloned())
        }

        fn save_account(&self, account: &PenalizedAccount) -> Result<(), QueueError> {
            if self.fail_saves {
                return Err(QueueError::StoreUnavailable("lock wait timeout".to_string()));
            }
            self.accounts
                .borrow_mut()
                .insert(account.username.clone(), account.clone());
            Ok(())
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn sweep_marks_missed_and_strikes_patients() {
        let store = MemoryStore::with(vec![
            test_appointment(1, "2024-08-01", Upcoming),
            test_appointment(2, "2024-08-10", Upcoming),
            test_appointment(3, "2024-08-02", Completed),
        ]);

        let report = run_sweep(&store, day("2024-08-10"), &PenaltyPolicy::default()).unwrap();

        assert_eq!(report.missed, vec![1]);
        assert_eq!(store.status_of(1), Missed);
        assert_eq!(store.status_of(2), Upcoming);
        assert_eq!(store.status_of(3), Completed);
        assert_eq!(store.accounts.borrow()["patient1"].strikes, 1);
        assert!(store.accounts.borrow().get("patient2").is_none());
    }

    #[test]
    fn second_sweep_is_a_no_op() {
        let store = MemoryStore::with(vec![test_appointment(1, "2024-08-01", Active)]);
        let policy = PenaltyPolicy::default();

        run_sweep(&store, day("2024-08-10"), &policy).unwrap();
        let again = run_sweep(&store, day("2024-08-10"), &policy).unwrap();

        assert_eq!(again, SweepReport::default());
        assert_eq!(store.accounts.borrow()["patient1"].strikes, 1);
    }

    #[test]
    fn third_missed_appointment_blocks_in_one_pass() {
        let mut appos = vec![
            test_appointment(1, "2024-08-01", Upcoming),
            test_appointment(2, "2024-08-03", Delayed),
            test_appointment(3, "2024-08-02", Upcoming),
        ];
        for appo in appos.iter_mut() {
            appo.username = "frank".to_string();
        }
        let store = MemoryStore::with(appos);

        let report = run_sweep(&store, day("2024-08-10"), &PenaltyPolicy::default()).unwrap();

        assert_eq!(report.missed, vec![1, 3, 2]);
        assert_eq!(report.blocked, vec!["frank".to_string()]);
        let account = store.accounts.borrow()["frank"].clone();
        assert_eq!(account.strikes, 3);
        assert_eq!(account.last_missed, Some(day("2024-08-03")));
        assert_eq!(account.blocked_until, Some(day("2024-08-24")));
    }

    #[test]
    fn failed_update_surfaces_store_error() {
        let mut store = MemoryStore::with(vec![test_appointment(1, "2024-08-01", Upcoming)]);
        store.fail_updates = true;

        let err = run_sweep(&store, day("2024-08-10"), &PenaltyPolicy::default()).unwrap_err();
        assert!(matches!(err, QueueError::StoreUnavailable(_)));
        assert!(store.accounts.borrow().is_empty());
    }

    #[test]
    fn failed_strike_after_update_is_still_reported() {
        let mut store = MemoryStore::with(vec![test_appointment(1, "2024-08-01", Upcoming)]);
        store.fail_saves = true;

        let err = run_sweep(&store, day("2024-08-10"), &PenaltyPolicy::default()).unwrap_err();
        assert!(matches!(err, QueueError::StoreUnavailable(_)));
        assert!(store.accounts.borrow().is_empty());
        // The memory store has no rollback, so the status write stays. A real
        // store runs the sweep in one transaction and discards it on this error.
        assert_eq!(store.status_of(1), Missed);
    }

    #[test]
    fn listing_pages_latest_first() {
        let store = MemoryStore::with(vec![
            test_appointment(1, "2024-08-01", Completed),
            test_appointment(2, "2024-08-03", Upcoming),
            test_appointment(3, "2024-08-02", Cancelled),
            test_appointment(4, "2024-08-04", Upcoming),
        ]);

        let ids = |page: Vec<Appointment>| page.iter().map(|appo| appo.aid).collect::<Vec<_>>();
        assert_eq!(ids(store.query_page(0, 2).unwrap()), vec![4, 2]);
        assert_eq!(ids(store.query_page(2, 2).unwrap()), vec![3, 1]);
        assert!(store.query_page(4, 2).unwrap().is_empty());
    }

    #[test]
    fn failed_sweep_degrades_to_warning() {
        let (report, warning) = sweep_or_warn(|| {
            Err(QueueError::StoreUnavailable("timeout".to_string()).into())
        });

        assert_eq!(report, SweepReport::default());
        assert!(warning.unwrap().contains("timeout"));
    }
}
