use chrono::NaiveDate;

use super::{Appointment, AppointmentStatus, PenalizedAccount, QueueError};

pub trait AppointmentStore {
    fn query_by_date_before(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, QueueError>;

    /// Moves the listed appointments whose status is still in `guard` to
    /// `new_status`; returns how many rows changed.
    fn batch_update_status(
        &self,
        ids: &[u64],
        new_status: AppointmentStatus,
        guard: &[AppointmentStatus],
    ) -> Result<usize, QueueError>;

    /// Every appointment, latest date first, then latest time first.
    fn query_all(&self) -> Result<Vec<Appointment>, QueueError>;

    /// One page of [`query_all`](AppointmentStore::query_all), skipping the
    /// first `first_index` rows.
    fn query_page(&self, first_index: i64, limit: i64) -> Result<Vec<Appointment>, QueueError>;
}

pub trait PenaltyStore {
    fn get_account(&self, username: &str) -> Result<Option<PenalizedAccount>, QueueError>;

    fn save_account(&self, account: &PenalizedAccount) -> Result<(), QueueError>;
}
