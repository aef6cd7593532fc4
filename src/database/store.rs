use anyhow::Context;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::MysqlConnection;
use std::convert::TryFrom;

use crate::{
    models::{
        appointments::AppointmentData, penalties::PenaltyData, queue_states::QueueStateData,
    },
    queue::{
        feed::QueueFeed,
        store::{AppointmentStore, PenaltyStore},
        Appointment, AppointmentStatus, DoctorQueueState, PenalizedAccount, QueueError,
        LIVE_STATUSES,
    },
};

/// Diesel-backed stores over one connection. Run multi-step writes inside
/// `conn.transaction` so they commit or roll back together.
pub struct DbStore<'a> {
    conn: &'a MysqlConnection,
}

fn status_strs(statuses: &[AppointmentStatus]) -> Vec<&'static str> {
    statuses.iter().map(|status| status.as_str()).collect()
}

fn into_appointments(rows: Vec<AppointmentData>) -> anyhow::Result<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}

impl<'a> DbStore<'a> {
    pub fn new(conn: &'a MysqlConnection) -> Self {
        Self { conn }
    }

    pub fn find_appointment(&self, aid: u64) -> anyhow::Result<Option<Appointment>> {
        use crate::schema::appointments;

        let data = appointments::table
            .find(aid)
            .get_result::<AppointmentData>(self.conn)
            .optional()
            .context("DB error")?;
        data.map(Appointment::try_from).transpose()
    }

    pub fn set_status(&self, aid: u64, status: AppointmentStatus) -> anyhow::Result<()> {
        use crate::schema::appointments;

        diesel::update(appointments::table.find(aid))
            .set(appointments::status.eq(status.as_str()))
            .execute(self.conn)
            .context("DB error")?;
        Ok(())
    }

    /// A patient's appointments that render as `shown` on `today` (every one
    /// when `None`), latest first.
    pub fn query_by_patient(
        &self,
        username: &str,
        shown: Option<AppointmentStatus>,
        today: NaiveDate,
        first_index: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Appointment>> {
        use crate::schema::appointments;

        let mut query = appointments::table
            .filter(appointments::username.eq(username))
            .into_boxed();
        query = match shown {
            None => query,
            // stale live rows are displayed as missed before the sweep writes them
            Some(AppointmentStatus::Missed) => query.filter(
                appointments::status
                    .eq(AppointmentStatus::Missed.as_str())
                    .or(appointments::date
                        .lt(today)
                        .and(appointments::status.eq_any(status_strs(&LIVE_STATUSES)))),
            ),
            Some(status) if status.is_live() => query
                .filter(appointments::status.eq(status.as_str()))
                .filter(appointments::date.ge(today)),
            Some(status) => query.filter(appointments::status.eq(status.as_str())),
        };
        let rows = query
            .order((appointments::date.desc(), appointments::time.desc()))
            .offset(first_index)
            .limit(limit)
            .load::<AppointmentData>(self.conn)
            .context("DB error")?;
        into_appointments(rows)
    }

    /// Live appointments of a patient from `today` on, soonest first.
    pub fn query_upcoming_by_patient(
        &self,
        username: &str,
        today: NaiveDate,
    ) -> anyhow::Result<Vec<Appointment>> {
        use crate::schema::appointments;

        let rows = appointments::table
            .filter(appointments::username.eq(username))
            .filter(appointments::date.ge(today))
            .filter(appointments::status.eq_any(status_strs(&LIVE_STATUSES)))
            .order((appointments::date.asc(), appointments::time.asc()))
            .load::<AppointmentData>(self.conn)
            .context("DB error")?;
        into_appointments(rows)
    }

    pub fn query_by_doctor_day(&self, did: &str, day: NaiveDate) -> anyhow::Result<Vec<Appointment>> {
        use crate::schema::appointments;

        let rows = appointments::table
            .filter(appointments::did.eq(did))
            .filter(appointments::date.eq(day))
            .order(appointments::token.asc())
            .load::<AppointmentData>(self.conn)
            .context("DB error")?;
        into_appointments(rows)
    }

    pub fn find_by_token(
        &self,
        did: &str,
        day: NaiveDate,
        token: i32,
    ) -> anyhow::Result<Option<Appointment>> {
        use crate::schema::appointments;

        let data = appointments::table
            .filter(appointments::did.eq(did))
            .filter(appointments::date.eq(day))
            .filter(appointments::token.eq(token))
            .first::<AppointmentData>(self.conn)
            .optional()
            .context("DB error")?;
        data.map(Appointment::try_from).transpose()
    }

    /// Last token handed out for a doctor's day, 0 when nobody has booked.
    pub fn last_token(&self, did: &str, day: NaiveDate) -> anyhow::Result<i32> {
        use crate::schema::appointments;
        use diesel::dsl::max;

        let last = appointments::table
            .filter(appointments::did.eq(did))
            .filter(appointments::date.eq(day))
            .select(max(appointments::token))
            .get_result::<Option<i32>>(self.conn)
            .context("DB error")?;
        Ok(last.unwrap_or(0))
    }

    pub fn save_queue_state(&self, state: &DoctorQueueState) -> anyhow::Result<()> {
        use crate::schema::queue_states;

        diesel::replace_into(queue_states::table)
            .values(QueueStateData::from(state))
            .execute(self.conn)
            .context("DB error")?;
        Ok(())
    }

    pub fn search_accounts(
        &self,
        username_pattern: String,
        blocked_only: bool,
        first_index: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<PenalizedAccount>> {
        use crate::schema::penalties;

        let mut query = penalties::table
            .filter(penalties::username.like(username_pattern))
            .into_boxed();
        if blocked_only {
            query = query.filter(penalties::blocked.eq(true));
        }
        let rows = query
            .order(penalties::username.asc())
            .offset(first_index)
            .limit(limit)
            .load::<PenaltyData>(self.conn)
            .context("DB error")?;
        Ok(rows.into_iter().map(PenalizedAccount::from).collect())
    }
}

impl AppointmentStore for DbStore<'_> {
    fn query_by_date_before(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, QueueError> {
        use crate::schema::appointments;

        let rows = appointments::table
            .filter(appointments::date.lt(date))
            .filter(appointments::status.eq_any(status_strs(statuses)))
            .load::<AppointmentData>(self.conn)
            .map_err(QueueError::store)?;
        into_appointments(rows).map_err(QueueError::store)
    }

    fn batch_update_status(
        &self,
        ids: &[u64],
        new_status: AppointmentStatus,
        guard: &[AppointmentStatus],
    ) -> Result<usize, QueueError> {
        use crate::schema::appointments;

        diesel::update(
            appointments::table
                .filter(appointments::aid.eq_any(ids.to_vec()))
                .filter(appointments::status.eq_any(status_strs(guard))),
        )
        .set(appointments::status.eq(new_status.as_str()))
        .execute(self.conn)
        .map_err(QueueError::store)
    }

    fn query_all(&self) -> Result<Vec<Appointment>, QueueError> {
        use crate::schema::appointments;

        let rows = appointments::table
            .order((appointments::date.desc(), appointments::time.desc()))
            .load::<AppointmentData>(self.conn)
            .map_err(QueueError::store)?;
        into_appointments(rows).map_err(QueueError::store)
    }

    fn query_page(&self, first_index: i64, limit: i64) -> Result<Vec<Appointment>, QueueError> {
        use crate::schema::appointments;

        let rows = appointments::table
            .order((appointments::date.desc(), appointments::time.desc()))
            .offset(first_index)
            .limit(limit)
            .load::<AppointmentData>(self.conn)
            .map_err(QueueError::store)?;
        into_appointments(rows).map_err(QueueError::store)
    }
}

impl PenaltyStore for DbStore<'_> {
    fn get_account(&self, username: &str) -> Result<Option<PenalizedAccount>, QueueError> {
        use crate::schema::penalties;

        penalties::table
            .find(username)
            .get_result::<PenaltyData>(self.conn)
            .optional()
            .map(|data| data.map(PenalizedAccount::from))
            .map_err(QueueError::store)
    }

    fn save_account(&self, account: &PenalizedAccount) -> Result<(), QueueError> {
        use crate::schema::penalties;

        diesel::replace_into(penalties::table)
            .values(PenaltyData::from(account))
            .execute(self.conn)
            .map(|_| ())
            .map_err(QueueError::store)
    }
}

impl QueueFeed for DbStore<'_> {
    fn poll(&self, did: &str, day: NaiveDate) -> Result<Option<DoctorQueueState>, QueueError> {
        use crate::schema::queue_states;

        queue_states::table
            .filter(queue_states::did.eq(did))
            .filter(queue_states::day.eq(day))
            .first::<QueueStateData>(self.conn)
            .optional()
            .map(|data| data.map(DoctorQueueState::from))
            .map_err(QueueError::store)
    }
}
