//! Appointment queue rules: status transitions, token progress and the
//! three-strike penalty. Everything here is pure; storage goes through the
//! traits in [`store`].

pub mod error;
pub mod feed;
pub mod penalty;
pub mod store;
pub mod sweep;
pub mod token;
pub mod transition;

use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::{fmt, str::FromStr};

pub use self::error::QueueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Upcoming,
    Active,
    Delayed,
    Completed,
    Cancelled,
    Missed,
}

/// Statuses the sweep may still move to `missed`.
pub const LIVE_STATUSES: [AppointmentStatus; 3] = [
    AppointmentStatus::Upcoming,
    AppointmentStatus::Active,
    AppointmentStatus::Delayed,
];

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "upcoming",
            AppointmentStatus::Active => "active",
            AppointmentStatus::Delayed => "delayed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Missed => "missed",
        }
    }

    pub fn is_live(self) -> bool {
        LIVE_STATUSES.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_live()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s {
            "upcoming" => AppointmentStatus::Upcoming,
            "active" => AppointmentStatus::Active,
            "delayed" => AppointmentStatus::Delayed,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            "missed" => AppointmentStatus::Missed,
            _ => bail!("Unknown appointment status '{}'", s),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub aid: u64,
    pub username: String,
    pub did: String,
    pub sid: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub time_label: String,
    pub token: i32,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub notes: Option<String>,
    pub specialization: Option<String>,
}

/// Serving counter of one doctor on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorQueueState {
    pub did: String,
    pub day: NaiveDate,
    pub serving: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PenalizedAccount {
    pub username: String,
    pub strikes: i32,
    pub blocked: bool,
    pub blocked_until: Option<NaiveDate>,
    pub last_missed: Option<NaiveDate>,
}

impl PenalizedAccount {
    pub fn new<S: Into<String>>(username: S) -> Self {
        Self {
            username: username.into(),
            strikes: 0,
            blocked: false,
            blocked_until: None,
            last_missed: None,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_appointment(aid: u64, date: &str, status: AppointmentStatus) -> Appointment {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Appointment {
        aid,
        username: format!("patient{}", aid),
        did: "d001".to_string(),
        sid: 1,
        date,
        time: NaiveTime::from_hms(9, 0, 0),
        time_label: "AM".to_string(),
        token: aid as i32,
        status,
        created_at: date.and_hms(0, 0, 0),
        notes: None,
        specialization: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_str_round_trips_through_storage_form() {
        for status in [
            AppointmentStatus::Upcoming,
            AppointmentStatus::Active,
            AppointmentStatus::Delayed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Missed,
        ]
        .iter()
        {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("finished".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn only_live_statuses_are_non_terminal() {
        assert!(AppointmentStatus::Upcoming.is_live());
        assert!(AppointmentStatus::Delayed.is_live());
        assert!(AppointmentStatus::Missed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
    }
}
