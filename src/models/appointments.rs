use crate::{
    queue::{Appointment, AppointmentStatus},
    schema::appointments,
};
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::convert::TryFrom;

#[derive(Queryable)]
pub struct AppointmentData {
    pub aid: u64,
    pub username: String,
    pub did: String,
    pub sid: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub time_label: String,
    pub token: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub notes: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Insertable)]
#[table_name = "appointments"]
pub struct NewAppointment {
    pub username: String,
    pub did: String,
    pub sid: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub time_label: String,
    pub token: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub notes: Option<String>,
    pub specialization: Option<String>,
}

impl TryFrom<AppointmentData> for Appointment {
    type Error = anyhow::Error;

    fn try_from(data: AppointmentData) -> anyhow::Result<Self> {
        let status = data
            .status
            .trim()
            .parse::<AppointmentStatus>()
            .with_context(|| format!("Appointment {} is corrupt", data.aid))?;
        Ok(Appointment {
            aid: data.aid,
            username: data.username,
            did: data.did,
            sid: data.sid,
            date: data.date,
            time: data.time,
            time_label: data.time_label,
            token: data.token,
            status,
            created_at: data.created_at,
            notes: data.notes,
            specialization: data.specialization,
        })
    }
}
