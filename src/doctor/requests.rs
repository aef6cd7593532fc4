use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::{
    queue::AppointmentStatus,
    validate::{Validate, ValidationErrors},
};

const MAX_SLOT_CAPACITY: i32 = 200;

#[derive(Deserialize)]
pub struct AddTimeRequest {
    pub login_token: String,
    pub date: String,
    pub time: String,
    pub capacity: i32,
}

#[derive(Debug, PartialEq)]
pub struct NewSlotCommand {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub capacity: i32,
}

impl Validate for AddTimeRequest {
    type Command = NewSlotCommand;

    fn validate(self) -> Result<NewSlotCommand, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let date = errors.parse("date", crate::utils::parse_date_str(&self.date));
        let window = date.and_then(|date| {
            errors.parse("time", crate::utils::get_time_from_str(date, &self.time))
        });
        errors.check(
            (1..=MAX_SLOT_CAPACITY).contains(&self.capacity),
            "capacity",
            format!("must be between 1 and {}", MAX_SLOT_CAPACITY),
        );

        match window {
            Some((start_time, end_time)) if errors.is_empty() => Ok(NewSlotCommand {
                start_time,
                end_time,
                capacity: self.capacity,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Deserialize)]
pub struct CallNextRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct UpdateAppointRequest {
    pub login_token: String,
    pub aid: u64,
    pub status: String,
}

impl Validate for UpdateAppointRequest {
    type Command = (u64, AppointmentStatus);

    fn validate(self) -> Result<(u64, AppointmentStatus), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let status = errors.parse("status", self.status.parse::<AppointmentStatus>());
        match status {
            Some(status @ AppointmentStatus::Active)
            | Some(status @ AppointmentStatus::Delayed)
            | Some(status @ AppointmentStatus::Completed) => errors.into_result((self.aid, status)),
            Some(_) => {
                errors.add("status", "must be one of 'active', 'delayed', 'completed'");
                Err(errors)
            }
            None => Err(errors),
        }
    }
}

#[derive(Deserialize)]
pub struct SearchAppointRequest {
    pub login_token: String,
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_time(date: &str, time: &str, capacity: i32) -> AddTimeRequest {
        AddTimeRequest {
            login_token: "token".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            capacity,
        }
    }

    #[test]
    fn morning_slot_is_built_from_label() {
        let cmd = add_time("2024-08-10", "AM", 20).validate().unwrap();
        assert_eq!(cmd.start_time.to_string(), "2024-08-10 09:00:00");
        assert_eq!(cmd.end_time.to_string(), "2024-08-10 11:00:00");
        assert_eq!(cmd.capacity, 20);
    }

    #[test]
    fn every_bad_slot_field_is_reported() {
        let err = add_time("10/08/2024", "AM", 0).validate().unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["date", "capacity"]);

        let err = add_time("2024-08-10", "night", 10).validate().unwrap_err();
        assert_eq!(err.fields[0].field, "time");
    }

    #[test]
    fn doctors_cannot_cancel_or_mark_missed() {
        let update = |status: &str| UpdateAppointRequest {
            login_token: "token".to_string(),
            aid: 7,
            status: status.to_string(),
        };

        assert_eq!(
            update("completed").validate().unwrap(),
            (7, AppointmentStatus::Completed)
        );
        assert!(update("missed").validate().is_err());
        assert!(update("cancelled").validate().is_err());
        assert!(update("done").validate().is_err());
    }
}
