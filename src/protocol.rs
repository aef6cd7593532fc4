use chrono::NaiveDate;
use serde::Serialize;

use crate::queue::{transition, Appointment, AppointmentStatus};

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            err: "".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct AppointmentItem {
    pub aid: u64,
    pub username: String,
    pub did: String,
    pub sid: u64,
    pub date: String,
    pub time: String,
    pub time_label: String,
    pub token: i32,
    pub status: AppointmentStatus,
    pub created_at: String,
    pub notes: Option<String>,
    pub specialization: Option<String>,
}

impl AppointmentItem {
    /// Renders with the status a reader should see on `today`.
    pub fn display(appo: Appointment, today: NaiveDate) -> Self {
        let status = transition::display_status(&appo, today);
        Self {
            aid: appo.aid,
            username: appo.username,
            did: appo.did,
            sid: appo.sid,
            date: crate::utils::format_date_str(&appo.date),
            time: appo.time.format("%H:%M").to_string(),
            time_label: appo.time_label,
            token: appo.token,
            status,
            created_at: crate::utils::format_time_str(&appo.created_at),
            notes: appo.notes,
            specialization: appo.specialization,
        }
    }
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $type {
                pub fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::test_appointment;

    #[test]
    fn stale_appointment_is_shown_missed_on_the_wire() {
        let today = crate::utils::parse_date_str("2024-08-10").unwrap();
        let appo = test_appointment(7, "2024-08-09", AppointmentStatus::Upcoming);

        let json = serde_json::to_value(AppointmentItem::display(appo, today)).unwrap();
        assert_eq!(json["status"], "missed");
        assert_eq!(json["date"], "2024-08-09");
        assert_eq!(json["time"], "09:00");
        assert_eq!(json["token"], 7);
    }

    #[test]
    fn error_response_keeps_message() {
        let json = serde_json::to_value(SimpleResponse::err("No such slot")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["err"], "No such slot");
    }
}
