use serde::Deserialize;

use crate::validate::{check_text_len, Validate, ValidationErrors};

const MAX_NOTES_LEN: usize = 500;
const MAX_SPECIALIZATION_LEN: usize = 64;

#[derive(Deserialize)]
pub struct AppointRequest {
    pub login_token: String,
    pub sid: u64,
    pub notes: Option<String>,
    pub specialization: Option<String>,
}

/// A booking that passed field validation.
#[derive(Debug, PartialEq)]
pub struct BookCommand {
    pub sid: u64,
    pub notes: Option<String>,
    pub specialization: Option<String>,
}

impl Validate for AppointRequest {
    type Command = BookCommand;

    fn validate(self) -> Result<BookCommand, ValidationErrors> {
        let notes = self.notes.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let specialization = self
            .specialization
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut errors = ValidationErrors::default();
        errors.check(self.sid > 0, "sid", "must refer to a slot");
        check_text_len(&mut errors, "notes", notes.as_deref(), MAX_NOTES_LEN);
        check_text_len(
            &mut errors,
            "specialization",
            specialization.as_deref(),
            MAX_SPECIALIZATION_LEN,
        );

        errors.into_result(BookCommand {
            sid: self.sid,
            notes,
            specialization,
        })
    }
}

#[derive(Deserialize)]
pub struct CancelAppointRequest {
    pub login_token: String,
    pub aid: u64,
}

#[derive(Deserialize)]
pub struct SearchAppointRequest {
    pub login_token: String,
    pub status: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct TokenProgressRequest {
    pub login_token: String,
    pub aid: u64,
}

#[derive(Deserialize)]
pub struct ViewDashboardRequest {
    pub login_token: String,
}
