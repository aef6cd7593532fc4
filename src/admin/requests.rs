use serde::Deserialize;

use crate::validate::{Validate, ValidationErrors};

#[derive(Deserialize)]
pub struct SweepRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct SearchAppointRequest {
    pub login_token: String,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchPenaltyRequest {
    pub login_token: String,
    pub username: Option<String>,
    #[serde(default)]
    pub blocked_only: bool,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

/// Body of both `/reset_strikes` and `/unblock`.
#[derive(Deserialize)]
pub struct PenaltyRequest {
    pub login_token: String,
    pub username: String,
}

impl Validate for PenaltyRequest {
    type Command = String;

    fn validate(self) -> Result<String, ValidationErrors> {
        let username = self.username.trim().to_string();
        let mut errors = ValidationErrors::default();
        errors.check(!username.is_empty(), "username", "must not be empty");
        errors.into_result(username)
    }
}
