use serde::Serialize;

use crate::protocol::AppointmentItem;

#[derive(Default, Serialize)]
pub struct AddTimeResponse {
    pub success: bool,
    pub err: String,
    pub sid: u64,
}

#[derive(Default, Serialize)]
pub struct CallNextResponse {
    pub success: bool,
    pub err: String,
    pub serving: i32,
    /// Appointment started by this call, if the token was booked and live.
    pub aid: Option<u64>,
}

#[derive(Default, Serialize)]
pub struct SearchAppointResponse {
    pub success: bool,
    pub err: String,
    pub serving: i32,
    pub appointments: Vec<AppointmentItem>,
}

crate::impl_err_response! {
    AddTimeResponse,
    CallNextResponse,
    SearchAppointResponse,
}
