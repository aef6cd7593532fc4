use serde::Serialize;

use crate::protocol::AppointmentItem;

#[derive(Default, Serialize)]
pub struct AppointResponse {
    pub success: bool,
    pub err: String,
    pub aid: u64,
    pub token: i32,
}

#[derive(Default, Serialize)]
pub struct SearchAppointResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<AppointmentItem>,
}

#[derive(Default, Serialize)]
pub struct TokenProgressResponse {
    pub success: bool,
    pub err: String,
    pub aid: u64,
    pub token: i32,
    pub current_serving: i32,
    pub wait_label: String,
    pub is_your_turn: bool,
}

#[derive(Default, Serialize)]
pub struct PenaltyItem {
    pub strikes: i32,
    pub blocked: bool,
    pub blocked_until: Option<String>,
    pub can_book: bool,
}

/// Each section renders on its own; a failed read leaves its section empty
/// and sets its error string.
#[derive(Default, Serialize)]
pub struct ViewDashboardResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<AppointmentItem>,
    pub appointments_err: String,
    pub penalty: Option<PenaltyItem>,
    pub penalty_err: String,
}

crate::impl_err_response! {
    AppointResponse,
    SearchAppointResponse,
    TokenProgressResponse,
    ViewDashboardResponse,
}
