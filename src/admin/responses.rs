use serde::Serialize;

use crate::protocol::AppointmentItem;

#[derive(Default, Serialize)]
pub struct SweepResponse {
    pub success: bool,
    pub err: String,
    pub missed: Vec<u64>,
    pub blocked: Vec<String>,
    /// Set when the sweep could not be written; nothing was changed.
    pub warning: Option<String>,
}

#[derive(Default, Serialize)]
pub struct SearchAppointResponse {
    pub success: bool,
    pub err: String,
    pub warning: Option<String>,
    pub appointments: Vec<AppointmentItem>,
}

#[derive(Default, Serialize)]
pub struct SearchPenaltyItem {
    pub username: String,
    pub strikes: i32,
    pub blocked: bool,
    pub blocked_until: Option<String>,
    pub last_missed: Option<String>,
}

#[derive(Default, Serialize)]
pub struct SearchPenaltyResponse {
    pub success: bool,
    pub err: String,
    pub warning: Option<String>,
    pub accounts: Vec<SearchPenaltyItem>,
}

crate::impl_err_response! {
    SweepResponse,
    SearchAppointResponse,
    SearchPenaltyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_listing_carries_sweep_warning() {
        let response = SearchPenaltyResponse {
            success: true,
            warning: Some("Missed-appointment sweep failed: timeout".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["warning"], "Missed-appointment sweep failed: timeout");
        assert!(json["accounts"].as_array().unwrap().is_empty());
    }
}
