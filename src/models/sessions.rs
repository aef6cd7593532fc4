use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct SessionData {
    pub token_hash: String,
    pub account: String,
    pub role: String,
    pub login_time: NaiveDateTime,
}
