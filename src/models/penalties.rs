use crate::{queue::PenalizedAccount, schema::penalties};
use chrono::NaiveDate;

#[derive(Queryable, Insertable)]
#[table_name = "penalties"]
pub struct PenaltyData {
    pub username: String,
    pub strikes: i32,
    pub blocked: bool,
    pub blocked_until: Option<NaiveDate>,
    pub last_missed: Option<NaiveDate>,
}

impl From<PenaltyData> for PenalizedAccount {
    fn from(data: PenaltyData) -> Self {
        PenalizedAccount {
            username: data.username,
            strikes: data.strikes,
            blocked: data.blocked,
            blocked_until: data.blocked_until,
            last_missed: data.last_missed,
        }
    }
}

impl From<&PenalizedAccount> for PenaltyData {
    fn from(account: &PenalizedAccount) -> Self {
        PenaltyData {
            username: account.username.clone(),
            strikes: account.strikes,
            blocked: account.blocked,
            blocked_until: account.blocked_until,
            last_missed: account.last_missed,
        }
    }
}
