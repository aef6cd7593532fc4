use crate::schema::slots;
use chrono::NaiveDateTime;

#[derive(Queryable)]
pub struct SlotData {
    pub sid: u64,
    pub did: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub capacity: i32,
    pub appointed: i32,
}

#[derive(Insertable)]
#[table_name = "slots"]
pub struct NewSlot {
    pub did: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub capacity: i32,
}

pub const TIME_AM: &str = "AM";
pub const TIME_PM: &str = "PM";
