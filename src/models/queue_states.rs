use crate::{queue::DoctorQueueState, schema::queue_states};
use chrono::NaiveDate;

#[derive(Queryable, Insertable)]
#[table_name = "queue_states"]
pub struct QueueStateData {
    pub did: String,
    pub day: NaiveDate,
    pub serving: i32,
}

impl From<QueueStateData> for DoctorQueueState {
    fn from(data: QueueStateData) -> Self {
        DoctorQueueState {
            did: data.did,
            day: data.day,
            serving: data.serving,
        }
    }
}

impl From<&DoctorQueueState> for QueueStateData {
    fn from(state: &DoctorQueueState) -> Self {
        QueueStateData {
            did: state.did.clone(),
            day: state.day,
            serving: state.serving,
        }
    }
}
