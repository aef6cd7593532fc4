use anyhow::bail;

use super::store::DbStore;
use crate::queue::Appointment;

pub fn assert_patient_appoint(
    store: &DbStore,
    username: &str,
    aid: u64,
) -> anyhow::Result<Appointment> {
    match store.find_appointment(aid)? {
        Some(appo) if appo.username == username => Ok(appo),
        _ => bail!("No such appointment"),
    }
}

pub fn assert_doctor_appoint(store: &DbStore, did: &str, aid: u64) -> anyhow::Result<Appointment> {
    match store.find_appointment(aid)? {
        Some(appo) if appo.did == did => Ok(appo),
        _ => bail!("No such appointment"),
    }
}
