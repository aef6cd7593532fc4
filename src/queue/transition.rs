use chrono::NaiveDate;
use log::debug;

use super::{Appointment, AppointmentStatus, QueueError};

impl AppointmentStatus {
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use super::AppointmentStatus::*;

        match (self, next) {
            (Upcoming, Active) | (Upcoming, Delayed) => true,
            (Active, Delayed) | (Active, Completed) => true,
            (Delayed, Active) | (Delayed, Completed) => true,
            (Upcoming, Cancelled) | (Active, Cancelled) | (Delayed, Cancelled) => true,
            (Upcoming, Missed) | (Active, Missed) | (Delayed, Missed) => true,
            _ => false,
        }
    }
}

/// Appointments picked by one sweep pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MissedSet {
    pub appointments: Vec<Appointment>,
}

impl MissedSet {
    pub fn ids(&self) -> Vec<u64> {
        self.appointments.iter().map(|appo| appo.aid).collect()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }
}

/// An appointment whose day has passed while it was still live.
///
/// Granularity is the calendar date: nothing scheduled for `today` is ever
/// stale, whatever the time of day.
pub fn is_stale(appointment: &Appointment, today: NaiveDate) -> bool {
    appointment.date < today && appointment.status.is_live()
}

pub fn sweep<'a, I>(today: NaiveDate, appointments: I) -> MissedSet
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let appointments = appointments
        .into_iter()
        .filter(|appo| is_stale(appo, today))
        .cloned()
        .collect();
    MissedSet { appointments }
}

/// Status shown to a reader, with the sweep rule applied without persisting it.
pub fn display_status(appointment: &Appointment, today: NaiveDate) -> AppointmentStatus {
    if is_stale(appointment, today) {
        AppointmentStatus::Missed
    } else {
        appointment.status
    }
}

pub fn transition(appointment: &mut Appointment, next: AppointmentStatus) -> Result<(), QueueError> {
    if !appointment.status.can_transition_to(next) {
        return Err(QueueError::InvalidTransition {
            from: appointment.status,
            to: next,
        });
    }

    debug!(
        "appointment {}: {} -> {}",
        appointment.aid, appointment.status, next
    );
    appointment.status = next;
    Ok(())
}

/// A change requested by a patient or doctor on `today`.
///
/// A live appointment whose day has passed already counts as missed, even
/// before a sweep has written it; only the sweep may move it, so the patient
/// still takes the strike.
pub fn apply(
    appointment: &mut Appointment,
    next: AppointmentStatus,
    today: NaiveDate,
) -> Result<(), QueueError> {
    if is_stale(appointment, today) {
        return Err(QueueError::InvalidTransition {
            from: AppointmentStatus::Missed,
            to: next,
        });
    }
    transition(appointment, next)
}

pub fn cancel(appointment: &mut Appointment, today: NaiveDate) -> Result<(), QueueError> {
    apply(appointment, AppointmentStatus::Cancelled, today)
}

pub fn complete(appointment: &mut Appointment, today: NaiveDate) -> Result<(), QueueError> {
    apply(appointment, AppointmentStatus::Completed, today)
}

pub fn start(appointment: &mut Appointment, today: NaiveDate) -> Result<(), QueueError> {
    apply(appointment, AppointmentStatus::Active, today)
}

pub fn delay(appointment: &mut Appointment, today: NaiveDate) -> Result<(), QueueError> {
    apply(appointment, AppointmentStatus::Delayed, today)
}
