use serde::Serialize;

use super::{Appointment, DoctorQueueState, QueueError};

pub const DEFAULT_MINUTES_PER_TOKEN: i32 = 5;
pub const YOUR_TURN_LABEL: &str = "It's your turn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    pub wait_label: String,
    pub wait_minutes: i64,
    pub is_your_turn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenProgress {
    pub current_serving: i32,
    pub wait_label: String,
    pub is_your_turn: bool,
}

pub fn check_minutes_per_token(avg_minutes_per_token: i32) -> Result<(), QueueError> {
    if avg_minutes_per_token <= 0 {
        return Err(QueueError::InvalidConfiguration(format!(
            "minutes per token must be positive, got {}",
            avg_minutes_per_token
        )));
    }
    Ok(())
}

/// Linear wait estimate from the latest serving counter. A counter that has
/// passed the token (a skipped slot) also counts as the patient's turn.
pub fn estimate(
    your_token: i32,
    current_serving: i32,
    avg_minutes_per_token: i32,
) -> Result<Estimate, QueueError> {
    check_minutes_per_token(avg_minutes_per_token)?;
    if current_serving < 0 {
        return Err(QueueError::InvalidConfiguration(format!(
            "serving counter cannot be negative, got {}",
            current_serving
        )));
    }

    if current_serving >= your_token {
        return Ok(Estimate {
            wait_label: YOUR_TURN_LABEL.to_string(),
            wait_minutes: 0,
            is_your_turn: true,
        });
    }

    let ahead = i64::from(your_token) - i64::from(current_serving);
    let wait_minutes = ahead * i64::from(avg_minutes_per_token);
    Ok(Estimate {
        wait_label: format_wait(wait_minutes),
        wait_minutes,
        is_your_turn: false,
    })
}

pub fn format_wait(minutes: i64) -> String {
    if minutes < 60 {
        format!("~{} min", minutes)
    } else if minutes % 60 == 0 {
        format!("~{} hr", minutes / 60)
    } else {
        format!("~{} hr {} min", minutes / 60, minutes % 60)
    }
}

/// `state` is `None` until the doctor calls the first token of the day.
pub fn token_progress(
    appointment: &Appointment,
    state: Option<&DoctorQueueState>,
    avg_minutes_per_token: i32,
) -> Result<TokenProgress, QueueError> {
    let current_serving = match state {
        Some(state) if state.did != appointment.did || state.day != appointment.date => {
            return Err(QueueError::InvalidConfiguration(format!(
                "queue state of {} on {} does not match appointment {}",
                state.did, state.day, appointment.aid
            )));
        }
        Some(state) => state.serving,
        None => 0,
    };

    let estimate = estimate(appointment.token, current_serving, avg_minutes_per_token)?;
    Ok(TokenProgress {
        current_serving,
        wait_label: estimate.wait_label,
        is_your_turn: estimate.is_your_turn,
    })
}
