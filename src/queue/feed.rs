use chrono::NaiveDate;

use super::{DoctorQueueState, QueueError};

/// Source of serving counters for the token estimator.
///
/// Readers poll for the latest state on every request; nothing here knows
/// about the estimator or about clocks. The polled state is the only source
/// of the counter, and only [`advance`] moves it.
pub trait QueueFeed {
    fn poll(&self, did: &str, day: NaiveDate) -> Result<Option<DoctorQueueState>, QueueError>;
}

/// Next serving state after the doctor calls the next token. Counters are
/// kept per day, so the first call of a day serves token 1.
pub fn advance(current: Option<DoctorQueueState>, did: &str, day: NaiveDate) -> DoctorQueueState {
    match current {
        Some(state) if state.did == did && state.day == day => DoctorQueueState {
            serving: state.serving.max(0) + 1,
            ..state
        },
        _ => DoctorQueueState {
            did: did.to_string(),
            day,
            serving: 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn state(did: &str, on: &str, serving: i32) -> DoctorQueueState {
        DoctorQueueState {
            did: did.to_string(),
            day: day(on),
            serving,
        }
    }

    #[test]
    fn first_call_of_the_day_serves_token_one() {
        assert_eq!(advance(None, "d001", day("2024-08-10")), state("d001", "2024-08-10", 1));

        let yesterday = state("d001", "2024-08-09", 17);
        assert_eq!(
            advance(Some(yesterday), "d001", day("2024-08-10")),
            state("d001", "2024-08-10", 1)
        );
    }

    #[test]
    fn calls_advance_by_one() {
        let current = state("d001", "2024-08-10", 4);
        assert_eq!(
            advance(Some(current), "d001", day("2024-08-10")).serving,
            5
        );
    }

    #[test]
    fn corrupt_negative_counter_restarts_at_one() {
        let current = state("d001", "2024-08-10", -40);
        assert_eq!(
            advance(Some(current), "d001", day("2024-08-10")).serving,
            1
        );
    }
}
