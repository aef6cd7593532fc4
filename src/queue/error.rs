use super::AppointmentStatus;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Appointment cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl QueueError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        QueueError::StoreUnavailable(err.to_string())
    }
}
