pub mod appointments;
pub mod penalties;
pub mod queue_states;
pub mod sessions;
pub mod slots;
