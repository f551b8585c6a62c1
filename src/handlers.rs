pub mod auth;
pub mod health;
pub mod notes;
pub mod progress;
pub mod subjects;
pub mod topics;
pub mod units;
