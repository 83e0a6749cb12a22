//! Contract definitions for anomaly detection collaborators.

mod alarm_reporter;
mod diagnoser;
mod pool_store;

pub use alarm_reporter::AlarmReporter;
pub use diagnoser::Diagnoser;
pub use pool_store::PoolStore;
