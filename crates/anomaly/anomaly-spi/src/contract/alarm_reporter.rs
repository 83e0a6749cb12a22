//! Reporting collaborator.

use crate::error::Result;
use crate::model::Alarm;

/// Receives completed alarms. Delivery and paging live behind this trait.
pub trait AlarmReporter: Send + Sync {
    fn report(&self, alarms: &[Alarm]) -> Result<()>;
}
