pub mod job;
pub mod time_period;

pub use job::{ApplicationStatus, Job, JobType, JOB};
pub use time_period::{TimePeriod, TIME_PERIOD};

use crate::database::schema::RecordClass;

/// Every record class the application persists, in dependency order.
pub static RECORD_CLASSES: &[&RecordClass] = &[&TIME_PERIOD, &JOB];
