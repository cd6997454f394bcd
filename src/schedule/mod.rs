//! Match scheduling views
//!
//! Groups matches by event day and status for display.

pub mod buckets;
pub mod clock;
pub mod event_day;

pub use buckets::{DayBucket, DaySchedule};
pub use clock::format_time_12h;
pub use event_day::EventDay;
