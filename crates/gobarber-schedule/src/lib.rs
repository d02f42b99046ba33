//! GoBarber Provider Schedule
//!
//! Calendar selection rules and the morning/afternoon split of a provider's
//! day. Pure functions of their inputs: callers pass in "today" and "now".

mod calendar;
mod day;

pub use calendar::{next_work_day, Calendar, SelectedDateText};
pub use day::{DaySchedule, ScheduledAppointment};
