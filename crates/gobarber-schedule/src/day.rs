//! A provider's appointments for one day

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::Serialize;

use gobarber_api::Appointment;

/// Appointments up to and including this local hour count as morning.
const MORNING_LAST_HOUR: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledAppointment {
    pub appointment: Appointment,
    pub local_time: NaiveDateTime,
    /// `HH:mm` in local time
    pub formatted_hour: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DaySchedule {
    pub morning: Vec<ScheduledAppointment>,
    pub afternoon: Vec<ScheduledAppointment>,
    /// First appointment still ahead of `now`
    pub next_appointment: Option<ScheduledAppointment>,
}

impl DaySchedule {
    /// Split appointments in backend order. `tz` is the viewer's zone.
    pub fn build<Tz: TimeZone>(
        appointments: Vec<Appointment>,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Self {
        let mut schedule = DaySchedule::default();

        for appointment in appointments {
            let local_time = appointment.date.with_timezone(tz).naive_local();
            let is_upcoming = appointment.date > now;
            let scheduled = ScheduledAppointment {
                formatted_hour: local_time.format("%H:%M").to_string(),
                local_time,
                appointment,
            };

            if is_upcoming && schedule.next_appointment.is_none() {
                schedule.next_appointment = Some(scheduled.clone());
            }

            if local_time.hour() <= MORNING_LAST_HOUR {
                schedule.morning.push(scheduled);
            } else {
                schedule.afternoon.push(scheduled);
            }
        }

        schedule
    }

    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.afternoon.is_empty()
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len()
    }
}
