//! Calendar selection
//!
//! Providers work Tuesday to Saturday. Sundays and Mondays can never be
//! picked, and neither can days the backend reports as fully booked.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use gobarber_api::MonthAvailabilityItem;

/// First day the dashboard shows: today, unless today is Sunday or Monday.
pub fn next_work_day(today: NaiveDate) -> NaiveDate {
    match today.weekday() {
        Weekday::Sun | Weekday::Mon => today.succ_opt().unwrap_or(today),
        _ => today,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedDateText {
    pub is_today: bool,
    /// e.g. "2nd of June"
    pub day_of_month: String,
    /// e.g. "Tuesday"
    pub day_of_week: String,
}

#[derive(Debug, Clone)]
pub struct Calendar {
    today: NaiveDate,
    selected_date: NaiveDate,
    /// Always the first day of the month
    selected_month: NaiveDate,
    month_availability: Vec<MonthAvailabilityItem>,
}

impl Calendar {
    pub fn new(today: NaiveDate) -> Self {
        let start = next_work_day(today);

        Self {
            today,
            selected_date: start,
            selected_month: first_of_month(start),
            month_availability: Vec::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn selected_month(&self) -> NaiveDate {
        self.selected_month
    }

    /// Replace the availability list for the selected month.
    pub fn set_month_availability(&mut self, items: Vec<MonthAvailabilityItem>) {
        self.month_availability = items;
    }

    /// Days of the selected month the backend reported as unavailable.
    pub fn disabled_days(&self) -> Vec<NaiveDate> {
        self.month_availability
            .iter()
            .filter(|item| !item.available)
            .filter_map(|item| {
                NaiveDate::from_ymd_opt(
                    self.selected_month.year(),
                    self.selected_month.month(),
                    item.day,
                )
            })
            .collect()
    }

    /// Monday to Saturday.
    pub fn is_available(&self, day: NaiveDate) -> bool {
        day.weekday() != Weekday::Sun
    }

    pub fn is_disabled(&self, day: NaiveDate) -> bool {
        matches!(day.weekday(), Weekday::Sun | Weekday::Mon)
            || first_of_month(day) < first_of_month(self.today)
            || self.disabled_days().contains(&day)
    }

    /// Returns whether the day was selected.
    pub fn select_day(&mut self, day: NaiveDate) -> bool {
        if self.is_available(day) && !self.is_disabled(day) {
            self.selected_date = day;
            true
        } else {
            false
        }
    }

    /// Move the visible month. Months before the current one are refused.
    /// The availability list is cleared until the new month is loaded.
    pub fn change_month(&mut self, month: NaiveDate) -> bool {
        let month = first_of_month(month);
        if month < first_of_month(self.today) {
            return false;
        }

        if month != self.selected_month {
            self.selected_month = month;
            self.month_availability.clear();
        }
        true
    }

    pub fn selected_date_text(&self) -> SelectedDateText {
        let date = self.selected_date;

        SelectedDateText {
            is_today: date == self.today,
            day_of_month: format!(
                "{}{} of {}",
                date.day(),
                ordinal_suffix(date.day()),
                date.format("%B")
            ),
            day_of_week: date.format("%A").to_string(),
        }
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
