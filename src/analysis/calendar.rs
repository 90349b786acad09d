use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Saturday and Sunday, by the local calendar. No holiday awareness.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Signed number of calendar days from `start` to `end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

/// Counts weekdays in `[start, end]` inclusive; zero when `end < start`.
pub fn count_weekdays(start: NaiveDate, end: NaiveDate) -> usize {
    days_in(start, end).filter(|day| !is_weekend(*day)).count()
}

/// Every calendar day in `[start, end]` inclusive.
pub fn days_in(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let len = days_between(start, end).max(-1) + 1;
    (0..len as u64).filter_map(move |offset| start.checked_add_days(Days::new(offset)))
}
