use crate::analysis::calendar::{days_in, is_weekend};
use crate::analysis::BurndownError;
use chrono::NaiveDate;

/// Generates the ideal burndown line for a cycle.
///
/// Work is assumed to happen on each weekday from `start` up to the day
/// before `end`, burning `initial_points / num_weekdays` per weekday. One
/// value is emitted per calendar day in `[start, end]` plus a closing point
/// after `end`. Weekend days produce a flat step when `include_weekends` is
/// set and are skipped entirely otherwise.
///
/// Values are rounded to two decimals so small point totals do not produce
/// a jagged line. No clamping is applied: a miscounted `num_weekdays` can
/// push the tail below zero.
pub fn generate_ideal(
    start: NaiveDate,
    end: NaiveDate,
    initial_points: f64,
    num_weekdays: usize,
    include_weekends: bool,
) -> Result<Vec<f64>, BurndownError> {
    if end < start {
        return Err(BurndownError::MalformedCycle { start, end });
    }
    if num_weekdays == 0 {
        return Err(BurndownError::DivideByZeroWeekdays { start, end });
    }

    let points_per_day = initial_points / num_weekdays as f64;
    let burns_work = |day: NaiveDate| day < end && !is_weekend(day);

    let mut ideal = vec![initial_points];
    let mut current = initial_points;
    let mut previous: Option<NaiveDate> = None;

    for day in days_in(start, end).filter(|day| include_weekends || !is_weekend(*day)) {
        if let Some(prev) = previous {
            if burns_work(prev) {
                current -= points_per_day;
            }
            ideal.push(current);
        }
        previous = Some(day);
    }

    // Closing point, one step after the last emitted day.
    if let Some(prev) = previous {
        if burns_work(prev) {
            current -= points_per_day;
        }
        ideal.push(current);
    }

    Ok(ideal.into_iter().map(round_to_cents).collect())
}

fn round_to_cents(points: f64) -> f64 {
    (points * 100.0).round() / 100.0
}
