use crate::analysis::calendar::{days_between, is_weekend};
use crate::models::snapshot::Snapshot;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Data-quality findings collected while rebuilding the series. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesDiagnostic {
    /// Snapshot dated before the cycle start; discarded.
    OutOfRange { date: NaiveDate },
    /// Snapshot dated after today; discarded.
    AfterToday { date: NaiveDate },
    /// A second snapshot for an already filled day; the later one is kept.
    DuplicateDay {
        date: NaiveDate,
        previous_points: f64,
        points: f64,
    },
}

/// Points remaining and progress per day, index 0 = cycle start, last index = today.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconstructedSeries {
    pub points_remaining_by_day: Vec<f64>,
    pub progress_by_day: Vec<f64>,
    pub diagnostics: Vec<SeriesDiagnostic>,
}

impl ReconstructedSeries {
    pub fn len(&self) -> usize {
        self.points_remaining_by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_remaining_by_day.is_empty()
    }
}

/// Rebuilds a gap-filled, day-indexed series from unordered snapshots.
///
/// Days without a snapshot are filled with `0` in both series. This
/// conflates "nothing recorded" with "zero points left"; callers charting
/// a sprint that skipped recordings will see the line drop to the axis.
///
/// When `include_weekends` is false, Saturday and Sunday positions are
/// removed from both series through one shared mask.
pub fn reconstruct(
    snapshots: &[Snapshot],
    start: NaiveDate,
    today: NaiveDate,
    include_weekends: bool,
) -> ReconstructedSeries {
    let mut ordered: Vec<&Snapshot> = snapshots.iter().collect();
    // Stable: same-day snapshots without a timestamp keep their input order.
    ordered.sort_by_key(|s| (s.date, s.recorded_at.unwrap_or(i64::MIN)));

    let len = (days_between(start, today) + 1).max(0) as usize;
    let mut slots: Vec<Option<(f64, f64)>> = vec![None; len];
    let mut diagnostics = Vec::new();

    for snapshot in ordered {
        let day = days_between(start, snapshot.date);
        if day < 0 {
            diagnostics.push(SeriesDiagnostic::OutOfRange { date: snapshot.date });
            continue;
        }
        let Some(slot) = slots.get_mut(day as usize) else {
            diagnostics.push(SeriesDiagnostic::AfterToday { date: snapshot.date });
            continue;
        };

        if let Some((previous_points, _)) = *slot {
            diagnostics.push(SeriesDiagnostic::DuplicateDay {
                date: snapshot.date,
                previous_points,
                points: snapshot.points_remaining,
            });
        }
        *slot = Some((snapshot.points_remaining, snapshot.progress_percent));
    }

    let keep = working_day_mask(start, len, include_weekends);
    let (points_remaining_by_day, progress_by_day) = slots
        .into_iter()
        .zip(keep)
        .filter(|(_, keep)| *keep)
        .map(|(slot, _)| slot.unwrap_or((0.0, 0.0)))
        .unzip();

    ReconstructedSeries {
        points_remaining_by_day,
        progress_by_day,
        diagnostics,
    }
}

/// `true` for every day index that stays in the charted series.
fn working_day_mask(start: NaiveDate, len: usize, include_weekends: bool) -> Vec<bool> {
    (0..len as u64)
        .map(|offset| {
            include_weekends
                || start
                    .checked_add_days(Days::new(offset))
                    .is_some_and(|day| !is_weekend(day))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snap(day: u32, points: f64) -> Snapshot {
        Snapshot::new(date(2024, 1, day), points, points / 100.0)
    }

    #[test]
    fn later_duplicate_wins_and_gaps_are_zero() {
        let snapshots = vec![snap(2, 15.0), snap(1, 20.0), snap(2, 14.0)];
        let series = reconstruct(&snapshots, date(2024, 1, 1), date(2024, 1, 3), true);

        assert_eq!(series.points_remaining_by_day, vec![20.0, 14.0, 0.0]);
        assert_eq!(series.progress_by_day, vec![0.2, 0.14, 0.0]);
        assert_eq!(
            series.diagnostics,
            vec![SeriesDiagnostic::DuplicateDay {
                date: date(2024, 1, 2),
                previous_points: 15.0,
                points: 14.0,
            }]
        );
    }

    #[test]
    fn recorded_at_decides_duplicates_regardless_of_input_order() {
        let mut early = snap(2, 15.0);
        early.recorded_at = Some(100);
        let mut late = snap(2, 14.0);
        late.recorded_at = Some(200);

        let forward = reconstruct(&[early.clone(), late.clone()], date(2024, 1, 1), date(2024, 1, 2), true);
        let backward = reconstruct(&[late, early], date(2024, 1, 1), date(2024, 1, 2), true);

        assert_eq!(forward.points_remaining_by_day, vec![0.0, 14.0]);
        assert_eq!(forward.points_remaining_by_day, backward.points_remaining_by_day);
        assert_eq!(forward.progress_by_day, backward.progress_by_day);
    }

    #[test]
    fn zero_valued_snapshot_still_counts_as_recorded() {
        let snapshots = vec![snap(1, 0.0), snap(1, 3.0)];
        let series = reconstruct(&snapshots, date(2024, 1, 1), date(2024, 1, 1), true);

        assert_eq!(series.points_remaining_by_day, vec![3.0]);
        assert_eq!(series.diagnostics.len(), 1);
    }

    #[test]
    fn out_of_range_and_future_snapshots_are_flagged_and_dropped() {
        let snapshots = vec![
            Snapshot::new(date(2023, 12, 31), 50.0, 0.0),
            snap(1, 20.0),
            snap(9, 1.0),
        ];
        let series = reconstruct(&snapshots, date(2024, 1, 1), date(2024, 1, 2), true);

        assert_eq!(series.points_remaining_by_day, vec![20.0, 0.0]);
        assert_eq!(
            series.diagnostics,
            vec![
                SeriesDiagnostic::OutOfRange { date: date(2023, 12, 31) },
                SeriesDiagnostic::AfterToday { date: date(2024, 1, 9) },
            ]
        );
    }

    #[test]
    fn no_snapshots_yields_zero_filled_series() {
        let series = reconstruct(&[], date(2024, 1, 1), date(2024, 1, 4), true);
        assert_eq!(series.points_remaining_by_day, vec![0.0; 4]);
        assert_eq!(series.progress_by_day, vec![0.0; 4]);
        assert!(series.diagnostics.is_empty());
    }

    #[test]
    fn today_before_start_yields_empty_series() {
        let series = reconstruct(&[snap(5, 10.0)], date(2024, 1, 5), date(2024, 1, 4), false);
        assert!(series.is_empty());
        assert!(series.progress_by_day.is_empty());
    }

    #[test]
    fn weekend_trimming_matches_manual_removal() {
        // Thu 2024-01-04 .. Tue 2024-01-09
        let snapshots: Vec<Snapshot> = (4..=9).map(|d| snap(d, 30.0 - d as f64)).collect();
        let start = date(2024, 1, 4);
        let today = date(2024, 1, 9);

        let full = reconstruct(&snapshots, start, today, true);
        let trimmed = reconstruct(&snapshots, start, today, false);

        let mut expected_points = full.points_remaining_by_day.clone();
        let mut expected_progress = full.progress_by_day.clone();
        // Sat 6th and Sun 7th sit at indexes 2 and 3.
        expected_points.drain(2..4);
        expected_progress.drain(2..4);

        assert_eq!(trimmed.points_remaining_by_day, expected_points);
        assert_eq!(trimmed.progress_by_day, expected_progress);
        assert_eq!(trimmed.len(), 4);
    }

    #[test]
    fn trimmed_series_stay_aligned() {
        let snapshots = vec![snap(6, 9.0), snap(8, 7.0)];
        let series = reconstruct(&snapshots, date(2024, 1, 5), date(2024, 1, 8), false);

        assert_eq!(series.points_remaining_by_day, vec![0.0, 7.0]);
        assert_eq!(series.progress_by_day, vec![0.0, 0.07]);
    }

    #[test]
    fn reconstruction_is_idempotent_under_reordering() {
        let snapshots = vec![snap(3, 12.0), snap(1, 20.0), snap(2, 16.0)];
        let mut reversed = snapshots.clone();
        reversed.reverse();

        let a = reconstruct(&snapshots, date(2024, 1, 1), date(2024, 1, 5), false);
        let b = reconstruct(&reversed, date(2024, 1, 1), date(2024, 1, 5), false);
        assert_eq!(a, b);
    }
}
