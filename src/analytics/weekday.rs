/// Day-of-week aggregation
///
/// Buckets every active goal-day of the last year by weekday and reports
/// the completion rate of each bucket, Monday first.

use serde::{Deserialize, Serialize};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use crate::domain::{
    days_inclusive, rounded_percentage, weekday_name, Goal, LogsIndex, WEEKDAYS_MONDAY_FIRST,
};

/// How far back the weekday analysis looks
pub const WEEKDAY_LOOKBACK_DAYS: i64 = 365;

/// Minimum observations before a weekday can be called best or worst
pub const MIN_WEEKDAY_SAMPLE: u32 = 4;

/// Label reported when no weekday has enough observations
pub const NOT_AVAILABLE: &str = "N/A";

/// Activity counts for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStat {
    pub weekday: Weekday,
    pub day_name: String,
    /// Goal-days on which some goal could be logged
    pub total_active: u32,
    /// Goal-days marked done
    pub total_done: u32,
    pub rate: u32,
}

/// A weekday singled out by the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayHighlight {
    pub day_name: String,
    pub rate: u32,
}

/// Per-weekday rates plus the best and worst qualifying day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayReport {
    /// Always seven entries, Monday to Sunday
    pub days: Vec<WeekdayStat>,
    pub best_day: Option<WeekdayHighlight>,
    pub worst_day: Option<WeekdayHighlight>,
}

impl WeekdayReport {
    /// Name of the worst day, or "N/A" when every weekday is under-sampled
    pub fn worst_day_name(&self) -> &str {
        self.worst_day
            .as_ref()
            .map_or(NOT_AVAILABLE, |day| day.day_name.as_str())
    }

    /// Name of the best day, or "N/A"
    pub fn best_day_name(&self) -> &str {
        self.best_day
            .as_ref()
            .map_or(NOT_AVAILABLE, |day| day.day_name.as_str())
    }
}

/// Running tally for one weekday
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WeekdayTally {
    pub active: u32,
    pub done: u32,
}

impl WeekdayTally {
    pub fn rate(&self) -> u32 {
        rounded_percentage(self.done, self.active)
    }
}

/// Tally active/done goal-days per weekday over `[start, end]`
///
/// Index 0 is Monday. Only goals whose validity window covers a day count
/// towards that day.
pub(crate) fn tally_weekdays<'a, I>(
    goals: I,
    index: &LogsIndex,
    start: NaiveDate,
    end: NaiveDate,
) -> [WeekdayTally; 7]
where
    I: IntoIterator<Item = &'a Goal> + Clone,
{
    let mut tallies = [WeekdayTally::default(); 7];

    for day in days_inclusive(start, end) {
        let slot = &mut tallies[day.weekday().num_days_from_monday() as usize];
        for goal in goals.clone() {
            if !goal.is_active_on(day) {
                continue;
            }
            slot.active += 1;
            if index.is_done(&goal.id, day) {
                slot.done += 1;
            }
        }
    }

    tallies
}

/// Weekday with the lowest rate among those with enough samples
///
/// Ties go to the earlier weekday (Monday first).
pub(crate) fn weakest_weekday(tallies: &[WeekdayTally; 7]) -> Option<(Weekday, u32)> {
    let mut weakest: Option<(Weekday, u32)> = None;
    for (weekday, tally) in WEEKDAYS_MONDAY_FIRST.iter().zip(tallies.iter()) {
        if tally.active < MIN_WEEKDAY_SAMPLE {
            continue;
        }
        let rate = tally.rate();
        if weakest.map_or(true, |(_, lowest)| rate < lowest) {
            weakest = Some((*weekday, rate));
        }
    }
    weakest
}

/// Weekday with the highest rate among those with enough samples
fn strongest_weekday(tallies: &[WeekdayTally; 7]) -> Option<(Weekday, u32)> {
    let mut strongest: Option<(Weekday, u32)> = None;
    for (weekday, tally) in WEEKDAYS_MONDAY_FIRST.iter().zip(tallies.iter()) {
        if tally.active < MIN_WEEKDAY_SAMPLE {
            continue;
        }
        let rate = tally.rate();
        if strongest.map_or(true, |(_, highest)| rate > highest) {
            strongest = Some((*weekday, rate));
        }
    }
    strongest
}

fn highlight((weekday, rate): (Weekday, u32)) -> WeekdayHighlight {
    WeekdayHighlight {
        day_name: weekday_name(weekday).to_string(),
        rate,
    }
}

/// Compute weekday statistics as of `as_of`
///
/// The range is `[max(earliest goal start, as_of - 365), as_of]`; with no
/// goals (or only future goals) every weekday reports zero.
pub fn weekday_stats(goals: &[Goal], index: &LogsIndex, as_of: NaiveDate) -> WeekdayReport {
    let lookback_start = as_of - Duration::days(WEEKDAY_LOOKBACK_DAYS);
    let tallies = match goals.iter().map(|goal| goal.start_date).min() {
        Some(earliest) => tally_weekdays(goals.iter(), index, earliest.max(lookback_start), as_of),
        None => [WeekdayTally::default(); 7],
    };

    let days = WEEKDAYS_MONDAY_FIRST
        .iter()
        .zip(tallies.iter())
        .map(|(weekday, tally)| WeekdayStat {
            weekday: *weekday,
            day_name: weekday_name(*weekday).to_string(),
            total_active: tally.active,
            total_done: tally.done,
            rate: tally.rate(),
        })
        .collect();

    WeekdayReport {
        days,
        best_day: strongest_weekday(&tallies).map(highlight),
        worst_day: weakest_weekday(&tallies).map(highlight),
    }
}
