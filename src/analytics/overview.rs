/// Day-level aggregates across all goals
///
/// A calendar day counts as done when at least one goal is done that day,
/// and as missed when it carries marks but none of them is done. These
/// aggregates feed the badge engine and the overview dashboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use chrono::{Datelike, Duration, NaiveDate};
use crate::analytics::weekday::WeekdayHighlight;
use crate::domain::{
    day_count, month_name, rounded_percentage, weekday_name, GoalStats, LogStatus, LogsIndex,
    WEEKDAYS_MONDAY_FIRST,
};

/// Outcome of a whole calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOutcome {
    Done,
    Missed,
}

/// Collapse the logs index into one outcome per marked day up to `as_of`
pub fn day_outcomes(index: &LogsIndex, as_of: NaiveDate) -> BTreeMap<NaiveDate, DayOutcome> {
    index
        .dates()
        .take_while(|day| *day <= as_of)
        .filter_map(|day| {
            let statuses = index.day(day)?;
            let outcome = if statuses.values().any(|s| *s == LogStatus::Done) {
                DayOutcome::Done
            } else {
                DayOutcome::Missed
            };
            Some((day, outcome))
        })
        .collect()
}

/// Longest run of consecutive calendar days marked done
fn best_run<'a, I>(outcomes: I) -> u32
where
    I: IntoIterator<Item = (&'a NaiveDate, &'a DayOutcome)>,
{
    let mut best = 0;
    let mut running = 0;
    let mut previous: Option<NaiveDate> = None;

    for (day, outcome) in outcomes {
        if *outcome != DayOutcome::Done {
            running = 0;
            previous = None;
            continue;
        }
        running = match previous {
            Some(prev) if *day - prev == Duration::days(1) => running + 1,
            _ => 1,
        };
        best = best.max(running);
        previous = Some(*day);
    }

    best
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Totals over every marked day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_days_done: u32,
    pub total_days_missed: u32,
    pub total_days_marked: u32,
    /// Done days over marked days
    pub percentage: u32,
    /// Best current streak across goals
    pub current_streak: u32,
    /// Best longest streak across goals
    pub longest_streak: u32,
    pub first_record_date: Option<NaiveDate>,
    pub last_record_date: Option<NaiveDate>,
    pub days_since_start: u32,
    /// Marked days over days since the first record, capped at 100
    pub consistency_score: u32,
    pub best_day_of_week: Option<WeekdayHighlight>,
    pub worst_day_of_week: Option<WeekdayHighlight>,
}

/// Compute the overall totals as of `as_of`
pub fn overall_stats(
    outcomes: &BTreeMap<NaiveDate, DayOutcome>,
    goal_stats: &[GoalStats],
    as_of: NaiveDate,
) -> OverallStats {
    let total_days_done = outcomes.values().filter(|o| **o == DayOutcome::Done).count() as u32;
    let total_days_marked = outcomes.len() as u32;
    let total_days_missed = total_days_marked - total_days_done;

    let first_record_date = outcomes.keys().next().copied();
    let last_record_date = outcomes.keys().next_back().copied();
    let days_since_start = first_record_date.map_or(0, |first| day_count(first, as_of));
    let consistency_score = rounded_percentage(total_days_marked, days_since_start).min(100);

    // Per weekday done/marked, Monday first
    let mut weekday_counts = [(0u32, 0u32); 7];
    for (day, outcome) in outcomes {
        let slot = &mut weekday_counts[day.weekday().num_days_from_monday() as usize];
        slot.1 += 1;
        if *outcome == DayOutcome::Done {
            slot.0 += 1;
        }
    }

    let mut best_day_of_week: Option<WeekdayHighlight> = None;
    let mut worst_day_of_week: Option<WeekdayHighlight> = None;
    for (weekday, (done, total)) in WEEKDAYS_MONDAY_FIRST.iter().zip(weekday_counts.iter()) {
        if *total == 0 {
            continue;
        }
        let rate = rounded_percentage(*done, *total);
        if best_day_of_week.as_ref().map_or(true, |best| rate > best.rate) {
            best_day_of_week = Some(WeekdayHighlight {
                day_name: weekday_name(*weekday).to_string(),
                rate,
            });
        }
        if worst_day_of_week.as_ref().map_or(true, |worst| rate < worst.rate) {
            worst_day_of_week = Some(WeekdayHighlight {
                day_name: weekday_name(*weekday).to_string(),
                rate,
            });
        }
    }

    OverallStats {
        total_days_done,
        total_days_missed,
        total_days_marked,
        percentage: rounded_percentage(total_days_done, total_days_marked),
        current_streak: goal_stats.iter().map(|s| s.current_streak).max().unwrap_or(0),
        longest_streak: goal_stats.iter().map(|s| s.longest_streak).max().unwrap_or(0),
        first_record_date,
        last_record_date,
        days_since_start,
        consistency_score,
        best_day_of_week,
        worst_day_of_week,
    }
}

/// Totals of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    pub name: String,
    pub days_done: u32,
    pub days_missed: u32,
    pub days_total: u32,
    pub percentage: u32,
    pub best_streak: u32,
}

/// Compute the totals of `month` in `year`
pub fn month_stats(outcomes: &BTreeMap<NaiveDate, DayOutcome>, year: i32, month: u32) -> MonthStats {
    let mut stats = MonthStats {
        year,
        month,
        name: month_name(month).to_string(),
        days_done: 0,
        days_missed: 0,
        days_total: 0,
        percentage: 0,
        best_streak: 0,
    };

    let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return stats;
    };
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let Some(next_month) = next_month else {
        return stats;
    };

    let days = outcomes.range(start..next_month);
    for (_, outcome) in days.clone() {
        stats.days_total += 1;
        match outcome {
            DayOutcome::Done => stats.days_done += 1,
            DayOutcome::Missed => stats.days_missed += 1,
        }
    }
    stats.percentage = rounded_percentage(stats.days_done, stats.days_total);
    stats.best_streak = best_run(days);
    stats
}

/// Totals of one ISO week inside a calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekStats {
    pub week_number: u32,
    pub year: i32,
    pub days_done: u32,
    pub days_missed: u32,
    pub days_total: u32,
    pub percentage: u32,
}

/// Totals of one calendar year with monthly and weekly breakdowns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub year: i32,
    pub total_days_done: u32,
    pub total_days_missed: u32,
    pub total_days_marked: u32,
    pub percentage: u32,
    pub best_month: Option<MonthStats>,
    pub worst_month: Option<MonthStats>,
    pub longest_streak: u32,
    /// Done days per week with data, one decimal
    pub average_per_week: f64,
    /// Done days per month with data, one decimal
    pub average_per_month: f64,
    /// Always twelve entries, January first
    pub monthly_breakdown: Vec<MonthStats>,
    /// Only weeks with at least one mark, ascending
    pub weekly_breakdown: Vec<WeekStats>,
}

/// Compute the totals of a calendar year
pub fn year_stats(outcomes: &BTreeMap<NaiveDate, DayOutcome>, year: i32) -> YearStats {
    let monthly_breakdown: Vec<MonthStats> = (1..=12)
        .map(|month| month_stats(outcomes, year, month))
        .collect();

    let year_days: Vec<(&NaiveDate, &DayOutcome)> = outcomes
        .iter()
        .filter(|(day, _)| day.year() == year)
        .collect();

    let mut weeks: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for (day, outcome) in &year_days {
        let entry = weeks.entry(day.iso_week().week()).or_default();
        match outcome {
            DayOutcome::Done => entry.0 += 1,
            DayOutcome::Missed => entry.1 += 1,
        }
    }
    let weekly_breakdown: Vec<WeekStats> = weeks
        .into_iter()
        .map(|(week_number, (done, missed))| WeekStats {
            week_number,
            year,
            days_done: done,
            days_missed: missed,
            days_total: done + missed,
            percentage: rounded_percentage(done, done + missed),
        })
        .collect();

    let total_days_done = monthly_breakdown.iter().map(|m| m.days_done).sum::<u32>();
    let total_days_missed = monthly_breakdown.iter().map(|m| m.days_missed).sum::<u32>();
    let total_days_marked = total_days_done + total_days_missed;

    // Ties resolve to the earlier month
    let months_with_data: Vec<&MonthStats> =
        monthly_breakdown.iter().filter(|m| m.days_total > 0).collect();
    let mut best_month: Option<&MonthStats> = None;
    let mut worst_month: Option<&MonthStats> = None;
    for month in months_with_data.iter().copied() {
        if best_month.map_or(true, |best| month.percentage > best.percentage) {
            best_month = Some(month);
        }
        if worst_month.map_or(true, |worst| month.percentage < worst.percentage) {
            worst_month = Some(month);
        }
    }

    let average_per_week = if weekly_breakdown.is_empty() {
        0.0
    } else {
        round_one_decimal(total_days_done as f64 / weekly_breakdown.len() as f64)
    };
    let average_per_month = if months_with_data.is_empty() {
        0.0
    } else {
        round_one_decimal(total_days_done as f64 / months_with_data.len() as f64)
    };

    YearStats {
        year,
        total_days_done,
        total_days_missed,
        total_days_marked,
        percentage: rounded_percentage(total_days_done, total_days_marked),
        best_month: best_month.cloned(),
        worst_month: worst_month.cloned(),
        longest_streak: best_run(year_days),
        average_per_week,
        average_per_month,
        monthly_breakdown,
        weekly_breakdown,
    }
}

/// Year stats for every year that has marks, ascending
pub fn yearly_stats(outcomes: &BTreeMap<NaiveDate, DayOutcome>) -> Vec<YearStats> {
    let mut years: Vec<i32> = outcomes.keys().map(|day| day.year()).collect();
    years.dedup();
    years.into_iter().map(|year| year_stats(outcomes, year)).collect()
}
