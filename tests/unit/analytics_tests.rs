/// Unit tests for the analytics engine through the public API
use chrono::{Duration, NaiveDate, Weekday};
use goal_tracker_mcp::analytics::{badges, period, weekday, Period, Trend, BADGE_DEFINITIONS};
use goal_tracker_mcp::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn done_on(goal: &Goal, days: impl Iterator<Item = NaiveDate>) -> Vec<GoalLog> {
    days.map(|day| GoalLog::new(goal.id.clone(), day, LogStatus::Done)).collect()
}

#[cfg(test)]
mod analytics_unit_tests {
    use super::*;

    #[test]
    fn test_month_comparison_example() {
        let goal = Goal::new("Read".to_string(), None, date(2025, 1, 1)).unwrap();
        let mut logs = done_on(&goal, days_inclusive(date(2025, 2, 1), date(2025, 2, 20)));
        logs.extend(done_on(&goal, days_inclusive(date(2025, 3, 1), date(2025, 3, 10))));
        let index = LogsIndex::from_logs(&logs);

        let delta = period::compare_period(&goal, &index, Period::Month, date(2025, 3, 10));
        assert_eq!(delta.previous, 71);
        assert_eq!(delta.current, 100);
        assert_eq!(delta.change, 29);
        assert_eq!(delta.trend, Trend::Up);
    }

    #[test]
    fn test_goal_starting_after_window_rates_zero() {
        let goal = Goal::new("New".to_string(), None, date(2025, 3, 5)).unwrap();
        let logs = done_on(&goal, days_inclusive(date(2025, 3, 5), date(2025, 3, 10)));
        let index = LogsIndex::from_logs(&logs);

        let delta = period::compare_period(&goal, &index, Period::Month, date(2025, 3, 10));
        assert_eq!(delta.previous, 0);
        assert_eq!(delta.current, 100);
    }

    #[test]
    fn test_weekdays_are_monday_first() {
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        let report = weekday::weekday_stats(&[goal], &LogsIndex::new(), date(2024, 3, 3));

        let order: Vec<Weekday> = report.days.iter().map(|d| d.weekday).collect();
        assert_eq!(
            order,
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun
            ]
        );
    }

    #[test]
    fn test_single_bad_observation_is_not_a_worst_day() {
        // Three days of history: every weekday has fewer than four observations
        let goal = Goal::new("Read".to_string(), None, date(2024, 3, 1)).unwrap();
        let logs = done_on(&goal, days_inclusive(date(2024, 3, 1), date(2024, 3, 2)));
        let index = LogsIndex::from_logs(&logs);

        let report = weekday::weekday_stats(&[goal], &index, date(2024, 3, 3));
        assert_eq!(report.worst_day_name(), "N/A");
    }

    #[test]
    fn test_badge_table_is_stateless() {
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        let as_of = date(2024, 1, 10);
        let logs = done_on(&goal, days_inclusive(date(2024, 1, 1), as_of));
        let index = LogsIndex::from_logs(&logs);
        let engine = AnalyticsEngine::default();

        let first = engine.analyze(&[goal.clone()], &index, as_of);
        let second = engine.analyze(&[goal], &index, as_of);

        assert_eq!(first.badges.len(), BADGE_DEFINITIONS.len());
        let unlocked: Vec<&str> = first.badges.iter().filter(|b| b.unlocked).map(|b| b.id).collect();
        let again: Vec<&str> = second.badges.iter().filter(|b| b.unlocked).map(|b| b.id).collect();
        assert_eq!(unlocked, again);
        for id in ["first_step", "streak_3", "streak_7", "total_10", "perfect_week"] {
            assert!(unlocked.contains(&id), "{} should be unlocked", id);
        }
        assert!(!unlocked.contains(&"streak_14"));
    }

    #[test]
    fn test_perfect_week_needs_seven_consecutive_days() {
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        let mut logs = done_on(&goal, days_inclusive(date(2024, 1, 1), date(2024, 1, 6)));
        // One unmarked day, then six more
        logs.extend(done_on(&goal, days_inclusive(date(2024, 1, 8), date(2024, 1, 13))));
        let index = LogsIndex::from_logs(&logs);

        assert!(!badges::has_perfect_week(&[goal.clone()], &index, date(2024, 1, 13)));

        let mut index = index;
        index.set(&goal.id, date(2024, 1, 7), Some(LogStatus::Done));
        assert!(badges::has_perfect_week(&[goal], &index, date(2024, 1, 13)));
    }

    #[test]
    fn test_critical_days_sorted_weakest_first() {
        let as_of = date(2024, 6, 30);
        let start = as_of - Duration::days(60);
        let strong = Goal::new("Strong".to_string(), None, start).unwrap();
        let weak = Goal::new("Weak".to_string(), None, start).unwrap();
        let logs = done_on(&strong, days_inclusive(start, as_of));
        let index = LogsIndex::from_logs(&logs);

        let report = AnalyticsEngine::default().analyze(&[strong.clone(), weak.clone()], &index, as_of);

        assert_eq!(report.critical_days.len(), 2);
        assert_eq!(report.critical_days[0].goal_id, weak.id);
        assert_eq!(report.critical_days[0].rate, 0);
        assert_eq!(report.critical_days[1].goal_id, strong.id);
        assert_eq!(report.critical_days[1].rate, 100);
    }

    #[test]
    fn test_global_best_streak_across_goals() {
        let as_of = date(2024, 6, 30);
        let a = Goal::new("A".to_string(), None, date(2024, 6, 1)).unwrap();
        let b = Goal::new("B".to_string(), None, date(2024, 6, 1)).unwrap();
        let mut logs = done_on(&a, days_inclusive(date(2024, 6, 1), date(2024, 6, 5)));
        logs.extend(done_on(&b, days_inclusive(date(2024, 6, 10), date(2024, 6, 21))));
        let index = LogsIndex::from_logs(&logs);

        let report = AnalyticsEngine::default().analyze(&[a, b], &index, as_of);
        assert_eq!(report.global.best_streak, 12);
        assert_eq!(report.overall.total_days_done, 17);
    }
}
