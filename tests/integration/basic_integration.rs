/// Basic integration tests against on-disk SQLite stores
use chrono::NaiveDate;
use goal_tracker_mcp::*;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config_in(dir: &TempDir) -> TrackerConfig {
    TrackerConfig::new(dir.path().join("goals.db"), 20)
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let server = GoalTrackerServer::new(config_in(&dir))
            .await
            .expect("Failed to create server");

        assert_eq!(server.analytics().monthly_target(), 20);
        assert!(server.storage().list_goals().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();

        {
            let server = GoalTrackerServer::new(config_in(&dir))
                .await
                .expect("Failed to create first server");
            server.storage().create_goal(&goal).unwrap();
            server
                .storage()
                .upsert_log(&GoalLog::new(goal.id.clone(), date(2024, 1, 2), LogStatus::Done))
                .unwrap();
            server.storage().set_monthly_target(12).unwrap();
        }

        let server = GoalTrackerServer::new(config_in(&dir))
            .await
            .expect("Failed to create second server");

        let snapshot = server.storage().snapshot().unwrap();
        assert_eq!(snapshot.goals, vec![goal]);
        assert_eq!(snapshot.logs.len(), 1);
        // The persisted target wins over the configured one
        assert_eq!(server.analytics().monthly_target(), 12);
    }

    #[test]
    fn test_deleting_goal_cascades_logs() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = SqliteStorage::new(dir.path().join("goals.db")).expect("Failed to create storage");
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        storage.create_goal(&goal).unwrap();
        storage
            .upsert_log(&GoalLog::new(goal.id.clone(), date(2024, 1, 2), LogStatus::Missed))
            .unwrap();

        storage.delete_goal(&goal.id).unwrap();

        assert!(storage.list_logs().unwrap().is_empty());
        assert_eq!(storage.count_logs_for_goal(&goal.id).unwrap(), 0);
    }

    #[test]
    fn test_storage_interface() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = SqliteStorage::new(dir.path().join("goals.db")).expect("Failed to create storage");

        // The store can be used behind the trait object
        let store: &dyn GoalStore = &storage;
        assert!(store.snapshot().unwrap().goals.is_empty());
    }

    #[test]
    fn test_analytics_over_stored_snapshot() {
        let storage = SqliteStorage::in_memory().unwrap();
        let goal = Goal::new("Read".to_string(), None, date(2024, 5, 1)).unwrap();
        storage.create_goal(&goal).unwrap();
        for (day, status) in [
            (1, LogStatus::Done),
            (2, LogStatus::Done),
            (3, LogStatus::Missed),
            (4, LogStatus::Done),
        ] {
            storage
                .upsert_log(&GoalLog::new(goal.id.clone(), date(2024, 5, day), status))
                .unwrap();
        }

        let snapshot = storage.snapshot().unwrap();
        let report = AnalyticsEngine::default().analyze(&snapshot.goals, &snapshot.index(), date(2024, 5, 4));

        assert_eq!(report.goal_stats[0].current_streak, 1);
        assert_eq!(report.goal_stats[0].longest_streak, 2);
        assert_eq!(report.overall.total_days_done, 3);
        assert_eq!(report.overall.total_days_missed, 1);
    }
}
