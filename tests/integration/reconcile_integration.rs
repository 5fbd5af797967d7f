/// Backup reconciliation against real stores
use std::cell::Cell;

use chrono::NaiveDate;
use goal_tracker_mcp::backup::reconcile::{import_json, reconcile, ReconcileError};
use goal_tracker_mcp::*;
use serde_json::json;
use tempfile::TempDir;

/// Store that reads from SQLite but refuses every batch write
struct OfflineStore {
    inner: SqliteStorage,
    /// Consistent long-term reads served so far
    snapshot_reads: Cell<u32>,
}

impl OfflineStore {
    fn new() -> Self {
        Self {
            inner: SqliteStorage::in_memory().unwrap(),
            snapshot_reads: Cell::new(0),
        }
    }
}

impl GoalStore for OfflineStore {
    fn create_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        self.inner.create_goal(goal)
    }
    fn get_goal(&self, goal_id: &GoalId) -> Result<Goal, StorageError> {
        self.inner.get_goal(goal_id)
    }
    fn update_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        self.inner.update_goal(goal)
    }
    fn archive_goal(&self, goal_id: &GoalId, end_date: NaiveDate) -> Result<(), StorageError> {
        self.inner.archive_goal(goal_id, end_date)
    }
    fn delete_goal(&self, goal_id: &GoalId) -> Result<(), StorageError> {
        self.inner.delete_goal(goal_id)
    }
    fn list_goals(&self) -> Result<Vec<Goal>, StorageError> {
        self.inner.list_goals()
    }
    fn list_logs(&self) -> Result<Vec<GoalLog>, StorageError> {
        self.inner.list_logs()
    }
    fn count_logs_for_goal(&self, goal_id: &GoalId) -> Result<u32, StorageError> {
        self.inner.count_logs_for_goal(goal_id)
    }
    fn upsert_log(&self, log: &GoalLog) -> Result<(), StorageError> {
        self.inner.upsert_log(log)
    }
    fn delete_log(&self, goal_id: &GoalId, date: NaiveDate) -> Result<(), StorageError> {
        self.inner.delete_log(goal_id, date)
    }
    fn list_long_term_goals(&self) -> Result<Vec<LongTermGoal>, StorageError> {
        self.inner.list_long_term_goals()
    }
    fn get_long_term_goal(&self, goal_id: &LongTermGoalId) -> Result<LongTermGoal, StorageError> {
        self.inner.get_long_term_goal(goal_id)
    }
    fn upsert_long_term_goal(&self, goal: &LongTermGoal) -> Result<(), StorageError> {
        self.inner.upsert_long_term_goal(goal)
    }
    fn get_category_settings(&self) -> Result<Option<CategorySettings>, StorageError> {
        self.inner.get_category_settings()
    }
    fn long_term_snapshot(&self) -> Result<LongTermSnapshot, StorageError> {
        self.snapshot_reads.set(self.snapshot_reads.get() + 1);
        self.inner.long_term_snapshot()
    }
    fn apply_backup(
        &self,
        _goals: &[LongTermGoal],
        _settings: Option<&CategorySettings>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("store is offline".to_string()))
    }
    fn get_monthly_target(&self) -> Result<Option<u32>, StorageError> {
        self.inner.get_monthly_target()
    }
    fn set_monthly_target(&self, target: u32) -> Result<(), StorageError> {
        self.inner.set_monthly_target(target)
    }
}

fn weekly_read() -> LongTermGoal {
    LongTermGoal::new("Read".to_string(), GoalType::Weekly, 2024, Some(3), Some(12), None).unwrap()
}

fn backup_with(goals: Vec<LongTermGoal>, mappings: Option<serde_json::Value>) -> String {
    json!({
        "version": 1,
        "timestamp": "2024-03-20T10:00:00.000Z",
        "goals": goals,
        "settings": mappings.map(|m| json!({"mappings": m})),
    })
    .to_string()
}

#[cfg(test)]
mod reconcile_integration_tests {
    use super::*;

    #[test]
    fn test_content_match_updates_live_record() {
        let storage = SqliteStorage::in_memory().unwrap();
        let live = weekly_read();
        storage.upsert_long_term_goal(&live).unwrap();

        let mut imported = live.clone();
        imported.id = LongTermGoalId::new();
        imported.is_completed = true;

        let report = import_json(&storage, &backup_with(vec![imported.clone()], None)).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert!(report.restored.is_empty());
        let stored = storage.list_long_term_goals().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, live.id);
        assert!(stored[0].is_completed);
        assert!(matches!(
            storage.get_long_term_goal(&imported.id),
            Err(StorageError::LongTermGoalNotFound { .. })
        ));
    }

    #[test]
    fn test_second_import_is_all_unchanged() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.upsert_long_term_goal(&weekly_read()).unwrap();

        let annual = LongTermGoal::new("Save".to_string(), GoalType::Annual, 2024, None, None, None).unwrap();
        let mut renamed = weekly_read();
        renamed.is_completed = true;
        let document = backup_with(vec![renamed, annual], Some(json!({"red": "Health"})));

        let first = import_json(&storage, &document).unwrap();
        assert_eq!(first.written(), 2);
        assert!(first.settings_updated);

        let second = import_json(&storage, &document).unwrap();
        assert_eq!(second.written(), 0);
        assert_eq!(second.unchanged, 2);
        assert!(!second.settings_updated);
        assert_eq!(storage.list_long_term_goals().unwrap().len(), 2);
    }

    #[test]
    fn test_repeated_ids_rejected_before_any_write() {
        let storage = SqliteStorage::in_memory().unwrap();
        let first = weekly_read();
        let mut repeat = first.clone();
        repeat.title = "Read more".to_string();
        let document = backup_with(vec![first, repeat], Some(json!({"red": "Health"})));

        assert!(matches!(
            import_json(&storage, &document),
            Err(ReconcileError::Backup(BackupError::InvalidFormat(_)))
        ));
        assert!(storage.list_long_term_goals().unwrap().is_empty());
        assert!(storage.get_category_settings().unwrap().is_none());
    }

    #[test]
    fn test_repeated_ids_in_snapshot_import_idempotently() {
        let storage = SqliteStorage::in_memory().unwrap();
        let first = weekly_read();
        let mut repeat = first.clone();
        repeat.title = "Read more".to_string();
        let snapshot = BackupSnapshot::new(vec![first.clone(), repeat], None, chrono::Utc::now());

        let report = reconcile(&storage, &snapshot).unwrap();
        assert_eq!(report.restored, vec![first.clone()]);
        assert_eq!(storage.list_long_term_goals().unwrap(), vec![first]);

        let again = reconcile(&storage, &snapshot).unwrap();
        assert_eq!(again.written(), 0);
        assert_eq!(again.unchanged, 1);
    }

    #[test]
    fn test_malformed_backup_writes_nothing() {
        let storage = SqliteStorage::in_memory().unwrap();
        let document = json!({"version": 1, "goals": "not a list"}).to_string();

        let result = import_json(&storage, &document);
        assert!(matches!(
            result,
            Err(ReconcileError::Backup(BackupError::InvalidFormat(_)))
        ));
        assert!(storage.list_long_term_goals().unwrap().is_empty());
        assert!(storage.get_category_settings().unwrap().is_none());
    }

    #[test]
    fn test_store_failure_returns_no_report() {
        let store = OfflineStore::new();
        let snapshot = BackupSnapshot::from_json(&backup_with(vec![weekly_read()], None)).unwrap();

        let result = reconcile(&store, &snapshot);
        assert!(matches!(result, Err(ReconcileError::Storage(StorageError::Connection(_)))));
        assert!(store.list_long_term_goals().unwrap().is_empty());
    }

    #[test]
    fn test_live_state_read_in_one_snapshot() {
        let store = OfflineStore::new();
        store.inner.upsert_long_term_goal(&weekly_read()).unwrap();
        let snapshot = BackupSnapshot::from_json(&backup_with(vec![], None)).unwrap();

        let report = reconcile(&store, &snapshot).unwrap();
        assert_eq!(report.written(), 0);
        assert_eq!(store.snapshot_reads.get(), 1);
    }

    #[test]
    fn test_failed_batch_is_rolled_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.db");
        let storage = SqliteStorage::new(&path).unwrap();

        // A second connection installs a trigger that rejects one record mid-batch
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_explode BEFORE INSERT ON long_term_goals
             WHEN NEW.title = 'Explode'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let explode = LongTermGoal::new("Explode".to_string(), GoalType::Annual, 2024, None, None, None).unwrap();
        let document = backup_with(vec![weekly_read(), explode], Some(json!({"red": "Health"})));

        assert!(matches!(
            import_json(&storage, &document),
            Err(ReconcileError::Storage(_))
        ));
        assert!(storage.list_long_term_goals().unwrap().is_empty());
        assert!(storage.get_category_settings().unwrap().is_none());
    }

    #[test]
    fn test_export_import_round_trip_between_stores() {
        let source = SqliteStorage::in_memory().unwrap();
        source.upsert_long_term_goal(&weekly_read()).unwrap();
        source
            .apply_backup(&[], Some(&CategorySettings::new(json!({"blue": "Work"}))))
            .unwrap();

        let snapshot = BackupSnapshot::capture(&source, chrono::Utc::now()).unwrap();
        let document = snapshot.to_json_pretty().unwrap();

        let target = SqliteStorage::in_memory().unwrap();
        let report = import_json(&target, &document).unwrap();

        assert_eq!(report.restored.len(), 1);
        assert!(report.settings_updated);
        assert_eq!(target.list_long_term_goals().unwrap(), source.list_long_term_goals().unwrap());
    }
}
