/// Backup reconciliation
///
/// Merges an imported snapshot into the live long-term goals. Records are
/// matched by id first, then by the natural key `(title, type, year)` so a
/// re-import that lost its ids does not duplicate anything. Only real
/// differences are written, in a single batch.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use crate::backup::{BackupError, BackupSnapshot};
use crate::domain::{CategorySettings, GoalType, LongTermGoal, LongTermGoalId};
use crate::storage::{GoalStore, StorageError};

/// Errors that abort an import; no partial report is returned
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error("Import failed while writing: {0}")]
    Storage(#[from] StorageError),
}

/// A content match that had more than one live candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousMatch {
    /// Id carried by the imported record
    pub imported_id: LongTermGoalId,
    pub title: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub year: i32,
    /// Live goal whose id was adopted
    pub adopted_id: LongTermGoalId,
    /// Every unclaimed live goal sharing the natural key, adopted one first
    pub candidates: Vec<LongTermGoalId>,
}

/// Outcome of one import, for a human to audit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Records inserted as new goals
    pub restored: Vec<LongTermGoal>,
    /// Records whose fields changed, with the live id they were written under
    pub updated: Vec<LongTermGoal>,
    pub unchanged: u32,
    pub settings_updated: bool,
    pub ambiguous_matches: Vec<AmbiguousMatch>,
}

impl ImportReport {
    /// Number of goal records written
    pub fn written(&self) -> usize {
        self.restored.len() + self.updated.len()
    }
}

/// The diff computed before anything is written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    /// Every goal to upsert, in import order
    pub writes: Vec<LongTermGoal>,
    /// Settings to store, only when they differ from the live ones
    pub settings: Option<CategorySettings>,
    pub report: ImportReport,
}

/// Compute the reconciliation diff without touching any store
pub fn plan_import(
    snapshot: &BackupSnapshot,
    live_goals: &[LongTermGoal],
    live_settings: Option<&CategorySettings>,
) -> ImportPlan {
    let live_by_id: HashMap<&LongTermGoalId, &LongTermGoal> =
        live_goals.iter().map(|goal| (&goal.id, goal)).collect();

    // A live goal named by id anywhere in the import is reserved for that record
    let mut claimed: HashSet<&LongTermGoalId> = snapshot
        .goals
        .iter()
        .filter_map(|goal| live_by_id.get(&goal.id).map(|live| &live.id))
        .collect();

    let mut plan = ImportPlan::default();
    let mut seen_ids: HashSet<&LongTermGoalId> = HashSet::new();

    for imported in &snapshot.goals {
        // Later records repeating an id would collapse into the first one's row
        if !seen_ids.insert(&imported.id) {
            warn!("Skipping repeated backup record {} ('{}')", imported.id, imported.title);
            continue;
        }

        let matched = match live_by_id.get(&imported.id) {
            Some(live) => Some(*live),
            None => {
                let candidates: Vec<&LongTermGoal> = live_goals
                    .iter()
                    .filter(|live| {
                        !claimed.contains(&live.id) && live.natural_key() == imported.natural_key()
                    })
                    .collect();

                let adopted = candidates.first().copied();
                if let Some(live) = adopted {
                    claimed.insert(&live.id);
                    if candidates.len() > 1 {
                        warn!(
                            "Ambiguous content match for '{}' ({} {}): {} candidates, adopting {}",
                            imported.title,
                            imported.goal_type,
                            imported.year,
                            candidates.len(),
                            live.id
                        );
                        plan.report.ambiguous_matches.push(AmbiguousMatch {
                            imported_id: imported.id.clone(),
                            title: imported.title.clone(),
                            goal_type: imported.goal_type,
                            year: imported.year,
                            adopted_id: live.id.clone(),
                            candidates: candidates.iter().map(|c| c.id.clone()).collect(),
                        });
                    }
                }
                adopted
            }
        };

        match matched {
            Some(live) => {
                if live.same_content(imported) {
                    plan.report.unchanged += 1;
                    continue;
                }
                let mut record = imported.clone();
                record.id = live.id.clone();
                record.created_at = live.created_at.or(imported.created_at);
                plan.writes.push(record.clone());
                plan.report.updated.push(record);
            }
            None => {
                plan.writes.push(imported.clone());
                plan.report.restored.push(imported.clone());
            }
        }
    }

    if let Some(settings) = &snapshot.settings {
        let differs = live_settings.map_or(true, |live| !live.same_mappings(settings));
        if differs {
            plan.settings = Some(settings.clone());
            plan.report.settings_updated = true;
        }
    }

    plan
}

/// Reconcile a snapshot against a store and write the diff
///
/// Reads the live goals and settings in one consistent read, plans, then
/// applies every write in one batch.
/// Running it twice with no live changes in between writes nothing the
/// second time.
pub fn reconcile<S: GoalStore>(store: &S, snapshot: &BackupSnapshot) -> Result<ImportReport, ReconcileError> {
    let live = store.long_term_snapshot()?;

    let plan = plan_import(snapshot, &live.goals, live.settings.as_ref());

    if !plan.writes.is_empty() || plan.settings.is_some() {
        store.apply_backup(&plan.writes, plan.settings.as_ref())?;
    }

    info!(
        "Backup import: {} restored, {} updated, {} unchanged, settings updated: {}",
        plan.report.restored.len(),
        plan.report.updated.len(),
        plan.report.unchanged,
        plan.report.settings_updated
    );

    Ok(plan.report)
}

/// Parse a backup document and reconcile it
pub fn import_json<S: GoalStore>(store: &S, text: &str) -> Result<ImportReport, ReconcileError> {
    let snapshot = BackupSnapshot::from_json(text)?;
    reconcile(store, &snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn goal(title: &str, goal_type: GoalType, year: i32) -> LongTermGoal {
        LongTermGoal::new(title.to_string(), goal_type, year, None, None, None).unwrap()
    }

    fn snapshot_of(goals: Vec<LongTermGoal>, settings: Option<CategorySettings>) -> BackupSnapshot {
        BackupSnapshot {
            version: 1,
            timestamp: "2024-03-20T10:00:00.000Z".to_string(),
            goals,
            settings,
        }
    }

    #[test]
    fn test_content_match_adopts_live_id() {
        let live = goal("Read", GoalType::Weekly, 2024);
        let mut imported = live.clone();
        imported.id = LongTermGoalId::new();
        imported.is_completed = true;

        let plan = plan_import(&snapshot_of(vec![imported], None), &[live.clone()], None);

        assert!(plan.report.restored.is_empty());
        assert_eq!(plan.report.updated.len(), 1);
        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.writes[0].id, live.id);
        assert!(plan.writes[0].is_completed);
    }

    #[test]
    fn test_id_match_unchanged() {
        let live = goal("Run", GoalType::Annual, 2024);
        let plan = plan_import(&snapshot_of(vec![live.clone()], None), &[live], None);

        assert_eq!(plan.report.unchanged, 1);
        assert!(plan.writes.is_empty());
    }

    #[test]
    fn test_unknown_record_restored() {
        let imported = goal("Swim", GoalType::Monthly, 2023);
        let plan = plan_import(&snapshot_of(vec![imported.clone()], None), &[], None);

        assert_eq!(plan.report.restored, vec![imported]);
    }

    #[test]
    fn test_claimed_goal_not_adopted_twice() {
        let live = goal("Read", GoalType::Weekly, 2024);
        let mut first = live.clone();
        first.id = LongTermGoalId::new();
        let mut second = live.clone();
        second.id = LongTermGoalId::new();

        let plan = plan_import(&snapshot_of(vec![first, second.clone()], None), &[live], None);

        assert_eq!(plan.report.unchanged, 1);
        assert_eq!(plan.report.restored.len(), 1);
        assert_eq!(plan.report.restored[0].id, second.id);
    }

    #[test]
    fn test_live_id_in_import_is_reserved() {
        let live = goal("Read", GoalType::Weekly, 2024);
        // A content twin appears before the record carrying the live id
        let mut twin = live.clone();
        twin.id = LongTermGoalId::new();
        let mut exact = live.clone();
        exact.is_completed = true;

        let plan = plan_import(&snapshot_of(vec![twin.clone(), exact], None), &[live.clone()], None);

        assert_eq!(plan.report.restored.len(), 1);
        assert_eq!(plan.report.restored[0].id, twin.id);
        assert_eq!(plan.report.updated.len(), 1);
        assert_eq!(plan.report.updated[0].id, live.id);
    }

    #[test]
    fn test_ambiguous_match_first_wins_and_is_reported() {
        let first_live = goal("Read", GoalType::Weekly, 2024);
        let second_live = goal("Read", GoalType::Weekly, 2024);
        let mut imported = first_live.clone();
        imported.id = LongTermGoalId::new();

        let plan = plan_import(
            &snapshot_of(vec![imported], None),
            &[first_live.clone(), second_live.clone()],
            None,
        );

        assert_eq!(plan.report.unchanged, 1);
        assert_eq!(plan.report.ambiguous_matches.len(), 1);
        let ambiguous = &plan.report.ambiguous_matches[0];
        assert_eq!(ambiguous.adopted_id, first_live.id);
        assert_eq!(ambiguous.candidates, vec![first_live.id, second_live.id]);
    }

    #[test]
    fn test_repeated_id_written_once() {
        let first = goal("Read", GoalType::Weekly, 2024);
        let mut repeat = first.clone();
        repeat.title = "Read more".to_string();

        let plan = plan_import(&snapshot_of(vec![first.clone(), repeat], None), &[], None);

        assert_eq!(plan.writes, vec![first.clone()]);
        assert_eq!(plan.report.restored, vec![first]);
        assert!(plan.report.updated.is_empty());
    }

    #[test]
    fn test_settings_only_written_when_different() {
        let settings = CategorySettings::new(json!({"red": "Health"}));
        let snapshot = snapshot_of(vec![], Some(settings.clone()));

        let same = plan_import(&snapshot, &[], Some(&settings));
        assert!(!same.report.settings_updated);
        assert!(same.settings.is_none());

        let other = CategorySettings::new(json!({"red": "Work"}));
        let changed = plan_import(&snapshot, &[], Some(&other));
        assert!(changed.report.settings_updated);

        let fresh = plan_import(&snapshot, &[], None);
        assert!(fresh.report.settings_updated);
    }
}
