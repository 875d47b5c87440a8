//! Reconciliation of recovered records with the store.
//!
//! Inserts are insert-if-absent, so running recovery repeatedly against the
//! same tree is safe.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use tracing::{debug, info, warn};
use visualmath_core::{Lesson, LessonId, Task, TaskId};
use visualmath_store::{LessonStore, Result, StoreError};

use crate::scan::ScannedSite;

/// Outcome of a recovery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub lessons_inserted: usize,
    pub lessons_existing: usize,
    /// Inserted lessons with fields the extractor could not recover.
    pub lessons_incomplete: usize,
    pub tasks_inserted: usize,
    pub tasks_existing: usize,
    /// Inserted tasks with no recoverable code.
    pub tasks_incomplete: usize,
    /// Tasks no recovered lesson links to.
    pub orphans: usize,
    /// Tasks linked from more than one lesson.
    pub conflicts: usize,
}

impl RecoveryReport {
    /// Number of records written.
    #[must_use]
    pub fn reconciled(&self) -> usize {
        self.lessons_inserted + self.tasks_inserted
    }
}

impl fmt::Display for RecoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lessons: {} inserted ({} incomplete), {} existing; \
             tasks: {} inserted ({} incomplete), {} existing, {} orphaned, {} conflicting",
            self.lessons_inserted,
            self.lessons_incomplete,
            self.lessons_existing,
            self.tasks_inserted,
            self.tasks_incomplete,
            self.tasks_existing,
            self.orphans,
            self.conflicts
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Owner {
    lesson: LessonId,
    position: i32,
}

/// Which lesson owns each task, plus the ids claimed by several lessons.
#[derive(Debug, Default)]
struct Ownership {
    owners: HashMap<TaskId, Owner>,
    conflicts: BTreeSet<TaskId>,
}

impl Ownership {
    fn build(site: &ScannedSite) -> Self {
        let mut ownership = Self::default();

        for lesson in &site.lessons {
            let mut position = 0;
            let mut seen = BTreeSet::new();
            for &task_id in &lesson.task_ids {
                if !seen.insert(task_id) {
                    continue;
                }
                position += 1;

                match ownership.owners.get(&task_id) {
                    None => {
                        ownership.owners.insert(
                            task_id,
                            Owner {
                                lesson: lesson.id,
                                position,
                            },
                        );
                    }
                    Some(owner) if owner.lesson != lesson.id => {
                        warn!(
                            task = task_id,
                            first = owner.lesson,
                            second = lesson.id,
                            "task linked from more than one lesson"
                        );
                        ownership.conflicts.insert(task_id);
                    }
                    Some(_) => {}
                }
            }
        }

        ownership
    }
}

/// Insert recovered lessons and tasks that the store does not have yet.
///
/// Records are stored even when some fields came back empty; those are
/// counted as incomplete so an operator can fill them in.
pub fn reconcile(site: &ScannedSite, store: &mut dyn LessonStore) -> Result<RecoveryReport> {
    let mut report = RecoveryReport::default();
    let ownership = Ownership::build(site);

    for recovered in &site.lessons {
        if store.contains_lesson(recovered.id)? {
            debug!(id = recovered.id, "lesson already present");
            report.lessons_existing += 1;
            continue;
        }

        let lesson = Lesson::new(
            recovered.id,
            recovered.grade,
            &recovered.title,
            &recovered.embed_url,
        )
        .with_description(&recovered.description);

        if let Err(e) = lesson.validate() {
            warn!(id = recovered.id, error = %e, "storing incomplete lesson");
            report.lessons_incomplete += 1;
        }
        store.insert_lesson_unchecked(&lesson)?;
        report.lessons_inserted += 1;
    }

    for recovered in &site.tasks {
        if ownership.conflicts.contains(&recovered.id) {
            report.conflicts += 1;
            continue;
        }

        let Some(owner) = ownership.owners.get(&recovered.id) else {
            warn!(id = recovered.id, "no lesson links to task, skipping");
            report.orphans += 1;
            continue;
        };

        if store.contains_task(recovered.id)? {
            debug!(id = recovered.id, "task already present");
            report.tasks_existing += 1;
            continue;
        }

        let task = Task::new(recovered.id, owner.lesson, &recovered.code)
            .with_title(&recovered.title)
            .with_description(&recovered.description)
            .with_order(owner.position);

        match store.insert_task_unchecked(&task) {
            Ok(()) => {
                report.tasks_inserted += 1;
                if let Err(e) = task.validate() {
                    warn!(id = recovered.id, error = %e, "stored incomplete task");
                    report.tasks_incomplete += 1;
                }
            }
            Err(StoreError::Orphan { lesson_id, .. }) => {
                warn!(
                    id = recovered.id,
                    lesson = lesson_id,
                    "owning lesson is not in the store"
                );
                report.orphans += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        lessons_inserted = report.lessons_inserted,
        lessons_incomplete = report.lessons_incomplete,
        tasks_inserted = report.tasks_inserted,
        orphans = report.orphans,
        conflicts = report.conflicts,
        "reconciliation complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use visualmath_store::MemoryStore;

    use super::*;
    use crate::extract::{RecoveredLesson, RecoveredTask};

    fn lesson(id: LessonId, task_ids: &[TaskId]) -> RecoveredLesson {
        RecoveredLesson {
            id,
            title: format!("Lesson {id}"),
            grade: 5,
            embed_url: "https://www.canva.com/design/A/view?embed".to_string(),
            description: String::new(),
            task_ids: task_ids.to_vec(),
        }
    }

    fn task(id: TaskId) -> RecoveredTask {
        RecoveredTask {
            id,
            title: format!("Task {id}"),
            description: String::new(),
            code: format!("<p>{id}</p>"),
        }
    }

    #[test]
    fn test_inserts_and_orders_tasks() {
        let site = ScannedSite {
            lessons: vec![lesson(1, &[30, 10, 30, 20])],
            tasks: vec![task(10), task(20), task(30)],
        };
        let mut store = MemoryStore::new();

        let report = reconcile(&site, &mut store).unwrap();

        assert_eq!(report.lessons_inserted, 1);
        assert_eq!(report.tasks_inserted, 3);
        assert_eq!(report.reconciled(), 4);
        assert_eq!(store.task(30).unwrap().order, 1);
        assert_eq!(store.task(10).unwrap().order, 2);
        assert_eq!(store.task(20).unwrap().order, 3);
        assert_eq!(store.task(20).unwrap().lesson_id, 1);
        assert_eq!(store.lesson(1).unwrap().sort_order, 0);
    }

    #[test]
    fn test_orphan_task_skipped() {
        let site = ScannedSite {
            lessons: vec![lesson(1, &[])],
            tasks: vec![task(99)],
        };
        let mut store = MemoryStore::new();

        let report = reconcile(&site, &mut store).unwrap();

        assert_eq!(report.orphans, 1);
        assert!(!store.contains_task(99).unwrap());
    }

    #[test]
    fn test_conflicting_task_skipped() {
        let site = ScannedSite {
            lessons: vec![lesson(1, &[5, 6]), lesson(2, &[5])],
            tasks: vec![task(5), task(6)],
        };
        let mut store = MemoryStore::new();

        let report = reconcile(&site, &mut store).unwrap();

        assert_eq!(report.conflicts, 1);
        assert_eq!(report.tasks_inserted, 1);
        assert!(!store.contains_task(5).unwrap());
        assert!(store.contains_task(6).unwrap());
    }

    #[test]
    fn test_existing_records_untouched() {
        let mut store = MemoryStore::with_lessons([Lesson::new(
            1,
            8,
            "Original",
            "https://www.canva.com/design/Z/view",
        )
        .with_task(Task::new(10, 0, "<p>original</p>"))])
        .unwrap();
        let site = ScannedSite {
            lessons: vec![lesson(1, &[10])],
            tasks: vec![task(10)],
        };

        let report = reconcile(&site, &mut store).unwrap();

        assert_eq!(report.lessons_existing, 1);
        assert_eq!(report.tasks_existing, 1);
        assert_eq!(report.reconciled(), 0);
        assert_eq!(store.lesson(1).unwrap().title, "Original");
        assert_eq!(store.task(10).unwrap().code, "<p>original</p>");
    }

    #[test]
    fn test_incomplete_lesson_keeps_its_tasks() {
        let mut partial = lesson(1, &[4]);
        partial.embed_url.clear();
        let mut blank = task(4);
        blank.code.clear();
        let site = ScannedSite {
            lessons: vec![partial],
            tasks: vec![blank],
        };
        let mut store = MemoryStore::new();

        let report = reconcile(&site, &mut store).unwrap();

        assert_eq!(report.lessons_inserted, 1);
        assert_eq!(report.lessons_incomplete, 1);
        assert_eq!(report.tasks_inserted, 1);
        assert_eq!(report.tasks_incomplete, 1);
        assert_eq!(report.orphans, 0);
        assert_eq!(store.lesson(1).unwrap().embed_url, "");
        assert_eq!(store.task(4).unwrap().lesson_id, 1);
    }

    #[test]
    fn test_report_display() {
        let report = RecoveryReport {
            lessons_inserted: 2,
            lessons_incomplete: 1,
            tasks_inserted: 3,
            orphans: 1,
            ..RecoveryReport::default()
        };
        assert_eq!(
            report.to_string(),
            "lessons: 2 inserted (1 incomplete), 0 existing; \
             tasks: 3 inserted (0 incomplete), 0 existing, 1 orphaned, 0 conflicting"
        );
    }
}
