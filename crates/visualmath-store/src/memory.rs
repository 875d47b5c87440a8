//! In-memory store.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use visualmath_core::{Lesson, LessonId, Task, TaskId, TaskOrder};

use crate::{LessonStore, Result, StoreError};

/// Lesson store held entirely in memory.
///
/// Iteration order is by id, so every query is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lessons: BTreeMap<LessonId, Lesson>,
    tasks: BTreeMap<TaskId, Task>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from lessons carrying their tasks.
    pub fn with_lessons(lessons: impl IntoIterator<Item = Lesson>) -> Result<Self> {
        let mut store = Self::new();
        for lesson in lessons {
            store.insert_lesson(&lesson)?;
        }
        Ok(store)
    }

    /// Number of lessons.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Number of tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    fn sorted_lessons(&self, grade: Option<i32>) -> Vec<Lesson> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .values()
            .filter(|l| grade.is_none_or(|g| l.grade == g))
            .cloned()
            .collect();
        lessons.sort_by_key(|l| (l.sort_order, l.id));
        lessons
    }
}

impl LessonStore for MemoryStore {
    fn grades(&self) -> Result<Vec<i32>> {
        let grades: BTreeSet<i32> = self.lessons.values().map(|l| l.grade).collect();
        Ok(grades.into_iter().collect())
    }

    fn lessons_by_grade(&self, grade: i32) -> Result<Vec<Lesson>> {
        Ok(self.sorted_lessons(Some(grade)))
    }

    fn lessons_with_tasks(&self, order: TaskOrder) -> Result<Vec<Lesson>> {
        let mut lessons = self.sorted_lessons(None);
        for lesson in &mut lessons {
            lesson.tasks = self
                .tasks
                .values()
                .filter(|t| t.lesson_id == lesson.id)
                .cloned()
                .collect();
            order.sort(&mut lesson.tasks);
        }
        Ok(lessons)
    }

    fn tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.values().cloned().collect())
    }

    fn lesson(&self, id: LessonId) -> Result<Lesson> {
        self.lessons
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::lesson_not_found(id))
    }

    fn task(&self, id: TaskId) -> Result<Task> {
        self.tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::task_not_found(id))
    }

    fn insert_lesson(&mut self, lesson: &Lesson) -> Result<()> {
        lesson.validate()?;
        for task in &lesson.tasks {
            task.validate()?;
        }
        self.insert_lesson_unchecked(lesson)
    }

    fn insert_task(&mut self, task: &Task) -> Result<()> {
        task.validate()?;
        self.insert_task_unchecked(task)
    }

    fn insert_lesson_unchecked(&mut self, lesson: &Lesson) -> Result<()> {
        if self.lessons.contains_key(&lesson.id) {
            return Err(StoreError::duplicate_lesson(lesson.id));
        }
        // Check every owned task before touching state so a failure inserts nothing.
        let mut seen = BTreeSet::new();
        for task in &lesson.tasks {
            if self.tasks.contains_key(&task.id) || !seen.insert(task.id) {
                return Err(StoreError::duplicate_task(task.id));
            }
        }

        self.lessons.insert(lesson.id, lesson.without_tasks());
        for task in &lesson.tasks {
            let mut task = task.clone();
            task.lesson_id = lesson.id;
            self.tasks.insert(task.id, task);
        }
        debug!(id = lesson.id, tasks = lesson.tasks.len(), "inserted lesson");
        Ok(())
    }

    fn insert_task_unchecked(&mut self, task: &Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(StoreError::duplicate_task(task.id));
        }
        if !self.lessons.contains_key(&task.lesson_id) {
            return Err(StoreError::Orphan {
                task_id: task.id,
                lesson_id: task.lesson_id,
            });
        }
        self.tasks.insert(task.id, task.clone());
        debug!(id = task.id, lesson = task.lesson_id, "inserted task");
        Ok(())
    }

    fn delete_lesson(&mut self, id: LessonId) -> Result<()> {
        if self.lessons.remove(&id).is_none() {
            return Err(StoreError::lesson_not_found(id));
        }
        self.tasks.retain(|_, t| t.lesson_id != id);
        debug!(id, "deleted lesson");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: LessonId, grade: i32, sort_order: i32) -> Lesson {
        Lesson::new(id, grade, format!("Lesson {id}"), "https://www.canva.com/design/X/view")
            .with_sort_order(sort_order)
    }

    #[test]
    fn test_grades_sorted_and_distinct() {
        let store = MemoryStore::with_lessons([
            lesson(1, 6, 0),
            lesson(2, 5, 0),
            lesson(3, 6, 1),
            lesson(4, 9, 0),
        ])
        .unwrap();

        assert_eq!(store.grades().unwrap(), vec![5, 6, 9]);
    }

    #[test]
    fn test_lessons_by_grade_sorted() {
        let store = MemoryStore::with_lessons([
            lesson(1, 5, 110),
            lesson(2, 5, 101),
            lesson(3, 6, 100),
            lesson(4, 5, 102),
        ])
        .unwrap();

        let ids: Vec<_> = store
            .lessons_by_grade(5)
            .unwrap()
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![2, 4, 1]);
    }

    #[test]
    fn test_lessons_with_tasks_attaches_and_orders() {
        let l = lesson(1, 5, 0)
            .with_task(Task::new(12, 0, "b").with_order(1))
            .with_task(Task::new(11, 0, "a").with_order(2));
        let store = MemoryStore::with_lessons([l, lesson(2, 5, 1)]).unwrap();

        let by_id = store.lessons_with_tasks(TaskOrder::Insertion).unwrap();
        let ids: Vec<_> = by_id[0].tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![11, 12]);
        assert!(by_id[1].tasks.is_empty());

        let explicit = store.lessons_with_tasks(TaskOrder::Explicit).unwrap();
        let ids: Vec<_> = explicit[0].tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![12, 11]);
    }

    #[test]
    fn test_lookup_not_found() {
        let store = MemoryStore::new();
        assert!(store.lesson(1).unwrap_err().is_not_found());
        assert!(store.task(1).unwrap_err().is_not_found());
        assert!(!store.contains_lesson(1).unwrap());
    }

    #[test]
    fn test_insert_duplicate_lesson() {
        let mut store = MemoryStore::with_lessons([lesson(1, 5, 0)]).unwrap();
        let err = store.insert_lesson(&lesson(1, 6, 0)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: "lesson", id: 1 }));
        assert_eq!(store.lesson(1).unwrap().grade, 5);
    }

    #[test]
    fn test_insert_orphan_task_rejected() {
        let mut store = MemoryStore::new();
        let err = store.insert_task(&Task::new(5, 42, "<p>x</p>")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Orphan {
                task_id: 5,
                lesson_id: 42
            }
        ));
        assert_eq!(store.task_count(), 0);
    }

    #[test]
    fn test_insert_lesson_with_duplicate_task_inserts_nothing() {
        let mut store = MemoryStore::with_lessons([lesson(1, 5, 0).with_task(Task::new(7, 0, "x"))])
            .unwrap();

        let clash = lesson(2, 5, 0).with_task(Task::new(7, 0, "y"));
        assert!(store.insert_lesson(&clash).is_err());
        assert!(!store.contains_lesson(2).unwrap());
        assert_eq!(store.task(7).unwrap().lesson_id, 1);
    }

    #[test]
    fn test_delete_lesson_cascades() {
        let mut store = MemoryStore::with_lessons([
            lesson(1, 5, 0).with_task(Task::new(1, 0, "x")),
            lesson(2, 5, 0).with_task(Task::new(2, 0, "y")),
        ])
        .unwrap();

        store.delete_lesson(1).unwrap();

        assert!(!store.contains_lesson(1).unwrap());
        assert!(!store.contains_task(1).unwrap());
        assert!(store.contains_task(2).unwrap());
        assert!(store.delete_lesson(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_lesson_rejected() {
        let mut store = MemoryStore::new();
        let err = store
            .insert_lesson(&Lesson::new(1, 5, "", "https://x"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_unchecked_insert_keeps_incomplete_records() {
        let mut store = MemoryStore::new();
        store
            .insert_lesson_unchecked(&Lesson::new(1, 5, "Untitled", ""))
            .unwrap();
        store.insert_task_unchecked(&Task::new(2, 1, "")).unwrap();

        assert_eq!(store.lesson(1).unwrap().embed_url, "");
        assert_eq!(store.task(2).unwrap().lesson_id, 1);
        assert!(store.insert_lesson_unchecked(&lesson(1, 5, 0)).is_err());
        assert!(matches!(
            store.insert_task_unchecked(&Task::new(3, 9, "")),
            Err(StoreError::Orphan { .. })
        ));
    }
}
