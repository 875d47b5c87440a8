//! SQLite store.
//!
//! Uses the `lessons`/`tasks` schema of the administration app's database,
//! so an existing `math_app.db` can be opened directly. Queries run
//! on `sqlx`; the store owns a current-thread Tokio runtime and blocks on each
//! call, which keeps the [`LessonStore`] contract synchronous.

use std::{collections::BTreeMap, path::Path};

use sqlx::{
    FromRow, SqliteConnection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use tokio::runtime::Runtime;
use tracing::{debug, info};
use visualmath_core::{Lesson, LessonId, Task, TaskId, TaskOrder};

use crate::{LessonStore, Result, StoreError};

const LESSON_COLUMNS: &str = "id, grade, title, canva_embed_url, \
     COALESCE(description, '') AS description, COALESCE(sort_order, 0) AS sort_order";

const TASK_COLUMNS: &str = "id, lesson_id, COALESCE(title, '') AS title, \
     COALESCE(description, '') AS description, code, COALESCE(\"order\", 0) AS task_order";

#[derive(Debug, FromRow)]
struct LessonRow {
    id: i64,
    grade: i32,
    title: String,
    canva_embed_url: String,
    description: String,
    sort_order: i32,
}

impl From<LessonRow> for Lesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            grade: row.grade,
            title: row.title,
            embed_url: row.canva_embed_url,
            description: row.description,
            sort_order: row.sort_order,
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    lesson_id: i64,
    title: String,
    description: String,
    code: String,
    task_order: i32,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            lesson_id: row.lesson_id,
            title: row.title,
            description: row.description,
            code: row.code,
            order: row.task_order,
        }
    }
}

/// Lesson store backed by a SQLite database file.
pub struct SqliteStore {
    pool: SqlitePool,
    runtime: Runtime,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (creating if missing) the database and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        // One connection: the pipelines are sequential and this keeps reads
        // consistent with preceding writes.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .map_err(|e| {
                StoreError::Connection(format!("failed to open {}: {e}", path.display()))
            })?;

        let store = Self { pool, runtime };
        store.runtime.block_on(store.migrate())?;

        info!(path = %path.display(), "opened lesson database");
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Connection(format!("failed to acquire connection: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lessons (
                id INTEGER PRIMARY KEY,
                grade INTEGER NOT NULL,
                title TEXT NOT NULL,
                canva_embed_url TEXT NOT NULL,
                description TEXT,
                sort_order INTEGER DEFAULT 0
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                lesson_id INTEGER NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
                title TEXT,
                description TEXT,
                code TEXT NOT NULL,
                "order" INTEGER
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_lesson_id ON tasks(lesson_id)")
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    async fn fetch_lessons(&self, grade: Option<i32>) -> Result<Vec<Lesson>> {
        let rows = match grade {
            Some(grade) => {
                sqlx::query_as::<_, LessonRow>(&format!(
                    "SELECT {LESSON_COLUMNS} FROM lessons WHERE grade = ? \
                     ORDER BY sort_order ASC, id ASC"
                ))
                .bind(grade)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LessonRow>(&format!(
                    "SELECT {LESSON_COLUMNS} FROM lessons ORDER BY sort_order ASC, id ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(Lesson::from).collect())
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn exists(conn: &mut SqliteConnection, table: &str, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(found.is_some())
    }

    async fn write_task(
        conn: &mut SqliteConnection,
        task: &Task,
        lesson_id: LessonId,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, lesson_id, title, description, code, "order")
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id)
        .bind(lesson_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.code)
        .bind(task.order)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_lesson_async(&self, lesson: &Lesson) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if Self::exists(&mut *tx, "lessons", lesson.id).await? {
            return Err(StoreError::duplicate_lesson(lesson.id));
        }
        for task in &lesson.tasks {
            if Self::exists(&mut *tx, "tasks", task.id).await? {
                return Err(StoreError::duplicate_task(task.id));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO lessons (id, grade, title, canva_embed_url, description, sort_order)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(lesson.id)
        .bind(lesson.grade)
        .bind(&lesson.title)
        .bind(&lesson.embed_url)
        .bind(&lesson.description)
        .bind(lesson.sort_order)
        .execute(&mut *tx)
        .await?;

        for task in &lesson.tasks {
            Self::write_task(&mut *tx, task, lesson.id).await?;
        }

        tx.commit().await?;
        debug!(id = lesson.id, tasks = lesson.tasks.len(), "inserted lesson");
        Ok(())
    }

    async fn insert_task_async(&self, task: &Task) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if Self::exists(&mut *tx, "tasks", task.id).await? {
            return Err(StoreError::duplicate_task(task.id));
        }
        if !Self::exists(&mut *tx, "lessons", task.lesson_id).await? {
            return Err(StoreError::Orphan {
                task_id: task.id,
                lesson_id: task.lesson_id,
            });
        }
        Self::write_task(&mut *tx, task, task.lesson_id).await?;
        tx.commit().await?;

        debug!(id = task.id, lesson = task.lesson_id, "inserted task");
        Ok(())
    }
}

impl LessonStore for SqliteStore {
    fn grades(&self) -> Result<Vec<i32>> {
        self.runtime.block_on(async {
            let grades: Vec<i32> =
                sqlx::query_scalar("SELECT DISTINCT grade FROM lessons ORDER BY grade ASC")
                    .fetch_all(&self.pool)
                    .await?;
            Ok::<_, StoreError>(grades)
        })
    }

    fn lessons_by_grade(&self, grade: i32) -> Result<Vec<Lesson>> {
        self.runtime.block_on(self.fetch_lessons(Some(grade)))
    }

    fn lessons_with_tasks(&self, order: TaskOrder) -> Result<Vec<Lesson>> {
        self.runtime.block_on(async {
            let mut lessons = self.fetch_lessons(None).await?;
            let mut by_lesson: BTreeMap<LessonId, Vec<Task>> = BTreeMap::new();
            for task in self.fetch_tasks().await? {
                by_lesson.entry(task.lesson_id).or_default().push(task);
            }
            for lesson in &mut lessons {
                lesson.tasks = by_lesson.remove(&lesson.id).unwrap_or_default();
                order.sort(&mut lesson.tasks);
            }
            Ok::<_, StoreError>(lessons)
        })
    }

    fn tasks(&self) -> Result<Vec<Task>> {
        self.runtime.block_on(self.fetch_tasks())
    }

    fn lesson(&self, id: LessonId) -> Result<Lesson> {
        self.runtime.block_on(async {
            let row = sqlx::query_as::<_, LessonRow>(&format!(
                "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            row.map(Lesson::from)
                .ok_or_else(|| StoreError::lesson_not_found(id))
        })
    }

    fn task(&self, id: TaskId) -> Result<Task> {
        self.runtime.block_on(async {
            let row = sqlx::query_as::<_, TaskRow>(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            row.map(Task::from)
                .ok_or_else(|| StoreError::task_not_found(id))
        })
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
        self.runtime.block_on(self.insert_lesson_async(lesson))
    }

    fn insert_task_unchecked(&mut self, task: &Task) -> Result<()> {
        self.runtime.block_on(self.insert_task_async(task))
    }

    fn delete_lesson(&mut self, id: LessonId) -> Result<()> {
        self.runtime.block_on(async {
            let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::lesson_not_found(id));
            }
            debug!(id, "deleted lesson");
            Ok(())
        })
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        // Connections must be closed while the runtime is still alive.
        self.runtime.block_on(self.pool.close());
    }
}
