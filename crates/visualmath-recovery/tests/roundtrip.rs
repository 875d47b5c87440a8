//! Export a store, recover the tree into a fresh store, compare.

use std::{fs, path::Path};

use tempfile::TempDir;
use visualmath_core::{Config, Lesson, Task, TaskOrder};
use visualmath_generator::Builder;
use visualmath_recovery::{RecoveryReport, recover};
use visualmath_store::{LessonStore, MemoryStore, SqliteStore};

fn source_store() -> MemoryStore {
    MemoryStore::with_lessons([
        Lesson::new(1, 5, "Fractions & decimals", "https://www.canva.com/design/F1/view")
            .with_description(r#"Reading "mixed" numbers"#)
            .with_sort_order(101)
            .with_task(
                Task::new(3, 0, "<p>x < y & z</p>")
                    .with_title("Compare")
                    .with_description("Which is larger?"),
            )
            .with_task(Task::new(1, 0, "https://www.geogebra.org/m/abc").with_title("Graph it")),
        Lesson::new(2, 6, "Ratios", "https://www.canva.com/design/R2/view/")
            .with_task(Task::new(2, 0, r#"<div class='q'>1 : 2</div>"#).with_title("Ratio")),
        Lesson::new(4, 6, "Percent", "https://www.canva.com/design/P4/view"),
    ])
    .unwrap()
}

fn export(store: &MemoryStore, out: &Path, base_path: &str) {
    Builder::new(Config::default(), store)
        .build(out, base_path)
        .unwrap();
}

fn assert_same_content(original: &dyn LessonStore, recovered: &dyn LessonStore) {
    // Recovered lessons all have sort order 0, so compare by id.
    let mut expected = original.lessons_with_tasks(TaskOrder::Insertion).unwrap();
    let mut actual = recovered.lessons_with_tasks(TaskOrder::Insertion).unwrap();
    expected.sort_by_key(|l| l.id);
    actual.sort_by_key(|l| l.id);
    assert_eq!(expected.len(), actual.len());

    for (want, got) in expected.iter().zip(&actual) {
        assert_eq!(got.id, want.id);
        assert_eq!(got.grade, want.grade);
        assert_eq!(got.title, want.title);
        assert_eq!(got.embed_url, want.embed_url);
        assert_eq!(got.description, want.description);
        assert_eq!(got.sort_order, 0);
        assert_eq!(got.tasks.len(), want.tasks.len(), "lesson {}", want.id);

        for (want, got) in want.tasks.iter().zip(&got.tasks) {
            assert_eq!(got.id, want.id);
            assert_eq!(got.lesson_id, want.lesson_id);
            assert_eq!(got.title, want.title);
            assert_eq!(got.description, want.description);
            assert_eq!(got.code, want.code);
        }
    }
}

#[test]
fn test_export_then_recover_round_trip() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");
    let original = source_store();
    export(&original, &out, "/");

    let mut recovered = MemoryStore::new();
    let report = recover(&Config::default(), &mut recovered, &out).unwrap();

    assert_eq!(report.lessons_inserted, 3);
    assert_eq!(report.tasks_inserted, 3);
    assert_eq!(report.reconciled(), 6);
    assert_same_content(&original, &recovered);

    // Lesson 1 links task 1 before task 3 (insertion order), so positions follow.
    assert_eq!(recovered.task(1).unwrap().order, 1);
    assert_eq!(recovered.task(3).unwrap().order, 2);
}

#[test]
fn test_round_trip_under_base_path() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");
    let original = source_store();
    export(&original, &out, "/visualmath/");

    let mut recovered = MemoryStore::new();
    recover(&Config::default(), &mut recovered, &out).unwrap();

    assert_same_content(&original, &recovered);
}

#[test]
fn test_recover_twice_inserts_once() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");
    export(&source_store(), &out, "/");

    let mut store = MemoryStore::new();
    let first = recover(&Config::default(), &mut store, &out).unwrap();
    let second = recover(&Config::default(), &mut store, &out).unwrap();

    assert_eq!(first.reconciled(), 6);
    assert_eq!(
        second,
        RecoveryReport {
            lessons_existing: 3,
            tasks_existing: 3,
            ..RecoveryReport::default()
        }
    );
    assert_eq!(store.lesson_count(), 3);
    assert_eq!(store.task_count(), 3);
}

#[test]
fn test_unlinked_task_page_is_orphan() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");
    export(&source_store(), &out, "/");

    let page = fs::read_to_string(out.join("task/2/index.html")).unwrap();
    fs::create_dir_all(out.join("task/77")).unwrap();
    fs::write(out.join("task/77/index.html"), page).unwrap();

    let mut store = MemoryStore::new();
    let report = recover(&Config::default(), &mut store, &out).unwrap();

    assert_eq!(report.orphans, 1);
    assert!(!store.contains_task(77).unwrap());
}

#[test]
fn test_non_presentation_embed_recovers_with_empty_url() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");
    let original = MemoryStore::with_lessons([Lesson::new(
        7,
        8,
        "Slides elsewhere",
        "https://docs.google.com/presentation/d/X/embed",
    )
    .with_task(Task::new(70, 0, "<p>7 * 10</p>").with_title("Multiply"))])
    .unwrap();
    export(&original, &out, "/");

    let mut store = MemoryStore::new();
    let report = recover(&Config::default(), &mut store, &out).unwrap();

    assert_eq!(report.lessons_inserted, 1);
    assert_eq!(report.lessons_incomplete, 1);
    assert_eq!(report.tasks_inserted, 1);
    assert_eq!(report.orphans, 0);

    let lesson = store.lesson(7).unwrap();
    assert_eq!(lesson.title, "Slides elsewhere");
    assert_eq!(lesson.grade, 8);
    assert_eq!(lesson.embed_url, "");
    let task = store.task(70).unwrap();
    assert_eq!(task.lesson_id, 7);
    assert_eq!(task.code, "<p>7 * 10</p>");
}

#[test]
fn test_escaped_srcdoc_recovers_markup() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("lesson/1")).unwrap();
    fs::create_dir_all(root.join("task/8")).unwrap();
    fs::write(
        root.join("lesson/1/index.html"),
        r#"<title>Inequalities | VisualMath</title>
<a href="/grade/7">Grade 7</a>
<iframe src="https://www.canva.com/design/I1/view?embed"></iframe>
<a href="/task/8">Task</a>"#,
    )
    .unwrap();
    fs::write(
        root.join("task/8/index.html"),
        r#"<title>Order | VisualMath</title>
<iframe srcdoc="<p>x &lt; y &amp; z</p>"></iframe>"#,
    )
    .unwrap();

    let mut store = MemoryStore::new();
    recover(&Config::default(), &mut store, root).unwrap();

    assert_eq!(store.lesson(1).unwrap().grade, 7);
    assert_eq!(store.task(8).unwrap().code, "<p>x < y & z</p>");
}

#[test]
fn test_recover_into_sqlite() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");
    let original = source_store();
    export(&original, &out, "/");

    let mut store = SqliteStore::open(&dir.path().join("math_app.db")).unwrap();
    let report = recover(&Config::default(), &mut store, &out).unwrap();

    assert_eq!(report.reconciled(), 6);
    assert_same_content(&original, &store);
}
