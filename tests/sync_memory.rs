use ticksync::board::InMemoryBoard;
use ticksync::checklist::{Checklist, Status};
use ticksync::normalize::NormalizeOptions;
use ticksync::sources::{build_checklist, Source};
use ticksync::status::StatusColumns;
use ticksync::sync::{AutoApprove, DryRun, SyncOptions, Synchronizer};
use ticksync::Error;

fn board() -> (InMemoryBoard, StatusColumns) {
    let board = InMemoryBoard::with_columns(&["Backlog To-Do", "In progress", "Done!"]);
    let columns = StatusColumns::classify(&board.columns()).expect("columns");
    (board, columns)
}

fn options(group: bool, separator: &str) -> SyncOptions {
    SyncOptions {
        normalize: NormalizeOptions {
            group_by_top_level: group,
            separator: separator.to_string(),
        },
        ..SyncOptions::default()
    }
}

#[tokio::test]
async fn second_run_is_a_noop() {
    let (board, _) = board();
    board.set_palette(&["green", "red"]);
    let checklist = Checklist::parse(
        "[ ] Backend\n  [x] Schema\n  [~] API\n    [ ] Auth\n[ ] Frontend\n  [ ] Login",
    );
    let sync = Synchronizer::new(board.clone(), options(true, " - "));

    let first = sync.run(&checklist, &AutoApprove).await.expect("first run");
    assert_eq!(first.failure_count(), 0);
    assert_eq!(board.labels().len(), 2);
    assert_eq!(board.cards().len(), 4);
    let writes = board.write_count();

    let second = sync.run(&checklist, &AutoApprove).await.expect("second run");
    assert!(second.is_noop());
    assert_eq!(board.write_count(), writes);
}

#[tokio::test]
async fn same_title_under_two_groups_settles_after_one_run() {
    let (board, _) = board();
    let checklist = Checklist::parse("[ ] Web\n  [ ] Fix login\n[ ] Mobile\n  [x] Fix login");
    let sync = Synchronizer::new(board.clone(), options(true, " - "));

    let first = sync.run(&checklist, &AutoApprove).await.expect("first run");
    assert_eq!(first.failure_count(), 0);
    assert_eq!(board.cards().len(), 2);
    let writes = board.write_count();

    let second = sync.run(&checklist, &AutoApprove).await.expect("second run");
    assert!(second.is_noop(), "{:?}", second.phases);
    assert_eq!(board.write_count(), writes);
}

#[tokio::test]
async fn status_drift_moves_nested_card() {
    let (board, columns) = board();
    board.add_card("Parent", &columns.todo.id, &[]);
    board.add_card("Parent - Child", &columns.done.id, &[]);
    let checklist = Checklist::parse("[ ] Parent\n  [ ] Child");

    let report = Synchronizer::new(board.clone(), options(false, " - "))
        .run(&checklist, &AutoApprove)
        .await
        .expect("run");

    assert_eq!(report.phases.len(), 1);
    assert_eq!(
        report.phases[0].proposed,
        vec!["\"Parent - Child\" done -> todo".to_string()]
    );
    let moved = board.card("Parent - Child").expect("card");
    assert_eq!(moved.column_id, columns.todo.id);
    assert_eq!(board.cards().len(), 2);
}

#[tokio::test]
async fn grouping_with_slash_separator() {
    let (board, columns) = board();
    board.set_palette(&["blue"]);
    let checklist = Checklist::parse("[ ] Area\n  [ ] Feature\n    [x] Task");

    Synchronizer::new(board.clone(), options(true, "/"))
        .run(&checklist, &AutoApprove)
        .await
        .expect("run");

    let labels = board.labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].title, "Area");
    assert_eq!(labels[0].color.as_deref(), Some("blue"));

    let feature = board.card("Feature").expect("feature");
    assert_eq!(feature.column_id, columns.todo.id);
    assert!(feature.has_label("Area"));

    let task = board.card("Feature/Task").expect("task");
    assert_eq!(task.column_id, columns.done.id);
    assert!(task.has_label("Area"));
    assert!(board.card("Area").is_none());
}

#[tokio::test]
async fn existing_card_gains_missing_label() {
    let (board, columns) = board();
    board.add_label_definition("Area", Some("green"));
    board.add_card("Task", &columns.in_progress.id, &[]);
    let checklist = Checklist::parse("[ ] Area\n  [~] Task");

    let report = Synchronizer::new(board.clone(), options(true, " - "))
        .run(&checklist, &AutoApprove)
        .await
        .expect("run");

    assert_eq!(report.phases.len(), 1);
    assert_eq!(report.phases[0].proposed, vec!["\"Task\" [] -> [Area]".to_string()]);
    assert!(board.card("Task").expect("task").has_label("Area"));
    assert_eq!(board.labels().len(), 1);
}

#[tokio::test]
async fn unresolved_status_aborts_before_writing() {
    let board = InMemoryBoard::with_columns(&["To Do", "Done"]);
    let checklist = Checklist::parse("[ ] Task");

    let err = Synchronizer::new(board.clone(), options(false, " - "))
        .run(&checklist, &AutoApprove)
        .await
        .expect_err("no in-progress list");
    assert!(matches!(err, Error::UnresolvedStatus(Status::InProgress)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(board.write_count(), 0);
}

#[tokio::test]
async fn duplicate_groups_across_sources_create_one_label() {
    let (board, _) = board();
    let sources = vec![
        Source {
            path: "a.md".into(),
            text: "[ ] Shared\n  [ ] First".to_string(),
        },
        Source {
            path: "b.md".into(),
            text: "[ ] Shared\n  [ ] Second".to_string(),
        },
    ];
    let checklist = build_checklist(&sources);

    let report = Synchronizer::new(board.clone(), options(true, " - "))
        .run(&checklist, &AutoApprove)
        .await
        .expect("run");

    assert_eq!(report.labels, 1);
    assert_eq!(board.labels().len(), 1);
    assert!(board.card("First").expect("first").has_label("Shared"));
    assert!(board.card("Second").expect("second").has_label("Shared"));
}

#[tokio::test]
async fn dry_run_reports_full_plan() {
    let (board, columns) = board();
    board.add_card("Old", &columns.todo.id, &[]);
    let checklist = Checklist::parse("[x] Old\n[ ] New");

    let report = Synchronizer::new(board.clone(), options(false, " - "))
        .run(&checklist, &DryRun)
        .await
        .expect("dry run");

    let proposed: Vec<_> = report.phases.iter().map(|p| p.proposed.clone()).collect();
    assert_eq!(
        proposed,
        vec![
            vec!["\"Old\" todo -> done".to_string()],
            vec!["\"New\"".to_string()],
        ]
    );
    assert_eq!(board.write_count(), 0);
}
