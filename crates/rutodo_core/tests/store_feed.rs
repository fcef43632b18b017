use rutodo_core::{Settings, SortMode, StoreError, TaskItem, TodoStore};
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn live_query_yields_current_then_refreshes_after_write() {
    let store = TodoStore::open_in_memory().unwrap();
    store
        .insert_task(TaskItem::new("Buy milk", "", "Shopping"))
        .await
        .unwrap();

    let mut feed = store.watch_tasks(SortMode::None);
    let first = timeout(WAIT, feed.next()).await.unwrap().unwrap();
    assert_eq!(first.len(), 1);

    store
        .insert_task(TaskItem::new("Answer mail", "", "Work"))
        .await
        .unwrap();
    let second = timeout(WAIT, feed.next()).await.unwrap().unwrap();
    let titles: Vec<_> = second.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Answer mail", "Buy milk"]);
}

#[tokio::test]
async fn burst_of_writes_is_observed_in_one_refresh() {
    let store = TodoStore::open_in_memory().unwrap();
    let mut feed = store.watch_tasks(SortMode::Category);
    assert!(timeout(WAIT, feed.next()).await.unwrap().unwrap().is_empty());

    for (title, category) in [("c", "Work"), ("a", "Home"), ("b", "Garden")] {
        store
            .insert_task(TaskItem::new(title, "", category))
            .await
            .unwrap();
    }

    let refreshed = timeout(WAIT, feed.next()).await.unwrap().unwrap();
    let categories: Vec<_> = refreshed.iter().map(|task| task.category.as_str()).collect();
    assert_eq!(categories, vec!["Garden", "Home", "Work"]);
}

#[tokio::test]
async fn only_changing_writes_bump_revision() {
    let store = TodoStore::open_in_memory().unwrap();
    assert_eq!(store.revision(), 0);

    let task = TaskItem::new("Call mom", "", "Personal");
    store.insert_task(task.clone()).await.unwrap();
    assert_eq!(store.revision(), 1);

    assert!(!store
        .update_task(TaskItem::new("Ghost", "", "None"))
        .await
        .unwrap());
    assert!(!store.delete_task_by_id(uuid::Uuid::new_v4()).await.unwrap());
    assert_eq!(store.revision(), 1);

    assert!(store.update_task(task.toggled()).await.unwrap());
    assert!(store.delete_task_by_id(task.id).await.unwrap());
    assert_eq!(store.revision(), 3);
}

#[tokio::test]
async fn failed_write_surfaces_error_and_does_not_notify() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.db");
    let store = TodoStore::open(&rutodo_core::CoreConfig {
        db_path: Some(path.clone()),
        ..rutodo_core::CoreConfig::default()
    })
    .unwrap();

    let side = rusqlite::Connection::open(&path).unwrap();
    side.execute_batch("DROP TABLE todo_items;").unwrap();

    let err = store
        .insert_task(TaskItem::new("Buy milk", "", "Shopping"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Repo(_)));
    assert_eq!(store.revision(), 0);
}

#[tokio::test]
async fn filtered_and_settings_feeds_follow_writes() {
    let store = TodoStore::open_in_memory().unwrap();
    let mut home = store.watch_tasks_by_category("Home");
    let mut done = store.watch_tasks_by_completion(true);
    let mut settings = store.watch_settings();

    assert!(timeout(WAIT, home.next()).await.unwrap().unwrap().is_empty());
    assert!(timeout(WAIT, done.next()).await.unwrap().unwrap().is_empty());
    assert_eq!(
        timeout(WAIT, settings.next()).await.unwrap().unwrap(),
        Settings::default()
    );

    let mut task = TaskItem::new("Water plants", "", "Home");
    task.is_done = true;
    store.insert_task(task.clone()).await.unwrap();
    store
        .put_settings(Settings {
            is_dark_mode: true,
            sort_mode: SortMode::Completed,
        })
        .await
        .unwrap();

    assert_eq!(timeout(WAIT, home.next()).await.unwrap().unwrap(), vec![task.clone()]);
    assert_eq!(timeout(WAIT, done.next()).await.unwrap().unwrap(), vec![task]);
    let latest = timeout(WAIT, settings.next()).await.unwrap().unwrap();
    assert!(latest.is_dark_mode);
    assert_eq!(latest.sort_mode, SortMode::Completed);
}

#[tokio::test]
async fn get_task_and_filtered_reads() {
    let store = TodoStore::open_in_memory().unwrap();
    let task = TaskItem::new("Bake bread", "rye", "Home");
    store.insert_task(task.clone()).await.unwrap();

    assert_eq!(store.get_task(task.id).await.unwrap(), Some(task.clone()));
    assert_eq!(
        store.list_tasks_by_category("Home").await.unwrap(),
        vec![task.clone()]
    );
    assert_eq!(store.list_tasks_by_completion(false).await.unwrap(), vec![task]);
    assert!(store.list_tasks_by_completion(true).await.unwrap().is_empty());
}
