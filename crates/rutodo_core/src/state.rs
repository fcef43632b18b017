//! Application state container.
//!
//! # Responsibility
//! - Publish current settings and the sorted task list as watch channels.
//! - Turn UI intents into asynchronous writes against [`TodoStore`].
//! - Keep exactly one live task query, following the current sort mode.
//!
//! # Invariants
//! - Intents are applied in the order they were issued.
//! - The published task list only changes through the live query, never
//!   directly from an intent.
//! - A sort-mode change drops the previous live query before the next one
//!   is subscribed (switch-to-latest).
//! - Read failures publish an empty list; write failures are published on
//!   [`TodoState::write_failures`] and never retried.

use crate::model::settings::{Settings, SortMode};
use crate::model::task::{TaskId, TaskItem};
use crate::store::{StoreError, StoreResult, TodoStore};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Lifecycle of the task-list subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    /// Live query for this order is running, no result yet.
    Subscribing(SortMode),
    /// At least one result for this order has been published.
    Published(SortMode),
    /// Container torn down.
    Closed,
}

/// Last write that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub intent: &'static str,
    pub message: String,
}

/// Completion handle of one queued write.
///
/// Dropping it leaves the write running.
#[derive(Debug)]
pub struct PendingWrite {
    settled: oneshot::Receiver<StoreResult<()>>,
}

impl PendingWrite {
    /// Waits until the write has been applied or has failed.
    pub async fn settled(self) -> StoreResult<()> {
        self.settled
            .await
            .map_err(|_| StoreError::Worker("writer stopped before settling".to_string()))?
    }
}

enum WriteOp {
    InsertTask(TaskItem),
    UpdateTask(TaskItem),
    DeleteTask(TaskId),
    PutSettings(Settings),
    Barrier,
}

struct WriteCommand {
    intent: &'static str,
    op: WriteOp,
    done: oneshot::Sender<StoreResult<()>>,
}

/// Observable state backing the to-do UI.
pub struct TodoState {
    settings: watch::Sender<Settings>,
    sort_mode: watch::Sender<SortMode>,
    tasks: watch::Receiver<Vec<TaskItem>>,
    subscription: Arc<watch::Sender<SubscriptionState>>,
    write_failures: watch::Receiver<Option<WriteFailure>>,
    writer: mpsc::UnboundedSender<WriteCommand>,
    driver: JoinHandle<()>,
}

impl TodoState {
    /// Loads settings and starts following the task list.
    ///
    /// Must be called inside a Tokio runtime. A settings read failure is
    /// logged and replaced by defaults.
    pub async fn start(store: TodoStore) -> Self {
        let initial = match store.get_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!("event=state_init module=state status=fallback reason=settings_read error={err}");
                Settings::default()
            }
        };

        let (settings, _) = watch::channel(initial);
        let (sort_mode, sort_rx) = watch::channel(initial.sort_mode);
        let (tasks_tx, tasks) = watch::channel(Vec::new());
        let subscription = Arc::new(watch::channel(SubscriptionState::Unsubscribed).0);
        let (failures_tx, write_failures) = watch::channel(None);
        let (writer, commands) = mpsc::unbounded_channel();

        tokio::spawn(run_writer(store.clone(), commands, failures_tx));
        let driver = tokio::spawn(drive_task_feed(
            store,
            sort_rx,
            tasks_tx,
            Arc::clone(&subscription),
        ));

        info!(
            "event=state_init module=state status=ok sort_mode={} dark_mode={}",
            initial.sort_mode, initial.is_dark_mode
        );

        Self {
            settings,
            sort_mode,
            tasks,
            subscription,
            write_failures,
            writer,
            driver,
        }
    }

    pub fn settings(&self) -> watch::Receiver<Settings> {
        self.settings.subscribe()
    }

    pub fn current_settings(&self) -> Settings {
        *self.settings.borrow()
    }

    pub fn tasks(&self) -> watch::Receiver<Vec<TaskItem>> {
        self.tasks.clone()
    }

    pub fn subscription(&self) -> watch::Receiver<SubscriptionState> {
        self.subscription.subscribe()
    }

    pub fn write_failures(&self) -> watch::Receiver<Option<WriteFailure>> {
        self.write_failures.clone()
    }

    /// Queues a new open task with a fresh id.
    pub fn add_task(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> PendingWrite {
        let task = TaskItem::new(title, description, category);
        self.enqueue("add_task", WriteOp::InsertTask(task))
    }

    /// Queues a full-record replacement. A missing id is a silent no-op.
    pub fn update_task(&self, task: TaskItem) -> PendingWrite {
        self.enqueue("update_task", WriteOp::UpdateTask(task))
    }

    pub fn toggle_done(&self, task: &TaskItem) -> PendingWrite {
        self.enqueue("toggle_done", WriteOp::UpdateTask(task.toggled()))
    }

    pub fn delete_task(&self, id: TaskId) -> PendingWrite {
        self.enqueue("delete_task", WriteOp::DeleteTask(id))
    }

    /// Publishes `new_settings` immediately, then persists them.
    ///
    /// The optimistic value is kept even if persisting fails.
    pub fn change_settings(&self, new_settings: Settings) -> PendingWrite {
        self.settings.send_replace(new_settings);
        let switched = self.sort_mode.send_if_modified(|current| {
            if *current == new_settings.sort_mode {
                return false;
            }
            *current = new_settings.sort_mode;
            true
        });
        if switched {
            debug!(
                "event=sort_switch module=state status=start sort_mode={}",
                new_settings.sort_mode
            );
        }
        self.enqueue("change_settings", WriteOp::PutSettings(new_settings))
    }

    /// Waits for queued writes, then stops the task-list subscription.
    pub async fn shutdown(self) {
        if let Err(err) = self.enqueue("shutdown", WriteOp::Barrier).settled().await {
            warn!("event=state_shutdown module=state status=degraded error={err}");
        }
        self.driver.abort();
        self.subscription.send_replace(SubscriptionState::Closed);
        info!("event=state_shutdown module=state status=ok");
    }

    fn enqueue(&self, intent: &'static str, op: WriteOp) -> PendingWrite {
        let (done, settled) = oneshot::channel();
        if let Err(mpsc::error::SendError(command)) =
            self.writer.send(WriteCommand { intent, op, done })
        {
            let _ = command.done.send(Err(StoreError::Worker(
                "writer is no longer running".to_string(),
            )));
        }
        PendingWrite { settled }
    }
}

impl Drop for TodoState {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn run_writer(
    store: TodoStore,
    mut commands: mpsc::UnboundedReceiver<WriteCommand>,
    failures: watch::Sender<Option<WriteFailure>>,
) {
    while let Some(WriteCommand { intent, op, done }) = commands.recv().await {
        let result = apply_write(&store, intent, op).await;
        if let Err(err) = &result {
            error!("event=state_write module=state status=error intent={intent} error={err}");
            failures.send_replace(Some(WriteFailure {
                intent,
                message: err.to_string(),
            }));
        }
        let _ = done.send(result);
    }
}

async fn apply_write(store: &TodoStore, intent: &'static str, op: WriteOp) -> StoreResult<()> {
    match op {
        WriteOp::InsertTask(task) => store.insert_task(task).await,
        WriteOp::UpdateTask(task) => {
            if !store.update_task(task).await? {
                debug!("event=state_write module=state status=noop intent={intent}");
            }
            Ok(())
        }
        WriteOp::DeleteTask(id) => {
            if !store.delete_task_by_id(id).await? {
                debug!("event=state_write module=state status=noop intent={intent}");
            }
            Ok(())
        }
        WriteOp::PutSettings(settings) => store.put_settings(settings).await,
        WriteOp::Barrier => Ok(()),
    }
}

async fn drive_task_feed(
    store: TodoStore,
    mut sort_rx: watch::Receiver<SortMode>,
    tasks: watch::Sender<Vec<TaskItem>>,
    subscription: Arc<watch::Sender<SubscriptionState>>,
) {
    loop {
        let sort_mode = *sort_rx.borrow_and_update();
        subscription.send_replace(SubscriptionState::Subscribing(sort_mode));
        let mut feed = store.watch_tasks(sort_mode);

        loop {
            tokio::select! {
                biased;
                changed = sort_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                result = feed.next() => {
                    let snapshot = match result {
                        Ok(items) => items,
                        Err(err) => {
                            warn!(
                                "event=task_feed module=state status=fallback sort_mode={} error={}",
                                sort_mode, err
                            );
                            Vec::new()
                        }
                    };
                    tasks.send_replace(snapshot);
                    subscription.send_replace(SubscriptionState::Published(sort_mode));
                }
            }
        }
    }
}
