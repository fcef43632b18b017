//! CLI smoke entry point and composition root.
//!
//! # Responsibility
//! - Build config from `RUTODO_*` variables, open the store, start state.
//! - Print a deterministic summary of the current list for sanity checks.

use rutodo_core::{core_version, init_logging, CoreConfig, TodoState, TodoStore};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("rutodo: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let store = TodoStore::open(&config)?;
    let state = TodoState::start(store).await;

    let settings = state.current_settings();
    let mut tasks = state.tasks();
    tasks.changed().await?;
    let snapshot = tasks.borrow_and_update().clone();

    println!("rutodo_core version={}", core_version());
    println!(
        "settings dark_mode={} sort_mode={}",
        settings.is_dark_mode, settings.sort_mode
    );
    println!("tasks total={}", snapshot.len());
    for task in &snapshot {
        let mark = if task.is_done { "x" } else { " " };
        println!("[{mark}] {} ({}) {}", task.title, task.category, task.id);
    }

    state.shutdown().await;
    log::info!("event=cli_exit module=cli status=ok");
    Ok(())
}
