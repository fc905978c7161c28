//! CLI inspection entry point.
//!
//! # Responsibility
//! - Open a data directory read-only and print the hydrated task list.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `taskpad_cli [data_dir] [query] [category]`. Without `data_dir`,
//! `TASKPAD_DATA_DIR` (or the temp-dir default) is used. Relative
//! directories resolve against the working directory.

use log::warn;
use std::process::ExitCode;
use taskpad_core::{
    core_version, filter, init_logging, load_tasks, CoreConfig, SqliteDurableStore,
    ALL_CATEGORIES,
};

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(dir) => CoreConfig::from_data_dir(dir),
        None => CoreConfig::from_env(),
    };
    let query = args.next().unwrap_or_default();
    let category = args.next().unwrap_or_else(|| ALL_CATEGORIES.to_string());

    println!("taskpad_core version={}", core_version());
    println!("data_dir={}", config.data_dir.display());

    if let Err(err) = init_logging(&config.log_level, config.log_dir()) {
        eprintln!("logging disabled: {err}");
    }

    let db_path = config.db_path();
    if !db_path.exists() {
        println!("tasks=0 (no snapshot database)");
        return ExitCode::SUCCESS;
    }

    let durable = match SqliteDurableStore::open(&db_path) {
        Ok(durable) => durable,
        Err(err) => {
            warn!("event=cli_open module=cli status=error error={err}");
            eprintln!("failed to open {}: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let tasks = load_tasks(&durable);
    let view = filter(&tasks, &query, &category);
    println!("tasks={} shown={}", tasks.len(), view.count());
    for task in view.iter() {
        println!(
            "[{}] {} | {} | priority={} | category={} | deadline_ms={}{}",
            if task.is_checked { "x" } else { " " },
            task.id,
            task.title,
            task.priority,
            if task.is_uncategorized() {
                "-"
            } else {
                task.category.as_str()
            },
            task.deadline,
            if task.has_reminder() { " | reminder" } else { "" },
        );
    }

    ExitCode::SUCCESS
}
