//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `studydesk_core` linkage.
//! - Print a task and study summary of a StudyDesk database.
//!
//! Opening a path that does not exist creates the file and applies the
//! schema migrations; existing collections are only read.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use studydesk_core::{
    NoopReminderDispatcher, SessionStore, SqliteKvBacking, TaskStore, ANALYTICS_COURSES,
};

#[derive(Parser)]
#[command(name = "studydesk")]
#[command(about = "StudyDesk core probe and database summary", long_about = None)]
#[command(version)]
struct Cli {
    /// Database file to summarize
    #[arg(env = "STUDYDESK_DB_PATH")]
    db: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    println!("studydesk_core ping={}", studydesk_core::ping());
    println!("studydesk_core version={}", studydesk_core::core_version());

    let Some(path) = cli.db else {
        return ExitCode::SUCCESS;
    };
    match summarize(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(path: PathBuf) -> Result<(), String> {
    let backing = SqliteKvBacking::open(&path).map_err(|err| err.to_string())?;
    let keys = backing.keys().map_err(|err| err.to_string())?;
    println!("db={} keys={}", path.display(), keys.join(","));

    let (tasks, task_load) = TaskStore::open(&backing, NoopReminderDispatcher);
    println!("tasks={} load={:?}", task_load.count(), task_load);
    for task in tasks.list() {
        println!(
            "  [{:>3}%] {} ({}, {}) due {}",
            task.progress,
            task.title,
            task.course,
            task.priority.as_str(),
            task.deadline_iso()
        );
    }

    let (sessions, session_load) = SessionStore::open(&backing);
    println!("sessions={} load={:?}", session_load.count(), session_load);
    println!(
        "total_hours={:.2} average_secs={:.0}",
        sessions.total_hours(),
        sessions.average_duration_per_session()
    );
    for share in sessions.distribution_by_course(ANALYTICS_COURSES) {
        println!(
            "  {:<12} {:>6.2}h {:>5.1}% {}",
            share.course, share.hours, share.percentage, share.color
        );
    }
    Ok(())
}
