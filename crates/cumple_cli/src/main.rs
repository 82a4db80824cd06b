//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cumple_core` linkage with a deterministic ping/version check.
//! - Given a database path, print the upcoming birthdays stored in it.
//!
//! Usage: `cumple_cli [DB_PATH] [LOG_DIR]`

use cumple_core::{
    init_logging, open_db, CalendarDate, Collection, EventService, LoggingConfig,
    SqliteRecordStore,
};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("cumple_core ping={}", cumple_core::ping());
    println!("cumple_core version={}", cumple_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };

    if let Some(log_dir) = args.next() {
        let started = LoggingConfig::with_default_level(&log_dir)
            .and_then(|config| init_logging(&config));
        if let Err(err) = started {
            eprintln!("logging disabled: {err}");
        }
    }

    info!("event=cli_upcoming module=cli status=start db_path={db_path}");
    match print_upcoming(&db_path) {
        Ok(count) => {
            info!("event=cli_upcoming module=cli status=ok records={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_upcoming module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Prints today's and upcoming birthdays. Returns how many were listed.
fn print_upcoming(db_path: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let store = SqliteRecordStore::try_new(&conn)?;
    let service = EventService::for_collection(&store, Collection::Birthdays);
    let view = service.upcoming(CalendarDate::today())?;

    for record in &view.today {
        println!("today    {:<24} {}", record.name, age_label(record.computed_age));
    }
    for record in &view.upcoming {
        println!(
            "in {:>3}d {:<24} {}",
            record.days_until_occurrence.unwrap_or(0),
            record.name,
            age_label(record.computed_age)
        );
    }
    Ok(view.today.len() + view.upcoming.len())
}

fn age_label(age: Option<i32>) -> String {
    age.map(|age| format!("turns {age}")).unwrap_or_default()
}
