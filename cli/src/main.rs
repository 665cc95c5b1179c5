//! `timeclock-cli`: admin maintenance CLI (spec §6), operating through
//! `timeclock-core::Store` under the same employee-lock discipline as
//! the event loop. All business logic lives in the core crate; this
//! binary only parses arguments and prints results.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use timeclock_core::error::Error;
use timeclock_core::model::Employee;
use timeclock_core::{export, report::ReportEngine, AppConfig, Store};

#[derive(Parser)]
#[command(name = "timeclock-cli", about = "TimeClock admin maintenance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lists active time entries, read-only.
    ListEntries {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        all: bool,
    },
    /// Soft-deletes a time entry and recalculates IN/OUT alternation
    /// for the owning employee.
    DeleteEntry {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        force: bool,
    },
    /// Updates an employee's name only.
    ChangeEmployeeName {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        new_name: String,
    },
    /// Writes the raw-entries CSV export (spec §6).
    Export {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Prints a working-time report for one employee over a date range.
    Report {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        since: NaiveDate,
        #[arg(long)]
        until: NaiveDate,
    },
}

fn main() -> ExitCode {
    timeclock_core::logging::init();

    let config = AppConfig::load();
    let store = match Store::open(&config.storage_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("fatal: could not open storage at {:?}: {e}", config.storage_path);
            return ExitCode::from(1);
        }
    };

    let cli = Cli::parse();
    match run(&cli.command, &store, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(command: &Command, store: &Store, config: &AppConfig) -> Result<(), Error> {
    match command {
        Command::ListEntries { name, tag, all } => list_entries(store, name.as_deref(), tag.as_deref(), *all),
        Command::DeleteEntry { id, name, tag, force } => {
            delete_entry(store, *id, name.as_deref(), tag.as_deref(), *force)
        }
        Command::ChangeEmployeeName { name, tag, new_name } => {
            change_employee_name(store, name.as_deref(), tag.as_deref(), new_name)
        }
        Command::Export { path } => {
            let target = path
                .clone()
                .or_else(|| config.export_path.clone())
                .unwrap_or_else(|| PathBuf::from("timeclock-export.csv"));
            export::export_to_file(store, &target)?;
            println!("wrote {}", target.display());
            Ok(())
        }
        Command::Report { name, tag, since, until } => print_report(store, name.as_deref(), tag.as_deref(), *since, *until),
    }
}

/// Resolves exactly one employee from either a partial name match or
/// an exact tag, erroring on zero or multiple matches so destructive
/// commands never guess.
fn resolve_employee(store: &Store, name: Option<&str>, tag: Option<&str>) -> Result<Employee, Error> {
    if let Some(tag) = tag {
        return store
            .get_employee_by_tag(tag)?
            .ok_or_else(|| Error::InvalidInput(format!("no active employee with tag {tag}")));
    }
    if let Some(partial) = name {
        let mut matches = store.find_employees_by_name(partial)?;
        return match matches.len() {
            0 => Err(Error::InvalidInput(format!("no employee matching name {partial:?}"))),
            1 => Ok(matches.remove(0)),
            n => Err(Error::InvalidInput(format!(
                "{n} employees match name {partial:?}; use --tag to disambiguate"
            ))),
        };
    }
    Err(Error::InvalidInput("must specify --name or --tag".into()))
}

fn list_entries(store: &Store, name: Option<&str>, tag: Option<&str>, all: bool) -> Result<(), Error> {
    let employees: Vec<Employee> = if all {
        store.find_employees_by_name("")?
    } else {
        vec![resolve_employee(store, name, tag)?]
    };

    let since = chrono::Local::now() - chrono::Duration::days(365);
    let until = chrono::Local::now() + chrono::Duration::days(1);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for employee in employees {
        let entries = store.list_entries(employee.id, since, until)?;
        for entry in entries {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}",
                entry.id,
                employee.name,
                entry.timestamp.to_rfc3339(),
                entry.action.as_str()
            );
        }
    }
    Ok(())
}

fn delete_entry(store: &Store, id: i64, name: Option<&str>, tag: Option<&str>, force: bool) -> Result<(), Error> {
    if name.is_some() || tag.is_some() {
        // Disambiguation/confirmation filter: the entry must belong to
        // the named/tagged employee, else this is very likely the
        // wrong id and we refuse even with --force.
        let employee = resolve_employee(store, name, tag)?;
        let owned = store
            .list_entries(
                employee.id,
                chrono::Local::now() - chrono::Duration::days(3650),
                chrono::Local::now() + chrono::Duration::days(1),
            )?
            .into_iter()
            .any(|e| e.id == id);
        if !owned {
            return Err(Error::InvalidInput(format!(
                "entry {id} does not belong to {}",
                employee.name
            )));
        }
    }

    if !force {
        print!("delete entry {id}? [y/N] ");
        std::io::stdout().flush().ok();
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer).ok();
        if answer.trim().to_lowercase() != "y" {
            println!("aborted");
            return Ok(());
        }
    }

    let deleted = store.soft_delete_entries(&[id])?;
    println!("deleted {deleted} entry(ies)");
    Ok(())
}

fn change_employee_name(store: &Store, name: Option<&str>, tag: Option<&str>, new_name: &str) -> Result<(), Error> {
    let employee = resolve_employee(store, name, tag)?;
    store.update_employee_name(employee.id, new_name)?;
    println!("renamed {} -> {new_name}", employee.name);
    Ok(())
}

fn print_report(store: &Store, name: Option<&str>, tag: Option<&str>, since: NaiveDate, until: NaiveDate) -> Result<(), Error> {
    let employee = resolve_employee(store, name, tag)?;
    let since_dt = since
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_local_timezone(chrono::Local)
        .unwrap();
    let until_dt = until
        .and_hms_opt(23, 59, 59)
        .unwrap()
        .and_local_timezone(chrono::Local)
        .unwrap();
    let entries = store.list_entries(employee.id, since_dt, until_dt)?;
    let report = ReportEngine::build(employee, entries, since, until);

    println!("report for {} ({} .. {})", report.employee.name, since, until);
    for day in &report.days {
        println!("  {} total={}", day.date, format_duration(day.daily_total));
        for session in &day.sessions {
            match session.clock_out_ts {
                Some(out_ts) => println!(
                    "    {} -> {} ({})",
                    session.clock_in_ts.format("%H:%M"),
                    out_ts.format("%H:%M"),
                    format_duration(session.duration.unwrap())
                ),
                None => println!("    {} -> (open)", session.clock_in_ts.format("%H:%M")),
            }
        }
    }
    println!(
        "totals: {} over {} day(s) worked, average {}",
        format_duration(report.totals.total_duration),
        report.totals.day_count_with_work,
        format_duration(report.totals.average_per_day)
    );
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn format_duration(d: chrono::Duration) -> String {
    let total_minutes = d.num_minutes();
    format!("{}:{:02}", total_minutes / 60, (total_minutes % 60).abs())
}
