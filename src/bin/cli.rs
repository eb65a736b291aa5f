use chrono::{Local, NaiveDate, NaiveTime};
use polars::prelude::{AnyValue, DataFrame};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use worklist::frame::{forecast_to_dataframe, tasks_to_dataframe};
use worklist::persistence::{
    load_snapshot_from_json, load_tasks_from_csv, save_snapshot_to_json, save_tasks_to_csv,
};
use worklist::{DueDate, Task, Worklist, WorklistConfig};

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| match col.get(row_idx) {
                Ok(AnyValue::Null) | Err(_) => String::new(),
                Ok(AnyValue::Float64(v)) => format!("{v:.1}"),
                Ok(AnyValue::String(s)) => s.to_string(),
                Ok(av) => av.to_string(),
            })
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                         Show this help\n  show                                         Show all tasks\n  add <minutes> <start> <due> <name...>        Add a task (due: YYYY-MM-DD, ASAP or None)\n  done <id>                                    Mark a task finished\n  log <id> <minutes>                           Add time spent on a task\n  delete <id>                                  Delete a task\n  vacation add <YYYY-MM-DD>                    Mark a vacation day\n  vacation remove <YYYY-MM-DD>                 Remove a vacation day\n  vacation list                                List vacation days\n  holidays import <json_path> <province>       Import statutory holidays\n  forecast [YYYY-MM-DD] [HH:MM]                Planned hours per day\n  heatmap [YYYY-MM-DD] [HH:MM]                 Weekly load grid\n  save <json|csv> <path>                       Persist tasks to disk\n  load <json|csv> <path>                       Load tasks from disk\n  quit|exit                                    Exit"
    );
}

fn show_tasks(worklist: &Worklist) {
    let tasks: Vec<Task> = worklist.tasks().cloned().collect();
    match tasks_to_dataframe(&tasks) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {e}"),
    }
}

fn parse_id(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.parse().ok())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Optional `[YYYY-MM-DD] [HH:MM]` arguments, defaulting to the local clock.
fn parse_clock<'a>(mut args: impl Iterator<Item = &'a str>) -> Option<(NaiveDate, NaiveTime)> {
    let local = Local::now().naive_local();
    let today = match args.next() {
        Some(raw) => parse_date(raw)?,
        None => local.date(),
    };
    let now = match args.next() {
        Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M").ok()?,
        None => local.time(),
    };
    Some((today, now))
}

fn load_config() -> WorklistConfig {
    let path = std::env::var("WORKLIST_CONFIG").unwrap_or_else(|_| "worklist.toml".to_string());
    match WorklistConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring config {path}: {e}");
            WorklistConfig::default()
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WORKLIST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config();
    let mut worklist = match Worklist::new(config) {
        Ok(worklist) => worklist,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            Worklist::default()
        }
    };

    println!("Worklist (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => show_tasks(&worklist),
            "add" => {
                let minutes = parts.next().and_then(|s| s.parse::<u32>().ok());
                let start = parts.next().and_then(parse_date);
                let due = parts.next().map(str::parse::<DueDate>);
                let name = parts.collect::<Vec<_>>().join(" ");
                match (minutes, start, due) {
                    (Some(minutes), Some(start), Some(Ok(due))) if !name.is_empty() => {
                        let id = worklist.next_id();
                        match worklist.insert_task(Task::new(id, name, minutes, start, due)) {
                            Ok(()) => {
                                println!("Added task id={id}.");
                                show_tasks(&worklist);
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    (_, _, Some(Err(e))) => println!("Error: {e}"),
                    _ => println!("Usage: add <minutes> <start> <due> <name...>"),
                }
            }
            "done" => match parse_id(parts.next()) {
                Some(id) => match worklist.complete_task(id) {
                    Ok(()) => println!("Task {id} finished."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: done <id>"),
            },
            "log" => {
                let id = parse_id(parts.next());
                let minutes = parts.next().and_then(|s| s.parse::<u32>().ok());
                match (id, minutes) {
                    (Some(id), Some(minutes)) => match worklist.log_time(id, minutes) {
                        Ok(remaining) => println!("Logged {minutes} min on task {id}; {remaining} min remaining."),
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: log <id> <minutes>"),
                }
            }
            "delete" => match parse_id(parts.next()) {
                Some(id) => match worklist.delete_task(id) {
                    Ok(_) => {
                        println!("Deleted task {id}.");
                        show_tasks(&worklist);
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: delete <id>"),
            },
            "vacation" => match (parts.next(), parts.next()) {
                (Some("add"), Some(raw)) => match parse_date(raw) {
                    Some(date) => {
                        if worklist.mark_vacation(date) {
                            println!("Vacation marked on {date}.");
                        } else {
                            println!("{date} is already a day off.");
                        }
                    }
                    None => println!("Invalid date (YYYY-MM-DD)"),
                },
                (Some("remove"), Some(raw)) => match parse_date(raw) {
                    Some(date) => {
                        if worklist.unmark_vacation(date) {
                            println!("Vacation removed on {date}.");
                        } else {
                            println!("No vacation on {date}.");
                        }
                    }
                    None => println!("Invalid date (YYYY-MM-DD)"),
                },
                (Some("list"), None) => {
                    let vacations = worklist.calendar().vacations();
                    if vacations.is_empty() {
                        println!("No vacation days.");
                    }
                    for date in vacations {
                        println!("  {date}");
                    }
                }
                _ => println!("Usage: vacation add|remove <YYYY-MM-DD> | vacation list"),
            },
            "holidays" => match (parts.next(), parts.next(), parts.next()) {
                (Some("import"), Some(path), Some(province)) => {
                    let result = std::fs::read_to_string(path)
                        .map_err(|e| e.to_string())
                        .and_then(|json| {
                            worklist
                                .import_holidays(&json, province)
                                .map_err(|e| e.to_string())
                        });
                    match result {
                        Ok(added) => println!("Imported {added} holidays for {province}."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: holidays import <json_path> <province>"),
            },
            "forecast" => match parse_clock(parts) {
                Some((today, now)) => match worklist.forecast(today, now) {
                    Ok(forecast) => match forecast_to_dataframe(&forecast) {
                        Ok(df) => println!("{}", render_df_as_text_table(&df)),
                        Err(e) => println!("Error: {e}"),
                    },
                    Err(e) => println!("Forecast error: {e}"),
                },
                None => println!("Usage: forecast [YYYY-MM-DD] [HH:MM]"),
            },
            "heatmap" => match parse_clock(parts) {
                Some((today, now)) => match worklist.heatmap(today, now) {
                    Ok(grid) => print!("{}", grid.render_text()),
                    Err(e) => println!("Forecast error: {e}"),
                },
                None => println!("Usage: heatmap [YYYY-MM-DD] [HH:MM]"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => {
                    match save_snapshot_to_json(&worklist.snapshot(), path) {
                        Ok(()) => println!("Saved to {path}."),
                        Err(e) => println!("Save error: {e}"),
                    }
                }
                (Some("csv"), Some(path)) => {
                    let tasks: Vec<Task> = worklist.tasks().cloned().collect();
                    match save_tasks_to_csv(&tasks, path) {
                        Ok(()) => println!("Saved to {path}."),
                        Err(e) => println!("Save error: {e}"),
                    }
                }
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => {
                    let result = load_snapshot_from_json(path)
                        .map_err(|e| e.to_string())
                        .and_then(|snapshot| {
                            Worklist::from_snapshot(worklist.config().clone(), snapshot)
                                .map_err(|e| e.to_string())
                        });
                    match result {
                        Ok(loaded) => {
                            worklist = loaded;
                            show_tasks(&worklist);
                        }
                        Err(e) => println!("Load error: {e}"),
                    }
                }
                (Some("csv"), Some(path)) => {
                    let result = load_tasks_from_csv(path)
                        .map_err(|e| e.to_string())
                        .and_then(|tasks| {
                            worklist.replace_tasks(tasks).map_err(|e| e.to_string())
                        });
                    match result {
                        Ok(()) => show_tasks(&worklist),
                        Err(e) => println!("Load error: {e}"),
                    }
                }
                _ => println!("Usage: load <json|csv> <path>"),
            },
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
}
