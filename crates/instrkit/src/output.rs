use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use instrkit_decode::{Application, DecodeReport, Process, SkippedRecord, StartDate};
use instrkit_object::Object;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ListOutput<'a, T> {
    kind: &'static str,
    count: usize,
    records: &'a [T],
    skipped: &'a [SkippedRecord],
}

#[derive(Serialize)]
struct SampleOutput<'a> {
    kind: &'static str,
    index: usize,
    sample: &'a Object,
}

pub fn print_processes(report: &DecodeReport<Process>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ListOutput {
            kind: "process-list",
            count: report.kept(),
            records: &report.records,
            skipped: &report.skipped,
        }),
        OutputFormat::Table => {
            let rows = report
                .records
                .iter()
                .map(|p| {
                    vec![
                        p.pid.to_string(),
                        p.name.clone(),
                        yes_no(p.is_application).to_string(),
                        p.start_date.as_ref().map(start_date).unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(vec!["PID", "NAME", "APP", "STARTED"], rows);
        }
        OutputFormat::Pretty => {
            for p in &report.records {
                let marker = if p.is_application { " (app)" } else { "" };
                println!("{:>7}  {}{}", p.pid, p.name, marker);
            }
        }
        OutputFormat::Raw => report.records.iter().for_each(print_json),
    }
    report_skipped(&report.skipped, format);
}

pub fn print_applications(report: &DecodeReport<Application>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ListOutput {
            kind: "application-list",
            count: report.kept(),
            records: &report.records,
            skipped: &report.skipped,
        }),
        OutputFormat::Table => {
            let rows = report
                .records
                .iter()
                .map(|app| {
                    vec![
                        app.bundle_identifier.clone(),
                        app.display_name.clone(),
                        app.app_type.clone(),
                        app.version.clone(),
                    ]
                })
                .collect();
            print_table(vec!["BUNDLE ID", "NAME", "TYPE", "VERSION"], rows);
        }
        OutputFormat::Pretty => {
            for app in &report.records {
                println!(
                    "{} {} ({}, {})",
                    app.bundle_identifier, app.display_name, app.app_type, app.version
                );
            }
        }
        OutputFormat::Raw => report.records.iter().for_each(print_json),
    }
    report_skipped(&report.skipped, format);
}

/// Print a flat record of named fields, such as a command result.
pub fn print_fields(kind: &'static str, fields: Vec<(String, Value)>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut object = serde_json::Map::new();
            object.insert("kind".to_string(), Value::from(kind));
            object.extend(fields);
            print_json(&Value::Object(object));
        }
        OutputFormat::Table => {
            let rows = fields
                .into_iter()
                .map(|(key, value)| vec![key, plain(&value)])
                .collect();
            print_table(vec!["FIELD", "VALUE"], rows);
        }
        OutputFormat::Pretty => {
            for (key, value) in fields {
                println!("{key}: {}", plain(&value));
            }
        }
        OutputFormat::Raw => {
            let object: serde_json::Map<String, Value> = fields.into_iter().collect();
            print_json(&Value::Object(object));
        }
    }
}

/// Flatten a serializable record into fields for [`print_fields`].
pub fn fields_of<T: Serialize>(record: &T) -> Vec<(String, Value)> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        Ok(other) => vec![("value".to_string(), other)],
        Err(_) => Vec::new(),
    }
}

pub fn print_sample(index: usize, sample: &Object, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SampleOutput {
            kind: "sysmon-sample",
            index,
            sample,
        }),
        OutputFormat::Table => {
            let rows = match sample.as_map() {
                Some(map) => map
                    .iter()
                    .map(|(key, value)| vec![key.clone(), plain(&value.to_json())])
                    .collect(),
                None => vec![vec!["value".to_string(), plain(&sample.to_json())]],
            };
            println!("sample {index}");
            print_table(vec!["KEY", "VALUE"], rows);
        }
        OutputFormat::Pretty => println!("sample {index}: {}", sample.to_json()),
        OutputFormat::Raw => print_json(sample),
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn print_table(header: Vec<&str>, rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

fn report_skipped(skipped: &[SkippedRecord], format: OutputFormat) {
    if skipped.is_empty() || format == OutputFormat::Json {
        return;
    }
    let mut err = std::io::stderr();
    let _ = writeln!(err, "{} malformed record(s) skipped", skipped.len());
}

fn start_date(date: &StartDate) -> String {
    match date {
        StartDate::EpochSeconds(seconds) => format!("{seconds:.0}"),
        StartDate::Text(text) => text.clone(),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
