//! `sluice run` command handler

use std::fs;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use sluice_core::config::SluiceConfig;
use sluice_pipeline::{BatchRunner, FsObjectStore, ObjectEvent, RouteTable, resolve_handler};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Collects the object batch from positional `BUCKET/KEY` arguments and the
/// optional `--events` JSON file, routes each object to its configured
/// pipeline and reports the handler result.
pub fn execute(
    args: RunArgs,
    config: &SluiceConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let events = collect_events(&args)?;
    if events.is_empty() {
        return Err(CliError::Command(
            "no objects to process; pass BUCKET/KEY arguments or --events <file>".to_owned(),
        ));
    }

    let handler_name = args.handler.as_deref().unwrap_or(&config.handler.name);
    let mut handler = resolve_handler(handler_name)?;

    let store = FsObjectStore::new(&config.general.data_dir);
    let routes = RouteTable::from_config(&config.routing);
    let mut runner = BatchRunner::new(&store, routes);

    info!(
        objects = events.len(),
        handler = handler_name,
        data_dir = %config.general.data_dir,
        "running batch"
    );
    let result = runner.run(&events, handler.as_mut(), &config.handler.args)?;

    let report = RunReport {
        objects: events.len(),
        handler: handler_name.to_owned(),
        result,
    };
    writer.render(&report)?;

    Ok(())
}

/// Merge positional object specs and the `--events` file into one batch.
///
/// Positional specs come first, in argument order, followed by the file
/// entries in file order.
fn collect_events(args: &RunArgs) -> Result<Vec<ObjectEvent>, CliError> {
    let mut events = Vec::new();

    for spec in &args.objects {
        let (bucket, key) = spec.split_once('/').ok_or_else(|| {
            CliError::Command(format!("object \"{spec}\" must be in BUCKET/KEY form"))
        })?;
        if bucket.is_empty() || key.is_empty() {
            return Err(CliError::Command(format!(
                "object \"{spec}\" has an empty bucket or key"
            )));
        }
        events.push(ObjectEvent::new(bucket, key));
    }

    if let Some(path) = &args.events {
        let text = fs::read_to_string(path)?;
        let batch: Vec<ObjectEvent> = serde_json::from_str(&text)?;
        events.extend(batch);
    }

    Ok(events)
}

/// Batch execution report.
#[derive(Serialize)]
pub struct RunReport {
    /// Number of objects in the batch
    pub objects: usize,
    /// Handler that consumed the normalized records
    pub handler: String,
    /// Value returned by the handler's `result()`
    pub result: Value,
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Processed {} object(s) via handler '{}'",
            self.objects,
            self.handler.bold()
        )?;
        writeln!(w, "Result:")?;
        writeln!(
            w,
            "{}",
            serde_json::to_string_pretty(&self.result).unwrap_or_else(|e| format!("({e})"))
        )?;
        Ok(())
    }
}
