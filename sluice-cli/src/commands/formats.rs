//! `sluice formats` command handler

use std::io::Write;

use serde::Serialize;

use sluice_pipeline::known_formats;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `formats` command.
///
/// Lists every format identifier the registry can resolve, in registry
/// order (fetch modes first), together with its stage kind.
pub fn execute(writer: &OutputWriter) -> Result<(), CliError> {
    let formats = known_formats()
        .into_iter()
        .map(|(id, kind)| FormatEntry {
            id: id.to_owned(),
            kind: kind.to_string(),
        })
        .collect();

    writer.render(&FormatsReport { formats })?;
    Ok(())
}

/// One registry entry.
#[derive(Serialize)]
pub struct FormatEntry {
    /// Format identifier as used in routing configuration
    pub id: String,
    /// Stage kind ("fetcher" or "parser")
    pub kind: String,
}

/// Registry listing report.
#[derive(Serialize)]
pub struct FormatsReport {
    /// All known formats, in registry order
    pub formats: Vec<FormatEntry>,
}

impl Render for FormatsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{:<22} {}", "ID".bold(), "KIND".bold())?;
        for entry in &self.formats {
            writeln!(w, "{:<22} {}", entry.id, entry.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cli::OutputFormat;

    #[test]
    fn test_formats_report_lists_fetchers_and_parsers() {
        let mut buffer = Vec::new();
        let writer = OutputWriter::new(OutputFormat::Text);
        let formats = known_formats()
            .into_iter()
            .map(|(id, kind)| FormatEntry {
                id: id.to_owned(),
                kind: kind.to_string(),
            })
            .collect();
        writer
            .render_to(&FormatsReport { formats }, &mut buffer)
            .expect("render");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("s3-lines"));
        assert!(output.contains("fetcher"));
        assert!(output.contains("syslog"));
        assert!(output.contains("parser"));
    }

    #[test]
    fn test_formats_json_output_is_array() {
        let mut buffer = Vec::new();
        let writer = OutputWriter::new(OutputFormat::Json);
        let formats = known_formats()
            .into_iter()
            .map(|(id, kind)| FormatEntry {
                id: id.to_owned(),
                kind: kind.to_string(),
            })
            .collect();
        writer
            .render_to(&FormatsReport { formats }, &mut buffer)
            .expect("render");

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).expect("valid JSON");
        let entries = parsed["formats"].as_array().expect("formats array");
        assert!(entries.len() > 10, "registry should list all formats");
        assert!(
            entries
                .iter()
                .any(|e| e["id"] == serde_json::json!("cloudtrail"))
        );
    }
}
