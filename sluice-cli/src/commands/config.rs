//! `sluice config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sluice_core::config::{BucketRoutes, SluiceConfig};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer),
        ConfigAction::Show { section } => execute_show(config_path, section, writer),
    }
}

/// Execute the config validate subcommand.
///
/// Attempts to load and validate the configuration file, reporting any
/// errors. Exits non-zero when the configuration is invalid.
fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match SluiceConfig::load(config_path) {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Loads and displays the effective configuration
/// (file + env overrides + defaults).
fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = SluiceConfig::load(config_path)?;

    let report = if let Some(section_name) = section {
        let config_toml = match section_name.as_str() {
            "general" => section_toml(&config.general),
            "routing" => section_toml(&RoutingSection {
                routing: &config.routing,
            }),
            "handler" => section_toml(&config.handler),
            _ => {
                return Err(CliError::Command(format!(
                    "unknown section: {section_name} (expected: general, routing, handler)"
                )));
            }
        };
        ConfigReport {
            source: config_path.display().to_string(),
            section: Some(section_name),
            config_toml,
        }
    } else {
        ConfigReport {
            source: config_path.display().to_string(),
            section: None,
            config_toml: section_toml(&config),
        }
    };

    writer.render(&report)?;

    Ok(())
}

/// Serialize a config section to TOML, reporting errors inline.
fn section_toml<T: Serialize>(section: &T) -> String {
    toml::to_string_pretty(section).unwrap_or_else(|e| format!("(serialization error: {e})"))
}

/// TOML cannot serialize a bare array at the top level, so the routing
/// section is shown under its original `[[routing]]` key.
#[derive(Serialize)]
struct RoutingSection<'a> {
    routing: &'a [BucketRoutes],
}

/// Configuration display report.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{section}]");
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
