//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format
//! switching. This keeps format-specific logic out of command handlers.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to an arbitrary writer.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}
