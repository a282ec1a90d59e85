//! Output formatting for command results.
//!
//! A [`Printer`] is built once per command from the global flags and
//! owns the format, quiet and color decisions. Tables go through
//! `tabled`; every other format serializes the underlying data.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub struct Printer {
    format: OutputFormat,
    quiet: bool,
    color: bool,
}

impl Printer {
    pub fn new(global: &GlobalOpts) -> Self {
        let color = match global.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        };
        Self {
            format: global.output.clone(),
            quiet: global.quiet,
            color,
        }
    }

    /// Same flags, but documents that have no table form render as JSON.
    pub fn document(global: &GlobalOpts) -> Self {
        let mut printer = Self::new(global);
        if matches!(printer.format, OutputFormat::Table) {
            printer.format = OutputFormat::Json;
        }
        printer
    }

    pub fn format(&self) -> &OutputFormat {
        &self.format
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Print many items: one table row each, or one id per line in plain mode.
    pub fn list<T, R>(
        &self,
        items: &[T],
        to_row: impl Fn(&T) -> R,
        id: impl Fn(&T) -> String,
    ) -> Result<(), CliError>
    where
        T: Serialize,
        R: Tabled,
    {
        let out = match self.format {
            OutputFormat::Table => {
                let rows: Vec<R> = items.iter().map(to_row).collect();
                Table::new(rows).with(Style::rounded()).to_string()
            }
            OutputFormat::Plain => items.iter().map(id).collect::<Vec<_>>().join("\n"),
            _ => self.serialize(items)?,
        };
        self.line(&out);
        Ok(())
    }

    /// Print one item: a detail block in table mode, its id in plain mode.
    pub fn single<T>(
        &self,
        item: &T,
        detail: impl Fn(&T) -> String,
        id: impl Fn(&T) -> String,
    ) -> Result<(), CliError>
    where
        T: Serialize + ?Sized,
    {
        let out = match self.format {
            OutputFormat::Table => detail(item),
            OutputFormat::Plain => id(item),
            _ => self.serialize(item)?,
        };
        self.line(&out);
        Ok(())
    }

    /// Write one line to stdout unless quiet. Empty output prints nothing.
    pub fn line(&self, text: &str) {
        if self.quiet || text.is_empty() {
            return;
        }
        let _ = writeln!(io::stdout().lock(), "{text}");
    }

    fn serialize<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, CliError> {
        Ok(match self.format {
            OutputFormat::JsonCompact => serde_json::to_string(data)?,
            OutputFormat::Yaml => serde_yaml::to_string(data)?.trim_end().to_owned(),
            _ => serde_json::to_string_pretty(data)?,
        })
    }
}
