use crate::errors::Result;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// How run summaries are printed.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON, for scripts.
    Json,
}

/// Totals from a `substitute` run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub files_archived: usize,
    pub backup_path: Option<PathBuf>,
    pub dry_run: bool,
}

/// Totals from an `unsubstitute` run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RestoreSummary {
    pub files_restored: usize,
    pub backup_path: PathBuf,
}

/// A summary that can be rendered in any `ReportFormat`.
pub trait Report: Serialize {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<()>;

    fn write_report<W: Write>(&self, writer: &mut W, format: ReportFormat) -> Result<()> {
        match format {
            ReportFormat::Text => self.write_text(writer),
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, self)?;
                writeln!(writer)?;
                Ok(())
            }
        }
    }
}

impl Report for RunSummary {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "\n{}", "-".repeat(50))?;
        writeln!(writer, "Files scanned : {}", self.files_scanned)?;
        if self.dry_run {
            writeln!(writer, "Would change  : {}", self.files_changed)?;
        } else {
            writeln!(writer, "Files changed : {}", self.files_changed)?;
        }
        match &self.backup_path {
            Some(path) => writeln!(
                writer,
                "Backed up     : {} ({})",
                self.files_archived,
                path.display()
            )?,
            None if !self.dry_run => {
                writeln!(writer, "Backed up     : none (no --backup-path, not reversible)")?
            }
            None => {}
        }
        Ok(())
    }
}

impl Report for RestoreSummary {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "\n{}", "-".repeat(50))?;
        writeln!(writer, "Files restored : {}", self.files_restored)?;
        writeln!(writer, "Removed backup : {}", self.backup_path.display())?;
        Ok(())
    }
}
