use std::io::Write;
use std::path::Path;

use anyhow::Context;
use pylones_core::AggregatedRow;

use crate::input::DELIMITER;

/// `;`-delimited report sink for one radius pass.
///
/// Owned by a single consumer: rows are written one at a time as they
/// complete, never from concurrent tasks.
pub(crate) struct ReportWriter<W: Write> {
    inner: csv::Writer<W>,
    strict: bool,
    rows_written: usize,
}

impl ReportWriter<std::fs::File> {
    /// Create (or truncate) the report file at `path`.
    pub(crate) fn create(path: &Path, strict: bool) -> anyhow::Result<Self> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create output file {}", path.display()))?;
        Ok(Self::new(file, strict))
    }
}

impl<W: Write> ReportWriter<W> {
    pub(crate) fn new(sink: W, strict: bool) -> Self {
        let inner = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .terminator(csv::Terminator::CRLF)
            .from_writer(sink);
        Self {
            inner,
            strict,
            rows_written: 0,
        }
    }

    pub(crate) fn write_header(&mut self, columns: &[String]) -> anyhow::Result<()> {
        self.inner
            .write_record(columns)
            .context("failed to write report header")
    }

    pub(crate) fn write_row(&mut self, row: &AggregatedRow) -> anyhow::Result<()> {
        self.inner
            .write_record(row.to_record(self.strict))
            .context("failed to write report row")?;
        self.rows_written += 1;
        Ok(())
    }

    pub(crate) fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub(crate) fn flush(&mut self) -> anyhow::Result<()> {
        self.inner.flush().context("failed to flush report")
    }

    /// Flush and hand back the underlying sink.
    #[cfg(test)]
    pub(crate) fn into_inner(self) -> anyhow::Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush report: {}", e.error()))
    }
}
