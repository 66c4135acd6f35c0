//! Exported artifacts of the record table

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::{create_dir_all, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use airq_core::{AirQualityRecord, RecordSink, RECORD_FIELDS};

/// `air_quality_data_<start>_to_<end>.csv`
pub fn default_export_name(start: NaiveDate, end: NaiveDate) -> String {
    format!("air_quality_data_{start}_to_{end}.csv")
}

/// Write `records` as CSV. The header row is written even for an empty table.
pub fn write_records<W: Write>(writer: W, records: &[AirQualityRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(RECORD_FIELDS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Parse CSV produced by [`write_records`] or [`CsvSink`]
pub fn read_records<R: Read>(reader: R) -> Result<Vec<AirQualityRecord>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (i, row) in csv.deserialize().enumerate() {
        let record: AirQualityRecord = row.with_context(|| format!("bad CSV row {}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Appends records to a CSV file, writing the header only into an empty file
pub struct CsvSink {
    file: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref().to_path_buf();
        if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_dir_all(dir)
                .with_context(|| format!("cannot create directory {}", dir.display()))?;
        }
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

#[async_trait::async_trait]
impl RecordSink for CsvSink {
    async fn emit(&mut self, records: &[AirQualityRecord]) -> Result<()> {
        let f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .with_context(|| format!("cannot open {}", self.file.display()))?;
        let needs_header = f.metadata()?.len() == 0;

        let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(f);
        if needs_header {
            csv.write_record(RECORD_FIELDS)?;
        }
        for record in records {
            csv.serialize(record)?;
        }
        csv.flush()?;

        debug!(path = %self.file.display(), rows = records.len(), "Wrote CSV rows");
        Ok(())
    }
}
