// Copyright 2025-2026 CEMAXECUTER LLC

use std::io::Write;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// One point of a frequency response sweep.
///
/// A point without a measurement has no power; it is written as an empty
/// CSV field or a JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub frequency_hz: u64,
    /// Peak power in dBFS
    pub power_db: Option<f32>,
    /// Power relative to the strongest point
    pub normalized_db: Option<f32>,
}

/// Write records as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, records: &[SweepRecord]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write records as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, records: &[SweepRecord]) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    Ok(())
}
