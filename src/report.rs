use std::fmt::{Display, Formatter};
use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::fasta::FastaRecord;
use crate::metrics::{metrics_for, MetricsResult};
use crate::revcomp::reverse_complement_str;
use crate::sequence::Sequence;

/// One row of the batch table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow<'a> {
    #[serde(rename = "ID")]
    pub id: &'a str,
    #[serde(rename = "Length")]
    pub length: u64,
    #[serde(rename = "Tm (°C)")]
    pub tm_celsius: u64,
    #[serde(rename = "GC%")]
    pub gc_percent: f64,
    #[serde(rename = "AT%")]
    pub at_percent: f64,
    #[serde(rename = "MW (Da)")]
    pub molecular_weight: f64,
    #[serde(rename = "Sequence")]
    pub sequence: &'a str,
    #[serde(rename = "Rev_Comp")]
    pub reverse_complement: &'a str,
}

impl<'a> From<&'a FastaRecord> for ReportRow<'a> {
    fn from(record: &'a FastaRecord) -> Self {
        ReportRow {
            id: &record.id,
            length: record.metrics.length,
            tm_celsius: record.metrics.tm_celsius,
            gc_percent: record.metrics.gc_percent,
            at_percent: record.metrics.at_percent,
            molecular_weight: record.metrics.molecular_weight,
            sequence: record.sequence.as_str(),
            reverse_complement: &record.reverse_complement,
        }
    }
}

/// Writes `records` as CSV with a header row. Nothing at all is written for
/// an empty slice.
pub fn write_csv<W: Write>(records: &[FastaRecord], writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(ReportRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Single-sequence result: metrics plus the reverse complement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceReport {
    pub sequence: Sequence,
    pub metrics: MetricsResult,
    pub reverse_complement: String,
}

/// Single-sequence mode. Validation errors are returned as-is; there is no
/// partial result.
pub fn analyze_sequence(text: &str) -> Result<SequenceReport> {
    let sequence = Sequence::parse(text)?;
    let metrics = metrics_for(&sequence);
    let reverse_complement = reverse_complement_str(sequence.as_str());
    Ok(SequenceReport { sequence, metrics, reverse_complement })
}

impl Display for SequenceReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.metrics)?;
        writeln!(f)?;
        writeln!(f, "Reverse Complement:")?;
        write!(f, "{}", self.reverse_complement)
    }
}
