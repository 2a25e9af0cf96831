use std::io::{self, BufRead};
use std::mem;

use log::debug;

use crate::error::{Result, SequenceError};
use crate::metrics::{metrics_for, MetricsResult};
use crate::revcomp::reverse_complement_str;
use crate::sequence::Sequence;

/// A header and its concatenated sequence lines, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub id: String,
    pub sequence: String,
}

/// A record that passed validation, with everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FastaRecord {
    pub id: String,
    pub sequence: Sequence,
    pub metrics: MetricsResult,
    pub reverse_complement: String,
}

/// A record dropped from a batch and the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub id: String,
    pub error: SequenceError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub records: Vec<FastaRecord>,
    pub rejected: Vec<Rejected>,
}

/// Groups FASTA lines into records.
///
/// Each in-progress record owns its sequence buffer; lines are only ever
/// appended to it and the buffer is moved out when the record is emitted.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    header: Option<String>,
    sequence: String,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line. Returns the previous record when `line` is a header.
    ///
    /// A record whose header is empty (a bare `>`) is never returned.
    pub fn push_line(&mut self, line: &str) -> Option<RawRecord> {
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('>') {
            let previous = self.header.replace(header.to_string())?;
            return Self::emit(previous, mem::take(&mut self.sequence));
        }
        // Text before the first header is ignored.
        if self.header.is_some() {
            self.sequence.push_str(line);
        }
        None
    }

    /// Closes the open record, if any.
    pub fn finish(&mut self) -> Option<RawRecord> {
        let id = self.header.take()?;
        Self::emit(id, mem::take(&mut self.sequence))
    }

    fn emit(id: String, sequence: String) -> Option<RawRecord> {
        if id.is_empty() {
            debug!("Skipping record with empty header ({} bases)", sequence.len());
            return None;
        }
        Some(RawRecord { id, sequence })
    }
}

/// Streams [`RawRecord`]s out of a buffered reader.
pub struct FastaReader<R> {
    reader: R,
    builder: RecordBuilder,
    line: String,
    eof: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        FastaReader { reader, builder: RecordBuilder::new(), line: String::new(), eof: false }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = io::Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.eof {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => self.eof = true,
                Ok(_) => {
                    if let Some(record) = self.builder.push_line(&self.line) {
                        return Some(Ok(record));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
        self.builder.finish().map(Ok)
    }
}

/// Validates one raw record and derives its metrics and reverse complement.
pub fn analyze_record(raw: RawRecord) -> Result<FastaRecord> {
    let sequence = Sequence::parse(&raw.sequence)?;
    let metrics = metrics_for(&sequence);
    let reverse_complement = reverse_complement_str(sequence.as_str());
    Ok(FastaRecord { id: raw.id, sequence, metrics, reverse_complement })
}

/// Splits `text` into raw records, in header order.
pub fn raw_records(text: &str) -> Vec<RawRecord> {
    let mut builder = RecordBuilder::new();
    let mut records: Vec<RawRecord> = text.lines().filter_map(|line| builder.push_line(line)).collect();
    records.extend(builder.finish());
    records
}

/// Parses a FASTA batch, keeping invalid records as [`Rejected`] entries.
pub fn analyze_batch(text: &str) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for raw in raw_records(text) {
        let id = raw.id.clone();
        match analyze_record(raw) {
            Ok(record) => outcome.records.push(record),
            Err(error) => {
                debug!("Dropping record '{}': {}", id, error);
                outcome.rejected.push(Rejected { id, error });
            }
        }
    }
    outcome
}

/// Parses a FASTA batch. Records that fail validation, including empty ones,
/// are left out; the rest keep their input order.
pub fn parse_fasta(text: &str) -> Vec<FastaRecord> {
    analyze_batch(text).records
}
