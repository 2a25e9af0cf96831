// lib.rs - oligo analysis library

pub mod error;
pub mod fasta;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod revcomp;
pub mod sequence;

pub use error::{Result, SequenceError};
pub use fasta::{analyze_batch, parse_fasta, BatchOutcome, FastaReader, FastaRecord, RawRecord, Rejected};
pub use metrics::{compute_metrics, MetricsResult};
pub use report::{analyze_sequence, write_csv, ReportRow, SequenceReport};
pub use revcomp::{reverse_complement, reverse_complement_str};
pub use sequence::{BaseCounts, Sequence, ALPHABET};
