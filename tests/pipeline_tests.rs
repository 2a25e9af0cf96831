use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use oligo_analyzer::pipeline::{self, PipelineOptions, PipelineStats};
use oligo_analyzer::{parse_fasta, write_csv};
use tempfile::tempdir;

/// Writer handle that stays readable after the pipeline consumes it.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn sample_fasta(n: usize) -> String {
    let bases = ["ATGC", "GGCCAT", "NNAT", "ACXG", "", "ttaagg"];
    (0..n).map(|i| format!(">rec{}\n{}\n", i, bases[i % bases.len()])).collect()
}

fn expected_csv(text: &str) -> String {
    let mut buffer = Vec::new();
    write_csv(&parse_fasta(text), &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_pipeline_matches_in_memory_parser() {
    let text = sample_fasta(500);
    for (threads, batch_size) in [(1, 1), (4, 7), (8, 1000)] {
        let output = SharedBuffer::default();
        let options = PipelineOptions { threads, batch_size };
        let stats = pipeline::run(Cursor::new(text.clone().into_bytes()), output.clone(), &options).unwrap();

        assert_eq!(output.contents(), expected_csv(&text), "threads={} batch_size={}", threads, batch_size);
        // 83 records contain X, 83 are empty
        assert_eq!(stats, PipelineStats { total: 500, written: 334, rejected: 166 });
    }
}

#[test]
fn test_pipeline_empty_input() {
    let output = SharedBuffer::default();
    let stats = pipeline::run(Cursor::new(Vec::new()), output.clone(), &PipelineOptions::default()).unwrap();
    assert_eq!(stats, PipelineStats::default());
    assert!(output.contents().is_empty());
}

#[test]
fn test_pipeline_zero_threads_and_batch_are_clamped() {
    let text = ">a\nACGT\n>b\nGG\n";
    let output = SharedBuffer::default();
    let options = PipelineOptions { threads: 0, batch_size: 0 };
    let stats = pipeline::run(Cursor::new(text.as_bytes().to_vec()), output.clone(), &options).unwrap();
    assert_eq!(stats.written, 2);
    assert_eq!(output.contents(), expected_csv(text));
}

#[test]
fn test_pipeline_gzip_round_trip_through_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("oligos.fasta.gz");
    let output = dir.path().join("report.csv.gz");
    let text = sample_fasta(60);

    let mut encoder = GzEncoder::new(File::create(&input).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let reader = pipeline::open_reader(&input).unwrap();
    let writer = pipeline::create_writer(&output).unwrap();
    let stats = pipeline::run(reader, writer, &PipelineOptions { threads: 3, batch_size: 5 }).unwrap();
    assert_eq!(stats.total, 60);

    let mut report = String::new();
    MultiGzDecoder::new(File::open(&output).unwrap()).read_to_string(&mut report).unwrap();
    assert_eq!(report, expected_csv(&text));
}

#[test]
fn test_pipeline_plain_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("oligos.txt");
    let output = dir.path().join("report.csv");
    fs::write(&input, ">p1\nACGTACGT\n").unwrap();

    let reader = pipeline::open_reader(&input).unwrap();
    let writer = pipeline::create_writer(&output).unwrap();
    pipeline::run(reader, writer, &PipelineOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), expected_csv(">p1\nACGTACGT\n"));
}

#[test]
fn test_pipeline_read_error_is_returned() {
    let mut text = b">a\nACGT\n".repeat(20);
    text.extend_from_slice(b">b\nAC\xff\n");
    let output = SharedBuffer::default();
    let options = PipelineOptions { threads: 2, batch_size: 1 };

    let err = pipeline::run(Cursor::new(text), output, &options).unwrap_err();
    assert!(err.to_string().contains("Failed to read FASTA input"));
}

#[test]
fn test_open_reader_missing_file() {
    let dir = tempdir().unwrap();
    let err = pipeline::open_reader(&dir.path().join("missing.fasta")).err().unwrap();
    assert!(err.to_string().contains("Failed to open"));
}
