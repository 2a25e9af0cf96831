use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

use crate::fasta::{analyze_record, FastaReader, FastaRecord, RawRecord};
use crate::report::ReportRow;

const CHANNEL_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Worker threads computing metrics.
    pub threads: usize,
    /// Records per chunk handed to a worker.
    pub batch_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions { threads: 4, batch_size: 10_000 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records seen in the input.
    pub total: usize,
    /// Rows written to the report.
    pub written: usize,
    /// Records dropped by validation.
    pub rejected: usize,
}

/// A numbered chunk of input records; the number fixes its output position.
type Chunk = (usize, Vec<RawRecord>);
type Analyzed = (usize, Vec<FastaRecord>);

/// Opens `path` for reading; `-` is stdin, `.gz` is decompressed.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let decoder = MultiGzDecoder::new(file);
        Ok(Box::new(BufReader::with_capacity(2 << 20, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(2 << 20, file)))
    }
}

/// Creates `path` for writing; `-` is stdout, `.gz` is compressed.
pub fn create_writer(path: &Path) -> Result<Box<dyn Write + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let encoder = GzEncoder::new(file, Compression::new(6));
        Ok(Box::new(BufWriter::with_capacity(1 << 20, encoder)))
    } else {
        Ok(Box::new(BufWriter::with_capacity(1 << 20, file)))
    }
}

/// Streams FASTA from `reader` into a CSV report on `writer`.
///
/// One reader thread cuts the input into chunks, `threads` workers validate
/// and analyze them, and one writer thread emits the chunks in input order.
/// The rows are the same as `write_csv(&parse_fasta(..))` on the whole input.
pub fn run<R, W>(reader: R, writer: W, options: &PipelineOptions) -> Result<PipelineStats>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    let threads = options.threads.max(1);
    let batch_size = options.batch_size.max(1);

    let (chunk_tx, chunk_rx): (Sender<Chunk>, Receiver<Chunk>) = bounded(CHANNEL_CAPACITY);
    let (output_tx, output_rx): (Sender<Analyzed>, Receiver<Analyzed>) = bounded(CHANNEL_CAPACITY);

    let total = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));

    let read_count = Arc::clone(&total);
    let reader_handle = thread::spawn(move || -> Result<()> {
        let mut records = FastaReader::new(reader);
        let mut index = 0;
        loop {
            let mut chunk = Vec::with_capacity(batch_size);
            for record in records.by_ref().take(batch_size) {
                chunk.push(record.context("Failed to read FASTA input")?);
            }
            if chunk.is_empty() {
                break;
            }
            read_count.fetch_add(chunk.len(), Ordering::Relaxed);
            if chunk_tx.send((index, chunk)).is_err() {
                debug!("Workers stopped, reader exiting early");
                break;
            }
            index += 1;
        }
        debug!("Finished reading {} records in {} chunks", read_count.load(Ordering::Relaxed), index);
        Ok(())
    });

    let mut worker_handles = Vec::with_capacity(threads);
    for _ in 0..threads {
        let rx = chunk_rx.clone();
        let tx = output_tx.clone();
        let rejected_count = Arc::clone(&rejected);

        worker_handles.push(thread::spawn(move || {
            while let Ok((index, chunk)) = rx.recv() {
                let mut kept = Vec::with_capacity(chunk.len());
                for raw in chunk {
                    let id = raw.id.clone();
                    match analyze_record(raw) {
                        Ok(record) => kept.push(record),
                        Err(e) => {
                            debug!("Dropping record '{}': {}", id, e);
                            rejected_count.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                // Empty chunks are still sent so the writer can advance.
                if tx.send((index, kept)).is_err() {
                    break;
                }
            }
        }));
    }
    drop(chunk_rx);
    drop(output_tx);

    let writer_handle = thread::spawn(move || -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut pending: BTreeMap<usize, Vec<FastaRecord>> = BTreeMap::new();
        let mut next = 0;
        let mut written = 0;
        while let Ok((index, records)) = output_rx.recv() {
            pending.insert(index, records);
            while let Some(records) = pending.remove(&next) {
                for record in &records {
                    csv_writer.serialize(ReportRow::from(record)).context("Failed to write report row")?;
                }
                written += records.len();
                next += 1;
            }
        }
        csv_writer.flush().context("Failed to flush report")?;
        Ok(written)
    });

    let read_result = reader_handle.join().map_err(|_| anyhow!("FASTA reader thread panicked"))?;
    for handle in worker_handles {
        handle.join().map_err(|_| anyhow!("Worker thread panicked"))?;
    }
    let written = writer_handle.join().map_err(|_| anyhow!("Report writer thread panicked"))??;
    read_result?;

    Ok(PipelineStats {
        total: total.load(Ordering::Relaxed),
        written,
        rejected: rejected.load(Ordering::Relaxed),
    })
}
