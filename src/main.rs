use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info, warn};
use oligo_analyzer::pipeline::{self, PipelineOptions};
use oligo_analyzer::analyze_sequence;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oligo-analyzer")]
#[command(about = "Tm, GC/AT content, molecular weight and reverse complement for DNA oligos")]
struct Args {
    #[arg(short = 'v', long, global = true, default_value = "false", help = "Verbose output (debug logging)")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one sequence given on the command line
    Single {
        #[arg(help = "DNA sequence, 5' -> 3' (A, T, G, C, N; any case)")]
        sequence: String,
    },

    /// Analyze every record of a FASTA file and write a CSV report
    Batch {
        #[arg(help = "Input FASTA (.fasta, .txt, optionally .gz; '-' for stdin)")]
        input: PathBuf,

        #[arg(short = 'o', long, default_value = "-", help = "Output CSV ('-' for stdout, .gz to compress)")]
        output: PathBuf,

        #[arg(short = 't', long, default_value = "4", help = "Number of threads")]
        threads: usize,

        #[arg(short = 'b', long, default_value = "10000", help = "Records per processing chunk")]
        batch_size: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match args.command {
        Command::Single { sequence } => {
            let report = analyze_sequence(&sequence)?;
            println!("{}", report);
        }
        Command::Batch { input, output, threads, batch_size } => {
            let start = Instant::now();
            let reader = pipeline::open_reader(&input)?;
            let writer = pipeline::create_writer(&output)?;
            let options = PipelineOptions { threads, batch_size };

            let stats = match pipeline::run(reader, writer, &options) {
                Ok(stats) => stats,
                Err(e) => {
                    discard_output(&output);
                    return Err(e);
                }
            };

            if stats.rejected > 0 {
                warn!("Dropped {} invalid or empty records", stats.rejected);
            }
            if stats.written == 0 {
                discard_output(&output);
                bail!("No valid sequences found in {}", input.display());
            }
            info!(
                "Successfully processed {} of {} sequences in {:.2?}",
                stats.written,
                stats.total,
                start.elapsed()
            );
            if output.as_os_str() != "-" {
                info!("Report written to {}", output.display());
            }
        }
    }

    Ok(())
}

/// Removes a partial or empty report so a failed run leaves no CSV behind.
fn discard_output(path: &Path) {
    if path == Path::new("-") {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed incomplete report {}", path.display()),
        Err(e) => warn!("Could not remove incomplete report {}: {}", path.display(), e),
    }
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Args::command().debug_assert()
}
